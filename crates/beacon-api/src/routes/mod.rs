//! Route modules organized by bounded context.

pub mod assist;
pub mod campaigns;
pub mod customers;
pub mod events;
pub mod health;
pub mod segments;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use beacon_assist::AssistProvider;
    use beacon_test_support::{FailingStore, FixedClock, InMemoryStore};
    use serde_json::Value;
    use sqlx::PgPool;
    use tower::ServiceExt;

    use crate::state::{AppState, Repositories};

    fn state_with(repositories: Repositories) -> AppState {
        let pool = PgPool::connect_lazy("postgres://localhost/test").unwrap();
        AppState::new(
            pool,
            Arc::new(FixedClock::reference()),
            repositories,
            AssistProvider::Mock.build(),
        )
    }

    /// State backed by `store`, which the test keeps for seeding.
    pub(crate) fn memory_state(store: &Arc<InMemoryStore>) -> AppState {
        state_with(Repositories::shared(Arc::clone(store)))
    }

    /// State whose every repository call fails.
    pub(crate) fn failing_state() -> AppState {
        state_with(Repositories::shared(Arc::new(FailingStore)))
    }

    /// Sends one request and decodes the JSON response body (`Null` when the
    /// body is empty or not JSON).
    pub(crate) async fn send(
        app: Router,
        method: &str,
        uri: &str,
        body: Option<&Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(body).unwrap())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }
}
