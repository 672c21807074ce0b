//! Keyword-driven segment suggestion.
//!
//! Reads three things out of the prompt: a time window, an optional minimum
//! count and an event type. A mention of a page path wins over a count,
//! which wins over the plain "did X in the last N days" shape.

use std::sync::LazyLock;

use async_trait::async_trait;
use beacon_core::error::DomainError;
use regex::Regex;
use serde_json::{Value, json};
use tracing::debug;

use crate::provider::SegmentAssistant;

const DEFAULT_DAYS: u32 = 30;
const DEFAULT_EVENT_TYPE: &str = "page_view";
const PATH_PROPERTY: &str = "path";

/// Keyword table, checked in order; the first whole-word hit names the
/// event type.
const EVENT_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "add_to_cart",
        &["add to cart", "add-to-cart", "add_to_cart", "added to cart", "cart", "carts"],
    ),
    (
        "purchase",
        &["purchase", "purchased", "purchases", "bought", "buyer", "buyers", "ordered"],
    ),
    ("signup", &["sign up", "signup", "signups", "sign-up", "signed up", "registered"]),
    ("login", &["log in", "login", "logins", "log-in", "logged in", "signed in"]),
    ("checkout", &["checkout", "check out", "checked out"]),
    ("page_view", &["page view", "page_view", "pageview", "viewed", "visit", "visits"]),
];

static EVENT_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    EVENT_KEYWORDS
        .iter()
        .map(|(event_type, keywords)| {
            let alternation = keywords
                .iter()
                .map(|k| regex::escape(k))
                .collect::<Vec<_>>()
                .join("|");
            let pattern = format!(r"\b(?:{alternation})\b");
            (*event_type, Regex::new(&pattern).expect("valid keyword regex"))
        })
        .collect()
});

static DAYS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:last|past|within)\s+(\d+)\s+days?\b").expect("valid days regex")
});
static WEEKS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d+)\s+weeks?\b").expect("valid weeks regex"));
static WEEK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bweeks?\b").expect("valid week regex"));
static MONTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bmonths?\b").expect("valid month regex"));
static AT_LEAST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bat\s+least\s+(\d+)").expect("valid at-least regex"));
static GTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">=\s*(\d+)").expect("valid gte regex"));
static MORE_THAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bmore\s+than\s+(\d+)").expect("valid more-than regex"));
static PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[\s(])(/[a-z0-9][a-z0-9_\-/]*)").expect("valid path regex")
});

fn captured_number(re: &Regex, text: &str) -> Option<u32> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

/// Window length named by the prompt.
pub(crate) fn detect_days(prompt: &str) -> u32 {
    if let Some(days) = captured_number(&DAYS_RE, prompt) {
        return days.max(1);
    }
    if let Some(weeks) = captured_number(&WEEKS_RE, prompt) {
        return weeks.saturating_mul(7).max(1);
    }
    if WEEK_RE.is_match(prompt) {
        return 7;
    }
    if MONTH_RE.is_match(prompt) {
        return 30;
    }
    DEFAULT_DAYS
}

/// Minimum event count named by the prompt, if any.
pub(crate) fn detect_min_count(prompt: &str) -> Option<u32> {
    if let Some(n) = captured_number(&AT_LEAST_RE, prompt) {
        return Some(n.max(1));
    }
    if let Some(n) = captured_number(&GTE_RE, prompt) {
        return Some(n.max(1));
    }
    captured_number(&MORE_THAN_RE, prompt).map(|n| n.saturating_add(1))
}

/// Event type named by the prompt.
pub(crate) fn detect_event_type(prompt: &str) -> &'static str {
    EVENT_PATTERNS
        .iter()
        .find(|(_, pattern)| pattern.is_match(prompt))
        .map_or(DEFAULT_EVENT_TYPE, |(event_type, _)| event_type)
}

/// Page path named by the prompt, if any.
pub(crate) fn detect_path(prompt: &str) -> Option<String> {
    if let Some(path) = PATH_RE.captures(prompt).and_then(|c| c.get(1)) {
        return Some(path.as_str().trim_end_matches('/').to_owned()).filter(|p| !p.is_empty());
    }
    prompt.contains("pricing").then(|| "/pricing".to_owned())
}

/// Deterministic prompt-to-definition provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockSegmentAssistant;

impl MockSegmentAssistant {
    /// Creates the provider. Patterns are compiled once per process.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Builds the definition without going through the async trait.
    #[must_use]
    pub fn suggest(&self, prompt: &str) -> Value {
        let prompt = prompt.trim().to_lowercase();
        let days = detect_days(&prompt);
        let event_type = detect_event_type(&prompt);

        if let Some(path) = detect_path(&prompt) {
            return json!({
                "kind": "event_property_equals",
                "eventType": event_type,
                "path": PATH_PROPERTY,
                "value": path,
                "days": days,
            });
        }
        if let Some(min_count) = detect_min_count(&prompt) {
            return json!({
                "kind": "event_count_gte_in_last_days",
                "eventType": event_type,
                "days": days,
                "minCount": min_count,
            });
        }
        json!({
            "kind": "event_type_in_last_days",
            "eventType": event_type,
            "days": days,
        })
    }
}

#[async_trait]
impl SegmentAssistant for MockSegmentAssistant {
    async fn suggest_definition(&self, prompt: &str) -> Result<Value, DomainError> {
        let definition = self.suggest(prompt);
        debug!(kind = %definition["kind"], "mock segment suggestion");
        Ok(definition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_from_explicit_phrases() {
        assert_eq!(detect_days("bought in the last 14 days"), 14);
        assert_eq!(detect_days("within 3 days of signup"), 3);
        assert_eq!(detect_days("past 1 day"), 1);
    }

    #[test]
    fn test_days_from_weeks_and_months() {
        assert_eq!(detect_days("active over 2 weeks"), 14);
        assert_eq!(detect_days("logged in this week"), 7);
        assert_eq!(detect_days("purchased last month"), 30);
        assert_eq!(detect_days("everyone who purchased"), 30);
    }

    #[test]
    fn test_min_count_phrases() {
        assert_eq!(detect_min_count("at least 3 visits"), Some(3));
        assert_eq!(detect_min_count("page views >= 5"), Some(5));
        assert_eq!(detect_min_count("more than 2 logins"), Some(3));
        assert_eq!(detect_min_count("any login"), None);
    }

    #[test]
    fn test_event_type_keywords_in_table_order() {
        assert_eq!(detect_event_type("added to cart but never bought"), "add_to_cart");
        assert_eq!(detect_event_type("customers who purchased"), "purchase");
        assert_eq!(detect_event_type("people who signed up"), "signup");
        assert_eq!(detect_event_type("users who logged in"), "login");
        assert_eq!(detect_event_type("started checkout"), "checkout");
        assert_eq!(detect_event_type("anyone at all"), "page_view");
    }

    #[test]
    fn test_event_keywords_match_whole_words_only() {
        assert_eq!(detect_event_type("fans of the cartoon"), "page_view");
        assert_eq!(detect_event_type("visited checkout twice"), "checkout");
        assert_eq!(detect_event_type("left items in the cart"), "add_to_cart");
        assert_eq!(detect_event_type("repeat visits"), "page_view");
    }

    #[test]
    fn test_path_mentions() {
        assert_eq!(detect_path("visited /docs/api recently").as_deref(), Some("/docs/api"));
        assert_eq!(detect_path("looked at pricing").as_deref(), Some("/pricing"));
        assert_eq!(detect_path("logged in 3 times"), None);
    }

    #[test]
    fn test_path_pattern_wins_over_count() {
        let definition = MockSegmentAssistant::new()
            .suggest("Visited /pricing at least 3 times in the last 7 days");

        assert_eq!(
            definition,
            json!({
                "kind": "event_property_equals",
                "eventType": "page_view",
                "path": "path",
                "value": "/pricing",
                "days": 7
            })
        );
    }

    #[test]
    fn test_count_pattern_wins_over_plain_type() {
        let definition = MockSegmentAssistant::new().suggest("Logged in more than 4 times in 2 weeks");

        assert_eq!(
            definition,
            json!({
                "kind": "event_count_gte_in_last_days",
                "eventType": "login",
                "days": 14,
                "minCount": 5
            })
        );
    }

    #[test]
    fn test_plain_type_in_days_is_the_fallback() {
        let definition = MockSegmentAssistant::new().suggest("Customers who purchased");

        assert_eq!(
            definition,
            json!({"kind": "event_type_in_last_days", "eventType": "purchase", "days": 30})
        );
    }

    #[tokio::test]
    async fn test_trait_returns_same_suggestion() {
        let assistant = MockSegmentAssistant::new();

        let definition = assistant.suggest_definition("signed up this week").await.unwrap();

        assert_eq!(definition["kind"], "event_type_in_last_days");
        assert_eq!(definition["eventType"], "signup");
        assert_eq!(definition["days"], 7);
    }
}
