//! Text predicates used to classify treatment items.
//!
//! Each predicate is independent so a check keeps its own severity and message.
//!
//! Word boundaries are ASCII-only: any non-ASCII character counts as a separator.

use regex::Regex;
use std::sync::LazyLock;

static DURATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?-u:\b)(?:day|days|week|weeks|for)(?-u:\b)").expect("duration pattern compiles")
});

static INJECTABLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?-u:\b)(?:iv|intravenous|injection|inj)(?-u:\b)").expect("injectable pattern compiles")
});

static PARENTERAL_ROUTE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)iv|intravenous|im|intramuscular").expect("route pattern compiles")
});

static URGENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?-u:\b)(?:stat|immediately|emergency|sos|asap)(?-u:\b)").expect("urgent pattern compiles")
});

/// Lower-case `name` and keep only ASCII letters, digits, whitespace and hyphens, trimmed.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Substring match of any keyword in `haystack`.
pub fn contains_any(haystack: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| haystack.contains(k.as_str()))
}

/// Whole-word mention of a course length ("for", "days", "weeks", ...).
pub fn mentions_duration(text: &str) -> bool {
    DURATION_PATTERN.is_match(text)
}

/// Whole-word mention of IV use or an injection.
pub fn looks_injectable(text: &str) -> bool {
    INJECTABLE_PATTERN.is_match(text)
}

/// Route names an intravenous or intramuscular administration.
pub fn is_parenteral_route(route: &str) -> bool {
    PARENTERAL_ROUTE_PATTERN.is_match(route)
}

/// Whole-word urgency marker such as "stat" or "sos".
pub fn is_urgent(text: &str) -> bool {
    URGENT_PATTERN.is_match(text)
}
