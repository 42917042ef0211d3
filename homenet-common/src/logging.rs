//! Tracing subscriber setup
//!
//! `RUST_LOG` takes precedence when present. Otherwise the configured level
//! (`DEBUG`, `INFO`, `WARN`, `ERROR`, any case) applies to the homenet crates
//! and the HTTP trace layer.

use tracing::{warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const TRACED_TARGETS: &[&str] = &["homenet_server", "homenet_common", "tower_http"];

/// Parse a configured log level name
pub fn parse_level(level: &str) -> Option<Level> {
    match level.trim().to_ascii_uppercase().as_str() {
        "TRACE" => Some(Level::TRACE),
        "DEBUG" => Some(Level::DEBUG),
        "INFO" => Some(Level::INFO),
        "WARN" | "WARNING" => Some(Level::WARN),
        "ERROR" => Some(Level::ERROR),
        _ => None,
    }
}

/// Filter directives for the given level, e.g. `homenet_server=info,...`
pub fn filter_directives(level: Level) -> String {
    let level = level.to_string().to_ascii_lowercase();
    TRACED_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global subscriber
///
/// Unknown level names fall back to INFO with a warning once the subscriber is up.
pub fn init_tracing(level: &str) {
    let parsed = parse_level(level);

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter_directives(parsed.unwrap_or(Level::INFO)).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if parsed.is_none() {
        warn!("Unknown log level '{}', using INFO", level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level_is_case_insensitive() {
        assert_eq!(parse_level("debug"), Some(Level::DEBUG));
        assert_eq!(parse_level("INFO"), Some(Level::INFO));
        assert_eq!(parse_level(" Warn "), Some(Level::WARN));
        assert_eq!(parse_level("ERROR"), Some(Level::ERROR));
        assert_eq!(parse_level("verbose"), None);
    }

    #[test]
    fn test_filter_directives() {
        assert_eq!(
            filter_directives(Level::WARN),
            "homenet_server=warn,homenet_common=warn,tower_http=warn"
        );
    }
}
