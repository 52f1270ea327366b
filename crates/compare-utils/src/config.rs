//! Environment lookup helpers used by configuration loaders

use std::str::FromStr;

/// Read a non-empty environment variable.
pub fn env_string(key: &str) -> Option<String> {
    lookup_string(|k| std::env::var(k).ok(), key)
}

/// Read and parse an environment variable, ignoring unparseable values.
pub fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    lookup_parse(|k| std::env::var(k).ok(), key)
}

/// Like [`env_string`], reading from `lookup` instead of the process environment.
pub fn lookup_string<F>(lookup: F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Like [`env_parse`], reading from `lookup` instead of the process environment.
pub fn lookup_parse<T, F>(lookup: F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup_string(lookup, key)?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("Ignoring unparseable value for {}: {:?}", key, raw);
            None
        }
    }
}

/// Read a boolean flag (`1`, `true`, `yes`, `on`).
pub fn env_flag(key: &str) -> bool {
    env_string(key).is_some_and(|v| {
        matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_variable() {
        assert_eq!(env_string("COMPARE_UTILS_TEST_SURELY_UNSET"), None);
        assert_eq!(env_parse::<u32>("COMPARE_UTILS_TEST_SURELY_UNSET"), None);
        assert!(!env_flag("COMPARE_UTILS_TEST_SURELY_UNSET"));
    }

    #[test]
    fn test_lookup_trims_and_parses() {
        let lookup = |key: &str| match key {
            "RETRIES" => Some(" 4 ".to_string()),
            "BLANK" => Some("   ".to_string()),
            "GARBAGE" => Some("four".to_string()),
            _ => None,
        };
        assert_eq!(lookup_string(lookup, "RETRIES").as_deref(), Some("4"));
        assert_eq!(lookup_string(lookup, "BLANK"), None);
        assert_eq!(lookup_parse::<u32, _>(lookup, "RETRIES"), Some(4));
        assert_eq!(lookup_parse::<u32, _>(lookup, "GARBAGE"), None);
    }
}
