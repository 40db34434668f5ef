//! Runtime configuration for the converter.
//!
//! Every value has a compile-time default and can be overridden by an
//! environment variable. Command-line flags take precedence over both.

/// Resolve SAN by taking the first matching piece unless strict mode is on.
const DEFAULT_STRICT: bool = false;

/// Number of threads used to convert PGN lines.
const DEFAULT_WORKERS: usize = 1;

/// Whether SAN resolution should reject ambiguous moves.
///
/// Priority:
/// 1. `PGNCONV_STRICT` env variable if set to a recognised boolean
///    (`1`/`true`/`yes`/`on` or `0`/`false`/`no`/`off`)
/// 2. `false` as fallback
pub fn get_strict() -> bool {
    std::env::var("PGNCONV_STRICT")
        .ok()
        .and_then(|value| parse_flag(&value))
        .unwrap_or(DEFAULT_STRICT)
}

/// Number of worker threads for PGN conversion.
///
/// Priority:
/// 1. `PGNCONV_WORKERS` env variable if set (falls back to the default if the
///    value is not a positive integer)
/// 2. `1` as fallback
pub fn get_workers() -> usize {
    if let Ok(workers) = std::env::var("PGNCONV_WORKERS") {
        return parse_workers(&workers).unwrap_or(DEFAULT_WORKERS);
    }

    DEFAULT_WORKERS
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_workers(value: &str) -> Option<usize> {
    value.trim().parse().ok().filter(|&n| n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_strict() {
        let strict = get_strict();
        match std::env::var("PGNCONV_STRICT").ok().and_then(|v| parse_flag(&v)) {
            Some(val) => assert_eq!(strict, val),
            None => assert_eq!(strict, DEFAULT_STRICT),
        }
    }

    #[test]
    fn test_get_workers() {
        let workers = get_workers();
        match std::env::var("PGNCONV_WORKERS").ok().and_then(|v| parse_workers(&v)) {
            Some(val) => assert_eq!(workers, val),
            None => assert_eq!(workers, DEFAULT_WORKERS),
        }
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" 1 "), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_parse_workers_rejects_zero_and_garbage() {
        assert_eq!(parse_workers("4"), Some(4));
        assert_eq!(parse_workers("0"), None);
        assert_eq!(parse_workers("-2"), None);
        assert_eq!(parse_workers("many"), None);
    }
}
