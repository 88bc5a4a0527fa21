//! Field extraction shared by the platform parsers.

use std::sync::LazyLock;

use regex::Regex;

static TRAILING_PORT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r":(\d+)$").unwrap());

/// Extract the port from the end of an address field.
///
/// Handles `127.0.0.1:3000`, `*:8080`, `[::1]:3000` and scoped forms like
/// `127.0.0.53%lo:53`. Values that do not fit a `u16` are rejected.
pub fn trailing_port(address: &str) -> Option<u16> {
    let caps = TRAILING_PORT.captures(address)?;
    caps[1].parse().ok()
}

/// Parse a PID column. Non-numeric values yield `None`.
pub fn parse_pid(field: &str) -> Option<u32> {
    field.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_port() {
        assert_eq!(trailing_port("127.0.0.1:3000"), Some(3000));
        assert_eq!(trailing_port("*:8080"), Some(8080));
        assert_eq!(trailing_port("[::1]:3000"), Some(3000));
        assert_eq!(trailing_port("[::ffff:127.0.0.1]:63342"), Some(63342));
        assert_eq!(trailing_port("127.0.0.53%lo:53"), Some(53));
    }

    #[test]
    fn test_trailing_port_rejects_garbage() {
        assert_eq!(trailing_port("0.0.0.0:*"), None);
        assert_eq!(trailing_port("Address:Port"), None);
        assert_eq!(trailing_port("3000"), None);
        assert_eq!(trailing_port("*:70000"), None);
        assert_eq!(trailing_port("(LISTEN)"), None);
    }

    #[test]
    fn test_parse_pid() {
        assert_eq!(parse_pid("1234"), Some(1234));
        assert_eq!(parse_pid("PID"), None);
        assert_eq!(parse_pid("-1"), None);
    }
}
