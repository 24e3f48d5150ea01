//! Utility functions for modeparm

/// Parse an unsigned number: decimal, or hex with a `0x`/`0X` prefix.
pub fn parse_number(s: &str) -> Option<u64> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if hex.is_empty() {
            return None;
        }
        u64::from_str_radix(hex, 16).ok()
    } else if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        s.parse().ok()
    } else {
        None
    }
}

/// Parse a hex number with an optional `0x` prefix.
pub fn parse_hex(s: &str) -> Option<u64> {
    let s = s.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(digits, 16).ok()
}

/// Truncate string to specified length with ellipsis
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        "...".to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("30"), Some(30));
        assert_eq!(parse_number("0x1e"), Some(30));
        assert_eq!(parse_number("0X1E"), Some(30));
        assert_eq!(parse_number("1e"), None);
        assert_eq!(parse_number("0x"), None);
        assert_eq!(parse_number("-1"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("1c"), Some(0x1c));
        assert_eq!(parse_hex("0x08"), Some(8));
        assert_eq!(parse_hex("zz"), None);
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Write cache enable", 40), "Write cache enable");
        assert_eq!(truncate_string("Write cache enable", 8), "Write...");
    }
}
