//! Country code to flag emoji

/// Offset from an uppercase ASCII letter to its regional indicator symbol.
const REGIONAL_INDICATOR_OFFSET: u32 = 0x1F1E6 - 'A' as u32;

/// Convert an ISO 3166-1 alpha-2 code to its flag emoji.
///
/// Returns `None` for anything that is not exactly two ASCII letters.
pub fn country_flag(iso_code2: &str) -> Option<String> {
    let code = iso_code2.trim();
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    code.chars()
        .map(|c| char::from_u32(c.to_ascii_uppercase() as u32 + REGIONAL_INDICATOR_OFFSET))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_flags() {
        assert_eq!(country_flag("fr").as_deref(), Some("🇫🇷"));
        assert_eq!(country_flag("GB").as_deref(), Some("🇬🇧"));
        assert_eq!(country_flag(" it ").as_deref(), Some("🇮🇹"));
    }

    #[test]
    fn rejects_malformed_codes() {
        assert_eq!(country_flag(""), None);
        assert_eq!(country_flag("FRA"), None);
        assert_eq!(country_flag("F1"), None);
        assert_eq!(country_flag("é"), None);
    }
}
