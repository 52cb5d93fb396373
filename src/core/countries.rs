//! Country classification used for recipient rules.
//!
//! Spain is the only domestic country; EU membership decides whether a
//! recipient must carry a tax id and whether the VAT id gets the country prefix.

/// ISO 3166-1 alpha-2 code of the domestic country.
pub const DOMESTIC_COUNTRY: &str = "ES";

/// Whether `code` is the domestic country.
pub fn is_domestic(code: &str) -> bool {
    code == DOMESTIC_COUNTRY
}

/// Whether `code` is an EU member state.
///
/// Greece is accepted under both its ISO code (`GR`) and its VIES prefix (`EL`).
pub fn is_eu_member(code: &str) -> bool {
    EU_MEMBERS.binary_search(&code).is_ok()
}

/// EU member states, sorted for binary search.
static EU_MEMBERS: &[&str] = &[
    "AT", "BE", "BG", "CY", "CZ", "DE", "DK", "EE", "EL", "ES", "FI", "FR", "GR", "HR", "HU", "IE",
    "IT", "LT", "LU", "LV", "MT", "NL", "PL", "PT", "RO", "SE", "SI", "SK",
];

/// Normalize a user-supplied country code: trimmed and upper-cased.
pub fn normalize_country(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eu_members() {
        assert!(is_eu_member("DE"));
        assert!(is_eu_member("ES"));
        assert!(is_eu_member("PL"));
        assert!(is_eu_member("EL"));
        assert!(!is_eu_member("GB"));
        assert!(!is_eu_member("US"));
        assert!(!is_eu_member("de"));
    }

    #[test]
    fn list_is_sorted() {
        for window in EU_MEMBERS.windows(2) {
            assert!(
                window[0] < window[1],
                "country codes not sorted: {} >= {}",
                window[0],
                window[1]
            );
        }
    }

    #[test]
    fn normalization() {
        assert_eq!(normalize_country(" es "), "ES");
        assert!(is_domestic(&normalize_country("es")));
    }
}
