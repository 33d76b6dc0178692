//! GUID validation for entity keys.
//!
//! 1C addresses a single object as `Catalog_X(guid'…')`. The key must be the
//! canonical 8-4-4-4-12 hyphenated hex form; braces, URNs and the compact
//! 32-digit form are rejected. Casing is accepted as given and never
//! normalized, so the caller's string goes to the wire unchanged.

use regex::Regex;
use std::sync::OnceLock;

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
            .expect("GUID pattern is valid")
    })
}

/// Check whether `guid` is absent or a well-formed GUID.
///
/// An absent key is the valid "no id" state used by list reads and creates.
///
/// # Examples
///
/// ```
/// use onec_odata_core::guid::is_valid;
///
/// assert!(is_valid(None));
/// assert!(is_valid(Some("1B4E28BA-2FA1-11D2-883F-0016D3CCA427")));
/// assert!(!is_valid(Some("not-a-guid")));
/// ```
#[must_use]
pub fn is_valid(guid: Option<&str>) -> bool {
    guid.map_or(true, |g| pattern().is_match(g))
}

/// Fail-fast form of [`is_valid`].
///
/// # Errors
///
/// Returns [`GuidError::InvalidFormat`] carrying the rejected input.
pub fn ensure_valid(guid: Option<&str>) -> Result<(), GuidError> {
    match guid {
        Some(g) if !pattern().is_match(g) => Err(GuidError::InvalidFormat(g.to_string())),
        _ => Ok(()),
    }
}

/// Errors raised by GUID validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuidError {
    /// The value is not an 8-4-4-4-12 hex GUID
    #[error("invalid GUID format: {0:?}")]
    InvalidFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn absent_is_valid() {
        assert!(is_valid(None));
        assert!(ensure_valid(None).is_ok());
    }

    #[test]
    fn random_guids_are_valid_in_any_case() {
        for _ in 0..32 {
            let guid = Uuid::new_v4().to_string();
            assert!(is_valid(Some(&guid)), "{guid}");
            assert!(is_valid(Some(&guid.to_uppercase())), "{guid}");
        }
    }

    #[test]
    fn nil_guid_is_valid() {
        assert!(is_valid(Some("00000000-0000-0000-0000-000000000000")));
    }

    #[test]
    fn malformed_values_are_rejected() {
        for value in [
            "",
            "bad-guid",
            "1b4e28ba2fa111d2883f0016d3cca427",
            "{1b4e28ba-2fa1-11d2-883f-0016d3cca427}",
            "urn:uuid:1b4e28ba-2fa1-11d2-883f-0016d3cca427",
            "1b4e28ba-2fa1-11d2-883f-0016d3cca42",
            "1b4e28ba-2fa1-11d2-883f-0016d3cca4277",
            "g b4e28ba-2fa1-11d2-883f-0016d3cca427",
            "xx1b4e28ba-2fa1-11d2-883f-0016d3cca427",
            "1b4e28ba-2fa1-11d2-883f-0016d3cca427 ",
            "1b4e28ba_2fa1_11d2_883f_0016d3cca427",
        ] {
            assert!(!is_valid(Some(value)), "{value:?} should be rejected");
        }
    }

    #[test]
    fn ensure_valid_reports_input() {
        let err = ensure_valid(Some("bad-guid")).unwrap_err();
        assert_eq!(err, GuidError::InvalidFormat("bad-guid".to_string()));
        assert!(err.to_string().contains("bad-guid"));
    }
}
