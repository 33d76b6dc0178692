//! URL encoding for entity paths and OData query strings.
//!
//! Entity set names are usually Cyrillic, so paths are percent-encoded as
//! UTF-8. The characters that make up key addressing and navigation,
//! `(`, `)`, `'` and `/`, are kept literal.
//!
//! Query components are encoded RFC 3986 style: a space becomes `%20`, never
//! `+`, because the 1C web server does not treat `+` as a space inside
//! `$filter` expressions.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters escaped in entity paths.
const PATH_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'|')
    .add(b'^')
    .add(b'[')
    .add(b']')
    .add(b'\\');

/// Characters escaped in query names and values. `$` stays literal so
/// system query options read as `$filter`, `$top`, ...
const QUERY_ESCAPE: &AsciiSet = &PATH_ESCAPE
    .add(b'&')
    .add(b'=')
    .add(b'+')
    .add(b';')
    .add(b',')
    .add(b'/')
    .add(b'\'');

/// Percent-encode an entity path such as `Catalog_Товары(guid'…')/Post`.
///
/// # Examples
///
/// ```
/// use onec_odata_core::encoding::encode_path;
///
/// assert_eq!(encode_path("Catalog_Items(guid'1')"), "Catalog_Items(guid'1')");
/// assert_eq!(encode_path("Catalog_Я"), "Catalog_%D0%AF");
/// ```
#[must_use]
pub fn encode_path(path: &str) -> String {
    utf8_percent_encode(path, PATH_ESCAPE).to_string()
}

/// Percent-encode one query-string name or value.
///
/// # Examples
///
/// ```
/// use onec_odata_core::encoding::encode_query_component;
///
/// assert_eq!(encode_query_component("Code eq '001'"), "Code%20eq%20%27001%27");
/// assert_eq!(encode_query_component("$top"), "$top");
/// ```
#[must_use]
pub fn encode_query_component(value: &str) -> String {
    utf8_percent_encode(value, QUERY_ESCAPE).to_string()
}

/// Render `name=value` pairs as a query string without the leading `?`.
#[must_use]
pub fn encode_query(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(name, value)| {
            format!(
                "{}={}",
                encode_query_component(name),
                encode_query_component(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Decode a percent-encoded path or query component.
///
/// Inverse of [`encode_path`] and [`encode_query_component`], for reading
/// back rendered URLs.
///
/// # Examples
///
/// ```
/// use onec_odata_core::encoding::{decode_component, encode_query_component};
///
/// let encoded = encode_query_component("Description eq 'Стол'");
/// assert_eq!(decode_component(&encoded).unwrap(), "Description eq 'Стол'");
/// assert!(decode_component("%FF").is_err());
/// ```
///
/// # Errors
///
/// Returns error if the decoded bytes are not valid UTF-8.
pub fn decode_component(encoded: &str) -> Result<String, EncodingError> {
    percent_decode_str(encoded)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| EncodingError::Utf8Decode(e.to_string()))
}

/// Errors that can occur during decoding.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EncodingError {
    /// UTF-8 decoding failed
    #[error("UTF-8 decode error: {0}")]
    Utf8Decode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_entity_path_unchanged() {
        let path = "Document_Sales(guid'1b4e28ba-2fa1-11d2-883f-0016d3cca427')/Post";
        assert_eq!(encode_path(path), path);
    }

    #[test]
    fn cyrillic_path_roundtrip() {
        let path = "Catalog_Номенклатура(guid'1b4e28ba-2fa1-11d2-883f-0016d3cca427')";
        let encoded = encode_path(path);
        assert!(encoded.is_ascii());
        assert!(encoded.starts_with("Catalog_%D0%9D"));
        assert!(encoded.ends_with("(guid'1b4e28ba-2fa1-11d2-883f-0016d3cca427')"));
        assert_eq!(decode_component(&encoded).unwrap(), path);
    }

    #[test]
    fn path_spaces_and_reserved_chars_escaped() {
        let encoded = encode_path("Catalog_A B?#");
        assert_eq!(encoded, "Catalog_A%20B%3F%23");
    }

    #[test]
    fn query_space_is_percent_twenty() {
        let encoded = encode_query_component("Description eq 'Стол'");
        assert!(!encoded.contains('+'));
        assert!(encoded.starts_with("Description%20eq%20%27"));
        assert_eq!(decode_component(&encoded).unwrap(), "Description eq 'Стол'");
    }

    #[test]
    fn query_separators_escaped() {
        assert_eq!(encode_query_component("a&b=c+d"), "a%26b%3Dc%2Bd");
        assert_eq!(
            encode_query_component("application/json;odata=nometadata"),
            "application%2Fjson%3Bodata%3Dnometadata"
        );
    }

    #[test]
    fn query_string_joins_pairs() {
        let params = vec![
            ("$select".to_string(), "Ref_Key,Description".to_string()),
            ("$top".to_string(), "10".to_string()),
        ];
        assert_eq!(
            encode_query(&params),
            "$select=Ref_Key%2CDescription&$top=10"
        );
        assert_eq!(encode_query(&[]), "");
    }
}
