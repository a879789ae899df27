//! `application/x-www-form-urlencoded` decoding.
//!
//! Decoding itself is delegated to [`serde_urlencoded`]. That decoder is
//! lenient: a stray `%` is passed through verbatim. Forms coming from the
//! wire are checked first so that malformed input is rejected instead of
//! silently producing a different field value.

use crate::error::FormError;

/// The only media type [`MethodOverride`](crate::middleware::MethodOverride)
/// inspects. Compared byte-for-byte against the `Content-Type` header.
pub const FORM_TYPE: &str = "application/x-www-form-urlencoded";

/// A decoded form: ordered `(key, value)` pairs, duplicates preserved.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Form {
    pairs: Vec<(String, String)>,
}

impl Form {
    /// Decodes `input`, rejecting bad percent-escapes and `;` separators.
    pub fn parse(input: &[u8]) -> Result<Self, FormError> {
        for segment in input.split(|&b| b == b'&') {
            validate_segment(segment)?;
        }
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(input)?;
        Ok(Self { pairs })
    }

    /// First value recorded for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value recorded for `key`, in order of appearance.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs.iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize { self.pairs.len() }
    pub fn is_empty(&self) -> bool { self.pairs.is_empty() }

    /// Appends `other` after `self`, so lookups still prefer `self`.
    pub(crate) fn extend(&mut self, other: Form) {
        self.pairs.extend(other.pairs);
    }
}

fn validate_segment(segment: &[u8]) -> Result<(), FormError> {
    if segment.contains(&b';') {
        return Err(FormError::Semicolon);
    }
    // Key and value are checked separately so the reported escape never
    // spans the `=` between them.
    match segment.iter().position(|&b| b == b'=') {
        Some(eq) => {
            validate_escapes(&segment[..eq])?;
            validate_escapes(&segment[eq + 1..])
        }
        None => validate_escapes(segment),
    }
}

fn validate_escapes(s: &[u8]) -> Result<(), FormError> {
    let mut i = 0;
    while i < s.len() {
        if s[i] != b'%' {
            i += 1;
            continue;
        }
        let valid = i + 2 < s.len()
            && s[i + 1].is_ascii_hexdigit()
            && s[i + 2].is_ascii_hexdigit();
        if !valid {
            let end = (i + 3).min(s.len());
            return Err(FormError::InvalidEscape(
                String::from_utf8_lossy(&s[i..end]).into_owned(),
            ));
        }
        i += 3;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_pairs_in_order() {
        let form = Form::parse(b"_method=PATCH&name=J%C3%BCrgen+Smith&tag=a&tag=b").unwrap();
        assert_eq!(form.get("_method"), Some("PATCH"));
        assert_eq!(form.get("name"), Some("Jürgen Smith"));
        assert_eq!(form.get_all("tag").collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(form.len(), 4);
        assert_eq!(
            form.iter().collect::<Vec<_>>(),
            [("_method", "PATCH"), ("name", "Jürgen Smith"), ("tag", "a"), ("tag", "b")],
        );
    }

    #[test]
    fn empty_input_is_an_empty_form() {
        let form = Form::parse(b"").unwrap();
        assert!(form.is_empty());
        assert_eq!(form.get("_method"), None);
    }

    #[test]
    fn bare_key_has_empty_value() {
        let form = Form::parse(b"flag&x=1").unwrap();
        assert_eq!(form.get("flag"), Some(""));
        assert_eq!(form.get("x"), Some("1"));
    }

    #[test]
    fn rejects_non_hex_escape() {
        let err = Form::parse(b"_method=%zzPATCH").unwrap_err();
        assert_eq!(err, FormError::InvalidEscape("%zz".into()));
        assert_eq!(err.to_string(), r#"invalid URL escape "%zz""#);
    }

    #[test]
    fn rejects_truncated_escape() {
        assert_eq!(
            Form::parse(b"a=1&b=%4").unwrap_err(),
            FormError::InvalidEscape("%4".into()),
        );
        assert_eq!(
            Form::parse(b"a%=1").unwrap_err(),
            FormError::InvalidEscape("%".into()),
        );
    }

    #[test]
    fn rejects_semicolon_separator() {
        let err = Form::parse(b"a=1;_method=PUT").unwrap_err();
        assert_eq!(err, FormError::Semicolon);
        assert_eq!(err.to_string(), "invalid semicolon separator in query");
    }

    #[test]
    fn extend_keeps_first_values_first() {
        let mut body = Form::parse(b"_method=put").unwrap();
        body.extend(Form::parse(b"_method=delete&q=1").unwrap());
        assert_eq!(body.get("_method"), Some("put"));
        assert_eq!(body.get("q"), Some("1"));
    }
}
