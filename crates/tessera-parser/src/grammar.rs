//! Productions of the [XML 1.0 grammar](https://www.w3.org/TR/xml/) the
//! scanner checks against.
//!
//! Name productions live in [`tessera_dom::name`] and are shared with the DOM.

pub use tessera_dom::name::{
    is_name_char, is_name_start_char, is_valid_name, is_valid_qname, name_prefix_len,
};

/// [§ 2.3 S](https://www.w3.org/TR/xml/#NT-S): `(#x20 | #x9 | #xD | #xA)+`
#[must_use]
pub const fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Returns true when `s` is empty or only `S`.
#[must_use]
pub fn is_all_whitespace(s: &str) -> bool {
    s.chars().all(is_whitespace)
}

/// Length in bytes of the leading `S` of `s`.
#[must_use]
pub fn whitespace_len(s: &str) -> usize {
    s.len() - s.trim_start_matches(is_whitespace).len()
}

/// [§ 4.1 Reference](https://www.w3.org/TR/xml/#NT-Reference):
/// `EntityRef | CharRef`, where
///
/// ```text
/// EntityRef ::= '&' Name ';'
/// CharRef   ::= '&#' [0-9]+ ';' | '&#x' [0-9a-fA-F]+ ';'
/// ```
#[must_use]
pub fn is_reference(s: &str) -> bool {
    let Some(body) = s.strip_prefix('&').and_then(|s| s.strip_suffix(';')) else {
        return false;
    };
    if let Some(digits) = body.strip_prefix("#x") {
        !digits.is_empty() && digits.chars().all(|c| c.is_ascii_hexdigit())
    } else if let Some(digits) = body.strip_prefix('#') {
        !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
    } else {
        is_valid_name(body)
    }
}

/// The name of an end tag body: `QName S?`.
///
/// Returns the name without trailing whitespace, or `None` if the body does
/// not match.
#[must_use]
pub fn end_tag_name(body: &str) -> Option<&str> {
    let name = body.trim_end_matches(is_whitespace);
    is_valid_qname(name).then_some(name)
}

/// [§ 2.3 PubidChar](https://www.w3.org/TR/xml/#NT-PubidChar)
#[must_use]
pub const fn is_pubid_char(c: char) -> bool {
    matches!(c,
        ' ' | '\r' | '\n' | 'a'..='z' | 'A'..='Z' | '0'..='9'
        | '-' | '\'' | '(' | ')' | '+' | ',' | '.' | '/' | ':'
        | '=' | '?' | ';' | '!' | '*' | '#' | '@' | '$' | '_' | '%')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn references() {
        assert!(is_reference("&amp;"));
        assert!(is_reference("&#38;"));
        assert!(is_reference("&#x26;"));
        assert!(!is_reference("&amp"));
        assert!(!is_reference("&#;"));
        assert!(!is_reference("&#xZ;"));
        assert!(!is_reference("&1abc;"));
    }

    #[test]
    fn end_tags() {
        assert_eq!(end_tag_name("a"), Some("a"));
        assert_eq!(end_tag_name("svg:g \n"), Some("svg:g"));
        assert_eq!(end_tag_name(" a"), None);
        assert_eq!(end_tag_name("a b"), None);
        assert_eq!(end_tag_name(""), None);
    }

    #[test]
    fn pubid_chars() {
        assert!("-//W3C//DTD XHTML 1.0 Strict//EN".chars().all(is_pubid_char));
        assert!(!is_pubid_char('"'));
        assert!(!is_pubid_char('<'));
    }
}
