//! Character classes for XML names.
//!
//! [XML 1.0 § 2.3 Common Syntactic Constructs](https://www.w3.org/TR/xml/#NT-Name)
//! and [Namespaces in XML § 3](https://www.w3.org/TR/xml-names/#NT-QName).
//!
//! These predicates are shared by the DOM factory methods (which validate
//! names passed by callers) and by the markup scanner.

/// [§ 2.3 NameStartChar](https://www.w3.org/TR/xml/#NT-NameStartChar)
#[must_use]
pub const fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | 'A'..='Z' | '_' | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

/// [§ 2.3 NameChar](https://www.w3.org/TR/xml/#NT-NameChar)
#[must_use]
pub const fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}'
            | '\u{300}'..='\u{36F}'
            | '\u{203F}'..='\u{2040}')
}

/// [§ 2.2 Char](https://www.w3.org/TR/xml/#NT-Char)
#[must_use]
pub const fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\u{9}' | '\u{A}' | '\u{D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

/// [§ 2.3 S](https://www.w3.org/TR/xml/#NT-S): `(#x20 | #x9 | #xD | #xA)+`
#[must_use]
pub const fn is_xml_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Returns true if `s` matches the `Name` production.
#[must_use]
pub fn is_valid_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if is_name_start_char(first) => chars.all(is_name_char),
        _ => false,
    }
}

/// Returns true if `s` matches the `NCName` production (a Name without `:`).
#[must_use]
pub fn is_valid_ncname(s: &str) -> bool {
    !s.contains(':') && is_valid_name(s)
}

/// Returns true if `s` matches the `QName` production: `(NCName ':')? NCName`.
#[must_use]
pub fn is_valid_qname(s: &str) -> bool {
    match s.split_once(':') {
        Some((prefix, local)) => is_valid_ncname(prefix) && is_valid_ncname(local),
        None => is_valid_ncname(s),
    }
}

/// Length in bytes of the longest `Name` at the start of `s`, or 0.
#[must_use]
pub fn name_prefix_len(s: &str) -> usize {
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, c)) if is_name_start_char(c) => {}
        _ => return 0,
    }
    for (i, c) in chars {
        if !is_name_char(c) {
            return i;
        }
    }
    s.len()
}

/// Split a qualified name into `(prefix, local_name)`.
///
/// Only the first `:` separates; names without one have no prefix.
#[must_use]
pub fn split_qname(qualified_name: &str) -> (Option<&str>, &str) {
    match qualified_name.split_once(':') {
        Some((prefix, local)) if !prefix.is_empty() => (Some(prefix), local),
        _ => (None, qualified_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        assert!(is_valid_name("a"));
        assert!(is_valid_name("_x.y-z"));
        assert!(is_valid_name("a:b:c"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("1a"));
        assert!(!is_valid_name("a b"));
        assert!(is_valid_name("é"));
    }

    #[test]
    fn qnames() {
        assert!(is_valid_qname("svg:rect"));
        assert!(is_valid_qname("rect"));
        assert!(!is_valid_qname("a:b:c"));
        assert!(!is_valid_qname(":a"));
        assert!(!is_valid_qname("a:"));
    }

    #[test]
    fn name_prefix() {
        assert_eq!(name_prefix_len("abc def"), 3);
        assert_eq!(name_prefix_len("x:y>"), 3);
        assert_eq!(name_prefix_len(" abc"), 0);
        assert_eq!(name_prefix_len("abc"), 3);
    }

    #[test]
    fn split() {
        assert_eq!(split_qname("a:b"), (Some("a"), "b"));
        assert_eq!(split_qname("b"), (None, "b"));
    }
}
