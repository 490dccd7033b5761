//! HTML element categories used by the scanner and the serializer.
//!
//! [§ 13.1.2 Elements](https://html.spec.whatwg.org/multipage/syntax.html#elements-2)

/// [§ 13.1.2 Void elements](https://html.spec.whatwg.org/multipage/syntax.html#void-elements)
///
/// "area, base, br, col, embed, hr, img, input, link, meta, source, track, wbr"
///
/// The obsolete `basefont`, `bgsound`, `frame`, `keygen` and `param` are
/// included because browsers still treat them as void.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// [§ 13.1.2 Raw text elements](https://html.spec.whatwg.org/multipage/syntax.html#raw-text-elements)
///
/// "script, style"
pub const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// [§ 13.1.2 Escapable raw text elements](https://html.spec.whatwg.org/multipage/syntax.html#escapable-raw-text-elements)
///
/// "textarea, title"
pub const ESCAPABLE_RAW_TEXT_ELEMENTS: &[&str] = &["textarea", "title"];

/// Case-insensitive membership test for the tables above.
fn contains_ignore_case(table: &[&str], name: &str) -> bool {
    table.iter().any(|t| t.eq_ignore_ascii_case(name))
}

/// Returns true for void elements.
#[must_use]
pub fn is_void_element(name: &str) -> bool {
    contains_ignore_case(VOID_ELEMENTS, name)
}

/// Returns true for `script` and `style`.
#[must_use]
pub fn is_raw_text_element(name: &str) -> bool {
    contains_ignore_case(RAW_TEXT_ELEMENTS, name)
}

/// Returns true for `textarea` and `title`.
#[must_use]
pub fn is_escapable_raw_text_element(name: &str) -> bool {
    contains_ignore_case(ESCAPABLE_RAW_TEXT_ELEMENTS, name)
}

/// Returns true for either kind of element whose content is not markup.
#[must_use]
pub fn has_text_content_only(name: &str) -> bool {
    is_raw_text_element(name) || is_escapable_raw_text_element(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        assert!(is_void_element("IMG"));
        assert!(!is_void_element("div"));
        assert!(is_raw_text_element("Script"));
        assert!(is_escapable_raw_text_element("title"));
        assert!(has_text_content_only("style"));
        assert!(!has_text_content_only("p"));
    }
}
