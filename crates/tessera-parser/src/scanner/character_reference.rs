//! [§ 4.1 Character and Entity References](https://www.w3.org/TR/xml/#sec-references)
//!
//! Candidates are anything matching `&#?[A-Za-z0-9_]+;?`. A candidate that
//! cannot be resolved is reported and kept verbatim.

use std::borrow::Cow;

use super::core::Scanner;
use crate::entities::decode_numeric;
use crate::error::ParseError;
use crate::grammar::is_reference;
use crate::handler::ContentHandler;

/// Length in bytes of the reference candidate at the start of `s`, or 0 if
/// the `&` there does not start one.
fn candidate_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 1;
    if bytes.get(i) == Some(&b'#') {
        i += 1;
    }
    let word = bytes[i.min(bytes.len())..]
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
        .count();
    if word == 0 {
        return 0;
    }
    i += word;
    if bytes.get(i) == Some(&b';') {
        i += 1;
    }
    i
}

impl<H: ContentHandler + ?Sized> Scanner<'_, H> {
    /// Replace every reference in `text` with its replacement text.
    pub(super) fn decode_references<'t>(&mut self, text: &'t str) -> Result<Cow<'t, str>, ParseError> {
        if !text.contains('&') {
            return Ok(Cow::Borrowed(text));
        }
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(amp) = rest.find('&') {
            out.push_str(&rest[..amp]);
            let candidate = &rest[amp..];
            let len = candidate_len(candidate);
            if len == 0 {
                out.push('&');
                rest = &candidate[1..];
                continue;
            }
            self.resolve_reference(&candidate[..len], &mut out)?;
            rest = &candidate[len..];
        }
        out.push_str(rest);
        Ok(Cow::Owned(out))
    }

    /// Append the replacement of one reference candidate to `out`.
    fn resolve_reference(&mut self, raw: &str, out: &mut String) -> Result<(), ParseError> {
        let complete: Cow<'_, str> = if raw.ends_with(';') {
            Cow::Borrowed(raw)
        } else if self.is_html {
            // Legacy references without the semicolon are accepted in HTML.
            Cow::Owned(format!("{raw};"))
        } else {
            self.error("EntityRef: expecting ;")?;
            out.push_str(raw);
            return Ok(());
        };

        if !is_reference(&complete) {
            self.error(&format!(
                "entity not matching Reference production: {raw}"
            ))?;
            out.push_str(raw);
            return Ok(());
        }

        let name = &complete[1..complete.len() - 1];
        if let Some(replacement) = self.entities.get(name) {
            out.push_str(replacement);
        } else if name.starts_with('#') {
            if let Some(c) = decode_numeric(name) {
                out.push(c);
            } else {
                self.error(&format!("invalid character reference: {raw}"))?;
                out.push_str(raw);
            }
        } else {
            self.error(&format!("entity not found:{raw}"))?;
            out.push_str(raw);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::candidate_len;

    #[test]
    fn candidates() {
        assert_eq!(candidate_len("&amp; x"), 5);
        assert_eq!(candidate_len("&amp x"), 4);
        assert_eq!(candidate_len("&#x41;"), 6);
        assert_eq!(candidate_len("& x"), 0);
        assert_eq!(candidate_len("&#;"), 0);
        assert_eq!(candidate_len("&"), 0);
    }
}
