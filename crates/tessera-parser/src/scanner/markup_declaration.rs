//! Comments, CDATA sections, document type declarations and processing
//! instructions.

use super::core::{Scanner, Step};
use crate::grammar::{is_pubid_char, name_prefix_len, whitespace_len};
use crate::handler::ContentHandler;

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";
const CDATA_START: &str = "<![CDATA[";
const CDATA_END: &str = "]]>";
const DOCTYPE_START: &str = "<!DOCTYPE";
const PI_END: &str = "?>";

impl<'a, H: ContentHandler + ?Sized> Scanner<'a, H> {
    /// Dispatch on the character after `<!`. HTML keywords are
    /// case-insensitive.
    pub(super) fn scan_markup_declaration(&mut self, tag_start: usize) -> Step<usize> {
        let selector = self.source[tag_start + 2..].chars().next();
        let selector = if self.is_html {
            selector.map(|c| c.to_ascii_uppercase())
        } else {
            selector
        };
        match selector {
            Some('-') => self.scan_comment(tag_start),
            Some('[') => self.scan_cdata(tag_start),
            Some('D') => self.scan_doctype(tag_start),
            _ => Err(self.fatal(format!(
                "Not well-formed XML starting with \"<!\" at position {tag_start}"
            ))),
        }
    }

    /// [§ 2.5 Comments](https://www.w3.org/TR/xml/#sec-comments)
    ///
    /// "the string "--" (double-hyphen) MUST NOT occur within comments."
    /// HTML only warns about it.
    fn scan_comment(&mut self, tag_start: usize) -> Step<usize> {
        let source = self.source;
        if !source[tag_start..].starts_with(COMMENT_START) {
            return Err(self.fatal(format!(
                "comment is not well-formed at position {tag_start}"
            )));
        }
        let body_start = tag_start + COMMENT_START.len();
        let Some(close) = source[body_start..].find(COMMENT_END) else {
            return Err(self.fatal(format!(
                "comment is not terminated at position {tag_start}"
            )));
        };
        let text = &source[body_start..body_start + close];

        if text.contains("--") || text.ends_with('-') {
            let message =
                format!("comment must not contain \"--\" at position {tag_start}");
            if self.is_html {
                self.warning(&message)?;
            } else {
                return Err(self.fatal(message));
            }
        }

        self.handler.comment(text)?;
        Ok(body_start + close + COMMENT_END.len())
    }

    /// [§ 2.7 CDATA Sections](https://www.w3.org/TR/xml/#sec-cdata-sect)
    fn scan_cdata(&mut self, tag_start: usize) -> Step<usize> {
        let source = self.source;
        let body_start = tag_start + CDATA_START.len();
        let close = source[tag_start..]
            .starts_with(CDATA_START)
            .then(|| source[body_start..].find(CDATA_END))
            .flatten();
        let Some(close) = close else {
            return Err(self.fatal(format!(
                "Invalid CDATA starting at position {tag_start}"
            )));
        };
        if !self.is_html && self.stack.is_empty() {
            return Err(self.fatal("CDSect is not allowed outside of root element"));
        }

        self.handler.start_cdata()?;
        self.handler
            .characters(&source[body_start..body_start + close])?;
        self.handler.end_cdata()?;
        Ok(body_start + close + CDATA_END.len())
    }

    /// [§ 2.8 Document Type Declaration](https://www.w3.org/TR/xml/#NT-doctypedecl)
    ///
    /// ```text
    /// doctypedecl ::= '<!DOCTYPE' S Name (S ExternalID)? S? ('[' intSubset ']' S?)? '>'
    /// ```
    fn scan_doctype(&mut self, tag_start: usize) -> Step<usize> {
        let source = self.source;
        if self.seen_root {
            return Err(self.fatal(format!(
                "Doctype not allowed inside or after documentElement at position {tag_start}"
            )));
        }

        let keyword = source.get(tag_start..tag_start + DOCTYPE_START.len());
        let keyword_matches = keyword.is_some_and(|k| {
            if self.is_html {
                k.eq_ignore_ascii_case(DOCTYPE_START)
            } else {
                k == DOCTYPE_START
            }
        });
        if !keyword_matches {
            return Err(self.fatal(format!(
                "Expected {DOCTYPE_START} at position {tag_start}"
            )));
        }
        let mut p = tag_start + DOCTYPE_START.len();

        // STEP 1: S Name
        let space = whitespace_len(&source[p..]);
        if space == 0 {
            return Err(self.fatal(format!(
                "Expected whitespace after {DOCTYPE_START} at position {p}"
            )));
        }
        p += space;
        let name_len = name_prefix_len(&source[p..]);
        if name_len == 0 {
            return Err(self.fatal(format!(
                "doctype name missing or contains unexpected characters at position {p}"
            )));
        }
        let name = &source[p..p + name_len];
        p += name_len;
        if self.is_html && !name.eq_ignore_ascii_case("html") {
            self.warning(&format!(
                "Unexpected DOCTYPE in HTML document at position {p}"
            ))?;
        }

        // STEP 2: (S ExternalID)?
        p += whitespace_len(&source[p..]);
        let (public_id, system_id) = self.scan_external_id(&mut p)?;

        // STEP 3: ('[' intSubset ']' S?)?
        p += whitespace_len(&source[p..]);
        let internal_subset = if source[p..].starts_with('[') {
            Some(self.scan_internal_subset(&mut p)?)
        } else {
            None
        };

        // STEP 4: '>'
        p += whitespace_len(&source[p..]);
        if !source[p..].starts_with('>') {
            return Err(self.fatal(format!(
                "doctype not terminated with > at position {p}"
            )));
        }
        p += 1;

        self.handler
            .start_dtd(name, public_id, system_id, internal_subset)?;
        self.handler.end_dtd()?;
        Ok(p)
    }

    /// [§ 4.2.2 ExternalID](https://www.w3.org/TR/xml/#NT-ExternalID)
    ///
    /// ```text
    /// ExternalID ::= 'SYSTEM' S SystemLiteral
    ///              | 'PUBLIC' S PubidLiteral S SystemLiteral
    /// ```
    ///
    /// HTML also accepts lowercase keywords and a public id on its own.
    fn scan_external_id(&mut self, p: &mut usize) -> Step<(Option<&'a str>, Option<&'a str>)> {
        let source = self.source;
        let is_html = self.is_html;
        let at = *p;
        let keyword_at = |keyword: &str| {
            source.get(at..at + keyword.len()).is_some_and(|k| {
                if is_html {
                    k.eq_ignore_ascii_case(keyword)
                } else {
                    k == keyword
                }
            })
        };

        if keyword_at("PUBLIC") {
            *p += "PUBLIC".len();
            self.require_whitespace(p)?;
            let public_id = self.scan_literal(p, is_pubid_char)?;
            let space = whitespace_len(&source[*p..]);
            let quoted = source[*p + space..].starts_with(['"', '\'']);
            if space > 0 && quoted {
                *p += space;
                let system_id = self.scan_literal(p, |_| true)?;
                return Ok((Some(public_id), Some(system_id)));
            }
            if !self.is_html {
                return Err(self.fatal(format!(
                    "doctype external id is not well-formed: system literal expected at position {p}"
                )));
            }
            Ok((Some(public_id), None))
        } else if keyword_at("SYSTEM") {
            *p += "SYSTEM".len();
            self.require_whitespace(p)?;
            let system_id = self.scan_literal(p, |_| true)?;
            Ok((None, Some(system_id)))
        } else {
            Ok((None, None))
        }
    }

    fn require_whitespace(&mut self, p: &mut usize) -> Step<()> {
        let space = whitespace_len(&self.source[*p..]);
        if space == 0 {
            return Err(self.fatal(format!(
                "doctype external id is not well-formed at position {p}"
            )));
        }
        *p += space;
        Ok(())
    }

    /// A quoted literal. Returns the value without its quotes.
    fn scan_literal(&mut self, p: &mut usize, allowed: fn(char) -> bool) -> Step<&'a str> {
        let source = self.source;
        let rest = &source[*p..];
        let literal = rest
            .chars()
            .next()
            .filter(|&c| matches!(c, '"' | '\''))
            .and_then(|quote| rest[1..].find(quote))
            .map(|close| &rest[1..=close])
            .filter(|value| value.chars().all(allowed));
        let Some(value) = literal else {
            return Err(self.fatal(format!(
                "doctype external id is not well-formed at position {p}"
            )));
        };
        *p += value.len() + 2;
        Ok(value)
    }

    /// [§ 2.8 intSubset](https://www.w3.org/TR/xml/#NT-intSubset), kept as
    /// raw text. Quoted literals, comments and processing instructions are
    /// skipped so a `]` inside them does not end the subset.
    fn scan_internal_subset(&mut self, p: &mut usize) -> Step<&'a str> {
        let source = self.source;
        let bytes = source.as_bytes();
        let start = *p + 1;
        let mut i = start;
        let mut depth = 0usize;

        while i < bytes.len() {
            let skip_to = match bytes[i] {
                b'"' | b'\'' if depth > 0 => source[i + 1..]
                    .find(char::from(bytes[i]))
                    .map(|j| i + 1 + j + 1),
                b'<' if source[i..].starts_with(COMMENT_START) => source[i + 4..]
                    .find(COMMENT_END)
                    .map(|j| i + 4 + j + COMMENT_END.len()),
                b'<' if source[i..].starts_with("<?") => source[i + 2..]
                    .find(PI_END)
                    .map(|j| i + 2 + j + PI_END.len()),
                b'<' => {
                    depth += 1;
                    Some(i + 1)
                }
                b'>' => {
                    depth = depth.saturating_sub(1);
                    Some(i + 1)
                }
                b']' if depth == 0 => {
                    *p = i + 1;
                    return Ok(&source[start..i]);
                }
                _ => Some(i + 1),
            };
            match skip_to {
                Some(next) => i = next,
                None => break,
            }
        }
        Err(self.fatal(format!(
            "doctype internal subset is not well-formed at position {start}"
        )))
    }

    /// [§ 2.6 Processing Instructions](https://www.w3.org/TR/xml/#sec-pi)
    ///
    /// ```text
    /// PI ::= '<?' PITarget (S (Char* - (Char* '?>' Char*)))? '?>'
    /// ```
    pub(super) fn scan_processing_instruction(&mut self, tag_start: usize) -> Step<usize> {
        let source = self.source;
        let body_start = tag_start + 2;
        let Some(close) = source[body_start..].find(PI_END) else {
            return Err(self.fatal("Missing end of processing instruction"));
        };
        let body = &source[body_start..body_start + close];

        let target_len = name_prefix_len(body);
        let rest = &body[target_len..];
        let space = whitespace_len(rest);
        if target_len == 0 || (space == 0 && !rest.is_empty()) {
            return Err(self.fatal(format!(
                "processing instruction is not well-formed at position {tag_start}"
            )));
        }

        self.handler
            .processing_instruction(&body[..target_len], &rest[space..])?;
        Ok(body_start + close + PI_END.len())
    }
}
