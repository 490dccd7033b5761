//! [§ 3.1 Start-Tags](https://www.w3.org/TR/xml/#sec-starttags), scanned
//! leniently enough to accept unquoted and valueless HTML attributes.

use std::rc::Rc;

use strum_macros::Display;
use tessera_dom::html;
use tessera_dom::name::split_qname;
use tessera_dom::namespace;

use super::core::{OpenElement, Scanner, Step};
use super::helpers::syntax;
use crate::error::ParseError;
use crate::grammar::is_valid_qname;
use crate::handler::{AttributeToken, ContentHandler, ElementAttributes};

/// States of the start tag state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum StartTagState {
    /// Reading the tag name.
    TagName,
    /// Reading an attribute name.
    AttributeName,
    /// Whitespace after an attribute name.
    AfterAttributeName,
    /// After `=`, before the value.
    Equals,
    /// Reading an unquoted value.
    UnquotedValue,
    /// Just after a quoted value.
    AfterAttributeValue,
    /// Whitespace between attributes.
    BeforeAttribute,
    /// After `/`, expecting `>`.
    SelfClosing,
}

/// A scanned start tag.
#[derive(Debug, Default)]
pub(super) struct StartTag {
    pub(super) name: Option<String>,
    pub(super) attributes: ElementAttributes,
    pub(super) closed: bool,
}

impl StartTag {
    fn set_name(&mut self, name: &str) -> Step<()> {
        if !is_valid_qname(name) {
            return Err(syntax(format!("invalid tagName:{name}")));
        }
        self.name = Some(name.to_string());
        Ok(())
    }
}

impl<H: ContentHandler + ?Sized> Scanner<'_, H> {
    /// A start or empty-element tag at `tag_start`, plus the raw text content
    /// of HTML `script`, `style`, `textarea` and `title`.
    pub(super) fn scan_element(&mut self, tag_start: usize) -> Step<usize> {
        let (mut tag, end) = self.scan_start_tag(tag_start)?;
        let Some(name) = tag.name.take() else {
            return Err(syntax("invalid tagName:"));
        };

        if self.track_locations {
            for token in tag.attributes.tokens_mut() {
                token.location = self.location(token.offset);
            }
        }

        if self.is_html && !tag.closed {
            if html::is_void_element(&name) {
                tag.closed = true;
            } else if !html::has_text_content_only(&name) && self.lacks_end_tag(&name, end) {
                // No end tag anywhere after this one; close it right away.
                tag.closed = true;
            }
        }

        let closed = tag.closed;
        self.append_element(&name, tag)?;

        if self.is_html && !closed && html::has_text_content_only(&name) {
            return self.scan_raw_text(&name, end);
        }
        Ok(end + 1)
    }

    /// Run the state machine from `tag_start` to the closing `>` (or the end
    /// of input). Returns the tag and the offset of the `>`.
    fn scan_start_tag(&mut self, tag_start: usize) -> Step<(StartTag, usize)> {
        let source = self.source;
        let mut tag = StartTag::default();
        let mut state = StartTagState::TagName;
        let mut start = tag_start + 1;
        let mut p = start;
        let mut attr_name = "";

        loop {
            let Some(c) = source[p..].chars().next() else {
                self.error("unexpected end of input")?;
                if state == StartTagState::TagName {
                    tag.set_name(&source[start..p])?;
                }
                return Ok((tag, p));
            };

            match c {
                '=' => match state {
                    StartTagState::AttributeName => {
                        attr_name = &source[start..p];
                        state = StartTagState::Equals;
                    }
                    StartTagState::AfterAttributeName => state = StartTagState::Equals,
                    _ => return Err(syntax("attribute equal must after attrName")),
                },
                '\'' | '"' => match state {
                    StartTagState::Equals | StartTagState::AttributeName => {
                        if state == StartTagState::AttributeName {
                            self.warning("attribute value must after \"=\"")?;
                            attr_name = &source[start..p];
                        }
                        start = p + 1;
                        let Some(close) = source[start..].find(c) else {
                            return Err(syntax(format!("attribute value no end '{c}' match")));
                        };
                        p = start + close;
                        self.add_attribute(&mut tag, attr_name, &source[start..p], start - 1)?;
                        state = StartTagState::AfterAttributeValue;
                    }
                    StartTagState::UnquotedValue => {
                        self.add_attribute(&mut tag, attr_name, &source[start..p], start)?;
                        self.warning(&format!(
                            "attribute \"{attr_name}\" missed start quot({c})!!"
                        ))?;
                        start = p + 1;
                        state = StartTagState::AfterAttributeValue;
                    }
                    _ => return Err(syntax("attribute value must after \"=\"")),
                },
                '/' => match state {
                    StartTagState::TagName => {
                        tag.set_name(&source[start..p])?;
                        state = StartTagState::SelfClosing;
                        tag.closed = true;
                    }
                    StartTagState::AfterAttributeValue
                    | StartTagState::BeforeAttribute
                    | StartTagState::SelfClosing => {
                        state = StartTagState::SelfClosing;
                        tag.closed = true;
                    }
                    // Part of the name or value; a trailing one is handled at `>`.
                    StartTagState::UnquotedValue | StartTagState::AttributeName => {}
                    StartTagState::AfterAttributeName => tag.closed = true,
                    StartTagState::Equals => {
                        return Err(syntax("attribute invalid close char('/')"));
                    }
                },
                '>' => {
                    match state {
                        StartTagState::TagName => tag.set_name(&source[start..p])?,
                        StartTagState::AfterAttributeValue
                        | StartTagState::BeforeAttribute
                        | StartTagState::SelfClosing => {}
                        StartTagState::UnquotedValue
                        | StartTagState::AttributeName
                        | StartTagState::AfterAttributeName => {
                            let value = if state == StartTagState::AfterAttributeName {
                                attr_name
                            } else {
                                let raw = &source[start..p];
                                if let Some(stripped) = raw.strip_suffix('/') {
                                    tag.closed = true;
                                    stripped
                                } else {
                                    raw
                                }
                            };
                            if state == StartTagState::UnquotedValue {
                                self.warning(&format!("attribute \"{value}\" missed quot(\")!"))?;
                                self.add_attribute(&mut tag, attr_name, value, start)?;
                            } else {
                                if !self.is_html {
                                    self.warning(&format!(
                                        "attribute \"{value}\" missed value!! \"{value}\" instead!!"
                                    ))?;
                                }
                                self.add_attribute(&mut tag, value, value, start)?;
                            }
                        }
                        StartTagState::Equals => {
                            if !self.is_html {
                                return Err(self.fatal("AttValue: ' or \" expected"));
                            }
                        }
                    }
                    return Ok((tag, p));
                }
                other => {
                    // U+0080 separates attributes like a space.
                    let other = if other == '\u{80}' { ' ' } else { other };
                    if other <= ' ' {
                        match state {
                            StartTagState::TagName => {
                                tag.set_name(&source[start..p])?;
                                state = StartTagState::BeforeAttribute;
                            }
                            StartTagState::AttributeName => {
                                attr_name = &source[start..p];
                                state = StartTagState::AfterAttributeName;
                            }
                            StartTagState::UnquotedValue => {
                                let value = &source[start..p];
                                self.warning(&format!("attribute \"{value}\" missed quot(\")!!"))?;
                                self.add_attribute(&mut tag, attr_name, value, start)?;
                                state = StartTagState::BeforeAttribute;
                            }
                            StartTagState::AfterAttributeValue => {
                                state = StartTagState::BeforeAttribute;
                            }
                            _ => {}
                        }
                    } else {
                        match state {
                            StartTagState::AfterAttributeName => {
                                if !self.is_html {
                                    self.warning(&format!(
                                        "attribute \"{attr_name}\" missed value!! \"{attr_name}\" instead2!!"
                                    ))?;
                                }
                                self.add_attribute(&mut tag, attr_name, attr_name, start)?;
                                start = p;
                                state = StartTagState::AttributeName;
                            }
                            StartTagState::AfterAttributeValue => {
                                self.warning(&format!(
                                    "attribute space is required\"{attr_name}\"!!"
                                ))?;
                                start = p;
                                state = StartTagState::AttributeName;
                            }
                            StartTagState::BeforeAttribute => {
                                start = p;
                                state = StartTagState::AttributeName;
                            }
                            StartTagState::Equals => {
                                start = p;
                                state = StartTagState::UnquotedValue;
                            }
                            StartTagState::SelfClosing => {
                                return Err(syntax(
                                    "elements closed character '/' and '>' must be connected to",
                                ));
                            }
                            _ => {}
                        }
                    }
                }
            }
            p += c.len_utf8();
        }
    }

    /// [§ 3.1 Attribute](https://www.w3.org/TR/xml/#NT-Attribute) with
    /// [§ 3.3.3 Attribute-Value Normalization](https://www.w3.org/TR/xml/#AVNormalize).
    fn add_attribute(
        &mut self,
        tag: &mut StartTag,
        qname: &str,
        value: &str,
        offset: usize,
    ) -> Step<()> {
        if tag.attributes.contains(qname) {
            return Err(self.fatal(format!("Attribute {qname} redefined")));
        }
        if !self.is_html && value.contains('<') {
            return Err(self.fatal("Unescaped '<' not allowed in attributes values"));
        }
        let normalized = value.replace(['\t', '\n', '\r'], " ");
        let decoded = self.decode_references(&normalized)?.into_owned();
        tag.attributes
            .push(AttributeToken::new(qname.to_string(), decoded, offset));
        Ok(())
    }

    /// Resolve namespaces for the tag and its attributes, report the start
    /// (and, for empty elements, the end) to the handler, and push a frame
    /// for elements that stay open.
    fn append_element(&mut self, qname: &str, mut tag: StartTag) -> Result<(), ParseError> {
        let mut namespaces = self.current_namespaces();
        let mut declared: Vec<String> = Vec::new();

        // STEP 1: Declarations. Walking backwards makes the first declaration
        //         of a prefix the one that sticks.
        for token in tag.attributes.tokens_mut().iter_mut().rev() {
            let (prefix, local_name) = split_qname(&token.qname);
            let declaration = match prefix {
                Some("xmlns") => Some(local_name),
                None if token.qname == "xmlns" => Some(""),
                _ => None,
            };
            token.prefix = prefix.map(str::to_string);
            token.local_name = local_name.to_string();

            if let Some(declaration) = declaration {
                let declaration = declaration.to_string();
                let _ = Rc::make_mut(&mut namespaces).insert(declaration.clone(), token.value.clone());
                token.uri = Some(namespace::XMLNS.to_string());
                self.handler
                    .start_prefix_mapping(&declaration, &token.value)?;
                if !declared.contains(&declaration) {
                    declared.push(declaration);
                }
            }
        }

        // STEP 2: Prefixed attributes take their prefix's binding. Unprefixed
        //         ones stay in no namespace.
        for token in tag.attributes.tokens_mut() {
            token.uri = match token.prefix.as_deref() {
                Some("xmlns") => continue,
                Some("xml") => Some(
                    namespaces
                        .get("xml")
                        .unwrap_or(namespace::XML)
                        .to_string(),
                ),
                Some(prefix) => namespaces.get(prefix).map(str::to_string),
                None => continue,
            };
        }

        // STEP 3: The element takes its prefix's binding, or the default.
        let (prefix, local_name) = split_qname(qname);
        let uri = namespaces.get(prefix.unwrap_or("")).map(str::to_string);

        if self.stack.is_empty() {
            self.seen_root = true;
        }
        self.handler
            .start_element(uri.as_deref(), local_name, qname, &tag.attributes)?;

        if tag.closed {
            self.handler
                .end_element(uri.as_deref(), local_name, qname)?;
            for prefix in &declared {
                self.handler.end_prefix_mapping(prefix)?;
            }
        } else {
            self.stack.push(OpenElement {
                qname: qname.to_string(),
                local_name: local_name.to_string(),
                uri,
                namespaces,
                declared,
            });
        }
        Ok(())
    }

    /// Heuristic for unclosed HTML elements: true when no `</name` occurs
    /// after the start tag ending at `end`.
    fn lacks_end_tag(&mut self, name: &str, end: usize) -> bool {
        let key = name.to_ascii_lowercase();
        let position = if let Some(&cached) = self.close_positions.get(&key) {
            cached
        } else {
            let lowered = self.lowered();
            let mut position = lowered.rfind(&format!("</{key}>"));
            if position.is_none_or(|p| p < end) {
                position = lowered.rfind(&format!("</{key}"));
            }
            let _ = self.close_positions.insert(key, position);
            position
        };
        position.is_none_or(|p| p < end)
    }

    /// Content of a raw text element, up to its end tag. Only escapable raw
    /// text (`textarea`, `title`) has references decoded.
    fn scan_raw_text(&mut self, name: &str, end: usize) -> Step<usize> {
        let source = self.source;
        let content_start = (end + 1).min(source.len());
        let needle = format!("</{}>", name.to_ascii_lowercase());
        let found = self.lowered()[content_start..]
            .find(&needle)
            .map(|i| content_start + i);
        let content_end = match found {
            Some(position) => position,
            None => {
                self.warning(&format!(
                    "end tag </{name}> not found, reading to the end of input"
                ))?;
                source.len()
            }
        };

        let raw = &source[content_start..content_end];
        if !raw.is_empty() {
            self.locate(content_start);
            if html::is_escapable_raw_text_element(name) {
                let text = self.decode_references(raw)?;
                self.handler.characters(&text)?;
            } else {
                self.handler.characters(raw)?;
            }
        }
        Ok(content_end)
    }
}
