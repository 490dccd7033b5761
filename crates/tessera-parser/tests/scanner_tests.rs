//! Tests for the scanner's event stream, using a handler that records
//! every event as a string.

use tessera_dom::{NamespaceMap, SourceLocation, namespace};
use tessera_parser::entities::{html_entities, xml_entities};
use tessera_parser::{ContentHandler, ElementAttributes, ParseError, Scanner, ScannerConfig};

#[derive(Default)]
struct Recorder {
    events: Vec<String>,
    /// (qname, namespace) of every started element.
    elements: Vec<(String, Option<String>)>,
    /// (qname, namespace) of every attribute.
    attributes: Vec<(String, Option<String>)>,
    locator: Option<SourceLocation>,
    element_locations: Vec<(String, Option<SourceLocation>)>,
}

impl ContentHandler for Recorder {
    fn set_document_locator(&mut self, location: SourceLocation) {
        self.locator = Some(location);
    }

    fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) -> Result<(), ParseError> {
        self.events.push(format!("ns {prefix}={uri}"));
        Ok(())
    }

    fn end_prefix_mapping(&mut self, prefix: &str) -> Result<(), ParseError> {
        self.events.push(format!("/ns {prefix}"));
        Ok(())
    }

    fn start_element(
        &mut self,
        uri: Option<&str>,
        _local_name: &str,
        qname: &str,
        attributes: &ElementAttributes,
    ) -> Result<(), ParseError> {
        let rendered: String = attributes
            .iter()
            .map(|a| format!(" {}=\"{}\"", a.qname, a.value))
            .collect();
        self.events.push(format!("<{qname}{rendered}>"));
        self.elements
            .push((qname.to_string(), uri.map(str::to_string)));
        self.attributes.extend(
            attributes
                .iter()
                .map(|a| (a.qname.clone(), a.uri.clone())),
        );
        self.element_locations
            .push((qname.to_string(), self.locator));
        Ok(())
    }

    fn end_element(
        &mut self,
        _uri: Option<&str>,
        _local_name: &str,
        qname: &str,
    ) -> Result<(), ParseError> {
        self.events.push(format!("</{qname}>"));
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<(), ParseError> {
        self.events.push(format!("text {text:?}"));
        Ok(())
    }

    fn document_text(&mut self, text: &str) -> Result<(), ParseError> {
        self.events.push(format!("doctext {text:?}"));
        Ok(())
    }

    fn processing_instruction(&mut self, target: &str, data: &str) -> Result<(), ParseError> {
        self.events.push(format!("pi {target}|{data}"));
        Ok(())
    }

    fn comment(&mut self, text: &str) -> Result<(), ParseError> {
        self.events.push(format!("comment {text:?}"));
        Ok(())
    }

    fn start_cdata(&mut self) -> Result<(), ParseError> {
        self.events.push("cdata".to_string());
        Ok(())
    }

    fn end_cdata(&mut self) -> Result<(), ParseError> {
        self.events.push("/cdata".to_string());
        Ok(())
    }

    fn start_dtd(
        &mut self,
        name: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
        internal_subset: Option<&str>,
    ) -> Result<(), ParseError> {
        self.events.push(format!(
            "dtd {name} {public_id:?} {system_id:?} {internal_subset:?}"
        ));
        Ok(())
    }

    fn warning(&mut self, message: &str) -> Result<(), ParseError> {
        self.events.push(format!("warning: {message}"));
        Ok(())
    }

    fn error(&mut self, message: &str) -> Result<(), ParseError> {
        self.events.push(format!("error: {message}"));
        Ok(())
    }

    fn fatal_error(&mut self, message: &str) -> Result<(), ParseError> {
        self.events.push(format!("fatal: {message}"));
        Err(ParseError::new(message, None))
    }
}

/// Helper to scan `source` and return the handler and the result.
fn scan_with(source: &str, is_html: bool, namespaces: NamespaceMap) -> (Recorder, Result<(), ParseError>) {
    let mut recorder = Recorder::default();
    let config = ScannerConfig {
        is_html,
        track_locations: true,
        namespaces,
        entities: if is_html { html_entities() } else { xml_entities() },
    };
    let result = Scanner::new(source, &mut recorder, config).run();
    (recorder, result)
}

/// Helper to scan XML and return the recorded events.
fn xml(source: &str) -> Vec<String> {
    scan_with(source, false, NamespaceMap::new()).0.events
}

/// Helper to scan HTML with the HTML namespace as default.
fn html(source: &str) -> Vec<String> {
    let namespaces: NamespaceMap = [("", namespace::HTML)].into_iter().collect();
    scan_with(source, true, namespaces).0.events
}

fn has_diagnostic(events: &[String]) -> bool {
    events.iter().any(|e| {
        e.starts_with("warning:") || e.starts_with("error:") || e.starts_with("fatal:")
    })
}

// ========== elements and text ==========

#[test]
fn test_element_with_text() {
    assert_eq!(xml("<a>hi</a>"), ["<a>", "text \"hi\"", "</a>"]);
}

#[test]
fn test_empty_element() {
    assert_eq!(xml("<a/>"), ["<a>", "</a>"]);
    assert_eq!(xml("<a />"), ["<a>", "</a>"]);
}

#[test]
fn test_nested_elements() {
    assert_eq!(
        xml("<a><b>x</b><c/></a>"),
        ["<a>", "<b>", "text \"x\"", "</b>", "<c>", "</c>", "</a>"]
    );
}

#[test]
fn test_replacement_character_warning() {
    let events = xml("<a>\u{FFFD}</a>");
    assert_eq!(
        events[0],
        "warning: Unicode replacement character detected, source encoding issues?"
    );
}

// ========== references ==========

#[test]
fn test_predefined_and_numeric_references() {
    assert_eq!(
        xml("<a>&lt;&#65;&#x42;&amp;&apos;</a>"),
        ["<a>", "text \"<AB&'\"", "</a>"]
    );
}

#[test]
fn test_missing_semicolon_in_xml() {
    assert_eq!(
        xml("<a>x &amp y</a>"),
        [
            "<a>",
            "error: EntityRef: expecting ;",
            "text \"x &amp y\"",
            "</a>"
        ]
    );
}

#[test]
fn test_missing_semicolon_in_html() {
    assert_eq!(
        html("<p>&copy 2024</p>"),
        ["<p>", "text \"© 2024\"", "</p>"]
    );
}

#[test]
fn test_unknown_entity_is_kept() {
    assert_eq!(
        xml("<a>&nbsp;</a>"),
        [
            "<a>",
            "error: entity not found:&nbsp;",
            "text \"&nbsp;\"",
            "</a>"
        ]
    );
}

#[test]
fn test_html5_only_entity_is_kept() {
    assert_eq!(
        html("<a>&NotEqualTilde;</a>"),
        [
            "<a>",
            "error: entity not found:&NotEqualTilde;",
            "text \"&NotEqualTilde;\"",
            "</a>"
        ]
    );
}

#[test]
fn test_lone_ampersand_is_text() {
    assert_eq!(xml("<a>a & b</a>"), ["<a>", "text \"a & b\"", "</a>"]);
}

// ========== attributes ==========

#[test]
fn test_attribute_value_normalization() {
    assert_eq!(
        xml("<a x=\"1\t2\n3\" y='&lt;'/>"),
        ["<a x=\"1 2 3\" y=\"<\">", "</a>"]
    );
}

#[test]
fn test_duplicate_attribute_is_fatal() {
    let (recorder, result) = scan_with("<xml a=\"1\" a=\"2\"></xml>", false, NamespaceMap::new());
    assert!(result.is_err());
    assert_eq!(recorder.events, ["fatal: Attribute a redefined"]);
}

#[test]
fn test_unquoted_value_before_self_close() {
    assert_eq!(
        xml("<xml attr=value/>"),
        [
            "warning: attribute \"value\" missed quot(\")!",
            "<xml attr=\"value\">",
            "</xml>"
        ]
    );
}

#[test]
fn test_unquoted_value_followed_by_space() {
    assert_eq!(
        html("<div id=main class=\"x\"></div>"),
        [
            "warning: attribute \"main\" missed quot(\")!!",
            "<div id=\"main\" class=\"x\">",
            "</div>"
        ]
    );
}

#[test]
fn test_valueless_attribute() {
    assert_eq!(
        xml("<a disabled></a>"),
        [
            "warning: attribute \"disabled\" missed value!! \"disabled\" instead!!",
            "<a disabled=\"disabled\">",
            "</a>"
        ]
    );
    assert_eq!(
        html("<input disabled>"),
        ["<input disabled=\"disabled\">", "</input>"]
    );
}

#[test]
fn test_missing_space_between_attributes() {
    assert_eq!(
        xml("<a x=\"1\"y=\"2\"/>"),
        [
            "warning: attribute space is required\"x\"!!",
            "<a x=\"1\" y=\"2\">",
            "</a>"
        ]
    );
}

#[test]
fn test_less_than_in_attribute_value() {
    let (recorder, result) = scan_with("<a x=\"<\"/>", false, NamespaceMap::new());
    assert!(result.is_err());
    assert_eq!(
        recorder.events,
        ["fatal: Unescaped '<' not allowed in attributes values"]
    );
    assert_eq!(html("<a x=\"<\"></a>"), ["<a x=\"<\">", "</a>"]);
}

#[test]
fn test_equals_without_value_in_xml() {
    let (recorder, result) = scan_with("<a x=></a>", false, NamespaceMap::new());
    assert!(result.is_err());
    assert_eq!(recorder.events, ["fatal: AttValue: ' or \" expected"]);
}

#[test]
fn test_end_of_input_inside_tag() {
    let events = xml("<a x=\"1\"");
    assert_eq!(events[0], "error: unexpected end of input");
    assert_eq!(events[1], "<a x=\"1\">");
}

// ========== recovery ==========

#[test]
fn test_invalid_tag_name_becomes_text() {
    assert_eq!(
        xml("<a>1 < 2</a>"),
        [
            "<a>",
            "text \"1 \"",
            "error: element parse error: invalid tagName:",
            "text \"<\"",
            "text \" 2\"",
            "</a>"
        ]
    );
}

// ========== end tags ==========

#[test]
fn test_end_tag_mismatch_is_fatal() {
    let (recorder, result) = scan_with("<a></b>", false, NamespaceMap::new());
    assert!(result.is_err());
    assert_eq!(
        recorder.events,
        ["<a>", "fatal: Opening and ending tag mismatch: \"a\" != \"b\""]
    );
}

#[test]
fn test_end_tag_case_mismatch() {
    let (recorder, result) = scan_with("<a></A>", false, NamespaceMap::new());
    assert!(result.is_err());
    assert_eq!(
        recorder.events,
        ["<a>", "fatal: end tag \"A\" only matches \"a\" ignoring case"]
    );
    assert_eq!(html("<div></DIV>"), ["<div>", "</div>"]);
}

#[test]
fn test_end_tag_name_missing() {
    let (recorder, result) = scan_with("<a></>", false, NamespaceMap::new());
    assert!(result.is_err());
    assert_eq!(recorder.events.last().unwrap(), "fatal: end tag name missing");
}

#[test]
fn test_end_tag_with_trailing_space() {
    assert_eq!(xml("<a></a >"), ["<a>", "</a>"]);
}

// ========== end of input ==========

#[test]
fn test_unclosed_root_in_xml_and_html() {
    assert_eq!(
        xml("<img>"),
        [
            "<img>",
            "warning: unclosed xml tag: img",
            "error: unclosed xml tag(s): img",
            "</img>"
        ]
    );
    let events = html("<img>");
    assert_eq!(events, ["<img>", "</img>"]);
    assert!(!has_diagnostic(&events));
}

#[test]
fn test_text_outside_root() {
    assert_eq!(
        xml("x<a/>"),
        [
            "error: Unexpected content outside root element: 'x'",
            "text \"x\"",
            "<a>",
            "</a>"
        ]
    );
}

#[test]
fn test_extra_content_after_root() {
    assert_eq!(
        xml("<a/>tail"),
        ["<a>", "</a>", "error: Extra content at the end of the document"]
    );
}

#[test]
fn test_text_without_elements() {
    assert_eq!(html("just text"), ["doctext \"just text\""]);
}

// ========== comments, CDATA, PIs ==========

#[test]
fn test_comment() {
    assert_eq!(
        xml("<a><!-- hi --></a>"),
        ["<a>", "comment \" hi \"", "</a>"]
    );
}

#[test]
fn test_double_hyphen_in_comment() {
    let (recorder, result) = scan_with("<a><!-- a -- b --></a>", false, NamespaceMap::new());
    assert!(result.is_err());
    assert_eq!(
        recorder.events.last().unwrap(),
        "fatal: comment must not contain \"--\" at position 3"
    );

    assert_eq!(
        html("<div><!-- a -- b --></div>"),
        [
            "<div>",
            "warning: comment must not contain \"--\" at position 5",
            "comment \" a -- b \"",
            "</div>"
        ]
    );
}

#[test]
fn test_unterminated_comment() {
    let (_, result) = scan_with("<a><!-- open", false, NamespaceMap::new());
    assert!(result.is_err());
}

#[test]
fn test_cdata_section() {
    assert_eq!(
        xml("<a><![CDATA[<x>&]]></a>"),
        ["<a>", "cdata", "text \"<x>&\"", "/cdata", "</a>"]
    );
}

#[test]
fn test_cdata_outside_root() {
    let (recorder, result) = scan_with("<![CDATA[x]]><a/>", false, NamespaceMap::new());
    assert!(result.is_err());
    assert_eq!(
        recorder.events,
        ["fatal: CDSect is not allowed outside of root element"]
    );
}

#[test]
fn test_processing_instructions() {
    assert_eq!(
        xml("<?xml version=\"1.0\"?><a><?go?></a>"),
        ["pi xml|version=\"1.0\"", "<a>", "pi go|", "</a>"]
    );
}

#[test]
fn test_unterminated_processing_instruction() {
    let (recorder, result) = scan_with("<?xml version", false, NamespaceMap::new());
    assert!(result.is_err());
    assert_eq!(
        recorder.events,
        ["fatal: Missing end of processing instruction"]
    );
}

// ========== DOCTYPE ==========

#[test]
fn test_doctype_with_public_id() {
    assert_eq!(
        xml(concat!(
            "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Strict//EN\" ",
            "\"http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd\"><html/>"
        ))[0],
        "dtd html Some(\"-//W3C//DTD XHTML 1.0 Strict//EN\") \
         Some(\"http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd\") None"
    );
}

#[test]
fn test_doctype_with_system_id_and_internal_subset() {
    assert_eq!(
        xml("<!DOCTYPE note SYSTEM 'note.dtd' [<!ENTITY a \"]\">]><note/>")[0],
        "dtd note None Some(\"note.dtd\") Some(\"<!ENTITY a \\\"]\\\">\")"
    );
}

#[test]
fn test_html_doctype_is_case_insensitive() {
    assert_eq!(
        html("<!doctype html><html></html>"),
        ["dtd html None None None", "<html>", "</html>"]
    );
}

#[test]
fn test_public_id_alone() {
    let source = "<!DOCTYPE html PUBLIC \"-//W3C//DTD HTML 4.01//EN\"><html></html>";
    assert_eq!(
        html(source)[0],
        "dtd html Some(\"-//W3C//DTD HTML 4.01//EN\") None None"
    );
    let (_, result) = scan_with(source, false, NamespaceMap::new());
    assert!(result.is_err());
}

#[test]
fn test_doctype_after_root() {
    let (recorder, result) = scan_with("<a/><!DOCTYPE a>", false, NamespaceMap::new());
    assert!(result.is_err());
    assert_eq!(
        recorder.events.last().unwrap(),
        "fatal: Doctype not allowed inside or after documentElement at position 4"
    );
}

#[test]
fn test_unknown_markup_declaration() {
    let (recorder, result) = scan_with("<a><!ELEMENT a ANY></a>", false, NamespaceMap::new());
    assert!(result.is_err());
    assert_eq!(
        recorder.events.last().unwrap(),
        "fatal: Not well-formed XML starting with \"<!\" at position 3"
    );
}

// ========== namespaces ==========

#[test]
fn test_namespace_declarations_and_scope() {
    let (recorder, result) = scan_with(
        "<r xmlns=\"urn:d\" xmlns:p=\"urn:p\"><p:c p:x=\"1\" y=\"2\"/></r>",
        false,
        NamespaceMap::new(),
    );
    assert!(result.is_ok());
    assert_eq!(
        recorder.events,
        [
            "ns p=urn:p",
            "ns =urn:d",
            "<r xmlns=\"urn:d\" xmlns:p=\"urn:p\">",
            "<p:c p:x=\"1\" y=\"2\">",
            "</p:c>",
            "</r>",
            "/ns p",
            "/ns ",
        ]
    );
    assert_eq!(
        recorder.elements,
        [
            ("r".to_string(), Some("urn:d".to_string())),
            ("p:c".to_string(), Some("urn:p".to_string())),
        ]
    );
    assert_eq!(
        recorder.attributes,
        [
            ("xmlns".to_string(), Some(namespace::XMLNS.to_string())),
            ("xmlns:p".to_string(), Some(namespace::XMLNS.to_string())),
            ("p:x".to_string(), Some("urn:p".to_string())),
            ("y".to_string(), None),
        ]
    );
}

#[test]
fn test_declaration_goes_out_of_scope() {
    let (recorder, _) = scan_with(
        "<r><a xmlns:p=\"urn:p\"/><p:b/></r>",
        false,
        NamespaceMap::new(),
    );
    assert_eq!(recorder.elements[2], ("p:b".to_string(), None));
}

#[test]
fn test_xml_prefix_is_always_bound() {
    let (recorder, _) = scan_with("<r xml:lang=\"en\"/>", false, NamespaceMap::new());
    assert_eq!(
        recorder.attributes,
        [("xml:lang".to_string(), Some(namespace::XML.to_string()))]
    );
}

#[test]
fn test_seed_namespaces_apply_to_root() {
    let seed: NamespaceMap = [("", "urn:seed")].into_iter().collect();
    let (recorder, _) = scan_with("<r><c/></r>", false, seed);
    assert_eq!(recorder.elements[1].1.as_deref(), Some("urn:seed"));
}

// ========== HTML ==========

#[test]
fn test_raw_text_elements() {
    assert_eq!(
        html("<script>if (a < b && c) {}</script>"),
        ["<script>", "text \"if (a < b && c) {}\"", "</script>"]
    );
    assert_eq!(
        html("<script>&amp;</script>"),
        ["<script>", "text \"&amp;\"", "</script>"]
    );
}

#[test]
fn test_escapable_raw_text_decodes_references() {
    assert_eq!(
        html("<title>a &amp; <b></title>"),
        ["<title>", "text \"a & <b>\"", "</title>"]
    );
}

#[test]
fn test_raw_text_end_tag_is_case_insensitive() {
    assert_eq!(
        html("<STYLE>p{}</style>"),
        ["<STYLE>", "text \"p{}\"", "</STYLE>"]
    );
}

#[test]
fn test_unterminated_raw_text() {
    assert_eq!(
        html("<style>x"),
        [
            "<style>",
            "warning: end tag </style> not found, reading to the end of input",
            "text \"x\"",
            "</style>"
        ]
    );
}

#[test]
fn test_element_without_end_tag_closes_immediately() {
    assert_eq!(
        html("<div><p>one<div>x</div></div>"),
        [
            "<div>",
            "<p>",
            "</p>",
            "text \"one\"",
            "<div>",
            "text \"x\"",
            "</div>",
            "</div>"
        ]
    );
}

#[test]
fn test_void_elements_close() {
    assert_eq!(
        html("<p>a<br>b</p>"),
        ["<p>", "text \"a\"", "<br>", "</br>", "text \"b\"", "</p>"]
    );
}

// ========== locations ==========

#[test]
fn test_locations_are_reported() {
    let (recorder, _) = scan_with("<a>\n  <b/>\n</a>", false, NamespaceMap::new());
    assert_eq!(
        recorder.element_locations,
        [
            (
                "a".to_string(),
                Some(SourceLocation {
                    line_number: 1,
                    column_number: 1
                })
            ),
            (
                "b".to_string(),
                Some(SourceLocation {
                    line_number: 2,
                    column_number: 3
                })
            ),
        ]
    );
}

// ========== handler control ==========

/// A handler that refuses to continue after any warning.
struct StrictRecorder(Recorder);

impl ContentHandler for StrictRecorder {
    fn start_element(
        &mut self,
        uri: Option<&str>,
        local_name: &str,
        qname: &str,
        attributes: &ElementAttributes,
    ) -> Result<(), ParseError> {
        self.0.start_element(uri, local_name, qname, attributes)
    }

    fn end_element(
        &mut self,
        uri: Option<&str>,
        local_name: &str,
        qname: &str,
    ) -> Result<(), ParseError> {
        self.0.end_element(uri, local_name, qname)
    }

    fn characters(&mut self, text: &str) -> Result<(), ParseError> {
        self.0.characters(text)
    }

    fn warning(&mut self, message: &str) -> Result<(), ParseError> {
        Err(ParseError::new(format!("strict: {message}"), None))
    }
}

#[test]
fn test_handler_error_stops_the_scan() {
    let mut handler = StrictRecorder(Recorder::default());
    let config = ScannerConfig {
        is_html: false,
        track_locations: false,
        namespaces: NamespaceMap::new(),
        entities: xml_entities(),
    };
    let err = Scanner::new("<a x=1></a><b/>", &mut handler, config)
        .run()
        .unwrap_err();
    assert_eq!(err.message, "strict: attribute \"1\" missed quot(\")!");
    assert!(handler.0.events.is_empty());
}
