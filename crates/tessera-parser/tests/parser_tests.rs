//! Integration tests for DomParser: markup in, document out.

use std::cell::RefCell;
use std::rc::Rc;

use tessera_dom::{Document, NodeId, NodeType, SourceLocation, XmlSerializer, namespace};
use tessera_parser::{DomParser, ErrorLevel, OnError, ParserOptions};

type Diagnostics = Rc<RefCell<Vec<(ErrorLevel, String)>>>;

/// Helper to build a parser that records every diagnostic it reports.
fn recording_parser() -> (DomParser, Diagnostics) {
    let diagnostics: Diagnostics = Rc::default();
    let sink = Rc::clone(&diagnostics);
    let options = ParserOptions {
        on_error: OnError::Combined(Box::new(move |level, message, _| {
            sink.borrow_mut().push((level, message.to_string()));
            Ok(())
        })),
        ..ParserOptions::default()
    };
    (DomParser::new(options), diagnostics)
}

/// Helper to parse with default options, panicking on failure.
fn parse(source: &str, mime_type: &str) -> Document {
    DomParser::default()
        .parse_from_string(source, mime_type)
        .unwrap()
}

fn serialize(doc: &Document) -> String {
    XmlSerializer.serialize_to_string(doc, NodeId::ROOT)
}

fn root(doc: &Document) -> NodeId {
    doc.document_element().unwrap()
}

// ========== round trips ==========

#[test]
fn test_xml_round_trip() {
    let source = "<xml xmlns=\"a\">\n\t<child>test</child>\n\t<child/>\n</xml>";
    let doc = parse(source, "text/xml");
    assert_eq!(serialize(&doc), source);

    let child = doc.first_element_child(root(&doc)).unwrap();
    assert_eq!(doc.get(child).unwrap().namespace_uri(), Some("a"));
}

#[test]
fn test_prolog_and_misc_round_trip() {
    let source = concat!(
        "<?xml version=\"1.0\"?>",
        "<!DOCTYPE r SYSTEM \"r.dtd\">",
        "<!-- top -->",
        "<r a=\"1 &amp; 2\"><![CDATA[x<y]]><?pi data?></r>"
    );
    let doc = parse(source, "text/xml");
    assert_eq!(serialize(&doc), source);
    assert!(doc.doctype().is_some());

    let cdata = doc.first_child(root(&doc)).unwrap();
    assert!(matches!(
        doc.get(cdata).unwrap().node_type,
        NodeType::CDataSection(_)
    ));
}

// ========== fatal errors ==========

#[test]
fn test_duplicate_attribute_aborts() {
    let (mut parser, diagnostics) = recording_parser();
    let err = parser
        .parse_from_string("<xml a=\"1\" a=\"2\"></xml>", "text/xml")
        .unwrap_err();
    assert!(err.message.contains("Attribute a redefined"));
    assert_eq!(
        diagnostics.borrow().as_slice(),
        [(ErrorLevel::FatalError, "Attribute a redefined".to_string())]
    );
}

#[test]
fn test_missing_root_element() {
    let err = DomParser::default()
        .parse_from_string("<!-- only a comment -->", "text/xml")
        .unwrap_err();
    assert_eq!(err.message, "missing root element");

    let doc = parse("", "text/html");
    assert!(doc.document_element().is_none());
}

#[test]
fn test_second_root_element_aborts() {
    let err = DomParser::default()
        .parse_from_string("<a/><b/>", "text/xml")
        .unwrap_err();
    assert!(err.message.starts_with("HierarchyRequestError"));
    assert!(err.source.is_some());
}

#[test]
fn test_unbound_element_prefix_aborts() {
    let err = DomParser::default()
        .parse_from_string("<p:a/>", "text/xml")
        .unwrap_err();
    assert!(err.message.starts_with("NamespaceError"));
}

#[test]
fn test_fatal_error_carries_position() {
    let err = DomParser::default()
        .parse_from_string("<a>\n</b>", "text/xml")
        .unwrap_err();
    assert_eq!(
        err.locator,
        Some(SourceLocation {
            line_number: 2,
            column_number: 1
        })
    );
    assert_eq!(
        err.to_string(),
        "Opening and ending tag mismatch: \"a\" != \"b\" @#[line:2,col:1]"
    );
}

#[test]
fn test_end_tag_case_mismatch_aborts_xml() {
    let (mut parser, diagnostics) = recording_parser();
    let err = parser.parse_from_string("<a></A>", "text/xml").unwrap_err();
    assert_eq!(err.message, "end tag \"A\" only matches \"a\" ignoring case");
    assert_eq!(diagnostics.borrow().len(), 1);
    assert_eq!(diagnostics.borrow()[0].0, ErrorLevel::FatalError);
}

// ========== recoverable diagnostics ==========

#[test]
fn test_unquoted_attribute_value() {
    let (mut parser, diagnostics) = recording_parser();
    let doc = parser
        .parse_from_string("<xml attr=value/>", "text/xml")
        .unwrap();
    assert_eq!(doc.get_attribute(root(&doc), "attr").as_deref(), Some("value"));

    let diagnostics = diagnostics.borrow();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].0, ErrorLevel::Warning);
}

#[test]
fn test_unclosed_element_in_html_and_xml() {
    let (mut parser, diagnostics) = recording_parser();
    let doc = parser.parse_from_string("<img>", "text/html").unwrap();
    assert!(diagnostics.borrow().is_empty());
    assert_eq!(
        doc.get(root(&doc)).unwrap().namespace_uri(),
        Some(namespace::HTML)
    );

    let (mut parser, diagnostics) = recording_parser();
    let doc = parser.parse_from_string("<img>", "text/xml").unwrap();
    assert_eq!(
        diagnostics.borrow().as_slice(),
        [
            (ErrorLevel::Warning, "unclosed xml tag: img".to_string()),
            (ErrorLevel::Error, "unclosed xml tag(s): img".to_string()),
        ]
    );
    assert_eq!(doc.get(root(&doc)).unwrap().namespace_uri(), None);
}

#[test]
fn test_text_outside_root_is_dropped() {
    let (mut parser, diagnostics) = recording_parser();
    let doc = parser.parse_from_string("x<a/>", "text/xml").unwrap();
    assert_eq!(diagnostics.borrow().len(), 1);
    assert_eq!(doc.children(NodeId::ROOT), [root(&doc)]);
}

#[test]
fn test_per_level_callbacks() {
    let warnings = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&warnings);
    let options = ParserOptions {
        on_error: OnError::PerLevel {
            warning: Some(Box::new(move |_, _| {
                *counter.borrow_mut() += 1;
                Ok(())
            })),
            error: None,
            fatal_error: None,
        },
        ..ParserOptions::default()
    };
    let mut parser = DomParser::new(options);
    let _ = parser
        .parse_from_string("<a x=1></a>", "text/html")
        .unwrap();
    assert_eq!(*warnings.borrow(), 1);
}

#[test]
fn test_rejecting_callback_aborts() {
    let options = ParserOptions {
        on_error: OnError::Combined(Box::new(|level, message, _| {
            if level == ErrorLevel::Warning {
                return Err(format!("rejected: {message}").into());
            }
            Ok(())
        })),
        ..ParserOptions::default()
    };
    let err = DomParser::new(options)
        .parse_from_string("<a x=1></a>", "text/xml")
        .unwrap_err();
    assert!(err.message.starts_with("rejected: "));
    assert!(err.source.is_some());
}

// ========== document types ==========

#[test]
fn test_default_namespace_by_mime_type() {
    let cases = [
        ("text/html", Some(namespace::HTML)),
        ("application/xhtml+xml", Some(namespace::HTML)),
        ("image/svg+xml", Some(namespace::SVG)),
        ("text/xml", None),
        ("application/xml", None),
    ];
    for (mime_type, expected) in cases {
        let doc = parse("<root></root>", mime_type);
        assert_eq!(
            doc.get(root(&doc)).unwrap().namespace_uri(),
            expected,
            "{mime_type}"
        );
    }
}

#[test]
fn test_xmlns_option_overrides_default_namespace() {
    let options = ParserOptions::default()
        .with_xmlns([("", "urn:custom"), ("c", "urn:c")].into_iter().collect());
    let doc = DomParser::new(options)
        .parse_from_string("<root><c:item/></root>", "text/html")
        .unwrap();
    let root = root(&doc);
    assert_eq!(doc.get(root).unwrap().namespace_uri(), Some("urn:custom"));
    let item = doc.first_element_child(root).unwrap();
    assert_eq!(doc.get(item).unwrap().namespace_uri(), Some("urn:c"));
}

#[test]
fn test_cdata_in_html_is_text() {
    let doc = parse("<div><![CDATA[x]]></div>", "text/html");
    let child = doc.first_child(root(&doc)).unwrap();
    assert_eq!(doc.as_text(child), Some("x"));
}

#[test]
fn test_entities_depend_on_document_type() {
    let doc = parse("<p>&copy; &hellip;</p>", "text/html");
    assert_eq!(doc.text_content(root(&doc)).as_deref(), Some("© …"));

    let (mut parser, diagnostics) = recording_parser();
    let doc = parser
        .parse_from_string("<p>&copy;</p>", "text/xml")
        .unwrap();
    assert_eq!(doc.text_content(root(&doc)).as_deref(), Some("&copy;"));
    assert_eq!(
        diagnostics.borrow().as_slice(),
        [(ErrorLevel::Error, "entity not found:&copy;".to_string())]
    );
}

// ========== HTML ==========

#[test]
fn test_void_elements_and_missing_end_tags() {
    let doc = parse("<div><p>one<br>two<div>three</div></div>", "text/html");
    let outer = root(&doc);
    let names: Vec<String> = doc
        .element_children(outer)
        .into_iter()
        .map(|id| doc.get(id).unwrap().node_name())
        .collect();
    assert_eq!(names, ["p", "br", "div"]);
    let p = doc.first_element_child(outer).unwrap();
    assert!(!doc.has_child_nodes(p));
}

#[test]
fn test_end_tag_case_mismatch_closes_html_element() {
    let (mut parser, diagnostics) = recording_parser();
    let doc = parser.parse_from_string("<a></A>", "text/html").unwrap();
    assert!(diagnostics.borrow().is_empty());
    let a = root(&doc);
    assert_eq!(doc.get(a).unwrap().node_name(), "a");
    assert!(!doc.has_child_nodes(a));
}

#[test]
fn test_script_content_is_not_markup() {
    let doc = parse(
        "<html><script>if (a<b) { x = '</p>'; }</script></html>",
        "text/html",
    );
    let script = doc.first_element_child(root(&doc)).unwrap();
    assert_eq!(
        doc.text_content(script).as_deref(),
        Some("if (a<b) { x = '</p>'; }")
    );
}

#[test]
fn test_text_only_html_document() {
    let doc = parse("just &amp; text", "text/html");
    let text = doc.first_child(NodeId::ROOT).unwrap();
    assert_eq!(doc.as_text(text), Some("just & text"));
}

// ========== locations and line endings ==========

#[test]
fn test_locations_are_recorded() {
    let doc = parse("<a>\n  <b x=\"1\"/>\n</a>", "text/xml");
    let b = doc.first_element_child(root(&doc)).unwrap();
    assert_eq!(
        doc.get(b).unwrap().location,
        Some(SourceLocation {
            line_number: 2,
            column_number: 3
        })
    );
    let attr = doc.get_attribute_node(b, "x").unwrap();
    assert_eq!(doc.get(attr).unwrap().location.map(|l| l.line_number), Some(2));
}

#[test]
fn test_locations_can_be_disabled() {
    let options = ParserOptions {
        locator: false,
        ..ParserOptions::default()
    };
    let doc = DomParser::new(options)
        .parse_from_string("<a><b/></a>", "text/xml")
        .unwrap();
    assert!(doc.descendants(NodeId::ROOT).all(|id| doc.get(id).unwrap().location.is_none()));
}

#[test]
fn test_line_endings_are_normalized() {
    let doc = parse("<a>x\r\ny\rz</a>", "text/xml");
    assert_eq!(doc.text_content(root(&doc)).as_deref(), Some("x\ny\nz"));

    let options = ParserOptions::default().with_line_ending_normalizer(str::to_owned);
    let doc = DomParser::new(options)
        .parse_from_string("<a>x\r\ny</a>", "text/xml")
        .unwrap();
    assert_eq!(doc.text_content(root(&doc)).as_deref(), Some("x\r\ny"));
}

// ========== parsed documents are live ==========

#[test]
fn test_class_name_list_tracks_parsed_document() {
    let mut doc = parse(
        "<root><p class=\"quote odd\"/><p class=\"quote\"/><p/></root>",
        "text/xml",
    );
    let list = doc.get_elements_by_class_name(NodeId::ROOT, "quote odd");
    assert_eq!(list.length(&doc), 1);

    let second = doc.element_children(root(&doc))[1];
    doc.set_attribute(second, "class", "odd quote").unwrap();
    assert_eq!(list.length(&doc), 2);
    assert_eq!(list.item(&doc, 1), Some(second));
}

#[test]
fn test_clone_of_parsed_document_is_independent() {
    let doc = parse("<r><a>1</a><b>2</b></r>", "text/xml");
    let before = serialize(&doc);

    let mut copy = doc.clone_document(true).unwrap();
    assert_eq!(serialize(&copy), before);

    let copy_root = root(&copy);
    let first = copy.first_element_child(copy_root).unwrap();
    let _ = copy.append_child(copy_root, first).unwrap();

    assert_eq!(serialize(&copy), "<r><b>2</b><a>1</a></r>");
    assert_eq!(serialize(&doc), before);
}
