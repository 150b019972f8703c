//! Helpers shared by the unit tests.

use std::ffi::CString;
use std::path::Path;
use std::sync::{Mutex, Once};

use quick_xml::events::Event;
use quick_xml::Reader;

/// Bundled schema the report layout must conform to.
pub const REPORT_SCHEMA: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/schema/report.xsd");

/// Structural summary of a parsed document.
#[derive(Debug, Default)]
pub struct ParsedXml {
    /// Name of every opened element, in document order.
    pub elements: Vec<String>,
    /// `(element, attribute, raw value)` for every attribute.
    pub attributes: Vec<(String, String, String)>,
}

impl ParsedXml {
    pub fn count(&self, name: &str) -> usize {
        self.elements.iter().filter(|e| *e == name).count()
    }

    pub fn attribute_values(&self, element: &str, attribute: &str) -> Vec<&str> {
        self.attributes
            .iter()
            .filter(|(e, a, _)| e == element && a == attribute)
            .map(|(_, _, v)| v.as_str())
            .collect()
    }
}

fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\u{9}' | '\u{A}' | '\u{D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

/// Parse `xml` and panic unless it is a well-formed fragment or document:
/// balanced tags, legal characters only, and only predefined entities or
/// whitespace character references.
pub fn assert_well_formed(xml: &str) -> ParsedXml {
    if let Some(bad) = xml.chars().find(|c| !is_xml_char(*c)) {
        panic!("illegal XML character U+{:04X} in output", bad as u32);
    }
    for (i, _) in xml.match_indices('&') {
        let rest = &xml[i..];
        assert!(
            ["&amp;", "&lt;", "&gt;", "&quot;", "&apos;", "&#9;", "&#10;", "&#13;"]
                .iter()
                .any(|e| rest.starts_with(e)),
            "bare ampersand at byte {}",
            i
        );
    }

    let mut reader = Reader::from_str(xml);
    let mut parsed = ParsedXml::default();
    let mut depth = 0usize;
    let mut roots = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) => {
                if depth == 0 {
                    roots += 1;
                }
                depth += 1;
                record(&mut parsed, &element);
            }
            Ok(Event::Empty(element)) => {
                if depth == 0 {
                    roots += 1;
                }
                record(&mut parsed, &element);
            }
            Ok(Event::End(_)) => {
                assert!(depth > 0, "closing tag without an open element");
                depth -= 1;
            }
            Ok(Event::Eof) => break,
            Err(e) => panic!("XML parse error: {}\n{}", e, xml),
            _ => {}
        }
    }

    assert_eq!(depth, 0, "unclosed elements at end of input");
    assert_eq!(roots, 1, "expected exactly one root element");
    parsed
}

fn record(parsed: &mut ParsedXml, element: &quick_xml::events::BytesStart<'_>) {
    let name = String::from_utf8_lossy(element.name().as_ref()).to_string();
    for attr in element.attributes() {
        let attr = match attr {
            Ok(attr) => attr,
            Err(e) => panic!("malformed attribute on <{}>: {}", name, e),
        };
        parsed.attributes.push((
            name.clone(),
            String::from_utf8_lossy(attr.key.as_ref()).to_string(),
            String::from_utf8_lossy(&attr.value).to_string(),
        ));
    }
    parsed.elements.push(name);
}

/// Minimal libxml2 bindings for XSD validation.
mod libxml2 {
    use std::os::raw::{c_char, c_int, c_void};

    pub type SchemaParserCtxt = *mut c_void;
    pub type Schema = *mut c_void;
    pub type SchemaValidCtxt = *mut c_void;

    #[link(name = "xml2")]
    extern "C" {
        pub fn xmlInitParser();
        pub fn xmlSchemaNewParserCtxt(url: *const c_char) -> SchemaParserCtxt;
        pub fn xmlSchemaParse(ctxt: SchemaParserCtxt) -> Schema;
        pub fn xmlSchemaFreeParserCtxt(ctxt: SchemaParserCtxt);
        pub fn xmlSchemaNewValidCtxt(schema: Schema) -> SchemaValidCtxt;
        pub fn xmlSchemaValidateFile(
            ctxt: SchemaValidCtxt,
            filename: *const c_char,
            options: c_int,
        ) -> c_int;
        pub fn xmlSchemaFreeValidCtxt(ctxt: SchemaValidCtxt);
        pub fn xmlSchemaFree(schema: Schema);
    }
}

static LIBXML_INIT: Once = Once::new();
static LIBXML_LOCK: Mutex<()> = Mutex::new(());

fn c_path(path: &Path) -> CString {
    CString::new(path.to_str().expect("non UTF-8 path")).expect("NUL in path")
}

/// Validate the file at `document` against [`REPORT_SCHEMA`] with libxml2
/// and panic on any schema error. libxml2 prints the errors to stderr.
pub fn assert_schema_valid(document: &Path) {
    LIBXML_INIT.call_once(|| unsafe { libxml2::xmlInitParser() });
    let _guard = LIBXML_LOCK.lock().unwrap_or_else(|e| e.into_inner());

    let schema_path = c_path(Path::new(REPORT_SCHEMA));
    let document_path = c_path(document);

    unsafe {
        let parser = libxml2::xmlSchemaNewParserCtxt(schema_path.as_ptr());
        assert!(!parser.is_null(), "cannot open schema {}", REPORT_SCHEMA);
        let schema = libxml2::xmlSchemaParse(parser);
        libxml2::xmlSchemaFreeParserCtxt(parser);
        assert!(!schema.is_null(), "schema {} does not compile", REPORT_SCHEMA);

        let validator = libxml2::xmlSchemaNewValidCtxt(schema);
        assert!(!validator.is_null(), "cannot create schema validation context");
        let status = libxml2::xmlSchemaValidateFile(validator, document_path.as_ptr(), 0);
        libxml2::xmlSchemaFreeValidCtxt(validator);
        libxml2::xmlSchemaFree(schema);

        assert_eq!(
            status,
            0,
            "{} does not validate against the report schema",
            document.display()
        );
    }
}
