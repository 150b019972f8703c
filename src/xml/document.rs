use chrono::{DateTime, Utc};

use super::escape_xml;

/// Layout version written on the root element.
pub const REPORT_VERSION: &str = "2.0";

/// The parts of a report that are fixed for the whole scan.
#[derive(Debug, Clone)]
pub struct DocumentHeader {
    started: DateTime<Utc>,
}

impl DocumentHeader {
    pub fn new(started: DateTime<Utc>) -> Self {
        Self { started }
    }

    fn render_open(&self) -> String {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str(&format!(
            "<scan-run start=\"{}\" start-long=\"{}\" version=\"{}\">\n",
            self.started.timestamp(),
            self.started.format("%a %b %e %H:%M:%S %Y"),
            REPORT_VERSION
        ));
        xml.push_str(&format!(
            "    <tool-version>{} {}</tool-version>\n\n",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        ));
        xml
    }
}

/// Assemble the complete document from already-rendered fragments.
///
/// `errors` are raw diagnostic messages; they are escaped here.
pub fn render(
    header: &DocumentHeader,
    scan_info: &str,
    findings: &[String],
    errors: &[String],
) -> String {
    let body_len: usize = findings.iter().map(|f| f.len() + 5).sum();
    let mut xml = String::with_capacity(body_len + scan_info.len() + 512);

    xml.push_str(&header.render_open());

    xml.push_str("    ");
    xml.push_str(scan_info);
    xml.push('\n');

    for finding in findings {
        xml.push_str("    ");
        xml.push_str(finding);
        xml.push('\n');
    }

    for message in errors {
        xml.push_str(&format!("    <error>{}</error>\n", escape_xml(message)));
    }

    xml.push_str("</scan-run>\n");
    xml
}
