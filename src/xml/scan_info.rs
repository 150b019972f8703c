use crate::model::{Phase, ScanInfo};

use super::escape_attr;

/// Render the `scan-info` header fragment. Every phase is emitted, in
/// [`Phase::ALL`] order, even when no plugin is enabled for it.
pub fn render(info: &ScanInfo) -> String {
    let mut xml = format!("<scan-info target=\"{}\">\n", escape_attr(&info.target));

    for phase in Phase::ALL {
        xml.push_str(&format!("    <{}>\n", phase));
        for plugin in info.plugins_in(phase) {
            xml.push_str(&format!(
                "            <plugin name=\"{}\">\n",
                escape_attr(&plugin.name)
            ));
            for option in &plugin.options {
                xml.push_str(&format!(
                    "                        <config parameter=\"{}\" value=\"{}\"/>\n",
                    escape_attr(&option.name),
                    escape_attr(&option.value)
                ));
            }
            xml.push_str("            </plugin>\n");
        }
        xml.push_str(&format!("    </{}>\n", phase));
    }

    xml.push_str("</scan-info>");
    xml
}
