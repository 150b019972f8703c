use std::sync::Arc;

use crate::error::ReportError;
use crate::model::{Finding, TransactionId, VulnDetails};

use super::transaction::{render_missing, TransactionCache};
use super::{escape_attr, escape_xml, NO_VALUE};

/// Renders findings as `vulnerability` elements, pulling transaction
/// fragments from a shared [`TransactionCache`].
pub struct FindingRenderer {
    transactions: Arc<TransactionCache>,
}

impl FindingRenderer {
    pub fn new(transactions: Arc<TransactionCache>) -> Self {
        Self { transactions }
    }

    /// Render one finding. Never fails: a transaction missing from the store
    /// is replaced by an empty placeholder element.
    pub fn render(&self, finding: &Finding) -> String {
        let ids = finding.unique_transaction_ids();

        let mut xml = format!(
            "<vulnerability id=\"{}\" method=\"{}\" name=\"{}\" plugin=\"{}\" severity=\"{}\" url=\"{}\" var=\"{}\">\n",
            escape_attr(&format_id_list(&ids)),
            attr_or_none(finding.method.as_deref()),
            escape_attr(&finding.name),
            escape_attr(&finding.plugin),
            finding.severity,
            attr_or_none(finding.url.as_deref()),
            attr_or_none(finding.var.as_deref()),
        );
        xml.push_str(&format!(
            "    <description>{}</description>\n\n",
            escape_xml(&finding.description)
        ));

        if let Some(details) = &finding.details {
            render_details(&mut xml, details);
        }
        xml.push('\n');

        xml.push_str("    <http-transactions>\n");
        for id in ids {
            xml.push_str("            ");
            xml.push_str(&self.transaction_fragment(&finding.id, id));
            xml.push('\n');
        }
        xml.push_str("    </http-transactions>\n");

        xml.push_str("</vulnerability>");
        xml
    }

    fn transaction_fragment(&self, finding_id: &str, id: TransactionId) -> String {
        match self.transactions.get(id) {
            Ok(fragment) => fragment,
            Err(ReportError::TransactionNotFound(_)) => {
                tracing::warn!(
                    finding = %finding_id,
                    transaction = id,
                    "transaction referenced by finding is missing, writing placeholder"
                );
                render_missing(id)
            }
            Err(e) => {
                tracing::warn!(
                    finding = %finding_id,
                    transaction = id,
                    error = %e,
                    "failed to render transaction, writing placeholder"
                );
                render_missing(id)
            }
        }
    }
}

/// `[1, 2, 3]`, or `[]` for a finding without transactions.
fn format_id_list(ids: &[TransactionId]) -> String {
    let joined: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
    format!("[{}]", joined.join(", "))
}

fn attr_or_none(value: Option<&str>) -> String {
    match value {
        Some(v) => escape_attr(v),
        None => NO_VALUE.into(),
    }
}

fn render_details(xml: &mut String, details: &VulnDetails) {
    xml.push_str(&format!(
        "    <long-description>{}</long-description>\n",
        escape_xml(&details.long_description)
    ));
    xml.push_str(&format!(
        "    <fix-guidance>{}</fix-guidance>\n",
        escape_xml(&details.fix_guidance)
    ));
    xml.push_str(&format!(
        "    <fix-effort>{}</fix-effort>\n",
        escape_xml(&details.fix_effort)
    ));
    xml.push_str("    <references>\n");
    for reference in &details.references {
        xml.push_str(&format!(
            "        <reference title=\"{}\" url=\"{}\" />\n",
            escape_attr(&reference.title),
            escape_attr(&reference.url)
        ));
    }
    xml.push_str("    </references>\n");
}
