//! scanxml: incremental XML reports for web security scans.
//!
//! Turns a scan's findings and recorded HTTP transactions into one
//! well-formed XML document that is rewritten on every flush while the scan
//! runs. Findings are never written twice, transaction fragments are rendered
//! once and shared, and scanned content is sanitized so binary bodies or
//! stray control bytes cannot corrupt the document.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use scanxml::config::OutputConfig;
//! use scanxml::model::{Finding, ScanInfo, Severity};
//! use scanxml::store::{MemoryFindingStore, MemoryTransactionStore};
//! use scanxml::XmlReportWriter;
//!
//! let findings = Arc::new(MemoryFindingStore::new());
//! let writer = XmlReportWriter::new(
//!     &OutputConfig::new("report.xml"),
//!     Arc::new(MemoryTransactionStore::new()),
//!     findings.clone(),
//!     Arc::new(ScanInfo::new("https://example.org")),
//! )
//! .unwrap();
//!
//! findings.push(Finding::new("1", "XSS", "Reflected input", Severity::Medium, "xss"));
//! writer.flush().unwrap();
//! writer.end().unwrap();
//! ```

pub mod config;
pub mod error;
pub mod model;
pub mod report;
pub mod store;
pub mod xml;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use config::OutputConfig;
use error::Result;
use store::ScanDump;

pub use report::{FlushSummary, XmlReportWriter};

/// Write a complete report for a finished scan dump: one flush, then the
/// final flush that closes the report.
pub fn write_report(dump: ScanDump, output: &OutputConfig) -> Result<FlushSummary> {
    let (scan, transactions, findings) = dump.into_stores();
    let writer = XmlReportWriter::new(
        output,
        Arc::new(transactions),
        Arc::new(findings),
        Arc::new(scan),
    )?;
    writer.flush()?;
    writer.end()
}
