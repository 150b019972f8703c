//! XML fragment renderers.
//!
//! Every renderer writes text through [`escape::escape_xml`] or
//! [`escape::escape_attr`], so nothing a scanned site sends back can break
//! the document. The fragment layouts are byte-exact: downstream consumers
//! assert on indentation and blank lines.

pub mod document;
pub mod escape;
pub mod finding;
pub mod scan_info;
pub mod transaction;

pub use escape::{escape_attr, escape_xml, strip_control_chars};
pub use finding::FindingRenderer;
pub use transaction::TransactionCache;

/// Placeholder text for absent attribute values.
pub const NO_VALUE: &str = "None";
