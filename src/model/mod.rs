//! Plain data types shared by the collaborator stores and the renderers.
//!
//! Everything here is immutable once handed to the report writer and
//! serde-serializable so a whole scan can be loaded from a JSON dump.

pub mod finding;
pub mod scan_info;
pub mod transaction;

pub use finding::{Finding, FindingId, Reference, Severity, VulnDetails};
pub use scan_info::{Phase, PluginConfig, PluginOption, ScanInfo};
pub use transaction::{Header, HttpRequest, HttpResponse, Transaction, TransactionId};
