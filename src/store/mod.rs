//! Interfaces to the scan-side collaborators the report writer reads from.
//!
//! The writer never reaches for global state: the transaction store, the
//! findings store and the scan configuration are handed to it at
//! construction. In-memory implementations live in [`memory`].

pub mod dump;
pub mod memory;

use crate::error::Result;
use crate::model::{Finding, Phase, Transaction, TransactionId};

pub use dump::ScanDump;
pub use memory::{MemoryFindingStore, MemoryTransactionStore};

/// Persisted HTTP transactions, keyed by id.
pub trait TransactionStore: Send + Sync {
    /// Fetch a transaction. Fails with `ReportError::TransactionNotFound`
    /// when the id was never persisted.
    fn lookup(&self, id: TransactionId) -> Result<Transaction>;
}

/// The knowledge base: every finding reported so far, in report order.
///
/// Queried on every flush; the collection only grows during a scan.
pub trait FindingStore: Send + Sync {
    fn all(&self) -> Vec<Finding>;
}

/// Read-only view of the scan configuration.
pub trait ScanConfigProvider: Send + Sync {
    fn target(&self) -> String;

    /// Enabled plugin names for a phase, in configuration order.
    fn enabled_plugins(&self, phase: Phase) -> Vec<String>;

    /// Declared options of a plugin as (name, value), in declared order.
    fn options(&self, phase: Phase, plugin: &str) -> Vec<(String, String)>;
}
