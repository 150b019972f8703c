use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::model::{Finding, ScanInfo, Transaction};

use super::{MemoryFindingStore, MemoryTransactionStore};

/// A complete scan serialized as JSON: configuration, recorded transactions
/// and findings. Drives the `render` command.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanDump {
    pub scan: ScanInfo,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub findings: Vec<Finding>,
}

impl ScanDump {
    /// Load and check a dump file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let dump: ScanDump = serde_json::from_str(&content)?;
        dump.check()?;
        Ok(dump)
    }

    /// Reject dumps that reuse transaction ids. Dangling transaction
    /// references are allowed; they render as placeholders.
    pub fn check(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for tx in &self.transactions {
            if !seen.insert(tx.id) {
                return Err(ReportError::Dump(format!(
                    "transaction id {} appears more than once",
                    tx.id
                )));
            }
        }
        Ok(())
    }

    pub fn into_stores(self) -> (ScanInfo, MemoryTransactionStore, MemoryFindingStore) {
        let transactions = self.transactions.into_iter().collect();
        let findings = self.findings.into_iter().collect();
        (self.scan, transactions, findings)
    }
}
