use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{ReportError, Result};
use crate::model::{Finding, Transaction, TransactionId};

use super::{FindingStore, TransactionStore};

/// Transaction store backed by a map. Ids are write-once.
#[derive(Debug, Default)]
pub struct MemoryTransactionStore {
    transactions: RwLock<HashMap<TransactionId, Transaction>>,
}

impl MemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Persist a transaction. Returns `false` and keeps the stored copy when
    /// the id is already taken.
    pub fn insert(&self, transaction: Transaction) -> bool {
        let mut map = match self.transactions.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if map.contains_key(&transaction.id) {
            tracing::warn!(id = transaction.id, "transaction id already stored, ignoring");
            return false;
        }
        map.insert(transaction.id, transaction);
        true
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<TransactionId, Transaction>> {
        match self.transactions.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl FromIterator<Transaction> for MemoryTransactionStore {
    fn from_iter<I: IntoIterator<Item = Transaction>>(iter: I) -> Self {
        let store = Self::new();
        for tx in iter {
            store.insert(tx);
        }
        store
    }
}

impl TransactionStore for MemoryTransactionStore {
    fn lookup(&self, id: TransactionId) -> Result<Transaction> {
        self.read()
            .get(&id)
            .cloned()
            .ok_or(ReportError::TransactionNotFound(id))
    }
}

/// Append-only knowledge base.
#[derive(Debug, Default)]
pub struct MemoryFindingStore {
    findings: RwLock<Vec<Finding>>,
}

impl MemoryFindingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, finding: Finding) {
        let mut findings = match self.findings.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        findings.push(finding);
    }

    pub fn len(&self) -> usize {
        match self.findings.read() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<Finding> for MemoryFindingStore {
    fn from_iter<I: IntoIterator<Item = Finding>>(iter: I) -> Self {
        Self {
            findings: RwLock::new(iter.into_iter().collect()),
        }
    }
}

impl FindingStore for MemoryFindingStore {
    fn all(&self) -> Vec<Finding> {
        match self.findings.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
