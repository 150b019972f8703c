use serde::{Deserialize, Serialize};

use super::TransactionId;

/// Identifier of a finding in the findings store.
pub type FindingId = String;

/// A security finding reported by a scan plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Unique, stable finding identifier.
    pub id: FindingId,
    /// Human-readable vulnerability name (e.g., "SQL injection").
    pub name: String,
    /// Free-text description of this instance.
    pub description: String,
    pub severity: Severity,
    /// Name of the plugin that produced the finding.
    pub plugin: String,
    #[serde(default)]
    pub url: Option<String>,
    /// HTTP method of the vulnerable request.
    #[serde(default)]
    pub method: Option<String>,
    /// Vulnerable parameter name, if any.
    #[serde(default)]
    pub var: Option<String>,
    /// Transactions that demonstrate the finding, in report order.
    #[serde(default)]
    pub transaction_ids: Vec<TransactionId>,
    /// Vulnerability database entry attached to the finding.
    #[serde(default)]
    pub details: Option<VulnDetails>,
}

impl Finding {
    pub fn new(
        id: impl Into<FindingId>,
        name: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
        plugin: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            severity,
            plugin: plugin.into(),
            url: None,
            method: None,
            var: None,
            transaction_ids: Vec::new(),
            details: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_var(mut self, var: impl Into<String>) -> Self {
        self.var = Some(var.into());
        self
    }

    pub fn with_transactions(mut self, ids: impl IntoIterator<Item = TransactionId>) -> Self {
        self.transaction_ids = ids.into_iter().collect();
        self
    }

    pub fn with_details(mut self, details: VulnDetails) -> Self {
        self.details = Some(details);
        self
    }

    /// Associated transaction ids in first-seen order, duplicates dropped.
    pub fn unique_transaction_ids(&self) -> Vec<TransactionId> {
        let mut ids: Vec<TransactionId> = Vec::with_capacity(self.transaction_ids.len());
        for id in &self.transaction_ids {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }
        ids
    }
}

/// Parsed leniently from dumps: `"High"`, `"high"`, `"Information"` and
/// `"informational"` are all accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "info" | "information" | "informational" => Some(Self::Info),
            "low" => Some(Self::Low),
            "medium" | "med" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

impl TryFrom<String> for Severity {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str_lenient(&value).ok_or_else(|| format!("unknown severity: {}", value))
    }
}

/// Severity text as it appears in the report.
impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "Information"),
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

/// Vulnerability database entry: the generic explanation of a finding type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VulnDetails {
    pub long_description: String,
    #[serde(default)]
    pub fix_guidance: String,
    #[serde(default)]
    pub fix_effort: String,
    #[serde(default)]
    pub references: Vec<Reference>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub url: String,
    pub title: String,
}
