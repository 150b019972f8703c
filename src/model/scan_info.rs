use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::store::ScanConfigProvider;

/// Scan phases, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Audit,
    Infrastructure,
    Bruteforce,
    Grep,
    Evasion,
    Output,
    Mangle,
    Crawl,
    Auth,
}

impl Phase {
    pub const ALL: [Phase; 9] = [
        Phase::Audit,
        Phase::Infrastructure,
        Phase::Bruteforce,
        Phase::Grep,
        Phase::Evasion,
        Phase::Output,
        Phase::Mangle,
        Phase::Crawl,
        Phase::Auth,
    ];

    /// Element name used for this phase in the report.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Audit => "audit",
            Self::Infrastructure => "infrastructure",
            Self::Bruteforce => "bruteforce",
            Self::Grep => "grep",
            Self::Evasion => "evasion",
            Self::Output => "output",
            Self::Mangle => "mangle",
            Self::Crawl => "crawl",
            Self::Auth => "auth",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginOption {
    pub name: String,
    pub value: String,
}

/// An enabled plugin and its options in declared order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginConfig {
    pub name: String,
    #[serde(default)]
    pub options: Vec<PluginOption>,
}

impl PluginConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Vec::new(),
        }
    }

    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push(PluginOption {
            name: name.into(),
            value: value.into(),
        });
        self
    }
}

/// Snapshot of the scan configuration taken when the report is started.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScanInfo {
    pub target: String,
    #[serde(default)]
    pub plugins: BTreeMap<Phase, Vec<PluginConfig>>,
}

impl ScanInfo {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            plugins: BTreeMap::new(),
        }
    }

    pub fn with_plugin(mut self, phase: Phase, plugin: PluginConfig) -> Self {
        self.plugins.entry(phase).or_default().push(plugin);
        self
    }

    /// Enabled plugins for `phase`; empty when none are enabled.
    pub fn plugins_in(&self, phase: Phase) -> &[PluginConfig] {
        self.plugins.get(&phase).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Read the full configuration from a provider.
    pub fn capture(provider: &dyn ScanConfigProvider) -> Self {
        let mut plugins = BTreeMap::new();
        for phase in Phase::ALL {
            let enabled: Vec<PluginConfig> = provider
                .enabled_plugins(phase)
                .into_iter()
                .map(|name| {
                    let options = provider
                        .options(phase, &name)
                        .into_iter()
                        .map(|(name, value)| PluginOption { name, value })
                        .collect();
                    PluginConfig { name, options }
                })
                .collect();
            if !enabled.is_empty() {
                plugins.insert(phase, enabled);
            }
        }

        Self {
            target: provider.target(),
            plugins,
        }
    }
}

/// A snapshot is itself a provider, so a scan dump can feed the writer.
impl ScanConfigProvider for ScanInfo {
    fn target(&self) -> String {
        self.target.clone()
    }

    fn enabled_plugins(&self, phase: Phase) -> Vec<String> {
        self.plugins_in(phase).iter().map(|p| p.name.clone()).collect()
    }

    fn options(&self, phase: Phase, plugin: &str) -> Vec<(String, String)> {
        self.plugins_in(phase)
            .iter()
            .find(|p| p.name == plugin)
            .map(|p| {
                p.options
                    .iter()
                    .map(|o| (o.name.clone(), o.value.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}
