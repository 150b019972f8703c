use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};

const DEFAULT_OUTPUT_FILE: &str = "scan-report.xml";

/// Top-level configuration from `scanxml.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load config from a TOML file. Returns default if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Generate a starter config file.
    pub fn starter_toml() -> &'static str {
        r#"# scanxml configuration

[output]
# Where the XML report is written. The file is rewritten in place on every
# flush; its directory must exist and be writable before the scan starts.
output_file = "scan-report.xml"
"#
    }
}

/// Destination of the XML report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,
}

fn default_output_file() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_FILE)
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_file: default_output_file(),
        }
    }
}

impl OutputConfig {
    pub fn new(output_file: impl Into<PathBuf>) -> Self {
        Self {
            output_file: output_file.into(),
        }
    }

    /// Directory the report (and its temporary sibling) is written to.
    pub fn output_dir(&self) -> &Path {
        match self.output_file.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }

    /// Check that the report can be written, before any scanning starts.
    ///
    /// Probes the directory by creating and removing a temporary file there,
    /// which is exactly what every flush does.
    pub fn validate(&self) -> Result<()> {
        let path = &self.output_file;
        if path.as_os_str().is_empty() {
            return Err(ReportError::Config("output_file must not be empty".into()));
        }
        if path.is_dir() {
            return Err(ReportError::Config(format!(
                "output_file {} is a directory",
                path.display()
            )));
        }

        let dir = self.output_dir();
        if !dir.is_dir() {
            return Err(ReportError::Config(format!(
                "directory {} for output_file does not exist",
                dir.display()
            )));
        }

        if let Ok(metadata) = std::fs::metadata(path) {
            if metadata.permissions().readonly() {
                return Err(ReportError::Config(format!(
                    "output_file {} is read-only",
                    path.display()
                )));
            }
        }

        tempfile::NamedTempFile::new_in(dir).map_err(|e| {
            ReportError::Config(format!(
                "cannot write to {} for output_file: {}",
                dir.display(),
                e
            ))
        })?;

        Ok(())
    }
}
