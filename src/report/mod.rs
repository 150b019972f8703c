//! The incremental report writer.
//!
//! [`XmlReportWriter::flush`] can be called any number of times while a scan
//! runs. Each call renders only findings it has not seen before, appends them
//! to the accumulated list and rewrites the whole document through a
//! temporary file, so the file on disk is always a complete XML document.

use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tempfile::NamedTempFile;

use crate::config::OutputConfig;
use crate::error::Result;
use crate::model::{FindingId, ScanInfo};
use crate::store::{FindingStore, ScanConfigProvider, TransactionStore};
use crate::xml::document::{self, DocumentHeader};
use crate::xml::{scan_info, strip_control_chars, FindingRenderer, TransactionCache};

enum Stage {
    /// No flush yet; the scan configuration has not been captured.
    Uninitialized,
    /// Scan info rendered; reused verbatim by every later flush.
    Active { scan_info: String },
}

struct ReportState {
    stage: Stage,
    /// Write-once set of finding ids already rendered.
    emitted: HashSet<FindingId>,
    /// Rendered findings, in discovery order.
    fragments: Vec<String>,
    /// Sanitized diagnostic messages.
    errors: Vec<String>,
}

/// Outcome of one flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushSummary {
    /// Findings rendered by this flush.
    pub new_findings: usize,
    /// Findings in the document after this flush.
    pub total_findings: usize,
}

pub struct XmlReportWriter {
    output_file: PathBuf,
    header: DocumentHeader,
    findings: Arc<dyn FindingStore>,
    scan_config: Arc<dyn ScanConfigProvider>,
    transactions: Arc<TransactionCache>,
    renderer: FindingRenderer,
    state: Mutex<ReportState>,
}

impl XmlReportWriter {
    /// Build a writer for `output`. The destination is validated here, so an
    /// unwritable path fails scan setup instead of the first flush.
    pub fn new(
        output: &OutputConfig,
        transactions: Arc<dyn TransactionStore>,
        findings: Arc<dyn FindingStore>,
        scan_config: Arc<dyn ScanConfigProvider>,
    ) -> Result<Self> {
        output.validate()?;

        let cache = Arc::new(TransactionCache::new(transactions));
        Ok(Self {
            output_file: output.output_file.clone(),
            header: DocumentHeader::new(Utc::now()),
            findings,
            scan_config,
            transactions: cache.clone(),
            renderer: FindingRenderer::new(cache),
            state: Mutex::new(ReportState {
                stage: Stage::Uninitialized,
                emitted: HashSet::new(),
                fragments: Vec::new(),
                errors: Vec::new(),
            }),
        })
    }

    pub fn transaction_cache(&self) -> &TransactionCache {
        &self.transactions
    }

    /// Whether the first flush has happened.
    pub fn is_active(&self) -> bool {
        matches!(self.lock().stage, Stage::Active { .. })
    }

    /// Number of findings written so far.
    pub fn emitted_count(&self) -> usize {
        self.lock().fragments.len()
    }

    /// Record a diagnostic message for the report. Control characters are
    /// stripped; a message of only NUL bytes becomes an empty entry.
    pub fn error(&self, message: &str) {
        let clean = strip_control_chars(message).into_owned();
        self.lock().errors.push(clean);
    }

    /// Render new findings and rewrite the report.
    ///
    /// Calls are serialized. With no new findings and no new errors the file
    /// is rewritten with byte-identical content.
    pub fn flush(&self) -> Result<FlushSummary> {
        let mut state = self.lock();

        let scan_info = self.activate(&mut state);

        let mut new_findings = 0;
        for finding in self.findings.all() {
            if state.emitted.contains(&finding.id) {
                continue;
            }
            let fragment = self.renderer.render(&finding);
            state.emitted.insert(finding.id);
            state.fragments.push(fragment);
            new_findings += 1;
        }

        let content = document::render(&self.header, &scan_info, &state.fragments, &state.errors);

        if let Err(e) = write_atomically(&self.output_file, &content) {
            tracing::warn!(
                path = %self.output_file.display(),
                error = %e,
                "failed to write XML report"
            );
            return Err(e);
        }

        let summary = FlushSummary {
            new_findings,
            total_findings: state.fragments.len(),
        };
        tracing::debug!(
            new = summary.new_findings,
            total = summary.total_findings,
            cached_transactions = self.transactions.len(),
            "flushed XML report"
        );
        Ok(summary)
    }

    /// Final flush at scan shutdown. Releases the transaction cache.
    pub fn end(&self) -> Result<FlushSummary> {
        let summary = self.flush()?;
        self.transactions.clear();
        tracing::info!(
            path = %self.output_file.display(),
            findings = summary.total_findings,
            "XML report complete"
        );
        Ok(summary)
    }

    /// Scan-info fragment, capturing the configuration on first use.
    fn activate(&self, state: &mut ReportState) -> String {
        if let Stage::Active { scan_info } = &state.stage {
            return scan_info.clone();
        }

        let info = ScanInfo::capture(self.scan_config.as_ref());
        tracing::debug!(scan_target = %info.target, "captured scan configuration");
        let rendered = scan_info::render(&info);
        state.stage = Stage::Active {
            scan_info: rendered.clone(),
        };
        rendered
    }

    fn lock(&self) -> MutexGuard<'_, ReportState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Replace `path` with `content` via a temporary file in the same directory.
/// On any failure the temporary file is removed and `path` is untouched.
///
/// The replacement keeps the permissions of the file it replaces. A new
/// report gets `0644`.
fn write_atomically(path: &Path, content: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    let permissions = match fs::metadata(path) {
        Ok(existing) => existing.permissions(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => new_report_permissions(tmp.as_file())?,
        Err(e) => return Err(e.into()),
    };
    tmp.as_file().set_permissions(permissions)?;

    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}

#[cfg(unix)]
fn new_report_permissions(_tmp: &fs::File) -> io::Result<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Ok(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_report_permissions(tmp: &fs::File) -> io::Result<fs::Permissions> {
    Ok(tmp.metadata()?.permissions())
}
