//! Observer hooks for pipeline outcomes.
//!
//! Ingestion and the RFM pipeline report to an optional [`PipelineObserver`] configured on
//! [`crate::config::RfmOptions`]. Observers can log, record metrics, or raise alerts.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::RfmError;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (operation failed).
    Error,
    /// Critical error (typically I/O or other infrastructure failures).
    Critical,
}

impl PipelineSeverity {
    /// Severity of a failure with the given error.
    pub fn for_error(error: &RfmError) -> Self {
        match error {
            RfmError::Io(_) => PipelineSeverity::Critical,
            RfmError::Csv(err) => match err.kind() {
                ::csv::ErrorKind::Io(_) => PipelineSeverity::Critical,
                _ => PipelineSeverity::Error,
            },
            RfmError::Json(err) if err.is_io() => PipelineSeverity::Critical,
            _ => PipelineSeverity::Error,
        }
    }
}

/// Pipeline stage an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Ingest,
    Prepare,
    Calculate,
    Segment,
    Write,
}

/// Context about a pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineContext {
    pub stage: PipelineStage,
    /// File read or written by the stage, if any.
    pub path: Option<PathBuf>,
}

impl PipelineContext {
    pub fn new(stage: PipelineStage) -> Self {
        Self { stage, path: None }
    }

    pub fn with_path(stage: PipelineStage, path: impl AsRef<Path>) -> Self {
        Self {
            stage,
            path: Some(path.as_ref().to_path_buf()),
        }
    }

    fn path_display(&self) -> String {
        self.path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string())
    }
}

/// Minimal stats reported when a stage succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageStats {
    /// Rows produced by the stage (transactions, customers, or written lines).
    pub rows: usize,
}

/// Observer interface for pipeline outcomes.
pub trait PipelineObserver: Send + Sync {
    /// Called when a stage succeeds.
    fn on_success(&self, _ctx: &PipelineContext, _stats: StageStats) {}

    /// Called when a stage fails.
    fn on_failure(&self, _ctx: &PipelineContext, _severity: PipelineSeverity, _error: &RfmError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &PipelineContext, severity: PipelineSeverity, error: &RfmError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Reports a stage result to `observer`, raising an alert when severity reaches `alert_at`.
pub(crate) fn report<T>(
    observer: Option<&Arc<dyn PipelineObserver>>,
    alert_at: PipelineSeverity,
    ctx: &PipelineContext,
    result: &Result<T, RfmError>,
    rows: impl FnOnce(&T) -> usize,
) {
    let Some(obs) = observer else {
        return;
    };
    match result {
        Ok(value) => obs.on_success(ctx, StageStats { rows: rows(value) }),
        Err(e) => {
            let sev = PipelineSeverity::for_error(e);
            obs.on_failure(ctx, sev, e);
            if sev >= alert_at {
                obs.on_alert(ctx, sev, e);
            }
        }
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn PipelineObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn PipelineObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl PipelineObserver for CompositeObserver {
    fn on_success(&self, ctx: &PipelineContext, stats: StageStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &PipelineContext, severity: PipelineSeverity, error: &RfmError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &PipelineContext, severity: PipelineSeverity, error: &RfmError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Logs pipeline events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl PipelineObserver for StdErrObserver {
    fn on_success(&self, ctx: &PipelineContext, stats: StageStats) {
        eprintln!(
            "[rfm][ok] stage={:?} path={} rows={}",
            ctx.stage,
            ctx.path_display(),
            stats.rows
        );
    }

    fn on_failure(&self, ctx: &PipelineContext, severity: PipelineSeverity, error: &RfmError) {
        eprintln!(
            "[rfm][{:?}] stage={:?} path={} err={}",
            severity,
            ctx.stage,
            ctx.path_display(),
            error
        );
    }

    fn on_alert(&self, ctx: &PipelineContext, severity: PipelineSeverity, error: &RfmError) {
        eprintln!(
            "[ALERT][rfm][{:?}] stage={:?} path={} err={}",
            severity,
            ctx.stage,
            ctx.path_display(),
            error
        );
    }
}

/// Forwards pipeline events to `tracing` (info on success, error on failure/alert).
#[derive(Debug, Default)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_success(&self, ctx: &PipelineContext, stats: StageStats) {
        tracing::info!(stage = ?ctx.stage, path = %ctx.path_display(), rows = stats.rows, "stage finished");
    }

    fn on_failure(&self, ctx: &PipelineContext, severity: PipelineSeverity, error: &RfmError) {
        tracing::error!(stage = ?ctx.stage, path = %ctx.path_display(), ?severity, error = %error, "stage failed");
    }

    fn on_alert(&self, ctx: &PipelineContext, severity: PipelineSeverity, error: &RfmError) {
        tracing::error!(stage = ?ctx.stage, path = %ctx.path_display(), ?severity, error = %error, alert = true, "stage failed");
    }
}

/// Appends pipeline events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl PipelineObserver for FileObserver {
    fn on_success(&self, ctx: &PipelineContext, stats: StageStats) {
        self.append_line(&format!(
            "{} ok stage={:?} path={} rows={}",
            unix_ts(),
            ctx.stage,
            ctx.path_display(),
            stats.rows
        ));
    }

    fn on_failure(&self, ctx: &PipelineContext, severity: PipelineSeverity, error: &RfmError) {
        self.append_line(&format!(
            "{} fail severity={:?} stage={:?} path={} err={}",
            unix_ts(),
            severity,
            ctx.stage,
            ctx.path_display(),
            error
        ));
    }

    fn on_alert(&self, ctx: &PipelineContext, severity: PipelineSeverity, error: &RfmError) {
        self.append_line(&format!(
            "{} ALERT severity={:?} stage={:?} path={} err={}",
            unix_ts(),
            severity,
            ctx.stage,
            ctx.path_display(),
            error
        ));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
