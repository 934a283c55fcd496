//! Diagnostic sinks: where per-source warnings and failures are reported.
//!
//! The pipeline never returns per-source errors to the caller. Instead every
//! failure is turned into a diagnostic and handed to the injected
//! [`DiagnosticSink`]. [`TracingSink`] forwards to `tracing`;
//! [`CaptureSink`] keeps everything in memory so callers can inspect it.

use std::sync::Mutex;

use serde::Serialize;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Warn,
    Error,
}

/// A single recorded diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Receives diagnostics from the harvest pipeline.
pub trait DiagnosticSink: Send + Sync {
    fn warn(&self, message: &str);
    fn error(&self, message: &str, detail: Option<&str>);
}

/// Forwards diagnostics to the `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
    }

    fn error(&self, message: &str, detail: Option<&str>) {
        match detail {
            Some(detail) => tracing::error!(detail, "{message}"),
            None => tracing::error!("{message}"),
        }
    }
}

/// Records diagnostics in memory.
#[derive(Debug, Default)]
pub struct CaptureSink {
    records: Mutex<Vec<Diagnostic>>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far, in arrival order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.lock().clone()
    }

    pub fn warnings(&self) -> Vec<Diagnostic> {
        self.with_level(Level::Warn)
    }

    pub fn errors(&self) -> Vec<Diagnostic> {
        self.with_level(Level::Error)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn with_level(&self, level: Level) -> Vec<Diagnostic> {
        self.lock()
            .iter()
            .filter(|d| d.level == level)
            .cloned()
            .collect()
    }

    fn push(&self, level: Level, message: &str, detail: Option<&str>) {
        self.lock().push(Diagnostic {
            level,
            message: message.to_string(),
            detail: detail.map(str::to_string),
        });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Diagnostic>> {
        // A panic while holding the lock leaves the Vec intact.
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl DiagnosticSink for CaptureSink {
    fn warn(&self, message: &str) {
        self.push(Level::Warn, message, None);
    }

    fn error(&self, message: &str, detail: Option<&str>) {
        self.push(Level::Error, message, detail);
    }
}
