//! Core data types for sitemap sources, fetched locations and per-source outcomes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// One configured sitemap: a remote URL or a local file path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub url: String,
    pub lang: String,
    /// Any other configured keys, carried through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SourceDescriptor {
    /// Create a descriptor with no passthrough fields.
    pub fn new(url: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            lang: lang.into(),
            extra: serde_json::Map::new(),
        }
    }

    /// Attach a passthrough field.
    pub fn with_field(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// Options applied identically to every remote fetch in a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportOptions {
    /// Basic credentials, usually `user:password`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,
    pub headers: BTreeMap<String, String>,
    /// Per-request timeout. `None` waits indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl TransportOptions {
    /// `Authorization` value for `auth`, encoded exactly as given.
    pub fn basic_authorization(&self) -> Option<String> {
        let auth = self.auth.as_deref()?;
        Some(format!("Basic {}", STANDARD.encode(auth)))
    }
}

/// One extracted `<loc>` value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationEntry {
    pub url: String,
    pub lang: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// Whether the extractor reads the `action` attribute of `<loc>` elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeSupport {
    /// Remote fetches carry `action` into the entry.
    Action,
    /// Local files ignore attributes.
    None,
}

/// What happens to a local source whose path does not exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingSourcePolicy {
    /// Report it with [`SourceStatus::Missing`] and no entries.
    #[default]
    Complete,
    /// Emit the diagnostic only; no report is delivered.
    Skip,
}

/// Terminal outcome of processing one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceStatus {
    Fetched,
    HttpStatus { code: u16 },
    Transport { message: String },
    InvalidUrl { message: String },
    Parse { message: String },
    Read { message: String },
    Missing,
    Aborted { message: String },
}

impl SourceStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, SourceStatus::Fetched)
    }
}

impl From<&HarvestError> for SourceStatus {
    fn from(err: &HarvestError) -> Self {
        match err {
            HarvestError::Status(code) => SourceStatus::HttpStatus { code: *code },
            HarvestError::Transport(e) => SourceStatus::Transport {
                message: e.to_string(),
            },
            HarvestError::InvalidUrl { .. } => SourceStatus::InvalidUrl {
                message: err.to_string(),
            },
            HarvestError::Parse { message, .. } => SourceStatus::Parse {
                message: message.clone(),
            },
            HarvestError::InvalidSource(_) => SourceStatus::Missing,
            HarvestError::Read { source, .. } => SourceStatus::Read {
                message: source.to_string(),
            },
            other => SourceStatus::Aborted {
                message: other.to_string(),
            },
        }
    }
}

/// Completion payload: delivered exactly once per processed source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceReport {
    pub source: SourceDescriptor,
    pub entries: Vec<LocationEntry>,
    pub status: SourceStatus,
}

impl SourceReport {
    pub fn new(source: SourceDescriptor, entries: Vec<LocationEntry>, status: SourceStatus) -> Self {
        Self {
            source,
            entries,
            status,
        }
    }

    /// A report with no entries.
    pub fn empty(source: SourceDescriptor, status: SourceStatus) -> Self {
        Self::new(source, Vec::new(), status)
    }
}

/// Everything needed for one harvest run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HarvestConfig {
    pub sitemaps: Vec<SourceDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<TransportOptions>,
}

impl HarvestConfig {
    /// Parse a JSON config document.
    pub fn from_json_str(json: &str) -> HarvestResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> HarvestResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            HarvestError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&raw)
    }

    /// Transport options, or the defaults when no `http` block is configured.
    pub fn transport(&self) -> TransportOptions {
        self.http.clone().unwrap_or_default()
    }
}

/// Errors that can occur while harvesting sitemaps.
#[derive(thiserror::Error, Debug)]
pub enum HarvestError {
    #[error("Invalid source url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Status code returned {0}")]
    Status(u16),

    #[error("Parse error at byte {position}: {message}")]
    Parse { message: String, position: u64 },

    #[error("Sitemap url not valid: {}", .0.display())]
    InvalidSource(PathBuf),

    #[error("Read error for {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result type.
pub type HarvestResult<T> = Result<T, HarvestError>;
