//! The fetch-then-extract pipeline.
//!
//! Each source is spawned as its own task and owns its own entry list.
//! Whatever happens to a source (HTTP error, refused connection, missing
//! file, broken markup, even a panic) it is reported exactly once, and no
//! failure reaches the caller or any other source.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, info};

use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::extract::extract_locations;
use crate::fetch::ContentFetcher;
use crate::resolve::{resolve, SourceLocation};
use crate::types::{
    AttributeSupport, HarvestConfig, HarvestError, HarvestResult, MissingSourcePolicy,
    SourceDescriptor, SourceReport, SourceStatus, TransportOptions,
};

/// Runs the pipeline for a set of sources.
#[derive(Clone)]
pub struct Harvester {
    fetcher: ContentFetcher,
    sink: Arc<dyn DiagnosticSink>,
    missing: MissingSourcePolicy,
}

impl Harvester {
    /// Create a harvester that logs through `tracing`.
    pub fn new(options: &TransportOptions) -> HarvestResult<Self> {
        Ok(Self {
            fetcher: ContentFetcher::new(options)?,
            sink: Arc::new(TracingSink),
            missing: MissingSourcePolicy::default(),
        })
    }

    /// Create a harvester for a loaded config.
    pub fn from_config(config: &HarvestConfig) -> HarvestResult<Self> {
        Self::new(&config.transport())
    }

    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_missing_policy(mut self, policy: MissingSourcePolicy) -> Self {
        self.missing = policy;
        self
    }

    /// Fetch and extract a single source. Never fails: every error becomes a
    /// diagnostic plus the report's status.
    pub async fn process(&self, source: &SourceDescriptor) -> SourceReport {
        let outcome = match resolve(source) {
            Ok(SourceLocation::Remote(target)) => {
                debug!("fetching {} from {}:{}", source.url, target.host, target.port);
                self.fetcher
                    .fetch_remote(&target)
                    .await
                    .map(|body| (body, AttributeSupport::Action))
            }
            Ok(SourceLocation::Local(path)) => {
                debug!("reading {}", path.display());
                self.fetcher
                    .fetch_local(&path)
                    .await
                    .map(|body| (body, AttributeSupport::None))
            }
            Err(e) => Err(e),
        };

        let (body, attributes) = match outcome {
            Ok(fetched) => fetched,
            Err(e) => {
                self.report_failure(source, &e);
                return SourceReport::empty(source.clone(), SourceStatus::from(&e));
            }
        };

        match extract_locations(&body, source, attributes, self.sink.as_ref()) {
            Ok(entries) => {
                debug!("{} locations from {}", entries.len(), source.url);
                SourceReport::new(source.clone(), entries, SourceStatus::Fetched)
            }
            Err(e) => {
                self.report_failure(source, &e);
                SourceReport::empty(source.clone(), SourceStatus::from(&e))
            }
        }
    }

    /// Process every source concurrently and return the reports in input order.
    pub async fn harvest(&self, sources: &[SourceDescriptor]) -> Vec<SourceReport> {
        let mut indexed = Vec::with_capacity(sources.len());
        self.dispatch(sources, |index, report| indexed.push((index, report)))
            .await;
        indexed.sort_by_key(|(index, _)| *index);
        indexed.into_iter().map(|(_, report)| report).collect()
    }

    /// Process every source concurrently, calling `on_complete` as each one
    /// finishes. Returns how many notifications were delivered.
    pub async fn harvest_with<F>(&self, sources: &[SourceDescriptor], mut on_complete: F) -> usize
    where
        F: FnMut(SourceReport),
    {
        let mut delivered = 0;
        self.dispatch(sources, |_, report| {
            delivered += 1;
            on_complete(report);
        })
        .await;
        delivered
    }

    async fn dispatch<F>(&self, sources: &[SourceDescriptor], mut notify: F)
    where
        F: FnMut(usize, SourceReport),
    {
        info!("harvesting {} sitemap sources", sources.len());

        let mut pending: FuturesUnordered<_> = sources
            .iter()
            .cloned()
            .enumerate()
            .map(|(index, source)| {
                let harvester = self.clone();
                let handle = tokio::spawn(async move { harvester.process(&source).await });
                async move { (index, handle.await) }
            })
            .collect();

        let mut completed = 0usize;
        while let Some((index, joined)) = pending.next().await {
            let report = match joined {
                Ok(report) => report,
                Err(e) => {
                    let source = &sources[index];
                    let message = e.to_string();
                    self.sink
                        .error(&format!("Processing {} aborted", source.url), Some(message.as_str()));
                    SourceReport::empty(source.clone(), SourceStatus::Aborted { message })
                }
            };

            if report.status == SourceStatus::Missing && self.missing == MissingSourcePolicy::Skip {
                continue;
            }
            completed += 1;
            notify(index, report);
        }

        info!("harvest finished: {completed} of {} sources reported", sources.len());
    }

    fn report_failure(&self, source: &SourceDescriptor, err: &HarvestError) {
        match err {
            HarvestError::Parse { message, position } => self.sink.error(
                &format!("Could not parse {}: {message}", source.url),
                Some(format!("at byte {position}").as_str()),
            ),
            HarvestError::Status(code) => self
                .sink
                .error(&format!("Status code returned {code} for {}", source.url), None),
            HarvestError::InvalidSource(_) => self.sink.error(&err.to_string(), None),
            other => self
                .sink
                .error(&format!("Fetching {} failed: {other}", source.url), None),
        }
    }
}

/// Harvest every sitemap in `config` with default logging.
pub async fn harvest(config: &HarvestConfig) -> HarvestResult<Vec<SourceReport>> {
    let harvester = Harvester::from_config(config)?;
    Ok(harvester.harvest(&config.sitemaps).await)
}
