//! sitemap-harvest — fetch sitemaps from URLs or local files and extract their
//! location entries.
//!
//! ```no_run
//! use sitemap_harvest::{harvest, HarvestConfig};
//!
//! # async fn run() -> sitemap_harvest::HarvestResult<()> {
//! let config = HarvestConfig::load("sitemaps.json")?;
//! for report in harvest(&config).await? {
//!     println!("{}: {} locations", report.source.url, report.entries.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod diagnostics;
pub mod extract;
pub mod fetch;
pub mod harvest;
pub mod resolve;
pub mod types;

pub use diagnostics::{CaptureSink, Diagnostic, DiagnosticSink, Level, TracingSink};
pub use extract::extract_locations;
pub use fetch::ContentFetcher;
pub use harvest::{harvest, Harvester};
pub use resolve::{is_remote, resolve, RemoteTarget, SourceLocation};
pub use types::*;
