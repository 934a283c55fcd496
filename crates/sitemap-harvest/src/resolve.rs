//! Classify a source as remote or local and split remote URLs into parts.

use std::path::PathBuf;

use url::Url;

use crate::types::{HarvestError, HarvestResult, SourceDescriptor};

/// Where a source's content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Remote(RemoteTarget),
    /// Path relative to the process working directory unless absolute.
    Local(PathBuf),
}

/// A remote sitemap URL broken into its request parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTarget {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    /// Path plus query string, without fragment.
    pub path: String,
}

impl RemoteTarget {
    /// Encrypted transport is used only for `https`.
    pub fn is_secure(&self) -> bool {
        self.scheme == "https"
    }

    /// The URL the GET request is sent to.
    pub fn request_url(&self) -> String {
        let scheme = if self.is_secure() { "https" } else { "http" };
        format!("{scheme}://{}:{}{}", self.host, self.port, self.path)
    }
}

/// True when the descriptor should be fetched over the network.
pub fn is_remote(url: &str) -> bool {
    url.starts_with("http")
}

/// Resolve a descriptor to a remote target or local path.
pub fn resolve(source: &SourceDescriptor) -> HarvestResult<SourceLocation> {
    if !is_remote(&source.url) {
        return Ok(SourceLocation::Local(PathBuf::from(&source.url)));
    }

    let parsed = Url::parse(&source.url).map_err(|e| HarvestError::InvalidUrl {
        url: source.url.clone(),
        reason: e.to_string(),
    })?;

    let host = parsed
        .host_str()
        .ok_or_else(|| HarvestError::InvalidUrl {
            url: source.url.clone(),
            reason: "missing host".to_string(),
        })?
        .to_string();

    let scheme = parsed.scheme().to_string();
    let default_port = if scheme == "https" { 443 } else { 80 };
    let port = parsed.port().unwrap_or(default_port);

    let mut path = parsed.path().to_string();
    if let Some(query) = parsed.query() {
        path.push('?');
        path.push_str(query);
    }

    Ok(SourceLocation::Remote(RemoteTarget {
        scheme,
        host,
        port,
        path,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(url: &str) -> RemoteTarget {
        match resolve(&SourceDescriptor::new(url, "en")).unwrap() {
            SourceLocation::Remote(target) => target,
            other => panic!("expected remote, got {other:?}"),
        }
    }

    #[test]
    fn test_https_defaults_to_443() {
        let target = remote("https://example.com/sitemap.xml");
        assert_eq!(target.scheme, "https");
        assert_eq!(target.host, "example.com");
        assert_eq!(target.port, 443);
        assert_eq!(target.path, "/sitemap.xml");
        assert!(target.is_secure());
    }

    #[test]
    fn test_http_defaults_to_80() {
        let target = remote("http://example.com");
        assert_eq!(target.port, 80);
        assert_eq!(target.path, "/");
        assert_eq!(target.request_url(), "http://example.com:80/");
    }

    #[test]
    fn test_explicit_port_and_query_kept_fragment_dropped() {
        let target = remote("http://localhost:8080/maps/site.xml?page=2&lang=de#top");
        assert_eq!(target.host, "localhost");
        assert_eq!(target.port, 8080);
        assert_eq!(target.path, "/maps/site.xml?page=2&lang=de");
        assert_eq!(
            target.request_url(),
            "http://localhost:8080/maps/site.xml?page=2&lang=de"
        );
    }

    #[test]
    fn test_non_http_prefix_is_local() {
        let resolved = resolve(&SourceDescriptor::new("fixtures/sitemap.xml", "fr")).unwrap();
        assert_eq!(
            resolved,
            SourceLocation::Local(PathBuf::from("fixtures/sitemap.xml"))
        );
        assert!(!is_remote("/var/www/sitemap.xml"));
        assert!(!is_remote("ftp://example.com/sitemap.xml"));
    }

    #[test]
    fn test_http_prefixed_garbage_is_invalid_url() {
        let result = resolve(&SourceDescriptor::new("httpnonsense", "en"));
        assert!(matches!(result, Err(HarvestError::InvalidUrl { .. })));
    }
}
