//! Config file discovery.

use std::path::Path;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "SITEMAP_HARVEST_CONFIG";

/// Resolve the sitemap config path.
///
/// Order: explicit flag, `SITEMAP_HARVEST_CONFIG`, `./sitemaps.json`, then
/// `~/.sitemap-harvest/sitemaps.json`.
pub fn resolve_config_path(explicit: Option<&str>) -> String {
    resolve_in(explicit, std::env::var(CONFIG_ENV).ok(), Path::new("."))
}

fn resolve_in(explicit: Option<&str>, from_env: Option<String>, cwd: &Path) -> String {
    if let Some(path) = explicit {
        return path.to_string();
    }

    if let Some(env_path) = from_env {
        return env_path;
    }

    let cwd_config = cwd.join("sitemaps.json");
    if cwd_config.is_file() {
        return cwd_config.display().to_string();
    }

    resolve_default_config_path()
}

fn resolve_default_config_path() -> String {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());

    format!("{home}/.sitemap-harvest/sitemaps.json")
}
