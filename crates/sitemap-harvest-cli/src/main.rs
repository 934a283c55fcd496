//! sitemap-harvest — entry point.

mod config;

use std::io::Write;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use config::resolve_config_path;
use sitemap_harvest::{resolve, HarvestConfig, Harvester, MissingSourcePolicy, SourceLocation};

#[derive(Parser)]
#[command(
    name = "sitemap-harvest",
    about = "Fetch sitemaps and print their locations as JSON lines",
    version
)]
struct Cli {
    /// Path to the JSON sitemap config.
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Per-request timeout in milliseconds (overrides http.timeout_ms).
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Do not report local sources whose path does not exist.
    #[arg(long, global = true)]
    skip_missing: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every configured sitemap (default).
    Run,

    /// Show how each configured source resolves, without fetching.
    Check,

    /// Generate shell completion scripts.
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let config_path = resolve_config_path(cli.config.as_deref());
            tracing::info!("Config: {config_path}");
            let config = HarvestConfig::load(&config_path)
                .with_context(|| format!("failed to load {config_path}"))?;

            let mut transport = config.transport();
            if cli.timeout_ms.is_some() {
                transport.timeout_ms = cli.timeout_ms;
            }
            let policy = if cli.skip_missing {
                MissingSourcePolicy::Skip
            } else {
                MissingSourcePolicy::Complete
            };
            let harvester = Harvester::new(&transport)?.with_missing_policy(policy);

            let stdout = std::io::stdout();
            let mut failed_writes = 0usize;
            let delivered = harvester
                .harvest_with(&config.sitemaps, |report| {
                    let line = serde_json::to_string(&report).unwrap_or_default();
                    let mut out = stdout.lock();
                    if writeln!(out, "{line}").is_err() {
                        failed_writes += 1;
                    }
                })
                .await;

            tracing::info!(
                "{delivered} of {} sources reported",
                config.sitemaps.len()
            );
            if failed_writes > 0 {
                anyhow::bail!("{failed_writes} reports could not be written to stdout");
            }
        }

        Commands::Check => {
            let config_path = resolve_config_path(cli.config.as_deref());
            let config = HarvestConfig::load(&config_path)
                .with_context(|| format!("failed to load {config_path}"))?;

            println!("Config: {config_path}");
            println!("  Sources: {}", config.sitemaps.len());
            for source in &config.sitemaps {
                match resolve(source) {
                    Ok(SourceLocation::Remote(target)) => println!(
                        "  [remote] {} ({}) -> {}:{}{}",
                        source.url, source.lang, target.host, target.port, target.path
                    ),
                    Ok(SourceLocation::Local(path)) => {
                        let state = if path.exists() { "ok" } else { "missing" };
                        println!("  [local]  {} ({}) -> {state}", source.url, source.lang);
                    }
                    Err(e) => println!("  [error]  {} ({}) -> {e}", source.url, source.lang),
                }
            }
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "sitemap-harvest", &mut std::io::stdout());
        }
    }

    Ok(())
}
