//! Scripture Cache CLI
//!
//! Reads versions and chapters through the tiered cache and manages what is
//! cached.
//!
//! ```text
//! scripture-cache version 111
//! scripture-cache chapter 111 JHN.3
//! scripture-cache purge --permitted 111,59
//! scripture-cache drop-chapters 111
//! scripture-cache list
//! ```

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use scripture_cache::adapters::{HttpBibleClient, InMemoryStorage};
use scripture_cache::config::{CacheConfig, ClientConfig, ContextConfig, DEFAULT_API_URL};
use scripture_cache::{BibleReference, BibleVersionCache, CacheTier, ReaderContext, VersionId};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Scripture Cache - tiered cache for Bible versions and chapters
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Content API base URL
    #[arg(long, env = "SCRIPTURE_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Application key for the content API
    #[arg(long, env = "SCRIPTURE_APP_KEY")]
    app_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "SCRIPTURE_TIMEOUT_SECONDS", default_value = "30")]
    timeout_seconds: u64,

    /// Temporary tier directory (defaults under the system temp dir)
    #[arg(long, env = "SCRIPTURE_TEMP_DIR")]
    temp_dir: Option<PathBuf>,

    /// Persistent tier directory
    #[arg(long, env = "SCRIPTURE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,

    /// Print cache metrics as JSON to stderr after the command
    #[arg(long, env = "SCRIPTURE_STATS")]
    stats: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a version's metadata as JSON
    Version {
        id: VersionId,
    },

    /// Print a chapter's text, e.g. `chapter 111 JHN.3`
    Chapter {
        version_id: VersionId,
        reference: String,
    },

    /// Drop every cached version not in the permitted list
    Purge {
        /// Comma separated version ids to keep
        #[arg(long, value_delimiter = ',', required = true)]
        permitted: Vec<VersionId>,
    },

    /// Drop all cached chapters of a version
    DropChapters {
        id: VersionId,
    },

    /// List cached version ids per tier
    List,
}

impl Args {
    fn context_config(&self) -> ContextConfig {
        let defaults = CacheConfig::default();
        ContextConfig {
            cache: CacheConfig {
                temporary_dir: self.temp_dir.clone().unwrap_or(defaults.temporary_dir),
                persistent_dir: self.data_dir.clone().unwrap_or(defaults.persistent_dir),
            },
            client: ClientConfig {
                base_url: self.api_url.clone(),
                app_key: self.app_key.clone(),
                request_timeout: Duration::from_secs(self.timeout_seconds),
            },
        }
    }
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(&args)?;

    let config = args.context_config();
    info!("Content API: {}", config.client.base_url);

    let client = HttpBibleClient::new(config.client.clone()).context("creating content client")?;
    let context = ReaderContext::new(&config.cache, Arc::new(client), Arc::new(InMemoryStorage::new()))
        .context("opening cache tiers")?;
    let repository = context.repository();

    match args.command {
        Command::Version { id } => {
            let lookup = repository
                .lookup_version(id)
                .await
                .with_context(|| format!("loading version {}", id))?;
            info!(source = %lookup.source, "Resolved version {}", id);
            println!("{}", serde_json::to_string_pretty(&lookup.value)?);
        }
        Command::Chapter {
            version_id,
            reference,
        } => {
            let reference = BibleReference::parse(version_id, &reference)?;
            let lookup = repository
                .lookup_chapter(&reference)
                .await
                .with_context(|| format!("loading chapter {}", reference))?;
            info!(source = %lookup.source, "Resolved chapter {}", reference);
            println!("{}", lookup.value);
        }
        Command::Purge { permitted } => {
            let permitted: HashSet<VersionId> = permitted.into_iter().collect();
            repository.remove_unpermitted_versions(&permitted).await?;
        }
        Command::DropChapters { id } => {
            repository.remove_version_chapters(id).await?;
        }
        Command::List => {
            let mut listing = BTreeMap::new();
            for tier in CacheTier::ALL {
                let ids: BTreeSet<VersionId> = repository
                    .tier(tier)
                    .stored_version_ids()
                    .await
                    .with_context(|| format!("listing {} tier", tier))?
                    .into_iter()
                    .collect();
                listing.insert(tier.to_string(), ids);
            }
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
    }

    if args.stats {
        eprintln!("{}", serde_json::to_string_pretty(&context.metrics())?);
    }

    Ok(())
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) -> anyhow::Result<()> {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(level.into())
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?);

    // stdout carries command output
    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_purge() {
        let args = Args::parse_from(["scripture-cache", "purge", "--permitted", "111,59"]);
        match args.command {
            Command::Purge { permitted } => assert_eq!(permitted, vec![111, 59]),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_stats_flag() {
        let args = Args::parse_from(["scripture-cache", "--stats", "version", "111"]);
        assert!(args.stats);
        assert!(!Args::parse_from(["scripture-cache", "list"]).stats);
    }

    #[test]
    fn test_context_config_overrides() {
        let args = Args::parse_from([
            "scripture-cache",
            "--data-dir",
            "/var/lib/scripture",
            "--app-key",
            "abc",
            "list",
        ]);
        let config = args.context_config();
        assert_eq!(config.cache.persistent_dir, PathBuf::from("/var/lib/scripture"));
        assert_eq!(config.cache.temporary_dir, CacheConfig::default().temporary_dir);
        assert_eq!(config.client.app_key.as_deref(), Some("abc"));
    }
}
