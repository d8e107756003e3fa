//! Configuration, layered `env > config file > built-in defaults`,
//! following this project's established convention: a `Config` struct with
//! a `from_env()` loader, a TOML-backed config file under
//! `~/.config/<name>/config.toml`, and a `to_toml()` serializer that doubles
//! as the single source of truth for the on-disk format.

use std::net::SocketAddr;
use std::path::PathBuf;

mod logging;
mod serialization;


pub use logging::{FileLoggingConfig, LoggingConfig};

/// Version info, surfaced by the CLI and the startup banner.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP receiver binds to.
    pub bind_addr: SocketAddr,

    /// Bound on concurrently executing `/log` handler bodies.
    pub worker_pool_size: usize,

    /// Processor's empty-drain sleep, in milliseconds.
    pub drain_interval_ms: u64,

    /// Logging configuration (level for the `tracing` `EnvFilter`).
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:9000".parse().unwrap(),
            worker_pool_size: 4,
            drain_interval_ms: 100,
            logging: LoggingConfig::default(),
        }
    }
}

/// Config file structure (subset of `Config` that makes sense to persist).
#[derive(Debug, serde::Deserialize, Default)]
pub(crate) struct FileConfig {
    pub bind_addr: Option<String>,
    pub worker_pool_size: Option<usize>,
    pub drain_interval_ms: Option<u64>,
    pub logging: Option<FileLoggingConfig>,
}

impl Config {
    /// The config file path: `~/.config/provenance-processor/config.toml`.
    /// Uses Unix-style `~/.config` on all platforms for consistency.
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| {
            p.join(".config")
                .join("provenance-processor")
                .join("config.toml")
        })
    }

    /// Creates the config file with defaults if it doesn't exist. Called
    /// during startup to help users discover configuration options; never
    /// overwrites a file that's already there.
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };
        if path.exists() {
            return;
        }
        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return;
            }
        }
        let _ = std::fs::write(&path, Self::default().to_toml());
    }

    /// Loads the file config if it exists.
    ///
    /// # Panics
    /// If the config file exists but cannot be parsed. A broken config
    /// should fail fast with a clear error, not silently fall back to
    /// defaults while the user debugs the wrong thing.
    fn load_file_config() -> FileConfig {
        let Some(path) = Self::config_path() else {
            return FileConfig::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                eprintln!("\nCONFIG ERROR - failed to parse {}\n", path.display());
                eprintln!("  {e}\n");
                eprintln!("  To reset, delete the file and restart, or run");
                eprintln!("  `provenance-processor config --reset`.\n");
                std::process::exit(1);
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => FileConfig::default(),
            Err(e) => {
                eprintln!("\nCONFIG ERROR - cannot read {}\n", path.display());
                eprintln!("  {e}\n");
                std::process::exit(1);
            }
        }
    }

    /// Loads configuration: env vars > config file > built-in defaults.
    pub fn from_env() -> Self {
        let file = Self::load_file_config();

        let bind_addr = resolve_bind_addr(std::env::var("PROV_BIND").ok(), file.bind_addr);

        let worker_pool_size = resolve_worker_pool_size(
            std::env::var("PROV_WORKERS").ok().and_then(|v| v.parse().ok()),
            file.worker_pool_size,
        );

        let drain_interval_ms = resolve_drain_interval_ms(
            std::env::var("PROV_DRAIN_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok()),
            file.drain_interval_ms,
        );

        let logging = LoggingConfig::from_file(std::env::var("PROV_LOG").ok(), file.logging);

        Self {
            bind_addr,
            worker_pool_size,
            drain_interval_ms,
            logging,
        }
    }
}

/// Resolves `bind_addr` from `env > file > default`. Split out from
/// `from_env` so the precedence chain can be exercised without touching
/// process-wide environment variables.
fn resolve_bind_addr(env: Option<String>, file: Option<String>) -> SocketAddr {
    env.or(file)
        .unwrap_or_else(|| "127.0.0.1:9000".to_string())
        .parse()
        .expect("invalid PROV_BIND / bind_addr")
}

/// Resolves `worker_pool_size` from `env > file > default`.
fn resolve_worker_pool_size(env: Option<usize>, file: Option<usize>) -> usize {
    env.or(file).unwrap_or(4)
}

/// Resolves `drain_interval_ms` from `env > file > default`.
fn resolve_drain_interval_ms(env: Option<u64>, file: Option<u64>) -> u64 {
    env.or(file).unwrap_or(100)
}
