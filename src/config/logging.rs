//! Logging configuration: just the `tracing` `EnvFilter` level. Deliberately
//! small. The job-summary output stream and the `[http]` diagnostic line
//! are fixed-format and not `tracing` events, so there's no file-rotation
//! or sink configuration to carry here.

use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `trace` | `debug` | `info` | `warn` | `error`. Overridable at runtime
    /// by `RUST_LOG`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct FileLoggingConfig {
    pub level: Option<String>,
}

impl LoggingConfig {
    /// Resolves `level` from `env > file > default`. Takes the env value as
    /// a parameter rather than reading `PROV_LOG` itself, so the precedence
    /// chain can be tested without touching process-wide environment state.
    pub fn from_file(env: Option<String>, file: Option<FileLoggingConfig>) -> Self {
        let file = file.unwrap_or_default();
        let level = env.or(file.level).unwrap_or_else(|| "info".to_string());
        Self { level }
    }
}
