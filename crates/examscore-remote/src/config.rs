//! Configuration loading and engine factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use examscore_core::engine::ScoringEngine;
use examscore_core::scorer::BatchScorer;
use examscore_core::similarity::SimilarityPolicy;
use examscore_core::traits::ScoringBackend;

use crate::http::{HttpScorer, DEFAULT_TIMEOUT_SECS};

/// The external scoring service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Endpoint URL. Unset or empty means local scoring only.
    #[serde(default)]
    pub url: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl RemoteConfig {
    /// The endpoint, if one is configured and non-empty.
    pub fn endpoint(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }
}

/// Where the HTTP service listens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}

/// Top-level examscore configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExamscoreConfig {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub similarity: SimilarityPolicy,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `examscore.toml` in the current directory
/// 2. `~/.config/examscore/config.toml`
///
/// A `.env` file is loaded first if present. Environment variable overrides:
/// `AI_SCORING_URL`, `EXAMSCORE_TIMEOUT_SECS`, `EXAMSCORE_HOST` (or `HOST`),
/// `EXAMSCORE_PORT` (or `PORT`).
pub fn load_config() -> Result<ExamscoreConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ExamscoreConfig> {
    // Best-effort; a missing .env is normal.
    let _ = dotenvy::dotenv();

    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("examscore.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<ExamscoreConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ExamscoreConfig::default(),
    };

    apply_env_overrides(&mut config)?;
    config.remote.url = config.remote.url.as_deref().map(resolve_env_vars);

    Ok(config)
}

fn apply_env_overrides(config: &mut ExamscoreConfig) -> Result<()> {
    if let Ok(url) = std::env::var("AI_SCORING_URL") {
        config.remote.url = Some(url);
    }
    if let Ok(secs) = std::env::var("EXAMSCORE_TIMEOUT_SECS") {
        config.remote.timeout_secs = secs
            .trim()
            .parse()
            .with_context(|| format!("invalid EXAMSCORE_TIMEOUT_SECS: {secs}"))?;
    }
    if let Some((name, host)) = first_env(&["EXAMSCORE_HOST", "HOST"]) {
        tracing::debug!(var = name, %host, "bind host from environment");
        config.server.host = host;
    }
    if let Some((name, port)) = first_env(&["EXAMSCORE_PORT", "PORT"]) {
        config.server.port = port
            .trim()
            .parse()
            .with_context(|| format!("invalid {name}: {port}"))?;
    }
    Ok(())
}

/// The first of `names` that is set, with its value.
fn first_env(names: &[&'static str]) -> Option<(&'static str, String)> {
    names
        .iter()
        .find_map(|name| std::env::var(name).ok().map(|value| (*name, value)))
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("examscore"))
}

/// Create the remote backend, if an endpoint is configured.
pub fn create_backend(config: &RemoteConfig) -> Result<Option<Arc<dyn ScoringBackend>>> {
    let Some(endpoint) = config.endpoint() else {
        return Ok(None);
    };
    anyhow::ensure!(
        config.timeout_secs >= 1,
        "remote timeout must be at least 1 second"
    );
    let scorer = HttpScorer::with_timeout(endpoint, Duration::from_secs(config.timeout_secs))
        .context("failed to create remote scorer")?;
    Ok(Some(Arc::new(scorer)))
}

/// Build the cascade engine described by `config`.
pub fn build_engine(config: &ExamscoreConfig) -> Result<ScoringEngine> {
    let remote = create_backend(&config.remote)?;
    match config.remote.endpoint() {
        Some(endpoint) => tracing::info!(
            endpoint,
            timeout_secs = config.remote.timeout_secs,
            policy = %config.similarity,
            "remote scoring enabled with local fallback"
        ),
        None => tracing::info!(policy = %config.similarity, "remote scoring disabled, scoring locally"),
    }
    Ok(ScoringEngine::new(remote, BatchScorer::new(config.similarity)))
}
