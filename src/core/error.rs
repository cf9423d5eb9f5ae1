// src/core/error.rs

use thiserror::Error;

/// Why a single producer contributed nothing.
///
/// None of these abort a stage: the enumerator and the probe stage log the
/// failure and substitute empty data, so "no data" and "source failed" stay
/// distinguishable in logs and per-IP diagnostics even though both degrade
/// to an empty collection in the final payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProducerFailure {
    /// The backing executable is not installed.
    #[error("tool-not-found")]
    ToolNotFound,
    /// A required API credential is not configured.
    #[error("credential-missing")]
    CredentialMissing,
    /// The per-producer timeout elapsed; any child process was killed.
    #[error("timeout")]
    Timeout,
    /// Non-success response, non-zero exit, or malformed payload.
    #[error("upstream: {0}")]
    Upstream(String),
}

/// The only errors surfaced to the caller of the pipeline. Everything else
/// degrades into partial data inside the aggregate report.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid domain: {0:?}")]
    InvalidDomain(String),
    #[error("proxy required but no SOCKS endpoint is reachable")]
    ProxyRequired,
    #[error("http client: {0}")]
    Client(#[from] reqwest::Error),
}
