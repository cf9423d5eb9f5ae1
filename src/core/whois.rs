// src/core/whois.rs

use crate::core::command::run_capture;
use crate::core::error::ProducerFailure;
use crate::core::models::WhoisRecord;
use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;

const WHOIS_TIMEOUT: Duration = Duration::from_secs(20);

/// External WHOIS collaborator. Failure never blocks the pipeline; it is
/// folded into the record's `error` field.
#[async_trait]
pub trait WhoisLookup: Send + Sync {
    async fn lookup(&self, domain: &str) -> WhoisRecord;
}

/// Shells out to the local `whois` executable.
pub struct WhoisCommand;

#[async_trait]
impl WhoisLookup for WhoisCommand {
    async fn lookup(&self, domain: &str) -> WhoisRecord {
        let args = vec![domain.to_string()];
        match run_capture("whois", &args, WHOIS_TIMEOUT).await {
            Ok(out) => {
                // whois exits non-zero for no-match answers but still prints
                // a usable body; keep whatever stdout carried.
                let raw = (!out.stdout.trim().is_empty()).then(|| out.stdout.clone());
                let error = (!out.success).then(|| {
                    let stderr = out.stderr.trim();
                    if stderr.is_empty() {
                        "whois exited with an error".to_string()
                    } else {
                        stderr.to_string()
                    }
                });
                WhoisRecord { raw, error }
            }
            Err(failure @ ProducerFailure::ToolNotFound)
            | Err(failure @ ProducerFailure::Timeout) => {
                warn!(domain, failure = %failure, "WHOIS lookup unavailable.");
                WhoisRecord {
                    raw: None,
                    error: Some(failure.to_string()),
                }
            }
            Err(failure) => WhoisRecord {
                raw: None,
                error: Some(failure.to_string()),
            },
        }
    }
}
