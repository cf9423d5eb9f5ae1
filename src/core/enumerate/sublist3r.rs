// src/core/enumerate/sublist3r.rs

use super::SubdomainProducer;
use crate::core::command::run_capture;
use crate::core::config::EnumerationMode;
use crate::core::error::ProducerFailure;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Thread count passed to sublist3r; kept modest to be polite to the public
/// sources it scrapes.
const SUBLIST3R_THREADS: &str = "40";

/// Sublist3r requires an output file, so each run writes to a temp file that
/// is read back and removed when the producer returns.
pub struct Sublist3rProducer;

#[async_trait]
impl SubdomainProducer for Sublist3rProducer {
    fn name(&self) -> &'static str {
        "sublist3r"
    }

    async fn run(
        &self,
        domain: &str,
        _mode: EnumerationMode,
        timeout: Duration,
    ) -> Result<Vec<String>, ProducerFailure> {
        let outfile = tempfile::Builder::new()
            .prefix("webrecon_subs_")
            .suffix(".txt")
            .tempfile()
            .map_err(|e| ProducerFailure::Upstream(e.to_string()))?;
        let out_path = outfile.path().to_string_lossy().into_owned();

        let args = vec![
            "-d".to_string(),
            domain.to_string(),
            "-t".to_string(),
            SUBLIST3R_THREADS.to_string(),
            "-o".to_string(),
            out_path.clone(),
        ];
        run_capture("sublist3r", &args, timeout).await?;

        // The interesting output is the file, not stdout (which carries the
        // tool's banner and progress noise).
        let text = tokio::fs::read_to_string(&out_path).await.unwrap_or_default();
        debug!(domain, bytes = text.len(), "Read sublist3r output file.");
        Ok(text.lines().map(str::to_string).collect())
    }
}
