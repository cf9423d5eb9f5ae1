// src/core/enumerate/subfinder.rs

use super::SubdomainProducer;
use crate::core::command::run_capture;
use crate::core::config::EnumerationMode;
use crate::core::error::ProducerFailure;
use async_trait::async_trait;
use std::time::Duration;

/// ProjectDiscovery subfinder, invoked as `subfinder -d <domain> -silent`.
/// Disabled by default; subfinder is passive-only so the mode is ignored.
pub struct SubfinderProducer;

#[async_trait]
impl SubdomainProducer for SubfinderProducer {
    fn name(&self) -> &'static str {
        "subfinder"
    }

    async fn run(
        &self,
        domain: &str,
        _mode: EnumerationMode,
        timeout: Duration,
    ) -> Result<Vec<String>, ProducerFailure> {
        let args = vec![
            "-d".to_string(),
            domain.to_string(),
            "-silent".to_string(),
        ];
        let out = run_capture("subfinder", &args, timeout).await?;
        if !out.success {
            return Err(ProducerFailure::Upstream(
                out.stderr.lines().next().unwrap_or("non-zero exit").to_string(),
            ));
        }
        Ok(out.stdout.lines().map(str::to_string).collect())
    }
}
