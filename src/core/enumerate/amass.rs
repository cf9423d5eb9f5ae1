// src/core/enumerate/amass.rs

use super::SubdomainProducer;
use crate::core::command::run_capture;
use crate::core::config::EnumerationMode;
use crate::core::error::ProducerFailure;
use async_trait::async_trait;
use std::time::Duration;

/// OWASP Amass, invoked as `amass enum [-passive] -d <domain> -silent`.
/// Aggressive mode drops the `-passive` flag so amass may probe the target
/// directly.
pub struct AmassProducer;

#[async_trait]
impl SubdomainProducer for AmassProducer {
    fn name(&self) -> &'static str {
        "amass"
    }

    async fn run(
        &self,
        domain: &str,
        mode: EnumerationMode,
        timeout: Duration,
    ) -> Result<Vec<String>, ProducerFailure> {
        let mut args = vec!["enum".to_string()];
        if mode != EnumerationMode::Aggressive {
            args.push("-passive".to_string());
        }
        args.extend(["-d".to_string(), domain.to_string(), "-silent".to_string()]);

        let out = run_capture("amass", &args, timeout).await?;
        // Amass sometimes exits non-zero after printing usable results, so
        // both streams are scanned; the enumerator's scope filter discards
        // any diagnostic noise.
        let text = if out.success {
            out.stdout
        } else {
            format!("{}\n{}", out.stdout, out.stderr)
        };
        Ok(text.lines().map(str::to_string).collect())
    }
}
