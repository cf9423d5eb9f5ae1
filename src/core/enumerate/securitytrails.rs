// src/core/enumerate/securitytrails.rs

use super::SubdomainProducer;
use crate::core::config::EnumerationMode;
use crate::core::error::ProducerFailure;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Response shape of the SecurityTrails subdomain listing: child labels only,
/// without the root domain suffix.
#[derive(Debug, Deserialize)]
struct SubdomainListing {
    #[serde(default)]
    subdomains: Vec<String>,
}

/// Commercial SecurityTrails API. The key comes from the
/// `SECURITYTRAILS_API_KEY` environment variable; without it the producer
/// reports `CredentialMissing` and contributes nothing.
pub struct SecurityTrailsProducer {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl SecurityTrailsProducer {
    pub fn new(client: reqwest::Client) -> Self {
        let api_key = std::env::var("SECURITYTRAILS_API_KEY")
            .ok()
            .filter(|k| !k.is_empty());
        Self {
            client,
            base_url: "https://api.securitytrails.com/v1".to_string(),
            api_key,
        }
    }

    pub fn with_base_url(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: Some(api_key.into()),
        }
    }
}

#[async_trait]
impl SubdomainProducer for SecurityTrailsProducer {
    fn name(&self) -> &'static str {
        "securitytrails"
    }

    async fn run(
        &self,
        domain: &str,
        _mode: EnumerationMode,
        timeout: Duration,
    ) -> Result<Vec<String>, ProducerFailure> {
        let Some(api_key) = &self.api_key else {
            return Err(ProducerFailure::CredentialMissing);
        };

        let url = format!("{}/domain/{}/subdomains", self.base_url, domain);
        let response = self
            .client
            .get(&url)
            .header("APIKEY", api_key)
            .query(&[("children_only", "false")])
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| ProducerFailure::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProducerFailure::Upstream(format!(
                "securitytrails returned status {}",
                response.status()
            )));
        }

        let listing: SubdomainListing = response
            .json()
            .await
            .map_err(|e| ProducerFailure::Upstream(e.to_string()))?;

        Ok(listing
            .subdomains
            .into_iter()
            .map(|child| child.trim().to_string())
            .filter(|child| !child.is_empty())
            .map(|child| format!("{child}.{domain}"))
            .collect())
    }
}
