// src/core/enrich/shodan.rs

use super::ENRICH_POOL;
use crate::core::pool::bounded_map;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct ShodanHost {
    #[serde(default)]
    domains: Vec<String>,
    #[serde(default)]
    hostnames: Vec<String>,
}

/// Secondary reverse enrichment via the Shodan host API. Constructed only
/// when `SHODAN_API_KEY` is set; otherwise the source contributes nothing.
pub struct ShodanClient {
    base_url: String,
    api_key: String,
}

impl ShodanClient {
    pub fn from_env() -> Option<Self> {
        std::env::var("SHODAN_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .map(|api_key| Self::with_base_url("https://api.shodan.io", api_key))
    }

    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Domains and vhost names Shodan has seen per IP, deduplicated and
    /// sorted. Non-200 responses skip the IP.
    pub async fn reverse_enrich(
        &self,
        client: &reqwest::Client,
        ips: &[String],
    ) -> BTreeMap<String, Vec<String>> {
        let results = bounded_map(ips.to_vec(), ENRICH_POOL, |ip| async move {
            let names = self.lookup_one(client, &ip).await;
            (ip, names)
        })
        .await;
        results
            .into_iter()
            .filter(|(_, names)| !names.is_empty())
            .collect()
    }

    async fn lookup_one(&self, client: &reqwest::Client, ip: &str) -> Vec<String> {
        let url = format!("{}/shodan/host/{}", self.base_url, ip);
        let response = match client
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(ip, error = %e, "Shodan request failed.");
                return Vec::new();
            }
        };
        if !response.status().is_success() {
            debug!(ip, status = %response.status(), "Shodan returned non-success.");
            return Vec::new();
        }
        match response.json::<ShodanHost>().await {
            Ok(host) => {
                let names: BTreeSet<String> = host
                    .domains
                    .into_iter()
                    .chain(host.hostnames)
                    .filter(|d| !d.is_empty())
                    .map(|d| d.to_ascii_lowercase())
                    .collect();
                names.into_iter().collect()
            }
            Err(e) => {
                warn!(ip, error = %e, "Shodan payload was not valid JSON.");
                Vec::new()
            }
        }
    }
}
