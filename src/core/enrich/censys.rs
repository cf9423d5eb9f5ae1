// src/core/enrich/censys.rs

use super::ENRICH_POOL;
use crate::core::pool::bounded_map;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

#[derive(Debug, Default, Deserialize)]
struct CensysHost {
    #[serde(default)]
    result: CensysResult,
}

#[derive(Debug, Default, Deserialize)]
struct CensysResult {
    #[serde(default)]
    dns: CensysDns,
}

#[derive(Debug, Default, Deserialize)]
struct CensysDns {
    #[serde(default)]
    names: Vec<String>,
}

/// Secondary reverse enrichment via the Censys hosts API. Requires both
/// `CENSYS_API_ID` and `CENSYS_API_SECRET`; without them the source is
/// simply absent.
pub struct CensysClient {
    base_url: String,
    api_id: String,
    api_secret: String,
}

impl CensysClient {
    pub fn from_env() -> Option<Self> {
        let api_id = std::env::var("CENSYS_API_ID").ok().filter(|v| !v.is_empty())?;
        let api_secret = std::env::var("CENSYS_API_SECRET")
            .ok()
            .filter(|v| !v.is_empty())?;
        Some(Self::with_base_url(
            "https://search.censys.io/api/v2",
            api_id,
            api_secret,
        ))
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        api_id: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_id: api_id.into(),
            api_secret: api_secret.into(),
        }
    }

    /// Forward DNS names Censys has observed per IP, deduplicated and
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
        let url = format!("{}/hosts/{}", self.base_url, ip);
        let response = match client
            .get(&url)
            .basic_auth(&self.api_id, Some(&self.api_secret))
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(ip, error = %e, "Censys request failed.");
                return Vec::new();
            }
        };
        if !response.status().is_success() {
            debug!(ip, status = %response.status(), "Censys returned non-success.");
            return Vec::new();
        }
        match response.json::<CensysHost>().await {
            Ok(host) => {
                let names: BTreeSet<String> = host
                    .result
                    .dns
                    .names
                    .into_iter()
                    .filter(|d| !d.is_empty())
                    .map(|d| d.to_ascii_lowercase())
                    .collect();
                names.into_iter().collect()
            }
            Err(e) => {
                warn!(ip, error = %e, "Censys payload was not valid JSON.");
                Vec::new()
            }
        }
    }
}
