// src/core/enrich/reverse_ip.rs

use super::ENRICH_POOL;
use crate::core::pool::bounded_map;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Primary reverse-IP source: a hackertarget-style endpoint returning one
/// co-hosted domain per line, or an error sentence in the body.
pub struct ReverseIpClient {
    base_url: String,
}

impl Default for ReverseIpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ReverseIpClient {
    pub fn new() -> Self {
        Self::with_base_url("https://api.hackertarget.com/reverseiplookup/")
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Looks up co-hosted domains for every IP under a bounded pool. Each
    /// per-IP call is independently fail-safe: any error yields an empty
    /// list for that IP without affecting the others.
    pub async fn lookup_many(
        &self,
        client: &reqwest::Client,
        ips: &[String],
    ) -> BTreeMap<String, Vec<String>> {
        let results = bounded_map(ips.to_vec(), ENRICH_POOL, |ip| async move {
            let domains = self.lookup_one(client, &ip).await;
            (ip, domains)
        })
        .await;
        results.into_iter().collect()
    }

    async fn lookup_one(&self, client: &reqwest::Client, ip: &str) -> Vec<String> {
        let response = match client.get(&self.base_url).query(&[("q", ip)]).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(ip, error = %e, "Reverse-IP request failed.");
                return Vec::new();
            }
        };
        let text = match response.text().await {
            Ok(t) => t,
            Err(e) => {
                warn!(ip, error = %e, "Reverse-IP body could not be read.");
                return Vec::new();
            }
        };
        parse_reverse_body(&text)
    }
}

/// The endpoint signals problems in the body text rather than the status
/// code; lines are also sanity-filtered to plausible domain syntax.
fn parse_reverse_body(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    let lowered = trimmed.to_ascii_lowercase();
    if lowered.contains("error") || lowered.contains("no records") {
        debug!("Reverse-IP response carried an error body.");
        return Vec::new();
    }
    trimmed
        .lines()
        .map(|line| line.trim().to_ascii_lowercase())
        .filter(|d| !d.is_empty() && d.contains('.') && !d.contains(char::is_whitespace))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_newline_separated_domains() {
        let body = "a.example.net\nB.Example.net\n\nlocalhost\nbad domain.com\n";
        assert_eq!(
            parse_reverse_body(body),
            vec!["a.example.net", "b.example.net"]
        );
    }

    #[test]
    fn error_bodies_yield_nothing() {
        assert!(parse_reverse_body("error check your search parameter").is_empty());
        assert!(parse_reverse_body("No records found").is_empty());
    }
}
