// src/core/enumerate/crtsh.rs

use super::SubdomainProducer;
use crate::core::config::EnumerationMode;
use crate::core::error::ProducerFailure;
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("static regex");
}

/// One certificate entry from the crt.sh JSON output. `name_value` can hold
/// several names separated by newlines.
#[derive(Debug, Deserialize)]
struct CrtShEntry {
    #[serde(default)]
    name_value: Option<String>,
    #[serde(default)]
    common_name: Option<String>,
}

/// Certificate-transparency log query against crt.sh.
pub struct CrtShProducer {
    client: reqwest::Client,
    base_url: String,
}

impl CrtShProducer {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, "https://crt.sh")
    }

    pub fn with_base_url(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

/// crt.sh occasionally returns concatenated JSON objects instead of a single
/// array; fall back to parsing line by line.
fn parse_entries(text: &str) -> Vec<CrtShEntry> {
    if let Ok(entries) = serde_json::from_str::<Vec<CrtShEntry>>(text) {
        return entries;
    }
    if let Ok(entry) = serde_json::from_str::<CrtShEntry>(text) {
        return vec![entry];
    }
    text.lines()
        .filter_map(|line| serde_json::from_str::<CrtShEntry>(line.trim()).ok())
        .collect()
}

#[async_trait]
impl SubdomainProducer for CrtShProducer {
    fn name(&self) -> &'static str {
        "crtsh"
    }

    async fn run(
        &self,
        domain: &str,
        _mode: EnumerationMode,
        timeout: Duration,
    ) -> Result<Vec<String>, ProducerFailure> {
        let url = format!("{}/?q=%25.{}&output=json", self.base_url, domain);
        let response = self
            .client
            .get(&url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| ProducerFailure::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProducerFailure::Upstream(format!(
                "crt.sh returned status {}",
                response.status()
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| ProducerFailure::Upstream(e.to_string()))?;
        let entries = parse_entries(text.trim());
        debug!(domain, entries = entries.len(), "Parsed crt.sh entries.");

        let mut names = Vec::new();
        for entry in entries {
            let blob = entry
                .name_value
                .or(entry.common_name)
                .unwrap_or_default();
            for part in WHITESPACE.split(&blob) {
                if !part.is_empty() {
                    names.push(part.to_string());
                }
            }
        }
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_json_array() {
        let text = r#"[{"name_value":"www.example.com\n*.example.com"},{"common_name":"api.example.com"}]"#;
        let entries = parse_entries(text);
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0].name_value.as_deref(),
            Some("www.example.com\n*.example.com")
        );
    }

    #[test]
    fn falls_back_to_line_delimited_objects() {
        let text = "{\"name_value\":\"a.example.com\"}\n{\"name_value\":\"b.example.com\"}";
        let entries = parse_entries(text);
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn garbage_parses_to_nothing() {
        assert!(parse_entries("<html>rate limited</html>").is_empty());
    }
}
