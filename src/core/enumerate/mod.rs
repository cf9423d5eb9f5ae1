// src/core/enumerate/mod.rs

pub mod amass;
pub mod crtsh;
pub mod securitytrails;
pub mod subfinder;
pub mod sublist3r;

pub use amass::AmassProducer;
pub use crtsh::CrtShProducer;
pub use securitytrails::SecurityTrailsProducer;
pub use subfinder::SubfinderProducer;
pub use sublist3r::Sublist3rProducer;

use crate::core::command::binary_on_path;
use crate::core::config::{AnalyzeOptions, EnumerationMode};
use crate::core::error::ProducerFailure;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// An independent subdomain discovery source: a local command-line tool or a
/// public/commercial API. Producers return raw candidate lines; normalization
/// and scope filtering happen in `enumerate_subdomains` so every source is
/// treated identically.
#[async_trait]
pub trait SubdomainProducer: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(
        &self,
        domain: &str,
        mode: EnumerationMode,
        timeout: Duration,
    ) -> Result<Vec<String>, ProducerFailure>;
}

/// Lower-cases a raw candidate and strips any leading wildcard labels or
/// stray dots, e.g. `*.Www.Example.com` becomes `www.example.com`.
pub(crate) fn normalize_candidate(line: &str) -> String {
    line.trim()
        .to_ascii_lowercase()
        .trim_start_matches(['*', '.'])
        .to_string()
}

/// Scope invariant: a discovered host is kept only when it equals the root
/// domain or is a strict subdomain of it (`.` + root suffix). A plain suffix
/// match would wrongly admit e.g. `notexample.com` for `example.com`.
pub(crate) fn in_scope(host: &str, root: &str) -> bool {
    host == root || host.ends_with(&format!(".{root}"))
}

/// Runs every enabled producer concurrently, each under its own timeout, and
/// merges the normalized results.
///
/// Returns the deduplicated union (no defined order; the pipeline sorts it)
/// plus a per-source attribution map preserving each source's first-seen
/// order. A producer that errors, times out, or is simply not installed
/// contributes an empty set; this never fails the overall call. The root
/// domain itself is excluded from all results.
pub async fn enumerate_subdomains(
    domain: &str,
    options: &AnalyzeOptions,
    producers: &[Arc<dyn SubdomainProducer>],
) -> (HashSet<String>, BTreeMap<String, Vec<String>>) {
    let enabled: Vec<&Arc<dyn SubdomainProducer>> = producers
        .iter()
        .filter(|p| options.providers.enabled(p.name()))
        .collect();

    info!(
        domain,
        mode = %options.mode,
        producers = enabled.len(),
        "Starting subdomain enumeration."
    );

    let runs = enabled.iter().map(|producer| {
        let timeout = Duration::from_secs(options.timeouts.for_source(producer.name()));
        async move { (producer.name(), producer.run(domain, options.mode, timeout).await) }
    });
    let outcomes = futures::future::join_all(runs).await;

    let mut union: HashSet<String> = HashSet::new();
    let mut by_source: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for (source, outcome) in outcomes {
        let lines = match outcome {
            Ok(lines) => lines,
            Err(failure) => {
                warn!(source, failure = %failure, "Producer contributed nothing.");
                Vec::new()
            }
        };

        let mut attributed: Vec<String> = Vec::new();
        for line in lines {
            let host = normalize_candidate(&line);
            if host.is_empty() || host == domain || !in_scope(&host, domain) {
                continue;
            }
            if !attributed.contains(&host) {
                attributed.push(host.clone());
            }
            union.insert(host);
        }

        info!(source, count = attributed.len(), "Producer finished.");
        if !attributed.is_empty() {
            by_source.insert(source.to_string(), attributed);
        }
    }

    info!(domain, total = union.len(), "Subdomain enumeration finished.");
    (union, by_source)
}

/// Which local tools are installed, for status displays. proxychains is
/// listed because Tor-routed port probes depend on it.
pub fn tooling_status() -> BTreeMap<&'static str, bool> {
    BTreeMap::from([
        ("amass", binary_on_path("amass")),
        ("sublist3r", binary_on_path("sublist3r")),
        ("subfinder", binary_on_path("subfinder")),
        (
            "proxychains",
            binary_on_path("proxychains4") || binary_on_path("proxychains"),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeProducer {
        name: &'static str,
        outcome: Result<Vec<String>, ProducerFailure>,
        delay_ms: u64,
    }

    impl FakeProducer {
        fn ok(name: &'static str, lines: &[&str]) -> Arc<dyn SubdomainProducer> {
            Arc::new(Self {
                name,
                outcome: Ok(lines.iter().map(|s| s.to_string()).collect()),
                delay_ms: 0,
            })
        }

        fn slow(name: &'static str, lines: &[&str], delay_ms: u64) -> Arc<dyn SubdomainProducer> {
            Arc::new(Self {
                name,
                outcome: Ok(lines.iter().map(|s| s.to_string()).collect()),
                delay_ms,
            })
        }

        fn failing(name: &'static str, failure: ProducerFailure) -> Arc<dyn SubdomainProducer> {
            Arc::new(Self {
                name,
                outcome: Err(failure),
                delay_ms: 0,
            })
        }
    }

    #[async_trait]
    impl SubdomainProducer for FakeProducer {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn run(
            &self,
            _domain: &str,
            _mode: EnumerationMode,
            _timeout: Duration,
        ) -> Result<Vec<String>, ProducerFailure> {
            if self.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            }
            self.outcome.clone()
        }
    }

    fn sorted(set: HashSet<String>) -> Vec<String> {
        let mut v: Vec<String> = set.into_iter().collect();
        v.sort();
        v
    }

    #[test]
    fn normalization_strips_wildcards_and_case() {
        assert_eq!(normalize_candidate("  *.Www.Example.COM "), "www.example.com");
        assert_eq!(normalize_candidate("*.example.com"), "example.com");
        assert_eq!(normalize_candidate(""), "");
    }

    #[test]
    fn scope_requires_a_label_boundary() {
        assert!(in_scope("example.com", "example.com"));
        assert!(in_scope("www.example.com", "example.com"));
        assert!(!in_scope("notexample.com", "example.com"));
        assert!(!in_scope("example.com.evil.net", "example.com"));
    }

    #[tokio::test]
    async fn union_excludes_root_and_out_of_scope_hosts() {
        let producers = vec![FakeProducer::ok(
            "amass",
            &[
                "example.com",
                "*.api.example.com",
                "WWW.EXAMPLE.COM",
                "notexample.com",
                "",
            ],
        )];
        let (union, by_source) =
            enumerate_subdomains("example.com", &AnalyzeOptions::default(), &producers).await;

        assert_eq!(sorted(union), vec!["api.example.com", "www.example.com"]);
        assert_eq!(
            by_source.get("amass").unwrap(),
            &vec!["api.example.com".to_string(), "www.example.com".to_string()]
        );
    }

    #[tokio::test]
    async fn result_is_independent_of_completion_order() {
        let fast_first = vec![
            FakeProducer::slow("amass", &["a.example.com", "b.example.com"], 20),
            FakeProducer::ok("crtsh", &["b.example.com", "c.example.com"]),
        ];
        let slow_first = vec![
            FakeProducer::ok("amass", &["a.example.com", "b.example.com"]),
            FakeProducer::slow("crtsh", &["b.example.com", "c.example.com"], 20),
        ];

        let opts = AnalyzeOptions::default();
        let (first, _) = enumerate_subdomains("example.com", &opts, &fast_first).await;
        let (second, _) = enumerate_subdomains("example.com", &opts, &slow_first).await;
        assert_eq!(sorted(first), sorted(second));
    }

    #[tokio::test]
    async fn failing_producer_does_not_poison_the_others() {
        let producers = vec![
            FakeProducer::failing("amass", ProducerFailure::ToolNotFound),
            FakeProducer::failing("sublist3r", ProducerFailure::Timeout),
            FakeProducer::ok("crtsh", &["mail.example.com"]),
        ];
        let (union, by_source) =
            enumerate_subdomains("example.com", &AnalyzeOptions::default(), &producers).await;

        assert_eq!(sorted(union), vec!["mail.example.com"]);
        assert!(!by_source.contains_key("amass"));
        assert!(!by_source.contains_key("sublist3r"));
    }

    #[tokio::test]
    async fn disabled_producers_are_not_run() {
        let mut opts = AnalyzeOptions::default();
        opts.providers.amass = false;
        let producers = vec![
            FakeProducer::ok("amass", &["a.example.com"]),
            FakeProducer::ok("crtsh", &["c.example.com"]),
        ];
        let (union, by_source) = enumerate_subdomains("example.com", &opts, &producers).await;

        assert_eq!(sorted(union), vec!["c.example.com"]);
        assert!(!by_source.contains_key("amass"));
    }
}
