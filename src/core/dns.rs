// src/core/dns.rs

use crate::core::models::DnsRecordSet;
use async_trait::async_trait;
use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::proto::rr::RecordType;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Per-query resolution timeout. Kept short so a dead nameserver cannot
/// stall an analysis with many hosts.
const QUERY_TIMEOUT: Duration = Duration::from_secs(2);

/// Resolves all six record types for one host. Implemented by the hickory
/// backend in production and by fixed-map fakes in tests.
#[async_trait]
pub trait HostResolver: Send + Sync {
    async fn resolve_host(&self, host: &str) -> DnsRecordSet;
}

/// Resolves records for every host, fanning out across hosts. Per-host
/// concurrency is bounded by the resolver itself, not an explicit pool.
pub async fn resolve_records(
    resolver: &dyn HostResolver,
    hosts: &[String],
) -> BTreeMap<String, DnsRecordSet> {
    let lookups = hosts
        .iter()
        .map(|host| async move { (host.clone(), resolver.resolve_host(host).await) });
    futures::future::join_all(lookups).await.into_iter().collect()
}

/// Collapses one record type's outcome: a failed lookup becomes an empty
/// sequence for that type only, so one failing type never blocks the others.
fn type_or_empty(rtype: &str, host: &str, outcome: Result<Vec<String>, String>) -> Vec<String> {
    match outcome {
        Ok(values) => values,
        Err(e) => {
            debug!(host, rtype, error = %e, "Record lookup yielded no data.");
            Vec::new()
        }
    }
}

fn dedup_in_order(values: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

fn strip_root_dot(name: String) -> String {
    name.trim_end_matches('.').to_string()
}

/// Production resolver backed by hickory's tokio async resolver.
pub struct HickoryHostResolver {
    resolver: TokioAsyncResolver,
}

impl HickoryHostResolver {
    pub fn new() -> Self {
        let mut opts = ResolverOpts::default();
        opts.timeout = QUERY_TIMEOUT;
        Self {
            resolver: TokioAsyncResolver::tokio(ResolverConfig::default(), opts),
        }
    }

    async fn lookup_a(&self, host: &str) -> Result<Vec<String>, String> {
        self.resolver
            .ipv4_lookup(host)
            .await
            .map(|l| dedup_in_order(l.iter().map(|r| r.to_string())))
            .map_err(|e| e.to_string())
    }

    async fn lookup_aaaa(&self, host: &str) -> Result<Vec<String>, String> {
        self.resolver
            .ipv6_lookup(host)
            .await
            .map(|l| dedup_in_order(l.iter().map(|r| r.to_string())))
            .map_err(|e| e.to_string())
    }

    async fn lookup_cname(&self, host: &str) -> Result<Vec<String>, String> {
        self.resolver
            .lookup(host, RecordType::CNAME)
            .await
            .map(|l| {
                dedup_in_order(
                    l.iter()
                        .filter_map(|r| r.as_cname())
                        .map(|c| strip_root_dot(c.to_string())),
                )
            })
            .map_err(|e| e.to_string())
    }

    async fn lookup_mx(&self, host: &str) -> Result<Vec<String>, String> {
        self.resolver
            .mx_lookup(host)
            .await
            .map(|l| {
                dedup_in_order(l.iter().map(|mx| {
                    let exchange = strip_root_dot(mx.exchange().to_string());
                    format!("{} {}", mx.preference(), exchange)
                }))
            })
            .map_err(|e| e.to_string())
    }

    async fn lookup_ns(&self, host: &str) -> Result<Vec<String>, String> {
        self.resolver
            .ns_lookup(host)
            .await
            .map(|l| dedup_in_order(l.iter().map(|ns| strip_root_dot(ns.to_string()))))
            .map_err(|e| e.to_string())
    }

    async fn lookup_txt(&self, host: &str) -> Result<Vec<String>, String> {
        // `to_string` on a TXT record concatenates its character-strings in
        // declaration order.
        self.resolver
            .txt_lookup(host)
            .await
            .map(|l| dedup_in_order(l.iter().map(|txt| txt.to_string())))
            .map_err(|e| e.to_string())
    }
}

impl Default for HickoryHostResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HostResolver for HickoryHostResolver {
    async fn resolve_host(&self, host: &str) -> DnsRecordSet {
        debug!(host, "Resolving record types.");
        let (a, aaaa, cname, mx, ns, txt) = tokio::join!(
            self.lookup_a(host),
            self.lookup_aaaa(host),
            self.lookup_cname(host),
            self.lookup_mx(host),
            self.lookup_ns(host),
            self.lookup_txt(host),
        );

        if [&a, &aaaa, &cname, &mx, &ns, &txt].iter().all(|r| r.is_err()) {
            warn!(host, "Every record type failed to resolve.");
        }

        DnsRecordSet {
            a: type_or_empty("A", host, a),
            aaaa: type_or_empty("AAAA", host, aaaa),
            cname: type_or_empty("CNAME", host, cname),
            mx: type_or_empty("MX", host, mx),
            ns: type_or_empty("NS", host, ns),
            txt: type_or_empty("TXT", host, txt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_failing_type_is_isolated_to_an_empty_sequence() {
        // AAAA fails; the other five types keep their data.
        let set = DnsRecordSet {
            a: type_or_empty("A", "h", Ok(vec!["93.184.216.34".into()])),
            aaaa: type_or_empty("AAAA", "h", Err("query timed out".into())),
            cname: type_or_empty("CNAME", "h", Ok(vec!["edge.example.net".into()])),
            mx: type_or_empty("MX", "h", Ok(vec!["10 mail.example.com".into()])),
            ns: type_or_empty("NS", "h", Ok(vec!["ns1.example.com".into()])),
            txt: type_or_empty("TXT", "h", Ok(vec!["v=spf1 -all".into()])),
        };

        assert_eq!(set.a, vec!["93.184.216.34"]);
        assert!(set.aaaa.is_empty());
        assert_eq!(set.cname, vec!["edge.example.net"]);
        assert_eq!(set.mx, vec!["10 mail.example.com"]);
        assert_eq!(set.ns, vec!["ns1.example.com"]);
        assert_eq!(set.txt, vec!["v=spf1 -all"]);
    }

    #[test]
    fn dedup_preserves_first_seen_order() {
        let values = ["b", "a", "b", "c", "a"].into_iter().map(String::from);
        assert_eq!(dedup_in_order(values), vec!["b", "a", "c"]);
    }

    #[test]
    fn trailing_root_dot_is_stripped() {
        assert_eq!(strip_root_dot("ns1.example.com.".into()), "ns1.example.com");
        assert_eq!(strip_root_dot("ns1.example.com".into()), "ns1.example.com");
    }
}
