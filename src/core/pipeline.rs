// src/core/pipeline.rs

use crate::core::cache::{self, AnalysisCache};
use crate::core::config::{AnalyzeOptions, ProviderOptions, ProxyOptions, ScanOptions};
use crate::core::dns::{HickoryHostResolver, HostResolver, resolve_records};
use crate::core::enrich::{
    CensysClient, RdapClient, ReverseIpClient, ShodanClient, merge_reverse_map,
};
use crate::core::enumerate::{
    AmassProducer, CrtShProducer, SecurityTrailsProducer, SubdomainProducer, SubfinderProducer,
    Sublist3rProducer, enumerate_subdomains,
};
use crate::core::error::EngineError;
use crate::core::models::{AnalysisReport, PortReport};
use crate::core::probe::{NmapScanner, PortScanner, probe_many};
use crate::core::proxy::{candidate_proxies, default_proxy, select_proxy};
use crate::core::whois::{WhoisCommand, WhoisLookup};
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const USER_AGENT: &str = concat!("webrecon/", env!("CARGO_PKG_VERSION"));
const HTTP_TIMEOUT: Duration = Duration::from_secs(20);
const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Sequences one analysis end to end: enumerate, resolve, enrich, and
/// optionally probe, with a fingerprint-keyed cache short-circuit in front.
///
/// Every collaborator is a field so tests can substitute fakes; `new` wires
/// the real producers, resolver, scanner, and WHOIS command.
pub struct ReconPipeline {
    cache: Arc<AnalysisCache>,
    producers: Vec<Arc<dyn SubdomainProducer>>,
    resolver: Arc<dyn HostResolver>,
    scanner: Arc<dyn PortScanner>,
    whois: Arc<dyn WhoisLookup>,
    reverse_ip: ReverseIpClient,
    rdap: RdapClient,
    shodan: Option<ShodanClient>,
    censys: Option<CensysClient>,
}

impl ReconPipeline {
    pub fn new(cache: Arc<AnalysisCache>) -> Result<Self, EngineError> {
        // Enumeration APIs go direct; only enrichment traffic is eligible
        // for proxy routing, with its client built per analysis.
        let api_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(HTTP_TIMEOUT)
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            cache,
            producers: vec![
                Arc::new(AmassProducer),
                Arc::new(Sublist3rProducer),
                Arc::new(SubfinderProducer),
                Arc::new(CrtShProducer::new(api_client.clone())),
                Arc::new(SecurityTrailsProducer::new(api_client)),
            ],
            resolver: Arc::new(HickoryHostResolver::new()),
            scanner: Arc::new(NmapScanner::default()),
            whois: Arc::new(WhoisCommand),
            reverse_ip: ReverseIpClient::new(),
            rdap: RdapClient::new(),
            shodan: ShodanClient::from_env(),
            censys: CensysClient::from_env(),
        })
    }

    pub fn with_producers(mut self, producers: Vec<Arc<dyn SubdomainProducer>>) -> Self {
        self.producers = producers;
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn HostResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_scanner(mut self, scanner: Arc<dyn PortScanner>) -> Self {
        self.scanner = scanner;
        self
    }

    pub fn with_whois(mut self, whois: Arc<dyn WhoisLookup>) -> Self {
        self.whois = whois;
        self
    }

    pub fn with_reverse_ip(mut self, client: ReverseIpClient) -> Self {
        self.reverse_ip = client;
        self
    }

    pub fn with_rdap(mut self, client: RdapClient) -> Self {
        self.rdap = client;
        self
    }

    pub fn with_shodan(mut self, client: ShodanClient) -> Self {
        self.shodan = Some(client);
        self
    }

    pub fn with_censys(mut self, client: CensysClient) -> Self {
        self.censys = Some(client);
        self
    }

    pub fn cache(&self) -> &AnalysisCache {
        &self.cache
    }

    /// Runs one full analysis. Apart from an invalid domain or an
    /// unreachable-but-required proxy, the pipeline always reaches a result;
    /// failing producers and upstreams degrade into partial data.
    pub async fn analyze(
        &self,
        domain: &str,
        options: &AnalyzeOptions,
    ) -> Result<AnalysisReport, EngineError> {
        let domain = normalize_domain(domain)?;

        let key = cache::fingerprint(&domain, options);
        if let Some(report) = self.cache.get(&key) {
            info!(domain = %domain, "Cache hit, returning stored analysis.");
            return Ok(report);
        }

        info!(domain = %domain, mode = %options.mode, "Starting analysis.");
        let (whois, (union, subdomains_by_source)) = tokio::join!(
            self.whois.lookup(&domain),
            enumerate_subdomains(&domain, options, &self.producers),
        );

        let mut subdomains: Vec<String> = union.into_iter().collect();
        subdomains.sort();

        // Root domain plus every discovered subdomain goes through DNS.
        let mut hosts = vec![domain.clone()];
        hosts.extend(subdomains.iter().cloned());
        let records = resolve_records(self.resolver.as_ref(), &hosts).await;

        // The working IP set is the union of IPv4 addresses across all
        // resolved A records.
        let ips: Vec<String> = records
            .values()
            .flat_map(|set| set.a.iter().cloned())
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect();
        info!(
            domain = %domain,
            hosts = hosts.len(),
            ips = ips.len(),
            "DNS resolution finished."
        );

        let enrichment_client = self.enrichment_client(&options.proxy).await?;

        let (reverse_ip, ip_info, ip_ports) = tokio::join!(
            self.reverse_with_enrichment(&enrichment_client, &ips, &options.providers),
            self.rdap.lookup_many(&enrichment_client, &ips),
            self.probe_if_enabled(&ips, &options.scan),
        );

        let mut dns_a_records = BTreeMap::new();
        let mut dns_aaaa_records = BTreeMap::new();
        let mut dns_cname_records = BTreeMap::new();
        let mut dns_mx_records = BTreeMap::new();
        let mut dns_ns_records = BTreeMap::new();
        let mut dns_txt_records = BTreeMap::new();
        for (host, set) in records {
            dns_a_records.insert(host.clone(), set.a);
            dns_aaaa_records.insert(host.clone(), set.aaaa);
            dns_cname_records.insert(host.clone(), set.cname);
            dns_mx_records.insert(host.clone(), set.mx);
            dns_ns_records.insert(host.clone(), set.ns);
            dns_txt_records.insert(host, set.txt);
        }

        let report = AnalysisReport {
            domain: domain.clone(),
            whois,
            subdomains,
            subdomains_by_source,
            dns_a_records,
            dns_aaaa_records,
            dns_cname_records,
            dns_mx_records,
            dns_ns_records,
            dns_txt_records,
            reverse_ip,
            ip_info,
            ip_ports,
            generated_at: Utc::now(),
        };

        self.cache.put(key, report.clone());
        info!(domain = %domain, "Analysis finished.");
        Ok(report)
    }

    /// Re-probes a set of IPs outside a full analysis, e.g. for an on-demand
    /// rescan of a single host from a previous report.
    pub async fn probe_ips(
        &self,
        ips: &[String],
        scan: &ScanOptions,
    ) -> BTreeMap<String, PortReport> {
        let ips: Vec<String> = ips
            .iter()
            .map(|ip| ip.trim().to_string())
            .filter(|ip| !ip.is_empty())
            .collect();
        if ips.is_empty() {
            return BTreeMap::new();
        }
        probe_many(self.scanner.as_ref(), &ips, scan).await
    }

    /// Builds the per-analysis HTTP client for enrichment traffic, routing
    /// through a SOCKS endpoint selected once when proxying is enabled.
    async fn enrichment_client(
        &self,
        proxy: &ProxyOptions,
    ) -> Result<reqwest::Client, EngineError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(HTTP_TIMEOUT)
            .connect_timeout(HTTP_CONNECT_TIMEOUT);

        if proxy.enabled {
            let chosen = select_proxy(&candidate_proxies()).await;
            if proxy.require && chosen.is_none() {
                return Err(EngineError::ProxyRequired);
            }
            let endpoint = proxy
                .socks_url
                .clone()
                .or(chosen)
                .unwrap_or_else(default_proxy);
            info!(proxy = %endpoint, "Routing enrichment traffic through SOCKS endpoint.");
            builder = builder.proxy(reqwest::Proxy::all(&endpoint)?);
        }

        Ok(builder.build()?)
    }

    /// Primary reverse-IP lookup plus any enabled secondary sources, merged
    /// additively per IP.
    async fn reverse_with_enrichment(
        &self,
        client: &reqwest::Client,
        ips: &[String],
        providers: &ProviderOptions,
    ) -> BTreeMap<String, Vec<String>> {
        let mut map = self.reverse_ip.lookup_many(client, ips).await;

        if providers.shodan {
            match &self.shodan {
                Some(shodan) => {
                    merge_reverse_map(&mut map, shodan.reverse_enrich(client, ips).await);
                }
                None => warn!("Shodan enrichment requested but no API key is configured."),
            }
        }
        if providers.censys {
            match &self.censys {
                Some(censys) => {
                    merge_reverse_map(&mut map, censys.reverse_enrich(client, ips).await);
                }
                None => warn!("Censys enrichment requested but no API credentials are configured."),
            }
        }
        map
    }

    async fn probe_if_enabled(
        &self,
        ips: &[String],
        scan: &ScanOptions,
    ) -> BTreeMap<String, PortReport> {
        if !scan.enabled || ips.is_empty() {
            return BTreeMap::new();
        }
        probe_many(self.scanner.as_ref(), ips, scan).await
    }
}

/// Validates and normalizes the requested domain: first line only, trimmed,
/// lower-cased, and required to look like a registrable name.
fn normalize_domain(input: &str) -> Result<String, EngineError> {
    let domain = input
        .lines()
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    if domain.is_empty() || !domain.contains('.') {
        return Err(EngineError::InvalidDomain(input.to_string()));
    }
    Ok(domain)
}
