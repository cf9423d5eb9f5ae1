// src/core/config.rs

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How aggressively the tool-based enumeration producers behave.
///
/// `Passive` keeps the tools to OSINT-only sources; `Aggressive` lets them
/// touch the target directly (for amass this drops the `-passive` flag).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EnumerationMode {
    #[default]
    Passive,
    Aggressive,
}

/// Which discovery and enrichment producers are enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderOptions {
    pub amass: bool,
    pub sublist3r: bool,
    pub crtsh: bool,
    pub subfinder: bool,
    pub securitytrails: bool,
    pub shodan: bool,
    pub censys: bool,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            amass: true,
            sublist3r: true,
            crtsh: true,
            subfinder: false,
            securitytrails: false,
            shodan: false,
            censys: false,
        }
    }
}

impl ProviderOptions {
    /// Whether the enumeration producer with the given name should run.
    pub fn enabled(&self, name: &str) -> bool {
        match name {
            "amass" => self.amass,
            "sublist3r" => self.sublist3r,
            "crtsh" => self.crtsh,
            "subfinder" => self.subfinder,
            "securitytrails" => self.securitytrails,
            _ => false,
        }
    }
}

/// Per-producer enumeration timeouts, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutOptions {
    pub amass: u64,
    pub sublist3r: u64,
    pub crtsh: u64,
    pub subfinder: u64,
    pub securitytrails: u64,
}

impl Default for TimeoutOptions {
    fn default() -> Self {
        Self {
            amass: 240,
            sublist3r: 360,
            crtsh: 20,
            subfinder: 240,
            securitytrails: 25,
        }
    }
}

impl TimeoutOptions {
    pub fn for_source(&self, name: &str) -> u64 {
        match name {
            "amass" => self.amass,
            "sublist3r" => self.sublist3r,
            "crtsh" => self.crtsh,
            "subfinder" => self.subfinder,
            "securitytrails" => self.securitytrails,
            _ => 60,
        }
    }
}

/// Port-probe parameters handed to the external scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    pub enabled: bool,
    pub top_ports: u16,
    pub timing: String,
    pub skip_host_discovery: bool,
    pub udp: bool,
    pub timeout_per_host: u64,
    pub concurrency: usize,
    /// Wrap the scanner in proxychains so probes ride the Tor SOCKS circuit
    /// instead of going direct.
    pub via_tor: bool,
    /// Explicit port specification (e.g. "22,80,443" or "1-1024");
    /// overrides `top_ports` when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ports_spec: Option<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            top_ports: 100,
            timing: "T4".to_string(),
            skip_host_discovery: true,
            udp: false,
            timeout_per_host: 60,
            concurrency: 3,
            via_tor: false,
            ports_spec: None,
        }
    }
}

/// SOCKS proxy routing for enrichment traffic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyOptions {
    pub enabled: bool,
    /// Explicit endpoint, e.g. "socks5://127.0.0.1:9050". When unset a
    /// reachable candidate is probed for at analysis time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socks_url: Option<String>,
    /// Reject the analysis instead of going direct when no endpoint answers.
    pub require: bool,
}

/// Top-level options for one analysis, validated once at the pipeline
/// boundary. Every field has a documented default so an empty request body
/// maps to a sane passive analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzeOptions {
    pub mode: EnumerationMode,
    pub providers: ProviderOptions,
    pub timeouts: TimeoutOptions,
    pub scan: ScanOptions,
    pub proxy: ProxyOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_the_passive_trio() {
        let opts = AnalyzeOptions::default();
        assert_eq!(opts.mode, EnumerationMode::Passive);
        assert!(opts.providers.enabled("amass"));
        assert!(opts.providers.enabled("sublist3r"));
        assert!(opts.providers.enabled("crtsh"));
        assert!(!opts.providers.enabled("subfinder"));
        assert!(!opts.providers.enabled("securitytrails"));
        assert!(!opts.scan.enabled);
        assert!(!opts.proxy.enabled);
    }

    #[test]
    fn unknown_provider_name_is_disabled() {
        assert!(!ProviderOptions::default().enabled("nosuchtool"));
    }

    #[test]
    fn mode_round_trips_through_strings() {
        assert_eq!(EnumerationMode::Passive.to_string(), "passive");
        assert_eq!(
            "aggressive".parse::<EnumerationMode>().unwrap(),
            EnumerationMode::Aggressive
        );
    }

    #[test]
    fn empty_json_body_yields_defaults() {
        let opts: AnalyzeOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, AnalyzeOptions::default());
    }
}
