// src/core/models.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// --- DNS Models ---

/// The six record types resolved for every host. A type that failed to
/// resolve, or simply has no data, is an empty sequence, never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecordSet {
    pub a: Vec<String>,
    pub aaaa: Vec<String>,
    pub cname: Vec<String>,
    pub mx: Vec<String>,
    pub ns: Vec<String>,
    pub txt: Vec<String>,
}

// --- Enrichment Models ---

/// Compact RDAP registry record for a single IP address.
///
/// Every field is optional: an unreachable registry or a non-200 response
/// yields `IpInfo::default()`, which serializes to an empty object rather
/// than failing the enrichment stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IpInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_class_name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub entities: Vec<IpInfoEntity>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub events: Vec<IpInfoEvent>,
}

/// A registry contact attached to an `IpInfo` record (at most 3 are kept).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IpInfoEntity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub roles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcard: Option<serde_json::Value>,
}

/// A lifecycle event (registration, last changed) from RDAP (at most 5 kept).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IpInfoEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_date: Option<String>,
}

// --- Port Probe Models ---

/// A single open port observed by the scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortEntry {
    pub port: u16,
    pub protocol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Scan outcome for one IP. `ports` only contains ports seen in the "open"
/// state; `error` carries a diagnostic marker ("tool-not-found", "timeout",
/// or a stderr excerpt) when the scan itself could not run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortReport {
    pub ports: Vec<PortEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PortReport {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            ports: Vec::new(),
            error: Some(reason.into()),
        }
    }
}

// --- WHOIS Model ---

/// Raw WHOIS text for the root domain. A failed lookup is folded into the
/// `error` field and never blocks the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhoisRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// --- Aggregate Report ---

/// The full result of one analysis, as stored in the cache and handed to
/// whatever transport layer sits in front of the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub domain: String,
    pub whois: WhoisRecord,
    pub subdomains: Vec<String>,
    pub subdomains_by_source: BTreeMap<String, Vec<String>>,
    pub dns_a_records: BTreeMap<String, Vec<String>>,
    pub dns_aaaa_records: BTreeMap<String, Vec<String>>,
    pub dns_cname_records: BTreeMap<String, Vec<String>>,
    pub dns_mx_records: BTreeMap<String, Vec<String>>,
    pub dns_ns_records: BTreeMap<String, Vec<String>>,
    pub dns_txt_records: BTreeMap<String, Vec<String>>,
    pub reverse_ip: BTreeMap<String, Vec<String>>,
    pub ip_info: BTreeMap<String, IpInfo>,
    pub ip_ports: BTreeMap<String, PortReport>,
    pub generated_at: DateTime<Utc>,
}
