// src/core/enrich/rdap.rs

use super::ENRICH_POOL;
use crate::core::models::{IpInfo, IpInfoEntity, IpInfoEvent};
use crate::core::pool::bounded_map;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

const MAX_ENTITIES: usize = 3;
const MAX_EVENTS: usize = 5;

/// Registry lookups through the rdap.org aggregator, which fronts the
/// regional registries. Best-effort: field availability varies by RIR.
pub struct RdapClient {
    base_url: String,
}

impl Default for RdapClient {
    fn default() -> Self {
        Self::new()
    }
}

impl RdapClient {
    pub fn new() -> Self {
        Self::with_base_url("https://rdap.org/ip")
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Fetches registry records for every IP under a bounded pool. Missing
    /// or unreachable records become `IpInfo::default()`, never an error.
    pub async fn lookup_many(
        &self,
        client: &reqwest::Client,
        ips: &[String],
    ) -> BTreeMap<String, IpInfo> {
        let results = bounded_map(ips.to_vec(), ENRICH_POOL, |ip| async move {
            let info = self.lookup_one(client, &ip).await;
            (ip, info)
        })
        .await;
        results.into_iter().collect()
    }

    async fn lookup_one(&self, client: &reqwest::Client, ip: &str) -> IpInfo {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), ip);
        let response = match client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(ip, error = %e, "RDAP request failed.");
                return IpInfo::default();
            }
        };
        if !response.status().is_success() {
            debug!(ip, status = %response.status(), "RDAP returned non-success.");
            return IpInfo::default();
        }
        match response.json::<Value>().await {
            Ok(data) => extract_ip_info(&data),
            Err(e) => {
                warn!(ip, error = %e, "RDAP payload was not valid JSON.");
                IpInfo::default()
            }
        }
    }
}

fn str_field(data: &Value, key: &str) -> Option<String> {
    data.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Extracts the compact subset of an RDAP response the report carries:
/// ownership and range fields, up to 3 entity contacts and 5 lifecycle
/// events.
pub(crate) fn extract_ip_info(data: &Value) -> IpInfo {
    let entities = data
        .get("entities")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .take(MAX_ENTITIES)
                .map(|e| IpInfoEntity {
                    handle: str_field(e, "handle"),
                    roles: e
                        .get("roles")
                        .and_then(Value::as_array)
                        .map(|roles| {
                            roles
                                .iter()
                                .filter_map(Value::as_str)
                                .map(str::to_string)
                                .collect()
                        })
                        .unwrap_or_default(),
                    object_class_name: str_field(e, "objectClassName"),
                    vcard: e
                        .get("vcardArray")
                        .and_then(Value::as_array)
                        .and_then(|v| v.get(1))
                        .cloned(),
                })
                .collect()
        })
        .unwrap_or_default();

    let events = data
        .get("events")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .take(MAX_EVENTS)
                .map(|ev| IpInfoEvent {
                    event_action: str_field(ev, "eventAction"),
                    event_date: str_field(ev, "eventDate"),
                })
                .collect()
        })
        .unwrap_or_default();

    IpInfo {
        name: str_field(data, "name"),
        handle: str_field(data, "handle"),
        country: str_field(data, "country"),
        start_address: str_field(data, "startAddress"),
        end_address: str_field(data, "endAddress"),
        parent_handle: str_field(data, "parentHandle"),
        object_class_name: str_field(data, "objectClassName"),
        entities,
        events,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_the_compact_field_set() {
        let data = json!({
            "name": "EDGECAST-NETBLK-03",
            "handle": "NET-93-184-216-0-1",
            "country": "US",
            "startAddress": "93.184.216.0",
            "endAddress": "93.184.216.255",
            "parentHandle": "NET-93-0-0-0-0",
            "objectClassName": "ip network",
            "entities": [
                {"handle": "ABUSE1", "roles": ["abuse"], "objectClassName": "entity"},
                {"handle": "ORG1", "roles": ["registrant"]},
                {"handle": "TECH1"},
                {"handle": "DROPPED"}
            ],
            "events": [
                {"eventAction": "registration", "eventDate": "2008-06-02T00:00:00Z"},
                {"eventAction": "last changed", "eventDate": "2012-06-22T00:00:00Z"}
            ]
        });

        let info = extract_ip_info(&data);
        assert_eq!(info.name.as_deref(), Some("EDGECAST-NETBLK-03"));
        assert_eq!(info.country.as_deref(), Some("US"));
        assert_eq!(info.entities.len(), 3);
        assert_eq!(info.entities[0].roles, vec!["abuse"]);
        assert_eq!(info.events.len(), 2);
        assert_eq!(info.events[0].event_action.as_deref(), Some("registration"));
    }

    #[test]
    fn empty_payload_extracts_to_default() {
        assert_eq!(extract_ip_info(&json!({})), IpInfo::default());
    }
}
