// src/core/enrich/mod.rs

pub mod censys;
pub mod rdap;
pub mod reverse_ip;
pub mod shodan;

pub use censys::CensysClient;
pub use rdap::RdapClient;
pub use reverse_ip::ReverseIpClient;
pub use shodan::ShodanClient;

use std::collections::BTreeMap;

/// Outbound calls in flight at once per enrichment source. Kept small to
/// respect third-party rate limits regardless of how many IPs an analysis
/// produced.
pub(crate) const ENRICH_POOL: usize = 5;

/// Folds a secondary source's discoveries into the per-IP domain map.
/// Additive only: exact duplicates are skipped and nothing from the primary
/// source is ever overwritten.
pub fn merge_reverse_map(
    map: &mut BTreeMap<String, Vec<String>>,
    extra: BTreeMap<String, Vec<String>>,
) {
    for (ip, domains) in extra {
        let entry = map.entry(ip).or_default();
        for domain in domains {
            if !entry.contains(&domain) {
                entry.push(domain);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secondary_results_merge_without_duplicates() {
        let mut map = BTreeMap::from([("1.2.3.4".to_string(), vec!["a.com".to_string()])]);
        let extra = BTreeMap::from([(
            "1.2.3.4".to_string(),
            vec!["a.com".to_string(), "b.com".to_string()],
        )]);

        merge_reverse_map(&mut map, extra);
        assert_eq!(map["1.2.3.4"], vec!["a.com", "b.com"]);
    }

    #[test]
    fn merge_adds_ips_the_primary_source_missed() {
        let mut map = BTreeMap::new();
        merge_reverse_map(
            &mut map,
            BTreeMap::from([("5.6.7.8".to_string(), vec!["c.com".to_string()])]),
        );
        assert_eq!(map["5.6.7.8"], vec!["c.com"]);
    }
}
