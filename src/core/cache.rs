// src/core/cache.rs

use crate::core::config::AnalyzeOptions;
use crate::core::models::AnalysisReport;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Stable cache key for one analysis: the normalized domain plus exactly the
/// options that affect enumerated/resolved data. Scan tuning parameters are
/// excluded; whether scanning is enabled at all is included, since it decides
/// whether the aggregate carries port data.
pub fn fingerprint(domain: &str, options: &AnalyzeOptions) -> String {
    let p = &options.providers;
    let t = &options.timeouts;
    format!(
        "{domain}|mode={}|providers=amass:{},sublist3r:{},crtsh:{},subfinder:{},securitytrails:{},shodan:{},censys:{}|timeouts=amass:{},sublist3r:{},crtsh:{},subfinder:{},securitytrails:{}|scan={}",
        options.mode,
        p.amass,
        p.sublist3r,
        p.crtsh,
        p.subfinder,
        p.securitytrails,
        p.shodan,
        p.censys,
        t.amass,
        t.sublist3r,
        t.crtsh,
        t.subfinder,
        t.securitytrails,
        options.scan.enabled,
    )
}

/// Process-scoped store of completed analyses, injected into the pipeline so
/// cache behavior stays independently testable. Entries never expire within
/// the process lifetime; `clear` is the only teardown.
#[derive(Default)]
pub struct AnalysisCache {
    entries: Mutex<HashMap<String, AnalysisReport>>,
}

impl AnalysisCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Readers clone whole reports out and writers only insert or clear, so
    /// the map is never left torn; a poisoned lock is recovered, not fatal.
    fn guard(&self) -> MutexGuard<'_, HashMap<String, AnalysisReport>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(&self, key: &str) -> Option<AnalysisReport> {
        self.guard().get(key).cloned()
    }

    pub fn put(&self, key: String, report: AnalysisReport) {
        debug!(key = %key, "Storing analysis in cache.");
        self.guard().insert(key, report);
    }

    pub fn clear(&self) {
        self.guard().clear();
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Up to `limit` stored keys, for status displays.
    pub fn keys(&self, limit: usize) -> Vec<String> {
        self.guard().keys().take(limit).cloned().collect()
    }
}
