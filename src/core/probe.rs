// src/core/probe.rs

use crate::core::command::{binary_on_path, run_capture};
use crate::core::config::ScanOptions;
use crate::core::error::ProducerFailure;
use crate::core::models::{PortEntry, PortReport};
use crate::core::pool::bounded_map;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Diagnostic markers surfaced in `PortReport.error`. Tool absence is a
/// distinct, reportable condition separate from a timeout or a failed scan.
pub const TOOL_NOT_FOUND: &str = "tool-not-found";
pub const SCAN_TIMEOUT: &str = "timeout";

const STDERR_EXCERPT_LEN: usize = 500;

/// An external port scanner probing a single IP. The real implementation
/// shells out to nmap; tests substitute fixed-output fakes.
#[async_trait]
pub trait PortScanner: Send + Sync {
    async fn scan_ip(&self, ip: &str, options: &ScanOptions) -> PortReport;
}

/// Probes every IP under a pool of `options.concurrency` workers. Each scan
/// is an isolated subprocess with its own hard timeout; a failed scan is an
/// error marker in that IP's report, never a stage failure.
pub async fn probe_many(
    scanner: &dyn PortScanner,
    ips: &[String],
    options: &ScanOptions,
) -> BTreeMap<String, PortReport> {
    info!(ips = ips.len(), concurrency = options.concurrency, "Starting port probes.");
    let results = bounded_map(ips.to_vec(), options.concurrency, |ip| async move {
        let report = scanner.scan_ip(&ip, options).await;
        (ip, report)
    })
    .await;
    results.into_iter().collect()
}

/// nmap invoked in grepable-output mode (`-oG -`) with a TCP connect scan,
/// so no elevated privileges are needed. With `via_tor` the invocation is
/// wrapped in proxychains so probe traffic rides the Tor SOCKS circuit.
pub struct NmapScanner {
    command: String,
    proxychains: String,
}

impl Default for NmapScanner {
    fn default() -> Self {
        Self::with_command("nmap")
    }
}

/// proxychains-ng installs as `proxychains4`; older setups only have
/// `proxychains`.
pub fn detect_proxychains() -> &'static str {
    if binary_on_path("proxychains4") {
        "proxychains4"
    } else {
        "proxychains"
    }
}

impl NmapScanner {
    pub fn with_command(command: impl Into<String>) -> Self {
        Self::with_commands(command, detect_proxychains())
    }

    pub fn with_commands(command: impl Into<String>, proxychains: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            proxychains: proxychains.into(),
        }
    }

    fn invocation(&self, ip: &str, options: &ScanOptions) -> (String, Vec<String>) {
        let args = build_nmap_args(ip, options);
        if options.via_tor {
            let mut wrapped = vec!["-q".to_string(), self.command.clone()];
            wrapped.extend(args);
            (self.proxychains.clone(), wrapped)
        } else {
            (self.command.clone(), args)
        }
    }
}

#[async_trait]
impl PortScanner for NmapScanner {
    async fn scan_ip(&self, ip: &str, options: &ScanOptions) -> PortReport {
        let (program, args) = self.invocation(ip, options);
        let limit = Duration::from_secs(options.timeout_per_host);

        match run_capture(&program, &args, limit).await {
            Ok(out) if out.success => {
                let ports = parse_grepable_output(&out.stdout);
                debug!(ip, open = ports.len(), "Scan finished.");
                PortReport { ports, error: None }
            }
            Ok(out) => {
                let excerpt: String = out.stderr.trim().chars().take(STDERR_EXCERPT_LEN).collect();
                warn!(ip, "Scanner exited non-zero.");
                PortReport::failed(if excerpt.is_empty() {
                    "scan failed".to_string()
                } else {
                    excerpt
                })
            }
            Err(ProducerFailure::ToolNotFound) => {
                warn!(ip, "Scanner executable not found.");
                PortReport::failed(TOOL_NOT_FOUND)
            }
            Err(ProducerFailure::Timeout) => {
                warn!(ip, timeout = options.timeout_per_host, "Scan timed out; process killed.");
                PortReport::failed(SCAN_TIMEOUT)
            }
            Err(failure) => {
                warn!(ip, failure = %failure, "Scan failed to run.");
                PortReport::failed(failure.to_string())
            }
        }
    }
}

fn build_nmap_args(ip: &str, options: &ScanOptions) -> Vec<String> {
    let mut args = vec![
        "-n".to_string(),
        format!("-{}", options.timing),
    ];
    match &options.ports_spec {
        Some(spec) => args.extend(["-p".to_string(), spec.clone()]),
        None => args.extend(["--top-ports".to_string(), options.top_ports.to_string()]),
    }
    args.extend(["-sT".to_string(), "-oG".to_string(), "-".to_string()]);
    if options.skip_host_discovery {
        args.push("-Pn".to_string());
    }
    if options.udp {
        args.push("-sU".to_string());
    }
    args.push(ip.to_string());
    args
}

/// Parses nmap's grepable output, keeping only ports in the "open" state.
/// Each entry reads `port/state/protocol/owner/service/rpc/version`; the
/// version field folds product and version together, so a trailing token
/// that starts with a digit is split off as the version. Malformed output
/// parses to an empty list rather than raising.
fn parse_grepable_output(text: &str) -> Vec<PortEntry> {
    let mut entries = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if !line.starts_with("Host:") {
            continue;
        }
        let Some((_, ports_part)) = line.split_once("Ports:") else {
            continue;
        };
        let ports_part = ports_part.split("Ignored State:").next().unwrap_or("");

        for raw in ports_part.split(',') {
            let fields: Vec<&str> = raw.trim().split('/').collect();
            if fields.len() < 3 {
                continue;
            }
            let Ok(port) = fields[0].trim().parse::<u16>() else {
                continue;
            };
            if fields[1] != "open" {
                continue;
            }
            let protocol = if fields[2].is_empty() { "tcp" } else { fields[2] };
            let service = fields
                .get(4)
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string());
            let (product, version) =
                split_version_info(fields.get(6).map(|s| s.trim()).unwrap_or(""));

            entries.push(PortEntry {
                port,
                protocol: protocol.to_string(),
                service,
                product,
                version,
            });
        }
    }
    entries
}

fn split_version_info(info: &str) -> (Option<String>, Option<String>) {
    if info.is_empty() {
        return (None, None);
    }
    let mut words: Vec<&str> = info.split_whitespace().collect();
    let last_is_version = words.len() >= 2
        && words
            .last()
            .is_some_and(|w| w.starts_with(|c: char| c.is_ascii_digit()));
    if last_is_version {
        let version = words.pop().map(str::to_string);
        (Some(words.join(" ")), version)
    } else {
        (Some(info.to_string()), None)
    }
}
