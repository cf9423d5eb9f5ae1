// src/main.rs

use clap::Parser;
use color_eyre::eyre::Result;
use std::sync::Arc;
use webrecon::core::config::{AnalyzeOptions, EnumerationMode};
use webrecon::core::enumerate::tooling_status;
use webrecon::core::{AnalysisCache, ReconPipeline};
use webrecon::logging::initialize_logging;

/// Reconnaissance for a root domain: subdomain discovery, DNS resolution,
/// reverse-IP and registry enrichment, optional port probing. Prints the
/// aggregate report as JSON on stdout.
#[derive(Debug, Parser)]
#[command(name = "webrecon", version, about)]
struct Cli {
    /// Root domain to analyze, e.g. example.com
    domain: String,

    /// Enumeration mode: passive (default) or aggressive
    #[arg(long, default_value = "passive")]
    mode: EnumerationMode,

    /// Disable the amass producer
    #[arg(long)]
    no_amass: bool,

    /// Disable the sublist3r producer
    #[arg(long)]
    no_sublist3r: bool,

    /// Disable the crt.sh producer
    #[arg(long)]
    no_crtsh: bool,

    /// Enable the subfinder producer
    #[arg(long)]
    subfinder: bool,

    /// Enable the SecurityTrails producer (needs SECURITYTRAILS_API_KEY)
    #[arg(long)]
    securitytrails: bool,

    /// Enable Shodan reverse enrichment (needs SHODAN_API_KEY)
    #[arg(long)]
    shodan: bool,

    /// Enable Censys reverse enrichment (needs CENSYS_API_ID/SECRET)
    #[arg(long)]
    censys: bool,

    /// Probe open ports on every resolved IP
    #[arg(long)]
    scan_ports: bool,

    /// Number of top ports to probe
    #[arg(long, default_value_t = 100)]
    top_ports: u16,

    /// Explicit port specification (e.g. "22,80,443"), overrides --top-ports
    #[arg(long)]
    ports: Option<String>,

    /// Include UDP in the port probe
    #[arg(long)]
    udp: bool,

    /// Per-host scan timeout in seconds
    #[arg(long, default_value_t = 60)]
    scan_timeout: u64,

    /// Route port probes through proxychains (needs proxychains4/proxychains)
    #[arg(long)]
    nmap_via_tor: bool,

    /// Route enrichment traffic through a SOCKS proxy
    #[arg(long)]
    proxy: bool,

    /// Explicit SOCKS endpoint, e.g. socks5://127.0.0.1:9050
    #[arg(long)]
    socks_url: Option<String>,

    /// Fail instead of going direct when no proxy endpoint is reachable
    #[arg(long)]
    require_proxy: bool,

    /// Print which local enumeration tools are installed, then exit
    #[arg(long)]
    status: bool,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,
}

fn options_from(cli: &Cli) -> AnalyzeOptions {
    let mut options = AnalyzeOptions::default();
    options.mode = cli.mode;
    options.providers.amass = !cli.no_amass;
    options.providers.sublist3r = !cli.no_sublist3r;
    options.providers.crtsh = !cli.no_crtsh;
    options.providers.subfinder = cli.subfinder;
    options.providers.securitytrails = cli.securitytrails;
    options.providers.shodan = cli.shodan;
    options.providers.censys = cli.censys;
    options.scan.enabled = cli.scan_ports;
    options.scan.top_ports = cli.top_ports;
    options.scan.ports_spec = cli.ports.clone();
    options.scan.udp = cli.udp;
    options.scan.timeout_per_host = cli.scan_timeout;
    options.scan.via_tor = cli.nmap_via_tor;
    options.proxy.enabled = cli.proxy || cli.require_proxy || cli.socks_url.is_some();
    options.proxy.socks_url = cli.socks_url.clone();
    options.proxy.require = cli.require_proxy;
    options
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    initialize_logging()?;

    let cli = Cli::parse();

    if cli.status {
        let status = tooling_status();
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    let options = options_from(&cli);
    let cache = Arc::new(AnalysisCache::new());
    let pipeline = ReconPipeline::new(cache)?;

    let report = pipeline.analyze(&cli.domain, &options).await?;

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{rendered}");
    Ok(())
}
