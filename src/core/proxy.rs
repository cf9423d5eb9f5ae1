// src/core/proxy.rs

use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, warn};
use url::Url;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
const DEFAULT_SOCKS: &str = "socks5://tor:9050";
const DEFAULT_SOCKS_PORT: u16 = 9050;

/// Candidate SOCKS endpoints in priority order: the `TOR_SOCKS_URL`
/// environment variable first, then the docker-compose service name and the
/// usual local Tor ports.
pub fn candidate_proxies() -> Vec<String> {
    let mut candidates = Vec::new();
    if let Ok(url) = std::env::var("TOR_SOCKS_URL") {
        if !url.is_empty() {
            candidates.push(url);
        }
    }
    candidates.extend(
        [
            "socks5://tor:9050",
            "socks5://tor:9150",
            "socks5://127.0.0.1:9050",
            "socks5://127.0.0.1:9150",
        ]
        .map(String::from),
    );
    candidates
}

/// Probes each candidate with a short TCP connect and returns the first one
/// that accepts a connection. No protocol data is sent; individual connect
/// errors are swallowed and only total exhaustion is visible as `None`.
pub async fn select_proxy(candidates: &[String]) -> Option<String> {
    for candidate in candidates {
        let Ok(parsed) = Url::parse(candidate) else {
            warn!(url = %candidate, "Skipping unparsable proxy candidate.");
            continue;
        };
        let host = parsed.host_str().unwrap_or("127.0.0.1").to_string();
        let port = parsed.port().unwrap_or(DEFAULT_SOCKS_PORT);

        match timeout(CONNECT_TIMEOUT, TcpStream::connect((host.as_str(), port))).await {
            Ok(Ok(_)) => {
                debug!(url = %candidate, "Proxy candidate is reachable.");
                return Some(candidate.clone());
            }
            Ok(Err(e)) => debug!(url = %candidate, error = %e, "Proxy connect failed."),
            Err(_) => debug!(url = %candidate, "Proxy connect timed out."),
        }
    }
    None
}

/// Best-effort fallback identifier for display purposes only. Callers must
/// not treat this as a live endpoint.
pub fn default_proxy() -> String {
    std::env::var("TOR_SOCKS_URL").unwrap_or_else(|_| DEFAULT_SOCKS.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn picks_the_first_reachable_candidate() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let reachable = format!("socks5://127.0.0.1:{port}");

        // Port 9 (discard) on localhost is almost certainly closed; an
        // unparsable entry must be skipped without aborting the walk.
        let candidates = vec![
            "not a url".to_string(),
            "socks5://127.0.0.1:9".to_string(),
            reachable.clone(),
        ];

        let selected = select_proxy(&candidates).await;
        assert_eq!(selected, Some(reachable));
    }

    #[tokio::test]
    async fn exhaustion_yields_none() {
        let candidates = vec!["socks5://127.0.0.1:9".to_string()];
        assert_eq!(select_proxy(&candidates).await, None);
    }
}
