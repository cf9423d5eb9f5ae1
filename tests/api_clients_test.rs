// tests/api_clients_test.rs

use std::time::Duration;
use webrecon::core::config::EnumerationMode;
use webrecon::core::enrich::{CensysClient, RdapClient, ReverseIpClient};
use webrecon::core::enumerate::{CrtShProducer, SecurityTrailsProducer, SubdomainProducer};
use webrecon::core::error::ProducerFailure;
use webrecon::core::models::IpInfo;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn crtsh_extracts_names_from_the_certificate_log() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("output", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"name_value": "www.example.com\n*.example.com"},
            {"name_value": "api.example.com"},
            {"common_name": "mail.example.com"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let producer = CrtShProducer::with_base_url(client(), server.uri());
    let names = producer
        .run("example.com", EnumerationMode::Passive, TIMEOUT)
        .await
        .unwrap();

    assert!(names.contains(&"www.example.com".to_string()));
    assert!(names.contains(&"*.example.com".to_string()));
    assert!(names.contains(&"api.example.com".to_string()));
}

#[tokio::test]
async fn crtsh_non_success_is_an_upstream_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let producer = CrtShProducer::with_base_url(client(), server.uri());
    let err = producer
        .run("example.com", EnumerationMode::Passive, TIMEOUT)
        .await
        .unwrap_err();
    assert!(matches!(err, ProducerFailure::Upstream(_)));
}

#[tokio::test]
async fn securitytrails_joins_children_to_the_root() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/domain/example.com/subdomains"))
        .and(header("APIKEY", "st-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "subdomains": ["www", "dev", " "]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let producer = SecurityTrailsProducer::with_base_url(client(), server.uri(), "st-key");
    let names = producer
        .run("example.com", EnumerationMode::Passive, TIMEOUT)
        .await
        .unwrap();

    assert_eq!(names, vec!["www.example.com", "dev.example.com"]);
}

#[tokio::test]
async fn reverse_ip_filters_lines_to_plausible_domains() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("q", "1.2.3.4"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("shared-a.example.net\nlocalhost\nShared-B.example.net\n"),
        )
        .mount(&server)
        .await;

    let reverse = ReverseIpClient::with_base_url(server.uri());
    let map = reverse
        .lookup_many(&client(), &["1.2.3.4".to_string()])
        .await;

    assert_eq!(
        map.get("1.2.3.4").unwrap(),
        &vec![
            "shared-a.example.net".to_string(),
            "shared-b.example.net".to_string()
        ]
    );
}

#[tokio::test]
async fn reverse_ip_error_body_yields_empty_for_that_ip_only() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("q", "1.2.3.4"))
        .respond_with(ResponseTemplate::new(200).set_body_string("API count exceeded - error"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("q", "5.6.7.8"))
        .respond_with(ResponseTemplate::new(200).set_body_string("other.example.org\n"))
        .mount(&server)
        .await;

    let reverse = ReverseIpClient::with_base_url(server.uri());
    let map = reverse
        .lookup_many(
            &client(),
            &["1.2.3.4".to_string(), "5.6.7.8".to_string()],
        )
        .await;

    assert!(map.get("1.2.3.4").unwrap().is_empty());
    assert_eq!(
        map.get("5.6.7.8").unwrap(),
        &vec!["other.example.org".to_string()]
    );
}

#[tokio::test]
async fn rdap_extracts_registry_fields_and_tolerates_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/93.184.216.34"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "EDGECAST-NETBLK-03",
            "handle": "NET-93-184-216-0-1",
            "country": "EU",
            "startAddress": "93.184.216.0",
            "endAddress": "93.184.216.255",
            "objectClassName": "ip network"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/203.0.113.9"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let rdap = RdapClient::with_base_url(server.uri());
    let map = rdap
        .lookup_many(
            &client(),
            &["93.184.216.34".to_string(), "203.0.113.9".to_string()],
        )
        .await;

    let hit = map.get("93.184.216.34").unwrap();
    assert_eq!(hit.name.as_deref(), Some("EDGECAST-NETBLK-03"));
    assert_eq!(hit.country.as_deref(), Some("EU"));

    // Rate-limited IP degrades to an empty record, not an error.
    assert_eq!(map.get("203.0.113.9").unwrap(), &IpInfo::default());
}

#[tokio::test]
async fn censys_collects_forward_dns_names() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/hosts/1.2.3.4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": {"dns": {"names": ["A.example.org", "b.example.org", "a.example.org"]}}
        })))
        .mount(&server)
        .await;

    let censys = CensysClient::with_base_url(server.uri(), "id", "secret");
    let map = censys
        .reverse_enrich(&client(), &["1.2.3.4".to_string()])
        .await;

    assert_eq!(
        map.get("1.2.3.4").unwrap(),
        &vec!["a.example.org".to_string(), "b.example.org".to_string()]
    );
}
