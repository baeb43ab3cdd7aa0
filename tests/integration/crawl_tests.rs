//! Integration tests for the crawler
//!
//! These tests use wiremock to serve fake world and country reports and run
//! the full crawl end-to-end against them.

use asn_harvest::config::Config;
use asn_harvest::crawler::{Coordinator, Fetcher};
use asn_harvest::output::read_dataset;
use asn_harvest::{AsnRecord, ScrapeError};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, output: &Path) -> Config {
    let mut config = Config::default();
    config.crawler.base_url = base_url.to_string();
    config.crawler.timeout_secs = 5;
    config.crawler.connect_timeout_secs = 2;
    config.output.path = output.to_string_lossy().into_owned();
    config
}

fn world_report(codes: &[&str]) -> String {
    let rows: String = codes
        .iter()
        .map(|cc| {
            format!(
                r#"<tr><td>Country {cc}</td><td><a href="/report/world/{cc}">{cc}</a> <img src="/images/flags/{cc}.gif"></td><td>10</td></tr>"#,
                cc = cc
            )
        })
        .collect();

    format!(
        r#"<html><head><title>World Report</title></head><body>
        <table id="table_countries">
            <thead><tr><th>Description</th><th>CC</th><th>ASNs</th></tr></thead>
            <tbody>{}</tbody>
        </table>
        </body></html>"#,
        rows
    )
}

fn country_report(rows: &[[&str; 6]]) -> String {
    let rows: String = rows
        .iter()
        .map(|cells| {
            format!(
                r#"<tr><td><a href="/{asn}">{asn}</a></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>"#,
                cells[1],
                cells[2],
                cells[3],
                cells[4],
                cells[5],
                asn = cells[0]
            )
        })
        .collect();

    format!(
        r#"<html><body>
        <table id="asns">
            <thead><tr><th>ASN</th><th>Name</th><th>Adjacencies v4</th><th>Routes v4</th><th>Adjacencies v6</th><th>Routes v6</th></tr></thead>
            <tbody>{}</tbody>
        </table>
        </body></html>"#,
        rows
    )
}

const NO_ASNS: &str = r#"<html><body><h2>Antarctica</h2><p>No ASNs found.</p></body></html>"#;

async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path.to_string()))
        .and(header("User-Agent", "Mozilla/5.0"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

fn record(asn: &str, country: &str, name: &str, v4: &str, v6: &str) -> AsnRecord {
    AsnRecord {
        asn: asn.to_string(),
        country: country.to_string(),
        name: name.to_string(),
        routes_v4: v4.to_string(),
        routes_v6: v6.to_string(),
    }
}

#[tokio::test]
async fn test_full_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/report/world", world_report(&["DE", "US", "AQ"])).await;
    mount_page(
        &mock_server,
        "/report/world/DE",
        country_report(&[
            ["AS3320", "Deutsche Telekom AG", "250", "13547", "80", "268"],
            ["AS680", "Verein zur Förderung eines Deutschen Forschungsnetzes e.V.", "60", "95", "30", "12"],
        ]),
    )
    .await;
    mount_page(
        &mock_server,
        "/report/world/US",
        country_report(&[["AS36375", "University of Michigan", "2", "14", "1", "1"]]),
    )
    .await;
    mount_page(&mock_server, "/report/world/AQ", NO_ASNS.to_string()).await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("data.json");
    let config = create_test_config(&base_url, &output);

    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let stats = coordinator.run().await.expect("Crawl failed");

    assert_eq!(stats.countries_discovered, 3);
    assert_eq!(stats.countries_fetched, 3);
    assert_eq!(stats.countries_without_table, 1);
    assert_eq!(stats.records_written, 3);

    let expected = concat!(
        "{\n",
        "  3320: {\n",
        "    \"County\": \"DE\",\n",
        "    \"Name\": \"Deutsche Telekom AG\",\n",
        "    \"Routes v4\": 13547,\n",
        "    \"Routes v6\": 268\n",
        "  },\n",
        "  680: {\n",
        "    \"County\": \"DE\",\n",
        "    \"Name\": \"Verein zur Frderung eines Deutschen Forschungsnetzes e.V.\",\n",
        "    \"Routes v4\": 95,\n",
        "    \"Routes v6\": 12\n",
        "  },\n",
        "  36375: {\n",
        "    \"County\": \"US\",\n",
        "    \"Name\": \"University of Michigan\",\n",
        "    \"Routes v4\": 14,\n",
        "    \"Routes v6\": 1\n",
        "  }\n",
        "}\n",
    );
    assert_eq!(std::fs::read_to_string(&output).unwrap(), expected);

    let records = read_dataset(&output).unwrap();
    assert_eq!(
        records,
        vec![
            record("3320", "DE", "Deutsche Telekom AG", "13547", "268"),
            record("680", "DE", "Verein zur Frderung eines Deutschen Forschungsnetzes e.V.", "95", "12"),
            record("36375", "US", "University of Michigan", "14", "1"),
        ]
    );
}

#[tokio::test]
async fn test_countries_fetched_in_discovery_order() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let codes = ["ZA", "BR", "JP", "CA"];
    mount_page(&mock_server, "/report/world", world_report(&codes)).await;
    for cc in codes {
        mount_page(&mock_server, &format!("/report/world/{}", cc), NO_ASNS.to_string()).await;
    }

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("data.json");
    let mut coordinator = Coordinator::new(create_test_config(&base_url, &output)).unwrap();
    coordinator.run().await.expect("Crawl failed");

    let requests = mock_server.received_requests().await.unwrap();
    let paths: Vec<&str> = requests.iter().map(|r| r.url.path()).collect();
    assert_eq!(
        paths,
        vec![
            "/report/world",
            "/report/world/ZA",
            "/report/world/BR",
            "/report/world/JP",
            "/report/world/CA",
        ]
    );

    // No country had a table, so the dataset is the empty object
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "{\n\n}\n");
}

#[tokio::test]
async fn test_empty_world_report() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/report/world", world_report(&[])).await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("data.json");
    let mut coordinator = Coordinator::new(create_test_config(&mock_server.uri(), &output)).unwrap();
    let stats = coordinator.run().await.unwrap();

    assert_eq!(stats.countries_discovered, 0);
    assert_eq!(stats.records_written, 0);
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "{\n\n}\n");
    assert!(read_dataset(&output).unwrap().is_empty());
}

#[tokio::test]
async fn test_strict_json_keys() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/report/world", world_report(&["NL"])).await;
    mount_page(
        &mock_server,
        "/report/world/NL",
        country_report(&[["AS1136", "KPN B.V.", "40", "300", "10", "25"]]),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("data.json");
    let mut config = create_test_config(&mock_server.uri(), &output);
    config.output.strict_json_keys = true;

    Coordinator::new(config).unwrap().run().await.unwrap();

    let text = std::fs::read_to_string(&output).unwrap();
    let strict: serde_json::Value = serde_json::from_str(&text).expect("not strict JSON");
    assert_eq!(strict["1136"]["County"], "NL");
    assert_eq!(strict["1136"]["Name"], "KPN B.V.");
    assert_eq!(strict["1136"]["Routes v4"], 300);
    assert_eq!(strict["1136"]["Routes v6"], 25);
}

#[tokio::test]
async fn test_country_fetch_failure_leaves_partial_file() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/report/world", world_report(&["DE", "FR"])).await;
    mount_page(
        &mock_server,
        "/report/world/DE",
        country_report(&[["AS3320", "Deutsche Telekom AG", "250", "13547", "80", "268"]]),
    )
    .await;
    // FR is not mounted, so the mock server answers 404

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("data.json");
    let mut coordinator = Coordinator::new(create_test_config(&mock_server.uri(), &output)).unwrap();
    let result = coordinator.run().await;

    match result {
        Err(ScrapeError::Status { url, status }) => {
            assert_eq!(status, 404);
            assert!(url.ends_with("/report/world/FR"));
        }
        other => panic!("Expected status error, got {:?}", other),
    }

    let partial = std::fs::read_to_string(&output).unwrap();
    assert!(partial.starts_with("{\n  3320: {\n"));
    assert!(partial.ends_with("  },\n"));
    assert!(read_dataset(&output).is_err());
}

#[tokio::test]
async fn test_missing_country_table_is_fatal() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/report/world",
        "<html><body><p>Please enable JavaScript</p></body></html>".to_string(),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("data.json");
    let mut coordinator = Coordinator::new(create_test_config(&mock_server.uri(), &output)).unwrap();
    let result = coordinator.run().await;

    assert!(matches!(result, Err(ScrapeError::Structure { .. })));
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "{\n");
}

#[tokio::test]
async fn test_malformed_row_is_fatal() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/report/world", world_report(&["GB"])).await;
    mount_page(
        &mock_server,
        "/report/world/GB",
        r#"<html><body><table id="asns"><tbody>
            <tr><td>AS5089</td><td>Virgin Media Limited</td></tr>
        </tbody></table></body></html>"#
            .to_string(),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("data.json");
    let mut coordinator = Coordinator::new(create_test_config(&mock_server.uri(), &output)).unwrap();
    let result = coordinator.run().await;

    match result {
        Err(ScrapeError::Structure { url, .. }) => assert!(url.ends_with("/report/world/GB")),
        other => panic!("Expected structure error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetcher_sends_browser_user_agent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/report/world"))
        .and(header("User-Agent", "Mozilla/5.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/report/world"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let url = format!("{}/report/world", mock_server.uri());

    let config = create_test_config(&mock_server.uri(), Path::new("unused.json"));
    let fetcher = Fetcher::new(&config.crawler).unwrap();
    assert!(fetcher.fetch_document(&url).await.is_ok());

    let mut other = config.crawler.clone();
    other.user_agent = "curl/8.0".to_string();
    let fetcher = Fetcher::new(&other).unwrap();
    match fetcher.fetch_text(&url).await {
        Err(ScrapeError::Status { status, .. }) => assert_eq!(status, 403),
        other => panic!("Expected 403, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetcher_connection_failure() {
    // Grab a free port and release it so nothing is listening there
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let url = format!("http://127.0.0.1:{}/report/world", port);

    let fetcher = Fetcher::new(&Config::default().crawler).unwrap();
    let result = fetcher.fetch_document(&url).await;
    assert!(matches!(result, Err(ScrapeError::Http { .. })));
}
