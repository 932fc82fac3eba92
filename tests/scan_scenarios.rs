//! End-to-end scans against local mock servers

use std::time::Duration;

use siteguard::{Config, ScanEngine, ScanRequest, ScanType, SiteguardError, Status};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config() -> Config {
    let mut config = Config::default();
    config.scanner.request_timeout_ms = 2000;
    config.scanner.path_timeout_ms = 500;
    config.scanner.ssl_timeout_ms = 500;
    config.scanner.robots_timeout_ms = 500;
    config.dns.doh_enabled = false;
    config
}

fn engine() -> ScanEngine {
    ScanEngine::new(&test_config()).expect("engine")
}

async fn bare_site(body: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;
    server
}

// ============================================================================
// Quick scan
// ============================================================================

#[tokio::test]
async fn test_quick_scan_without_security_headers() {
    let server = bare_site("<html><body>hello</body></html>").await;

    let report = engine()
        .scan(&server.uri(), ScanType::Quick)
        .await
        .expect("scan");

    assert_eq!(report.headers["HSTS"].status, Status::Fail);
    assert_eq!(report.headers["HSTS"].score, Some(20));
    assert_eq!(report.headers["CSP"].status, Status::Warning);
    assert_eq!(report.headers["CSP"].score, Some(15));
    assert_eq!(report.headers["X-Frame"].status, Status::Fail);
    assert_eq!(report.headers["X-Frame"].score, Some(10));
    assert!(report.cookies.is_empty());

    assert!(report.ssl.is_none());
    assert!(report.content.is_none());
    assert!(report.supply_chain.is_none());

    assert_eq!(report.risk_score, 55);
    assert_eq!(report.general.status, 200);
    assert_eq!(report.general.ip.as_deref(), Some("127.0.0.1"));
    assert!(report.general.duration.ends_with("ms"));
}

#[tokio::test]
async fn test_cookie_without_flags() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).insert_header("Set-Cookie", "session=abc"))
        .mount(&server)
        .await;

    let report = engine()
        .scan(&server.uri(), ScanType::Quick)
        .await
        .expect("scan");

    assert_eq!(report.cookies.len(), 1);
    assert_eq!(report.cookies[0].status, Status::Warning);
    assert_eq!(report.cookies[0].score, Some(15));
    assert_eq!(report.risk_score, 100 - 45 - 15);
}

#[tokio::test]
async fn test_hardened_site_scores_full() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Strict-Transport-Security", "max-age=31536000")
                .insert_header("Content-Security-Policy", "default-src 'self'")
                .insert_header("X-Frame-Options", "DENY")
                .insert_header("Set-Cookie", "id=1; Secure; HttpOnly; SameSite=Strict"),
        )
        .mount(&server)
        .await;

    let report = engine()
        .scan(&server.uri(), ScanType::Quick)
        .await
        .expect("scan");

    assert_eq!(report.risk_score, 100);
    assert!(report.headers.values().all(|r| r.status == Status::Pass));
}

#[tokio::test]
async fn test_tech_and_robots_do_not_affect_score() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Powered-By", "PHP/8.1.2")
                .set_body_string(r#"<link href="/wp-content/themes/x.css">"#),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\n"))
        .mount(&server)
        .await;

    let report = engine()
        .scan(&server.uri(), ScanType::Quick)
        .await
        .expect("scan");

    assert!(report.tech.iter().any(|t| t.message.starts_with("WordPress")));
    assert!(report.tech.iter().any(|t| t.message == "Powered by: PHP/8.1.2"));
    let robots = report.robots.as_ref().expect("robots");
    assert_eq!(robots.status, Status::Warning);
    assert_eq!(report.risk_score, 55);
}

#[tokio::test]
async fn test_missing_robots_is_null_and_scan_succeeds() {
    let server = bare_site("ok").await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let response = engine()
        .handle(ScanRequest {
            url: server.uri(),
            scan_type: Some(ScanType::Quick),
        })
        .await;

    assert!(response.success);
    let json = serde_json::to_value(&response).unwrap();
    assert!(json["report"]["robots"].is_null());
}

// ============================================================================
// Deep scan
// ============================================================================

#[tokio::test]
async fn test_deep_scan_over_plain_http() {
    let server = bare_site("<html><body>hello</body></html>").await;

    let report = engine()
        .scan(&server.uri(), ScanType::Deep)
        .await
        .expect("scan");

    let ssl = report.ssl.as_ref().expect("ssl");
    assert_eq!(ssl.status, Status::Warning);
    assert_eq!(ssl.score, Some(50));
    assert_eq!(report.content.as_deref(), Some(&[][..]));
    assert_eq!(report.supply_chain.as_deref(), Some(&[][..]));
    assert_eq!(report.risk_score, 5);
}

#[tokio::test]
async fn test_deep_scan_flags_vulnerable_jquery() {
    let server = bare_site(
        r#"<html><head><script src="https://code.jquery.com/jquery-1.12.4.min.js"></script></head></html>"#,
    )
    .await;

    let report = engine()
        .scan(&server.uri(), ScanType::Deep)
        .await
        .expect("scan");

    let supply_chain = report.supply_chain.as_ref().expect("supply chain");
    assert_eq!(supply_chain.len(), 1);
    assert_eq!(supply_chain[0].status, Status::Fail);
    assert_eq!(supply_chain[0].score, Some(20));
    assert!(supply_chain[0].message.contains("CVE-"));
    assert_eq!(report.risk_score, 0);
}

#[tokio::test]
async fn test_deep_scan_content_discovery() {
    let server = bare_site("ok").await;
    Mock::given(method("HEAD"))
        .and(path("/.env"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/admin"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/dashboard"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/admin"))
        .mount(&server)
        .await;

    let report = engine()
        .scan(&server.uri(), ScanType::Deep)
        .await
        .expect("scan");

    let content = report.content.as_ref().expect("content");
    assert_eq!(content.len(), 2, "unexpected findings: {:?}", content);
    assert_eq!(content[0].status, Status::Info);
    assert_eq!(content[0].details.as_deref(), Some("/admin (HTTP 401)"));
    assert_eq!(content[1].status, Status::Fail);
    assert_eq!(content[1].score, Some(15));
}

#[tokio::test]
async fn test_failed_discovery_leaves_rest_of_report_intact() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).insert_header("Set-Cookie", "session=abc; Secure"))
        .mount(&server)
        .await;
    // Every candidate outlives the per-path timeout
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let report = engine()
        .scan(&server.uri(), ScanType::Deep)
        .await
        .expect("scan");

    assert_eq!(report.content.as_deref(), Some(&[][..]));
    assert_eq!(report.headers.len(), 4);
    assert_eq!(report.cookies.len(), 1);
    assert_eq!(report.risk_score, 100 - 45 - 10 - 50);
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_unreachable_target_has_no_report() {
    let response = engine()
        .handle(ScanRequest {
            url: "http://127.0.0.1:1/".into(),
            scan_type: Some(ScanType::Deep),
        })
        .await;

    assert!(!response.success);
    assert!(response.report.is_none());
    assert!(!response.error.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_primary_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let mut config = test_config();
    config.scanner.request_timeout_ms = 200;
    let engine = ScanEngine::new(&config).unwrap();

    let err = engine
        .scan(&server.uri(), ScanType::Quick)
        .await
        .unwrap_err();
    assert!(matches!(err, SiteguardError::Timeout { timeout_ms: 200, .. }));
}

#[tokio::test]
async fn test_envelope_shape() {
    let server = bare_site("ok").await;

    let response = engine()
        .handle(ScanRequest {
            url: server.uri(),
            scan_type: None,
        })
        .await;
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["success"], true);
    assert!(json.get("error").is_none());
    let report = &json["report"];
    for key in ["general", "headers", "cookies", "tech", "robots", "riskScore"] {
        assert!(report.get(key).is_some(), "missing {}", key);
    }
    // Default scan type is quick
    assert!(report.get("ssl").is_none());
}

#[tokio::test]
async fn test_repeated_scans_are_deterministic() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Server", "nginx/1.25.3")
                .insert_header("Set-Cookie", "a=1; Secure")
                .set_body_string("<script src=\"/js/bootstrap-3.3.7.min.js\"></script>"),
        )
        .mount(&server)
        .await;

    let engine = engine();
    let first = engine.scan(&server.uri(), ScanType::Deep).await.unwrap();
    let second = engine.scan(&server.uri(), ScanType::Deep).await.unwrap();

    assert_eq!(first.headers, second.headers);
    assert_eq!(first.cookies, second.cookies);
    assert_eq!(first.supply_chain, second.supply_chain);
    assert_eq!(first.risk_score, second.risk_score);
}
