//! Integration tests for `EcbClient` and `RateConverter` using wiremock HTTP
//! mocks.

use std::str::FromStr;

use cmcsv_core::{convert, RateOrigin};
use cmcsv_sources::{EcbClient, RateConverter, RetryPolicy, SourceError};
use rust_decimal::Decimal;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SERIES_PATH: &str = "/service/data/EXR/D.USD.EUR.SP00.A";

fn test_client(base_url: &str) -> EcbClient {
    EcbClient::with_base_url(base_url, 30, "cmcsv-test", RetryPolicy::none())
        .expect("client construction should not fail")
}

fn dec(raw: &str) -> Decimal {
    Decimal::from_str(raw).unwrap()
}

fn rates_body() -> serde_json::Value {
    serde_json::json!({
        "header": { "id": "x" },
        "dataSets": [{
            "action": "Replace",
            "series": {
                "0:0:0:0:0": {
                    "attributes": [0, 0, 0],
                    "observations": {
                        "0": [1.0812, 0, 0, null, null],
                        "1": [1.0849, 0, 0, null, null]
                    }
                }
            }
        }]
    })
}

async fn mount_rates(server: &MockServer, template: ResponseTemplate, hits: u64) {
    Mock::given(method("GET"))
        .and(path(SERIES_PATH))
        .and(query_param("format", "jsondata"))
        .respond_with(template)
        .expect(hits)
        .mount(server)
        .await;
}

#[tokio::test]
async fn fetch_returns_latest_observation() {
    let server = MockServer::start().await;
    mount_rates(&server, ResponseTemplate::new(200).set_body_json(rates_body()), 1).await;

    let rate = test_client(&server.uri()).fetch_eur_usd().await.unwrap();
    assert_eq!(rate, dec("1.0849"));
}

#[tokio::test]
async fn empty_window_is_no_observation() {
    let server = MockServer::start().await;
    mount_rates(
        &server,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({ "dataSets": [] })),
        1,
    )
    .await;

    let err = test_client(&server.uri()).fetch_eur_usd().await.unwrap_err();
    assert!(matches!(err, SourceError::NoObservation(_)));
}

#[tokio::test]
async fn converter_fetches_once_per_run() {
    let server = MockServer::start().await;
    mount_rates(&server, ResponseTemplate::new(200).set_body_json(rates_body()), 1).await;

    let converter = RateConverter::new(test_client(&server.uri()), Some(dec("1.16")));
    let first = converter.rate().await.unwrap().clone();
    let second = converter.rate().await.unwrap();
    assert_eq!(&first, second);
    assert_eq!(convert(dec("1.00"), second), dec("1.08"));
    assert_eq!(convert(dec("10.00"), second), dec("10.85"));

    let rate = converter.resolved().unwrap();
    assert_eq!(rate.origin, RateOrigin::Live);
    assert!(!converter.used_fallback());
}

#[tokio::test]
async fn outage_uses_configured_fallback() {
    let server = MockServer::start().await;
    mount_rates(&server, ResponseTemplate::new(503), 1).await;

    let converter = RateConverter::new(test_client(&server.uri()), Some(dec("1.16")));
    let rate = converter.rate().await.unwrap();

    assert_eq!(rate.rate, dec("1.16"));
    assert!(converter.used_fallback());
}

#[tokio::test]
async fn outage_without_fallback_is_rate_unavailable() {
    let server = MockServer::start().await;
    mount_rates(&server, ResponseTemplate::new(503), 1).await;

    let converter = RateConverter::new(test_client(&server.uri()), None);
    let err = converter.rate().await.unwrap_err();

    assert!(matches!(
        err.source,
        SourceError::UnexpectedStatus { status: 503, .. }
    ));
    assert!(converter.resolved().is_none());
}

#[tokio::test]
async fn converter_without_priced_items_never_fetches() {
    let server = MockServer::start().await;
    mount_rates(&server, ResponseTemplate::new(200).set_body_json(rates_body()), 0).await;

    let converter = RateConverter::new(test_client(&server.uri()), None);
    assert!(converter.resolved().is_none());
}
