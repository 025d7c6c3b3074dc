//! Integration tests for the Polygon RSI fan-out

use crate::test_utils::{mock_rsi, mock_rsi_response, TestApp, API_KEY, BAR_TIMESTAMP, RSI_PATH};
use rsiwatch::error::IndicatorError;
use rsiwatch::services::{fetch_latest_readings, IndicatorProvider, PolygonRsiClient};
use std::time::{Duration, Instant};
use wiremock::ResponseTemplate;

fn tickers(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| t.to_string()).collect()
}

#[tokio::test]
async fn latest_rsi_parses_first_value() {
    let app = TestApp::new().await;
    mock_rsi(&app.polygon, "AAPL", 72.5).await;

    let reading = app.rsi_client().latest_rsi("AAPL").await.expect("reading");

    assert_eq!(reading.ticker, "AAPL");
    assert_eq!(reading.value, 72.5);
    assert_eq!(reading.timestamp, BAR_TIMESTAMP);
}

#[tokio::test]
async fn fan_out_returns_one_entry_per_ticker() {
    let app = TestApp::new().await;
    mock_rsi(&app.polygon, "AAPL", 75.0).await;
    mock_rsi(&app.polygon, "MSFT", 20.0).await;
    mock_rsi_response(&app.polygon, "FAIL", ResponseTemplate::new(500)).await;
    mock_rsi_response(
        &app.polygon,
        "JUNK",
        ResponseTemplate::new(200).set_body_string("not json"),
    )
    .await;
    mock_rsi_response(
        &app.polygon,
        "NODATA",
        ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "OK", "results": {"values": []}})),
    )
    .await;

    let client = app.rsi_client();
    let list = tickers(&["AAPL", "FAIL", "MSFT", "JUNK", "NODATA", "MISSING"]);
    let results = fetch_latest_readings(&client, &list).await;

    assert_eq!(results.len(), list.len());
    assert_eq!(results[0].as_ref().map(|r| r.value).ok(), Some(75.0));
    assert!(matches!(results[1], Err(IndicatorError::Status { status: 500, .. })));
    assert_eq!(results[2].as_ref().map(|r| r.value).ok(), Some(20.0));
    assert!(matches!(results[3], Err(IndicatorError::Malformed { .. })));
    assert!(matches!(results[4], Err(IndicatorError::NoData { .. })));
    // Unmatched paths get wiremock's default 404.
    assert!(matches!(results[5], Err(IndicatorError::Status { status: 404, .. })));

    assert_eq!(app.rsi_requests().await.len(), list.len());
}

#[tokio::test]
async fn requests_carry_fixed_rsi_query() {
    let app = TestApp::new().await;
    mock_rsi(&app.polygon, "NVDA", 50.0).await;

    app.rsi_client().latest_rsi("NVDA").await.expect("reading");

    let requests = app.rsi_requests().await;
    assert_eq!(requests.len(), 1);
    let url = &requests[0].url;
    assert_eq!(url.path(), format!("{}/NVDA", RSI_PATH));
    let query = url.query().unwrap_or_default();
    for expected in [
        "timespan=day",
        "adjusted=true",
        "window=14",
        "series_type=close",
        "order=desc",
        "limit=1",
    ] {
        assert!(query.contains(expected), "missing {} in {}", expected, query);
    }
    assert!(query.contains(&format!("apiKey={}", API_KEY)));
}

#[tokio::test]
async fn slow_ticker_times_out_without_blocking_others() {
    let app = TestApp::new().await;
    mock_rsi(&app.polygon, "FAST", 10.0).await;
    mock_rsi_response(
        &app.polygon,
        "SLOW",
        ResponseTemplate::new(200)
            .set_body_json(crate::test_utils::rsi_body(90.0))
            .set_delay(Duration::from_secs(5)),
    )
    .await;

    let client = PolygonRsiClient::new(
        format!("{}{}", app.polygon.uri(), RSI_PATH),
        API_KEY,
        Duration::from_millis(300),
    )
    .expect("client");

    let results = fetch_latest_readings(&client, &tickers(&["SLOW", "FAST"])).await;

    assert!(matches!(results[0], Err(IndicatorError::Transport { .. })));
    assert_eq!(results[1].as_ref().map(|r| r.value).ok(), Some(10.0));
}

#[tokio::test]
async fn fan_out_requests_run_concurrently() {
    let app = TestApp::new().await;
    let delay = Duration::from_millis(500);
    let list: Vec<String> = (0..8).map(|i| format!("SLOW{}", i)).collect();
    for ticker in &list {
        mock_rsi_response(
            &app.polygon,
            ticker,
            ResponseTemplate::new(200)
                .set_body_json(crate::test_utils::rsi_body(50.0))
                .set_delay(delay),
        )
        .await;
    }

    let client = app.rsi_client();
    let started = Instant::now();
    let results = fetch_latest_readings(&client, &list).await;
    let elapsed = started.elapsed();

    assert!(results.iter().all(|r| r.is_ok()));
    // Sequential requests would take 8 x 500ms.
    assert!(elapsed < delay * 3, "fan-out took {:?}", elapsed);
}
