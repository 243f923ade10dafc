// @critical: Rate limiting probe - 429 detection, early stop, strict mode

use super::test_utils::{compliant_target, config_for, requests_to, run_scenario, PUBLIC_TRANSLATE};
use serde_json::json;
use std::time::{Duration, Instant};
use translation_conformance::scenarios::rate_limit::probe;
use translation_conformance::scenarios::RateLimitProbe;
use translation_conformance::{HarnessError, Session};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Serves `allowed` translations, then throttles everything.
async fn throttling_target(allowed: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PUBLIC_TRANSLATE))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "translatedText": "Prueba",
            "fromLanguage": "en-US",
            "toLanguage": "es-ES",
            "originalText": "Test"
        })))
        .up_to_n_times(allowed)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(PUBLIC_TRANSLATE))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(json!({"error": "Too many requests"})),
        )
        .with_priority(2)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_probe_stops_at_first_429() {
    let server = throttling_target(3).await;
    let config = config_for(&server);
    let session = Session::public(&config).unwrap();

    let tally = probe(&session, &config.rate_limit).await.unwrap();

    assert_eq!(tally.successes, 3);
    assert!(tally.rate_limited);
    assert_eq!(tally.attempts, 4);
    assert_eq!(requests_to(&server, PUBLIC_TRANSLATE).await.len(), 4);
}

#[tokio::test]
async fn test_probe_sends_minimal_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PUBLIC_TRANSLATE))
        .and(body_json(json!({"text": "Test", "fromLanguage": "en-US", "toLanguage": "es-ES"})))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = run_scenario(&RateLimitProbe, &config_for(&server)).await.unwrap();
    assert_eq!(
        outcome.note.as_deref(),
        Some("rate limited after 0 successful requests (1 attempts)")
    );
}

#[tokio::test]
async fn test_probe_passes_when_limiter_is_disabled() {
    let server = compliant_target().await;
    let config = config_for(&server);

    let outcome = run_scenario(&RateLimitProbe, &config).await.unwrap();

    assert_eq!(
        outcome.note.as_deref(),
        Some("5 of 5 requests succeeded, no 429 seen")
    );
    assert_eq!(
        requests_to(&server, PUBLIC_TRANSLATE).await.len(),
        config.rate_limit.max_attempts as usize
    );
}

#[tokio::test]
async fn test_probe_fails_when_every_request_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PUBLIC_TRANSLATE))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = run_scenario(&RateLimitProbe, &config_for(&server))
        .await
        .unwrap_err();

    match err {
        HarnessError::RateLimitProbeInconclusive {
            attempts,
            last_status,
        } => {
            assert_eq!(attempts, 5);
            assert_eq!(last_status, "500");
        }
        other => panic!("expected inconclusive probe, got {other:?}"),
    }
}

#[tokio::test]
async fn test_strict_mode_requires_enforcement() {
    let server = compliant_target().await;
    let mut config = config_for(&server);
    config.rate_limit.require_enforcement = true;

    let err = run_scenario(&RateLimitProbe, &config).await.unwrap_err();

    assert!(matches!(
        err,
        HarnessError::RateLimitNotObserved {
            attempts: 5,
            successes: 5
        }
    ));
}

#[tokio::test]
async fn test_strict_mode_passes_when_throttled() {
    let server = throttling_target(2).await;
    let mut config = config_for(&server);
    config.rate_limit.require_enforcement = true;

    assert!(run_scenario(&RateLimitProbe, &config).await.is_ok());
}

#[tokio::test]
async fn test_probe_waits_between_attempts() {
    let server = compliant_target().await;
    let mut config = config_for(&server);
    config.rate_limit.max_attempts = 3;
    config.rate_limit.delay_ms = 50;
    let session = Session::public(&config).unwrap();

    let start = Instant::now();
    let tally = probe(&session, &config.rate_limit).await.unwrap();

    assert_eq!(tally.attempts, 3);
    // two gaps between three attempts, none after the last
    assert!(start.elapsed() >= Duration::from_millis(100));
}
