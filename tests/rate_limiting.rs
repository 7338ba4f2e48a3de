mod common;

use common::{ALVA, FIRE, ScriptedTransport, catalog, session, stash, tab, with_usage};
use compass_trader::api::{HttpResponse, InventoryClient, TabStatus};
use compass_trader::config::{PacingConfig, RateLimitPolicy};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn client(transport: &Arc<ScriptedTransport>, policy: RateLimitPolicy) -> InventoryClient {
    let pacing = PacingConfig {
        rate_limit_policy: policy,
        ..PacingConfig::default()
    };
    InventoryClient::new(transport.clone(), "https://api.example.com/", pacing)
        .unwrap()
        .with_catalog(catalog())
}

#[tokio::test(start_paused = true)]
async fn rate_limited_tab_waits_retry_after_then_is_abandoned() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond("a1", HttpResponse::new(429).with_header("Retry-After", "2"))
            .respond("b2", stash(&[FIRE])),
    );
    let started = tokio::time::Instant::now();

    let report = client(&transport, RateLimitPolicy::Abandon)
        .fetch_items(&session(), "Standard", &[tab("a1"), tab("b2")], &CancellationToken::new())
        .await
        .unwrap();

    assert!(started.elapsed() >= Duration::from_secs(2));
    assert_eq!(transport.requested(), vec!["a1", "b2"]);
    assert_eq!(
        report.outcomes[0].status,
        TabStatus::RateLimited { retry_after_secs: 2 }
    );
    assert_eq!(report.items.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn retry_once_policy_requests_the_tab_again() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond("a1", HttpResponse::new(429).with_header("Retry-After", "5"))
            .respond("a1", stash(&[ALVA, ALVA])),
    );

    let report = client(&transport, RateLimitPolicy::RetryOnce)
        .fetch_items(&session(), "Standard", &[tab("a1")], &CancellationToken::new())
        .await
        .unwrap();

    let times = transport.times();
    assert_eq!(transport.requested(), vec!["a1", "a1"]);
    assert!(times[1] - times[0] >= Duration::from_secs(5));
    assert_eq!(report.outcomes[0].status, TabStatus::Fetched { items: 2 });
}

#[tokio::test(start_paused = true)]
async fn missing_retry_after_uses_the_default_wait() {
    let transport = Arc::new(ScriptedTransport::new().respond("a1", HttpResponse::new(429)));
    let started = tokio::time::Instant::now();

    let report = client(&transport, RateLimitPolicy::Abandon)
        .fetch_items(&session(), "Standard", &[tab("a1")], &CancellationToken::new())
        .await
        .unwrap();

    assert!(started.elapsed() >= Duration::from_secs(60));
    assert_eq!(
        report.outcomes[0].status,
        TabStatus::RateLimited { retry_after_secs: 60 }
    );
}

#[tokio::test(start_paused = true)]
async fn near_limit_pauses_for_the_window_before_the_next_tab() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond("a1", with_usage(stash(&[FIRE]), 30, 27, 60))
            .respond("b2", with_usage(stash(&[FIRE]), 30, 28, 60)),
    );

    let started = tokio::time::Instant::now();
    client(&transport, RateLimitPolicy::Abandon)
        .fetch_items(&session(), "Standard", &[tab("a1"), tab("b2")], &CancellationToken::new())
        .await
        .unwrap();

    let times = transport.times();
    assert!(times[1] - times[0] >= Duration::from_secs(60));
    // Nothing left to request after the last tab, so no trailing pause.
    assert!(started.elapsed() < Duration::from_secs(120));
}

#[tokio::test(start_paused = true)]
async fn headroom_above_the_margin_does_not_pause() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond("a1", with_usage(stash(&[FIRE]), 30, 26, 60))
            .respond("b2", stash(&[FIRE])),
    );

    client(&transport, RateLimitPolicy::Abandon)
        .fetch_items(&session(), "Standard", &[tab("a1"), tab("b2")], &CancellationToken::new())
        .await
        .unwrap();

    let times = transport.times();
    assert!(times[1] - times[0] < Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn cancelling_during_a_pause_keeps_what_was_fetched() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond("a1", with_usage(stash(&[FIRE]), 30, 30, 600))
            .respond("b2", stash(&[ALVA])),
    );
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(10)).await;
        trigger.cancel();
    });

    let report = client(&transport, RateLimitPolicy::Abandon)
        .fetch_items(&session(), "Standard", &[tab("a1"), tab("b2")], &cancel)
        .await
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(transport.requested(), vec!["a1"]);
    assert_eq!(report.items.len(), 1);
}
