mod common;

use base64::Engine;
use common::{FIRE, ScriptedTransport, catalog, session, stash, tab};
use compass_trader::api::{HttpResponse, InventoryClient, PriceFeedClient, TabStatus};
use compass_trader::config::PacingConfig;
use compass_trader::pricing::{ListingRequest, format_listing};
use compass_trader::store::{MemoryPreferenceStore, OverrideChange};
use compass_trader::TradeService;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const FEED_KEY: &str = "prices.json";

fn feed_response() -> HttpResponse {
    let feed = r#"{"timestamp": 1700000000, "data": [
        {"name": "Fire", "chaos": 10, "divine": 0.1, "lowConfidence": false, "ratio": 1},
        {"name": "Alva", "chaos": 4, "divine": 0.04, "lowConfidence": true, "ratio": 1}
    ]}"#;
    let content = base64::engine::general_purpose::STANDARD.encode(feed);
    HttpResponse::new(200).with_body(serde_json::json!({ "content": content }).to_string())
}

fn service(transport: ScriptedTransport) -> (TradeService, Arc<ScriptedTransport>) {
    let transport = Arc::new(transport.respond(FEED_KEY, feed_response()));
    let inventory = InventoryClient::new(
        transport.clone(),
        "https://api.example.com/",
        PacingConfig::default(),
    )
    .unwrap()
    .with_catalog(catalog());
    let feed = PriceFeedClient::new(
        transport.clone(),
        &format!("https://feed.example.com/repos/x/contents/{FEED_KEY}"),
        Duration::from_secs(7200),
    )
    .unwrap();
    let prefs = Arc::new(MemoryPreferenceStore::new());
    (TradeService::new(inventory, feed, prefs), transport)
}

#[tokio::test]
async fn three_fire_compasses_price_to_thirty_chaos() {
    let (service, _) = service(ScriptedTransport::new().respond("a1", stash(&[FIRE, FIRE, FIRE])));

    let run = service
        .price_tabs(&session(), "Standard", &[tab("a1")], &CancellationToken::new())
        .await
        .unwrap();

    let fire = run.rows.get("Fire").unwrap();
    assert_eq!(fire.quantity(), 3);
    assert_eq!(fire.unit_price(), dec!(10));
    assert_eq!(fire.total_value(), dec!(30));
    assert!(run.feed_error.is_none());
    assert!(run.prices_as_of.is_some());
}

#[tokio::test]
async fn override_takes_effect_on_the_next_run() {
    let (service, _) = service(
        ScriptedTransport::new()
            .respond("a1", stash(&[FIRE, FIRE, FIRE]))
            .respond("a1", stash(&[FIRE, FIRE, FIRE])),
    );
    let session = session();

    let change = service
        .set_override(&session, "Standard", "Fire", Some(dec!(5)))
        .await
        .unwrap();
    assert_eq!(change, OverrideChange::Created);
    let again = service
        .set_override(&session, "Standard", "Fire", Some(dec!(5)))
        .await
        .unwrap();
    assert_eq!(again, OverrideChange::Unchanged);

    let run = service
        .price_tabs(&session, "Standard", &[tab("a1")], &CancellationToken::new())
        .await
        .unwrap();
    let fire = run.rows.get("Fire").unwrap();
    assert_eq!(fire.custom_price(), Some(dec!(5)));
    assert_eq!(fire.total_value(), dec!(15));

    // Overrides are per league.
    let other = service
        .price_tabs(&session, "Hardcore", &[tab("a1")], &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(other.rows.get("Fire").unwrap().total_value(), dec!(30));
}

#[tokio::test]
async fn one_failing_tab_does_not_lose_the_others() {
    let (service, _) = service(
        ScriptedTransport::new()
            .respond("a1", HttpResponse::new(500).with_body("boom"))
            .respond("b2", stash(&[FIRE])),
    );

    let run = service
        .price_tabs(&session(), "Standard", &[tab("a1"), tab("b2")], &CancellationToken::new())
        .await
        .unwrap();

    assert!(matches!(
        run.report.outcomes[0].status,
        TabStatus::Failed { status: Some(500), .. }
    ));
    assert_eq!(run.report.outcomes[1].status, TabStatus::Fetched { items: 1 });
    assert_eq!(run.rows.total_value(), dec!(10));
}

#[tokio::test]
async fn feed_is_fetched_once_within_its_ttl() {
    let (service, transport) = service(
        ScriptedTransport::new()
            .respond("a1", stash(&[FIRE]))
            .respond("a1", stash(&[FIRE])),
    );
    for _ in 0..2 {
        service
            .price_tabs(&session(), "Standard", &[tab("a1")], &CancellationToken::new())
            .await
            .unwrap();
    }

    let feed_requests = transport.requested().iter().filter(|k| *k == FEED_KEY).count();
    assert_eq!(feed_requests, 1);
}

#[tokio::test]
async fn priced_rows_render_a_listing() {
    let (service, _) = service(ScriptedTransport::new().respond("a1", stash(&[FIRE, FIRE, FIRE])));
    let run = service
        .price_tabs(&session(), "Standard", &[tab("a1")], &CancellationToken::new())
        .await
        .unwrap();

    let text = format_listing(
        run.rows.iter(),
        ListingRequest {
            title: "WTS Softcore Compasses",
            display_name: Some("Seller"),
            divine_price: Some(dec!(20)),
        },
    )
    .unwrap();

    assert_eq!(
        text,
        "WTS Softcore Compasses | IGN: Seller | :divine: = 20 :chaos:\n\
         3x Fire 10c / each (1div + 10c all)\n"
    );
}

#[tokio::test]
async fn bad_input_is_rejected_before_any_request() {
    use compass_trader::api::Session;
    use tokio_test::assert_err;

    assert_err!(Session::new("user-1", "   "));

    let (service, transport) = service(ScriptedTransport::new());
    assert_err!(
        service
            .price_tabs(&session(), "Standard", &[tab("../etc")], &CancellationToken::new())
            .await
    );
    assert!(transport.requested().is_empty());
}
