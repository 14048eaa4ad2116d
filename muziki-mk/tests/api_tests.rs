//! Integration tests for the muziki-mk API
//!
//! Covers the purchase flow (settlement outcomes, library set semantics,
//! counter updates), stream recording, analytics queries and the
//! authentication middleware, all against an in-memory database.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use muziki_common::auth::{mint_token, Role};
use muziki_common::config::ServiceConfig;
use muziki_common::db::init_schema;
use muziki_common::db::models::{Artist, Song, User};
use muziki_mk::db;
use muziki_mk::purchase::settlement::{SettlementGateway, SimulatedGateway};
use muziki_mk::{build_router, AppState};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt; // for `oneshot` method
use uuid::Uuid;

const TEST_SECRET: &str = "integration-test-secret";

// =============================================================================
// Test Helpers
// =============================================================================

async fn setup_db() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");
    init_schema(&pool).await.expect("Schema creation failed");
    pool
}

fn setup_app(pool: SqlitePool) -> Router {
    setup_app_with(
        pool,
        ServiceConfig::default(),
        Arc::new(SimulatedGateway::new(Duration::ZERO)),
    )
}

fn setup_app_with(
    pool: SqlitePool,
    config: ServiceConfig,
    gateway: Arc<dyn SettlementGateway>,
) -> Router {
    build_router(AppState::new(pool, config, TEST_SECRET.to_string(), gateway))
}

fn user_token(user_id: Uuid) -> String {
    mint_token(user_id, Role::User, 3600, TEST_SECRET)
}

fn artist_token(artist_id: Uuid) -> String {
    mint_token(artist_id, Role::Artist, 3600, TEST_SECRET)
}

async fn seed_user(pool: &SqlitePool) -> Uuid {
    let user = User::new("Test Listener", &format!("{}@example.com", Uuid::new_v4()));
    db::users::insert(pool, &user).await.expect("seed user");
    user.guid
}

async fn seed_artist(pool: &SqlitePool) -> Uuid {
    let artist = Artist::new("Test Artist", &format!("{}@example.com", Uuid::new_v4()));
    db::artists::insert(pool, &artist).await.expect("seed artist");
    artist.guid
}

async fn seed_song(pool: &SqlitePool, artist_id: Uuid) -> Uuid {
    let song = Song::new(artist_id, "Test Song", Some("afrobeat"), 5000);
    db::songs::insert(pool, &song).await.expect("seed song");
    song.guid
}

fn post_json(uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

fn mobile_money_body(song_id: Uuid, artist_id: Uuid, amount: Option<i64>) -> Value {
    let mut body = json!({
        "song_id": song_id.to_string(),
        "artist_id": artist_id.to_string(),
        "payment_method": "mobile_money",
        "payment_details": {
            "provider": "MTN",
            "phone_number": "256700000001",
        },
    });
    if let Some(amount) = amount {
        body["amount"] = json!(amount);
    }
    body
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_no_auth_required() {
    let pool = setup_db().await;
    let app = setup_app(pool);

    let response = app.oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "muziki-mk");
    assert!(body["version"].is_string());
}

// =============================================================================
// Purchase Flow
// =============================================================================

#[tokio::test]
async fn test_purchase_end_to_end_mobile_money() {
    let pool = setup_db().await;
    let buyer = seed_user(&pool).await;
    let artist = seed_artist(&pool).await;
    let song = seed_song(&pool, artist).await;
    let app = setup_app(pool.clone());

    let request = post_json(
        "/api/payments",
        Some(&user_token(buyer)),
        &mobile_money_body(song, artist, Some(5000)),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    let payment = &body["payment"];
    assert_eq!(payment["status"], "completed");
    assert_eq!(payment["amount"], 5000);
    assert_eq!(payment["currency"], "UGX");

    // Transaction id matches the TXN<digits> surface
    let transaction_id = payment["transaction_id"].as_str().unwrap();
    assert!(transaction_id.starts_with("TXN"));
    assert!(transaction_id[3..].chars().all(|c| c.is_ascii_digit()));

    // Buyer's library now contains the song
    let library = db::users::library_songs(&pool, buyer).await.unwrap();
    assert_eq!(library, vec![song]);

    // Artist and song counters incremented by exactly 1
    let artist_row = db::artists::find(&pool, artist).await.unwrap().unwrap();
    assert_eq!(artist_row.total_sales, 1);
    let song_row = db::songs::find(&pool, song).await.unwrap().unwrap();
    assert_eq!(song_row.purchases, 1);
}

#[tokio::test]
async fn test_repeat_purchase_keeps_single_library_entry() {
    let pool = setup_db().await;
    let buyer = seed_user(&pool).await;
    let artist = seed_artist(&pool).await;
    let song = seed_song(&pool, artist).await;
    let app = setup_app(pool.clone());

    for _ in 0..2 {
        let request = post_json(
            "/api/payments",
            Some(&user_token(buyer)),
            &mobile_money_body(song, artist, Some(5000)),
        );
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // Library keeps set semantics while history accumulates
    let library = db::users::library_songs(&pool, buyer).await.unwrap();
    assert_eq!(library.len(), 1);
    let history = db::users::purchase_history(&pool, buyer).await.unwrap();
    assert_eq!(history.len(), 2);

    let artist_row = db::artists::find(&pool, artist).await.unwrap().unwrap();
    assert_eq!(artist_row.total_sales, 2);
}

#[tokio::test]
async fn test_settlement_decline_isolates_side_effects() {
    let pool = setup_db().await;
    let buyer = seed_user(&pool).await;
    let artist = seed_artist(&pool).await;
    let song = seed_song(&pool, artist).await;
    let app = setup_app_with(
        pool.clone(),
        ServiceConfig::default(),
        Arc::new(SimulatedGateway::declining("insufficient funds")),
    );

    let request = post_json(
        "/api/payments",
        Some(&user_token(buyer)),
        &mobile_money_body(song, artist, Some(5000)),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);

    let body = read_json(response).await;
    assert_eq!(body["category"], "settlement_failure");

    // The failed attempt is auditable...
    let payments = db::payments::list_for_user(&pool, buyer).await.unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].status.as_str(), "failed");
    assert!(payments[0].transaction_id.is_none());

    // ...but nothing else moved
    let library = db::users::library_songs(&pool, buyer).await.unwrap();
    assert!(library.is_empty());
    let artist_row = db::artists::find(&pool, artist).await.unwrap().unwrap();
    assert_eq!(artist_row.total_sales, 0);
    let song_row = db::songs::find(&pool, song).await.unwrap().unwrap();
    assert_eq!(song_row.purchases, 0);
}

#[tokio::test]
async fn test_settlement_timeout_is_distinct_from_decline() {
    let pool = setup_db().await;
    let buyer = seed_user(&pool).await;
    let artist = seed_artist(&pool).await;
    let song = seed_song(&pool, artist).await;

    let mut config = ServiceConfig::default();
    config.settlement_timeout_ms = 50;
    let app = setup_app_with(
        pool.clone(),
        config,
        // Gateway slower than the deadline
        Arc::new(SimulatedGateway::new(Duration::from_millis(500))),
    );

    let request = post_json(
        "/api/payments",
        Some(&user_token(buyer)),
        &mobile_money_body(song, artist, Some(5000)),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);

    let body = read_json(response).await;
    assert_eq!(body["category"], "settlement_failure");
    assert!(body["error"].as_str().unwrap().contains("timed out"));

    // Timed-out attempt persisted as failed, side effects untouched
    let payments = db::payments::list_for_user(&pool, buyer).await.unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].status.as_str(), "failed");
    let artist_row = db::artists::find(&pool, artist).await.unwrap().unwrap();
    assert_eq!(artist_row.total_sales, 0);
}

#[tokio::test]
async fn test_purchase_missing_amount_has_no_side_effects() {
    let pool = setup_db().await;
    let buyer = seed_user(&pool).await;
    let artist = seed_artist(&pool).await;
    let song = seed_song(&pool, artist).await;
    let app = setup_app(pool.clone());

    let request = post_json(
        "/api/payments",
        Some(&user_token(buyer)),
        &mobile_money_body(song, artist, None),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = read_json(response).await;
    assert_eq!(body["category"], "validation");
    assert!(body["error"].as_str().unwrap().contains("amount"));

    // No payment row, no counter movement
    let payments = db::payments::list_for_user(&pool, buyer).await.unwrap();
    assert!(payments.is_empty());
    let artist_row = db::artists::find(&pool, artist).await.unwrap().unwrap();
    assert_eq!(artist_row.total_sales, 0);
}

#[tokio::test]
async fn test_purchase_unknown_method_rejected() {
    let pool = setup_db().await;
    let buyer = seed_user(&pool).await;
    let artist = seed_artist(&pool).await;
    let song = seed_song(&pool, artist).await;
    let app = setup_app(pool.clone());

    let mut body = mobile_money_body(song, artist, Some(5000));
    body["payment_method"] = json!("crypto");

    let request = post_json("/api/payments", Some(&user_token(buyer)), &body);
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = read_json(response).await;
    assert_eq!(body["category"], "validation");
}

#[tokio::test]
async fn test_purchase_unknown_song_is_404() {
    let pool = setup_db().await;
    let buyer = seed_user(&pool).await;
    let artist = seed_artist(&pool).await;
    let app = setup_app(pool.clone());

    let request = post_json(
        "/api/payments",
        Some(&user_token(buyer)),
        &mobile_money_body(Uuid::new_v4(), artist, Some(5000)),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let payments = db::payments::list_for_user(&pool, buyer).await.unwrap();
    assert!(payments.is_empty());
}

#[tokio::test]
async fn test_purchase_requires_credential() {
    let pool = setup_db().await;
    let artist = seed_artist(&pool).await;
    let song = seed_song(&pool, artist).await;
    let app = setup_app(pool);

    let request = post_json(
        "/api/payments",
        None,
        &mobile_money_body(song, artist, Some(5000)),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_garbage_credential_rejected() {
    let pool = setup_db().await;
    let app = setup_app(pool);

    let request = get("/api/payments", Some("not.a.real.token"));
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = read_json(response).await;
    assert_eq!(body["category"], "auth");
}

#[tokio::test]
async fn test_artist_token_cannot_purchase() {
    let pool = setup_db().await;
    let artist = seed_artist(&pool).await;
    let song = seed_song(&pool, artist).await;
    let app = setup_app(pool);

    let request = post_json(
        "/api/payments",
        Some(&artist_token(artist)),
        &mobile_money_body(song, artist, Some(5000)),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_payment_history_lists_attempts_newest_first() {
    let pool = setup_db().await;
    let buyer = seed_user(&pool).await;
    let artist = seed_artist(&pool).await;
    let song = seed_song(&pool, artist).await;
    let app = setup_app(pool.clone());

    let request = post_json(
        "/api/payments",
        Some(&user_token(buyer)),
        &mobile_money_body(song, artist, Some(5000)),
    );
    assert_eq!(
        app.clone().oneshot(request).await.unwrap().status(),
        StatusCode::OK
    );

    let response = app
        .oneshot(get("/api/payments", Some(&user_token(buyer))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    let payments = body["payments"].as_array().unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0]["status"], "completed");
    assert_eq!(payments[0]["payment_details"]["provider"], "MTN");
}

// =============================================================================
// Stream Recording and Analytics
// =============================================================================

fn stream_body(song_id: Uuid, artist_id: Uuid) -> Value {
    json!({
        "song_id": song_id.to_string(),
        "artist_id": artist_id.to_string(),
    })
}

#[tokio::test]
async fn test_streams_recorded_and_aggregated_for_day_period() {
    let pool = setup_db().await;
    let artist = seed_artist(&pool).await;
    let song = seed_song(&pool, artist).await;
    let app = setup_app(pool.clone());

    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(post_json("/api/streams", None, &stream_body(song, artist)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["status"], "recorded");
    }

    // Denormalized counters moved with the event log
    let song_row = db::songs::find(&pool, song).await.unwrap().unwrap();
    assert_eq!(song_row.streams, 3);
    let artist_row = db::artists::find(&pool, artist).await.unwrap().unwrap();
    assert_eq!(artist_row.total_streams, 3);

    let uri = format!("/api/streams?artist_id={artist}&period=day");
    let response = app.oneshot(get(&uri, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["total_streams"], 3);
    assert_eq!(body["previous_streams"], 0);
    assert_eq!(body["percent_change"], 0.0);
    assert_eq!(body["period"], "day");

    // Artist-wide query carries the top-song ranking
    let top_songs = body["top_songs"].as_array().unwrap();
    assert_eq!(top_songs.len(), 1);
    assert_eq!(top_songs[0]["title"], "Test Song");
    assert_eq!(top_songs[0]["streams"], 3);
}

#[tokio::test]
async fn test_stream_missing_artist_rejected_without_writes() {
    let pool = setup_db().await;
    let artist = seed_artist(&pool).await;
    let song = seed_song(&pool, artist).await;
    let app = setup_app(pool.clone());

    let body = json!({ "song_id": song.to_string() });
    let response = app
        .oneshot(post_json("/api/streams", None, &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stream_events")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
    let song_row = db::songs::find(&pool, song).await.unwrap().unwrap();
    assert_eq!(song_row.streams, 0);
}

#[tokio::test]
async fn test_stream_auth_switch_blocks_anonymous_plays() {
    let pool = setup_db().await;
    let user = seed_user(&pool).await;
    let artist = seed_artist(&pool).await;
    let song = seed_song(&pool, artist).await;

    let mut config = ServiceConfig::default();
    config.require_auth.streams = true;
    let app = setup_app_with(
        pool,
        config,
        Arc::new(SimulatedGateway::new(Duration::ZERO)),
    );

    let anonymous = app
        .clone()
        .oneshot(post_json("/api/streams", None, &stream_body(song, artist)))
        .await
        .unwrap();
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let authenticated = app
        .oneshot(post_json(
            "/api/streams",
            Some(&user_token(user)),
            &stream_body(song, artist),
        ))
        .await
        .unwrap();
    assert_eq!(authenticated.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_stream_analytics_requires_some_scope() {
    let pool = setup_db().await;
    let app = setup_app(pool);

    let response = app
        .oneshot(get("/api/streams?period=week", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = read_json(response).await;
    assert_eq!(body["category"], "validation");
}

// =============================================================================
// Artist Sales Analytics
// =============================================================================

#[tokio::test]
async fn test_artist_analytics_is_artist_only() {
    let pool = setup_db().await;
    let user = seed_user(&pool).await;
    let app = setup_app(pool);

    let response = app
        .oneshot(get("/api/artist/analytics", Some(&user_token(user))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_artist_analytics_end_to_end() {
    let pool = setup_db().await;
    let buyer = seed_user(&pool).await;
    let artist = seed_artist(&pool).await;
    let song = seed_song(&pool, artist).await;
    let app = setup_app(pool.clone());

    // One mobile money and one card purchase
    let request = post_json(
        "/api/payments",
        Some(&user_token(buyer)),
        &mobile_money_body(song, artist, Some(5000)),
    );
    assert_eq!(
        app.clone().oneshot(request).await.unwrap().status(),
        StatusCode::OK
    );

    let card = json!({
        "song_id": song.to_string(),
        "artist_id": artist.to_string(),
        "amount": 7000,
        "payment_method": "card",
        "payment_details": { "last4": "4242", "card_type": "visa" },
    });
    assert_eq!(
        app.clone()
            .oneshot(post_json("/api/payments", Some(&user_token(buyer)), &card))
            .await
            .unwrap()
            .status(),
        StatusCode::OK
    );

    let response = app
        .oneshot(get("/api/artist/analytics", Some(&artist_token(artist))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["total_sales"], 2);
    assert_eq!(body["total_earnings"], 12000);
    assert_eq!(body["total_songs"], 1);
    assert_eq!(body["followers"], 0);
    assert_eq!(body["payment_methods"]["mobile_money"], 1);
    assert_eq!(body["payment_methods"]["card"], 1);

    let by_song = body["sales_by_song"].as_array().unwrap();
    assert_eq!(by_song.len(), 1);
    assert_eq!(by_song[0]["count"], 2);
    assert_eq!(by_song[0]["amount"], 12000);

    // Dense 30-day chart series ending today with today's sales in it
    let by_date = body["sales_by_date"].as_array().unwrap();
    assert_eq!(by_date.len(), 30);
    assert_eq!(by_date[29]["count"], 2);
    assert_eq!(by_date[29]["amount"], 12000);
    assert_eq!(by_date[0]["count"], 0);

    let recent = body["recent_payments"].as_array().unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0]["status"], "completed");
}
