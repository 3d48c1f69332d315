//! End-to-end HTTP tests for bidding, settlement, rosters and the draft.
//!
//! Each test drives the real router against a fresh database and the
//! in-memory film catalogue from `common`.

mod common;

use axum::http::StatusCode;
use bmb_api::engine::draft::auto_pick;
use bmb_db::locks::SettlementLock;
use bmb_db::repositories::LeagueSessionRepo;
use common::{body_json, build_test_app, delete, get, post, post_json, put_json};
use serde_json::{json, Value};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn bid_war_settings(slots: i32) -> Value {
    let team: Vec<Value> = (1..=slots)
        .map(|position| json!({"slotType": "TotalBoxOffice", "position": position}))
        .collect();
    json!({
        "teamStructure": team,
        "draft": {"conduct": false, "numRounds": 0, "timePerRound": 0},
        "startingBudget": 100
    })
}

fn draft_settings(order: &[i64], time_per_round: u32) -> Value {
    json!({
        "teamStructure": [
            {"slotType": "TotalBoxOffice", "position": 1},
            {"slotType": "Rating", "position": 2}
        ],
        "draft": {
            "conduct": true,
            "order": order,
            "numRounds": 2,
            "timePerRound": time_per_round,
            "type": "snake"
        }
    })
}

async fn create_session(pool: &PgPool, settings: Value) -> i64 {
    let league = body_json(
        post_json(
            build_test_app(pool.clone()),
            "/api/v1/leagues",
            json!({"name": "Box Office Bros", "ownerId": 1}),
        )
        .await,
    )
    .await;
    let league_id = league["data"]["id"].as_i64().unwrap();

    let response = post_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/leagues/{league_id}/sessions"),
        json!({
            "name": "Summer 2024",
            "startDate": "2024-01-01",
            "endDate": "2024-12-31",
            "settings": settings
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn create_studio(pool: &PgPool, session_id: i64, owner_id: i64, name: &str) -> i64 {
    let response = post_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/sessions/{session_id}/studios"),
        json!({"ownerId": owner_id, "name": name}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn place_bid(pool: &PgPool, studio_id: i64, film_id: i64, slot: i32, amount: i32) -> (StatusCode, Value) {
    let response = post_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/studios/{studio_id}/bids"),
        json!({"filmId": film_id, "slot": slot, "amount": amount}),
    )
    .await;
    let status = response.status();
    (status, body_json(response).await)
}

async fn studio(pool: &PgPool, studio_id: i64) -> Value {
    body_json(get(build_test_app(pool.clone()), &format!("/api/v1/studios/{studio_id}")).await)
        .await["data"]
        .clone()
}

async fn pick(pool: &PgPool, session_id: i64, studio_id: i64, film_id: i64, slot: i32) -> (StatusCode, Value) {
    let response = post_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/sessions/{session_id}/draft/picks"),
        json!({"studioId": studio_id, "filmId": film_id, "slot": slot}),
    )
    .await;
    let status = response.status();
    (status, body_json(response).await)
}

// ---------------------------------------------------------------------------
// Bidding and settlement
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn equal_bids_go_to_the_earlier_studio(pool: PgPool) {
    let session_id = create_session(&pool, bid_war_settings(1)).await;
    let s1 = create_studio(&pool, session_id, 10, "S1").await;
    let s2 = create_studio(&pool, session_id, 20, "S2").await;

    let (status, first) = place_bid(&pool, s1, 101, 1, 40).await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, second) = place_bid(&pool, s2, 101, 1, 40).await;

    let response = post(build_test_app(pool.clone()), &format!("/api/v1/sessions/{session_id}/settle")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let report = body_json(response).await;
    assert_eq!(report["data"]["won"], 1);
    assert_eq!(report["data"]["lost"], 1);

    let s1_bids = body_json(get(build_test_app(pool.clone()), &format!("/api/v1/studios/{s1}/bids")).await).await;
    let s2_bids = body_json(get(build_test_app(pool.clone()), &format!("/api/v1/studios/{s2}/bids")).await).await;
    assert_eq!(s1_bids["data"][0]["id"], first["data"]["id"]);
    assert_eq!(s1_bids["data"][0]["status_id"], 2);
    assert_eq!(s2_bids["data"][0]["id"], second["data"]["id"]);
    assert_eq!(s2_bids["data"][0]["status_id"], 3);

    let winner = studio(&pool, s1).await;
    assert_eq!(winner["budget"], 60);
    assert_eq!(winner["films"].as_array().unwrap().len(), 1);
    assert_eq!(winner["films"][0]["film_id"], 101);
    assert_eq!(winner["films"][0]["slot"], 1);
    assert_eq!(studio(&pool, s2).await["budget"], 100);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn bid_placement_rejections_use_distinct_codes(pool: PgPool) {
    let session_id = create_session(&pool, bid_war_settings(1)).await;
    let s1 = create_studio(&pool, session_id, 10, "S1").await;

    let (status, body) = place_bid(&pool, s1, 101, 1, 150).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "INSUFFICIENT_FUNDS");

    let (status, body) = place_bid(&pool, s1, 105, 1, 10).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = place_bid(&pool, s1, 101, 4, 10).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = place_bid(&pool, s1, 999, 1, 10).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn only_pending_bids_of_the_owner_can_be_cancelled(pool: PgPool) {
    let session_id = create_session(&pool, bid_war_settings(1)).await;
    let s1 = create_studio(&pool, session_id, 10, "S1").await;
    let s2 = create_studio(&pool, session_id, 20, "S2").await;
    let (_, bid) = place_bid(&pool, s1, 101, 1, 10).await;
    let bid_id = bid["data"]["id"].as_i64().unwrap();

    let response = delete(build_test_app(pool.clone()), &format!("/api/v1/bids/{bid_id}?studioId={s2}")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete(build_test_app(pool.clone()), &format!("/api/v1/bids/{bid_id}?studioId={s1}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete(build_test_app(pool.clone()), &format!("/api/v1/bids/{bid_id}?studioId={s1}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn concurrent_settlement_is_rejected(pool: PgPool) {
    let session_id = create_session(&pool, bid_war_settings(1)).await;

    let lock = SettlementLock::try_acquire(&pool, session_id).await.unwrap().unwrap();
    let response = post(build_test_app(pool.clone()), &format!("/api/v1/sessions/{session_id}/settle")).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    lock.release().await.unwrap();

    let response = post(build_test_app(pool.clone()), &format!("/api/v1/sessions/{session_id}/settle")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Rosters and scoring
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn won_film_can_be_moved_then_dropped_for_a_refund(pool: PgPool) {
    let session_id = create_session(&pool, bid_war_settings(2)).await;
    let s1 = create_studio(&pool, session_id, 10, "S1").await;
    place_bid(&pool, s1, 101, 1, 50).await;
    post(build_test_app(pool.clone()), &format!("/api/v1/sessions/{session_id}/settle")).await;

    let response = post_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/studios/{s1}/swap"),
        json!({"fromSlot": 1, "toSlot": 2}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"][0]["slot"], 2);

    let response = delete(build_test_app(pool.clone()), &format!("/api/v1/studios/{s1}/slots/2")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let outcome = body_json(response).await;
    assert_eq!(outcome["data"]["refund"], 40);
    assert_eq!(outcome["data"]["studio"]["budget"], 90);

    let response = delete(build_test_app(pool.clone()), &format!("/api/v1/studios/{s1}/slots/2")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let activity = body_json(
        get(build_test_app(pool.clone()), &format!("/api/v1/sessions/{session_id}/activity")).await,
    )
    .await;
    assert!(activity["data"][0]["message"]
        .as_str()
        .unwrap()
        .contains("refunded $40"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn standings_rank_studios(pool: PgPool) {
    let session_id = create_session(&pool, bid_war_settings(1)).await;
    let s1 = create_studio(&pool, session_id, 10, "S1").await;
    let s2 = create_studio(&pool, session_id, 20, "S2").await;
    place_bid(&pool, s2, 101, 1, 10).await;
    post(build_test_app(pool.clone()), &format!("/api/v1/sessions/{session_id}/settle")).await;

    let response = post(
        build_test_app(pool.clone()),
        &format!("/api/v1/sessions/{session_id}/scores/refresh"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let standings = body_json(response).await;
    // The catalogue carries no revenue, so both studios score 0 and tie.
    assert_eq!(standings["data"][0]["rank"], 1);
    assert_eq!(standings["data"][1]["rank"], 1);
    assert_eq!(standings["data"][0]["studio_id"], s1);
    assert_eq!(standings["data"][1]["slots"][0]["title"], "Dune: Part Two");
}

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn snake_draft_runs_to_completion(pool: PgPool) {
    let session_id = create_session(&pool, draft_settings(&[10, 20], 90)).await;
    let a = create_studio(&pool, session_id, 10, "A").await;
    let b = create_studio(&pool, session_id, 20, "B").await;

    let response = post(build_test_app(pool.clone()), &format!("/api/v1/sessions/{session_id}/draft/start")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let view = body_json(response).await;
    assert_eq!(view["data"]["phase"], "InProgress");
    assert_eq!(view["data"]["currentPick"]["studioId"], a);
    assert_eq!(view["data"]["currentPick"]["num"], 1);

    let (status, body) = pick(&pool, session_id, b, 101, 1).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "NOT_YOUR_TURN");

    let (status, _) = pick(&pool, session_id, a, 101, 1).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = pick(&pool, session_id, b, 101, 1).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    // Snake order for [A, B]: A, B, B, A.
    assert_eq!(pick(&pool, session_id, b, 102, 1).await.0, StatusCode::OK);
    let (status, view) = pick(&pool, session_id, b, 103, 2).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["data"]["currentPick"]["studioId"], a);

    let (status, view) = pick(&pool, session_id, a, 104, 2).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["data"]["phase"], "Complete");
    assert_eq!(view["data"]["picksMade"], 4);
    assert!(view["data"]["currentPick"].is_null());
    assert_eq!(view["data"]["picks"].as_array().unwrap().len(), 4);

    let response = post(build_test_app(pool.clone()), &format!("/api/v1/sessions/{session_id}/draft/start")).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = put_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/sessions/{session_id}/settings"),
        draft_settings(&[20, 10], 90),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn draft_cannot_start_with_owner_missing_a_studio(pool: PgPool) {
    let session_id = create_session(&pool, draft_settings(&[10, 20], 90)).await;
    create_studio(&pool, session_id, 10, "A").await;

    let response = post(build_test_app(pool.clone()), &format!("/api/v1/sessions/{session_id}/draft/start")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn expired_clock_auto_picks_most_popular_eligible_film(pool: PgPool) {
    let session_id = create_session(&pool, draft_settings(&[10, 20], 1)).await;
    let a = create_studio(&pool, session_id, 10, "A").await;
    create_studio(&pool, session_id, 20, "B").await;
    post(build_test_app(pool.clone()), &format!("/api/v1/sessions/{session_id}/draft/start")).await;

    let state = common::test_state(pool.clone());
    let session = LeagueSessionRepo::find_by_id(&pool, session_id).await.unwrap().unwrap();

    // Not expired yet at the moment the clock started.
    let not_yet = session.draft_pick_started_at.unwrap();
    assert!(auto_pick(&state, &session, not_yet).await.unwrap().is_none());

    let later = not_yet + chrono::Duration::seconds(5);
    let view = auto_pick(&state, &session, later).await.unwrap().unwrap();
    assert_eq!(view.picks_made, 1);
    // Film 105 is more popular but releases outside the session window.
    assert_eq!(view.picks[0].film_id, 101);
    assert_eq!(view.picks[0].studio_id, a);
    assert_eq!(view.picks[0].slot, 1);

    // The stale session snapshot still expects pick 1; the guard rejects it.
    assert!(auto_pick(&state, &session, later).await.is_err());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn auto_pick_widens_search_once_session_window_is_drafted(pool: PgPool) {
    let settings = json!({
        "teamStructure": [
            {"slotType": "TotalBoxOffice", "position": 1},
            {"slotType": "TotalBoxOffice", "position": 2},
            {"slotType": "Rating", "position": 3}
        ],
        "draft": {
            "conduct": true,
            "order": [10, 20],
            "numRounds": 3,
            "timePerRound": 1,
            "type": "snake"
        }
    });
    let session_id = create_session(&pool, settings).await;
    let a = create_studio(&pool, session_id, 10, "A").await;
    let b = create_studio(&pool, session_id, 20, "B").await;
    post(build_test_app(pool.clone()), &format!("/api/v1/sessions/{session_id}/draft/start")).await;

    // Every catalogue film releasing in 2024 goes in the first four picks.
    for (studio, film, slot) in [(a, 101, 1), (b, 102, 1), (b, 103, 2), (a, 104, 2)] {
        assert_eq!(pick(&pool, session_id, studio, film, slot).await.0, StatusCode::OK);
    }

    let state = common::test_state(pool.clone());
    let session = LeagueSessionRepo::find_by_id(&pool, session_id).await.unwrap().unwrap();
    let later = session.draft_pick_started_at.unwrap() + chrono::Duration::seconds(5);

    let view = auto_pick(&state, &session, later).await.unwrap().unwrap();
    assert_eq!(view.picks_made, 5);
    let fifth = view.picks.iter().find(|p| p.film_id == 105).unwrap();
    assert_eq!(fifth.studio_id, a);
    assert_eq!(fifth.slot, 3);
}
