//! HTTP-level tests driving the router against an in-memory store.

use std::sync::Arc;

use axum::{
  body::{Body, to_bytes},
  http::{Request, StatusCode, header},
};
use chrono::{DateTime, TimeDelta, Utc};
use matchday_core::{
  clock::ManualClock,
  resolver::{PeriodPolicy, PeriodResolver},
};
use matchday_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use super::*;

struct Harness {
  resolver: Arc<PeriodResolver<SqliteStore>>,
  clock:    Arc<ManualClock>,
}

fn at(rfc3339: &str) -> DateTime<Utc> {
  DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
}

async fn harness() -> Harness {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  let clock = Arc::new(ManualClock::new(at("2026-10-19T10:00:00Z")));
  let resolver = Arc::new(PeriodResolver::new(
    store,
    clock.clone(),
    PeriodPolicy::default(),
  ));
  Harness { resolver, clock }
}

struct Reply {
  status:  StatusCode,
  headers: axum::http::HeaderMap,
  body:    Value,
}

async fn send(h: &Harness, method: &str, uri: &str, body: Option<&str>) -> Reply {
  let mut builder = Request::builder().method(method).uri(uri);
  if body.is_some() {
    builder = builder.header(header::CONTENT_TYPE, "application/json");
  }
  let req = builder
    .body(Body::from(body.unwrap_or_default().to_string()))
    .unwrap();
  let resp = api_router(h.resolver.clone()).oneshot(req).await.unwrap();

  let status = resp.status();
  let headers = resp.headers().clone();
  let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let body = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  Reply { status, headers, body }
}

async fn post(h: &Harness, uri: &str, body: Value) -> Reply {
  send(h, "POST", uri, Some(&body.to_string())).await
}

async fn get(h: &Harness, uri: &str) -> Reply { send(h, "GET", uri, None).await }

async fn add_team(h: &Harness, name: &str) -> i64 {
  let r = post(h, "/add-team", json!({ "name": name })).await;
  assert_eq!(r.status, StatusCode::OK, "{}", r.body);
  r.body["id"].as_i64().unwrap()
}

// ── Teams ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_team_is_idempotent_per_period() {
  let h = harness().await;
  let r = post(&h, "/add-team", json!({ "name": "Lions" })).await;
  assert_eq!(r.status, StatusCode::OK);
  assert_eq!(r.body["name"], "Lions");

  let again = add_team(&h, " Lions ").await;
  assert_eq!(r.body["id"].as_i64().unwrap(), again);

  let list = get(&h, "/list-teams").await;
  assert_eq!(list.body, json!([{ "id": again, "name": "Lions" }]));
}

#[tokio::test]
async fn blank_team_name_is_bad_request() {
  let h = harness().await;
  let r = post(&h, "/add-team", json!({ "name": "  " })).await;
  assert_eq!(r.status, StatusCode::BAD_REQUEST);
  assert!(r.body["error"].is_string());
}

#[tokio::test]
async fn malformed_bodies_are_bad_requests() {
  let h = harness().await;
  let r = send(&h, "POST", "/add-team", Some("{not json")).await;
  assert_eq!(r.status, StatusCode::BAD_REQUEST);

  let r = post(&h, "/add-team", json!({})).await;
  assert_eq!(r.status, StatusCode::BAD_REQUEST);

  let r = post(&h, "/add-match", json!({ "team1_id": 1, "team2_id": 2, "score1": -1, "score2": 0 }))
    .await;
  assert_eq!(r.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn wrong_method_is_rejected() {
  let h = harness().await;
  assert_eq!(get(&h, "/add-team").await.status, StatusCode::METHOD_NOT_ALLOWED);
  let r = post(&h, "/list-teams", json!({})).await;
  assert_eq!(r.status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn preflight_answers_no_content_with_cors_headers() {
  let h = harness().await;
  let r = send(&h, "OPTIONS", "/add-match", None).await;
  assert_eq!(r.status, StatusCode::NO_CONTENT);
  assert_eq!(r.headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
  assert_eq!(r.headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");

  let r = get(&h, "/list-periods").await;
  assert_eq!(r.headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

// ── Players ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn players_are_listed_by_ranking() {
  let h = harness().await;
  let team = add_team(&h, "Red").await;
  for (name, goals, assists) in [("C", 3, 0), ("B", 2, 2), ("A", 3, 1)] {
    let r = post(
      &h,
      "/add-player",
      json!({ "name": name, "team_id": team, "goals": goals, "assists": assists }),
    )
    .await;
    assert_eq!(r.body, json!({ "ok": true }));
  }

  let r = get(&h, "/players").await;
  let names: Vec<_> = r.body.as_array().unwrap().iter().map(|p| p["name"].clone()).collect();
  assert_eq!(names, [json!("A"), json!("B"), json!("C")]);
  assert_eq!(r.body[0], json!({ "name": "A", "team_id": team, "goals": 3, "assists": 1 }));
}

#[tokio::test]
async fn player_with_invalid_team_is_bad_request() {
  let h = harness().await;
  let body = json!({ "name": "Ann", "team_id": 0, "goals": 1, "assists": 0 });
  assert_eq!(post(&h, "/add-player", body).await.status, StatusCode::BAD_REQUEST);

  let body = json!({ "name": "Ann", "team_id": 42, "goals": 1, "assists": 0 });
  assert_eq!(post(&h, "/add-player", body).await.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_player_reports_absence() {
  let h = harness().await;
  let team = add_team(&h, "Red").await;
  post(&h, "/add-player", json!({ "name": "Ann", "team_id": team, "goals": 1, "assists": 0 }))
    .await;

  let r = post(&h, "/delete-player", json!({ "name": "Bob", "team_id": team })).await;
  assert_eq!(r.status, StatusCode::NOT_FOUND);

  let r = post(&h, "/delete-player", json!({ "name": "Ann", "team_id": team })).await;
  assert_eq!(r.body, json!({ "ok": true }));
  assert_eq!(get(&h, "/players").await.body, json!([]));
}

// ── Matches ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn self_match_is_bad_request() {
  let h = harness().await;
  let team = add_team(&h, "Red").await;
  let r = post(
    &h,
    "/add-match",
    json!({ "team1_id": team, "team2_id": team, "score1": 1, "score2": 0 }),
  )
  .await;
  assert_eq!(r.status, StatusCode::BAD_REQUEST);
  assert_eq!(get(&h, "/matches").await.body, json!([]));
}

#[tokio::test]
async fn match_round_trip_and_delete() {
  let h = harness().await;
  let red = add_team(&h, "Red").await;
  let blue = add_team(&h, "Blue").await;

  let r = post(
    &h,
    "/add-match",
    json!({ "team1_id": red, "team2_id": blue, "score1": 3, "score2": 1 }),
  )
  .await;
  let id = r.body["id"].as_i64().unwrap();

  let list = get(&h, "/matches").await.body;
  assert_eq!(list[0]["id"], id);
  assert_eq!(list[0]["score1"], 3);
  assert_eq!(list[0]["played_at"], "2026-10-19T10:00:00Z");

  let r = post(&h, "/delete-match", json!({ "id": id + 1 })).await;
  assert_eq!(r.status, StatusCode::NOT_FOUND);
  let r = post(&h, "/delete-match", json!({ "id": 0 })).await;
  assert_eq!(r.status, StatusCode::BAD_REQUEST);
  assert_eq!(get(&h, "/matches").await.body.as_array().unwrap().len(), 1);

  let r = post(&h, "/delete-match", json!({ "id": id })).await;
  assert_eq!(r.body, json!({ "ok": true }));
}

// ── Periods ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn current_period_reports_timing() {
  let h = harness().await;
  let r = get(&h, "/current-period").await;
  assert_eq!(r.status, StatusCode::OK);
  assert_eq!(r.body["period"]["is_active"], true);
  assert_eq!(r.body["period"]["name"], "Period 2026-10-19 10:00");
  assert!(r.body["period"].get("end_time").is_none());
  assert_eq!(r.body["auto_reset_in"], "24h0m0s");

  h.clock.advance(TimeDelta::minutes(90));
  let r = get(&h, "/current-period").await;
  assert_eq!(r.body["elapsed_hours"], 1.5);
  assert_eq!(r.body["remaining_hours"], 22.5);
  assert_eq!(r.body["auto_reset_in"], "22h30m0s");
}

#[tokio::test]
async fn period_query_errors() {
  let h = harness().await;
  let r = get(&h, "/list-teams?period=tomorrow").await;
  assert_eq!(r.status, StatusCode::BAD_REQUEST);

  let r = get(&h, "/matches?period=2020-01-01").await;
  assert_eq!(r.status, StatusCode::NOT_FOUND);
  assert!(r.body["error"].is_string());
}

#[tokio::test]
async fn rollover_keeps_history_reachable_by_date() {
  let h = harness().await;
  let red = add_team(&h, "Red").await;
  let blue = add_team(&h, "Blue").await;
  post(
    &h,
    "/add-match",
    json!({ "team1_id": red, "team2_id": blue, "score1": 3, "score2": 1 }),
  )
  .await;
  let p1 = get(&h, "/current-period").await.body["period"]["id"].clone();

  h.clock.advance(TimeDelta::hours(25));
  let p2 = get(&h, "/current-period").await.body["period"].clone();
  assert_ne!(p2["id"], p1);
  assert_eq!(p2["is_active"], true);

  let periods = get(&h, "/list-periods").await.body;
  assert_eq!(periods.as_array().unwrap().len(), 2);
  assert_eq!(periods[0]["id"], p2["id"]);
  assert_eq!(periods[1]["is_active"], false);
  assert_eq!(periods[1]["end_time"], "2026-10-20T11:00:00Z");

  assert_eq!(get(&h, "/matches").await.body, json!([]));
  let old = get(&h, "/matches?period=2026-10-19").await;
  assert_eq!(old.status, StatusCode::OK);
  assert_eq!(old.body.as_array().unwrap().len(), 1);
  assert_eq!(old.body[0]["score1"], 3);

  let closed = get(&h, "/current-period?period=2026-10-19").await.body;
  assert_eq!(closed["period"]["id"], p1);
  assert_eq!(closed["remaining_hours"], 0.0);
  assert_eq!(closed["elapsed_hours"], 25.0);

  // Teams from the expired period cannot play in the new one.
  let r = post(
    &h,
    "/add-match",
    json!({ "team1_id": red, "team2_id": blue, "score1": 0, "score2": 0 }),
  )
  .await;
  assert_eq!(r.status, StatusCode::BAD_REQUEST);
}
