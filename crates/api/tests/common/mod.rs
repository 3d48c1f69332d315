#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use bmb_api::config::{FilmDbConfig, ServerConfig, SettlementSchedule};
use bmb_api::router::build_app_router;
use bmb_api::state::AppState;
use bmb_api::ws::WsManager;
use bmb_core::film::FilmDetails;
use bmb_core::types::FilmId;
use bmb_events::EventBus;
use bmb_filmdb::{FilmDbError, FilmMetadataSource};
use chrono::{NaiveDate, Weekday};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        film_db: FilmDbConfig {
            base_url: "http://films.invalid".to_string(),
            api_key: "test".to_string(),
            cache_ttl_secs: 60,
        },
        settlement: SettlementSchedule {
            weekday: Weekday::Tue,
            hour_utc: 12,
        },
        draft_clock_interval_secs: 1,
    }
}

/// In-memory film catalogue.
#[derive(Default)]
pub struct FakeFilms {
    films: HashMap<FilmId, FilmDetails>,
}

impl FakeFilms {
    pub fn with(mut self, id: FilmId, title: &str, release: &str, popularity: f64) -> Self {
        self.films.insert(
            id,
            FilmDetails {
                title: title.to_string(),
                release_date: NaiveDate::parse_from_str(release, "%Y-%m-%d").ok(),
                popularity: Some(popularity),
                ..FilmDetails::unavailable(id)
            },
        );
        self
    }
}

#[async_trait]
impl FilmMetadataSource for FakeFilms {
    async fn film_details(&self, film_id: FilmId) -> Result<FilmDetails, FilmDbError> {
        self.films
            .get(&film_id)
            .cloned()
            .ok_or(FilmDbError::NotFound(film_id))
    }

    async fn popular_films(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        page: u32,
    ) -> Result<Vec<FilmDetails>, FilmDbError> {
        if page > 1 {
            return Ok(vec![]);
        }
        let mut films: Vec<FilmDetails> = self
            .films
            .values()
            .filter(|f| f.releases_within(start, end))
            .cloned()
            .collect();
        films.sort_by(|a, b| b.popularity.unwrap_or(0.0).total_cmp(&a.popularity.unwrap_or(0.0)));
        Ok(films)
    }
}

/// A small catalogue of 2024 releases plus one 2030 release.
pub fn catalogue() -> FakeFilms {
    FakeFilms::default()
        .with(101, "Dune: Part Two", "2024-03-01", 90.0)
        .with(102, "Inside Out 2", "2024-06-14", 80.0)
        .with(103, "Furiosa", "2024-05-24", 70.0)
        .with(104, "Civil War", "2024-04-12", 60.0)
        .with(105, "Far Future", "2030-01-01", 99.0)
}

pub fn test_state(pool: PgPool) -> AppState {
    AppState {
        pool,
        config: Arc::new(test_config()),
        ws_manager: Arc::new(WsManager::new()),
        event_bus: Arc::new(EventBus::default()),
        films: Arc::new(catalogue()),
    }
}

/// Build the full application router over the given state.
pub fn build_test_app_with(state: AppState) -> Router {
    build_app_router(state, &test_config())
}

pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(test_state(pool))
}

pub async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn post(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, None).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
