//! REST client for The Movie Database (TMDB) v3 API.

use async_trait::async_trait;
use bmb_core::film::FilmDetails;
use bmb_core::types::FilmId;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::FilmDbError;
use crate::source::FilmMetadataSource;

/// Default public API root.
pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// HTTP client for TMDB.
pub struct TmdbClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// Body of `GET /movie/{id}`.
#[derive(Debug, Deserialize)]
struct MovieResponse {
    id: FilmId,
    title: String,
    #[serde(default)]
    revenue: i64,
    #[serde(default)]
    vote_average: f64,
    #[serde(default)]
    vote_count: i64,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    popularity: Option<f64>,
}

/// Body of `GET /discover/movie`.
#[derive(Debug, Deserialize)]
struct DiscoverResponse {
    results: Vec<MovieResponse>,
}

impl From<MovieResponse> for FilmDetails {
    fn from(movie: MovieResponse) -> Self {
        FilmDetails {
            id: movie.id,
            title: movie.title,
            // TMDB reports unknown revenue and unrated films as 0.
            revenue: (movie.revenue > 0).then_some(movie.revenue),
            opening_weekend_revenue: None,
            average_rating: (movie.vote_count > 0).then_some(movie.vote_average),
            release_date: movie
                .release_date
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()),
            popularity: movie.popularity,
        }
    }
}

impl TmdbClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, api_key)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: String, api_key: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, FilmDbError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(FilmDbError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl FilmMetadataSource for TmdbClient {
    async fn film_details(&self, film_id: FilmId) -> Result<FilmDetails, FilmDbError> {
        let response = self
            .client
            .get(format!("{}/movie/{film_id}", self.base_url))
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(FilmDbError::NotFound(film_id));
        }
        let movie: MovieResponse = Self::ensure_success(response).await?.json().await?;
        Ok(movie.into())
    }

    async fn popular_films(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        page: u32,
    ) -> Result<Vec<FilmDetails>, FilmDbError> {
        let start = start.format("%Y-%m-%d").to_string();
        let end = end.format("%Y-%m-%d").to_string();
        let page = page.max(1).to_string();
        let response = self
            .client
            .get(format!("{}/discover/movie", self.base_url))
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("sort_by", "popularity.desc"),
                ("primary_release_date.gte", start.as_str()),
                ("primary_release_date.lte", end.as_str()),
                ("page", page.as_str()),
            ])
            .send()
            .await?;

        let body: DiscoverResponse = Self::ensure_success(response).await?.json().await?;
        Ok(body.results.into_iter().map(FilmDetails::from).collect())
    }
}
