//! In-process TTL cache in front of a [`FilmMetadataSource`].
//!
//! Film metadata changes slowly (revenue updates at most daily), so both
//! per-film details and discover pages are cached for a fixed TTL. Errors
//! are never cached.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bmb_core::film::FilmDetails;
use bmb_core::types::FilmId;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use crate::error::FilmDbError;
use crate::source::FilmMetadataSource;

struct Entry<V> {
    value: V,
    stored_at: Instant,
}

struct TtlMap<K, V> {
    ttl: Duration,
    entries: RwLock<HashMap<K, Entry<V>>>,
}

impl<K: Eq + Hash, V: Clone> TtlMap<K, V> {
    fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    async fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| entry.value.clone())
    }

    async fn insert(&self, key: K, value: V) {
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        entries.insert(
            key,
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );
    }
}

/// Caching decorator for any film metadata source.
pub struct CachedFilmSource {
    inner: Arc<dyn FilmMetadataSource>,
    details: TtlMap<FilmId, FilmDetails>,
    discover: TtlMap<(NaiveDate, NaiveDate, u32), Vec<FilmDetails>>,
}

impl CachedFilmSource {
    pub fn new(inner: Arc<dyn FilmMetadataSource>, ttl: Duration) -> Self {
        Self {
            inner,
            details: TtlMap::new(ttl),
            discover: TtlMap::new(ttl),
        }
    }
}

#[async_trait]
impl FilmMetadataSource for CachedFilmSource {
    async fn film_details(&self, film_id: FilmId) -> Result<FilmDetails, FilmDbError> {
        if let Some(hit) = self.details.get(&film_id).await {
            tracing::trace!(film_id, "Film cache hit");
            return Ok(hit);
        }
        let details = self.inner.film_details(film_id).await?;
        self.details.insert(film_id, details.clone()).await;
        Ok(details)
    }

    async fn popular_films(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        page: u32,
    ) -> Result<Vec<FilmDetails>, FilmDbError> {
        let key = (start, end, page);
        if let Some(hit) = self.discover.get(&key).await {
            return Ok(hit);
        }
        let films = self.inner.popular_films(start, end, page).await?;
        self.discover.insert(key, films.clone()).await;
        Ok(films)
    }
}
