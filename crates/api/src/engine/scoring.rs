//! Live standings and persisted studio scores.

use std::collections::HashMap;

use bmb_core::film::FilmDetails;
use bmb_core::scoring::{round1, score, studio_total, SlotType};
use bmb_core::studio::rank_standings;
use bmb_core::types::{Amount, DbId, FilmId, SlotPosition};
use bmb_db::models::studio_film::SessionStudioFilm;
use bmb_db::repositories::{StudioFilmRepo, StudioRepo};
use bmb_events::RealtimeEvent;
use serde::Serialize;
use serde_json::json;

use crate::engine::{film_or_placeholder, load_session};
use crate::error::AppResult;
use crate::state::AppState;

/// One filled slot and the points it earns.
#[derive(Debug, Clone, Serialize)]
pub struct SlotScore {
    pub slot: SlotPosition,
    pub slot_type: Option<SlotType>,
    pub film_id: FilmId,
    pub title: String,
    pub score: f64,
    /// Whether an administrator override replaced the computed score.
    pub overridden: bool,
}

/// A studio's line in the session standings.
#[derive(Debug, Clone, Serialize)]
pub struct StudioStanding {
    pub rank: u32,
    pub studio_id: DbId,
    pub owner_id: DbId,
    pub name: String,
    pub budget: Amount,
    pub score: f64,
    pub slots: Vec<SlotScore>,
}

/// Score every rostered film of a session and rank the studios.
///
/// Film-data failures score that film 0 instead of failing the request.
pub async fn list_standings(state: &AppState, session_id: DbId) -> AppResult<Vec<StudioStanding>> {
    let session = load_session(&state.pool, session_id).await?;
    let settings = &session.settings.0;
    let studios = StudioRepo::list_by_session(&state.pool, session_id).await?;
    let rostered = StudioFilmRepo::list_by_session(&state.pool, session_id).await?;

    let mut details: HashMap<FilmId, FilmDetails> = HashMap::new();
    let mut slots_by_studio: HashMap<DbId, Vec<SlotScore>> = HashMap::new();
    for sf in &rostered {
        if !details.contains_key(&sf.film_id) {
            let film = film_or_placeholder(state.films.as_ref(), sf.film_id).await;
            details.insert(sf.film_id, film);
        }
        let slot_type = settings.slot(sf.slot).map(|d| d.slot_type);
        slots_by_studio
            .entry(sf.studio_id)
            .or_default()
            .push(slot_score(sf, slot_type, &details[&sf.film_id]));
    }

    let totals: Vec<(DbId, f64)> = studios
        .iter()
        .map(|s| {
            let slots = slots_by_studio.get(&s.id).map(Vec::as_slice).unwrap_or(&[]);
            (s.id, studio_total(slots.iter().map(|slot| slot.score)))
        })
        .collect();

    let by_id: HashMap<DbId, _> = studios.iter().map(|s| (s.id, s)).collect();
    let standings = rank_standings(&totals)
        .into_iter()
        .filter_map(|standing| {
            let studio = by_id.get(&standing.studio_id)?;
            Some(StudioStanding {
                rank: standing.rank,
                studio_id: studio.id,
                owner_id: studio.owner_id,
                name: studio.name.clone(),
                budget: studio.budget,
                score: standing.score,
                slots: slots_by_studio.remove(&studio.id).unwrap_or_default(),
            })
        })
        .collect();
    Ok(standings)
}

/// Recompute and persist every studio's total, publishing a score update
/// per studio.
pub async fn refresh_scores(state: &AppState, session_id: DbId) -> AppResult<Vec<StudioStanding>> {
    let standings = list_standings(state, session_id).await?;
    for standing in &standings {
        StudioRepo::update_score(&state.pool, standing.studio_id, standing.score).await?;
        state.event_bus.publish(
            RealtimeEvent::score_update(standing.studio_id).with_payload(json!({
                "studioId": standing.studio_id,
                "score": standing.score,
                "rank": standing.rank,
            })),
        );
    }
    tracing::info!(session_id, studios = standings.len(), "Studio scores refreshed");
    Ok(standings)
}

fn slot_score(sf: &SessionStudioFilm, slot_type: Option<SlotType>, film: &FilmDetails) -> SlotScore {
    let (points, overridden) = match (sf.score_override, slot_type) {
        (Some(value), _) => (round1(value), true),
        (None, Some(slot_type)) => (score(slot_type, film), false),
        (None, None) => (0.0, false),
    };
    SlotScore {
        slot: sf.slot,
        slot_type,
        film_id: sf.film_id,
        title: film.title.clone(),
        score: points,
        overridden,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rostered(score_override: Option<f64>) -> SessionStudioFilm {
        SessionStudioFilm {
            id: 1,
            studio_id: 7,
            film_id: 603,
            slot: 1,
            acquired_type_id: 2,
            acquired_amount: Some(40),
            score_override,
        }
    }

    fn film() -> FilmDetails {
        FilmDetails {
            title: "The Matrix".into(),
            revenue: Some(463_517_383),
            average_rating: Some(8.2),
            ..FilmDetails::unavailable(603)
        }
    }

    #[test]
    fn slot_type_drives_score() {
        let scored = slot_score(&rostered(None), Some(SlotType::TotalBoxOffice), &film());
        assert_eq!(scored.score, 463.5);
        assert!(!scored.overridden);
        assert_eq!(scored.title, "The Matrix");
    }

    #[test]
    fn override_wins_over_computed_score() {
        let scored = slot_score(&rostered(Some(12.34)), Some(SlotType::Rating), &film());
        assert_eq!(scored.score, 12.3);
        assert!(scored.overridden);
    }

    #[test]
    fn slot_outside_structure_scores_zero() {
        let scored = slot_score(&rostered(None), None, &film());
        assert_eq!(scored.score, 0.0);
    }
}
