//! Roster changes within one studio: swapping slots and dropping films.

use std::collections::HashMap;

use bmb_core::activity;
use bmb_core::error::CoreError;
use bmb_core::studio::{drop_refund, plan_swap};
use bmb_core::types::{Amount, DbId, SlotPosition};
use bmb_db::models::activity::CreateActivity;
use bmb_db::models::status::ActivityType;
use bmb_db::models::studio::Studio;
use bmb_db::models::studio_film::StudioFilm;
use bmb_db::repositories::StudioFilmRepo;
use serde::Serialize;

use crate::engine::{film_or_placeholder, load_session, load_studio};
use crate::error::AppResult;
use crate::state::AppState;

/// Result of dropping a film.
#[derive(Debug, Serialize)]
pub struct DropOutcome {
    pub dropped: StudioFilm,
    pub refund: Amount,
    /// The studio after the refund was credited.
    pub studio: Studio,
}

/// Move the film in `from_slot` to `to_slot`, trading places with any film
/// already there. Each moved film gets its own activity entry.
pub async fn swap(
    state: &AppState,
    studio_id: DbId,
    from_slot: SlotPosition,
    to_slot: SlotPosition,
) -> AppResult<Vec<StudioFilm>> {
    let studio = load_studio(&state.pool, studio_id).await?;
    let session = load_session(&state.pool, studio.session_id).await?;

    let films = StudioFilmRepo::list_by_studio(&state.pool, studio_id).await?;
    let roster: HashMap<SlotPosition, DbId> = films.iter().map(|f| (f.slot, f.id)).collect();
    let moves = plan_swap(&session.settings, &roster, from_slot, to_slot)?;

    let mut activities = Vec::with_capacity(moves.len());
    for m in &moves {
        let Some(film) = films.iter().find(|f| f.id == m.studio_film_id) else {
            continue;
        };
        let details = film_or_placeholder(state.films.as_ref(), film.film_id).await;
        activities.push(
            CreateActivity::new(
                studio.session_id,
                ActivityType::Swap,
                activity::moved(&studio.name, &details.title, m.from, m.to),
            )
            .studio(studio_id)
            .film(film.film_id),
        );
    }

    let moved = StudioFilmRepo::apply_moves(&state.pool, studio_id, &moves, &activities).await?;
    tracing::info!(studio_id, from_slot, to_slot, moved = moved.len(), "Roster slots swapped");
    Ok(moved)
}

/// Remove the film in `slot`, refunding part of its price in bid-war
/// sessions.
pub async fn drop_film(state: &AppState, studio_id: DbId, slot: SlotPosition) -> AppResult<DropOutcome> {
    let studio = load_studio(&state.pool, studio_id).await?;
    let session = load_session(&state.pool, studio.session_id).await?;
    session.settings.require_slot(slot)?;

    let film = StudioFilmRepo::find_by_slot(&state.pool, studio_id, slot)
        .await?
        .ok_or_else(|| CoreError::Validation(format!("Slot {slot} is empty; nothing to drop")))?;

    let refund = drop_refund(session.settings.acquisition_mode(), film.acquired_amount);
    let details = film_or_placeholder(state.films.as_ref(), film.film_id).await;
    let entry = CreateActivity::new(
        studio.session_id,
        ActivityType::Drop,
        activity::dropped(&studio.name, &details.title, slot, refund),
    )
    .studio(studio_id)
    .film(film.film_id);

    let dropped = StudioFilmRepo::drop_film(&state.pool, studio_id, film.id, refund, &entry)
        .await?
        .ok_or_else(|| CoreError::Conflict(format!("Slot {slot} changed while dropping")))?;
    tracing::info!(studio_id, slot, film_id = dropped.film_id, refund, "Film dropped");

    let studio = load_studio(&state.pool, studio_id).await?;
    Ok(DropOutcome {
        dropped,
        refund,
        studio,
    })
}
