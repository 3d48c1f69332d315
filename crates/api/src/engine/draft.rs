//! Live draft orchestration.
//!
//! Turn order and pick validity come from `bmb_core::draft`. Every pick,
//! voluntary or automatic, is recorded with a conditional write on the pick
//! number expected to be on the clock; of two racing picks only one lands
//! and the other gets `CONFLICT`.

use std::collections::{HashMap, HashSet};

use bmb_core::activity;
use bmb_core::draft::{
    choose_auto_pick, open_slots, validate_pick, DraftPhase, DraftState, PickRequest, PickTurn,
};
use bmb_core::error::CoreError;
use bmb_core::types::{DbId, FilmId, SlotPosition, Timestamp};
use bmb_db::models::activity::CreateActivity;
use bmb_db::models::league_session::LeagueSession;
use bmb_db::models::status::{AcquiredType, ActivityType};
use bmb_db::models::studio::Studio;
use bmb_db::models::studio_film::SessionStudioFilm;
use bmb_db::repositories::league_session_repo::RecordPick;
use bmb_db::repositories::{LeagueSessionRepo, StudioFilmRepo, StudioRepo};
use bmb_events::RealtimeEvent;
use chrono::{Months, NaiveDate};
use serde::Serialize;

use crate::engine::{film_or_placeholder, load_session, load_studio};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Pages of popular films scanned per release window.
const AUTO_PICK_MAX_PAGES: u32 = 5;

/// Years added on each side of the session window when nothing inside it
/// is left to auto-pick.
const AUTO_PICK_FALLBACK_YEARS: u32 = 10;

/// The pick on the clock, addressed by studio.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentPick {
    pub studio_id: Option<DbId>,
    pub owner_id: DbId,
    pub num: u32,
    pub start_timestamp: Timestamp,
    pub end_timestamp: Timestamp,
}

/// The pick that was just made.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastPick {
    pub num: u32,
    pub studio_id: DbId,
    pub film_id: FilmId,
    pub slot: SlotPosition,
    pub automatic: bool,
}

/// Payload of `draft:{sessionId}:draft-update`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftUpdate {
    pub session_id: DbId,
    pub current_pick: Option<CurrentPick>,
    pub last_pick: Option<LastPick>,
    pub new_activities: Vec<String>,
}

/// Draft state as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftView {
    pub session_id: DbId,
    pub phase: DraftPhase,
    pub picks_made: u32,
    pub total_picks: u32,
    pub current_pick: Option<CurrentPick>,
    /// Films drafted so far, by studio then slot.
    pub picks: Vec<SessionStudioFilm>,
}

fn current_pick(turn: Option<PickTurn>, studios_by_owner: &HashMap<DbId, DbId>) -> Option<CurrentPick> {
    turn.map(|turn| CurrentPick {
        studio_id: studios_by_owner.get(&turn.owner_id).copied(),
        owner_id: turn.owner_id,
        num: turn.num,
        start_timestamp: turn.start_timestamp,
        end_timestamp: turn.end_timestamp,
    })
}

async fn studios_by_owner(state: &AppState, session_id: DbId) -> AppResult<HashMap<DbId, DbId>> {
    Ok(StudioRepo::list_by_session(&state.pool, session_id)
        .await?
        .into_iter()
        .map(|s| (s.owner_id, s.id))
        .collect())
}

async fn build_view(state: &AppState, session: &LeagueSession) -> AppResult<DraftView> {
    let draft = session.draft_state();
    let owners = studios_by_owner(state, session.id).await?;
    let picks = StudioFilmRepo::list_by_session(&state.pool, session.id)
        .await?
        .into_iter()
        .filter(|sf| sf.acquired_type_id == AcquiredType::Drafted.id())
        .collect();

    Ok(DraftView {
        session_id: session.id,
        phase: draft.phase,
        picks_made: draft.picks_made,
        total_picks: draft.total_picks,
        current_pick: current_pick(draft.current_pick, &owners),
        picks,
    })
}

fn publish_update(state: &AppState, update: &DraftUpdate) {
    state
        .event_bus
        .publish(RealtimeEvent::draft_update(update.session_id).with_data(update));
}

/// Current draft state of a session.
pub async fn draft_view(state: &AppState, session_id: DbId) -> AppResult<DraftView> {
    let session = load_session(&state.pool, session_id).await?;
    build_view(state, &session).await
}

/// Put pick 1 on the clock.
///
/// Requires a draft-mode session whose draft order names only owners with a
/// studio in the session. Starting twice is a `CONFLICT`.
pub async fn start_draft(state: &AppState, session_id: DbId) -> AppResult<DraftView> {
    let session = load_session(&state.pool, session_id).await?;
    let settings = &session.settings.0;

    if !settings.draft.conduct {
        return Err(CoreError::Validation("This session does not conduct a draft".to_string()).into());
    }
    if session.draft_has_started() {
        return Err(CoreError::Conflict("The draft has already started".to_string()).into());
    }
    if settings.draft.order.is_empty() {
        return Err(CoreError::Validation("The draft order is empty".to_string()).into());
    }

    let studios = StudioRepo::list_by_session(&state.pool, session_id).await?;
    let by_owner: HashMap<DbId, &Studio> = studios.iter().map(|s| (s.owner_id, s)).collect();
    for owner in &settings.draft.order {
        if !by_owner.contains_key(owner) {
            return Err(CoreError::Validation(format!(
                "Owner {owner} in the draft order has no studio in this session"
            ))
            .into());
        }
    }

    let now = chrono::Utc::now();
    let opening = DraftState::compute(settings, 0, Some(now));
    let first_studio = opening
        .current_pick
        .and_then(|turn| by_owner.get(&turn.owner_id))
        .map(|s| s.name.as_str())
        .unwrap_or("The first studio");
    let message = activity::draft_started(first_studio);
    let entry = CreateActivity::new(session_id, ActivityType::Automated, message.clone());

    let Some(started) = LeagueSessionRepo::start_draft(&state.pool, session_id, now, &entry).await?
    else {
        return Err(CoreError::Conflict("The draft has already started".to_string()).into());
    };
    tracing::info!(session_id, "Draft started");

    let view = build_view(state, &started).await?;
    publish_update(
        state,
        &DraftUpdate {
            session_id,
            current_pick: view.current_pick.clone(),
            last_pick: None,
            new_activities: vec![message],
        },
    );
    Ok(view)
}

/// Make a pick for the studio on the clock.
pub async fn make_pick(
    state: &AppState,
    session_id: DbId,
    studio_id: DbId,
    film_id: FilmId,
    slot: SlotPosition,
) -> AppResult<DraftView> {
    let session = load_session(&state.pool, session_id).await?;
    let studio = load_studio(&state.pool, studio_id).await?;
    if studio.session_id != session_id {
        return Err(CoreError::Forbidden(format!(
            "Studio {studio_id} does not belong to session {session_id}"
        ))
        .into());
    }
    record(state, &session, &studio, film_id, slot, false).await
}

/// Auto-pick for a session whose current pick has run out of time.
///
/// Returns `None` if the clock has not expired or no eligible film could be
/// found. The most popular undrafted film releasing inside the session
/// window goes into the studio's lowest open slot; when the window is
/// exhausted the search widens so the draft keeps moving.
pub async fn auto_pick(
    state: &AppState,
    session: &LeagueSession,
    now: Timestamp,
) -> AppResult<Option<DraftView>> {
    let Some(turn) = session.draft_state().current_pick.filter(|t| t.is_expired(now)) else {
        return Ok(None);
    };

    let studio = StudioRepo::find_by_owner(&state.pool, session.id, turn.owner_id)
        .await?
        .ok_or_else(|| {
            AppError::InternalError(format!(
                "Owner {} is on the clock without a studio in session {}",
                turn.owner_id, session.id
            ))
        })?;

    let rostered = StudioFilmRepo::list_by_session(&state.pool, session.id).await?;
    let drafted: HashSet<FilmId> = rostered.iter().map(|sf| sf.film_id).collect();
    let occupied: HashSet<SlotPosition> = rostered
        .iter()
        .filter(|sf| sf.studio_id == studio.id)
        .map(|sf| sf.slot)
        .collect();
    let open = open_slots(&session.settings, &occupied);

    match find_auto_pick(state, session, &drafted, &open).await? {
        Some((film_id, slot)) => {
            tracing::info!(
                session_id = session.id,
                studio_id = studio.id,
                pick = turn.num,
                film_id,
                slot,
                "Auto-picking for expired clock"
            );
            record(state, session, &studio, film_id, slot, true).await.map(Some)
        }
        None => {
            tracing::warn!(
                session_id = session.id,
                pick = turn.num,
                "No eligible film found for auto-pick"
            );
            Ok(None)
        }
    }
}

/// Search the session's release window first, then a window widened by
/// [`AUTO_PICK_FALLBACK_YEARS`] on each side once every popular film inside
/// the session window is taken.
async fn find_auto_pick(
    state: &AppState,
    session: &LeagueSession,
    drafted: &HashSet<FilmId>,
    open: &[SlotPosition],
) -> AppResult<Option<(FilmId, SlotPosition)>> {
    let widen = Months::new(AUTO_PICK_FALLBACK_YEARS * 12);
    let widened = (
        session.start_date.checked_sub_months(widen).unwrap_or(NaiveDate::MIN),
        session.end_date.checked_add_months(widen).unwrap_or(NaiveDate::MAX),
    );

    for (index, (start, end)) in [(session.start_date, session.end_date), widened]
        .into_iter()
        .enumerate()
    {
        if index > 0 {
            tracing::warn!(
                session_id = session.id,
                %start,
                %end,
                "Session window exhausted, widening auto-pick search"
            );
        }
        for page in 1..=AUTO_PICK_MAX_PAGES {
            let films = state.films.popular_films(start, end, page).await?;
            if films.is_empty() {
                break;
            }
            if let Some(choice) = choose_auto_pick(&films, drafted, open) {
                return Ok(Some(choice));
            }
        }
    }
    Ok(None)
}

async fn record(
    state: &AppState,
    session: &LeagueSession,
    studio: &Studio,
    film_id: FilmId,
    slot: SlotPosition,
    automatic: bool,
) -> AppResult<DraftView> {
    let settings = &session.settings.0;
    let draft = session.draft_state();

    let rostered = StudioFilmRepo::list_by_session(&state.pool, session.id).await?;
    let occupied: HashSet<SlotPosition> = rostered
        .iter()
        .filter(|sf| sf.studio_id == studio.id)
        .map(|sf| sf.slot)
        .collect();
    let film_already_drafted = rostered.iter().any(|sf| sf.film_id == film_id);

    let turn = validate_pick(&PickRequest {
        state: &draft,
        settings,
        acting_owner_id: studio.owner_id,
        slot,
        occupied_slots: &occupied,
        film_already_drafted,
    })?;

    let film = film_or_placeholder(state.films.as_ref(), film_id).await;
    let completes_draft = draft.is_last_pick();

    let mut messages = vec![activity::draft_pick(
        &studio.name,
        &film.title,
        turn.num,
        slot,
        settings.slot(slot).map(|d| d.slot_type),
        automatic,
    )];
    let mut activities = vec![CreateActivity::new(
        session.id,
        ActivityType::DraftPick,
        messages[0].clone(),
    )
    .studio(studio.id)
    .film(film_id)];
    if completes_draft {
        let done = activity::draft_complete();
        activities.push(CreateActivity::new(session.id, ActivityType::Automated, done.clone()));
        messages.push(done);
    }

    let pick = RecordPick {
        session_id: session.id,
        expected_pick: turn.num as i32,
        studio_id: studio.id,
        film_id,
        slot,
        picked_at: chrono::Utc::now(),
        completes_draft,
        activities,
    };
    let Some((updated, _)) = LeagueSessionRepo::record_pick(&state.pool, &pick).await? else {
        return Err(CoreError::Conflict(format!("Pick {} has already been made", turn.num)).into());
    };
    tracing::info!(
        session_id = session.id,
        studio_id = studio.id,
        pick = turn.num,
        film_id,
        slot,
        automatic,
        "Draft pick recorded"
    );

    let view = build_view(state, &updated).await?;
    publish_update(
        state,
        &DraftUpdate {
            session_id: session.id,
            current_pick: view.current_pick.clone(),
            last_pick: Some(LastPick {
                num: turn.num,
                studio_id: studio.id,
                film_id,
                slot,
                automatic,
            }),
            new_activities: messages,
        },
    );
    Ok(view)
}
