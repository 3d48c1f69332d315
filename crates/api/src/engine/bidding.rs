//! Sealed bids: placement, cancellation and listing.

use bmb_core::bidding::{validate_bid, BidPlacement};
use bmb_core::error::CoreError;
use bmb_core::types::{Amount, DbId, FilmId, SlotPosition};
use bmb_db::models::film_bid::{CreateFilmBid, FilmBid};
use bmb_db::models::status::BidStatus;
use bmb_db::repositories::{FilmBidRepo, StudioFilmRepo};
use bmb_filmdb::FilmDbError;

use crate::engine::{load_session, load_studio};
use crate::error::AppResult;
use crate::state::AppState;

/// Place a pending bid for a studio.
///
/// The release-window check runs only when the provider can describe the
/// film; an unknown film id is rejected, a provider outage is not.
pub async fn place_bid(
    state: &AppState,
    studio_id: DbId,
    film_id: FilmId,
    slot: SlotPosition,
    amount: Amount,
) -> AppResult<FilmBid> {
    let studio = load_studio(&state.pool, studio_id).await?;
    let session = load_session(&state.pool, studio.session_id).await?;

    let outside_session_window = match state.films.film_details(film_id).await {
        Ok(film) => !film.releases_within(session.start_date, session.end_date),
        Err(FilmDbError::NotFound(id)) => return Err(FilmDbError::NotFound(id).into()),
        Err(e) => {
            tracing::warn!(film_id, error = %e, "Film data unavailable, skipping release window check");
            false
        }
    };
    let already_holds_film = StudioFilmRepo::studio_holds_film(&state.pool, studio_id, film_id).await?;

    validate_bid(&BidPlacement {
        settings: &session.settings.0,
        budget: studio.budget,
        amount,
        slot,
        already_holds_film,
        outside_session_window,
    })?;

    let bid = FilmBidRepo::create(
        &state.pool,
        &CreateFilmBid {
            session_id: studio.session_id,
            studio_id,
            film_id,
            slot,
            amount,
        },
    )
    .await?;
    tracing::info!(
        session_id = studio.session_id,
        studio_id,
        film_id,
        bid_id = bid.id,
        amount,
        "Bid placed"
    );
    Ok(bid)
}

/// Withdraw a bid that has not been settled yet.
pub async fn cancel_bid(state: &AppState, bid_id: DbId, studio_id: DbId) -> AppResult<()> {
    let bid = FilmBidRepo::find_by_id(&state.pool, bid_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "FilmBid",
            id: bid_id,
        })?;
    if bid.studio_id != studio_id {
        return Err(CoreError::Forbidden("Bid belongs to another studio".to_string()).into());
    }
    if bid.status_id != BidStatus::Pending.id() {
        return Err(CoreError::Conflict("Only pending bids can be cancelled".to_string()).into());
    }
    if !FilmBidRepo::delete_pending(&state.pool, bid_id, studio_id).await? {
        return Err(CoreError::Conflict("Bid was settled before it could be cancelled".to_string()).into());
    }
    tracing::info!(bid_id, studio_id, "Bid cancelled");
    Ok(())
}

/// A studio's bids, newest first.
pub async fn list_bids(state: &AppState, studio_id: DbId) -> AppResult<Vec<FilmBid>> {
    load_studio(&state.pool, studio_id).await?;
    Ok(FilmBidRepo::list_by_studio(&state.pool, studio_id).await?)
}
