//! Real-time topic names.
//!
//! Topics follow `{domain}:{entityId}:{event}`; WebSocket clients subscribe
//! to them verbatim.

use crate::types::DbId;

pub const DOMAIN_DRAFT: &str = "draft";
pub const DOMAIN_SESSION: &str = "session";
pub const DOMAIN_STUDIO: &str = "studio";

pub const EVENT_DRAFT_UPDATE: &str = "draft-update";
pub const EVENT_BIDS_SETTLED: &str = "bids-settled";
pub const EVENT_BID_WON: &str = "bid-won";
pub const EVENT_SCORE_UPDATE: &str = "score-update";

pub fn topic(domain: &str, entity_id: DbId, event: &str) -> String {
    format!("{domain}:{entity_id}:{event}")
}

pub fn draft_update(session_id: DbId) -> String {
    topic(DOMAIN_DRAFT, session_id, EVENT_DRAFT_UPDATE)
}

pub fn bids_settled(session_id: DbId) -> String {
    topic(DOMAIN_SESSION, session_id, EVENT_BIDS_SETTLED)
}

pub fn bid_won(studio_id: DbId) -> String {
    topic(DOMAIN_STUDIO, studio_id, EVENT_BID_WON)
}

pub fn score_update(studio_id: DbId) -> String {
    topic(DOMAIN_STUDIO, studio_id, EVENT_SCORE_UPDATE)
}

/// Whether `candidate` is a well-formed `{domain}:{id}:{event}` topic.
pub fn is_valid_topic(candidate: &str) -> bool {
    let mut parts = candidate.split(':');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(domain), Some(id), Some(event), None) => {
            !domain.is_empty() && !event.is_empty() && id.parse::<DbId>().is_ok()
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_topic_shape() {
        assert_eq!(draft_update(12), "draft:12:draft-update");
    }

    #[test]
    fn topic_validation() {
        assert!(is_valid_topic("studio:5:score-update"));
        assert!(!is_valid_topic("studio:five:score-update"));
        assert!(!is_valid_topic("studio:5"));
        assert!(!is_valid_topic("studio:5:a:b"));
        assert!(!is_valid_topic(":5:x"));
    }
}
