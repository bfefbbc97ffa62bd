use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::{
    error::AppError,
    models::{
        challenge::{ChallengeKind, ChallengeResponse, ChallengeSlot},
        track::Track,
    },
    store::{ChallengeStore, ScoreStore, TrackStore},
};

/// Owns the two rotating challenge pointers.
pub struct ChallengeService {
    slots: Arc<dyn ChallengeStore>,
    tracks: Arc<dyn TrackStore>,
    scores: Arc<dyn ScoreStore>,
}

impl ChallengeService {
    pub fn new(
        slots: Arc<dyn ChallengeStore>,
        tracks: Arc<dyn TrackStore>,
        scores: Arc<dyn ScoreStore>,
    ) -> Self {
        Self {
            slots,
            tracks,
            scores,
        }
    }

    /// Returns the real track id behind `id`. Non-virtual ids pass through.
    pub async fn resolve_track_id(&self, id: &str) -> Result<String, AppError> {
        let Some(kind) = ChallengeKind::from_virtual_id(id) else {
            return Ok(id.to_string());
        };
        let resolved = match self.slots.get_slot(kind).await? {
            Some(slot) => slot.track_id,
            None => kind.default_track_id().to_string(),
        };
        Ok(resolved)
    }

    /// The stored slot, or one built from the default track.
    pub async fn current(&self, kind: ChallengeKind) -> Result<ChallengeSlot, AppError> {
        if let Some(slot) = self.slots.get_slot(kind).await? {
            return Ok(slot);
        }

        let track = self
            .tracks
            .get_track(kind.default_track_id())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No {} is set", kind.slot_id())))?;
        Ok(ChallengeSlot::pointing_at(kind, &track, track.created_at))
    }

    pub async fn current_with_participants(
        &self,
        kind: ChallengeKind,
    ) -> Result<ChallengeResponse, AppError> {
        let slot = self.current(kind).await?;
        let participant_count = self.scores.count_for_track(&slot.track_id).await?;
        Ok(ChallengeResponse {
            track: slot.into(),
            participant_count,
        })
    }

    pub async fn repoint(&self, kind: ChallengeKind, track_id: &str) -> Result<ChallengeSlot, AppError> {
        let track_id = track_id.trim();
        if track_id.is_empty() {
            return Err(AppError::Validation("Track ID is required".to_string()));
        }

        let track = self
            .tracks
            .get_track(track_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Track not found".to_string()))?;

        let slot = ChallengeSlot::pointing_at(kind, &track, Utc::now());
        self.slots.put_slot(slot.clone()).await?;
        info!(slot = kind.slot_id(), track_id = %track.id, "Challenge repointed");
        Ok(slot)
    }

    /// Moves any slot that pointed at `track_id` to the newest remaining track of
    /// its category, or clears it when there is none.
    pub async fn handle_track_removed(&self, track_id: &str) -> Result<(), AppError> {
        for kind in ChallengeKind::ALL {
            let pointed_at = match self.slots.get_slot(kind).await? {
                Some(slot) => slot.track_id,
                None => kind.default_track_id().to_string(),
            };
            if pointed_at != track_id {
                continue;
            }

            let remaining = self.tracks.list_tracks().await?;
            match fallback_track(kind, &remaining) {
                Some(track) => {
                    self.slots
                        .put_slot(ChallengeSlot::pointing_at(kind, track, Utc::now()))
                        .await?;
                    info!(slot = kind.slot_id(), track_id = %track.id, "Challenge fell back");
                }
                None => {
                    self.slots.clear_slot(kind).await?;
                    warn!(slot = kind.slot_id(), "No track left for challenge, slot cleared");
                }
            }
        }
        Ok(())
    }
}

/// Highest week number first, then smallest id. Shorter ids sort first so
/// campaign "2" comes before "10".
fn fallback_track(kind: ChallengeKind, tracks: &[Track]) -> Option<&Track> {
    let category = kind.fallback_map_type();
    tracks
        .iter()
        .filter(|t| t.map_type == category)
        .min_by(|a, b| {
            b.week_number
                .cmp(&a.week_number)
                .then_with(|| a.id.len().cmp(&b.id.len()))
                .then_with(|| a.id.cmp(&b.id))
        })
}
