use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use tracing::error;

use crate::{
    error::AppError,
    models::leaderboard::{
        BulkLeaderboardEntry, BulkLeaderboardError, CampaignLeaderboard, GlobalLeaderboard,
        TrackLeaderboard,
    },
    services::{
        challenge_service::ChallengeService,
        ranking::{self, campaign_track_ids},
        track_service::TrackService,
    },
    store::ScoreStore,
};

pub const MAX_BULK_TRACKS: usize = 20;

pub struct LeaderboardService {
    scores: Arc<dyn ScoreStore>,
    tracks: Arc<TrackService>,
    challenges: Arc<ChallengeService>,
}

impl LeaderboardService {
    pub fn new(
        scores: Arc<dyn ScoreStore>,
        tracks: Arc<TrackService>,
        challenges: Arc<ChallengeService>,
    ) -> Self {
        Self {
            scores,
            tracks,
            challenges,
        }
    }

    /// Ranked scores for one track. `requested_id` may be a challenge slot.
    pub async fn track_leaderboard(&self, requested_id: &str) -> Result<TrackLeaderboard, AppError> {
        let track_id = self.challenges.resolve_track_id(requested_id).await?;
        let track = self.tracks.get(&track_id).await?;
        let scores = self.scores.scores_for_track(&track_id).await?;

        let ranked = ranking::rank_track(scores, &track.thresholds());
        Ok(TrackLeaderboard {
            track_id: requested_id.to_string(),
            total_players: ranked.len(),
            scores: ranked.into_iter().map(Into::into).collect(),
            track: track.into(),
            last_updated: Utc::now().to_rfc3339(),
        })
    }

    /// One entry per requested id, in request order. Unknown ids yield an error
    /// entry instead of failing the whole request.
    pub async fn bulk(&self, track_ids: &str) -> Result<Vec<BulkLeaderboardEntry>, AppError> {
        let ids = parse_track_ids(track_ids)?;

        let boards = join_all(ids.iter().map(|id| self.track_leaderboard(id))).await;

        Ok(ids
            .into_iter()
            .zip(boards)
            .map(|(track_id, result)| match result {
                Ok(board) => BulkLeaderboardEntry::Leaderboard(board),
                Err(AppError::NotFound(_)) => BulkLeaderboardEntry::Failed(BulkLeaderboardError {
                    track_id,
                    error: "Track not found".to_string(),
                }),
                Err(e) => {
                    error!(%track_id, error = %e, "Bulk leaderboard entry failed");
                    BulkLeaderboardEntry::Failed(BulkLeaderboardError {
                        track_id,
                        error: "Failed to load leaderboard".to_string(),
                    })
                }
            })
            .collect())
    }

    pub async fn global(&self) -> Result<GlobalLeaderboard, AppError> {
        let scores = self.scores.all_scores().await?;
        let names = self.tracks.names().await?;
        Ok(ranking::global_leaderboard(scores, &names, Utc::now()))
    }

    pub async fn campaign(&self) -> Result<CampaignLeaderboard, AppError> {
        let ids = campaign_track_ids();
        let scores = self.scores.scores_for_tracks(&ids).await?;
        let names = self.tracks.names().await?;
        Ok(ranking::campaign_leaderboard(scores, &ids, &names, Utc::now()))
    }
}

/// Splits `a,b,c`, dropping blanks. Between one and twenty ids are accepted.
pub fn parse_track_ids(raw: &str) -> Result<Vec<String>, AppError> {
    let ids: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();

    if ids.is_empty() {
        return Err(AppError::Validation(
            "trackIds query parameter is required".to_string(),
        ));
    }
    if ids.len() > MAX_BULK_TRACKS {
        return Err(AppError::Validation(format!(
            "At most {MAX_BULK_TRACKS} track ids can be requested at once"
        )));
    }
    Ok(ids)
}
