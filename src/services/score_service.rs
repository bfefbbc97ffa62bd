use std::sync::Arc;

use bson::oid::ObjectId;
use chrono::Utc;
use tracing::info;

use crate::{
    error::AppError,
    models::score::{
        Score, ScoreResponse, ScoreSubmission, SubmissionOutcome, SubmitScoreRequest,
        SubmitScoreResponse,
    },
    services::{
        challenge_service::ChallengeService, ranking, track_service::TrackService,
        user_service::UserService,
    },
    store::ScoreStore,
};

pub struct ScoreService {
    scores: Arc<dyn ScoreStore>,
    tracks: Arc<TrackService>,
    users: Arc<UserService>,
    challenges: Arc<ChallengeService>,
}

impl ScoreService {
    pub fn new(
        scores: Arc<dyn ScoreStore>,
        tracks: Arc<TrackService>,
        users: Arc<UserService>,
        challenges: Arc<ChallengeService>,
    ) -> Self {
        Self {
            scores,
            tracks,
            users,
            challenges,
        }
    }

    /// Records a time, keeping only the player's best per track.
    pub async fn submit(
        &self,
        user_id: ObjectId,
        req: SubmitScoreRequest,
    ) -> Result<SubmitScoreResponse, AppError> {
        if req.time <= 0 {
            return Err(AppError::Validation(
                "Time must be a positive number".to_string(),
            ));
        }

        let track_id = self.challenges.resolve_track_id(&req.track_id).await?;
        let track = self.tracks.get(&track_id).await?;
        let user = self.users.get(user_id).await?;

        let (outcome, score) = self
            .scores
            .upsert_if_better(ScoreSubmission {
                track_id,
                user_id,
                username: user.username,
                email: user.email,
                time: req.time,
                screenshot: req.screenshot,
                replay: req.replay,
                submitted_at: Utc::now(),
            })
            .await?;

        match outcome {
            SubmissionOutcome::Created => {
                info!(track_id = %score.track_id, %user_id, time = score.time, "New score recorded")
            }
            SubmissionOutcome::Improved => {
                info!(track_id = %score.track_id, %user_id, time = score.time, "Personal best improved")
            }
            SubmissionOutcome::Unchanged => {
                info!(track_id = %score.track_id, %user_id, submitted = req.time, best = score.time, "Submission not faster than personal best")
            }
        }

        let medal = track.thresholds().medal_for(score.time);
        let mut response = ScoreResponse::from(score);
        response.medal = Some(medal);

        Ok(SubmitScoreResponse {
            score: response,
            outcome,
        })
    }

    /// The caller's scores, newest first.
    pub async fn my_scores(&self, user_id: ObjectId) -> Result<Vec<ScoreResponse>, AppError> {
        let scores = self.scores.scores_for_user(user_id).await?;
        Ok(scores.into_iter().map(ScoreResponse::from).collect())
    }

    pub async fn track_scores(&self, requested_id: &str) -> Result<Vec<ScoreResponse>, AppError> {
        let track_id = self.challenges.resolve_track_id(requested_id).await?;
        let track = self.tracks.get(&track_id).await?;
        let scores = self.scores.scores_for_track(&track_id).await?;
        Ok(ranking::rank_track(scores, &track.thresholds())
            .into_iter()
            .map(Into::into)
            .collect())
    }

    pub async fn delete(&self, user_id: ObjectId, requested_id: &str) -> Result<Score, AppError> {
        let track_id = self.challenges.resolve_track_id(requested_id).await?;
        let removed = self
            .scores
            .delete_for_user(user_id, &track_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Score not found".to_string()))?;

        info!(%track_id, %user_id, "Score deleted");
        Ok(removed)
    }
}
