use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use bson::oid::ObjectId;
use tokio::sync::Mutex;

use super::{ChallengeStore, ScoreStore, TrackStore, UserStore};
use crate::{
    error::StoreError,
    models::{
        challenge::{ChallengeKind, ChallengeSlot},
        score::{Score, ScoreSubmission, SubmissionOutcome},
        track::Track,
        user::User,
    },
};

/// Process-local store. Each collection sits behind one lock, which makes the
/// score upsert atomic the same way the unique index does in Mongo.
#[derive(Default)]
pub struct MemoryStore {
    scores: Mutex<Vec<Score>>,
    tracks: Mutex<BTreeMap<String, Track>>,
    users: Mutex<Vec<User>>,
    challenges: Mutex<HashMap<String, ChallengeSlot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScoreStore for MemoryStore {
    async fn scores_for_track(&self, track_id: &str) -> Result<Vec<Score>, StoreError> {
        let scores = self.scores.lock().await;
        Ok(scores
            .iter()
            .filter(|s| s.track_id == track_id)
            .cloned()
            .collect())
    }

    async fn scores_for_tracks(&self, track_ids: &[String]) -> Result<Vec<Score>, StoreError> {
        let scores = self.scores.lock().await;
        Ok(scores
            .iter()
            .filter(|s| track_ids.contains(&s.track_id))
            .cloned()
            .collect())
    }

    async fn all_scores(&self) -> Result<Vec<Score>, StoreError> {
        Ok(self.scores.lock().await.clone())
    }

    async fn scores_for_user(&self, user_id: ObjectId) -> Result<Vec<Score>, StoreError> {
        let scores = self.scores.lock().await;
        let mut mine: Vec<Score> = scores
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(mine)
    }

    async fn upsert_if_better(
        &self,
        submission: ScoreSubmission,
    ) -> Result<(SubmissionOutcome, Score), StoreError> {
        let mut scores = self.scores.lock().await;

        let existing = scores
            .iter_mut()
            .find(|s| s.user_id == submission.user_id && s.track_id == submission.track_id);

        match existing {
            Some(score) if submission.time < score.time => {
                score.time = submission.time;
                score.updated_at = submission.submitted_at;
                if submission.screenshot.is_some() {
                    score.screenshot = submission.screenshot;
                }
                if submission.replay.is_some() {
                    score.replay = submission.replay;
                }
                Ok((SubmissionOutcome::Improved, score.clone()))
            }
            Some(score) => Ok((SubmissionOutcome::Unchanged, score.clone())),
            None => {
                let score = Score {
                    id: Some(ObjectId::new()),
                    track_id: submission.track_id,
                    user_id: submission.user_id,
                    username: submission.username,
                    email: submission.email,
                    time: submission.time,
                    is_personal_best: true,
                    screenshot: submission.screenshot,
                    replay: submission.replay,
                    created_at: submission.submitted_at,
                    updated_at: submission.submitted_at,
                };
                scores.push(score.clone());
                Ok((SubmissionOutcome::Created, score))
            }
        }
    }

    async fn delete_for_user(
        &self,
        user_id: ObjectId,
        track_id: &str,
    ) -> Result<Option<Score>, StoreError> {
        let mut scores = self.scores.lock().await;
        let position = scores
            .iter()
            .position(|s| s.user_id == user_id && s.track_id == track_id);
        Ok(position.map(|i| scores.remove(i)))
    }

    async fn count_for_track(&self, track_id: &str) -> Result<u64, StoreError> {
        let scores = self.scores.lock().await;
        Ok(scores.iter().filter(|s| s.track_id == track_id).count() as u64)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.scores.lock().await.len() as u64)
    }
}

#[async_trait]
impl TrackStore for MemoryStore {
    async fn list_tracks(&self) -> Result<Vec<Track>, StoreError> {
        Ok(self.tracks.lock().await.values().cloned().collect())
    }

    async fn get_track(&self, id: &str) -> Result<Option<Track>, StoreError> {
        Ok(self.tracks.lock().await.get(id).cloned())
    }

    async fn insert_track(&self, track: Track) -> Result<(), StoreError> {
        let mut tracks = self.tracks.lock().await;
        if tracks.contains_key(&track.id) {
            return Err(StoreError::Duplicate(format!("track {}", track.id)));
        }
        tracks.insert(track.id.clone(), track);
        Ok(())
    }

    async fn insert_tracks(&self, batch: Vec<Track>) -> Result<(), StoreError> {
        let mut tracks = self.tracks.lock().await;
        if let Some(dup) = batch.iter().find(|t| tracks.contains_key(&t.id)) {
            return Err(StoreError::Duplicate(format!("track {}", dup.id)));
        }
        for track in batch {
            tracks.insert(track.id.clone(), track);
        }
        Ok(())
    }

    async fn delete_track(&self, id: &str) -> Result<Option<Track>, StoreError> {
        Ok(self.tracks.lock().await.remove(id))
    }

    async fn count_tracks(&self) -> Result<u64, StoreError> {
        Ok(self.tracks.lock().await.len() as u64)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, id: ObjectId) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.id == Some(id)).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn username_or_email_taken(
        &self,
        username: &str,
        email: &str,
    ) -> Result<bool, StoreError> {
        let users = self.users.lock().await;
        Ok(users
            .iter()
            .any(|u| u.username == username || u.email == email))
    }

    async fn insert_user(&self, mut user: User) -> Result<User, StoreError> {
        let mut users = self.users.lock().await;
        if users
            .iter()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(StoreError::Duplicate(format!("user {}", user.username)));
        }
        user.id.get_or_insert_with(ObjectId::new);
        users.push(user.clone());
        Ok(user)
    }

    async fn count_users(&self) -> Result<u64, StoreError> {
        Ok(self.users.lock().await.len() as u64)
    }
}

#[async_trait]
impl ChallengeStore for MemoryStore {
    async fn get_slot(&self, kind: ChallengeKind) -> Result<Option<ChallengeSlot>, StoreError> {
        Ok(self.challenges.lock().await.get(kind.slot_id()).cloned())
    }

    async fn put_slot(&self, slot: ChallengeSlot) -> Result<(), StoreError> {
        self.challenges
            .lock()
            .await
            .insert(slot.slot.clone(), slot);
        Ok(())
    }

    async fn clear_slot(&self, kind: ChallengeKind) -> Result<(), StoreError> {
        self.challenges.lock().await.remove(kind.slot_id());
        Ok(())
    }
}
