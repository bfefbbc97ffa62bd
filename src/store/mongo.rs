use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use futures::TryStreamExt;
use mongodb::{
    error::{ErrorKind, WriteFailure},
    options::IndexOptions,
    Collection, Database, IndexModel,
};
use tracing::info;

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

const DUPLICATE_KEY: i32 = 11000;

pub struct MongoStore {
    scores: Collection<Score>,
    tracks: Collection<Track>,
    users: Collection<User>,
    challenges: Collection<ChallengeSlot>,
}

impl MongoStore {
    pub fn new(db: &Database) -> Self {
        Self {
            scores: db.collection("scores"),
            tracks: db.collection("tracks"),
            users: db.collection("users"),
            challenges: db.collection("challenges"),
        }
    }

    /// Creates the indexes the store relies on. The (user_id, track_id) index is
    /// what keeps one row per player per track.
    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        let unique = IndexOptions::builder().unique(true).build();

        self.scores
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "user_id": 1, "track_id": 1 })
                    .options(unique.clone())
                    .build(),
            )
            .await?;
        self.scores
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "track_id": 1, "time": 1, "created_at": 1 })
                    .build(),
            )
            .await?;
        self.users
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "username": 1 })
                    .options(unique.clone())
                    .build(),
            )
            .await?;
        self.users
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "email": 1 })
                    .options(unique)
                    .build(),
            )
            .await?;

        info!("MongoDB indexes ensured");
        Ok(())
    }

    async fn find_scores(&self, filter: Document) -> Result<Vec<Score>, StoreError> {
        let cursor = self
            .scores
            .find(filter)
            .sort(doc! { "time": 1, "created_at": 1, "_id": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY,
        _ => false,
    }
}

#[async_trait]
impl ScoreStore for MongoStore {
    async fn scores_for_track(&self, track_id: &str) -> Result<Vec<Score>, StoreError> {
        self.find_scores(doc! { "track_id": track_id }).await
    }

    async fn scores_for_tracks(&self, track_ids: &[String]) -> Result<Vec<Score>, StoreError> {
        self.find_scores(doc! { "track_id": { "$in": track_ids.to_vec() } })
            .await
    }

    async fn all_scores(&self) -> Result<Vec<Score>, StoreError> {
        self.find_scores(doc! {}).await
    }

    async fn scores_for_user(&self, user_id: ObjectId) -> Result<Vec<Score>, StoreError> {
        let cursor = self
            .scores
            .find(doc! { "user_id": user_id })
            .sort(doc! { "created_at": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn upsert_if_better(
        &self,
        submission: ScoreSubmission,
    ) -> Result<(SubmissionOutcome, Score), StoreError> {
        let key = doc! { "user_id": submission.user_id, "track_id": submission.track_id.as_str() };
        let now = bson::DateTime::from_chrono(submission.submitted_at);

        // Only a strictly slower row matches; an equal or faster one makes the
        // upsert collide with the unique index instead.
        let mut filter = key.clone();
        filter.insert("time", doc! { "$gt": submission.time });

        let mut set = doc! { "time": submission.time, "updated_at": now };
        if let Some(screenshot) = &submission.screenshot {
            set.insert("screenshot", screenshot.as_str());
        }
        if let Some(replay) = &submission.replay {
            set.insert("replay", replay.as_str());
        }
        let update = doc! {
            "$set": set,
            "$setOnInsert": {
                "username": submission.username.as_str(),
                "email": submission.email.as_str(),
                "is_personal_best": true,
                "created_at": now,
            },
        };

        let outcome = match self.scores.update_one(filter, update).upsert(true).await {
            Ok(result) if result.upserted_id.is_some() => SubmissionOutcome::Created,
            Ok(_) => SubmissionOutcome::Improved,
            Err(e) if is_duplicate_key(&e) => SubmissionOutcome::Unchanged,
            Err(e) => return Err(e.into()),
        };

        let score = self
            .scores
            .find_one(key)
            .await?
            .ok_or(StoreError::Inconsistent("score submission"))?;

        Ok((outcome, score))
    }

    async fn delete_for_user(
        &self,
        user_id: ObjectId,
        track_id: &str,
    ) -> Result<Option<Score>, StoreError> {
        Ok(self
            .scores
            .find_one_and_delete(doc! { "user_id": user_id, "track_id": track_id })
            .await?)
    }

    async fn count_for_track(&self, track_id: &str) -> Result<u64, StoreError> {
        Ok(self
            .scores
            .count_documents(doc! { "track_id": track_id })
            .await?)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.scores.count_documents(doc! {}).await?)
    }
}

#[async_trait]
impl TrackStore for MongoStore {
    async fn list_tracks(&self) -> Result<Vec<Track>, StoreError> {
        let cursor = self.tracks.find(doc! {}).sort(doc! { "_id": 1 }).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn get_track(&self, id: &str) -> Result<Option<Track>, StoreError> {
        Ok(self.tracks.find_one(doc! { "_id": id }).await?)
    }

    async fn insert_track(&self, track: Track) -> Result<(), StoreError> {
        let id = track.id.clone();
        match self.tracks.insert_one(track).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(StoreError::Duplicate(format!("track {id}"))),
            Err(e) => Err(e.into()),
        }
    }

    async fn insert_tracks(&self, tracks: Vec<Track>) -> Result<(), StoreError> {
        if tracks.is_empty() {
            return Ok(());
        }
        self.tracks.insert_many(tracks).await?;
        Ok(())
    }

    async fn delete_track(&self, id: &str) -> Result<Option<Track>, StoreError> {
        Ok(self.tracks.find_one_and_delete(doc! { "_id": id }).await?)
    }

    async fn count_tracks(&self) -> Result<u64, StoreError> {
        Ok(self.tracks.count_documents(doc! {}).await?)
    }
}

#[async_trait]
impl UserStore for MongoStore {
    async fn find_user(&self, id: ObjectId) -> Result<Option<User>, StoreError> {
        Ok(self.users.find_one(doc! { "_id": id }).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.find_one(doc! { "email": email }).await?)
    }

    async fn username_or_email_taken(
        &self,
        username: &str,
        email: &str,
    ) -> Result<bool, StoreError> {
        let existing = self
            .users
            .find_one(doc! { "$or": [ { "username": username }, { "email": email } ] })
            .await?;
        Ok(existing.is_some())
    }

    async fn insert_user(&self, mut user: User) -> Result<User, StoreError> {
        let username = user.username.clone();
        match self.users.insert_one(&user).await {
            Ok(result) => {
                user.id = result.inserted_id.as_object_id();
                Ok(user)
            }
            Err(e) if is_duplicate_key(&e) => Err(StoreError::Duplicate(format!("user {username}"))),
            Err(e) => Err(e.into()),
        }
    }

    async fn count_users(&self) -> Result<u64, StoreError> {
        Ok(self.users.count_documents(doc! {}).await?)
    }
}

#[async_trait]
impl ChallengeStore for MongoStore {
    async fn get_slot(&self, kind: ChallengeKind) -> Result<Option<ChallengeSlot>, StoreError> {
        Ok(self
            .challenges
            .find_one(doc! { "_id": kind.slot_id() })
            .await?)
    }

    async fn put_slot(&self, slot: ChallengeSlot) -> Result<(), StoreError> {
        let id = slot.slot.clone();
        self.challenges
            .replace_one(doc! { "_id": id }, slot)
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn clear_slot(&self, kind: ChallengeKind) -> Result<(), StoreError> {
        self.challenges
            .delete_one(doc! { "_id": kind.slot_id() })
            .await?;
        Ok(())
    }
}
