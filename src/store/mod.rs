//! Persistence seams. Services only see these traits; `mongo` backs them in
//! production and `memory` backs local runs and the test suite.

use async_trait::async_trait;
use bson::oid::ObjectId;

use crate::{
    error::StoreError,
    models::{
        challenge::{ChallengeKind, ChallengeSlot},
        score::{Score, ScoreSubmission, SubmissionOutcome},
        track::Track,
        user::User,
    },
};

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

#[async_trait]
pub trait ScoreStore: Send + Sync {
    async fn scores_for_track(&self, track_id: &str) -> Result<Vec<Score>, StoreError>;

    async fn scores_for_tracks(&self, track_ids: &[String]) -> Result<Vec<Score>, StoreError>;

    async fn all_scores(&self) -> Result<Vec<Score>, StoreError>;

    /// Newest first.
    async fn scores_for_user(&self, user_id: ObjectId) -> Result<Vec<Score>, StoreError>;

    /// Atomically creates the (user, track) row or lowers its time. A candidate
    /// that is not strictly faster leaves the row untouched.
    async fn upsert_if_better(
        &self,
        submission: ScoreSubmission,
    ) -> Result<(SubmissionOutcome, Score), StoreError>;

    async fn delete_for_user(
        &self,
        user_id: ObjectId,
        track_id: &str,
    ) -> Result<Option<Score>, StoreError>;

    async fn count_for_track(&self, track_id: &str) -> Result<u64, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait TrackStore: Send + Sync {
    /// Ordered by id.
    async fn list_tracks(&self) -> Result<Vec<Track>, StoreError>;

    async fn get_track(&self, id: &str) -> Result<Option<Track>, StoreError>;

    /// Fails with `StoreError::Duplicate` if the id is taken.
    async fn insert_track(&self, track: Track) -> Result<(), StoreError>;

    async fn insert_tracks(&self, tracks: Vec<Track>) -> Result<(), StoreError>;

    async fn delete_track(&self, id: &str) -> Result<Option<Track>, StoreError>;

    async fn count_tracks(&self) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, id: ObjectId) -> Result<Option<User>, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn username_or_email_taken(&self, username: &str, email: &str)
        -> Result<bool, StoreError>;

    /// Returns the stored user with its id assigned.
    async fn insert_user(&self, user: User) -> Result<User, StoreError>;

    async fn count_users(&self) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait ChallengeStore: Send + Sync {
    async fn get_slot(&self, kind: ChallengeKind) -> Result<Option<ChallengeSlot>, StoreError>;

    async fn put_slot(&self, slot: ChallengeSlot) -> Result<(), StoreError>;

    async fn clear_slot(&self, kind: ChallengeKind) -> Result<(), StoreError>;
}

/// Anything that can back the whole API.
pub trait Store: ScoreStore + TrackStore + UserStore + ChallengeStore {}

impl<T: ScoreStore + TrackStore + UserStore + ChallengeStore> Store for T {}
