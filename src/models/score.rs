use bson::{oid::ObjectId, serde_helpers::chrono_datetime_as_bson_datetime};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::track::Medal;

/// A player's best time on one track. Position and medal are derived on read.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Score {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub track_id: String,
    pub user_id: ObjectId,
    pub username: String,
    pub email: String,
    pub time: i64,
    pub is_personal_best: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replay: Option<String>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

/// Everything the store needs to apply one submission.
#[derive(Debug, Clone)]
pub struct ScoreSubmission {
    pub track_id: String,
    pub user_id: ObjectId,
    pub username: String,
    pub email: String,
    pub time: i64,
    pub screenshot: Option<String>,
    pub replay: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionOutcome {
    Created,
    Improved,
    Unchanged,
}

#[derive(Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitScoreRequest {
    #[validate(length(min = 1, message = "Track ID is required"))]
    pub track_id: String,
    #[validate(range(min = 1, message = "Time must be a positive number"))]
    pub time: i64,
    pub screenshot: Option<String>,
    pub replay: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResponse {
    pub id: Option<String>,
    pub track_id: String,
    pub user_id: String,
    pub username: String,
    pub time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medal: Option<Medal>,
    pub is_personal_best: bool,
    pub screenshot: Option<String>,
    pub replay: Option<String>,
    pub created_at: String, // RFC3339 string
    pub updated_at: String, // RFC3339 string
}

impl From<Score> for ScoreResponse {
    fn from(s: Score) -> Self {
        ScoreResponse {
            id: s.id.map(|oid| oid.to_hex()),
            track_id: s.track_id,
            user_id: s.user_id.to_hex(),
            username: s.username,
            time: s.time,
            position: None,
            medal: None,
            is_personal_best: s.is_personal_best,
            screenshot: s.screenshot,
            replay: s.replay,
            created_at: s.created_at.to_rfc3339(),
            updated_at: s.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct SubmitScoreResponse {
    pub score: ScoreResponse,
    pub outcome: SubmissionOutcome,
}
