use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::track::{Difficulty, MapType, MedalThresholds, Track};

pub const WEEKLY_CHALLENGE_ID: &str = "weekly-challenge";
pub const CAMPAIGN_CHALLENGE_ID: &str = "campaign-challenge";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChallengeKind {
    Weekly,
    Campaign,
}

impl ChallengeKind {
    pub const ALL: [ChallengeKind; 2] = [ChallengeKind::Weekly, ChallengeKind::Campaign];

    /// Maps a virtual track id to its slot, if it is one.
    pub fn from_virtual_id(id: &str) -> Option<Self> {
        match id {
            WEEKLY_CHALLENGE_ID => Some(ChallengeKind::Weekly),
            CAMPAIGN_CHALLENGE_ID => Some(ChallengeKind::Campaign),
            _ => None,
        }
    }

    pub fn slot_id(self) -> &'static str {
        match self {
            ChallengeKind::Weekly => WEEKLY_CHALLENGE_ID,
            ChallengeKind::Campaign => CAMPAIGN_CHALLENGE_ID,
        }
    }

    /// Track pointed at before any admin assignment.
    pub fn default_track_id(self) -> &'static str {
        match self {
            ChallengeKind::Weekly => "w33-4",
            ChallengeKind::Campaign => "1",
        }
    }

    /// Category searched when the pointed-at track disappears.
    pub fn fallback_map_type(self) -> MapType {
        match self {
            ChallengeKind::Weekly => MapType::Weekly,
            ChallengeKind::Campaign => MapType::Campaign,
        }
    }

    pub fn display_map_type(self) -> MapType {
        match self {
            ChallengeKind::Weekly => MapType::WeeklyChallenge,
            ChallengeKind::Campaign => MapType::CampaignChallenge,
        }
    }
}

/// Persisted rotation pointer, one document per slot.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ChallengeSlot {
    #[serde(rename = "_id")]
    pub slot: String,
    pub kind: ChallengeKind,
    pub track_id: String,
    pub name: String,
    pub difficulty: Difficulty,
    pub author_time: Option<i64>,
    pub gold_time: Option<i64>,
    pub silver_time: Option<i64>,
    pub bronze_time: Option<i64>,
    #[serde(default)]
    pub week_number: Option<u32>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub assigned_at: DateTime<Utc>,
}

impl ChallengeSlot {
    pub fn pointing_at(kind: ChallengeKind, track: &Track, assigned_at: DateTime<Utc>) -> Self {
        let MedalThresholds {
            author_time,
            gold_time,
            silver_time,
            bronze_time,
        } = track.thresholds();

        ChallengeSlot {
            slot: kind.slot_id().to_string(),
            kind,
            track_id: track.id.clone(),
            name: track.name.clone(),
            difficulty: track.difficulty,
            author_time,
            gold_time,
            silver_time,
            bronze_time,
            week_number: track.week_number,
            assigned_at,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeTrackResponse {
    pub id: String,
    pub name: String,
    pub difficulty: Difficulty,
    pub map_type: MapType,
    pub author_time: Option<i64>,
    pub gold_time: Option<i64>,
    pub silver_time: Option<i64>,
    pub bronze_time: Option<i64>,
    pub week_number: Option<u32>,
    pub assigned_at: String,
}

impl From<ChallengeSlot> for ChallengeTrackResponse {
    fn from(s: ChallengeSlot) -> Self {
        ChallengeTrackResponse {
            id: s.track_id,
            name: s.name,
            difficulty: s.difficulty,
            map_type: s.kind.display_map_type(),
            author_time: s.author_time,
            gold_time: s.gold_time,
            silver_time: s.silver_time,
            bronze_time: s.bronze_time,
            week_number: s.week_number,
            assigned_at: s.assigned_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResponse {
    pub track: ChallengeTrackResponse,
    pub participant_count: u64,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChallengeRequest {
    #[serde(default)]
    pub track_id: String,
}
