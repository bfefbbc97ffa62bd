use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// DB model (internal, used for Mongo)
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Track {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub author: Option<String>,
    pub map_type: MapType,
    pub difficulty: Difficulty,
    pub author_time: Option<i64>,
    pub gold_time: Option<i64>,
    pub silver_time: Option<i64>,
    pub bronze_time: Option<i64>,
    #[serde(default)]
    pub week_number: Option<u32>,
    pub is_active: bool,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, ToSchema)]
pub enum MapType {
    Campaign,
    Weekly,
    Custom,
    #[serde(rename = "Weekly Challenge")]
    WeeklyChallenge,
    #[serde(rename = "Campaign Challenge")]
    CampaignChallenge,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, ToSchema)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

/// Medal tiers, best first.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, ToSchema)]
pub enum Medal {
    Author,
    Gold,
    Silver,
    Bronze,
    None,
}

impl Track {
    pub fn thresholds(&self) -> MedalThresholds {
        MedalThresholds {
            author_time: self.author_time,
            gold_time: self.gold_time,
            silver_time: self.silver_time,
            bronze_time: self.bronze_time,
        }
    }
}

/// Target times in milliseconds. An unset tier can't be earned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MedalThresholds {
    pub author_time: Option<i64>,
    pub gold_time: Option<i64>,
    pub silver_time: Option<i64>,
    pub bronze_time: Option<i64>,
}

impl MedalThresholds {
    pub fn new(author: i64, gold: i64, silver: i64, bronze: i64) -> Self {
        Self {
            author_time: Some(author),
            gold_time: Some(gold),
            silver_time: Some(silver),
            bronze_time: Some(bronze),
        }
    }

    pub fn medal_for(&self, time: i64) -> Medal {
        let tiers = [
            (self.author_time, Medal::Author),
            (self.gold_time, Medal::Gold),
            (self.silver_time, Medal::Silver),
            (self.bronze_time, Medal::Bronze),
        ];

        tiers
            .into_iter()
            .find_map(|(limit, medal)| match limit {
                Some(limit) if time <= limit => Some(medal),
                _ => None,
            })
            .unwrap_or(Medal::None)
    }
}

/// Request DTO (client → server)
#[derive(Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTrackRequest {
    #[validate(length(min = 1, max = 64))]
    pub id: String,
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    pub author: Option<String>,
    pub map_type: MapType,
    pub difficulty: Difficulty,
    #[validate(range(min = 1))]
    pub author_time: Option<i64>,
    #[validate(range(min = 1))]
    pub gold_time: Option<i64>,
    #[validate(range(min = 1))]
    pub silver_time: Option<i64>,
    #[validate(range(min = 1))]
    pub bronze_time: Option<i64>,
    pub week_number: Option<u32>,
    pub is_active: Option<bool>,
}

impl CreateTrackRequest {
    pub fn into_track(self, now: DateTime<Utc>) -> Track {
        Track {
            id: self.id,
            name: self.name,
            author: self.author,
            map_type: self.map_type,
            difficulty: self.difficulty,
            author_time: self.author_time,
            gold_time: self.gold_time,
            silver_time: self.silver_time,
            bronze_time: self.bronze_time,
            week_number: self.week_number,
            is_active: self.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Response DTO (server → client)
#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackResponse {
    pub id: String,
    pub name: String,
    pub author: Option<String>,
    pub map_type: MapType,
    pub difficulty: Difficulty,
    pub author_time: Option<i64>,
    pub gold_time: Option<i64>,
    pub silver_time: Option<i64>,
    pub bronze_time: Option<i64>,
    pub week_number: Option<u32>,
    pub is_active: bool,
    pub created_at: String, // RFC3339 string
    pub updated_at: String, // RFC3339 string
}

impl From<Track> for TrackResponse {
    fn from(t: Track) -> Self {
        TrackResponse {
            id: t.id,
            name: t.name,
            author: t.author,
            map_type: t.map_type,
            difficulty: t.difficulty,
            author_time: t.author_time,
            gold_time: t.gold_time,
            silver_time: t.silver_time,
            bronze_time: t.bronze_time,
            week_number: t.week_number,
            is_active: t.is_active,
            created_at: t.created_at.to_rfc3339(),
            updated_at: t.updated_at.to_rfc3339(),
        }
    }
}
