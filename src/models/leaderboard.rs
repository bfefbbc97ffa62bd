use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{score::ScoreResponse, track::TrackResponse};

#[derive(Serialize, Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackLeaderboard {
    /// The id as requested, virtual challenge ids included.
    pub track_id: String,
    pub track: TrackResponse,
    pub scores: Vec<ScoreResponse>,
    pub total_players: usize,
    pub last_updated: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonalBest {
    pub track_id: String,
    pub time: i64,
    pub track_name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GlobalRankingEntry {
    pub username: String,
    pub first_place_wins: u32,
    pub weekly_wins: u32,
    pub total_times: u32,
    pub personal_bests: Vec<PersonalBest>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyChampionEntry {
    pub username: String,
    pub weekly_wins: u32,
    pub first_place_wins: u32,
    pub total_times: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MostActiveEntry {
    pub username: String,
    pub total_times: u32,
    pub first_place_wins: u32,
    pub weekly_wins: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardStats {
    pub total_players: usize,
    pub total_tracks: usize,
    pub total_scores: usize,
    pub last_updated: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GlobalLeaderboard {
    pub global_rankings: Vec<GlobalRankingEntry>,
    pub weekly_champions: Vec<WeeklyChampionEntry>,
    pub most_active: Vec<MostActiveEntry>,
    pub stats: LeaderboardStats,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampaignBestTime {
    pub track_id: String,
    pub time: i64,
    pub track_name: String,
    pub position: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRankingEntry {
    pub username: String,
    pub points: u32,
    pub first_place_wins: u32,
    pub second_place_wins: u32,
    pub third_place_wins: u32,
    pub total_tracks: u32,
    pub total_times: u32,
    pub best_times: Vec<CampaignBestTime>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampaignLeaderboard {
    pub rankings: Vec<CampaignRankingEntry>,
    pub stats: LeaderboardStats,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkLeaderboardError {
    pub track_id: String,
    pub error: String,
}

/// One slot of a bulk response; failures are reported per id.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
#[serde(untagged)]
pub enum BulkLeaderboardEntry {
    Leaderboard(TrackLeaderboard),
    Failed(BulkLeaderboardError),
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkLeaderboardQuery {
    #[serde(default)]
    pub track_ids: String,
}
