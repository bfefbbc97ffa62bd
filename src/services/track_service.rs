use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, TimeZone, Utc};
use tracing::{error, info, warn};

use crate::{
    error::{AppError, StoreError},
    models::{
        challenge::{CAMPAIGN_CHALLENGE_ID, WEEKLY_CHALLENGE_ID},
        track::{CreateTrackRequest, Difficulty, MapType, Track},
    },
    services::challenge_service::ChallengeService,
    store::TrackStore,
};

/// Path segments under `/tracks` that shadow a track id.
const RESERVED_TRACK_IDS: [&str; 6] = [
    "week",
    WEEKLY_CHALLENGE_ID,
    CAMPAIGN_CHALLENGE_ID,
    "global-leaderboard",
    "campaign-leaderboard",
    "bulk-leaderboards",
];

pub struct TrackService {
    tracks: Arc<dyn TrackStore>,
    challenges: Arc<ChallengeService>,
}

#[derive(Debug, Default)]
pub struct TrackFilter {
    pub map_type: Option<MapType>,
    pub is_active: Option<bool>,
}

impl TrackService {
    pub fn new(tracks: Arc<dyn TrackStore>, challenges: Arc<ChallengeService>) -> Self {
        Self { tracks, challenges }
    }

    pub async fn list(&self, filter: TrackFilter) -> Result<Vec<Track>, AppError> {
        let tracks = self.tracks.list_tracks().await?;
        Ok(tracks
            .into_iter()
            .filter(|t| filter.map_type.map_or(true, |m| t.map_type == m))
            .filter(|t| filter.is_active.map_or(true, |a| t.is_active == a))
            .collect())
    }

    pub async fn get(&self, id: &str) -> Result<Track, AppError> {
        self.tracks
            .get_track(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Track not found".to_string()))
    }

    pub async fn for_week(&self, week: u32) -> Result<Vec<Track>, AppError> {
        let tracks = self
            .list(TrackFilter {
                map_type: Some(MapType::Weekly),
                is_active: None,
            })
            .await?;
        let week_tracks: Vec<Track> = tracks
            .into_iter()
            .filter(|t| t.week_number == Some(week))
            .collect();

        if week_tracks.is_empty() {
            return Err(AppError::NotFound(format!("No tracks found for week {week}")));
        }
        Ok(week_tracks)
    }

    /// Track id → display name, for labelling aggregated results.
    pub async fn names(&self) -> Result<HashMap<String, String>, AppError> {
        let tracks = self.tracks.list_tracks().await?;
        Ok(tracks.into_iter().map(|t| (t.id, t.name)).collect())
    }

    pub async fn create(&self, req: CreateTrackRequest) -> Result<Track, AppError> {
        if RESERVED_TRACK_IDS.contains(&req.id.as_str()) {
            return Err(AppError::Validation(format!(
                "Track id {} is reserved",
                req.id
            )));
        }
        let track = req.into_track(Utc::now());
        match self.tracks.insert_track(track.clone()).await {
            Ok(()) => {
                info!(track_id = %track.id, name = %track.name, "Track created");
                Ok(track)
            }
            Err(StoreError::Duplicate(_)) => Err(AppError::Conflict(format!(
                "Track with id {} already exists",
                track.id
            ))),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete(&self, id: &str) -> Result<Track, AppError> {
        let removed = self
            .tracks
            .delete_track(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Track not found".to_string()))?;

        info!(track_id = %removed.id, "Track deleted");
        // the delete is already committed
        if let Err(e) = self.challenges.handle_track_removed(&removed.id).await {
            error!(track_id = %removed.id, error = %e, "Challenge fallback failed after track deletion");
        }
        Ok(removed)
    }

    /// Inserts the built-in catalog into an empty track collection.
    pub async fn seed_if_empty(&self) -> Result<usize, AppError> {
        if self.tracks.count_tracks().await? > 0 {
            return Ok(0);
        }
        let catalog = default_catalog();
        let count = catalog.len();
        self.tracks.insert_tracks(catalog).await?;
        info!(count, "Seeded track catalog");
        Ok(count)
    }
}

type CatalogRow = (Difficulty, [i64; 4]);

const SUMMER_2025: [CatalogRow; 25] = [
    (Difficulty::Beginner, [42_000, 45_000, 50_000, 60_000]),
    (Difficulty::Beginner, [38_000, 42_000, 48_000, 58_000]),
    (Difficulty::Beginner, [35_000, 40_000, 46_000, 55_000]),
    (Difficulty::Beginner, [32_000, 38_000, 44_000, 52_000]),
    (Difficulty::Beginner, [28_000, 35_000, 42_000, 50_000]),
    (Difficulty::Intermediate, [45_000, 50_000, 58_000, 70_000]),
    (Difficulty::Intermediate, [52_000, 58_000, 68_000, 82_000]),
    (Difficulty::Intermediate, [48_000, 55_000, 65_000, 78_000]),
    (Difficulty::Intermediate, [55_000, 62_000, 72_000, 85_000]),
    (Difficulty::Intermediate, [42_000, 48_000, 56_000, 68_000]),
    (Difficulty::Intermediate, [58_000, 65_000, 75_000, 88_000]),
    (Difficulty::Intermediate, [50_000, 57_000, 67_000, 80_000]),
    (Difficulty::Intermediate, [47_000, 54_000, 64_000, 77_000]),
    (Difficulty::Intermediate, [53_000, 60_000, 70_000, 83_000]),
    (Difficulty::Intermediate, [46_000, 53_000, 63_000, 76_000]),
    (Difficulty::Advanced, [62_000, 70_000, 82_000, 95_000]),
    (Difficulty::Advanced, [68_000, 76_000, 88_000, 102_000]),
    (Difficulty::Advanced, [55_000, 63_000, 75_000, 88_000]),
    (Difficulty::Advanced, [72_000, 80_000, 92_000, 105_000]),
    (Difficulty::Advanced, [65_000, 73_000, 85_000, 98_000]),
    (Difficulty::Advanced, [59_000, 67_000, 79_000, 92_000]),
    (Difficulty::Advanced, [75_000, 83_000, 95_000, 108_000]),
    (Difficulty::Advanced, [63_000, 71_000, 83_000, 96_000]),
    (Difficulty::Advanced, [67_000, 75_000, 87_000, 100_000]),
    (Difficulty::Advanced, [70_000, 78_000, 90_000, 103_000]),
];

const WEEK_32: [CatalogRow; 5] = [
    (Difficulty::Intermediate, [45_000, 50_000, 58_000, 70_000]),
    (Difficulty::Intermediate, [52_000, 58_000, 68_000, 82_000]),
    (Difficulty::Advanced, [48_000, 55_000, 65_000, 78_000]),
    (Difficulty::Advanced, [55_000, 62_000, 72_000, 85_000]),
    (Difficulty::Expert, [42_000, 48_000, 56_000, 68_000]),
];

const WEEK_33: [CatalogRow; 5] = [
    (Difficulty::Intermediate, [46_000, 52_000, 60_000, 72_000]),
    (Difficulty::Intermediate, [53_000, 59_000, 69_000, 83_000]),
    (Difficulty::Advanced, [49_000, 56_000, 66_000, 79_000]),
    (Difficulty::Advanced, [56_000, 63_000, 73_000, 86_000]),
    (Difficulty::Expert, [43_000, 49_000, 57_000, 69_000]),
];

fn catalog_track(
    id: String,
    name: String,
    map_type: MapType,
    week_number: Option<u32>,
    (difficulty, [author, gold, silver, bronze]): CatalogRow,
    created_at: DateTime<Utc>,
) -> Track {
    Track {
        id,
        name,
        author: Some("Nadeo".to_string()),
        map_type,
        difficulty,
        author_time: Some(author),
        gold_time: Some(gold),
        silver_time: Some(silver),
        bronze_time: Some(bronze),
        week_number,
        is_active: true,
        created_at,
        updated_at: created_at,
    }
}

/// Summer 2025 campaign plus the week 32 and 33 weekly maps.
pub fn default_catalog() -> Vec<Track> {
    let campaign_start = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).single().unwrap_or_else(|| {
        warn!("catalog start date is ambiguous, using now");
        Utc::now()
    });

    let mut tracks: Vec<Track> = SUMMER_2025
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let n = i + 1;
            catalog_track(
                n.to_string(),
                format!("Summer 2025 - {n:02}"),
                MapType::Campaign,
                None,
                *row,
                campaign_start,
            )
        })
        .collect();

    for (week, rows, published) in [(32u32, WEEK_32, (2025, 8, 1)), (33u32, WEEK_33, (2025, 8, 8))] {
        let (y, m, d) = published;
        let created_at = Utc
            .with_ymd_and_hms(y, m, d, 0, 0, 0)
            .single()
            .unwrap_or(campaign_start);
        tracks.extend(rows.iter().enumerate().map(|(i, row)| {
            let n = i + 1;
            catalog_track(
                format!("w{week}-{n}"),
                format!("Weekly {week} - {n:02}"),
                MapType::Weekly,
                Some(week),
                *row,
                created_at,
            )
        }));
    }

    tracks
}
