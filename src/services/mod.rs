use std::sync::Arc;

use crate::{
    config::Config,
    store::{ChallengeStore, ScoreStore, Store, TrackStore, UserStore},
};

pub mod challenge_service;
pub mod leaderboard_service;
pub mod ranking;
pub mod score_service;
pub mod track_service;
pub mod user_service;

use challenge_service::ChallengeService;
use leaderboard_service::LeaderboardService;
use score_service::ScoreService;
use track_service::TrackService;
use user_service::UserService;

/// Every service, wired over one store.
#[derive(Clone)]
pub struct AppServices {
    pub users: Arc<UserService>,
    pub tracks: Arc<TrackService>,
    pub challenges: Arc<ChallengeService>,
    pub leaderboards: Arc<LeaderboardService>,
    pub scores: Arc<ScoreService>,
}

impl AppServices {
    pub fn new<S: Store + 'static>(store: Arc<S>, config: Arc<Config>) -> Self {
        let score_store: Arc<dyn ScoreStore> = store.clone();
        let track_store: Arc<dyn TrackStore> = store.clone();
        let user_store: Arc<dyn UserStore> = store.clone();
        let challenge_store: Arc<dyn ChallengeStore> = store;

        let challenges = Arc::new(ChallengeService::new(
            challenge_store,
            track_store.clone(),
            score_store.clone(),
        ));
        let tracks = Arc::new(TrackService::new(track_store, challenges.clone()));
        let users = Arc::new(UserService::new(user_store, score_store.clone(), config));
        let leaderboards = Arc::new(LeaderboardService::new(
            score_store.clone(),
            tracks.clone(),
            challenges.clone(),
        ));
        let scores = Arc::new(ScoreService::new(
            score_store,
            tracks.clone(),
            users.clone(),
            challenges.clone(),
        ));

        Self {
            users,
            tracks,
            challenges,
            leaderboards,
            scores,
        }
    }
}
