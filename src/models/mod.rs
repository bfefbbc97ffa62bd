pub mod challenge;
pub mod leaderboard;
pub mod response;
pub mod score;
pub mod track;
pub mod user;
