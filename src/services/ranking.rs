//! Leaderboard computation. Everything here is pure: callers fetch the rows,
//! these functions order, rank and aggregate them. Nothing is written back.

use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet, HashMap},
};

use chrono::{DateTime, Utc};

use crate::models::{
    challenge::WEEKLY_CHALLENGE_ID,
    leaderboard::{
        CampaignBestTime, CampaignLeaderboard, CampaignRankingEntry, GlobalLeaderboard,
        GlobalRankingEntry, LeaderboardStats, MostActiveEntry, PersonalBest, WeeklyChampionEntry,
    },
    score::{Score, ScoreResponse},
    track::{Medal, MedalThresholds},
};

/// Points for 1st through 5th on a campaign track.
pub const CAMPAIGN_POINTS: [u32; 5] = [10, 7, 5, 3, 1];

const GLOBAL_LIMIT: usize = 10;
const CAMPAIGN_LIMIT: usize = 20;
const BEST_TIMES_LIMIT: usize = 5;
const CAMPAIGN_TRACK_COUNT: u32 = 25;

/// Ids of the tracks that count towards campaign points.
pub fn campaign_track_ids() -> Vec<String> {
    (1..=CAMPAIGN_TRACK_COUNT).map(|n| n.to_string()).collect()
}

/// Weekly tracks are named `w<week>-<map>`; the weekly challenge slot counts too.
pub fn is_weekly_track_id(id: &str) -> bool {
    if id == WEEKLY_CHALLENGE_ID {
        return true;
    }

    let Some((week, map)) = id.strip_prefix('w').and_then(|rest| rest.split_once('-')) else {
        return false;
    };
    let numeric = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    numeric(week) && numeric(map)
}

/// Fastest first; equal times go to the earlier submission, then the lower id.
pub fn leaderboard_order(a: &Score, b: &Score) -> Ordering {
    a.time
        .cmp(&b.time)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.map(|id| id.bytes()).cmp(&b.id.map(|id| id.bytes())))
}

#[derive(Debug, Clone)]
pub struct RankedScore {
    pub score: Score,
    pub position: u32,
    pub medal: Medal,
}

impl From<RankedScore> for ScoreResponse {
    fn from(ranked: RankedScore) -> Self {
        let mut response = ScoreResponse::from(ranked.score);
        response.position = Some(ranked.position);
        response.medal = Some(ranked.medal);
        response
    }
}

/// Orders one track's scores and assigns positions 1..=N and medals.
pub fn rank_track(mut scores: Vec<Score>, thresholds: &MedalThresholds) -> Vec<RankedScore> {
    scores.sort_by(leaderboard_order);
    scores
        .into_iter()
        .enumerate()
        .map(|(index, score)| RankedScore {
            position: index as u32 + 1,
            medal: thresholds.medal_for(score.time),
            score,
        })
        .collect()
}

fn group_by_track(scores: Vec<Score>) -> BTreeMap<String, Vec<Score>> {
    let mut groups: BTreeMap<String, Vec<Score>> = BTreeMap::new();
    for score in scores {
        groups.entry(score.track_id.clone()).or_default().push(score);
    }
    for group in groups.values_mut() {
        group.sort_by(leaderboard_order);
    }
    groups
}

fn track_name(names: &HashMap<String, String>, track_id: &str) -> String {
    names
        .get(track_id)
        .cloned()
        .unwrap_or_else(|| format!("Track {track_id}"))
}

#[derive(Default)]
struct GlobalTally {
    first_place_wins: u32,
    weekly_wins: u32,
    total_times: u32,
    bests: Vec<PersonalBest>,
}

/// Cross-track rankings: first places, weekly wins and activity per player.
pub fn global_leaderboard(
    scores: Vec<Score>,
    track_names: &HashMap<String, String>,
    now: DateTime<Utc>,
) -> GlobalLeaderboard {
    let total_scores = scores.len();
    let groups = group_by_track(scores);
    let mut tallies: HashMap<String, GlobalTally> = HashMap::new();

    for (track_id, group) in &groups {
        let Some(winner) = group.first() else {
            continue;
        };
        let entry = tallies.entry(winner.username.clone()).or_default();
        entry.first_place_wins += 1;
        if is_weekly_track_id(track_id) {
            entry.weekly_wins += 1;
        }

        let name = track_name(track_names, track_id);
        for score in group {
            let entry = tallies.entry(score.username.clone()).or_default();
            entry.total_times += 1;
            entry.bests.push(PersonalBest {
                track_id: track_id.clone(),
                time: score.time,
                track_name: name.clone(),
            });
        }
    }

    let mut global_rankings: Vec<GlobalRankingEntry> = tallies
        .iter()
        .filter(|(_, t)| t.first_place_wins > 0)
        .map(|(username, t)| {
            let mut personal_bests = t.bests.clone();
            personal_bests.sort_by(|a, b| a.time.cmp(&b.time).then_with(|| a.track_id.cmp(&b.track_id)));
            personal_bests.truncate(BEST_TIMES_LIMIT);
            GlobalRankingEntry {
                username: username.clone(),
                first_place_wins: t.first_place_wins,
                weekly_wins: t.weekly_wins,
                total_times: t.total_times,
                personal_bests,
            }
        })
        .collect();
    global_rankings.sort_by(|a, b| {
        b.first_place_wins
            .cmp(&a.first_place_wins)
            .then_with(|| a.username.cmp(&b.username))
    });
    global_rankings.truncate(GLOBAL_LIMIT);

    let mut weekly_champions: Vec<WeeklyChampionEntry> = tallies
        .iter()
        .filter(|(_, t)| t.weekly_wins > 0)
        .map(|(username, t)| WeeklyChampionEntry {
            username: username.clone(),
            weekly_wins: t.weekly_wins,
            first_place_wins: t.first_place_wins,
            total_times: t.total_times,
        })
        .collect();
    weekly_champions.sort_by(|a, b| {
        b.weekly_wins
            .cmp(&a.weekly_wins)
            .then_with(|| a.username.cmp(&b.username))
    });
    weekly_champions.truncate(GLOBAL_LIMIT);

    let mut most_active: Vec<MostActiveEntry> = tallies
        .iter()
        .filter(|(_, t)| t.total_times > 0)
        .map(|(username, t)| MostActiveEntry {
            username: username.clone(),
            total_times: t.total_times,
            first_place_wins: t.first_place_wins,
            weekly_wins: t.weekly_wins,
        })
        .collect();
    most_active.sort_by(|a, b| {
        b.total_times
            .cmp(&a.total_times)
            .then_with(|| a.username.cmp(&b.username))
    });
    most_active.truncate(GLOBAL_LIMIT);

    GlobalLeaderboard {
        global_rankings,
        weekly_champions,
        most_active,
        stats: LeaderboardStats {
            total_players: tallies.len(),
            total_tracks: groups.len(),
            total_scores,
            last_updated: now.to_rfc3339(),
        },
    }
}

#[derive(Default)]
struct CampaignTally {
    points: u32,
    podiums: [u32; 3],
    total_times: u32,
    tracks: BTreeSet<String>,
    best_times: Vec<CampaignBestTime>,
}

/// Fixed-table points for the top five of every campaign track.
pub fn campaign_leaderboard(
    scores: Vec<Score>,
    campaign_ids: &[String],
    track_names: &HashMap<String, String>,
    now: DateTime<Utc>,
) -> CampaignLeaderboard {
    let scores: Vec<Score> = scores
        .into_iter()
        .filter(|s| campaign_ids.contains(&s.track_id))
        .collect();
    let total_scores = scores.len();
    let groups = group_by_track(scores);
    let mut tallies: HashMap<String, CampaignTally> = HashMap::new();

    for (track_id, group) in &groups {
        let name = track_name(track_names, track_id);
        for (index, score) in group.iter().enumerate() {
            let position = index as u32 + 1;
            let entry = tallies.entry(score.username.clone()).or_default();

            if let Some(points) = CAMPAIGN_POINTS.get(index) {
                entry.points += points;
            }
            if let Some(podium) = entry.podiums.get_mut(index) {
                *podium += 1;
            }
            entry.total_times += 1;
            entry.tracks.insert(track_id.clone());
            entry.best_times.push(CampaignBestTime {
                track_id: track_id.clone(),
                time: score.time,
                track_name: name.clone(),
                position,
            });
        }
    }

    let total_players = tallies.len();
    let mut rankings: Vec<CampaignRankingEntry> = tallies
        .into_iter()
        .map(|(username, mut t)| {
            t.best_times
                .sort_by(|a, b| a.time.cmp(&b.time).then_with(|| a.track_id.cmp(&b.track_id)));
            t.best_times.truncate(BEST_TIMES_LIMIT);
            CampaignRankingEntry {
                username,
                points: t.points,
                first_place_wins: t.podiums[0],
                second_place_wins: t.podiums[1],
                third_place_wins: t.podiums[2],
                total_tracks: t.tracks.len() as u32,
                total_times: t.total_times,
                best_times: t.best_times,
            }
        })
        .collect();
    rankings.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then_with(|| b.first_place_wins.cmp(&a.first_place_wins))
            .then_with(|| a.username.cmp(&b.username))
    });
    rankings.truncate(CAMPAIGN_LIMIT);

    CampaignLeaderboard {
        rankings,
        stats: LeaderboardStats {
            total_players,
            total_tracks: groups.len(),
            total_scores,
            last_updated: now.to_rfc3339(),
        },
    }
}

#[cfg(test)]
mod tests {
    use bson::oid::ObjectId;
    use chrono::{Duration, TimeZone};

    use super::*;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0).unwrap() + Duration::seconds(seconds)
    }

    fn score(track: &str, user: &str, time: i64, submitted: i64) -> Score {
        Score {
            id: Some(ObjectId::new()),
            track_id: track.to_string(),
            user_id: ObjectId::new(),
            username: user.to_string(),
            email: format!("{user}@example.com"),
            time,
            is_personal_best: true,
            screenshot: None,
            replay: None,
            created_at: at(submitted),
            updated_at: at(submitted),
        }
    }

    fn thresholds() -> MedalThresholds {
        MedalThresholds::new(45_000, 50_000, 55_000, 60_000)
    }

    #[test]
    fn positions_are_contiguous() {
        let scores = vec![
            score("1", "c", 53_000, 0),
            score("1", "a", 44_000, 1),
            score("1", "d", 71_000, 2),
            score("1", "b", 50_000, 3),
        ];
        let ranked = rank_track(scores, &thresholds());

        let positions: Vec<u32> = ranked.iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![1, 2, 3, 4]);

        let names: Vec<&str> = ranked.iter().map(|r| r.score.username.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);

        let medals: Vec<Medal> = ranked.iter().map(|r| r.medal).collect();
        assert_eq!(medals, vec![Medal::Author, Medal::Gold, Medal::Silver, Medal::None]);
    }

    #[test]
    fn exact_ties_go_to_the_earlier_submission() {
        let late = score("1", "late", 50_000, 30);
        let early = score("1", "early", 50_000, 10);

        let first = rank_track(vec![late.clone(), early.clone()], &thresholds());
        let second = rank_track(vec![early, late], &thresholds());

        for ranked in [&first, &second] {
            assert_eq!(ranked[0].score.username, "early");
            assert_eq!(ranked[0].position, 1);
            assert_eq!(ranked[1].score.username, "late");
            assert_eq!(ranked[1].position, 2);
        }
    }

    #[test]
    fn recomputing_is_idempotent() {
        let scores = vec![
            score("1", "a", 52_000, 0),
            score("1", "b", 52_000, 0),
            score("1", "c", 47_000, 5),
        ];
        let summarize = |ranked: Vec<RankedScore>| -> Vec<(String, u32, Medal)> {
            ranked
                .into_iter()
                .map(|r| (r.score.username, r.position, r.medal))
                .collect()
        };

        let once = summarize(rank_track(scores.clone(), &thresholds()));
        let twice = summarize(rank_track(scores, &thresholds()));
        assert_eq!(once, twice);
    }

    #[test]
    fn weekly_track_ids() {
        assert!(is_weekly_track_id("w33-4"));
        assert!(is_weekly_track_id("w1-10"));
        assert!(is_weekly_track_id("weekly-challenge"));
        assert!(!is_weekly_track_id("12"));
        assert!(!is_weekly_track_id("w33"));
        assert!(!is_weekly_track_id("w-4"));
        assert!(!is_weekly_track_id("wx-4"));
        assert!(!is_weekly_track_id("campaign-challenge"));
    }

    #[test]
    fn global_leaderboard_counts_wins_and_activity() {
        let scores = vec![
            score("1", "alice", 40_000, 0),
            score("1", "bob", 41_000, 0),
            score("2", "bob", 30_000, 0),
            score("2", "carol", 31_000, 0),
            score("w33-1", "alice", 50_000, 0),
            score("w33-2", "alice", 52_000, 0),
            score("w33-2", "carol", 53_000, 0),
        ];
        let names = HashMap::from([("1".to_string(), "Summer 2025 - 01".to_string())]);

        let board = global_leaderboard(scores, &names, at(0));

        let wins: u32 = board.global_rankings.iter().map(|e| e.first_place_wins).sum();
        assert_eq!(wins as usize, board.stats.total_tracks);
        assert_eq!(board.stats.total_tracks, 4);
        assert_eq!(board.stats.total_scores, 7);
        assert_eq!(board.stats.total_players, 3);

        let alice = &board.global_rankings[0];
        assert_eq!(alice.username, "alice");
        assert_eq!(alice.first_place_wins, 3);
        assert_eq!(alice.weekly_wins, 2);
        assert_eq!(alice.total_times, 3);
        assert_eq!(alice.personal_bests[0].track_name, "Summer 2025 - 01");
        assert_eq!(alice.personal_bests[1].track_name, "Track w33-1");

        assert_eq!(board.weekly_champions.len(), 1);
        assert_eq!(board.weekly_champions[0].username, "alice");

        // carol never won a track but still shows up as active
        assert!(board.global_rankings.iter().all(|e| e.username != "carol"));
        let carol = board
            .most_active
            .iter()
            .find(|e| e.username == "carol")
            .unwrap();
        assert_eq!(carol.total_times, 2);
        assert_eq!(carol.first_place_wins, 0);
    }

    #[test]
    fn personal_bests_keep_the_fastest_five() {
        let scores: Vec<Score> = (1..=7)
            .map(|n| score(&n.to_string(), "solo", 60_000 - n * 1_000, 0))
            .collect();

        let board = global_leaderboard(scores, &HashMap::new(), at(0));
        let bests = &board.global_rankings[0].personal_bests;
        assert_eq!(bests.len(), 5);
        assert_eq!(bests[0].time, 53_000);
        assert!(bests.windows(2).all(|w| w[0].time <= w[1].time));
    }

    #[test]
    fn empty_store_gives_empty_boards() {
        let board = global_leaderboard(Vec::new(), &HashMap::new(), at(0));
        assert!(board.global_rankings.is_empty());
        assert_eq!(board.stats.total_tracks, 0);

        let campaign = campaign_leaderboard(Vec::new(), &campaign_track_ids(), &HashMap::new(), at(0));
        assert!(campaign.rankings.is_empty());
    }

    #[test]
    fn campaign_points_go_to_the_top_five_only() {
        let scores: Vec<Score> = (0..7)
            .map(|n| score("3", &format!("p{n}"), 40_000 + n * 500, 0))
            .chain([score("w33-1", "p6", 1_000, 0), score("custom", "p6", 1_000, 0)])
            .collect();

        let board = campaign_leaderboard(scores, &campaign_track_ids(), &HashMap::new(), at(0));

        let total: u32 = board.rankings.iter().map(|e| e.points).sum();
        assert_eq!(total, 26);
        assert_eq!(board.stats.total_tracks, 1);
        assert_eq!(board.stats.total_scores, 7);

        let points: Vec<(String, u32)> = board
            .rankings
            .iter()
            .map(|e| (e.username.clone(), e.points))
            .collect();
        assert_eq!(
            points,
            vec![
                ("p0".to_string(), 10),
                ("p1".to_string(), 7),
                ("p2".to_string(), 5),
                ("p3".to_string(), 3),
                ("p4".to_string(), 1),
                ("p5".to_string(), 0),
                ("p6".to_string(), 0),
            ]
        );

        let p3 = &board.rankings[3];
        assert_eq!((p3.first_place_wins, p3.second_place_wins, p3.third_place_wins), (0, 0, 0));
        let p6 = &board.rankings[6];
        assert_eq!(p6.total_times, 1);
        assert_eq!(p6.best_times[0].position, 7);
    }

    #[test]
    fn campaign_totals_accumulate_across_tracks() {
        let scores = vec![
            score("1", "alice", 40_000, 0),
            score("1", "bob", 41_000, 0),
            score("2", "bob", 30_000, 0),
            score("2", "alice", 31_000, 0),
            score("3", "alice", 20_000, 0),
        ];
        let board = campaign_leaderboard(scores, &campaign_track_ids(), &HashMap::new(), at(0));

        let alice = &board.rankings[0];
        assert_eq!(alice.username, "alice");
        assert_eq!(alice.points, 27);
        assert_eq!(alice.first_place_wins, 2);
        assert_eq!(alice.second_place_wins, 1);
        assert_eq!(alice.total_tracks, 3);
        assert_eq!(alice.total_times, 3);
        assert_eq!(alice.best_times[0].track_id, "3");

        let bob = &board.rankings[1];
        assert_eq!(bob.points, 17);
        assert_eq!(bob.total_tracks, 2);
    }
}
