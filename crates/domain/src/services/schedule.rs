//! Master schedule generation: 1230 regular-season games, 82 per team.
//!
//! Matchup counts per unordered pair:
//! - same division: 4
//! - same conference, other division: 4 against 3 rotation-selected teams
//!   per opposing division, 3 against the rest
//! - other conference: 2
//!
//! The RNG is seeded from the season year, so a season's schedule is a pure
//! function of its year.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Days, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::ids::season_id_from_year;
use crate::league::{
    self, Conference, MAX_GAMES_PER_DAY, SEASON_LENGTH_DAYS, SEASON_START_DAY, SEASON_START_MONTH,
};
use crate::models::{GamePhase, GameStatus, ScheduledGame};

const DATE_ATTEMPTS: usize = 100;

/// Unordered pairs within a conference that play 4 games despite being in
/// different divisions. For each division pair and team index `i`, the
/// opponents are `B[(i + d) mod 5]` for `d` in `0..3`.
fn four_game_pairs_for_conference(conference: Conference) -> BTreeSet<(String, String)> {
    let mut pairs = BTreeSet::new();
    let divisions = league::conference_divisions(conference);
    for i in 0..divisions.len() {
        for j in (i + 1)..divisions.len() {
            let div_a = &divisions[i];
            let div_b = &divisions[j];
            for (idx, team_a) in div_a.iter().enumerate() {
                for delta in 0..3 {
                    let team_b = div_b[(idx + delta) % div_b.len()];
                    let mut pair = [team_a.to_string(), team_b.to_string()];
                    pair.sort();
                    let [lo, hi] = pair;
                    pairs.insert((lo, hi));
                }
            }
        }
    }
    pairs
}

fn games_for_pair(t1: &str, t2: &str, four_game_pairs: &BTreeSet<(String, String)>) -> u32 {
    let info1 = league::conference_and_division(t1);
    let info2 = league::conference_and_division(t2);
    match (info1, info2) {
        (Some((conf1, div1)), Some((conf2, div2))) => {
            if conf1 != conf2 {
                2
            } else if div1 == div2 {
                4
            } else {
                let mut pair = [t1.to_string(), t2.to_string()];
                pair.sort();
                let [lo, hi] = pair;
                if four_game_pairs.contains(&(lo, hi)) {
                    4
                } else {
                    3
                }
            }
        }
        _ => 2,
    }
}

/// Build the full regular-season schedule for a season starting in
/// `season_year`.
pub fn build_master_schedule(season_year: i32) -> Vec<ScheduledGame> {
    let mut teams = league::all_team_ids();
    teams.sort_unstable();
    let season_id = season_id_from_year(season_year);
    let season_start =
        NaiveDate::from_ymd_opt(season_year, SEASON_START_MONTH, SEASON_START_DAY)
            .expect("valid season start");

    let mut four_game_pairs = four_game_pairs_for_conference(Conference::East);
    four_game_pairs.extend(four_game_pairs_for_conference(Conference::West));

    // 1) Matchup counts and home/away split per pair. On odd counts the
    // extra home game goes to whichever team has fewer accumulated home
    // games, first-listed team on ties.
    let mut pair_games: Vec<(String, String)> = Vec::with_capacity(1230);
    let mut home_counts: BTreeMap<&str, u32> = teams.iter().map(|t| (*t, 0)).collect();

    for i in 0..teams.len() {
        for j in (i + 1)..teams.len() {
            let t1 = teams[i];
            let t2 = teams[j];
            let num_games = games_for_pair(t1, t2, &four_game_pairs);

            let mut home_for_t1 = num_games / 2;
            let mut home_for_t2 = num_games / 2;
            if num_games % 2 == 1 {
                if home_counts[t1] <= home_counts[t2] {
                    home_for_t1 += 1;
                } else {
                    home_for_t2 += 1;
                }
            }

            for _ in 0..home_for_t1 {
                pair_games.push((t1.to_string(), t2.to_string()));
            }
            for _ in 0..home_for_t2 {
                pair_games.push((t2.to_string(), t1.to_string()));
            }

            *home_counts.entry(t1).or_insert(0) += home_for_t1;
            *home_counts.entry(t2).or_insert(0) += home_for_t2;
        }
    }

    // 2) Date assignment: random day in the season window, at most
    // MAX_GAMES_PER_DAY games per day, one game per team per day. After 100
    // misses the caps are waived (rare tail behavior).
    let mut rng = StdRng::seed_from_u64(season_year as u64);
    pair_games.shuffle(&mut rng);

    let mut games_per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    let mut teams_per_day: BTreeMap<NaiveDate, BTreeSet<String>> = BTreeMap::new();
    let mut scheduled: Vec<ScheduledGame> = Vec::with_capacity(pair_games.len());

    for (home_id, away_id) in pair_games {
        let mut assigned_date = None;
        for _ in 0..DATE_ATTEMPTS {
            let day_index = rng.gen_range(0..SEASON_LENGTH_DAYS) as u64;
            let game_date = season_start
                .checked_add_days(Days::new(day_index))
                .expect("date in season window");
            let busy_teams = teams_per_day.entry(game_date).or_default();
            if games_per_day.get(&game_date).copied().unwrap_or(0) >= MAX_GAMES_PER_DAY {
                continue;
            }
            if busy_teams.contains(&home_id) || busy_teams.contains(&away_id) {
                continue;
            }
            assigned_date = Some(game_date);
            break;
        }
        let game_date = assigned_date.unwrap_or_else(|| {
            let day_index = rng.gen_range(0..SEASON_LENGTH_DAYS) as u64;
            season_start
                .checked_add_days(Days::new(day_index))
                .expect("date in season window")
        });

        let busy_teams = teams_per_day.entry(game_date).or_default();
        busy_teams.insert(home_id.clone());
        busy_teams.insert(away_id.clone());
        *games_per_day.entry(game_date).or_insert(0) += 1;

        scheduled.push(ScheduledGame {
            game_id: ScheduledGame::make_game_id(game_date, &home_id, &away_id),
            date: game_date,
            home_team_id: home_id,
            away_team_id: away_id,
            status: GameStatus::Scheduled,
            home_score: None,
            away_score: None,
            season_id: season_id.clone(),
            phase: GamePhase::Regular,
        });
    }

    scheduled
}
