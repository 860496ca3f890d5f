//! Shared harness for engine integration tests: an in-memory league with a
//! small seeded roster.

use chrono::NaiveDate;
use db::store::{meta, players, roster};
use db::LeagueRepo;
use domain::errors::{DomainError, TradeCode, TradeError};
use domain::models::{parse_deal, Deal, Player};
use engine::LeagueContext;
use serde_json::{json, Value};

pub const DEFAULT_DATE: (i32, u32, u32) = (2026, 1, 15);

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub async fn league() -> LeagueContext {
    let repo = LeagueRepo::open_in_memory().await.unwrap();
    repo.init_db().await.unwrap();
    let (y, m, d) = DEFAULT_DATE;
    LeagueContext::new(repo, date(y, m, d))
}

/// Seed players and roster rows: `(player_id, team_id, salary)`.
pub async fn seed_roster(ctx: &LeagueContext, rows: &[(&str, &str, i64)]) {
    let mut tx = ctx.repo.begin_write().await.unwrap();
    let player_list: Vec<Player> = rows
        .iter()
        .map(|(pid, _, _)| Player {
            player_id: pid.to_string(),
            name: Some(format!("Player {pid}")),
            pos: Some("SF".to_string()),
            age: Some(25),
            height_in: Some(79),
            weight_lb: Some(215),
            ovr: Some(80),
            attrs: Default::default(),
        })
        .collect();
    players::upsert_players(&mut tx, &player_list).await.unwrap();
    let roster_rows: Vec<roster::RosterUpsert> = rows
        .iter()
        .map(|(pid, team, salary)| roster::RosterUpsert {
            player_id: pid.to_string(),
            team_id: team.to_string(),
            salary_amount: Some(*salary),
        })
        .collect();
    roster::upsert_roster(&mut tx, &roster_rows).await.unwrap();
    meta::set_season_year(&mut tx, 2025).await.unwrap();
    meta::set_draft_year(&mut tx, 2026).await.unwrap();
    tx.commit().await.unwrap();
}

/// Bilateral player-for-player deal payload.
pub fn player_swap_deal(
    team_a: &str,
    players_a: &[&str],
    team_b: &str,
    players_b: &[&str],
) -> Deal {
    let legs_a: Vec<Value> = players_a
        .iter()
        .map(|pid| json!({"kind": "player", "player_id": pid}))
        .collect();
    let legs_b: Vec<Value> = players_b
        .iter()
        .map(|pid| json!({"kind": "player", "player_id": pid}))
        .collect();
    let payload = json!({
        "teams": [team_a, team_b],
        "legs": { team_a: legs_a, team_b: legs_b },
    });
    parse_deal(&payload, false).unwrap()
}

/// Unwrap a `DomainError::Trade` and assert its code.
pub fn assert_trade_code(err: DomainError, expected: TradeCode) -> TradeError {
    match err {
        DomainError::Trade(trade_err) => {
            assert_eq!(trade_err.code, expected, "{trade_err}");
            trade_err
        }
        other => panic!("expected TradeError({expected:?}), got {other:?}"),
    }
}
