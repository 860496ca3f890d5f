//! Ingestion contract for match-engine results (`GameResultV2`). The core
//! never guesses: anything that cannot be mapped deterministically onto the
//! schedule and roster is rejected with an actionable message.

use std::collections::BTreeMap;

use db::store::schedule as schedule_store;
use domain::errors::{DomainError, DomainResult};
use domain::ids::{normalize_player_id, normalize_team_id};
use domain::models::GamePhase;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::LeagueContext;

pub const GAME_RESULT_SCHEMA_VERSION: &str = "2.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameHeader {
    pub game_id: String,
    pub date: String,
    pub season_id: String,
    pub phase: String,
    pub home_team_id: String,
    pub away_team_id: String,
    #[serde(default)]
    pub overtime_periods: i32,
    #[serde(default)]
    pub possessions_per_team: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamBox {
    pub totals: BTreeMap<String, f64>,
    #[serde(default)]
    pub breakdowns: Value,
    #[serde(default)]
    pub players: Vec<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_totals: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_breakdowns: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStateBlock {
    #[serde(default)]
    pub team_fouls: BTreeMap<String, i64>,
    #[serde(default)]
    pub player_fouls: BTreeMap<String, BTreeMap<String, i64>>,
    #[serde(default)]
    pub fatigue: BTreeMap<String, BTreeMap<String, f64>>,
    #[serde(default)]
    pub minutes_played_sec: BTreeMap<String, BTreeMap<String, i64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineMeta {
    pub engine_name: String,
    pub engine_version: String,
    #[serde(default)]
    pub era: Option<String>,
    #[serde(default)]
    pub era_version: Option<String>,
    #[serde(default)]
    pub replay_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameResultV2 {
    pub schema_version: String,
    pub game: GameHeader,
    #[serde(rename = "final")]
    pub final_score: BTreeMap<String, i64>,
    pub teams: BTreeMap<String, TeamBox>,
    #[serde(default)]
    pub game_state: GameStateBlock,
    pub meta: EngineMeta,
}

fn invalid(path: &str, message: &str) -> DomainError {
    DomainError::ValidationError(format!("game result invalid: '{path}' {message}"))
}

/// Remap side-keyed (`home`/`away`) dictionaries to team ids.
fn remap_side_keys<T>(
    map: &mut BTreeMap<String, T>,
    home_team_id: &str,
    away_team_id: &str,
) {
    for (side, team_id) in [("home", home_team_id), ("away", away_team_id)] {
        if let Some(value) = map.remove(side) {
            map.insert(team_id.to_string(), value);
        }
    }
}

/// Validate a raw result against the schedule contract and normalize
/// side-keyed game-state maps to team ids.
pub fn validate_game_result(result: &mut GameResultV2) -> DomainResult<()> {
    if result.schema_version != GAME_RESULT_SCHEMA_VERSION {
        return Err(invalid(
            "schema_version",
            &format!(
                "must be {GAME_RESULT_SCHEMA_VERSION}, got {:?}",
                result.schema_version
            ),
        ));
    }
    GamePhase::parse(&result.game.phase)
        .map_err(|_| invalid("game.phase", &format!("unknown phase {:?}", result.game.phase)))?;

    let home = normalize_team_id(&result.game.home_team_id, true, false)
        .map_err(|_| invalid("game.home_team_id", "invalid team id"))?;
    let away = normalize_team_id(&result.game.away_team_id, true, false)
        .map_err(|_| invalid("game.away_team_id", "invalid team id"))?;
    if home == away {
        return Err(invalid("game", "home and away teams must differ"));
    }

    // Final map covers exactly the two participating teams.
    let expected: Vec<&String> = result.final_score.keys().collect();
    if expected.len() != 2
        || !result.final_score.contains_key(&home)
        || !result.final_score.contains_key(&away)
    {
        return Err(invalid(
            "final",
            &format!("must contain exactly {home} and {away}"),
        ));
    }

    let mut seen_players: BTreeMap<String, String> = BTreeMap::new();
    for (team_id, team_box) in &result.teams {
        if team_id != &home && team_id != &away {
            return Err(invalid("teams", &format!("unexpected team key {team_id:?}")));
        }
        if !team_box.totals.contains_key("PTS") {
            return Err(invalid(
                &format!("teams.{team_id}.totals"),
                "missing PTS",
            ));
        }
        for row in &team_box.players {
            let player_id = row
                .get("PlayerID")
                .and_then(|v| v.as_str())
                .ok_or_else(|| invalid(&format!("teams.{team_id}.players"), "missing PlayerID"))?;
            let player_id = normalize_player_id(player_id, true, false)
                .map_err(|_| invalid(&format!("teams.{team_id}.players"), "invalid PlayerID"))?;
            if let Some(row_team) = row.get("TeamID").and_then(|v| v.as_str()) {
                if row_team != team_id {
                    return Err(invalid(
                        &format!("teams.{team_id}.players"),
                        &format!("TeamID mismatch for {player_id}: {row_team:?}"),
                    ));
                }
            }
            if let Some(other_team) = seen_players.insert(player_id.clone(), team_id.clone()) {
                if &other_team != team_id {
                    return Err(invalid(
                        "teams",
                        &format!("player {player_id} appears on both teams"),
                    ));
                }
                return Err(invalid(
                    &format!("teams.{team_id}.players"),
                    &format!("duplicate player {player_id}"),
                ));
            }
        }
    }

    remap_side_keys(&mut result.game_state.team_fouls, &home, &away);
    remap_side_keys(&mut result.game_state.player_fouls, &home, &away);
    remap_side_keys(&mut result.game_state.fatigue, &home, &away);
    remap_side_keys(&mut result.game_state.minutes_played_sec, &home, &away);

    Ok(())
}

/// Validate a result and finalize the matching master-schedule entry.
pub async fn apply_game_result(
    ctx: &LeagueContext,
    result: &mut GameResultV2,
) -> DomainResult<()> {
    validate_game_result(result)?;

    let home = result.game.home_team_id.to_uppercase();
    let away = result.game.away_team_id.to_uppercase();
    let home_score = result.final_score[&home] as i32;
    let away_score = result.final_score[&away] as i32;

    let mut tx = ctx.repo.begin_write().await?;
    let Some(game) = schedule_store::get_game(&mut tx, &result.game.game_id).await? else {
        return Err(DomainError::NotFound(format!(
            "schedule entry not found for game_id {}",
            result.game.game_id
        )));
    };
    if game.home_team_id != home || game.away_team_id != away {
        return Err(invalid(
            "game",
            &format!(
                "teams do not match schedule entry {} ({} vs {})",
                game.game_id, game.home_team_id, game.away_team_id
            ),
        ));
    }
    schedule_store::mark_game_final(&mut tx, &result.game.game_id, home_score, away_score).await?;
    tx.commit().await?;
    Ok(())
}
