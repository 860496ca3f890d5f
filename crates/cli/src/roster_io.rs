//! Roster JSON import/export.
//!
//! Import rows carry `player_id` and `team_id` plus any of the core player
//! columns; unrecognized keys become player attributes. Salaries may arrive
//! as numbers (including floats) or formatted strings and are stored as
//! integer dollars.

use std::path::Path;

use anyhow::{bail, Context};
use clap::ValueEnum;
use domain::ids::{assert_unique_ids, normalize_player_id, normalize_team_id};
use domain::models::player::{parse_height_in, parse_salary_amount, parse_weight_lb};
use domain::models::Player;
use serde_json::{Map, Value};

use db::store::{contracts, players, roster};
use db::LeagueRepo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ImportMode {
    Replace,
    Upsert,
}

const CORE_KEYS: &[&str] = &[
    "player_id", "PlayerID", "team_id", "Team", "name", "Name", "pos", "POS", "age", "Age",
    "height_in", "HT", "weight_lb", "WT", "salary_amount", "Salary", "ovr", "OVR",
];

fn field<'a>(row: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| row.get(*k))
}

fn int_field(row: &Map<String, Value>, keys: &[&str]) -> Option<i32> {
    field(row, keys).and_then(|v| {
        v.as_i64()
            .or_else(|| v.as_f64().map(|f| f.round() as i64))
            .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
            .map(|n| n as i32)
    })
}

fn string_field(row: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    field(row, keys)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

struct ParsedRow {
    player: Player,
    team_id: String,
    salary_amount: Option<i64>,
}

fn parse_row(row: &Map<String, Value>, strict_ids: bool) -> anyhow::Result<ParsedRow> {
    let raw_pid = string_field(row, &["player_id", "PlayerID"])
        .context("roster row missing player_id")?;
    let player_id = normalize_player_id(&raw_pid, strict_ids, !strict_ids)?;
    let raw_tid =
        string_field(row, &["team_id", "Team"]).context("roster row missing team_id")?;
    let team_id = normalize_team_id(&raw_tid, true, true)?;

    let height_in = int_field(row, &["height_in"]).or_else(|| {
        string_field(row, &["HT"]).and_then(|s| parse_height_in(&s))
    });
    let weight_lb = int_field(row, &["weight_lb"]).or_else(|| {
        string_field(row, &["WT"]).and_then(|s| parse_weight_lb(&s))
    });
    let salary_amount = field(row, &["salary_amount", "Salary"]).and_then(parse_salary_amount);

    let mut attrs = Map::new();
    for (key, value) in row {
        if CORE_KEYS.contains(&key.as_str()) || value.is_null() {
            continue;
        }
        attrs.insert(key.clone(), value.clone());
    }

    Ok(ParsedRow {
        player: Player {
            player_id,
            name: string_field(row, &["name", "Name"]),
            pos: string_field(row, &["pos", "POS"]),
            age: int_field(row, &["age", "Age"]),
            height_in,
            weight_lb,
            ovr: int_field(row, &["ovr", "OVR"]),
            attrs,
        },
        team_id,
        salary_amount,
    })
}

pub async fn import_roster(
    repo: &LeagueRepo,
    path: &Path,
    mode: ImportMode,
    strict_ids: bool,
) -> anyhow::Result<usize> {
    let raw = std::fs::read_to_string(path)?;
    let rows: Vec<Map<String, Value>> =
        serde_json::from_str(&raw).context("roster file must be a JSON array of objects")?;
    if rows.is_empty() {
        bail!("roster file contains no rows");
    }

    let parsed: Vec<ParsedRow> = rows
        .iter()
        .map(|row| parse_row(row, strict_ids))
        .collect::<anyhow::Result<_>>()?;
    assert_unique_ids(
        parsed.iter().map(|r| r.player.player_id.as_str()),
        "player_id (in roster file)",
    )?;

    let mut tx = repo.begin_write().await?;
    if mode == ImportMode::Replace {
        players::delete_all_players(&mut tx).await?;
    }
    let player_list: Vec<Player> = parsed.iter().map(|r| r.player.clone()).collect();
    players::upsert_players(&mut tx, &player_list).await?;
    let roster_rows: Vec<roster::RosterUpsert> = parsed
        .iter()
        .map(|r| roster::RosterUpsert {
            player_id: r.player.player_id.clone(),
            team_id: r.team_id.clone(),
            salary_amount: r.salary_amount,
        })
        .collect();
    roster::upsert_roster(&mut tx, &roster_rows).await?;
    contracts::rebuild_contract_indices(&mut tx).await?;
    db::integrity::validate_integrity(&mut tx, strict_ids).await?;
    tx.commit().await?;

    Ok(parsed.len())
}

pub async fn export_roster(repo: &LeagueRepo, path: &Path) -> anyhow::Result<usize> {
    let mut tx = repo.begin_read().await?;
    let entries = roster::all_roster_entries(&mut tx).await?;
    let mut out = Vec::with_capacity(entries.len());
    for entry in &entries {
        let Some(player) = players::get_player(&mut tx, &entry.player_id).await? else {
            continue;
        };
        let mut row = Map::new();
        row.insert("player_id".into(), Value::from(player.player_id.clone()));
        row.insert("team_id".into(), Value::from(entry.team_id.clone()));
        row.insert("name".into(), player.name.clone().map(Value::from).unwrap_or(Value::Null));
        row.insert("pos".into(), player.pos.clone().map(Value::from).unwrap_or(Value::Null));
        row.insert("age".into(), player.age.map(Value::from).unwrap_or(Value::Null));
        row.insert(
            "height_in".into(),
            player.height_in.map(Value::from).unwrap_or(Value::Null),
        );
        row.insert(
            "weight_lb".into(),
            player.weight_lb.map(Value::from).unwrap_or(Value::Null),
        );
        row.insert(
            "salary_amount".into(),
            entry.salary_amount.map(Value::from).unwrap_or(Value::Null),
        );
        row.insert("ovr".into(), player.ovr.map(Value::from).unwrap_or(Value::Null));
        for (key, value) in player.attrs {
            row.entry(key).or_insert(value);
        }
        out.push(Value::Object(row));
    }
    tx.commit().await?;

    std::fs::write(path, serde_json::to_string_pretty(&out)?)?;
    Ok(out.len())
}
