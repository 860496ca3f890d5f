use std::collections::BTreeMap;

use domain::models::{DraftPick, PickProtection};
use sqlx::sqlite::SqliteConnection;

use crate::errors::{DbError, DbResult};
use crate::models::DraftPickDb;
use crate::utc_now_iso;

pub async fn upsert_draft_picks(conn: &mut SqliteConnection, picks: &[DraftPick]) -> DbResult<()> {
    let now = utc_now_iso();
    for pick in picks {
        let protection_json = pick
            .protection
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        sqlx::query(
            "INSERT INTO draft_picks(pick_id, year, round, original_team, owner_team, protection_json, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(pick_id) DO UPDATE SET
                 year = excluded.year,
                 round = excluded.round,
                 original_team = excluded.original_team,
                 owner_team = excluded.owner_team,
                 protection_json = excluded.protection_json,
                 updated_at = excluded.updated_at",
        )
        .bind(&pick.pick_id)
        .bind(pick.year as i64)
        .bind(pick.round as i64)
        .bind(pick.original_team.to_uppercase())
        .bind(pick.owner_team.to_uppercase())
        .bind(protection_json)
        .bind(&now)
        .bind(&now)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Seed missing picks for every team, both rounds, from `draft_year` through
/// `draft_year + years_ahead` inclusive. Existing rows are untouched, so the
/// seeding window can grow across saves.
pub async fn ensure_draft_picks_seeded(
    conn: &mut SqliteConnection,
    draft_year: i32,
    team_ids: &[String],
    years_ahead: i32,
) -> DbResult<()> {
    let now = utc_now_iso();
    for year in draft_year..=(draft_year + years_ahead) {
        for round in [1u8, 2u8] {
            for team_id in team_ids {
                let pick = DraftPick::seeded(year, round, team_id);
                sqlx::query(
                    "INSERT OR IGNORE INTO draft_picks(pick_id, year, round, original_team, owner_team, protection_json, created_at, updated_at)
                     VALUES (?, ?, ?, ?, ?, NULL, ?, ?)",
                )
                .bind(&pick.pick_id)
                .bind(year as i64)
                .bind(round as i64)
                .bind(&pick.original_team)
                .bind(&pick.owner_team)
                .bind(&now)
                .bind(&now)
                .execute(&mut *conn)
                .await?;
            }
        }
    }
    Ok(())
}

pub async fn get_pick(conn: &mut SqliteConnection, pick_id: &str) -> DbResult<Option<DraftPick>> {
    let row: Option<DraftPickDb> = sqlx::query_as(
        "SELECT pick_id, year, round, original_team, owner_team, protection_json
         FROM draft_picks WHERE pick_id = ?",
    )
    .bind(pick_id)
    .fetch_optional(&mut *conn)
    .await?;
    row.map(|r| r.to_domain()).transpose()
}

pub async fn all_picks(conn: &mut SqliteConnection) -> DbResult<BTreeMap<String, DraftPick>> {
    let rows: Vec<DraftPickDb> = sqlx::query_as(
        "SELECT pick_id, year, round, original_team, owner_team, protection_json FROM draft_picks",
    )
    .fetch_all(&mut *conn)
    .await?;
    rows.iter()
        .map(|r| r.to_domain().map(|p| (p.pick_id.clone(), p)))
        .collect()
}

pub async fn update_pick_owner(
    conn: &mut SqliteConnection,
    pick_id: &str,
    owner_team: &str,
) -> DbResult<()> {
    let result = sqlx::query("UPDATE draft_picks SET owner_team = ?, updated_at = ? WHERE pick_id = ?")
        .bind(owner_team.to_uppercase())
        .bind(utc_now_iso())
        .bind(pick_id)
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound(format!("pick not found: {pick_id}")));
    }
    Ok(())
}

pub async fn set_pick_protection(
    conn: &mut SqliteConnection,
    pick_id: &str,
    protection: &PickProtection,
) -> DbResult<()> {
    let raw = serde_json::to_string(protection)?;
    let result =
        sqlx::query("UPDATE draft_picks SET protection_json = ?, updated_at = ? WHERE pick_id = ?")
            .bind(&raw)
            .bind(utc_now_iso())
            .bind(pick_id)
            .execute(&mut *conn)
            .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound(format!("pick not found: {pick_id}")));
    }
    Ok(())
}
