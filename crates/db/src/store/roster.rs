use std::collections::BTreeMap;

use domain::league::FREE_AGENT_TEAM_ID;
use domain::models::RosterEntry;
use sqlx::sqlite::SqliteConnection;

use crate::errors::{DbError, DbResult};
use crate::models::RosterDb;
use crate::utc_now_iso;

/// Input shape for roster upserts (import and contract ops).
#[derive(Debug, Clone)]
pub struct RosterUpsert {
    pub player_id: String,
    pub team_id: String,
    pub salary_amount: Option<i64>,
}

pub async fn upsert_roster(conn: &mut SqliteConnection, rows: &[RosterUpsert]) -> DbResult<()> {
    let now = utc_now_iso();
    for row in rows {
        sqlx::query(
            "INSERT INTO roster(player_id, team_id, salary_amount, status, updated_at)
             VALUES (?, ?, ?, 'active', ?)
             ON CONFLICT(player_id) DO UPDATE SET
                 team_id = excluded.team_id,
                 salary_amount = excluded.salary_amount,
                 status = 'active',
                 updated_at = excluded.updated_at",
        )
        .bind(&row.player_id)
        .bind(row.team_id.to_uppercase())
        .bind(row.salary_amount)
        .bind(&now)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

pub async fn all_roster_entries(conn: &mut SqliteConnection) -> DbResult<Vec<RosterEntry>> {
    let rows: Vec<RosterDb> = sqlx::query_as(
        "SELECT player_id, team_id, salary_amount, status, updated_at
         FROM roster ORDER BY team_id, player_id",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows.iter().map(RosterDb::to_domain).collect())
}

pub async fn get_team_roster(
    conn: &mut SqliteConnection,
    team_id: &str,
) -> DbResult<Vec<RosterEntry>> {
    let rows: Vec<RosterDb> = sqlx::query_as(
        "SELECT r.player_id, r.team_id, r.salary_amount, r.status, r.updated_at
         FROM roster r
         JOIN players p ON p.player_id = r.player_id
         WHERE r.team_id = ? AND r.status = 'active'
         ORDER BY p.ovr DESC, p.player_id ASC",
    )
    .bind(team_id.to_uppercase())
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows.iter().map(RosterDb::to_domain).collect())
}

pub async fn get_team_id_by_player(
    conn: &mut SqliteConnection,
    player_id: &str,
) -> DbResult<String> {
    let team: Option<String> =
        sqlx::query_scalar("SELECT team_id FROM roster WHERE player_id = ? AND status = 'active'")
            .bind(player_id)
            .fetch_optional(&mut *conn)
            .await?;
    team.map(|t| t.to_uppercase()).ok_or_else(|| {
        DbError::NotFound(format!("active roster entry not found for player_id={player_id}"))
    })
}

pub async fn get_salary_amount(
    conn: &mut SqliteConnection,
    player_id: &str,
) -> DbResult<Option<i64>> {
    let salary: Option<Option<i64>> = sqlx::query_scalar(
        "SELECT salary_amount FROM roster WHERE player_id = ? AND status = 'active'",
    )
    .bind(player_id)
    .fetch_optional(&mut *conn)
    .await?;
    match salary {
        None => Err(DbError::NotFound(format!(
            "active roster entry not found for player_id={player_id}"
        ))),
        Some(value) => Ok(value),
    }
}

pub async fn set_salary(
    conn: &mut SqliteConnection,
    player_id: &str,
    salary_amount: i64,
) -> DbResult<()> {
    sqlx::query("UPDATE roster SET salary_amount = ?, updated_at = ? WHERE player_id = ?")
        .bind(salary_amount)
        .bind(utc_now_iso())
        .bind(player_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Move a player to another team. Also retargets any active contract so the
/// two tables never disagree.
pub async fn trade_player(
    conn: &mut SqliteConnection,
    player_id: &str,
    to_team_id: &str,
) -> DbResult<()> {
    // Must exist in the active roster.
    get_team_id_by_player(&mut *conn, player_id).await?;
    let now = utc_now_iso();
    let to_team = to_team_id.to_uppercase();
    sqlx::query("UPDATE roster SET team_id = ?, updated_at = ? WHERE player_id = ?")
        .bind(&to_team)
        .bind(&now)
        .bind(player_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query(
        "UPDATE contracts SET team_id = ?, updated_at = ? WHERE player_id = ? AND is_active = 1",
    )
    .bind(&to_team)
    .bind(&now)
    .bind(player_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Send a player to free agency and deactivate any active contract.
pub async fn release_to_free_agency(
    conn: &mut SqliteConnection,
    player_id: &str,
) -> DbResult<()> {
    let now = utc_now_iso();
    sqlx::query("UPDATE roster SET team_id = ?, updated_at = ? WHERE player_id = ?")
        .bind(FREE_AGENT_TEAM_ID)
        .bind(&now)
        .bind(player_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query(
        "UPDATE contracts SET is_active = 0, updated_at = ? WHERE player_id = ? AND is_active = 1",
    )
    .bind(&now)
    .bind(player_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn roster_counts(conn: &mut SqliteConnection) -> DbResult<BTreeMap<String, usize>> {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT team_id, COUNT(*) FROM roster WHERE status = 'active' GROUP BY team_id",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows
        .into_iter()
        .map(|(team, count)| (team.to_uppercase(), count as usize))
        .collect())
}

pub async fn list_teams(conn: &mut SqliteConnection) -> DbResult<Vec<String>> {
    let teams: Vec<String> = sqlx::query_scalar(
        "SELECT DISTINCT team_id FROM roster WHERE status = 'active' ORDER BY team_id",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(teams)
}

/// Free agents derived from the roster table; the `free_agents` index table
/// is never the source.
pub async fn list_free_agents(conn: &mut SqliteConnection) -> DbResult<Vec<String>> {
    let ids: Vec<String> = sqlx::query_scalar(
        "SELECT player_id FROM roster
         WHERE status = 'active' AND UPPER(team_id) = ?
         ORDER BY player_id",
    )
    .bind(FREE_AGENT_TEAM_ID)
    .fetch_all(&mut *conn)
    .await?;
    Ok(ids)
}
