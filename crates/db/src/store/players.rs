use domain::models::{Player, PlayerTradeMeta};
use sqlx::sqlite::SqliteConnection;

use crate::errors::{DbError, DbResult};
use crate::models::PlayerDb;
use crate::utc_now_iso;

pub async fn upsert_players(conn: &mut SqliteConnection, players: &[Player]) -> DbResult<()> {
    let now = utc_now_iso();
    for player in players {
        let row = PlayerDb::from_domain(player)?;
        sqlx::query(
            "INSERT INTO players(player_id, name, pos, age, height_in, weight_lb, ovr, attrs_json, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(player_id) DO UPDATE SET
                 name = excluded.name,
                 pos = excluded.pos,
                 age = excluded.age,
                 height_in = excluded.height_in,
                 weight_lb = excluded.weight_lb,
                 ovr = excluded.ovr,
                 attrs_json = excluded.attrs_json,
                 updated_at = excluded.updated_at",
        )
        .bind(&row.player_id)
        .bind(&row.name)
        .bind(&row.pos)
        .bind(row.age)
        .bind(row.height_in)
        .bind(row.weight_lb)
        .bind(row.ovr)
        .bind(&row.attrs_json)
        .bind(&now)
        .bind(&now)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

pub async fn get_player(conn: &mut SqliteConnection, player_id: &str) -> DbResult<Option<Player>> {
    let row: Option<PlayerDb> = sqlx::query_as(
        "SELECT player_id, name, pos, age, height_in, weight_lb, ovr, attrs_json, trade_meta_json
         FROM players WHERE player_id = ?",
    )
    .bind(player_id)
    .fetch_optional(&mut *conn)
    .await?;
    row.map(|r| r.to_domain()).transpose()
}

pub async fn get_all_player_ids(conn: &mut SqliteConnection) -> DbResult<Vec<String>> {
    let ids: Vec<String> = sqlx::query_scalar("SELECT player_id FROM players ORDER BY player_id")
        .fetch_all(&mut *conn)
        .await?;
    Ok(ids)
}

pub async fn get_trade_meta(
    conn: &mut SqliteConnection,
    player_id: &str,
) -> DbResult<PlayerTradeMeta> {
    let raw: Option<Option<String>> =
        sqlx::query_scalar("SELECT trade_meta_json FROM players WHERE player_id = ?")
            .bind(player_id)
            .fetch_optional(&mut *conn)
            .await?;
    match raw {
        None => Err(DbError::NotFound(format!("player not found: {player_id}"))),
        Some(raw) => Ok(raw
            .as_deref()
            .and_then(|s| serde_json::from_str(s).ok())
            .unwrap_or_default()),
    }
}

pub async fn set_trade_meta(
    conn: &mut SqliteConnection,
    player_id: &str,
    meta: &PlayerTradeMeta,
) -> DbResult<()> {
    let raw = serde_json::to_string(meta)?;
    sqlx::query("UPDATE players SET trade_meta_json = ?, updated_at = ? WHERE player_id = ?")
        .bind(&raw)
        .bind(utc_now_iso())
        .bind(player_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Wipe players, roster and contracts (replace-mode import).
pub async fn delete_all_players(conn: &mut SqliteConnection) -> DbResult<()> {
    sqlx::query("DELETE FROM roster").execute(&mut *conn).await?;
    sqlx::query("DELETE FROM contracts").execute(&mut *conn).await?;
    sqlx::query("DELETE FROM players").execute(&mut *conn).await?;
    Ok(())
}
