use std::collections::BTreeMap;

use domain::models::SwapRight;
use sqlx::sqlite::SqliteConnection;

use crate::errors::{DbError, DbResult};
use crate::models::SwapRightDb;
use crate::utc_now_iso;

pub async fn upsert_swap_rights(conn: &mut SqliteConnection, swaps: &[SwapRight]) -> DbResult<()> {
    let now = utc_now_iso();
    for swap in swaps {
        sqlx::query(
            "INSERT INTO swap_rights(swap_id, pick_id_a, pick_id_b, year, round, owner_team, active, created_by_deal_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(swap_id) DO UPDATE SET
                 pick_id_a = excluded.pick_id_a,
                 pick_id_b = excluded.pick_id_b,
                 year = excluded.year,
                 round = excluded.round,
                 owner_team = excluded.owner_team,
                 active = excluded.active,
                 created_by_deal_id = excluded.created_by_deal_id,
                 updated_at = excluded.updated_at",
        )
        .bind(&swap.swap_id)
        .bind(&swap.pick_id_a)
        .bind(&swap.pick_id_b)
        .bind(swap.year.map(i64::from))
        .bind(swap.round.map(i64::from))
        .bind(swap.owner_team.to_uppercase())
        .bind(swap.active as i64)
        .bind(&swap.created_by_deal_id)
        .bind(&now)
        .bind(&now)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

pub async fn get_swap(conn: &mut SqliteConnection, swap_id: &str) -> DbResult<Option<SwapRight>> {
    let row: Option<SwapRightDb> = sqlx::query_as(
        "SELECT swap_id, pick_id_a, pick_id_b, year, round, owner_team, active, created_by_deal_id
         FROM swap_rights WHERE swap_id = ?",
    )
    .bind(swap_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row.map(|r| r.to_domain()))
}

pub async fn all_swaps(conn: &mut SqliteConnection) -> DbResult<BTreeMap<String, SwapRight>> {
    let rows: Vec<SwapRightDb> = sqlx::query_as(
        "SELECT swap_id, pick_id_a, pick_id_b, year, round, owner_team, active, created_by_deal_id
         FROM swap_rights",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows
        .iter()
        .map(|r| {
            let swap = r.to_domain();
            (swap.swap_id.clone(), swap)
        })
        .collect())
}

pub async fn update_swap_owner(
    conn: &mut SqliteConnection,
    swap_id: &str,
    owner_team: &str,
) -> DbResult<()> {
    let result = sqlx::query("UPDATE swap_rights SET owner_team = ?, updated_at = ? WHERE swap_id = ?")
        .bind(owner_team.to_uppercase())
        .bind(utc_now_iso())
        .bind(swap_id)
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound(format!("swap right not found: {swap_id}")));
    }
    Ok(())
}
