use std::collections::BTreeMap;

use chrono::NaiveDate;
use domain::models::{AgreementStatus, AssetLock, TradeAgreement};
use sqlx::sqlite::SqliteConnection;

use crate::errors::DbResult;
use crate::models::{AssetLockDb, TradeAgreementDb};

pub async fn insert_agreement(
    conn: &mut SqliteConnection,
    agreement: &TradeAgreement,
) -> DbResult<()> {
    sqlx::query(
        "INSERT INTO trade_agreements(deal_id, deal_json, assets_hash, created_at, expires_at, status)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&agreement.deal_id)
    .bind(agreement.deal.to_string())
    .bind(&agreement.assets_hash)
    .bind(agreement.created_at.to_string())
    .bind(agreement.expires_at.to_string())
    .bind(agreement.status.as_str())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn get_agreement(
    conn: &mut SqliteConnection,
    deal_id: &str,
) -> DbResult<Option<TradeAgreement>> {
    let row: Option<TradeAgreementDb> = sqlx::query_as(
        "SELECT deal_id, deal_json, assets_hash, created_at, expires_at, status
         FROM trade_agreements WHERE deal_id = ?",
    )
    .bind(deal_id)
    .fetch_optional(&mut *conn)
    .await?;
    row.map(|r| r.to_domain()).transpose()
}

pub async fn set_agreement_status(
    conn: &mut SqliteConnection,
    deal_id: &str,
    status: AgreementStatus,
) -> DbResult<()> {
    sqlx::query("UPDATE trade_agreements SET status = ? WHERE deal_id = ?")
        .bind(status.as_str())
        .bind(deal_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn list_active_agreements(
    conn: &mut SqliteConnection,
) -> DbResult<Vec<TradeAgreement>> {
    let rows: Vec<TradeAgreementDb> = sqlx::query_as(
        "SELECT deal_id, deal_json, assets_hash, created_at, expires_at, status
         FROM trade_agreements WHERE status = 'ACTIVE' ORDER BY created_at, deal_id",
    )
    .fetch_all(&mut *conn)
    .await?;
    rows.iter().map(TradeAgreementDb::to_domain).collect()
}

pub async fn insert_asset_lock(conn: &mut SqliteConnection, lock: &AssetLock) -> DbResult<()> {
    sqlx::query(
        "INSERT OR REPLACE INTO asset_locks(asset_key, deal_id, expires_at) VALUES (?, ?, ?)",
    )
    .bind(&lock.asset_key)
    .bind(&lock.deal_id)
    .bind(lock.expires_at.map(|d| d.to_string()))
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn get_asset_lock(
    conn: &mut SqliteConnection,
    asset_key: &str,
) -> DbResult<Option<AssetLock>> {
    let row: Option<AssetLockDb> = sqlx::query_as(
        "SELECT asset_key, deal_id, expires_at FROM asset_locks WHERE asset_key = ?",
    )
    .bind(asset_key)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row.map(|r| r.to_domain()))
}

pub async fn release_asset_lock(conn: &mut SqliteConnection, asset_key: &str) -> DbResult<()> {
    sqlx::query("DELETE FROM asset_locks WHERE asset_key = ?")
        .bind(asset_key)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn release_locks_for_deal(conn: &mut SqliteConnection, deal_id: &str) -> DbResult<()> {
    sqlx::query("DELETE FROM asset_locks WHERE deal_id = ?")
        .bind(deal_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// All locks, deleting any that expired on or before `today`.
pub async fn live_locks(
    conn: &mut SqliteConnection,
    today: NaiveDate,
) -> DbResult<BTreeMap<String, AssetLock>> {
    let rows: Vec<AssetLockDb> =
        sqlx::query_as("SELECT asset_key, deal_id, expires_at FROM asset_locks")
            .fetch_all(&mut *conn)
            .await?;
    let mut live = BTreeMap::new();
    for row in rows {
        let lock = row.to_domain();
        if lock.is_expired(today) {
            release_asset_lock(&mut *conn, &lock.asset_key).await?;
            continue;
        }
        live.insert(lock.asset_key.clone(), lock);
    }
    Ok(live)
}
