use std::collections::BTreeMap;

use domain::models::FixedAsset;
use sqlx::sqlite::SqliteConnection;

use crate::errors::{DbError, DbResult};
use crate::models::FixedAssetDb;
use crate::utc_now_iso;

pub async fn upsert_fixed_assets(
    conn: &mut SqliteConnection,
    assets: &[FixedAsset],
) -> DbResult<()> {
    let now = utc_now_iso();
    for asset in assets {
        let attrs_json = serde_json::to_string(&asset.attrs)?;
        sqlx::query(
            "INSERT INTO fixed_assets(asset_id, label, value, owner_team, source_pick_id, draft_year, attrs_json, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(asset_id) DO UPDATE SET
                 label = excluded.label,
                 value = excluded.value,
                 owner_team = excluded.owner_team,
                 source_pick_id = excluded.source_pick_id,
                 draft_year = excluded.draft_year,
                 attrs_json = excluded.attrs_json,
                 updated_at = excluded.updated_at",
        )
        .bind(&asset.asset_id)
        .bind(&asset.label)
        .bind(asset.value)
        .bind(asset.owner_team.to_uppercase())
        .bind(&asset.source_pick_id)
        .bind(asset.draft_year.map(i64::from))
        .bind(&attrs_json)
        .bind(&now)
        .bind(&now)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

pub async fn get_fixed_asset(
    conn: &mut SqliteConnection,
    asset_id: &str,
) -> DbResult<Option<FixedAsset>> {
    let row: Option<FixedAssetDb> = sqlx::query_as(
        "SELECT asset_id, label, value, owner_team, source_pick_id, draft_year, attrs_json
         FROM fixed_assets WHERE asset_id = ?",
    )
    .bind(asset_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row.map(|r| r.to_domain()))
}

pub async fn all_fixed_assets(
    conn: &mut SqliteConnection,
) -> DbResult<BTreeMap<String, FixedAsset>> {
    let rows: Vec<FixedAssetDb> = sqlx::query_as(
        "SELECT asset_id, label, value, owner_team, source_pick_id, draft_year, attrs_json
         FROM fixed_assets",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows
        .iter()
        .map(|r| {
            let asset = r.to_domain();
            (asset.asset_id.clone(), asset)
        })
        .collect())
}

pub async fn update_fixed_asset_owner(
    conn: &mut SqliteConnection,
    asset_id: &str,
    owner_team: &str,
) -> DbResult<()> {
    let result =
        sqlx::query("UPDATE fixed_assets SET owner_team = ?, updated_at = ? WHERE asset_id = ?")
            .bind(owner_team.to_uppercase())
            .bind(utc_now_iso())
            .bind(asset_id)
            .execute(&mut *conn)
            .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound(format!("fixed asset not found: {asset_id}")));
    }
    Ok(())
}
