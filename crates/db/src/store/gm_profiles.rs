use std::collections::BTreeMap;

use serde_json::Value;
use sqlx::sqlite::SqliteConnection;

use crate::errors::DbResult;
use crate::utc_now_iso;

pub async fn upsert_gm_profile(
    conn: &mut SqliteConnection,
    team_id: &str,
    profile: &Value,
) -> DbResult<()> {
    let now = utc_now_iso();
    sqlx::query(
        "INSERT INTO gm_profiles(team_id, profile_json, created_at, updated_at)
         VALUES (?, ?, ?, ?)
         ON CONFLICT(team_id) DO UPDATE SET
             profile_json = excluded.profile_json,
             updated_at = excluded.updated_at",
    )
    .bind(team_id.to_uppercase())
    .bind(profile.to_string())
    .bind(&now)
    .bind(&now)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn get_gm_profile(
    conn: &mut SqliteConnection,
    team_id: &str,
) -> DbResult<Option<Value>> {
    let raw: Option<String> =
        sqlx::query_scalar("SELECT profile_json FROM gm_profiles WHERE team_id = ?")
            .bind(team_id.to_uppercase())
            .fetch_optional(&mut *conn)
            .await?;
    Ok(raw.and_then(|s| serde_json::from_str(&s).ok()))
}

pub async fn all_gm_profiles(conn: &mut SqliteConnection) -> DbResult<BTreeMap<String, Value>> {
    let rows: Vec<(String, String)> =
        sqlx::query_as("SELECT team_id, profile_json FROM gm_profiles")
            .fetch_all(&mut *conn)
            .await?;
    Ok(rows
        .into_iter()
        .filter_map(|(team, raw)| serde_json::from_str(&raw).ok().map(|v| (team, v)))
        .collect())
}

/// Ensure each team has a profile row (idempotent).
pub async fn ensure_gm_profiles_seeded(
    conn: &mut SqliteConnection,
    team_ids: &[String],
    default_profile: &Value,
) -> DbResult<()> {
    let now = utc_now_iso();
    for team_id in team_ids {
        sqlx::query(
            "INSERT OR IGNORE INTO gm_profiles(team_id, profile_json, created_at, updated_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(team_id.to_uppercase())
        .bind(default_profile.to_string())
        .bind(&now)
        .bind(&now)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::create_memory_pool;
    use crate::schema;
    use serde_json::json;

    #[tokio::test]
    async fn test_seed_does_not_overwrite() {
        let pool = create_memory_pool().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        schema::init_db(&mut conn).await.unwrap();

        upsert_gm_profile(&mut conn, "ATL", &json!({"aggression": 0.9}))
            .await
            .unwrap();
        ensure_gm_profiles_seeded(
            &mut conn,
            &["ATL".to_string(), "BOS".to_string()],
            &json!({}),
        )
        .await
        .unwrap();

        let atl = get_gm_profile(&mut conn, "ATL").await.unwrap().unwrap();
        assert_eq!(atl["aggression"], json!(0.9));
        let all = all_gm_profiles(&mut conn).await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
