//! Append-only transaction log, deduplicated by a SHA-256 hash of the
//! canonical payload JSON (compact, keys sorted).

use domain::models::TransactionEntry;
use serde_json::Value;
use sha2::{Digest, Sha256};
use sqlx::sqlite::SqliteConnection;

use crate::canonical_json;
use crate::errors::DbResult;
use crate::models::TransactionDb;
use crate::utc_now_iso;

pub fn tx_hash(payload: &Value) -> String {
    let raw = canonical_json(payload);
    hex::encode(Sha256::digest(raw.as_bytes()))
}

pub async fn insert_transactions(
    conn: &mut SqliteConnection,
    entries: &[TransactionEntry],
) -> DbResult<()> {
    let now = utc_now_iso();
    for entry in entries {
        let payload = canonical_json(&entry.payload);
        let hash = tx_hash(&entry.payload);
        let teams_json = serde_json::to_string(&entry.teams)?;
        sqlx::query(
            "INSERT OR IGNORE INTO transactions_log(tx_hash, tx_type, tx_date, deal_id, source, teams_json, payload_json, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&hash)
        .bind(&entry.tx_type)
        .bind(&entry.tx_date)
        .bind(&entry.deal_id)
        .bind(&entry.source)
        .bind(&teams_json)
        .bind(&payload)
        .bind(&now)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub limit: Option<u32>,
    pub since_date: Option<String>,
    pub deal_id: Option<String>,
    pub tx_type: Option<String>,
}

/// Payloads in descending `(tx_date, created_at)` order.
pub async fn list_transactions(
    conn: &mut SqliteConnection,
    filter: &TransactionFilter,
) -> DbResult<Vec<Value>> {
    let mut sql = String::from(
        "SELECT tx_hash, tx_type, tx_date, deal_id, source, payload_json FROM transactions_log",
    );
    let mut clauses = Vec::new();
    if filter.since_date.is_some() {
        clauses.push("tx_date >= ?");
    }
    if filter.deal_id.is_some() {
        clauses.push("deal_id = ?");
    }
    if filter.tx_type.is_some() {
        clauses.push("tx_type = ?");
    }
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY COALESCE(tx_date, '') DESC, created_at DESC LIMIT ?");

    let mut query = sqlx::query_as::<_, TransactionDb>(&sql);
    if let Some(since) = &filter.since_date {
        query = query.bind(since.clone());
    }
    if let Some(deal_id) = &filter.deal_id {
        query = query.bind(deal_id.clone());
    }
    if let Some(tx_type) = &filter.tx_type {
        query = query.bind(tx_type.clone());
    }
    query = query.bind(filter.limit.unwrap_or(200).max(1) as i64);

    let rows = query.fetch_all(&mut *conn).await?;
    Ok(rows.iter().map(TransactionDb::payload).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::create_memory_pool;
    use crate::schema;
    use serde_json::json;

    fn entry(payload: Value) -> TransactionEntry {
        TransactionEntry::from_payload(payload)
    }

    #[tokio::test]
    async fn test_same_payload_stored_once() {
        let pool = create_memory_pool().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        schema::init_db(&mut conn).await.unwrap();

        let payload = json!({"type": "trade", "date": "2026-01-15", "teams": ["ATL", "BOS"]});
        insert_transactions(&mut conn, &[entry(payload.clone())])
            .await
            .unwrap();
        insert_transactions(&mut conn, &[entry(payload.clone())])
            .await
            .unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions_log")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_list_order_and_filters() {
        let pool = create_memory_pool().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        schema::init_db(&mut conn).await.unwrap();

        insert_transactions(
            &mut conn,
            &[
                entry(json!({"type": "trade", "date": "2026-01-10", "deal_id": "d-1"})),
                entry(json!({"type": "trade", "date": "2026-01-20", "deal_id": "d-2"})),
                entry(json!({"type": "sign", "date": "2026-01-15"})),
            ],
        )
        .await
        .unwrap();

        let all = list_transactions(&mut conn, &TransactionFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0]["date"], "2026-01-20");
        assert_eq!(all[2]["date"], "2026-01-10");

        let trades = list_transactions(
            &mut conn,
            &TransactionFilter {
                tx_type: Some("trade".to_string()),
                since_date: Some("2026-01-15".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0]["deal_id"], "d-2");

        let by_deal = list_transactions(
            &mut conn,
            &TransactionFilter {
                deal_id: Some("d-1".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(by_deal.len(), 1);
    }

    #[test]
    fn test_hash_is_stable_across_key_order() {
        let a = json!({"b": 1, "a": 2});
        let b = json!({"a": 2, "b": 1});
        assert_eq!(tx_hash(&a), tx_hash(&b));
    }
}
