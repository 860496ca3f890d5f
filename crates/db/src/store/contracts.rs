use domain::ids::season_id_from_year;
use domain::models::Contract;
use sqlx::sqlite::SqliteConnection;

use crate::errors::DbResult;
use crate::models::ContractDb;
use crate::utc_now_iso;

const CONTRACT_COLUMNS: &str = "contract_id, player_id, team_id, start_season_id, end_season_id,
    salary_by_season_json, contract_type, is_active, updated_at,
    signed_date, start_season_year, years, options_json, status, contract_json";

pub async fn upsert_contracts(conn: &mut SqliteConnection, contracts: &[Contract]) -> DbResult<()> {
    let now = utc_now_iso();
    for contract in contracts {
        let salary_json = serde_json::to_string(&contract.salary_by_year)?;
        let options_json = serde_json::to_string(&contract.options)?;
        let contract_json = serde_json::to_string(contract)?;
        sqlx::query(
            "INSERT INTO contracts(
                 contract_id, player_id, team_id, start_season_id, end_season_id,
                 salary_by_season_json, contract_type, is_active, created_at, updated_at,
                 signed_date, start_season_year, years, options_json, status, contract_json
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(contract_id) DO UPDATE SET
                 player_id = excluded.player_id,
                 team_id = excluded.team_id,
                 start_season_id = excluded.start_season_id,
                 end_season_id = excluded.end_season_id,
                 salary_by_season_json = excluded.salary_by_season_json,
                 contract_type = excluded.contract_type,
                 is_active = excluded.is_active,
                 updated_at = excluded.updated_at,
                 signed_date = excluded.signed_date,
                 start_season_year = excluded.start_season_year,
                 years = excluded.years,
                 options_json = excluded.options_json,
                 status = excluded.status,
                 contract_json = excluded.contract_json",
        )
        .bind(&contract.contract_id)
        .bind(&contract.player_id)
        .bind(contract.team_id.to_uppercase())
        .bind(contract.start_season_id())
        .bind(contract.end_season_id())
        .bind(&salary_json)
        .bind("STANDARD")
        .bind(contract.is_active as i64)
        .bind(&now)
        .bind(&now)
        .bind(&contract.signed_date)
        .bind(contract.start_season_year as i64)
        .bind(contract.years as i64)
        .bind(&options_json)
        .bind(contract.status.as_str())
        .bind(&contract_json)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

pub async fn get_contract(
    conn: &mut SqliteConnection,
    contract_id: &str,
) -> DbResult<Option<Contract>> {
    let row: Option<ContractDb> = sqlx::query_as(&format!(
        "SELECT {CONTRACT_COLUMNS} FROM contracts WHERE contract_id = ?"
    ))
    .bind(contract_id)
    .fetch_optional(&mut *conn)
    .await?;
    row.map(|r| r.to_domain()).transpose()
}

pub async fn get_contracts(
    conn: &mut SqliteConnection,
    active_only: bool,
) -> DbResult<Vec<Contract>> {
    let sql = if active_only {
        format!("SELECT {CONTRACT_COLUMNS} FROM contracts WHERE is_active = 1 ORDER BY contract_id")
    } else {
        format!("SELECT {CONTRACT_COLUMNS} FROM contracts ORDER BY contract_id")
    };
    let rows: Vec<ContractDb> = sqlx::query_as(&sql).fetch_all(&mut *conn).await?;
    rows.iter().map(ContractDb::to_domain).collect()
}

/// The player's active contract, if any. Deterministic when duplicates
/// exist: newest `updated_at`, then greatest `contract_id`.
pub async fn get_active_contract(
    conn: &mut SqliteConnection,
    player_id: &str,
) -> DbResult<Option<Contract>> {
    let row: Option<ContractDb> = sqlx::query_as(&format!(
        "SELECT {CONTRACT_COLUMNS} FROM contracts
         WHERE player_id = ? AND is_active = 1
         ORDER BY updated_at DESC, contract_id DESC
         LIMIT 1"
    ))
    .bind(player_id)
    .fetch_optional(&mut *conn)
    .await?;
    row.map(|r| r.to_domain()).transpose()
}

pub async fn deactivate_active_contracts(
    conn: &mut SqliteConnection,
    player_id: &str,
) -> DbResult<()> {
    sqlx::query(
        "UPDATE contracts SET is_active = 0, updated_at = ? WHERE player_id = ? AND is_active = 1",
    )
    .bind(utc_now_iso())
    .bind(player_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Guarantee a minimal one-year ACTIVE contract for every rostered non-FA
/// player that lacks one. Idempotent: existing `BOOT_` rows are left alone.
pub async fn ensure_contracts_bootstrapped_from_roster(
    conn: &mut SqliteConnection,
    season_year: i32,
) -> DbResult<()> {
    let season_id = season_id_from_year(season_year);
    let now = utc_now_iso();
    let rows: Vec<(String, String, Option<i64>)> = sqlx::query_as(
        "SELECT player_id, team_id, salary_amount FROM roster WHERE status = 'active'",
    )
    .fetch_all(&mut *conn)
    .await?;

    for (player_id, team_id, salary_amount) in rows {
        let team_id = team_id.to_uppercase();
        if team_id == domain::league::FREE_AGENT_TEAM_ID {
            continue;
        }
        let has_active: Option<i64> = sqlx::query_scalar(
            "SELECT 1 FROM contracts WHERE player_id = ? AND is_active = 1 LIMIT 1",
        )
        .bind(&player_id)
        .fetch_optional(&mut *conn)
        .await?;
        if has_active.is_some() {
            continue;
        }

        let contract_id = format!("BOOT_{season_id}_{player_id}");
        let salary = salary_amount.unwrap_or(0);
        let mut salary_by_year = serde_json::Map::new();
        salary_by_year.insert(season_year.to_string(), serde_json::json!(salary));
        let salary_json = serde_json::Value::Object(salary_by_year.clone()).to_string();
        let contract_json = serde_json::json!({
            "contract_id": contract_id,
            "player_id": player_id,
            "team_id": team_id,
            "signed_date": "1900-01-01",
            "start_season_year": season_year,
            "years": 1,
            "salary_by_year": salary_by_year,
            "options": [],
            "status": "ACTIVE",
            "is_active": true,
        });
        sqlx::query(
            "INSERT OR IGNORE INTO contracts(
                 contract_id, player_id, team_id, start_season_id, end_season_id,
                 salary_by_season_json, contract_type, is_active, created_at, updated_at,
                 signed_date, start_season_year, years, options_json, status, contract_json
             ) VALUES (?, ?, ?, ?, ?, ?, 'STANDARD', 1, ?, ?, '1900-01-01', ?, 1, '[]', 'ACTIVE', ?)",
        )
        .bind(&contract_id)
        .bind(&player_id)
        .bind(&team_id)
        .bind(&season_id)
        .bind(&season_id)
        .bind(&salary_json)
        .bind(&now)
        .bind(&now)
        .bind(season_year as i64)
        .bind(contract_json.to_string())
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Rebuild the derived index tables from their sources:
/// `player_contracts` and `active_contracts` from `contracts`,
/// `free_agents` from `roster.team_id = 'FA'`. Active-contract selection is
/// deterministic: newest `updated_at`, ties to the greatest `contract_id`.
pub async fn rebuild_contract_indices(conn: &mut SqliteConnection) -> DbResult<()> {
    let now = utc_now_iso();

    sqlx::query("DELETE FROM player_contracts")
        .execute(&mut *conn)
        .await?;
    sqlx::query(
        "INSERT OR IGNORE INTO player_contracts(player_id, contract_id)
         SELECT player_id, contract_id FROM contracts
         WHERE player_id IS NOT NULL AND contract_id IS NOT NULL",
    )
    .execute(&mut *conn)
    .await?;

    sqlx::query("DELETE FROM active_contracts")
        .execute(&mut *conn)
        .await?;
    let active_rows: Vec<(String, String, String)> = sqlx::query_as(
        "SELECT player_id, contract_id, COALESCE(updated_at, created_at, '') AS ts
         FROM contracts WHERE is_active = 1",
    )
    .fetch_all(&mut *conn)
    .await?;
    let mut best: std::collections::BTreeMap<String, (String, String)> = Default::default();
    for (player_id, contract_id, ts) in active_rows {
        match best.get(&player_id) {
            Some((best_ts, best_cid))
                if (best_ts.as_str(), best_cid.as_str()) >= (ts.as_str(), contract_id.as_str()) => {}
            _ => {
                best.insert(player_id, (ts, contract_id));
            }
        }
    }
    for (player_id, (_, contract_id)) in best {
        sqlx::query(
            "INSERT OR REPLACE INTO active_contracts(player_id, contract_id, updated_at)
             VALUES (?, ?, ?)",
        )
        .bind(&player_id)
        .bind(&contract_id)
        .bind(&now)
        .execute(&mut *conn)
        .await?;
    }

    sqlx::query("DELETE FROM free_agents")
        .execute(&mut *conn)
        .await?;
    sqlx::query(
        "INSERT OR REPLACE INTO free_agents(player_id, updated_at)
         SELECT player_id, ? FROM roster
         WHERE status = 'active' AND UPPER(team_id) = 'FA' AND player_id IS NOT NULL",
    )
    .bind(&now)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn active_contract_pairs(
    conn: &mut SqliteConnection,
) -> DbResult<Vec<(String, String)>> {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT player_id, contract_id FROM active_contracts ORDER BY player_id",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::create_memory_pool;
    use crate::schema;
    use crate::store::{players, roster};
    use domain::models::{ContractStatus, Player};

    async fn seed_roster(conn: &mut SqliteConnection) {
        schema::init_db(conn).await.unwrap();
        let list: Vec<Player> = ["P000001", "P000002", "P000003"]
            .iter()
            .map(|id| Player {
                player_id: id.to_string(),
                name: None,
                pos: None,
                age: None,
                height_in: None,
                weight_lb: None,
                ovr: None,
                attrs: Default::default(),
            })
            .collect();
        players::upsert_players(conn, &list).await.unwrap();
        roster::upsert_roster(
            conn,
            &[
                roster::RosterUpsert {
                    player_id: "P000001".into(),
                    team_id: "ATL".into(),
                    salary_amount: Some(1_000_000),
                },
                roster::RosterUpsert {
                    player_id: "P000002".into(),
                    team_id: "BOS".into(),
                    salary_amount: Some(1_000_000),
                },
                roster::RosterUpsert {
                    player_id: "P000003".into(),
                    team_id: "FA".into(),
                    salary_amount: None,
                },
            ],
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_bootstrap_is_idempotent_and_skips_fa() {
        let pool = create_memory_pool().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        seed_roster(&mut conn).await;

        ensure_contracts_bootstrapped_from_roster(&mut conn, 2025)
            .await
            .unwrap();
        let first = get_contracts(&mut conn, false).await.unwrap();
        assert_eq!(first.len(), 2);
        assert!(first
            .iter()
            .all(|c| c.contract_id.starts_with("BOOT_2025-26_")));
        assert!(first.iter().all(|c| c.status == ContractStatus::Active));
        assert_eq!(first[0].salary_for_season(2025), 1_000_000);

        ensure_contracts_bootstrapped_from_roster(&mut conn, 2025)
            .await
            .unwrap();
        let second = get_contracts(&mut conn, false).await.unwrap();
        assert_eq!(
            first.iter().map(|c| &c.contract_id).collect::<Vec<_>>(),
            second.iter().map(|c| &c.contract_id).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn test_rebuild_indices_deterministic_tie_break() {
        let pool = create_memory_pool().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        seed_roster(&mut conn).await;

        // Two active contracts for the same player, identical timestamps:
        // the lexicographically greater contract_id must win.
        let mut a = Contract {
            contract_id: "C_AAA".into(),
            player_id: "P000001".into(),
            team_id: "ATL".into(),
            signed_date: "2025-07-01".into(),
            start_season_year: 2025,
            years: 1,
            salary_by_year: [("2025".to_string(), 1_000_000)].into_iter().collect(),
            options: vec![],
            status: ContractStatus::Active,
            is_active: true,
        };
        let mut b = a.clone();
        b.contract_id = "C_BBB".into();
        upsert_contracts(&mut conn, &[a.clone(), b.clone()]).await.unwrap();

        rebuild_contract_indices(&mut conn).await.unwrap();
        let pairs = active_contract_pairs(&mut conn).await.unwrap();
        let winner = pairs.iter().find(|(p, _)| p == "P000001").unwrap();
        assert_eq!(winner.1, "C_BBB");

        // Rebuilding twice yields identical content.
        rebuild_contract_indices(&mut conn).await.unwrap();
        assert_eq!(active_contract_pairs(&mut conn).await.unwrap(), pairs);

        // free_agents is derived from roster.
        let fa: Vec<String> = sqlx::query_scalar("SELECT player_id FROM free_agents")
            .fetch_all(&mut *conn)
            .await
            .unwrap();
        assert_eq!(fa, vec!["P000003".to_string()]);

        // Deactivate one: active selection follows.
        a.is_active = false;
        a.status = ContractStatus::Expired;
        b.is_active = false;
        b.status = ContractStatus::Expired;
        upsert_contracts(&mut conn, &[a, b]).await.unwrap();
        rebuild_contract_indices(&mut conn).await.unwrap();
        assert!(active_contract_pairs(&mut conn).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_active_contract_prefers_newest() {
        let pool = create_memory_pool().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        seed_roster(&mut conn).await;

        ensure_contracts_bootstrapped_from_roster(&mut conn, 2025)
            .await
            .unwrap();
        let active = get_active_contract(&mut conn, "P000001")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(active.contract_id, "BOOT_2025-26_P000001");
        assert!(get_active_contract(&mut conn, "P000003")
            .await
            .unwrap()
            .is_none());
    }
}
