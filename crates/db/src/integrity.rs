//! Cross-table integrity validation. Runs as the last step of every batch
//! mutation, inside the same transaction, so inconsistent state is never
//! observable outside.

use std::collections::{BTreeMap, BTreeSet};

use domain::errors::{DomainError, DomainResult};
use domain::ids::{normalize_player_id, normalize_team_id};
use sqlx::sqlite::SqliteConnection;

use crate::schema::SCHEMA_VERSION;
use crate::store::meta;

const MAX_REPORTED: usize = 10;

fn fail(mut violations: Vec<String>) -> DomainResult<()> {
    if violations.is_empty() {
        return Ok(());
    }
    let total = violations.len();
    violations.truncate(MAX_REPORTED);
    let shown = violations.join("; ");
    let suffix = if total > MAX_REPORTED {
        format!(" (+{} more)", total - MAX_REPORTED)
    } else {
        String::new()
    };
    Err(DomainError::IntegrityError(format!("{shown}{suffix}")))
}

pub async fn validate_integrity(
    conn: &mut SqliteConnection,
    strict_ids: bool,
) -> DomainResult<()> {
    let mut violations: Vec<String> = Vec::new();

    // Schema version.
    match meta::get_schema_version(&mut *conn).await? {
        None => violations.push("meta.schema_version missing (run init_db)".to_string()),
        Some(version) if version != SCHEMA_VERSION => {
            violations.push(format!(
                "schema_version {version} != expected {SCHEMA_VERSION}"
            ));
        }
        _ => {}
    }

    // Player id formats.
    let player_ids: Vec<String> = sqlx::query_scalar("SELECT player_id FROM players")
        .fetch_all(&mut *conn)
        .await
        .map_err(crate::errors::DbError::from)?;
    for player_id in &player_ids {
        if normalize_player_id(player_id, strict_ids, false).is_err() {
            violations.push(format!("invalid player_id in players: {player_id}"));
        }
    }
    let known_players: BTreeSet<&String> = player_ids.iter().collect();

    // Roster references and team codes.
    let roster_rows: Vec<(String, String)> =
        sqlx::query_as("SELECT player_id, team_id FROM roster WHERE status = 'active'")
            .fetch_all(&mut *conn)
            .await
            .map_err(crate::errors::DbError::from)?;
    for (player_id, team_id) in &roster_rows {
        if !known_players.contains(player_id) {
            violations.push(format!("roster player_id missing in players: {player_id}"));
        }
        if normalize_team_id(team_id, true, true).is_err() {
            violations.push(format!("invalid roster team_id: {team_id}"));
        }
    }

    // Draft picks.
    let pick_rows: Vec<(String, i64, i64, String, String)> = sqlx::query_as(
        "SELECT pick_id, year, round, original_team, owner_team FROM draft_picks",
    )
    .fetch_all(&mut *conn)
    .await
    .map_err(crate::errors::DbError::from)?;
    let mut pick_meta: BTreeMap<String, (i64, i64)> = BTreeMap::new();
    for (pick_id, year, round, original_team, owner_team) in &pick_rows {
        if *round != 1 && *round != 2 {
            violations.push(format!("pick {pick_id} has invalid round {round}"));
        }
        if normalize_team_id(original_team, true, false).is_err() {
            violations.push(format!("pick {pick_id} has invalid original_team {original_team}"));
        }
        if normalize_team_id(owner_team, true, false).is_err() {
            violations.push(format!("pick {pick_id} has invalid owner_team {owner_team}"));
        }
        pick_meta.insert(pick_id.clone(), (*year, *round));
    }

    // Swap rights.
    let swap_rows: Vec<(String, String, String, Option<i64>, Option<i64>, i64)> = sqlx::query_as(
        "SELECT swap_id, pick_id_a, pick_id_b, year, round, active FROM swap_rights",
    )
    .fetch_all(&mut *conn)
    .await
    .map_err(crate::errors::DbError::from)?;
    let mut active_pairs: BTreeSet<String> = BTreeSet::new();
    for (swap_id, pick_id_a, pick_id_b, year, round, active) in &swap_rows {
        let meta_a = pick_meta.get(pick_id_a);
        let meta_b = pick_meta.get(pick_id_b);
        match (meta_a, meta_b) {
            (Some((year_a, round_a)), Some((year_b, round_b))) => {
                if year_a != year_b || round_a != round_b {
                    violations.push(format!("swap {swap_id} joins mismatched picks"));
                }
                if let Some(year) = year {
                    if year != year_a {
                        violations.push(format!("swap {swap_id} year disagrees with picks"));
                    }
                }
                if let Some(round) = round {
                    if round != round_a {
                        violations.push(format!("swap {swap_id} round disagrees with picks"));
                    }
                }
            }
            _ => violations.push(format!("swap {swap_id} references missing picks")),
        }
        if *active != 0 {
            let pair = domain::ids::swap_pair_key(pick_id_a, pick_id_b);
            if !active_pairs.insert(pair.clone()) {
                violations.push(format!("duplicate active swap for pick pair {pair}"));
            }
        }
    }

    // Fixed assets.
    let asset_rows: Vec<(String, String, Option<String>)> =
        sqlx::query_as("SELECT asset_id, owner_team, source_pick_id FROM fixed_assets")
            .fetch_all(&mut *conn)
            .await
            .map_err(crate::errors::DbError::from)?;
    for (asset_id, owner_team, source_pick_id) in &asset_rows {
        if normalize_team_id(owner_team, true, false).is_err() {
            violations.push(format!("fixed asset {asset_id} has invalid owner {owner_team}"));
        }
        if let Some(source) = source_pick_id {
            if !pick_meta.contains_key(source) {
                violations.push(format!(
                    "fixed asset {asset_id} references missing pick {source}"
                ));
            }
        }
    }

    // Contracts: at most one active per player; free agents hold none.
    let active_contract_players: Vec<String> = sqlx::query_scalar(
        "SELECT player_id FROM contracts WHERE is_active = 1 GROUP BY player_id HAVING COUNT(*) > 1",
    )
    .fetch_all(&mut *conn)
    .await
    .map_err(crate::errors::DbError::from)?;
    for player_id in active_contract_players {
        violations.push(format!("player {player_id} has multiple active contracts"));
    }
    let fa_with_contract: Vec<String> = sqlx::query_scalar(
        "SELECT r.player_id FROM roster r
         JOIN contracts c ON c.player_id = r.player_id AND c.is_active = 1
         WHERE r.status = 'active' AND UPPER(r.team_id) = 'FA'",
    )
    .fetch_all(&mut *conn)
    .await
    .map_err(crate::errors::DbError::from)?;
    for player_id in fa_with_contract {
        violations.push(format!("free agent {player_id} still has an active contract"));
    }

    fail(violations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::create_memory_pool;
    use crate::schema;
    use crate::store::{contracts, players, roster};
    use domain::models::{Contract, ContractStatus, Player};

    async fn setup(conn: &mut SqliteConnection) {
        schema::init_db(conn).await.unwrap();
        players::upsert_players(
            conn,
            &[Player {
                player_id: "P000001".into(),
                name: None,
                pos: None,
                age: None,
                height_in: None,
                weight_lb: None,
                ovr: None,
                attrs: Default::default(),
            }],
        )
        .await
        .unwrap();
        roster::upsert_roster(
            conn,
            &[roster::RosterUpsert {
                player_id: "P000001".into(),
                team_id: "ATL".into(),
                salary_amount: Some(1_000_000),
            }],
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_clean_database_passes() {
        let pool = create_memory_pool().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        setup(&mut conn).await;
        validate_integrity(&mut conn, true).await.unwrap();
    }

    #[tokio::test]
    async fn test_bad_team_code_reported() {
        let pool = create_memory_pool().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        setup(&mut conn).await;
        sqlx::query("UPDATE roster SET team_id = 'XXX' WHERE player_id = 'P000001'")
            .execute(&mut *conn)
            .await
            .unwrap();
        let err = validate_integrity(&mut conn, true).await.unwrap_err();
        assert!(err.to_string().contains("XXX"));
    }

    #[tokio::test]
    async fn test_double_active_contract_reported() {
        let pool = create_memory_pool().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        setup(&mut conn).await;

        let contract = Contract {
            contract_id: "C1".into(),
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
        let mut second = contract.clone();
        second.contract_id = "C2".into();
        contracts::upsert_contracts(&mut conn, &[contract, second])
            .await
            .unwrap();

        let err = validate_integrity(&mut conn, true).await.unwrap_err();
        assert!(err.to_string().contains("multiple active contracts"));
    }

    #[tokio::test]
    async fn test_fa_with_active_contract_reported() {
        let pool = create_memory_pool().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        setup(&mut conn).await;

        contracts::ensure_contracts_bootstrapped_from_roster(&mut conn, 2025)
            .await
            .unwrap();
        sqlx::query("UPDATE roster SET team_id = 'FA' WHERE player_id = 'P000001'")
            .execute(&mut *conn)
            .await
            .unwrap();
        let err = validate_integrity(&mut conn, true).await.unwrap_err();
        assert!(err.to_string().contains("free agent"));
    }
}
