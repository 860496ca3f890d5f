//! Schema DDL and migrations. The database is the single source of truth;
//! derived index tables are rebuildable projections.

use sqlx::sqlite::SqliteConnection;
use sqlx::{Connection, Row};

use crate::errors::DbResult;
use crate::utc_now_iso;

/// Logical schema version stored in `meta.schema_version`.
pub const SCHEMA_VERSION: &str = "2.0";

/// `PRAGMA user_version` migration counter.
pub const LATEST_USER_VERSION: i32 = 2;

const DDL: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS meta (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS players (
        player_id TEXT PRIMARY KEY,
        name TEXT,
        pos TEXT,
        age INTEGER,
        height_in INTEGER,
        weight_lb INTEGER,
        ovr INTEGER,
        attrs_json TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS roster (
        player_id TEXT PRIMARY KEY,
        team_id TEXT NOT NULL,
        salary_amount INTEGER,
        status TEXT NOT NULL DEFAULT 'active',
        updated_at TEXT NOT NULL,
        FOREIGN KEY(player_id) REFERENCES players(player_id) ON DELETE CASCADE
    )",
    "CREATE INDEX IF NOT EXISTS idx_roster_team_id ON roster(team_id)",
    "CREATE TABLE IF NOT EXISTS contracts (
        contract_id TEXT PRIMARY KEY,
        player_id TEXT NOT NULL,
        team_id TEXT NOT NULL,
        start_season_id TEXT,
        end_season_id TEXT,
        salary_by_season_json TEXT,
        contract_type TEXT,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        FOREIGN KEY(player_id) REFERENCES players(player_id) ON DELETE CASCADE
    )",
    "CREATE INDEX IF NOT EXISTS idx_contracts_player_id ON contracts(player_id)",
    "CREATE INDEX IF NOT EXISTS idx_contracts_team_id ON contracts(team_id)",
    "CREATE TABLE IF NOT EXISTS draft_picks (
        pick_id TEXT PRIMARY KEY,
        year INTEGER NOT NULL,
        round INTEGER NOT NULL,
        original_team TEXT NOT NULL,
        owner_team TEXT NOT NULL,
        protection_json TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_draft_picks_owner ON draft_picks(owner_team)",
    "CREATE INDEX IF NOT EXISTS idx_draft_picks_year_round ON draft_picks(year, round)",
    "CREATE TABLE IF NOT EXISTS swap_rights (
        swap_id TEXT PRIMARY KEY,
        pick_id_a TEXT NOT NULL,
        pick_id_b TEXT NOT NULL,
        year INTEGER,
        round INTEGER,
        owner_team TEXT NOT NULL,
        active INTEGER NOT NULL DEFAULT 1,
        created_by_deal_id TEXT,
        created_at TEXT,
        updated_at TEXT
    )",
    "CREATE INDEX IF NOT EXISTS idx_swap_rights_owner ON swap_rights(owner_team)",
    "CREATE INDEX IF NOT EXISTS idx_swap_rights_year_round ON swap_rights(year, round)",
    "CREATE TABLE IF NOT EXISTS fixed_assets (
        asset_id TEXT PRIMARY KEY,
        label TEXT,
        value REAL,
        owner_team TEXT NOT NULL,
        source_pick_id TEXT,
        draft_year INTEGER,
        attrs_json TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_fixed_assets_owner ON fixed_assets(owner_team)",
    "CREATE TABLE IF NOT EXISTS transactions_log (
        tx_hash TEXT PRIMARY KEY,
        tx_type TEXT NOT NULL,
        tx_date TEXT,
        deal_id TEXT,
        source TEXT,
        teams_json TEXT,
        payload_json TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_tx_date ON transactions_log(tx_date)",
    "CREATE TABLE IF NOT EXISTS player_contracts (
        player_id TEXT NOT NULL,
        contract_id TEXT NOT NULL,
        PRIMARY KEY(player_id, contract_id),
        FOREIGN KEY(player_id) REFERENCES players(player_id) ON DELETE CASCADE,
        FOREIGN KEY(contract_id) REFERENCES contracts(contract_id) ON DELETE CASCADE
    )",
    "CREATE TABLE IF NOT EXISTS active_contracts (
        player_id TEXT PRIMARY KEY,
        contract_id TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        FOREIGN KEY(player_id) REFERENCES players(player_id) ON DELETE CASCADE,
        FOREIGN KEY(contract_id) REFERENCES contracts(contract_id) ON DELETE CASCADE
    )",
    "CREATE TABLE IF NOT EXISTS free_agents (
        player_id TEXT PRIMARY KEY,
        updated_at TEXT NOT NULL,
        FOREIGN KEY(player_id) REFERENCES players(player_id) ON DELETE CASCADE
    )",
    "CREATE TABLE IF NOT EXISTS trade_agreements (
        deal_id TEXT PRIMARY KEY,
        deal_json TEXT NOT NULL,
        assets_hash TEXT NOT NULL,
        created_at TEXT NOT NULL,
        expires_at TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'ACTIVE'
    )",
    "CREATE INDEX IF NOT EXISTS idx_trade_agreements_status ON trade_agreements(status)",
    "CREATE TABLE IF NOT EXISTS asset_locks (
        asset_key TEXT PRIMARY KEY,
        deal_id TEXT NOT NULL,
        expires_at TEXT
    )",
    "CREATE INDEX IF NOT EXISTS idx_asset_locks_deal ON asset_locks(deal_id)",
    "CREATE TABLE IF NOT EXISTS negotiations (
        session_id TEXT PRIMARY KEY,
        payload_json TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS gm_profiles (
        team_id TEXT PRIMARY KEY,
        profile_json TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS master_schedule (
        game_id TEXT PRIMARY KEY,
        date TEXT NOT NULL,
        home_team_id TEXT NOT NULL,
        away_team_id TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'scheduled',
        home_score INTEGER,
        away_score INTEGER,
        season_id TEXT NOT NULL,
        phase TEXT NOT NULL DEFAULT 'regular'
    )",
    "CREATE INDEX IF NOT EXISTS idx_master_schedule_date ON master_schedule(date)",
    "CREATE INDEX IF NOT EXISTS idx_master_schedule_season ON master_schedule(season_id)",
];

/// SQLite has no ADD COLUMN IF NOT EXISTS; check `PRAGMA table_info` first.
async fn ensure_table_columns(
    conn: &mut SqliteConnection,
    table: &str,
    columns: &[(&str, &str)],
) -> DbResult<()> {
    let rows = sqlx::query(&format!("PRAGMA table_info({table})"))
        .fetch_all(&mut *conn)
        .await?;
    let existing: Vec<String> = rows
        .iter()
        .filter_map(|row| row.try_get::<String, _>("name").ok())
        .collect();
    for (column, ddl) in columns {
        if existing.iter().any(|name| name == column) {
            continue;
        }
        sqlx::query(&format!("ALTER TABLE {table} ADD COLUMN {column} {ddl}"))
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

async fn user_version(conn: &mut SqliteConnection) -> DbResult<i32> {
    let version: i32 = sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(&mut *conn)
        .await?;
    Ok(version)
}

/// Idempotent schema bootstrap: DDL, column backfills, meta rows and the
/// user-version counter. Must not be called with a transaction open; the
/// repository handle enforces that.
pub async fn init_db(conn: &mut SqliteConnection) -> DbResult<()> {
    for statement in DDL {
        sqlx::query(statement).execute(&mut *conn).await?;
    }

    // Post-DDL column backfills run in a normal write transaction.
    let mut tx = conn.begin().await?;
    ensure_table_columns(
        &mut tx,
        "contracts",
        &[
            ("signed_date", "TEXT"),
            ("start_season_year", "INTEGER"),
            ("years", "INTEGER"),
            ("options_json", "TEXT"),
            ("status", "TEXT"),
            ("contract_json", "TEXT"),
        ],
    )
    .await?;
    ensure_table_columns(&mut tx, "players", &[("trade_meta_json", "TEXT")]).await?;

    let now = utc_now_iso();
    sqlx::query(
        "INSERT INTO meta(key, value) VALUES ('schema_version', ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
    )
    .bind(SCHEMA_VERSION)
    .execute(&mut *tx)
    .await?;
    sqlx::query("INSERT OR IGNORE INTO meta(key, value) VALUES ('created_at', ?)")
        .bind(&now)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    let version = user_version(conn).await?;
    if version < LATEST_USER_VERSION {
        sqlx::query(&format!("PRAGMA user_version = {LATEST_USER_VERSION}"))
            .execute(&mut *conn)
            .await?;
        tracing::debug!(from = version, to = LATEST_USER_VERSION, "migrated user_version");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::create_memory_pool;

    #[tokio::test]
    async fn test_init_db_is_idempotent() {
        let pool = create_memory_pool().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        init_db(&mut conn).await.unwrap();
        init_db(&mut conn).await.unwrap();

        let version: String =
            sqlx::query_scalar("SELECT value FROM meta WHERE key='schema_version'")
                .fetch_one(&mut *conn)
                .await
                .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
        assert_eq!(user_version(&mut conn).await.unwrap(), LATEST_USER_VERSION);
    }

    #[tokio::test]
    async fn test_contracts_table_gains_extended_columns() {
        let pool = create_memory_pool().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        init_db(&mut conn).await.unwrap();

        let rows = sqlx::query("PRAGMA table_info(contracts)")
            .fetch_all(&mut *conn)
            .await
            .unwrap();
        let names: Vec<String> = rows
            .iter()
            .map(|row| row.try_get::<String, _>("name").unwrap())
            .collect();
        for expected in ["signed_date", "years", "options_json", "status", "contract_json"] {
            assert!(names.iter().any(|n| n == expected), "missing {expected}");
        }
    }
}
