//! Key-value league metadata: schema version, season/draft year, current
//! date, and the trade-rules configuration (stored as JSON).

use domain::TradeRulesConfig;
use sqlx::sqlite::SqliteConnection;

use crate::errors::DbResult;

pub const KEY_SCHEMA_VERSION: &str = "schema_version";
pub const KEY_SEASON_YEAR: &str = "season_year";
pub const KEY_DRAFT_YEAR: &str = "draft_year";
pub const KEY_SEASON_START: &str = "season_start";
pub const KEY_CURRENT_DATE: &str = "current_date";
pub const KEY_TRADE_RULES: &str = "trade_rules";

pub async fn set_meta(conn: &mut SqliteConnection, key: &str, value: &str) -> DbResult<()> {
    sqlx::query(
        "INSERT INTO meta(key, value) VALUES (?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
    )
    .bind(key)
    .bind(value)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn get_meta(conn: &mut SqliteConnection, key: &str) -> DbResult<Option<String>> {
    let value: Option<String> = sqlx::query_scalar("SELECT value FROM meta WHERE key = ?")
        .bind(key)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(value)
}

pub async fn get_schema_version(conn: &mut SqliteConnection) -> DbResult<Option<String>> {
    get_meta(conn, KEY_SCHEMA_VERSION).await
}

pub async fn set_season_year(conn: &mut SqliteConnection, year: i32) -> DbResult<()> {
    set_meta(conn, KEY_SEASON_YEAR, &year.to_string()).await
}

pub async fn get_season_year(conn: &mut SqliteConnection) -> DbResult<Option<i32>> {
    Ok(get_meta(conn, KEY_SEASON_YEAR)
        .await?
        .and_then(|v| v.parse().ok()))
}

pub async fn set_draft_year(conn: &mut SqliteConnection, year: i32) -> DbResult<()> {
    set_meta(conn, KEY_DRAFT_YEAR, &year.to_string()).await
}

pub async fn get_draft_year(conn: &mut SqliteConnection) -> DbResult<Option<i32>> {
    Ok(get_meta(conn, KEY_DRAFT_YEAR)
        .await?
        .and_then(|v| v.parse().ok()))
}

pub async fn save_trade_rules(
    conn: &mut SqliteConnection,
    config: &TradeRulesConfig,
) -> DbResult<()> {
    let raw = serde_json::to_string(config)?;
    set_meta(conn, KEY_TRADE_RULES, &raw).await
}

/// Load the trade-rules config; missing or partial records are filled with
/// defaults.
pub async fn load_trade_rules(conn: &mut SqliteConnection) -> DbResult<TradeRulesConfig> {
    match get_meta(conn, KEY_TRADE_RULES).await? {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Ok(TradeRulesConfig::default()),
    }
}
