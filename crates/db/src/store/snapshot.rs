//! Consistent trade-validation snapshot, read in one transaction so every
//! rule sees the same state.

use chrono::NaiveDate;
use domain::services::rules::{PlayerTradeState, TradeSnapshot};
use sqlx::sqlite::SqliteConnection;

use crate::errors::DbResult;
use crate::store::{agreements, fixed_assets, picks, roster, swaps};

/// Assemble the full snapshot. Expired asset locks are released here, inside
/// the same transaction, so validation only sees live locks.
pub async fn build_trade_snapshot(
    conn: &mut SqliteConnection,
    today: NaiveDate,
) -> DbResult<TradeSnapshot> {
    let mut snapshot = TradeSnapshot::default();

    let player_rows: Vec<(String, String, Option<i64>, Option<String>)> = sqlx::query_as(
        "SELECT r.player_id, r.team_id, r.salary_amount, p.trade_meta_json
         FROM roster r
         JOIN players p ON p.player_id = r.player_id
         WHERE r.status = 'active'",
    )
    .fetch_all(&mut *conn)
    .await?;
    for (player_id, team_id, salary_amount, trade_meta_json) in player_rows {
        let meta = trade_meta_json
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default();
        snapshot.players.insert(
            player_id,
            PlayerTradeState {
                team_id: team_id.to_uppercase(),
                salary_amount: salary_amount.unwrap_or(0),
                meta,
            },
        );
    }

    snapshot.picks = picks::all_picks(&mut *conn).await?;
    snapshot.swaps = swaps::all_swaps(&mut *conn).await?;
    snapshot.fixed_assets = fixed_assets::all_fixed_assets(&mut *conn).await?;
    snapshot.locks = agreements::live_locks(&mut *conn, today).await?;
    snapshot.roster_counts = roster::roster_counts(&mut *conn).await?;

    Ok(snapshot)
}
