use domain::models::{GameStatus, ScheduledGame};
use sqlx::sqlite::SqliteConnection;

use crate::errors::{DbError, DbResult};
use crate::models::ScheduledGameDb;

/// Replace the schedule rows for one season.
pub async fn replace_season_schedule(
    conn: &mut SqliteConnection,
    season_id: &str,
    games: &[ScheduledGame],
) -> DbResult<()> {
    sqlx::query("DELETE FROM master_schedule WHERE season_id = ?")
        .bind(season_id)
        .execute(&mut *conn)
        .await?;
    for game in games {
        let row = ScheduledGameDb::from_domain(game);
        sqlx::query(
            "INSERT OR REPLACE INTO master_schedule(game_id, date, home_team_id, away_team_id, status, home_score, away_score, season_id, phase)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&row.game_id)
        .bind(&row.date)
        .bind(&row.home_team_id)
        .bind(&row.away_team_id)
        .bind(&row.status)
        .bind(row.home_score)
        .bind(row.away_score)
        .bind(&row.season_id)
        .bind(&row.phase)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

pub async fn list_season_schedule(
    conn: &mut SqliteConnection,
    season_id: &str,
) -> DbResult<Vec<ScheduledGame>> {
    let rows: Vec<ScheduledGameDb> = sqlx::query_as(
        "SELECT game_id, date, home_team_id, away_team_id, status, home_score, away_score, season_id, phase
         FROM master_schedule WHERE season_id = ? ORDER BY date, game_id",
    )
    .bind(season_id)
    .fetch_all(&mut *conn)
    .await?;
    rows.iter().map(ScheduledGameDb::to_domain).collect()
}

pub async fn get_game(
    conn: &mut SqliteConnection,
    game_id: &str,
) -> DbResult<Option<ScheduledGame>> {
    let row: Option<ScheduledGameDb> = sqlx::query_as(
        "SELECT game_id, date, home_team_id, away_team_id, status, home_score, away_score, season_id, phase
         FROM master_schedule WHERE game_id = ?",
    )
    .bind(game_id)
    .fetch_optional(&mut *conn)
    .await?;
    row.map(|r| r.to_domain()).transpose()
}

pub async fn mark_game_final(
    conn: &mut SqliteConnection,
    game_id: &str,
    home_score: i32,
    away_score: i32,
) -> DbResult<()> {
    let result = sqlx::query(
        "UPDATE master_schedule SET status = ?, home_score = ?, away_score = ? WHERE game_id = ?",
    )
    .bind(GameStatus::Final.as_str())
    .bind(home_score as i64)
    .bind(away_score as i64)
    .bind(game_id)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound(format!("game not found: {game_id}")));
    }
    Ok(())
}
