use domain::models::{GamePhase, GameStatus, ScheduledGame};
use sqlx::FromRow;

use crate::errors::{DbError, DbResult};

#[derive(Debug, Clone, FromRow)]
pub struct ScheduledGameDb {
    pub game_id: String,
    pub date: String,
    pub home_team_id: String,
    pub away_team_id: String,
    pub status: String,
    pub home_score: Option<i64>,
    pub away_score: Option<i64>,
    pub season_id: String,
    pub phase: String,
}

impl ScheduledGameDb {
    pub fn from_domain(game: &ScheduledGame) -> Self {
        Self {
            game_id: game.game_id.clone(),
            date: game.date.to_string(),
            home_team_id: game.home_team_id.clone(),
            away_team_id: game.away_team_id.clone(),
            status: game.status.as_str().to_string(),
            home_score: game.home_score.map(i64::from),
            away_score: game.away_score.map(i64::from),
            season_id: game.season_id.clone(),
            phase: game.phase.as_str().to_string(),
        }
    }

    pub fn to_domain(&self) -> DbResult<ScheduledGame> {
        Ok(ScheduledGame {
            game_id: self.game_id.clone(),
            date: self
                .date
                .parse()
                .map_err(|_| DbError::MappingError(format!("master_schedule.date: {:?}", self.date)))?,
            home_team_id: self.home_team_id.clone(),
            away_team_id: self.away_team_id.clone(),
            status: GameStatus::parse(&self.status)
                .map_err(|e| DbError::MappingError(e.to_string()))?,
            home_score: self.home_score.map(|v| v as i32),
            away_score: self.away_score.map(|v| v as i32),
            season_id: self.season_id.clone(),
            phase: GamePhase::parse(&self.phase)
                .map_err(|e| DbError::MappingError(e.to_string()))?,
        })
    }
}
