use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    #[serde(rename = "scheduled")]
    Scheduled,
    #[serde(rename = "final")]
    Final,
    #[serde(rename = "in_progress")]
    InProgress,
    #[serde(rename = "canceled")]
    Canceled,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Scheduled => "scheduled",
            GameStatus::Final => "final",
            GameStatus::InProgress => "in_progress",
            GameStatus::Canceled => "canceled",
        }
    }

    pub fn parse(value: &str) -> DomainResult<Self> {
        match value {
            "scheduled" => Ok(GameStatus::Scheduled),
            "final" => Ok(GameStatus::Final),
            "in_progress" => Ok(GameStatus::InProgress),
            "canceled" => Ok(GameStatus::Canceled),
            other => Err(DomainError::ValidationError(format!(
                "invalid game status: {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    #[serde(rename = "regular")]
    Regular,
    #[serde(rename = "play_in")]
    PlayIn,
    #[serde(rename = "playoffs")]
    Playoffs,
    #[serde(rename = "preseason")]
    Preseason,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Regular => "regular",
            GamePhase::PlayIn => "play_in",
            GamePhase::Playoffs => "playoffs",
            GamePhase::Preseason => "preseason",
        }
    }

    pub fn parse(value: &str) -> DomainResult<Self> {
        match value {
            "regular" => Ok(GamePhase::Regular),
            "play_in" => Ok(GamePhase::PlayIn),
            "playoffs" => Ok(GamePhase::Playoffs),
            "preseason" => Ok(GamePhase::Preseason),
            other => Err(DomainError::ValidationError(format!(
                "invalid game phase: {other:?}"
            ))),
        }
    }
}

/// One master-schedule entry. `game_id = "{date}_{home}_{away}"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledGame {
    pub game_id: String,
    pub date: NaiveDate,
    pub home_team_id: String,
    pub away_team_id: String,
    pub status: GameStatus,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    pub season_id: String,
    pub phase: GamePhase,
}

impl ScheduledGame {
    pub fn make_game_id(date: NaiveDate, home: &str, away: &str) -> String {
        format!("{date}_{home}_{away}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_and_phase_strings() {
        assert_eq!(GameStatus::parse("final").unwrap(), GameStatus::Final);
        assert!(GameStatus::parse("FINAL").is_err());
        assert_eq!(GamePhase::parse("play_in").unwrap(), GamePhase::PlayIn);
        assert_eq!(GamePhase::Playoffs.as_str(), "playoffs");
    }

    #[test]
    fn test_game_id_format() {
        let date = NaiveDate::from_ymd_opt(2025, 10, 19).unwrap();
        assert_eq!(
            ScheduledGame::make_game_id(date, "ATL", "BOS"),
            "2025-10-19_ATL_BOS"
        );
    }
}
