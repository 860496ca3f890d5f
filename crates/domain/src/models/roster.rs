use serde::{Deserialize, Serialize};

use crate::league::FREE_AGENT_TEAM_ID;

/// One active roster slot. `player_id` is the primary key: a player occupies
/// at most one slot league-wide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub player_id: String,
    pub team_id: String,
    pub salary_amount: Option<i64>,
    pub status: String,
    pub updated_at: String,
}

impl RosterEntry {
    pub fn is_free_agent(&self) -> bool {
        self.team_id.eq_ignore_ascii_case(FREE_AGENT_TEAM_ID)
    }
}
