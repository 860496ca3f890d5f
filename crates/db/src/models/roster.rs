use domain::models::RosterEntry;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct RosterDb {
    pub player_id: String,
    pub team_id: String,
    pub salary_amount: Option<i64>,
    pub status: String,
    pub updated_at: String,
}

impl RosterDb {
    pub fn to_domain(&self) -> RosterEntry {
        RosterEntry {
            player_id: self.player_id.clone(),
            team_id: self.team_id.to_uppercase(),
            salary_amount: self.salary_amount,
            status: self.status.clone(),
            updated_at: self.updated_at.clone(),
        }
    }
}
