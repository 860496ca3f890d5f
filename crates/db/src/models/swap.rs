use domain::models::SwapRight;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct SwapRightDb {
    pub swap_id: String,
    pub pick_id_a: String,
    pub pick_id_b: String,
    pub year: Option<i64>,
    pub round: Option<i64>,
    pub owner_team: String,
    pub active: i64,
    pub created_by_deal_id: Option<String>,
}

impl SwapRightDb {
    pub fn to_domain(&self) -> SwapRight {
        SwapRight {
            swap_id: self.swap_id.clone(),
            pick_id_a: self.pick_id_a.clone(),
            pick_id_b: self.pick_id_b.clone(),
            year: self.year.map(|v| v as i32),
            round: self.round.map(|v| v as u8),
            owner_team: self.owner_team.to_uppercase(),
            active: self.active != 0,
            created_by_deal_id: self.created_by_deal_id.clone(),
        }
    }
}
