use domain::models::{DraftPick, PickProtection};
use sqlx::FromRow;

use crate::errors::{DbError, DbResult};

#[derive(Debug, Clone, FromRow)]
pub struct DraftPickDb {
    pub pick_id: String,
    pub year: i64,
    pub round: i64,
    pub original_team: String,
    pub owner_team: String,
    pub protection_json: Option<String>,
}

impl DraftPickDb {
    pub fn to_domain(&self) -> DbResult<DraftPick> {
        let protection: Option<PickProtection> = match &self.protection_json {
            Some(raw) if !raw.is_empty() => Some(
                serde_json::from_str(raw)
                    .map_err(|e| DbError::MappingError(format!("draft_picks.protection_json: {e}")))?,
            ),
            _ => None,
        };
        Ok(DraftPick {
            pick_id: self.pick_id.clone(),
            year: self.year as i32,
            round: self.round as u8,
            original_team: self.original_team.to_uppercase(),
            owner_team: self.owner_team.to_uppercase(),
            protection,
        })
    }
}
