use std::collections::BTreeMap;

use domain::models::{Contract, ContractOption, ContractStatus};
use sqlx::FromRow;

use crate::errors::{DbError, DbResult};

/// Row shape of `contracts`. `contract_json` carries the full record; the
/// other columns are query projections kept in sync with it.
#[derive(Debug, Clone, FromRow)]
pub struct ContractDb {
    pub contract_id: String,
    pub player_id: String,
    pub team_id: String,
    pub start_season_id: Option<String>,
    pub end_season_id: Option<String>,
    pub salary_by_season_json: Option<String>,
    pub contract_type: Option<String>,
    pub is_active: i64,
    pub updated_at: String,
    pub signed_date: Option<String>,
    pub start_season_year: Option<i64>,
    pub years: Option<i64>,
    pub options_json: Option<String>,
    pub status: Option<String>,
    pub contract_json: Option<String>,
}

impl ContractDb {
    pub fn to_domain(&self) -> DbResult<Contract> {
        let salary_by_year: BTreeMap<String, i64> = match &self.salary_by_season_json {
            Some(raw) if !raw.is_empty() => {
                // Legacy rows may carry float salaries; round at the boundary.
                let raw_map: BTreeMap<String, serde_json::Value> = serde_json::from_str(raw)
                    .map_err(|e| {
                        DbError::MappingError(format!("contracts.salary_by_season_json: {e}"))
                    })?;
                raw_map
                    .into_iter()
                    .map(|(year, value)| {
                        let amount = value
                            .as_i64()
                            .or_else(|| value.as_f64().map(|f| f.round() as i64))
                            .unwrap_or(0);
                        (year, amount)
                    })
                    .collect()
            }
            _ => BTreeMap::new(),
        };

        let options: Vec<ContractOption> = match &self.options_json {
            Some(raw) if !raw.is_empty() => {
                let raw_options: Vec<serde_json::Value> = serde_json::from_str(raw)
                    .map_err(|e| DbError::MappingError(format!("contracts.options_json: {e}")))?;
                raw_options
                    .iter()
                    .map(ContractOption::normalize)
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| DbError::MappingError(e.to_string()))?
            }
            _ => Vec::new(),
        };

        let status = match self.status.as_deref() {
            Some(raw) if !raw.trim().is_empty() => ContractStatus::parse(raw)
                .map_err(|e| DbError::MappingError(e.to_string()))?,
            _ if self.is_active != 0 => ContractStatus::Active,
            _ => ContractStatus::Expired,
        };

        Ok(Contract {
            contract_id: self.contract_id.clone(),
            player_id: self.player_id.clone(),
            team_id: self.team_id.to_uppercase(),
            signed_date: self
                .signed_date
                .clone()
                .unwrap_or_else(|| "1900-01-01".to_string()),
            start_season_year: self.start_season_year.unwrap_or(0) as i32,
            years: self.years.unwrap_or(0) as i32,
            salary_by_year,
            options,
            status,
            is_active: self.is_active != 0,
        })
    }
}
