use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};
use crate::ids::season_id_from_year;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractStatus {
    #[serde(rename = "ACTIVE")]
    Active,
    #[serde(rename = "EXPIRED")]
    Expired,
}

impl ContractStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractStatus::Active => "ACTIVE",
            ContractStatus::Expired => "EXPIRED",
        }
    }

    pub fn parse(value: &str) -> DomainResult<Self> {
        match value.trim().to_uppercase().as_str() {
            "ACTIVE" => Ok(ContractStatus::Active),
            "EXPIRED" => Ok(ContractStatus::Expired),
            other => Err(DomainError::ValidationError(format!(
                "invalid contract status: {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionType {
    #[serde(rename = "TEAM")]
    Team,
    #[serde(rename = "PLAYER")]
    Player,
    #[serde(rename = "ETO")]
    Eto,
}

impl OptionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionType::Team => "TEAM",
            OptionType::Player => "PLAYER",
            OptionType::Eto => "ETO",
        }
    }

    pub fn parse(value: &str) -> DomainResult<Self> {
        match value.trim().to_uppercase().as_str() {
            "TEAM" => Ok(OptionType::Team),
            "PLAYER" => Ok(OptionType::Player),
            "ETO" => Ok(OptionType::Eto),
            other => Err(DomainError::ValidationError(format!(
                "invalid option type: {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionStatus {
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "EXERCISED")]
    Exercised,
    #[serde(rename = "DECLINED")]
    Declined,
}

impl OptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionStatus::Pending => "PENDING",
            OptionStatus::Exercised => "EXERCISED",
            OptionStatus::Declined => "DECLINED",
        }
    }

    pub fn parse(value: &str) -> DomainResult<Self> {
        match value.trim().to_uppercase().as_str() {
            "PENDING" => Ok(OptionStatus::Pending),
            "EXERCISED" => Ok(OptionStatus::Exercised),
            "DECLINED" => Ok(OptionStatus::Declined),
            other => Err(DomainError::ValidationError(format!(
                "invalid option status: {other:?}"
            ))),
        }
    }
}

/// One optional contract year. `decision_date` is null while PENDING.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractOption {
    pub season_year: i32,
    #[serde(rename = "type")]
    pub option_type: OptionType,
    pub status: OptionStatus,
    #[serde(default)]
    pub decision_date: Option<String>,
}

impl ContractOption {
    /// Canonicalize a raw option record: statuses and types uppercased,
    /// unknown values rejected.
    pub fn normalize(raw: &serde_json::Value) -> DomainResult<Self> {
        let obj = raw
            .as_object()
            .ok_or_else(|| DomainError::ValidationError("option record must be an object".into()))?;
        let season_year = obj
            .get("season_year")
            .and_then(|v| v.as_i64())
            .ok_or_else(|| DomainError::ValidationError("option record missing season_year".into()))?
            as i32;
        let option_type = obj
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or_else(|| DomainError::ValidationError("option record missing type".into()))?;
        let status = obj
            .get("status")
            .and_then(|v| v.as_str())
            .ok_or_else(|| DomainError::ValidationError("option record missing status".into()))?;
        let decision_date = obj
            .get("decision_date")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        Ok(ContractOption {
            season_year,
            option_type: OptionType::parse(option_type)?,
            status: OptionStatus::parse(status)?,
            decision_date,
        })
    }
}

/// A player contract. `salary_by_year` maps season start years (as strings)
/// to integer dollars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub contract_id: String,
    pub player_id: String,
    pub team_id: String,
    pub signed_date: String,
    pub start_season_year: i32,
    pub years: i32,
    pub salary_by_year: BTreeMap<String, i64>,
    #[serde(default)]
    pub options: Vec<ContractOption>,
    pub status: ContractStatus,
    #[serde(default)]
    pub is_active: bool,
}

impl Contract {
    pub fn start_season_id(&self) -> String {
        season_id_from_year(self.start_season_year)
    }

    pub fn end_season_id(&self) -> String {
        season_id_from_year(self.start_season_year + (self.years - 1).max(0))
    }

    pub fn salary_for_season(&self, season_year: i32) -> i64 {
        self.salary_by_year
            .get(&season_year.to_string())
            .copied()
            .unwrap_or(0)
    }

    /// Indices of PENDING options for the given season.
    pub fn pending_option_indices(&self, season_year: i32) -> Vec<usize> {
        self.options
            .iter()
            .enumerate()
            .filter(|(_, o)| o.season_year == season_year && o.status == OptionStatus::Pending)
            .map(|(i, _)| i)
            .collect()
    }

    /// Resolve a pending option. Declining removes that season's salary year.
    pub fn apply_option_decision(
        &mut self,
        option_index: usize,
        exercise: bool,
        decision_date: &str,
    ) -> DomainResult<()> {
        let option = self.options.get_mut(option_index).ok_or_else(|| {
            DomainError::ValidationError(format!("option index out of range: {option_index}"))
        })?;
        option.status = if exercise {
            OptionStatus::Exercised
        } else {
            OptionStatus::Declined
        };
        option.decision_date = Some(decision_date.to_string());
        if !exercise {
            let season_key = option.season_year.to_string();
            self.salary_by_year.remove(&season_key);
        }
        Ok(())
    }

    /// Recompute `years` as the longest consecutive run of salary years
    /// starting at `start_season_year`.
    pub fn recompute_years_from_salary(&mut self) {
        let mut years = 0;
        let mut current = self.start_season_year;
        while self.salary_by_year.contains_key(&current.to_string()) {
            years += 1;
            current += 1;
        }
        self.years = years;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn contract_with_years(salaries: &[(i32, i64)]) -> Contract {
        Contract {
            contract_id: "C1".to_string(),
            player_id: "P000001".to_string(),
            team_id: "ATL".to_string(),
            signed_date: "2024-07-01".to_string(),
            start_season_year: 2025,
            years: salaries.len() as i32,
            salary_by_year: salaries
                .iter()
                .map(|(y, s)| (y.to_string(), *s))
                .collect(),
            options: vec![],
            status: ContractStatus::Active,
            is_active: true,
        }
    }

    #[test]
    fn test_season_ids() {
        let c = contract_with_years(&[(2025, 1_000_000), (2026, 1_100_000)]);
        assert_eq!(c.start_season_id(), "2025-26");
        assert_eq!(c.end_season_id(), "2026-27");
    }

    #[test]
    fn test_option_normalize() {
        let raw = json!({
            "season_year": 2027,
            "type": "player",
            "status": "pending",
        });
        let option = ContractOption::normalize(&raw).unwrap();
        assert_eq!(option.option_type, OptionType::Player);
        assert_eq!(option.status, OptionStatus::Pending);
        assert!(option.decision_date.is_none());

        let bad = json!({"season_year": 2027, "type": "MAGIC", "status": "PENDING"});
        assert!(ContractOption::normalize(&bad).is_err());
    }

    #[test]
    fn test_decline_removes_salary_year_and_recompute() {
        let mut c = contract_with_years(&[(2025, 1_000_000), (2026, 1_100_000), (2027, 1_200_000)]);
        c.options.push(ContractOption {
            season_year: 2027,
            option_type: OptionType::Player,
            status: OptionStatus::Pending,
            decision_date: None,
        });

        c.apply_option_decision(0, false, "2026-07-01").unwrap();
        assert_eq!(c.options[0].status, OptionStatus::Declined);
        assert!(!c.salary_by_year.contains_key("2027"));

        c.recompute_years_from_salary();
        assert_eq!(c.years, 2);
    }

    #[test]
    fn test_recompute_years_stops_at_gap() {
        let mut c = contract_with_years(&[(2025, 1), (2027, 1)]);
        c.recompute_years_from_salary();
        assert_eq!(c.years, 1);
    }

    #[test]
    fn test_pending_option_indices() {
        let mut c = contract_with_years(&[(2025, 1)]);
        c.options.push(ContractOption {
            season_year: 2026,
            option_type: OptionType::Team,
            status: OptionStatus::Pending,
            decision_date: None,
        });
        c.options.push(ContractOption {
            season_year: 2026,
            option_type: OptionType::Eto,
            status: OptionStatus::Exercised,
            decision_date: Some("2025-06-30".to_string()),
        });
        assert_eq!(c.pending_option_indices(2026), vec![0]);
        assert!(c.pending_option_indices(2027).is_empty());
    }
}
