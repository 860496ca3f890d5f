use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub player_id: String,
    pub name: Option<String>,
    pub pos: Option<String>,
    pub age: Option<i32>,
    pub height_in: Option<i32>,
    pub weight_lb: Option<i32>,
    pub ovr: Option<i32>,
    /// Free-form attributes carried through import/export untouched.
    #[serde(default)]
    pub attrs: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractAction {
    #[serde(rename = "SIGN_FREE_AGENT")]
    SignFreeAgent,
    #[serde(rename = "RE_SIGN_OR_EXTEND")]
    ReSignOrExtend,
}

/// Trade-eligibility metadata stamped on a player by contract operations and
/// trade apply. Consumed by `PlayerEligibilityRule` and
/// `ReturnToTradingTeamRule`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerTradeMeta {
    #[serde(default)]
    pub signed_date: Option<NaiveDate>,
    #[serde(default)]
    pub signed_via_free_agency: bool,
    #[serde(default)]
    pub last_contract_action: Option<ContractAction>,
    #[serde(default)]
    pub last_contract_action_date: Option<NaiveDate>,
    #[serde(default)]
    pub acquired_date: Option<NaiveDate>,
    #[serde(default)]
    pub acquired_via_trade: bool,
    /// season_year (as string) -> team ids the player cannot be traded back
    /// to within that season.
    #[serde(default)]
    pub trade_return_bans: BTreeMap<String, Vec<String>>,
}

impl PlayerTradeMeta {
    pub fn record_trade_acquisition(&mut self, from_team: &str, season_year: i32, date: NaiveDate) {
        self.acquired_date = Some(date);
        self.acquired_via_trade = true;
        let bans = self
            .trade_return_bans
            .entry(season_year.to_string())
            .or_default();
        if !bans.iter().any(|t| t == from_team) {
            bans.push(from_team.to_string());
        }
    }

    pub fn record_contract_action(&mut self, action: ContractAction, date: NaiveDate) {
        self.last_contract_action = Some(action);
        self.last_contract_action_date = Some(date);
        self.signed_date = Some(date);
        if action == ContractAction::SignFreeAgent {
            self.signed_via_free_agency = true;
        }
    }

    pub fn return_ban_teams(&self, season_year: i32) -> &[String] {
        self.trade_return_bans
            .get(&season_year.to_string())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}

/// Convert `6' 5"` style height strings to inches.
pub fn parse_height_in(value: &str) -> Option<i32> {
    let s = value.trim();
    if s.is_empty() {
        return None;
    }
    let (feet_part, rest) = s.split_once('\'')?;
    let feet: i32 = feet_part.trim().parse().ok()?;
    let inches_part = rest.trim().trim_end_matches('"').trim();
    let inches: i32 = inches_part.parse().ok()?;
    Some(feet * 12 + inches)
}

/// Convert `205 lbs` style weight strings to pounds.
pub fn parse_weight_lb(value: &str) -> Option<i32> {
    let s = value.trim().replace(',', "");
    if s.is_empty() {
        return None;
    }
    let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Parse a salary into integer dollars. Accepts `15161800`, `"15,161,800"`,
/// `"$15,161,800"` and floats (rounded).
pub fn parse_salary_amount(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i)
            } else {
                n.as_f64().map(|f| f.round() as i64)
            }
        }
        Value::String(s) => {
            let cleaned = s.trim().replace(['$', ','], "");
            if cleaned.is_empty() {
                return None;
            }
            cleaned.parse::<i64>().ok()
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_height() {
        assert_eq!(parse_height_in("6' 5\""), Some(77));
        assert_eq!(parse_height_in("7'0\""), Some(84));
        assert_eq!(parse_height_in("tall"), None);
        assert_eq!(parse_height_in(""), None);
    }

    #[test]
    fn test_parse_weight() {
        assert_eq!(parse_weight_lb("205 lbs"), Some(205));
        assert_eq!(parse_weight_lb("205"), Some(205));
        assert_eq!(parse_weight_lb("heavy"), None);
    }

    #[test]
    fn test_parse_salary() {
        assert_eq!(parse_salary_amount(&json!(15_161_800)), Some(15_161_800));
        assert_eq!(parse_salary_amount(&json!("$15,161,800")), Some(15_161_800));
        assert_eq!(parse_salary_amount(&json!(1_000_000.4)), Some(1_000_000));
        assert_eq!(parse_salary_amount(&json!(null)), None);
        assert_eq!(parse_salary_amount(&json!("")), None);
    }

    #[test]
    fn test_trade_meta_acquisition_ban() {
        let mut meta = PlayerTradeMeta::default();
        let date = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        meta.record_trade_acquisition("ATL", 2025, date);
        meta.record_trade_acquisition("ATL", 2025, date);
        assert!(meta.acquired_via_trade);
        assert_eq!(meta.return_ban_teams(2025), ["ATL".to_string()]);
        assert!(meta.return_ban_teams(2026).is_empty());
    }

    #[test]
    fn test_trade_meta_roundtrips_through_json() {
        let mut meta = PlayerTradeMeta::default();
        meta.record_contract_action(
            ContractAction::SignFreeAgent,
            NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
        );
        let raw = serde_json::to_string(&meta).unwrap();
        let back: PlayerTradeMeta = serde_json::from_str(&raw).unwrap();
        assert_eq!(meta, back);
        assert!(back.signed_via_free_agency);
    }
}
