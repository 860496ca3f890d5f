use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{TradeCode, TradeError, TradeResult};
use crate::ids::parse_pick_id;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickCompensation {
    pub label: String,
    pub value: f64,
}

/// TOP_N protection: if the pick lands in the top N of the draft order it
/// reverts, and the receiving team gets the compensation instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickProtection {
    #[serde(rename = "type")]
    pub protection_type: String,
    pub n: u8,
    pub compensation: PickCompensation,
}

const DEFAULT_COMPENSATION_LABEL: &str = "Protected pick compensation";

/// Validate and canonicalize a raw protection payload.
pub fn normalize_protection(raw: &Value) -> TradeResult<PickProtection> {
    let obj = raw.as_object().ok_or_else(|| {
        TradeError::with_details(
            TradeCode::ProtectionInvalid,
            "Protection must be an object",
            raw.clone(),
        )
    })?;

    let protection_type = obj
        .get("type")
        .or_else(|| obj.get("rule"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            TradeError::with_details(
                TradeCode::ProtectionInvalid,
                "Protection type is required",
                raw.clone(),
            )
        })?
        .trim()
        .to_uppercase();
    if protection_type != "TOP_N" {
        return Err(TradeError::with_details(
            TradeCode::ProtectionInvalid,
            "Unsupported protection type",
            raw.clone(),
        ));
    }

    let n = obj.get("n").and_then(|v| v.as_i64()).ok_or_else(|| {
        TradeError::with_details(
            TradeCode::ProtectionInvalid,
            "Protection n must be an integer",
            raw.clone(),
        )
    })?;
    if !(1..=30).contains(&n) {
        return Err(TradeError::with_details(
            TradeCode::ProtectionInvalid,
            "Protection n out of range",
            raw.clone(),
        ));
    }

    let compensation = obj
        .get("compensation")
        .and_then(|v| v.as_object())
        .ok_or_else(|| {
            TradeError::with_details(
                TradeCode::ProtectionInvalid,
                "Protection compensation must be an object",
                raw.clone(),
            )
        })?;
    let value = compensation
        .get("value")
        .and_then(|v| v.as_f64())
        .ok_or_else(|| {
            TradeError::with_details(
                TradeCode::ProtectionInvalid,
                "Protection compensation value must be numeric",
                raw.clone(),
            )
        })?;
    let label = compensation
        .get("label")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_COMPENSATION_LABEL)
        .to_string();

    Ok(PickProtection {
        protection_type,
        n: n as u8,
        compensation: PickCompensation { label, value },
    })
}

/// A draft pick. `original_team` never changes; `owner_team` transfers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftPick {
    pub pick_id: String,
    pub year: i32,
    pub round: u8,
    pub original_team: String,
    pub owner_team: String,
    #[serde(default)]
    pub protection: Option<PickProtection>,
}

impl DraftPick {
    /// Seed a pick owned by its original team.
    pub fn seeded(year: i32, round: u8, team_id: &str) -> Self {
        let team = team_id.to_uppercase();
        Self {
            pick_id: crate::ids::make_pick_id(year, round, &team),
            year,
            round,
            original_team: team.clone(),
            owner_team: team,
            protection: None,
        }
    }

    /// Check that the pick id agrees with the stored year/round/original team.
    pub fn id_is_canonical(&self) -> bool {
        parse_pick_id(&self.pick_id)
            .map(|(year, round, team)| {
                year == self.year && round == self.round && team == self.original_team
            })
            .unwrap_or(false)
    }
}
