use serde_json::json;

use crate::errors::{TradeCode, TradeError, TradeResult};
use crate::models::{Asset, Deal};

use super::{TradeContext, TradeRule};

/// Protection payloads must be well-formed TOP_N records.
pub struct PickProtectionSchemaRule;

impl TradeRule for PickProtectionSchemaRule {
    fn rule_id(&self) -> &'static str {
        "pick_protection_schema"
    }

    fn priority(&self) -> u32 {
        33
    }

    fn validate(&self, deal: &Deal, _ctx: &TradeContext) -> TradeResult<()> {
        for (team_id, asset) in deal.assets() {
            let Asset::Pick {
                pick_id,
                protection: Some(protection),
                ..
            } = asset
            else {
                continue;
            };
            if protection.protection_type != "TOP_N" {
                return Err(TradeError::with_details(
                    TradeCode::ProtectionInvalid,
                    "Unsupported protection type",
                    json!({ "rule": self.rule_id(), "team_id": team_id, "pick_id": pick_id }),
                ));
            }
            if !(1..=30).contains(&protection.n) {
                return Err(TradeError::with_details(
                    TradeCode::ProtectionInvalid,
                    "Protection n out of range",
                    json!({
                        "rule": self.rule_id(),
                        "team_id": team_id,
                        "pick_id": pick_id,
                        "n": protection.n,
                    }),
                ));
            }
            if !protection.compensation.value.is_finite() {
                return Err(TradeError::with_details(
                    TradeCode::ProtectionInvalid,
                    "Protection compensation value must be numeric",
                    json!({ "rule": self.rule_id(), "team_id": team_id, "pick_id": pick_id }),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::models::{PickCompensation, PickProtection};

    fn protected_pick(n: u8) -> Asset {
        Asset::Pick {
            pick_id: "2026_R1_ATL".to_string(),
            to_team: None,
            protection: Some(PickProtection {
                protection_type: "TOP_N".to_string(),
                n,
                compensation: PickCompensation {
                    label: "cash".to_string(),
                    value: 100.0,
                },
            }),
        }
    }

    #[test]
    fn test_valid_protection_passes() {
        let ctx = context();
        let deal = bilateral_deal(vec![protected_pick(10)], vec![player_asset("P000002")]);
        assert!(PickProtectionSchemaRule.validate(&deal, &ctx).is_ok());
    }

    #[test]
    fn test_out_of_range_n_rejected() {
        let ctx = context();
        let deal = bilateral_deal(vec![protected_pick(0)], vec![player_asset("P000002")]);
        let err = PickProtectionSchemaRule.validate(&deal, &ctx).unwrap_err();
        assert_eq!(err.code, TradeCode::ProtectionInvalid);
    }
}
