use std::collections::BTreeSet;

use serde_json::json;

use crate::errors::{TradeCode, TradeError, TradeResult};
use crate::models::Deal;

use super::{TradeContext, TradeRule};

/// No asset may appear twice across all legs.
pub struct DuplicateAssetRule;

impl TradeRule for DuplicateAssetRule {
    fn rule_id(&self) -> &'static str {
        "duplicate_asset"
    }

    fn priority(&self) -> u32 {
        30
    }

    fn validate(&self, deal: &Deal, _ctx: &TradeContext) -> TradeResult<()> {
        let mut seen = BTreeSet::new();
        for (team_id, asset) in deal.assets() {
            let key = asset.asset_key();
            if !seen.insert(key.clone()) {
                return Err(TradeError::with_details(
                    TradeCode::InvalidInput,
                    "Duplicate asset in deal",
                    json!({ "rule": self.rule_id(), "team_id": team_id, "asset_key": key }),
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

    #[test]
    fn test_duplicate_across_legs_rejected() {
        let ctx = context();
        let deal = bilateral_deal(vec![player_asset("P000001")], vec![player_asset("P000001")]);
        let err = DuplicateAssetRule.validate(&deal, &ctx).unwrap_err();
        assert_eq!(err.code, TradeCode::InvalidInput);
    }

    #[test]
    fn test_distinct_assets_pass() {
        let ctx = context();
        let deal = bilateral_deal(
            vec![player_asset("P000001"), pick_asset("2026_R1_ATL")],
            vec![player_asset("P000002")],
        );
        assert!(DuplicateAssetRule.validate(&deal, &ctx).is_ok());
    }
}
