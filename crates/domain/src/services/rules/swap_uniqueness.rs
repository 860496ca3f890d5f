use serde_json::json;

use crate::errors::{TradeCode, TradeError, TradeResult};
use crate::ids::{compute_swap_id, swap_pair_key};
use crate::models::{Asset, Deal};

use super::{TradeContext, TradeRule};

/// Swap ids must be canonical for their pick pair, and at most one active
/// swap right may exist per unordered pair.
pub struct SwapUniquenessRule;

impl TradeRule for SwapUniquenessRule {
    fn rule_id(&self) -> &'static str {
        "swap_uniqueness"
    }

    fn priority(&self) -> u32 {
        35
    }

    fn validate(&self, deal: &Deal, ctx: &TradeContext) -> TradeResult<()> {
        for (_, asset) in deal.assets() {
            let Asset::Swap {
                swap_id,
                pick_id_a,
                pick_id_b,
                ..
            } = asset
            else {
                continue;
            };
            let expected = compute_swap_id(pick_id_a, pick_id_b);
            if *swap_id != expected {
                return Err(TradeError::with_details(
                    TradeCode::SwapInvalid,
                    "swap_id must be canonical for the pick pair",
                    json!({
                        "swap_id": swap_id,
                        "expected": expected,
                        "pick_id_a": pick_id_a,
                        "pick_id_b": pick_id_b,
                    }),
                ));
            }
            let pair = swap_pair_key(pick_id_a, pick_id_b);
            for existing in ctx.snapshot.swaps.values() {
                if !existing.active {
                    continue;
                }
                if existing.pair_key() == pair && existing.swap_id != *swap_id {
                    return Err(TradeError::with_details(
                        TradeCode::SwapInvalid,
                        "Active swap right already exists for this pick pair",
                        json!({
                            "swap_id": swap_id,
                            "conflict_swap_id": existing.swap_id,
                            "pick_pair": pair,
                        }),
                    ));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::models::SwapRight;

    fn swap_asset(pick_id_a: &str, pick_id_b: &str, swap_id: Option<&str>) -> Asset {
        Asset::Swap {
            swap_id: swap_id
                .map(|s| s.to_string())
                .unwrap_or_else(|| compute_swap_id(pick_id_a, pick_id_b)),
            pick_id_a: pick_id_a.to_string(),
            pick_id_b: pick_id_b.to_string(),
            to_team: None,
        }
    }

    #[test]
    fn test_non_canonical_swap_id_rejected() {
        let ctx = context();
        let deal = bilateral_deal(
            vec![swap_asset("2026_R1_ATL", "2026_R1_BOS", Some("SWAP_custom"))],
            vec![player_asset("P000002")],
        );
        let err = SwapUniquenessRule.validate(&deal, &ctx).unwrap_err();
        assert_eq!(err.code, TradeCode::SwapInvalid);
    }

    #[test]
    fn test_conflicting_active_pair_rejected() {
        let mut ctx = context();
        // Same pair already covered by a (legacy, differently named) active
        // swap record.
        ctx.snapshot.swaps.insert(
            "SWAP_legacy".to_string(),
            SwapRight {
                swap_id: "SWAP_legacy".to_string(),
                pick_id_a: "2026_R1_ATL".to_string(),
                pick_id_b: "2026_R1_BOS".to_string(),
                year: Some(2026),
                round: Some(1),
                owner_team: "ATL".to_string(),
                active: true,
                created_by_deal_id: None,
            },
        );
        let deal = bilateral_deal(
            vec![swap_asset("2026_R1_ATL", "2026_R1_BOS", None)],
            vec![player_asset("P000002")],
        );
        let err = SwapUniquenessRule.validate(&deal, &ctx).unwrap_err();
        assert_eq!(err.code, TradeCode::SwapInvalid);
    }

    #[test]
    fn test_inactive_conflict_ignored() {
        let mut ctx = context();
        ctx.snapshot.swaps.insert(
            "SWAP_legacy".to_string(),
            SwapRight {
                swap_id: "SWAP_legacy".to_string(),
                pick_id_a: "2026_R1_ATL".to_string(),
                pick_id_b: "2026_R1_BOS".to_string(),
                year: Some(2026),
                round: Some(1),
                owner_team: "ATL".to_string(),
                active: false,
                created_by_deal_id: None,
            },
        );
        let deal = bilateral_deal(
            vec![swap_asset("2026_R1_ATL", "2026_R1_BOS", None)],
            vec![player_asset("P000002")],
        );
        assert!(SwapUniquenessRule.validate(&deal, &ctx).is_ok());
    }
}
