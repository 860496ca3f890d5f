use serde_json::json;

use crate::errors::{TradeCode, TradeError, TradeResult};
use crate::models::Deal;

use super::{TradeContext, TradeRule};

/// No asset may be held by a different live committed deal. Expired locks
/// never reach the snapshot (they are released while it is built), so every
/// lock seen here is live.
pub struct AssetLockRule;

impl TradeRule for AssetLockRule {
    fn rule_id(&self) -> &'static str {
        "asset_lock"
    }

    fn priority(&self) -> u32 {
        40
    }

    fn validate(&self, deal: &Deal, ctx: &TradeContext) -> TradeResult<()> {
        for (_, asset) in deal.assets() {
            let key = asset.asset_key();
            let Some(lock) = ctx.snapshot.locks.get(&key) else {
                continue;
            };
            if let Some(allowed) = &ctx.allow_locked_by_deal_id {
                if &lock.deal_id == allowed {
                    continue;
                }
            }
            return Err(TradeError::with_details(
                TradeCode::AssetLocked,
                "Asset is locked",
                json!({
                    "asset_key": key,
                    "deal_id": lock.deal_id,
                    "expires_at": lock.expires_at.map(|d| d.to_string()),
                }),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::models::AssetLock;
    use chrono::NaiveDate;

    fn lock(asset_key: &str, deal_id: &str) -> AssetLock {
        AssetLock {
            asset_key: asset_key.to_string(),
            deal_id: deal_id.to_string(),
            expires_at: NaiveDate::from_ymd_opt(2026, 2, 1),
        }
    }

    #[test]
    fn test_locked_asset_rejected() {
        let mut ctx = context();
        ctx.snapshot
            .locks
            .insert("player:P000001".to_string(), lock("player:P000001", "d-1"));
        let deal = bilateral_deal(vec![player_asset("P000001")], vec![player_asset("P000002")]);
        let err = AssetLockRule.validate(&deal, &ctx).unwrap_err();
        assert_eq!(err.code, TradeCode::AssetLocked);
    }

    #[test]
    fn test_own_deal_lock_tolerated() {
        let mut ctx = context();
        ctx.snapshot
            .locks
            .insert("player:P000001".to_string(), lock("player:P000001", "d-1"));
        ctx.allow_locked_by_deal_id = Some("d-1".to_string());
        let deal = bilateral_deal(vec![player_asset("P000001")], vec![player_asset("P000002")]);
        assert!(AssetLockRule.validate(&deal, &ctx).is_ok());
    }

    #[test]
    fn test_unlocked_assets_pass() {
        let ctx = context();
        let deal = bilateral_deal(vec![player_asset("P000001")], vec![player_asset("P000002")]);
        assert!(AssetLockRule.validate(&deal, &ctx).is_ok());
    }
}
