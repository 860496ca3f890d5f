use serde_json::json;

use crate::errors::{TradeCode, TradeError, TradeResult};
use crate::models::Deal;

use super::{build_player_moves, TradeContext, TradeRule};

/// No team may exceed the maximum roster size after the deal applies.
pub struct RosterLimitRule;

impl TradeRule for RosterLimitRule {
    fn rule_id(&self) -> &'static str {
        "roster_limit"
    }

    fn priority(&self) -> u32 {
        60
    }

    fn validate(&self, deal: &Deal, ctx: &TradeContext) -> TradeResult<()> {
        let (players_out, players_in) = build_player_moves(deal)?;
        let limit = ctx.config.max_roster_size;
        for team_id in &deal.teams {
            let current = ctx
                .snapshot
                .roster_counts
                .get(team_id)
                .copied()
                .unwrap_or(0);
            let outgoing = players_out.get(team_id).map(Vec::len).unwrap_or(0);
            let incoming = players_in.get(team_id).map(Vec::len).unwrap_or(0);
            let after = current + incoming - outgoing.min(current);
            if after > limit {
                return Err(TradeError::with_details(
                    TradeCode::DealInvalidated,
                    "Roster limit exceeded after trade",
                    json!({
                        "rule": self.rule_id(),
                        "team_id": team_id,
                        "roster_before": current,
                        "roster_after": after,
                        "max_roster_size": limit,
                    }),
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
    fn test_over_limit_rejected() {
        let mut ctx = context();
        ctx.snapshot.roster_counts.insert("ATL".to_string(), 15);
        ctx.snapshot.roster_counts.insert("BOS".to_string(), 14);
        // ATL receives two players for one.
        let deal = bilateral_deal(
            vec![player_asset("P000001")],
            vec![player_asset("P000002"), player_asset("P000003")],
        );
        let err = RosterLimitRule.validate(&deal, &ctx).unwrap_err();
        assert_eq!(err.code, TradeCode::DealInvalidated);
    }

    #[test]
    fn test_balanced_deal_passes_at_limit() {
        let mut ctx = context();
        ctx.snapshot.roster_counts.insert("ATL".to_string(), 15);
        ctx.snapshot.roster_counts.insert("BOS".to_string(), 15);
        let deal = bilateral_deal(vec![player_asset("P000001")], vec![player_asset("P000002")]);
        assert!(RosterLimitRule.validate(&deal, &ctx).is_ok());
    }
}
