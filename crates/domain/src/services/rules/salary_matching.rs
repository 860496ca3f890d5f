use serde_json::json;

use crate::errors::{TradeCode, TradeError, TradeResult};
use crate::models::Deal;

use super::{build_team_payrolls, build_team_trade_totals, TradeContext, TradeRule};

/// CBA-style salary matching. For every team taking salary back, incoming
/// salary must fit the allowance derived from outgoing salary and the team's
/// post-trade cap tier:
///
/// - at or above the second apron: `out * second_apron_mult`
/// - at or above the first apron: `out * first_apron_mult`
/// - otherwise the standard tiers: `2*out + buffer` (small),
///   `out + match_mid_add` (mid), `1.25*out + buffer` (large)
///
/// Skipped entirely while no salary cap is configured.
pub struct SalaryMatchingRule;

impl SalaryMatchingRule {
    fn allowed_incoming(ctx: &TradeContext, outgoing: i64, payroll_after: i64) -> i64 {
        let config = &ctx.config;
        if payroll_after >= config.second_apron && config.second_apron > 0 {
            return (outgoing as f64 * config.second_apron_mult) as i64;
        }
        if payroll_after >= config.first_apron && config.first_apron > 0 {
            return (outgoing as f64 * config.first_apron_mult) as i64;
        }
        if outgoing <= config.match_small_out_max {
            outgoing * 2 + config.match_buffer
        } else if outgoing <= config.match_mid_out_max {
            outgoing + config.match_mid_add
        } else {
            (outgoing as f64 * 1.25) as i64 + config.match_buffer
        }
    }
}

impl TradeRule for SalaryMatchingRule {
    fn rule_id(&self) -> &'static str {
        "salary_matching"
    }

    fn priority(&self) -> u32 {
        85
    }

    fn validate(&self, deal: &Deal, ctx: &TradeContext) -> TradeResult<()> {
        if ctx.config.salary_cap <= 0 {
            return Ok(());
        }
        let totals = build_team_trade_totals(deal, ctx)?;
        let payrolls = build_team_payrolls(deal, ctx, &totals);

        for team_id in &deal.teams {
            let team_totals = totals.get(team_id).copied().unwrap_or_default();
            if team_totals.incoming_salary == 0 {
                continue;
            }
            let payroll = payrolls.get(team_id).copied().unwrap_or_default();
            let allowed =
                Self::allowed_incoming(ctx, team_totals.outgoing_salary, payroll.payroll_after);
            if team_totals.incoming_salary > allowed {
                return Err(TradeError::with_details(
                    TradeCode::DealInvalidated,
                    "Salary matching failed",
                    json!({
                        "rule": self.rule_id(),
                        "team_id": team_id,
                        "reason": "salary_matching",
                        "outgoing_salary": team_totals.outgoing_salary,
                        "incoming_salary": team_totals.incoming_salary,
                        "allowed_incoming": allowed,
                        "payroll_after": payroll.payroll_after,
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
    use crate::league;

    fn capped_context() -> TradeContext {
        let mut ctx = context();
        ctx.config.salary_cap = league::CAP_BASE_SALARY_CAP;
        ctx.config.first_apron = league::CAP_BASE_FIRST_APRON;
        ctx.config.second_apron = league::CAP_BASE_SECOND_APRON;
        ctx
    }

    #[test]
    fn test_unconfigured_cap_skips_rule() {
        let ctx = context();
        let deal = bilateral_deal(vec![player_asset("P000001")], vec![player_asset("P000002")]);
        assert!(SalaryMatchingRule.validate(&deal, &ctx).is_ok());
    }

    #[test]
    fn test_small_outgoing_doubles_plus_buffer() {
        let mut ctx = capped_context();
        ctx.snapshot
            .players
            .insert("P000001".to_string(), rostered_player("ATL", 5_000_000));
        ctx.snapshot
            .players
            .insert("P000002".to_string(), rostered_player("BOS", 10_250_000));
        let deal = bilateral_deal(vec![player_asset("P000001")], vec![player_asset("P000002")]);
        // ATL takes in 10.25M for 5M out: exactly 2*out + 250k.
        assert!(SalaryMatchingRule.validate(&deal, &ctx).is_ok());

        ctx.snapshot
            .players
            .get_mut("P000002")
            .unwrap()
            .salary_amount = 10_250_001;
        let err = SalaryMatchingRule.validate(&deal, &ctx).unwrap_err();
        assert_eq!(err.details["reason"], "salary_matching");
    }

    #[test]
    fn test_mid_tier_uses_additive_allowance() {
        let mut ctx = capped_context();
        ctx.snapshot
            .players
            .insert("P000001".to_string(), rostered_player("ATL", 20_000_000));
        ctx.snapshot
            .players
            .insert("P000002".to_string(), rostered_player("BOS", 27_500_000));
        let deal = bilateral_deal(vec![player_asset("P000001")], vec![player_asset("P000002")]);
        // 20M out allows 27.5M in (out + 7.5M).
        assert!(SalaryMatchingRule.validate(&deal, &ctx).is_ok());
    }

    #[test]
    fn test_second_apron_team_matches_dollar_for_dollar() {
        let mut ctx = capped_context();
        // Payroll keeps ATL above the second apron even after the swap.
        ctx.snapshot
            .players
            .insert("P000090".to_string(), rostered_player("ATL", 210_000_000));
        ctx.snapshot
            .players
            .insert("P000001".to_string(), rostered_player("ATL", 10_000_000));
        ctx.snapshot
            .players
            .insert("P000002".to_string(), rostered_player("BOS", 10_000_001));
        let deal = bilateral_deal(vec![player_asset("P000001")], vec![player_asset("P000002")]);
        let err = SalaryMatchingRule.validate(&deal, &ctx).unwrap_err();
        assert_eq!(err.code, TradeCode::DealInvalidated);

        ctx.snapshot
            .players
            .get_mut("P000002")
            .unwrap()
            .salary_amount = 10_000_000;
        assert!(SalaryMatchingRule.validate(&deal, &ctx).is_ok());
    }
}
