use serde_json::json;

use crate::errors::{TradeCode, TradeError, TradeResult};
use crate::models::Deal;

use super::{TradeContext, TradeRule};

/// No trades after the league trade deadline.
pub struct DeadlineRule;

impl TradeRule for DeadlineRule {
    fn rule_id(&self) -> &'static str {
        "deadline"
    }

    fn priority(&self) -> u32 {
        10
    }

    fn validate(&self, _deal: &Deal, ctx: &TradeContext) -> TradeResult<()> {
        let Some(deadline) = ctx.config.trade_deadline else {
            return Ok(());
        };
        if ctx.current_date > deadline {
            return Err(TradeError::with_details(
                TradeCode::DealInvalidated,
                "Trade deadline has passed",
                json!({
                    "rule": self.rule_id(),
                    "trade_date": ctx.current_date.to_string(),
                    "trade_deadline": deadline.to_string(),
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
    use chrono::NaiveDate;

    #[test]
    fn test_no_deadline_configured_passes() {
        let ctx = context();
        let deal = bilateral_deal(vec![], vec![]);
        assert!(DeadlineRule.validate(&deal, &ctx).is_ok());
    }

    #[test]
    fn test_on_or_before_deadline_passes() {
        let mut ctx = context();
        ctx.config.trade_deadline = NaiveDate::from_ymd_opt(2026, 2, 5);
        ctx.current_date = NaiveDate::from_ymd_opt(2026, 2, 5).unwrap();
        let deal = bilateral_deal(vec![], vec![]);
        assert!(DeadlineRule.validate(&deal, &ctx).is_ok());
    }

    #[test]
    fn test_after_deadline_fails() {
        let mut ctx = context();
        ctx.config.trade_deadline = NaiveDate::from_ymd_opt(2026, 2, 5);
        ctx.current_date = NaiveDate::from_ymd_opt(2026, 2, 6).unwrap();
        let deal = bilateral_deal(vec![], vec![]);
        let err = DeadlineRule.validate(&deal, &ctx).unwrap_err();
        assert_eq!(err.code, TradeCode::DealInvalidated);
    }
}
