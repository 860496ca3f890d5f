use serde_json::json;

use crate::errors::{TradeCode, TradeError, TradeResult};
use crate::models::Deal;

use super::{TradeContext, TradeRule};

/// The legs map must contain exactly the declared teams, and no leg may be
/// empty unless the deal meta opts in (`allow_empty_legs`).
pub struct TeamLegsRule;

impl TradeRule for TeamLegsRule {
    fn rule_id(&self) -> &'static str {
        "team_legs"
    }

    fn priority(&self) -> u32 {
        20
    }

    fn validate(&self, deal: &Deal, _ctx: &TradeContext) -> TradeResult<()> {
        for team_id in &deal.teams {
            if !deal.legs.contains_key(team_id) {
                return Err(TradeError::with_details(
                    TradeCode::DealInvalidated,
                    format!("Missing legs for team {team_id}"),
                    json!({ "rule": self.rule_id(), "team_id": team_id }),
                ));
            }
        }
        for team_id in deal.legs.keys() {
            if !deal.teams.contains(team_id) {
                return Err(TradeError::with_details(
                    TradeCode::DealInvalidated,
                    format!("Leg for undeclared team {team_id}"),
                    json!({ "rule": self.rule_id(), "team_id": team_id }),
                ));
            }
        }

        let allow_empty = deal
            .meta
            .get("allow_empty_legs")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if !allow_empty {
            for (team_id, assets) in &deal.legs {
                if assets.is_empty() {
                    return Err(TradeError::with_details(
                        TradeCode::DealInvalidated,
                        format!("Empty leg for team {team_id}"),
                        json!({ "rule": self.rule_id(), "team_id": team_id }),
                    ));
                }
            }
        }
        Ok(())
    }
}
