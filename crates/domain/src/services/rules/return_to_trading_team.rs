use serde_json::json;

use crate::errors::{TradeCode, TradeError, TradeResult};
use crate::models::deal::resolve_receiver;
use crate::models::{Asset, Deal};

use super::{TradeContext, TradeRule};

/// A player cannot be traded back, within the same season, to a team that
/// traded them away.
pub struct ReturnToTradingTeamRule;

impl TradeRule for ReturnToTradingTeamRule {
    fn rule_id(&self) -> &'static str {
        "return_to_trading_team_same_season"
    }

    // Runs after player eligibility but before pick and salary rules.
    fn priority(&self) -> u32 {
        72
    }

    fn validate(&self, deal: &Deal, ctx: &TradeContext) -> TradeResult<()> {
        if ctx.season_year <= 0 {
            return Ok(());
        }
        for (from_team, assets) in &deal.legs {
            for asset in assets {
                let Asset::Player { player_id, .. } = asset else {
                    continue;
                };
                let Some(player) = ctx.snapshot.players.get(player_id) else {
                    continue;
                };
                let to_team = resolve_receiver(deal, from_team, asset)?;
                if player
                    .meta
                    .return_ban_teams(ctx.season_year)
                    .contains(&to_team)
                {
                    return Err(TradeError::with_details(
                        TradeCode::DealInvalidated,
                        "Player cannot return to trading team in same season",
                        json!({
                            "rule": self.rule_id(),
                            "player_id": player_id,
                            "from_team": from_team,
                            "to_team": to_team,
                            "season_year": ctx.season_year,
                            "reason": "same_season_return_to_trading_team",
                        }),
                    ));
                }
            }
        }
        Ok(())
    }
}
