use std::collections::BTreeMap;

use serde_json::json;

use crate::errors::{TradeCode, TradeError, TradeResult};
use crate::models::deal::resolve_receiver;
use crate::models::{Asset, Deal};

use super::{TradeContext, TradeRule};

/// Future-pick constraints.
///
/// - Picks further out than `max_pick_years_ahead` from the draft year are
///   untradable.
/// - Stepien rule: after the trade, each participating team must still own,
///   for every offset `d` in `0..=stepien_lookahead`, at least one
///   first-round pick in `{draft_year + d, draft_year + d + 1}`.
pub struct PickRulesRule;

impl TradeRule for PickRulesRule {
    fn rule_id(&self) -> &'static str {
        "pick_rules"
    }

    fn priority(&self) -> u32 {
        80
    }

    fn validate(&self, deal: &Deal, ctx: &TradeContext) -> TradeResult<()> {
        let max_years_ahead = ctx.config.max_pick_years_ahead;
        let lookahead = ctx.config.stepien_lookahead;
        let draft_year = ctx.draft_year;

        // Post-trade ownership of every pick.
        let mut owner_after: BTreeMap<&str, String> = ctx
            .snapshot
            .picks
            .iter()
            .map(|(id, pick)| (id.as_str(), pick.owner_team.clone()))
            .collect();

        for (from_team, assets) in &deal.legs {
            for asset in assets {
                let Asset::Pick { pick_id, .. } = asset else {
                    continue;
                };
                if let Some(pick) = ctx.snapshot.picks.get(pick_id) {
                    if pick.year > draft_year + max_years_ahead {
                        return Err(TradeError::with_details(
                            TradeCode::DealInvalidated,
                            "Pick is too far in the future to trade",
                            json!({
                                "rule": self.rule_id(),
                                "team_id": from_team,
                                "pick_id": pick_id,
                                "pick_year": pick.year,
                                "max_pick_years_ahead": max_years_ahead,
                            }),
                        ));
                    }
                }
                let to_team = resolve_receiver(deal, from_team, asset)?;
                owner_after.insert(pick_id.as_str(), to_team);
            }
        }

        let owns_first = |team: &str, year: i32| {
            ctx.snapshot.picks.iter().any(|(id, pick)| {
                pick.round == 1
                    && pick.year == year
                    && owner_after.get(id.as_str()).map(String::as_str) == Some(team)
            })
        };
        let year_has_data = |year: i32| {
            ctx.snapshot
                .picks
                .values()
                .any(|pick| pick.round == 1 && pick.year == year)
        };

        for team_id in &deal.teams {
            for d in 0..=lookahead {
                let year_a = draft_year + d;
                let year_b = draft_year + d + 1;
                // Missing pick data for a whole pair is not a violation; the
                // seeding window exists so this only happens on fresh stores.
                if !year_has_data(year_a) && !year_has_data(year_b) {
                    continue;
                }
                if !owns_first(team_id, year_a) && !owns_first(team_id, year_b) {
                    return Err(TradeError::with_details(
                        TradeCode::DealInvalidated,
                        "Team would violate the Stepien rule",
                        json!({
                            "rule": self.rule_id(),
                            "team_id": team_id,
                            "reason": "stepien",
                            "years": [year_a, year_b],
                        }),
                    ));
                }
            }
        }

        Ok(())
    }
}
