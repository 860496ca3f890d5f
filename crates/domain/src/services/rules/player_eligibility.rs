use chrono::{Datelike, Duration, NaiveDate};
use serde_json::json;

use crate::errors::{TradeCode, TradeError, TradeResult};
use crate::models::{Asset, ContractAction, Deal};

use super::{TradeContext, TradeRule};

const FALLBACK_DATE: (i32, u32, u32) = (1900, 1, 1);

fn fallback_date() -> NaiveDate {
    let (y, m, d) = FALLBACK_DATE;
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Recently signed players are untradable until the later of
/// `signed_date + new_fa_sign_ban_days` and Dec 15 of the season; recently
/// traded-in players cannot be aggregated into a multi-player outgoing
/// package before `acquired_date + aggregation_ban_days`.
pub struct PlayerEligibilityRule;

impl TradeRule for PlayerEligibilityRule {
    fn rule_id(&self) -> &'static str {
        "player_eligibility"
    }

    fn priority(&self) -> u32 {
        70
    }

    fn validate(&self, deal: &Deal, ctx: &TradeContext) -> TradeResult<()> {
        let sign_ban_days = ctx.config.new_fa_sign_ban_days;
        let aggregation_ban_days = ctx.config.aggregation_ban_days;

        // Recent signing ban.
        for (team_id, assets) in &deal.legs {
            for asset in assets {
                let Asset::Player { player_id, .. } = asset else {
                    continue;
                };
                let Some(player) = ctx.snapshot.players.get(player_id) else {
                    continue;
                };
                let meta = &player.meta;
                let recently_signed = matches!(
                    meta.last_contract_action,
                    Some(ContractAction::SignFreeAgent) | Some(ContractAction::ReSignOrExtend)
                );
                if !recently_signed && !meta.signed_via_free_agency {
                    continue;
                }
                let signed_date = meta
                    .last_contract_action_date
                    .or(meta.signed_date)
                    .unwrap_or_else(fallback_date);
                let season_year = if ctx.season_year > 0 {
                    ctx.season_year
                } else {
                    ctx.current_date.year()
                };
                let dec15 = NaiveDate::from_ymd_opt(season_year, 12, 15).unwrap();
                let banned_until = (signed_date + Duration::days(sign_ban_days)).max(dec15);
                if ctx.current_date < banned_until {
                    return Err(TradeError::with_details(
                        TradeCode::DealInvalidated,
                        "Player recently signed or re-signed",
                        json!({
                            "rule": self.rule_id(),
                            "team_id": team_id,
                            "player_id": player_id,
                            "reason": "recent_contract_signing",
                            "trade_date": ctx.current_date.to_string(),
                            "signed_date": signed_date.to_string(),
                            "banned_until": banned_until.to_string(),
                            "ban_days": sign_ban_days,
                        }),
                    ));
                }
            }
        }

        // Aggregation ban: only bites when a team sends out two or more
        // players at once.
        for team_id in &deal.teams {
            let outgoing_players: Vec<&String> = deal
                .legs
                .get(team_id)
                .map(|assets| {
                    assets
                        .iter()
                        .filter_map(|a| match a {
                            Asset::Player { player_id, .. } => Some(player_id),
                            _ => None,
                        })
                        .collect()
                })
                .unwrap_or_default();
            if outgoing_players.len() < 2 {
                continue;
            }
            for player_id in outgoing_players {
                let Some(player) = ctx.snapshot.players.get(player_id) else {
                    continue;
                };
                if !player.meta.acquired_via_trade {
                    continue;
                }
                let acquired = player.meta.acquired_date.unwrap_or_else(fallback_date);
                let banned_until = acquired + Duration::days(aggregation_ban_days);
                if ctx.current_date < banned_until {
                    return Err(TradeError::with_details(
                        TradeCode::DealInvalidated,
                        "Recently traded players cannot be aggregated",
                        json!({
                            "rule": self.rule_id(),
                            "team_id": team_id,
                            "player_id": player_id,
                            "reason": "aggregation_ban",
                            "trade_date": ctx.current_date.to_string(),
                            "acquired_date": acquired.to_string(),
                        }),
                    ));
                }
            }
        }

        Ok(())
    }
}
