use serde_json::json;

use crate::errors::{TradeCode, TradeError, TradeResult};
use crate::models::{Asset, Deal};

use super::{TradeContext, TradeRule};

/// Every asset must currently belong to the team sending it out.
pub struct OwnershipRule;

impl TradeRule for OwnershipRule {
    fn rule_id(&self) -> &'static str {
        "ownership"
    }

    fn priority(&self) -> u32 {
        50
    }

    fn validate(&self, deal: &Deal, ctx: &TradeContext) -> TradeResult<()> {
        for (team_id, assets) in &deal.legs {
            for asset in assets {
                match asset {
                    Asset::Player { player_id, .. } => {
                        let player = ctx.snapshot.players.get(player_id).ok_or_else(|| {
                            TradeError::with_details(
                                TradeCode::PlayerNotOwned,
                                "Player not found in roster",
                                json!({ "player_id": player_id, "team_id": team_id }),
                            )
                        })?;
                        if &player.team_id != team_id {
                            return Err(TradeError::with_details(
                                TradeCode::PlayerNotOwned,
                                "Player not owned by team",
                                json!({ "player_id": player_id, "team_id": team_id }),
                            ));
                        }
                    }
                    Asset::Pick {
                        pick_id,
                        protection,
                        ..
                    } => {
                        let pick = ctx.snapshot.picks.get(pick_id).ok_or_else(|| {
                            TradeError::with_details(
                                TradeCode::PickNotOwned,
                                "Pick not found",
                                json!({ "pick_id": pick_id, "team_id": team_id }),
                            )
                        })?;
                        if &pick.owner_team != team_id {
                            return Err(TradeError::with_details(
                                TradeCode::PickNotOwned,
                                "Pick not owned by team",
                                json!({
                                    "pick_id": pick_id,
                                    "team_id": team_id,
                                    "owner_team": pick.owner_team,
                                }),
                            ));
                        }
                        if let Some(attempted) = protection {
                            if let Some(existing) = &pick.protection {
                                if existing != attempted {
                                    return Err(TradeError::with_details(
                                        TradeCode::ProtectionConflict,
                                        "Pick protection conflicts with existing record",
                                        json!({
                                            "pick_id": pick_id,
                                            "existing_protection": existing,
                                            "attempted_protection": attempted,
                                        }),
                                    ));
                                }
                            }
                        }
                    }
                    Asset::FixedAsset { asset_id, .. } => {
                        let fixed = ctx.snapshot.fixed_assets.get(asset_id).ok_or_else(|| {
                            TradeError::with_details(
                                TradeCode::FixedAssetNotFound,
                                "Fixed asset not found",
                                json!({ "asset_id": asset_id, "team_id": team_id }),
                            )
                        })?;
                        if &fixed.owner_team != team_id {
                            return Err(TradeError::with_details(
                                TradeCode::FixedAssetNotOwned,
                                "Fixed asset not owned by team",
                                json!({ "asset_id": asset_id, "team_id": team_id }),
                            ));
                        }
                    }
                    Asset::Swap {
                        swap_id,
                        pick_id_a,
                        pick_id_b,
                        ..
                    } => {
                        let pick_a = ctx.snapshot.picks.get(pick_id_a);
                        let pick_b = ctx.snapshot.picks.get(pick_id_b);
                        let (Some(pick_a), Some(pick_b)) = (pick_a, pick_b) else {
                            return Err(TradeError::with_details(
                                TradeCode::SwapInvalid,
                                "Swap picks must exist",
                                json!({
                                    "swap_id": swap_id,
                                    "pick_id_a": pick_id_a,
                                    "pick_id_b": pick_id_b,
                                }),
                            ));
                        };
                        if pick_a.year != pick_b.year || pick_a.round != pick_b.round {
                            return Err(TradeError::with_details(
                                TradeCode::SwapInvalid,
                                "Swap picks must match year and round",
                                json!({
                                    "swap_id": swap_id,
                                    "pick_a": { "year": pick_a.year, "round": pick_a.round },
                                    "pick_b": { "year": pick_b.year, "round": pick_b.round },
                                }),
                            ));
                        }
                        if let Some(swap) = ctx.snapshot.swaps.get(swap_id) {
                            if &swap.owner_team != team_id {
                                return Err(TradeError::with_details(
                                    TradeCode::SwapNotOwned,
                                    "Swap right not owned by team",
                                    json!({ "swap_id": swap_id, "team_id": team_id }),
                                ));
                            }
                        } else {
                            // New swap rights can only be minted by a team
                            // owning one of the two picks.
                            if &pick_a.owner_team != team_id && &pick_b.owner_team != team_id {
                                return Err(TradeError::with_details(
                                    TradeCode::SwapInvalid,
                                    "Swap right cannot be created by team",
                                    json!({
                                        "swap_id": swap_id,
                                        "team_id": team_id,
                                        "pick_owner_a": pick_a.owner_team,
                                        "pick_owner_b": pick_b.owner_team,
                                    }),
                                ));
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
