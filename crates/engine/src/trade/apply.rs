//! Atomic deal application: validate ownership, transfer every asset in
//! dependency order (players, then picks with protections, then swaps, then
//! fixed assets), stamp player trade metadata, re-validate integrity and
//! append the trade to the transaction log — all in one write transaction.

use chrono::{Datelike, NaiveDate};
use db::store::{
    fixed_assets as fixed_store, meta, picks as picks_store, players as players_store,
    roster as roster_store, swaps as swaps_store, transactions,
};
use db::{integrity, LeagueTx};
use domain::errors::{DomainError, DomainResult, TradeCode, TradeError};
use domain::ids::compute_swap_id;
use domain::models::deal::resolve_receiver;
use domain::models::{Asset, Deal, PickProtection, SwapRight, TransactionEntry};
use serde_json::json;

use crate::context::LeagueContext;

#[derive(Debug, Clone)]
struct PlayerMove {
    player_id: String,
    from_team: String,
    to_team: String,
}

#[derive(Debug, Clone)]
struct PickMove {
    pick_id: String,
    to_team: String,
    protection: Option<PickProtection>,
}

#[derive(Debug, Clone)]
struct SwapMove {
    swap_id: String,
    pick_id_a: String,
    pick_id_b: String,
    to_team: String,
}

#[derive(Debug, Clone)]
struct FixedAssetMove {
    asset_id: String,
    to_team: String,
}

struct Moves {
    players: Vec<PlayerMove>,
    picks: Vec<PickMove>,
    swaps: Vec<SwapMove>,
    fixed_assets: Vec<FixedAssetMove>,
}

fn collect_moves(deal: &Deal) -> DomainResult<Moves> {
    let mut moves = Moves {
        players: Vec::new(),
        picks: Vec::new(),
        swaps: Vec::new(),
        fixed_assets: Vec::new(),
    };
    let mut seen_players = std::collections::BTreeSet::new();

    for (from_team, assets) in &deal.legs {
        for asset in assets {
            let to_team = resolve_receiver(deal, from_team, asset)?;
            match asset {
                Asset::Player { player_id, .. } => {
                    if !seen_players.insert(player_id.clone()) {
                        return Err(TradeError::with_details(
                            TradeCode::ApplyFailed,
                            "Duplicate player in trade assets",
                            json!({ "player_id": player_id }),
                        )
                        .into());
                    }
                    moves.players.push(PlayerMove {
                        player_id: player_id.clone(),
                        from_team: from_team.clone(),
                        to_team,
                    });
                }
                Asset::Pick {
                    pick_id,
                    protection,
                    ..
                } => moves.picks.push(PickMove {
                    pick_id: pick_id.clone(),
                    to_team,
                    protection: protection.clone(),
                }),
                Asset::Swap {
                    swap_id,
                    pick_id_a,
                    pick_id_b,
                    ..
                } => moves.swaps.push(SwapMove {
                    swap_id: swap_id.clone(),
                    pick_id_a: pick_id_a.clone(),
                    pick_id_b: pick_id_b.clone(),
                    to_team,
                }),
                Asset::FixedAsset { asset_id, .. } => moves.fixed_assets.push(FixedAssetMove {
                    asset_id: asset_id.clone(),
                    to_team,
                }),
            }
        }
    }
    Ok(moves)
}

fn trade_summary(deal: &Deal, trade_date: &str, source: &str, deal_id: Option<&str>) -> TransactionEntry {
    let mut assets_summary = serde_json::Map::new();
    for (team_id, assets) in &deal.legs {
        let players: Vec<&String> = assets
            .iter()
            .filter_map(|a| match a {
                Asset::Player { player_id, .. } => Some(player_id),
                _ => None,
            })
            .collect();
        let picks: Vec<&String> = assets
            .iter()
            .filter_map(|a| match a {
                Asset::Pick { pick_id, .. } => Some(pick_id),
                _ => None,
            })
            .collect();
        let pick_protections: Vec<serde_json::Value> = assets
            .iter()
            .filter_map(|a| match a {
                Asset::Pick {
                    pick_id,
                    protection: Some(protection),
                    to_team,
                } => Some(json!({
                    "pick_id": pick_id,
                    "protection": protection,
                    "to_team": to_team,
                })),
                _ => None,
            })
            .collect();
        let swaps: Vec<serde_json::Value> = assets
            .iter()
            .filter_map(|a| match a {
                Asset::Swap {
                    swap_id,
                    pick_id_a,
                    pick_id_b,
                    to_team,
                } => Some(json!({
                    "swap_id": swap_id,
                    "pick_id_a": pick_id_a,
                    "pick_id_b": pick_id_b,
                    "to_team": to_team,
                })),
                _ => None,
            })
            .collect();
        let fixed_assets: Vec<serde_json::Value> = assets
            .iter()
            .filter_map(|a| match a {
                Asset::FixedAsset { asset_id, to_team } => {
                    Some(json!({ "asset_id": asset_id, "to_team": to_team }))
                }
                _ => None,
            })
            .collect();
        assets_summary.insert(
            team_id.clone(),
            json!({
                "players": players,
                "picks": picks,
                "pick_protections": pick_protections,
                "swaps": swaps,
                "fixed_assets": fixed_assets,
            }),
        );
    }

    let mut payload = json!({
        "type": "trade",
        "date": trade_date,
        "teams": deal.teams,
        "assets": assets_summary,
        "source": source,
    });
    if let Some(deal_id) = deal_id {
        payload["deal_id"] = json!(deal_id);
    }
    TransactionEntry::from_payload(payload)
}

async fn execute_moves(
    tx: &mut LeagueTx,
    moves: &Moves,
    season_year: i32,
    trade_date: NaiveDate,
) -> DomainResult<()> {
    // Players move first: contract rows follow the roster row.
    for mv in &moves.players {
        let current = roster_store::get_team_id_by_player(&mut *tx, &mv.player_id).await?;
        if current != mv.from_team {
            return Err(DomainError::ValidationError(format!(
                "player {} expected on team {} but roster shows {}",
                mv.player_id, mv.from_team, current
            )));
        }
    }
    for mv in &moves.players {
        roster_store::trade_player(&mut *tx, &mv.player_id, &mv.to_team).await?;
        let mut meta_record = players_store::get_trade_meta(&mut *tx, &mv.player_id).await?;
        meta_record.record_trade_acquisition(&mv.from_team, season_year, trade_date);
        players_store::set_trade_meta(&mut *tx, &mv.player_id, &meta_record).await?;
    }

    for mv in &moves.picks {
        picks_store::update_pick_owner(&mut *tx, &mv.pick_id, &mv.to_team).await?;
        if let Some(protection) = &mv.protection {
            picks_store::set_pick_protection(&mut *tx, &mv.pick_id, protection).await?;
        }
    }

    for mv in &moves.swaps {
        match swaps_store::get_swap(&mut *tx, &mv.swap_id).await? {
            Some(_) => swaps_store::update_swap_owner(&mut *tx, &mv.swap_id, &mv.to_team).await?,
            None => {
                // A swap asset over two existing picks mints the right at
                // transfer time.
                let pick_a = picks_store::get_pick(&mut *tx, &mv.pick_id_a)
                    .await?
                    .ok_or_else(|| {
                        DomainError::NotFound(format!("pick not found: {}", mv.pick_id_a))
                    })?;
                let swap = SwapRight {
                    swap_id: compute_swap_id(&mv.pick_id_a, &mv.pick_id_b),
                    pick_id_a: mv.pick_id_a.clone(),
                    pick_id_b: mv.pick_id_b.clone(),
                    year: Some(pick_a.year),
                    round: Some(pick_a.round),
                    owner_team: mv.to_team.clone(),
                    active: true,
                    created_by_deal_id: None,
                };
                swaps_store::upsert_swap_rights(&mut *tx, &[swap]).await?;
            }
        }
    }

    for mv in &moves.fixed_assets {
        fixed_store::update_fixed_asset_owner(&mut *tx, &mv.asset_id, &mv.to_team).await?;
    }

    Ok(())
}

/// Apply a deal to the store. On any internal failure the transaction rolls
/// back and the error surfaces as `APPLY_FAILED`.
pub async fn apply_deal(
    ctx: &LeagueContext,
    deal: &Deal,
    source: &str,
    deal_id: Option<&str>,
    trade_date: Option<NaiveDate>,
) -> DomainResult<serde_json::Value> {
    let result = apply_deal_inner(ctx, deal, source, deal_id, trade_date).await;
    result.map_err(|err| match err {
        DomainError::Trade(trade_err) => DomainError::Trade(trade_err),
        other => TradeError::with_details(
            TradeCode::ApplyFailed,
            "Failed to apply trade",
            json!({ "error": other.to_string() }),
        )
        .into(),
    })
}

async fn apply_deal_inner(
    ctx: &LeagueContext,
    deal: &Deal,
    source: &str,
    deal_id: Option<&str>,
    trade_date: Option<NaiveDate>,
) -> DomainResult<serde_json::Value> {
    let moves = collect_moves(deal)?;
    let trade_date = trade_date.unwrap_or(ctx.current_date);

    let mut tx = ctx.repo.begin_write().await?;
    let season_year = meta::get_season_year(&mut tx)
        .await?
        .unwrap_or_else(|| trade_date.year());

    execute_moves(&mut tx, &moves, season_year, trade_date).await?;
    integrity::validate_integrity(&mut tx, true).await?;

    let entry = trade_summary(deal, &trade_date.to_string(), source, deal_id);
    let payload = entry.payload.clone();
    transactions::insert_transactions(&mut tx, &[entry]).await?;

    tx.commit().await?;
    tracing::info!(teams = ?deal.teams, source, "trade applied");
    Ok(payload)
}
