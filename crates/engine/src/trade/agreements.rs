//! Two-phase trade commit: a validated deal is persisted as an ACTIVE
//! agreement with every asset locked; a later verify/apply pass re-checks
//! the ownership snapshot and executes. Expired and drifted agreements are
//! self-healing: they are transitioned (and their locks released) on access,
//! then the appropriate status error is raised.

use chrono::Duration;
use db::store::{agreements as agreements_store, roster as roster_store, snapshot};
use db::{integrity, LeagueTx};
use domain::errors::{DomainError, DomainResult, TradeCode, TradeError};
use domain::models::deal::resolve_receiver;
use domain::models::{
    canonicalize_deal, parse_deal, serialize_deal, AgreementStatus, Asset, AssetLock, Deal,
    TradeAgreement,
};
use domain::services::rules::validate_all;
use serde_json::json;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::context::LeagueContext;
use crate::trade::validate::build_rule_context;

pub const DEFAULT_VALID_DAYS: i64 = 2;

/// Stable SHA-256 over the canonical deal payload plus an ownership
/// snapshot. Any change to a participating player's team or salary, or to
/// another asset's owner, changes the hash.
pub(crate) async fn compute_assets_hash(tx: &mut LeagueTx, deal: &Deal) -> DomainResult<String> {
    let mut ownership = serde_json::Map::new();
    let mut player_snapshots: Vec<serde_json::Value> = Vec::new();

    for (team_id, assets) in &deal.legs {
        for asset in assets {
            match asset {
                Asset::Player { player_id, .. } => {
                    let current_team =
                        roster_store::get_team_id_by_player(&mut *tx, player_id).await?;
                    if &current_team != team_id {
                        return Err(DomainError::ValidationError(format!(
                            "Player {player_id} not owned by {team_id} (current: {current_team})"
                        )));
                    }
                    let to_team = resolve_receiver(deal, team_id, asset)?;
                    let salary = roster_store::get_salary_amount(&mut *tx, player_id).await?;
                    player_snapshots.push(json!({
                        "player_id": player_id,
                        "from_team_id": team_id,
                        "to_team_id": to_team,
                        "salary_amount": salary,
                    }));
                }
                Asset::Pick {
                    pick_id,
                    protection,
                    ..
                } => {
                    ownership.insert(
                        asset.asset_key(),
                        json!({ "pick_id": pick_id, "protection": protection }),
                    );
                }
                Asset::Swap {
                    swap_id,
                    pick_id_a,
                    pick_id_b,
                    ..
                } => {
                    ownership.insert(
                        asset.asset_key(),
                        json!({
                            "swap_id": swap_id,
                            "pick_id_a": pick_id_a,
                            "pick_id_b": pick_id_b,
                        }),
                    );
                }
                Asset::FixedAsset { asset_id, .. } => {
                    ownership.insert(asset.asset_key(), json!({ "asset_id": asset_id }));
                }
            }
        }
    }

    player_snapshots.sort_by_key(|row| {
        (
            row["player_id"].as_str().unwrap_or_default().to_string(),
            row["from_team_id"].as_str().unwrap_or_default().to_string(),
            row["to_team_id"].as_str().unwrap_or_default().to_string(),
        )
    });
    ownership.insert("players".to_string(), serde_json::Value::Array(player_snapshots));

    let payload = json!({
        "deal": serialize_deal(deal),
        "ownership": serde_json::Value::Object(ownership),
    });
    Ok(hex::encode(Sha256::digest(payload.to_string().as_bytes())))
}

/// Validate a deal, persist it as an ACTIVE agreement and lock every asset
/// it touches, all in one write transaction.
pub async fn create_committed_deal(
    ctx: &LeagueContext,
    deal: &Deal,
    valid_days: Option<i64>,
) -> DomainResult<TradeAgreement> {
    let canonical = canonicalize_deal(deal)?;

    let mut tx = ctx.repo.begin_write().await?;
    integrity::validate_integrity(&mut tx, true).await?;
    let rule_ctx = build_rule_context(ctx, &mut tx, None).await?;
    validate_all(&canonical, &rule_ctx)?;

    let deal_id = Uuid::new_v4().to_string();
    let assets_hash = compute_assets_hash(&mut tx, &canonical).await?;
    let expires_at = ctx.current_date + Duration::days(valid_days.unwrap_or(DEFAULT_VALID_DAYS));
    let agreement = TradeAgreement {
        deal_id: deal_id.clone(),
        deal: serialize_deal(&canonical),
        assets_hash,
        created_at: ctx.current_date,
        expires_at,
        status: AgreementStatus::Active,
    };
    agreements_store::insert_agreement(&mut tx, &agreement).await?;

    for (_, asset) in canonical.assets() {
        let key = asset.asset_key();
        if let Some(existing) = agreements_store::get_asset_lock(&mut tx, &key).await? {
            if existing.deal_id != deal_id && !existing.is_expired(ctx.current_date) {
                return Err(TradeError::with_details(
                    TradeCode::AssetLocked,
                    "Asset is locked",
                    json!({ "asset_key": key, "deal_id": existing.deal_id }),
                )
                .into());
            }
        }
        agreements_store::insert_asset_lock(
            &mut tx,
            &AssetLock {
                asset_key: key,
                deal_id: deal_id.clone(),
                expires_at: Some(expires_at),
            },
        )
        .await?;
    }

    tx.commit().await?;
    tracing::info!(deal_id = %agreement.deal_id, "committed deal created");
    Ok(agreement)
}

async fn invalidate(
    mut tx: LeagueTx,
    deal_id: &str,
    status: AgreementStatus,
    error: TradeError,
) -> DomainError {
    let result: DomainResult<()> = async {
        agreements_store::set_agreement_status(&mut tx, deal_id, status).await?;
        agreements_store::release_locks_for_deal(&mut tx, deal_id).await?;
        tx.commit().await?;
        Ok(())
    }
    .await;
    match result {
        Ok(()) => error.into(),
        Err(db_err) => db_err,
    }
}

/// Re-verify a committed deal: status, expiry, ownership-snapshot hash and
/// per-asset locks. Returns the canonical deal ready to apply.
pub async fn verify_committed_deal(ctx: &LeagueContext, deal_id: &str) -> DomainResult<Deal> {
    let mut tx = ctx.repo.begin_write().await?;
    let Some(agreement) = agreements_store::get_agreement(&mut tx, deal_id).await? else {
        return Err(TradeError::new(TradeCode::DealInvalidated, "Committed deal not found").into());
    };

    match agreement.status {
        AgreementStatus::Active => {}
        AgreementStatus::Executed => {
            return Err(
                TradeError::new(TradeCode::DealAlreadyExecuted, "Deal already executed").into(),
            )
        }
        AgreementStatus::Expired => {
            return Err(TradeError::new(TradeCode::DealExpired, "Deal expired").into())
        }
        AgreementStatus::Invalidated => {
            return Err(TradeError::new(TradeCode::DealInvalidated, "Deal invalidated").into())
        }
    }

    if ctx.current_date > agreement.expires_at {
        return Err(invalidate(
            tx,
            deal_id,
            AgreementStatus::Expired,
            TradeError::new(TradeCode::DealExpired, "Deal expired"),
        )
        .await);
    }

    let deal = canonicalize_deal(&parse_deal(&agreement.deal, false)?)?;

    let current_hash = compute_assets_hash(&mut tx, &deal).await;
    let drifted = match current_hash {
        Ok(hash) => hash != agreement.assets_hash,
        // Ownership lookups fail when a participant moved; same outcome.
        Err(_) => true,
    };
    if drifted {
        return Err(invalidate(
            tx,
            deal_id,
            AgreementStatus::Invalidated,
            TradeError::new(TradeCode::DealInvalidated, "Deal assets have changed"),
        )
        .await);
    }

    for (_, asset) in deal.assets() {
        let lock = agreements_store::get_asset_lock(&mut tx, &asset.asset_key()).await?;
        let held = matches!(&lock, Some(lock) if lock.deal_id == deal_id);
        if !held {
            return Err(invalidate(
                tx,
                deal_id,
                AgreementStatus::Invalidated,
                TradeError::new(TradeCode::DealInvalidated, "Asset lock missing"),
            )
            .await);
        }
    }

    tx.commit().await?;
    Ok(deal)
}

/// Mark an agreement executed and release its locks.
pub async fn mark_executed(ctx: &LeagueContext, deal_id: &str) -> DomainResult<()> {
    let mut tx = ctx.repo.begin_write().await?;
    agreements_store::set_agreement_status(&mut tx, deal_id, AgreementStatus::Executed).await?;
    agreements_store::release_locks_for_deal(&mut tx, deal_id).await?;
    tx.commit().await?;
    Ok(())
}

/// Sweep ACTIVE agreements past expiry: transition and release locks.
/// Explicit, not time-based; call before relying on the lock set.
pub async fn gc_expired_agreements(ctx: &LeagueContext) -> DomainResult<usize> {
    let mut tx = ctx.repo.begin_write().await?;
    let active = agreements_store::list_active_agreements(&mut tx).await?;
    let mut swept = 0;
    for agreement in active {
        if ctx.current_date > agreement.expires_at {
            agreements_store::set_agreement_status(
                &mut tx,
                &agreement.deal_id,
                AgreementStatus::Expired,
            )
            .await?;
            agreements_store::release_locks_for_deal(&mut tx, &agreement.deal_id).await?;
            swept += 1;
        }
    }
    tx.commit().await?;
    if swept > 0 {
        tracing::info!(swept, "expired trade agreements collected");
    }
    Ok(swept)
}

/// Trade snapshot accessor used by callers wanting a consistent read of all
/// tradable assets.
pub async fn get_trade_assets_snapshot(
    ctx: &LeagueContext,
) -> DomainResult<domain::services::rules::TradeSnapshot> {
    let mut tx = ctx.repo.begin_write().await?;
    let snap = snapshot::build_trade_snapshot(&mut tx, ctx.current_date).await?;
    tx.commit().await?;
    Ok(snap)
}
