//! Deal validation: canonicalize, integrity-check the store, snapshot it,
//! and run the rule list.

use db::store::{meta, snapshot};
use db::{integrity, LeagueTx};
use domain::errors::DomainResult;
use domain::models::{canonicalize_deal, Deal};
use domain::services::rules::{validate_all, TradeContext};

use crate::context::LeagueContext;

/// Build the rule context from the state visible to `tx`. Expired asset
/// locks are released while the snapshot is assembled.
pub(crate) async fn build_rule_context(
    ctx: &LeagueContext,
    tx: &mut LeagueTx,
    allow_locked_by_deal_id: Option<&str>,
) -> DomainResult<TradeContext> {
    let snapshot = snapshot::build_trade_snapshot(&mut *tx, ctx.current_date).await?;
    let config = meta::load_trade_rules(&mut *tx).await?;
    let season_year = meta::get_season_year(&mut *tx)
        .await?
        .unwrap_or(domain::league::INITIAL_SEASON_YEAR);
    let draft_year = meta::get_draft_year(&mut *tx)
        .await?
        .unwrap_or(season_year + 1);
    Ok(TradeContext {
        snapshot,
        config,
        season_year,
        draft_year,
        current_date: ctx.current_date,
        allow_locked_by_deal_id: allow_locked_by_deal_id.map(|s| s.to_string()),
    })
}

/// Validate a deal against the rule engine; returns the canonical deal.
///
/// Opens a write transaction: expired-lock cleanup performed during
/// snapshotting is persisted even when validation then fails the deal.
pub async fn validate_deal(
    ctx: &LeagueContext,
    deal: &Deal,
    allow_locked_by_deal_id: Option<&str>,
) -> DomainResult<Deal> {
    let canonical = canonicalize_deal(deal)?;
    let mut tx = ctx.repo.begin_write().await?;
    integrity::validate_integrity(&mut tx, true).await?;
    let rule_ctx = build_rule_context(ctx, &mut tx, allow_locked_by_deal_id).await?;
    let verdict = validate_all(&canonical, &rule_ctx);
    tx.commit().await?;
    verdict?;
    Ok(canonical)
}
