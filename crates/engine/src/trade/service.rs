//! High-level trade flow: verify the committed agreement, apply the deal,
//! then mark the agreement executed.

use domain::errors::DomainResult;
use serde_json::Value;

use crate::context::LeagueContext;
use crate::trade::{agreements, apply};

/// Execute a previously committed deal end to end. Returns the transaction
/// log payload of the applied trade.
pub async fn execute_committed_deal(
    ctx: &LeagueContext,
    deal_id: &str,
    source: &str,
) -> DomainResult<Value> {
    let deal = agreements::verify_committed_deal(ctx, deal_id).await?;
    let payload = apply::apply_deal(ctx, &deal, source, Some(deal_id), None).await?;
    agreements::mark_executed(ctx, deal_id).await?;
    Ok(payload)
}
