//! Season scheduling: generate and persist the master schedule, then apply
//! the season side effects (trade deadline, cap model, pick seeding, GM
//! profile seeding).

use chrono::NaiveDate;
use db::store::{gm_profiles, meta, picks, schedule as schedule_store};
use db::integrity;
use domain::errors::DomainResult;
use domain::ids::season_id_from_year;
use domain::league;
use domain::models::ScheduledGame;
use domain::services::build_master_schedule;

use crate::context::LeagueContext;

const TRADE_DEADLINE_MONTH: u32 = 2;
const TRADE_DEADLINE_DAY: u32 = 5;

/// Build and persist the 1230-game regular-season schedule for
/// `season_year`, and roll the league metadata forward to that season.
pub async fn build_season(ctx: &LeagueContext, season_year: i32) -> DomainResult<Vec<ScheduledGame>> {
    let games = build_master_schedule(season_year);
    let season_id = season_id_from_year(season_year);
    let draft_year = season_year + 1;

    let mut tx = ctx.repo.begin_write().await?;
    schedule_store::replace_season_schedule(&mut tx, &season_id, &games).await?;

    meta::set_season_year(&mut tx, season_year).await?;
    meta::set_draft_year(&mut tx, draft_year).await?;
    meta::set_meta(
        &mut tx,
        meta::KEY_SEASON_START,
        &NaiveDate::from_ymd_opt(
            season_year,
            league::SEASON_START_MONTH,
            league::SEASON_START_DAY,
        )
        .expect("valid season start")
        .to_string(),
    )
    .await?;

    let mut config = meta::load_trade_rules(&mut tx).await?;
    config.trade_deadline =
        NaiveDate::from_ymd_opt(draft_year, TRADE_DEADLINE_MONTH, TRADE_DEADLINE_DAY);
    config.apply_cap_model(season_year);
    meta::save_trade_rules(&mut tx, &config).await?;

    // The Stepien rule inspects rolling (year, year+1) pairs, so pick data
    // must exist one year past the lookahead window.
    let years_ahead = config
        .max_pick_years_ahead
        .max(config.stepien_lookahead + 1);
    let team_ids: Vec<String> = league::all_team_ids().iter().map(|t| t.to_string()).collect();
    picks::ensure_draft_picks_seeded(&mut tx, draft_year, &team_ids, years_ahead).await?;
    gm_profiles::ensure_gm_profiles_seeded(&mut tx, &team_ids, &serde_json::json!({})).await?;

    integrity::validate_integrity(&mut tx, true).await?;
    tx.commit().await?;

    tracing::info!(season_year, games = games.len(), "season schedule built");
    Ok(games)
}
