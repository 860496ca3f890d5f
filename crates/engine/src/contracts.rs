//! Contract lifecycle: bootstrap, offseason option processing and expiry,
//! signing and release. Every mutating operation runs in a single write
//! transaction, rebuilds the derived contract indices, and re-validates
//! integrity before commit — the exactly-one-active invariant is enforced by
//! deactivate-then-insert, not just by structure.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use db::store::{contracts as contracts_store, meta, players as players_store, roster as roster_store};
use db::{integrity, LeagueTx};
use domain::errors::{DomainError, DomainResult};
use domain::ids::{normalize_player_id, normalize_team_id};
use domain::models::{Contract, ContractAction, ContractStatus, OptionStatus};
use domain::services::{OptionDecision, OptionDecisionPolicy};
use uuid::Uuid;

use crate::context::LeagueContext;

/// Result counts of an offseason pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OffseasonOutcome {
    pub expired: usize,
    pub released: usize,
    pub options_decided: usize,
}

/// Guarantee minimal one-year contracts for every rostered non-FA player.
pub async fn ensure_contracts_bootstrapped_from_roster(
    ctx: &LeagueContext,
    season_year: i32,
) -> DomainResult<()> {
    let mut tx = ctx.repo.begin_write().await?;
    contracts_store::ensure_contracts_bootstrapped_from_roster(&mut tx, season_year).await?;
    contracts_store::rebuild_contract_indices(&mut tx).await?;
    integrity::validate_integrity(&mut tx, true).await?;
    tx.commit().await?;
    Ok(())
}

/// Advance contracts from one season to the next: decide pending options for
/// the incoming season, recompute contract lengths, expire finished
/// contracts and release their players to free agency.
pub async fn process_offseason(
    ctx: &LeagueContext,
    from_year: i32,
    to_year: i32,
    policy: &dyn OptionDecisionPolicy,
) -> DomainResult<OffseasonOutcome> {
    if to_year <= from_year {
        return Err(DomainError::ValidationError(format!(
            "offseason must move forward: {from_year} -> {to_year}"
        )));
    }
    let decision_date = ctx.current_date.to_string();
    let mut outcome = OffseasonOutcome::default();

    let mut tx = ctx.repo.begin_write().await?;
    let active = contracts_store::get_contracts(&mut tx, true).await?;
    for mut contract in active {
        // An option is decided in the offseason preceding its season; older
        // still-pending options are caught up here too.
        let pending: Vec<usize> = contract
            .options
            .iter()
            .enumerate()
            .filter(|(_, o)| o.status == OptionStatus::Pending && o.season_year <= to_year + 1)
            .map(|(i, _)| i)
            .collect();
        if !pending.is_empty() {
            for index in pending {
                let option = contract.options[index].clone();
                let decision = policy.decide(&option, &contract.player_id, &contract);
                contract.apply_option_decision(
                    index,
                    decision == OptionDecision::Exercise,
                    &decision_date,
                )?;
                outcome.options_decided += 1;
            }
            contract.recompute_years_from_salary();
        }

        let end_exclusive = contract.start_season_year + contract.years;
        if to_year >= end_exclusive {
            contract.status = ContractStatus::Expired;
            contract.is_active = false;
            contracts_store::upsert_contracts(&mut tx, &[contract.clone()]).await?;
            roster_store::release_to_free_agency(&mut tx, &contract.player_id).await?;
            outcome.expired += 1;
            outcome.released += 1;
        } else {
            contracts_store::upsert_contracts(&mut tx, &[contract]).await?;
        }
    }

    meta::set_season_year(&mut tx, to_year).await?;
    meta::set_draft_year(&mut tx, to_year + 1).await?;
    contracts_store::rebuild_contract_indices(&mut tx).await?;
    integrity::validate_integrity(&mut tx, true).await?;
    tx.commit().await?;

    tracing::info!(
        from_year,
        to_year,
        expired = outcome.expired,
        options = outcome.options_decided,
        "processed offseason"
    );
    Ok(outcome)
}

async fn season_year_or(tx: &mut LeagueTx, fallback: i32) -> DomainResult<i32> {
    Ok(meta::get_season_year(&mut *tx).await?.unwrap_or(fallback))
}

fn default_salary_by_year(
    start_season_year: i32,
    years: i32,
    base_salary: i64,
) -> BTreeMap<String, i64> {
    (start_season_year..start_season_year + years.max(1))
        .map(|year| (year.to_string(), base_salary))
        .collect()
}

/// Sign a free agent to a team. The player must currently be on `FA`.
pub async fn sign_free_agent(
    ctx: &LeagueContext,
    team_id: &str,
    player_id: &str,
    signed_date: Option<NaiveDate>,
    years: i32,
    salary_by_year: Option<BTreeMap<String, i64>>,
) -> DomainResult<Contract> {
    let team_id = normalize_team_id(team_id, true, false)?;
    let player_id = normalize_player_id(player_id, true, false)?;
    let signed = signed_date.unwrap_or(ctx.current_date);

    let mut tx = ctx.repo.begin_write().await?;
    let current_team = roster_store::get_team_id_by_player(&mut tx, &player_id).await?;
    if current_team != domain::league::FREE_AGENT_TEAM_ID {
        return Err(DomainError::ValidationError(format!(
            "Player {player_id} is not a free agent (current team {current_team})"
        )));
    }
    let contract = insert_signed_contract(
        &mut tx,
        &team_id,
        &player_id,
        signed,
        years,
        salary_by_year,
        ContractAction::SignFreeAgent,
    )
    .await?;
    contracts_store::rebuild_contract_indices(&mut tx).await?;
    integrity::validate_integrity(&mut tx, true).await?;
    tx.commit().await?;
    Ok(contract)
}

/// Re-sign or extend a rostered player with a fresh contract.
pub async fn re_sign_or_extend(
    ctx: &LeagueContext,
    player_id: &str,
    signed_date: Option<NaiveDate>,
    years: i32,
    salary_by_year: Option<BTreeMap<String, i64>>,
) -> DomainResult<Contract> {
    let player_id = normalize_player_id(player_id, true, false)?;
    let signed = signed_date.unwrap_or(ctx.current_date);

    let mut tx = ctx.repo.begin_write().await?;
    let team_id = roster_store::get_team_id_by_player(&mut tx, &player_id).await?;
    if team_id == domain::league::FREE_AGENT_TEAM_ID {
        return Err(DomainError::ValidationError(format!(
            "Player {player_id} is a free agent; use sign_free_agent"
        )));
    }
    let contract = insert_signed_contract(
        &mut tx,
        &team_id,
        &player_id,
        signed,
        years,
        salary_by_year,
        ContractAction::ReSignOrExtend,
    )
    .await?;
    contracts_store::rebuild_contract_indices(&mut tx).await?;
    integrity::validate_integrity(&mut tx, true).await?;
    tx.commit().await?;
    Ok(contract)
}

async fn insert_signed_contract(
    tx: &mut LeagueTx,
    team_id: &str,
    player_id: &str,
    signed: NaiveDate,
    years: i32,
    salary_by_year: Option<BTreeMap<String, i64>>,
    action: ContractAction,
) -> DomainResult<Contract> {
    if years < 1 {
        return Err(DomainError::ValidationError(format!(
            "contract years must be positive, got {years}"
        )));
    }
    let start_season_year = season_year_or(tx, signed.year()).await?;
    let salary_by_year = match salary_by_year {
        Some(map) if !map.is_empty() => map,
        _ => {
            let base = roster_store::get_salary_amount(&mut *tx, player_id)
                .await?
                .unwrap_or(0);
            default_salary_by_year(start_season_year, years, base)
        }
    };

    let mut contract = Contract {
        contract_id: Uuid::new_v4().simple().to_string(),
        player_id: player_id.to_string(),
        team_id: team_id.to_string(),
        signed_date: signed.to_string(),
        start_season_year,
        years,
        salary_by_year,
        options: vec![],
        status: ContractStatus::Active,
        is_active: true,
    };
    contract.recompute_years_from_salary();
    if contract.years == 0 {
        return Err(DomainError::ValidationError(
            "salary_by_year does not cover the starting season".to_string(),
        ));
    }

    // Exactly one active contract per player: deactivate, then insert.
    contracts_store::deactivate_active_contracts(&mut *tx, player_id).await?;
    contracts_store::upsert_contracts(&mut *tx, &[contract.clone()]).await?;
    roster_store::trade_player(&mut *tx, player_id, team_id).await?;
    let first_year_salary = contract.salary_for_season(start_season_year);
    roster_store::set_salary(&mut *tx, player_id, first_year_salary).await?;

    let mut meta_record = players_store::get_trade_meta(&mut *tx, player_id).await?;
    meta_record.record_contract_action(action, signed);
    players_store::set_trade_meta(&mut *tx, player_id, &meta_record).await?;

    Ok(contract)
}

/// Release a player to free agency, deactivating any active contract.
pub async fn release_to_free_agents(ctx: &LeagueContext, player_id: &str) -> DomainResult<()> {
    let player_id = normalize_player_id(player_id, true, false)?;
    let mut tx = ctx.repo.begin_write().await?;
    roster_store::get_team_id_by_player(&mut tx, &player_id).await?;
    roster_store::release_to_free_agency(&mut tx, &player_id).await?;
    contracts_store::rebuild_contract_indices(&mut tx).await?;
    integrity::validate_integrity(&mut tx, true).await?;
    tx.commit().await?;
    Ok(())
}
