//! Contract lifecycle: bootstrap idempotence, option decisions, expiry and
//! free-agency release, signing.

mod common;

use common::*;
use db::store::{contracts as contracts_store, roster as roster_store};
use domain::models::{
    Contract, ContractOption, ContractStatus, OptionStatus, OptionType,
};
use domain::services::{DefaultOptionPolicy, OptionDecision, OptionDecisionPolicy};
use engine::contracts;

struct DeclineEverything;

impl OptionDecisionPolicy for DeclineEverything {
    fn decide(
        &self,
        _: &ContractOption,
        _: &str,
        _: &Contract,
    ) -> OptionDecision {
        OptionDecision::Decline
    }
}

#[tokio::test]
async fn test_bootstrap_idempotence() {
    let ctx = league().await;
    seed_roster(
        &ctx,
        &[
            ("P000001", "ATL", 1_000_000),
            ("P000002", "BOS", 1_000_000),
            ("P000003", "FA", 0),
        ],
    )
    .await;

    contracts::ensure_contracts_bootstrapped_from_roster(&ctx, 2025)
        .await
        .unwrap();
    let mut tx = ctx.repo.begin_read().await.unwrap();
    let first = contracts_store::get_contracts(&mut tx, false).await.unwrap();
    tx.commit().await.unwrap();

    contracts::ensure_contracts_bootstrapped_from_roster(&ctx, 2025)
        .await
        .unwrap();
    let mut tx = ctx.repo.begin_read().await.unwrap();
    let second = contracts_store::get_contracts(&mut tx, false).await.unwrap();
    tx.commit().await.unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(
        first.iter().map(|c| &c.contract_id).collect::<Vec<_>>(),
        second.iter().map(|c| &c.contract_id).collect::<Vec<_>>()
    );
    assert_eq!(
        first[0].contract_id,
        format!("BOOT_2025-26_{}", first[0].player_id)
    );
    assert_eq!(first[0].signed_date, "1900-01-01");
}

#[tokio::test]
async fn test_option_decline_then_expiry() {
    let ctx = league().await;
    seed_roster(&ctx, &[("P000001", "ATL", 1_000_000)]).await;

    // Three-year contract with a PLAYER option on the final season.
    let contract = Contract {
        contract_id: "C_OPT".to_string(),
        player_id: "P000001".to_string(),
        team_id: "ATL".to_string(),
        signed_date: "2025-07-01".to_string(),
        start_season_year: 2025,
        years: 3,
        salary_by_year: [
            ("2025".to_string(), 1_000_000),
            ("2026".to_string(), 1_100_000),
            ("2027".to_string(), 1_200_000),
        ]
        .into_iter()
        .collect(),
        options: vec![ContractOption {
            season_year: 2027,
            option_type: OptionType::Player,
            status: OptionStatus::Pending,
            decision_date: None,
        }],
        status: ContractStatus::Active,
        is_active: true,
    };
    let mut tx = ctx.repo.begin_write().await.unwrap();
    contracts_store::upsert_contracts(&mut tx, &[contract]).await.unwrap();
    contracts_store::rebuild_contract_indices(&mut tx).await.unwrap();
    tx.commit().await.unwrap();

    // 2025 -> 2026: the 2027 option is declined, shortening the contract.
    let outcome = contracts::process_offseason(&ctx, 2025, 2026, &DeclineEverything)
        .await
        .unwrap();
    assert_eq!(outcome.options_decided, 1);
    assert_eq!(outcome.expired, 0);

    let mut tx = ctx.repo.begin_read().await.unwrap();
    let contract = contracts_store::get_contract(&mut tx, "C_OPT")
        .await
        .unwrap()
        .unwrap();
    tx.commit().await.unwrap();
    assert_eq!(contract.options[0].status, OptionStatus::Declined);
    assert!(contract.options[0].decision_date.is_some());
    assert!(!contract.salary_by_year.contains_key("2027"));
    assert_eq!(contract.years, 2);
    assert!(contract.is_active);

    // 2026 -> 2027: the contract runs out; player hits free agency.
    let outcome = contracts::process_offseason(&ctx, 2026, 2027, &DefaultOptionPolicy)
        .await
        .unwrap();
    assert_eq!(outcome.expired, 1);
    assert_eq!(outcome.released, 1);

    let mut tx = ctx.repo.begin_read().await.unwrap();
    let contract = contracts_store::get_contract(&mut tx, "C_OPT")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(contract.status, ContractStatus::Expired);
    assert!(!contract.is_active);
    assert_eq!(
        roster_store::get_team_id_by_player(&mut tx, "P000001").await.unwrap(),
        "FA"
    );
    assert_eq!(
        roster_store::list_free_agents(&mut tx).await.unwrap(),
        vec!["P000001".to_string()]
    );
    tx.commit().await.unwrap();
}

#[tokio::test]
async fn test_default_policy_exercises_options() {
    let ctx = league().await;
    seed_roster(&ctx, &[("P000001", "ATL", 1_000_000)]).await;

    let contract = Contract {
        contract_id: "C_TEAM_OPT".to_string(),
        player_id: "P000001".to_string(),
        team_id: "ATL".to_string(),
        signed_date: "2025-07-01".to_string(),
        start_season_year: 2025,
        years: 2,
        salary_by_year: [
            ("2025".to_string(), 1_000_000),
            ("2026".to_string(), 1_050_000),
        ]
        .into_iter()
        .collect(),
        options: vec![ContractOption {
            season_year: 2026,
            option_type: OptionType::Team,
            status: OptionStatus::Pending,
            decision_date: None,
        }],
        status: ContractStatus::Active,
        is_active: true,
    };
    let mut tx = ctx.repo.begin_write().await.unwrap();
    contracts_store::upsert_contracts(&mut tx, &[contract]).await.unwrap();
    contracts_store::rebuild_contract_indices(&mut tx).await.unwrap();
    tx.commit().await.unwrap();

    contracts::process_offseason(&ctx, 2025, 2026, &DefaultOptionPolicy)
        .await
        .unwrap();

    let mut tx = ctx.repo.begin_read().await.unwrap();
    let contract = contracts_store::get_contract(&mut tx, "C_TEAM_OPT")
        .await
        .unwrap()
        .unwrap();
    let team = roster_store::get_team_id_by_player(&mut tx, "P000001")
        .await
        .unwrap();
    tx.commit().await.unwrap();
    assert_eq!(contract.options[0].status, OptionStatus::Exercised);
    assert_eq!(contract.years, 2);
    assert!(contract.is_active);
    assert_eq!(team, "ATL");
}

#[tokio::test]
async fn test_sign_free_agent_and_release() {
    let ctx = league().await;
    seed_roster(
        &ctx,
        &[("P000001", "ATL", 1_000_000), ("P000002", "FA", 2_000_000)],
    )
    .await;
    contracts::ensure_contracts_bootstrapped_from_roster(&ctx, 2025)
        .await
        .unwrap();

    // A rostered player cannot be signed as a free agent.
    let err = contracts::sign_free_agent(&ctx, "BOS", "P000001", None, 1, None)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not a free agent"));

    let contract = contracts::sign_free_agent(&ctx, "BOS", "P000002", None, 2, None)
        .await
        .unwrap();
    assert_eq!(contract.team_id, "BOS");
    assert_eq!(contract.years, 2);
    assert_eq!(contract.salary_for_season(2025), 2_000_000);

    let mut tx = ctx.repo.begin_read().await.unwrap();
    assert_eq!(
        roster_store::get_team_id_by_player(&mut tx, "P000002").await.unwrap(),
        "BOS"
    );
    tx.commit().await.unwrap();

    // Release sends the player back and deactivates the contract.
    contracts::release_to_free_agents(&ctx, "P000002").await.unwrap();
    let mut tx = ctx.repo.begin_read().await.unwrap();
    assert_eq!(
        roster_store::get_team_id_by_player(&mut tx, "P000002").await.unwrap(),
        "FA"
    );
    assert!(contracts_store::get_active_contract(&mut tx, "P000002")
        .await
        .unwrap()
        .is_none());
    tx.commit().await.unwrap();
    ctx.repo.validate_integrity(true).await.unwrap();
}

#[tokio::test]
async fn test_re_sign_deactivates_previous_contract() {
    let ctx = league().await;
    seed_roster(&ctx, &[("P000001", "ATL", 1_000_000)]).await;
    contracts::ensure_contracts_bootstrapped_from_roster(&ctx, 2025)
        .await
        .unwrap();

    let salary: std::collections::BTreeMap<String, i64> = [
        ("2025".to_string(), 4_000_000),
        ("2026".to_string(), 4_200_000),
    ]
    .into_iter()
    .collect();
    let renewed = contracts::re_sign_or_extend(&ctx, "P000001", None, 2, Some(salary))
        .await
        .unwrap();

    let mut tx = ctx.repo.begin_read().await.unwrap();
    let active = contracts_store::get_active_contract(&mut tx, "P000001")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(active.contract_id, renewed.contract_id);
    let all = contracts_store::get_contracts(&mut tx, false).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all.iter().filter(|c| c.is_active).count(), 1);
    // Roster salary follows the new deal's first season.
    assert_eq!(
        roster_store::get_salary_amount(&mut tx, "P000001").await.unwrap(),
        Some(4_000_000)
    );
    tx.commit().await.unwrap();
}
