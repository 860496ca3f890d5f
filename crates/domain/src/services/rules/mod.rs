//! Rules-based trade validation.
//!
//! Rules are pure functions over a [`TradeContext`] snapshot assembled by the
//! persistence layer inside the validating transaction. The engine runs every
//! enabled rule in ascending priority and stops at the first violation.

mod asset_lock;
mod deadline;
mod duplicate_asset;
mod ownership;
mod pick_protection;
mod pick_rules;
mod player_eligibility;
mod return_to_trading_team;
mod roster_limit;
mod salary_matching;
mod swap_uniqueness;
mod team_legs;

pub use asset_lock::AssetLockRule;
pub use deadline::DeadlineRule;
pub use duplicate_asset::DuplicateAssetRule;
pub use ownership::OwnershipRule;
pub use pick_protection::PickProtectionSchemaRule;
pub use pick_rules::PickRulesRule;
pub use player_eligibility::PlayerEligibilityRule;
pub use return_to_trading_team::ReturnToTradingTeamRule;
pub use roster_limit::RosterLimitRule;
pub use salary_matching::SalaryMatchingRule;
pub use swap_uniqueness::SwapUniquenessRule;
pub use team_legs::TeamLegsRule;

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::config::TradeRulesConfig;
use crate::errors::TradeResult;
use crate::models::deal::resolve_receiver;
use crate::models::{Asset, AssetLock, Deal, DraftPick, FixedAsset, PlayerTradeMeta, SwapRight};

/// Roster-side state of one player at snapshot time.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerTradeState {
    pub team_id: String,
    pub salary_amount: i64,
    pub meta: PlayerTradeMeta,
}

/// Consistent read of everything trade validation touches, taken in one
/// transaction. Expired asset locks are dropped (and deleted) while the
/// snapshot is built, so only live locks appear here.
#[derive(Debug, Clone, Default)]
pub struct TradeSnapshot {
    pub players: BTreeMap<String, PlayerTradeState>,
    pub picks: BTreeMap<String, DraftPick>,
    pub swaps: BTreeMap<String, SwapRight>,
    pub fixed_assets: BTreeMap<String, FixedAsset>,
    pub locks: BTreeMap<String, AssetLock>,
    pub roster_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone)]
pub struct TradeContext {
    pub snapshot: TradeSnapshot,
    pub config: TradeRulesConfig,
    pub season_year: i32,
    pub draft_year: i32,
    pub current_date: NaiveDate,
    /// Lock holder to tolerate, used when re-validating a committed deal.
    pub allow_locked_by_deal_id: Option<String>,
}

/// Per-team outgoing/incoming player salary totals.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TeamTradeTotals {
    pub outgoing_salary: i64,
    pub incoming_salary: i64,
    pub outgoing_players: usize,
    pub incoming_players: usize,
}

/// Pre/post trade payrolls per team.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TeamPayroll {
    pub payroll_before: i64,
    pub payroll_after: i64,
}

/// Outgoing and incoming player ids per team.
pub fn build_player_moves(
    deal: &Deal,
) -> TradeResult<(BTreeMap<String, Vec<String>>, BTreeMap<String, Vec<String>>)> {
    let mut players_out: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut players_in: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for team in &deal.teams {
        players_out.entry(team.clone()).or_default();
        players_in.entry(team.clone()).or_default();
    }
    for (team_id, assets) in &deal.legs {
        for asset in assets {
            if let Asset::Player { player_id, .. } = asset {
                let receiver = resolve_receiver(deal, team_id, asset)?;
                players_out
                    .entry(team_id.clone())
                    .or_default()
                    .push(player_id.clone());
                players_in.entry(receiver).or_default().push(player_id.clone());
            }
        }
    }
    Ok((players_out, players_in))
}

fn sum_salaries(ctx: &TradeContext, player_ids: &[String]) -> i64 {
    player_ids
        .iter()
        .filter_map(|pid| ctx.snapshot.players.get(pid))
        .map(|p| p.salary_amount)
        .sum()
}

pub fn build_team_trade_totals(
    deal: &Deal,
    ctx: &TradeContext,
) -> TradeResult<BTreeMap<String, TeamTradeTotals>> {
    let (players_out, players_in) = build_player_moves(deal)?;
    let mut totals = BTreeMap::new();
    for team_id in &deal.teams {
        let outgoing = players_out.get(team_id).cloned().unwrap_or_default();
        let incoming = players_in.get(team_id).cloned().unwrap_or_default();
        totals.insert(
            team_id.clone(),
            TeamTradeTotals {
                outgoing_salary: sum_salaries(ctx, &outgoing),
                incoming_salary: sum_salaries(ctx, &incoming),
                outgoing_players: outgoing.len(),
                incoming_players: incoming.len(),
            },
        );
    }
    Ok(totals)
}

pub fn build_team_payrolls(
    deal: &Deal,
    ctx: &TradeContext,
    totals: &BTreeMap<String, TeamTradeTotals>,
) -> BTreeMap<String, TeamPayroll> {
    let mut payrolls = BTreeMap::new();
    for team_id in &deal.teams {
        let payroll_before: i64 = ctx
            .snapshot
            .players
            .values()
            .filter(|p| &p.team_id == team_id)
            .map(|p| p.salary_amount)
            .sum();
        let team_totals = totals.get(team_id).copied().unwrap_or_default();
        payrolls.insert(
            team_id.clone(),
            TeamPayroll {
                payroll_before,
                payroll_after: payroll_before - team_totals.outgoing_salary
                    + team_totals.incoming_salary,
            },
        );
    }
    payrolls
}

pub trait TradeRule: Send + Sync {
    fn rule_id(&self) -> &'static str;
    fn priority(&self) -> u32;
    fn enabled(&self) -> bool {
        true
    }
    fn validate(&self, deal: &Deal, ctx: &TradeContext) -> TradeResult<()>;
}

/// The built-in rule list of the engine, in priority order.
pub fn builtin_rules() -> Vec<Box<dyn TradeRule>> {
    vec![
        Box::new(DeadlineRule),
        Box::new(TeamLegsRule),
        Box::new(DuplicateAssetRule),
        Box::new(PickProtectionSchemaRule),
        Box::new(SwapUniquenessRule),
        Box::new(AssetLockRule),
        Box::new(OwnershipRule),
        Box::new(RosterLimitRule),
        Box::new(PlayerEligibilityRule),
        Box::new(ReturnToTradingTeamRule),
        Box::new(PickRulesRule),
        Box::new(SalaryMatchingRule),
    ]
}

/// Run every enabled rule in ascending priority.
pub fn run_rules(deal: &Deal, ctx: &TradeContext, rules: &[Box<dyn TradeRule>]) -> TradeResult<()> {
    let mut order: Vec<&Box<dyn TradeRule>> = rules.iter().filter(|r| r.enabled()).collect();
    order.sort_by_key(|r| r.priority());
    for rule in order {
        tracing::trace!(rule = rule.rule_id(), "validating trade rule");
        rule.validate(deal, ctx)?;
    }
    Ok(())
}

/// Validate a deal against the built-in rule list.
pub fn validate_all(deal: &Deal, ctx: &TradeContext) -> TradeResult<()> {
    run_rules(deal, ctx, &builtin_rules())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::models::{Asset, Deal};
    use serde_json::Map;

    pub fn bilateral_deal(atl_assets: Vec<Asset>, bos_assets: Vec<Asset>) -> Deal {
        let mut legs = BTreeMap::new();
        legs.insert("ATL".to_string(), atl_assets);
        legs.insert("BOS".to_string(), bos_assets);
        Deal {
            teams: vec!["ATL".to_string(), "BOS".to_string()],
            legs,
            meta: Map::new(),
        }
    }

    pub fn player_asset(player_id: &str) -> Asset {
        Asset::Player {
            player_id: player_id.to_string(),
            to_team: None,
        }
    }

    pub fn pick_asset(pick_id: &str) -> Asset {
        Asset::Pick {
            pick_id: pick_id.to_string(),
            to_team: None,
            protection: None,
        }
    }

    pub fn rostered_player(team_id: &str, salary: i64) -> PlayerTradeState {
        PlayerTradeState {
            team_id: team_id.to_string(),
            salary_amount: salary,
            meta: PlayerTradeMeta::default(),
        }
    }

    pub fn context() -> TradeContext {
        TradeContext {
            snapshot: TradeSnapshot::default(),
            config: TradeRulesConfig::default(),
            season_year: 2025,
            draft_year: 2026,
            current_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            allow_locked_by_deal_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_build_player_moves_bilateral() {
        let deal = bilateral_deal(vec![player_asset("P000001")], vec![player_asset("P000002")]);
        let (out, inc) = build_player_moves(&deal).unwrap();
        assert_eq!(out["ATL"], vec!["P000001"]);
        assert_eq!(inc["ATL"], vec!["P000002"]);
        assert_eq!(inc["BOS"], vec!["P000001"]);
    }

    #[test]
    fn test_totals_and_payrolls() {
        let mut ctx = context();
        ctx.snapshot
            .players
            .insert("P000001".to_string(), rostered_player("ATL", 10_000_000));
        ctx.snapshot
            .players
            .insert("P000002".to_string(), rostered_player("BOS", 4_000_000));
        ctx.snapshot
            .players
            .insert("P000003".to_string(), rostered_player("ATL", 2_000_000));

        let deal = bilateral_deal(vec![player_asset("P000001")], vec![player_asset("P000002")]);
        let totals = build_team_trade_totals(&deal, &ctx).unwrap();
        assert_eq!(totals["ATL"].outgoing_salary, 10_000_000);
        assert_eq!(totals["ATL"].incoming_salary, 4_000_000);

        let payrolls = build_team_payrolls(&deal, &ctx, &totals);
        assert_eq!(payrolls["ATL"].payroll_before, 12_000_000);
        assert_eq!(payrolls["ATL"].payroll_after, 6_000_000);
        assert_eq!(payrolls["BOS"].payroll_after, 10_000_000);
    }

    #[test]
    fn test_builtin_rule_priorities() {
        let rules = builtin_rules();
        let priorities: Vec<(&str, u32)> =
            rules.iter().map(|r| (r.rule_id(), r.priority())).collect();
        assert_eq!(
            priorities,
            vec![
                ("deadline", 10),
                ("team_legs", 20),
                ("duplicate_asset", 30),
                ("pick_protection_schema", 33),
                ("swap_uniqueness", 35),
                ("asset_lock", 40),
                ("ownership", 50),
                ("roster_limit", 60),
                ("player_eligibility", 70),
                ("return_to_trading_team_same_season", 72),
                ("pick_rules", 80),
                ("salary_matching", 85),
            ]
        );
    }
}
