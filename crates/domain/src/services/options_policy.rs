//! Option decision policies. Offseason processing consults a policy for
//! every PENDING option reaching its decision season.

use crate::models::{Contract, ContractOption};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionDecision {
    Exercise,
    Decline,
}

pub trait OptionDecisionPolicy: Send + Sync {
    fn decide(&self, option: &ContractOption, player_id: &str, contract: &Contract)
        -> OptionDecision;
}

/// Exercises every option. Keeps offseason processing stable when no richer
/// policy is plugged in.
#[derive(Debug, Default)]
pub struct DefaultOptionPolicy;

impl OptionDecisionPolicy for DefaultOptionPolicy {
    fn decide(&self, _: &ContractOption, _: &str, _: &Contract) -> OptionDecision {
        OptionDecision::Exercise
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContractStatus, OptionStatus, OptionType};

    #[test]
    fn test_default_policy_exercises() {
        let contract = Contract {
            contract_id: "C1".into(),
            player_id: "P000001".into(),
            team_id: "ATL".into(),
            signed_date: "2024-07-01".into(),
            start_season_year: 2025,
            years: 2,
            salary_by_year: Default::default(),
            options: vec![],
            status: ContractStatus::Active,
            is_active: true,
        };
        let option = ContractOption {
            season_year: 2026,
            option_type: OptionType::Team,
            status: OptionStatus::Pending,
            decision_date: None,
        };
        let policy = DefaultOptionPolicy;
        assert_eq!(
            policy.decide(&option, "P000001", &contract),
            OptionDecision::Exercise
        );
    }
}
