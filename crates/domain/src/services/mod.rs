pub mod options_policy;
pub mod rules;
pub mod schedule;

pub use options_policy::{DefaultOptionPolicy, OptionDecision, OptionDecisionPolicy};
pub use schedule::build_master_schedule;
