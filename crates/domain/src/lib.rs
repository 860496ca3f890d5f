pub mod config;
pub mod errors;
pub mod ids;
pub mod league;
pub mod models;
pub mod services;

pub use config::TradeRulesConfig;
pub use errors::{DomainError, DomainResult, TradeCode, TradeError, TradeResult};
