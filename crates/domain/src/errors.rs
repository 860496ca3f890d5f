use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Integrity error: {0}")]
    IntegrityError(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error(transparent)]
    Trade(#[from] TradeError),
}

pub type DomainResult<T> = Result<T, DomainError>;

/// Stable trade error codes. The string forms are part of the wire contract
/// and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeCode {
    InvalidInput,
    InvalidPlayerId,
    MissingToTeam,
    ProtectionInvalid,
    SwapInvalid,
    DealInvalidated,
    PlayerNotOwned,
    PickNotOwned,
    SwapNotOwned,
    FixedAssetNotFound,
    FixedAssetNotOwned,
    ProtectionConflict,
    AssetLocked,
    DealExpired,
    DealAlreadyExecuted,
    ApplyFailed,
}

impl TradeCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeCode::InvalidInput => "INVALID_INPUT",
            TradeCode::InvalidPlayerId => "INVALID_PLAYER_ID",
            TradeCode::MissingToTeam => "MISSING_TO_TEAM",
            TradeCode::ProtectionInvalid => "PROTECTION_INVALID",
            TradeCode::SwapInvalid => "SWAP_INVALID",
            TradeCode::DealInvalidated => "DEAL_INVALIDATED",
            TradeCode::PlayerNotOwned => "PLAYER_NOT_OWNED",
            TradeCode::PickNotOwned => "PICK_NOT_OWNED",
            TradeCode::SwapNotOwned => "SWAP_NOT_OWNED",
            TradeCode::FixedAssetNotFound => "FIXED_ASSET_NOT_FOUND",
            TradeCode::FixedAssetNotOwned => "FIXED_ASSET_NOT_OWNED",
            TradeCode::ProtectionConflict => "PROTECTION_CONFLICT",
            TradeCode::AssetLocked => "ASSET_LOCKED",
            TradeCode::DealExpired => "DEAL_EXPIRED",
            TradeCode::DealAlreadyExecuted => "DEAL_ALREADY_EXECUTED",
            TradeCode::ApplyFailed => "APPLY_FAILED",
        }
    }
}

impl std::fmt::Display for TradeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed trade failure: a stable code, a human message, and structured
/// details identifying the offending entity.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct TradeError {
    pub code: TradeCode,
    pub message: String,
    pub details: Value,
}

impl TradeError {
    pub fn new(code: TradeCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: Value::Null,
        }
    }

    pub fn with_details(code: TradeCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
        }
    }
}

pub type TradeResult<T> = Result<T, TradeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_code_strings_are_stable() {
        assert_eq!(TradeCode::MissingToTeam.as_str(), "MISSING_TO_TEAM");
        assert_eq!(TradeCode::AssetLocked.as_str(), "ASSET_LOCKED");
        assert_eq!(TradeCode::DealAlreadyExecuted.as_str(), "DEAL_ALREADY_EXECUTED");
        assert_eq!(TradeCode::ApplyFailed.as_str(), "APPLY_FAILED");
    }

    #[test]
    fn test_trade_error_display() {
        let err = TradeError::new(TradeCode::DealExpired, "Deal expired");
        assert_eq!(err.to_string(), "DEAL_EXPIRED: Deal expired");
    }
}
