use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgreementStatus {
    #[serde(rename = "ACTIVE")]
    Active,
    #[serde(rename = "EXECUTED")]
    Executed,
    #[serde(rename = "EXPIRED")]
    Expired,
    #[serde(rename = "INVALIDATED")]
    Invalidated,
}

impl AgreementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgreementStatus::Active => "ACTIVE",
            AgreementStatus::Executed => "EXECUTED",
            AgreementStatus::Expired => "EXPIRED",
            AgreementStatus::Invalidated => "INVALIDATED",
        }
    }

    pub fn parse(value: &str) -> DomainResult<Self> {
        match value.trim().to_uppercase().as_str() {
            "ACTIVE" => Ok(AgreementStatus::Active),
            "EXECUTED" => Ok(AgreementStatus::Executed),
            "EXPIRED" => Ok(AgreementStatus::Expired),
            "INVALIDATED" => Ok(AgreementStatus::Invalidated),
            other => Err(DomainError::ValidationError(format!(
                "invalid agreement status: {other:?}"
            ))),
        }
    }
}

/// A validated deal persisted with locked assets, awaiting apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeAgreement {
    pub deal_id: String,
    /// Canonical serialized deal payload.
    pub deal: Value,
    pub assets_hash: String,
    pub created_at: NaiveDate,
    pub expires_at: NaiveDate,
    pub status: AgreementStatus,
}

/// One asset held by a committed deal. `asset_key` is `"player:…"`,
/// `"pick:…"`, `"swap:…"` or `"fixed_asset:…"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetLock {
    pub asset_key: String,
    pub deal_id: String,
    pub expires_at: Option<NaiveDate>,
}

impl AssetLock {
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        matches!(self.expires_at, Some(expiry) if today > expiry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            AgreementStatus::Active,
            AgreementStatus::Executed,
            AgreementStatus::Expired,
            AgreementStatus::Invalidated,
        ] {
            assert_eq!(AgreementStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(AgreementStatus::parse("PENDING").is_err());
    }

    #[test]
    fn test_lock_expiry() {
        let lock = AssetLock {
            asset_key: "player:P000001".to_string(),
            deal_id: "d1".to_string(),
            expires_at: NaiveDate::from_ymd_opt(2026, 1, 10),
        };
        assert!(!lock.is_expired(NaiveDate::from_ymd_opt(2026, 1, 10).unwrap()));
        assert!(lock.is_expired(NaiveDate::from_ymd_opt(2026, 1, 11).unwrap()));
    }
}
