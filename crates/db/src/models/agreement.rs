use chrono::NaiveDate;
use domain::models::{AgreementStatus, AssetLock, TradeAgreement};
use sqlx::FromRow;

use crate::errors::{DbError, DbResult};

#[derive(Debug, Clone, FromRow)]
pub struct TradeAgreementDb {
    pub deal_id: String,
    pub deal_json: String,
    pub assets_hash: String,
    pub created_at: String,
    pub expires_at: String,
    pub status: String,
}

fn parse_date(value: &str, column: &str) -> DbResult<NaiveDate> {
    value
        .parse()
        .map_err(|_| DbError::MappingError(format!("{column}: invalid date {value:?}")))
}

impl TradeAgreementDb {
    pub fn to_domain(&self) -> DbResult<TradeAgreement> {
        Ok(TradeAgreement {
            deal_id: self.deal_id.clone(),
            deal: serde_json::from_str(&self.deal_json)
                .map_err(|e| DbError::MappingError(format!("trade_agreements.deal_json: {e}")))?,
            assets_hash: self.assets_hash.clone(),
            created_at: parse_date(&self.created_at, "trade_agreements.created_at")?,
            expires_at: parse_date(&self.expires_at, "trade_agreements.expires_at")?,
            status: AgreementStatus::parse(&self.status)
                .map_err(|e| DbError::MappingError(e.to_string()))?,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct AssetLockDb {
    pub asset_key: String,
    pub deal_id: String,
    pub expires_at: Option<String>,
}

impl AssetLockDb {
    pub fn to_domain(&self) -> AssetLock {
        AssetLock {
            asset_key: self.asset_key.clone(),
            deal_id: self.deal_id.clone(),
            expires_at: self.expires_at.as_deref().and_then(|s| s.parse().ok()),
        }
    }
}
