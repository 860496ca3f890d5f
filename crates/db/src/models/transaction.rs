use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct TransactionDb {
    pub tx_hash: String,
    pub tx_type: String,
    pub tx_date: Option<String>,
    pub deal_id: Option<String>,
    pub source: Option<String>,
    pub payload_json: String,
}

impl TransactionDb {
    pub fn payload(&self) -> serde_json::Value {
        serde_json::from_str(&self.payload_json).unwrap_or(serde_json::Value::Null)
    }
}
