use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One append-only history entry. The canonical JSON payload is hashed for
/// deduplication; the other fields are query columns extracted from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionEntry {
    pub tx_type: String,
    pub tx_date: Option<String>,
    pub deal_id: Option<String>,
    pub source: Option<String>,
    pub teams: Vec<String>,
    pub payload: Value,
}

impl TransactionEntry {
    /// Build an entry from a raw payload object, pulling the query columns
    /// out of the payload itself.
    pub fn from_payload(payload: Value) -> Self {
        let obj = payload.as_object();
        let get_str = |key: &str| {
            obj.and_then(|o| o.get(key))
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
        };
        let teams = obj
            .and_then(|o| o.get("teams"))
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(|s| s.to_string()))
                    .collect()
            })
            .unwrap_or_default();
        Self {
            tx_type: get_str("type").unwrap_or_else(|| "unknown".to_string()),
            tx_date: get_str("date"),
            deal_id: get_str("deal_id"),
            source: get_str("source"),
            teams,
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_payload_extracts_columns() {
        let entry = TransactionEntry::from_payload(json!({
            "type": "trade",
            "date": "2026-01-15",
            "deal_id": "d-1",
            "source": "ui",
            "teams": ["ATL", "BOS"],
            "assets": {}
        }));
        assert_eq!(entry.tx_type, "trade");
        assert_eq!(entry.tx_date.as_deref(), Some("2026-01-15"));
        assert_eq!(entry.teams, vec!["ATL", "BOS"]);
    }

    #[test]
    fn test_from_payload_defaults() {
        let entry = TransactionEntry::from_payload(json!({"note": "x"}));
        assert_eq!(entry.tx_type, "unknown");
        assert!(entry.tx_date.is_none());
        assert!(entry.teams.is_empty());
    }
}
