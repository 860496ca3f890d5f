pub mod errors;
pub mod integrity;
pub mod models;
pub mod pool;
pub mod repo;
pub mod schema;
pub mod store;

pub use errors::{DbError, DbResult};
pub use pool::{create_memory_pool, create_pool};
pub use repo::{LeagueRepo, LeagueTx};

use chrono::Utc;

/// Current UTC timestamp in the canonical `YYYY-MM-DDTHH:MM:SSZ` form used
/// for every `created_at`/`updated_at` column.
pub fn utc_now_iso() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Canonical JSON used for hashing: compact separators, keys sorted (the
/// default `serde_json::Map` is ordered).
pub fn canonical_json(value: &serde_json::Value) -> String {
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_shape() {
        let ts = utc_now_iso();
        assert_eq!(ts.len(), 20);
        assert!(ts.ends_with('Z'));
        assert_eq!(&ts[4..5], "-");
    }
}
