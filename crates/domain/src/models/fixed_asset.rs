use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque tradable object: cash, future considerations, protection
/// compensation produced by pick settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedAsset {
    pub asset_id: String,
    pub label: Option<String>,
    pub value: Option<f64>,
    pub owner_team: String,
    #[serde(default)]
    pub source_pick_id: Option<String>,
    #[serde(default)]
    pub draft_year: Option<i32>,
    #[serde(default)]
    pub attrs: Map<String, Value>,
}
