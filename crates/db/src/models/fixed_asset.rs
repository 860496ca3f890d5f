use domain::models::FixedAsset;
use serde_json::Map;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct FixedAssetDb {
    pub asset_id: String,
    pub label: Option<String>,
    pub value: Option<f64>,
    pub owner_team: String,
    pub source_pick_id: Option<String>,
    pub draft_year: Option<i64>,
    pub attrs_json: Option<String>,
}

impl FixedAssetDb {
    pub fn to_domain(&self) -> FixedAsset {
        let attrs: Map<String, serde_json::Value> = self
            .attrs_json
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default();
        FixedAsset {
            asset_id: self.asset_id.clone(),
            label: self.label.clone(),
            value: self.value,
            owner_team: self.owner_team.to_uppercase(),
            source_pick_id: self.source_pick_id.clone(),
            draft_year: self.draft_year.map(|v| v as i32),
            attrs,
        }
    }
}
