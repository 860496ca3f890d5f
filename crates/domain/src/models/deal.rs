//! Deal representation: an ordered set of teams and, per team, the assets it
//! sends out. Assets are a tagged variant; rules and apply consume them via
//! exhaustive matching.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::errors::{TradeCode, TradeError, TradeResult};
use crate::ids::{compute_swap_id, make_player_id_seq, normalize_player_id, normalize_team_id};
use crate::models::draft_pick::{normalize_protection, PickProtection};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Asset {
    Player {
        player_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to_team: Option<String>,
    },
    Pick {
        pick_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to_team: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        protection: Option<PickProtection>,
    },
    Swap {
        swap_id: String,
        pick_id_a: String,
        pick_id_b: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to_team: Option<String>,
    },
    FixedAsset {
        asset_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to_team: Option<String>,
    },
}

impl Asset {
    /// Stable lock/dedup key for the asset.
    pub fn asset_key(&self) -> String {
        match self {
            Asset::Player { player_id, .. } => format!("player:{player_id}"),
            Asset::Pick { pick_id, .. } => format!("pick:{pick_id}"),
            Asset::Swap { swap_id, .. } => format!("swap:{swap_id}"),
            Asset::FixedAsset { asset_id, .. } => format!("fixed_asset:{asset_id}"),
        }
    }

    pub fn to_team(&self) -> Option<&str> {
        match self {
            Asset::Player { to_team, .. }
            | Asset::Pick { to_team, .. }
            | Asset::Swap { to_team, .. }
            | Asset::FixedAsset { to_team, .. } => to_team.as_deref(),
        }
    }

    fn sort_key(&self) -> (u8, String, String) {
        match self {
            Asset::Player {
                player_id, to_team, ..
            } => (0, to_team.clone().unwrap_or_default(), player_id.clone()),
            Asset::Pick {
                pick_id, to_team, ..
            } => (1, to_team.clone().unwrap_or_default(), pick_id.clone()),
            Asset::Swap {
                swap_id, to_team, ..
            } => (2, to_team.clone().unwrap_or_default(), swap_id.clone()),
            Asset::FixedAsset {
                asset_id, to_team, ..
            } => (3, to_team.clone().unwrap_or_default(), asset_id.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub teams: Vec<String>,
    pub legs: BTreeMap<String, Vec<Asset>>,
    #[serde(default)]
    pub meta: Map<String, Value>,
}

impl Deal {
    pub fn assets(&self) -> impl Iterator<Item = (&String, &Asset)> {
        self.legs
            .iter()
            .flat_map(|(team, assets)| assets.iter().map(move |a| (team, a)))
    }
}

fn team_for_trade(value: &str, context: &str) -> TradeResult<String> {
    normalize_team_id(value, true, false).map_err(|_| {
        TradeError::with_details(
            TradeCode::InvalidInput,
            format!("{context}: invalid team_id"),
            json!({ "value": value }),
        )
    })
}

fn player_for_trade(value: &Value, context: &str, allow_legacy_numeric: bool) -> TradeResult<String> {
    if let Some(s) = value.as_str() {
        if let Ok(pid) = normalize_player_id(s, true, false) {
            return Ok(pid);
        }
        if allow_legacy_numeric {
            if let Ok(n) = s.trim().parse::<u32>() {
                return Ok(make_player_id_seq(n));
            }
        }
    } else if allow_legacy_numeric {
        if let Some(n) = value.as_u64() {
            return Ok(make_player_id_seq(n as u32));
        }
    }
    Err(TradeError::with_details(
        TradeCode::InvalidPlayerId,
        format!("{context}: invalid player_id"),
        json!({ "value": value }),
    ))
}

fn parse_asset(raw: &Value, allow_legacy_numeric: bool) -> TradeResult<Asset> {
    let obj = raw.as_object().ok_or_else(|| {
        TradeError::with_details(
            TradeCode::DealInvalidated,
            "Asset must be an object",
            raw.clone(),
        )
    })?;
    let kind = obj
        .get("kind")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_lowercase();
    let to_team = match obj.get("to_team").and_then(|v| v.as_str()) {
        Some(t) if !t.trim().is_empty() => Some(team_for_trade(t, "asset.to_team")?),
        _ => None,
    };

    match kind.as_str() {
        "player" => {
            let player_id = obj.get("player_id").ok_or_else(|| {
                TradeError::with_details(
                    TradeCode::DealInvalidated,
                    "Missing player_id in asset",
                    raw.clone(),
                )
            })?;
            let player_id = player_for_trade(player_id, "asset.player_id", allow_legacy_numeric)?;
            Ok(Asset::Player { player_id, to_team })
        }
        "pick" => {
            let pick_id = obj
                .get("pick_id")
                .and_then(|v| v.as_str())
                .filter(|s| !s.trim().is_empty())
                .ok_or_else(|| {
                    TradeError::with_details(
                        TradeCode::DealInvalidated,
                        "Missing pick_id in asset",
                        raw.clone(),
                    )
                })?;
            let protection = match obj.get("protection") {
                None | Some(Value::Null) => None,
                Some(p) => Some(normalize_protection(p)?),
            };
            Ok(Asset::Pick {
                pick_id: pick_id.to_string(),
                to_team,
                protection,
            })
        }
        "swap" => {
            let pick_id_a = obj
                .get("pick_id_a")
                .and_then(|v| v.as_str())
                .filter(|s| !s.trim().is_empty())
                .ok_or_else(|| {
                    TradeError::with_details(
                        TradeCode::DealInvalidated,
                        "Missing pick_id_a in asset",
                        raw.clone(),
                    )
                })?;
            let pick_id_b = obj
                .get("pick_id_b")
                .and_then(|v| v.as_str())
                .filter(|s| !s.trim().is_empty())
                .ok_or_else(|| {
                    TradeError::with_details(
                        TradeCode::DealInvalidated,
                        "Missing pick_id_b in asset",
                        raw.clone(),
                    )
                })?;
            let swap_id = obj
                .get("swap_id")
                .and_then(|v| v.as_str())
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.to_string())
                .unwrap_or_else(|| compute_swap_id(pick_id_a, pick_id_b));
            Ok(Asset::Swap {
                swap_id,
                pick_id_a: pick_id_a.to_string(),
                pick_id_b: pick_id_b.to_string(),
                to_team,
            })
        }
        "fixed_asset" => {
            let asset_id = obj
                .get("asset_id")
                .and_then(|v| v.as_str())
                .filter(|s| !s.trim().is_empty())
                .ok_or_else(|| {
                    TradeError::with_details(
                        TradeCode::DealInvalidated,
                        "Missing asset_id in asset",
                        raw.clone(),
                    )
                })?;
            Ok(Asset::FixedAsset {
                asset_id: asset_id.to_string(),
                to_team,
            })
        }
        _ => Err(TradeError::with_details(
            TradeCode::DealInvalidated,
            "Unknown asset kind",
            raw.clone(),
        )),
    }
}

/// Parse a raw deal payload:
/// `{ "teams": [...], "legs": { team -> [assets] }, "meta"?: {...} }`.
pub fn parse_deal(payload: &Value, allow_legacy_numeric: bool) -> TradeResult<Deal> {
    let teams_raw = payload.get("teams").and_then(|v| v.as_array());
    let legs_raw = payload.get("legs").and_then(|v| v.as_object());
    let (teams_raw, legs_raw) = match (teams_raw, legs_raw) {
        (Some(t), Some(l)) => (t, l),
        _ => {
            return Err(TradeError::with_details(
                TradeCode::DealInvalidated,
                "Invalid deal payload",
                payload.clone(),
            ))
        }
    };
    if teams_raw.is_empty() {
        return Err(TradeError::with_details(
            TradeCode::DealInvalidated,
            "Deal must include teams",
            payload.clone(),
        ));
    }

    let mut teams = Vec::with_capacity(teams_raw.len());
    for team in teams_raw {
        let value = team.as_str().unwrap_or_default();
        teams.push(team_for_trade(value, "deal.teams")?);
    }

    let mut normalized_legs: BTreeMap<String, &Value> = BTreeMap::new();
    for (key, value) in legs_raw {
        normalized_legs.insert(team_for_trade(key, "deal.legs key")?, value);
    }

    let mut legs: BTreeMap<String, Vec<Asset>> = BTreeMap::new();
    for team_id in &teams {
        let raw_assets = normalized_legs.get(team_id).ok_or_else(|| {
            TradeError::with_details(
                TradeCode::DealInvalidated,
                format!("Missing legs for team {team_id}"),
                payload.clone(),
            )
        })?;
        let raw_assets = raw_assets.as_array().ok_or_else(|| {
            TradeError::with_details(
                TradeCode::DealInvalidated,
                format!("Invalid legs for team {team_id}"),
                payload.clone(),
            )
        })?;
        let assets = raw_assets
            .iter()
            .map(|raw| parse_asset(raw, allow_legacy_numeric))
            .collect::<TradeResult<Vec<_>>>()?;
        legs.insert(team_id.clone(), assets);
    }

    if teams.len() >= 3 {
        for (team_id, assets) in &legs {
            for asset in assets {
                if asset.to_team().is_none() {
                    return Err(TradeError::with_details(
                        TradeCode::MissingToTeam,
                        "Missing to_team for multi-team deal asset",
                        json!({ "team_id": team_id, "asset_key": asset.asset_key() }),
                    ));
                }
            }
        }
    }

    let meta = match payload.get("meta") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(m)) => m.clone(),
        Some(_) => {
            return Err(TradeError::with_details(
                TradeCode::DealInvalidated,
                "meta must be an object",
                payload.clone(),
            ))
        }
    };

    Ok(Deal { teams, legs, meta })
}

/// Deterministic wire form: sorted teams, each leg sorted by
/// `(variant rank, to_team, identifier)`.
pub fn canonicalize_deal(deal: &Deal) -> TradeResult<Deal> {
    let mut teams = deal
        .teams
        .iter()
        .map(|t| team_for_trade(t, "deal.teams"))
        .collect::<TradeResult<Vec<_>>>()?;
    teams.sort();
    teams.dedup();

    let mut legs: BTreeMap<String, Vec<Asset>> = BTreeMap::new();
    for (team_id, assets) in &deal.legs {
        let normalized_team = team_for_trade(team_id, "deal.legs key")?;
        let mut normalized_assets = assets.clone();
        for asset in &mut normalized_assets {
            if let Some(to_team) = asset.to_team() {
                let normalized = team_for_trade(to_team, "deal.asset.to_team")?;
                match asset {
                    Asset::Player { to_team, .. }
                    | Asset::Pick { to_team, .. }
                    | Asset::Swap { to_team, .. }
                    | Asset::FixedAsset { to_team, .. } => *to_team = Some(normalized),
                }
            }
        }
        normalized_assets.sort_by_key(|a| a.sort_key());
        legs.insert(normalized_team, normalized_assets);
    }

    Ok(Deal {
        teams,
        legs,
        meta: deal.meta.clone(),
    })
}

/// JSON projection of a deal; inverse of [`parse_deal`] for canonical deals.
pub fn serialize_deal(deal: &Deal) -> Value {
    let mut legs = Map::new();
    for (team_id, assets) in &deal.legs {
        let assets_payload: Vec<Value> = assets
            .iter()
            .map(|asset| serde_json::to_value(asset).unwrap_or(Value::Null))
            .collect();
        legs.insert(team_id.clone(), Value::Array(assets_payload));
    }
    let mut payload = Map::new();
    payload.insert(
        "teams".to_string(),
        Value::Array(deal.teams.iter().map(|t| json!(t)).collect()),
    );
    payload.insert("legs".to_string(), Value::Object(legs));
    if !deal.meta.is_empty() {
        payload.insert("meta".to_string(), Value::Object(deal.meta.clone()));
    }
    Value::Object(payload)
}

/// Receiving team for an asset: explicit `to_team`, or the other side of a
/// bilateral deal.
pub fn resolve_receiver(deal: &Deal, sender_team: &str, asset: &Asset) -> TradeResult<String> {
    if let Some(to_team) = asset.to_team() {
        return Ok(to_team.to_string());
    }
    if deal.teams.len() == 2 {
        if let Some(other) = deal.teams.iter().find(|t| t.as_str() != sender_team) {
            return Ok(other.clone());
        }
    }
    Err(TradeError::with_details(
        TradeCode::MissingToTeam,
        "Missing to_team for multi-team deal asset",
        json!({ "team_id": sender_team, "asset_key": asset.asset_key() }),
    ))
}
