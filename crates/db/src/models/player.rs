use domain::models::{Player, PlayerTradeMeta};
use serde_json::Map;
use sqlx::FromRow;

use crate::errors::{DbError, DbResult};

#[derive(Debug, Clone, FromRow)]
pub struct PlayerDb {
    pub player_id: String,
    pub name: Option<String>,
    pub pos: Option<String>,
    pub age: Option<i64>,
    pub height_in: Option<i64>,
    pub weight_lb: Option<i64>,
    pub ovr: Option<i64>,
    pub attrs_json: String,
    pub trade_meta_json: Option<String>,
}

impl PlayerDb {
    pub fn from_domain(player: &Player) -> DbResult<Self> {
        Ok(Self {
            player_id: player.player_id.clone(),
            name: player.name.clone(),
            pos: player.pos.clone(),
            age: player.age.map(i64::from),
            height_in: player.height_in.map(i64::from),
            weight_lb: player.weight_lb.map(i64::from),
            ovr: player.ovr.map(i64::from),
            attrs_json: serde_json::to_string(&player.attrs)?,
            trade_meta_json: None,
        })
    }

    pub fn to_domain(&self) -> DbResult<Player> {
        let attrs: Map<String, serde_json::Value> = if self.attrs_json.is_empty() {
            Map::new()
        } else {
            serde_json::from_str(&self.attrs_json)
                .map_err(|e| DbError::MappingError(format!("players.attrs_json: {e}")))?
        };
        Ok(Player {
            player_id: self.player_id.clone(),
            name: self.name.clone(),
            pos: self.pos.clone(),
            age: self.age.map(|v| v as i32),
            height_in: self.height_in.map(|v| v as i32),
            weight_lb: self.weight_lb.map(|v| v as i32),
            ovr: self.ovr.map(|v| v as i32),
            attrs,
        })
    }

    pub fn trade_meta(&self) -> PlayerTradeMeta {
        self.trade_meta_json
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default()
    }
}
