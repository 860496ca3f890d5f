use serde::{Deserialize, Serialize};

use crate::ids::{compute_swap_id, swap_pair_key};

/// The right to exchange two specific picks at settlement time. The two
/// picks must share year and round; at most one active swap per pick pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapRight {
    pub swap_id: String,
    pub pick_id_a: String,
    pub pick_id_b: String,
    pub year: Option<i32>,
    pub round: Option<u8>,
    pub owner_team: String,
    pub active: bool,
    #[serde(default)]
    pub created_by_deal_id: Option<String>,
}

impl SwapRight {
    pub fn pair_key(&self) -> String {
        swap_pair_key(&self.pick_id_a, &self.pick_id_b)
    }

    pub fn id_is_canonical(&self) -> bool {
        self.swap_id == compute_swap_id(&self.pick_id_a, &self.pick_id_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_swap_id() {
        let swap = SwapRight {
            swap_id: compute_swap_id("2026_R1_BOS", "2026_R1_ATL"),
            pick_id_a: "2026_R1_ATL".to_string(),
            pick_id_b: "2026_R1_BOS".to_string(),
            year: Some(2026),
            round: Some(1),
            owner_team: "ATL".to_string(),
            active: true,
            created_by_deal_id: None,
        };
        assert!(swap.id_is_canonical());
        assert_eq!(swap.pair_key(), "2026_R1_ATL|2026_R1_BOS");
    }
}
