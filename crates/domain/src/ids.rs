//! Canonical identifier formats and normalization helpers.
//!
//! player_id and team_id are canonical strings everywhere; never use row
//! indices as ids.

use std::collections::BTreeMap;

use crate::errors::{DomainError, DomainResult};
use crate::league;

/// Render a numeric sequence as a canonical player id (`P000123`).
pub fn make_player_id_seq(n: u32) -> String {
    format!("P{:06}", n)
}

fn is_canonical_player_id(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('P')
        && value[1..].chars().all(|c| c.is_ascii_digit())
}

/// Normalize a raw player id to the canonical `P######` form.
///
/// Strict mode rejects anything non-canonical. With `allow_legacy_numeric`,
/// bare integers (old spreadsheet exports) are accepted and rendered through
/// [`make_player_id_seq`].
pub fn normalize_player_id(
    value: &str,
    strict: bool,
    allow_legacy_numeric: bool,
) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::ValidationError(
            "player_id must be non-empty".to_string(),
        ));
    }
    let upper = trimmed.to_uppercase();
    if is_canonical_player_id(&upper) {
        return Ok(upper);
    }
    if allow_legacy_numeric {
        if let Ok(n) = trimmed.parse::<u32>() {
            return Ok(make_player_id_seq(n));
        }
    }
    if strict {
        return Err(DomainError::ValidationError(format!(
            "invalid player_id: {value:?} (expected P######)"
        )));
    }
    Ok(trimmed.to_string())
}

/// Normalize a raw team id against the league vocabulary.
///
/// `FA` is accepted only when `allow_fa` is set.
pub fn normalize_team_id(value: &str, strict: bool, allow_fa: bool) -> DomainResult<String> {
    let upper = value.trim().to_uppercase();
    if upper.is_empty() {
        return Err(DomainError::ValidationError(
            "team_id must be non-empty".to_string(),
        ));
    }
    if upper == league::FREE_AGENT_TEAM_ID {
        if allow_fa {
            return Ok(upper);
        }
        return Err(DomainError::ValidationError(
            "team_id 'FA' not allowed here".to_string(),
        ));
    }
    if league::is_known_team(&upper) {
        return Ok(upper);
    }
    if strict {
        return Err(DomainError::ValidationError(format!(
            "unknown team_id: {value:?}"
        )));
    }
    Ok(upper)
}

/// Canonical pick id: `"{year}_R{round}_{original_team}"`.
pub fn make_pick_id(year: i32, round: u8, original_team: &str) -> String {
    format!("{year}_R{round}_{}", original_team.to_uppercase())
}

/// Parse a pick id back into `(year, round, original_team)`.
pub fn parse_pick_id(pick_id: &str) -> DomainResult<(i32, u8, String)> {
    let mut parts = pick_id.splitn(3, '_');
    let year = parts
        .next()
        .and_then(|s| s.parse::<i32>().ok())
        .ok_or_else(|| DomainError::ValidationError(format!("invalid pick_id: {pick_id:?}")))?;
    let round_part = parts
        .next()
        .ok_or_else(|| DomainError::ValidationError(format!("invalid pick_id: {pick_id:?}")))?;
    let round = round_part
        .strip_prefix('R')
        .and_then(|s| s.parse::<u8>().ok())
        .filter(|r| *r == 1 || *r == 2)
        .ok_or_else(|| DomainError::ValidationError(format!("invalid pick_id round: {pick_id:?}")))?;
    let team = parts
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| DomainError::ValidationError(format!("invalid pick_id team: {pick_id:?}")))?;
    Ok((year, round, team.to_uppercase()))
}

/// Round-trip a pick id through [`parse_pick_id`] to its canonical form.
pub fn normalize_pick_id(pick_id: &str) -> DomainResult<String> {
    let (year, round, team) = parse_pick_id(pick_id.trim())?;
    Ok(make_pick_id(year, round, &team))
}

/// Canonical swap id for an unordered pick pair.
pub fn compute_swap_id(pick_id_a: &str, pick_id_b: &str) -> String {
    let (lo, hi) = if pick_id_a <= pick_id_b {
        (pick_id_a, pick_id_b)
    } else {
        (pick_id_b, pick_id_a)
    };
    format!("SWAP_{lo}__{hi}")
}

/// Order-independent key for an unordered pick pair, used for uniqueness.
pub fn swap_pair_key(pick_id_a: &str, pick_id_b: &str) -> String {
    let (lo, hi) = if pick_id_a <= pick_id_b {
        (pick_id_a, pick_id_b)
    } else {
        (pick_id_b, pick_id_a)
    };
    format!("{lo}|{hi}")
}

/// Season id from its starting year: `2025` -> `"2025-26"`.
pub fn season_id_from_year(year: i32) -> String {
    format!("{year}-{:02}", (year + 1) % 100)
}

/// Fail fast with the duplicated values listed.
pub fn assert_unique_ids<I, S>(ids: I, what: &str) -> DomainResult<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    for id in ids {
        *seen.entry(id.as_ref().to_string()).or_insert(0) += 1;
    }
    let dupes: Vec<String> = seen
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(id, _)| id)
        .collect();
    if !dupes.is_empty() {
        return Err(DomainError::DuplicateEntry(format!(
            "duplicate {what}: {dupes:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_canonical_passthrough() {
        assert_eq!(
            normalize_player_id("P000123", true, false).unwrap(),
            "P000123"
        );
        assert_eq!(
            normalize_player_id(" p000123 ", true, false).unwrap(),
            "P000123"
        );
    }

    #[test]
    fn test_player_id_strict_rejects_legacy() {
        assert!(normalize_player_id("123", true, false).is_err());
        assert!(normalize_player_id("", true, false).is_err());
        assert!(normalize_player_id("P12", true, false).is_err());
    }

    #[test]
    fn test_player_id_legacy_numeric() {
        assert_eq!(
            normalize_player_id("123", true, true).unwrap(),
            "P000123"
        );
        assert_eq!(make_player_id_seq(1), "P000001");
    }

    #[test]
    fn test_team_id_vocabulary() {
        assert_eq!(normalize_team_id("atl", true, false).unwrap(), "ATL");
        assert!(normalize_team_id("XYZ", true, false).is_err());
        assert!(normalize_team_id("FA", true, false).is_err());
        assert_eq!(normalize_team_id("FA", true, true).unwrap(), "FA");
    }

    #[test]
    fn test_pick_id_round_trip() {
        let id = make_pick_id(2026, 1, "ATL");
        assert_eq!(id, "2026_R1_ATL");
        assert_eq!(parse_pick_id(&id).unwrap(), (2026, 1, "ATL".to_string()));
        assert_eq!(normalize_pick_id(" 2026_R1_atl ").unwrap(), "2026_R1_ATL");
        assert!(parse_pick_id("2026_R3_ATL").is_err());
        assert!(parse_pick_id("junk").is_err());
    }

    #[test]
    fn test_swap_id_is_order_independent() {
        let a = "2026_R1_ATL";
        let b = "2026_R1_BOS";
        assert_eq!(compute_swap_id(a, b), compute_swap_id(b, a));
        assert_eq!(compute_swap_id(a, b), "SWAP_2026_R1_ATL__2026_R1_BOS");
        assert_eq!(swap_pair_key(b, a), "2026_R1_ATL|2026_R1_BOS");
    }

    #[test]
    fn test_season_id_from_year() {
        assert_eq!(season_id_from_year(2025), "2025-26");
        assert_eq!(season_id_from_year(2099), "2099-00");
    }

    #[test]
    fn test_assert_unique_ids() {
        assert!(assert_unique_ids(["P000001", "P000002"], "player_id").is_ok());
        let err = assert_unique_ids(["P000001", "P000001"], "player_id").unwrap_err();
        assert!(err.to_string().contains("P000001"));
    }
}
