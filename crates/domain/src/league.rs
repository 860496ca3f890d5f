//! League structure: the 30-team vocabulary, conference/division layout and
//! season/cap constants.

/// Distinguished team id representing free agency.
pub const FREE_AGENT_TEAM_ID: &str = "FA";

pub const SEASON_START_MONTH: u32 = 10;
pub const SEASON_START_DAY: u32 = 19;
pub const SEASON_LENGTH_DAYS: i64 = 180;
pub const MAX_GAMES_PER_DAY: usize = 8;

pub const INITIAL_SEASON_YEAR: i32 = 2025;
pub const CAP_BASE_SEASON_YEAR: i32 = 2025;
pub const CAP_BASE_SALARY_CAP: i64 = 154_647_000;
pub const CAP_BASE_FIRST_APRON: i64 = 195_945_000;
pub const CAP_BASE_SECOND_APRON: i64 = 207_824_000;
pub const CAP_ANNUAL_GROWTH_RATE: f64 = 0.10;
pub const CAP_ROUND_UNIT: i64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conference {
    East,
    West,
}

impl Conference {
    pub fn as_str(&self) -> &'static str {
        match self {
            Conference::East => "East",
            Conference::West => "West",
        }
    }
}

/// `(conference, division name, member teams)` — five teams per division.
pub const DIVISIONS: [(Conference, &str, [&str; 5]); 6] = [
    (Conference::West, "Southwest", ["DAL", "HOU", "MEM", "NOP", "SAS"]),
    (Conference::West, "Northwest", ["DEN", "MIN", "OKC", "POR", "UTA"]),
    (Conference::West, "Pacific", ["GSW", "LAC", "LAL", "PHX", "SAC"]),
    (Conference::East, "Atlantic", ["BOS", "BKN", "NYK", "PHI", "TOR"]),
    (Conference::East, "Central", ["CHI", "CLE", "DET", "IND", "MIL"]),
    (Conference::East, "Southeast", ["ATL", "CHA", "MIA", "ORL", "WAS"]),
];

/// All 30 team ids in a deterministic (division-grouped) order.
pub fn all_team_ids() -> Vec<&'static str> {
    DIVISIONS
        .iter()
        .flat_map(|(_, _, teams)| teams.iter().copied())
        .collect()
}

pub fn is_known_team(team_id: &str) -> bool {
    DIVISIONS
        .iter()
        .any(|(_, _, teams)| teams.contains(&team_id))
}

/// Conference and division of a team, if it belongs to the league.
pub fn conference_and_division(team_id: &str) -> Option<(Conference, &'static str)> {
    DIVISIONS
        .iter()
        .find(|(_, _, teams)| teams.contains(&team_id))
        .map(|(conf, div, _)| (*conf, *div))
}

/// Divisions of a single conference, in declaration order.
pub fn conference_divisions(conference: Conference) -> Vec<[&'static str; 5]> {
    DIVISIONS
        .iter()
        .filter(|(conf, _, _)| *conf == conference)
        .map(|(_, _, teams)| *teams)
        .collect()
}
