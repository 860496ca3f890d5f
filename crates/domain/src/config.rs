//! League trade-rules configuration, persisted as JSON in the database.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::league;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRulesConfig {
    /// No trades strictly after this date. `None` disables the check.
    #[serde(default)]
    pub trade_deadline: Option<NaiveDate>,

    #[serde(default)]
    pub salary_cap: i64,
    #[serde(default)]
    pub first_apron: i64,
    #[serde(default)]
    pub second_apron: i64,

    #[serde(default = "default_true")]
    pub cap_auto_update: bool,
    #[serde(default = "default_cap_base_season_year")]
    pub cap_base_season_year: i32,
    #[serde(default = "default_cap_base_salary_cap")]
    pub cap_base_salary_cap: i64,
    #[serde(default = "default_cap_base_first_apron")]
    pub cap_base_first_apron: i64,
    #[serde(default = "default_cap_base_second_apron")]
    pub cap_base_second_apron: i64,
    #[serde(default = "default_cap_annual_growth_rate")]
    pub cap_annual_growth_rate: f64,
    #[serde(default = "default_cap_round_unit")]
    pub cap_round_unit: i64,

    #[serde(default = "default_match_small_out_max")]
    pub match_small_out_max: i64,
    #[serde(default = "default_match_mid_out_max")]
    pub match_mid_out_max: i64,
    #[serde(default = "default_match_mid_add")]
    pub match_mid_add: i64,
    #[serde(default = "default_match_buffer")]
    pub match_buffer: i64,
    #[serde(default = "default_first_apron_mult")]
    pub first_apron_mult: f64,
    #[serde(default = "default_second_apron_mult")]
    pub second_apron_mult: f64,

    #[serde(default = "default_new_fa_sign_ban_days")]
    pub new_fa_sign_ban_days: i64,
    #[serde(default = "default_aggregation_ban_days")]
    pub aggregation_ban_days: i64,
    #[serde(default = "default_max_pick_years_ahead")]
    pub max_pick_years_ahead: i32,
    #[serde(default = "default_stepien_lookahead")]
    pub stepien_lookahead: i32,
    #[serde(default = "default_max_roster_size")]
    pub max_roster_size: usize,
}

fn default_true() -> bool {
    true
}
fn default_cap_base_season_year() -> i32 {
    league::CAP_BASE_SEASON_YEAR
}
fn default_cap_base_salary_cap() -> i64 {
    league::CAP_BASE_SALARY_CAP
}
fn default_cap_base_first_apron() -> i64 {
    league::CAP_BASE_FIRST_APRON
}
fn default_cap_base_second_apron() -> i64 {
    league::CAP_BASE_SECOND_APRON
}
fn default_cap_annual_growth_rate() -> f64 {
    league::CAP_ANNUAL_GROWTH_RATE
}
fn default_cap_round_unit() -> i64 {
    league::CAP_ROUND_UNIT
}
fn default_match_small_out_max() -> i64 {
    7_500_000
}
fn default_match_mid_out_max() -> i64 {
    29_000_000
}
fn default_match_mid_add() -> i64 {
    7_500_000
}
fn default_match_buffer() -> i64 {
    250_000
}
fn default_first_apron_mult() -> f64 {
    1.10
}
fn default_second_apron_mult() -> f64 {
    1.00
}
fn default_new_fa_sign_ban_days() -> i64 {
    90
}
fn default_aggregation_ban_days() -> i64 {
    60
}
fn default_max_pick_years_ahead() -> i32 {
    7
}
fn default_stepien_lookahead() -> i32 {
    7
}
fn default_max_roster_size() -> usize {
    15
}

impl Default for TradeRulesConfig {
    fn default() -> Self {
        Self {
            trade_deadline: None,
            salary_cap: 0,
            first_apron: 0,
            second_apron: 0,
            cap_auto_update: true,
            cap_base_season_year: default_cap_base_season_year(),
            cap_base_salary_cap: default_cap_base_salary_cap(),
            cap_base_first_apron: default_cap_base_first_apron(),
            cap_base_second_apron: default_cap_base_second_apron(),
            cap_annual_growth_rate: default_cap_annual_growth_rate(),
            cap_round_unit: default_cap_round_unit(),
            match_small_out_max: default_match_small_out_max(),
            match_mid_out_max: default_match_mid_out_max(),
            match_mid_add: default_match_mid_add(),
            match_buffer: default_match_buffer(),
            first_apron_mult: default_first_apron_mult(),
            second_apron_mult: default_second_apron_mult(),
            new_fa_sign_ban_days: default_new_fa_sign_ban_days(),
            aggregation_ban_days: default_aggregation_ban_days(),
            max_pick_years_ahead: default_max_pick_years_ahead(),
            stepien_lookahead: default_stepien_lookahead(),
            max_roster_size: default_max_roster_size(),
        }
    }
}

impl TradeRulesConfig {
    /// Compound the base cap/apron values out to `season_year` and round to
    /// the configured unit. Invariant after rounding:
    /// `salary_cap <= first_apron <= second_apron`.
    pub fn apply_cap_model(&mut self, season_year: i32) {
        if !self.cap_auto_update {
            return;
        }
        let unit = self.cap_round_unit.max(1);
        let growth = self.cap_annual_growth_rate;
        let periods = season_year - self.cap_base_season_year;
        let grow = move |base: i64| -> i64 {
            let grown = base as f64 * (1.0 + growth).powi(periods);
            ((grown / unit as f64).round() as i64) * unit
        };
        self.salary_cap = grow(self.cap_base_salary_cap);
        self.first_apron = grow(self.cap_base_first_apron).max(self.salary_cap);
        self.second_apron = grow(self.cap_base_second_apron).max(self.first_apron);
    }
}
