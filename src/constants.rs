use crate::types::GameSetting;

pub const DEFAULT_DECISION_TIME: u32 = 30;

// Scoring rates, per passenger.
pub const DELAY_SCORE_PER_PASSENGER: i64 = 5;
pub const EVACUATION_SCORE_PER_PASSENGER: i64 = -15;
pub const TRAPPED_IN_TRACK_SCORE_PER_PASSENGER: i64 = -50;

// Flood propagation. A node starts leaking to its neighbors once it reaches
// PROPAGATION_THRESHOLD; each transfer moves at most PROPAGATION_FLOOD_INCREASE.
pub const PROPAGATION_FLOOD_INCREASE: f32 = 6.0;
pub const PROPAGATION_THRESHOLD: f32 = 20.0;
pub const ELEVATION_DIFFERENCE_FACTOR: f32 = 0.2;
pub const FLOOD_DIFFERENCE_FACTOR: f32 = 0.3;
pub const MAX_FLOOD_LEVEL: f32 = 100.0;

pub const TRAPPED_THRESHOLD: f32 = 50.0;
pub const FLOOD_WARNING_THRESHOLD: f32 = 40.0;

// Log-normal parameters for the per-round increase at failure points.
// BASE_MODE is the mode of the distribution; sigma is redrawn each round.
pub const FAILURE_POINT_COUNT: usize = 2;
pub const FLOOD_INCREASE_BASE_MODE: f32 = 5.0;
pub const FLOOD_INCREASE_SIGMA_MIN: f32 = 0.3;
pub const FLOOD_INCREASE_SIGMA_MAX: f32 = 0.7;

// Boarding/alighting ratio band drawn per train per round.
pub const GET_ON_AND_OFF_RATIO_MIN: f32 = 0.2;
pub const GET_ON_AND_OFF_RATIO_MAX: f32 = 0.4;

pub const MAX_RETAINED_LOGS: usize = 500;

pub fn default_setting() -> GameSetting {
    GameSetting {
        failure_point_count: FAILURE_POINT_COUNT,
        flood_increase_base_mode: FLOOD_INCREASE_BASE_MODE,
        flood_increase_sigma_min: FLOOD_INCREASE_SIGMA_MIN,
        flood_increase_sigma_max: FLOOD_INCREASE_SIGMA_MAX,
        get_on_and_off_ratio_min: GET_ON_AND_OFF_RATIO_MIN,
        get_on_and_off_ratio_max: GET_ON_AND_OFF_RATIO_MAX,
        trapped_threshold: TRAPPED_THRESHOLD,
        flood_warning_threshold: FLOOD_WARNING_THRESHOLD,
        default_decision_time: DEFAULT_DECISION_TIME,
        delay_score_per_passenger: DELAY_SCORE_PER_PASSENGER,
        evacuation_score_per_passenger: EVACUATION_SCORE_PER_PASSENGER,
        trapped_in_track_score_per_passenger: TRAPPED_IN_TRACK_SCORE_PER_PASSENGER,
        propagation_flood_increase: PROPAGATION_FLOOD_INCREASE,
        propagation_threshold: PROPAGATION_THRESHOLD,
        elevation_difference_factor: ELEVATION_DIFFERENCE_FACTOR,
        flood_difference_factor: FLOOD_DIFFERENCE_FACTOR,
    }
}
