//! Tunables shared by the stores, the reward engine and the frontend.

/// localStorage key holding the whole persisted blob.
pub const STORAGE_KEY: &str = "shellPackData";

/// Booster type assumed for timers saved before the type was recorded.
pub const DEFAULT_BOOSTER_KEY: &str = "humanoid";

/// Wait window (hours) over which `calculate_bonus` scales.
pub const MIN_WAIT_HOURS: f64 = 4.0;
pub const MAX_WAIT_HOURS: f64 = 24.0;

/// Output range of `calculate_bonus`.
pub const MIN_WAIT_BONUS: u32 = 1;
pub const MAX_WAIT_BONUS: u32 = 20;

/// Upper bound of the prorated (early-open) bonus scale.
pub const MAX_PRORATED_BONUS: f64 = 100.0;

/// Rarity roll is uniform in `1..=ROLL_MAX`.
pub const ROLL_MAX: u32 = 100;

/// Fraction of the bonus below which a roll lands in each tier.
pub const TOP_TIER_FACTOR: f64 = 0.25;
pub const MID_TIER_FACTOR: f64 = 0.75;

/// Inclusive stat bonus range per tier.
pub const TOP_TIER_BONUS: (u32, u32) = (15, 20);
pub const MID_TIER_BONUS: (u32, u32) = (5, 14);
pub const BASE_TIER_BONUS: (u32, u32) = (0, 4);

/// Frontend polling rate: the timer view refreshes once per second.
pub const TICK_INTERVAL_MS: f64 = 1000.0;

/// Hours slider bounds and starting value in the frontend.
pub const SLIDER_MIN_HOURS: u32 = 4;
pub const SLIDER_MAX_HOURS: u32 = 24;
pub const SLIDER_DEFAULT_HOURS: u32 = 4;

/// Upper bound used when drawing stat bars.
pub const MAX_STAT: u32 = 40;
