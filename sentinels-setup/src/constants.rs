//! Search limits and request bounds for the setup generator.
//!
//! The point values themselves live in the dataset; these are the knobs the
//! engine and the request layer apply around it.

// Search ---------------------------------------------------------------------
pub const DEFAULT_MAX_TRIALS: u32 = 100_000;
pub const DEFAULT_MAX_BASE_RETRIES: u32 = 10_000;

// Request bounds -------------------------------------------------------------
pub const MIN_PLAYER_COUNT: usize = 3;
pub const MAX_PLAYER_COUNT: usize = 5;
pub const MIN_LOSS_PCT: i32 = 1;
pub const MAX_LOSS_PCT: i32 = 99;
pub const MAX_TOLERANCE: u32 = 100;

// Request defaults -----------------------------------------------------------
pub const DEFAULT_PLAYER_COUNT: usize = 3;
pub const DEFAULT_LOSS_PCT: i32 = 50;
pub const DEFAULT_TOLERANCE: u32 = 10;

// Stream derivation ----------------------------------------------------------
pub(crate) const SETUP_STREAM_TAG: &[u8] = b"sentinels-setup";
