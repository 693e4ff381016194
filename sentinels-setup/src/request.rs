use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::catalog::Pack;
use crate::constants::{
    DEFAULT_LOSS_PCT, DEFAULT_PLAYER_COUNT, DEFAULT_TOLERANCE, MAX_LOSS_PCT, MAX_PLAYER_COUNT,
    MAX_TOLERANCE, MIN_LOSS_PCT, MIN_PLAYER_COUNT,
};
use crate::search::SearchParams;

/// Errors raised when a setup request is outside the supported ranges.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("player count must be between {min} and {max} (got {value})")]
    PlayerCount { min: usize, max: usize, value: usize },
    #[error("loss percentage must be between {min} and {max} (got {value})")]
    LossPct { min: i32, max: i32, value: i32 },
    #[error("range must be between 0 and {max} (got {value})")]
    Tolerance { max: u32, value: u32 },
    #[error("no card set selected")]
    NoPacks,
}

/// What the caller asked for: team size, target loss percentage, allowed
/// variance and the packs to draw from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupRequest {
    #[serde(default = "SetupRequest::default_player_count")]
    pub player_count: usize,
    #[serde(default = "SetupRequest::default_loss_pct")]
    pub loss_pct: i32,
    #[serde(default = "SetupRequest::default_tolerance")]
    pub tolerance: u32,
    #[serde(default = "Pack::default_selection")]
    pub packs: BTreeSet<Pack>,
}

impl SetupRequest {
    const fn default_player_count() -> usize {
        DEFAULT_PLAYER_COUNT
    }

    const fn default_loss_pct() -> i32 {
        DEFAULT_LOSS_PCT
    }

    const fn default_tolerance() -> u32 {
        DEFAULT_TOLERANCE
    }

    #[must_use]
    pub fn new<I>(player_count: usize, loss_pct: i32, tolerance: u32, packs: I) -> Self
    where
        I: IntoIterator<Item = Pack>,
    {
        Self {
            player_count,
            loss_pct,
            tolerance,
            packs: packs.into_iter().collect(),
        }
    }

    /// Check the request against the ranges the game supports.
    ///
    /// # Errors
    ///
    /// Returns the first [`RequestError`] found.
    pub fn validate(&self) -> Result<(), RequestError> {
        if !(MIN_PLAYER_COUNT..=MAX_PLAYER_COUNT).contains(&self.player_count) {
            return Err(RequestError::PlayerCount {
                min: MIN_PLAYER_COUNT,
                max: MAX_PLAYER_COUNT,
                value: self.player_count,
            });
        }
        if !(MIN_LOSS_PCT..=MAX_LOSS_PCT).contains(&self.loss_pct) {
            return Err(RequestError::LossPct {
                min: MIN_LOSS_PCT,
                max: MAX_LOSS_PCT,
                value: self.loss_pct,
            });
        }
        if self.tolerance > MAX_TOLERANCE {
            return Err(RequestError::Tolerance {
                max: MAX_TOLERANCE,
                value: self.tolerance,
            });
        }
        if self.packs.is_empty() {
            return Err(RequestError::NoPacks);
        }
        Ok(())
    }

    #[must_use]
    pub const fn params(&self, player_offset: i32) -> SearchParams {
        SearchParams {
            player_count: self.player_count,
            player_offset,
            loss_pct: self.loss_pct,
            tolerance: self.tolerance,
        }
    }
}

impl Default for SetupRequest {
    fn default() -> Self {
        Self {
            player_count: Self::default_player_count(),
            loss_pct: Self::default_loss_pct(),
            tolerance: Self::default_tolerance(),
            packs: Pack::default_selection(),
        }
    }
}
