//! Loss-percentage calibration and per-player-count offsets.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::data::SetupData;

/// One point of the difficulty scale: setups scoring `score` lose `loss_pct` percent of games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationBreakpoint {
    pub score: i32,
    pub loss_pct: i32,
}

/// Inclusive score range matching a loss percentage, before tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreBand {
    pub min: i32,
    pub max: i32,
}

impl ScoreBand {
    #[must_use]
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// True for the `(0, 0)` band returned when no breakpoint matches.
    #[must_use]
    pub const fn is_degenerate(self) -> bool {
        self.min == 0 && self.max == 0
    }

    /// Bounds after widening by `tolerance` on both sides.
    #[must_use]
    pub fn widened(self, tolerance: u32) -> (i64, i64) {
        let tolerance = i64::from(tolerance);
        (
            i64::from(self.min) - tolerance,
            i64::from(self.max) + tolerance,
        )
    }

    #[must_use]
    pub fn admits(self, score: i64, tolerance: u32) -> bool {
        let (low, high) = self.widened(tolerance);
        (low..=high).contains(&score)
    }
}

impl fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Difficulty scale ordered from the highest score down.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CalibrationTable {
    breakpoints: Vec<CalibrationBreakpoint>,
}

impl CalibrationTable {
    /// Build a table, ordering breakpoints by descending score. Ties keep input order.
    #[must_use]
    pub fn new<I>(breakpoints: I) -> Self
    where
        I: IntoIterator<Item = CalibrationBreakpoint>,
    {
        let mut breakpoints: Vec<_> = breakpoints.into_iter().collect();
        breakpoints.sort_by(|a, b| b.score.cmp(&a.score));
        Self { breakpoints }
    }

    #[must_use]
    pub fn from_data(data: &SetupData) -> Self {
        Self::new(data.scale.iter().map(|entry| CalibrationBreakpoint {
            score: entry.total,
            loss_pct: entry.loss_pct,
        }))
    }

    #[must_use]
    pub fn breakpoints(&self) -> &[CalibrationBreakpoint] {
        &self.breakpoints
    }

    /// Score band for an exact loss percentage.
    ///
    /// Scans from the top of the scale and stops at the first breakpoint below
    /// the target. The band spans the run of breakpoints whose loss percentage
    /// equals the target; when the scale has no such breakpoint the band is
    /// `(0, 0)`. Nearby percentages are never interpolated.
    #[must_use]
    pub fn band_for(&self, target_loss_pct: i32) -> ScoreBand {
        let mut band: Option<ScoreBand> = None;
        for bp in &self.breakpoints {
            if bp.loss_pct < target_loss_pct {
                break;
            }
            if bp.loss_pct <= target_loss_pct {
                band = Some(match band {
                    None => ScoreBand::new(bp.score, bp.score),
                    Some(found) => ScoreBand::new(bp.score, found.max),
                });
            }
        }
        band.unwrap_or_default()
    }
}

/// Base difficulty for each supported number of heroes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerCountOffsets {
    offsets: BTreeMap<usize, i32>,
}

impl PlayerCountOffsets {
    #[must_use]
    pub fn new<I>(offsets: I) -> Self
    where
        I: IntoIterator<Item = (usize, i32)>,
    {
        Self {
            offsets: offsets.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn from_data(data: &SetupData) -> Self {
        Self::new(
            data.player_counts
                .iter()
                .map(|entry| (entry.players, entry.points)),
        )
    }

    #[must_use]
    pub fn offset_for(&self, player_count: usize) -> Option<i32> {
        self.offsets.get(&player_count).copied()
    }

    pub fn player_counts(&self) -> impl Iterator<Item = usize> + '_ {
        self.offsets.keys().copied()
    }
}
