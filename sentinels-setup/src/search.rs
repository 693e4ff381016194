//! Bounded rejection sampling for a setup inside the target score band.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calibration::{CalibrationTable, ScoreBand};
use crate::catalog::EligiblePool;
use crate::constants::{DEFAULT_MAX_BASE_RETRIES, DEFAULT_MAX_TRIALS};
use crate::sampler::{Candidate, UniformSource, check_pool, draw};

/// Why a search produced no setup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SetupError {
    #[error("too many players for the selected heroes ({requested} requested, {available} eligible)")]
    TooManyPlayers { requested: usize, available: usize },
    #[error(
        "the selected heroes cover only {available} distinct characters ({requested} players requested)"
    )]
    TooFewBaseIdentities { requested: usize, available: usize },
    #[error("no villains in the selected card sets")]
    NoVillains,
    #[error("no environments in the selected card sets")]
    NoEnvironments,
    #[error("no difficulty offset for {0} players")]
    UnsupportedPlayerCount(usize),
    #[error("gave up after {retries} hero redraws with duplicate characters")]
    BaseRetriesExhausted { retries: u32 },
    #[error("couldn't find a setup with these parameters in {trials} iterations")]
    SearchExhausted { trials: u32 },
}

impl SetupError {
    /// Structural errors cannot succeed without different inputs.
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        !matches!(self, Self::SearchExhausted { .. })
    }

    /// Trials consumed before the error; zero for structural errors.
    #[must_use]
    pub const fn trials(&self) -> u32 {
        match self {
            Self::SearchExhausted { trials } => *trials,
            _ => 0,
        }
    }
}

/// Errors raised when search limits are unusable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SearchConfigError {
    #[error("{field} must be at least 1")]
    ZeroLimit { field: &'static str },
}

/// Work limits for one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "SearchConfig::default_max_trials")]
    pub max_trials: u32,
    /// Redraws allowed per trial when heroes share a base.
    #[serde(default = "SearchConfig::default_max_base_retries")]
    pub max_base_retries: u32,
}

impl SearchConfig {
    const fn default_max_trials() -> u32 {
        DEFAULT_MAX_TRIALS
    }

    const fn default_max_base_retries() -> u32 {
        DEFAULT_MAX_BASE_RETRIES
    }

    #[must_use]
    pub const fn with_max_trials(mut self, max_trials: u32) -> Self {
        self.max_trials = max_trials;
        self
    }

    /// # Errors
    ///
    /// Returns an error when the trial cap is zero.
    pub const fn validate(&self) -> Result<(), SearchConfigError> {
        if self.max_trials == 0 {
            return Err(SearchConfigError::ZeroLimit {
                field: "max_trials",
            });
        }
        Ok(())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_trials: Self::default_max_trials(),
            max_base_retries: Self::default_max_base_retries(),
        }
    }
}

/// Resolved inputs for one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchParams {
    pub player_count: usize,
    pub player_offset: i32,
    pub loss_pct: i32,
    pub tolerance: u32,
}

/// An accepted setup, the 1-based trial that produced it, and the band it met.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchOutcome<'a> {
    pub setup: Candidate<'a>,
    pub trials: u32,
    pub band: ScoreBand,
}

/// Draw setups until one scores inside the tolerance-widened band for
/// `params.loss_pct`, or `config.max_trials` draws have been rejected.
///
/// Structural problems with the pool are reported before the first trial.
///
/// # Errors
///
/// Returns a structural [`SetupError`] when no setup can be drawn, or
/// [`SetupError::SearchExhausted`] when every trial was rejected.
pub fn find_setup<'a, S>(
    pool: &EligiblePool<'a>,
    table: &CalibrationTable,
    params: SearchParams,
    config: &SearchConfig,
    source: &mut S,
) -> Result<SearchOutcome<'a>, SetupError>
where
    S: UniformSource + ?Sized,
{
    check_pool(pool, params.player_count)?;
    let bases = pool.distinct_bases();
    if params.player_count > bases {
        return Err(SetupError::TooFewBaseIdentities {
            requested: params.player_count,
            available: bases,
        });
    }

    let band = table.band_for(params.loss_pct);
    let (low, high) = band.widened(params.tolerance);
    log::debug!(
        "loss {}% maps to band {band}; accepting scores {low}..={high}",
        params.loss_pct
    );

    for trial in 1..=config.max_trials {
        let setup = draw(
            pool,
            params.player_count,
            params.player_offset,
            config.max_base_retries,
            source,
        )?;
        if band.admits(setup.score, params.tolerance) {
            return Ok(SearchOutcome {
                setup,
                trials: trial,
                band,
            });
        }
    }

    log::warn!(
        "no setup scored within {low}..={high} after {} trials",
        config.max_trials
    );
    Err(SetupError::SearchExhausted {
        trials: config.max_trials,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::CalibrationBreakpoint;
    use crate::catalog::{CardKind, Catalog, CharacterRecord, Pack};
    use crate::sampler::tests::{ScriptedSource, variant_catalog};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::collections::BTreeSet;

    fn scale() -> CalibrationTable {
        CalibrationTable::new(
            [(40, 60), (20, 50), (15, 50), (0, 40), (-5, 30)]
                .into_iter()
                .map(|(score, loss_pct)| CalibrationBreakpoint { score, loss_pct }),
        )
    }

    fn params(loss_pct: i32, tolerance: u32) -> SearchParams {
        SearchParams {
            player_count: 2,
            player_offset: 0,
            loss_pct,
            tolerance,
        }
    }

    fn base_pool(catalog: &Catalog) -> EligiblePool<'_> {
        catalog.eligible(&BTreeSet::from([Pack::BaseSet]))
    }

    #[test]
    fn first_accepted_trial_is_reported() {
        let catalog = variant_catalog();
        let pool = base_pool(&catalog);
        // Trial 1: {B, C} scores 15 (rejected for band [20, 20]).
        // Trial 2: {A, B} scores 20 (accepted).
        let mut source = ScriptedSource::new(&[1, 1, 0, 0, 0, 0, 0, 0]);
        let table = CalibrationTable::new([CalibrationBreakpoint {
            score: 20,
            loss_pct: 55,
        }]);
        let outcome = find_setup(
            &pool,
            &table,
            params(55, 0),
            &SearchConfig::default(),
            &mut source,
        )
        .unwrap();
        assert_eq!(outcome.trials, 2);
        assert_eq!(outcome.setup.score, 20);
        assert_eq!(outcome.band, ScoreBand::new(20, 20));
    }

    #[test]
    fn tolerance_admits_both_pairs() {
        let catalog = variant_catalog();
        let pool = base_pool(&catalog);
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..50 {
            let outcome = find_setup(
                &pool,
                &scale(),
                params(50, 0),
                &SearchConfig::default(),
                &mut rng,
            )
            .unwrap();
            assert!(matches!(outcome.setup.score, 15 | 20));
            assert!(outcome.trials >= 1);
        }
    }

    #[test]
    fn unmatched_percentage_exhausts_the_cap() {
        let catalog = variant_catalog();
        let pool = base_pool(&catalog);
        let mut source = ScriptedSource::new(&[]);
        let config = SearchConfig::default().with_max_trials(25);
        let err = find_setup(&pool, &scale(), params(45, 5), &config, &mut source).unwrap_err();
        assert_eq!(err, SetupError::SearchExhausted { trials: 25 });
        assert_eq!(err.trials(), 25);
        assert!(!err.is_structural());
        // Each trial: two hero picks, one villain, one environment.
        assert_eq!(source.calls, 25 * 4);
    }

    #[test]
    fn zero_band_accepts_scores_near_zero() {
        let catalog = Catalog::from_records([
            CharacterRecord::new("A", CardKind::Hero, Pack::BaseSet, 3),
            CharacterRecord::new("B", CardKind::Hero, Pack::BaseSet, -5),
            CharacterRecord::new("X", CardKind::Villain, Pack::BaseSet, 0),
            CharacterRecord::new("E", CardKind::Environment, Pack::BaseSet, 0),
        ])
        .unwrap();
        let pool = base_pool(&catalog);
        let mut rng = SmallRng::seed_from_u64(3);
        let outcome =
            find_setup(&pool, &scale(), params(45, 2), &SearchConfig::default(), &mut rng)
                .unwrap();
        assert_eq!(outcome.band, ScoreBand::default());
        assert_eq!(outcome.setup.score, -2);
        assert_eq!(outcome.trials, 1);
    }

    #[test]
    fn structural_errors_consume_no_trials() {
        let catalog = variant_catalog();
        let pool = base_pool(&catalog);
        let mut source = ScriptedSource::new(&[]);
        let too_many = SearchParams {
            player_count: 4,
            ..params(50, 10)
        };
        let err = find_setup(
            &pool,
            &scale(),
            too_many,
            &SearchConfig::default(),
            &mut source,
        )
        .unwrap_err();
        assert!(err.is_structural());
        assert_eq!(err.trials(), 0);
        assert_eq!(source.calls, 0);

        let three = SearchParams {
            player_count: 3,
            ..params(50, 10)
        };
        let err = find_setup(&pool, &scale(), three, &SearchConfig::default(), &mut source)
            .unwrap_err();
        assert_eq!(
            err,
            SetupError::TooFewBaseIdentities {
                requested: 3,
                available: 2
            }
        );
        assert_eq!(source.calls, 0);
    }

    #[test]
    fn config_defaults_and_validation() {
        let config: SearchConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SearchConfig::default());
        assert_eq!(config.max_trials, 100_000);
        assert!(config.validate().is_ok());

        let zero = SearchConfig::default().with_max_trials(0);
        assert_eq!(
            zero.validate(),
            Err(SearchConfigError::ZeroLimit {
                field: "max_trials"
            })
        );
    }
}
