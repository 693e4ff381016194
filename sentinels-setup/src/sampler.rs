//! Random draw of a single hero/villain/environment setup.
use rand::Rng;
use serde::Serialize;
use smallvec::SmallVec;
use std::collections::HashSet;
use std::fmt;

use crate::catalog::{CharacterRecord, EligiblePool};
use crate::constants::MAX_PLAYER_COUNT;
use crate::search::SetupError;

/// Source of uniformly distributed indices.
///
/// Implemented for every [`rand::Rng`]; tests can script exact sequences.
pub trait UniformSource {
    /// Uniform index in `0..bound`. `bound` is always non-zero.
    fn index_below(&mut self, bound: usize) -> usize;
}

impl<R: Rng + ?Sized> UniformSource for R {
    fn index_below(&mut self, bound: usize) -> usize {
        self.gen_range(0..bound)
    }
}

/// A drawn setup and its difficulty score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate<'a> {
    pub heroes: SmallVec<[&'a CharacterRecord; MAX_PLAYER_COUNT]>,
    pub villain: &'a CharacterRecord,
    pub environment: &'a CharacterRecord,
    /// Base difficulty for the number of heroes.
    pub player_offset: i32,
    /// Summed in `i64` so extreme datasets cannot overflow.
    pub score: i64,
}

impl Candidate<'_> {
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.heroes.len()
    }

    #[must_use]
    pub fn hero_points(&self) -> i64 {
        self.heroes.iter().map(|hero| i64::from(hero.points)).sum()
    }

    /// Offset plus every chosen card's points.
    #[must_use]
    pub fn additive_score(&self) -> i64 {
        i64::from(self.player_offset)
            + self.hero_points()
            + i64::from(self.villain.points)
            + i64::from(self.environment.points)
    }
}

impl fmt::Display for Candidate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, hero) in self.heroes.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}[{}]", hero.name, hero.points)?;
        }
        write!(
            f,
            "; {}[{}]; {}[{}]; {} heroes[{}]; difficulty={}",
            self.villain.name,
            self.villain.points,
            self.environment.name,
            self.environment.points,
            self.heroes.len(),
            self.player_offset,
            self.score
        )
    }
}

/// Pick `count` distinct indices from `0..n`, every subset equally likely.
///
/// Partial Fisher-Yates over a fresh identity permutation; the result is the
/// shuffled prefix. `count` is clamped to `n`.
pub fn pick_distinct<S>(n: usize, count: usize, source: &mut S) -> Vec<usize>
where
    S: UniformSource + ?Sized,
{
    let take = count.min(n);
    let mut indices: Vec<usize> = (0..n).collect();
    for i in 0..take {
        let j = i + source.index_below(n - i);
        indices.swap(i, j);
    }
    indices.truncate(take);
    indices
}

/// Reject pools that can never produce a setup for `player_count` heroes.
///
/// # Errors
///
/// Returns a structural [`SetupError`] naming the missing piece.
pub fn check_pool(pool: &EligiblePool<'_>, player_count: usize) -> Result<(), SetupError> {
    if player_count > pool.heroes.len() {
        return Err(SetupError::TooManyPlayers {
            requested: player_count,
            available: pool.heroes.len(),
        });
    }
    if pool.villains.is_empty() {
        return Err(SetupError::NoVillains);
    }
    if pool.environments.is_empty() {
        return Err(SetupError::NoEnvironments);
    }
    Ok(())
}

/// Draw one setup from `pool` and score it.
///
/// Hero draws containing two versions of the same base are discarded and
/// redrawn, at most `max_base_retries` times.
///
/// # Errors
///
/// Returns a structural [`SetupError`] when the pool cannot supply the setup
/// or every redraw collided.
pub fn draw<'a, S>(
    pool: &EligiblePool<'a>,
    player_count: usize,
    player_offset: i32,
    max_base_retries: u32,
    source: &mut S,
) -> Result<Candidate<'a>, SetupError>
where
    S: UniformSource + ?Sized,
{
    check_pool(pool, player_count)?;
    let heroes = draw_heroes(pool, player_count, max_base_retries, source)?;
    let villain = pool.villains[source.index_below(pool.villains.len())];
    let environment = pool.environments[source.index_below(pool.environments.len())];

    let mut candidate = Candidate {
        heroes,
        villain,
        environment,
        player_offset,
        score: 0,
    };
    candidate.score = candidate.additive_score();
    Ok(candidate)
}

fn draw_heroes<'a, S>(
    pool: &EligiblePool<'a>,
    player_count: usize,
    max_base_retries: u32,
    source: &mut S,
) -> Result<SmallVec<[&'a CharacterRecord; MAX_PLAYER_COUNT]>, SetupError>
where
    S: UniformSource + ?Sized,
{
    let mut collisions = 0_u32;
    loop {
        let heroes: SmallVec<[&CharacterRecord; MAX_PLAYER_COUNT]> =
            pick_distinct(pool.heroes.len(), player_count, source)
                .into_iter()
                .map(|idx| pool.heroes[idx])
                .collect();
        let mut bases = HashSet::with_capacity(heroes.len());
        if heroes.iter().all(|hero| bases.insert(hero.base.as_str())) {
            return Ok(heroes);
        }
        if collisions >= max_base_retries {
            return Err(SetupError::BaseRetriesExhausted {
                retries: max_base_retries,
            });
        }
        collisions += 1;
    }
}
