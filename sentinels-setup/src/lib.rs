//! Sentinels Setup Engine
//!
//! Picks a random team of heroes, a villain and an environment whose combined
//! difficulty score lands on a target expected-loss percentage.
//! This crate holds the catalog, the calibration scale and the search; data
//! sources and presentation belong to the caller.

pub mod calibration;
pub mod catalog;
pub mod constants;
pub mod data;
pub mod request;
pub mod rng;
pub mod sampler;
pub mod search;

use std::collections::BTreeSet;

// Re-export commonly used types
pub use calibration::{CalibrationBreakpoint, CalibrationTable, PlayerCountOffsets, ScoreBand};
pub use catalog::{
    AdvancedRating, CardKind, Catalog, CatalogError, CharacterRecord, EligiblePool, Pack,
};
pub use data::{CardEntry, EmbeddedDataLoader, PlayerCountEntry, ScaleEntry, SetupData};
pub use request::{RequestError, SetupRequest};
pub use rng::{derive_stream_seed, setup_rng};
pub use sampler::{Candidate, UniformSource, draw, pick_distinct};
pub use search::{
    SearchConfig, SearchConfigError, SearchOutcome, SearchParams, SetupError, find_setup,
};

/// Trait for abstracting data loading operations
/// Platform-specific implementations should provide this
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the card and difficulty dataset
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset cannot be loaded or parsed.
    fn load_setup_data(&self) -> Result<SetupData, Self::Error>;
}

/// Immutable engine holding everything a search reads.
///
/// Built once and shared; searches never mutate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupEngine {
    catalog: Catalog,
    calibration: CalibrationTable,
    offsets: PlayerCountOffsets,
    config: SearchConfig,
}

impl SetupEngine {
    /// Build an engine from a parsed dataset with default search limits.
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset contains duplicate card names.
    pub fn new(data: &SetupData) -> Result<Self, CatalogError> {
        Ok(Self::from_parts(
            Catalog::from_data(data)?,
            CalibrationTable::from_data(data),
            PlayerCountOffsets::from_data(data),
        ))
    }

    #[must_use]
    pub fn from_parts(
        catalog: Catalog,
        calibration: CalibrationTable,
        offsets: PlayerCountOffsets,
    ) -> Self {
        Self {
            catalog,
            calibration,
            offsets,
            config: SearchConfig::default(),
        }
    }

    /// Build an engine from whatever the loader supplies.
    ///
    /// # Errors
    ///
    /// Returns an error if the data cannot be loaded or is inconsistent.
    pub fn from_loader<L>(loader: &L) -> Result<Self, anyhow::Error>
    where
        L: DataLoader,
        L::Error: Into<anyhow::Error>,
    {
        let data = loader.load_setup_data().map_err(Into::into)?;
        Ok(Self::new(&data)?)
    }

    /// Engine over the bundled dataset.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled dataset contains duplicate card names.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::new(SetupData::default_data())
    }

    /// Replace the search limits.
    ///
    /// # Errors
    ///
    /// Returns an error when the limits are unusable.
    pub fn with_config(mut self, config: SearchConfig) -> Result<Self, SearchConfigError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn calibration(&self) -> &CalibrationTable {
        &self.calibration
    }

    #[must_use]
    pub const fn offsets(&self) -> &PlayerCountOffsets {
        &self.offsets
    }

    #[must_use]
    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }

    #[must_use]
    pub fn band_for(&self, loss_pct: i32) -> ScoreBand {
        self.calibration.band_for(loss_pct)
    }

    #[must_use]
    pub fn eligible(&self, packs: &BTreeSet<Pack>) -> EligiblePool<'_> {
        self.catalog.eligible(packs)
    }

    /// Search for a setup matching `request`, drawing from `source`.
    ///
    /// The request is not range-checked here; see [`SetupRequest::validate`].
    ///
    /// # Errors
    ///
    /// Returns a structural [`SetupError`] when the request can never be met
    /// with the selected packs, or [`SetupError::SearchExhausted`] when the
    /// trial cap is reached.
    pub fn find_setup<S>(
        &self,
        request: &SetupRequest,
        source: &mut S,
    ) -> Result<SearchOutcome<'_>, SetupError>
    where
        S: UniformSource + ?Sized,
    {
        log::info!(
            "pc: {}, lp: {}, rg: {}, packs: {:?}",
            request.player_count,
            request.loss_pct,
            request.tolerance,
            request.packs.iter().map(|p| p.key()).collect::<Vec<_>>()
        );
        let offset = self
            .offsets
            .offset_for(request.player_count)
            .ok_or(SetupError::UnsupportedPlayerCount(request.player_count))?;
        let pool = self.catalog.eligible(&request.packs);
        let outcome = find_setup(
            &pool,
            &self.calibration,
            request.params(offset),
            &self.config,
            source,
        )?;
        log::info!("iterations: {}, setup: {}", outcome.trials, outcome.setup);
        Ok(outcome)
    }

    /// Reproducible search on the `index`-th stream derived from `seed`.
    ///
    /// # Errors
    ///
    /// Same as [`SetupEngine::find_setup`].
    pub fn find_setup_seeded(
        &self,
        request: &SetupRequest,
        seed: u64,
        index: u64,
    ) -> Result<SearchOutcome<'_>, SetupError> {
        let mut rng = setup_rng(seed, index);
        self.find_setup(request, &mut rng)
    }
}
