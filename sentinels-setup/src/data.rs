use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::sync::OnceLock;

use crate::DataLoader;
use crate::catalog::Pack;

const DEFAULT_SETUP_DATA: &str = include_str!("../assets/sentinels.json");

/// A hero, villain or environment as it appears in the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardEntry {
    pub name: String,
    pub points: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advanced: Option<i32>,
    #[serde(
        default,
        rename = "advcount",
        skip_serializing_if = "Option::is_none"
    )]
    pub adv_count: Option<u32>,
}

/// Difficulty offset applied once per setup for a given number of heroes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerCountEntry {
    pub players: usize,
    pub points: i32,
}

/// Expected loss percentage for a total difficulty score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleEntry {
    pub total: i32,
    pub loss_pct: i32,
}

/// Container for the whole card and difficulty dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SetupData {
    #[serde(default)]
    pub heroes: Vec<CardEntry>,
    #[serde(default)]
    pub villains: Vec<CardEntry>,
    #[serde(default)]
    pub environments: Vec<CardEntry>,
    #[serde(default)]
    pub player_counts: Vec<PlayerCountEntry>,
    #[serde(default)]
    pub scale: Vec<ScaleEntry>,
    /// Cards listed per pack; anything unlisted belongs to the base set.
    #[serde(default)]
    pub packs: BTreeMap<Pack, Vec<String>>,
}

impl SetupData {
    /// Create empty data (useful for tests)
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load setup data from a JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into valid setup data.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Parse the dataset bundled with the crate.
    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(DEFAULT_SETUP_DATA).unwrap_or_else(|err| {
            log::error!("bundled setup data is invalid: {err}");
            Self::empty()
        })
    }

    #[must_use]
    pub fn default_data() -> &'static Self {
        static DATA: OnceLock<SetupData> = OnceLock::new();
        DATA.get_or_init(Self::load_from_static)
    }
}

/// Loader backed by the dataset compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedDataLoader;

impl DataLoader for EmbeddedDataLoader {
    type Error = Infallible;

    fn load_setup_data(&self) -> Result<SetupData, Self::Error> {
        Ok(SetupData::default_data().clone())
    }
}
