//! Card catalog and per-request eligible pools.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::data::{CardEntry, SetupData};

/// Content packs a player can opt into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pack {
    BaseSet,
    MiniExpansion,
    RookCity,
    InfernalRelics,
    ShatteredTimelines,
    Vengeance,
    Promos,
}

impl Pack {
    pub const ALL: [Self; 7] = [
        Self::BaseSet,
        Self::MiniExpansion,
        Self::RookCity,
        Self::InfernalRelics,
        Self::ShatteredTimelines,
        Self::Vengeance,
        Self::Promos,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::BaseSet => "baseset",
            Self::MiniExpansion => "miniexpansion",
            Self::RookCity => "rookcity",
            Self::InfernalRelics => "infernalrelics",
            Self::ShatteredTimelines => "shatteredtimelines",
            Self::Vengeance => "vengeance",
            Self::Promos => "promos",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::BaseSet => "Base Set",
            Self::MiniExpansion => "Mini-Expansion",
            Self::RookCity => "Rook City",
            Self::InfernalRelics => "Infernal Relics",
            Self::ShatteredTimelines => "Shattered Timelines",
            Self::Vengeance => "Vengeance",
            Self::Promos => "Promos",
        }
    }

    /// Look up a pack by its key, ignoring ASCII case.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL
            .into_iter()
            .find(|pack| pack.key().eq_ignore_ascii_case(key))
    }

    /// The selection used when the caller names no packs: base set plus mini-expansion.
    #[must_use]
    pub fn default_selection() -> BTreeSet<Self> {
        BTreeSet::from([Self::BaseSet, Self::MiniExpansion])
    }
}

impl fmt::Display for Pack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Pack {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| CatalogError::UnknownPack(s.trim().to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    Hero,
    Villain,
    Environment,
}

impl CardKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Hero => "Heroes",
            Self::Villain => "Villains",
            Self::Environment => "Environments",
        }
    }
}

/// Advanced-mode rating recorded for a villain. Never part of the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvancedRating {
    pub points: i32,
    pub games: u32,
}

/// One hero, villain or environment with its difficulty contribution.
///
/// `base` groups a hero with its alternate versions; it defaults to the
/// record's own name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRecord {
    pub name: String,
    pub kind: CardKind,
    pub pack: Pack,
    pub points: i32,
    pub base: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advanced: Option<AdvancedRating>,
}

impl CharacterRecord {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: CardKind, pack: Pack, points: i32) -> Self {
        let name = name.into();
        Self {
            base: name.clone(),
            name,
            kind,
            pack,
            points,
            advanced: None,
        }
    }

    #[must_use]
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    #[must_use]
    pub const fn with_advanced(mut self, rating: AdvancedRating) -> Self {
        self.advanced = Some(rating);
        self
    }

    /// True for alternate versions of another card.
    #[must_use]
    pub fn is_variant(&self) -> bool {
        self.base != self.name
    }

    fn from_entry(entry: &CardEntry, kind: CardKind, pack: Pack) -> Self {
        let mut record = Self::new(entry.name.clone(), kind, pack, entry.points);
        if let Some(base) = entry.base.as_deref().filter(|b| !b.is_empty()) {
            record.base = base.to_string();
        }
        if let (Some(points), Some(games)) = (entry.advanced, entry.adv_count) {
            record.advanced = Some(AdvancedRating { points, games });
        }
        record
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("duplicate card name \"{0}\"")]
    DuplicateName(String),
    #[error("unknown pack \"{0}\"")]
    UnknownPack(String),
}

/// Every known card, split by kind and kept in dataset order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Catalog {
    heroes: Vec<CharacterRecord>,
    villains: Vec<CharacterRecord>,
    environments: Vec<CharacterRecord>,
}

impl Catalog {
    /// Build a catalog from loose records.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateName`] when two records share a name.
    pub fn from_records<I>(records: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = CharacterRecord>,
    {
        let mut seen = HashSet::new();
        let mut catalog = Self::default();
        for record in records {
            if !seen.insert(record.name.clone()) {
                return Err(CatalogError::DuplicateName(record.name));
            }
            match record.kind {
                CardKind::Hero => catalog.heroes.push(record),
                CardKind::Villain => catalog.villains.push(record),
                CardKind::Environment => catalog.environments.push(record),
            }
        }
        Ok(catalog)
    }

    /// Build the catalog from a parsed dataset, tagging each record with the
    /// pack that lists it. Unlisted records belong to the base set.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateName`] when two records share a name.
    pub fn from_data(data: &SetupData) -> Result<Self, CatalogError> {
        let mut pack_of: HashMap<&str, Pack> = HashMap::new();
        for (pack, names) in &data.packs {
            for name in names {
                if let Some(previous) = pack_of.insert(name.as_str(), *pack) {
                    log::warn!("{name} listed in both {previous} and {pack}; using {pack}");
                }
            }
        }

        let known: HashSet<&str> = data
            .heroes
            .iter()
            .chain(&data.villains)
            .chain(&data.environments)
            .map(|entry| entry.name.as_str())
            .collect();
        for name in pack_of.keys().filter(|name| !known.contains(*name)) {
            log::warn!("couldn't find card {name} while assigning packs");
        }

        let pack_for = |entry: &CardEntry| {
            pack_of
                .get(entry.name.as_str())
                .copied()
                .unwrap_or(Pack::BaseSet)
        };
        let records = data
            .heroes
            .iter()
            .map(|e| CharacterRecord::from_entry(e, CardKind::Hero, pack_for(e)))
            .chain(
                data.villains
                    .iter()
                    .map(|e| CharacterRecord::from_entry(e, CardKind::Villain, pack_for(e))),
            )
            .chain(
                data.environments
                    .iter()
                    .map(|e| CharacterRecord::from_entry(e, CardKind::Environment, pack_for(e))),
            );
        Self::from_records(records)
    }

    #[must_use]
    pub fn heroes(&self) -> &[CharacterRecord] {
        &self.heroes
    }

    #[must_use]
    pub fn villains(&self) -> &[CharacterRecord] {
        &self.villains
    }

    #[must_use]
    pub fn environments(&self) -> &[CharacterRecord] {
        &self.environments
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.heroes.len() + self.villains.len() + self.environments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CharacterRecord> {
        self.heroes
            .iter()
            .chain(&self.villains)
            .chain(&self.environments)
            .find(|record| record.name == name)
    }

    /// Every record whose pack is in `packs`, in catalog order.
    #[must_use]
    pub fn eligible(&self, packs: &BTreeSet<Pack>) -> EligiblePool<'_> {
        EligiblePool {
            heroes: select_packs(&self.heroes, packs),
            villains: select_packs(&self.villains, packs),
            environments: select_packs(&self.environments, packs),
        }
    }
}

fn select_packs<'a>(
    records: &'a [CharacterRecord],
    packs: &BTreeSet<Pack>,
) -> Vec<&'a CharacterRecord> {
    records
        .iter()
        .filter(|record| packs.contains(&record.pack))
        .collect()
}

/// The cards a single request may draw from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EligiblePool<'a> {
    pub heroes: Vec<&'a CharacterRecord>,
    pub villains: Vec<&'a CharacterRecord>,
    pub environments: Vec<&'a CharacterRecord>,
}

impl EligiblePool<'_> {
    /// Number of distinct base identities among the eligible heroes.
    #[must_use]
    pub fn distinct_bases(&self) -> usize {
        self.heroes
            .iter()
            .map(|hero| hero.base.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heroes.is_empty() && self.villains.is_empty() && self.environments.is_empty()
    }
}

impl fmt::Display for EligiblePool<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (kind, records) in [
            (CardKind::Hero, &self.heroes),
            (CardKind::Villain, &self.villains),
            (CardKind::Environment, &self.environments),
        ] {
            writeln!(f, "{}:", kind.label())?;
            for record in records {
                write!(f, "   {} [{:+}]", record.name, record.points)?;
                if let Some(advanced) = record.advanced {
                    write!(
                        f,
                        " (advanced {:+} over {} games)",
                        advanced.points, advanced.games
                    )?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
