//! Reference catalogs: character classes, monsters, events, equipment.
//!
//! Catalogs are immutable lookup tables resolved once at startup. Unknown
//! or duplicate ids are rejected here, at load time, so the rest of the
//! engine can treat catalog references as trusted.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const DEFAULT_CATALOG: &str = include_str!("../assets/data/catalog.json");

/// Monster strength category, weakest to strongest. The declaration order
/// is the canonical deck order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Gray,
    Green,
    Blue,
    Gold,
}

impl Tier {
    pub const ALL: [Self; 4] = [Self::Gray, Self::Green, Self::Blue, Self::Gold];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gray => "gray",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Gold => "gold",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Day/night tag shared by event cards and the derived time-of-day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    #[default]
    Day,
    Night,
}

impl EventKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Night => "night",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A monster's printed hit-point spec.
///
/// Spelled `"10"` (flat), `"3x"` (per player at the table), or
/// `"special"` (display-only, no combat value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HpSpec {
    Flat(u32),
    PerPlayer(u32),
    Special,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed hp spec `{0}`")]
pub struct HpSpecError(String);

impl FromStr for HpSpec {
    type Err = HpSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("special") {
            return Ok(Self::Special);
        }
        if let Some(head) = trimmed
            .strip_suffix('x')
            .or_else(|| trimmed.strip_suffix('X'))
        {
            return head
                .trim()
                .parse()
                .map(Self::PerPlayer)
                .map_err(|_| HpSpecError(s.to_string()));
        }
        trimmed
            .parse()
            .map(Self::Flat)
            .map_err(|_| HpSpecError(s.to_string()))
    }
}

impl TryFrom<String> for HpSpec {
    type Error = HpSpecError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HpSpec> for String {
    fn from(value: HpSpec) -> Self {
        value.to_string()
    }
}

impl fmt::Display for HpSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flat(n) => write!(f, "{n}"),
            Self::PerPlayer(k) => write!(f, "{k}x"),
            Self::Special => f.write_str("special"),
        }
    }
}

/// A playable character class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterClass {
    pub id: String,
    pub name: String,
    pub max_mana: u32,
}

/// A monster in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monster {
    pub id: String,
    pub name: String,
    pub tier: Tier,
    pub hp: HpSpec,
}

/// A day or night event template, expanded `copies` times into the deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSpec {
    pub id: String,
    pub name: String,
    pub kind: EventKind,
    #[serde(default = "default_copies")]
    pub copies: u32,
    /// No combat happens on this day; the active monster is skipped.
    #[serde(default)]
    pub dungeon_closed: bool,
    /// Doubles the active monster's effective hit points.
    #[serde(default)]
    pub legendary: bool,
}

fn default_copies() -> u32 {
    1
}

/// An equipment catalog entry. Players hold references only; shop
/// mechanics live with the collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: String,
    pub name: String,
    pub price: i64,
}

/// Raw catalog payload as shipped in JSON assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CatalogSet {
    #[serde(default)]
    pub classes: Vec<CharacterClass>,
    #[serde(default)]
    pub monsters: Vec<Monster>,
    #[serde(default)]
    pub events: Vec<EventSpec>,
    #[serde(default)]
    pub equipment: Vec<Equipment>,
}

/// Errors raised while resolving or querying catalogs.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("duplicate {kind} id `{id}` in catalog")]
    DuplicateId { kind: &'static str, id: String },
    #[error("unknown {kind} id `{id}`")]
    UnknownId { kind: &'static str, id: String },
    #[error("catalog parse failure: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Resolved catalogs with typed id lookup, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct CatalogData {
    set: CatalogSet,
    class_idx: HashMap<String, usize>,
    monster_idx: HashMap<String, usize>,
    event_idx: HashMap<String, usize>,
    equipment_idx: HashMap<String, usize>,
}

fn build_index<T>(
    kind: &'static str,
    items: &[T],
    id_of: impl Fn(&T) -> &str,
) -> Result<HashMap<String, usize>, CatalogError> {
    let mut index = HashMap::with_capacity(items.len());
    for (pos, item) in items.iter().enumerate() {
        let id = id_of(item);
        if index.insert(id.to_string(), pos).is_some() {
            return Err(CatalogError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(index)
}

impl CatalogData {
    /// Resolve a raw catalog set into typed lookup tables.
    ///
    /// # Errors
    ///
    /// Returns an error when any id appears more than once within its
    /// catalog.
    pub fn resolve(set: CatalogSet) -> Result<Self, CatalogError> {
        let class_idx = build_index("class", &set.classes, |c| &c.id)?;
        let monster_idx = build_index("monster", &set.monsters, |m| &m.id)?;
        let event_idx = build_index("event", &set.events, |e| &e.id)?;
        let equipment_idx = build_index("equipment", &set.equipment, |e| &e.id)?;
        Ok(Self {
            set,
            class_idx,
            monster_idx,
            event_idx,
            equipment_idx,
        })
    }

    /// Load catalogs from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or contains
    /// duplicate ids.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Self::resolve(serde_json::from_str(json)?)
    }

    /// Create empty catalogs (useful for tests).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the bundled base-game catalog. Falls back to empty catalogs
    /// if the bundled asset is unreadable.
    #[must_use]
    pub fn load_default() -> Self {
        Self::from_json(DEFAULT_CATALOG).unwrap_or_else(|_| Self::empty())
    }

    #[must_use]
    pub fn class(&self, id: &str) -> Option<&CharacterClass> {
        self.class_idx.get(id).map(|&pos| &self.set.classes[pos])
    }

    #[must_use]
    pub fn monster(&self, id: &str) -> Option<&Monster> {
        self.monster_idx.get(id).map(|&pos| &self.set.monsters[pos])
    }

    #[must_use]
    pub fn event(&self, id: &str) -> Option<&EventSpec> {
        self.event_idx.get(id).map(|&pos| &self.set.events[pos])
    }

    #[must_use]
    pub fn equipment(&self, id: &str) -> Option<&Equipment> {
        self.equipment_idx
            .get(id)
            .map(|&pos| &self.set.equipment[pos])
    }

    /// # Errors
    ///
    /// Returns `CatalogError::UnknownId` when the class is not cataloged.
    pub fn require_class(&self, id: &str) -> Result<&CharacterClass, CatalogError> {
        self.class(id).ok_or_else(|| CatalogError::UnknownId {
            kind: "class",
            id: id.to_string(),
        })
    }

    /// # Errors
    ///
    /// Returns `CatalogError::UnknownId` when the monster is not cataloged.
    pub fn require_monster(&self, id: &str) -> Result<&Monster, CatalogError> {
        self.monster(id).ok_or_else(|| CatalogError::UnknownId {
            kind: "monster",
            id: id.to_string(),
        })
    }

    /// # Errors
    ///
    /// Returns `CatalogError::UnknownId` when the event is not cataloged.
    pub fn require_event(&self, id: &str) -> Result<&EventSpec, CatalogError> {
        self.event(id).ok_or_else(|| CatalogError::UnknownId {
            kind: "event",
            id: id.to_string(),
        })
    }

    #[must_use]
    pub fn classes(&self) -> &[CharacterClass] {
        &self.set.classes
    }

    #[must_use]
    pub fn monsters(&self) -> &[Monster] {
        &self.set.monsters
    }

    #[must_use]
    pub fn events(&self) -> &[EventSpec] {
        &self.set.events
    }

    #[must_use]
    pub fn equipment_list(&self) -> &[Equipment] {
        &self.set.equipment
    }

    pub fn monsters_of_tier(&self, tier: Tier) -> impl Iterator<Item = &Monster> {
        self.set.monsters.iter().filter(move |m| m.tier == tier)
    }
}
