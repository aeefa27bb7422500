//! Players and the pre-game roster.

use crate::data::{CatalogData, CharacterClass};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

/// Positional player id. Re-numbered whenever the pre-game roster is
/// compacted; stable for the whole session once play starts.
pub type PlayerId = u32;

/// Errors raised by roster edits and player lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("character class `{class_id}` is already taken")]
    DuplicateClass { class_id: String },
    #[error("unknown character class `{class_id}`")]
    UnknownClass { class_id: String },
    #[error("no player with id {id}")]
    UnknownPlayer { id: PlayerId },
}

/// One seat at the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub class_id: String,
    #[serde(default)]
    pub gold: i64,
    #[serde(default)]
    pub mana: u32,
    #[serde(default)]
    pub max_mana: u32,
    #[serde(default)]
    pub equipment: SmallVec<[String; 4]>,
}

impl Player {
    #[must_use]
    pub fn new(id: PlayerId, name: impl Into<String>, class_id: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            class_id: class_id.into(),
            gold: 0,
            mana: 0,
            max_mana: 0,
            equipment: SmallVec::new(),
        }
    }

    /// Initialize session-start resources from the character class.
    pub fn init_for_start(&mut self, class: &CharacterClass) {
        self.max_mana = class.max_mana.max(1);
        self.mana = self.max_mana;
    }

    /// Adjust gold, flooring at zero. Returns the new balance.
    pub fn adjust_gold(&mut self, delta: i64) -> i64 {
        self.gold = (self.gold + delta).max(0);
        self.gold
    }

    /// Adjust current mana, clamped to `0..=max_mana`. Returns the new value.
    pub fn adjust_mana(&mut self, delta: i32) -> u32 {
        let next = i64::from(self.mana) + i64::from(delta);
        self.mana = u32::try_from(next.clamp(0, i64::from(self.max_mana))).unwrap_or(0);
        self.mana
    }

    /// Tier-completion reward: +1 max mana, +1 current mana capped at the
    /// new maximum.
    pub fn grant_tier_bonus(&mut self) {
        self.max_mana += 1;
        self.mana = (self.mana + 1).min(self.max_mana);
    }

    #[must_use]
    pub fn has_equipment(&self, equipment_id: &str) -> bool {
        self.equipment.iter().any(|id| id == equipment_id)
    }

    pub fn give_equipment(&mut self, equipment_id: impl Into<String>) {
        let equipment_id = equipment_id.into();
        if !self.has_equipment(&equipment_id) {
            self.equipment.push(equipment_id);
        }
    }

    /// Returns whether the item was held.
    pub fn remove_equipment(&mut self, equipment_id: &str) -> bool {
        let before = self.equipment.len();
        self.equipment.retain(|id| id != equipment_id);
        self.equipment.len() != before
    }
}

/// The table roster. Ids always equal seat position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    players: Vec<Player>,
}

impl Roster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a player, validating the class against the catalog and
    /// refusing duplicate class picks.
    ///
    /// # Errors
    ///
    /// Returns an error for an uncataloged class or one already taken.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        class_id: &str,
        catalog: &CatalogData,
    ) -> Result<PlayerId, RosterError> {
        if catalog.class(class_id).is_none() {
            return Err(RosterError::UnknownClass {
                class_id: class_id.to_string(),
            });
        }
        if self.players.iter().any(|p| p.class_id == class_id) {
            return Err(RosterError::DuplicateClass {
                class_id: class_id.to_string(),
            });
        }
        let id = u32::try_from(self.players.len()).unwrap_or(u32::MAX);
        self.players.push(Player::new(id, name, class_id));
        Ok(id)
    }

    /// Remove a player pre-game and compact ids to seat positions.
    ///
    /// # Errors
    ///
    /// Returns an error when the id is not on the roster.
    pub fn remove(&mut self, id: PlayerId) -> Result<(), RosterError> {
        let before = self.players.len();
        self.players.retain(|p| p.id != id);
        if self.players.len() == before {
            return Err(RosterError::UnknownPlayer { id });
        }
        for (pos, player) in self.players.iter_mut().enumerate() {
            player.id = u32::try_from(pos).unwrap_or(u32::MAX);
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn players_mut(&mut self) -> &mut [Player] {
        &mut self.players
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
