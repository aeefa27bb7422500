//! Duskmire Game Engine
//!
//! Platform-agnostic session-state engine for the Duskmire board game
//! companion. This crate tracks rules-derived state only; presentation
//! and platform storage live with the embedding application.

pub mod combat;
pub mod constants;
pub mod data;
pub mod deck;
pub mod duel;
pub mod player;
pub mod progress;
pub mod session;
pub mod shuffle;
pub mod tournament;

// Re-export commonly used types
pub use combat::{compute_effective_hp, EffectiveHp, EncounterOutcome};
pub use data::{
    CatalogData, CatalogError, CatalogSet, CharacterClass, Equipment, EventKind, EventSpec,
    HpSpec, Monster, Tier,
};
pub use deck::{build_event_deck, build_monster_deck, EventCard, EventDeck, MonsterDeck};
pub use duel::{apply_steal, steal_offer, Duel, DuelError, StealOffer, Verdict};
pub use player::{Player, PlayerId, Roster, RosterError};
pub use progress::{
    EncounterReport, GameProgress, Notification, ProgressError, TickOutcome,
};
pub use session::{
    FeatureFlags, GameSession, PendingSteal, SessionError, SessionPhase, SessionState,
};
pub use tournament::{
    build_rounds, BracketError, Feed, Match, MatchId, Phase, PropagationError, Round, RoundName,
    Seed, Slot, Tournament,
};

/// Trait for abstracting catalog loading operations.
/// Platform-specific implementations should provide this.
pub trait CatalogLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the resolved catalogs from the platform-specific source.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalogs cannot be loaded.
    fn load_catalog(&self) -> Result<CatalogData, Self::Error>;
}

/// Trait for abstracting snapshot save/load operations.
/// Platform-specific implementations should provide this.
pub trait SnapshotStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save a session snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be saved.
    fn save_session(&self, slot: &str, state: &SessionState) -> Result<(), Self::Error>;

    /// Load a session snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be loaded.
    fn load_session(&self, slot: &str) -> Result<Option<SessionState>, Self::Error>;

    /// Delete a saved snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be deleted.
    fn delete_session(&self, slot: &str) -> Result<(), Self::Error>;
}

/// Main engine binding catalog loading and snapshot storage.
pub struct GameEngine<L, S>
where
    L: CatalogLoader,
    S: SnapshotStorage,
{
    catalog_loader: L,
    storage: S,
}

impl<L, S> GameEngine<L, S>
where
    L: CatalogLoader,
    S: SnapshotStorage,
{
    /// Create a new engine with the provided catalog loader and storage.
    pub const fn new(catalog_loader: L, storage: S) -> Self {
        Self {
            catalog_loader,
            storage,
        }
    }

    /// Start a fresh session from a seed and a pre-built roster.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalogs cannot be loaded or the roster
    /// is rejected.
    pub fn create_session(&self, seed: u64, roster: Roster) -> Result<GameSession, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
    {
        let catalog = self.catalog_loader.load_catalog().map_err(Into::into)?;
        Ok(GameSession::start(catalog, seed, roster)?)
    }

    /// Save a session snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be saved.
    pub fn save_session(&self, slot: &str, state: &SessionState) -> Result<(), S::Error> {
        self.storage.save_session(slot, state)
    }

    /// Load a session and rehydrate it against fresh catalogs.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be loaded or references
    /// ids the catalogs no longer carry.
    pub fn load_session(&self, slot: &str) -> Result<Option<GameSession>, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
        S::Error: Into<anyhow::Error>,
    {
        if let Some(state) = self.storage.load_session(slot).map_err(Into::into)? {
            let catalog = self.catalog_loader.load_catalog().map_err(Into::into)?;
            Ok(Some(GameSession::from_state(catalog, state)?))
        } else {
            Ok(None)
        }
    }
}
