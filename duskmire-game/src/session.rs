//! Session controller: one explicit state value owning the roster, the
//! campaign timeline, and the tournament endgame.
//!
//! Every operation runs to completion synchronously; the collaborator
//! snapshots the state after each mutating call.

use crate::combat::{EffectiveHp, EncounterOutcome};
use crate::constants::{
    DEBUG_ENV_VAR, LOG_BRACKET_BUILT, LOG_CHAMPION, LOG_DAY_ADVANCED, LOG_DUEL_TIE,
    LOG_DUEL_WINNER, LOG_DUNGEON_CLOSED, LOG_ENCOUNTER_DEFEAT, LOG_ENCOUNTER_VICTORY,
    LOG_NIGHT_FALLS, LOG_SEEDS_DRAWN, LOG_SESSION_START, LOG_STEAL_DECLINED, LOG_STEAL_PENDING,
    LOG_STEAL_TAKEN, LOG_TIER_CLEARED, LOG_TOURNAMENT_SETUP, MAX_PLAYERS, MIN_PLAYERS,
};
use crate::data::{CatalogData, CatalogError, EventKind};
use crate::deck::{build_event_deck, build_monster_deck};
use crate::duel::{apply_steal, steal_offer, Duel, DuelError, StealOffer, Verdict};
use crate::player::{PlayerId, Roster, RosterError};
use crate::progress::{
    EncounterReport, GameProgress, Notification, ProgressError, TickOutcome,
};
use crate::tournament::{
    BracketError, MatchId, Phase, PropagationError, Tournament,
};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(debug_assertions)]
fn debug_log_enabled() -> bool {
    matches!(std::env::var(DEBUG_ENV_VAR), Ok(val) if val != "0")
}

#[cfg(not(debug_assertions))]
const fn debug_log_enabled() -> bool {
    false
}

fn fnv1a64(bytes: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0100_0000_01b3;
    let mut hash = FNV_OFFSET;
    for b in bytes {
        hash = (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Domain-separated per-purpose seed so the deck draw and the seeding
/// draw never share a stream.
fn derive_stream_seed(seed: u64, label: &[u8]) -> u64 {
    let mut buf = Vec::with_capacity(8 + label.len());
    buf.extend_from_slice(&seed.to_le_bytes());
    buf.extend_from_slice(label);
    fnv1a64(&buf)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    #[default]
    Setup,
    InProgress,
    Tournament,
    Champion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    /// Gold/mana bookkeeping on; also arms the Nyra duel steal.
    #[serde(default = "default_true")]
    pub track_resources: bool,
}

fn default_true() -> bool {
    true
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            track_resources: true,
        }
    }
}

/// A Nyra steal awaiting accept/decline. Tournament propagation for the
/// originating duel is held until this resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSteal {
    pub offer: StealOffer,
    #[serde(default)]
    pub match_id: Option<MatchId>,
}

/// Errors raised by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session requires {MIN_PLAYERS} to {MAX_PLAYERS} players, got {found}")]
    PartySize { found: usize },
    #[error("the campaign timeline is not in progress")]
    NotInProgress,
    #[error("no tournament is underway")]
    NoTournament,
    #[error("a pending duel steal must be resolved first")]
    StealUnresolved,
    #[error("no duel steal is pending")]
    NoPendingSteal,
    #[error(transparent)]
    Roster(#[from] RosterError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Bracket(#[from] BracketError),
    #[error(transparent)]
    Propagation(#[from] PropagationError),
    #[error(transparent)]
    Duel(#[from] DuelError),
}

/// The whole persisted session. Fields missing from older snapshots
/// back-fill with defaults instead of failing the load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub roster: Roster,
    #[serde(default)]
    pub phase: SessionPhase,
    #[serde(default)]
    pub flags: FeatureFlags,
    #[serde(default)]
    pub logs: Vec<String>,
    #[serde(default)]
    pub progress: Option<GameProgress>,
    #[serde(default)]
    pub tournament: Option<Tournament>,
    #[serde(default)]
    pub pending_steal: Option<PendingSteal>,
}

/// Binds resolved catalogs to a mutable session state.
#[derive(Debug, Clone)]
pub struct GameSession {
    catalog: CatalogData,
    state: SessionState,
}

impl GameSession {
    /// Start a fresh session: validate the roster, initialize mana from
    /// the character classes, and build both decks from the session
    /// seed. The randomized constructors run exactly once here.
    ///
    /// # Errors
    ///
    /// Fails on an out-of-range party or an uncataloged class.
    pub fn start(catalog: CatalogData, seed: u64, mut roster: Roster) -> Result<Self, SessionError> {
        let found = roster.len();
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&found) {
            return Err(SessionError::PartySize { found });
        }
        for player in roster.players_mut() {
            let class = catalog.require_class(&player.class_id)?;
            player.init_for_start(class);
        }

        let mut rng = ChaCha20Rng::seed_from_u64(derive_stream_seed(seed, b"decks"));
        let monster_deck = build_monster_deck(&catalog, &mut rng);
        let event_deck = build_event_deck(&catalog, &mut rng);

        let mut state = SessionState {
            seed,
            roster,
            phase: SessionPhase::InProgress,
            progress: Some(GameProgress::new(event_deck, monster_deck)),
            ..SessionState::default()
        };
        state.logs.push(String::from(LOG_SESSION_START));
        Ok(Self { catalog, state })
    }

    /// Rehydrate a loaded snapshot against fresh catalogs, rejecting
    /// references the catalogs no longer know.
    ///
    /// # Errors
    ///
    /// Fails when a class, monster, or event id in the snapshot is not
    /// cataloged.
    pub fn from_state(catalog: CatalogData, state: SessionState) -> Result<Self, SessionError> {
        for player in state.roster.players() {
            catalog.require_class(&player.class_id)?;
        }
        if let Some(progress) = &state.progress {
            for id in &progress.monster_deck.entries {
                catalog.require_monster(id)?;
            }
            for card in &progress.event_deck.cards {
                catalog.require_event(&card.event_id)?;
            }
        }
        Ok(Self { catalog, state })
    }

    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    #[must_use]
    pub const fn catalog(&self) -> &CatalogData {
        &self.catalog
    }

    #[must_use]
    pub fn into_state(self) -> SessionState {
        self.state
    }

    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.state.phase
    }

    #[must_use]
    pub fn champion(&self) -> Option<PlayerId> {
        self.state.tournament.as_ref().and_then(|t| t.champion)
    }

    /// Advance the campaign timeline one tick. When the timeline ends,
    /// the session moves to the tournament phase with a rank-unset seed
    /// list drawn from the roster.
    ///
    /// # Errors
    ///
    /// Fails outside the in-progress phase.
    pub fn advance_tick(&mut self) -> Result<TickOutcome, SessionError> {
        if self.state.phase != SessionPhase::InProgress {
            return Err(SessionError::NotInProgress);
        }
        let dungeon_was_closed = {
            let progress = self
                .state
                .progress
                .as_ref()
                .ok_or(SessionError::NotInProgress)?;
            progress.dungeon_closed_today(&self.catalog) && !progress.monster_resolved
        };
        let progress = self
            .state
            .progress
            .as_mut()
            .ok_or(SessionError::NotInProgress)?;
        let outcome = progress.advance_tick(&self.catalog);
        let time_of_day = progress.time_of_day;
        let day = progress.day;

        if dungeon_was_closed {
            self.state.logs.push(String::from(LOG_DUNGEON_CLOSED));
        }
        match outcome {
            TickOutcome::Advanced => {
                self.state.logs.push(String::from(match time_of_day {
                    EventKind::Day => LOG_DAY_ADVANCED,
                    EventKind::Night => LOG_NIGHT_FALLS,
                }));
                if debug_log_enabled() {
                    println!("Tick | day {day} {time_of_day}");
                }
            }
            TickOutcome::TournamentSetup => {
                self.state.tournament =
                    Some(Tournament::from_roster(self.state.roster.players())?);
                self.state.phase = SessionPhase::Tournament;
                self.state.logs.push(String::from(LOG_TOURNAMENT_SETUP));
            }
        }
        Ok(outcome)
    }

    /// Resolve today's monster encounter against the active monster.
    ///
    /// # Errors
    ///
    /// Fails outside the in-progress phase, on a double resolution, or
    /// when the monster deck is exhausted.
    pub fn resolve_encounter(
        &mut self,
        outcome: EncounterOutcome,
    ) -> Result<EncounterReport, SessionError> {
        if self.state.phase != SessionPhase::InProgress {
            return Err(SessionError::NotInProgress);
        }
        let SessionState {
            progress,
            roster,
            logs,
            ..
        } = &mut self.state;
        let progress = progress.as_mut().ok_or(SessionError::NotInProgress)?;
        let report = progress.resolve_encounter(&self.catalog, roster.players_mut(), outcome)?;

        logs.push(String::from(match report.outcome {
            EncounterOutcome::Victory => LOG_ENCOUNTER_VICTORY,
            EncounterOutcome::Defeat => LOG_ENCOUNTER_DEFEAT,
        }));
        if report.tier_cleared.is_some() {
            logs.push(String::from(LOG_TIER_CLEARED));
        }
        Ok(report)
    }

    /// Effective hit points of today's monster for the current table.
    #[must_use]
    pub fn active_monster_hp(&self) -> Option<EffectiveHp> {
        self.state
            .progress
            .as_ref()
            .and_then(|p| p.effective_monster_hp(&self.catalog, self.state.roster.len()))
    }

    /// Pop the oldest pending notification.
    pub fn acknowledge_notification(&mut self) -> Option<Notification> {
        self.state
            .progress
            .as_mut()
            .and_then(GameProgress::acknowledge_notification)
    }

    /// Draw dense seed ranks for the tournament. One-shot per session.
    ///
    /// # Errors
    ///
    /// Fails when no tournament is underway.
    pub fn draw_seeds(&mut self) -> Result<(), SessionError> {
        let seed = self.state.seed;
        let tournament = self
            .state
            .tournament
            .as_mut()
            .ok_or(SessionError::NoTournament)?;
        let mut rng = ChaCha20Rng::seed_from_u64(derive_stream_seed(seed, b"seeding"));
        tournament.draw_ranks(&mut rng);
        self.state.logs.push(String::from(LOG_SEEDS_DRAWN));
        Ok(())
    }

    /// Build the bracket from the drawn seeds and enter play.
    ///
    /// # Errors
    ///
    /// Fails when no tournament is underway or ranks are not dense.
    pub fn start_bracket(&mut self) -> Result<(), SessionError> {
        let tournament = self
            .state
            .tournament
            .as_mut()
            .ok_or(SessionError::NoTournament)?;
        tournament.build_bracket()?;
        self.state.logs.push(String::from(LOG_BRACKET_BUILT));
        Ok(())
    }

    /// Decide a duel from its entered scores. A winning Nyra (with
    /// resource tracking on) opens a steal that must be resolved before
    /// any tournament propagation for this duel runs.
    ///
    /// # Errors
    ///
    /// Fails while a steal is pending, or on duel contract violations.
    pub fn declare_duel_winner(&mut self, duel: &mut Duel) -> Result<Verdict, SessionError> {
        if self.state.pending_steal.is_some() {
            return Err(SessionError::StealUnresolved);
        }
        let verdict = duel.declare_winner()?;
        let Verdict::Winner(winner_id) = verdict else {
            self.state.logs.push(String::from(LOG_DUEL_TIE));
            return Ok(verdict);
        };
        let loser_id = duel.loser().unwrap_or(duel.away);

        let offer = if self.state.flags.track_resources {
            match (
                self.state.roster.get(winner_id),
                self.state.roster.get(loser_id),
            ) {
                (Some(winner), Some(loser)) => steal_offer(winner, loser),
                _ => None,
            }
        } else {
            None
        };

        self.state.logs.push(String::from(LOG_DUEL_WINNER));
        if let Some(offer) = offer {
            self.state.pending_steal = Some(PendingSteal {
                offer,
                match_id: duel.match_id,
            });
            self.state.logs.push(String::from(LOG_STEAL_PENDING));
        } else if let Some(match_id) = duel.match_id {
            self.apply_match_result(match_id, winner_id)?;
        }
        Ok(verdict)
    }

    /// Resolve the pending steal: `Some(amount)` accepts (clamped to the
    /// offer cap and the loser's balance), `None` declines. Held
    /// tournament propagation runs afterwards. Returns the gold moved.
    ///
    /// # Errors
    ///
    /// Fails when no steal is pending.
    pub fn resolve_steal(&mut self, amount: Option<i64>) -> Result<i64, SessionError> {
        let pending = self
            .state
            .pending_steal
            .take()
            .ok_or(SessionError::NoPendingSteal)?;
        let taken = match amount {
            Some(requested) => {
                apply_steal(self.state.roster.players_mut(), &pending.offer, requested)
            }
            None => 0,
        };
        self.state.logs.push(String::from(if amount.is_some() {
            LOG_STEAL_TAKEN
        } else {
            LOG_STEAL_DECLINED
        }));
        if let Some(match_id) = pending.match_id {
            self.apply_match_result(match_id, pending.offer.winner)?;
        }
        Ok(taken)
    }

    /// Record a tournament match result directly (manual adjudication).
    ///
    /// # Errors
    ///
    /// Fails while a steal is pending, when no tournament is underway,
    /// or when the match id is unknown.
    pub fn record_match_result(
        &mut self,
        match_id: MatchId,
        winner: PlayerId,
    ) -> Result<(), SessionError> {
        if self.state.pending_steal.is_some() {
            return Err(SessionError::StealUnresolved);
        }
        self.apply_match_result(match_id, winner)
    }

    fn apply_match_result(
        &mut self,
        match_id: MatchId,
        winner: PlayerId,
    ) -> Result<(), SessionError> {
        let tournament = self
            .state
            .tournament
            .as_mut()
            .ok_or(SessionError::NoTournament)?;
        tournament.record_result(match_id, winner)?;
        if tournament.phase == Phase::Champion {
            self.state.phase = SessionPhase::Champion;
            self.state.logs.push(String::from(LOG_CHAMPION));
            if debug_log_enabled() {
                println!("Tournament | champion {winner}");
            }
        }
        Ok(())
    }
}
