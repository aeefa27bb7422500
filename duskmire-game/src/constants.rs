//! Centralized rules constants for the Duskmire session engine.
//!
//! These values define the fixed shape of the campaign timeline and the
//! tournament endgame. Keeping them together ensures the table rules can
//! only change through reviewed code, not through external assets.

// Logging keys -------------------------------------------------------------
pub(crate) const DEBUG_ENV_VAR: &str = "DUSKMIRE_DEBUG_LOGS";
pub(crate) const LOG_SESSION_START: &str = "log.session.start";
pub(crate) const LOG_DAY_ADVANCED: &str = "log.day.advanced";
pub(crate) const LOG_NIGHT_FALLS: &str = "log.night.falls";
pub(crate) const LOG_DUNGEON_CLOSED: &str = "log.day.dungeon-closed";
pub(crate) const LOG_ENCOUNTER_VICTORY: &str = "log.encounter.victory";
pub(crate) const LOG_ENCOUNTER_DEFEAT: &str = "log.encounter.defeat";
pub(crate) const LOG_TIER_CLEARED: &str = "log.tier.cleared";
pub(crate) const LOG_DUEL_TIE: &str = "log.duel.tie";
pub(crate) const LOG_DUEL_WINNER: &str = "log.duel.winner";
pub(crate) const LOG_STEAL_PENDING: &str = "log.duel.steal-pending";
pub(crate) const LOG_STEAL_TAKEN: &str = "log.duel.steal-taken";
pub(crate) const LOG_STEAL_DECLINED: &str = "log.duel.steal-declined";
pub(crate) const LOG_TOURNAMENT_SETUP: &str = "log.tournament.setup";
pub(crate) const LOG_SEEDS_DRAWN: &str = "log.tournament.seeds-drawn";
pub(crate) const LOG_BRACKET_BUILT: &str = "log.tournament.bracket-built";
pub(crate) const LOG_CHAMPION: &str = "log.tournament.champion";

// Campaign timeline --------------------------------------------------------
/// Last campaign day; the morning of this day hands control to the tournament.
pub const MAX_DAYS: u32 = 12;

// Monster deck shape -------------------------------------------------------
pub const TIER_COUNT: usize = 4;
pub const MONSTERS_PER_TIER: usize = 3;
pub const MONSTER_DECK_LEN: usize = TIER_COUNT * MONSTERS_PER_TIER;

// Roster bounds ------------------------------------------------------------
pub const MIN_PLAYERS: usize = 3;
pub const MAX_PLAYERS: usize = 6;

// Duel rules ---------------------------------------------------------------
/// Gold a winning Nyra may take from the loser, before the balance cap.
pub const NYRA_STEAL_CAP: i64 = 7;
pub const NYRA_CLASS_ID: &str = "nyra";

// Event catalog anchors ----------------------------------------------------
/// The neutral opener every session starts on.
pub const NORMAL_DAY_ID: &str = "normal_day";
