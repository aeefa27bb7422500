//! The day/night progression state machine.
//!
//! One `advance_tick` per call is the only way to move the timeline
//! forward; every multi-field update inside a tick is applied before the
//! caller can observe or persist the state.

use crate::combat::{compute_effective_hp, EffectiveHp, EncounterOutcome};
use crate::constants::MAX_DAYS;
use crate::data::{CatalogData, EventKind, EventSpec, Monster, Tier};
use crate::deck::{EventCard, EventDeck, MonsterDeck};
use crate::player::Player;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;

/// One-shot notifications surfaced to the collaborator, acknowledged in
/// FIFO order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// The last deck monster of a tier fell; every player gained mana.
    TierCleared { tier: Tier },
    /// The table lost an encounter; the penalty is the table's to apply.
    EncounterLost { monster_id: String },
}

/// Result of a single timeline tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Advanced,
    /// The timeline is exhausted (day cap or deck end); hand control to
    /// tournament setup.
    TournamentSetup,
}

/// What `resolve_encounter` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncounterReport {
    pub monster_id: String,
    pub outcome: EncounterOutcome,
    pub tier_cleared: Option<Tier>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressError {
    #[error("today's encounter is already resolved")]
    EncounterAlreadyResolved,
    #[error("no active monster remains in the deck")]
    NoActiveMonster,
}

/// Timeline state: event deck plus cursor, derived day/time, monster
/// deck plus cursor, and the pending notification queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameProgress {
    #[serde(default)]
    pub event_deck: EventDeck,
    #[serde(default)]
    pub event_cursor: usize,
    /// Count of day-kind entries consumed, 1-indexed, capped at [`MAX_DAYS`].
    #[serde(default = "default_day")]
    pub day: u32,
    #[serde(default)]
    pub time_of_day: EventKind,
    #[serde(default)]
    pub monster_deck: MonsterDeck,
    #[serde(default)]
    pub monster_cursor: usize,
    #[serde(default)]
    pub monster_resolved: bool,
    #[serde(default)]
    pub notifications: VecDeque<Notification>,
}

fn default_day() -> u32 {
    1
}

impl Default for GameProgress {
    fn default() -> Self {
        Self {
            event_deck: EventDeck::default(),
            event_cursor: 0,
            day: default_day(),
            time_of_day: EventKind::Day,
            monster_deck: MonsterDeck::default(),
            monster_cursor: 0,
            monster_resolved: false,
            notifications: VecDeque::new(),
        }
    }
}

impl GameProgress {
    /// Start the timeline on the decks' first entries. The event deck's
    /// opener is always the day-kind Normal Day, so the session begins
    /// on day 1, daytime.
    #[must_use]
    pub fn new(event_deck: EventDeck, monster_deck: MonsterDeck) -> Self {
        Self {
            event_deck,
            monster_deck,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn current_card(&self) -> Option<&EventCard> {
        self.event_deck.get(self.event_cursor)
    }

    #[must_use]
    pub fn current_event<'a>(&self, catalog: &'a CatalogData) -> Option<&'a EventSpec> {
        self.current_card()
            .and_then(|card| catalog.event(&card.event_id))
    }

    #[must_use]
    pub fn active_monster<'a>(&self, catalog: &'a CatalogData) -> Option<&'a Monster> {
        self.monster_deck
            .get(self.monster_cursor)
            .and_then(|id| catalog.monster(id))
    }

    /// Whether the current event doubles monster hit points.
    #[must_use]
    pub fn legendary_active(&self, catalog: &CatalogData) -> bool {
        self.current_event(catalog).is_some_and(|e| e.legendary)
    }

    /// Whether today's event suppresses combat entirely.
    #[must_use]
    pub fn dungeon_closed_today(&self, catalog: &CatalogData) -> bool {
        self.time_of_day == EventKind::Day
            && self
                .current_event(catalog)
                .is_some_and(|e| e.dungeon_closed)
    }

    /// Effective hit points of the active monster under the current
    /// event, or `None` when the monster deck is exhausted.
    #[must_use]
    pub fn effective_monster_hp(
        &self,
        catalog: &CatalogData,
        player_count: usize,
    ) -> Option<EffectiveHp> {
        let monster = self.active_monster(catalog)?;
        Some(compute_effective_hp(
            monster,
            player_count,
            self.legendary_active(catalog),
        ))
    }

    /// Advance the timeline one step.
    pub fn advance_tick(&mut self, catalog: &CatalogData) -> TickOutcome {
        // A closed dungeon consumes the day's monster without a duel.
        if self.dungeon_closed_today(catalog) && !self.monster_resolved {
            self.monster_resolved = true;
            self.monster_cursor += 1;
        }

        if self.day >= MAX_DAYS && self.time_of_day == EventKind::Day {
            return TickOutcome::TournamentSetup;
        }

        self.event_cursor += 1;
        let Some(card) = self.event_deck.get(self.event_cursor) else {
            // Deck ran out before day 12; a legitimate early exit.
            return TickOutcome::TournamentSetup;
        };
        self.time_of_day = card.kind;
        if card.kind == EventKind::Day {
            self.day = (self.day + 1).min(MAX_DAYS);
            self.monster_resolved = false;
        }
        TickOutcome::Advanced
    }

    /// Resolve today's monster encounter.
    ///
    /// Victory advances the monster deck and, when the defeated monster
    /// was the last of its tier by deck position, queues a notification
    /// and grants the tier bonus to every player. Defeat marks the day
    /// resolved without advancing the deck.
    ///
    /// # Errors
    ///
    /// Fails when the day is already resolved or no monster remains.
    pub fn resolve_encounter(
        &mut self,
        catalog: &CatalogData,
        players: &mut [Player],
        outcome: EncounterOutcome,
    ) -> Result<EncounterReport, ProgressError> {
        if self.monster_resolved {
            return Err(ProgressError::EncounterAlreadyResolved);
        }
        let monster_id = self
            .monster_deck
            .get(self.monster_cursor)
            .ok_or(ProgressError::NoActiveMonster)?
            .to_string();
        let tier = catalog.monster(&monster_id).map(|m| m.tier);
        self.monster_resolved = true;

        match outcome {
            EncounterOutcome::Victory => {
                self.monster_cursor += 1;
                let tier_cleared = tier.filter(|&t| self.tier_exhausted(catalog, t));
                if let Some(cleared) = tier_cleared {
                    self.notifications
                        .push_back(Notification::TierCleared { tier: cleared });
                    for player in players.iter_mut() {
                        player.grant_tier_bonus();
                    }
                }
                Ok(EncounterReport {
                    monster_id,
                    outcome,
                    tier_cleared,
                })
            }
            EncounterOutcome::Defeat => {
                self.notifications.push_back(Notification::EncounterLost {
                    monster_id: monster_id.clone(),
                });
                Ok(EncounterReport {
                    monster_id,
                    outcome,
                    tier_cleared: None,
                })
            }
        }
    }

    fn tier_exhausted(&self, catalog: &CatalogData, tier: Tier) -> bool {
        !self.monster_deck.entries[self.monster_cursor.min(self.monster_deck.len())..]
            .iter()
            .any(|id| catalog.monster(id).map(|m| m.tier) == Some(tier))
    }

    /// Pop the oldest pending notification.
    pub fn acknowledge_notification(&mut self) -> Option<Notification> {
        self.notifications.pop_front()
    }

    #[must_use]
    pub fn peek_notification(&self) -> Option<&Notification> {
        self.notifications.front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CatalogSet, EventSpec, HpSpec, Monster};
    use crate::player::Player;

    fn mk_event(id: &str, kind: EventKind, closed: bool, legendary: bool) -> EventSpec {
        EventSpec {
            id: id.to_string(),
            name: id.to_string(),
            kind,
            copies: 1,
            dungeon_closed: closed,
            legendary,
        }
    }

    fn mk_monster(id: &str, tier: Tier) -> Monster {
        Monster {
            id: id.to_string(),
            name: id.to_string(),
            tier,
            hp: HpSpec::Flat(5),
        }
    }

    fn catalog() -> CatalogData {
        CatalogData::resolve(CatalogSet {
            monsters: vec![
                mk_monster("g1", Tier::Gray),
                mk_monster("g2", Tier::Gray),
                mk_monster("b1", Tier::Blue),
            ],
            events: vec![
                mk_event("normal_day", EventKind::Day, false, false),
                mk_event("sealed_gates", EventKind::Day, true, false),
                mk_event("legendary_hunt", EventKind::Day, false, true),
                mk_event("quiet_night", EventKind::Night, false, false),
            ],
            ..CatalogSet::default()
        })
        .unwrap()
    }

    fn card(id: &str, kind: EventKind) -> EventCard {
        EventCard {
            kind,
            event_id: id.to_string(),
        }
    }

    fn progress_with(cards: Vec<EventCard>, monsters: &[&str]) -> GameProgress {
        GameProgress::new(
            EventDeck { cards },
            MonsterDeck {
                entries: monsters.iter().map(|s| (*s).to_string()).collect(),
            },
        )
    }

    fn players(n: usize) -> Vec<Player> {
        (0..n)
            .map(|i| {
                let mut p = Player::new(u32::try_from(i).unwrap(), format!("p{i}"), "bram");
                p.max_mana = 3;
                p.mana = 3;
                p
            })
            .collect()
    }

    #[test]
    fn tick_mirrors_time_of_day_and_counts_days() {
        let catalog = catalog();
        let mut progress = progress_with(
            vec![
                card("normal_day", EventKind::Day),
                card("quiet_night", EventKind::Night),
                card("normal_day", EventKind::Day),
            ],
            &["g1"],
        );
        assert_eq!(progress.day, 1);
        assert_eq!(progress.time_of_day, EventKind::Day);

        assert_eq!(progress.advance_tick(&catalog), TickOutcome::Advanced);
        assert_eq!(progress.time_of_day, EventKind::Night);
        assert_eq!(progress.day, 1);

        progress.monster_resolved = true;
        assert_eq!(progress.advance_tick(&catalog), TickOutcome::Advanced);
        assert_eq!(progress.time_of_day, EventKind::Day);
        assert_eq!(progress.day, 2);
        assert!(!progress.monster_resolved, "new day clears the flag");
    }

    #[test]
    fn deck_exhaustion_transitions_to_tournament() {
        let catalog = catalog();
        let mut progress = progress_with(vec![card("normal_day", EventKind::Day)], &["g1"]);
        assert_eq!(
            progress.advance_tick(&catalog),
            TickOutcome::TournamentSetup
        );
    }

    #[test]
    fn day_cap_transitions_to_tournament_without_moving_the_cursor() {
        let catalog = catalog();
        let mut progress = progress_with(
            vec![
                card("normal_day", EventKind::Day),
                card("normal_day", EventKind::Day),
            ],
            &["g1"],
        );
        progress.day = MAX_DAYS;
        let cursor = progress.event_cursor;
        assert_eq!(
            progress.advance_tick(&catalog),
            TickOutcome::TournamentSetup
        );
        assert_eq!(progress.event_cursor, cursor);
    }

    #[test]
    fn closed_dungeon_force_resolves_the_monster() {
        let catalog = catalog();
        let mut progress = progress_with(
            vec![
                card("sealed_gates", EventKind::Day),
                card("quiet_night", EventKind::Night),
            ],
            &["g1", "g2"],
        );
        assert_eq!(progress.advance_tick(&catalog), TickOutcome::Advanced);
        assert!(progress.monster_resolved);
        assert_eq!(progress.monster_cursor, 1);
        assert!(progress.notifications.is_empty(), "no reward path");
    }

    #[test]
    fn victory_on_last_of_tier_rewards_every_player_once() {
        let catalog = catalog();
        let mut progress = progress_with(
            vec![card("normal_day", EventKind::Day)],
            &["g1", "g2", "b1"],
        );
        let mut party = players(3);

        let report = progress
            .resolve_encounter(&catalog, &mut party, EncounterOutcome::Victory)
            .unwrap();
        assert_eq!(report.tier_cleared, None);
        assert!(party.iter().all(|p| p.max_mana == 3));

        progress.monster_resolved = false;
        let report = progress
            .resolve_encounter(&catalog, &mut party, EncounterOutcome::Victory)
            .unwrap();
        assert_eq!(report.tier_cleared, Some(Tier::Gray));
        assert_eq!(
            progress.peek_notification(),
            Some(&Notification::TierCleared { tier: Tier::Gray })
        );
        assert!(party.iter().all(|p| p.max_mana == 4 && p.mana == 4));

        // Exactly one notification for the tier.
        assert_eq!(progress.notifications.len(), 1);
    }

    #[test]
    fn defeat_keeps_the_monster_and_queues_a_penalty_notice() {
        let catalog = catalog();
        let mut progress = progress_with(vec![card("normal_day", EventKind::Day)], &["g1", "g2"]);
        let mut party = players(2);

        let report = progress
            .resolve_encounter(&catalog, &mut party, EncounterOutcome::Defeat)
            .unwrap();
        assert_eq!(report.outcome, EncounterOutcome::Defeat);
        assert_eq!(progress.monster_cursor, 0, "monster stays on defeat");
        assert_eq!(
            progress.acknowledge_notification(),
            Some(Notification::EncounterLost {
                monster_id: "g1".to_string()
            })
        );
        assert!(party.iter().all(|p| p.max_mana == 3));
    }

    #[test]
    fn double_resolution_fails_fast() {
        let catalog = catalog();
        let mut progress = progress_with(vec![card("normal_day", EventKind::Day)], &["g1"]);
        let mut party = players(2);
        progress
            .resolve_encounter(&catalog, &mut party, EncounterOutcome::Victory)
            .unwrap();
        assert_eq!(
            progress.resolve_encounter(&catalog, &mut party, EncounterOutcome::Victory),
            Err(ProgressError::EncounterAlreadyResolved)
        );
    }

    #[test]
    fn notifications_drain_in_fifo_order() {
        let mut progress = GameProgress::default();
        progress
            .notifications
            .push_back(Notification::TierCleared { tier: Tier::Gray });
        progress.notifications.push_back(Notification::EncounterLost {
            monster_id: "g1".to_string(),
        });
        assert_eq!(
            progress.acknowledge_notification(),
            Some(Notification::TierCleared { tier: Tier::Gray })
        );
        assert_eq!(
            progress.acknowledge_notification(),
            Some(Notification::EncounterLost {
                monster_id: "g1".to_string()
            })
        );
        assert_eq!(progress.acknowledge_notification(), None);
    }

    #[test]
    fn legendary_day_doubles_active_monster_hp() {
        let catalog = catalog();
        let progress = progress_with(vec![card("legendary_hunt", EventKind::Day)], &["g1"]);
        assert_eq!(
            progress.effective_monster_hp(&catalog, 4),
            Some(crate::combat::EffectiveHp::Value(10))
        );
    }

    #[test]
    fn snapshot_roundtrip_reproduces_observable_state() {
        let catalog = catalog();
        let mut progress = progress_with(
            vec![
                card("normal_day", EventKind::Day),
                card("quiet_night", EventKind::Night),
                card("legendary_hunt", EventKind::Day),
            ],
            &["g1", "g2", "b1"],
        );
        let _ = progress.advance_tick(&catalog);
        let json = serde_json::to_string(&progress).unwrap();
        let restored: GameProgress = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, progress);
    }

    #[test]
    fn old_snapshots_backfill_missing_fields() {
        let restored: GameProgress = serde_json::from_str("{}").unwrap();
        assert_eq!(restored.day, 1);
        assert_eq!(restored.time_of_day, EventKind::Day);
        assert!(restored.event_deck.is_empty());
        assert!(restored.notifications.is_empty());
    }
}
