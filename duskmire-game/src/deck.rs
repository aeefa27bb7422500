//! Deck construction: the tiered monster deck and the combined
//! day/night event deck.

use crate::constants::{MONSTERS_PER_TIER, MONSTER_DECK_LEN, NORMAL_DAY_ID};
use crate::data::{CatalogData, EventKind, Tier};
use crate::shuffle::shuffle_in_place;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Twelve monster ids: three per tier, tiers in canonical order, each
/// tier group sampled and order-randomized from the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterDeck {
    #[serde(default)]
    pub entries: Vec<String>,
}

impl MonsterDeck {
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }
}

/// One expanded event instance, tagged with its origin kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCard {
    pub kind: EventKind,
    pub event_id: String,
}

/// The shuffled combined event deck. The first card is always the
/// day-kind Normal Day opener.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDeck {
    #[serde(default)]
    pub cards: Vec<EventCard>,
}

impl EventDeck {
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&EventCard> {
        self.cards.get(index)
    }
}

/// Build the monster deck.
///
/// The catalog must supply at least three monsters per tier; that is a
/// setup-time data invariant, not a runtime case.
#[must_use]
pub fn build_monster_deck<R: Rng>(catalog: &CatalogData, rng: &mut R) -> MonsterDeck {
    let mut entries = Vec::with_capacity(MONSTER_DECK_LEN);
    for tier in Tier::ALL {
        let mut pool: Vec<&str> = catalog
            .monsters_of_tier(tier)
            .map(|m| m.id.as_str())
            .collect();
        shuffle_in_place(&mut pool, rng);
        entries.extend(
            pool.into_iter()
                .take(MONSTERS_PER_TIER)
                .map(str::to_string),
        );
    }
    MonsterDeck { entries }
}

/// Build the combined event deck: every event expanded by its copy
/// count, day and night fully interleaved by a single shuffle, then the
/// Normal Day opener stably moved (or synthesized) to the front.
#[must_use]
pub fn build_event_deck<R: Rng>(catalog: &CatalogData, rng: &mut R) -> EventDeck {
    let mut cards = Vec::new();
    for event in catalog.events() {
        for _ in 0..event.copies {
            cards.push(EventCard {
                kind: event.kind,
                event_id: event.id.clone(),
            });
        }
    }
    shuffle_in_place(&mut cards, rng);

    let opener = cards
        .iter()
        .position(|card| card.kind == EventKind::Day && card.event_id == NORMAL_DAY_ID);
    match opener {
        Some(0) => {}
        Some(pos) => {
            // Stable removal-then-prepend; the rest keeps its shuffle order.
            let card = cards.remove(pos);
            cards.insert(0, card);
        }
        None => cards.insert(
            0,
            EventCard {
                kind: EventKind::Day,
                event_id: NORMAL_DAY_ID.to_string(),
            },
        ),
    }
    EventDeck { cards }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CatalogSet, EventSpec, HpSpec, Monster};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use std::collections::HashSet;

    fn mk_monster(id: &str, tier: Tier) -> Monster {
        Monster {
            id: id.to_string(),
            name: id.to_string(),
            tier,
            hp: HpSpec::Flat(5),
        }
    }

    fn mk_event(id: &str, kind: EventKind, copies: u32) -> EventSpec {
        EventSpec {
            id: id.to_string(),
            name: id.to_string(),
            kind,
            copies,
            dungeon_closed: false,
            legendary: false,
        }
    }

    fn stocked_catalog() -> CatalogData {
        let mut monsters = Vec::new();
        for tier in Tier::ALL {
            for n in 0..5 {
                monsters.push(mk_monster(&format!("{tier}_{n}"), tier));
            }
        }
        let events = vec![
            mk_event(NORMAL_DAY_ID, EventKind::Day, 3),
            mk_event("market_day", EventKind::Day, 2),
            mk_event("quiet_night", EventKind::Night, 4),
        ];
        CatalogData::resolve(CatalogSet {
            monsters,
            events,
            ..CatalogSet::default()
        })
        .unwrap()
    }

    #[test]
    fn monster_deck_has_three_per_tier_in_canonical_order() {
        let catalog = stocked_catalog();
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let deck = build_monster_deck(&catalog, &mut rng);

        assert_eq!(deck.len(), MONSTER_DECK_LEN);
        for (group, tier) in Tier::ALL.iter().enumerate() {
            let slice = &deck.entries[group * MONSTERS_PER_TIER..(group + 1) * MONSTERS_PER_TIER];
            let distinct: HashSet<&String> = slice.iter().collect();
            assert_eq!(distinct.len(), MONSTERS_PER_TIER, "duplicates in {tier}");
            for id in slice {
                assert_eq!(catalog.monster(id).unwrap().tier, *tier);
            }
        }
    }

    #[test]
    fn event_deck_length_matches_copy_counts() {
        let catalog = stocked_catalog();
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let deck = build_event_deck(&catalog, &mut rng);
        let expected: u32 = catalog.events().iter().map(|e| e.copies).sum();
        assert_eq!(deck.len(), expected as usize);
    }

    #[test]
    fn event_deck_always_opens_on_normal_day() {
        let catalog = stocked_catalog();
        for seed in 0..50u64 {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let deck = build_event_deck(&catalog, &mut rng);
            let first = deck.get(0).unwrap();
            assert_eq!(first.kind, EventKind::Day);
            assert_eq!(first.event_id, NORMAL_DAY_ID);
        }
    }

    #[test]
    fn missing_opener_is_synthesized_and_grows_the_deck() {
        let catalog = CatalogData::resolve(CatalogSet {
            events: vec![
                mk_event("market_day", EventKind::Day, 2),
                mk_event("quiet_night", EventKind::Night, 2),
            ],
            ..CatalogSet::default()
        })
        .unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let deck = build_event_deck(&catalog, &mut rng);
        assert_eq!(deck.len(), 5);
        assert_eq!(deck.get(0).unwrap().event_id, NORMAL_DAY_ID);
    }

    #[test]
    fn opener_relocation_preserves_relative_order_of_the_rest() {
        let catalog = stocked_catalog();
        let mut rng = ChaCha20Rng::seed_from_u64(8);
        // Rebuild by hand to compare against the pre-repair ordering.
        let mut cards = Vec::new();
        for event in catalog.events() {
            for _ in 0..event.copies {
                cards.push(EventCard {
                    kind: event.kind,
                    event_id: event.id.clone(),
                });
            }
        }
        shuffle_in_place(&mut cards, &mut rng);
        let pos = cards
            .iter()
            .position(|c| c.kind == EventKind::Day && c.event_id == NORMAL_DAY_ID)
            .unwrap();
        let mut expected = cards.clone();
        let opener = expected.remove(pos);
        expected.insert(0, opener);

        let mut rng = ChaCha20Rng::seed_from_u64(8);
        let deck = build_event_deck(&catalog, &mut rng);
        assert_eq!(deck.cards, expected);
    }
}
