//! Single-elimination tournament: seeding, bracket construction, and
//! winner propagation.
//!
//! The bracket topologies for three to six competitors are fixed table
//! rules, reproduced exactly — including the five-player layout where
//! both semifinals draw from the same quarterfinal output and only one
//! of them is ever played.

use crate::player::{Player, PlayerId};
use crate::shuffle::seed_order;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub type MatchId = u32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BracketError {
    #[error("tournament requires 3 to 6 competitors, got {found}")]
    PartySize { found: usize },
    #[error("seed ranks have not been drawn")]
    RanksNotDrawn,
    #[error("seed ranks are not dense 1..=N")]
    SparseRanks,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropagationError {
    #[error("no match with id {match_id}")]
    MatchNotFound { match_id: MatchId },
}

/// A directed dependency: when `source` resolves, its winner is written
/// into this match's slot `slot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    pub source: MatchId,
    pub slot: u8,
}

/// A match slot: a concrete competitor, or unresolved until a feeding
/// match completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    #[default]
    Tbd,
    Player(PlayerId),
}

impl Slot {
    #[must_use]
    pub const fn player(self) -> Option<PlayerId> {
        match self {
            Self::Player(id) => Some(id),
            Self::Tbd => None,
        }
    }
}

/// One bracket match. `advantage` marks the seed-first competitor of the
/// initial pairing; it is bracket-position metadata fixed at
/// construction, never recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub slots: [Slot; 2],
    pub advantage: Option<PlayerId>,
    #[serde(default)]
    pub winner: Option<PlayerId>,
    pub feeds: [Option<Feed>; 2],
}

impl Match {
    fn seeded(id: MatchId, first: PlayerId, second: PlayerId) -> Self {
        Self {
            id,
            slots: [Slot::Player(first), Slot::Player(second)],
            advantage: Some(first),
            winner: None,
            feeds: [None, None],
        }
    }

    fn half_seeded(id: MatchId, first: PlayerId, feed: Feed) -> Self {
        Self {
            id,
            slots: [Slot::Player(first), Slot::Tbd],
            advantage: Some(first),
            winner: None,
            feeds: [None, Some(feed)],
        }
    }

    fn fed(id: MatchId, first: Feed, second: Feed) -> Self {
        Self {
            id,
            slots: [Slot::Tbd, Slot::Tbd],
            advantage: None,
            winner: None,
            feeds: [Some(first), Some(second)],
        }
    }

    /// Both competitors known and no winner yet.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.winner.is_none() && self.slots.iter().all(|s| s.player().is_some())
    }
}

/// Bracket depth label, leaves to root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundName {
    Quarterfinals,
    Semifinal,
    Final,
}

impl RoundName {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quarterfinals => "quarterfinals",
            Self::Semifinal => "semifinal",
            Self::Final => "final",
        }
    }
}

impl fmt::Display for RoundName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Matches at one bracket depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub name: RoundName,
    pub matches: Vec<Match>,
}

/// A tournament seed: rank 1 is the top seed; `None` until drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seed {
    pub player: PlayerId,
    #[serde(default)]
    pub rank: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Seeding,
    InProgress,
    Champion,
}

/// Tournament state: phase, seed list, rounds leaves-to-root, and the
/// champion once the Final resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    #[serde(default)]
    pub phase: Phase,
    #[serde(default)]
    pub seeds: Vec<Seed>,
    #[serde(default)]
    pub rounds: Vec<Round>,
    #[serde(default)]
    pub champion: Option<PlayerId>,
}

impl Tournament {
    /// Enter tournament setup from the current roster, ranks unset.
    ///
    /// # Errors
    ///
    /// Fails fast outside the supported 3..=6 competitor range.
    pub fn from_roster(players: &[Player]) -> Result<Self, BracketError> {
        let found = players.len();
        if !(3..=6).contains(&found) {
            return Err(BracketError::PartySize { found });
        }
        Ok(Self {
            phase: Phase::Seeding,
            seeds: players
                .iter()
                .map(|p| Seed {
                    player: p.id,
                    rank: None,
                })
                .collect(),
            rounds: Vec::new(),
            champion: None,
        })
    }

    /// Assign dense ranks 1..=N by a random permutation. One-shot per
    /// session.
    pub fn draw_ranks<R: Rng>(&mut self, rng: &mut R) {
        let order = seed_order(self.seeds.len(), rng);
        for (seed, pos) in self.seeds.iter_mut().zip(order) {
            seed.rank = Some(u32::try_from(pos).unwrap_or(u32::MAX) + 1);
        }
    }

    /// Build the round structure from the drawn seeds and enter play.
    ///
    /// # Errors
    ///
    /// Fails when ranks are missing or not dense.
    pub fn build_bracket(&mut self) -> Result<(), BracketError> {
        let mut ranked: Vec<(u32, PlayerId)> = Vec::with_capacity(self.seeds.len());
        for seed in &self.seeds {
            let rank = seed.rank.ok_or(BracketError::RanksNotDrawn)?;
            ranked.push((rank, seed.player));
        }
        ranked.sort_by_key(|&(rank, _)| rank);
        let dense = ranked
            .iter()
            .enumerate()
            .all(|(pos, &(rank, _))| rank as usize == pos + 1);
        if !dense {
            return Err(BracketError::SparseRanks);
        }
        let order: Vec<PlayerId> = ranked.into_iter().map(|(_, player)| player).collect();
        self.rounds = build_rounds(&order);
        self.phase = Phase::InProgress;
        Ok(())
    }

    #[must_use]
    pub fn find_match(&self, match_id: MatchId) -> Option<&Match> {
        self.rounds
            .iter()
            .flat_map(|round| round.matches.iter())
            .find(|m| m.id == match_id)
    }

    pub fn find_match_mut(&mut self, match_id: MatchId) -> Option<&mut Match> {
        self.rounds
            .iter_mut()
            .flat_map(|round| round.matches.iter_mut())
            .find(|m| m.id == match_id)
    }

    /// Id of the championship match, once the bracket exists.
    #[must_use]
    pub fn final_id(&self) -> Option<MatchId> {
        self.rounds
            .last()
            .and_then(|round| round.matches.first())
            .map(|m| m.id)
    }

    /// Record a match result. Resolving the Final crowns the champion
    /// and stops; any other match writes its winner into every slot fed
    /// by it. Re-resolving a match is a caller precondition, not guarded.
    ///
    /// # Errors
    ///
    /// Returns an error when the match id is unknown.
    pub fn record_result(
        &mut self,
        match_id: MatchId,
        winner: PlayerId,
    ) -> Result<(), PropagationError> {
        let final_id = self.final_id();
        let target = self
            .find_match_mut(match_id)
            .ok_or(PropagationError::MatchNotFound { match_id })?;
        target.winner = Some(winner);

        if final_id == Some(match_id) {
            self.champion = Some(winner);
            self.phase = Phase::Champion;
            return Ok(());
        }

        for round in &mut self.rounds {
            for dependent in &mut round.matches {
                for feed in dependent.feeds.iter().flatten() {
                    if feed.source == match_id {
                        dependent.slots[usize::from(feed.slot)] = Slot::Player(winner);
                    }
                }
            }
        }
        Ok(())
    }
}

/// Build the canonical round structure for seeds sorted rank-ascending
/// (`order[0]` is the top seed). Player counts outside the tabulated
/// 3..=6 fall back to the four-player bracket over the first four seeds.
///
/// # Panics
///
/// Panics when fewer than three seeds are supplied; callers validate
/// the competitor range before building.
#[must_use]
pub fn build_rounds(order: &[PlayerId]) -> Vec<Round> {
    assert!(order.len() >= 3, "bracket needs at least three seeds");
    match order.len() {
        3 => build_three(order),
        4 => build_four(order),
        5 => build_five(order),
        6 => build_six(order),
        _ => build_four(&order[..4]),
    }
}

fn build_three(s: &[PlayerId]) -> Vec<Round> {
    let semifinal = Match::seeded(1, s[1], s[2]);
    let final_match = Match::half_seeded(2, s[0], Feed { source: 1, slot: 1 });
    vec![
        Round {
            name: RoundName::Semifinal,
            matches: vec![semifinal],
        },
        Round {
            name: RoundName::Final,
            matches: vec![final_match],
        },
    ]
}

fn build_four(s: &[PlayerId]) -> Vec<Round> {
    let sf1 = Match::seeded(1, s[0], s[3]);
    let sf2 = Match::seeded(2, s[1], s[2]);
    let final_match = Match::fed(
        3,
        Feed { source: 1, slot: 0 },
        Feed { source: 2, slot: 1 },
    );
    vec![
        Round {
            name: RoundName::Semifinal,
            matches: vec![sf1, sf2],
        },
        Round {
            name: RoundName::Final,
            matches: vec![final_match],
        },
    ]
}

fn build_five(s: &[PlayerId]) -> Vec<Round> {
    let qf1 = Match::seeded(1, s[3], s[4]);
    // Both semifinals draw the same quarterfinal winner; only one is
    // ever played. Table rule, kept as printed.
    let sf1 = Match::half_seeded(2, s[1], Feed { source: 1, slot: 1 });
    let sf2 = Match::half_seeded(3, s[2], Feed { source: 1, slot: 1 });
    let final_match = Match {
        id: 4,
        slots: [Slot::Player(s[0]), Slot::Tbd],
        advantage: Some(s[0]),
        winner: None,
        feeds: [
            Some(Feed { source: 2, slot: 1 }),
            Some(Feed { source: 3, slot: 1 }),
        ],
    };
    vec![
        Round {
            name: RoundName::Quarterfinals,
            matches: vec![qf1],
        },
        Round {
            name: RoundName::Semifinal,
            matches: vec![sf1, sf2],
        },
        Round {
            name: RoundName::Final,
            matches: vec![final_match],
        },
    ]
}

fn build_six(s: &[PlayerId]) -> Vec<Round> {
    let qf1 = Match::seeded(1, s[0], s[1]);
    let qf2 = Match::seeded(2, s[2], s[3]);
    let qf3 = Match::seeded(3, s[4], s[5]);
    let semifinal = Match::fed(
        4,
        Feed { source: 2, slot: 0 },
        Feed { source: 3, slot: 1 },
    );
    let final_match = Match::fed(
        5,
        Feed { source: 1, slot: 0 },
        Feed { source: 4, slot: 1 },
    );
    vec![
        Round {
            name: RoundName::Quarterfinals,
            matches: vec![qf1, qf2, qf3],
        },
        Round {
            name: RoundName::Semifinal,
            matches: vec![semifinal],
        },
        Round {
            name: RoundName::Final,
            matches: vec![final_match],
        },
    ]
}
