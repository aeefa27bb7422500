//! Head-to-head duels over manually entered scores.

use crate::constants::{NYRA_CLASS_ID, NYRA_STEAL_CAP};
use crate::player::{Player, PlayerId};
use crate::tournament::MatchId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DuelError {
    #[error("a competitor cannot duel itself (player {player})")]
    SelfPairing { player: PlayerId },
    #[error("this duel already has a winner")]
    AlreadyResolved,
}

/// The decision over two entered scores. A tie is a legitimate outcome,
/// not an error: nothing mutates and the table re-enters scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Winner(PlayerId),
    Tie,
}

/// A duel between two competitors. Free-play duels carry no `match_id`;
/// tournament duels hand their result to bracket propagation on close.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Duel {
    pub home: PlayerId,
    pub away: PlayerId,
    #[serde(default)]
    pub score_home: u32,
    #[serde(default)]
    pub score_away: u32,
    #[serde(default)]
    pub winner: Option<PlayerId>,
    #[serde(default)]
    pub match_id: Option<MatchId>,
}

impl Duel {
    /// # Errors
    ///
    /// Returns an error when both slots name the same competitor.
    pub fn new(home: PlayerId, away: PlayerId) -> Result<Self, DuelError> {
        if home == away {
            return Err(DuelError::SelfPairing { player: home });
        }
        Ok(Self {
            home,
            away,
            score_home: 0,
            score_away: 0,
            winner: None,
            match_id: None,
        })
    }

    /// A duel bound to a tournament match.
    ///
    /// # Errors
    ///
    /// Returns an error when both slots name the same competitor.
    pub fn for_match(home: PlayerId, away: PlayerId, match_id: MatchId) -> Result<Self, DuelError> {
        let mut duel = Self::new(home, away)?;
        duel.match_id = Some(match_id);
        Ok(duel)
    }

    pub fn set_scores(&mut self, home: u32, away: u32) {
        self.score_home = home;
        self.score_away = away;
    }

    #[must_use]
    pub fn loser(&self) -> Option<PlayerId> {
        self.winner.map(|w| if w == self.home { self.away } else { self.home })
    }

    /// Decide the duel from the entered scores. Declaring a winner is
    /// terminal for this duel instance.
    ///
    /// # Errors
    ///
    /// Returns an error when a winner was already declared.
    pub fn declare_winner(&mut self) -> Result<Verdict, DuelError> {
        if self.winner.is_some() {
            return Err(DuelError::AlreadyResolved);
        }
        if self.score_home == self.score_away {
            return Ok(Verdict::Tie);
        }
        let winner = if self.score_home > self.score_away {
            self.home
        } else {
            self.away
        };
        self.winner = Some(winner);
        Ok(Verdict::Winner(winner))
    }
}

/// A conditional post-duel transfer: a winning Nyra may take up to the
/// cap from the loser, never more than the loser holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StealOffer {
    pub winner: PlayerId,
    pub loser: PlayerId,
    pub cap: i64,
}

/// Offer the Nyra steal when the winner's class qualifies.
#[must_use]
pub fn steal_offer(winner: &Player, loser: &Player) -> Option<StealOffer> {
    if winner.class_id != NYRA_CLASS_ID {
        return None;
    }
    Some(StealOffer {
        winner: winner.id,
        loser: loser.id,
        cap: NYRA_STEAL_CAP.min(loser.gold).max(0),
    })
}

/// Apply an accepted steal, clamping to the offer cap and the loser's
/// live balance. Returns the amount actually moved.
pub fn apply_steal(players: &mut [Player], offer: &StealOffer, amount: i64) -> i64 {
    let requested = amount.clamp(0, offer.cap);
    let Some(loser) = players.iter_mut().find(|p| p.id == offer.loser) else {
        return 0;
    };
    let taken = requested.min(loser.gold);
    loser.gold -= taken;
    if let Some(winner) = players.iter_mut().find(|p| p.id == offer.winner) {
        winner.gold += taken;
    }
    taken
}
