//! Effective hit-point computation for monster encounters.

use crate::data::{HpSpec, Monster};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A monster's hit points for the current encounter. `Special` monsters
/// have no combat value; the collaborator renders them as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectiveHp {
    Value(u32),
    Special,
}

impl fmt::Display for EffectiveHp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(hp) => write!(f, "{hp}"),
            Self::Special => f.write_str("special"),
        }
    }
}

/// How the table says an encounter went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncounterOutcome {
    Victory,
    Defeat,
}

/// Pure HP formula: per-player specs scale by table size, legendary days
/// double the numeric result after the base computation.
#[must_use]
pub fn compute_effective_hp(monster: &Monster, player_count: usize, legendary: bool) -> EffectiveHp {
    let count = u32::try_from(player_count).unwrap_or(u32::MAX);
    let base = match monster.hp {
        HpSpec::Special => return EffectiveHp::Special,
        HpSpec::PerPlayer(per) => per.saturating_mul(count),
        HpSpec::Flat(flat) => flat,
    };
    let hp = if legendary { base.saturating_mul(2) } else { base };
    EffectiveHp::Value(hp)
}
