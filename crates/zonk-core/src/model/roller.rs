//! Dice sources. Everything random in a turn goes through one of these so a
//! seed fully determines the rolls.

use crate::model::dice::{DiceError, DiceSet, MAX_DICE, MAX_FACE, MIN_FACE};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

pub trait DiceSource {
    fn roll(&mut self, count: usize) -> Result<DiceSet, DiceError>;
}

impl<T: DiceSource + ?Sized> DiceSource for &mut T {
    fn roll(&mut self, count: usize) -> Result<DiceSet, DiceError> {
        (**self).roll(count)
    }
}

/// Uniform dice over 1..=6, with an optional forced face for tests.
#[derive(Debug, Clone)]
pub struct RandomDice<R> {
    rng: R,
    target: Option<u8>,
}

impl RandomDice<StdRng> {
    pub fn with_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> RandomDice<R> {
    pub fn new(rng: R) -> Self {
        Self { rng, target: None }
    }

    /// Every die rolled afterwards shows `face`.
    pub fn with_target(mut self, face: u8) -> Result<Self, DiceError> {
        self.set_target(Some(face))?;
        Ok(self)
    }

    pub fn set_target(&mut self, target: Option<u8>) -> Result<(), DiceError> {
        if let Some(value) = target {
            if !(MIN_FACE..=MAX_FACE).contains(&value) {
                return Err(DiceError::FaceOutOfRange { index: 0, value });
            }
        }
        self.target = target;
        Ok(())
    }

    pub fn target(&self) -> Option<u8> {
        self.target
    }
}

impl<R: Rng> DiceSource for RandomDice<R> {
    fn roll(&mut self, count: usize) -> Result<DiceSet, DiceError> {
        if count > MAX_DICE {
            return Err(DiceError::TooManyDice(count));
        }
        let values: Vec<u8> = (0..count)
            .map(|_| match self.target {
                Some(face) => face,
                None => self.rng.gen_range(MIN_FACE..=MAX_FACE),
            })
            .collect();
        DiceSet::from_values(&values)
    }
}

/// Replays a fixed list of rolls; each roll must match the requested count.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    rolls: VecDeque<DiceSet>,
}

impl ScriptedDice {
    pub fn new(rolls: Vec<DiceSet>) -> Self {
        Self {
            rolls: rolls.into(),
        }
    }

    pub fn from_values(rolls: &[&[u8]]) -> Result<Self, DiceError> {
        let rolls = rolls
            .iter()
            .map(|values| DiceSet::from_values(values))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(rolls))
    }

    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl DiceSource for ScriptedDice {
    fn roll(&mut self, count: usize) -> Result<DiceSet, DiceError> {
        if count > MAX_DICE {
            return Err(DiceError::TooManyDice(count));
        }
        let next = self.rolls.pop_front().ok_or(DiceError::ScriptExhausted)?;
        if next.len() != count {
            return Err(DiceError::ScriptMismatch {
                expected: count,
                found: next.len(),
            });
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_dice_are_deterministic() {
        let mut a = RandomDice::with_seed(42);
        let mut b = RandomDice::with_seed(42);
        for count in [6, 4, 2, 6] {
            assert_eq!(a.roll(count).unwrap(), b.roll(count).unwrap());
        }
    }

    #[test]
    fn rolls_requested_count_within_range() {
        let mut dice = RandomDice::with_seed(7);
        for count in 0..=MAX_DICE {
            let set = dice.roll(count).unwrap();
            assert_eq!(set.len(), count);
            assert!(set.iter().all(|v| (1..=6).contains(v)));
        }
        assert_eq!(dice.roll(7), Err(DiceError::TooManyDice(7)));
    }

    #[test]
    fn target_override_forces_face() {
        let mut dice = RandomDice::with_seed(1).with_target(5).unwrap();
        assert_eq!(dice.roll(3).unwrap().values(), &[5, 5, 5]);
        assert!(RandomDice::with_seed(1).with_target(0).is_err());
    }

    #[test]
    fn scripted_dice_replay_in_order() {
        let mut dice = ScriptedDice::from_values(&[&[1, 2, 3, 4, 5, 6], &[2, 2]]).unwrap();
        assert_eq!(dice.roll(6).unwrap().values(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(
            dice.roll(3),
            Err(DiceError::ScriptMismatch {
                expected: 3,
                found: 2
            })
        );
        assert_eq!(dice.roll(1), Err(DiceError::ScriptExhausted));
    }
}
