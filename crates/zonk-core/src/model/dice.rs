use core::fmt;
use serde::{Deserialize, Serialize};

pub const MAX_DICE: usize = 6;
pub const MIN_FACE: u8 = 1;
pub const MAX_FACE: u8 = 6;

/// Per-face tallies, indexed by face value (slot 0 is unused).
pub type FaceCounts = [u8; MAX_FACE as usize + 1];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiceError {
    TooManyDice(usize),
    FaceOutOfRange { index: usize, value: u8 },
    IndexOutOfRange { index: usize, len: usize },
    DuplicateIndex(usize),
    ScriptExhausted,
    ScriptMismatch { expected: usize, found: usize },
}

impl fmt::Display for DiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiceError::TooManyDice(count) => {
                write!(f, "requested {count} dice but a pool holds at most {MAX_DICE}")
            }
            DiceError::FaceOutOfRange { index, value } => {
                write!(f, "die {index} shows {value}, expected {MIN_FACE}..={MAX_FACE}")
            }
            DiceError::IndexOutOfRange { index, len } => {
                write!(f, "die index {index} is outside a pool of {len}")
            }
            DiceError::DuplicateIndex(index) => write!(f, "die index {index} listed twice"),
            DiceError::ScriptExhausted => f.write_str("scripted dice ran out of rolls"),
            DiceError::ScriptMismatch { expected, found } => {
                write!(f, "scripted roll has {found} dice, expected {expected}")
            }
        }
    }
}

impl std::error::Error for DiceError {}

/// Ordered pool of up to six die faces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct DiceSet {
    values: Vec<u8>,
}

impl DiceSet {
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    pub fn from_values(values: &[u8]) -> Result<Self, DiceError> {
        if values.len() > MAX_DICE {
            return Err(DiceError::TooManyDice(values.len()));
        }
        for (index, &value) in values.iter().enumerate() {
            if !(MIN_FACE..=MAX_FACE).contains(&value) {
                return Err(DiceError::FaceOutOfRange { index, value });
            }
        }
        Ok(Self {
            values: values.to_vec(),
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[u8] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<u8> {
        self.values.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &u8> {
        self.values.iter()
    }

    pub fn counts(&self) -> FaceCounts {
        let mut counts = [0u8; MAX_FACE as usize + 1];
        for &value in &self.values {
            counts[value as usize] += 1;
        }
        counts
    }

    /// Indices holding `face`, in ascending order.
    pub fn positions_of(&self, face: u8) -> Vec<usize> {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, value)| **value == face)
            .map(|(index, _)| index)
            .collect()
    }

    /// Removes the dice at `indices`, keeping the order of the survivors.
    /// Nothing is removed when any index is invalid.
    pub fn remove_indices(&mut self, indices: &[usize]) -> Result<usize, DiceError> {
        let len = self.values.len();
        let mut marked = [false; MAX_DICE];
        for &index in indices {
            if index >= len {
                return Err(DiceError::IndexOutOfRange { index, len });
            }
            if marked[index] {
                return Err(DiceError::DuplicateIndex(index));
            }
            marked[index] = true;
        }

        let mut position = 0usize;
        self.values.retain(|_| {
            let keep = !marked[position];
            position += 1;
            keep
        });
        Ok(indices.len())
    }
}

impl TryFrom<Vec<u8>> for DiceSet {
    type Error = DiceError;

    fn try_from(values: Vec<u8>) -> Result<Self, Self::Error> {
        Self::from_values(&values)
    }
}

impl From<DiceSet> for Vec<u8> {
    fn from(set: DiceSet) -> Self {
        set.values
    }
}

impl fmt::Display for DiceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (index, value) in self.values.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_oversized_pool() {
        let err = DiceSet::from_values(&[1, 2, 3, 4, 5, 6, 1]).unwrap_err();
        assert_eq!(err, DiceError::TooManyDice(7));
    }

    #[test]
    fn rejects_out_of_range_face() {
        let err = DiceSet::from_values(&[1, 0, 3]).unwrap_err();
        assert_eq!(err, DiceError::FaceOutOfRange { index: 1, value: 0 });
        assert!(DiceSet::from_values(&[7]).is_err());
    }

    #[test]
    fn counts_tally_faces() {
        let dice = DiceSet::from_values(&[6, 4, 3, 6, 2, 4]).unwrap();
        let counts = dice.counts();
        assert_eq!(counts[6], 2);
        assert_eq!(counts[4], 2);
        assert_eq!(counts[1], 0);
        assert_eq!(dice.positions_of(4), vec![1, 5]);
    }

    #[test]
    fn remove_indices_keeps_survivor_order() {
        let mut dice = DiceSet::from_values(&[1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(dice.remove_indices(&[4, 0]), Ok(2));
        assert_eq!(dice.values(), &[2, 3, 4, 6]);
    }

    #[test]
    fn remove_indices_is_all_or_nothing() {
        let mut dice = DiceSet::from_values(&[1, 5, 5]).unwrap();
        assert_eq!(
            dice.remove_indices(&[0, 3]),
            Err(DiceError::IndexOutOfRange { index: 3, len: 3 })
        );
        assert_eq!(
            dice.remove_indices(&[1, 1]),
            Err(DiceError::DuplicateIndex(1))
        );
        assert_eq!(dice.len(), 3);
    }

    #[test]
    fn serde_validates_faces() {
        let dice: DiceSet = serde_json::from_str("[1,5,6]").unwrap();
        assert_eq!(dice.to_string(), "[1,5,6]");
        assert!(serde_json::from_str::<DiceSet>("[9]").is_err());
    }
}
