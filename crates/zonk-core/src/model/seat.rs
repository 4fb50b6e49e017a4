use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Seat {
    Ai = 0,
    Player = 1,
}

impl Seat {
    pub const LOOP: [Seat; 2] = [Seat::Ai, Seat::Player];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Seat::Ai),
            1 => Some(Seat::Player),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn opponent(self) -> Seat {
        match self {
            Seat::Ai => Seat::Player,
            Seat::Player => Seat::Ai,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Seat::Ai => "AI",
            Seat::Player => "Player",
        };
        f.write_str(label)
    }
}
