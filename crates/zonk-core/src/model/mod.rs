pub mod combination;
pub mod dice;
pub mod roller;
pub mod rule;
pub mod score;
pub mod seat;
pub mod tier;
