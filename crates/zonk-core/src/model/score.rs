use crate::model::seat::Seat;

/// External running totals. Turns only ever hand it a final delta.
pub trait ScoreLedger {
    fn commit_turn_score(&mut self, delta: u32);

    /// `(own, opponent)` from the point of view of the seat being served.
    fn current_scores(&self) -> (u32, u32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreBoard {
    totals: [u32; 2],
}

impl ScoreBoard {
    pub const fn new() -> Self {
        Self { totals: [0; 2] }
    }

    pub fn add_points(&mut self, seat: Seat, points: u32) {
        self.totals[seat.index()] = self.totals[seat.index()].saturating_add(points);
    }

    pub fn set_score(&mut self, seat: Seat, points: u32) {
        self.totals[seat.index()] = points;
    }

    pub fn set_totals(&mut self, totals: [u32; 2]) {
        self.totals = totals;
    }

    pub fn score(&self, seat: Seat) -> u32 {
        self.totals[seat.index()]
    }

    pub fn standings(&self) -> &[u32; 2] {
        &self.totals
    }

    /// Signed lead of `seat` over its opponent.
    pub fn difference(&self, seat: Seat) -> i64 {
        i64::from(self.score(seat)) - i64::from(self.score(seat.opponent()))
    }

    pub fn leading_seat(&self) -> Option<Seat> {
        match self.difference(Seat::Ai) {
            0 => None,
            diff if diff > 0 => Some(Seat::Ai),
            _ => Some(Seat::Player),
        }
    }

    pub fn ledger(&mut self, seat: Seat) -> SeatLedger<'_> {
        SeatLedger { board: self, seat }
    }
}

impl Default for ScoreBoard {
    fn default() -> Self {
        Self::new()
    }
}

/// A `ScoreBoard` seen from one seat.
#[derive(Debug)]
pub struct SeatLedger<'a> {
    board: &'a mut ScoreBoard,
    seat: Seat,
}

impl SeatLedger<'_> {
    pub fn seat(&self) -> Seat {
        self.seat
    }
}

impl ScoreLedger for SeatLedger<'_> {
    fn commit_turn_score(&mut self, delta: u32) {
        self.board.add_points(self.seat, delta);
    }

    fn current_scores(&self) -> (u32, u32) {
        (
            self.board.score(self.seat),
            self.board.score(self.seat.opponent()),
        )
    }
}
