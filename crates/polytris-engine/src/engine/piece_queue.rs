use std::{fmt, mem, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::{CellPosition, Piece};

/// Preview queue holding the two pieces after the falling one.
///
/// New pieces are generated into the `next-next` slot. Dequeuing hands out the
/// `next` piece, moves `next-next` up into the `next` slot and generates a fresh
/// `next-next`. Queued pieces sit off the board at their preview slots and are never
/// position-corrected.
///
/// # Example
///
/// ```
/// use polytris_engine::{PieceQueue, PieceSeed};
///
/// let seed: PieceSeed = "000102030405060708090a0b0c0d0e0f".parse().unwrap();
/// let mut queue = PieceQueue::with_seed(seed);
///
/// let upcoming = *queue.next_next().shape();
/// let _first = queue.pop();
/// assert_eq!(queue.next().shape(), &upcoming);
/// ```
#[derive(Debug, Clone)]
pub struct PieceQueue {
    rng: Pcg32,
    next: Piece,
    next_next: Piece,
}

impl Default for PieceQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceQueue {
    /// Preview slot of the piece that falls next.
    pub const NEXT_POSITION: CellPosition = CellPosition::new(12, 13);
    /// Preview slot of the piece after that.
    pub const NEXT_NEXT_POSITION: CellPosition = CellPosition::new(12, 9);

    /// Creates a queue with a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for deterministic generation.
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        let mut rng = Pcg32::from_seed(seed.0);
        let first = Self::generate(&mut rng);
        let next_next = Self::generate(&mut rng);
        Self {
            rng,
            next: Self::shifted(first),
            next_next,
        }
    }

    fn generate(rng: &mut Pcg32) -> Piece {
        Piece::new(rng.random(), Self::NEXT_NEXT_POSITION)
    }

    fn shifted(mut piece: Piece) -> Piece {
        let from = Self::NEXT_NEXT_POSITION;
        let to = Self::NEXT_POSITION;
        let position = piece
            .position()
            .offset(to.col() - from.col(), to.row() - from.row());
        piece.set_position(position);
        piece
    }

    #[must_use]
    pub fn next(&self) -> &Piece {
        &self.next
    }

    #[must_use]
    pub fn next_next(&self) -> &Piece {
        &self.next_next
    }

    /// Removes the `next` piece and refills the queue behind it.
    pub fn pop(&mut self) -> Piece {
        let fresh = Self::generate(&mut self.rng);
        let advanced = mem::replace(&mut self.next_next, fresh);
        mem::replace(&mut self.next, Self::shifted(advanced))
    }
}

/// Seed for deterministic piece generation.
///
/// A 128-bit seed written as 32 hexadecimal digits. The same seed always yields the
/// same sequence of shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceSeed([u8; 16]);

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("invalid piece seed {input:?}: expected 32 hexadecimal digits")]
pub struct ParsePieceSeedError {
    input: String,
}

impl fmt::Display for PieceSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl FromStr for PieceSeed {
    type Err = ParsePieceSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || ParsePieceSeedError {
            input: s.to_owned(),
        };
        if s.len() != 32 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(error());
        }
        let num = u128::from_str_radix(s, 16).map_err(|_| error())?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}
