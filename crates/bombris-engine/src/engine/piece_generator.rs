use std::{fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{EngineConfig, ParseSeedError, Piece};

/// Seed for deterministic piece generation.
///
/// This is a 128-bit (16-byte) seed used to initialize the random number
/// generator for piece generation. Using the same seed will produce the same
/// sequence of pieces, which makes games reproducible for debugging, saved
/// simulations and tests.
///
/// Seeds are written as 32 hex digits, both by [`Display`](fmt::Display) and
/// by serde.
///
/// # Example
///
/// ```
/// use bombris_engine::{BoardEngine, EngineConfig, PieceSeed};
/// use rand::Rng as _;
///
/// // Generate a random seed
/// let seed: PieceSeed = rand::rng().random();
///
/// // Two engines created with the same seed see the same pieces
/// let first = BoardEngine::with_seed(EngineConfig::default(), seed).unwrap();
/// let second = BoardEngine::with_seed(EngineConfig::default(), seed).unwrap();
/// assert_eq!(first.current_piece(), second.current_piece());
/// assert_eq!(first.next_piece(), second.next_piece());
///
/// let parsed: PieceSeed = seed.to_string().parse().unwrap();
/// assert_eq!(parsed, seed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceSeed([u8; 16]);

impl PieceSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0
    }
}

impl fmt::Display for PieceSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl FromStr for PieceSeed {
    type Err = ParseSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 32 {
            return Err(ParseSeedError::Length { len: s.len() });
        }
        let num = u128::from_str_radix(s, 16).map_err(ParseSeedError::Hex)?;
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
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows generating random `PieceSeed` values using the standard random distribution.
impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

/// Produces the stream of pieces for a game.
///
/// Each piece is a bomb with probability `bomb_percent`%, placed in a
/// uniformly random column at row 0. Otherwise it is one of the seven
/// tetrominoes, chosen uniformly and spawned centered at row 0.
///
/// The generator owns its RNG, and the RNG state is serializable so a
/// restored game continues with the same pieces it would have produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceGenerator {
    rng: Pcg32,
}

impl Default for PieceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceGenerator {
    /// Creates a generator with a random seed.
    ///
    /// For deterministic piece generation, use [`Self::with_seed`] instead.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.0),
        }
    }

    /// Generates the next piece for a board described by `config`.
    pub fn next_piece(&mut self, config: &EngineConfig) -> Piece {
        if self.rng.random_ratio(config.bomb_percent.min(100), 100) {
            let column = self.rng.random_range(0..config.width);
            return Piece::bomb(column);
        }
        Piece::spawn(self.rng.random(), config.width)
    }
}
