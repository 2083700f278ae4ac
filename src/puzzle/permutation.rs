//! Permutation engine: random 4-element permutation codes and their application.
//!
//! A code maps output position → input position, 1-indexed: `4321` means the
//! first output item is the fourth input item, and so on.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::symbol::SymbolSet;

/// Number of positions every code permutes.
pub const CODE_LEN: usize = 4;

/// A permutation of `1..=4`. Only constructible from a valid permutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "[u8; 4]", into = "[u8; 4]")]
pub struct PermutationCode([u8; CODE_LEN]);

/// Why a candidate code was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidCode(pub String);

impl fmt::Display for InvalidCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid permutation code: {}", self.0)
    }
}

impl std::error::Error for InvalidCode {}

impl PermutationCode {
    /// The identity permutation `1234`.
    pub const IDENTITY: Self = Self([1, 2, 3, 4]);

    /// Positions as 1-indexed input slots.
    #[must_use]
    pub const fn positions(&self) -> [u8; CODE_LEN] {
        self.0
    }

    /// Permute a symbol set. A permutation of distinct symbols stays distinct.
    #[must_use]
    pub fn apply_to_set(&self, set: &SymbolSet) -> SymbolSet {
        let symbols = set.symbols();
        let out = self.0.map(|p| symbols[usize::from(p) - 1]);
        SymbolSet::new(out).unwrap_or(*set)
    }
}

impl TryFrom<[u8; CODE_LEN]> for PermutationCode {
    type Error = InvalidCode;

    fn try_from(value: [u8; CODE_LEN]) -> Result<Self, Self::Error> {
        let mut seen = [false; CODE_LEN];
        for p in value {
            let idx = usize::from(p).wrapping_sub(1);
            if idx >= CODE_LEN || seen[idx] {
                return Err(InvalidCode(format!("{value:?}")));
            }
            seen[idx] = true;
        }
        Ok(Self(value))
    }
}

impl From<PermutationCode> for [u8; CODE_LEN] {
    fn from(value: PermutationCode) -> Self {
        value.0
    }
}

impl FromStr for PermutationCode {
    type Err = InvalidCode;

    /// Parse the display form, e.g. `"4321"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: Vec<u8> = s
            .trim()
            .chars()
            .map(|c| c.to_digit(10).and_then(|d| u8::try_from(d).ok()))
            .collect::<Option<_>>()
            .ok_or_else(|| InvalidCode(s.to_string()))?;
        let arr: [u8; CODE_LEN] = digits
            .try_into()
            .map_err(|_| InvalidCode(s.to_string()))?;
        Self::try_from(arr)
    }
}

impl fmt::Display for PermutationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for p in self.0 {
            write!(f, "{p}")?;
        }
        Ok(())
    }
}

/// Uniform in-place shuffle: walk from the last index down to 1, swapping
/// each slot with a uniformly chosen slot in `[0, i]`.
pub fn fisher_yates<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// Draw a uniformly random permutation of `1..=4`.
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> PermutationCode {
    let mut positions = [1, 2, 3, 4];
    fisher_yates(&mut positions, rng);
    PermutationCode(positions)
}

/// Reorder `items` so output position k holds `items[code[k] - 1]`.
///
/// Precondition: `items.len() >= 4`. Violating it is a caller bug and panics
/// on the out-of-range index.
#[must_use]
pub fn apply_permutation<T: Clone>(items: &[T], code: &PermutationCode) -> Vec<T> {
    code.0
        .iter()
        .map(|&p| items[usize::from(p) - 1].clone())
        .collect()
}
