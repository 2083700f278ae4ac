//! Symbol alphabet and the 4-symbol sets that flow through a puzzle.

#![allow(missing_docs)]

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::permutation::{CODE_LEN, fisher_yates};

/// The six symbol kinds a puzzle draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Symbol {
    Circle,
    Square,
    Triangle,
    Diamond,
    Star,
    Hexagon,
}

impl Symbol {
    /// Full alphabet in canonical order.
    pub const ALL: [Self; 6] = [
        Self::Circle,
        Self::Square,
        Self::Triangle,
        Self::Diamond,
        Self::Star,
        Self::Hexagon,
    ];

    /// Single-cell glyph used by the terminal renderer.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Circle => '●',
            Self::Square => '■',
            Self::Triangle => '▲',
            Self::Diamond => '◆',
            Self::Star => '★',
            Self::Hexagon => '⬢',
        }
    }

    /// Lowercase name, matching the serde form.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::Square => "square",
            Self::Triangle => "triangle",
            Self::Diamond => "diamond",
            Self::Star => "star",
            Self::Hexagon => "hexagon",
        }
    }

    /// Presentation color hint. Renderers map this to their own palette.
    #[must_use]
    pub const fn color_name(self) -> &'static str {
        match self {
            Self::Circle => "blue",
            Self::Square => "red",
            Self::Triangle => "green",
            Self::Diamond => "yellow",
            Self::Star => "purple",
            Self::Hexagon => "orange",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered set of exactly four distinct symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolSet([Symbol; CODE_LEN]);

impl SymbolSet {
    /// Draw four distinct symbols in random order.
    ///
    /// Shuffles the whole alphabet with Fisher-Yates and keeps the first four,
    /// which is a uniform sample without replacement.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut alphabet = Symbol::ALL;
        fisher_yates(&mut alphabet, rng);
        Self([alphabet[0], alphabet[1], alphabet[2], alphabet[3]])
    }

    /// Build from explicit symbols. Returns `None` when any symbol repeats.
    #[must_use]
    pub fn new(symbols: [Symbol; CODE_LEN]) -> Option<Self> {
        for (i, a) in symbols.iter().enumerate() {
            if symbols[i + 1..].contains(a) {
                return None;
            }
        }
        Some(Self(symbols))
    }

    #[must_use]
    pub const fn symbols(&self) -> &[Symbol; CODE_LEN] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.0.iter().copied()
    }
}

impl fmt::Display for SymbolSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, s) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", s.glyph())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn random_sets_never_repeat_symbols() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let set = SymbolSet::random(&mut rng);
            assert!(SymbolSet::new(*set.symbols()).is_some(), "{set:?}");
        }
    }

    #[test]
    fn random_sets_reach_every_symbol() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.extend(SymbolSet::random(&mut rng).iter());
        }
        assert_eq!(seen.len(), Symbol::ALL.len());
    }

    #[test]
    fn new_rejects_duplicates() {
        use Symbol::{Circle, Square, Star, Triangle};
        assert!(SymbolSet::new([Circle, Square, Circle, Star]).is_none());
        assert!(SymbolSet::new([Circle, Square, Triangle, Star]).is_some());
    }

    #[test]
    fn display_uses_glyphs() {
        use Symbol::{Circle, Diamond, Square, Triangle};
        let set = SymbolSet::new([Circle, Square, Triangle, Diamond]).unwrap();
        assert_eq!(set.to_string(), "● ■ ▲ ◆");
    }

    #[test]
    fn serde_names_are_lowercase() {
        let json = serde_json::to_string(&Symbol::Hexagon).unwrap();
        assert_eq!(json, "\"hexagon\"");
    }
}
