//! Puzzle composition: input set, layer chain, output set.

#![allow(missing_docs)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::decoy::{OPTION_COUNT, generate_options};
use super::level::{LayerKind, LevelCatalog, LevelConfig};
use super::permutation::{PermutationCode, generate_code};
use super::symbol::SymbolSet;

/// One stage of a puzzle's transformation chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    pub kind: LayerKind,
    /// True code of this stage.
    pub code: PermutationCode,
    /// Candidate codes in display order. Present only for mystery layers.
    pub options: Option<[PermutationCode; OPTION_COUNT]>,
    pub is_solved: bool,
    /// Last code the player submitted for this layer.
    pub user_selected: Option<PermutationCode>,
}

impl Layer {
    #[must_use]
    pub fn is_mystery(&self) -> bool {
        self.kind == LayerKind::Mystery
    }

    /// Whether the renderer may show the true code.
    #[must_use]
    pub fn is_revealed(&self) -> bool {
        !self.is_mystery() || self.is_solved
    }

    /// Mystery layers that still need an answer.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.is_mystery() && !self.is_solved
    }
}

/// A full challenge instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Puzzle {
    pub id: u64,
    pub input: SymbolSet,
    pub output: SymbolSet,
    pub layers: Vec<Layer>,
    pub total_mystery: usize,
    pub level: LevelConfig,
}

impl Puzzle {
    /// Symbol set after each layer, in chain order. The last entry is `output`.
    #[must_use]
    pub fn intermediate_sets(&self) -> Vec<SymbolSet> {
        let mut current = self.input;
        self.layers
            .iter()
            .map(|layer| {
                current = layer.code.apply_to_set(&current);
                current
            })
            .collect()
    }

    #[must_use]
    pub fn solved_mystery_count(&self) -> usize {
        self.layers
            .iter()
            .filter(|l| l.is_mystery() && l.is_solved)
            .count()
    }

    /// First mystery layer still waiting for an answer.
    #[must_use]
    pub fn focus_layer(&self) -> Option<usize> {
        self.layers.iter().position(Layer::is_open)
    }
}

/// Builds puzzles from a level catalog with its own random source.
#[derive(Debug, Clone)]
pub struct PuzzleBuilder {
    catalog: LevelCatalog,
    rng: StdRng,
    next_id: u64,
}

impl PuzzleBuilder {
    /// Seeded builders reproduce the same puzzle sequence; unseeded ones draw
    /// from the OS.
    #[must_use]
    pub fn new(catalog: LevelCatalog, seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        let next_id = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0);
        Self {
            catalog,
            rng,
            next_id,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &LevelCatalog {
        &self.catalog
    }

    /// Shared random source for progression decisions.
    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Compose a puzzle for `level_index`, clamped into the catalog.
    pub fn generate_puzzle(&mut self, level_index: usize) -> Puzzle {
        let level = self.catalog.get(level_index).clone();
        let input = SymbolSet::random(&mut self.rng);

        let mut current = input;
        let mut total_mystery = 0;
        let layers: Vec<Layer> = level
            .structure
            .iter()
            .map(|&kind| {
                let code = generate_code(&mut self.rng);
                current = code.apply_to_set(&current);
                let options = match kind {
                    LayerKind::Mystery => {
                        total_mystery += 1;
                        Some(generate_options(code, &mut self.rng))
                    }
                    LayerKind::Fixed => None,
                };
                Layer {
                    kind,
                    code,
                    options,
                    is_solved: false,
                    user_selected: None,
                }
            })
            .collect();

        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);

        Puzzle {
            id,
            input,
            output: current,
            layers,
            total_mystery,
            level,
        }
    }

    /// Uniform index in `range`, used by weighted level picks.
    pub(crate) fn random_index(&mut self, range: std::ops::RangeInclusive<usize>) -> usize {
        self.rng.random_range(range)
    }

    pub(crate) fn random_bool(&mut self, p: f64) -> bool {
        self.rng.random_bool(p.clamp(0.0, 1.0))
    }
}
