//! Puzzle generation: symbols, permutation codes, decoys, levels, builder.

pub mod builder;
pub mod decoy;
pub mod level;
pub mod permutation;
pub mod symbol;
