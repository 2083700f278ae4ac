//! Decoy generation for mystery layers.

use rand::Rng;

use super::permutation::{PermutationCode, fisher_yates, generate_code};

/// Number of options offered for each mystery layer.
pub const OPTION_COUNT: usize = 4;

/// Build the option list for a mystery layer: the true code plus three
/// distinct random decoys, in uniformly shuffled display order.
pub fn generate_options<R: Rng + ?Sized>(
    truth: PermutationCode,
    rng: &mut R,
) -> [PermutationCode; OPTION_COUNT] {
    let mut options = Vec::with_capacity(OPTION_COUNT);
    options.push(truth);
    while options.len() < OPTION_COUNT {
        let decoy = generate_code(rng);
        if !options.contains(&decoy) {
            options.push(decoy);
        }
    }

    let mut options = [options[0], options[1], options[2], options[3]];
    fisher_yates(&mut options, rng);
    options
}
