//! Level progression rules between rounds.

use crate::puzzle::builder::PuzzleBuilder;

use super::model::PracticeType;

/// First index of the "harder" sub-range favoured by the random phase.
pub const HARDER_FLOOR: usize = 2;

/// Where the next practice round should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelPick {
    Index(usize),
    /// Draw a weighted-random level.
    Weighted,
}

/// Assessment rule: climb one level on success, capped at the top.
#[must_use]
pub fn assessment_next_level(current: usize, max_index: usize, success: bool) -> usize {
    if success && current < max_index {
        current + 1
    } else {
        current
    }
}

/// Practice rule shared by auto-advance after a success and the explicit
/// "next" request.
///
/// Returns the pick and the random-phase flag after this step. Random
/// practice enters the random phase once it is already there or standing on
/// the last level, whatever the last outcome was.
#[must_use]
pub fn practice_next_level(
    practice_type: PracticeType,
    current: usize,
    max_index: usize,
    last_correct: bool,
    random_phase: bool,
) -> (LevelPick, bool) {
    match practice_type {
        PracticeType::Progressive => (
            LevelPick::Index(assessment_next_level(current, max_index, last_correct)),
            random_phase,
        ),
        PracticeType::Level => (LevelPick::Index(current), random_phase),
        PracticeType::Random => {
            if random_phase || current >= max_index {
                (LevelPick::Weighted, true)
            } else {
                (
                    LevelPick::Index(assessment_next_level(current, max_index, last_correct)),
                    false,
                )
            }
        }
    }
}

/// Weighted level draw: `harder_weight` of the time uniform over
/// `[HARDER_FLOOR, last]`, otherwise uniform over `[0, HARDER_FLOOR - 1]`.
/// Catalogs too small to split draw uniformly over everything.
pub fn weighted_random_level(builder: &mut PuzzleBuilder, harder_weight: f64) -> usize {
    let max_index = builder.catalog().max_index();
    if max_index < HARDER_FLOOR {
        return builder.random_index(0..=max_index);
    }
    if builder.random_bool(harder_weight) {
        builder.random_index(HARDER_FLOOR..=max_index)
    } else {
        builder.random_index(0..=HARDER_FLOOR - 1)
    }
}

/// Resolve a pick into a concrete index.
pub fn resolve_pick(pick: LevelPick, builder: &mut PuzzleBuilder, harder_weight: f64) -> usize {
    match pick {
        LevelPick::Index(i) => builder.catalog().clamp_index(i),
        LevelPick::Weighted => weighted_random_level(builder, harder_weight),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::level::{LayerKind, LevelCatalog, LevelConfig};

    #[test]
    fn assessment_climbs_and_saturates() {
        assert_eq!(assessment_next_level(0, 10, true), 1);
        assert_eq!(assessment_next_level(10, 10, true), 10);
        assert_eq!(assessment_next_level(4, 10, false), 4);
    }

    #[test]
    fn progressive_practice_matches_assessment_rule() {
        let (pick, phase) = practice_next_level(PracticeType::Progressive, 3, 10, true, false);
        assert_eq!(pick, LevelPick::Index(4));
        assert!(!phase);
        let (pick, _) = practice_next_level(PracticeType::Progressive, 3, 10, false, false);
        assert_eq!(pick, LevelPick::Index(3));
    }

    #[test]
    fn level_practice_never_moves() {
        for correct in [true, false] {
            let (pick, _) = practice_next_level(PracticeType::Level, 5, 10, correct, false);
            assert_eq!(pick, LevelPick::Index(5));
        }
    }

    #[test]
    fn random_practice_climbs_then_switches_to_weighted() {
        let (pick, phase) = practice_next_level(PracticeType::Random, 9, 10, true, false);
        assert_eq!(pick, LevelPick::Index(10));
        assert!(!phase);

        let (pick, phase) = practice_next_level(PracticeType::Random, 10, 10, true, false);
        assert_eq!(pick, LevelPick::Weighted);
        assert!(phase);
    }

    #[test]
    fn random_practice_failure_at_top_enters_random_phase() {
        let (pick, phase) = practice_next_level(PracticeType::Random, 10, 10, false, false);
        assert_eq!(pick, LevelPick::Weighted);
        assert!(phase);
    }

    #[test]
    fn random_phase_is_sticky_even_on_low_levels() {
        let (pick, phase) = practice_next_level(PracticeType::Random, 0, 10, false, true);
        assert_eq!(pick, LevelPick::Weighted);
        assert!(phase);
    }

    #[test]
    #[allow(clippy::cast_precision_loss)]
    fn weighted_draw_favours_harder_levels() {
        let mut builder = PuzzleBuilder::new(LevelCatalog::builtin(), Some(99));
        let draws = 1_000;
        let mut harder = 0;
        for _ in 0..draws {
            let idx = weighted_random_level(&mut builder, 0.8);
            assert!(idx <= 10);
            if idx >= HARDER_FLOOR {
                harder += 1;
            }
        }
        let ratio = f64::from(harder) / f64::from(draws);
        assert!((0.74..=0.86).contains(&ratio), "harder ratio {ratio}");
    }

    #[test]
    fn weighted_draw_on_tiny_catalog_is_uniform_over_all() {
        let catalog = LevelCatalog::new(vec![
            LevelConfig {
                id: 1,
                structure: vec![LayerKind::Mystery],
                points: 100,
                label: "a".into(),
            },
            LevelConfig {
                id: 2,
                structure: vec![LayerKind::Mystery, LayerKind::Mystery],
                points: 200,
                label: "b".into(),
            },
        ])
        .unwrap();
        let mut builder = PuzzleBuilder::new(catalog, Some(1));
        let mut seen = [0u32; 2];
        for _ in 0..400 {
            seen[weighted_random_level(&mut builder, 1.0)] += 1;
        }
        assert!(seen.iter().all(|&n| n > 100), "{seen:?}");
    }
}
