//! Level definitions and the validated level catalog.

#![allow(missing_docs)]

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, SwcError};

/// Upper bound on layers per level. Longer chains are unreadable on screen.
pub const MAX_LAYERS: usize = 8;

/// Kind of a stage in the transformation chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerKind {
    /// Code always visible.
    #[serde(rename = "F")]
    Fixed,
    /// Code hidden until the player picks it.
    #[serde(rename = "M")]
    Mystery,
}

impl LayerKind {
    #[must_use]
    pub const fn tag(self) -> char {
        match self {
            Self::Fixed => 'F',
            Self::Mystery => 'M',
        }
    }
}

/// Static definition of one difficulty tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub id: u32,
    pub structure: Vec<LayerKind>,
    pub points: u32,
    pub label: String,
}

impl LevelConfig {
    fn new(id: u32, structure: &[LayerKind], points: u32, label: &str) -> Self {
        Self {
            id,
            structure: structure.to_vec(),
            points,
            label: label.to_string(),
        }
    }

    /// Number of mystery layers the player must solve.
    #[must_use]
    pub fn mystery_count(&self) -> usize {
        self.structure
            .iter()
            .filter(|k| **k == LayerKind::Mystery)
            .count()
    }

    /// Compact structure string such as `"FMMF"`.
    #[must_use]
    pub fn structure_tag(&self) -> String {
        self.structure.iter().map(|k| k.tag()).collect()
    }
}

impl fmt::Display for LevelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Level {}: {}", self.id, self.label)
    }
}

/// Ordered, validated list of levels. Index 0 is the easiest.
///
/// Every level has at least one mystery layer, so a round can always be
/// completed by answering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LevelConfig>", into = "Vec<LevelConfig>")]
pub struct LevelCatalog {
    levels: Vec<LevelConfig>,
}

impl LevelCatalog {
    /// Validate and wrap a list of levels.
    pub fn new(levels: Vec<LevelConfig>) -> Result<Self> {
        if levels.is_empty() {
            return Err(SwcError::InvalidCatalog {
                details: "catalog must contain at least one level".to_string(),
            });
        }

        let mut ids = HashSet::new();
        for level in &levels {
            if !ids.insert(level.id) {
                return Err(SwcError::InvalidCatalog {
                    details: format!("duplicate level id {}", level.id),
                });
            }
            if level.structure.is_empty() || level.structure.len() > MAX_LAYERS {
                return Err(SwcError::InvalidCatalog {
                    details: format!(
                        "level {} must have 1..={MAX_LAYERS} layers, got {}",
                        level.id,
                        level.structure.len()
                    ),
                });
            }
            if level.mystery_count() == 0 {
                return Err(SwcError::InvalidCatalog {
                    details: format!("level {} has no mystery layer", level.id),
                });
            }
            if level.points == 0 {
                return Err(SwcError::InvalidCatalog {
                    details: format!("level {} must award points > 0", level.id),
                });
            }
        }

        Ok(Self { levels })
    }

    /// The reference 11-level catalog.
    #[must_use]
    pub fn builtin() -> Self {
        use LayerKind::{Fixed as F, Mystery as M};
        Self {
            levels: vec![
                LevelConfig::new(1, &[M], 100, "Basic Single Switch"),
                LevelConfig::new(2, &[F, M], 200, "Fixed -> Mystery"),
                LevelConfig::new(3, &[M, F], 200, "Mystery -> Fixed"),
                LevelConfig::new(4, &[F, M, F], 300, "Fixed -> Mystery -> Fixed"),
                LevelConfig::new(5, &[F, F, M], 350, "Double Fixed -> Mystery"),
                LevelConfig::new(6, &[M, F, F], 350, "Mystery -> Double Fixed"),
                LevelConfig::new(7, &[M, M], 500, "Double Mystery"),
                LevelConfig::new(8, &[F, M, M], 600, "Fixed -> Double Mystery"),
                LevelConfig::new(9, &[M, M, F], 600, "Double Mystery -> Fixed"),
                LevelConfig::new(10, &[F, M, M, F], 800, "Hard Core Chain"),
                LevelConfig::new(11, &[F, M, F, M], 1000, "Expert Mixed"),
            ],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Always false for a validated catalog.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Index of the hardest level.
    #[must_use]
    pub fn max_index(&self) -> usize {
        self.levels.len() - 1
    }

    /// Clamp any index into the valid range.
    #[must_use]
    pub fn clamp_index(&self, index: usize) -> usize {
        index.min(self.max_index())
    }

    /// Level at `index`, clamped into range.
    #[must_use]
    pub fn get(&self, index: usize) -> &LevelConfig {
        &self.levels[self.clamp_index(index)]
    }

    pub fn iter(&self) -> impl Iterator<Item = &LevelConfig> {
        self.levels.iter()
    }
}

impl Default for LevelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TryFrom<Vec<LevelConfig>> for LevelCatalog {
    type Error = SwcError;

    fn try_from(value: Vec<LevelConfig>) -> Result<Self> {
        Self::new(value)
    }
}

impl From<LevelCatalog> for Vec<LevelConfig> {
    fn from(value: LevelCatalog) -> Self {
        value.levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_passes_validation() {
        let builtin = LevelCatalog::builtin();
        let revalidated = LevelCatalog::new(builtin.iter().cloned().collect()).unwrap();
        assert_eq!(revalidated.len(), 11);
    }

    #[test]
    fn builtin_catalog_shape() {
        let cat = LevelCatalog::builtin();
        let ids: Vec<u32> = cat.iter().map(|l| l.id).collect();
        assert_eq!(ids, (1..=11).collect::<Vec<_>>());
        assert_eq!(cat.get(0).points, 100);
        assert_eq!(cat.get(10).points, 1000);
        assert_eq!(cat.get(9).structure_tag(), "FMMF");
        assert!(cat.iter().all(|l| (1..=4).contains(&l.structure.len())));
    }

    #[test]
    fn get_clamps_out_of_range() {
        let cat = LevelCatalog::builtin();
        assert_eq!(cat.get(99).id, 11);
        assert_eq!(cat.clamp_index(usize::MAX), 10);
    }

    #[test]
    fn zero_mystery_level_rejected() {
        let err = LevelCatalog::new(vec![LevelConfig::new(
            1,
            &[LayerKind::Fixed, LayerKind::Fixed],
            100,
            "all fixed",
        )])
        .unwrap_err();
        assert!(err.to_string().contains("no mystery layer"), "{err}");
    }

    #[test]
    fn empty_and_duplicate_catalogs_rejected() {
        assert!(LevelCatalog::new(Vec::new()).is_err());
        let dup = vec![
            LevelConfig::new(1, &[LayerKind::Mystery], 100, "a"),
            LevelConfig::new(1, &[LayerKind::Mystery], 100, "b"),
        ];
        let err = LevelCatalog::new(dup).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn oversized_structure_rejected() {
        let err = LevelCatalog::new(vec![LevelConfig::new(
            1,
            &[LayerKind::Mystery; MAX_LAYERS + 1],
            100,
            "long",
        )])
        .unwrap_err();
        assert_eq!(err.code(), "SWC-1101");
    }

    #[test]
    fn catalog_deserializes_from_toml_with_validation() {
        #[derive(Deserialize)]
        struct Wrapper {
            levels: LevelCatalog,
        }
        let ok: Wrapper = toml::from_str(
            r#"
            [[levels]]
            id = 1
            structure = ["F", "M"]
            points = 150
            label = "custom"
            "#,
        )
        .unwrap();
        assert_eq!(ok.levels.get(0).mystery_count(), 1);

        let bad = toml::from_str::<Wrapper>(
            r#"
            [[levels]]
            id = 1
            structure = ["F"]
            points = 150
            label = "broken"
            "#,
        );
        assert!(bad.is_err());
    }
}
