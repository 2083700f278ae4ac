//! SWC-prefixed error types with structured error codes.
//!
//! Game logic itself never fails: guards are silent no-ops and level indices
//! clamp. Errors only surface at the edges (config, catalog, log and
//! terminal I/O).

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, SwcError>;

/// Top-level error type for Switch Challenge.
#[derive(Debug, Error)]
pub enum SwcError {
    #[error("[SWC-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[SWC-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[SWC-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[SWC-1101] invalid level catalog: {details}")]
    InvalidCatalog { details: String },

    #[error("[SWC-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[SWC-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[SWC-3101] terminal failure: {source}")]
    Terminal {
        #[source]
        source: std::io::Error,
    },

    #[error("[SWC-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl SwcError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "SWC-1001",
            Self::MissingConfig { .. } => "SWC-1002",
            Self::ConfigParse { .. } => "SWC-1003",
            Self::InvalidCatalog { .. } => "SWC-1101",
            Self::Serialization { .. } => "SWC-2101",
            Self::Io { .. } => "SWC-3002",
            Self::Terminal { .. } => "SWC-3101",
            Self::Runtime { .. } => "SWC-3900",
        }
    }

    /// Whether the failure originates from user-supplied input (config or
    /// catalog) rather than the environment.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig { .. }
                | Self::MissingConfig { .. }
                | Self::ConfigParse { .. }
                | Self::InvalidCatalog { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<serde_json::Error> for SwcError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for SwcError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_unique() {
        let errors: Vec<SwcError> = vec![
            SwcError::InvalidConfig {
                details: String::new(),
            },
            SwcError::MissingConfig {
                path: PathBuf::new(),
            },
            SwcError::ConfigParse {
                context: "",
                details: String::new(),
            },
            SwcError::InvalidCatalog {
                details: String::new(),
            },
            SwcError::Serialization {
                context: "",
                details: String::new(),
            },
            SwcError::Io {
                path: PathBuf::new(),
                source: std::io::Error::other("test"),
            },
            SwcError::Terminal {
                source: std::io::Error::other("test"),
            },
            SwcError::Runtime {
                details: String::new(),
            },
        ];

        let codes: Vec<&str> = errors.iter().map(SwcError::code).collect();
        let unique: std::collections::HashSet<&&str> = codes.iter().collect();
        assert_eq!(
            codes.len(),
            unique.len(),
            "error codes must be unique: {codes:?}"
        );
    }

    #[test]
    fn display_includes_code_prefix() {
        let err = SwcError::InvalidCatalog {
            details: "level 3 has no mystery layer".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("[SWC-1101]"), "{msg}");
        assert!(msg.contains("level 3"));
    }

    #[test]
    fn user_errors_are_classified() {
        assert!(
            SwcError::MissingConfig {
                path: PathBuf::from("/x")
            }
            .is_user_error()
        );
        assert!(!SwcError::io("/x", std::io::Error::other("boom")).is_user_error());
    }

    #[test]
    fn toml_error_converts_to_config_parse() {
        let parsed: std::result::Result<toml::Value, _> = toml::from_str("= broken");
        let err: SwcError = parsed.unwrap_err().into();
        assert_eq!(err.code(), "SWC-1003");
    }
}
