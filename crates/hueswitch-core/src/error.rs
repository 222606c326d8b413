#![forbid(unsafe_code)]

//! Error type shared by theme validation, resolution, and document loading.

use thiserror::Error;

/// Errors raised while building theme sets, validating configs, switching
/// themes, or loading theme documents.
#[derive(Debug, Error)]
pub enum ThemeError {
    /// A theme set must name at least one theme.
    #[error("theme set is empty")]
    EmptyThemeSet,

    /// A theme key appeared twice in a theme set.
    #[error("duplicate theme key `{0}`")]
    DuplicateTheme(String),

    /// A theme key that is not part of the configured theme set.
    #[error("unknown theme `{0}`")]
    UnknownTheme(String),

    /// A themed value names a theme outside the configured set.
    #[error("themed value at `{path}` names unknown theme `{key}`")]
    UnknownThemedKey { path: String, key: String },

    /// A themed value with no entries and no default cannot resolve.
    #[error("themed value at `{path}` has no entries and no default")]
    EmptyThemedValue { path: String },

    /// A themed subtree whose variants do not share one key layout.
    #[error("themed subtree at `{path}`: variant `{theme}` has a different layout from the first variant")]
    ThemedShapeMismatch { path: String, theme: String },

    /// A document value that has no config-tree representation.
    #[error("unsupported {kind} value at `{path}`")]
    UnsupportedValue { path: String, kind: &'static str },

    /// I/O failure reading a theme document.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse failure.
    #[cfg(feature = "serde")]
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON parse failure.
    #[cfg(feature = "serde")]
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for theme operations.
pub type Result<T> = std::result::Result<T, ThemeError>;
