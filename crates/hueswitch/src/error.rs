#![forbid(unsafe_code)]

use std::path::PathBuf;

use hueswitch_core::ThemeError;
use thiserror::Error;

/// Top-level error type for hueswitch users.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid theme set, config, or theme switch.
    #[error(transparent)]
    Theme(#[from] ThemeError),

    /// A theme document could not be read or parsed.
    #[error("failed to load theme document {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: ThemeError,
    },
}

/// Standard result type for hueswitch APIs.
pub type Result<T> = std::result::Result<T, Error>;
