#![forbid(unsafe_code)]

//! hueswitch public facade crate.
//!
//! Runtime theme switching for UI code: declare each config value once per
//! theme, read a single live config, and switch themes without re-fetching
//! anything. This crate re-exports the stable surface of `hueswitch-core`
//! and `hueswitch-runtime` and offers a prelude for day-to-day use.
//!
//! ```
//! use hueswitch::prelude::*;
//!
//! let factory = create_theme_factory(
//!     ThemeSet::new(["light", "dark"])?,
//!     RawTree::new()
//!         .themed("color", [("light", "white"), ("dark", "black")])
//!         .leaf("size", 10),
//!     None,
//! )?;
//!
//! let config = factory.config();
//! assert_eq!(config.str("color").as_deref(), Some("white"));
//!
//! factory.set_current_theme("dark")?;
//! assert_eq!(config.str("color").as_deref(), Some("black"));
//! assert_eq!(config.number("size"), Some(10.0));
//! # Ok::<(), hueswitch::Error>(())
//! ```

mod error;

// --- Core re-exports -------------------------------------------------------

pub use hueswitch_core::{
    ConfigTree, ConfigValue, DEFAULT_KEY, Leaf, RawTree, RawValue, ThemeError, ThemeKey, ThemeSet,
    ThemedTree, ThemedValue, deep_merge, resolve, validate,
};
#[cfg(feature = "serde")]
pub use hueswitch_core::{ThemeDocument, raw_tree_from_json};

// --- Runtime re-exports ----------------------------------------------------

pub use hueswitch_runtime::{
    ConfigNode, Mount, Observable, StyleMap, Subscription, ThemeConfig, ThemeFactory,
    ThemeFactoryBuilder, ThemedStyleSheet, WithTheme,
};

// --- Errors ---------------------------------------------------------------

pub use error::{Error, Result};

// --- Entry points ---------------------------------------------------------

/// Create a theme factory over `raw` with `themes` as the known themes.
///
/// `default` is the theme active at startup; the first theme of the set is
/// used when it is `None`.
pub fn create_theme_factory(
    themes: ThemeSet,
    raw: RawTree,
    default: Option<ThemeKey>,
) -> Result<ThemeFactory> {
    Ok(ThemeFactory::new(themes, raw, default)?)
}

/// Load a theme document from disk and build a factory from it.
///
/// Files ending in `.json` are parsed as JSON, everything else as TOML.
#[cfg(feature = "serde")]
pub fn load_theme_factory(path: impl AsRef<std::path::Path>) -> Result<ThemeFactory> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let document = if is_json {
        ThemeDocument::from_json_file(path)
    } else {
        ThemeDocument::from_toml_file(path)
    }
    .map_err(|source| Error::Load {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), themes = document.themes.len(), "loaded theme document");
    Ok(ThemeFactory::from_document(document)?)
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        ConfigNode, Error, Leaf, Mount, RawTree, Result, StyleMap, ThemeConfig, ThemeFactory,
        ThemeKey, ThemeSet, ThemedStyleSheet, ThemedTree, ThemedValue, create_theme_factory,
    };

    #[cfg(feature = "serde")]
    pub use crate::{ThemeDocument, load_theme_factory};

    pub use crate::{core, runtime};
}

pub use hueswitch_core as core;
pub use hueswitch_runtime as runtime;
