#![forbid(unsafe_code)]

//! Theme configuration core for hueswitch.
//!
//! # Role in hueswitch
//! `hueswitch-core` is the pure, non-reactive half of the theming layer:
//! it knows which themes exist, how multi-theme config is written, how a
//! config is resolved for one theme, and how a resolved config is merged
//! into another in place. The reactive half (observable theme state, lazy
//! stylesheets, consumer bindings) lives in `hueswitch-runtime`.
//!
//! # This crate provides
//! - [`ThemeKey`] and [`ThemeSet`] for theme identity.
//! - [`RawTree`] / [`ThemedValue`] / [`ThemedTree`] for multi-theme config and
//!   [`ConfigTree`] for resolved config.
//! - [`resolve`] and [`validate`] for turning the former into the latter.
//! - [`deep_merge`] for in-place updates of a resolved tree.
//! - [`ThemeDocument`] for TOML/JSON theme files (feature `serde`).
//!
//! # Example
//!
//! ```
//! use hueswitch_core::{ConfigTree, RawTree, ThemeSet, resolve};
//!
//! let themes = ThemeSet::new(["light", "dark"]).unwrap();
//! let raw = RawTree::new()
//!     .themed("color", [("light", "white"), ("dark", "black")])
//!     .leaf("size", 10);
//!
//! let dark = resolve(&raw, &"dark".into(), &themes);
//! assert_eq!(dark, ConfigTree::new().with("color", "black").with("size", 10));
//! ```

pub mod classify;
#[cfg(feature = "serde")]
pub mod document;
pub mod error;
pub mod key;
pub mod merge;
pub mod resolve;
pub mod value;

pub use classify::{DEFAULT_KEY, EntryShape, MapKind, classify_map, is_themed_map};
#[cfg(feature = "serde")]
pub use document::{ThemeDocument, raw_tree_from_json};
pub use error::{Result, ThemeError};
pub use key::{ThemeKey, ThemeSet};
pub use merge::deep_merge;
pub use resolve::{resolve, validate};
pub use value::{ConfigTree, ConfigValue, Leaf, RawTree, RawValue, ThemedTree, ThemedValue};
