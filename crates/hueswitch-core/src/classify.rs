#![forbid(unsafe_code)]

//! Structural detection of per-theme maps in untyped input.
//!
//! Typed configs tag per-theme values explicitly ([`RawValue::Themed`] and
//! [`RawValue::ThemedTree`]). Documents loaded from TOML or JSON carry no
//! such tag, so a plain map has to be classified by its keys. All of that
//! logic lives in [`is_themed_map`] and [`classify_map`]; nothing else in the
//! crate inspects map shapes.
//!
//! [`RawValue::Themed`]: crate::RawValue::Themed
//! [`RawValue::ThemedTree`]: crate::RawValue::ThemedTree

use crate::key::ThemeSet;

/// Reserved map key supplying the explicit default of a themed value.
pub const DEFAULT_KEY: &str = "$default";

/// What an untyped map entry holds, as far as classification cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryShape {
    /// String, number, or boolean.
    Scalar,
    /// A nested map.
    Map,
    /// Anything else (array, null).
    Other,
}

/// How an untyped map should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapKind {
    /// Ordinary nested config.
    Nested,
    /// One leaf per theme. Entries that are not scalars are an error.
    ThemedLeaves,
    /// One subtree per theme.
    ThemedTrees,
}

/// Whether a map with these keys is per-theme rather than nested config.
///
/// A map is per-theme when all of the following hold:
/// - it has at least one key,
/// - it has no more theme keys than there are known themes,
/// - every key is a known theme (or [`DEFAULT_KEY`]).
///
/// Values play no part: a per-theme map of nested maps is still per-theme.
/// A map mixing theme keys with other keys is nested config.
pub fn is_themed_map<'a, I>(keys: I, themes: &ThemeSet) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    let mut theme_entries = 0usize;
    let mut any = false;
    for key in keys {
        any = true;
        if key == DEFAULT_KEY {
            continue;
        }
        if !themes.contains(key) {
            return false;
        }
        theme_entries += 1;
        if theme_entries > themes.len() {
            return false;
        }
    }
    any
}

/// Classify a map from its keys and entry shapes.
///
/// Per-theme maps whose entries are all maps become [`MapKind::ThemedTrees`];
/// every other per-theme map is [`MapKind::ThemedLeaves`].
pub fn classify_map(entries: &[(&str, EntryShape)], themes: &ThemeSet) -> MapKind {
    if !is_themed_map(entries.iter().map(|(key, _)| *key), themes) {
        return MapKind::Nested;
    }
    if entries.iter().all(|(_, shape)| *shape == EntryShape::Map) {
        MapKind::ThemedTrees
    } else {
        MapKind::ThemedLeaves
    }
}
