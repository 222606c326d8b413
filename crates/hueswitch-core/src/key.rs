#![forbid(unsafe_code)]

//! Theme identifiers and the fixed set of known themes.

use std::borrow::Borrow;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexSet;

use crate::error::{Result, ThemeError};

/// Identifier selecting which variant of config values is active.
///
/// Keys compare by their string form. Integer keys are stored as their
/// decimal representation so that `ThemeKey::from(1)` matches a config map
/// key written as `"1"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThemeKey(Rc<str>);

impl ThemeKey {
    /// Create a key from any string-like value.
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Rc::from(name.as_ref()))
    }

    /// The key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThemeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ThemeKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ThemeKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ThemeKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ThemeKey {
    fn from(name: String) -> Self {
        Self(Rc::from(name))
    }
}

impl From<&String> for ThemeKey {
    fn from(name: &String) -> Self {
        Self::new(name)
    }
}

macro_rules! theme_key_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ThemeKey {
                fn from(value: $ty) -> Self {
                    Self::from(value.to_string())
                }
            }
        )*
    };
}

theme_key_from_int!(u8, u16, u32, u64, usize, i8, i16, i32, i64);

/// The ordered, non-empty set of themes a factory knows about.
///
/// Order matters: the first key is the default theme when none is given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeSet {
    keys: IndexSet<ThemeKey>,
}

impl ThemeSet {
    /// Build a theme set, rejecting empty input and duplicate keys.
    pub fn new<I, K>(keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = K>,
        K: Into<ThemeKey>,
    {
        let mut set = IndexSet::new();
        for key in keys {
            let key = key.into();
            if set.contains(&key) {
                return Err(ThemeError::DuplicateTheme(key.to_string()));
            }
            set.insert(key);
        }
        if set.is_empty() {
            return Err(ThemeError::EmptyThemeSet);
        }
        Ok(Self { keys: set })
    }

    /// Whether `key` is one of the known themes.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Look up the canonical key for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ThemeKey> {
        self.keys.get(name)
    }

    /// Number of known themes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Always false; kept for API symmetry with collections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The first declared theme.
    #[must_use]
    pub fn first(&self) -> &ThemeKey {
        // Non-empty by construction.
        &self.keys[0]
    }

    /// Iterate themes in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ThemeKey> {
        self.keys.iter()
    }
}

impl<'a> IntoIterator for &'a ThemeSet {
    type Item = &'a ThemeKey;
    type IntoIter = indexmap::set::Iter<'a, ThemeKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}
