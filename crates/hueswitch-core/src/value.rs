#![forbid(unsafe_code)]

//! Raw and resolved configuration trees.
//!
//! A [`RawTree`] is what config authors write: leaves, nested trees,
//! [`ThemedValue`]s that carry one leaf per theme, and [`ThemedTree`]s that
//! carry one subtree per theme. A [`ConfigTree`] is what consumers read: the
//! same shape with every themed entry collapsed to the choice of one theme.
//!
//! Both trees are ordered. Key order is the order of insertion (or of the
//! source document) and is preserved through resolution and merging.

use std::fmt;

use indexmap::IndexMap;

use crate::key::{ThemeKey, ThemeSet};

/// A scalar config value.
#[derive(Debug, Clone, PartialEq)]
pub enum Leaf {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Leaf {
    /// The string payload, if this is a string leaf.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The integer payload, if this is an integer leaf.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric payload; integers widen to `f64`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// The boolean payload, if this is a boolean leaf.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for Leaf {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for Leaf {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<bool> for Leaf {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Leaf {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<f32> for Leaf {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

macro_rules! leaf_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Leaf {
                fn from(value: $ty) -> Self {
                    Self::Int(i64::from(value))
                }
            }
        )*
    };
}

leaf_from_int!(u8, u16, u32, i8, i16, i32, i64);

/// `From` impls wrapping every scalar type in a `Leaf` variant.
macro_rules! scalar_into {
    ($target:ty) => {
        scalar_into!($target; Leaf, &str, String, bool, f64, f32, u8, u16, u32, i8, i16, i32, i64);
    };
    ($target:ty; $($ty:ty),*) => {
        $(
            impl From<$ty> for $target {
                fn from(value: $ty) -> Self {
                    Self::Leaf(Leaf::from(value))
                }
            }
        )*
    };
}

/// One leaf per theme, optionally with an explicit default.
///
/// A themed value may cover only some of the known themes. Themes it does
/// not mention fall back to the explicit default, then to the first entry
/// naming a known theme.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ThemedValue {
    values: IndexMap<ThemeKey, Leaf>,
    default: Option<Leaf>,
}

impl ThemedValue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the leaf for `theme`.
    #[must_use]
    pub fn variant(mut self, theme: impl Into<ThemeKey>, value: impl Into<Leaf>) -> Self {
        self.values.insert(theme.into(), value.into());
        self
    }

    /// Set the leaf used for themes without an entry.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Leaf>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// The explicit default, if any.
    #[must_use]
    pub fn default_leaf(&self) -> Option<&Leaf> {
        self.default.as_ref()
    }

    /// Leaf declared for `theme`, without fallback.
    #[must_use]
    pub fn get(&self, theme: &str) -> Option<&Leaf> {
        self.values.get(theme)
    }

    /// Pick the leaf for `active`.
    ///
    /// Order: the entry for `active`, the explicit default, then the first
    /// entry (in declaration order) whose key is in `themes`.
    #[must_use]
    pub fn pick(&self, active: &ThemeKey, themes: &ThemeSet) -> Option<&Leaf> {
        self.values
            .get(active)
            .or(self.default.as_ref())
            .or_else(|| {
                self.values
                    .iter()
                    .find(|(key, _)| themes.contains(key.as_str()))
                    .map(|(_, leaf)| leaf)
            })
    }

    /// Per-theme entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&ThemeKey, &Leaf)> {
        self.values.iter()
    }

    /// Number of per-theme entries (the default is not counted).
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ThemedValue
where
    K: Into<ThemeKey>,
    V: Into<Leaf>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            default: None,
        }
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for ThemedValue
where
    K: Into<ThemeKey>,
    V: Into<Leaf>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// A whole subtree chosen per theme.
///
/// Picks follow the same order as [`ThemedValue::pick`]. Every variant (and
/// the default) must have the same key layout so that switching themes only
/// ever changes values; [`validate`](crate::validate) enforces this.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ThemedTree {
    variants: IndexMap<ThemeKey, RawTree>,
    default: Option<RawTree>,
}

impl ThemedTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the subtree for `theme`.
    #[must_use]
    pub fn variant(mut self, theme: impl Into<ThemeKey>, tree: RawTree) -> Self {
        self.variants.insert(theme.into(), tree);
        self
    }

    /// Set the subtree used for themes without an entry.
    #[must_use]
    pub fn default_tree(mut self, tree: RawTree) -> Self {
        self.default = Some(tree);
        self
    }

    #[must_use]
    pub fn default_variant(&self) -> Option<&RawTree> {
        self.default.as_ref()
    }

    #[must_use]
    pub fn get(&self, theme: &str) -> Option<&RawTree> {
        self.variants.get(theme)
    }

    /// Pick the subtree for `active`.
    #[must_use]
    pub fn pick(&self, active: &ThemeKey, themes: &ThemeSet) -> Option<&RawTree> {
        self.variants
            .get(active)
            .or(self.default.as_ref())
            .or_else(|| {
                self.variants
                    .iter()
                    .find(|(key, _)| themes.contains(key.as_str()))
                    .map(|(_, tree)| tree)
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ThemeKey, &RawTree)> {
        self.variants.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

impl<K: Into<ThemeKey>> FromIterator<(K, RawTree)> for ThemedTree {
    fn from_iter<I: IntoIterator<Item = (K, RawTree)>>(iter: I) -> Self {
        Self {
            variants: iter.into_iter().map(|(k, t)| (k.into(), t)).collect(),
            default: None,
        }
    }
}

impl<K: Into<ThemeKey>, const N: usize> From<[(K, RawTree); N]> for ThemedTree {
    fn from(pairs: [(K, RawTree); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// A node of a raw config tree.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// A value shared by every theme.
    Leaf(Leaf),
    /// A value chosen per theme.
    Themed(ThemedValue),
    /// A nested tree chosen per theme.
    ThemedTree(ThemedTree),
    /// Nested config.
    Tree(RawTree),
}

scalar_into!(RawValue);

impl From<ThemedValue> for RawValue {
    fn from(value: ThemedValue) -> Self {
        Self::Themed(value)
    }
}

impl From<ThemedTree> for RawValue {
    fn from(value: ThemedTree) -> Self {
        Self::ThemedTree(value)
    }
}

impl From<RawTree> for RawValue {
    fn from(value: RawTree) -> Self {
        Self::Tree(value)
    }
}

/// Multi-theme configuration as written by config authors.
///
/// ```
/// use hueswitch_core::{RawTree, ThemedValue};
///
/// let raw = RawTree::new()
///     .themed("color", [("light", "white"), ("dark", "black")])
///     .leaf("size", 10)
///     .tree(
///         "button",
///         RawTree::new().themed(
///             "background",
///             ThemedValue::new().variant("dark", "#000").default_value("#fff"),
///         ),
///     );
/// assert_eq!(raw.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTree {
    entries: IndexMap<String, RawValue>,
}

impl RawTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a theme-independent leaf.
    #[must_use]
    pub fn leaf(self, key: impl Into<String>, value: impl Into<Leaf>) -> Self {
        self.with(key, RawValue::Leaf(value.into()))
    }

    /// Add a per-theme value.
    #[must_use]
    pub fn themed(self, key: impl Into<String>, value: impl Into<ThemedValue>) -> Self {
        self.with(key, RawValue::Themed(value.into()))
    }

    /// Add a nested tree.
    #[must_use]
    pub fn tree(self, key: impl Into<String>, tree: RawTree) -> Self {
        self.with(key, RawValue::Tree(tree))
    }

    /// Add a nested tree chosen per theme.
    #[must_use]
    pub fn themed_tree(self, key: impl Into<String>, value: impl Into<ThemedTree>) -> Self {
        self.with(key, RawValue::ThemedTree(value.into()))
    }

    /// Add any raw value.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace an entry, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RawValue>) -> Option<RawValue> {
        self.entries.insert(key.into(), value.into())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A node of a resolved config tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Leaf(Leaf),
    Tree(ConfigTree),
}

impl ConfigValue {
    #[must_use]
    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Tree(_) => None,
        }
    }

    #[must_use]
    pub fn as_tree(&self) -> Option<&ConfigTree> {
        match self {
            Self::Tree(tree) => Some(tree),
            Self::Leaf(_) => None,
        }
    }
}

scalar_into!(ConfigValue);

impl From<ConfigTree> for ConfigValue {
    fn from(value: ConfigTree) -> Self {
        Self::Tree(value)
    }
}

/// Config resolved for a single theme.
///
/// Paths address nested entries with dots: `"button.background"`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigTree {
    entries: IndexMap<String, ConfigValue>,
}

impl ConfigTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ConfigValue>,
    ) -> Option<ConfigValue> {
        self.entries.insert(key.into(), value.into())
    }

    /// Direct child lookup.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.get(key)
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut ConfigValue> {
        self.entries.get_mut(key)
    }

    /// Lookup by dotted path. The empty path is not addressable; use the
    /// tree itself.
    #[must_use]
    pub fn get_path(&self, path: &str) -> Option<&ConfigValue> {
        self.lookup(path.split('.'))
    }

    /// Lookup by a sequence of keys.
    pub fn lookup<'a, I>(&self, keys: I) -> Option<&ConfigValue>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut keys = keys.into_iter();
        let mut current = self.entries.get(keys.next()?)?;
        for key in keys {
            current = current.as_tree()?.entries.get(key)?;
        }
        Some(current)
    }

    /// Leaf at a dotted path.
    #[must_use]
    pub fn leaf(&self, path: &str) -> Option<&Leaf> {
        self.get_path(path)?.as_leaf()
    }

    /// Subtree at a dotted path.
    #[must_use]
    pub fn subtree(&self, path: &str) -> Option<&ConfigTree> {
        self.get_path(path)?.as_tree()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of leaves at any depth.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.entries
            .values()
            .map(|v| match v {
                ConfigValue::Leaf(_) => 1,
                ConfigValue::Tree(t) => t.leaf_count(),
            })
            .sum()
    }
}

pub(crate) fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_owned()
    } else {
        format!("{parent}.{key}")
    }
}
