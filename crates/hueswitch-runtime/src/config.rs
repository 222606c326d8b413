#![forbid(unsafe_code)]

//! Live resolved config and stable handles into it.
//!
//! A factory owns exactly one live [`ConfigTree`]. Theme switches merge the
//! newly resolved tree into it in place, so the tree is never replaced.
//! Consumers hold [`ThemeConfig`] (the root) or [`ConfigNode`] (a key path
//! below it). Handles store a path, not a borrow, which keeps them valid
//! across switches: a handle taken before a switch reads the new values
//! after it.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use hueswitch_core::{ConfigTree, ConfigValue, Leaf, deep_merge};

struct LiveTree {
    tree: RefCell<ConfigTree>,
    version: Cell<u64>,
}

/// Handle to the live resolved config of a factory.
///
/// Cloning is cheap and shares the same tree.
#[derive(Clone)]
pub struct ThemeConfig {
    live: Rc<LiveTree>,
}

impl ThemeConfig {
    pub(crate) fn new(tree: ConfigTree) -> Self {
        Self {
            live: Rc::new(LiveTree {
                tree: RefCell::new(tree),
                version: Cell::new(0),
            }),
        }
    }

    /// Merge a resolved tree into the live one. Returns the number of
    /// leaves that changed.
    pub(crate) fn merge(&self, resolved: &ConfigTree) -> usize {
        let changed = deep_merge(&mut self.live.tree.borrow_mut(), resolved);
        self.live.version.set(self.live.version.get() + 1);
        changed
    }

    /// Handle to the subtree at a dotted path. The path does not have to
    /// exist; reads through the handle then return `None`.
    #[must_use]
    pub fn node(&self, path: &str) -> ConfigNode {
        ConfigNode {
            live: Rc::clone(&self.live),
            path: split_path(path).into(),
        }
    }

    /// Leaf at a dotted path, cloned out of the live tree.
    #[must_use]
    pub fn leaf(&self, path: &str) -> Option<Leaf> {
        self.live.tree.borrow().leaf(path).cloned()
    }

    /// String leaf at a dotted path.
    #[must_use]
    pub fn str(&self, path: &str) -> Option<String> {
        self.leaf(path)?.as_str().map(str::to_owned)
    }

    /// Numeric leaf at a dotted path.
    #[must_use]
    pub fn number(&self, path: &str) -> Option<f64> {
        self.leaf(path)?.as_f64()
    }

    /// Borrow the whole live tree for the duration of `f`.
    ///
    /// `f` must not switch the theme of the owning factory: the merge needs
    /// the tree mutably and panics while this borrow is held.
    pub fn with<R>(&self, f: impl FnOnce(&ConfigTree) -> R) -> R {
        f(&self.live.tree.borrow())
    }

    /// Owned copy of the current tree.
    #[must_use]
    pub fn snapshot(&self) -> ConfigTree {
        self.live.tree.borrow().clone()
    }

    /// Number of merges applied since creation.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.live.version.get()
    }

    /// Whether both handles point at the same live tree.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.live, &other.live)
    }
}

impl fmt::Debug for ThemeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeConfig")
            .field("version", &self.version())
            .field("tree", &*self.live.tree.borrow())
            .finish()
    }
}

/// Handle to a subtree (or leaf) of the live config, addressed by path.
#[derive(Clone)]
pub struct ConfigNode {
    live: Rc<LiveTree>,
    path: Rc<[String]>,
}

impl ConfigNode {
    /// Dotted path of this node.
    #[must_use]
    pub fn path(&self) -> String {
        self.path.join(".")
    }

    /// Handle to a descendant at a dotted path relative to this node.
    #[must_use]
    pub fn node(&self, path: &str) -> ConfigNode {
        let mut full: Vec<String> = self.path.to_vec();
        full.extend(split_path(path));
        ConfigNode {
            live: Rc::clone(&self.live),
            path: full.into(),
        }
    }

    /// Run `f` against whatever currently lives at this path.
    ///
    /// `f` must not switch the theme of the owning factory (see
    /// [`ThemeConfig::with`]).
    pub fn with<R>(&self, f: impl FnOnce(Option<&ConfigValue>) -> R) -> R {
        let tree = self.live.tree.borrow();
        f(tree.lookup(self.path.iter().map(String::as_str)))
    }

    /// Whether the path currently resolves to anything.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.with(|value| value.is_some())
    }

    /// Leaf of a direct child.
    #[must_use]
    pub fn leaf(&self, key: &str) -> Option<Leaf> {
        self.with(|value| value?.as_tree()?.leaf(key).cloned())
    }

    /// The leaf this node itself points at.
    #[must_use]
    pub fn value(&self) -> Option<Leaf> {
        self.with(|value| value?.as_leaf().cloned())
    }

    /// Child keys, in order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.with(|value| {
            value
                .and_then(ConfigValue::as_tree)
                .map(|tree| tree.keys().map(str::to_owned).collect())
                .unwrap_or_default()
        })
    }

    /// Owned copy of the subtree at this path.
    #[must_use]
    pub fn snapshot(&self) -> Option<ConfigTree> {
        self.with(|value| value?.as_tree().cloned())
    }

    /// The root handle this node belongs to.
    #[must_use]
    pub fn root(&self) -> ThemeConfig {
        ThemeConfig {
            live: Rc::clone(&self.live),
        }
    }
}

impl fmt::Debug for ConfigNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigNode")
            .field("path", &self.path())
            .finish()
    }
}

fn split_path(path: &str) -> Vec<String> {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
        .collect()
}
