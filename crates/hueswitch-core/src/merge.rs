#![forbid(unsafe_code)]

//! In-place merge of one resolved tree into another.

use tracing::warn;

use crate::value::{ConfigTree, ConfigValue};

/// Merge `src` into `dest` without replacing any nested tree of `dest`.
///
/// For every key of `src`: nested trees are merged recursively into the
/// tree `dest` already holds at that key; anything else overwrites the
/// entry of `dest`. Entries of `dest` that `src` does not mention are left
/// alone.
///
/// Trees resolved from the same raw config always share one shape. If they
/// do not, the `dest` entry is replaced by a copy of the `src` branch.
///
/// Returns the number of leaves whose value changed.
pub fn deep_merge(dest: &mut ConfigTree, src: &ConfigTree) -> usize {
    let mut changed = 0;
    for (key, value) in src.iter() {
        match value {
            ConfigValue::Tree(src_tree) => {
                if let Some(ConfigValue::Tree(dest_tree)) = dest.get_mut(key) {
                    changed += deep_merge(dest_tree, src_tree);
                    continue;
                }
            }
            ConfigValue::Leaf(src_leaf) => {
                if let Some(ConfigValue::Leaf(dest_leaf)) = dest.get_mut(key) {
                    if dest_leaf != src_leaf {
                        *dest_leaf = src_leaf.clone();
                        changed += 1;
                    }
                    continue;
                }
            }
        }

        if dest.get(key).is_some() {
            warn!(key, "config shape mismatch during merge; replacing branch");
        }
        changed += match value {
            ConfigValue::Leaf(_) => 1,
            ConfigValue::Tree(tree) => tree.leaf_count(),
        };
        dest.insert(key, value.clone());
    }
    changed
}
