#![forbid(unsafe_code)]

//! Collapse a multi-theme [`RawTree`] into the [`ConfigTree`] of one theme.

use std::collections::BTreeMap;

use tracing::trace;

use crate::classify::DEFAULT_KEY;
use crate::error::{Result, ThemeError};
use crate::key::{ThemeKey, ThemeSet};
use crate::value::{ConfigTree, ConfigValue, RawTree, RawValue, ThemedTree, ThemedValue, join_path};

/// Check that every themed value in `raw` can resolve under `themes`.
///
/// Rejects themed values naming themes outside the set and themed values
/// with neither entries nor a default. Themed subtrees follow the same rules,
/// and every variant must also have the same key layout, so a theme switch
/// only ever changes values. Errors carry the dotted path of the offending
/// entry.
pub fn validate(raw: &RawTree, themes: &ThemeSet) -> Result<()> {
    validate_at(raw, themes, "")
}

fn validate_at(raw: &RawTree, themes: &ThemeSet, parent: &str) -> Result<()> {
    for (key, value) in raw.iter() {
        match value {
            RawValue::Leaf(_) => {}
            RawValue::Themed(themed) => validate_themed(themed, themes, &join_path(parent, key))?,
            RawValue::ThemedTree(themed) => {
                validate_themed_tree(themed, themes, &join_path(parent, key))?;
            }
            RawValue::Tree(tree) => validate_at(tree, themes, &join_path(parent, key))?,
        }
    }
    Ok(())
}

fn validate_themed_tree(themed: &ThemedTree, themes: &ThemeSet, path: &str) -> Result<()> {
    if themed.is_empty() && themed.default_variant().is_none() {
        return Err(ThemeError::EmptyThemedValue {
            path: path.to_owned(),
        });
    }
    if let Some((key, _)) = themed.iter().find(|(key, _)| !themes.contains(key.as_str())) {
        return Err(ThemeError::UnknownThemedKey {
            path: path.to_owned(),
            key: key.to_string(),
        });
    }

    let variants = themed
        .iter()
        .map(|(key, tree)| (key.as_str(), tree))
        .chain(themed.default_variant().map(|tree| (DEFAULT_KEY, tree)));
    let mut expected: Option<Layout<'_>> = None;
    for (theme, tree) in variants {
        validate_at(tree, themes, &join_path(path, theme))?;
        let found = layout(tree);
        match &expected {
            None => expected = Some(found),
            Some(first) if *first != found => {
                return Err(ThemeError::ThemedShapeMismatch {
                    path: path.to_owned(),
                    theme: theme.to_owned(),
                });
            }
            Some(_) => {}
        }
    }
    Ok(())
}

/// Key layout of a raw tree: which keys hold values and which hold trees.
type Layout<'a> = BTreeMap<&'a str, Slot<'a>>;

#[derive(Debug, PartialEq)]
enum Slot<'a> {
    Value,
    Branch(Layout<'a>),
}

fn layout(tree: &RawTree) -> Layout<'_> {
    tree.iter()
        .map(|(key, value)| {
            let slot = match value {
                RawValue::Leaf(_) | RawValue::Themed(_) => Slot::Value,
                RawValue::Tree(inner) => Slot::Branch(layout(inner)),
                // Variants were checked to agree, so any one stands for all.
                RawValue::ThemedTree(themed) => Slot::Branch(
                    themed
                        .iter()
                        .map(|(_, inner)| inner)
                        .chain(themed.default_variant())
                        .next()
                        .map(layout)
                        .unwrap_or_default(),
                ),
            };
            (key, slot)
        })
        .collect()
}

fn validate_themed(themed: &ThemedValue, themes: &ThemeSet, path: &str) -> Result<()> {
    if themed.is_empty() && themed.default_leaf().is_none() {
        return Err(ThemeError::EmptyThemedValue {
            path: path.to_owned(),
        });
    }
    if let Some((key, _)) = themed.iter().find(|(key, _)| !themes.contains(key.as_str())) {
        return Err(ThemeError::UnknownThemedKey {
            path: path.to_owned(),
            key: key.to_string(),
        });
    }
    Ok(())
}

/// Resolve `raw` for the `active` theme.
///
/// Leaves are copied, nested trees are resolved recursively, and every
/// themed value becomes the leaf chosen by [`ThemedValue::pick`]. Themed
/// subtrees pick a variant with [`ThemedTree::pick`] and resolve it in turn.
/// The result is a freshly built tree with the same shape as `raw`.
///
/// A themed value that cannot resolve (only possible for configs that failed
/// [`validate`]) is left out of the result.
#[must_use]
pub fn resolve(raw: &RawTree, active: &ThemeKey, themes: &ThemeSet) -> ConfigTree {
    let mut out = ConfigTree::new();
    for (key, value) in raw.iter() {
        let resolved = match value {
            RawValue::Leaf(leaf) => ConfigValue::Leaf(leaf.clone()),
            RawValue::Themed(themed) => match themed.pick(active, themes) {
                Some(leaf) => {
                    trace!(key, theme = %active, value = %leaf, "resolved themed value");
                    ConfigValue::Leaf(leaf.clone())
                }
                None => continue,
            },
            RawValue::ThemedTree(themed) => match themed.pick(active, themes) {
                Some(tree) => ConfigValue::Tree(resolve(tree, active, themes)),
                None => continue,
            },
            RawValue::Tree(tree) => ConfigValue::Tree(resolve(tree, active, themes)),
        };
        out.insert(key, resolved);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Leaf;

    fn themes() -> ThemeSet {
        ThemeSet::new(["light", "dark"]).unwrap()
    }

    fn sample() -> RawTree {
        RawTree::new()
            .themed("color", [("light", "white"), ("dark", "black")])
            .leaf("size", 10)
    }

    #[test]
    fn resolves_example_config() {
        let light = resolve(&sample(), &"light".into(), &themes());
        assert_eq!(
            light,
            ConfigTree::new().with("color", "white").with("size", 10)
        );

        let dark = resolve(&sample(), &"dark".into(), &themes());
        assert_eq!(
            dark,
            ConfigTree::new().with("color", "black").with("size", 10)
        );
    }

    #[test]
    fn nested_trees_are_resolved_recursively() {
        let raw = RawTree::new().tree(
            "button",
            RawTree::new()
                .themed("bg", [("light", "#fff"), ("dark", "#000")])
                .tree("label", RawTree::new().themed("fg", [("dark", "#eee")])),
        );
        let tree = resolve(&raw, &"light".into(), &themes());
        assert_eq!(tree.leaf("button.bg"), Some(&Leaf::from("#fff")));
        // Partial override falls back to the only entry.
        assert_eq!(tree.leaf("button.label.fg"), Some(&Leaf::from("#eee")));
    }

    #[test]
    fn key_order_is_preserved() {
        let raw = RawTree::new()
            .leaf("z", 1)
            .themed("a", [("light", 2), ("dark", 3)])
            .tree("m", RawTree::new());
        let tree = resolve(&raw, &"dark".into(), &themes());
        assert_eq!(tree.keys().collect::<Vec<_>>(), ["z", "a", "m"]);
    }

    #[test]
    fn validate_rejects_unknown_theme_in_value() {
        let raw = RawTree::new().tree(
            "panel",
            RawTree::new().themed("bg", [("light", "#fff"), ("neon", "#f0f")]),
        );
        let err = validate(&raw, &themes()).unwrap_err();
        match err {
            ThemeError::UnknownThemedKey { path, key } => {
                assert_eq!(path, "panel.bg");
                assert_eq!(key, "neon");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn validate_rejects_empty_themed_value() {
        let raw = RawTree::new().themed("bg", ThemedValue::new());
        assert!(matches!(
            validate(&raw, &themes()),
            Err(ThemeError::EmptyThemedValue { ref path }) if path == "bg"
        ));
    }

    #[test]
    fn validate_accepts_default_only_value() {
        let raw = RawTree::new().themed("bg", ThemedValue::new().default_value("#888"));
        assert!(validate(&raw, &themes()).is_ok());
        let tree = resolve(&raw, &"dark".into(), &themes());
        assert_eq!(tree.leaf("bg"), Some(&Leaf::from("#888")));
    }

    #[test]
    fn unresolvable_value_is_omitted() {
        let raw = RawTree::new().themed("bg", ThemedValue::new()).leaf("x", 1);
        let tree = resolve(&raw, &"dark".into(), &themes());
        assert!(tree.get("bg").is_none());
        assert_eq!(tree.len(), 1);
    }

    fn button(bg: &str) -> RawTree {
        RawTree::new().leaf("bg", bg).tree("label", RawTree::new().leaf("fg", "#777"))
    }

    #[test]
    fn themed_subtree_resolves_the_active_variant() {
        let raw = RawTree::new().themed_tree(
            "button",
            [("light", button("#fff")), ("dark", button("#000"))],
        );
        assert!(validate(&raw, &themes()).is_ok());

        let dark = resolve(&raw, &"dark".into(), &themes());
        assert_eq!(dark.leaf("button.bg"), Some(&Leaf::from("#000")));
        assert_eq!(dark.leaf("button.label.fg"), Some(&Leaf::from("#777")));
    }

    #[test]
    fn themed_subtree_falls_back_to_default_variant() {
        let themes = ThemeSet::new(["light", "dark", "dim"]).unwrap();
        let raw = RawTree::new().themed_tree(
            "button",
            ThemedTree::new()
                .variant("dark", button("#000"))
                .default_tree(button("#888")),
        );
        assert!(validate(&raw, &themes).is_ok());
        let dim = resolve(&raw, &"dim".into(), &themes);
        assert_eq!(dim.leaf("button.bg"), Some(&Leaf::from("#888")));
    }

    #[test]
    fn validate_rejects_themed_subtree_with_different_layouts() {
        let raw = RawTree::new().themed_tree(
            "button",
            [
                ("light", button("#fff")),
                ("dark", RawTree::new().leaf("bg", "#000").leaf("label", "flat")),
            ],
        );
        assert!(matches!(
            validate(&raw, &themes()),
            Err(ThemeError::ThemedShapeMismatch { ref path, ref theme }) if path == "button" && theme == "dark"
        ));
    }

    #[test]
    fn validate_checks_inside_themed_subtree_variants() {
        let raw = RawTree::new().themed_tree(
            "button",
            [(
                "light",
                RawTree::new().themed("bg", [("neon", "#f0f")]),
            )],
        );
        assert!(matches!(
            validate(&raw, &themes()),
            Err(ThemeError::UnknownThemedKey { ref path, ref key }) if path == "button.light.bg" && key == "neon"
        ));
    }

    #[test]
    fn validate_rejects_empty_themed_subtree() {
        let raw = RawTree::new().themed_tree("button", ThemedTree::new());
        assert!(matches!(
            validate(&raw, &themes()),
            Err(ThemeError::EmptyThemedValue { ref path }) if path == "button"
        ));
    }
}
