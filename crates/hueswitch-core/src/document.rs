#![forbid(unsafe_code)]

//! Theme documents: a theme set, an optional default, and untyped values,
//! loaded from TOML or JSON.
//!
//! ```toml
//! themes = ["light", "dark"]
//! default = "light"
//!
//! [values]
//! size = 10
//! color = { light = "white", dark = "black" }
//!
//! [values.button]
//! background = { dark = "#000", "$default" = "#fff" }
//! ```
//!
//! ```rust,ignore
//! let doc = ThemeDocument::from_toml_file("themes.toml")?;
//! let doc = ThemeDocument::from_json_str(json)?;
//! ```
//!
//! Values carry no explicit per-theme tag, so maps are classified with
//! [`classify_map`](crate::classify::classify_map). A map keyed only by
//! themes is per-theme whatever its values are: scalars make a themed value,
//! nested maps make a themed subtree, and anything else is rejected.

use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::classify::{DEFAULT_KEY, EntryShape, MapKind, classify_map};
use crate::error::{Result, ThemeError};
use crate::key::{ThemeKey, ThemeSet};
use crate::resolve::validate;
use crate::value::{Leaf, RawTree, RawValue, ThemedTree, ThemedValue, join_path};

/// A parsed and validated theme document.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeDocument {
    /// Known themes, in declaration order.
    pub themes: ThemeSet,
    /// Theme active at startup; the first theme when absent.
    pub default: Option<ThemeKey>,
    /// Multi-theme config values.
    pub values: RawTree,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum KeyRepr {
    Name(String),
    Index(i64),
}

impl From<KeyRepr> for ThemeKey {
    fn from(repr: KeyRepr) -> Self {
        match repr {
            KeyRepr::Name(name) => ThemeKey::from(name),
            KeyRepr::Index(index) => ThemeKey::from(index),
        }
    }
}

#[derive(Deserialize)]
struct DocumentRepr {
    themes: Vec<KeyRepr>,
    #[serde(default)]
    default: Option<KeyRepr>,
    #[serde(default)]
    values: Map<String, Value>,
}

impl ThemeDocument {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Self::from_repr(toml::from_str(s)?)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self> {
        Self::from_repr(serde_json::from_str(s)?)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    fn from_repr(repr: DocumentRepr) -> Result<Self> {
        let themes = ThemeSet::new(repr.themes)?;
        let default = match repr.default.map(ThemeKey::from) {
            Some(key) if !themes.contains(key.as_str()) => {
                return Err(ThemeError::UnknownTheme(key.to_string()));
            }
            other => other,
        };
        let values = raw_tree_from_map(&repr.values, &themes, "")?;
        validate(&values, &themes)?;
        Ok(Self {
            themes,
            default,
            values,
        })
    }
}

/// Convert an untyped JSON value into a [`RawTree`].
///
/// The root must be an object. Arrays and nulls have no config-tree
/// representation and are rejected.
pub fn raw_tree_from_json(value: &Value, themes: &ThemeSet) -> Result<RawTree> {
    match value {
        Value::Object(map) => raw_tree_from_map(map, themes, ""),
        other => Err(ThemeError::UnsupportedValue {
            path: String::new(),
            kind: json_kind(other),
        }),
    }
}

fn raw_tree_from_map(map: &Map<String, Value>, themes: &ThemeSet, parent: &str) -> Result<RawTree> {
    let mut tree = RawTree::new();
    for (key, value) in map {
        let path = join_path(parent, key);
        let raw = match value {
            Value::Object(inner) => {
                let shapes: Vec<(&str, EntryShape)> =
                    inner.iter().map(|(k, v)| (k.as_str(), shape_of(v))).collect();
                match classify_map(&shapes, themes) {
                    MapKind::Nested => RawValue::Tree(raw_tree_from_map(inner, themes, &path)?),
                    MapKind::ThemedLeaves => RawValue::Themed(themed_from_map(inner, &path)?),
                    MapKind::ThemedTrees => {
                        RawValue::ThemedTree(themed_tree_from_map(inner, themes, &path)?)
                    }
                }
            }
            scalar => RawValue::Leaf(leaf_from_json(scalar, &path)?),
        };
        tree.insert(key.as_str(), raw);
    }
    Ok(tree)
}

fn themed_from_map(map: &Map<String, Value>, path: &str) -> Result<ThemedValue> {
    let mut themed = ThemedValue::new();
    for (key, value) in map {
        let leaf = leaf_from_json(value, &join_path(path, key))?;
        themed = if key == DEFAULT_KEY {
            themed.default_value(leaf)
        } else {
            themed.variant(key.as_str(), leaf)
        };
    }
    Ok(themed)
}

fn themed_tree_from_map(
    map: &Map<String, Value>,
    themes: &ThemeSet,
    path: &str,
) -> Result<ThemedTree> {
    let mut themed = ThemedTree::new();
    for (key, value) in map {
        let variant_path = join_path(path, key);
        let tree = match value {
            Value::Object(inner) => raw_tree_from_map(inner, themes, &variant_path)?,
            other => {
                return Err(ThemeError::UnsupportedValue {
                    path: variant_path,
                    kind: json_kind(other),
                });
            }
        };
        themed = if key == DEFAULT_KEY {
            themed.default_tree(tree)
        } else {
            themed.variant(key.as_str(), tree)
        };
    }
    Ok(themed)
}

fn leaf_from_json(value: &Value, path: &str) -> Result<Leaf> {
    match value {
        Value::String(s) => Ok(Leaf::Str(s.clone())),
        Value::Bool(b) => Ok(Leaf::Bool(*b)),
        Value::Number(n) => Ok(match n.as_i64() {
            Some(int) => Leaf::Int(int),
            None => Leaf::Float(n.as_f64().unwrap_or(f64::NAN)),
        }),
        other => Err(ThemeError::UnsupportedValue {
            path: path.to_owned(),
            kind: json_kind(other),
        }),
    }
}

fn shape_of(value: &Value) -> EntryShape {
    match value {
        Value::String(_) | Value::Number(_) | Value::Bool(_) => EntryShape::Scalar,
        Value::Object(_) => EntryShape::Map,
        Value::Array(_) | Value::Null => EntryShape::Other,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOML_DOC: &str = r##"
themes = ["light", "dark"]
default = "dark"

[values]
size = 10
color = { light = "white", dark = "black" }

[values.button]
background = { dark = "#000", "$default" = "#fff" }
padding = { light = 4, dark = 6, extra = 8 }
"##;

    #[test]
    fn toml_document_classifies_maps() {
        let doc = ThemeDocument::from_toml_str(TOML_DOC).unwrap();
        assert_eq!(doc.default, Some(ThemeKey::from("dark")));
        assert_eq!(doc.themes.len(), 2);

        assert!(matches!(doc.values.get("size"), Some(RawValue::Leaf(Leaf::Int(10)))));
        assert!(matches!(doc.values.get("color"), Some(RawValue::Themed(_))));

        let Some(RawValue::Tree(button)) = doc.values.get("button") else {
            panic!("button should be nested config");
        };
        let Some(RawValue::Themed(bg)) = button.get("background") else {
            panic!("background should be themed");
        };
        assert_eq!(bg.default_leaf(), Some(&Leaf::from("#fff")));
        // Mixed theme and non-theme keys stay nested config.
        assert!(matches!(button.get("padding"), Some(RawValue::Tree(_))));
    }

    #[test]
    fn json_document_preserves_key_order() {
        let doc = ThemeDocument::from_json_str(
            r#"{"themes": ["a", "b"], "values": {"z": 1, "y": {"b": 2.5, "a": 1.5}, "x": "s"}}"#,
        )
        .unwrap();
        let keys: Vec<_> = doc.values.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["z", "y", "x"]);
        let Some(RawValue::Themed(y)) = doc.values.get("y") else {
            panic!("y should be themed");
        };
        let order: Vec<_> = y.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(order, ["b", "a"]);
        assert_eq!(doc.default, None);
    }

    #[test]
    fn integer_theme_keys_are_supported() {
        let doc =
            ThemeDocument::from_json_str(r#"{"themes": [0, 1], "default": 1, "values": {"c": {"0": "w", "1": "b"}}}"#)
                .unwrap();
        assert_eq!(doc.default, Some(ThemeKey::from(1)));
        assert!(matches!(doc.values.get("c"), Some(RawValue::Themed(_))));
    }

    #[test]
    fn unknown_default_is_rejected() {
        let err = ThemeDocument::from_json_str(r#"{"themes": ["a"], "default": "b"}"#).unwrap_err();
        assert!(matches!(err, ThemeError::UnknownTheme(ref k) if k == "b"));
    }

    #[test]
    fn arrays_are_rejected_with_path() {
        let err = ThemeDocument::from_json_str(
            r#"{"themes": ["a"], "values": {"grid": {"cols": [1, 2]}}}"#,
        )
        .unwrap_err();
        match err {
            ThemeError::UnsupportedValue { path, kind } => {
                assert_eq!(path, "grid.cols");
                assert_eq!(kind, "array");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn theme_keyed_maps_of_maps_are_themed_subtrees() {
        let doc = ThemeDocument::from_json_str(
            r##"{"themes": ["light", "dark"], "values": {"button": {"light": {"bg": "#fff"}, "dark": {"bg": "#000"}}}}"##,
        )
        .unwrap();
        let Some(RawValue::ThemedTree(button)) = doc.values.get("button") else {
            panic!("button should be a themed subtree");
        };
        assert_eq!(button.len(), 2);

        let light = crate::resolve(&doc.values, &"light".into(), &doc.themes);
        let dark = crate::resolve(&doc.values, &"dark".into(), &doc.themes);
        assert_eq!(light.leaf("button.bg"), Some(&Leaf::from("#fff")));
        assert_eq!(dark.leaf("button.bg"), Some(&Leaf::from("#000")));
    }

    #[test]
    fn themed_subtree_variants_may_nest_themed_values() {
        let doc = ThemeDocument::from_toml_str(
            r##"
themes = ["light", "dark", "dim"]

[values.panel.light]
border = 1
fg = { dim = "#999", "$default" = "#111" }

[values.panel."$default"]
border = 2
fg = "#eee"
"##,
        )
        .unwrap();
        let dim = crate::resolve(&doc.values, &"dim".into(), &doc.themes);
        assert_eq!(dim.leaf("panel.border"), Some(&Leaf::Int(2)));
        assert_eq!(dim.leaf("panel.fg"), Some(&Leaf::from("#eee")));
        let light = crate::resolve(&doc.values, &"light".into(), &doc.themes);
        assert_eq!(light.leaf("panel.fg"), Some(&Leaf::from("#111")));
    }

    #[test]
    fn theme_keyed_map_mixing_scalars_and_maps_is_rejected() {
        let err = ThemeDocument::from_json_str(
            r##"{"themes": ["light", "dark"], "values": {"button": {"light": {"bg": "#fff"}, "dark": "#000"}}}"##,
        )
        .unwrap_err();
        match err {
            ThemeError::UnsupportedValue { path, kind } => {
                assert_eq!(path, "button.light");
                assert_eq!(kind, "object");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn themed_subtree_variants_must_share_keys() {
        let err = ThemeDocument::from_json_str(
            r##"{"themes": ["light", "dark"], "values": {"button": {"light": {"bg": "#fff"}, "dark": {"fg": "#000"}}}}"##,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ThemeError::ThemedShapeMismatch { ref path, ref theme } if path == "button" && theme == "dark"
        ));
    }

    #[test]
    fn malformed_input_reports_parse_errors() {
        assert!(matches!(
            ThemeDocument::from_toml_str("themes = ["),
            Err(ThemeError::Toml(_))
        ));
        assert!(matches!(
            ThemeDocument::from_json_str("{"),
            Err(ThemeError::Json(_))
        ));
    }

    #[test]
    fn empty_theme_list_is_rejected() {
        assert!(matches!(
            ThemeDocument::from_json_str(r#"{"themes": []}"#),
            Err(ThemeError::EmptyThemeSet)
        ));
    }

    #[test]
    fn raw_tree_from_json_requires_object_root() {
        let themes = ThemeSet::new(["a"]).unwrap();
        let err = raw_tree_from_json(&Value::Null, &themes).unwrap_err();
        assert!(matches!(err, ThemeError::UnsupportedValue { kind: "null", .. }));

        let tree = raw_tree_from_json(&serde_json::json!({"k": {"a": 1}}), &themes).unwrap();
        assert!(matches!(tree.get("k"), Some(RawValue::Themed(_))));
    }

    #[test]
    fn file_loading_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("themes.toml");
        std::fs::write(&path, TOML_DOC).unwrap();
        let doc = ThemeDocument::from_toml_file(&path).unwrap();
        assert_eq!(doc.values.len(), 3);

        let missing = ThemeDocument::from_json_file(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(ThemeError::Io(_))));
    }
}
