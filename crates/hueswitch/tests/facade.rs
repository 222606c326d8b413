#![forbid(unsafe_code)]

//! Facade entry points and the documented color/size walkthrough.

use std::cell::Cell;
use std::rc::Rc;

use hueswitch::prelude::*;
use hueswitch::{ConfigTree, ThemeError};

fn walkthrough_factory() -> ThemeFactory {
    create_theme_factory(
        ThemeSet::new(["light", "dark"]).unwrap(),
        RawTree::new()
            .themed("color", [("light", "white"), ("dark", "black")])
            .leaf("size", 10),
        Some("light".into()),
    )
    .unwrap()
}

#[test]
fn color_and_size_walkthrough() {
    let factory = walkthrough_factory();
    let config = factory.config();
    assert_eq!(
        config.snapshot(),
        ConfigTree::new().with("color", "white").with("size", 10)
    );

    factory.set_current_theme("dark").unwrap();
    assert_eq!(
        config.snapshot(),
        ConfigTree::new().with("color", "black").with("size", 10)
    );
    assert!(config.ptr_eq(&factory.config()));
}

#[test]
fn repeated_switch_notifies_once() {
    let factory = walkthrough_factory();
    let hits = Rc::new(Cell::new(0u32));
    let hits_in_listener = Rc::clone(&hits);
    let _sub = factory.listen_to_theme_change(move |_| hits_in_listener.set(hits_in_listener.get() + 1));

    factory.set_current_theme("dark").unwrap();
    factory.set_current_theme("dark").unwrap();
    assert_eq!(hits.get(), 1);
}

#[test]
fn theme_errors_convert_into_facade_errors() {
    let err = create_theme_factory(
        ThemeSet::new(["light"]).unwrap(),
        RawTree::new().themed("color", [("sepia", "brown")]),
        None,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        Error::Theme(ThemeError::UnknownThemedKey { ref path, ref key }) if path == "color" && key == "sepia"
    ));
    assert_eq!(
        err.to_string(),
        "themed value at `color` names unknown theme `sepia`"
    );
}

#[test]
fn load_theme_factory_from_toml_and_json() {
    let dir = tempfile::tempdir().unwrap();

    let toml_path = dir.path().join("themes.toml");
    std::fs::write(
        &toml_path,
        r##"
themes = ["light", "dark"]

[values]
size = 10
color = { light = "white", dark = "black" }

[values.button]
background = { light = "#fff", dark = "#000", "$default" = "#888" }
"##,
    )
    .unwrap();
    let from_toml = load_theme_factory(&toml_path).unwrap();
    assert_eq!(from_toml.current_theme().as_str(), "light");
    assert_eq!(from_toml.config().str("button.background").as_deref(), Some("#fff"));

    let json_path = dir.path().join("themes.JSON");
    std::fs::write(
        &json_path,
        r##"{"themes": ["light", "dark"], "default": "dark", "values": {"color": {"light": "white", "dark": "black"}}}"##,
    )
    .unwrap();
    let from_json = load_theme_factory(&json_path).unwrap();
    assert_eq!(from_json.config().str("color").as_deref(), Some("black"));
}

#[test]
fn per_theme_subtrees_switch_with_the_theme() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("themes.json");
    std::fs::write(
        &path,
        r##"{"themes": ["light", "dark"], "values": {"button": {"light": {"bg": "#fff"}, "dark": {"bg": "#000"}}}}"##,
    )
    .unwrap();
    let factory = load_theme_factory(&path).unwrap();
    let bg = factory.config().node("button.bg");
    assert_eq!(bg.value(), Some(Leaf::from("#fff")));

    factory.set_current_theme("dark").unwrap();
    assert_eq!(bg.value(), Some(Leaf::from("#000")));
}

#[test]
fn load_errors_name_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "themes = [").unwrap();

    let err = load_theme_factory(&path).unwrap_err();
    assert!(matches!(err, Error::Load { source: ThemeError::Toml(_), .. }));
    assert!(err.to_string().contains("broken.toml"));

    let missing = load_theme_factory(dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(missing, Error::Load { source: ThemeError::Io(_), .. }));
}

#[test]
fn stylesheet_through_the_facade() {
    let factory = walkthrough_factory();
    let sheet: ThemedStyleSheet<String> = factory.create_themed_style_sheet(|theme: &ThemeConfig| {
        let mut styles = StyleMap::new();
        styles.insert("text".to_owned(), theme.str("color").unwrap_or_default());
        styles
    });
    factory.set_current_theme("dark").unwrap();
    factory.set_current_theme("light").unwrap();
    factory.set_current_theme("dark").unwrap();
    assert_eq!(sheet.build_count(), 1);
    assert_eq!(sheet.get("text").as_deref(), Some("black"));
    assert_eq!(sheet.build_count(), 2);
}
