#![forbid(unsafe_code)]

//! hueswitch runtime
//!
//! Reactive theme state on top of `hueswitch-core`.
//!
//! # Key Components
//!
//! - [`Observable`] - Single-value cell with synchronous listeners
//! - [`ThemeFactory`] - Theme registry bound to one multi-theme config
//! - [`ThemeConfig`] / [`ConfigNode`] - Stable handles into the live config
//! - [`ThemedStyleSheet`] - Stylesheet rebuilt lazily on theme change
//! - [`Mount`] / [`WithTheme`] - Consumer bindings for a host UI framework
//!
//! # Role in hueswitch
//! `hueswitch-runtime` owns all mutable state. The core crate resolves and
//! merges trees; this crate decides when that happens and who is told.
//!
//! Everything here is single-threaded (`Rc`/`RefCell`) and synchronous: a
//! theme switch has finished updating the live config and notifying every
//! listener by the time [`ThemeFactory::set_current_theme`] returns.
//!
//! # Example
//!
//! ```
//! use hueswitch_core::{RawTree, ThemeSet};
//! use hueswitch_runtime::{StyleMap, ThemeFactory};
//!
//! let factory = ThemeFactory::builder()
//!     .themes(ThemeSet::new(["light", "dark"]).unwrap())
//!     .config(RawTree::new().themed("color", [("light", "white"), ("dark", "black")]))
//!     .build()
//!     .unwrap();
//!
//! let sheet = factory.create_themed_style_sheet(|theme| {
//!     let mut styles = StyleMap::new();
//!     styles.insert("text".to_owned(), theme.str("color").unwrap_or_default());
//!     styles
//! });
//!
//! factory.set_current_theme("dark").unwrap();
//! assert_eq!(sheet.get("text").as_deref(), Some("black"));
//! ```

pub mod binding;
pub mod config;
pub mod factory;
pub mod reactive;
pub mod stylesheet;

pub use binding::{Mount, WithTheme};
pub use config::{ConfigNode, ThemeConfig};
pub use factory::{ThemeFactory, ThemeFactoryBuilder};
pub use reactive::{Observable, Subscription};
pub use stylesheet::{StyleMap, ThemedStyleSheet};
