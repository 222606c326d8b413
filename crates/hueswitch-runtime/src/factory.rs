#![forbid(unsafe_code)]

//! Theme factory: the theme registry bound to one multi-theme config.
//!
//! # Design
//!
//! A [`ThemeFactory`] owns
//! - the known [`ThemeSet`] and the validated [`RawTree`],
//! - an [`Observable<ThemeKey>`] holding the active theme,
//! - the live [`ThemeConfig`], which is only ever merged into, and
//! - a per-theme cache of resolved trees.
//!
//! Handles are cheap clones of one shared state. Factories are independent;
//! there is no process-wide registry.
//!
//! # Invariants
//!
//! 1. The active theme is always a member of the theme set.
//! 2. The live config equals `resolve(raw, active)` outside a switch.
//! 3. Each theme is resolved at most once per factory.
//! 4. Handles returned by [`ThemeFactory::config`] are the same tree for the
//!    factory's whole lifetime.
//!
//! # Failure Modes
//!
//! - Switching to a theme outside the set returns
//!   [`ThemeError::UnknownTheme`] and leaves all state untouched.
//! - Listeners that switch themes from inside a notification start a nested
//!   switch. Its notification reaches every listener, and the outer round
//!   stops, so later listeners only ever see the final theme.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use ahash::AHashMap;
use hueswitch_core::{ConfigTree, RawTree, Result, ThemeError, ThemeKey, ThemeSet, resolve, validate};
use tracing::{debug, info, info_span};
use web_time::Instant;

use crate::binding::{Mount, WithTheme};
use crate::config::ThemeConfig;
use crate::reactive::{Observable, Subscription};
use crate::stylesheet::{StyleMap, ThemedStyleSheet};

static NEXT_FACTORY_ID: AtomicUsize = AtomicUsize::new(1);

struct FactoryInner {
    id: usize,
    themes: ThemeSet,
    raw: RawTree,
    current: Observable<ThemeKey>,
    config: ThemeConfig,
    cache: RefCell<AHashMap<ThemeKey, Rc<ConfigTree>>>,
    resolve_count: Cell<u64>,
}

/// Theme registry and switcher for one multi-theme config.
#[derive(Clone)]
pub struct ThemeFactory {
    inner: Rc<FactoryInner>,
}

impl ThemeFactory {
    /// Validate `raw` against `themes` and activate `default`, or the first
    /// theme of the set when `default` is `None`.
    pub fn new(themes: ThemeSet, raw: RawTree, default: Option<ThemeKey>) -> Result<Self> {
        validate(&raw, &themes)?;
        let initial = match default {
            Some(key) => themes
                .get(key.as_str())
                .cloned()
                .ok_or_else(|| ThemeError::UnknownTheme(key.to_string()))?,
            None => themes.first().clone(),
        };

        let resolved = Rc::new(resolve(&raw, &initial, &themes));
        let config = ThemeConfig::new(ConfigTree::clone(&resolved));
        let mut cache = AHashMap::new();
        cache.insert(initial.clone(), resolved);

        info!(
            themes = themes.len(),
            default = %initial,
            leaves = config.with(ConfigTree::leaf_count),
            "theme factory created"
        );

        Ok(Self {
            inner: Rc::new(FactoryInner {
                id: NEXT_FACTORY_ID.fetch_add(1, Ordering::Relaxed),
                themes,
                raw,
                current: Observable::new(initial),
                config,
                cache: RefCell::new(cache),
                resolve_count: Cell::new(1),
            }),
        })
    }

    /// Start building a factory step by step.
    #[must_use]
    pub fn builder() -> ThemeFactoryBuilder {
        ThemeFactoryBuilder::default()
    }

    /// Build a factory from a loaded theme document.
    #[cfg(feature = "serde")]
    pub fn from_document(document: hueswitch_core::ThemeDocument) -> Result<Self> {
        Self::new(document.themes, document.values, document.default)
    }

    /// The live resolved config.
    #[must_use]
    pub fn config(&self) -> ThemeConfig {
        self.inner.config.clone()
    }

    /// The active theme.
    #[must_use]
    pub fn current_theme(&self) -> ThemeKey {
        self.inner.current.get()
    }

    /// Switch the active theme.
    ///
    /// Returns `Ok(false)` when `key` is already active. Otherwise merges the
    /// resolved config of `key` into the live config, then notifies every
    /// listener before returning `Ok(true)`.
    pub fn set_current_theme(&self, key: impl Into<ThemeKey>) -> Result<bool> {
        let requested = key.into();
        let key = self
            .inner
            .themes
            .get(requested.as_str())
            .cloned()
            .ok_or_else(|| ThemeError::UnknownTheme(requested.to_string()))?;

        let from = self.current_theme();
        if from == key {
            return Ok(false);
        }

        let started = Instant::now();
        let span = info_span!(
            "theme.switch",
            from = %from,
            to = %key,
            cache_hit = tracing::field::Empty,
            duration_us = tracing::field::Empty
        );
        let _guard = span.enter();

        let (resolved, cache_hit) = self.resolved(&key);
        span.record("cache_hit", cache_hit);
        let changed = self.inner.config.merge(&resolved);
        debug!(changed, "merged theme into live config");

        self.inner.current.set(key);
        span.record("duration_us", started.elapsed().as_micros() as u64);
        Ok(true)
    }

    /// Run `callback` with the new theme after every switch.
    pub fn listen_to_theme_change(&self, callback: impl Fn(&ThemeKey) + 'static) -> Subscription {
        self.inner.current.subscribe(callback)
    }

    /// Subscribe `mount` to theme changes and return the live config.
    ///
    /// A mount is subscribed to a factory at most once; later calls only
    /// return the config.
    pub fn use_theme(&self, mount: &Mount) -> ThemeConfig {
        let id = self.inner.id;
        if !mount.is_tracking(id) {
            let refresh = mount.refresher();
            let subscription = self.inner.current.subscribe(move |_| refresh());
            mount.retain(id, subscription);
        }
        self.config()
    }

    /// Wrap `component` so that rendering it receives the live config.
    #[must_use]
    pub fn with_theme<F>(&self, component: F) -> WithTheme<F> {
        WithTheme::new(self.clone(), component)
    }

    /// Create a lazily rebuilt stylesheet over this factory's config.
    pub fn create_themed_style_sheet<V, B>(&self, builder: B) -> ThemedStyleSheet<V>
    where
        V: Clone + 'static,
        B: Fn(&ThemeConfig) -> StyleMap<V> + 'static,
    {
        ThemedStyleSheet::new(builder, &self.inner.current, self.config())
    }

    /// Subscribe `mount` (as [`use_theme`](Self::use_theme)) and render with
    /// the live config.
    pub fn th<R>(&self, mount: &Mount, render: impl FnOnce(&ThemeConfig) -> R) -> R {
        let config = self.use_theme(mount);
        render(&config)
    }

    /// The known themes.
    #[must_use]
    pub fn themes(&self) -> &ThemeSet {
        &self.inner.themes
    }

    /// Themes whose resolved config is cached, in theme-set order.
    #[must_use]
    pub fn cached_themes(&self) -> Vec<ThemeKey> {
        let cache = self.inner.cache.borrow();
        self.inner
            .themes
            .iter()
            .filter(|key| cache.contains_key(*key))
            .cloned()
            .collect()
    }

    /// Number of times a theme has been resolved.
    #[must_use]
    pub fn resolve_count(&self) -> u64 {
        self.inner.resolve_count.get()
    }

    /// Number of theme-change listeners, mounts and stylesheets included.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.current.subscriber_count()
    }

    fn resolved(&self, key: &ThemeKey) -> (Rc<ConfigTree>, bool) {
        if let Some(tree) = self.inner.cache.borrow().get(key) {
            return (Rc::clone(tree), true);
        }
        let tree = Rc::new(resolve(&self.inner.raw, key, &self.inner.themes));
        self.inner.resolve_count.set(self.inner.resolve_count.get() + 1);
        self.inner
            .cache
            .borrow_mut()
            .insert(key.clone(), Rc::clone(&tree));
        (tree, false)
    }
}

impl fmt::Debug for ThemeFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeFactory")
            .field("current", &self.current_theme())
            .field("themes", &self.inner.themes.len())
            .field("cached", &self.inner.cache.borrow().len())
            .finish()
    }
}

/// Step-by-step construction of a [`ThemeFactory`].
#[derive(Debug, Default)]
pub struct ThemeFactoryBuilder {
    themes: Option<ThemeSet>,
    raw: RawTree,
    default: Option<ThemeKey>,
}

impl ThemeFactoryBuilder {
    /// The known themes. Required.
    #[must_use]
    pub fn themes(mut self, themes: ThemeSet) -> Self {
        self.themes = Some(themes);
        self
    }

    /// The multi-theme config. Empty when not set.
    #[must_use]
    pub fn config(mut self, raw: RawTree) -> Self {
        self.raw = raw;
        self
    }

    /// The theme active at startup.
    #[must_use]
    pub fn default_theme(mut self, key: impl Into<ThemeKey>) -> Self {
        self.default = Some(key.into());
        self
    }

    /// Validate and build.
    pub fn build(self) -> Result<ThemeFactory> {
        let themes = self.themes.ok_or(ThemeError::EmptyThemeSet)?;
        ThemeFactory::new(themes, self.raw, self.default)
    }
}
