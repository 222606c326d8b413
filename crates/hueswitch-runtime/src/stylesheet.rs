#![forbid(unsafe_code)]

//! Lazily rebuilt stylesheets.
//!
//! A [`ThemedStyleSheet`] wraps a builder `Fn(&ThemeConfig) -> StyleMap<V>`.
//! The builder runs once at creation, which fixes the sheet's key set, and
//! afterwards only when a key is read under a theme the snapshot was not
//! built for. Switching themes never runs the builder by itself.
//!
//! # Invariants
//!
//! 1. The key set never changes after creation. Keys a later build adds are
//!    dropped; keys it omits read as `None`.
//! 2. Any number of theme switches between two reads cost at most one
//!    rebuild.
//! 3. Reading an unknown key has no side effects.
//!
//! # Theme tracking
//!
//! Until the sheet is first read it listens to the theme cell and marks its
//! snapshot stale on every switch. The first notification after a read
//! detaches that listener; from then on reads compare the active theme with
//! the theme of the snapshot.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use hueswitch_core::ThemeKey;
use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::config::ThemeConfig;
use crate::reactive::{Observable, Subscription};

/// Named style values produced by a stylesheet builder.
pub type StyleMap<V> = IndexMap<String, V>;

type Builder<V> = Box<dyn Fn(&ThemeConfig) -> StyleMap<V>>;

struct SheetState<V> {
    builder: Builder<V>,
    config: ThemeConfig,
    current: Observable<ThemeKey>,
    keys: Vec<String>,
    snapshot: RefCell<StyleMap<V>>,
    last_theme: RefCell<ThemeKey>,
    rendered: Cell<bool>,
    stale: Cell<bool>,
    builds: Cell<u64>,
    tracking: RefCell<Option<Subscription>>,
}

impl<V> SheetState<V> {
    fn on_theme_change(&self) {
        if self.rendered.get() {
            let subscription = self.tracking.borrow_mut().take();
            drop(subscription);
            debug!(keys = self.keys.len(), "stylesheet stopped tracking theme changes");
        } else {
            self.stale.set(true);
            trace!("stylesheet snapshot marked stale");
        }
    }

    fn refresh(&self) {
        self.rendered.set(true);
        let theme = self.current.get();
        if !self.stale.get() && *self.last_theme.borrow() == theme {
            return;
        }

        let mut fresh = (self.builder)(&self.config);
        let snapshot: StyleMap<V> = self
            .keys
            .iter()
            .filter_map(|key| fresh.swap_remove(key).map(|value| (key.clone(), value)))
            .collect();
        *self.snapshot.borrow_mut() = snapshot;
        *self.last_theme.borrow_mut() = theme;
        self.stale.set(false);
        self.builds.set(self.builds.get() + 1);
        debug!(
            theme = %self.last_theme.borrow(),
            builds = self.builds.get(),
            "stylesheet rebuilt"
        );
    }
}

/// A stylesheet whose values follow the active theme, rebuilt on demand.
pub struct ThemedStyleSheet<V> {
    state: Rc<SheetState<V>>,
}

impl<V: 'static> ThemedStyleSheet<V> {
    /// Build the initial snapshot and start tracking `current`.
    pub fn new(
        builder: impl Fn(&ThemeConfig) -> StyleMap<V> + 'static,
        current: &Observable<ThemeKey>,
        config: ThemeConfig,
    ) -> Self {
        let snapshot = builder(&config);
        let keys = snapshot.keys().cloned().collect();
        let state = Rc::new(SheetState {
            builder: Box::new(builder),
            config,
            current: current.clone(),
            keys,
            snapshot: RefCell::new(snapshot),
            last_theme: RefCell::new(current.get()),
            rendered: Cell::new(false),
            stale: Cell::new(false),
            builds: Cell::new(1),
            tracking: RefCell::new(None),
        });

        let weak = Rc::downgrade(&state);
        let subscription = current.subscribe(move |_| {
            if let Some(state) = weak.upgrade() {
                state.on_theme_change();
            }
        });
        *state.tracking.borrow_mut() = Some(subscription);
        Self { state }
    }

    /// Run `f` against an up-to-date snapshot.
    pub fn with<R>(&self, f: impl FnOnce(&StyleMap<V>) -> R) -> R {
        self.state.refresh();
        f(&self.state.snapshot.borrow())
    }

    /// The fixed key set, in builder order. Does not count as a read.
    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.state.keys
    }

    /// Number of builder invocations, the initial one included.
    #[must_use]
    pub fn build_count(&self) -> u64 {
        self.state.builds.get()
    }

    /// Whether any value has been read.
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        self.state.rendered.get()
    }

    /// Whether the sheet still listens to theme changes.
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.state.tracking.borrow().is_some()
    }
}

impl<V: Clone + 'static> ThemedStyleSheet<V> {
    /// Value of `key` for the active theme.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<V> {
        if !self.state.keys.iter().any(|k| k == key) {
            return None;
        }
        self.state.refresh();
        self.state.snapshot.borrow().get(key).cloned()
    }
}

impl<V: fmt::Debug> fmt::Debug for ThemedStyleSheet<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemedStyleSheet")
            .field("keys", &self.state.keys)
            .field("theme", &*self.state.last_theme.borrow())
            .field("builds", &self.state.builds.get())
            .field("rendered", &self.state.rendered.get())
            .finish()
    }
}
