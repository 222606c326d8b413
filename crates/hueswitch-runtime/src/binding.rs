#![forbid(unsafe_code)]

//! Consumer bindings: how mounted UI pieces follow theme changes.
//!
//! hueswitch does not render anything. A host framework represents each
//! mounted consumer with a [`Mount`] and supplies the callback that
//! schedules a re-render. Theme factories subscribe mounts through
//! [`ThemeFactory::use_theme`](crate::ThemeFactory::use_theme),
//! [`ThemeFactory::th`](crate::ThemeFactory::th), and [`WithTheme`].
//!
//! A mount subscribes to each factory at most once, no matter how many
//! times it re-renders, and every subscription ends when the mount is
//! dropped.
//!
//! ```
//! use hueswitch_runtime::{Mount, ThemeFactory};
//! use hueswitch_core::{RawTree, ThemeSet};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let factory = ThemeFactory::new(
//!     ThemeSet::new(["light", "dark"]).unwrap(),
//!     RawTree::new().themed("fg", [("light", "#111"), ("dark", "#eee")]),
//!     None,
//! )
//! .unwrap();
//!
//! let renders = Rc::new(Cell::new(0));
//! let renders_in_host = Rc::clone(&renders);
//! let mount = Mount::new(move || renders_in_host.set(renders_in_host.get() + 1));
//!
//! let fg = factory.th(&mount, |theme| theme.str("fg"));
//! assert_eq!(fg.as_deref(), Some("#111"));
//!
//! factory.set_current_theme("dark").unwrap();
//! assert_eq!(renders.get(), 1);
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::trace;

use crate::config::ThemeConfig;
use crate::factory::ThemeFactory;
use crate::reactive::Subscription;

struct MountState {
    refresh: Box<dyn Fn()>,
    refreshes: Cell<u64>,
    subscriptions: RefCell<Vec<(usize, Subscription)>>,
}

/// A mounted consumer with a host-supplied refresh callback.
///
/// Dropping the mount (or calling [`unmount`](Self::unmount)) releases
/// every theme subscription it holds.
pub struct Mount {
    state: Rc<MountState>,
}

impl Mount {
    /// Create a mount whose re-render is requested through `refresh`.
    pub fn new(refresh: impl Fn() + 'static) -> Self {
        Self {
            state: Rc::new(MountState {
                refresh: Box::new(refresh),
                refreshes: Cell::new(0),
                subscriptions: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Number of refreshes requested so far.
    #[must_use]
    pub fn refresh_count(&self) -> u64 {
        self.state.refreshes.get()
    }

    /// Number of sources this mount is subscribed to.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.state.subscriptions.borrow().len()
    }

    /// End the mount's lifetime now.
    pub fn unmount(self) {}

    pub(crate) fn is_tracking(&self, source: usize) -> bool {
        self.state
            .subscriptions
            .borrow()
            .iter()
            .any(|(id, _)| *id == source)
    }

    pub(crate) fn retain(&self, source: usize, subscription: Subscription) {
        self.state
            .subscriptions
            .borrow_mut()
            .push((source, subscription));
    }

    /// A callback that requests a refresh for as long as the mount lives.
    pub(crate) fn refresher(&self) -> impl Fn() + 'static {
        let weak: Weak<MountState> = Rc::downgrade(&self.state);
        move || {
            if let Some(state) = weak.upgrade() {
                state.refreshes.set(state.refreshes.get() + 1);
                trace!(refreshes = state.refreshes.get(), "mount refresh requested");
                (state.refresh)();
            }
        }
    }
}

impl fmt::Debug for Mount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mount")
            .field("refreshes", &self.refresh_count())
            .field("subscriptions", &self.subscription_count())
            .finish()
    }
}

/// A component wrapped so that rendering injects the live theme config.
///
/// Built by [`ThemeFactory::with_theme`].
pub struct WithTheme<F> {
    factory: ThemeFactory,
    component: F,
}

impl<F> WithTheme<F> {
    pub(crate) fn new(factory: ThemeFactory, component: F) -> Self {
        Self { factory, component }
    }

    /// Render through `mount`: subscribes the mount to theme changes and
    /// calls the wrapped component with `props` and the live config.
    pub fn render<P, O>(&self, mount: &Mount, props: P) -> O
    where
        F: Fn(P, &ThemeConfig) -> O,
    {
        let theme = self.factory.use_theme(mount);
        (self.component)(props, &theme)
    }
}

impl<F> fmt::Debug for WithTheme<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WithTheme")
            .field("factory", &self.factory)
            .finish_non_exhaustive()
    }
}
