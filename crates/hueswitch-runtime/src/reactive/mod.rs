#![forbid(unsafe_code)]

//! Reactive primitives.
//!
//! - [`Observable`]: shared value with change notification.
//! - [`Subscription`]: RAII guard for a registered listener.

pub mod observable;

pub use observable::{Observable, Subscription};
