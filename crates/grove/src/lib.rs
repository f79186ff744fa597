//! Grove: a retained-mode scene graph for windowed user interfaces.
//!
//! Grove keeps a tree of entities per window. Each entity owns a rectangle in
//! window coordinates, a clipped copy of that rectangle, and a widget that
//! opts into behaviour by exposing capabilities (layout, painting, focus,
//! mouse and keyboard input, scrolling, selection, theming).
//!
//! Changes flow through a three stage pipeline. Widgets *invalidate*
//! themselves, the window re-runs *layout* for dirty subtrees, and then
//! *paints* every damaged entity clipped to its visible area. The union of
//! the painted regions is handed to the platform.
//!
//! # Module Organization
//!
//! - [`Core`] - the entity arena, windows, theme and configuration
//! - [`Context`] - the control surface handed to widget callbacks
//! - [`widget`] - the [`Widget`] trait and capability traits
//! - [`backend`] - the event loop and the [`backend::Platform`] seam
//! - [`widgets`] - reference widgets built on the public API

#![warn(missing_docs)]

mod core;

pub mod widget;
pub mod widgets;

pub use geom;

#[cfg(any(test, feature = "testing"))]
pub use core::testing;
pub use core::{
    Backend, Context, Core, EntityId, TypedId, WindowId, backend, canvas, config, context, dump,
    entity, error, event, focus, theme, window,
};

pub use error::{Error, Result};
pub use widget::Widget;
