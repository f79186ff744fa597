//! Core types for the grove scene graph.

/// Event loop and platform integration.
pub mod backend;
/// Pixel canvases and clipped drawing views.
pub mod canvas;
/// Toolkit-wide configuration.
pub mod config;
/// Debug dump utilities.
pub mod dump;
/// Entity records stored in the arena.
pub mod entity;
/// Core error types.
pub mod error;
/// Input event types.
pub mod event;
/// Focus management.
pub mod focus;
/// Theme lookups.
pub mod theme;
/// Testing utilities.
#[cfg(any(test, feature = "testing"))]
pub mod testing;
/// Per-window state.
pub mod window;

/// Widget context trait and its arena-backed implementation.
pub mod context;
/// Input routing.
mod dispatch;
/// Entity and window identifiers.
pub mod id;
/// Layout and paint passes.
mod render;
/// The entity arena and tree operations.
pub mod world;

pub use backend::Backend;
pub use context::Context;
pub use id::{EntityId, TypedId, WindowId};
pub use world::Core;
