//! Window events delivered by a platform.

/// Keyboard input primitives.
pub mod key;
/// Mouse input primitives.
pub mod mouse;

use geom::{Expanse, Point};
pub use key::{Key, KeyCode, Mods};
pub use mouse::{Button, ScrollDelta};

/// An event addressed to a single window. Coordinates are in window space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    /// A mouse button was pressed.
    MouseDown {
        /// Pointer location.
        point: Point,
        /// The button.
        button: Button,
        /// Modifier state.
        mods: Mods,
    },
    /// A mouse button was released.
    MouseUp {
        /// Pointer location.
        point: Point,
        /// The button.
        button: Button,
        /// Modifier state.
        mods: Mods,
    },
    /// The pointer moved.
    MouseMotion {
        /// Pointer location.
        point: Point,
        /// Modifier state.
        mods: Mods,
    },
    /// A scroll wheel or trackpad gesture.
    Scroll {
        /// Pointer location.
        point: Point,
        /// Scroll amount in notches.
        delta: ScrollDelta,
        /// Modifier state.
        mods: Mods,
    },
    /// A key was pressed.
    KeyDown(Key),
    /// A key was released.
    KeyUp(Key),
    /// The window surface changed size.
    Resize(Expanse),
    /// The platform lost the window contents and needs a full repaint.
    Expose,
    /// The user asked to close the window.
    Close,
}
