//! The widget trait and the capability contracts widgets opt into.

/// Capability traits and the per-entity capability set.
pub mod capability;

use std::any::{Any, type_name};

pub use capability::{
    Capabilities, Capability, Configurable, Container, Focusable, KeyboardTarget, Layoutable,
    MouseTarget, MouseTargetContainer, ScrollBounds, ScrollTarget, Scrollable, Selectable,
    SelectableContainer, Themeable,
};

use crate::{Context, canvas::CanvasView};

/// Widgets are the behaviour attached to entities in the Core arena.
///
/// A widget opts into each capability by overriding the matching `as_*`
/// accessor to return `Some(self)`. The set of capabilities is probed once
/// when the entity is created and must not change afterwards.
pub trait Widget: Any + Send {
    /// Called once, immediately after the entity is created and before it
    /// is attached anywhere. Widgets typically declare their initial minimum
    /// size here.
    fn on_create(&mut self, _ctx: &mut dyn Context) {}

    /// Paint the widget. The canvas view is clipped to the entity's visible
    /// bounds. Children paint themselves.
    fn paint(&mut self, _canvas: &mut CanvasView<'_>, _ctx: &mut dyn Context) {}

    /// Name used in logs and dumps.
    fn name(&self) -> &'static str {
        let name = type_name::<Self>();
        name.rsplit("::").next().unwrap_or(name)
    }

    /// Layout capability.
    fn as_layoutable(&mut self) -> Option<&mut dyn Layoutable> {
        None
    }

    /// Container capability. Only containers may adopt children.
    fn as_container(&mut self) -> Option<&mut dyn Container> {
        None
    }

    /// Focus capability.
    fn as_focusable(&mut self) -> Option<&mut dyn Focusable> {
        None
    }

    /// Keyboard capability.
    fn as_keyboard_target(&mut self) -> Option<&mut dyn KeyboardTarget> {
        None
    }

    /// Direct mouse capability.
    fn as_mouse_target(&mut self) -> Option<&mut dyn MouseTarget> {
        None
    }

    /// Observes mouse presses on descendants.
    fn as_mouse_target_container(&mut self) -> Option<&mut dyn MouseTargetContainer> {
        None
    }

    /// Receives scroll gestures over itself or its descendants.
    fn as_scroll_target(&mut self) -> Option<&mut dyn ScrollTarget> {
        None
    }

    /// Exposes a scrollable viewport to its container.
    fn as_scrollable(&mut self) -> Option<&mut dyn Scrollable> {
        None
    }

    /// Selection capability.
    fn as_selectable(&mut self) -> Option<&mut dyn Selectable> {
        None
    }

    /// Permits selecting children.
    fn as_selectable_container(&mut self) -> Option<&mut dyn SelectableContainer> {
        None
    }

    /// Reacts to theme changes.
    fn as_themeable(&mut self) -> Option<&mut dyn Themeable> {
        None
    }

    /// Reacts to configuration changes.
    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        None
    }
}

/// Convert widgets into boxed trait objects.
impl<W> From<W> for Box<dyn Widget>
where
    W: Widget + 'static,
{
    fn from(widget: W) -> Self {
        Box::new(widget)
    }
}

/// Downcast a widget to its concrete type.
pub(crate) fn downcast_mut<W: Widget>(widget: &mut dyn Widget) -> Option<&mut W> {
    (widget as &mut dyn Any).downcast_mut::<W>()
}
