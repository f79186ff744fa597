//! Capability contracts. Each trait is an independent, optional behaviour;
//! the core routes work to an entity only if its widget exposes the matching
//! capability.
use geom::{Point, Rect};

use super::Widget;
use crate::{
    Context, EntityId,
    event::{Button, Key, Mods, ScrollDelta},
};

/// Entities that position their children or otherwise react to their own
/// bounds changing.
pub trait Layoutable {
    /// Recompute the layout. Called when the entity or an ancestor was
    /// marked layout-dirty. Containers call `place_child` here.
    fn layout(&mut self, ctx: &mut dyn Context);
}

/// Entities that may hold children.
pub trait Container {
    /// A child's minimum size changed. The default requests a relayout.
    fn handle_child_minimum_size_change(&mut self, _child: EntityId, ctx: &mut dyn Context) {
        ctx.invalidate_layout();
    }

    /// A child was adopted, inserted or disowned.
    fn handle_children_change(&mut self, _ctx: &mut dyn Context) {}

    /// A scrollable child's content or viewport changed.
    fn handle_child_scroll_bounds_change(&mut self, _child: EntityId, _ctx: &mut dyn Context) {}
}

/// Entities that can hold keyboard focus.
pub trait Focusable {
    /// Disabled entities are skipped by focus traversal.
    fn enabled(&self) -> bool {
        true
    }

    /// Focus was gained or lost. Query `ctx.focused()` for the new state.
    fn handle_focus_change(&mut self, _ctx: &mut dyn Context) {}
}

/// Entities that receive key events while focused.
pub trait KeyboardTarget {
    /// A key was pressed.
    fn handle_key_down(&mut self, key: Key, ctx: &mut dyn Context);

    /// A key was released.
    fn handle_key_up(&mut self, _key: Key, _ctx: &mut dyn Context) {}
}

/// Entities that receive mouse events directly.
pub trait MouseTarget {
    /// A button was pressed over the entity. The entity captures that button
    /// until it is released.
    fn handle_mouse_down(
        &mut self,
        point: Point,
        button: Button,
        mods: Mods,
        ctx: &mut dyn Context,
    );

    /// A captured button was released, wherever the pointer now is.
    fn handle_mouse_up(
        &mut self,
        _point: Point,
        _button: Button,
        _mods: Mods,
        _ctx: &mut dyn Context,
    ) {
    }

    /// The pointer moved over the entity, or anywhere while it holds a
    /// capture.
    fn handle_motion(&mut self, _point: Point, _mods: Mods, _ctx: &mut dyn Context) {}
}

/// Containers that observe mouse presses landing on any descendant.
pub trait MouseTargetContainer {
    /// A button was pressed over `child`, the deepest entity under the
    /// pointer.
    fn handle_child_mouse_down(
        &mut self,
        point: Point,
        button: Button,
        mods: Mods,
        child: EntityId,
        ctx: &mut dyn Context,
    );

    /// A button captured by the descendant `child` was released.
    fn handle_child_mouse_up(
        &mut self,
        _point: Point,
        _button: Button,
        _mods: Mods,
        _child: EntityId,
        _ctx: &mut dyn Context,
    ) {
    }
}

/// Entities that consume scroll gestures over themselves or their
/// descendants. The deepest such entity under the pointer wins.
pub trait ScrollTarget {
    /// A scroll gesture.
    fn handle_scroll(&mut self, point: Point, delta: ScrollDelta, mods: Mods, ctx: &mut dyn Context);
}

/// Entities that present a viewport onto larger content.
pub trait Scrollable {
    /// The full content extent, relative to the content origin.
    fn content_bounds(&self) -> Rect;

    /// The visible part of the content, relative to the content origin.
    fn viewport_bounds(&self) -> Rect;

    /// Move the viewport origin.
    fn scroll_to(&mut self, origin: Point, ctx: &mut dyn Context);

    /// Which axes scroll, as `(horizontal, vertical)`.
    fn scroll_axes(&self) -> (bool, bool) {
        (true, true)
    }
}

/// A snapshot of a scrollable entity's geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollBounds {
    /// Full content extent.
    pub content: Rect,
    /// Visible part of the content.
    pub viewport: Rect,
    /// Scrolls horizontally.
    pub horizontal: bool,
    /// Scrolls vertically.
    pub vertical: bool,
}

/// Entities with a selection state managed by their container.
pub trait Selectable {
    /// The selection state changed. Query `ctx.selected()` for the new
    /// state.
    fn handle_selection_change(&mut self, ctx: &mut dyn Context);
}

/// Containers whose children may be selected.
pub trait SelectableContainer {
    /// When false, selecting a child deselects its siblings.
    fn multi_select(&self) -> bool {
        false
    }
}

/// Entities that react to the active theme changing.
pub trait Themeable {
    /// The theme changed.
    fn handle_theme_change(&mut self, ctx: &mut dyn Context);
}

/// Entities that react to the active configuration changing.
pub trait Configurable {
    /// The configuration changed.
    fn handle_config_change(&mut self, ctx: &mut dyn Context);
}

/// Names for the individual capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// [`Layoutable`]
    Layoutable,
    /// [`Container`]
    Container,
    /// [`Focusable`]
    Focusable,
    /// [`KeyboardTarget`]
    KeyboardTarget,
    /// [`MouseTarget`]
    MouseTarget,
    /// [`MouseTargetContainer`]
    MouseTargetContainer,
    /// [`ScrollTarget`]
    ScrollTarget,
    /// [`Scrollable`]
    Scrollable,
    /// [`Selectable`]
    Selectable,
    /// [`SelectableContainer`]
    SelectableContainer,
    /// [`Themeable`]
    Themeable,
    /// [`Configurable`]
    Configurable,
}

impl Capability {
    /// All capabilities.
    pub const ALL: [Self; 12] = [
        Self::Layoutable,
        Self::Container,
        Self::Focusable,
        Self::KeyboardTarget,
        Self::MouseTarget,
        Self::MouseTargetContainer,
        Self::ScrollTarget,
        Self::Scrollable,
        Self::Selectable,
        Self::SelectableContainer,
        Self::Themeable,
        Self::Configurable,
    ];

    /// Bit used in a [`Capabilities`] set.
    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

/// The capability set of an entity, probed once at creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// One bit per [`Capability`].
    bits: u16,
    /// Cached [`SelectableContainer::multi_select`].
    multi_select: bool,
}

impl Capabilities {
    /// Probe a widget's accessors.
    pub fn probe(w: &mut dyn Widget) -> Self {
        let mut caps = Self::default();
        let mut mark = |c: Capability, present: bool| {
            if present {
                caps.bits |= c.bit();
            }
        };
        mark(Capability::Layoutable, w.as_layoutable().is_some());
        mark(Capability::Container, w.as_container().is_some());
        mark(Capability::Focusable, w.as_focusable().is_some());
        mark(Capability::KeyboardTarget, w.as_keyboard_target().is_some());
        mark(Capability::MouseTarget, w.as_mouse_target().is_some());
        mark(
            Capability::MouseTargetContainer,
            w.as_mouse_target_container().is_some(),
        );
        mark(Capability::ScrollTarget, w.as_scroll_target().is_some());
        mark(Capability::Scrollable, w.as_scrollable().is_some());
        mark(Capability::Selectable, w.as_selectable().is_some());
        mark(Capability::Themeable, w.as_themeable().is_some());
        mark(Capability::Configurable, w.as_configurable().is_some());
        if let Some(s) = w.as_selectable_container() {
            caps.bits |= Capability::SelectableContainer.bit();
            caps.multi_select = s.multi_select();
        }
        caps
    }

    /// Does the set include a capability?
    pub fn has(&self, c: Capability) -> bool {
        self.bits & c.bit() != 0
    }

    /// Does a selectable container allow more than one selected child?
    pub fn multi_select(&self) -> bool {
        self.multi_select
    }

    /// The capabilities present, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL.into_iter().filter(|c| self.has(*c))
    }
}
