use geom::{Expanse, Rect};

use crate::{
    EntityId, WindowId,
    widget::{Capabilities, Capability, Widget},
};

/// Entity data stored in the arena.
pub struct Entity {
    /// Widget behaviour and state. Empty while a callback on this entity is
    /// running.
    pub(crate) widget: Option<Box<dyn Widget>>,
    /// Widget name, cached for logging while the widget is checked out.
    pub(crate) name: &'static str,
    /// Capabilities probed at creation.
    pub(crate) caps: Capabilities,

    /// Parent in the tree.
    pub(crate) parent: Option<EntityId>,
    /// Children in paint order; later children are on top.
    pub(crate) children: Vec<EntityId>,

    /// Assigned rectangle in window coordinates.
    pub(crate) bounds: Rect,
    /// `bounds` intersected with the parent's clipped bounds.
    pub(crate) clipped_bounds: Rect,
    /// Smallest size the entity can usefully occupy.
    pub(crate) min_size: Expanse,

    /// The entity must re-run layout on the next layout pass.
    pub(crate) layout_invalid: bool,
    /// Selection state, managed by a selectable parent.
    pub(crate) selected: bool,
    /// The window whose tree contains this entity. `None` while detached.
    pub(crate) window: Option<WindowId>,
}

impl Entity {
    /// A detached entity wrapping a widget.
    pub(crate) fn new(mut widget: Box<dyn Widget>) -> Self {
        let caps = Capabilities::probe(widget.as_mut());
        Self {
            name: widget.name(),
            widget: Some(widget),
            caps,
            parent: None,
            children: Vec::new(),
            bounds: Rect::zero(),
            clipped_bounds: Rect::zero(),
            min_size: Expanse::default(),
            layout_invalid: false,
            selected: false,
            window: None,
        }
    }

    /// Widget name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Probed capabilities.
    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    /// Shorthand for a capability check.
    pub fn has(&self, c: Capability) -> bool {
        self.caps.has(c)
    }

    /// The parent, if any.
    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    /// Children in paint order.
    pub fn children(&self) -> &[EntityId] {
        &self.children
    }

    /// Assigned bounds.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Visible part of the bounds.
    pub fn clipped_bounds(&self) -> Rect {
        self.clipped_bounds
    }

    /// Declared minimum size.
    pub fn min_size(&self) -> Expanse {
        self.min_size
    }

    /// Is a layout pending?
    pub fn layout_invalid(&self) -> bool {
        self.layout_invalid
    }

    /// Is the entity selected in its container?
    pub fn selected(&self) -> bool {
        self.selected
    }

    /// The containing window, if attached.
    pub fn window(&self) -> Option<WindowId> {
        self.window
    }

    /// Is the entity part of a window tree?
    pub fn is_linked(&self) -> bool {
        self.window.is_some()
    }
}
