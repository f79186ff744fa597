use std::collections::HashSet;

use geom::Expanse;

use crate::{EntityId, canvas::Canvas, event::Button};

/// Surface changes the platform must apply on the next refresh.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceRequest {
    /// A new minimum window size.
    pub minimum: Option<Expanse>,
    /// A new window size.
    pub resize: Option<Expanse>,
}

impl SurfaceRequest {
    /// True if there is nothing to apply.
    pub fn is_empty(&self) -> bool {
        self.minimum.is_none() && self.resize.is_none()
    }
}

/// Per-window state: the root entity, the canvas it paints into, focus and
/// drag capture, and the pending damage.
#[derive(Debug, Default)]
pub struct Window {
    /// Root of the window's tree.
    pub(crate) root: Option<EntityId>,
    /// Surface size. Stays valid while the canvas is moved out for painting.
    pub(crate) size: Expanse,
    /// Paint target. Moved out while a paint pass is running.
    pub(crate) canvas: Canvas,
    /// Entity holding keyboard focus.
    pub(crate) focused: Option<EntityId>,
    /// Drag owner per mouse button, indexed by [`Button::index`].
    pub(crate) drags: [Option<EntityId>; Button::COUNT],
    /// Entities needing repaint.
    pub(crate) damage: HashSet<EntityId>,
    /// Some entity in this window has a pending layout.
    pub(crate) layout_dirty: bool,
    /// A paint pass is running; invalidations are ignored.
    pub(crate) painting: bool,
    /// A resize requested mid-paint, applied once the pass ends.
    pub(crate) deferred_resize: Option<Expanse>,
    /// The root's minimum size, mirrored onto the platform window.
    pub(crate) min_size: Expanse,
    /// Changes waiting to be forwarded to the platform.
    pub(crate) surface: SurfaceRequest,
}

impl Window {
    /// A window with a blank canvas.
    pub(crate) fn new(size: Expanse) -> Self {
        Self {
            size,
            canvas: Canvas::new(size),
            ..Default::default()
        }
    }

    /// The root entity.
    pub fn root(&self) -> Option<EntityId> {
        self.root
    }

    /// Current surface size.
    pub fn size(&self) -> Expanse {
        self.size
    }

    /// The last painted canvas.
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// The focused entity.
    pub fn focused(&self) -> Option<EntityId> {
        self.focused
    }

    /// The entity capturing a button.
    pub fn drag_owner(&self, button: Button) -> Option<EntityId> {
        self.drags[button.index()]
    }

    /// Is the entity waiting to be repainted?
    pub fn is_damaged(&self, id: EntityId) -> bool {
        self.damage.contains(&id)
    }

    /// Number of entities waiting to be repainted.
    pub fn damage_len(&self) -> usize {
        self.damage.len()
    }

    /// Is a layout pass pending?
    pub fn layout_dirty(&self) -> bool {
        self.layout_dirty
    }

    /// The minimum size the root declared.
    pub fn min_size(&self) -> Expanse {
        self.min_size
    }

    /// Surface changes not yet forwarded to the platform.
    pub fn pending_surface(&self) -> SurfaceRequest {
        self.surface
    }
}
