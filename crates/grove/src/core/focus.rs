use std::mem;

use tracing::{debug, warn};

use super::world::{Core, Notice};
use crate::{EntityId, WindowId, error::Error, widget::Capability};

/// How a focus request picks its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusDirection {
    /// The next enabled focusable entity after the current focus, in
    /// pre-order.
    Forward,
    /// The previous enabled focusable entity before the current focus, in
    /// pre-order.
    Backward,
    /// Exactly the requesting entity.
    Neutral,
}

/// Trait for managing per-window keyboard focus. Each window has at most one
/// focused entity, and it is always linked to that window.
pub trait FocusManager {
    /// The focused entity in a window.
    fn focused(&self, window: WindowId) -> Option<EntityId>;

    /// Does the entity hold focus in its window?
    fn is_focused(&self, id: EntityId) -> bool;

    /// Is the entity focusable and enabled?
    fn is_enabled(&mut self, id: EntityId) -> bool;

    /// Set or clear focus. The previous and new holders are each notified
    /// once. Returns `true` if focus changed.
    fn set_focus(&mut self, window: WindowId, target: Option<EntityId>) -> bool;

    /// Resolve a request issued by `id` in its window.
    ///
    /// # Panics
    ///
    /// On a [`FocusDirection::Neutral`] request from an entity that is not
    /// focusable.
    fn request_focus(&mut self, id: EntityId, direction: FocusDirection) -> bool;

    /// Enabled focusable entities in a window, in pre-order.
    fn focus_candidates(&mut self, window: WindowId) -> Vec<EntityId>;

    /// Focus the next candidate after the current focus, or the first if
    /// nothing is focused. Clears focus when the end is reached.
    fn focus_next(&mut self, window: WindowId) -> Option<EntityId>;

    /// Focus the previous candidate before the current focus, or the last if
    /// nothing is focused. Clears focus when the start is reached.
    fn focus_prev(&mut self, window: WindowId) -> Option<EntityId>;
}

impl FocusManager for Core {
    fn focused(&self, window: WindowId) -> Option<EntityId> {
        self.window(window).ok().and_then(|w| w.focused)
    }

    fn is_focused(&self, id: EntityId) -> bool {
        self.entity(id)
            .and_then(|e| e.window())
            .is_some_and(|w| self.focused(w) == Some(id))
    }

    fn is_enabled(&mut self, id: EntityId) -> bool {
        if !self.has_capability(id, Capability::Focusable) {
            return false;
        }
        match self.with_widget_mut(id, |w, _| w.as_focusable().is_some_and(|f| f.enabled())) {
            Ok(enabled) => enabled,
            // The entity is running a callback; it is live enough to focus.
            Err(Error::WidgetBusy(_)) => true,
            Err(_) => false,
        }
    }

    fn set_focus(&mut self, window: WindowId, target: Option<EntityId>) -> bool {
        let Some(win) = self.windows.get(window) else {
            return false;
        };
        if win.focused == target {
            return false;
        }
        if let Some(t) = target
            && self.entity(t).and_then(|e| e.window()) != Some(window)
        {
            warn!(?t, ?window, "ignoring focus request for an entity outside the window");
            return false;
        }
        let previous = mem::replace(&mut self.windows[window].focused, target);
        debug!(?window, ?previous, ?target, "focus");
        if let Some(p) = previous {
            self.invalidate(p);
            self.notify(p, Notice::FocusChange);
        }
        if let Some(t) = target {
            self.invalidate(t);
            self.notify(t, Notice::FocusChange);
        }
        true
    }

    fn request_focus(&mut self, id: EntityId, direction: FocusDirection) -> bool {
        let Some(entity) = self.entity(id) else {
            return false;
        };
        if direction == FocusDirection::Neutral {
            assert!(
                entity.has(Capability::Focusable),
                "focus: {} ({id:?}) is not Focusable",
                entity.name()
            );
        }
        let Some(window) = entity.window() else {
            debug!(?id, "ignoring focus request from a detached entity");
            return false;
        };
        let before = self.focused(window);
        match direction {
            FocusDirection::Neutral => {
                self.set_focus(window, Some(id));
            }
            FocusDirection::Forward => {
                self.focus_next(window);
            }
            FocusDirection::Backward => {
                self.focus_prev(window);
            }
        }
        self.focused(window) != before
    }

    fn focus_candidates(&mut self, window: WindowId) -> Vec<EntityId> {
        let Some(root) = self.window(window).ok().and_then(|w| w.root) else {
            return Vec::new();
        };
        self.pre_order(root)
            .into_iter()
            .filter(|id| self.is_enabled(*id))
            .collect()
    }

    fn focus_next(&mut self, window: WindowId) -> Option<EntityId> {
        let Some(root) = self.window(window).ok().and_then(|w| w.root) else {
            return None;
        };
        let order = self.pre_order(root);
        let start = self
            .focused(window)
            .and_then(|f| order.iter().position(|id| *id == f))
            .map_or(0, |i| i + 1);
        let target = order[start..]
            .iter()
            .copied()
            .find(|id| self.is_enabled(*id));
        self.set_focus(window, target);
        target
    }

    fn focus_prev(&mut self, window: WindowId) -> Option<EntityId> {
        let Some(root) = self.window(window).ok().and_then(|w| w.root) else {
            return None;
        };
        let order = self.pre_order(root);
        let end = self
            .focused(window)
            .and_then(|f| order.iter().position(|id| *id == f))
            .unwrap_or(order.len());
        let target = order[..end]
            .iter()
            .rev()
            .copied()
            .find(|id| self.is_enabled(*id));
        self.set_focus(window, target);
        target
    }
}
