use std::any::{Any, type_name};

use geom::{Expanse, Point, Rect};

use super::{
    focus::{FocusDirection, FocusManager},
    id::{EntityId, TypedId, WindowId},
    world::Core,
};
use crate::{
    config::Config,
    entity::Entity,
    error::{Error, Result},
    theme::Theme,
    widget::{ScrollBounds, Widget},
};

/// The control surface handed to every widget callback. A context is bound
/// to one entity; operations without an explicit target apply to it.
///
/// Child-management operations require the bound entity to be a container
/// and panic otherwise, as do out-of-range indices.
pub trait Context {
    /// The entity this context is bound to.
    fn entity(&self) -> EntityId;

    /// The window the entity belongs to, if attached.
    fn window(&self) -> Option<WindowId>;

    /// Assigned bounds, in window coordinates.
    fn bounds(&self) -> Rect;

    /// The visible part of the bounds.
    fn clipped_bounds(&self) -> Rect;

    /// The declared minimum size.
    fn minimum_size(&self) -> Expanse;

    /// Mark the entity for repaint.
    fn invalidate(&mut self);

    /// Mark the entity for layout. Ignored unless the entity is layoutable.
    fn invalidate_layout(&mut self);

    /// Declare a new minimum size, notifying the parent if it changed.
    fn set_minimum_size(&mut self, size: Expanse);

    /// Create a detached entity, typically a child-to-be.
    fn create(&mut self, widget: Box<dyn Widget>) -> EntityId;

    /// Append a detached entity as the last child.
    fn adopt(&mut self, child: EntityId);

    /// Insert a detached entity at `index`.
    fn insert(&mut self, index: usize, child: EntityId);

    /// Detach the child at `index` and return it.
    fn disown(&mut self, index: usize) -> EntityId;

    /// The child at `index`.
    fn child(&self, index: usize) -> EntityId;

    /// Number of children.
    fn child_count(&self) -> usize;

    /// Position of a direct child.
    fn index_of(&self, child: EntityId) -> Option<usize>;

    /// Index of the child whose subtree contains `descendant`.
    fn child_index_containing(&self, descendant: EntityId) -> Option<usize>;

    /// Assign bounds to the child at `index`.
    fn place_child(&mut self, index: usize, bounds: Rect);

    /// Bounds of the child at `index`.
    fn child_bounds(&self, index: usize) -> Rect;

    /// Minimum size of the child at `index`.
    fn child_minimum_size(&self, index: usize) -> Expanse;

    /// Take keyboard focus.
    ///
    /// # Panics
    ///
    /// If the entity is not focusable.
    fn focus(&mut self);

    /// Does the entity hold focus?
    fn focused(&self) -> bool;

    /// Move focus to the next enabled focusable entity in the window.
    fn focus_next(&mut self);

    /// Move focus to the previous enabled focusable entity in the window.
    fn focus_previous(&mut self);

    /// Is the entity selected in its container?
    fn selected(&self) -> bool;

    /// Is the child at `index` selected?
    fn child_selected(&self, index: usize) -> bool;

    /// Select or deselect the child at `index`.
    fn select_child(&mut self, index: usize, selected: bool);

    /// Tell the parent that this entity's scroll geometry changed.
    fn notify_scroll_bounds_change(&mut self);

    /// Scroll geometry of the child at `index`, if it is scrollable.
    fn child_scroll_bounds(&mut self, index: usize) -> Option<ScrollBounds>;

    /// Move the viewport of the scrollable child at `index`.
    fn scroll_child_to(&mut self, index: usize, origin: Point);

    /// The active theme.
    fn theme(&self) -> &dyn Theme;

    /// The active configuration.
    fn config(&self) -> &Config;

    /// Execute a closure with mutable access to another entity's widget.
    fn with_widget_mut(
        &mut self,
        id: EntityId,
        f: &mut dyn FnMut(&mut dyn Widget, &mut dyn Context),
    ) -> Result<()>;
}

impl dyn Context + '_ {
    /// Execute a closure with mutable access to a widget of type `W`.
    pub fn with_widget<W, R>(
        &mut self,
        id: EntityId,
        f: impl FnOnce(&mut W, &mut dyn Context) -> R,
    ) -> Result<R>
    where
        W: Widget + 'static,
    {
        let mut f = Some(f);
        let mut output = None;
        self.with_widget_mut(id, &mut |widget, ctx| {
            let any = widget as &mut dyn Any;
            if let (Some(widget), Some(f)) = (any.downcast_mut::<W>(), f.take()) {
                output = Some(f(widget, ctx));
            }
        })?;
        output.ok_or(Error::TypeMismatch(type_name::<W>()))
    }

    /// Execute a closure with mutable access to a widget using a typed id.
    pub fn with_typed<W, R>(
        &mut self,
        id: TypedId<W>,
        f: impl FnOnce(&mut W, &mut dyn Context) -> R,
    ) -> Result<R>
    where
        W: Widget + 'static,
    {
        self.with_widget(id.into(), f)
    }

    /// Execute a closure against the child at `index`.
    pub fn with_child<W, R>(
        &mut self,
        index: usize,
        f: impl FnOnce(&mut W, &mut dyn Context) -> R,
    ) -> Result<R>
    where
        W: Widget + 'static,
    {
        let id = self.child(index);
        self.with_widget(id, f)
    }
}

/// A [`Context`] backed by the core arena.
pub struct EntityContext<'a> {
    /// Core state.
    core: &'a mut Core,
    /// The bound entity.
    id: EntityId,
}

impl<'a> EntityContext<'a> {
    /// Bind a context to an entity.
    pub fn new(core: &'a mut Core, id: EntityId) -> Self {
        Self { core, id }
    }

    /// Read a field of the bound entity, or its default if the entity was
    /// removed.
    fn read<T: Default>(&self, f: impl FnOnce(&Entity) -> T) -> T {
        self.core.entity(self.id).map(f).unwrap_or_default()
    }
}

impl Context for EntityContext<'_> {
    fn entity(&self) -> EntityId {
        self.id
    }

    fn window(&self) -> Option<WindowId> {
        self.read(|e| e.window)
    }

    fn bounds(&self) -> Rect {
        self.read(|e| e.bounds)
    }

    fn clipped_bounds(&self) -> Rect {
        self.read(|e| e.clipped_bounds)
    }

    fn minimum_size(&self) -> Expanse {
        self.read(|e| e.min_size)
    }

    fn invalidate(&mut self) {
        self.core.invalidate(self.id);
    }

    fn invalidate_layout(&mut self) {
        self.core.invalidate_layout(self.id);
    }

    fn set_minimum_size(&mut self, size: Expanse) {
        self.core.set_minimum_size(self.id, size);
    }

    fn create(&mut self, widget: Box<dyn Widget>) -> EntityId {
        self.core.create_boxed(widget)
    }

    fn adopt(&mut self, child: EntityId) {
        self.core.adopt(self.id, child);
    }

    fn insert(&mut self, index: usize, child: EntityId) {
        self.core.insert(self.id, index, child);
    }

    fn disown(&mut self, index: usize) -> EntityId {
        self.core.disown(self.id, index)
    }

    fn child(&self, index: usize) -> EntityId {
        self.core.child(self.id, index)
    }

    fn child_count(&self) -> usize {
        self.core.children(self.id).len()
    }

    fn index_of(&self, child: EntityId) -> Option<usize> {
        self.core.index_of(self.id, child)
    }

    fn child_index_containing(&self, descendant: EntityId) -> Option<usize> {
        self.core.child_index_containing(self.id, descendant)
    }

    fn place_child(&mut self, index: usize, bounds: Rect) {
        self.core.place_child(self.id, index, bounds);
    }

    fn child_bounds(&self, index: usize) -> Rect {
        let child = self.core.child(self.id, index);
        self.core.entities[child].bounds
    }

    fn child_minimum_size(&self, index: usize) -> Expanse {
        let child = self.core.child(self.id, index);
        self.core.entities[child].min_size
    }

    fn focus(&mut self) {
        self.core.request_focus(self.id, FocusDirection::Neutral);
    }

    fn focused(&self) -> bool {
        self.core.is_focused(self.id)
    }

    fn focus_next(&mut self) {
        self.core.request_focus(self.id, FocusDirection::Forward);
    }

    fn focus_previous(&mut self) {
        self.core.request_focus(self.id, FocusDirection::Backward);
    }

    fn selected(&self) -> bool {
        self.core.is_selected(self.id)
    }

    fn child_selected(&self, index: usize) -> bool {
        self.core.is_selected(self.core.child(self.id, index))
    }

    fn select_child(&mut self, index: usize, selected: bool) {
        self.core.select_child(self.id, index, selected);
    }

    fn notify_scroll_bounds_change(&mut self) {
        self.core.notify_scroll_bounds_change(self.id);
    }

    fn child_scroll_bounds(&mut self, index: usize) -> Option<ScrollBounds> {
        let child = self.core.child(self.id, index);
        self.core.scroll_bounds(child)
    }

    fn scroll_child_to(&mut self, index: usize, origin: Point) {
        let child = self.core.child(self.id, index);
        self.core.scroll_to(child, origin);
    }

    fn theme(&self) -> &dyn Theme {
        self.core.theme()
    }

    fn config(&self) -> &Config {
        self.core.config()
    }

    fn with_widget_mut(
        &mut self,
        id: EntityId,
        f: &mut dyn FnMut(&mut dyn Widget, &mut dyn Context),
    ) -> Result<()> {
        self.core
            .with_widget_mut(id, |widget, core| f(widget, &mut EntityContext::new(core, id)))
    }
}
