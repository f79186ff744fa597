use std::{any::type_name, collections::HashSet, mem};

use geom::{Expanse, Point, Rect};
use slotmap::SlotMap;
use tracing::{debug, trace, warn};

use super::{
    dispatch,
    render::{self, LayoutPass},
};
use crate::{
    Context, EntityId, TypedId, WindowId,
    canvas::Canvas,
    config::Config,
    context::EntityContext,
    entity::Entity,
    error::{Error, Result},
    event::{Button, Key, Mods, ScrollDelta, WindowEvent},
    theme::{DefaultTheme, Theme},
    widget::{Capability, ScrollBounds, Widget, downcast_mut},
    window::{SurfaceRequest, Window},
};

/// A callback owed to a widget. Notices raised while the target widget is
/// running a callback of its own are queued and delivered when it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Notice {
    /// [`Focusable::handle_focus_change`](crate::widget::Focusable::handle_focus_change)
    FocusChange,
    /// [`Selectable::handle_selection_change`](crate::widget::Selectable::handle_selection_change)
    SelectionChange,
    /// [`Themeable::handle_theme_change`](crate::widget::Themeable::handle_theme_change)
    ThemeChange,
    /// [`Configurable::handle_config_change`](crate::widget::Configurable::handle_config_change)
    ConfigChange,
    /// [`Container::handle_child_minimum_size_change`](crate::widget::Container::handle_child_minimum_size_change)
    ChildMinimumSizeChange(EntityId),
    /// [`Container::handle_children_change`](crate::widget::Container::handle_children_change)
    ChildrenChange,
    /// [`Container::handle_child_scroll_bounds_change`](crate::widget::Container::handle_child_scroll_bounds_change)
    ChildScrollBoundsChange(EntityId),
}

/// The entity arena, the windows, and the theme and configuration they
/// share.
///
/// Entities are created detached. Attaching one to a window, directly as the
/// root or through a chain of parents, *links* its whole subtree: every
/// entity learns its window and is marked for layout and repaint. Detaching
/// reverses this and scrubs the subtree from the window's focus, drag and
/// damage state. Detached entities stay in the arena until [`Core::remove`].
pub struct Core {
    /// Entity arena.
    pub(crate) entities: SlotMap<EntityId, Entity>,
    /// Open windows.
    pub(crate) windows: SlotMap<WindowId, Window>,
    /// Active theme.
    theme: Box<dyn Theme>,
    /// Active configuration.
    config: Config,
    /// Notices waiting for a busy widget.
    pending: Vec<(EntityId, Notice)>,
}

impl Default for Core {
    fn default() -> Self {
        Self::new(Config::default(), DefaultTheme)
    }
}

impl Core {
    /// An empty core with no windows.
    pub fn new(config: Config, theme: impl Theme + 'static) -> Self {
        Self {
            entities: SlotMap::with_key(),
            windows: SlotMap::with_key(),
            theme: Box::new(theme),
            config,
            pending: Vec::new(),
        }
    }

    /// Create a detached entity.
    pub fn create<W>(&mut self, widget: W) -> EntityId
    where
        W: Widget + 'static,
    {
        self.create_boxed(Box::new(widget))
    }

    /// Create a detached entity and keep its widget type.
    pub fn create_typed<W>(&mut self, widget: W) -> TypedId<W>
    where
        W: Widget + 'static,
    {
        TypedId::new(self.create(widget))
    }

    /// Create a detached entity from a boxed widget.
    pub fn create_boxed(&mut self, widget: Box<dyn Widget>) -> EntityId {
        let entity = Entity::new(widget);
        let name = entity.name;
        let id = self.entities.insert(entity);
        trace!(?id, name, "create entity");
        self.call(id, |w, ctx| w.on_create(ctx));
        id
    }

    /// Free a detached entity and its subtree.
    ///
    /// # Panics
    ///
    /// If the entity is still attached to a parent or a window.
    pub fn remove(&mut self, id: EntityId) {
        let Some(entity) = self.entities.get(id) else {
            return;
        };
        assert!(
            entity.parent.is_none() && entity.window.is_none(),
            "remove: {} ({id:?}) is still attached",
            entity.name
        );
        for id in self.pre_order(id) {
            self.entities.remove(id);
        }
        self.pending.retain(|(t, _)| self.entities.contains_key(*t));
    }

    /// Is the id live? Deferred callbacks holding an id should check this.
    pub fn contains(&self, id: impl Into<EntityId>) -> bool {
        self.entities.contains_key(id.into())
    }

    /// Look up an entity.
    pub fn entity(&self, id: impl Into<EntityId>) -> Option<&Entity> {
        self.entities.get(id.into())
    }

    /// Number of entities in the arena, attached or not.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Look up an entity that a caller asserts is live.
    fn expect(&self, id: EntityId, op: &str) -> &Entity {
        match self.entities.get(id) {
            Some(e) => e,
            None => panic!("{op}: unknown entity {id:?}"),
        }
    }

    /// Look up an entity that must carry a capability.
    fn expect_capability(&self, id: EntityId, c: Capability, op: &str) -> &Entity {
        let e = self.expect(id, op);
        assert!(e.caps.has(c), "{op}: {} ({id:?}) is not {c:?}", e.name);
        e
    }

    /// Does the entity exist and carry the capability?
    pub fn has_capability(&self, id: EntityId, c: Capability) -> bool {
        self.entities.get(id).is_some_and(|e| e.caps.has(c))
    }

    /// The entity's parent.
    pub fn parent(&self, id: EntityId) -> Option<EntityId> {
        self.entities.get(id).and_then(|e| e.parent)
    }

    /// The entity's children, in paint order.
    pub fn children(&self, id: EntityId) -> &[EntityId] {
        self.entities
            .get(id)
            .map_or(&[][..], |e| e.children.as_slice())
    }

    /// A container's child by index.
    ///
    /// # Panics
    ///
    /// If `parent` is not a container or the index is out of range.
    pub fn child(&self, parent: EntityId, index: usize) -> EntityId {
        let e = self.expect_capability(parent, Capability::Container, "child");
        match e.children.get(index) {
            Some(c) => *c,
            None => panic!(
                "child: index {index} out of range for {} children of {}",
                e.children.len(),
                e.name
            ),
        }
    }

    /// Position of `child` among the children of `parent`.
    pub fn index_of(&self, parent: EntityId, child: EntityId) -> Option<usize> {
        self.children(parent).iter().position(|c| *c == child)
    }

    /// Index of the child of `parent` whose subtree contains `descendant`.
    pub fn child_index_containing(&self, parent: EntityId, descendant: EntityId) -> Option<usize> {
        let mut current = descendant;
        loop {
            let up = self.parent(current)?;
            if up == parent {
                return self.index_of(parent, current);
            }
            current = up;
        }
    }

    /// Is `ancestor` a strict ancestor of `id`?
    pub fn is_ancestor(&self, ancestor: EntityId, id: EntityId) -> bool {
        let mut current = self.parent(id);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.parent(p);
        }
        false
    }

    /// The subtree at `root` in pre-order: each entity before its children,
    /// children in paint order.
    pub fn pre_order(&self, root: EntityId) -> Vec<EntityId> {
        let mut out = Vec::new();
        if !self.entities.contains_key(root) {
            return out;
        }
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        out
    }

    /// The deepest entity under `point`, starting at `id`. Later siblings
    /// win where children overlap. Returns `id` itself if no child contains
    /// the point.
    pub fn child_at(&self, id: EntityId, point: Point) -> EntityId {
        let mut current = id;
        while let Some(hit) = self
            .children(current)
            .iter()
            .rev()
            .find(|c| self.entities[**c].bounds.contains_point(point))
        {
            current = *hit;
        }
        current
    }

    /// The deepest entity on the hit path under `point` that accepts scroll
    /// gestures.
    pub fn scroll_target_at(&self, id: EntityId, point: Point) -> Option<EntityId> {
        let hit = self.child_at(id, point);
        let mut current = Some(hit);
        while let Some(c) = current {
            if self.has_capability(c, Capability::ScrollTarget) {
                return Some(c);
            }
            if c == id {
                break;
            }
            current = self.parent(c);
        }
        None
    }

    /// Append a detached entity to a container.
    ///
    /// # Panics
    ///
    /// See [`Core::insert`].
    pub fn adopt(&mut self, parent: EntityId, child: EntityId) {
        let n = self
            .expect_capability(parent, Capability::Container, "adopt")
            .children
            .len();
        self.insert(parent, n, child);
    }

    /// Insert a detached entity into a container at `index`. If the
    /// container is part of a window, the child's subtree is linked to it.
    ///
    /// # Panics
    ///
    /// If `parent` is not a container, the index is past the end, the child
    /// already has a parent or is a window root, or the adoption would form
    /// a cycle.
    pub fn insert(&mut self, parent: EntityId, index: usize, child: EntityId) {
        let len = self
            .expect_capability(parent, Capability::Container, "insert")
            .children
            .len();
        assert!(
            index <= len,
            "insert: index {index} out of range for {len} children"
        );
        let c = self.expect(child, "insert");
        assert!(
            c.parent.is_none(),
            "insert: {} ({child:?}) already has a parent",
            c.name
        );
        assert!(
            c.window.is_none(),
            "insert: {} ({child:?}) is the root of a window",
            c.name
        );
        assert!(
            child != parent && !self.is_ancestor(child, parent),
            "insert: adopting {child:?} would create a cycle"
        );

        self.entities[parent].children.insert(index, child);
        self.entities[child].parent = Some(parent);
        let clip = self.entities[parent].clipped_bounds;
        self.reclip(child, clip);
        if let Some(window) = self.entities[parent].window {
            self.link(child, window);
        }
        trace!(?parent, ?child, index, "adopt");
        self.invalidate_layout(parent);
        self.notify(parent, Notice::ChildrenChange);
        self.debug_assert_tree_invariants();
    }

    /// Detach the child at `index` from a container and return it. The
    /// child's subtree is unlinked from its window but stays in the arena.
    ///
    /// # Panics
    ///
    /// If `parent` is not a container or the index is out of range.
    pub fn disown(&mut self, parent: EntityId, index: usize) -> EntityId {
        let len = self
            .expect_capability(parent, Capability::Container, "disown")
            .children
            .len();
        assert!(
            index < len,
            "disown: index {index} out of range for {len} children"
        );
        let child = self.entities[parent].children.remove(index);
        let c = &mut self.entities[child];
        c.parent = None;
        c.selected = false;
        self.unlink(child);
        trace!(?parent, ?child, index, "disown");
        self.invalidate(parent);
        self.invalidate_layout(parent);
        self.notify(parent, Notice::ChildrenChange);
        self.debug_assert_tree_invariants();
        child
    }

    /// Assign bounds to the child at `index`, recompute clipping below it,
    /// and mark it for layout and repaint.
    ///
    /// # Panics
    ///
    /// If `parent` is not a container or the index is out of range.
    pub fn place_child(&mut self, parent: EntityId, index: usize, bounds: Rect) {
        let child = self.child(parent, index);
        let previous = mem::replace(&mut self.entities[child].bounds, bounds);
        let clip = self.entities[parent].clipped_bounds;
        self.reclip(child, clip);
        if previous != bounds {
            // The parent shows through where the child used to be.
            self.invalidate(parent);
        }
        self.invalidate(child);
        self.invalidate_layout(child);
    }

    /// Recompute clipped bounds for a subtree below a parent clip.
    fn reclip(&mut self, root: EntityId, parent_clip: Rect) {
        let mut stack = vec![(root, parent_clip)];
        while let Some((id, clip)) = stack.pop() {
            let e = &mut self.entities[id];
            e.clipped_bounds = e.bounds.intersect(clip).unwrap_or_default();
            let clip = e.clipped_bounds;
            stack.extend(e.children.iter().map(|c| (*c, clip)));
        }
    }

    /// Attach a subtree to a window, marking everything for layout and
    /// repaint.
    fn link(&mut self, root: EntityId, window: WindowId) {
        for id in self.pre_order(root) {
            self.entities[id].window = Some(window);
            self.invalidate(id);
            self.invalidate_layout(id);
        }
    }

    /// Detach a subtree from its window, scrubbing it from the window's
    /// focus, drag and damage state.
    fn unlink(&mut self, root: EntityId) {
        let Some(window) = self.entities.get(root).and_then(|e| e.window) else {
            return;
        };
        let subtree = self.pre_order(root);
        let mut lost_focus = None;
        if let Some(win) = self.windows.get_mut(window) {
            for id in &subtree {
                win.damage.remove(id);
                if win.focused == Some(*id) {
                    win.focused = None;
                    lost_focus = Some(*id);
                }
                for slot in win.drags.iter_mut().filter(|s| **s == Some(*id)) {
                    *slot = None;
                }
            }
        }
        for id in &subtree {
            let e = &mut self.entities[*id];
            e.window = None;
            e.layout_invalid = false;
        }
        if let Some(id) = lost_focus {
            debug!(?id, "focused entity detached");
            self.notify(id, Notice::FocusChange);
        }
    }

    /// Mark an entity for repaint. No-op for detached or stale entities, and
    /// ignored while its window is painting.
    pub fn invalidate(&mut self, id: EntityId) {
        let Some(window) = self.entities.get(id).and_then(|e| e.window) else {
            return;
        };
        let Some(win) = self.windows.get_mut(window) else {
            return;
        };
        if win.painting {
            warn!(?id, "ignoring invalidation raised while painting");
            return;
        }
        win.damage.insert(id);
    }

    /// Mark a layoutable entity for layout. No-op for entities that are not
    /// layoutable, detached or stale, and ignored while painting.
    pub fn invalidate_layout(&mut self, id: EntityId) {
        let Some(entity) = self.entities.get_mut(id) else {
            return;
        };
        if !entity.caps.has(Capability::Layoutable) {
            return;
        }
        let Some(win) = entity.window.and_then(|w| self.windows.get_mut(w)) else {
            return;
        };
        if win.painting {
            warn!(?id, "ignoring layout invalidation raised while painting");
            return;
        }
        entity.layout_invalid = true;
        win.layout_dirty = true;
    }

    /// Declare an entity's minimum size. If it changed, the parent container
    /// is told; a window root instead pushes the size onto its window,
    /// growing the window if it is now too small.
    pub fn set_minimum_size(&mut self, id: EntityId, size: Expanse) {
        let Some(entity) = self.entities.get_mut(id) else {
            return;
        };
        if entity.min_size == size {
            return;
        }
        entity.min_size = size;
        trace!(?id, ?size, "minimum size");
        match (entity.parent, entity.window) {
            (Some(parent), _) => self.notify(parent, Notice::ChildMinimumSizeChange(id)),
            (None, Some(window)) => self.window_minimum_size_changed(window, size),
            (None, None) => {}
        }
    }

    /// Mirror a root's minimum size onto its window.
    fn window_minimum_size_changed(&mut self, window: WindowId, size: Expanse) {
        let Some(win) = self.windows.get_mut(window) else {
            return;
        };
        if win.min_size == size {
            return;
        }
        win.min_size = size;
        win.surface.minimum = Some(size);
        let current = win.deferred_resize.unwrap_or(win.size);
        if current.contains(&size) {
            return;
        }
        let grown = current.max(size);
        win.surface.resize = Some(grown);
        debug!(?window, ?grown, "growing window to fit minimum size");
        if let Err(e) = self.resize_window(window, grown) {
            warn!(?window, "resize failed: {e}");
        }
    }

    /// Select or deselect the child at `index`. In a single-select container
    /// selecting a child deselects its siblings.
    ///
    /// # Panics
    ///
    /// If `parent` is not a selectable container or the index is out of
    /// range.
    pub fn select_child(&mut self, parent: EntityId, index: usize, selected: bool) {
        let caps = self
            .expect_capability(parent, Capability::SelectableContainer, "select_child")
            .caps;
        let child = self.child(parent, index);
        if selected && !caps.multi_select() {
            let others: Vec<EntityId> = self.entities[parent]
                .children
                .iter()
                .copied()
                .filter(|c| *c != child && self.entities[*c].selected)
                .collect();
            for other in others {
                self.set_selected(other, false);
            }
        }
        self.set_selected(child, selected);
    }

    /// Update one entity's selection flag.
    fn set_selected(&mut self, id: EntityId, selected: bool) {
        let e = &mut self.entities[id];
        if e.selected == selected {
            return;
        }
        e.selected = selected;
        self.invalidate(id);
        self.notify(id, Notice::SelectionChange);
    }

    /// Is the entity selected?
    pub fn is_selected(&self, id: EntityId) -> bool {
        self.entities.get(id).is_some_and(|e| e.selected)
    }

    /// Tell the parent of a scrollable entity that its scroll geometry
    /// changed.
    pub fn notify_scroll_bounds_change(&mut self, id: EntityId) {
        if let Some(parent) = self.parent(id) {
            self.notify(parent, Notice::ChildScrollBoundsChange(id));
        }
    }

    /// Query a scrollable entity's geometry.
    pub fn scroll_bounds(&mut self, id: EntityId) -> Option<ScrollBounds> {
        self.with_widget_mut(id, |w, _| {
            w.as_scrollable().map(|s| {
                let (horizontal, vertical) = s.scroll_axes();
                ScrollBounds {
                    content: s.content_bounds(),
                    viewport: s.viewport_bounds(),
                    horizontal,
                    vertical,
                }
            })
        })
        .ok()
        .flatten()
    }

    /// Move a scrollable entity's viewport.
    pub fn scroll_to(&mut self, id: EntityId, origin: Point) {
        self.call(id, |w, ctx| {
            if let Some(s) = w.as_scrollable() {
                s.scroll_to(origin, ctx);
            }
        });
    }

    /// The active theme.
    pub fn theme(&self) -> &dyn Theme {
        self.theme.as_ref()
    }

    /// Replace the theme and notify every attached themeable entity.
    pub fn set_theme(&mut self, theme: impl Theme + 'static) {
        self.theme = Box::new(theme);
        debug!(theme = self.theme.name(), "theme changed");
        self.broadcast(Capability::Themeable, Notice::ThemeChange);
    }

    /// The active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replace the configuration and notify every attached configurable
    /// entity.
    pub fn set_config(&mut self, config: Config) {
        self.config = config;
        debug!(config = ?self.config, "config changed");
        self.broadcast(Capability::Configurable, Notice::ConfigChange);
    }

    /// Send a notice to every attached entity with a capability.
    fn broadcast(&mut self, c: Capability, notice: Notice) {
        let roots: Vec<EntityId> = self.windows.values().filter_map(|w| w.root).collect();
        for root in roots {
            for id in self.pre_order(root) {
                if self.has_capability(id, c) {
                    self.notify(id, notice);
                }
            }
        }
    }

    /// Open a window with a blank canvas and no root.
    pub fn open_window(&mut self, size: Expanse) -> WindowId {
        let id = self.windows.insert(Window::new(size));
        debug!(window = ?id, ?size, "open window");
        id
    }

    /// Close a window, unlinking its root. Returns the detached root so the
    /// caller can reuse or remove it.
    pub fn close_window(&mut self, window: WindowId) -> Result<Option<EntityId>> {
        let root = self.window(window)?.root;
        self.set_root(window, None)?;
        self.windows.remove(window);
        debug!(?window, "close window");
        Ok(root)
    }

    /// Look up a window.
    pub fn window(&self, window: WindowId) -> Result<&Window> {
        self.windows
            .get(window)
            .ok_or(Error::WindowNotFound(window))
    }

    /// Ids of all open windows.
    pub fn window_ids(&self) -> Vec<WindowId> {
        self.windows.keys().collect()
    }

    /// Replace a window's root. The previous root is unlinked and left in
    /// the arena. The new root fills the window and is linked to it.
    ///
    /// # Panics
    ///
    /// If the new root already has a parent or belongs to a window.
    pub fn set_root(&mut self, window: WindowId, root: Option<EntityId>) -> Result<()> {
        let old = self.window(window)?.root;
        if old == root {
            return Ok(());
        }
        if let Some(new) = root {
            let e = self.expect(new, "set_root");
            assert!(
                e.parent.is_none() && e.window.is_none(),
                "set_root: {} ({new:?}) is already attached",
                e.name
            );
        }
        if let Some(old) = old {
            self.windows[window].root = None;
            self.unlink(old);
        }
        let Some(new) = root else {
            return Ok(());
        };
        let win = &mut self.windows[window];
        win.root = Some(new);
        let area = win.size.rect();
        self.entities[new].bounds = area;
        self.reclip(new, area);
        self.link(new, window);
        debug!(?window, root = ?new, "set root");
        let min = self.entities[new].min_size;
        self.window_minimum_size_changed(window, min);
        self.debug_assert_tree_invariants();
        Ok(())
    }

    /// Resize a window's canvas. The root is stretched to fill it, and the
    /// whole tree is marked for repaint since the new canvas starts blank.
    /// A resize requested while painting is held until the pass ends.
    pub fn resize_window(&mut self, window: WindowId, size: Expanse) -> Result<()> {
        let win = self
            .windows
            .get_mut(window)
            .ok_or(Error::WindowNotFound(window))?;
        if win.painting {
            win.deferred_resize = (size != win.size).then_some(size);
            debug!(?window, ?size, "deferring resize until paint ends");
            return Ok(());
        }
        if win.size == size {
            return Ok(());
        }
        win.size = size;
        win.canvas = Canvas::new(size);
        debug!(?window, ?size, "resize window");
        let Some(root) = win.root else {
            return Ok(());
        };
        self.entities[root].bounds = size.rect();
        self.reclip(root, size.rect());
        for id in self.pre_order(root) {
            self.invalidate(id);
        }
        self.invalidate_layout(root);
        Ok(())
    }

    /// Take the surface changes accumulated since the last call.
    pub fn take_surface_request(&mut self, window: WindowId) -> SurfaceRequest {
        self.windows
            .get_mut(window)
            .map(|w| mem::take(&mut w.surface))
            .unwrap_or_default()
    }

    /// Run pending layouts for a window.
    pub fn layout_window(&mut self, window: WindowId) -> Result<()> {
        LayoutPass::new(self, window).run()
    }

    /// Paint damaged entities. Returns the union of the painted clip
    /// rectangles, or `None` if nothing was painted. A resize raised while
    /// painting is applied afterwards, leaving the window fully damaged.
    pub fn paint_window(&mut self, window: WindowId) -> Result<Option<Rect>> {
        let region = render::paint(self, window)?;
        self.apply_deferred_resize(window)?;
        Ok(region)
    }

    /// Apply a resize held back by a paint pass. Returns true if the window
    /// changed size.
    fn apply_deferred_resize(&mut self, window: WindowId) -> Result<bool> {
        let deferred = self
            .windows
            .get_mut(window)
            .and_then(|w| w.deferred_resize.take());
        let Some(size) = deferred else {
            return Ok(false);
        };
        self.resize_window(window, size)?;
        Ok(true)
    }

    /// Layout followed by paint. If painting resized the window, the new
    /// canvas is laid out and painted again.
    pub fn refresh_window(&mut self, window: WindowId) -> Result<Option<Rect>> {
        self.layout_window(window)?;
        let region = render::paint(self, window)?;
        if !self.apply_deferred_resize(window)? {
            return Ok(region);
        }
        self.layout_window(window)?;
        self.paint_window(window)
    }

    /// Route a button press.
    pub fn mouse_down(
        &mut self,
        window: WindowId,
        point: Point,
        button: Button,
        mods: Mods,
    ) -> Result<()> {
        dispatch::mouse_down(self, window, point, button, mods)
    }

    /// Route a button release.
    pub fn mouse_up(
        &mut self,
        window: WindowId,
        point: Point,
        button: Button,
        mods: Mods,
    ) -> Result<()> {
        dispatch::mouse_up(self, window, point, button, mods)
    }

    /// Route pointer motion.
    pub fn mouse_motion(&mut self, window: WindowId, point: Point, mods: Mods) -> Result<()> {
        dispatch::mouse_motion(self, window, point, mods)
    }

    /// Route a scroll gesture.
    pub fn scroll(
        &mut self,
        window: WindowId,
        point: Point,
        delta: ScrollDelta,
        mods: Mods,
    ) -> Result<()> {
        dispatch::scroll(self, window, point, delta, mods)
    }

    /// Route a key press.
    pub fn key_down(&mut self, window: WindowId, key: Key) -> Result<()> {
        dispatch::key_down(self, window, key)
    }

    /// Route a key release.
    pub fn key_up(&mut self, window: WindowId, key: Key) -> Result<()> {
        dispatch::key_up(self, window, key)
    }

    /// Route a decoded window event.
    pub fn handle_event(&mut self, window: WindowId, event: WindowEvent) -> Result<()> {
        dispatch::handle_event(self, window, event)
    }

    /// Run a closure against a widget of a known type.
    pub fn with_widget<W, R>(
        &mut self,
        id: impl Into<EntityId>,
        f: impl FnOnce(&mut W, &mut dyn Context) -> R,
    ) -> Result<R>
    where
        W: Widget + 'static,
    {
        let id = id.into();
        self.with_widget_mut(id, |w, core| {
            let w = downcast_mut::<W>(w).ok_or(Error::TypeMismatch(type_name::<W>()))?;
            let mut ctx = EntityContext::new(core, id);
            Ok(f(w, &mut ctx))
        })?
    }

    /// Take a widget out of its slot for a single call. Notices queued for
    /// the widget while it was out are delivered once it is back.
    pub(crate) fn with_widget_mut<R>(
        &mut self,
        id: EntityId,
        f: impl FnOnce(&mut dyn Widget, &mut Self) -> R,
    ) -> Result<R> {
        let entity = self.entities.get_mut(id).ok_or(Error::EntityNotFound(id))?;
        let mut widget = entity.widget.take().ok_or(Error::WidgetBusy(id))?;
        let out = f(widget.as_mut(), self);
        if let Some(entity) = self.entities.get_mut(id) {
            entity.widget = Some(widget);
        }
        self.flush_pending(id);
        Ok(out)
    }

    /// Invoke a widget callback with a context for the entity. Failures are
    /// logged and swallowed.
    pub(crate) fn call<R>(
        &mut self,
        id: EntityId,
        f: impl FnOnce(&mut dyn Widget, &mut dyn Context) -> R,
    ) -> Option<R> {
        match self.with_widget_mut(id, |w, core| f(w, &mut EntityContext::new(core, id))) {
            Ok(r) => Some(r),
            Err(e) => {
                warn!(?id, "dropping widget callback: {e}");
                None
            }
        }
    }

    /// Deliver a notice now, or queue it if the widget is busy.
    pub(crate) fn notify(&mut self, id: EntityId, notice: Notice) {
        match self.entities.get(id) {
            None => {}
            Some(e) if e.widget.is_none() => {
                trace!(?id, ?notice, "queueing notice for busy widget");
                self.pending.push((id, notice));
            }
            Some(_) => self.deliver(id, notice),
        }
    }

    /// Deliver queued notices for an entity.
    fn flush_pending(&mut self, id: EntityId) {
        while let Some(i) = self.pending.iter().position(|(t, _)| *t == id) {
            let (_, notice) = self.pending.remove(i);
            self.deliver(id, notice);
        }
    }

    /// Invoke the callback matching a notice.
    fn deliver(&mut self, id: EntityId, notice: Notice) {
        self.call(id, |w, ctx| match notice {
            Notice::FocusChange => {
                if let Some(f) = w.as_focusable() {
                    f.handle_focus_change(ctx);
                }
            }
            Notice::SelectionChange => {
                if let Some(s) = w.as_selectable() {
                    s.handle_selection_change(ctx);
                }
            }
            Notice::ThemeChange => {
                if let Some(t) = w.as_themeable() {
                    t.handle_theme_change(ctx);
                }
            }
            Notice::ConfigChange => {
                if let Some(c) = w.as_configurable() {
                    c.handle_config_change(ctx);
                }
            }
            Notice::ChildMinimumSizeChange(child) => {
                if let Some(c) = w.as_container() {
                    c.handle_child_minimum_size_change(child, ctx);
                }
            }
            Notice::ChildrenChange => {
                if let Some(c) = w.as_container() {
                    c.handle_children_change(ctx);
                }
            }
            Notice::ChildScrollBoundsChange(child) => {
                if let Some(c) = w.as_container() {
                    c.handle_child_scroll_bounds_change(child, ctx);
                }
            }
        });
    }

    /// Assert structural invariants in debug builds.
    #[cfg(debug_assertions)]
    pub(crate) fn debug_assert_tree_invariants(&self) {
        for (id, entity) in &self.entities {
            self.debug_assert_entity(id, entity);
        }
        for (window, win) in &self.windows {
            if let Some(focus) = win.focused {
                debug_assert!(
                    self.entities.get(focus).and_then(|e| e.window) == Some(window),
                    "focus points at an entity outside {window:?}"
                );
            }
        }
    }

    #[cfg(not(debug_assertions))]
    pub(crate) fn debug_assert_tree_invariants(&self) {}

    /// Assert link, clip and window invariants for one entity.
    #[cfg(debug_assertions)]
    fn debug_assert_entity(&self, id: EntityId, entity: &Entity) {
        let mut seen = HashSet::with_capacity(entity.children.len());
        for child in &entity.children {
            debug_assert!(seen.insert(*child), "duplicate child {child:?} under {id:?}");
            let c = self.entities.get(*child);
            debug_assert!(
                c.is_some_and(|c| c.parent == Some(id)),
                "child {child:?} parent mismatch under {id:?}"
            );
            debug_assert!(
                c.is_some_and(|c| c.window == entity.window),
                "child {child:?} window mismatch under {id:?}"
            );
        }
        if let Some(parent) = entity.parent
            && entity.window.is_some()
        {
            let clip = self.entities[parent].clipped_bounds;
            debug_assert!(
                clip.contains_rect(entity.clipped_bounds),
                "{id:?} clip escapes its parent"
            );
        }
        debug_assert!(
            entity.bounds.contains_rect(entity.clipped_bounds),
            "{id:?} clip escapes its bounds"
        );
        debug_assert!(!self.is_ancestor(id, id), "cycle detected from {id:?}");
    }
}
