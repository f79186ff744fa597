//! A scrolling, single-select list.

use geom::{Expanse, Point, Rect};

use crate::{
    Context, EntityId,
    canvas::CanvasView,
    event::{Button, Key, KeyCode, Mods, ScrollDelta},
    theme::{Pattern, PatternState},
    widget::{
        Container, Focusable, KeyboardTarget, Layoutable, MouseTargetContainer, ScrollTarget,
        Scrollable, SelectableContainer, Widget,
    },
};

/// Stacks children vertically at their minimum heights inside a scrolling
/// viewport. Clicking anywhere inside a child selects it; Up and Down move
/// the selection while the list is focused, scrolling it into view.
#[derive(Debug, Default)]
pub struct List {
    /// Vertical scroll offset into the content.
    offset: u32,
    /// Total height of the children.
    content_height: u32,
    /// Width of the content.
    content_width: u32,
    /// Viewport size as of the last layout.
    viewport: Expanse,
}

impl List {
    /// An empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current scroll offset.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Index of the selected child.
    pub fn selected(ctx: &dyn Context) -> Option<usize> {
        (0..ctx.child_count()).find(|i| ctx.child_selected(*i))
    }

    /// The largest offset that keeps the viewport inside the content.
    fn max_offset(&self) -> u32 {
        self.content_height.saturating_sub(self.viewport.h)
    }

    /// Move the viewport, clamped to the content. Returns true if it moved.
    fn set_offset(&mut self, offset: u32, ctx: &mut dyn Context) -> bool {
        let offset = offset.min(self.max_offset());
        if offset == self.offset {
            return false;
        }
        self.offset = offset;
        ctx.invalidate_layout();
        ctx.invalidate();
        ctx.notify_scroll_bounds_change();
        true
    }

    /// Select a child and scroll it into view.
    fn select(&mut self, index: usize, ctx: &mut dyn Context) {
        ctx.select_child(index, true);
        let top = (0..index)
            .map(|i| ctx.child_minimum_size(i).h)
            .fold(0, u32::saturating_add);
        let bottom = top.saturating_add(ctx.child_minimum_size(index).h);
        if top < self.offset {
            self.set_offset(top, ctx);
        } else if bottom > self.offset.saturating_add(self.viewport.h) {
            self.set_offset(bottom.saturating_sub(self.viewport.h), ctx);
        }
    }
}

impl Widget for List {
    fn paint(&mut self, canvas: &mut CanvasView<'_>, ctx: &mut dyn Context) {
        let rocks: Vec<Rect> = (0..ctx.child_count())
            .map(|i| ctx.child_bounds(i))
            .collect();
        let color = ctx.theme().color(
            Pattern::Sunken,
            PatternState {
                focused: ctx.focused(),
                ..Default::default()
            },
        );
        canvas.fill_background(ctx.bounds(), &rocks, color);
    }

    fn as_layoutable(&mut self) -> Option<&mut dyn Layoutable> {
        Some(self)
    }

    fn as_container(&mut self) -> Option<&mut dyn Container> {
        Some(self)
    }

    fn as_focusable(&mut self) -> Option<&mut dyn Focusable> {
        Some(self)
    }

    fn as_keyboard_target(&mut self) -> Option<&mut dyn KeyboardTarget> {
        Some(self)
    }

    fn as_mouse_target_container(&mut self) -> Option<&mut dyn MouseTargetContainer> {
        Some(self)
    }

    fn as_scroll_target(&mut self) -> Option<&mut dyn ScrollTarget> {
        Some(self)
    }

    fn as_scrollable(&mut self) -> Option<&mut dyn Scrollable> {
        Some(self)
    }

    fn as_selectable_container(&mut self) -> Option<&mut dyn SelectableContainer> {
        Some(self)
    }
}

impl Layoutable for List {
    fn layout(&mut self, ctx: &mut dyn Context) {
        let b = ctx.bounds();
        let n = ctx.child_count();
        let heights: Vec<u32> = (0..n).map(|i| ctx.child_minimum_size(i).h).collect();
        let content = Expanse::new(b.w, heights.iter().copied().fold(0, u32::saturating_add));
        let changed = content.h != self.content_height
            || content.w != self.content_width
            || b.size() != self.viewport;
        self.content_height = content.h;
        self.content_width = content.w;
        self.viewport = b.size();
        self.offset = self.offset.min(self.max_offset());

        let mut y = b.tl.y.saturating_sub_unsigned(self.offset);
        for (i, h) in heights.into_iter().enumerate() {
            ctx.place_child(i, Rect::new(b.tl.x, y, b.w, h));
            y = y.saturating_add_unsigned(h);
        }
        if changed {
            ctx.notify_scroll_bounds_change();
        }
    }
}

impl Container for List {
    fn handle_children_change(&mut self, ctx: &mut dyn Context) {
        let w = (0..ctx.child_count())
            .map(|i| ctx.child_minimum_size(i).w)
            .max()
            .unwrap_or(0);
        let h = if ctx.child_count() > 0 {
            ctx.child_minimum_size(0).h
        } else {
            0
        };
        ctx.set_minimum_size(Expanse::new(w, h));
        ctx.invalidate_layout();
    }
}

impl Focusable for List {}

impl KeyboardTarget for List {
    fn handle_key_down(&mut self, key: Key, ctx: &mut dyn Context) {
        let n = ctx.child_count();
        if n == 0 {
            return;
        }
        let current = Self::selected(ctx);
        let next = match key.code {
            KeyCode::Down => current.map_or(0, |i| (i + 1).min(n - 1)),
            KeyCode::Up => current.map_or(0, |i| i.saturating_sub(1)),
            KeyCode::Home => 0,
            KeyCode::End => n - 1,
            _ => return,
        };
        self.select(next, ctx);
    }
}

impl MouseTargetContainer for List {
    fn handle_child_mouse_down(
        &mut self,
        _point: Point,
        button: Button,
        _mods: Mods,
        child: EntityId,
        ctx: &mut dyn Context,
    ) {
        if button != Button::Left {
            return;
        }
        if let Some(index) = ctx.child_index_containing(child) {
            self.select(index, ctx);
        }
    }
}

impl ScrollTarget for List {
    fn handle_scroll(
        &mut self,
        _point: Point,
        delta: ScrollDelta,
        _mods: Mods,
        ctx: &mut dyn Context,
    ) {
        let step = i64::from(delta.dy) * i64::from(ctx.config().scroll_velocity);
        let target = (i64::from(self.offset) + step).clamp(0, i64::from(u32::MAX));
        self.set_offset(u32::try_from(target).unwrap_or(0), ctx);
    }
}

impl Scrollable for List {
    fn content_bounds(&self) -> Rect {
        Rect::new(0, 0, self.content_width, self.content_height)
    }

    fn viewport_bounds(&self) -> Rect {
        Rect::new(0, self.offset as i32, self.viewport.w, self.viewport.h)
    }

    fn scroll_to(&mut self, origin: Point, ctx: &mut dyn Context) {
        self.set_offset(u32::try_from(origin.y).unwrap_or(0), ctx);
    }

    fn scroll_axes(&self) -> (bool, bool) {
        (false, true)
    }
}

impl SelectableContainer for List {}
