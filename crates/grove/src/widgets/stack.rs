//! Vertical stack container.

use geom::{Expanse, Rect};

use crate::{
    Context, EntityId,
    canvas::CanvasView,
    theme::{Pattern, PatternState},
    widget::{Container, Layoutable, Themeable, Widget},
};

/// Lays its children out top to bottom, each at its minimum height and the
/// full inner width, and paints the theme background around them.
#[derive(Debug, Default)]
pub struct Stack {
    /// Space between consecutive children.
    gap: u32,
}

impl Stack {
    /// A stack with no gap between children.
    pub fn new() -> Self {
        Self::default()
    }

    /// Separate children by `gap` pixels.
    pub fn with_gap(mut self, gap: u32) -> Self {
        self.gap = gap;
        self
    }

    /// Padding around the children, from the theme.
    fn padding(ctx: &dyn Context) -> u32 {
        ctx.theme().padding(Pattern::Background)
    }

    /// Recompute the minimum size from the children and request a layout.
    fn resize(&self, ctx: &mut dyn Context) {
        let pad = Self::padding(ctx);
        let n = ctx.child_count();
        let mut size = Expanse::default();
        for i in 0..n {
            let m = ctx.child_minimum_size(i);
            size.w = size.w.max(m.w);
            size.h = size.h.saturating_add(m.h);
        }
        let gaps = u32::try_from(n.saturating_sub(1)).unwrap_or(u32::MAX);
        size.h = size.h.saturating_add(self.gap.saturating_mul(gaps));
        size.w = size.w.saturating_add(pad.saturating_mul(2));
        size.h = size.h.saturating_add(pad.saturating_mul(2));
        ctx.set_minimum_size(size);
        ctx.invalidate_layout();
    }
}

impl Widget for Stack {
    fn on_create(&mut self, ctx: &mut dyn Context) {
        self.resize(ctx);
    }

    fn paint(&mut self, canvas: &mut CanvasView<'_>, ctx: &mut dyn Context) {
        let rocks: Vec<Rect> = (0..ctx.child_count()).map(|i| ctx.child_bounds(i)).collect();
        let color = ctx
            .theme()
            .color(Pattern::Background, PatternState::default());
        canvas.fill_background(ctx.bounds(), &rocks, color);
    }

    fn as_layoutable(&mut self) -> Option<&mut dyn Layoutable> {
        Some(self)
    }

    fn as_container(&mut self) -> Option<&mut dyn Container> {
        Some(self)
    }

    fn as_themeable(&mut self) -> Option<&mut dyn Themeable> {
        Some(self)
    }
}

impl Layoutable for Stack {
    fn layout(&mut self, ctx: &mut dyn Context) {
        let pad = Self::padding(ctx);
        let inner = ctx.bounds().inset(pad).unwrap_or_default();
        let mut y = inner.tl.y;
        for i in 0..ctx.child_count() {
            let h = ctx.child_minimum_size(i).h;
            ctx.place_child(i, Rect::new(inner.tl.x, y, inner.w, h));
            y = y.saturating_add_unsigned(h.saturating_add(self.gap));
        }
    }
}

impl Container for Stack {
    fn handle_child_minimum_size_change(&mut self, _child: EntityId, ctx: &mut dyn Context) {
        self.resize(ctx);
    }

    fn handle_children_change(&mut self, ctx: &mut dyn Context) {
        self.resize(ctx);
    }
}

impl Themeable for Stack {
    fn handle_theme_change(&mut self, ctx: &mut dyn Context) {
        self.resize(ctx);
        ctx.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use geom::Point;

    use super::*;
    use crate::{
        Core,
        testing::probe::Probe,
        theme::{DefaultTheme, Theme},
    };

    #[test]
    fn stacks_children_at_minimum_height() {
        let mut core = Core::default();
        let window = core.open_window(Expanse::new(10, 10));
        let stack = core.create(Stack::new().with_gap(1));
        let a = core.create(Probe::leaf("a").min_size(4, 2));
        let b = core.create(Probe::leaf("b").min_size(6, 3));
        core.adopt(stack, a);
        core.adopt(stack, b);
        assert_eq!(core.entity(stack).unwrap().min_size(), Expanse::new(6, 6));

        core.set_root(window, Some(stack)).unwrap();
        core.refresh_window(window).unwrap();
        assert_eq!(core.entity(a).unwrap().bounds(), Rect::new(0, 0, 10, 2));
        assert_eq!(core.entity(b).unwrap().bounds(), Rect::new(0, 3, 10, 3));

        let gap_color = DefaultTheme.color(Pattern::Background, PatternState::default());
        let canvas = core.window(window).unwrap().canvas();
        assert_eq!(canvas.get(Point::new(0, 2)), Some(gap_color));
    }

    #[test]
    fn child_growth_propagates_to_window() {
        let mut core = Core::default();
        let window = core.open_window(Expanse::new(5, 5));
        let stack = core.create(Stack::new());
        let a = core.create(Probe::leaf("a").min_size(2, 2));
        core.adopt(stack, a);
        core.set_root(window, Some(stack)).unwrap();
        core.refresh_window(window).unwrap();

        core.set_minimum_size(a, Expanse::new(8, 2));
        assert_eq!(core.window(window).unwrap().size(), Expanse::new(8, 5));
        core.refresh_window(window).unwrap();
        assert_eq!(core.entity(a).unwrap().bounds(), Rect::new(0, 0, 8, 2));
    }

    #[test]
    fn oversized_children_saturate_minimum_size() {
        let mut core = Core::default();
        let stack = core.create(Stack::new().with_gap(3));
        for name in ["a", "b"] {
            let tall = core.create(Probe::leaf(name).min_size(2, u32::MAX - 1));
            core.adopt(stack, tall);
        }
        assert_eq!(
            core.entity(stack).unwrap().min_size(),
            Expanse::new(2, u32::MAX)
        );
    }
}
