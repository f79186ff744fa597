use std::mem;

use geom::Rect;
use tracing::{trace, warn};

use super::world::Core;
use crate::{
    EntityId, WindowId,
    error::{Error, Result},
    widget::Capability,
};

/// Layouts that keep re-dirtying the tree are cut off after this many
/// passes in a single refresh.
const MAX_LAYOUT_PASSES: usize = 16;

/// A layout traversal over one window.
pub(super) struct LayoutPass<'a> {
    /// Core state being updated.
    core: &'a mut Core,
    /// The window being laid out.
    window: WindowId,
}

impl<'a> LayoutPass<'a> {
    /// Create a layout pass for a window.
    pub(super) fn new(core: &'a mut Core, window: WindowId) -> Self {
        Self { core, window }
    }

    /// Walk the tree until no layout is pending. Each walk visits entities
    /// in pre-order; a layout-dirty entity runs `layout`, and once an
    /// entity has run, its whole subtree runs as well.
    pub(super) fn run(mut self) -> Result<()> {
        let mut passes = 0;
        loop {
            let win = self
                .core
                .windows
                .get_mut(self.window)
                .ok_or(Error::WindowNotFound(self.window))?;
            if !win.layout_dirty {
                return Ok(());
            }
            win.layout_dirty = false;
            let Some(root) = win.root else {
                return Ok(());
            };
            if passes == MAX_LAYOUT_PASSES {
                warn!(window = ?self.window, "layout did not settle after {passes} passes");
                return Ok(());
            }
            passes += 1;
            self.walk(root);
        }
    }

    /// One pre-order walk from the root.
    fn walk(&mut self, root: EntityId) {
        let mut stack = vec![(root, false)];
        while let Some((id, force)) = stack.pop() {
            let Some(entity) = self.core.entities.get(id) else {
                continue;
            };
            // An ancestor's layout may have disowned this entity.
            if entity.window != Some(self.window) {
                continue;
            }
            let mut force = force;
            if (entity.layout_invalid || force) && entity.caps.has(Capability::Layoutable) {
                trace!(?id, name = entity.name, "layout");
                self.core.call(id, |w, ctx| {
                    if let Some(l) = w.as_layoutable() {
                        l.layout(ctx);
                    }
                });
                if let Some(e) = self.core.entities.get_mut(id) {
                    e.layout_invalid = false;
                }
                force = true;
            }
            stack.extend(self.core.children(id).iter().rev().map(|c| (*c, force)));
        }
    }
}

/// Paint every damaged entity of a window in pre-order, each through a
/// canvas view clipped to its visible bounds. Invalidations raised while
/// painting are dropped. Returns the union of the painted clips.
pub(super) fn paint(core: &mut Core, window: WindowId) -> Result<Option<Rect>> {
    let win = core
        .windows
        .get_mut(window)
        .ok_or(Error::WindowNotFound(window))?;
    if win.damage.is_empty() {
        return Ok(None);
    }
    let damage = mem::take(&mut win.damage);
    let Some(root) = win.root else {
        return Ok(None);
    };
    let canvas = mem::take(&mut win.canvas);
    win.painting = true;

    let mut guard = scopeguard::guard((core, canvas), |(core, canvas)| {
        if let Some(win) = core.windows.get_mut(window) {
            win.painting = false;
            win.canvas = canvas;
        }
    });
    let (core, canvas) = &mut *guard;

    let mut region = Rect::zero();
    let mut painted = 0;
    for id in core.pre_order(root) {
        if !damage.contains(&id) {
            continue;
        }
        let Some(clip) = core.entities.get(id).map(|e| e.clipped_bounds) else {
            continue;
        };
        if clip.is_empty() {
            continue;
        }
        let mut view = canvas.view(clip);
        core.call(id, |w, ctx| w.paint(&mut view, ctx));
        region = region.union(clip);
        painted += 1;
    }
    trace!(?window, painted, ?region, "paint");
    Ok((!region.is_empty()).then_some(region))
}

#[cfg(test)]
mod tests {
    use geom::{Expanse, Point};

    use super::*;
    use crate::{
        canvas::Color,
        testing::probe::{Probe, events, reset},
    };

    const RED: Color = Color::rgb(255, 0, 0);
    const BLUE: Color = Color::rgb(0, 0, 255);

    /// root -> [a -> [a1], b], with a and b side by side.
    fn setup() -> (Core, WindowId, [EntityId; 4]) {
        let mut core = Core::default();
        let window = core.open_window(Expanse::new(20, 10));
        let root = core.create(Probe::container("root").fill(Color::BLACK));
        let a = core.create(Probe::container("a").fill(RED));
        let a1 = core.create(Probe::container("a1").fill(BLUE));
        let b = core.create(Probe::container("b").fill(BLUE));
        core.adopt(a, a1);
        core.adopt(root, a);
        core.adopt(root, b);
        core.set_root(window, Some(root)).unwrap();
        core.place_child(root, 0, Rect::new(0, 0, 10, 10));
        core.place_child(root, 1, Rect::new(10, 0, 10, 10));
        core.place_child(a, 0, Rect::new(2, 2, 4, 4));
        (core, window, [root, a, a1, b])
    }

    #[test]
    fn first_refresh_lays_out_and_paints_everything() {
        let (mut core, window, _) = setup();
        reset();
        let region = core.refresh_window(window).unwrap();
        assert_eq!(region, Some(Rect::new(0, 0, 20, 10)));
        assert_eq!(
            events(),
            vec![
                "root.layout",
                "a.layout",
                "a1.layout",
                "b.layout",
                "root.paint",
                "a.paint",
                "a1.paint",
                "b.paint",
            ]
        );
        let canvas = core.window(window).unwrap().canvas();
        assert_eq!(canvas.get(Point::new(0, 0)), Some(RED));
        assert_eq!(canvas.get(Point::new(3, 3)), Some(BLUE));
        assert_eq!(canvas.get(Point::new(15, 5)), Some(BLUE));
        assert_eq!(core.window(window).unwrap().damage_len(), 0);
        assert_eq!(core.refresh_window(window).unwrap(), None);
    }

    #[test]
    fn layout_cascades_only_below_dirty_entity() {
        let (mut core, window, [_, a, a1, _]) = setup();
        core.refresh_window(window).unwrap();
        reset();
        core.invalidate_layout(a);
        core.layout_window(window).unwrap();
        assert_eq!(events(), vec!["a.layout", "a1.layout"]);

        reset();
        core.invalidate_layout(a1);
        core.layout_window(window).unwrap();
        assert_eq!(events(), vec!["a1.layout"]);
        assert!(!core.entity(a1).unwrap().layout_invalid());
    }

    #[test]
    fn damage_is_a_set() {
        let (mut core, window, [_, a, _, _]) = setup();
        core.refresh_window(window).unwrap();
        reset();
        core.invalidate(a);
        core.invalidate(a);
        assert_eq!(core.window(window).unwrap().damage_len(), 1);
        let region = core.paint_window(window).unwrap();
        assert_eq!(region, Some(Rect::new(0, 0, 10, 10)));
        assert_eq!(events(), vec!["a.paint"]);
    }

    #[test]
    fn invisible_entities_are_not_painted() {
        let (mut core, window, [root, a, _, b]) = setup();
        core.refresh_window(window).unwrap();
        core.place_child(root, 1, Rect::new(40, 40, 5, 5));
        core.invalidate(a);
        reset();
        core.paint_window(window).unwrap();
        assert!(core.entity(b).unwrap().clipped_bounds().is_empty());
        assert!(!events().contains(&"b.paint".to_string()));
    }

    #[test]
    fn invalidations_during_paint_are_dropped() {
        let mut core = Core::default();
        let window = core.open_window(Expanse::new(4, 4));
        let root = core.create(Probe::container("root").invalidate_on_paint());
        core.set_root(window, Some(root)).unwrap();
        core.refresh_window(window).unwrap();
        let win = core.window(window).unwrap();
        assert_eq!(win.damage_len(), 0);
        assert!(!win.layout_dirty());
    }

    #[test]
    fn self_invalidation_does_not_loop() {
        let mut core = Core::default();
        let window = core.open_window(Expanse::new(4, 4));
        let root = core.create(Probe::container("root").on_layout(|ctx| ctx.invalidate_layout()));
        core.set_root(window, Some(root)).unwrap();
        reset();
        core.layout_window(window).unwrap();
        assert_eq!(events().len(), 1);
    }
}
