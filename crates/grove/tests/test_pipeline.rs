//! Integration tests for damage tracking, painting, minimum-size
//! negotiation and theme propagation.

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use grove::{
        Core, EntityId, Widget, WindowId,
        canvas::{CanvasView, Color},
        context::Context,
        geom::{Expanse, Point, Rect},
        theme::{DefaultTheme, Pattern, PatternState, Theme},
        widgets::{Block, Stack},
    };

    /// A leaf that fills itself with one color and counts its paints.
    struct Swatch {
        color: Color,
        size: Expanse,
        restless: bool,
        paints: Arc<AtomicUsize>,
    }

    impl Swatch {
        fn new(color: Color, paints: &Arc<AtomicUsize>) -> Self {
            Self {
                color,
                size: Expanse::new(3, 2),
                restless: false,
                paints: Arc::clone(paints),
            }
        }
    }

    impl Widget for Swatch {
        fn on_create(&mut self, ctx: &mut dyn Context) {
            ctx.set_minimum_size(self.size);
        }

        fn paint(&mut self, canvas: &mut CanvasView<'_>, ctx: &mut dyn Context) {
            self.paints.fetch_add(1, Ordering::SeqCst);
            canvas.fill(ctx.bounds(), self.color);
            if self.restless {
                ctx.invalidate();
            }
        }
    }

    /// A root that demands a larger window the first time it paints.
    struct Grower {
        wants: Expanse,
    }

    impl Widget for Grower {
        fn paint(&mut self, canvas: &mut CanvasView<'_>, ctx: &mut dyn Context) {
            canvas.fill(ctx.bounds(), Color::BLACK);
            ctx.set_minimum_size(self.wants);
        }
    }

    /// Default colors with a padded background.
    struct Padded;

    impl Theme for Padded {
        fn color(&self, pattern: Pattern, state: PatternState) -> Color {
            match pattern {
                Pattern::Background => Color::WHITE,
                _ => DefaultTheme.color(pattern, state),
            }
        }

        fn padding(&self, pattern: Pattern) -> u32 {
            match pattern {
                Pattern::Background => 1,
                _ => 0,
            }
        }

        fn name(&self) -> &str {
            "padded"
        }
    }

    /// A 10x10 window with a stack of two swatches, red over blue.
    fn setup(paints: &Arc<AtomicUsize>) -> (Core, WindowId, EntityId, Vec<EntityId>) {
        let mut core = Core::default();
        let window = core.open_window(Expanse::new(10, 10));
        let stack = core.create(Stack::new().with_gap(2));
        let red = core.create(Swatch::new(Color::rgb(255, 0, 0), paints));
        let blue = core.create(Swatch::new(Color::rgb(0, 0, 255), paints));
        core.adopt(stack, red);
        core.adopt(stack, blue);
        core.set_root(window, Some(stack)).unwrap();
        (core, window, stack, vec![red, blue])
    }

    #[test]
    fn first_refresh_paints_everything() {
        let paints = Arc::new(AtomicUsize::new(0));
        let (mut core, window, _, swatches) = setup(&paints);
        let region = core.refresh_window(window).unwrap();
        assert_eq!(region, Some(Rect::new(0, 0, 10, 10)));
        assert_eq!(paints.load(Ordering::SeqCst), 2);

        let canvas = core.window(window).unwrap().canvas();
        assert_eq!(canvas.get(Point::new(9, 1)), Some(Color::rgb(255, 0, 0)));
        assert_eq!(canvas.get(Point::new(0, 4)), Some(Color::rgb(0, 0, 255)));
        let background = DefaultTheme.color(Pattern::Background, PatternState::default());
        assert_eq!(canvas.get(Point::new(0, 2)), Some(background));
        assert_eq!(
            core.entity(swatches[1]).unwrap().bounds(),
            Rect::new(0, 4, 10, 2)
        );
    }

    #[test]
    fn damage_is_a_set() {
        let paints = Arc::new(AtomicUsize::new(0));
        let (mut core, window, _, swatches) = setup(&paints);
        core.refresh_window(window).unwrap();
        paints.store(0, Ordering::SeqCst);

        core.invalidate(swatches[0]);
        core.invalidate(swatches[0]);
        assert_eq!(core.window(window).unwrap().damage_len(), 1);
        core.invalidate(swatches[1]);
        assert_eq!(core.window(window).unwrap().damage_len(), 2);

        let region = core.refresh_window(window).unwrap();
        assert_eq!(region, Some(Rect::new(0, 0, 10, 6)));
        assert_eq!(paints.load(Ordering::SeqCst), 2);
        assert_eq!(core.refresh_window(window).unwrap(), None);
    }

    #[test]
    fn invalidating_while_painting_is_ignored() {
        let paints = Arc::new(AtomicUsize::new(0));
        let mut core = Core::default();
        let window = core.open_window(Expanse::new(4, 4));
        let mut swatch = Swatch::new(Color::BLACK, &paints);
        swatch.restless = true;
        let id = core.create(swatch);
        core.set_root(window, Some(id)).unwrap();

        assert!(core.refresh_window(window).unwrap().is_some());
        assert!(!core.window(window).unwrap().is_damaged(id));
        assert_eq!(core.refresh_window(window).unwrap(), None);
        assert_eq!(paints.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn minimum_size_reaches_the_surface() {
        let mut core = Core::default();
        let window = core.open_window(Expanse::new(6, 6));
        let outer = core.create(Stack::new());
        let inner = core.create(Stack::new());
        let block = core.create_typed(Block::new(4, 2));
        core.adopt(inner, block.id());
        core.adopt(outer, inner);
        core.set_root(window, Some(outer)).unwrap();
        let request = core.take_surface_request(window);
        assert_eq!(request.minimum, Some(Expanse::new(4, 2)));
        assert_eq!(request.resize, None);
        core.refresh_window(window).unwrap();

        core.set_minimum_size(block.id(), Expanse::new(8, 3));
        assert_eq!(core.entity(inner).unwrap().min_size(), Expanse::new(8, 3));
        let request = core.take_surface_request(window);
        assert_eq!(request.minimum, Some(Expanse::new(8, 3)));
        assert_eq!(request.resize, Some(Expanse::new(8, 6)));
        assert!(core.take_surface_request(window).is_empty());

        let region = core.refresh_window(window).unwrap();
        assert_eq!(region, Some(Rect::new(0, 0, 8, 6)));
        assert_eq!(
            core.entity(block.id()).unwrap().bounds(),
            Rect::new(0, 0, 8, 3)
        );
    }

    #[test]
    fn growing_while_painting_resizes_after_the_pass() {
        let mut core = Core::default();
        let window = core.open_window(Expanse::new(8, 4));
        let root = core.create(Grower {
            wants: Expanse::new(20, 20),
        });
        core.set_root(window, Some(root)).unwrap();

        let region = core.refresh_window(window).unwrap();
        assert_eq!(region, Some(Rect::new(0, 0, 20, 20)));
        let win = core.window(window).unwrap();
        assert_eq!(win.size(), Expanse::new(20, 20));
        assert_eq!(win.canvas().size(), Expanse::new(20, 20));
        let entity = core.entity(root).unwrap();
        assert_eq!(entity.bounds(), Rect::new(0, 0, 20, 20));
        assert_eq!(entity.clipped_bounds(), win.canvas().bounds());
        assert_eq!(win.canvas().get(Point::new(19, 19)), Some(Color::BLACK));

        let request = core.take_surface_request(window);
        assert_eq!(request.minimum, Some(Expanse::new(20, 20)));
        assert_eq!(request.resize, Some(Expanse::new(20, 20)));
        assert_eq!(core.refresh_window(window).unwrap(), None);
    }

    #[test]
    fn resizing_from_a_paint_pass_waits_for_it() {
        let mut core = Core::default();
        let window = core.open_window(Expanse::new(8, 4));
        let root = core.create(Grower {
            wants: Expanse::new(10, 6),
        });
        core.set_root(window, Some(root)).unwrap();

        let region = core.paint_window(window).unwrap();
        assert_eq!(region, Some(Rect::new(0, 0, 8, 4)));
        let win = core.window(window).unwrap();
        assert_eq!(win.canvas().size(), Expanse::new(10, 6));
        assert!(win.is_damaged(root));
        assert_eq!(
            core.entity(root).unwrap().clipped_bounds(),
            Rect::new(0, 0, 10, 6)
        );
    }

    #[test]
    fn theme_changes_reach_every_window() {
        let paints = Arc::new(AtomicUsize::new(0));
        let (mut core, window, stack, swatches) = setup(&paints);
        let other = core.open_window(Expanse::new(5, 5));
        let lone = core.create(Stack::new());
        core.set_root(other, Some(lone)).unwrap();
        core.refresh_window(window).unwrap();
        core.refresh_window(other).unwrap();

        core.set_theme(Padded);
        assert_eq!(core.theme().name(), "padded");
        assert_eq!(core.entity(stack).unwrap().min_size(), Expanse::new(5, 8));
        core.refresh_window(window).unwrap();
        core.refresh_window(other).unwrap();

        assert_eq!(
            core.entity(swatches[0]).unwrap().bounds(),
            Rect::new(1, 1, 8, 2)
        );
        let canvas = core.window(window).unwrap().canvas();
        assert_eq!(canvas.get(Point::new(0, 0)), Some(Color::WHITE));
        let canvas = core.window(other).unwrap().canvas();
        assert_eq!(canvas.get(Point::new(4, 4)), Some(Color::WHITE));
    }
}
