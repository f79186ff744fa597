//! Integration tests for tree structure, clipping and the layout cascade.

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use grove::{
        Context, Core, EntityId, Widget, WindowId,
        focus::FocusManager,
        geom::{Expanse, Rect},
        widget::{Container, Focusable, Layoutable},
    };
    use proptest::{collection, prelude::*};
    use rand::{Rng, SeedableRng, rngs::StdRng};

    /// A focusable container that leaves children wherever they were placed.
    struct Free;

    impl Widget for Free {
        fn as_layoutable(&mut self) -> Option<&mut dyn Layoutable> {
            Some(self)
        }

        fn as_container(&mut self) -> Option<&mut dyn Container> {
            Some(self)
        }

        fn as_focusable(&mut self) -> Option<&mut dyn Focusable> {
            Some(self)
        }
    }

    impl Layoutable for Free {
        fn layout(&mut self, _ctx: &mut dyn Context) {}
    }

    impl Container for Free {}

    impl Focusable for Free {}

    /// A container that records its name whenever it lays out.
    struct Counted {
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Widget for Counted {
        fn as_layoutable(&mut self) -> Option<&mut dyn Layoutable> {
            Some(self)
        }

        fn as_container(&mut self) -> Option<&mut dyn Container> {
            Some(self)
        }
    }

    impl Layoutable for Counted {
        fn layout(&mut self, _ctx: &mut dyn Context) {
            self.log.lock().unwrap().push(self.name);
        }
    }

    impl Container for Counted {}

    /// Build a tree of `Free` nodes rooted in a 20x20 window. For each
    /// `(p, r)` in `nodes`, node `i + 1` is adopted by node `p % (i + 1)` and
    /// placed at `r`.
    fn build(nodes: &[(usize, Rect)]) -> (Core, WindowId, Vec<EntityId>) {
        let mut core = Core::default();
        let window = core.open_window(Expanse::new(20, 20));
        let root = core.create(Free);
        core.set_root(window, Some(root)).unwrap();
        let mut ids = vec![root];
        for (i, (p, r)) in nodes.iter().enumerate() {
            let parent = ids[p % (i + 1)];
            let id = core.create(Free);
            core.adopt(parent, id);
            let index = core.children(parent).len() - 1;
            core.place_child(parent, index, *r);
            ids.push(id);
        }
        (core, window, ids)
    }

    fn random_tree(rng: &mut StdRng, n: usize) -> (Core, WindowId, Vec<EntityId>) {
        let nodes: Vec<(usize, Rect)> = (0..n)
            .map(|_| {
                let r = Rect::new(
                    rng.random_range(-4..20),
                    rng.random_range(-4..20),
                    rng.random_range(0..12),
                    rng.random_range(0..12),
                );
                (rng.random_range(0..n), r)
            })
            .collect();
        build(&nodes)
    }

    fn assert_clips_nest(core: &Core, ids: &[EntityId]) {
        for id in ids {
            let e = core.entity(*id).unwrap();
            let clip = e.clipped_bounds();
            if clip.is_empty() {
                continue;
            }
            assert!(e.bounds().contains_rect(clip), "{id:?} clip escapes bounds");
            if let Some(p) = e.parent() {
                let parent_clip = core.entity(p).unwrap().clipped_bounds();
                assert!(parent_clip.contains_rect(clip), "{id:?} clip escapes parent");
            }
        }
    }

    fn rect() -> impl Strategy<Value = Rect> {
        (-5i32..25, -5i32..25, 0u32..15, 0u32..15).prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
    }

    proptest! {
        #[test]
        fn clips_nest_inside_parents(nodes in collection::vec((0usize..64, rect()), 1..24)) {
            let (mut core, window, ids) = build(&nodes);
            core.refresh_window(window).unwrap();
            assert_clips_nest(&core, &ids);

            core.resize_window(window, Expanse::new(7, 9)).unwrap();
            core.refresh_window(window).unwrap();
            assert_clips_nest(&core, &ids);
            let root = core.entity(ids[0]).unwrap();
            prop_assert_eq!(root.clipped_bounds(), Rect::new(0, 0, 7, 9));
        }
    }

    #[test]
    fn disowning_scrubs_window_state() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let (mut core, window, ids) = random_tree(&mut rng, 30);
            let focus = ids[rng.random_range(0..ids.len())];
            core.set_focus(window, Some(focus));

            let victim = ids[rng.random_range(1..ids.len())];
            let parent = core.parent(victim).unwrap();
            let index = core.index_of(parent, victim).unwrap();
            assert_eq!(core.disown(parent, index), victim);

            let subtree = core.pre_order(victim);
            let win = core.window(window).unwrap();
            for id in &subtree {
                assert!(!win.is_damaged(*id));
                assert_eq!(core.entity(*id).unwrap().window(), None);
            }
            if subtree.contains(&focus) {
                assert_eq!(win.focused(), None);
            } else {
                assert_eq!(win.focused(), Some(focus));
            }

            core.remove(victim);
            assert!(subtree.iter().all(|id| !core.contains(*id)));
            assert!(core.contains(parent));
        }
    }

    #[test]
    #[should_panic(expected = "still attached")]
    fn removing_attached_entities_panics() {
        let (mut core, _, ids) = build(&[(0, Rect::new(0, 0, 4, 4))]);
        core.remove(ids[1]);
    }

    #[test]
    fn layout_cascades_down_only() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut core = Core::default();
        let window = core.open_window(Expanse::new(10, 10));
        let mut node = |name| {
            core.create(Counted {
                name,
                log: Arc::clone(&log),
            })
        };
        let (root, a, a1, b) = (node("root"), node("a"), node("a1"), node("b"));
        core.adopt(root, a);
        core.adopt(a, a1);
        core.adopt(root, b);
        core.set_root(window, Some(root)).unwrap();
        core.refresh_window(window).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["root", "a", "a1", "b"]);

        log.lock().unwrap().clear();
        core.invalidate_layout(a);
        core.refresh_window(window).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["a", "a1"]);

        log.lock().unwrap().clear();
        core.refresh_window(window).unwrap();
        assert!(log.lock().unwrap().is_empty());
    }
}
