//! Input routing. Mouse presses go to the deepest entity under the pointer,
//! which captures that button until release; ancestors that observe their
//! descendants hear about both ends of the press. Keys go to the focused
//! entity, except for the focus traversal keys.
use geom::Point;
use tracing::trace;

use super::{focus::FocusManager, world::Core};
use crate::{
    Context, EntityId, WindowId,
    error::Result,
    event::{Button, Key, Mods, ScrollDelta, WindowEvent},
    widget::{Capability, MouseTargetContainer},
};

/// Offer a notification to every observing ancestor of `from`, nearest
/// first.
fn bubble(
    core: &mut Core,
    from: EntityId,
    f: impl Fn(&mut dyn MouseTargetContainer, &mut dyn Context),
) {
    let mut next = core.parent(from);
    while let Some(id) = next {
        next = core.parent(id);
        if core.has_capability(id, Capability::MouseTargetContainer) {
            core.call(id, |w, ctx| {
                if let Some(c) = w.as_mouse_target_container() {
                    f(c, ctx);
                }
            });
        }
    }
}

/// Route a button press.
pub(super) fn mouse_down(
    core: &mut Core,
    window: WindowId,
    point: Point,
    button: Button,
    mods: Mods,
) -> Result<()> {
    let Some(root) = core.window(window)?.root() else {
        return Ok(());
    };
    let target = core.child_at(root, point);
    trace!(?window, ?point, ?button, ?target, "mouse down");
    if core.has_capability(target, Capability::MouseTarget) {
        core.windows[window].drags[button.index()] = Some(target);
        core.call(target, |w, ctx| {
            if let Some(t) = w.as_mouse_target() {
                t.handle_mouse_down(point, button, mods, ctx);
            }
        });
    }
    bubble(core, target, |c, ctx| {
        c.handle_child_mouse_down(point, button, mods, target, ctx);
    });
    Ok(())
}

/// Route a button release to the entity that captured the button.
pub(super) fn mouse_up(
    core: &mut Core,
    window: WindowId,
    point: Point,
    button: Button,
    mods: Mods,
) -> Result<()> {
    let Some(owner) = core.window(window)?.drag_owner(button) else {
        return Ok(());
    };
    trace!(?window, ?point, ?button, ?owner, "mouse up");
    core.call(owner, |w, ctx| {
        if let Some(t) = w.as_mouse_target() {
            t.handle_mouse_up(point, button, mods, ctx);
        }
    });
    bubble(core, owner, |c, ctx| {
        c.handle_child_mouse_up(point, button, mods, owner, ctx);
    });
    if let Some(win) = core.windows.get_mut(window)
        && win.drags[button.index()] == Some(owner)
    {
        win.drags[button.index()] = None;
    }
    Ok(())
}

/// Route pointer motion: to every capturing entity while any button is
/// held, otherwise to the entity under the pointer.
pub(super) fn mouse_motion(
    core: &mut Core,
    window: WindowId,
    point: Point,
    mods: Mods,
) -> Result<()> {
    let win = core.window(window)?;
    let mut owners: Vec<EntityId> = Vec::with_capacity(Button::COUNT);
    for owner in win.drags.iter().flatten() {
        if !owners.contains(owner) {
            owners.push(*owner);
        }
    }
    if owners.is_empty() {
        let Some(root) = win.root() else {
            return Ok(());
        };
        let target = core.child_at(root, point);
        if core.has_capability(target, Capability::MouseTarget) {
            owners.push(target);
        }
    }
    for owner in owners {
        core.call(owner, |w, ctx| {
            if let Some(t) = w.as_mouse_target() {
                t.handle_motion(point, mods, ctx);
            }
        });
    }
    Ok(())
}

/// Route a scroll gesture to the deepest scroll target under the pointer.
pub(super) fn scroll(
    core: &mut Core,
    window: WindowId,
    point: Point,
    delta: ScrollDelta,
    mods: Mods,
) -> Result<()> {
    let Some(root) = core.window(window)?.root() else {
        return Ok(());
    };
    let Some(target) = core.scroll_target_at(root, point) else {
        return Ok(());
    };
    trace!(?window, ?point, ?delta, ?target, "scroll");
    core.call(target, |w, ctx| {
        if let Some(t) = w.as_scroll_target() {
            t.handle_scroll(point, delta, mods, ctx);
        }
    });
    Ok(())
}

/// Route a key press. Focus traversal keys move focus and are not
/// delivered.
pub(super) fn key_down(core: &mut Core, window: WindowId, key: Key) -> Result<()> {
    if key.is_focus_traversal(core.config().focus_key_alt) {
        core.window(window)?;
        if key.mods.shift {
            core.focus_prev(window);
        } else {
            core.focus_next(window);
        }
        return Ok(());
    }
    let Some(focused) = core.window(window)?.focused() else {
        return Ok(());
    };
    core.call(focused, |w, ctx| {
        if let Some(t) = w.as_keyboard_target() {
            t.handle_key_down(key, ctx);
        }
    });
    Ok(())
}

/// Route a key release to the focused entity.
pub(super) fn key_up(core: &mut Core, window: WindowId, key: Key) -> Result<()> {
    let Some(focused) = core.window(window)?.focused() else {
        return Ok(());
    };
    if key.is_focus_traversal(core.config().focus_key_alt) {
        return Ok(());
    }
    core.call(focused, |w, ctx| {
        if let Some(t) = w.as_keyboard_target() {
            t.handle_key_up(key, ctx);
        }
    });
    Ok(())
}

/// Route a decoded window event. `Expose` and `Close` concern the platform
/// surface and leave the tree untouched.
pub(super) fn handle_event(core: &mut Core, window: WindowId, event: WindowEvent) -> Result<()> {
    match event {
        WindowEvent::MouseDown {
            point,
            button,
            mods,
        } => mouse_down(core, window, point, button, mods),
        WindowEvent::MouseUp {
            point,
            button,
            mods,
        } => mouse_up(core, window, point, button, mods),
        WindowEvent::MouseMotion { point, mods } => mouse_motion(core, window, point, mods),
        WindowEvent::Scroll { point, delta, mods } => scroll(core, window, point, delta, mods),
        WindowEvent::KeyDown(key) => key_down(core, window, key),
        WindowEvent::KeyUp(key) => key_up(core, window, key),
        WindowEvent::Resize(size) => core.resize_window(window, size),
        WindowEvent::Expose | WindowEvent::Close => core.window(window).map(|_| ()),
    }
}

#[cfg(test)]
mod tests {
    use geom::{Expanse, Rect};

    use super::*;
    use crate::{
        event::{KeyCode, key},
        testing::probe::{Probe, events, reset},
    };

    const NONE: Mods = key::Empty;

    /// root(observer) -> [panel(observer) -> [button], scroller -> [inner]]
    fn setup() -> (Core, WindowId, [EntityId; 5]) {
        let mut core = Core::default();
        let window = core.open_window(Expanse::new(100, 100));
        let root = core.create(Probe::container("root").mouse_container());
        let panel = core.create(Probe::container("panel").mouse_container());
        let button = core.create(Probe::leaf("button").mouse().focusable().keyboard());
        let scroller = core.create(Probe::container("scroller").scroll_target());
        let inner = core.create(Probe::leaf("inner").mouse());
        core.adopt(panel, button);
        core.adopt(scroller, inner);
        core.adopt(root, panel);
        core.adopt(root, scroller);
        core.set_root(window, Some(root)).unwrap();
        core.place_child(root, 0, Rect::new(0, 0, 50, 50));
        core.place_child(panel, 0, Rect::new(10, 10, 10, 10));
        core.place_child(root, 1, Rect::new(50, 0, 50, 50));
        core.place_child(scroller, 0, Rect::new(60, 10, 10, 10));
        reset();
        (core, window, [root, panel, button, scroller, inner])
    }

    #[test]
    fn press_captures_and_bubbles() {
        let (mut core, window, [_, _, button, _, _]) = setup();
        core.mouse_down(window, Point::new(15, 15), Button::Left, NONE)
            .unwrap();
        assert_eq!(
            core.window(window).unwrap().drag_owner(Button::Left),
            Some(button)
        );
        core.mouse_motion(window, Point::new(90, 90), NONE).unwrap();
        core.mouse_up(window, Point::new(90, 90), Button::Left, NONE)
            .unwrap();
        assert_eq!(core.window(window).unwrap().drag_owner(Button::Left), None);
        assert_eq!(
            events(),
            vec![
                "button.mouse_down(Left)",
                "panel.child_mouse_down(Left)",
                "root.child_mouse_down(Left)",
                "button.motion(90,90)",
                "button.mouse_up(Left)",
                "panel.child_mouse_up(Left)",
                "root.child_mouse_up(Left)",
            ]
        );
    }

    #[test]
    fn buttons_capture_independently() {
        let (mut core, window, [_, _, button, _, inner]) = setup();
        core.mouse_down(window, Point::new(15, 15), Button::Left, NONE)
            .unwrap();
        core.mouse_down(window, Point::new(65, 15), Button::Right, NONE)
            .unwrap();
        let win = core.window(window).unwrap();
        assert_eq!(win.drag_owner(Button::Left), Some(button));
        assert_eq!(win.drag_owner(Button::Right), Some(inner));
        reset();

        core.mouse_motion(window, Point::new(1, 1), NONE).unwrap();
        assert_eq!(events(), vec!["button.motion(1,1)", "inner.motion(1,1)"]);
        reset();

        core.mouse_up(window, Point::new(1, 1), Button::Right, NONE)
            .unwrap();
        assert_eq!(events(), vec!["inner.mouse_up(Right)", "root.child_mouse_up(Right)"]);
        assert_eq!(
            core.window(window).unwrap().drag_owner(Button::Left),
            Some(button)
        );
    }

    #[test]
    fn presses_on_non_targets_only_bubble() {
        let (mut core, window, _) = setup();
        core.mouse_down(window, Point::new(5, 5), Button::Left, NONE)
            .unwrap();
        assert_eq!(events(), vec!["root.child_mouse_down(Left)"]);
        reset();
        core.mouse_up(window, Point::new(5, 5), Button::Left, NONE)
            .unwrap();
        assert!(events().is_empty());
    }

    #[test]
    fn motion_without_capture_goes_under_pointer() {
        let (mut core, window, _) = setup();
        core.mouse_motion(window, Point::new(65, 15), NONE).unwrap();
        core.mouse_motion(window, Point::new(30, 30), NONE).unwrap();
        assert_eq!(events(), vec!["inner.motion(65,15)"]);
    }

    #[test]
    fn scroll_finds_nearest_target() {
        let (mut core, window, _) = setup();
        core.scroll(window, Point::new(65, 15), ScrollDelta::new(0, 2), NONE)
            .unwrap();
        core.scroll(window, Point::new(15, 15), ScrollDelta::new(0, 2), NONE)
            .unwrap();
        assert_eq!(events(), vec!["scroller.scroll(2)"]);
    }

    #[test]
    fn keys_go_to_focus() {
        let (mut core, window, [_, _, button, _, _]) = setup();
        core.key_down(window, 'x'.into()).unwrap();
        assert!(events().is_empty());

        core.key_down(window, KeyCode::Tab.into()).unwrap();
        assert_eq!(core.focused(window), Some(button));
        core.key_down(window, 'x'.into()).unwrap();
        core.key_up(window, 'x'.into()).unwrap();
        core.key_up(window, KeyCode::Tab.into()).unwrap();
        assert_eq!(
            events(),
            vec![
                "button.focus(true)",
                "button.key_down(Char('x'))",
                "button.key_up(Char('x'))",
            ]
        );

        core.key_down(window, key::Shift + KeyCode::Tab).unwrap();
        assert_eq!(core.focused(window), None);
    }

    #[test]
    fn alt_tab_mode_delivers_plain_tab() {
        let (mut core, window, [_, _, button, _, _]) = setup();
        core.set_config(crate::config::Config {
            focus_key_alt: true,
            ..Default::default()
        });
        core.key_down(window, key::Alt + KeyCode::Tab).unwrap();
        assert_eq!(core.focused(window), Some(button));
        reset();
        core.key_down(window, KeyCode::Tab.into()).unwrap();
        assert_eq!(events(), vec!["button.key_down(Tab)"]);
    }

    #[test]
    fn events_route_like_direct_calls() {
        let (mut core, window, [root, ..]) = setup();
        core.handle_event(
            window,
            WindowEvent::MouseDown {
                point: Point::new(65, 15),
                button: Button::Middle,
                mods: NONE,
            },
        )
        .unwrap();
        core.handle_event(window, WindowEvent::Resize(Expanse::new(40, 30)))
            .unwrap();
        assert_eq!(
            events(),
            vec!["inner.mouse_down(Middle)", "root.child_mouse_down(Middle)"]
        );
        assert_eq!(core.entity(root).unwrap().bounds(), Rect::new(0, 0, 40, 30));

        let closed = core.open_window(Expanse::new(1, 1));
        core.close_window(closed).unwrap();
        assert!(core.handle_event(closed, WindowEvent::Expose).is_err());
    }
}
