//! A configurable widget that opts into capabilities on request and logs
//! each callback as `name.callback` (with a short argument where useful).
use geom::{Expanse, Point};

use super::{get_state, record, reset_state};
use crate::{
    Context, EntityId,
    canvas::{CanvasView, Color},
    event::{Button, Key, Mods, ScrollDelta},
    widget::{
        Configurable, Container, Focusable, KeyboardTarget, Layoutable, MouseTarget,
        MouseTargetContainer, ScrollTarget, Selectable, SelectableContainer, Themeable, Widget,
    },
};

/// Clear the callback log.
pub fn reset() {
    reset_state();
}

/// The callbacks recorded since the last reset.
pub fn events() -> Vec<String> {
    get_state().path
}

/// A hook run from the probe's layout callback.
type LayoutHook = Box<dyn FnMut(&mut dyn Context) + Send>;

/// Capability switches for a probe.
#[derive(Debug, Default, Clone, Copy)]
struct Flags {
    /// Container and layoutable.
    container: bool,
    /// Focusable.
    focusable: bool,
    /// Reports itself disabled when focusable.
    disabled: bool,
    /// Mouse target.
    mouse: bool,
    /// Keyboard target.
    keyboard: bool,
    /// Observes descendant presses.
    mouse_container: bool,
    /// Scroll target.
    scroll_target: bool,
    /// Selectable.
    selectable: bool,
    /// Selectable container.
    selectable_container: bool,
    /// Multi-select when a selectable container.
    multi_select: bool,
    /// Themeable.
    themeable: bool,
    /// Configurable.
    configurable: bool,
    /// Invalidates itself from `paint`.
    invalidate_on_paint: bool,
}

/// An instrumented widget.
pub struct Probe {
    /// Name used as the log prefix and entity name.
    name: &'static str,
    /// Enabled capabilities.
    flags: Flags,
    /// Fill color for the whole bounds.
    fill: Option<Color>,
    /// Minimum size declared on creation.
    min_size: Option<Expanse>,
    /// Extra layout behaviour.
    on_layout: Option<LayoutHook>,
}

impl Probe {
    /// A probe with no capabilities.
    pub fn leaf(name: &str) -> Self {
        Self {
            // Entity names are static; probes live for the whole test run.
            name: Box::leak(name.to_owned().into_boxed_str()),
            flags: Flags::default(),
            fill: None,
            min_size: None,
            on_layout: None,
        }
    }

    /// A layoutable container probe.
    pub fn container(name: &str) -> Self {
        let mut p = Self::leaf(name);
        p.flags.container = true;
        p
    }

    /// Accept focus.
    pub fn focusable(mut self) -> Self {
        self.flags.focusable = true;
        self
    }

    /// Refuse focus while remaining focusable.
    pub fn disabled(mut self) -> Self {
        self.flags.disabled = true;
        self
    }

    /// Receive mouse events.
    pub fn mouse(mut self) -> Self {
        self.flags.mouse = true;
        self
    }

    /// Receive key events.
    pub fn keyboard(mut self) -> Self {
        self.flags.keyboard = true;
        self
    }

    /// Observe presses on descendants.
    pub fn mouse_container(mut self) -> Self {
        self.flags.mouse_container = true;
        self
    }

    /// Receive scroll gestures.
    pub fn scroll_target(mut self) -> Self {
        self.flags.scroll_target = true;
        self
    }

    /// Accept selection by a container.
    pub fn selectable(mut self) -> Self {
        self.flags.selectable = true;
        self
    }

    /// Permit selecting children, one at a time.
    pub fn selectable_container(mut self) -> Self {
        self.flags.selectable_container = true;
        self
    }

    /// Permit selecting several children at once.
    pub fn multi_select(mut self) -> Self {
        self.flags.selectable_container = true;
        self.flags.multi_select = true;
        self
    }

    /// React to theme changes.
    pub fn themeable(mut self) -> Self {
        self.flags.themeable = true;
        self
    }

    /// React to configuration changes.
    pub fn configurable(mut self) -> Self {
        self.flags.configurable = true;
        self
    }

    /// Fill the bounds when painting.
    pub fn fill(mut self, color: Color) -> Self {
        self.fill = Some(color);
        self
    }

    /// Declare a minimum size on creation.
    pub fn min_size(mut self, w: u32, h: u32) -> Self {
        self.min_size = Some(Expanse::new(w, h));
        self
    }

    /// Run a hook after logging each layout.
    pub fn on_layout(mut self, f: impl FnMut(&mut dyn Context) + Send + 'static) -> Self {
        self.on_layout = Some(Box::new(f));
        self
    }

    /// Invalidate paint and layout from inside `paint`.
    pub fn invalidate_on_paint(mut self) -> Self {
        self.flags.invalidate_on_paint = true;
        self
    }

    /// Record a callback.
    fn log(&self, what: &str) {
        record(format!("{}.{what}", self.name));
    }
}

impl Widget for Probe {
    fn on_create(&mut self, ctx: &mut dyn Context) {
        if let Some(size) = self.min_size {
            ctx.set_minimum_size(size);
        }
    }

    fn paint(&mut self, canvas: &mut CanvasView<'_>, ctx: &mut dyn Context) {
        self.log("paint");
        if let Some(color) = self.fill {
            canvas.fill(ctx.bounds(), color);
        }
        if self.flags.invalidate_on_paint {
            ctx.invalidate();
            ctx.invalidate_layout();
        }
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn as_layoutable(&mut self) -> Option<&mut dyn Layoutable> {
        if self.flags.container { Some(self) } else { None }
    }

    fn as_container(&mut self) -> Option<&mut dyn Container> {
        if self.flags.container { Some(self) } else { None }
    }

    fn as_focusable(&mut self) -> Option<&mut dyn Focusable> {
        if self.flags.focusable { Some(self) } else { None }
    }

    fn as_keyboard_target(&mut self) -> Option<&mut dyn KeyboardTarget> {
        if self.flags.keyboard { Some(self) } else { None }
    }

    fn as_mouse_target(&mut self) -> Option<&mut dyn MouseTarget> {
        if self.flags.mouse { Some(self) } else { None }
    }

    fn as_mouse_target_container(&mut self) -> Option<&mut dyn MouseTargetContainer> {
        if self.flags.mouse_container { Some(self) } else { None }
    }

    fn as_scroll_target(&mut self) -> Option<&mut dyn ScrollTarget> {
        if self.flags.scroll_target { Some(self) } else { None }
    }

    fn as_selectable(&mut self) -> Option<&mut dyn Selectable> {
        if self.flags.selectable { Some(self) } else { None }
    }

    fn as_selectable_container(&mut self) -> Option<&mut dyn SelectableContainer> {
        if self.flags.selectable_container { Some(self) } else { None }
    }

    fn as_themeable(&mut self) -> Option<&mut dyn Themeable> {
        if self.flags.themeable { Some(self) } else { None }
    }

    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        if self.flags.configurable { Some(self) } else { None }
    }
}

impl Layoutable for Probe {
    fn layout(&mut self, ctx: &mut dyn Context) {
        self.log("layout");
        if let Some(f) = self.on_layout.as_mut() {
            f(ctx);
        }
    }
}

impl Container for Probe {
    fn handle_child_minimum_size_change(&mut self, _child: EntityId, _ctx: &mut dyn Context) {
        self.log("child_min_size");
    }

    fn handle_children_change(&mut self, _ctx: &mut dyn Context) {
        self.log("children");
    }

    fn handle_child_scroll_bounds_change(&mut self, _child: EntityId, _ctx: &mut dyn Context) {
        self.log("child_scroll");
    }
}

impl Focusable for Probe {
    fn enabled(&self) -> bool {
        !self.flags.disabled
    }

    fn handle_focus_change(&mut self, ctx: &mut dyn Context) {
        self.log(&format!("focus({})", ctx.focused()));
    }
}

impl KeyboardTarget for Probe {
    fn handle_key_down(&mut self, key: Key, _ctx: &mut dyn Context) {
        self.log(&format!("key_down({:?})", key.code));
    }

    fn handle_key_up(&mut self, key: Key, _ctx: &mut dyn Context) {
        self.log(&format!("key_up({:?})", key.code));
    }
}

impl MouseTarget for Probe {
    fn handle_mouse_down(
        &mut self,
        _point: Point,
        button: Button,
        _mods: Mods,
        _ctx: &mut dyn Context,
    ) {
        self.log(&format!("mouse_down({button:?})"));
    }

    fn handle_mouse_up(
        &mut self,
        _point: Point,
        button: Button,
        _mods: Mods,
        _ctx: &mut dyn Context,
    ) {
        self.log(&format!("mouse_up({button:?})"));
    }

    fn handle_motion(&mut self, point: Point, _mods: Mods, _ctx: &mut dyn Context) {
        self.log(&format!("motion({},{})", point.x, point.y));
    }
}

impl MouseTargetContainer for Probe {
    fn handle_child_mouse_down(
        &mut self,
        _point: Point,
        button: Button,
        _mods: Mods,
        _child: EntityId,
        _ctx: &mut dyn Context,
    ) {
        self.log(&format!("child_mouse_down({button:?})"));
    }

    fn handle_child_mouse_up(
        &mut self,
        _point: Point,
        button: Button,
        _mods: Mods,
        _child: EntityId,
        _ctx: &mut dyn Context,
    ) {
        self.log(&format!("child_mouse_up({button:?})"));
    }
}

impl ScrollTarget for Probe {
    fn handle_scroll(
        &mut self,
        _point: Point,
        delta: ScrollDelta,
        _mods: Mods,
        _ctx: &mut dyn Context,
    ) {
        self.log(&format!("scroll({})", delta.dy));
    }
}

impl Selectable for Probe {
    fn handle_selection_change(&mut self, ctx: &mut dyn Context) {
        self.log(&format!("selected({})", ctx.selected()));
    }
}

impl SelectableContainer for Probe {
    fn multi_select(&self) -> bool {
        self.flags.multi_select
    }
}

impl Themeable for Probe {
    fn handle_theme_change(&mut self, _ctx: &mut dyn Context) {
        self.log("theme");
    }
}

impl Configurable for Probe {
    fn handle_config_change(&mut self, _ctx: &mut dyn Context) {
        self.log("config");
    }
}
