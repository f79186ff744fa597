//! A clickable, focusable block.

use geom::{Expanse, Point, Rect};

use crate::{
    Context,
    canvas::CanvasView,
    event::{Button, Key, KeyCode, Mods},
    theme::{Pattern, PatternState},
    widget::{Focusable, KeyboardTarget, MouseTarget, Selectable, Themeable, Widget},
};

/// A solid block with a fixed minimum size. It is activated by a left click
/// that is released over it, or by Enter or Space while focused. Pressing
/// the block focuses it.
#[derive(Debug)]
pub struct Block {
    /// Declared minimum size.
    size: Expanse,
    /// Accepts focus and input.
    enabled: bool,
    /// The left button is held on the block.
    pressed: bool,
    /// Completed activations.
    activations: u32,
}

impl Block {
    /// An enabled block.
    pub fn new(w: u32, h: u32) -> Self {
        Self {
            size: Expanse::new(w, h),
            enabled: true,
            pressed: false,
            activations: 0,
        }
    }

    /// Build a disabled block.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Enable or disable the block.
    pub fn set_enabled(&mut self, enabled: bool, ctx: &mut dyn Context) {
        if self.enabled != enabled {
            self.enabled = enabled;
            ctx.invalidate();
        }
    }

    /// Completed activations.
    pub fn activations(&self) -> u32 {
        self.activations
    }

    /// Is the left button held on the block?
    pub fn pressed(&self) -> bool {
        self.pressed
    }

    /// Record an activation.
    fn activate(&mut self, ctx: &mut dyn Context) {
        self.activations += 1;
        ctx.invalidate();
    }
}

impl Widget for Block {
    fn on_create(&mut self, ctx: &mut dyn Context) {
        ctx.set_minimum_size(self.size);
    }

    fn paint(&mut self, canvas: &mut CanvasView<'_>, ctx: &mut dyn Context) {
        let state = PatternState {
            focused: ctx.focused(),
            pressed: self.pressed,
            selected: ctx.selected(),
            disabled: !self.enabled,
        };
        let b = ctx.bounds();
        let theme = ctx.theme();
        canvas.fill(b, theme.color(Pattern::Raised, state));
        if state.focused {
            let outline = theme.color(Pattern::Outline, state);
            canvas.fill(Rect::new(b.tl.x, b.tl.y, b.w, 1), outline);
            canvas.fill(Rect::new(b.tl.x, b.bottom() - 1, b.w, 1), outline);
        }
    }

    fn as_focusable(&mut self) -> Option<&mut dyn Focusable> {
        Some(self)
    }

    fn as_keyboard_target(&mut self) -> Option<&mut dyn KeyboardTarget> {
        Some(self)
    }

    fn as_mouse_target(&mut self) -> Option<&mut dyn MouseTarget> {
        Some(self)
    }

    fn as_selectable(&mut self) -> Option<&mut dyn Selectable> {
        Some(self)
    }

    fn as_themeable(&mut self) -> Option<&mut dyn Themeable> {
        Some(self)
    }
}

impl Focusable for Block {
    fn enabled(&self) -> bool {
        self.enabled
    }
}

impl KeyboardTarget for Block {
    fn handle_key_down(&mut self, key: Key, ctx: &mut dyn Context) {
        if self.enabled && (key == KeyCode::Enter || key == ' ') {
            self.activate(ctx);
        }
    }
}

impl MouseTarget for Block {
    fn handle_mouse_down(
        &mut self,
        _point: Point,
        button: Button,
        _mods: Mods,
        ctx: &mut dyn Context,
    ) {
        if button != Button::Left || !self.enabled {
            return;
        }
        self.pressed = true;
        ctx.focus();
        ctx.invalidate();
    }

    fn handle_mouse_up(
        &mut self,
        point: Point,
        button: Button,
        _mods: Mods,
        ctx: &mut dyn Context,
    ) {
        if button != Button::Left || !self.pressed {
            return;
        }
        self.pressed = false;
        if ctx.bounds().contains_point(point) {
            self.activate(ctx);
        } else {
            ctx.invalidate();
        }
    }
}

impl Selectable for Block {
    fn handle_selection_change(&mut self, ctx: &mut dyn Context) {
        ctx.invalidate();
    }
}

impl Themeable for Block {
    fn handle_theme_change(&mut self, ctx: &mut dyn Context) {
        ctx.invalidate();
    }
}
