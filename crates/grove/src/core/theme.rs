//! Themes map a visual pattern and its interaction state to concrete colors
//! and spacing.
use crate::canvas::Color;

/// A visual role a widget can ask the theme about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    /// Window and container backgrounds.
    Background,
    /// Text and glyphs.
    Foreground,
    /// Raised surfaces such as buttons.
    Raised,
    /// Sunken surfaces such as text inputs and wells.
    Sunken,
    /// Highlighted items in lists.
    Highlight,
    /// Focus rings and outlines.
    Outline,
}

/// Interaction state that modifies a pattern.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatternState {
    /// The entity holds keyboard focus.
    pub focused: bool,
    /// A mouse button is held on the entity.
    pub pressed: bool,
    /// The entity is selected in its container.
    pub selected: bool,
    /// The entity does not accept input.
    pub disabled: bool,
}

/// A theme is a pure function of its inputs. Swapping the theme on a
/// [`Core`](crate::Core) notifies every themeable entity so it can repaint.
pub trait Theme: Send {
    /// The color for a pattern in a state.
    fn color(&self, pattern: Pattern, state: PatternState) -> Color;

    /// Inner padding for a pattern.
    fn padding(&self, _pattern: Pattern) -> u32 {
        0
    }

    /// A short identifier for logs and dumps.
    fn name(&self) -> &str;
}

/// Solarized base03.
pub const BASE03: Color = Color::hex("#002b36");
/// Solarized base02.
pub const BASE02: Color = Color::hex("#073642");
/// Solarized base01.
pub const BASE01: Color = Color::hex("#586e75");
/// Solarized base0.
pub const BASE0: Color = Color::hex("#839496");
/// Solarized base1.
pub const BASE1: Color = Color::hex("#93a1a1");
/// Solarized base3.
pub const BASE3: Color = Color::hex("#fdf6e3");
/// Solarized blue.
pub const BLUE: Color = Color::hex("#268bd2");
/// Solarized cyan.
pub const CYAN: Color = Color::hex("#2aa198");
/// Solarized violet.
pub const VIOLET: Color = Color::hex("#6c71c4");

/// A dark solarized theme.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultTheme;

impl Theme for DefaultTheme {
    fn color(&self, pattern: Pattern, state: PatternState) -> Color {
        if state.disabled {
            return match pattern {
                Pattern::Background | Pattern::Sunken => BASE03,
                _ => BASE01,
            };
        }
        match pattern {
            Pattern::Background => BASE03,
            Pattern::Foreground if state.focused => BASE3,
            Pattern::Foreground => BASE0,
            Pattern::Raised if state.pressed => BASE01,
            Pattern::Raised if state.focused => BLUE,
            Pattern::Raised => BASE02,
            Pattern::Sunken => BASE03,
            Pattern::Highlight if state.selected && state.focused => VIOLET,
            Pattern::Highlight if state.selected => CYAN,
            Pattern::Highlight => BASE02,
            Pattern::Outline if state.focused => BLUE,
            Pattern::Outline => BASE1,
        }
    }

    fn padding(&self, pattern: Pattern) -> u32 {
        match pattern {
            Pattern::Raised | Pattern::Sunken => 2,
            _ => 0,
        }
    }

    fn name(&self) -> &str {
        "solarized-dark"
    }
}
