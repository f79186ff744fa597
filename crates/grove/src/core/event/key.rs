//! Keys and modifier state.
use std::ops::{Add, BitOr};

/// Held modifiers.
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Mods {
    /// Shift.
    pub shift: bool,
    /// Control.
    pub ctrl: bool,
    /// Alt or option.
    pub alt: bool,
    /// Command or super.
    pub meta: bool,
}

impl Mods {
    /// True if nothing is held.
    pub fn is_empty(&self) -> bool {
        *self == Empty
    }
}

impl BitOr for Mods {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            shift: self.shift | rhs.shift,
            ctrl: self.ctrl | rhs.ctrl,
            alt: self.alt | rhs.alt,
            meta: self.meta | rhs.meta,
        }
    }
}

impl<T: Into<KeyCode>> Add<T> for Mods {
    type Output = Key;

    fn add(self, code: T) -> Key {
        Key {
            mods: self,
            code: code.into(),
        }
    }
}

#[allow(non_upper_case_globals)]
/// Nothing held.
pub const Empty: Mods = Mods {
    shift: false,
    ctrl: false,
    alt: false,
    meta: false,
};

#[allow(non_upper_case_globals)]
/// Shift alone.
pub const Shift: Mods = Mods {
    shift: true,
    ..Empty
};

#[allow(non_upper_case_globals)]
/// Control alone.
pub const Ctrl: Mods = Mods { ctrl: true, ..Empty };

#[allow(non_upper_case_globals)]
/// Alt alone.
pub const Alt: Mods = Mods { alt: true, ..Empty };

/// Platform-independent key codes.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum KeyCode {
    /// Tab.
    Tab,
    /// Enter or return.
    Enter,
    /// Escape.
    Esc,
    /// Backspace.
    Backspace,
    /// Delete.
    Delete,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Home.
    Home,
    /// End.
    End,
    /// Page up.
    PageUp,
    /// Page down.
    PageDown,
    /// Function key `F(n)`.
    F(u8),
    /// A printable character.
    Char(char),
}

impl From<char> for KeyCode {
    fn from(c: char) -> Self {
        Self::Char(c)
    }
}

/// A key code with the modifiers held when it was pressed.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Key {
    /// Held modifiers.
    pub mods: Mods,
    /// The key itself.
    pub code: KeyCode,
}

impl Key {
    /// Does this key move focus? Traversal is Tab, optionally with Shift for
    /// direction, and with Alt exactly when `require_alt` is set.
    pub fn is_focus_traversal(&self, require_alt: bool) -> bool {
        self.code == KeyCode::Tab
            && !self.mods.ctrl
            && !self.mods.meta
            && self.mods.alt == require_alt
    }
}

impl From<KeyCode> for Key {
    fn from(code: KeyCode) -> Self {
        Empty + code
    }
}

impl From<char> for Key {
    fn from(c: char) -> Self {
        Empty + c
    }
}

/// A bare key code only matches a key with no modifiers.
impl PartialEq<KeyCode> for Key {
    fn eq(&self, code: &KeyCode) -> bool {
        self.mods.is_empty() && self.code == *code
    }
}

impl PartialEq<char> for Key {
    fn eq(&self, c: &char) -> bool {
        *self == KeyCode::Char(*c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifiers_compose() {
        let k = (Shift | Alt) + KeyCode::Tab;
        assert!(k.mods.shift && k.mods.alt && !k.mods.ctrl);
        assert_ne!(k, KeyCode::Tab);
        assert_eq!(Key::from('x'), 'x');
        assert_eq!(Ctrl + 'c', Key { mods: Ctrl, code: KeyCode::Char('c') });
        assert!(Empty.is_empty());
    }

    #[test]
    fn focus_traversal() {
        assert!(Key::from(KeyCode::Tab).is_focus_traversal(false));
        assert!((Shift + KeyCode::Tab).is_focus_traversal(false));
        assert!(!(Alt + KeyCode::Tab).is_focus_traversal(false));
        assert!((Alt + KeyCode::Tab).is_focus_traversal(true));
        assert!(((Shift | Alt) + KeyCode::Tab).is_focus_traversal(true));
        assert!(!Key::from(KeyCode::Tab).is_focus_traversal(true));
        assert!(!(Ctrl + KeyCode::Tab).is_focus_traversal(false));
        assert!(!Key::from('\t').is_focus_traversal(false));
    }
}
