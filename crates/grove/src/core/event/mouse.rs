/// A mouse button.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Button {
    /// Primary button.
    Left,
    /// Middle button or wheel click.
    Middle,
    /// Secondary button.
    Right,
    /// Navigation "back" button.
    Back,
    /// Navigation "forward" button.
    Forward,
}

impl Button {
    /// Number of distinct buttons tracked for drag capture.
    pub const COUNT: usize = 5;

    /// All buttons, in index order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Left,
        Self::Middle,
        Self::Right,
        Self::Back,
        Self::Forward,
    ];

    /// A dense index in `0..COUNT`.
    pub fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Middle => 1,
            Self::Right => 2,
            Self::Back => 3,
            Self::Forward => 4,
        }
    }
}

/// Scroll amount, in notches. Positive `dy` scrolls content up (the viewport
/// moves down).
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash)]
pub struct ScrollDelta {
    /// Horizontal notches.
    pub dx: i32,
    /// Vertical notches.
    pub dy: i32,
}

impl ScrollDelta {
    /// Construct a scroll delta.
    pub fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }
}
