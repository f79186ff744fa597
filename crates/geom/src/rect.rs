use super::{Error, Expanse, Point, Result};

/// A rectangle with a signed origin and unsigned size.
///
/// The rectangle is half-open: it contains `left..right` horizontally and
/// `top..bottom` vertically. A rectangle with a zero dimension is empty and
/// contains no points.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Rect {
    /// Top-left corner.
    pub tl: Point,
    /// Width.
    pub w: u32,
    /// Height.
    pub h: u32,
}

impl Rect {
    /// Construct a rectangle from coordinates and size.
    pub fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self {
            tl: Point { x, y },
            w,
            h,
        }
    }

    /// Construct a rectangle from its edges. Inverted edges produce an empty
    /// rectangle anchored at `(left, top)`.
    pub fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        let w = (i64::from(right) - i64::from(left)).clamp(0, i64::from(u32::MAX)) as u32;
        let h = (i64::from(bottom) - i64::from(top)).clamp(0, i64::from(u32::MAX)) as u32;
        Self::new(left, top, w, h)
    }

    /// A zero-sized rectangle at the origin.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Does this rect have a zero size?
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Left edge (inclusive).
    pub fn left(&self) -> i32 {
        self.tl.x
    }

    /// Top edge (inclusive).
    pub fn top(&self) -> i32 {
        self.tl.y
    }

    /// Right edge (exclusive).
    pub fn right(&self) -> i32 {
        self.tl.x.saturating_add_unsigned(self.w)
    }

    /// Bottom edge (exclusive).
    pub fn bottom(&self) -> i32 {
        self.tl.y.saturating_add_unsigned(self.h)
    }

    /// The size of this rectangle.
    pub fn size(&self) -> Expanse {
        Expanse::new(self.w, self.h)
    }

    /// The area of this rectangle.
    pub fn area(&self) -> u64 {
        self.size().area()
    }

    /// The center point, rounded towards the top-left.
    pub fn center(&self) -> Point {
        Point {
            x: self.tl.x.saturating_add_unsigned(self.w / 2),
            y: self.tl.y.saturating_add_unsigned(self.h / 2),
        }
    }

    /// Does this rectangle contain the point?
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.left() && p.x < self.right() && p.y >= self.top() && p.y < self.bottom()
    }

    /// Does this rectangle completely enclose the other? Empty rectangles are
    /// enclosed by everything.
    pub fn contains_rect(&self, other: Self) -> bool {
        if other.is_empty() {
            return true;
        }
        other.left() >= self.left()
            && other.right() <= self.right()
            && other.top() >= self.top()
            && other.bottom() <= self.bottom()
    }

    /// Return the overlapping region of two rectangles, if it is non-empty.
    pub fn intersect(&self, other: Self) -> Option<Self> {
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= left || bottom <= top {
            return None;
        }
        Some(Self::from_edges(left, top, right, bottom))
    }

    /// Do the two rectangles share any area?
    pub fn overlaps(&self, other: Self) -> bool {
        self.intersect(other).is_some()
    }

    /// The smallest rectangle enclosing both. Empty rectangles are ignored.
    pub fn union(&self, other: Self) -> Self {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return *self;
        }
        Self::from_edges(
            self.left().min(other.left()),
            self.top().min(other.top()),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// Shift the rectangle by an offset.
    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self {
            tl: self.tl.translate(dx, dy),
            w: self.w,
            h: self.h,
        }
    }

    /// Extracts an inner rectangle, given a border width on every side.
    pub fn inset(&self, border: u32) -> Result<Self> {
        let twice = border.saturating_mul(2);
        if self.w < twice || self.h < twice {
            return Err(Error::Geometry("rectangle too small".into()));
        }
        Ok(Self {
            tl: self.tl.translate(border as i32, border as i32),
            w: self.w - twice,
            h: self.h - twice,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges() {
        let r = Rect::new(-2, 3, 4, 5);
        assert_eq!((r.left(), r.top(), r.right(), r.bottom()), (-2, 3, 2, 8));
        assert_eq!(Rect::from_edges(-2, 3, 2, 8), r);
        assert!(Rect::from_edges(5, 5, 1, 1).is_empty());
        assert_eq!(r.center(), Point::new(0, 5));
    }

    #[test]
    fn contains() {
        let r = Rect::new(10, 10, 10, 10);
        assert!(r.contains_point(Point::new(10, 10)));
        assert!(r.contains_point(Point::new(19, 19)));
        assert!(!r.contains_point(Point::new(20, 19)));
        assert!(!r.contains_point(Point::new(9, 10)));
        assert!(r.contains_rect(Rect::new(12, 12, 8, 8)));
        assert!(!r.contains_rect(Rect::new(12, 12, 9, 8)));
        assert!(r.contains_rect(Rect::new(100, 100, 0, 0)));
        assert!(!Rect::zero().contains_point(Point::zero()));
    }

    #[test]
    fn intersect_and_union() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        assert_eq!(a.intersect(b), Some(Rect::new(5, 5, 5, 5)));
        assert_eq!(a.intersect(Rect::new(10, 0, 5, 5)), None);
        assert_eq!(a.union(b), Rect::new(0, 0, 15, 15));
        assert_eq!(a.union(Rect::new(50, 50, 0, 3)), a);
        assert_eq!(Rect::zero().union(b), b);
    }

    #[test]
    fn inset() -> Result<()> {
        assert_eq!(Rect::new(0, 0, 10, 6).inset(2)?, Rect::new(2, 2, 6, 2));
        assert_eq!(Rect::new(0, 0, 4, 4).inset(2)?, Rect::new(2, 2, 0, 0));
        assert!(Rect::new(0, 0, 3, 10).inset(2).is_err());
        Ok(())
    }
}
