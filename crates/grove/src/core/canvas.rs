//! Pixel canvases and clip-restricted drawing views.
use geom::{Expanse, Point, Rect, shatter};

/// An 8-bit RGBA color.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// An opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// A color with an explicit alpha channel.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a `#rrggbb` literal. Intended for constants, where a malformed
    /// literal fails compilation.
    pub const fn hex(s: &str) -> Self {
        /// Decode one hex digit.
        const fn digit(c: u8) -> u8 {
            match c {
                b'0'..=b'9' => c - b'0',
                b'a'..=b'f' => c - b'a' + 10,
                b'A'..=b'F' => c - b'A' + 10,
                _ => panic!("invalid hex digit"),
            }
        }
        let b = s.as_bytes();
        assert!(b.len() == 7 && b[0] == b'#', "expected #rrggbb");
        Self::rgb(
            digit(b[1]) * 16 + digit(b[2]),
            digit(b[3]) * 16 + digit(b[4]),
            digit(b[5]) * 16 + digit(b[6]),
        )
    }
}

/// An owned pixel buffer the size of a window surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Canvas {
    /// Dimensions in pixels.
    size: Expanse,
    /// Row-major pixel storage.
    pixels: Vec<Color>,
}

impl Canvas {
    /// A transparent canvas of the given size.
    pub fn new(size: Expanse) -> Self {
        let len = usize::try_from(size.area()).unwrap_or(0);
        Self {
            size,
            pixels: vec![Color::TRANSPARENT; len],
        }
    }

    /// Canvas dimensions.
    pub fn size(&self) -> Expanse {
        self.size
    }

    /// The canvas as a rectangle anchored at the origin.
    pub fn bounds(&self) -> Rect {
        self.size.rect()
    }

    /// Read a pixel, or `None` outside the canvas.
    pub fn get(&self, p: Point) -> Option<Color> {
        self.index(p).map(|i| self.pixels[i])
    }

    /// Row-major pixel data.
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// A drawing view restricted to `clip`, which is further limited to the
    /// canvas bounds.
    pub fn view(&mut self, clip: Rect) -> CanvasView<'_> {
        let clip = clip.intersect(self.bounds()).unwrap_or_default();
        CanvasView { canvas: self, clip }
    }

    /// Storage offset for a point.
    fn index(&self, p: Point) -> Option<usize> {
        if !self.bounds().contains_point(p) {
            return None;
        }
        let (x, y) = (usize::try_from(p.x).ok()?, usize::try_from(p.y).ok()?);
        Some(y * self.size.w as usize + x)
    }
}

/// A mutable view of a canvas that silently discards drawing outside its
/// clip rectangle. Widgets receive one of these in `paint`, clipped to their
/// visible bounds.
#[derive(Debug)]
pub struct CanvasView<'a> {
    /// The underlying canvas.
    canvas: &'a mut Canvas,
    /// Drawable region, in window coordinates.
    clip: Rect,
}

impl CanvasView<'_> {
    /// The drawable region.
    pub fn clip(&self) -> Rect {
        self.clip
    }

    /// Set a single pixel.
    pub fn set(&mut self, p: Point, color: Color) {
        if !self.clip.contains_point(p) {
            return;
        }
        if let Some(i) = self.canvas.index(p) {
            self.canvas.pixels[i] = color;
        }
    }

    /// Read a pixel inside the clip.
    pub fn get(&self, p: Point) -> Option<Color> {
        if !self.clip.contains_point(p) {
            return None;
        }
        self.canvas.get(p)
    }

    /// Fill a rectangle.
    pub fn fill(&mut self, r: Rect, color: Color) {
        let Some(r) = r.intersect(self.clip) else {
            return;
        };
        let w = self.canvas.size.w as usize;
        for y in r.top()..r.bottom() {
            // Clip is within the canvas, so coordinates are non-negative.
            let row = y as usize * w;
            let start = row + r.left() as usize;
            self.canvas.pixels[start..start + r.w as usize].fill(color);
        }
    }

    /// Fill the part of `r` not covered by any of `rocks`. Containers use
    /// this to paint their background around children, which paint
    /// themselves.
    pub fn fill_background(&mut self, r: Rect, rocks: &[Rect], color: Color) {
        for tile in shatter(r, rocks) {
            self.fill(tile, color);
        }
    }

    /// A narrower view sharing the same canvas.
    pub fn sub_view(&mut self, clip: Rect) -> CanvasView<'_> {
        let clip = clip.intersect(self.clip).unwrap_or_default();
        CanvasView {
            canvas: self.canvas,
            clip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::hex("#ff0000");

    #[test]
    fn hex_colors() {
        assert_eq!(RED, Color::rgb(255, 0, 0));
        assert_eq!(Color::hex("#0A0b0C"), Color::rgb(10, 11, 12));
    }

    #[test]
    fn views_clip_drawing() {
        let mut c = Canvas::new(Expanse::new(4, 4));
        {
            let mut v = c.view(Rect::new(1, 1, 10, 2));
            assert_eq!(v.clip(), Rect::new(1, 1, 3, 2));
            v.fill(Rect::new(0, 0, 4, 4), RED);
            v.set(Point::new(0, 0), RED);
            assert_eq!(v.get(Point::new(0, 0)), None);
        }
        let painted = c.pixels().iter().filter(|p| **p == RED).count();
        assert_eq!(painted, 6);
        assert_eq!(c.get(Point::new(0, 0)), Some(Color::TRANSPARENT));
        assert_eq!(c.get(Point::new(3, 2)), Some(RED));
        assert_eq!(c.get(Point::new(4, 0)), None);
        assert_eq!(c.get(Point::new(-1, 0)), None);
    }

    #[test]
    fn background_skips_rocks() {
        let mut c = Canvas::new(Expanse::new(6, 6));
        let mut v = c.view(Rect::new(0, 0, 6, 6));
        v.fill_background(Rect::new(0, 0, 6, 6), &[Rect::new(2, 2, 2, 2)], RED);
        assert_eq!(c.get(Point::new(2, 2)), Some(Color::TRANSPARENT));
        assert_eq!(c.get(Point::new(3, 3)), Some(Color::TRANSPARENT));
        assert_eq!(c.pixels().iter().filter(|p| **p == RED).count(), 32);
    }

    #[test]
    fn sub_views_narrow() {
        let mut c = Canvas::new(Expanse::new(8, 8));
        let mut v = c.view(Rect::new(0, 0, 4, 4));
        let mut s = v.sub_view(Rect::new(2, 2, 10, 10));
        assert_eq!(s.clip(), Rect::new(2, 2, 2, 2));
        s.fill(Rect::new(0, 0, 8, 8), RED);
        assert_eq!(c.pixels().iter().filter(|p| **p == RED).count(), 4);
    }
}
