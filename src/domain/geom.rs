/// Continuous geometry in tile units.
///
/// A tile at integer coordinate (x, y) occupies the unit cell centered on
/// that coordinate. +y is "up" (the renderer flips it for the terminal).

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }

    pub fn distance(self, other: Vec2) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Axis-aligned rectangle: `(x, y)` is the bottom-left corner.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    /// Rectangle of size `(w, h)` centered on `c`.
    pub fn centered(c: Vec2, w: f32, h: f32) -> Self {
        Rect { x: c.x - w / 2.0, y: c.y - h / 2.0, w, h }
    }

    /// The unit cell of the tile at `(tx, ty)`.
    pub fn tile(tx: i32, ty: i32) -> Self {
        Rect::centered(Vec2::new(tx as f32, ty as f32), 1.0, 1.0)
    }

    pub fn left(&self) -> f32 { self.x }
    pub fn right(&self) -> f32 { self.x + self.w }
    pub fn bottom(&self) -> f32 { self.y }
    pub fn top(&self) -> f32 { self.y + self.h }

    /// Strict overlap: touching edges do not count.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.bottom() < other.top()
            && other.bottom() < self.top()
    }
}
