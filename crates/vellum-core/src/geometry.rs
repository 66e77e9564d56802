use serde::{Deserialize, Serialize};

/// A point in surface pixel space (y-down).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Build from left/top/right/bottom, the layout engines use for box queries.
    pub fn from_ltrb(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            x: left,
            y: top,
            w: right - left,
            h: bottom - top,
        }
    }

    /// Rect of `size` centered on `center`.
    pub fn centered(center: Point, size: Size) -> Self {
        Self {
            x: center.x - size.width / 2.0,
            y: center.y - size.height / 2.0,
            w: size.width,
            h: size.height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }

    pub fn is_empty(&self) -> bool {
        !(self.w > 0.0 && self.h > 0.0)
    }

    /// Inclusive on all edges.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Grow by `d` on every side.
    pub fn inflate(&self, d: f32) -> Self {
        Self::from_ltrb(self.x - d, self.y - d, self.right() + d, self.bottom() + d)
    }

    /// Overlap of two rects, empty when they are disjoint.
    pub fn intersect(&self, other: &Rect) -> Self {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= left || bottom <= top {
            return Self::default();
        }
        Self::from_ltrb(left, top, right, bottom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect() {
        let r = Rect::centered(Point::new(50.0, 40.0), Size::new(20.0, 10.0));
        assert_eq!(r, Rect::new(40.0, 35.0, 20.0, 10.0));
        assert_eq!(r.center(), Point::new(50.0, 40.0));
    }

    #[test]
    fn test_contains_is_edge_inclusive() {
        let r = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert!(r.contains(Point::new(0.0, 0.0)));
        assert!(r.contains(Point::new(100.0, 50.0)));
        assert!(!r.contains(Point::new(100.5, 10.0)));
        assert!(!r.contains(Point::new(-0.1, 10.0)));
    }

    #[test]
    fn test_from_ltrb() {
        let r = Rect::from_ltrb(10.0, 20.0, 30.0, 60.0);
        assert_eq!(r, Rect::new(10.0, 20.0, 20.0, 40.0));
        assert!(!r.is_empty());
        assert!(Rect::from_ltrb(5.0, 5.0, 5.0, 9.0).is_empty());
    }

    #[test]
    fn test_inflate_then_clip_to_bounds() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 50.0);
        let grown = Rect::new(5.0, 10.0, 20.0, 20.0).inflate(8.0);
        assert_eq!(grown, Rect::new(-3.0, 2.0, 36.0, 36.0));
        assert_eq!(grown.intersect(&bounds), Rect::from_ltrb(0.0, 2.0, 33.0, 38.0));
        assert!(Rect::new(200.0, 0.0, 5.0, 5.0).intersect(&bounds).is_empty());
    }
}
