use serde::{Deserialize, Serialize};

/// A pointer position in host coordinates (CSS pixels, terminal cells, ...)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }

    /// Euclidean distance to another point
    #[must_use]
    pub fn distance(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Point { x, y }
    }
}

/// Axis-aligned bounding box of a drop target
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Half-open containment: the right and bottom edges belong to the
    /// neighbouring rectangle.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        !self.is_empty()
            && p.x >= self.x
            && p.x < self.x + self.width
            && p.y >= self.y
            && p.y < self.y + self.height
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Top-left, top-right, bottom-left, bottom-right
    #[must_use]
    pub fn corners(&self) -> [Point; 4] {
        let right = self.x + self.width;
        let bottom = self.y + self.height;
        [
            Point::new(self.x, self.y),
            Point::new(right, self.y),
            Point::new(self.x, bottom),
            Point::new(right, bottom),
        ]
    }

    /// Mean distance from `p` to the four corners. Smaller, tighter targets
    /// around the pointer score lower than large enclosing ones.
    #[must_use]
    pub fn corner_distance(&self, p: Point) -> f32 {
        self.corners().iter().map(|c| c.distance(p)).sum::<f32>() / 4.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_distance() {
        assert_eq!(Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)), 5.0);
        assert_eq!(Point::new(2.0, 2.0).distance(Point::new(2.0, 2.0)), 0.0);
    }

    #[test]
    fn contains_is_half_open() {
        let r = Rect::new(10.0, 10.0, 5.0, 5.0);
        assert!(r.contains(Point::new(10.0, 10.0)));
        assert!(r.contains(Point::new(14.9, 14.9)));
        assert!(!r.contains(Point::new(15.0, 12.0)));
        assert!(!r.contains(Point::new(12.0, 15.0)));
        assert!(!r.contains(Point::new(9.9, 12.0)));
    }

    #[test]
    fn empty_rect_contains_nothing() {
        let r = Rect::new(0.0, 0.0, 0.0, 10.0);
        assert!(r.is_empty());
        assert!(!r.contains(Point::new(0.0, 0.0)));
    }

    #[test]
    fn center_and_corners() {
        let r = Rect::new(0.0, 0.0, 4.0, 2.0);
        assert_eq!(r.center(), Point::new(2.0, 1.0));
        assert_eq!(r.corners()[3], Point::new(4.0, 2.0));
    }

    #[test]
    fn corner_distance_prefers_tighter_rect() {
        let p = Point::new(5.0, 5.0);
        let big = Rect::new(0.0, 0.0, 100.0, 100.0);
        let small = Rect::new(4.0, 4.0, 2.0, 2.0);
        assert!(small.corner_distance(p) < big.corner_distance(p));
    }
}
