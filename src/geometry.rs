//! Integer board geometry: points, bounding boxes and track segments.
//!
//! All coordinates share one fixed internal unit; nothing here converts units.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// A point on the board.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    #[inline]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Sum of the absolute axis differences.
    #[inline]
    pub fn manhattan_distance(&self, other: Point) -> i64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Euclidean distance.
    #[inline]
    pub fn distance(&self, other: Point) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }

    #[inline]
    pub fn snap_to_grid(self, grid_size: i64) -> Point {
        snap_to_grid(self, grid_size)
    }
}

impl Add for Point {
    type Output = Point;

    #[inline]
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Snap a point onto the grid. Each axis is divided and re-multiplied by
/// `grid_size`, so the result truncates toward zero.
#[inline]
pub fn snap_to_grid(p: Point, grid_size: i64) -> Point {
    Point::new((p.x / grid_size) * grid_size, (p.y / grid_size) * grid_size)
}

/// An axis-aligned, closed bounding box.
///
/// Callers are responsible for `min.x <= max.x` and `min.y <= max.y`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl BoundingBox {
    #[inline]
    pub const fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Returns `true` if `p` lies inside the box, edges included.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        self.min.x <= p.x && p.x <= self.max.x && self.min.y <= p.y && p.y <= self.max.y
    }

    /// Returns `true` if `min <= max` on both axes.
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y
    }

    pub fn width(&self) -> i64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> i64 {
        self.max.y - self.min.y
    }
}

/// A straight copper segment. The width only matters to whoever writes the
/// routed geometry out; the search never reads it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
    pub width: i64,
}

impl Segment {
    #[inline]
    pub const fn new(start: Point, end: Point, width: i64) -> Self {
        Self { start, end, width }
    }

    /// Euclidean length between the endpoints.
    #[inline]
    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_inclusive_on_every_edge() {
        let bbox = BoundingBox::new(Point::new(-10, 0), Point::new(10, 20));
        assert!(bbox.contains(Point::new(-10, 0)));
        assert!(bbox.contains(Point::new(10, 20)));
        assert!(bbox.contains(Point::new(-10, 20)));
        assert!(bbox.contains(Point::new(0, 5)));
        assert!(!bbox.contains(Point::new(-11, 5)));
        assert!(!bbox.contains(Point::new(11, 5)));
        assert!(!bbox.contains(Point::new(0, -1)));
        assert!(!bbox.contains(Point::new(0, 21)));
    }

    #[test]
    fn degenerate_box_contains_only_its_point() {
        let p = Point::new(3, 4);
        let bbox = BoundingBox::new(p, p);
        assert!(bbox.contains(p));
        assert!(!bbox.contains(Point::new(3, 5)));
        assert_eq!(bbox.width(), 0);
        assert_eq!(bbox.height(), 0);
    }

    #[test]
    fn snap_truncates_toward_zero() {
        assert_eq!(snap_to_grid(Point::new(13, 27), 10), Point::new(10, 20));
        assert_eq!(snap_to_grid(Point::new(-13, -27), 10), Point::new(-10, -20));
        assert_eq!(Point::new(100, 200).snap_to_grid(100), Point::new(100, 200));
    }

    #[test]
    fn segment_length_is_euclidean() {
        let seg = Segment::new(Point::new(0, 0), Point::new(3, 4), 250_000);
        assert_eq!(seg.length(), 5.0);
    }

    #[test]
    fn manhattan_distance_sums_axes() {
        assert_eq!(Point::new(1, 2).manhattan_distance(Point::new(4, 6)), 7);
        assert_eq!(Point::new(4, 6).manhattan_distance(Point::new(1, 2)), 7);
    }

    #[test]
    fn points_add_componentwise() {
        assert_eq!(Point::new(1, -2) + Point::new(10, 20), Point::new(11, 18));
    }
}
