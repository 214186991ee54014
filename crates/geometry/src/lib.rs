//! Screen-space geometry shared by every crate in the workspace.
//!
//! All coordinates are whole device pixels relative to the top-left corner of
//! a window's client area. Values are plain `Copy` types: a widget that moves
//! replaces its position and raises its own change notification instead of
//! sharing a mutable point with other widgets.

use std::ops::{Add, AddAssign, Sub};

pub use euclid;

/// Unit tag for window client-area pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ScreenPx;

pub type Point = euclid::Point2D<i32, ScreenPx>;
pub type Extent = euclid::Size2D<i32, ScreenPx>;
pub type Offset = euclid::Vector2D<i32, ScreenPx>;

/// Shorthand for `Point::new`.
#[must_use]
pub fn point(x: i32, y: i32) -> Point {
    Point::new(x, y)
}

/// Shorthand for `Extent::new`.
#[must_use]
pub fn extent(width: i32, height: i32) -> Extent {
    Extent::new(width, height)
}

/// An axis-aligned rectangle, stored as its top-left and bottom-right corners.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rect(euclid::Box2D<i32, ScreenPx>);

impl Rect {
    #[must_use]
    pub fn new(origin: Point, extent: Extent) -> Self {
        Self(euclid::Box2D::from_origin_and_size(origin, extent))
    }

    /// Builds a rectangle from two opposite corners.
    #[must_use]
    pub fn from_corners(top_left: Point, bottom_right: Point) -> Self {
        Self(euclid::Box2D::new(top_left, bottom_right))
    }

    #[must_use]
    pub fn from_ltrb(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self::from_corners(point(left, top), point(right, bottom))
    }

    #[must_use]
    pub fn left(&self) -> i32 {
        self.0.min.x
    }

    #[must_use]
    pub fn top(&self) -> i32 {
        self.0.min.y
    }

    #[must_use]
    pub fn right(&self) -> i32 {
        self.0.max.x
    }

    #[must_use]
    pub fn bottom(&self) -> i32 {
        self.0.max.y
    }

    #[must_use]
    pub fn width(&self) -> i32 {
        self.0.width()
    }

    #[must_use]
    pub fn height(&self) -> i32 {
        self.0.height()
    }

    #[must_use]
    pub fn top_left(&self) -> Point {
        self.0.min
    }

    #[must_use]
    pub fn bottom_right(&self) -> Point {
        self.0.max
    }

    #[must_use]
    pub fn extent(&self) -> Extent {
        self.0.size()
    }

    #[must_use]
    pub fn center(&self) -> Point {
        self.0.center()
    }

    /// Hit test. Both edges are inclusive, so a point on the border counts as
    /// inside.
    #[must_use]
    pub fn contains(&self, at: Point) -> bool {
        at.x >= self.0.min.x && at.x <= self.0.max.x && at.y >= self.0.min.y && at.y <= self.0.max.y
    }

    #[must_use]
    pub fn intersection(&self, rhs: &Rect) -> Option<Rect> {
        self.0.intersection(&rhs.0).map(Rect)
    }

    /// Shrinks the rectangle by `dx` on the left and right and `dy` on the
    /// top and bottom.
    #[must_use]
    pub fn inset(&self, dx: i32, dy: i32) -> Rect {
        Rect::from_ltrb(
            self.left() + dx,
            self.top() + dy,
            self.right() - dx,
            self.bottom() - dy,
        )
    }
}

impl Add<Offset> for Rect {
    type Output = Self;

    fn add(self, rhs: Offset) -> Self::Output {
        Self(self.0.translate(rhs))
    }
}

impl AddAssign<Offset> for Rect {
    fn add_assign(&mut self, rhs: Offset) {
        self.0 = self.0.translate(rhs);
    }
}

impl Sub<Offset> for Rect {
    type Output = Self;

    fn sub(self, rhs: Offset) -> Self::Output {
        Self(self.0.translate(-rhs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_edge_inclusive() {
        let rect = Rect::from_ltrb(100, 100, 300, 150);

        assert!(rect.contains(point(150, 150)));
        assert!(rect.contains(point(100, 100)));
        assert!(rect.contains(point(300, 150)));
        assert!(!rect.contains(point(301, 150)));
        assert!(!rect.contains(point(500, 500)));
        assert!(!rect.contains(point(i32::MIN, i32::MAX)));
    }

    #[test]
    fn origin_and_extent() {
        let rect = Rect::new(point(10, 20), extent(30, 40));

        assert_eq!(rect.top_left(), point(10, 20));
        assert_eq!(rect.bottom_right(), point(40, 60));
        assert_eq!(rect.extent(), extent(30, 40));
        assert_eq!(rect.center(), point(25, 40));
    }

    #[test]
    fn translate_and_inset() {
        let mut rect = Rect::from_ltrb(0, 0, 10, 10);
        rect += Offset::new(5, 5);

        assert_eq!(rect, Rect::from_ltrb(5, 5, 15, 15));
        assert_eq!(rect.inset(2, 1), Rect::from_ltrb(7, 6, 13, 14));
        assert_eq!(rect - Offset::new(5, 5), Rect::from_ltrb(0, 0, 10, 10));
    }

    #[test]
    fn intersection() {
        let a = Rect::from_ltrb(0, 0, 10, 10);
        let b = Rect::from_ltrb(5, 5, 20, 20);

        assert_eq!(a.intersection(&b), Some(Rect::from_ltrb(5, 5, 10, 10)));
        assert_eq!(a.intersection(&Rect::from_ltrb(50, 50, 60, 60)), None);
    }
}
