//! Axis-aligned rectangle math for conversation areas.
//!
//! Boxes are described by their center and extents, the way clients draw
//! them on the map. Every comparison here is strict: two boxes that only
//! share an edge or a corner do not overlap, and a point on the border of
//! a box is not inside it.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle given by its center point and its size.
///
/// `x`/`y` are the center, not the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Horizontal center.
    pub x: f64,
    /// Vertical center.
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// The min/max corners of a box on each axis.
#[derive(Debug, Clone, Copy)]
struct Corners {
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
}

impl BoundingBox {
    /// Creates a box centered on `(x, y)`.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    fn corners(&self) -> Corners {
        let half_w = self.width / 2.0;
        let half_h = self.height / 2.0;
        Corners {
            x1: self.x - half_w,
            x2: self.x + half_w,
            y1: self.y - half_h,
            y2: self.y + half_h,
        }
    }

    /// Returns `true` if `(x, y)` lies strictly inside this box.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let c = self.corners();
        x > c.x1 && x < c.x2 && y > c.y1 && y < c.y2
    }

    /// Returns `true` if this box shares interior area with `other`.
    ///
    /// See [`boxes_overlap`].
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        boxes_overlap(self, other)
    }
}

/// Detects whether two boxes share any interior point.
///
/// The projections of both boxes must intersect on *both* axes with strict
/// inequality. Touching edges or corners is not overlap. The test is
/// symmetric in its arguments.
pub fn boxes_overlap(a: &BoundingBox, b: &BoundingBox) -> bool {
    let a = a.corners();
    let b = b.corners();
    let apart = a.x1 >= b.x2 || b.x1 >= a.x2 || a.y1 >= b.y2 || b.y1 >= a.y2;
    !apart
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bb(x: f64, y: f64, w: f64, h: f64) -> BoundingBox {
        BoundingBox::new(x, y, w, h)
    }

    #[test]
    fn test_boxes_overlap_intersecting_ranges_returns_true() {
        // [5,15]x[5,15] against [10,20]x[10,20]
        let a = bb(10.0, 10.0, 10.0, 10.0);
        let b = bb(15.0, 15.0, 10.0, 10.0);
        assert!(boxes_overlap(&a, &b));
    }

    #[test]
    fn test_boxes_overlap_far_apart_returns_false() {
        let a = bb(10.0, 10.0, 5.0, 5.0);
        let b = bb(50.0, 50.0, 5.0, 5.0);
        assert!(!boxes_overlap(&a, &b));
    }

    #[test]
    fn test_boxes_overlap_shared_edge_returns_false() {
        // [5,15] and [15,25] on x, same y range.
        let a = bb(10.0, 10.0, 10.0, 10.0);
        let b = bb(20.0, 10.0, 10.0, 10.0);
        assert!(!boxes_overlap(&a, &b));
    }

    #[test]
    fn test_boxes_overlap_shared_corner_returns_false() {
        let a = bb(10.0, 10.0, 10.0, 10.0);
        let b = bb(20.0, 20.0, 10.0, 10.0);
        assert!(!boxes_overlap(&a, &b));
    }

    #[test]
    fn test_boxes_overlap_one_axis_only_returns_false() {
        // x ranges intersect, y ranges do not.
        let a = bb(10.0, 10.0, 10.0, 10.0);
        let b = bb(12.0, 40.0, 10.0, 10.0);
        assert!(!boxes_overlap(&a, &b));
    }

    #[test]
    fn test_boxes_overlap_nested_box_returns_true() {
        let outer = bb(50.0, 50.0, 40.0, 40.0);
        let inner = bb(50.0, 50.0, 2.0, 2.0);
        assert!(boxes_overlap(&outer, &inner));
        assert!(outer.overlaps(&inner));
    }

    #[test]
    fn test_boxes_overlap_identical_boxes_returns_true() {
        let a = bb(3.0, 3.0, 2.0, 2.0);
        assert!(boxes_overlap(&a, &a));
    }

    #[test]
    fn test_boxes_overlap_is_symmetric() {
        let probes = [
            bb(0.0, 0.0, 10.0, 10.0),
            bb(5.0, 5.0, 10.0, 10.0),
            bb(10.0, 0.0, 10.0, 10.0),
            bb(10.0, 10.0, 10.0, 10.0),
            bb(-3.0, 2.0, 1.0, 20.0),
            bb(0.0, 0.0, 0.0, 0.0),
            bb(100.0, 100.0, 4.0, 4.0),
        ];
        for a in &probes {
            for b in &probes {
                assert_eq!(
                    boxes_overlap(a, b),
                    boxes_overlap(b, a),
                    "asymmetric result for {a:?} / {b:?}"
                );
            }
        }
    }

    #[test]
    fn test_contains_center_point_returns_true() {
        let area = bb(10.0, 10.0, 5.0, 5.0);
        assert!(area.contains(10.0, 10.0));
    }

    #[test]
    fn test_contains_border_point_returns_false() {
        // x1 = 7.5
        let area = bb(10.0, 10.0, 5.0, 5.0);
        assert!(!area.contains(7.5, 10.0));
        assert!(!area.contains(10.0, 12.5));
    }

    #[test]
    fn test_contains_outside_point_returns_false() {
        let area = bb(10.0, 10.0, 5.0, 5.0);
        assert!(!area.contains(0.0, 0.0));
    }
}
