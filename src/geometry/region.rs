use crate::math::polygon_2d::signed_area_2d;
use crate::math::Point3;

use super::Plane;

/// A planar profile in local 2D coordinates (z = 0): one outer loop and
/// any number of holes.
///
/// Outer loops run counter-clockwise and holes clockwise, so the signed
/// area of all loops sums to the covered area.
#[derive(Debug, Clone, PartialEq)]
pub struct Region2D {
    pub outer: Vec<Point3>,
    pub holes: Vec<Vec<Point3>>,
}

impl Region2D {
    /// Creates a region, reorienting loops to the outer-CCW/holes-CW convention.
    #[must_use]
    pub fn new(outer: Vec<Point3>, holes: Vec<Vec<Point3>>) -> Self {
        let outer = oriented(outer, true);
        let holes = holes.into_iter().map(|h| oriented(h, false)).collect();
        Self { outer, holes }
    }

    /// Net enclosed area (outer minus holes).
    #[must_use]
    pub fn area(&self) -> f64 {
        signed_area_2d(&self.outer) + self.holes.iter().map(|h| signed_area_2d(h)).sum::<f64>()
    }

    /// Maps every loop onto `plane` in world space.
    #[must_use]
    pub fn to_world(&self, plane: &Plane) -> (Vec<Point3>, Vec<Vec<Point3>>) {
        let map = |pts: &[Point3]| pts.iter().map(|p| plane.to_world(p)).collect::<Vec<_>>();
        (map(&self.outer), self.holes.iter().map(|h| map(h)).collect())
    }
}

fn oriented(mut points: Vec<Point3>, ccw: bool) -> Vec<Point3> {
    if (signed_area_2d(&points) > 0.0) != ccw {
        points.reverse();
    }
    points
}
