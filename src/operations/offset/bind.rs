use crate::error::{OperationError, Result};
use crate::geometry::{Pline, Region2D};
use crate::math::polygon_2d::signed_area_2d;

/// Default chord tolerance used when flattening arc segments.
const DEFAULT_ARC_TOLERANCE: f64 = 0.01;

/// Joins two side curves of a wall into one planar region.
///
/// - Two open polylines are stitched end to end: `a`, then `b` walked
///   backwards, closing the gaps with straight caps.
/// - Two closed polylines become a ring: the one enclosing more area is the
///   outer loop, the other its hole.
#[derive(Debug)]
pub struct Bind {
    a: Pline,
    b: Pline,
    arc_tolerance: f64,
}

impl Bind {
    /// Creates a new `Bind` operation.
    #[must_use]
    pub fn new(a: Pline, b: Pline) -> Self {
        Self {
            a,
            b,
            arc_tolerance: DEFAULT_ARC_TOLERANCE,
        }
    }

    /// Sets the chord tolerance used to flatten arcs.
    #[must_use]
    pub fn with_arc_tolerance(mut self, tolerance: f64) -> Self {
        self.arc_tolerance = tolerance;
        self
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` if one curve is open and the
    /// other closed, or if a curve has fewer than two points.
    pub fn execute(&self) -> Result<Region2D> {
        let a = self.a.to_points(self.arc_tolerance);
        let b = self.b.to_points(self.arc_tolerance);
        if a.len() < 2 || b.len() < 2 {
            return Err(
                OperationError::InvalidInput("bind needs two curves of two points".into()).into(),
            );
        }

        match (self.a.closed, self.b.closed) {
            (false, false) => {
                let mut outline = a;
                outline.extend(b.into_iter().rev());
                Ok(Region2D::new(outline, Vec::new()))
            }
            (true, true) => {
                let (outer, hole) = if signed_area_2d(&a).abs() >= signed_area_2d(&b).abs() {
                    (a, b)
                } else {
                    (b, a)
                };
                Ok(Region2D::new(outer, vec![hole]))
            }
            _ => Err(OperationError::InvalidInput(
                "cannot bind an open curve to a closed one".into(),
            )
            .into()),
        }
    }
}
