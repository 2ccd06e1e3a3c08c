use crate::error::{OperationError, Result};
use crate::math::{Point3, TOLERANCE};
use crate::topology::{ShellData, SolidId, TopologyStore};

use super::{make_planar_face, MakeSolid};

/// Creates an axis-aligned box solid from two corner points.
///
/// Typically used for openings subtracted from walls.
pub struct MakeBox {
    min_corner: Point3,
    max_corner: Point3,
}

impl MakeBox {
    /// Creates a new `MakeBox` operation.
    #[must_use]
    pub fn new(min_corner: Point3, max_corner: Point3) -> Self {
        Self {
            min_corner,
            max_corner,
        }
    }

    /// Executes the operation, creating the box in the topology store.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` if any extent is not positive.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<SolidId> {
        let (a, b) = (self.min_corner, self.max_corner);
        if b.x - a.x < TOLERANCE || b.y - a.y < TOLERANCE || b.z - a.z < TOLERANCE {
            return Err(OperationError::InvalidInput(
                "box extents must be positive on every axis".into(),
            )
            .into());
        }

        let c = |x: f64, y: f64, z: f64| Point3::new(x, y, z);
        // Each loop is counter-clockwise seen from outside.
        let loops = [
            [c(a.x, a.y, a.z), c(a.x, b.y, a.z), c(b.x, b.y, a.z), c(b.x, a.y, a.z)],
            [c(a.x, a.y, b.z), c(b.x, a.y, b.z), c(b.x, b.y, b.z), c(a.x, b.y, b.z)],
            [c(a.x, a.y, a.z), c(b.x, a.y, a.z), c(b.x, a.y, b.z), c(a.x, a.y, b.z)],
            [c(a.x, b.y, a.z), c(a.x, b.y, b.z), c(b.x, b.y, b.z), c(b.x, b.y, a.z)],
            [c(a.x, a.y, a.z), c(a.x, a.y, b.z), c(a.x, b.y, b.z), c(a.x, b.y, a.z)],
            [c(b.x, a.y, a.z), c(b.x, b.y, a.z), c(b.x, b.y, b.z), c(b.x, a.y, b.z)],
        ];

        let mut faces = Vec::with_capacity(6);
        for quad in &loops {
            faces.push(make_planar_face(store, quad, &[])?);
        }

        let shell = store.add_shell(ShellData {
            faces,
            is_closed: true,
        });
        MakeSolid::new(shell, vec![]).execute(store)
    }
}
