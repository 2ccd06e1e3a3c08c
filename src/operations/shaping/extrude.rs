use crate::error::{OperationError, Result};
use crate::math::polygon_3d::area_vector;
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::operations::creation::{make_planar_face, MakeSolid};
use crate::topology::{FaceId, ShellData, SolidId, TopologyStore};

/// Extrudes a planar face (holes included) along a direction vector to
/// create a solid.
pub struct Extrude {
    face: FaceId,
    direction: Vector3,
}

impl Extrude {
    /// Creates a new `Extrude` operation.
    #[must_use]
    pub fn new(face: FaceId, direction: Vector3) -> Self {
        Self { face, direction }
    }

    /// Executes the extrusion, creating the solid in the topology store.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if the direction is zero-length
    /// or lies in the plane of the face.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<SolidId> {
        if self.direction.norm() < TOLERANCE {
            return Err(
                OperationError::InvalidInput("extrude direction must be non-zero".into()).into(),
            );
        }

        let mut loops = store.face_loops(self.face)?.into_iter();
        let outer = loops.next().unwrap_or_default();
        let outer_area = area_vector(&outer);
        if outer_area.dot(&self.direction).abs() < TOLERANCE {
            return Err(OperationError::InvalidInput(
                "extrude direction is parallel to the face".into(),
            )
            .into());
        }

        // Outer loop counter-clockwise around the direction, holes clockwise.
        // Side quads built from consecutive loop points then face outward.
        let outer = orient(outer, &self.direction, true);
        let holes: Vec<Vec<Point3>> = loops.map(|h| orient(h, &self.direction, false)).collect();

        let shift = |pts: &[Point3]| -> Vec<Point3> {
            pts.iter().map(|p| p + self.direction).collect()
        };
        let flip = |pts: &[Point3]| -> Vec<Point3> { pts.iter().rev().copied().collect() };

        let mut faces = Vec::new();

        let bottom_holes: Vec<Vec<Point3>> = holes.iter().map(|h| flip(h)).collect();
        faces.push(make_planar_face(store, &flip(&outer), &bottom_holes)?);

        let top_holes: Vec<Vec<Point3>> = holes.iter().map(|h| shift(h)).collect();
        faces.push(make_planar_face(store, &shift(&outer), &top_holes)?);

        for ring in std::iter::once(&outer).chain(holes.iter()) {
            let n = ring.len();
            for i in 0..n {
                let j = (i + 1) % n;
                let quad = [
                    ring[i],
                    ring[j],
                    ring[j] + self.direction,
                    ring[i] + self.direction,
                ];
                faces.push(make_planar_face(store, &quad, &[])?);
            }
        }

        let shell = store.add_shell(ShellData {
            faces,
            is_closed: true,
        });
        MakeSolid::new(shell, vec![]).execute(store)
    }
}

fn orient(mut points: Vec<Point3>, direction: &Vector3, along: bool) -> Vec<Point3> {
    if (area_vector(&points).dot(direction) > 0.0) != along {
        points.reverse();
    }
    points
}
