use crate::error::{Result, TopologyError};
use crate::geometry::Plane;
use crate::math::polygon_3d::newell_normal;
use crate::math::Point3;
use crate::topology::{FaceData, FaceId, TopologyStore, WireId};

use super::MakeWire;

/// Creates a planar face from a closed outer wire and optional holes.
///
/// The plane normal follows the winding of the outer wire.
pub struct MakeFace {
    outer_wire: WireId,
    inner_wires: Vec<WireId>,
}

impl MakeFace {
    /// Creates a new `MakeFace` operation.
    #[must_use]
    pub fn new(outer_wire: WireId, inner_wires: Vec<WireId>) -> Self {
        Self {
            outer_wire,
            inner_wires,
        }
    }

    /// Executes the operation, creating the face in the topology store.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::WireNotClosed` if a boundary wire is open and
    /// `GeometryError::Degenerate` if the outer wire encloses no area.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<FaceId> {
        if !store.wire(self.outer_wire)?.is_closed {
            return Err(TopologyError::WireNotClosed.into());
        }
        for &inner in &self.inner_wires {
            if !store.wire(inner)?.is_closed {
                return Err(TopologyError::WireNotClosed.into());
            }
        }

        let outer = store.wire_points(self.outer_wire)?;
        let normal = newell_normal(&outer)?;
        let plane = Plane::from_normal(outer[0], normal)?;

        Ok(store.add_face(FaceData {
            plane,
            outer_wire: self.outer_wire,
            inner_wires: self.inner_wires.clone(),
            same_sense: true,
        }))
    }
}

/// Creates a planar face from point loops using `MakeWire` + `MakeFace`.
///
/// # Errors
///
/// Returns an error if any loop is too short or the outer loop is degenerate.
pub fn make_planar_face(
    store: &mut TopologyStore,
    outer: &[Point3],
    holes: &[Vec<Point3>],
) -> Result<FaceId> {
    let outer_wire = MakeWire::new(outer.to_vec(), true).execute(store)?;
    let mut inner_wires = Vec::with_capacity(holes.len());
    for hole in holes {
        inner_wires.push(MakeWire::new(hole.clone(), true).execute(store)?);
    }
    MakeFace::new(outer_wire, inner_wires).execute(store)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point3 {
        Point3::new(x, y, 0.0)
    }

    #[test]
    fn ccw_square_faces_up() {
        let mut store = TopologyStore::new();
        let face = make_planar_face(
            &mut store,
            &[p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)],
            &[],
        )
        .unwrap();
        let data = store.face(face).unwrap();
        assert!((data.plane.normal().z - 1.0).abs() < 1e-12);
        assert!(data.same_sense);
    }

    #[test]
    fn open_wire_cannot_bound_a_face() {
        let mut store = TopologyStore::new();
        let wire = MakeWire::new(vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0)], false)
            .execute(&mut store)
            .unwrap();
        assert!(MakeFace::new(wire, vec![]).execute(&mut store).is_err());
    }

    #[test]
    fn collinear_loop_is_degenerate() {
        let mut store = TopologyStore::new();
        assert!(make_planar_face(&mut store, &[p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0)], &[]).is_err());
    }

    #[test]
    fn holes_are_kept() {
        let mut store = TopologyStore::new();
        let face = make_planar_face(
            &mut store,
            &[p(0.0, 0.0), p(4.0, 0.0), p(4.0, 4.0), p(0.0, 4.0)],
            &[vec![p(1.0, 1.0), p(1.0, 3.0), p(3.0, 3.0), p(3.0, 1.0)]],
        )
        .unwrap();
        assert_eq!(store.face_loops(face).unwrap().len(), 2);
    }
}
