use crate::error::Result;
use crate::math::polygon_3d::area_vector;
use crate::topology::{FaceId, SolidId, TopologyStore};

/// Computes the net area of a planar face (holes subtracted).
pub struct FaceArea {
    face: FaceId,
}

impl FaceArea {
    /// Creates a new `FaceArea` query.
    #[must_use]
    pub fn new(face: FaceId) -> Self {
        Self { face }
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns an error if the face or its wires are missing.
    pub fn execute(&self, store: &TopologyStore) -> Result<f64> {
        let loops = store.face_loops(self.face)?;
        let mut iter = loops.iter();
        let Some(outer) = iter.next() else {
            return Ok(0.0);
        };
        let outer = area_vector(outer);
        let normal = outer.try_normalize(f64::EPSILON).unwrap_or_default();
        let holes: f64 = iter.map(|h| area_vector(h).dot(&normal).abs()).sum();
        Ok(outer.norm() - holes)
    }
}

/// Computes the total surface area of a solid.
pub struct Area {
    solid: SolidId,
}

impl Area {
    /// Creates a new `Area` query.
    #[must_use]
    pub fn new(solid: SolidId) -> Self {
        Self { solid }
    }

    /// Executes the query, returning the total surface area.
    ///
    /// # Errors
    ///
    /// Returns an error if the solid or one of its faces is missing.
    pub fn execute(&self, store: &TopologyStore) -> Result<f64> {
        let mut total = 0.0;
        for face in store.solid_faces(self.solid)? {
            total += FaceArea::new(face).execute(store)?;
        }
        Ok(total)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::operations::creation::{make_planar_face, MakeBox};
    use approx::assert_relative_eq;

    #[test]
    fn box_surface_area() {
        let mut store = TopologyStore::new();
        let solid = MakeBox::new(Point3::origin(), Point3::new(10.0, 2.0, 3.0))
            .execute(&mut store)
            .unwrap();
        let a = Area::new(solid).execute(&store).unwrap();
        assert_relative_eq!(a, 2.0 * (20.0 + 30.0 + 6.0), epsilon = 1e-9);
    }

    #[test]
    fn hole_area_is_removed() {
        let mut store = TopologyStore::new();
        let sq = |lo: f64, hi: f64| {
            vec![
                Point3::new(lo, lo, 0.0),
                Point3::new(hi, lo, 0.0),
                Point3::new(hi, hi, 0.0),
                Point3::new(lo, hi, 0.0),
            ]
        };
        let face = make_planar_face(&mut store, &sq(0.0, 4.0), &[sq(1.0, 2.0)]).unwrap();
        assert_relative_eq!(FaceArea::new(face).execute(&store).unwrap(), 15.0, epsilon = 1e-12);
    }
}
