use crate::error::Result;
use crate::math::polygon_3d::area_vector;
use crate::math::Vector3;
use crate::topology::{SolidId, TopologyStore};

/// Computes the signed volume of a solid.
///
/// Each face contributes `(1/3) * p · A`, where `p` is any point on the
/// face and `A` the Newell area vector of its loops. The result is positive
/// when the faces wind counter-clockwise seen from outside and negative for
/// an inside-out solid, which is how orientation faults are detected.
pub struct SignedVolume {
    solid: SolidId,
}

impl SignedVolume {
    /// Creates a new `SignedVolume` query.
    #[must_use]
    pub fn new(solid: SolidId) -> Self {
        Self { solid }
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns an error if the solid or one of its entities is missing.
    pub fn execute(&self, store: &TopologyStore) -> Result<f64> {
        let mut total = 0.0;
        for face in store.solid_faces(self.solid)? {
            let loops = store.face_loops(face)?;
            let Some(anchor) = loops.first().and_then(|l| l.first()).copied() else {
                continue;
            };
            let area = loops
                .iter()
                .fold(Vector3::zeros(), |acc, l| acc + area_vector(l));
            total += anchor.coords.dot(&area);
        }
        Ok(total / 3.0)
    }
}

/// Computes the enclosed volume of a solid regardless of orientation.
pub struct Volume {
    solid: SolidId,
}

impl Volume {
    /// Creates a new `Volume` query.
    #[must_use]
    pub fn new(solid: SolidId) -> Self {
        Self { solid }
    }

    /// Executes the query, returning the absolute volume.
    ///
    /// # Errors
    ///
    /// Returns an error if the solid or one of its entities is missing.
    pub fn execute(&self, store: &TopologyStore) -> Result<f64> {
        Ok(SignedVolume::new(self.solid).execute(store)?.abs())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::operations::creation::MakeBox;
    use crate::operations::modification::Reverse;
    use approx::assert_relative_eq;

    #[test]
    fn box_volume() {
        let mut store = TopologyStore::new();
        let solid = MakeBox::new(Point3::new(1.0, 1.0, 1.0), Point3::new(11.0, 3.0, 4.0))
            .execute(&mut store)
            .unwrap();
        let v = SignedVolume::new(solid).execute(&store).unwrap();
        assert_relative_eq!(v, 60.0, epsilon = 1e-9);
    }

    #[test]
    fn reversed_box_is_negative() {
        let mut store = TopologyStore::new();
        let solid = MakeBox::new(Point3::origin(), Point3::new(2.0, 2.0, 2.0))
            .execute(&mut store)
            .unwrap();
        let flipped = Reverse::new(solid).execute(&mut store).unwrap();
        let v = SignedVolume::new(flipped).execute(&store).unwrap();
        assert_relative_eq!(v, -8.0, epsilon = 1e-9);
        assert_relative_eq!(Volume::new(flipped).execute(&store).unwrap(), 8.0, epsilon = 1e-9);
    }
}
