use crate::error::Result;
use crate::topology::{SolidId, TopologyStore};

use super::engine::{boolean_execute, BooleanOp};

/// Computes the boolean union of two solids.
pub struct Union {
    solid_a: SolidId,
    solid_b: SolidId,
}

impl Union {
    /// Creates a new `Union` operation.
    #[must_use]
    pub fn new(solid_a: SolidId, solid_b: SolidId) -> Self {
        Self { solid_a, solid_b }
    }

    /// Executes the union, creating the result solid in the topology store.
    ///
    /// # Errors
    ///
    /// Returns an error if a solid is missing or the result has no faces.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<SolidId> {
        boolean_execute(store, self.solid_a, self.solid_b, BooleanOp::Union)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::operations::creation::MakeBox;
    use crate::operations::modification::RemoveSplitter;
    use crate::operations::query::SignedVolume;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn overlapping_boxes() {
        let mut store = TopologyStore::new();
        let a = MakeBox::new(p(0.0, 0.0, 0.0), p(2.0, 2.0, 2.0)).execute(&mut store).unwrap();
        let b = MakeBox::new(p(1.0, 1.0, 1.0), p(3.0, 3.0, 3.0)).execute(&mut store).unwrap();
        let u = Union::new(a, b).execute(&mut store).unwrap();
        assert_relative_eq!(SignedVolume::new(u).execute(&store).unwrap(), 15.0, epsilon = 1e-9);
    }

    #[test]
    fn disjoint_boxes_keep_both_lumps() {
        let mut store = TopologyStore::new();
        let a = MakeBox::new(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0)).execute(&mut store).unwrap();
        let b = MakeBox::new(p(5.0, 0.0, 0.0), p(6.0, 1.0, 1.0)).execute(&mut store).unwrap();
        let u = Union::new(a, b).execute(&mut store).unwrap();
        assert_eq!(store.solid_faces(u).unwrap().len(), 12);
        assert_relative_eq!(SignedVolume::new(u).execute(&store).unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn touching_boxes_fuse_into_one_box() {
        let mut store = TopologyStore::new();
        let a = MakeBox::new(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0)).execute(&mut store).unwrap();
        let b = MakeBox::new(p(1.0, 0.0, 0.0), p(3.0, 1.0, 1.0)).execute(&mut store).unwrap();
        let u = Union::new(a, b).execute(&mut store).unwrap();
        let clean = RemoveSplitter::new(u).execute(&mut store).unwrap();
        assert_relative_eq!(SignedVolume::new(clean).execute(&store).unwrap(), 3.0, epsilon = 1e-9);
        assert_eq!(store.solid_faces(clean).unwrap().len(), 6);
    }
}
