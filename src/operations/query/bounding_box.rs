use crate::error::Result;
use crate::math::{Point3, Vector3};
use crate::topology::{Shape, TopologyStore};

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Aabb {
    /// Returns the box grown to contain `point`.
    #[must_use]
    pub fn including(self, point: &Point3) -> Self {
        Self {
            min: self.min.inf(point),
            max: self.max.sup(point),
        }
    }

    /// Returns the extent along each axis.
    #[must_use]
    pub fn size(&self) -> Vector3 {
        self.max - self.min
    }
}

/// Computes the axis-aligned bounding box of a shape.
pub struct BoundingBox<'a> {
    shape: &'a Shape,
}

impl<'a> BoundingBox<'a> {
    /// Creates a new `BoundingBox` query.
    #[must_use]
    pub fn new(shape: &'a Shape) -> Self {
        Self { shape }
    }

    /// Executes the query, returning `None` for a shape without vertices.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced entity is missing.
    pub fn execute(&self, store: &TopologyStore) -> Result<Option<Aabb>> {
        let faces = match self.shape {
            Shape::Solid(solid) => store.solid_faces(*solid)?,
            Shape::Faces(faces) => faces.clone(),
        };

        let mut bbox: Option<Aabb> = None;
        for face in faces {
            for l in store.face_loops(face)? {
                for p in &l {
                    bbox = Some(match bbox {
                        Some(b) => b.including(p),
                        None => Aabb { min: *p, max: *p },
                    });
                }
            }
        }
        Ok(bbox)
    }
}
