use super::face::FaceId;
use super::solid::SolidId;

/// The result of building a wall: either a solid or, when the wall is
/// flat, the planar faces that would have been extruded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// A closed 3D body.
    Solid(SolidId),
    /// One or more planar faces with no volume.
    Faces(Vec<FaceId>),
}

impl Shape {
    /// Returns the solid if this shape has volume.
    #[must_use]
    pub fn as_solid(&self) -> Option<SolidId> {
        match self {
            Self::Solid(id) => Some(*id),
            Self::Faces(_) => None,
        }
    }

    /// Returns `true` if this shape is planar only.
    #[must_use]
    pub fn is_flat(&self) -> bool {
        matches!(self, Self::Faces(_))
    }
}
