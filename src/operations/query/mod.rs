mod area;
mod bounding_box;
mod volume;

pub use area::{Area, FaceArea};
pub use bounding_box::{Aabb, BoundingBox};
pub use volume::{SignedVolume, Volume};
