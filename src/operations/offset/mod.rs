mod bind;
mod self_intersect;
mod wire_offset_2d;

pub use bind::Bind;
pub use self_intersect::FixSelfIntersection;
pub use wire_offset_2d::WireOffset2D;
