pub mod plane;
pub mod pline;
pub mod region;

pub use plane::Plane;
pub use pline::{Pline, PlineVertex};
pub use region::Region2D;
