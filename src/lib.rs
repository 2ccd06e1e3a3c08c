pub mod document;
pub mod error;
pub mod geometry;
pub mod kernel;
pub mod math;
pub mod operations;
pub mod topology;
pub mod wall;

pub use document::{Document, ObjectId};
pub use error::{Result, WallError, WallcraftError};
pub use kernel::{GeometryKernel, PolyKernel};
pub use wall::{Alignment, WallConfig, WallParams};
