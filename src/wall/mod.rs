//! Parametric wall construction: parameters, base shape classification,
//! the build pipeline and wall merging.

mod base_curve;
mod builder;
mod classify;
mod merge;
mod params;

pub use base_curve::BaseCurve;
pub use builder::WallBuilder;
pub use classify::{classify, BaseShape, ShapeClass};
pub use merge::{are_same_wall_types, merge_curves};
pub use params::{Alignment, WallConfig, WallParams};
