//! The geometry kernel seam used by the wall pipeline.
//!
//! The wall builder never calls the operations directly; it goes through a
//! [`GeometryKernel`] so that a different kernel (or a test double) can be
//! plugged in. [`PolyKernel`] is the built-in polyhedral implementation.

use crate::error::Result;
use crate::geometry::{Pline, Region2D};
use crate::math::Vector3;
use crate::operations::boolean::{Subtract, Union};
use crate::operations::modification::{RemoveSplitter, Reverse};
use crate::operations::offset::{Bind, FixSelfIntersection, WireOffset2D};
use crate::operations::query::SignedVolume;
use crate::operations::shaping::Extrude;
use crate::topology::{FaceId, SolidId, TopologyStore};

/// Geometric operations the wall pipeline needs from a kernel.
///
/// 2D operations work in the local frame of the wall's base plane; 3D
/// operations create new entities in the store and never modify their
/// inputs.
pub trait GeometryKernel {
    /// Offsets a planar polyline sideways; positive distances go left.
    ///
    /// # Errors
    ///
    /// Returns an error if the polyline is degenerate.
    fn offset_wire(&self, pline: &Pline, distance: f64) -> Result<Pline>;

    /// Joins two side curves into one planar region.
    ///
    /// # Errors
    ///
    /// Returns an error if the curves cannot be joined.
    fn bind(&self, a: &Pline, b: &Pline) -> Result<Region2D>;

    /// Splits self-crossing loops and drops lobes smaller than `tolerance²`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tolerance is invalid.
    fn fix_self_intersections(&self, region: &Region2D, tolerance: f64) -> Result<Vec<Region2D>>;

    /// Sweeps a planar face along `direction`.
    ///
    /// # Errors
    ///
    /// Returns an error if the face is missing or the direction is invalid.
    fn extrude(&self, store: &mut TopologyStore, face: FaceId, direction: Vector3)
        -> Result<SolidId>;

    /// Boolean union `a ∪ b`.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    fn fuse(&self, store: &mut TopologyStore, a: SolidId, b: SolidId) -> Result<SolidId>;

    /// Boolean difference `a − b`.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    fn cut(&self, store: &mut TopologyStore, a: SolidId, b: SolidId) -> Result<SolidId>;

    /// Volume of a solid, negative when it is inside out.
    ///
    /// # Errors
    ///
    /// Returns an error if the solid is missing.
    fn signed_volume(&self, store: &TopologyStore, solid: SolidId) -> Result<f64>;

    /// Returns the solid with every face flipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the solid is missing.
    fn reverse(&self, store: &mut TopologyStore, solid: SolidId) -> Result<SolidId>;

    /// Fuses coplanar faces left behind by booleans.
    ///
    /// # Errors
    ///
    /// Returns an error if the faces cannot be re-chained.
    fn remove_splitter(&self, store: &mut TopologyStore, solid: SolidId) -> Result<SolidId>;
}

/// The built-in polyhedral kernel.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolyKernel;

impl GeometryKernel for PolyKernel {
    fn offset_wire(&self, pline: &Pline, distance: f64) -> Result<Pline> {
        WireOffset2D::new(pline.clone(), distance).execute()
    }

    fn bind(&self, a: &Pline, b: &Pline) -> Result<Region2D> {
        Bind::new(a.clone(), b.clone()).execute()
    }

    fn fix_self_intersections(&self, region: &Region2D, tolerance: f64) -> Result<Vec<Region2D>> {
        FixSelfIntersection::new(region.clone(), tolerance).execute()
    }

    fn extrude(
        &self,
        store: &mut TopologyStore,
        face: FaceId,
        direction: Vector3,
    ) -> Result<SolidId> {
        Extrude::new(face, direction).execute(store)
    }

    fn fuse(&self, store: &mut TopologyStore, a: SolidId, b: SolidId) -> Result<SolidId> {
        Union::new(a, b).execute(store)
    }

    fn cut(&self, store: &mut TopologyStore, a: SolidId, b: SolidId) -> Result<SolidId> {
        Subtract::new(a, b).execute(store)
    }

    fn signed_volume(&self, store: &TopologyStore, solid: SolidId) -> Result<f64> {
        SignedVolume::new(solid).execute(store)
    }

    fn reverse(&self, store: &mut TopologyStore, solid: SolidId) -> Result<SolidId> {
        Reverse::new(solid).execute(store)
    }

    fn remove_splitter(&self, store: &mut TopologyStore, solid: SolidId) -> Result<SolidId> {
        RemoveSplitter::new(solid).execute(store)
    }
}
