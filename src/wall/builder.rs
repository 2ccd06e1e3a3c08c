//! The wall construction pipeline.
//!
//! A wall is built in three stages. The base is turned into planar faces
//! (a curve is offset to both sides and bound into a region, a face is used
//! as is). The faces are extruded along the wall normal and fused. Finally
//! additions are fused and subtractions cut, and coplanar splitter faces
//! are removed.

use tracing::{debug, warn};

use crate::error::{Result, WallError};
use crate::geometry::{Pline, Region2D};
use crate::kernel::GeometryKernel;
use crate::math::polygon_2d::point_loop_distance_2d;
use crate::math::TOLERANCE;
use crate::operations::creation::make_planar_face;
use crate::topology::{FaceId, Shape, SolidId, TopologyStore};

use super::base_curve::BaseCurve;
use super::classify::{classify, BaseShape, ShapeClass};
use super::params::{Alignment, WallConfig, WallParams};

/// Builds wall shapes through a [`GeometryKernel`].
#[derive(Debug)]
pub struct WallBuilder<'a, K: GeometryKernel> {
    kernel: &'a K,
    config: &'a WallConfig,
}

impl<'a, K: GeometryKernel> WallBuilder<'a, K> {
    #[must_use]
    pub fn new(kernel: &'a K, config: &'a WallConfig) -> Self {
        Self { kernel, config }
    }

    /// Builds the shape of a wall on `base`.
    ///
    /// `params.height` is used as given; callers resolve an automatic
    /// height beforehand. Sub-shapes that are missing, flat or fail their
    /// boolean are skipped.
    ///
    /// # Errors
    ///
    /// - [`WallError::InvalidBaseShape`] if the base is unusable.
    /// - [`WallError::DegenerateOffset`] if the offset outline collapses.
    /// - [`WallError::NegativeVolumeUnrecoverable`] if the body stays
    ///   inside out after reversing.
    /// - Kernel errors from extrusion or fusing the body itself.
    pub fn build(
        &self,
        store: &mut TopologyStore,
        base: &BaseShape,
        params: &WallParams,
        additions: &[Option<Shape>],
        subtractions: &[Option<Shape>],
    ) -> Result<Shape> {
        let body = match classify(store, base, params.force_wire) {
            ShapeClass::Invalid(reason) => return Err(WallError::InvalidBaseShape(reason).into()),
            ShapeClass::Solid(solid) => Shape::Solid(self.fix_orientation(store, solid)?),
            ShapeClass::SingleFace(face) => self.extrude_faces(store, vec![face], params)?,
            ShapeClass::SingleWire(wire) => {
                let curve = BaseCurve::from_wire(store, wire)?;
                self.body_from_curve(store, &curve, params)?
            }
            ShapeClass::RawEdges(edges) => {
                let curve = BaseCurve::from_edges(store, &edges)?;
                self.body_from_curve(store, &curve, params)?
            }
        };
        self.finish(store, body, additions, subtractions)
    }

    /// Builds the shape of a wall along an already resolved curve.
    ///
    /// # Errors
    ///
    /// See [`WallBuilder::build`].
    pub fn build_on_curve(
        &self,
        store: &mut TopologyStore,
        curve: &BaseCurve,
        params: &WallParams,
        additions: &[Option<Shape>],
        subtractions: &[Option<Shape>],
    ) -> Result<Shape> {
        let body = self.body_from_curve(store, curve, params)?;
        self.finish(store, body, additions, subtractions)
    }

    fn body_from_curve(
        &self,
        store: &mut TopologyStore,
        curve: &BaseCurve,
        params: &WallParams,
    ) -> Result<Shape> {
        let faces = self.outline_faces(store, curve, params)?;
        self.extrude_faces(store, faces, params)
    }

    /// Offsets the curve to the wall width and returns the outline faces.
    fn outline_faces(
        &self,
        store: &mut TopologyStore,
        curve: &BaseCurve,
        params: &WallParams,
    ) -> Result<Vec<FaceId>> {
        if params.width <= TOLERANCE {
            return Err(WallError::DegenerateOffset(format!("wall width {}", params.width)).into());
        }
        let normal = params.effective_normal();
        if curve.first_direction()?.cross(&normal).norm() < TOLERANCE {
            return Err(WallError::DegenerateOffset(
                "first segment is parallel to the wall normal".into(),
            )
            .into());
        }
        let (plane, pline) = curve.project(&normal, self.config.planar_tolerance)?;

        let (left, right) = side_offsets(params.align, params.width);
        let a = self.offset(&pline, left)?;
        let b = self.offset(&pline, right)?;
        let region = match self.surviving_side(&pline, (&a, left), (&b, right)) {
            Some(side) => {
                debug!("inner side of the closed wall turned inside out, dropping the hole");
                Region2D::new(side.to_points(self.config.arc_tolerance), Vec::new())
            }
            None => self
                .kernel
                .bind(&a, &b)
                .map_err(|e| WallError::DegenerateOffset(e.to_string()))?,
        };
        let regions = self
            .kernel
            .fix_self_intersections(&region, self.config.fix_tolerance)?;
        if regions.is_empty() {
            return Err(WallError::DegenerateOffset("wall outline collapsed".into()).into());
        }
        debug!(regions = regions.len(), "wall outline");

        let mut faces = Vec::with_capacity(regions.len());
        for region in &regions {
            let (outer, holes) = region.to_world(&plane);
            faces.push(make_planar_face(store, &outer, &holes)?);
        }
        Ok(faces)
    }

    /// For a closed curve, returns the side to keep alone when the other
    /// side's offset passed through itself and would bound a false hole.
    fn surviving_side<'p>(
        &self,
        base: &Pline,
        a: (&'p Pline, f64),
        b: (&'p Pline, f64),
    ) -> Option<&'p Pline> {
        if !base.closed {
            return None;
        }
        let tolerance = self.config.arc_tolerance;
        let base = base.to_points(tolerance);
        let inverted = |(side, distance): (&Pline, f64)| {
            distance.abs() > TOLERANCE
                && side
                    .to_points(tolerance)
                    .iter()
                    .all(|p| point_loop_distance_2d(p, &base) < distance.abs() - tolerance)
        };
        if inverted(a) {
            Some(b.0)
        } else if inverted(b) {
            Some(a.0)
        } else {
            None
        }
    }

    fn offset(&self, pline: &Pline, distance: f64) -> Result<Pline> {
        if distance.abs() <= TOLERANCE {
            return Ok(pline.clone());
        }
        self.kernel
            .offset_wire(pline, distance)
            .map_err(|e| WallError::DegenerateOffset(e.to_string()).into())
    }

    /// Extrudes and fuses the faces, or keeps them when the wall is flat.
    fn extrude_faces(
        &self,
        store: &mut TopologyStore,
        faces: Vec<FaceId>,
        params: &WallParams,
    ) -> Result<Shape> {
        if params.flat || params.height <= TOLERANCE {
            debug!(faces = faces.len(), "flat wall");
            return Ok(Shape::Faces(faces));
        }
        let direction = params.effective_normal() * params.height;

        let mut body: Option<SolidId> = None;
        for face in faces {
            let solid = self.kernel.extrude(store, face, direction)?;
            body = Some(match body {
                Some(acc) => self.kernel.fuse(store, acc, solid)?,
                None => solid,
            });
        }
        let body = body.ok_or_else(|| WallError::DegenerateOffset("no faces to extrude".into()))?;
        Ok(Shape::Solid(self.fix_orientation(store, body)?))
    }

    fn fix_orientation(&self, store: &mut TopologyStore, solid: SolidId) -> Result<SolidId> {
        let volume = self.kernel.signed_volume(store, solid)?;
        if volume >= 0.0 {
            return Ok(solid);
        }
        debug!(volume, "reversing inside-out solid");
        let reversed = self.kernel.reverse(store, solid)?;
        let volume = self.kernel.signed_volume(store, reversed)?;
        if volume < 0.0 {
            return Err(WallError::NegativeVolumeUnrecoverable { volume }.into());
        }
        Ok(reversed)
    }

    /// Applies the sub-shapes and removes splitters.
    fn finish(
        &self,
        store: &mut TopologyStore,
        body: Shape,
        additions: &[Option<Shape>],
        subtractions: &[Option<Shape>],
    ) -> Result<Shape> {
        let mut solid = match body {
            Shape::Solid(solid) => solid,
            flat @ Shape::Faces(_) => {
                if !additions.is_empty() || !subtractions.is_empty() {
                    debug!("flat wall, skipping additions and subtractions");
                }
                return Ok(flat);
            }
        };

        for (index, addition) in additions.iter().enumerate() {
            let Some(tool) = usable_tool(store, addition.as_ref(), "addition", index) else {
                continue;
            };
            match self.kernel.fuse(store, solid, tool) {
                Ok(fused) => solid = fused,
                Err(e) => warn!(index, error = %e, "skipping addition, union failed"),
            }
        }
        for (index, subtraction) in subtractions.iter().enumerate() {
            let Some(tool) = usable_tool(store, subtraction.as_ref(), "subtraction", index) else {
                continue;
            };
            match self.kernel.cut(store, solid, tool) {
                Ok(cut) => solid = cut,
                Err(e) => warn!(index, error = %e, "skipping subtraction, difference failed"),
            }
        }

        match self.kernel.remove_splitter(store, solid) {
            Ok(clean) => solid = clean,
            Err(e) => {
                let error = WallError::SplitterRemovalFailed(e.to_string());
                warn!(%error, "keeping the unsplit solid");
            }
        }
        Ok(Shape::Solid(solid))
    }
}

/// Offset distances of the two side curves, positive to the left of the
/// curve direction.
fn side_offsets(align: Alignment, width: f64) -> (f64, f64) {
    match align {
        Alignment::Left => (0.0, -width),
        Alignment::Right => (0.0, width),
        Alignment::Center => (width / 2.0, -width / 2.0),
    }
}

fn usable_tool(
    store: &TopologyStore,
    shape: Option<&Shape>,
    role: &str,
    index: usize,
) -> Option<SolidId> {
    match shape {
        None => {
            warn!(role, index, "skipping sub-shape without a shape");
            None
        }
        Some(Shape::Faces(_)) => {
            warn!(role, index, "skipping flat sub-shape");
            None
        }
        Some(Shape::Solid(solid)) => {
            if store.solid(*solid).is_err() {
                warn!(role, index, "skipping sub-shape with a missing solid");
                return None;
            }
            Some(*solid)
        }
    }
}
