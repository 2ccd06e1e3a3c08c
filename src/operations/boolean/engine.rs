use crate::error::Result;
use crate::operations::creation::MakeSolid;
use crate::operations::query::{Aabb, BoundingBox};
use crate::topology::{ShellData, Shape, SolidId, TopologyStore};

use super::bsp;
use super::polygons::{polygons_to_solid, solid_to_polygons};

/// Boxes closer than this still count as overlapping, so touching solids
/// are fused through their shared face.
const AABB_MARGIN: f64 = 1e-9;

/// The type of boolean operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    Union,
    Subtract,
}

/// Executes a boolean operation on two solids.
///
/// Solids whose bounding boxes are apart are combined directly; all others
/// go through BSP clipping of their boundary polygons.
pub(crate) fn boolean_execute(
    store: &mut TopologyStore,
    solid_a: SolidId,
    solid_b: SolidId,
    op: BooleanOp,
) -> Result<SolidId> {
    let aabb_a = BoundingBox::new(&Shape::Solid(solid_a)).execute(store)?;
    let aabb_b = BoundingBox::new(&Shape::Solid(solid_b)).execute(store)?;

    let overlapping = match (aabb_a, aabb_b) {
        (Some(a), Some(b)) => aabb_overlap(&a, &b),
        _ => false,
    };
    if !overlapping {
        return handle_disjoint(store, solid_a, solid_b, op);
    }

    let a = solid_to_polygons(store, solid_a)?;
    let b = solid_to_polygons(store, solid_b)?;
    let result = match op {
        BooleanOp::Union => bsp::union(a, b),
        BooleanOp::Subtract => bsp::subtract(a, b),
    };
    polygons_to_solid(store, &result)
}

fn aabb_overlap(a: &Aabb, b: &Aabb) -> bool {
    (0..3).all(|i| a.min[i] <= b.max[i] + AABB_MARGIN && b.min[i] <= a.max[i] + AABB_MARGIN)
}

/// Handles the case where solids are disjoint (AABBs don't overlap).
fn handle_disjoint(
    store: &mut TopologyStore,
    solid_a: SolidId,
    solid_b: SolidId,
    op: BooleanOp,
) -> Result<SolidId> {
    match op {
        // One shell holding both lumps.
        BooleanOp::Union => {
            let mut faces = store.solid_faces(solid_a)?;
            faces.extend(store.solid_faces(solid_b)?);
            let shell = store.add_shell(ShellData {
                faces,
                is_closed: true,
            });
            MakeSolid::new(shell, vec![]).execute(store)
        }
        // A - B where they don't overlap = A.
        BooleanOp::Subtract => Ok(solid_a),
    }
}
