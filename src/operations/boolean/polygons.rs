use std::collections::{BTreeSet, HashSet, VecDeque};

use spade::handles::{FixedFaceHandle, InnerTag};
use spade::{ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation};

use crate::error::{OperationError, Result};
use crate::geometry::Plane;
use crate::math::polygon_3d::{area_vector, is_convex};
use crate::math::Point3;
use crate::operations::creation::{make_planar_face, MakeSolid};
use crate::topology::{FaceId, ShellData, SolidId, TopologyStore};

use super::bsp::Polygon;

/// Polygons smaller than this are dropped when rebuilding faces.
const MIN_POLYGON_AREA: f64 = 1e-10;

/// Points closer than this are merged when rebuilding faces.
const DUPLICATE_TOL: f64 = 1e-9;

/// Converts the boundary of a solid into convex polygons.
///
/// Convex faces without holes pass through unchanged; every other face is
/// triangulated with a constrained Delaunay triangulation.
pub(crate) fn solid_to_polygons(store: &TopologyStore, solid: SolidId) -> Result<Vec<Polygon>> {
    let mut polygons = Vec::new();
    for face in store.solid_faces(solid)? {
        face_to_polygons(store, face, &mut polygons)?;
    }
    Ok(polygons)
}

fn face_to_polygons(store: &TopologyStore, face: FaceId, out: &mut Vec<Polygon>) -> Result<()> {
    let loops = store.face_loops(face)?;
    let Some(outer) = loops.first() else {
        return Ok(());
    };
    // The winding of the outer loop carries the outward normal.
    let Some(normal) = area_vector(outer).try_normalize(f64::EPSILON) else {
        return Ok(());
    };

    if loops.len() == 1 && is_convex(outer, &normal) {
        out.extend(Polygon::new(outer.clone()));
        return Ok(());
    }

    let plane = Plane::from_normal(outer[0], normal)?;
    let project = |p: &Point3| {
        let l = plane.to_local(p);
        SpadePoint2::new(l.x, l.y)
    };

    let mut cdt = ConstrainedDelaunayTriangulation::<SpadePoint2<f64>>::new();
    for l in &loops {
        let pts: Vec<_> = l.iter().map(project).collect();
        insert_constraint_loop(&mut cdt, &pts)?;
    }

    let interior = classify_interior_faces(&cdt);
    for tri in cdt.inner_faces() {
        if !interior.contains(&tri.fix().index()) {
            continue;
        }
        let mut pts: Vec<Point3> = tri
            .vertices()
            .iter()
            .map(|v| {
                let pos = v.position();
                plane.to_world(&Point3::new(pos.x, pos.y, 0.0))
            })
            .collect();
        if area_vector(&pts).dot(&normal) < 0.0 {
            pts.reverse();
        }
        out.extend(Polygon::new(pts));
    }
    Ok(())
}

/// Inserts a closed loop into the triangulation as constraint edges.
fn insert_constraint_loop(
    cdt: &mut ConstrainedDelaunayTriangulation<SpadePoint2<f64>>,
    points: &[SpadePoint2<f64>],
) -> Result<()> {
    if points.len() < 3 {
        return Err(
            OperationError::Failed("constraint loop needs at least 3 points".into()).into(),
        );
    }

    let mut handles = Vec::with_capacity(points.len());
    for &pt in points {
        let h = cdt
            .insert(pt)
            .map_err(|e: InsertionError| OperationError::Failed(format!("CDT insert: {e}")))?;
        handles.push(h);
    }

    for i in 0..handles.len() {
        let from = handles[i];
        let to = handles[(i + 1) % handles.len()];
        if from != to {
            cdt.add_constraint(from, to);
        }
    }

    Ok(())
}

/// Classifies which inner faces of the CDT are inside the polygon using flood-fill.
///
/// Starts from faces adjacent to the outer (infinite) face at depth 0. Each time
/// a constraint edge is crossed, depth increments. Odd depth = interior.
fn classify_interior_faces(
    cdt: &ConstrainedDelaunayTriangulation<SpadePoint2<f64>>,
) -> BTreeSet<usize> {
    let mut interior = BTreeSet::new();
    let mut seen: HashSet<usize> = HashSet::new();
    let mut queue: VecDeque<(FixedFaceHandle<InnerTag>, u32)> = VecDeque::new();

    let outer_fix = cdt.outer_face().fix();

    for edge in cdt.directed_edges() {
        if edge.face().fix() != outer_fix {
            continue;
        }
        if let Some(inner) = edge.rev().face().as_inner() {
            let idx = inner.fix().index();
            if !seen.insert(idx) {
                continue;
            }
            let depth = u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
            if depth % 2 == 1 {
                interior.insert(idx);
            }
            queue.push_back((inner.fix(), depth));
        }
    }

    while let Some((face_fix, depth)) = queue.pop_front() {
        for edge in cdt.face(face_fix).adjacent_edges() {
            let Some(neighbor) = edge.rev().face().as_inner() else {
                continue;
            };
            let n_idx = neighbor.fix().index();
            if !seen.insert(n_idx) {
                continue;
            }
            let new_depth = depth + u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
            if new_depth % 2 == 1 {
                interior.insert(n_idx);
            }
            queue.push_back((neighbor.fix(), new_depth));
        }
    }

    interior
}

/// Rebuilds a closed solid from boundary polygons.
///
/// # Errors
///
/// Returns `OperationError::Failed` if no polygon with area remains.
pub(crate) fn polygons_to_solid(store: &mut TopologyStore, polygons: &[Polygon]) -> Result<SolidId> {
    let mut faces = Vec::with_capacity(polygons.len());
    for poly in polygons {
        let pts = dedup_loop(&poly.vertices);
        if pts.len() < 3 || area_vector(&pts).norm() < MIN_POLYGON_AREA {
            continue;
        }
        faces.push(make_planar_face(store, &pts, &[])?);
    }

    if faces.is_empty() {
        return Err(OperationError::Failed("boolean result is empty".into()).into());
    }

    let shell = store.add_shell(ShellData {
        faces,
        is_closed: true,
    });
    MakeSolid::new(shell, vec![]).execute(store)
}

fn dedup_loop(points: &[Point3]) -> Vec<Point3> {
    let mut out: Vec<Point3> = Vec::with_capacity(points.len());
    for p in points {
        if out.last().map_or(true, |q| (p - q).norm() > DUPLICATE_TOL) {
            out.push(*p);
        }
    }
    while out.len() > 1 && (out[0] - out[out.len() - 1]).norm() <= DUPLICATE_TOL {
        out.pop();
    }
    out
}
