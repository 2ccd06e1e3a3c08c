use std::collections::BTreeMap;

use crate::error::{OperationError, Result};
use crate::geometry::Plane;
use crate::math::polygon_2d::{interior_sample_2d, point_in_polygon_2d};
use crate::math::polygon_3d::{polygon_area_3d, simplify_collinear};
use crate::math::{Point3, Vector3};
use crate::operations::creation::{make_planar_face, MakeSolid};
use crate::topology::{FaceId, ShellData, SolidId, TopologyStore};

/// Tolerance for grouping coplanar faces (plane distance comparison).
const COPLANAR_DISTANCE_TOL: f64 = 1e-6;

/// Tolerance for grouping coplanar faces (normal direction comparison).
const COPLANAR_NORMAL_TOL: f64 = 1e-6;

/// Distance under which a vertex is considered to lie on an edge.
const ON_EDGE_TOL: f64 = 1e-7;

/// Loops enclosing less area than this are dropped.
const MIN_LOOP_AREA: f64 = 1e-12;

/// Info extracted from one face for the merge algorithm.
struct FaceInfo {
    face_id: FaceId,
    /// Directed edges of all loops as (`start_point`, `end_point`) pairs.
    edges: Vec<(Point3, Point3)>,
    /// Effective outward normal of the face.
    normal: Vector3,
    /// Signed distance from origin to the face plane along the normal.
    plane_dist: f64,
}

/// Removes splitter edges left behind by boolean operations.
///
/// Coplanar faces sharing the same outward normal are fused into single
/// faces: their edges are split wherever another face's vertex lies on
/// them, opposite edges cancel out, and the remaining boundary is chained
/// into an outer loop with holes. Faces without coplanar neighbours are
/// kept as they are.
pub struct RemoveSplitter {
    solid: SolidId,
}

impl RemoveSplitter {
    /// Creates a new `RemoveSplitter` operation.
    #[must_use]
    pub fn new(solid: SolidId) -> Self {
        Self { solid }
    }

    /// Executes the operation, returning the cleaned solid (or the input
    /// solid when there was nothing to merge).
    ///
    /// # Errors
    ///
    /// Returns `OperationError::Failed` if the boundary of a coplanar group
    /// does not chain into closed loops.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<SolidId> {
        let solid = store.solid(self.solid)?.clone();
        let face_ids = store.shell(solid.outer_shell)?.faces.clone();

        let mut infos = Vec::with_capacity(face_ids.len());
        for face_id in face_ids {
            infos.push(collect_face_info(store, face_id)?);
        }

        let groups = group_coplanar(&infos);
        if groups.iter().all(|g| g.len() < 2) {
            return Ok(self.solid);
        }

        let mut faces = Vec::with_capacity(infos.len());
        for group in &groups {
            if group.len() < 2 {
                faces.push(infos[group[0]].face_id);
                continue;
            }
            faces.extend(merge_group(store, group, &infos)?);
        }

        let shell = store.add_shell(ShellData {
            faces,
            is_closed: true,
        });
        MakeSolid::new(shell, solid.inner_shells).execute(store)
    }
}

/// Extracts directed edges and plane info from a single face.
fn collect_face_info(store: &TopologyStore, face_id: FaceId) -> Result<FaceInfo> {
    let face = store.face(face_id)?;
    let normal = if face.same_sense {
        *face.plane.normal()
    } else {
        -face.plane.normal()
    };
    let plane_dist = face.plane.origin().coords.dot(&normal);

    let mut edges = Vec::new();
    for l in store.face_loops(face_id)? {
        let n = l.len();
        for i in 0..n {
            edges.push((l[i], l[(i + 1) % n]));
        }
    }

    Ok(FaceInfo {
        face_id,
        edges,
        normal,
        plane_dist,
    })
}

/// Groups face indices by coplanarity (same normal direction AND same plane distance).
fn group_coplanar(infos: &[FaceInfo]) -> Vec<Vec<usize>> {
    let n = infos.len();
    let mut visited = vec![false; n];
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for i in 0..n {
        if visited[i] {
            continue;
        }
        visited[i] = true;
        let mut group = vec![i];
        for j in (i + 1)..n {
            if !visited[j] && are_coplanar(&infos[i], &infos[j]) {
                visited[j] = true;
                group.push(j);
            }
        }
        groups.push(group);
    }

    groups
}

fn are_coplanar(a: &FaceInfo, b: &FaceInfo) -> bool {
    (a.normal.dot(&b.normal) - 1.0).abs() <= COPLANAR_NORMAL_TOL
        && (a.plane_dist - b.plane_dist).abs() < COPLANAR_DISTANCE_TOL
}

/// Fuses a group of coplanar faces into as few faces as possible.
fn merge_group(
    store: &mut TopologyStore,
    group: &[usize],
    infos: &[FaceInfo],
) -> Result<Vec<FaceId>> {
    let edges: Vec<(Point3, Point3)> = group
        .iter()
        .flat_map(|&i| infos[i].edges.iter().copied())
        .collect();

    let mut vertices: BTreeMap<PointKey, Point3> = BTreeMap::new();
    for (a, b) in &edges {
        vertices.entry(PointKey::from_point(a)).or_insert(*a);
        vertices.entry(PointKey::from_point(b)).or_insert(*b);
    }

    // Split at T-junctions so that shared boundaries match edge for edge.
    let mut counts: BTreeMap<EdgeKey, (i32, Point3, Point3)> = BTreeMap::new();
    for (a, b) in &edges {
        for (s, e) in split_at_vertices(a, b, &vertices) {
            let key = EdgeKey::new(&s, &e);
            if key.start_key == key.end_key {
                continue;
            }
            counts.entry(key).or_insert((0, s, e)).0 += 1;
        }
    }

    // Opposite directed edges cancel; what survives is the fused boundary.
    let mut boundary: Vec<(Point3, Point3)> = Vec::new();
    for (key, &(count, s, e)) in &counts {
        let reverse = EdgeKey {
            start_key: key.end_key,
            end_key: key.start_key,
        };
        let opposite = counts.get(&reverse).map_or(0, |c| c.0);
        for _ in 0..(count - opposite).max(0) {
            boundary.push((s, e));
        }
    }

    if boundary.is_empty() {
        return Err(OperationError::Failed("merge produced no boundary edges".into()).into());
    }

    let loops = chain_into_loops(&boundary)?;
    let normal = infos[group[0]].normal;
    let regions = classify_loops(loops, &normal)?;

    let mut faces = Vec::with_capacity(regions.len());
    for (outer, holes) in regions {
        faces.push(make_planar_face(store, &outer, &holes)?);
    }
    Ok(faces)
}

/// Splits segment `a→b` at every known vertex lying strictly inside it.
fn split_at_vertices(
    a: &Point3,
    b: &Point3,
    vertices: &BTreeMap<PointKey, Point3>,
) -> Vec<(Point3, Point3)> {
    let d = b - a;
    let len2 = d.norm_squared();
    if len2 <= f64::EPSILON {
        return Vec::new();
    }
    let (ka, kb) = (PointKey::from_point(a), PointKey::from_point(b));

    let mut cuts: Vec<(f64, Point3)> = vertices
        .iter()
        .filter(|(k, _)| **k != ka && **k != kb)
        .filter_map(|(_, p)| {
            let t = (p - a).dot(&d) / len2;
            if t <= 0.0 || t >= 1.0 {
                return None;
            }
            let foot = a + d * t;
            ((p - foot).norm() < ON_EDGE_TOL).then_some((t, *p))
        })
        .collect();
    cuts.sort_by(|x, y| x.0.total_cmp(&y.0));

    let mut pieces = Vec::with_capacity(cuts.len() + 1);
    let mut prev = *a;
    for (_, p) in cuts {
        pieces.push((prev, p));
        prev = p;
    }
    pieces.push((prev, *b));
    pieces
}

/// Chains directed boundary edges into closed loops.
fn chain_into_loops(edges: &[(Point3, Point3)]) -> Result<Vec<Vec<Point3>>> {
    let mut start_map: BTreeMap<PointKey, Vec<(usize, Point3)>> = BTreeMap::new();
    for (i, &(start, end)) in edges.iter().enumerate() {
        start_map
            .entry(PointKey::from_point(&start))
            .or_default()
            .push((i, end));
    }

    let mut used = vec![false; edges.len()];
    let mut loops: Vec<Vec<Point3>> = Vec::new();

    for seed_idx in 0..edges.len() {
        if used[seed_idx] {
            continue;
        }

        used[seed_idx] = true;
        let mut chain = vec![edges[seed_idx].0];
        let mut current_end = edges[seed_idx].1;
        let start_key = PointKey::from_point(&edges[seed_idx].0);

        loop {
            let end_key = PointKey::from_point(&current_end);
            if end_key == start_key {
                break;
            }
            chain.push(current_end);

            let next = start_map.get(&end_key).and_then(|candidates| {
                candidates.iter().find(|&&(idx, _)| !used[idx]).copied()
            });

            match next {
                Some((idx, end_pt)) => {
                    used[idx] = true;
                    current_end = end_pt;
                }
                None => {
                    return Err(OperationError::Failed(
                        "boundary edges do not form a closed loop".into(),
                    )
                    .into());
                }
            }
        }

        if chain.len() >= 3 {
            loops.push(chain);
        }
    }

    Ok(loops)
}

/// Sorts loops into outer boundaries (positive area about `normal`) with
/// the holes they contain.
fn classify_loops(
    loops: Vec<Vec<Point3>>,
    normal: &Vector3,
) -> Result<Vec<(Vec<Point3>, Vec<Vec<Point3>>)>> {
    let Some(anchor) = loops.first().and_then(|l| l.first()).copied() else {
        return Err(OperationError::Failed("merge produced no loops".into()).into());
    };
    let plane = Plane::from_normal(anchor, *normal)?;
    let local = |pts: &[Point3]| pts.iter().map(|p| plane.to_local(p)).collect::<Vec<_>>();

    let mut outers: Vec<(Vec<Point3>, Vec<Point3>, Vec<Vec<Point3>>)> = Vec::new();
    let mut holes: Vec<Vec<Point3>> = Vec::new();
    for l in loops {
        let l = simplify_collinear(&l);
        let area = polygon_area_3d(&l, normal);
        if area.abs() < MIN_LOOP_AREA {
            continue;
        }
        if area > 0.0 {
            let projected = local(&l);
            outers.push((l, projected, Vec::new()));
        } else {
            holes.push(l);
        }
    }

    // Smallest containing outer wins for nested islands.
    outers.sort_by(|a, b| {
        polygon_area_3d(&a.0, normal).total_cmp(&polygon_area_3d(&b.0, normal))
    });

    for hole in holes {
        let sample = interior_sample_2d(&local(&hole));
        let owner = outers
            .iter_mut()
            .find(|(_, projected, _)| point_in_polygon_2d(&sample, projected))
            .ok_or_else(|| OperationError::Failed("hole loop lies outside every face".into()))?;
        owner.2.push(hole);
    }

    Ok(outers.into_iter().map(|(o, _, h)| (o, h)).collect())
}

/// Key for ordering directed edges by quantized start/end coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct EdgeKey {
    start_key: PointKey,
    end_key: PointKey,
}

impl EdgeKey {
    fn new(start: &Point3, end: &Point3) -> Self {
        Self {
            start_key: PointKey::from_point(start),
            end_key: PointKey::from_point(end),
        }
    }
}

/// Key for ordering points by quantized coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct PointKey {
    x: i64,
    y: i64,
    z: i64,
}

impl PointKey {
    /// Quantizes to a 1 micron grid: fine enough to distinguish separate
    /// vertices, coarse enough to merge coincident ones.
    #[allow(clippy::cast_possible_truncation)]
    fn from_point(p: &Point3) -> Self {
        const INV_GRID: f64 = 1e6;
        Self {
            x: (p.x * INV_GRID).round() as i64,
            y: (p.y * INV_GRID).round() as i64,
            z: (p.z * INV_GRID).round() as i64,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::query::SignedVolume;
    use crate::operations::shaping::Extrude;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    /// Two boxes side by side sharing the plane x = 1, assembled into one
    /// shell without the shared faces.
    fn split_box(store: &mut TopologyStore) -> SolidId {
        let mut faces = Vec::new();
        for (x0, x1) in [(0.0, 1.0), (1.0, 3.0)] {
            let base = make_planar_face(
                store,
                &[p(x0, 0.0, 0.0), p(x1, 0.0, 0.0), p(x1, 1.0, 0.0), p(x0, 1.0, 0.0)],
                &[],
            )
            .unwrap();
            let solid = Extrude::new(base, Vector3::z()).execute(store).unwrap();
            for f in store.solid_faces(solid).unwrap() {
                let loops = store.face_loops(f).unwrap();
                let on_seam = loops[0].iter().all(|q| (q.x - 1.0).abs() < 1e-12);
                if !on_seam {
                    faces.push(f);
                }
            }
        }
        let shell = store.add_shell(ShellData {
            faces,
            is_closed: true,
        });
        MakeSolid::new(shell, vec![]).execute(store).unwrap()
    }

    #[test]
    fn coplanar_faces_are_fused() {
        let mut store = TopologyStore::new();
        let solid = split_box(&mut store);
        assert_eq!(store.solid_faces(solid).unwrap().len(), 10);

        let merged = RemoveSplitter::new(solid).execute(&mut store).unwrap();
        assert_eq!(store.solid_faces(merged).unwrap().len(), 6);
        let v = SignedVolume::new(merged).execute(&store).unwrap();
        assert!((v - 3.0).abs() < 1e-9);
        for f in store.solid_faces(merged).unwrap() {
            assert_eq!(store.face_loops(f).unwrap()[0].len(), 4);
        }
    }

    #[test]
    fn clean_solid_is_returned_unchanged() {
        let mut store = TopologyStore::new();
        let solid = crate::operations::creation::MakeBox::new(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0))
            .execute(&mut store)
            .unwrap();
        assert_eq!(RemoveSplitter::new(solid).execute(&mut store).unwrap(), solid);
    }

    #[test]
    fn t_junction_is_split_before_cancelling() {
        // One long square next to two half-height squares: the long one's
        // shared edge is a single segment, the neighbours contribute two.
        let edges = [
            (p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)),
            (p(1.0, 0.0, 0.0), p(1.0, 2.0, 0.0)),
        ];
        let mut vertices = BTreeMap::new();
        for q in [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(1.0, 2.0, 0.0)] {
            vertices.insert(PointKey::from_point(&q), q);
        }
        assert_eq!(split_at_vertices(&edges[0].0, &edges[0].1, &vertices).len(), 1);
        let pieces = split_at_vertices(&edges[1].0, &edges[1].1, &vertices);
        assert_eq!(pieces.len(), 2);
        assert!((pieces[0].1.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn chain_with_hole_produces_two_loops() {
        let boundary = vec![
            (p(0.0, 0.0, 0.0), p(10.0, 0.0, 0.0)),
            (p(10.0, 0.0, 0.0), p(10.0, 10.0, 0.0)),
            (p(10.0, 10.0, 0.0), p(0.0, 10.0, 0.0)),
            (p(0.0, 10.0, 0.0), p(0.0, 0.0, 0.0)),
            (p(3.0, 3.0, 0.0), p(3.0, 7.0, 0.0)),
            (p(3.0, 7.0, 0.0), p(7.0, 7.0, 0.0)),
            (p(7.0, 7.0, 0.0), p(7.0, 3.0, 0.0)),
            (p(7.0, 3.0, 0.0), p(3.0, 3.0, 0.0)),
        ];
        let loops = chain_into_loops(&boundary).unwrap();
        assert_eq!(loops.len(), 2);
        let regions = classify_loops(loops, &Vector3::z()).unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].1.len(), 1);
    }

    #[test]
    fn dangling_edge_is_an_error() {
        let boundary = vec![
            (p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)),
            (p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0)),
        ];
        assert!(chain_into_loops(&boundary).is_err());
    }
}
