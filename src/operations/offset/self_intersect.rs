use tracing::debug;

use crate::error::{OperationError, Result};
use crate::geometry::Region2D;
use crate::math::intersect_2d::segment_segment_intersect_2d;
use crate::math::polygon_2d::{interior_sample_2d, point_in_polygon_2d, signed_area_2d};
use crate::math::{Point3, TOLERANCE};

/// Vertices closer than `tolerance * MERGE_FACTOR` are merged.
const MERGE_FACTOR: f64 = 1e-3;

/// Repairs a planar region whose loops cross themselves.
///
/// Each loop is cleaned (near-coincident and collinear vertices dropped),
/// then cut at every crossing of two non-adjacent segments. Lobes that wind
/// the wrong way or enclose less than `tolerance²` are discarded. Holes are
/// handed to whichever surviving outer loop contains them. The result may
/// hold several regions, or none when the profile collapsed completely.
#[derive(Debug)]
pub struct FixSelfIntersection {
    region: Region2D,
    tolerance: f64,
}

impl FixSelfIntersection {
    /// Creates a new `FixSelfIntersection` operation.
    #[must_use]
    pub fn new(region: Region2D, tolerance: f64) -> Self {
        Self { region, tolerance }
    }

    /// Executes the repair.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` if the tolerance is not positive.
    pub fn execute(&self) -> Result<Vec<Region2D>> {
        if self.tolerance <= 0.0 {
            return Err(
                OperationError::InvalidInput("fix tolerance must be positive".into()).into(),
            );
        }
        let min_area = self.tolerance * self.tolerance;
        let merge_dist = self.tolerance * MERGE_FACTOR;

        let outers: Vec<Vec<Point3>> = split_loops(&self.region.outer, 1.0, merge_dist)
            .into_iter()
            .filter(|l| signed_area_2d(l) > min_area)
            .collect();

        let mut regions: Vec<Region2D> = outers
            .into_iter()
            .map(|outer| Region2D {
                outer,
                holes: Vec::new(),
            })
            .collect();

        for hole in &self.region.holes {
            for lobe in split_loops(hole, -1.0, merge_dist) {
                if -signed_area_2d(&lobe) <= min_area {
                    continue;
                }
                let sample = interior_sample_2d(&lobe);
                match regions
                    .iter_mut()
                    .find(|r| point_in_polygon_2d(&sample, &r.outer))
                {
                    Some(region) => region.holes.push(lobe),
                    None => debug!("dropping hole outside every outer loop"),
                }
            }
        }

        Ok(regions)
    }
}

/// Cleans a loop and cuts it at its self-crossings, keeping every lobe
/// that winds like `winding_sign` (`+1.0` CCW, `-1.0` CW).
fn split_loops(points: &[Point3], winding_sign: f64, merge_dist: f64) -> Vec<Vec<Point3>> {
    let pts = clean_polygon(points, merge_dist);
    if pts.len() < 3 {
        return Vec::new();
    }
    if pts.len() < 4 {
        return keep_if_oriented(pts, winding_sign);
    }
    match find_first_self_intersection(&pts) {
        None => keep_if_oriented(pts, winding_sign),
        Some((i, j, pt)) => {
            let (a, b) = split_at_intersection(&pts, i, j, pt);
            let mut lobes = split_loops(&a, winding_sign, merge_dist);
            lobes.extend(split_loops(&b, winding_sign, merge_dist));
            lobes
        }
    }
}

fn keep_if_oriented(points: Vec<Point3>, winding_sign: f64) -> Vec<Vec<Point3>> {
    if signed_area_2d(&points) * winding_sign > 0.0 {
        vec![points]
    } else {
        Vec::new()
    }
}

/// Checks whether segments i and j are adjacent in a closed polyline.
fn are_adjacent(i: usize, j: usize, n: usize) -> bool {
    let diff = i.abs_diff(j);
    diff == 1 || diff == n - 1
}

/// Finds the first crossing between non-adjacent segments of a closed loop.
///
/// Endpoint-to-endpoint touches are skipped; only crossings with at least
/// one parameter in the interior are reported as `(i, j, point)`, `i < j`.
fn find_first_self_intersection(points: &[Point3]) -> Option<(usize, usize, Point3)> {
    let n = points.len();
    let eps = TOLERANCE * 100.0;
    for i in 0..n {
        let i_next = (i + 1) % n;
        for j in (i + 2)..n {
            if are_adjacent(i, j, n) {
                continue;
            }
            let j_next = (j + 1) % n;
            if let Some((pt, t, u)) =
                segment_segment_intersect_2d(&points[i], &points[i_next], &points[j], &points[j_next])
            {
                let t_at_end = t < eps || t > 1.0 - eps;
                let u_at_end = u < eps || u > 1.0 - eps;
                if t_at_end && u_at_end {
                    continue;
                }
                return Some((i, j, pt));
            }
        }
    }
    None
}

/// Splits a closed loop at the crossing of segments `i < j` into
/// `[x, P(i+1)..=P(j)]` and `[x, P(j+1).., P(i)]` (wrapping).
fn split_at_intersection(
    points: &[Point3],
    seg_i: usize,
    seg_j: usize,
    intersection: Point3,
) -> (Vec<Point3>, Vec<Point3>) {
    let n = points.len();

    let mut a = Vec::with_capacity(seg_j - seg_i + 1);
    a.push(intersection);
    a.extend_from_slice(&points[(seg_i + 1)..=seg_j]);

    let mut b = Vec::with_capacity(n - (seg_j - seg_i) + 1);
    b.push(intersection);
    let mut idx = (seg_j + 1) % n;
    loop {
        b.push(points[idx]);
        if idx == seg_i {
            break;
        }
        idx = (idx + 1) % n;
    }

    (a, b)
}

/// Removes near-duplicate and collinear vertices from a closed loop.
fn clean_polygon(points: &[Point3], merge_dist: f64) -> Vec<Point3> {
    let mut deduped: Vec<Point3> = Vec::with_capacity(points.len());
    for &pt in points {
        if let Some(&last) = deduped.last() {
            if (pt.x - last.x).hypot(pt.y - last.y) < merge_dist {
                continue;
            }
        }
        deduped.push(pt);
    }
    while deduped.len() > 1 {
        let (first, last) = (deduped[0], deduped[deduped.len() - 1]);
        if (last.x - first.x).hypot(last.y - first.y) < merge_dist {
            deduped.pop();
        } else {
            break;
        }
    }

    // Repeat until stable: removing one vertex can make its neighbour collinear.
    loop {
        let n = deduped.len();
        if n < 3 {
            return deduped;
        }
        let Some(idx) = (0..n).find(|&i| {
            let prev = deduped[(i + n - 1) % n];
            let curr = deduped[i];
            let next = deduped[(i + 1) % n];
            let cross = (curr.x - prev.x) * (next.y - curr.y) - (curr.y - prev.y) * (next.x - curr.x);
            let base = (next.x - prev.x).hypot(next.y - prev.y).max(TOLERANCE);
            cross.abs() / base < merge_dist * MERGE_FACTOR
                && (curr - prev).dot(&(next - curr)) >= 0.0
        }) else {
            return deduped;
        };
        deduped.remove(idx);
    }
}
