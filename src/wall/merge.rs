use crate::error::{Result, WallError};

use super::base_curve::{same_point, BaseCurve};
use super::params::WallParams;

/// Digits beyond this are below `f64` resolution for wall-sized lengths.
const MAX_PRECISION: i32 = 15;

/// Returns `true` if two walls have equal width, height and alignment,
/// comparing lengths at `precision` decimal places (at most 15).
#[must_use]
pub fn are_same_wall_types(a: &WallParams, b: &WallParams, precision: u32) -> bool {
    let digits = i32::try_from(precision).map_or(MAX_PRECISION, |p| p.min(MAX_PRECISION));
    let scale = 10f64.powi(digits);
    let same = |x: f64, y: f64| ((x * scale).round() - (y * scale).round()).abs() < 0.5;
    same(a.width, b.width) && same(a.height, b.height) && a.align == b.align
}

/// Joins two open curves that share an endpoint into one curve.
///
/// The shared vertex appears once, so the result has one vertex fewer than
/// the inputs combined. The result follows `a`'s direction; `b` is walked
/// backwards when needed. If the other ends meet as well the result is
/// closed.
///
/// # Errors
///
/// Returns [`WallError::IncompatibleWalls`] if either curve is closed or
/// empty, or if the curves share no endpoint.
pub fn merge_curves(a: &BaseCurve, b: &BaseCurve) -> Result<BaseCurve> {
    if a.closed || b.closed {
        return Err(WallError::IncompatibleWalls("closed curves cannot be merged".into()).into());
    }
    let (Some(a_start), Some(a_end), Some(b_start), Some(b_end)) =
        (a.start(), a.end(), b.start(), b.end())
    else {
        return Err(WallError::IncompatibleWalls("empty curve".into()).into());
    };

    let reversed = |c: &BaseCurve| c.points.iter().rev().copied().collect::<Vec<_>>();
    let (head, tail) = if same_point(a_end, b_start) {
        (a.points.clone(), b.points.clone())
    } else if same_point(a_end, b_end) {
        (a.points.clone(), reversed(b))
    } else if same_point(a_start, b_end) {
        (b.points.clone(), a.points.clone())
    } else if same_point(a_start, b_start) {
        (reversed(b), a.points.clone())
    } else {
        return Err(WallError::IncompatibleWalls("curves share no endpoint".into()).into());
    };

    let mut points = head;
    points.extend(tail.into_iter().skip(1));
    let closed = points.len() > 3
        && matches!((points.first(), points.last()), (Some(s), Some(e)) if same_point(s, e));
    Ok(BaseCurve::new(points, closed))
}
