//! Bulge arc math used to flatten sketch arcs into wall base curves.
//!
//! Bulge convention: `bulge = tan(sweep_angle / 4)`.
//! - `bulge = 0`: straight line
//! - `bulge > 0`: counter-clockwise arc
//! - `bulge < 0`: clockwise arc
//! - `|bulge| = 1`: semicircle

/// Center, radius and angular span of a bulge arc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcParams {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    pub start_angle: f64,
    pub sweep: f64,
}

impl ArcParams {
    /// Evaluates the arc at parameter `t` in `[0, 1]`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> (f64, f64) {
        let angle = self.start_angle + self.sweep * t;
        (
            self.cx + self.radius * angle.cos(),
            self.cy + self.radius * angle.sin(),
        )
    }
}

/// Converts a bulge-defined segment from `(x0, y0)` to `(x1, y1)` into
/// center-radius-angle form.
///
/// Zero-length chords yield a zero radius.
#[must_use]
pub fn arc_from_bulge(x0: f64, y0: f64, x1: f64, y1: f64, bulge: f64) -> ArcParams {
    let dx = x1 - x0;
    let dy = y1 - y0;
    let chord = (dx * dx + dy * dy).sqrt();

    if chord < 1e-12 || bulge.abs() < 1e-12 {
        return ArcParams {
            cx: x0,
            cy: y0,
            radius: 0.0,
            start_angle: 0.0,
            sweep: 0.0,
        };
    }

    // Signed distance from the chord midpoint to the center, in half-chords.
    let sagitta_ratio = (1.0 - bulge * bulge) / (2.0 * bulge);
    let half = chord * 0.5;
    let nx = -dy / chord;
    let ny = dx / chord;

    let cx = (x0 + x1) * 0.5 + sagitta_ratio * half * nx;
    let cy = (y0 + y1) * 0.5 + sagitta_ratio * half * ny;
    let radius = half * (1.0 + bulge * bulge) / (2.0 * bulge.abs());

    ArcParams {
        cx,
        cy,
        radius,
        start_angle: (y0 - cy).atan2(x0 - cx),
        sweep: 4.0 * bulge.atan(),
    }
}

/// Number of chords needed so that each deviates from the arc by at most
/// `tolerance` (sagitta bound).
#[must_use]
pub fn arc_subdivision_count(radius: f64, abs_sweep: f64, tolerance: f64) -> u32 {
    if radius < 1e-12 || abs_sweep < 1e-12 || tolerance <= 0.0 {
        return 1;
    }
    let max_angle = if tolerance >= radius {
        std::f64::consts::PI
    } else {
        2.0 * (1.0 - tolerance / radius).acos()
    };
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n = (abs_sweep / max_angle).ceil() as u32;
    n.max(1)
}
