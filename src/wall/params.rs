use crate::math::{Vector3, TOLERANCE};

/// Which side of the base curve the wall is built on, looking along the
/// curve with the wall normal pointing up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Alignment {
    /// The base curve runs along the wall's left face.
    Left,
    /// The base curve runs along the wall's right face.
    Right,
    /// The base curve runs along the middle of the wall.
    #[default]
    Center,
}

/// User-facing parameters of a wall.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WallParams {
    /// Wall thickness measured perpendicular to the base curve.
    pub width: f64,
    /// Extrusion height. `0` means automatic (host floor height) or flat.
    pub height: f64,
    pub align: Alignment,
    /// Extrusion direction; the zero vector means `(0, 0, 1)`.
    pub normal: Vector3,
    /// Use a single face base's outer wire as the trace instead of
    /// extruding the face itself.
    pub force_wire: bool,
    /// Keep the result planar even when a height is set.
    pub flat: bool,
}

impl WallParams {
    /// The unit extrusion direction.
    #[must_use]
    pub fn effective_normal(&self) -> Vector3 {
        self.normal
            .try_normalize(TOLERANCE)
            .unwrap_or_else(Vector3::z)
    }
}

impl Default for WallParams {
    fn default() -> Self {
        Self {
            width: 0.1,
            height: 0.0,
            align: Alignment::Center,
            normal: Vector3::zeros(),
            force_wire: false,
            flat: false,
        }
    }
}

/// Tolerances and numeric settings of the wall pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WallConfig {
    /// Tolerance handed to the self-intersection fix.
    pub fix_tolerance: f64,
    /// Maximum chord deviation when flattening sketch arcs.
    pub arc_tolerance: f64,
    /// Maximum distance of a base curve point from its plane.
    pub planar_tolerance: f64,
    /// Decimal places compared when deciding whether walls are alike.
    pub precision: u32,
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            fix_tolerance: 0.1,
            arc_tolerance: 0.01,
            planar_tolerance: 1e-6,
            precision: 6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_wall_tool() {
        let params = WallParams::default();
        assert!((params.width - 0.1).abs() < f64::EPSILON);
        assert_eq!(params.align, Alignment::Center);
        assert_eq!(params.effective_normal(), Vector3::z());
        assert!((WallConfig::default().fix_tolerance - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn explicit_normal_is_normalized() {
        let params = WallParams {
            normal: Vector3::new(0.0, 0.0, -5.0),
            ..WallParams::default()
        };
        assert_eq!(params.effective_normal(), -Vector3::z());
    }
}
