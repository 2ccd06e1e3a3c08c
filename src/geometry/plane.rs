use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

/// An infinite plane in 3D space with a right-handed local frame.
///
/// `u_dir × v_dir = normal`, so counter-clockwise loops in local `(u, v)`
/// coordinates have an area vector along `normal` in world space.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    origin: Point3,
    u_dir: Vector3,
    v_dir: Vector3,
    normal: Vector3,
}

impl Plane {
    /// Creates a plane from an origin and a normal vector.
    ///
    /// The U and V directions are computed automatically.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal vector is zero-length.
    pub fn from_normal(origin: Point3, normal: Vector3) -> Result<Self> {
        let len = normal.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let normal = normal / len;

        // Prefer world X as the U axis so XY sketches keep their coordinates.
        let reference = if normal.z.abs() > 0.9 {
            Vector3::new(0.0, 1.0, 0.0)
        } else {
            Vector3::new(0.0, 0.0, 1.0)
        };

        let u_dir = reference.cross(&normal).normalize();
        let v_dir = normal.cross(&u_dir);

        Ok(Self {
            origin,
            u_dir,
            v_dir,
            normal,
        })
    }

    /// The world XY plane through the origin.
    #[must_use]
    pub fn xy() -> Self {
        Self {
            origin: Point3::origin(),
            u_dir: Vector3::x(),
            v_dir: Vector3::y(),
            normal: Vector3::z(),
        }
    }

    /// Returns the origin point of the plane.
    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Returns the unit U direction.
    #[must_use]
    pub fn u_dir(&self) -> &Vector3 {
        &self.u_dir
    }

    /// Returns the unit V direction.
    #[must_use]
    pub fn v_dir(&self) -> &Vector3 {
        &self.v_dir
    }

    /// Returns the unit normal.
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Signed distance from `point` to the plane along the normal.
    #[must_use]
    pub fn signed_distance(&self, point: &Point3) -> f64 {
        (point - self.origin).dot(&self.normal)
    }

    /// Expresses a world point in local coordinates `(u, v, w)`, where `w`
    /// is the height above the plane.
    #[must_use]
    pub fn to_local(&self, point: &Point3) -> Point3 {
        let d = point - self.origin;
        Point3::new(d.dot(&self.u_dir), d.dot(&self.v_dir), d.dot(&self.normal))
    }

    /// Maps local coordinates back to world space.
    #[must_use]
    pub fn to_world(&self, local: &Point3) -> Point3 {
        self.origin + self.u_dir * local.x + self.v_dir * local.y + self.normal * local.z
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn z_normal_keeps_world_axes() {
        let plane = Plane::from_normal(Point3::origin(), Vector3::z()).unwrap();
        assert!((plane.u_dir().x - 1.0).abs() < TOLERANCE);
        assert!((plane.v_dir().y - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn frame_is_right_handed() {
        let n = Vector3::new(1.0, 2.0, 3.0);
        let plane = Plane::from_normal(Point3::new(1.0, 1.0, 1.0), n).unwrap();
        let cross = plane.u_dir().cross(plane.v_dir());
        assert!((cross - plane.normal()).norm() < 1e-12);
    }

    #[test]
    fn local_round_trip() {
        let plane = Plane::from_normal(Point3::new(0.0, 0.0, 5.0), Vector3::x()).unwrap();
        let p = Point3::new(3.0, -2.0, 7.0);
        let back = plane.to_world(&plane.to_local(&p));
        assert!((back - p).norm() < 1e-12);
        assert!((plane.signed_distance(&p) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn zero_normal_is_rejected() {
        assert!(Plane::from_normal(Point3::origin(), Vector3::zeros()).is_err());
    }
}
