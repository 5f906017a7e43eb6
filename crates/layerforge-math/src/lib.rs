#![warn(missing_docs)]

//! Geometry primitives for the layerforge toolpath pipeline.
//!
//! Thin wrappers around nalgebra: point and vector aliases, the build
//! orientation used to derive the global stacking axis, slicing planes
//! with tolerance-based equality, and angular measurements about a pivot.

use std::f64::consts::TAU;

use nalgebra::{Unit, UnitQuaternion, Vector2, Vector3};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A point in the plane of a layer.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in the plane of a layer.
pub type Vec2 = Vector2<f64>;

/// Below this magnitude a denominator or length counts as zero.
pub const EPSILON: f64 = 1e-12;

/// Orientation of the build's stacking axis.
///
/// Built once from the configured pitch/yaw/roll and shared by every part,
/// so all parts are compared along the same axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    rotation: UnitQuaternion<f64>,
}

impl Orientation {
    /// No rotation: the stacking axis is +Z.
    pub fn identity() -> Self {
        Self {
            rotation: UnitQuaternion::identity(),
        }
    }

    /// Orientation from angles in radians.
    ///
    /// Pitch turns about X, roll about Y and yaw about Z. Roll is applied
    /// first, then pitch, then yaw.
    pub fn from_pitch_yaw_roll(pitch: f64, yaw: f64, roll: f64) -> Self {
        let pitch = UnitQuaternion::from_axis_angle(&Vec3::x_axis(), pitch);
        let roll = UnitQuaternion::from_axis_angle(&Vec3::y_axis(), roll);
        let yaw = UnitQuaternion::from_axis_angle(&Vec3::z_axis(), yaw);
        Self {
            rotation: yaw * pitch * roll,
        }
    }

    /// Rotate a vector.
    pub fn rotate(&self, v: &Vec3) -> Vec3 {
        self.rotation * v
    }

    /// The canonical +Z axis carried through this orientation.
    pub fn stacking_direction(&self) -> Dir3 {
        Dir3::new_normalize(self.rotate(&Vec3::z()))
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self::identity()
    }
}

/// An oriented plane: an origin point and a unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    origin: Point3,
    normal: Dir3,
}

impl Plane {
    /// Plane through `origin` with the given normal (normalized here).
    pub fn new(origin: Point3, normal: Vec3) -> Self {
        Self {
            origin,
            normal: Dir3::new_normalize(normal),
        }
    }

    /// Horizontal plane at height `z` facing +Z.
    pub fn horizontal(z: f64) -> Self {
        Self::new(Point3::new(0.0, 0.0, z), Vec3::z())
    }

    /// Origin point.
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Unit normal.
    pub fn normal(&self) -> &Dir3 {
        &self.normal
    }

    /// Move the plane along its own normal by a signed distance.
    pub fn shift_along_normal(&mut self, distance: f64) {
        self.origin += self.normal.into_inner() * distance;
    }

    /// Copy of the plane moved along its normal.
    pub fn shifted(&self, distance: f64) -> Self {
        let mut plane = *self;
        plane.shift_along_normal(distance);
        plane
    }

    /// Signed distance from the plane to `point`, positive on the normal side.
    pub fn signed_distance(&self, point: &Point3) -> f64 {
        (point - self.origin).dot(self.normal.as_ref())
    }

    /// Whether `other` lies within `tolerance` of this plane.
    ///
    /// Only the positional offset of `other`'s origin along this plane's
    /// normal is compared; the normals themselves are not.
    pub fn is_equal(&self, other: &Plane, tolerance: f64) -> bool {
        self.signed_distance(&other.origin).abs() <= tolerance
    }

    /// Parameter `t` at which the line `from + t * direction` crosses the plane.
    ///
    /// With a unit `direction` this is the signed distance from `from` to the
    /// crossing point. Returns `None` when the line runs parallel to the plane.
    pub fn distance_along(&self, from: &Point3, direction: &Dir3) -> Option<f64> {
        let denom = direction.dot(self.normal.as_ref());
        if denom.abs() < EPSILON {
            return None;
        }
        Some((self.origin - from).dot(self.normal.as_ref()) / denom)
    }
}

impl Default for Plane {
    fn default() -> Self {
        Self::horizontal(0.0)
    }
}

/// Counter-clockwise angle of `point` about `pivot`, measured from `reference`.
///
/// The result lies in `[0, 2π)`. A point on the pivot, or a zero-length
/// reference, measures as `0`.
pub fn ccw_angle(point: &Point2, pivot: &Point2, reference: &Vec2) -> f64 {
    let v = point - pivot;
    if v.norm() < EPSILON || reference.norm() < EPSILON {
        return 0.0;
    }
    let cross = reference.x * v.y - reference.y * v.x;
    let dot = reference.dot(&v);
    let angle = cross.atan2(dot);
    if angle < 0.0 {
        (angle + TAU) % TAU
    } else {
        angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_identity_stacking_is_z() {
        let dir = Orientation::identity().stacking_direction();
        assert_relative_eq!(dir.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pitch_tilts_stacking_axis() {
        // 90° about X carries +Z onto -Y
        let dir = Orientation::from_pitch_yaw_roll(FRAC_PI_2, 0.0, 0.0).stacking_direction();
        assert_relative_eq!(dir.y, -1.0, epsilon = 1e-12);
        assert!(dir.z.abs() < 1e-12);

        // Yaw alone leaves +Z untouched
        let dir = Orientation::from_pitch_yaw_roll(0.0, 1.0, 0.0).stacking_direction();
        assert_relative_eq!(dir.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_shift_along_normal() {
        let mut plane = Plane::horizontal(1.0);
        plane.shift_along_normal(0.1);
        assert_relative_eq!(plane.origin().z, 1.1, epsilon = 1e-12);

        let tilted = Plane::new(Point3::origin(), Vec3::new(1.0, 0.0, 1.0));
        let moved = tilted.shifted(2.0_f64.sqrt());
        assert_relative_eq!(moved.origin().x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(moved.origin().z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_plane_equality_with_tolerance() {
        let a = Plane::horizontal(1.0);
        let b = Plane::new(Point3::new(5.0, -3.0, 1.005), Vec3::z());
        assert!(a.is_equal(&b, 0.01));
        assert!(!a.is_equal(&b, 0.001));
        assert!(a.is_equal(&a, 0.0));
    }

    #[test]
    fn test_distance_along() {
        let plane = Plane::horizontal(2.5);
        let d = plane.distance_along(&Point3::origin(), &Vec3::z_axis()).unwrap();
        assert_relative_eq!(d, 2.5, epsilon = 1e-12);

        let below = Plane::horizontal(-1.0);
        let d = below.distance_along(&Point3::origin(), &Vec3::z_axis()).unwrap();
        assert_relative_eq!(d, -1.0, epsilon = 1e-12);

        assert!(plane.distance_along(&Point3::origin(), &Vec3::x_axis()).is_none());
    }

    #[test]
    fn test_ccw_angle() {
        let pivot = Point2::origin();
        let x = Vec2::new(1.0, 0.0);
        assert_relative_eq!(ccw_angle(&Point2::new(1.0, 0.0), &pivot, &x), 0.0);
        assert_relative_eq!(ccw_angle(&Point2::new(0.0, 1.0), &pivot, &x), FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(ccw_angle(&Point2::new(-1.0, 0.0), &pivot, &x), PI, epsilon = 1e-12);
        assert_relative_eq!(
            ccw_angle(&Point2::new(0.0, -1.0), &pivot, &x),
            3.0 * FRAC_PI_2,
            epsilon = 1e-12
        );
        assert_eq!(ccw_angle(&pivot, &pivot, &x), 0.0);
    }
}
