use nalgebra::{Isometry3, Point3, UnitQuaternion, Vector3};

pub type Real = f64;

pub type Vec3 = Vector3<Real>;
pub type Pt3 = Point3<Real>;
pub type Iso3 = Isometry3<Real>;
pub type UnitQuat = UnitQuaternion<Real>;

pub fn deg_to_rad(deg: Real) -> Real {
    deg * std::f64::consts::PI / 180.0
}

pub fn rad_to_deg(rad: Real) -> Real {
    rad * 180.0 / std::f64::consts::PI
}

/// Rotation that takes the +Z axis onto `dir` (which need not be unit length).
///
/// Falls back to identity for a near-zero direction.
pub fn rotation_z_to(dir: &Vec3) -> UnitQuat {
    let n = dir.norm();
    if n < 1e-12 {
        return UnitQuat::identity();
    }
    UnitQuat::rotation_between(&Vec3::z(), &(dir / n)).unwrap_or_else(|| {
        // Antiparallel case: 180 degrees about any axis orthogonal to Z.
        UnitQuat::from_axis_angle(&Vec3::x_axis(), std::f64::consts::PI)
    })
}
