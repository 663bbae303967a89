//! Mathematical types shared between the scene core and the host.
//!
//! Conventions used throughout the workspace:
//! - Right-handed axes, +Y up, +Z is an object's forward axis.
//! - Euler angles are in **degrees**, stored as `(pitch, yaw, roll)` =
//!   rotation about `(X, Y, Z)`, and composed intrinsically yaw → pitch → roll.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Tolerance used by the `approx_eq` helpers and degenerate-input checks.
pub const EPSILON: f32 = 1e-5;

/// 3D Vector - position, offset, direction
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Vec3 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
    /// Z component
    pub z: f32,
}

impl Vec3 {
    /// Creates a new Vec3
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Unit X vector
    pub const X: Self = Self::new(1.0, 0.0, 0.0);

    /// Unit Y vector
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);

    /// Unit Z vector
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    /// Converts to array
    #[must_use]
    pub const fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    /// Creates from array
    #[must_use]
    pub const fn from_array(arr: [f32; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }

    /// Dot product
    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product
    #[must_use]
    pub fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Length squared (avoids sqrt)
    #[must_use]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    /// Length
    #[must_use]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Distance to another point
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    /// Unit vector in the same direction, or `None` for a (near) zero vector.
    #[must_use]
    pub fn try_normalize(self) -> Option<Self> {
        let len = self.length();
        if len <= EPSILON {
            None
        } else {
            Some(self * (1.0 / len))
        }
    }

    /// Component-wise comparison within `eps`.
    #[must_use]
    pub fn approx_eq(self, other: Self, eps: f32) -> bool {
        (self.x - other.x).abs() <= eps
            && (self.y - other.y).abs() <= eps
            && (self.z - other.z).abs() <= eps
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from(arr: [f32; 3]) -> Self {
        Self::from_array(arr)
    }
}

impl From<Vec3> for [f32; 3] {
    fn from(v: Vec3) -> Self {
        v.to_array()
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl std::ops::Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl std::ops::Mul<f32> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Quaternion for rotations
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct Quaternion {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
    /// Z component
    pub z: f32,
    /// W component
    pub w: f32,
}

impl Quaternion {
    /// Creates a new quaternion
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Identity rotation
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// Rotation of `radians` about `axis`. The axis does not need to be
    /// normalized; a zero axis yields the identity.
    #[must_use]
    pub fn from_axis_angle(axis: Vec3, radians: f32) -> Self {
        let Some(axis) = axis.try_normalize() else {
            return Self::IDENTITY;
        };
        let (s, c) = (radians * 0.5).sin_cos();
        Self::new(axis.x * s, axis.y * s, axis.z * s, c)
    }

    /// Builds a rotation from Euler angles in degrees.
    ///
    /// `degrees` is `(pitch, yaw, roll)`: rotation about X, Y and Z.
    /// The result is `yaw * pitch * roll`, i.e. intrinsic Y, then X, then Z.
    #[must_use]
    pub fn from_euler_degrees(degrees: Vec3) -> Self {
        let pitch = Self::from_axis_angle(Vec3::X, degrees.x.to_radians());
        let yaw = Self::from_axis_angle(Vec3::Y, degrees.y.to_radians());
        let roll = Self::from_axis_angle(Vec3::Z, degrees.z.to_radians());
        yaw * pitch * roll
    }

    /// Rotation whose +Z axis points along `forward` and whose +Y axis is as
    /// close to `up` as possible.
    ///
    /// Returns `None` when `forward` is (near) zero. When `forward` is parallel
    /// to `up`, another world axis is used as the up hint.
    #[must_use]
    pub fn look_rotation(forward: Vec3, up: Vec3) -> Option<Self> {
        let f = forward.try_normalize()?;
        let right = match up.cross(f).try_normalize() {
            Some(r) => r,
            None => {
                let hint = if f.z.abs() < 0.9 { Vec3::Z } else { Vec3::X };
                hint.cross(f).try_normalize()?
            }
        };
        let u = f.cross(right);
        Some(Self::from_basis(right, u, f))
    }

    /// Converts an orthonormal basis (matrix columns) to a quaternion.
    fn from_basis(r: Vec3, u: Vec3, f: Vec3) -> Self {
        let (m00, m01, m02) = (r.x, u.x, f.x);
        let (m10, m11, m12) = (r.y, u.y, f.y);
        let (m20, m21, m22) = (r.z, u.z, f.z);
        let trace = m00 + m11 + m22;

        let q = if trace > 0.0 {
            let s = (trace + 1.0).sqrt() * 2.0;
            Self::new((m21 - m12) / s, (m02 - m20) / s, (m10 - m01) / s, 0.25 * s)
        } else if m00 > m11 && m00 > m22 {
            let s = (1.0 + m00 - m11 - m22).sqrt() * 2.0;
            Self::new(0.25 * s, (m01 + m10) / s, (m02 + m20) / s, (m21 - m12) / s)
        } else if m11 > m22 {
            let s = (1.0 + m11 - m00 - m22).sqrt() * 2.0;
            Self::new((m01 + m10) / s, 0.25 * s, (m12 + m21) / s, (m02 - m20) / s)
        } else {
            let s = (1.0 + m22 - m00 - m11).sqrt() * 2.0;
            Self::new((m02 + m20) / s, (m12 + m21) / s, 0.25 * s, (m10 - m01) / s)
        };
        q.normalize()
    }

    /// Dot product of the four components.
    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Inverse rotation (for unit quaternions).
    #[must_use]
    pub const fn conjugate(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Unit-length copy. A zero quaternion normalizes to the identity.
    #[must_use]
    pub fn normalize(self) -> Self {
        let len = self.dot(self).sqrt();
        if len <= EPSILON {
            Self::IDENTITY
        } else {
            let inv = 1.0 / len;
            Self::new(self.x * inv, self.y * inv, self.z * inv, self.w * inv)
        }
    }

    /// The rotated +Z axis.
    #[must_use]
    pub fn forward(self) -> Vec3 {
        self * Vec3::Z
    }

    /// Whether both quaternions describe the same rotation within `eps`.
    ///
    /// `q` and `-q` are treated as equal.
    #[must_use]
    pub fn approx_eq(self, other: Self, eps: f32) -> bool {
        (1.0 - self.dot(other).abs()) <= eps
    }

    /// Converts to array `[x, y, z, w]`
    #[must_use]
    pub const fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<[f32; 4]> for Quaternion {
    fn from(arr: [f32; 4]) -> Self {
        Self::new(arr[0], arr[1], arr[2], arr[3])
    }
}

impl From<Quaternion> for [f32; 4] {
    fn from(q: Quaternion) -> Self {
        q.to_array()
    }
}

/// Hamilton product: `a * b` applies `b` first, then `a`.
impl std::ops::Mul for Quaternion {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        )
    }
}

/// Rotates a vector.
impl std::ops::Mul<Vec3> for Quaternion {
    type Output = Vec3;
    fn mul(self, v: Vec3) -> Vec3 {
        let u = Vec3::new(self.x, self.y, self.z);
        let t = u.cross(v) * 2.0;
        v + t * self.w + u.cross(t)
    }
}

/// Rigid transform - translation + rotation.
///
/// Poses compose rotate-then-translate:
/// `compose(parent, child).t = parent.t + parent.q * child.t` and
/// `compose(parent, child).q = parent.q * child.q`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Pose {
    /// Translation
    pub t: Vec3,
    /// Rotation (unit quaternion)
    pub q: Quaternion,
}

impl Pose {
    /// Creates a new pose
    #[must_use]
    pub const fn new(t: Vec3, q: Quaternion) -> Self {
        Self { t, q }
    }

    /// Pose with a translation and no rotation.
    #[must_use]
    pub const fn from_translation(t: Vec3) -> Self {
        Self::new(t, Quaternion::IDENTITY)
    }

    /// Identity pose
    pub const IDENTITY: Self = Self::new(Vec3::ZERO, Quaternion::IDENTITY);

    /// Expresses `child` (given in this pose's local space) in the parent space.
    #[must_use]
    pub fn compose(self, child: Self) -> Self {
        Self::new(self.t + self.q * child.t, (self.q * child.q).normalize())
    }

    /// Maps a point from local space into the parent space.
    #[must_use]
    pub fn transform_point(self, point: Vec3) -> Vec3 {
        self.t + self.q * point
    }

    /// The pose that undoes this one.
    #[must_use]
    pub fn inverse(self) -> Self {
        let q = self.q.conjugate();
        Self::new(-(q * self.t), q)
    }

    /// Whether translation and rotation match within `eps`.
    #[must_use]
    pub fn approx_eq(self, other: Self, eps: f32) -> bool {
        self.t.approx_eq(other.t, eps) && self.q.approx_eq(other.q, eps)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn test_vec3_operations() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);

        let sum = a + b;
        assert_eq!(sum.x, 5.0);
        assert_eq!(sum.y, 7.0);
        assert_eq!(sum.z, 9.0);

        let dot = a.dot(b);
        assert_eq!(dot, 32.0); // 1*4 + 2*5 + 3*6

        assert_eq!(Vec3::X.cross(Vec3::Y), Vec3::Z);
    }

    #[test]
    fn test_vec3_bytemuck() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        let bytes: &[u8] = bytemuck::bytes_of(&v);
        assert_eq!(bytes.len(), 12); // 3 * 4 bytes

        let pose = Pose::IDENTITY;
        assert_eq!(bytemuck::bytes_of(&pose).len(), 28);
    }

    #[test]
    fn test_zero_vector_does_not_normalize() {
        assert!(Vec3::ZERO.try_normalize().is_none());
    }

    #[test]
    fn test_quaternion_rotates_vector() {
        let q = Quaternion::from_axis_angle(Vec3::Y, std::f32::consts::FRAC_PI_2);
        // +90 degrees about Y takes +Z to +X
        assert!((q * Vec3::Z).approx_eq(Vec3::X, EPS));
    }

    #[test]
    fn test_euler_degrees_convention() {
        let yaw = Quaternion::from_euler_degrees(Vec3::new(0.0, 90.0, 0.0));
        assert!(yaw.forward().approx_eq(Vec3::X, EPS));

        let pitch = Quaternion::from_euler_degrees(Vec3::new(90.0, 0.0, 0.0));
        // +90 degrees about X tips the forward axis down to -Y
        assert!(pitch.forward().approx_eq(-Vec3::Y, EPS));

        // yaw applied after pitch: forward pitched down stays down
        let both = Quaternion::from_euler_degrees(Vec3::new(90.0, 90.0, 0.0));
        assert!(both.forward().approx_eq(-Vec3::Y, EPS));
        assert!((both * Vec3::Y).approx_eq(Vec3::X, EPS));
    }

    #[test]
    fn test_look_rotation() {
        let q = Quaternion::look_rotation(Vec3::Z, Vec3::Y).unwrap();
        assert!(q.approx_eq(Quaternion::IDENTITY, EPS));

        let back = Quaternion::look_rotation(-Vec3::Z, Vec3::Y).unwrap();
        assert!(back.forward().approx_eq(-Vec3::Z, EPS));
        assert!((back * Vec3::Y).approx_eq(Vec3::Y, EPS));

        let dir = Vec3::new(1.0, -2.0, 0.5);
        let q = Quaternion::look_rotation(dir, Vec3::Y).unwrap();
        assert!(q.forward().approx_eq(dir.try_normalize().unwrap(), EPS));
    }

    #[test]
    fn test_look_rotation_parallel_to_up() {
        let q = Quaternion::look_rotation(Vec3::Y, Vec3::Y).unwrap();
        assert!(q.forward().approx_eq(Vec3::Y, EPS));
        assert!(Quaternion::look_rotation(Vec3::ZERO, Vec3::Y).is_none());
    }

    #[test]
    fn test_pose_compose_is_associative() {
        let a = Pose::new(
            Vec3::new(1.0, 2.0, 3.0),
            Quaternion::from_euler_degrees(Vec3::new(10.0, 45.0, -5.0)),
        );
        let b = Pose::new(
            Vec3::new(-0.5, 0.25, 2.0),
            Quaternion::from_euler_degrees(Vec3::new(-30.0, 5.0, 60.0)),
        );
        let c = Pose::new(
            Vec3::new(0.0, -1.0, 0.75),
            Quaternion::from_euler_degrees(Vec3::new(0.0, 120.0, 15.0)),
        );
        let point = Vec3::new(0.3, -0.7, 1.1);

        let left = a.compose(b).compose(c);
        let right = a.compose(b.compose(c));
        assert!(left
            .transform_point(point)
            .approx_eq(right.transform_point(point), EPS));
        assert!(left.approx_eq(right, EPS));
    }

    #[test]
    fn test_pose_inverse() {
        let p = Pose::new(
            Vec3::new(1.0, 1.6, -2.0),
            Quaternion::from_euler_degrees(Vec3::new(0.0, 30.0, 0.0)),
        );
        assert!(p.compose(p.inverse()).approx_eq(Pose::IDENTITY, EPS));
    }
}
