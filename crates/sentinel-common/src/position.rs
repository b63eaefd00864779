//! Positions, directions and orientation helpers.
//!
//! The simulation works in a right-handed, Y-up world (meters). Entities face
//! along their local +Z axis, so a yaw rotation of zero looks down +Z.

pub use glam::{Quat, Vec3};

/// World-space position.
pub type Position = Vec3;

/// World up axis.
pub const UP: Vec3 = Vec3::Y;

/// Straight-line distance between two positions.
#[must_use]
pub fn distance(a: Position, b: Position) -> f32 {
    a.distance(b)
}

/// Returns true when `a` and `b` are no further than `radius` apart.
#[must_use]
pub fn within_radius(a: Position, b: Position, radius: f32) -> bool {
    a.distance(b) <= radius
}

/// Horizontal direction from `from` toward `to`.
///
/// The offset is projected onto the ground plane before normalizing; `None`
/// when the two points are stacked vertically (or identical).
#[must_use]
pub fn planar_look_direction(from: Position, to: Position) -> Option<Vec3> {
    let offset = to - from;
    Vec3::new(offset.x, 0.0, offset.z).try_normalize()
}

/// Rotation that makes local +Z point along `forward`, keeping `UP` up.
#[must_use]
pub fn look_rotation(forward: Vec3) -> Quat {
    let yaw = forward.x.atan2(forward.z);
    Quat::from_rotation_y(yaw)
}

/// Turns `current` toward `look_at` by `dt * speed` of the remaining arc.
///
/// Only yaw is affected; a degenerate look direction leaves the rotation
/// untouched.
#[must_use]
pub fn orient_towards(
    current: Quat,
    from: Position,
    look_at: Position,
    dt: f32,
    speed: f32,
) -> Quat {
    match planar_look_direction(from, look_at) {
        Some(direction) => {
            let target = look_rotation(direction);
            current.slerp(target, (dt * speed).clamp(0.0, 1.0))
        },
        None => current,
    }
}

/// Spherical interpolation between two directions.
///
/// Both inputs are normalized first. `t` is clamped to `[0, 1]`; antiparallel
/// inputs rotate about an arbitrary perpendicular axis.
#[must_use]
pub fn slerp_directions(from: Vec3, to: Vec3, t: f32) -> Vec3 {
    let t = t.clamp(0.0, 1.0);
    let (a, b) = match (from.try_normalize(), to.try_normalize()) {
        (Some(a), Some(b)) => (a, b),
        (Some(a), None) => return a,
        (None, Some(b)) => return b,
        (None, None) => return Vec3::ZERO,
    };

    let angle = a.dot(b).clamp(-1.0, 1.0).acos();
    let axis = a
        .cross(b)
        .try_normalize()
        .unwrap_or_else(|| a.any_orthonormal_vector());

    Quat::from_axis_angle(axis, angle * t) * a
}
