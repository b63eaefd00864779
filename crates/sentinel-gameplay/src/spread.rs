//! Shot direction spread.

use sentinel_common::{slerp_directions, Vec3};
use std::f32::consts::TAU;

/// Uniformly distributed direction on the unit sphere.
pub fn random_unit_vector(rng: &mut fastrand::Rng) -> Vec3 {
    let z = rng.f32().mul_add(2.0, -1.0);
    let theta = rng.f32() * TAU;
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(r * theta.cos(), r * theta.sin(), z)
}

/// Direction of one bullet fired along `forward` with a cone of
/// `spread_angle` degrees.
///
/// The aim direction is slerped toward a random direction by
/// `spread_angle / 180`, so 0 fires straight and 180 fires anywhere.
pub fn shot_direction_within_spread(
    forward: Vec3,
    spread_angle: f32,
    rng: &mut fastrand::Rng,
) -> Vec3 {
    let ratio = spread_angle / 180.0;
    if ratio <= 0.0 {
        return forward.normalize_or_zero();
    }
    slerp_directions(forward, random_unit_vector(rng), ratio)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_unit_vector_is_unit() {
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..256 {
            let v = random_unit_vector(&mut rng);
            assert!((v.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_zero_spread_fires_straight() {
        let mut rng = fastrand::Rng::with_seed(1);
        let dir = shot_direction_within_spread(Vec3::new(0.0, 0.0, 3.0), 0.0, &mut rng);
        assert_eq!(dir, Vec3::Z);
    }

    #[test]
    fn test_spread_stays_inside_cone() {
        let mut rng = fastrand::Rng::with_seed(42);
        // 18 degrees of spread moves at most a tenth of the arc toward the
        // random direction, i.e. 18 degrees away from forward.
        let max_angle = 18.0_f32.to_radians() + 1e-3;
        for _ in 0..256 {
            let dir = shot_direction_within_spread(Vec3::Z, 18.0, &mut rng);
            assert!(dir.angle_between(Vec3::Z) <= max_angle);
        }
    }
}
