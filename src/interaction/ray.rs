//! Slab-method ray intersection against oriented surface bounds.

use bevy::prelude::*;

/// Intersect a world-space ray with an oriented box described by a transform
/// and half extents. Returns the nearest non-negative hit distance.
pub fn ray_surface_hit(
    origin: Vec3,
    direction: Vec3,
    transform: &GlobalTransform,
    half_extents: Vec3,
) -> Option<f32> {
    let inverse = transform.compute_matrix().inverse();
    let local_origin = inverse.transform_point3(origin);
    let local_direction = inverse.transform_vector3(direction);
    ray_aabb_hit(local_origin, local_direction, -half_extents, half_extents)
}

/// Axis-aligned slab test. `Some(t)` is the entry distance, or the exit
/// distance when the origin is inside the box.
pub fn ray_aabb_hit(origin: Vec3, direction: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;

    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];
        if d.abs() < f32::EPSILON {
            // Parallel to the slab: miss unless already between the planes.
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let (t0, t1) = ((min[axis] - o) * inv, (max[axis] - o) * inv);
        let (t0, t1) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
        t_near = t_near.max(t0);
        t_far = t_far.min(t1);
        if t_near > t_far {
            return None;
        }
    }

    if t_far < 0.0 {
        return None;
    }
    Some(if t_near >= 0.0 { t_near } else { t_far })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hits_a_box_straight_on() {
        let t = ray_aabb_hit(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::splat(-1.0),
            Vec3::splat(1.0),
        );
        assert_eq!(t, Some(4.0));
    }

    #[test]
    fn misses_a_box_off_axis() {
        let t = ray_aabb_hit(
            Vec3::new(5.0, 0.0, 5.0),
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::splat(-1.0),
            Vec3::splat(1.0),
        );
        assert_eq!(t, None);
    }

    #[test]
    fn origin_inside_returns_exit_distance() {
        let t = ray_aabb_hit(
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::splat(-1.0),
            Vec3::splat(1.0),
        );
        assert_eq!(t, Some(1.0));
    }

    #[test]
    fn box_fully_behind_the_ray_misses() {
        let t = ray_aabb_hit(
            Vec3::new(0.0, 0.0, -5.0),
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::splat(-1.0),
            Vec3::splat(1.0),
        );
        assert_eq!(t, None);
    }

    #[test]
    fn parallel_ray_between_slabs_still_hits() {
        let t = ray_aabb_hit(
            Vec3::new(0.5, 0.0, 5.0),
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::splat(-1.0),
            Vec3::splat(1.0),
        );
        assert_eq!(t, Some(4.0));
    }

    #[test]
    fn rotated_surface_is_hit_through_its_transform() {
        // Quarter turn about Y: the box's local Z thickness now faces +X.
        let transform = GlobalTransform::from(
            Transform::from_translation(Vec3::new(3.0, 0.0, 0.0))
                .with_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)),
        );
        let t = ray_surface_hit(
            Vec3::ZERO,
            Vec3::X,
            &transform,
            Vec3::new(1.0, 1.0, 0.1),
        );
        assert!(t.is_some());
        assert!((t.unwrap() - 2.9).abs() < 1e-3);
    }
}
