//! Starfield backdrop: a deterministic point scatter on a far shell.

use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::mesh::PrimitiveTopology;
use bevy::render::view::NoFrustumCulling;

use crate::constants::scene::{STAR_COUNT, STARFIELD_RADIUS, STARFIELD_SEED};

#[derive(Component)]
pub struct Starfield;

pub fn spawn_starfield(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let mut mesh = Mesh::new(
        PrimitiveTopology::PointList,
        RenderAssetUsages::RENDER_WORLD,
    );
    mesh.insert_attribute(
        Mesh::ATTRIBUTE_POSITION,
        scatter_shell(STAR_COUNT, STARFIELD_RADIUS, STARFIELD_SEED),
    );

    let material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.9, 0.92, 1.0),
        unlit: true,
        ..default()
    });

    commands.spawn((
        Mesh3d(meshes.add(mesh)),
        MeshMaterial3d(material),
        Transform::IDENTITY,
        NoFrustumCulling,
        Starfield,
    ));
}

/// Hash-scattered points on a sphere shell. Deterministic so every visit to
/// the gallery shows the same sky.
fn scatter_shell(count: usize, radius: f32, seed: u32) -> Vec<[f32; 3]> {
    let mut points = Vec::with_capacity(count);
    for index in 0..count as u32 {
        let a = hash_to_unit(seed.wrapping_add(index.wrapping_mul(2)));
        let b = hash_to_unit(seed.wrapping_add(index.wrapping_mul(2).wrapping_add(1)));

        // Uniform shell distribution: azimuth from a, cos(polar) from b.
        let azimuth = a * std::f32::consts::TAU;
        let cos_polar = b * 2.0 - 1.0;
        let sin_polar = (1.0 - cos_polar * cos_polar).sqrt();

        points.push([
            radius * sin_polar * azimuth.cos(),
            radius * cos_polar,
            radius * sin_polar * azimuth.sin(),
        ]);
    }
    points
}

/// 32-bit integer hash mapped to `[0, 1)`.
fn hash_to_unit(mut x: u32) -> f32 {
    x ^= x >> 16;
    x = x.wrapping_mul(0x7feb_352d);
    x ^= x >> 15;
    x = x.wrapping_mul(0x846c_a68b);
    x ^= x >> 16;
    (x >> 8) as f32 / (1u32 << 24) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scatter_is_deterministic() {
        assert_eq!(scatter_shell(64, 10.0, 7), scatter_shell(64, 10.0, 7));
    }

    #[test]
    fn points_lie_on_the_shell() {
        for p in scatter_shell(128, 50.0, 3) {
            let length = Vec3::from(p).length();
            assert!((length - 50.0).abs() < 1e-3);
        }
    }

    #[test]
    fn hash_stays_in_unit_range() {
        for i in 0..1000 {
            let v = hash_to_unit(i);
            assert!((0.0..1.0).contains(&v));
        }
    }
}
