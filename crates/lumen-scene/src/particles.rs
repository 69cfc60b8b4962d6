use glam::{Mat4, Quat, Vec2, Vec3};
use lumen_host::{ParticleSystem, Pose};
use lumen_mesh::{MeshBuffer, MeshFlags};
use lumen_shader::{ParticleContext, ShaderInfo};
use tracing::{debug, warn};

use crate::frustum::Frustum;
use crate::scene::{ObjectId, Scene};

const QUAD_UVS: [Vec2; 4] = [
    Vec2::new(0.0, 1.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(0.0, 0.0),
];

/// Corner offsets of a camera-facing quad, counter-clockwise seen from the
/// camera.
fn billboard(cam_pos: Vec3, center: Vec3, radius: f32, roll: f32) -> ([Vec3; 4], Vec3) {
    let forward = (center - cam_pos).normalize_or(Vec3::NEG_Z);
    let mut right = forward.cross(Vec3::Y);
    if right.length_squared() < 1e-8 {
        right = Vec3::X;
    }
    let roll = Quat::from_axis_angle(forward, roll);
    let right = roll * right.normalize();
    let up = right.cross(forward).normalize();

    let r = right * radius;
    let u = up * radius;
    (
        [
            center - r - u,
            center + r - u,
            center + r + u,
            center - r + u,
        ],
        -forward,
    )
}

impl Scene<'_> {
    /// Adds the live particles of `system` visible from the camera as one
    /// mesh of camera-facing quads.
    pub fn add_particle_system(
        &mut self,
        system: &dyn ParticleSystem,
        cam_pos: Vec3,
        view_projection: &Mat4,
        near: f32,
        far: f32,
    ) -> Option<ObjectId> {
        let Some(material) = system.material() else {
            debug!("Particle system '{}' has no material", system.name());
            return None;
        };

        let frustum = Frustum::from_view_projection(view_projection);
        let visible: Vec<_> = system
            .particles()
            .iter()
            .filter(|p| {
                let distance = p.position.distance(cam_pos);
                distance + p.radius >= near
                    && distance - p.radius <= far
                    && frustum.intersects_sphere(p.position, p.radius)
            })
            .collect();
        if visible.is_empty() {
            return None;
        }

        let name = format!("{}_particles", system.name());
        let mut buffer = MeshBuffer::new(
            &name,
            visible.len() * 4,
            visible.len() * 2,
            MeshFlags::default(),
        );
        for particle in visible {
            let info = ShaderInfo {
                entity: None,
                sub_mesh: None,
                particle: Some(ParticleContext { system, particle }),
            };
            let Some(shader) = self.create_shader(material, &name, &info) else {
                continue;
            };
            let shader = buffer.add_shader(shader);

            let (corners, normal) =
                billboard(cam_pos, particle.position, particle.radius, particle.rotation);
            let base = buffer.vertex_offset();
            let tangent = (corners[1] - corners[0]).normalize_or_zero();
            for (corner, uv) in corners.into_iter().zip(QUAD_UVS) {
                buffer.add_vertex(corner, normal, tangent, uv);
            }
            for tri in [[0, 1, 2], [0, 2, 3]] {
                if let Err(e) = buffer.add_triangle(tri.map(|i| base + i), shader) {
                    warn!("Invalid particle quad in '{name}': {e}");
                }
            }
        }

        if buffer.triangle_count() == 0 {
            return None;
        }
        let mesh = self.add_mesh(buffer);
        Some(self.add_object(mesh, Pose::IDENTITY))
    }
}
