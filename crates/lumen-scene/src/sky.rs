use glam::Vec3;
use lumen_host::{Entity, Pose, RenderLayer, SkyCamera};
use tracing::debug;

use crate::scene::{EntityPlacement, ObjectId, Scene};

/// Pose of a 3D-skybox entity in the main world. The sky camera's origin
/// maps to the world origin and distances grow by the sky scale.
pub fn sky_pose(sky: &SkyCamera, pose: Pose) -> Pose {
    Pose {
        position: (pose.position - sky.origin) * sky.scale,
        rotation: pose.rotation,
        scale: pose.scale * sky.scale,
    }
}

impl Scene<'_> {
    /// Adds the drawable skybox-layer entities, scaled up around the sky
    /// camera.
    pub fn add_3d_skybox(
        &mut self,
        sky: &SkyCamera,
        sky_entities: &[&dyn Entity],
        cam_pos: Vec3,
    ) -> Vec<ObjectId> {
        // Draw distances are measured inside the miniature.
        let sky_cam_pos = sky.origin + cam_pos / sky.scale.max(f32::EPSILON);
        let mut objects = Vec::new();
        for &entity in sky_entities {
            let Some(render) = entity.render_component() else {
                continue;
            };
            if render.layer != RenderLayer::Skybox
                || !render.should_draw(entity.pose().position, sky_cam_pos)
            {
                continue;
            }
            let placement = EntityPlacement {
                pose: sky_pose(sky, entity.pose()),
                name_suffix: "_3dsky",
                use_cache: true,
            };
            if let Some(object) = self.place_entity(entity, placement, None, None, None) {
                objects.push(object);
            }
        }
        debug!("Added {} 3D skybox objects", objects.len());
        objects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn test_sky_pose_scales_around_origin() {
        let sky = SkyCamera {
            origin: Vec3::new(100.0, 0.0, 0.0),
            scale: 16.0,
        };
        let rotation = Quat::from_rotation_y(0.5);
        let pose = Pose {
            position: Vec3::new(101.0, 2.0, 0.0),
            rotation,
            scale: Vec3::splat(2.0),
        };
        let out = sky_pose(&sky, pose);
        assert_eq!(out.position, Vec3::new(16.0, 32.0, 0.0));
        assert_eq!(out.rotation, rotation);
        assert_eq!(out.scale, Vec3::splat(32.0));
    }
}
