//! Scene camera.

use glam::{Mat4, Quat, Vec3};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PanoramaType {
    #[default]
    Equirectangular,
    FisheyeEquidistant,
    FisheyeEquisolid,
    Mirrorball,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CameraType {
    #[default]
    Perspective,
    Orthographic,
    Panorama(PanoramaType),
}

/// Camera the renderer shoots primary rays from.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub rotation: Quat,
    pub kind: CameraType,
    /// Near clip plane distance (always positive).
    pub near: f32,
    /// Far clip plane distance (always positive, > near).
    pub far: f32,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub width: u32,
    pub height: u32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            kind: CameraType::Perspective,
            near: 0.1,
            far: 1000.0,
            fov: 90f32.to_radians(),
            width: 1280,
            height: 720,
        }
    }
}

impl Camera {
    pub fn set_resolution(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Sets the vertical field of view from degrees.
    pub fn set_fov_degrees(&mut self, fov: f32) {
        self.fov = fov.to_radians();
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }

    /// Looks down -Z with +Y up when unrotated.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn view_matrix(&self) -> Mat4 {
        (Mat4::from_translation(self.position) * Mat4::from_quat(self.rotation)).inverse()
    }

    /// Standard-depth projection (near -> 0, far -> 1).
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect_ratio(), self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fov_stored_in_radians() {
        let mut cam = Camera::default();
        cam.set_fov_degrees(60.0);
        assert!((cam.fov - std::f32::consts::FRAC_PI_3).abs() < 1e-6);
    }

    #[test]
    fn test_view_matrix_moves_world_opposite() {
        let cam = Camera {
            position: Vec3::new(0.0, 0.0, 5.0),
            ..Camera::default()
        };
        let p = cam.view_matrix().transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(0.0, 0.0, -5.0)).length() < 1e-5);
    }

    #[test]
    fn test_aspect_ratio() {
        let mut cam = Camera::default();
        cam.set_resolution(512, 256);
        assert_eq!(cam.aspect_ratio(), 2.0);
    }
}
