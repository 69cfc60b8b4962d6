use glam::{Vec2, Vec3, Vec4};

/// Iris UV projection for eye materials.
///
/// Eye meshes carry no usable iris UVs; the iris is projected onto the
/// eyeball with two planar projection vectors, and pupil dilation pulls
/// samples toward the iris center.
#[derive(Clone, Debug, PartialEq)]
pub struct EyeUvHandler {
    pub iris_proj_u: Vec4,
    pub iris_proj_v: Vec4,
    pub dilation: f32,
    pub max_dilation: f32,
    pub iris_uv_radius: f32,
}

impl EyeUvHandler {
    /// UV of an object-space eyeball position.
    pub fn transform_uv(&self, position: Vec3) -> Vec2 {
        let p = position.extend(1.0);
        let uv = Vec2::new(self.iris_proj_u.dot(p), self.iris_proj_v.dot(p));
        if self.iris_uv_radius <= 0.0 {
            return uv;
        }

        let offset = uv - Vec2::splat(0.5);
        let r = offset.length() / self.iris_uv_radius;
        if r <= 0.0 || r >= 1.0 {
            return uv;
        }
        // r' = r^(1 + d) keeps the iris border fixed and widens the pupil.
        let d = self.dilation.clamp(0.0, 1.0) * self.max_dilation;
        let scaled = r.powf(1.0 + d);
        Vec2::splat(0.5) + offset * (scaled / r)
    }
}
