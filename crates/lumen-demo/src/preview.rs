//! Scanline preview backend.
//!
//! Rasterizes the finalized scene with Lambert shading against its lights.
//! Bake modes draw the bake target's UV layout instead of a camera view.

use glam::{Vec2, Vec3, Vec4Swizzles};
use lumen_host::ImageData;
use lumen_scene::{
    FinalizedScene, JobControl, Light, LightType, RenderError, RenderOutput, Renderer,
};

const BACKGROUND: [f32; 4] = [0.05, 0.05, 0.08, 1.0];
const AMBIENT: f32 = 0.15;
/// Maps lumen and lux to preview brightness.
const LIGHT_SCALE: f32 = 0.01;

pub struct PreviewRenderer;

impl Renderer for PreviewRenderer {
    fn render(
        &self,
        scene: &FinalizedScene,
        control: &JobControl,
    ) -> Result<RenderOutput, RenderError> {
        let mut target = Target::new(scene.camera.width, scene.camera.height);
        if scene.settings.render_mode.is_bake_mode() {
            draw_bake_layout(scene, &mut target);
            control.set_progress(1.0);
        } else {
            draw_camera_view(scene, &mut target, control)?;
        }
        Ok(RenderOutput {
            image: target.image,
        })
    }
}

struct Target {
    image: ImageData,
    depth: Vec<f32>,
}

impl Target {
    fn new(width: u32, height: u32) -> Self {
        Self {
            image: ImageData::solid(width, height, BACKGROUND),
            depth: vec![f32::INFINITY; (width * height) as usize],
        }
    }

    /// Fills the triangle `p` (pixel x, pixel y, depth) with the color
    /// `shade` returns for its barycentric weights.
    fn fill(&mut self, p: [Vec3; 3], shade: impl Fn(Vec3) -> [f32; 4]) {
        let edge = |a: Vec3, b: Vec3, c: Vec2| (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
        let area = edge(p[0], p[1], p[2].truncate());
        if area.abs() < f32::EPSILON {
            return;
        }
        let (w, h) = (self.image.width as f32, self.image.height as f32);
        let min = p[0].min(p[1]).min(p[2]).truncate().max(Vec2::ZERO);
        let max = p[0].max(p[1]).max(p[2]).truncate().min(Vec2::new(w - 1.0, h - 1.0));
        if min.x > max.x || min.y > max.y {
            return;
        }
        for y in min.y as u32..=max.y as u32 {
            for x in min.x as u32..=max.x as u32 {
                let c = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let weights = Vec3::new(edge(p[1], p[2], c), edge(p[2], p[0], c), edge(p[0], p[1], c)) / area;
                if weights.min_element() < 0.0 {
                    continue;
                }
                let z = weights.dot(Vec3::new(p[0].z, p[1].z, p[2].z));
                let index = (y * self.image.width + x) as usize;
                if z < self.depth[index] {
                    self.depth[index] = z;
                    self.image.pixels[index] = shade(weights);
                }
            }
        }
    }
}

fn lambert(lights: &[Light], position: Vec3, normal: Vec3) -> f32 {
    let direct: f32 = lights
        .iter()
        .map(|light| {
            let (to_light, falloff) = match light.kind {
                LightType::Directional => (light.rotation * Vec3::Z, 1.0),
                LightType::Point | LightType::Spot { .. } => {
                    let offset = light.position - position;
                    (offset, 1.0 / offset.length_squared().max(1.0))
                }
            };
            normal.dot(to_light.normalize_or_zero()).max(0.0) * falloff * light.intensity * LIGHT_SCALE
        })
        .sum();
    (AMBIENT + direct).min(1.0)
}

fn draw_camera_view(
    scene: &FinalizedScene,
    target: &mut Target,
    control: &JobControl,
) -> Result<(), RenderError> {
    let view_projection = scene.camera.view_projection();
    let (w, h) = (target.image.width as f32, target.image.height as f32);
    let total = scene.objects.len().max(1) as f32;

    for (i, object) in scene.objects.iter().enumerate() {
        control.check()?;
        let Some(mesh) = scene.mesh(object.mesh) else {
            continue;
        };
        let model = object.pose.to_matrix();
        let normal_matrix = model.inverse().transpose();
        let positions = mesh.positions();
        let normals = mesh.normals();

        for triangle in mesh.triangles() {
            let mut screen = [Vec3::ZERO; 3];
            let mut world = [Vec3::ZERO; 3];
            let mut visible = true;
            for (k, &vi) in triangle.indices.iter().enumerate() {
                let p = model.transform_point3(positions[vi as usize]);
                let clip = view_projection * p.extend(1.0);
                if clip.w <= 0.0 {
                    visible = false;
                    break;
                }
                let ndc = clip.xyz() / clip.w;
                screen[k] = Vec3::new((ndc.x + 1.0) * 0.5 * w, (1.0 - ndc.y) * 0.5 * h, ndc.z);
                world[k] = p;
            }
            if !visible {
                continue;
            }
            let [a, b, c] = triangle.indices.map(|vi| {
                normal_matrix
                    .transform_vector3(normals[vi as usize])
                    .normalize_or_zero()
            });
            target.fill(screen, |bary| {
                let position = world[0] * bary.x + world[1] * bary.y + world[2] * bary.z;
                let normal = (a * bary.x + b * bary.y + c * bary.z).normalize_or_zero();
                let l = lambert(&scene.lights, position, normal);
                [l, l, l, 1.0]
            });
        }
        control.set_progress((i + 1) as f32 / total);
    }
    Ok(())
}

/// Draws every bake-target triangle at its (lightmap) UV position.
fn draw_bake_layout(scene: &FinalizedScene, target: &mut Target) {
    let Some(mesh) = scene
        .bake_target
        .and_then(|id| scene.object(id))
        .and_then(|object| scene.mesh(object.mesh))
    else {
        return;
    };
    let size = Vec2::new(target.image.width as f32, target.image.height as f32);
    let lightmap = mesh.lightmap_uvs();
    let uvs = mesh.uvs();
    for (t, triangle) in mesh.triangles().iter().enumerate() {
        let corner = |k: usize| {
            let uv = lightmap
                .get(t * 3 + k)
                .copied()
                .unwrap_or(uvs[triangle.indices[k] as usize]);
            (uv * size).extend(0.0)
        };
        target.fill([corner(0), corner(1), corner(2)], |_| [1.0; 4]);
    }
}
