//! Procedural host world used by the demo: a two-material crate on a floor,
//! a sky dome, a lamp and a puff of smoke.

use std::sync::Arc;

use glam::{Vec2, Vec3};
use lumen_host::{
    EntityData, HostTexture, ImageData, LightComponent, LightKind, Material, Model, ModelMesh,
    Particle, ParticleAlphaMode, ParticleSystemData, Pose, RenderComponent, SubMesh, TextureRef,
    Vertex, WorldData, slots,
};

/// A `size` x `size` two-color checkerboard.
fn checker(size: u32, a: [f32; 4], b: [f32; 4]) -> ImageData {
    let mut image = ImageData::solid(size, size, a);
    for y in 0..size {
        for x in 0..size {
            if ((x / 4) + (y / 4)) % 2 == 1 {
                image.pixels[(y * size + x) as usize] = b;
            }
        }
    }
    image
}

fn texture(name: &str, image: ImageData) -> TextureRef {
    TextureRef::new(name, Arc::new(HostTexture::flat(name, image)))
}

fn pbr(name: &str, albedo: ImageData) -> Arc<Material> {
    Arc::new(
        Material::new(name, "pbr")
            .with_texture(slots::ALBEDO_MAP, texture(&format!("demo/{name}"), albedo))
            .with_texture(
                slots::NORMAL_MAP,
                texture("demo/flat_normal", ImageData::solid(4, 4, [0.5, 0.5, 1.0, 1.0])),
            ),
    )
}

/// Axis-aligned quad facing `normal`, centered at `center`.
fn face(center: Vec3, normal: Vec3, half: f32, slot: u32) -> SubMesh {
    let tangent = if normal.y.abs() > 0.9 { Vec3::X } else { normal.cross(Vec3::Y).normalize() };
    let bitangent = normal.cross(tangent);
    let corner = |u: f32, v: f32| {
        Vertex::new(
            center + (tangent * u + bitangent * v) * half,
            normal,
            tangent,
            Vec2::new((u + 1.0) * 0.5, (v + 1.0) * 0.5),
        )
    };
    SubMesh {
        vertices: vec![corner(-1.0, -1.0), corner(1.0, -1.0), corner(1.0, 1.0), corner(-1.0, 1.0)],
        triangles: vec![0, 1, 2, 0, 2, 3],
        skin_texture_index: slot,
        ..SubMesh::default()
    }
}

fn single_group(name: &str, materials: Vec<Arc<Material>>, sub_meshes: Vec<SubMesh>) -> Arc<Model> {
    Arc::new(Model {
        name: name.to_string(),
        mesh_groups: vec![vec![Arc::new(ModelMesh {
            reference_id: None,
            sub_meshes: sub_meshes.into_iter().map(Arc::new).collect(),
        })]],
        base_mesh_groups: vec![0],
        materials,
        ..Model::default()
    })
}

/// Unit cube whose top and bottom use a metal material and whose sides use wood.
pub fn crate_model() -> Arc<Model> {
    let wood = pbr("crate_wood", checker(16, [0.55, 0.35, 0.18, 1.0], [0.45, 0.28, 0.12, 1.0]));
    let metal = pbr("crate_metal", ImageData::solid(4, 4, [0.6, 0.6, 0.65, 1.0]));
    let sides = [Vec3::X, Vec3::NEG_X, Vec3::Z, Vec3::NEG_Z]
        .into_iter()
        .map(|n| face(n * 0.5, n, 0.5, 0));
    let caps = [Vec3::Y, Vec3::NEG_Y].into_iter().map(|n| face(n * 0.5, n, 0.5, 1));
    single_group("crate", vec![wood, metal], sides.chain(caps).collect())
}

fn floor_model() -> Arc<Model> {
    let stone = pbr("floor_stone", checker(32, [0.7, 0.7, 0.7, 1.0], [0.3, 0.3, 0.3, 1.0]));
    single_group("floor", vec![stone], vec![face(Vec3::ZERO, Vec3::Y, 10.0, 0)])
}

fn sky_model() -> Arc<Model> {
    let face_image = |top: bool| {
        let color = if top { [0.35, 0.55, 0.95, 1.0] } else { [0.7, 0.8, 0.95, 1.0] };
        ImageData::solid(8, 8, color)
    };
    let cubemap = HostTexture::cubemap(
        "demo/sky",
        [
            face_image(false),
            face_image(false),
            face_image(true),
            face_image(false),
            face_image(false),
            face_image(false),
        ],
    );
    let sky = Arc::new(
        Material::new("sky", "skybox")
            .with_texture(slots::SKYBOX, TextureRef::new("demo/sky", Arc::new(cubemap))),
    );
    single_group("sky_dome", vec![sky], vec![face(Vec3::Y * 50.0, Vec3::NEG_Y, 50.0, 0)])
}

fn smoke() -> ParticleSystemData {
    let particles = (0..8)
        .map(|i| Particle {
            position: Vec3::new(1.2, 0.4 + i as f32 * 0.25, 0.3),
            radius: 0.15 + i as f32 * 0.03,
            rotation: i as f32 * 0.4,
            color: [200, 200, 200, 160],
        })
        .collect();
    ParticleSystemData {
        name: "smoke".to_string(),
        material: Some(pbr("smoke", ImageData::solid(4, 4, [0.8, 0.8, 0.8, 0.6]))),
        alpha_mode: ParticleAlphaMode::Translucent,
        particles,
    }
}

pub fn world() -> WorldData {
    let renderable = |index: u32, model: Arc<Model>, pose: Pose| EntityData {
        render: Some(RenderComponent::default()),
        ..EntityData::with_model(index, model, pose)
    };

    let floor = EntityData {
        world: true,
        ..renderable(0, floor_model(), Pose::IDENTITY)
    };
    let crate_entity = renderable(1, crate_model(), Pose::from_position(Vec3::new(0.0, 0.5, 0.0)));
    let sky = EntityData {
        skybox: true,
        ..renderable(2, sky_model(), Pose::IDENTITY)
    };
    let lamp = EntityData {
        local_index: 3,
        pose: Pose::from_position(Vec3::new(2.0, 3.0, 2.0)),
        light: Some(LightComponent {
            kind: LightKind::Point,
            color: Vec3::new(1.0, 0.95, 0.85),
            intensity: 40.0,
            intensity_lumen: 800.0,
            turned_on: true,
        }),
        ..EntityData::default()
    };
    let smoke = EntityData {
        local_index: 4,
        particles: Some(Box::new(smoke())),
        ..EntityData::default()
    };

    WorldData {
        entities: vec![floor, crate_entity, sky, lamp, smoke],
        visibility: None,
    }
}
