mod common;

use std::collections::HashMap;
use std::sync::Arc;

use glam::{Vec2, Vec3};
use lumen_config::{Config, RenderMode};
use lumen_host::{EntityData, Pose, SubMesh};
use lumen_scene::{LIGHTMAP_UV_SET, ObjectId, Scene};

use common::{Assets, model, model_with, pbr, quad};

fn scene(assets: &Assets, mode: RenderMode) -> Scene<'_> {
    let mut config = Config::default();
    config.render.render_mode = mode;
    Scene::from_config(&config, assets.services())
}

#[test]
fn test_ao_target_is_registered_before_environment() {
    let assets = Assets::new();
    let mut scene = scene(&assets, RenderMode::BakeAmbientOcclusion);
    let statue = model(
        "statue",
        vec![pbr("wood", "wood"), pbr("stone", "stone"), pbr("wood2", "wood")],
    );

    let target = scene.set_ao_bake_target(&statue, 1).unwrap();

    assert_eq!(target, ObjectId(0));
    assert_eq!(scene.bake_target(), Some(target));
    assert_eq!(scene.objects().len(), 2);

    let target_mesh = scene.mesh(scene.objects()[0].mesh).unwrap();
    assert_eq!(target_mesh.name, "ao_target");
    assert_eq!(target_mesh.triangle_count(), 2);
    assert_eq!(target_mesh.shaders()[0].kind.albedo().map, assets.path("stone"));

    let environment = scene.mesh(scene.objects()[1].mesh).unwrap();
    assert_eq!(environment.name, "ao_mesh");
    assert_eq!(environment.triangle_count(), 4);
    assert!(scene.objects().iter().all(|o| o.pose == Pose::IDENTITY));
}

#[test]
fn test_ao_target_without_environment() {
    let assets = Assets::new();
    let mut scene = scene(&assets, RenderMode::BakeAmbientOcclusion);
    let single = model("single", vec![pbr("wood", "wood")]);
    assert!(scene.set_ao_bake_target(&single, 0).is_some());
    assert_eq!(scene.objects().len(), 1);
    assert_eq!(scene.meshes().len(), 1);
}

#[test]
fn test_ao_target_with_no_triangles() {
    let assets = Assets::new();
    let mut scene = scene(&assets, RenderMode::BakeAmbientOcclusion);
    let statue = model("statue", vec![pbr("wood", "wood"), pbr("stone", "stone")]);
    assert!(scene.set_ao_bake_target(&statue, 5).is_none());
    assert!(scene.objects().is_empty());
    assert_eq!(scene.bake_target(), None);
}

fn lightmapped_sub_mesh() -> Arc<SubMesh> {
    let mut sub_mesh = (*quad(0)).clone();
    let layout = vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(0.5, 0.0),
        Vec2::new(0.5, 0.5),
        Vec2::new(0.0, 0.5),
    ];
    sub_mesh.uv_sets = HashMap::from([(LIGHTMAP_UV_SET.to_string(), layout)]);
    Arc::new(sub_mesh)
}

#[test]
fn test_lightmap_target_receives_uvs() {
    let assets = Assets::new();
    let mut scene = scene(&assets, RenderMode::BakeDiffuseLighting);
    let floor = model_with(
        "floor",
        vec![pbr("wood", "wood"), pbr("stone", "stone")],
        vec![lightmapped_sub_mesh(), quad(1)],
    );
    let mut entity = EntityData::with_model(4, floor, Pose::from_position(Vec3::Y));
    entity.lightmap = true;

    let target = scene.set_lightmap_bake_target(&entity).unwrap();

    assert_eq!(scene.bake_target(), Some(target));
    let object = scene.object(target).unwrap();
    assert_eq!(object.pose.position, Vec3::Y);
    let mesh = scene.mesh(object.mesh).unwrap();
    assert_eq!(mesh.triangle_count(), 4);
    let uvs = mesh.lightmap_uvs();
    assert_eq!(uvs.len(), 12);
    assert_eq!(&uvs[..3], &[Vec2::ZERO, Vec2::new(0.5, 0.0), Vec2::new(0.5, 0.5)]);
    assert_eq!(uvs[5], Vec2::new(0.0, 0.5));
    // The second sub-mesh has no lightmap layout.
    assert!(uvs[6..].iter().all(|&uv| uv == Vec2::ZERO));
    // Lightmap targets are never shared through the cache.
    assert!(scene.cache().is_empty());
}

#[test]
fn test_lightmap_uvs_skip_unshaded_sub_meshes() {
    let assets = Assets::new();
    let mut scene = scene(&assets, RenderMode::BakeDiffuseLighting);
    let bare = Arc::new(lumen_host::Material::new("bare", "pbr"));
    let floor = model_with(
        "floor",
        vec![bare, pbr("wood", "wood")],
        vec![quad(0), lightmapped_sub_mesh_in_slot(1)],
    );
    let mut entity = EntityData::with_model(4, floor, Pose::IDENTITY);
    entity.lightmap = true;

    let target = scene.set_lightmap_bake_target(&entity).unwrap();
    let mesh = scene.mesh(scene.object(target).unwrap().mesh).unwrap();
    assert_eq!(mesh.triangle_count(), 2);
    assert_eq!(mesh.lightmap_uvs()[1], Vec2::new(0.5, 0.0));
}

fn lightmapped_sub_mesh_in_slot(slot: u32) -> Arc<SubMesh> {
    let mut sub_mesh = (*lightmapped_sub_mesh()).clone();
    sub_mesh.skin_texture_index = slot;
    Arc::new(sub_mesh)
}

#[test]
fn test_lightmap_target_requires_lightmap_data() {
    let assets = Assets::new();
    let mut scene = scene(&assets, RenderMode::BakeDiffuseLighting);
    let entity = EntityData::with_model(
        4,
        model("floor", vec![pbr("wood", "wood")]),
        Pose::IDENTITY,
    );
    assert!(scene.set_lightmap_bake_target(&entity).is_none());
    assert!(scene.objects().is_empty());
    assert_eq!(scene.bake_target(), None);
}
