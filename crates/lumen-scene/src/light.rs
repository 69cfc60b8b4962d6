use glam::{Quat, Vec3};
use lumen_host::{Entity, HostWorld, LightKind};
use tracing::debug;

use crate::populate::EntityFilter;
use crate::scene::Scene;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LightType {
    /// Cone light. Angles are full cone angles in radians.
    Spot { inner_cone: f32, outer_cone: f32 },
    Point,
    Directional,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Light {
    pub kind: LightType,
    pub position: Vec3,
    pub rotation: Quat,
    pub color: Vec3,
    pub intensity: f32,
}

impl Light {
    /// Build a renderer light from a host light entity. Spot and point
    /// lights use luminous power, directional lights plain intensity.
    pub fn from_entity(entity: &dyn Entity) -> Option<Self> {
        let light = entity.light()?;
        let pose = entity.pose();
        let (kind, intensity) = match light.kind {
            LightKind::Spot {
                inner_cutoff_deg,
                outer_cutoff_deg,
            } => (
                LightType::Spot {
                    inner_cone: inner_cutoff_deg.to_radians() * 2.0,
                    outer_cone: outer_cutoff_deg.to_radians() * 2.0,
                },
                light.intensity_lumen,
            ),
            LightKind::Point => (LightType::Point, light.intensity_lumen),
            LightKind::Directional => (LightType::Directional, light.intensity),
        };
        Some(Self {
            kind,
            position: pose.position,
            rotation: pose.rotation,
            color: light.color,
            intensity,
        })
    }
}

/// Adds every switched-on light of `world` accepted by `filter`.
pub fn setup_light_sources(
    scene: &mut Scene<'_>,
    world: &dyn HostWorld,
    filter: Option<&EntityFilter<'_>>,
) {
    for entity in world.entities() {
        let Some(component) = entity.light() else {
            continue;
        };
        if !component.turned_on || filter.is_some_and(|f| !f(entity)) {
            continue;
        }
        if let Some(light) = Light::from_entity(entity) {
            scene.add_light(light);
        }
    }
    debug!("Scene has {} light sources", scene.lights().len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_host::{EntityData, LightComponent, Pose};

    fn light_entity(kind: LightKind) -> EntityData {
        EntityData {
            pose: Pose::from_position(Vec3::new(1.0, 2.0, 3.0)),
            light: Some(LightComponent {
                kind,
                color: Vec3::ONE,
                intensity: 5.0,
                intensity_lumen: 800.0,
                turned_on: true,
            }),
            ..EntityData::default()
        }
    }

    #[test]
    fn test_spot_cone_is_doubled_radians() {
        let entity = light_entity(LightKind::Spot {
            inner_cutoff_deg: 15.0,
            outer_cutoff_deg: 30.0,
        });
        let light = Light::from_entity(&entity).unwrap();
        let LightType::Spot {
            inner_cone,
            outer_cone,
        } = light.kind
        else {
            panic!("expected spot light");
        };
        assert!((inner_cone - 30f32.to_radians()).abs() < 1e-6);
        assert!((outer_cone - 60f32.to_radians()).abs() < 1e-6);
        assert_eq!(light.intensity, 800.0);
        assert_eq!(light.position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_directional_uses_plain_intensity() {
        let light = Light::from_entity(&light_entity(LightKind::Directional)).unwrap();
        assert_eq!(light.kind, LightType::Directional);
        assert_eq!(light.intensity, 5.0);
    }

    #[test]
    fn test_entity_without_light() {
        assert!(Light::from_entity(&EntityData::default()).is_none());
    }
}
