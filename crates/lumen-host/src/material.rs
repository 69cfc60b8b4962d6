//! Host materials: shader identifier, texture slots and a key-value data block.

use std::collections::HashMap;

use glam::{Vec3, Vec4};

use crate::texture::TextureRef;

/// Well-known texture slot names.
pub mod slots {
    pub const ALBEDO_MAP: &str = "albedo_map";
    pub const ALBEDO_MAP2: &str = "albedo_map2";
    pub const NORMAL_MAP: &str = "normal_map";
    pub const RMA_MAP: &str = "rma_map";
    pub const EMISSION_MAP: &str = "emission_map";
    pub const WRINKLE_STRETCH_MAP: &str = "wrinkle_stretch_map";
    pub const WRINKLE_COMPRESS_MAP: &str = "wrinkle_compress_map";
    pub const SKYBOX: &str = "skybox";
}

/// How the material's alpha channel is interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AlphaMode {
    #[default]
    Opaque,
    /// Alpha-tested against the material's cutoff.
    Mask,
    /// Alpha-blended.
    Blend,
}

/// A typed value stored in a [`DataBlock`].
#[derive(Clone, Debug, PartialEq)]
pub enum DataValue {
    Float(f32),
    Int(i32),
    Bool(bool),
    String(String),
    Vector(Vec3),
    Vector4(Vec4),
    /// 8-bit RGBA color.
    Color([u8; 4]),
    Block(DataBlock),
}

/// Nested key-value property storage of a material.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DataBlock {
    values: HashMap<String, DataValue>,
}

impl DataBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: DataValue) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: DataValue) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&DataValue> {
        self.values.get(key)
    }

    /// Float value; integers are widened.
    pub fn get_float(&self, key: &str) -> Option<f32> {
        match self.values.get(key)? {
            DataValue::Float(v) => Some(*v),
            DataValue::Int(v) => Some(*v as f32),
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str) -> Option<i32> {
        match self.values.get(key)? {
            DataValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Boolean flag; missing or non-boolean keys read as `false`.
    pub fn get_bool(&self, key: &str) -> bool {
        matches!(self.values.get(key), Some(DataValue::Bool(true)))
    }

    pub fn get_vector(&self, key: &str) -> Option<Vec3> {
        match self.values.get(key)? {
            DataValue::Vector(v) => Some(*v),
            _ => None,
        }
    }

    pub fn get_vector4(&self, key: &str) -> Option<Vec4> {
        match self.values.get(key)? {
            DataValue::Vector4(v) => Some(*v),
            _ => None,
        }
    }

    /// Color value normalized to `[0, 1]` RGB.
    pub fn get_color_rgb(&self, key: &str) -> Option<Vec3> {
        match self.values.get(key)? {
            DataValue::Color([r, g, b, _]) => Some(
                Vec3::new(f32::from(*r), f32::from(*g), f32::from(*b)) / 255.0,
            ),
            _ => None,
        }
    }

    pub fn get_block(&self, key: &str) -> Option<&DataBlock> {
        match self.values.get(key)? {
            DataValue::Block(b) => Some(b),
            _ => None,
        }
    }
}

/// A host material.
#[derive(Clone, Debug, Default)]
pub struct Material {
    pub name: String,
    /// Shader identifier (`"pbr"`, `"glass"`, `"eye"`, `"skybox"`, ...).
    pub shader: String,
    pub alpha_mode: AlphaMode,
    pub alpha_cutoff: f32,
    /// Texture references by slot name (see [`slots`]).
    pub textures: HashMap<String, TextureRef>,
    pub data: DataBlock,
}

impl Material {
    pub fn new(name: impl Into<String>, shader: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shader: shader.into(),
            alpha_cutoff: 0.5,
            ..Self::default()
        }
    }

    /// Builder-style texture slot assignment.
    pub fn with_texture(mut self, slot: impl Into<String>, texture: TextureRef) -> Self {
        self.textures.insert(slot.into(), texture);
        self
    }

    /// Builder-style data value.
    pub fn with_data(mut self, key: impl Into<String>, value: DataValue) -> Self {
        self.data.insert(key, value);
        self
    }

    pub fn texture(&self, slot: &str) -> Option<&TextureRef> {
        self.textures.get(slot)
    }

    /// Case-insensitive shader identifier comparison.
    pub fn is_shader(&self, identifier: &str) -> bool {
        self.shader.eq_ignore_ascii_case(identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shader_identifier_case_insensitive() {
        let mat = Material::new("m", "Glass");
        assert!(mat.is_shader("glass"));
        assert!(!mat.is_shader("pbr"));
    }

    #[test]
    fn test_typed_lookups() {
        let block = DataBlock::new()
            .with("roughness_factor", DataValue::Float(0.25))
            .with("method", DataValue::Int(3))
            .with("black_to_alpha", DataValue::Bool(true))
            .with("emission_factor", DataValue::Vector(Vec3::ONE))
            .with("color", DataValue::Color([255, 0, 51, 255]));

        assert_eq!(block.get_float("roughness_factor"), Some(0.25));
        assert_eq!(block.get_float("method"), Some(3.0));
        assert_eq!(block.get_int("method"), Some(3));
        assert!(block.get_bool("black_to_alpha"));
        assert!(!block.get_bool("missing"));
        assert_eq!(block.get_vector("emission_factor"), Some(Vec3::ONE));
        assert_eq!(block.get_vector4("emission_factor"), None);
        assert_eq!(block.get_color_rgb("color"), Some(Vec3::new(1.0, 0.0, 0.2)));
    }

    #[test]
    fn test_nested_block() {
        let sss = DataBlock::new().with("factor", DataValue::Float(0.1));
        let block = DataBlock::new().with("subsurface_scattering", DataValue::Block(sss));
        let nested = block.get_block("subsurface_scattering").unwrap();
        assert_eq!(nested.get_float("factor"), Some(0.1));
    }
}
