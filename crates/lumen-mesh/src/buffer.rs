//! Mesh buffer holding per-vertex streams, shader-tagged triangles and the
//! shaders they reference.

use std::sync::Arc;

use glam::{Vec2, Vec3};
use lumen_shader::ShaderInstance;

use crate::error::MeshError;

/// Optional per-vertex streams of a [`MeshBuffer`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MeshFlags {
    pub has_alphas: bool,
    pub has_wrinkles: bool,
}

/// A triangle referencing three vertices and one of the mesh's shaders.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Triangle {
    pub indices: [u32; 3],
    pub shader: u32,
}

/// Triangle mesh handed to the renderer.
///
/// Every triangle's shader index refers to a shader added before it.
#[derive(Clone, Debug, Default)]
pub struct MeshBuffer {
    pub name: String,
    flags: MeshFlags,
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    tangents: Vec<Vec3>,
    uvs: Vec<Vec2>,
    alphas: Vec<f32>,
    wrinkles: Vec<f32>,
    /// Three per triangle, in triangle order.
    lightmap_uvs: Vec<Vec2>,
    triangles: Vec<Triangle>,
    shaders: Vec<Arc<ShaderInstance>>,
}

impl MeshBuffer {
    /// Creates an empty mesh sized for `vertex_count` vertices and
    /// `triangle_count` triangles.
    pub fn new(
        name: impl Into<String>,
        vertex_count: usize,
        triangle_count: usize,
        flags: MeshFlags,
    ) -> Self {
        let stream = |enabled: bool| Vec::with_capacity(if enabled { vertex_count } else { 0 });
        Self {
            name: name.into(),
            flags,
            positions: Vec::with_capacity(vertex_count),
            normals: Vec::with_capacity(vertex_count),
            tangents: Vec::with_capacity(vertex_count),
            uvs: Vec::with_capacity(vertex_count),
            alphas: stream(flags.has_alphas),
            wrinkles: stream(flags.has_wrinkles),
            lightmap_uvs: Vec::new(),
            triangles: Vec::with_capacity(triangle_count),
            shaders: Vec::new(),
        }
    }

    pub fn flags(&self) -> MeshFlags {
        self.flags
    }

    pub fn has_alphas(&self) -> bool {
        self.flags.has_alphas
    }

    pub fn has_wrinkles(&self) -> bool {
        self.flags.has_wrinkles
    }

    /// Index the next added vertex will get.
    pub fn vertex_offset(&self) -> u32 {
        self.positions.len() as u32
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn add_vertex(&mut self, position: Vec3, normal: Vec3, tangent: Vec3, uv: Vec2) {
        self.positions.push(position);
        self.normals.push(normal);
        self.tangents.push(tangent);
        self.uvs.push(uv);
    }

    /// Ignored unless the mesh carries alphas.
    pub fn add_alpha(&mut self, alpha: f32) {
        if self.flags.has_alphas {
            self.alphas.push(alpha);
        }
    }

    /// Ignored unless the mesh carries wrinkle factors.
    pub fn add_wrinkle_factor(&mut self, wrinkle: f32) {
        if self.flags.has_wrinkles {
            self.wrinkles.push(wrinkle);
        }
    }

    /// Registers a shader and returns its index.
    pub fn add_shader(&mut self, shader: Arc<ShaderInstance>) -> u32 {
        self.shaders.push(shader);
        (self.shaders.len() - 1) as u32
    }

    pub fn add_triangle(&mut self, indices: [u32; 3], shader: u32) -> Result<(), MeshError> {
        if shader as usize >= self.shaders.len() {
            return Err(MeshError::ShaderIndexOutOfRange {
                index: shader,
                count: self.shaders.len(),
            });
        }
        self.triangles.push(Triangle { indices, shader });
        Ok(())
    }

    /// Sets the per-corner lightmap UVs; three per triangle.
    pub fn set_lightmap_uvs(&mut self, uvs: Vec<Vec2>) -> Result<(), MeshError> {
        let expected = self.triangles.len() * 3;
        if uvs.len() != expected {
            return Err(MeshError::LightmapUvCount {
                expected,
                actual: uvs.len(),
            });
        }
        self.lightmap_uvs = uvs;
        Ok(())
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn tangents(&self) -> &[Vec3] {
        &self.tangents
    }

    pub fn uvs(&self) -> &[Vec2] {
        &self.uvs
    }

    pub fn alphas(&self) -> &[f32] {
        &self.alphas
    }

    pub fn wrinkles(&self) -> &[f32] {
        &self.wrinkles
    }

    /// Wrinkle factor of a vertex; vertices added without one read as zero.
    pub fn wrinkle(&self, vertex: usize) -> f32 {
        self.wrinkles.get(vertex).copied().unwrap_or(0.0)
    }

    pub fn lightmap_uvs(&self) -> &[Vec2] {
        &self.lightmap_uvs
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn shaders(&self) -> &[Arc<ShaderInstance>] {
        &self.shaders
    }
}
