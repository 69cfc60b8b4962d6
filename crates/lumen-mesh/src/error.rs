use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeshError {
    #[error("shader index {index} out of range ({count} shaders registered)")]
    ShaderIndexOutOfRange { index: u32, count: usize },

    #[error("vertex index {index} out of range ({count} vertices)")]
    VertexIndexOutOfRange { index: u32, count: usize },

    #[error("expected {expected} lightmap uvs (3 per triangle), got {actual}")]
    LightmapUvCount { expected: usize, actual: usize },
}
