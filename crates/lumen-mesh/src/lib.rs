//! Renderer-side triangle meshes assembled from host sub-meshes.

mod assemble;
mod buffer;
mod error;

pub use assemble::{Deformation, append_sub_mesh};
pub use buffer::{MeshBuffer, MeshFlags, Triangle};
pub use error::MeshError;
