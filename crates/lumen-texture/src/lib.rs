//! Texture preparation: resolves material texture references to image files
//! the path tracer can load.
//!
//! A reference goes through a value-returning fallback chain: default
//! texture, cubemap flattening, the precomputed container on disk, on-demand
//! conversion through a [`TextureWriter`], and finally the error texture.
//! Nothing here aborts a scene build.

mod equirect;
mod error;
mod format;
mod preparer;
mod probe;
mod writer;

pub use equirect::cubemap_to_equirect;
pub use error::TextureError;
pub use format::{InputFormat, OutputFormat, TextureWriteInfo, write_info_for};
pub use preparer::{PrepareFlags, PreparedTexture, TexturePreparer};
pub use probe::{DdsProbe, ImageProbe};
pub use writer::{ImageFileWriter, TextureWriter};
