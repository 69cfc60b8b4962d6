use std::path::PathBuf;

/// Errors raised while synthesizing a texture file.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    /// The texture has no host-side image to convert.
    #[error("texture '{name}' has no image data")]
    MissingImage { name: String },

    /// The writer cannot produce the requested container.
    #[error("unsupported texture container '{extension}'")]
    UnsupportedContainer { extension: String },

    /// Creating the output directory or file failed.
    #[error("failed to write texture {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Encoding failed.
    #[error("image encode error: {0}")]
    Encode(#[from] image::ImageError),
}
