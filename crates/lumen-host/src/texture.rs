//! Host texture resources as seen by the bridge.

use std::sync::Arc;

/// Load state of a host texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadState {
    /// Fully loaded and usable.
    Loaded,
    /// Queued or still streaming in.
    Pending,
    /// Loading failed; the host substituted a placeholder.
    Error,
}

/// Pixel format of the host image, as stored on the GPU.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    R8Unorm,
    R8G8B8A8Unorm,
    R8G8B8A8Srgb,
    B8G8R8A8Unorm,
    R16G16B16A16Unorm,
    R16G16B16A16Sfloat,
    R32Sfloat,
    R32G32B32A32Sfloat,
    R64G64B64A64Sfloat,
    Bc1RgbUnorm,
    Bc1RgbSrgb,
    Bc1RgbaUnorm,
    Bc1RgbaSrgb,
    Bc2Unorm,
    Bc2Srgb,
    Bc3Unorm,
    Bc3Srgb,
    Bc4Unorm,
    Bc4Snorm,
    Bc5Unorm,
    Bc5Snorm,
    Bc6hUfloat,
    Bc6hSfloat,
    Bc7Unorm,
    Bc7Srgb,
}

impl PixelFormat {
    /// Bits per channel for uncompressed formats. Block-compressed formats
    /// decode to 8-bit channels and report 8.
    pub fn channel_bits(self) -> u32 {
        match self {
            Self::R16G16B16A16Unorm | Self::R16G16B16A16Sfloat => 16,
            Self::R32Sfloat | Self::R32G32B32A32Sfloat => 32,
            Self::R64G64B64A64Sfloat => 64,
            _ => 8,
        }
    }

    /// Returns `true` for BC1 through BC7.
    pub fn is_block_compressed(self) -> bool {
        !matches!(
            self,
            Self::R8Unorm
                | Self::R8G8B8A8Unorm
                | Self::R8G8B8A8Srgb
                | Self::B8G8R8A8Unorm
                | Self::R16G16B16A16Unorm
                | Self::R16G16B16A16Sfloat
                | Self::R32Sfloat
                | Self::R32G32B32A32Sfloat
                | Self::R64G64B64A64Sfloat
        )
    }
}

/// Linear RGBA pixels of one image face, row-major, top row first.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[f32; 4]>,
}

impl ImageData {
    /// A `width` x `height` image filled with a single color.
    pub fn solid(width: u32, height: u32, color: [f32; 4]) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; (width * height) as usize],
        }
    }

    /// Pixel at `(x, y)`, clamped to the image edges. Transparent black
    /// when `pixels` is shorter than the declared size.
    pub fn pixel(&self, x: u32, y: u32) -> [f32; 4] {
        let x = x.min(self.width.saturating_sub(1)) as usize;
        let y = y.min(self.height.saturating_sub(1)) as usize;
        self.pixels
            .get(y * self.width as usize + x)
            .copied()
            .unwrap_or_default()
    }
}

/// Image payload of a texture.
#[derive(Clone, Debug, PartialEq)]
pub enum TextureImage {
    /// Regular 2D image.
    Flat(ImageData),
    /// Six square faces in +X, -X, +Y, -Y, +Z, -Z order.
    Cubemap(Box<[ImageData; 6]>),
}

/// A texture resource owned by the host's texture manager.
#[derive(Clone, Debug)]
pub struct HostTexture {
    pub name: String,
    pub state: LoadState,
    pub format: PixelFormat,
    pub srgb: bool,
    pub normal_map: bool,
    /// Host-side pixel data. `None` when the GPU image was never created.
    pub image: Option<TextureImage>,
}

impl HostTexture {
    /// A loaded, flat sRGB color texture.
    pub fn flat(name: impl Into<String>, image: ImageData) -> Self {
        Self {
            name: name.into(),
            state: LoadState::Loaded,
            format: PixelFormat::R8G8B8A8Srgb,
            srgb: true,
            normal_map: false,
            image: Some(TextureImage::Flat(image)),
        }
    }

    /// A loaded cubemap texture.
    pub fn cubemap(name: impl Into<String>, faces: [ImageData; 6]) -> Self {
        Self {
            name: name.into(),
            state: LoadState::Loaded,
            format: PixelFormat::R16G16B16A16Sfloat,
            srgb: false,
            normal_map: false,
            image: Some(TextureImage::Cubemap(Box::new(faces))),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.state == LoadState::Loaded
    }

    /// Loaded, not in error state, and backed by image data.
    pub fn is_usable(&self) -> bool {
        self.is_loaded() && self.image.is_some()
    }

    pub fn is_cubemap(&self) -> bool {
        matches!(self.image, Some(TextureImage::Cubemap(_)))
    }
}

/// A named texture slot entry on a material.
#[derive(Clone, Debug)]
pub struct TextureRef {
    /// Logical texture name, possibly with an extension (`"wood/oak.png"`).
    pub name: String,
    /// The resolved resource, if the host has created one.
    pub texture: Option<Arc<HostTexture>>,
}

impl TextureRef {
    pub fn new(name: impl Into<String>, texture: Arc<HostTexture>) -> Self {
        Self {
            name: name.into(),
            texture: Some(texture),
        }
    }

    /// A reference the host has not resolved to a resource yet.
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            texture: None,
        }
    }

    /// The texture if it is fully loaded.
    pub fn loaded(&self) -> Option<&Arc<HostTexture>> {
        self.texture.as_ref().filter(|t| t.is_loaded())
    }
}
