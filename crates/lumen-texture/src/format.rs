//! Source format to output container parameters.

use lumen_host::{HostTexture, PixelFormat};

/// Pixel layout handed to the container writer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputFormat {
    R8G8B8A8UInt,
    R16G16B16A16Float,
    R32G32B32A32Float,
}

/// Compression/encoding of the written container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    ColorMapSmoothAlpha,
    HdrColorMap,
    NormalMap,
    Bc1,
    Bc2,
    Bc3,
    Bc4,
    Bc5,
    Dxt1,
    Dxt5,
}

/// Parameters for writing one texture container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureWriteInfo {
    pub input: InputFormat,
    pub output: OutputFormat,
    pub srgb: bool,
    pub normal_map: bool,
}

/// Pick container parameters for a host texture.
///
/// Normal maps always convert from full-precision float. Otherwise the
/// channel depth picks the input format, and block-compressed sources keep
/// their block format. The renderer cannot read BC6H or BC7, so those are
/// re-encoded as DXT5 and DXT1 from half-float input.
pub fn write_info_for(texture: &HostTexture) -> TextureWriteInfo {
    if texture.normal_map {
        return TextureWriteInfo {
            input: InputFormat::R32G32B32A32Float,
            output: OutputFormat::NormalMap,
            srgb: texture.srgb,
            normal_map: true,
        };
    }

    let (mut input, mut output) = match texture.format.channel_bits() {
        16 => (InputFormat::R16G16B16A16Float, OutputFormat::HdrColorMap),
        32 | 64 => (InputFormat::R32G32B32A32Float, OutputFormat::HdrColorMap),
        _ => (InputFormat::R8G8B8A8UInt, OutputFormat::ColorMapSmoothAlpha),
    };

    use PixelFormat::*;
    match texture.format {
        Bc1RgbUnorm | Bc1RgbSrgb | Bc1RgbaUnorm | Bc1RgbaSrgb => output = OutputFormat::Bc1,
        Bc2Unorm | Bc2Srgb => output = OutputFormat::Bc2,
        Bc3Unorm | Bc3Srgb => output = OutputFormat::Bc3,
        Bc4Unorm | Bc4Snorm => output = OutputFormat::Bc4,
        Bc5Unorm | Bc5Snorm => output = OutputFormat::Bc5,
        Bc6hUfloat | Bc6hSfloat => {
            input = InputFormat::R16G16B16A16Float;
            output = OutputFormat::Dxt5;
        }
        Bc7Unorm | Bc7Srgb => {
            input = InputFormat::R16G16B16A16Float;
            output = OutputFormat::Dxt1;
        }
        _ => {}
    }

    TextureWriteInfo {
        input,
        output,
        srgb: texture.srgb,
        normal_map: false,
    }
}
