//! Writing converted textures to disk.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, Rgb32FImage, RgbImage, RgbaImage};
use lumen_host::ImageData;

use crate::error::TextureError;
use crate::format::TextureWriteInfo;

/// Encodes an image into the renderer's container format.
pub trait TextureWriter {
    /// Write `image` to `relative_path` plus the writer's container
    /// extension. Returns the path written.
    fn write(
        &self,
        image: &ImageData,
        relative_path: &Path,
        info: &TextureWriteInfo,
    ) -> Result<PathBuf, TextureError>;
}

/// Writes textures below `root` through the `image` crate.
///
/// Handles the containers the `image` crate can encode (png, jpeg, hdr,
/// tga). Block-compressed containers such as DDS belong to a host-side
/// writer; asking for one here yields [`TextureError::UnsupportedContainer`].
#[derive(Clone, Debug)]
pub struct ImageFileWriter {
    root: PathBuf,
    extension: String,
}

impl ImageFileWriter {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    fn encode(&self, image: &ImageData, format: ImageFormat, srgb: bool) -> DynamicImage {
        match format {
            ImageFormat::Hdr => {
                let mut out = Rgb32FImage::new(image.width, image.height);
                for (dst, src) in out.pixels_mut().zip(&image.pixels) {
                    dst.0 = [src[0], src[1], src[2]];
                }
                DynamicImage::ImageRgb32F(out)
            }
            ImageFormat::Jpeg => {
                let mut out = RgbImage::new(image.width, image.height);
                for (dst, src) in out.pixels_mut().zip(&image.pixels) {
                    let [r, g, b, _] = to_8bit(*src, srgb);
                    dst.0 = [r, g, b];
                }
                DynamicImage::ImageRgb8(out)
            }
            _ => {
                let mut out = RgbaImage::new(image.width, image.height);
                for (dst, src) in out.pixels_mut().zip(&image.pixels) {
                    dst.0 = to_8bit(*src, srgb);
                }
                DynamicImage::ImageRgba8(out)
            }
        }
    }
}

impl TextureWriter for ImageFileWriter {
    fn write(
        &self,
        image: &ImageData,
        relative_path: &Path,
        info: &TextureWriteInfo,
    ) -> Result<PathBuf, TextureError> {
        let format = ImageFormat::from_extension(&self.extension)
            .filter(|f| f.writing_enabled())
            .ok_or_else(|| TextureError::UnsupportedContainer {
                extension: self.extension.clone(),
            })?;

        let mut file_name = relative_path.as_os_str().to_owned();
        file_name.push(".");
        file_name.push(&self.extension);
        let path = self.root.join(file_name);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| TextureError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        self.encode(image, format, info.srgb)
            .save_with_format(&path, format)?;
        Ok(path)
    }
}

/// Linear float to 8-bit, optionally sRGB-encoding the color channels.
fn to_8bit(pixel: [f32; 4], srgb: bool) -> [u8; 4] {
    let encode = |c: f32| {
        let c = c.clamp(0.0, 1.0);
        if srgb {
            if c <= 0.003_130_8 {
                c * 12.92
            } else {
                1.055 * c.powf(1.0 / 2.4) - 0.055
            }
        } else {
            c
        }
    };
    let quantize = |c: f32| (c * 255.0 + 0.5) as u8;
    [
        quantize(encode(pixel[0])),
        quantize(encode(pixel[1])),
        quantize(encode(pixel[2])),
        quantize(pixel[3].clamp(0.0, 1.0)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{InputFormat, OutputFormat};

    fn info() -> TextureWriteInfo {
        TextureWriteInfo {
            input: InputFormat::R8G8B8A8UInt,
            output: OutputFormat::ColorMapSmoothAlpha,
            srgb: false,
            normal_map: false,
        }
    }

    #[test]
    fn test_writes_png_with_extension() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ImageFileWriter::new(dir.path(), "png");
        let img = ImageData::solid(2, 2, [1.0, 0.0, 0.0, 1.0]);

        let path = writer
            .write(&img, Path::new("converted/wood/oak"), &info())
            .unwrap();
        assert_eq!(path, dir.path().join("converted/wood/oak.png"));

        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (2, 2));
        assert_eq!(decoded.get_pixel(0, 0).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_dds_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ImageFileWriter::new(dir.path(), "dds");
        let img = ImageData::solid(1, 1, [1.0; 4]);
        let err = writer.write(&img, Path::new("a"), &info()).unwrap_err();
        assert!(matches!(err, TextureError::UnsupportedContainer { .. }));
    }

    #[test]
    fn test_srgb_encoding() {
        assert_eq!(to_8bit([0.5, 0.0, 1.0, 0.5], false), [128, 0, 255, 128]);
        // Linear 0.5 is about 0.735 in sRGB.
        assert_eq!(to_8bit([0.5, 0.0, 1.0, 1.0], true)[0], 188);
    }
}
