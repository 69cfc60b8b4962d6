//! Texture reference to renderer-ready file.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lumen_config::TextureConfig;
use lumen_host::{AssetFs, HostTexture, ImageData, TextureImage, TextureManager, TextureRef};
use tracing::{debug, info, warn};

use crate::equirect::cubemap_to_equirect;
use crate::format::write_info_for;
use crate::probe::ImageProbe;
use crate::writer::TextureWriter;

/// Caller-side switches for [`TexturePreparer::prepare`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PrepareFlags {
    /// Cubemaps are flattened and returned as environment maps instead of
    /// being rejected.
    pub allow_env_map: bool,
}

impl PrepareFlags {
    pub const NONE: Self = Self {
        allow_env_map: false,
    };
    pub const ENV_MAP: Self = Self {
        allow_env_map: true,
    };
}

/// Outcome of preparing one texture reference.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PreparedTexture {
    /// Absolute path of a file the renderer can load. `None` means "no
    /// texture".
    pub path: Option<PathBuf>,
    /// The requested texture (or its default) was resolved.
    pub success: bool,
    /// The file was synthesized during this call.
    pub converted: bool,
    /// The file is a flattened cubemap usable as an environment map.
    pub env_map: bool,
}

impl PreparedTexture {
    /// No texture at all.
    pub fn none() -> Self {
        Self::default()
    }

    fn found(path: PathBuf) -> Self {
        Self {
            path: Some(path),
            success: true,
            ..Self::default()
        }
    }
}

/// Warning for a reference that could not be resolved, naming what the
/// caller gets in its place.
fn failure_message(name: &str, result: &PreparedTexture) -> String {
    match &result.path {
        Some(path) => format!(
            "Unable to prepare texture '{name}', using error texture {} instead",
            path.display()
        ),
        None => format!("Unable to prepare texture '{name}', leaving slot untextured"),
    }
}

/// Resolves texture references to files, converting on demand.
pub struct TexturePreparer<'a> {
    config: TextureConfig,
    fs: &'a dyn AssetFs,
    textures: &'a dyn TextureManager,
    writer: &'a dyn TextureWriter,
    probe: &'a dyn ImageProbe,
}

impl<'a> TexturePreparer<'a> {
    pub fn new(
        config: TextureConfig,
        fs: &'a dyn AssetFs,
        textures: &'a dyn TextureManager,
        writer: &'a dyn TextureWriter,
        probe: &'a dyn ImageProbe,
    ) -> Self {
        Self {
            config,
            fs,
            textures,
            writer,
            probe,
        }
    }

    pub fn texture_manager(&self) -> &'a dyn TextureManager {
        self.textures
    }

    /// Resolve `texture` to a renderer-compatible file.
    ///
    /// An absent reference yields no path and no fallback. Anything else
    /// degrades through `default_fallback`, the error texture and finally no
    /// path; each degradation is logged.
    pub fn prepare(
        &self,
        texture: Option<&TextureRef>,
        flags: PrepareFlags,
        default_fallback: Option<&str>,
    ) -> PreparedTexture {
        let Some(texture_ref) = texture else {
            return PreparedTexture::none();
        };
        if !flags.allow_env_map && texture_ref.loaded().is_some_and(|t| t.is_cubemap()) {
            warn!(
                "Cubemap '{}' cannot be used outside an environment map, leaving slot untextured",
                texture_ref.name
            );
            return PreparedTexture::none();
        }

        let mut result = self.resolve(texture_ref, flags, default_fallback);
        if !result.success {
            warn!("{}", failure_message(&texture_ref.name, &result));
            return result;
        }

        if result.converted {
            info!(
                "Converted texture '{}' to {}",
                texture_ref.name, self.config.container_extension
            );
        }

        let accepted = result.path.as_deref().is_some_and(|p| self.probe.accepts(p));
        if !accepted {
            warn!(
                "Texture '{}' has a format the renderer cannot read, falling back to error texture",
                texture_ref.name
            );
            result.success = false;
            result.path = self
                .error_texture_path()
                .filter(|p| self.probe.accepts(p));
            if result.path.is_none() {
                warn!("Error texture is not usable either, falling back to untextured");
            }
        }
        result
    }

    fn resolve(
        &self,
        texture_ref: &TextureRef,
        flags: PrepareFlags,
        default_fallback: Option<&str>,
    ) -> PreparedTexture {
        let (texture, name): (Arc<HostTexture>, String) = match texture_ref.loaded() {
            Some(tex) => (tex.clone(), texture_ref.name.clone()),
            None => match default_fallback
                .and_then(|name| Some((self.textures.load(name)?, name.to_string())))
            {
                Some(found) => found,
                None => return self.error_texture(),
            },
        };
        if !texture.is_usable() {
            return self.error_texture();
        }

        // The container writer appends its own extension.
        let mut name = strip_extension(&name);

        let mut env_map = false;
        let image: Cow<'_, ImageData> = match &texture.image {
            Some(TextureImage::Flat(image)) => Cow::Borrowed(image),
            Some(TextureImage::Cubemap(faces)) => {
                if !flags.allow_env_map {
                    debug!("Rejecting cubemap '{name}' where no environment map is allowed");
                    return PreparedTexture::none();
                }
                name.push_str("_equirect");
                env_map = true;
                Cow::Owned(cubemap_to_equirect(faces))
            }
            None => return self.error_texture(),
        };

        let native = Path::new(&self.config.materials_dir).join(self.with_extension(&name));
        if let Some(path) = self.fs.find_absolute_path(&native) {
            return PreparedTexture {
                env_map,
                ..PreparedTexture::found(path)
            };
        }

        let target = Path::new(&self.config.converted_dir).join(&name);
        let info = write_info_for(&texture);
        if let Err(e) = self.writer.write(&image, &target, &info) {
            warn!("Failed to write converted texture '{name}': {e}");
            return self.error_texture();
        }

        let written = Path::new(&self.config.converted_dir).join(self.with_extension(&name));
        match self.fs.find_absolute_path(&written) {
            Some(path) => PreparedTexture {
                converted: true,
                env_map,
                ..PreparedTexture::found(path)
            },
            None => self.error_texture(),
        }
    }

    fn with_extension(&self, name: &str) -> String {
        format!("{name}.{}", self.config.container_extension)
    }

    fn error_texture_path(&self) -> Option<PathBuf> {
        let rel = Path::new(&self.config.materials_dir)
            .join(self.with_extension(&self.config.error_texture));
        self.fs.find_absolute_path(&rel)
    }

    fn error_texture(&self) -> PreparedTexture {
        PreparedTexture {
            path: self.error_texture_path(),
            ..PreparedTexture::default()
        }
    }
}

/// `"wood/oak.png"` -> `"wood/oak"`. Only the final component's extension
/// is removed.
fn strip_extension(name: &str) -> String {
    let path = Path::new(name);
    match path.extension() {
        Some(_) => path.with_extension("").to_string_lossy().into_owned(),
        None => name.to_string(),
    }
}
