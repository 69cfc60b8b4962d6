use std::io::Read;
use std::path::Path;

/// The renderer's image subsystem, asked whether it can load a file.
pub trait ImageProbe {
    fn accepts(&self, path: &Path) -> bool;
}

/// Accepts DDS containers (by magic) and anything the `image` crate can
/// identify from its header.
#[derive(Clone, Copy, Debug, Default)]
pub struct DdsProbe;

const DDS_MAGIC: &[u8; 4] = b"DDS ";

impl ImageProbe for DdsProbe {
    fn accepts(&self, path: &Path) -> bool {
        let mut magic = [0u8; 4];
        let is_dds = std::fs::File::open(path)
            .and_then(|mut f| f.read_exact(&mut magic))
            .is_ok()
            && &magic == DDS_MAGIC;
        if is_dds {
            return true;
        }
        image::ImageReader::open(path)
            .and_then(|r| r.with_guessed_format())
            .map(|r| r.format().is_some())
            .unwrap_or(false)
    }
}
