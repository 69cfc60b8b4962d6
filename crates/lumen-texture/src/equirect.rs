//! Cubemap to equirectangular conversion.

use std::f32::consts::PI;

use glam::Vec3;
use lumen_host::ImageData;

/// Flatten six cube faces (+X, -X, +Y, -Y, +Z, -Z) into an equirectangular
/// image four faces wide and two faces high.
///
/// The image center looks down +Z, the top row is +Y. Faces are sampled
/// nearest-neighbor.
pub fn cubemap_to_equirect(faces: &[ImageData; 6]) -> ImageData {
    let face_size = faces[0].width;
    let width = face_size * 4;
    let height = face_size * 2;

    let mut pixels = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        let v = (y as f32 + 0.5) / height as f32;
        let lat = (0.5 - v) * PI;
        for x in 0..width {
            let u = (x as f32 + 0.5) / width as f32;
            let lon = (u - 0.5) * 2.0 * PI;
            let dir = Vec3::new(lat.cos() * lon.sin(), lat.sin(), lat.cos() * lon.cos());
            pixels.push(sample_cube(faces, dir));
        }
    }

    ImageData {
        width,
        height,
        pixels,
    }
}

fn sample_cube(faces: &[ImageData; 6], dir: Vec3) -> [f32; 4] {
    let abs = dir.abs();
    // (face, sc, tc, major axis magnitude)
    let (face, sc, tc, ma) = if abs.x >= abs.y && abs.x >= abs.z {
        if dir.x > 0.0 {
            (0, -dir.z, -dir.y, abs.x)
        } else {
            (1, dir.z, -dir.y, abs.x)
        }
    } else if abs.y >= abs.z {
        if dir.y > 0.0 {
            (2, dir.x, dir.z, abs.y)
        } else {
            (3, dir.x, -dir.z, abs.y)
        }
    } else if dir.z > 0.0 {
        (4, dir.x, -dir.y, abs.z)
    } else {
        (5, -dir.x, -dir.y, abs.z)
    };

    let img = &faces[face];
    let s = (sc / ma + 1.0) * 0.5;
    let t = (tc / ma + 1.0) * 0.5;
    let px = (s * img.width as f32) as u32;
    let py = (t * img.height as f32) as u32;
    img.pixel(px, py)
}
