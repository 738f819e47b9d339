// ============================================================================
// FILE I/O — decode inputs, encode results, read/write layout files
// ============================================================================

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::components::layers::{DesignLayers, DesignTransform};
use crate::error::IoError;

/// Output formats for finished mockups.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SaveFormat {
    #[default]
    Png,
    Jpeg,
    Bmp,
}

impl SaveFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            SaveFormat::Png => "png",
            SaveFormat::Jpeg => "jpg",
            SaveFormat::Bmp => "bmp",
        }
    }

    /// Infer from a file extension, defaulting to PNG.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase()
            .as_str()
        {
            "jpg" | "jpeg" => SaveFormat::Jpeg,
            "bmp" => SaveFormat::Bmp,
            _ => SaveFormat::Png,
        }
    }
}

/// Decode any supported image file to RGBA.
pub fn load_rgba(path: &Path) -> Result<RgbaImage, IoError> {
    let img = image::open(path).map_err(|source| IoError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(img.to_rgba8())
}

/// Encode `image` to `path`. `quality` (1–100) only affects JPEG.
pub fn encode_and_write(image: &RgbaImage, path: &Path, format: SaveFormat, quality: u8) -> Result<(), IoError> {
    let encode_err = |source| IoError::Encode {
        path: path.to_path_buf(),
        source,
    };
    match format {
        SaveFormat::Jpeg => {
            let file = File::create(path).map_err(|source| IoError::Write {
                path: path.to_path_buf(),
                source,
            })?;
            let mut writer = BufWriter::new(file);
            // JPEG has no alpha channel.
            let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            let mut encoder = JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100));
            encoder
                .encode(rgb.as_raw(), rgb.width(), rgb.height(), image::ColorType::Rgb8)
                .map_err(encode_err)?;
        }
        SaveFormat::Png => image.save_with_format(path, ImageFormat::Png).map_err(encode_err)?,
        SaveFormat::Bmp => image.save_with_format(path, ImageFormat::Bmp).map_err(encode_err)?,
    }
    crate::log_info!("Wrote {}x{} image to {}", image.width(), image.height(), path.display());
    Ok(())
}

/// Read a transform list (`[{position, size, rotation}, ...]`).
pub fn read_layout(path: &Path) -> Result<Vec<DesignTransform>, IoError> {
    let text = std::fs::read_to_string(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    DesignLayers::transforms_from_json(&text).map_err(|source| IoError::Layout {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_layout(path: &Path, layers: &DesignLayers) -> Result<(), IoError> {
    let json = layers.to_json().map_err(|source| IoError::Layout {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, json).map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::layers::{Point, Size};
    use image::Rgba;

    #[test]
    fn format_from_extension() {
        assert_eq!(SaveFormat::from_path(Path::new("a/out.JPEG")), SaveFormat::Jpeg);
        assert_eq!(SaveFormat::from_path(Path::new("out.bmp")), SaveFormat::Bmp);
        assert_eq!(SaveFormat::from_path(Path::new("out")), SaveFormat::Png);
    }

    #[test]
    fn png_written_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mockup.png");
        let img = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255]));
        encode_and_write(&img, &path, SaveFormat::Png, 90).unwrap();
        assert_eq!(load_rgba(&path).unwrap(), img);
    }

    #[test]
    fn jpeg_drops_alpha_but_keeps_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mockup.jpg");
        let img = RgbaImage::from_pixel(16, 9, Rgba([200, 10, 10, 128]));
        encode_and_write(&img, &path, SaveFormat::Jpeg, 85).unwrap();
        let back = load_rgba(&path).unwrap();
        assert_eq!(back.dimensions(), (16, 9));
        assert_eq!(back.get_pixel(0, 0)[3], 255);
    }

    #[test]
    fn layout_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.json");
        let transforms = vec![DesignTransform {
            position: Point::new(12.5, -4.0),
            size: Size::new(80.0, 20.0),
            rotation: 405.0,
        }];
        let layers = DesignLayers::initialize(1, Some(&transforms));
        write_layout(&path, &layers).unwrap();
        assert_eq!(read_layout(&path).unwrap(), transforms);
    }

    #[test]
    fn missing_and_malformed_files_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(read_layout(&dir.path().join("nope.json")), Err(IoError::Read { .. })));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{\"position\": 3}").unwrap();
        assert!(matches!(read_layout(&bad), Err(IoError::Layout { .. })));

        assert!(matches!(load_rgba(&bad), Err(IoError::Decode { .. })));
    }
}
