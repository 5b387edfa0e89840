use std::path::Path;

use anyhow::{Context, Result};
use eh_core::error::CoreError;
use eh_core::frame::FrameBuffer;

/// Charge une image (PNG, JPEG, BMP) en RGBA8.
///
/// # Errors
/// Returns an error if the image cannot be opened or decoded.
///
/// # Example
/// ```no_run
/// use eh_source::image::load_image;
/// use std::path::Path;
/// let frame = load_image(Path::new("photo.png")).unwrap();
/// ```
pub fn load_image(path: &Path) -> Result<FrameBuffer> {
    if !path.exists() {
        return Err(CoreError::FileNotFound {
            path: path.display().to_string(),
        }
        .into());
    }
    let img = image::open(path)
        .with_context(|| format!("Impossible de charger {}", path.display()))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    log::debug!("Image chargée : {} ({width}×{height})", path.display());
    Ok(FrameBuffer::from_raw(width, height, rgba.into_raw())?)
}

/// Écrit `frame` sur disque, format déduit de l'extension.
///
/// Le JPEG ne stocke pas d'alpha : l'image est aplatie en RGB.
///
/// # Errors
/// Returns an error if the extension is unsupported or the file cannot be written.
pub fn save_image(frame: &FrameBuffer, path: &Path) -> Result<()> {
    let format = image::ImageFormat::from_path(path).map_err(|_| CoreError::UnsupportedFormat {
        format: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_string(),
    })?;

    let rgba = image::RgbaImage::from_raw(frame.width, frame.height, frame.data.clone())
        .ok_or(CoreError::InvalidDimensions {
            width: frame.width,
            height: frame.height,
            len: frame.data.len(),
        })?;

    let result = if format == image::ImageFormat::Jpeg {
        image::DynamicImage::ImageRgba8(rgba)
            .to_rgb8()
            .save_with_format(path, format)
    } else {
        rgba.save_with_format(path, format)
    };
    result.with_context(|| format!("Impossible d'écrire {}", path.display()))?;
    log::debug!("Image écrite : {}", path.display());
    Ok(())
}
