//! Loading source images and encoding results.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader, RgbaImage};
use tracing::debug;

use crate::error::{Error, Result};

/// File name offered for the downloaded result.
pub const DOWNLOAD_FILE_NAME: &str = "watermarked.png";

/// MIME type of the downloaded result.
pub const DOWNLOAD_MIME_TYPE: &str = "image/png";

/// Decode PNG or JPEG bytes and apply any EXIF orientation.
///
/// # Errors
///
/// Returns [`Error::UnsupportedFormat`] if the data is not PNG or JPEG and
/// [`Error::Decode`] if it cannot be decoded.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;

    let format = match reader.format() {
        Some(format @ (ImageFormat::Png | ImageFormat::Jpeg)) => format,
        Some(other) => return Err(Error::UnsupportedFormat(format!("{other:?}"))),
        None => return Err(Error::UnsupportedFormat("unrecognized data".to_string())),
    };

    let mut decoder = reader.into_decoder().map_err(Error::Decode)?;
    let orientation = decoder.orientation().map_err(Error::Decode)?;
    let mut image = DynamicImage::from_decoder(decoder).map_err(Error::Decode)?;
    image.apply_orientation(orientation);

    debug!(
        ?format,
        ?orientation,
        width = image.width(),
        height = image.height(),
        "decoded source image"
    );
    Ok(image)
}

/// Read and decode an image file; see [`decode`].
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read, otherwise as [`decode`].
pub fn open(path: &Path) -> Result<DynamicImage> {
    let bytes = std::fs::read(path)?;
    decode(&bytes)
}

/// Encode an RGBA image as PNG.
///
/// # Errors
///
/// Returns [`Error::Image`] if encoding fails.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Check if a file has a supported image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(ext.to_lowercase().as_str(), "jpg" | "jpeg" | "png"),
        None => false,
    }
}

/// Default output path for a watermarked copy of `input`: a
/// `watermarked.png` next to it.
#[must_use]
pub fn default_output_path(input: &Path) -> PathBuf {
    let parent = input.parent().unwrap_or(Path::new("."));
    parent.join(DOWNLOAD_FILE_NAME)
}
