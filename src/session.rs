//! Interactive session state: the uploaded image and the last result.
//!
//! A session holds at most one source image and one rendered result, so a
//! result can be previewed and downloaded without rendering again. Uploading
//! a new image discards the previous result.

use image::{DynamicImage, RgbaImage};
use tracing::info;

use crate::compositor::{Compositor, WatermarkRequest};
use crate::error::{Error, Result};
use crate::source::{self, DOWNLOAD_FILE_NAME, DOWNLOAD_MIME_TYPE};

/// An encoded result ready to hand to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// Suggested file name.
    pub file_name: &'static str,
    /// MIME type of `bytes`.
    pub mime_type: &'static str,
    /// PNG-encoded image.
    pub bytes: Vec<u8>,
}

/// State of one interactive watermarking session.
#[derive(Debug, Default)]
pub struct Session {
    compositor: Compositor,
    original: Option<DynamicImage>,
    last_result: Option<RgbaImage>,
}

impl Session {
    /// An empty session rendering with `compositor`.
    #[must_use]
    pub fn new(compositor: Compositor) -> Self {
        Self {
            compositor,
            original: None,
            last_result: None,
        }
    }

    /// Decode and store a new source image, discarding any previous result.
    ///
    /// # Errors
    ///
    /// Returns the decoding error; the session is left as it was.
    pub fn upload(&mut self, bytes: &[u8]) -> Result<()> {
        let image = source::decode(bytes)?;
        info!(
            width = image.width(),
            height = image.height(),
            "image uploaded"
        );
        self.original = Some(image);
        self.last_result = None;
        Ok(())
    }

    /// Watermark the current image and keep the result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoImage`] if nothing has been uploaded.
    pub fn apply(&mut self, request: &WatermarkRequest) -> Result<&RgbaImage> {
        let original = self.original.as_ref().ok_or(Error::NoImage)?;
        let result = self.compositor.render(original, request);
        info!(position = %request.position, "watermark applied");
        Ok(&*self.last_result.insert(result))
    }

    /// The current source image, if any.
    #[must_use]
    pub fn original(&self) -> Option<&DynamicImage> {
        self.original.as_ref()
    }

    /// The most recent result, if any.
    #[must_use]
    pub fn last_result(&self) -> Option<&RgbaImage> {
        self.last_result.as_ref()
    }

    /// Encode the most recent result for download.
    ///
    /// Returns `Ok(None)` if nothing has been rendered since the last upload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Image`] if PNG encoding fails.
    pub fn download(&self) -> Result<Option<Download>> {
        let Some(result) = &self.last_result else {
            return Ok(None);
        };

        Ok(Some(Download {
            file_name: DOWNLOAD_FILE_NAME,
            mime_type: DOWNLOAD_MIME_TYPE,
            bytes: source::encode_png(result)?,
        }))
    }
}
