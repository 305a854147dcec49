//! Overlay a translucent text watermark onto PNG and JPEG images.
//!
//! The watermark is drawn twice onto a transparent overlay, first as a black
//! drop shadow and then as white text, both at the requested opacity, and
//! the overlay is alpha-composited over a copy of the source image. The font
//! size follows the image width, and the text block is anchored at a corner
//! or the center and kept inside a 20 pixel margin.
//!
//! # Quick Start
//!
//! ```no_run
//! use text_watermark::{source, Compositor, Position, WatermarkRequest};
//!
//! let compositor = Compositor::new();
//! let image = source::open("photo.jpg".as_ref()).expect("failed to load image");
//! let request = WatermarkRequest {
//!     position: Position::Center,
//!     ..WatermarkRequest::new("© Jane Doe")
//! };
//! let result = compositor.render(&image, &request);
//! std::fs::write("watermarked.png", source::encode_png(&result).unwrap()).unwrap();
//! ```
//!
//! # Sessions
//!
//! [`Session`] keeps the uploaded image and the last result between user
//! actions, mirroring an interactive upload, preview and download flow.
//!
//! ```no_run
//! use text_watermark::{Session, WatermarkRequest};
//!
//! let mut session = Session::default();
//! session.upload(&std::fs::read("photo.png").unwrap()).unwrap();
//! session.apply(&WatermarkRequest::default()).unwrap();
//! let download = session.download().unwrap().expect("result was just rendered");
//! std::fs::write(download.file_name, download.bytes).unwrap();
//! ```

#![deny(missing_docs)]

pub mod blending;
mod compositor;
pub mod error;
pub mod font;
pub mod layout;
pub mod placement;
mod session;
pub mod source;

pub use compositor::{
    Compositor, Placement, WatermarkRequest, DEFAULT_OPACITY, DEFAULT_SIZE_PERCENT, DEFAULT_TEXT,
};
pub use error::{Error, Result};
pub use font::{resolve_font, FontHandle, FontSource, DEFAULT_FONT_NAME};
pub use placement::Position;
pub use session::{Download, Session};
