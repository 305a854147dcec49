//! Watermark compositing: sizing, placement and the two-layer text overlay.

use image::{DynamicImage, RgbaImage};
use tracing::{debug, warn};

use crate::blending;
use crate::error::{Error, Result};
use crate::font::{FontSource, DEFAULT_FONT_NAME};
use crate::layout::TextLayout;
use crate::placement::{
    self, Position, OPACITY_RANGE, SHADOW_OFFSET, SIZE_PERCENT_RANGE,
};

/// Default watermark text.
pub const DEFAULT_TEXT: &str = "© My Art – Do Not Repost";

/// Default text size, as percent of the image width.
pub const DEFAULT_SIZE_PERCENT: u32 = 6;

/// Default watermark alpha.
pub const DEFAULT_OPACITY: u8 = 160;

const SHADOW_COLOR: [u8; 3] = [0, 0, 0];
const TEXT_COLOR: [u8; 3] = [255, 255, 255];

/// Parameters of a single watermark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatermarkRequest {
    /// Text to draw; `\n` starts a new line.
    pub text: String,
    /// Where the text block is anchored.
    pub position: Position,
    /// Text size as percent of the image width, `2..=15`.
    pub size_percent: u32,
    /// Alpha of both the shadow and the text, `50..=255`.
    pub opacity: u8,
}

impl Default for WatermarkRequest {
    fn default() -> Self {
        Self {
            text: DEFAULT_TEXT.to_string(),
            position: Position::default(),
            size_percent: DEFAULT_SIZE_PERCENT,
            opacity: DEFAULT_OPACITY,
        }
    }
}

impl WatermarkRequest {
    /// A request for `text` with default position, size and opacity.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Check that size and opacity are inside their accepted ranges.
    ///
    /// [`Compositor::render`] clamps instead; use this to reject bad input
    /// up front.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first out-of-range field.
    pub fn validate(&self) -> Result<()> {
        if !SIZE_PERCENT_RANGE.contains(&self.size_percent) {
            return Err(Error::Validation {
                field: "size_percent",
                value: i64::from(self.size_percent),
                min: i64::from(*SIZE_PERCENT_RANGE.start()),
                max: i64::from(*SIZE_PERCENT_RANGE.end()),
            });
        }
        if !OPACITY_RANGE.contains(&self.opacity) {
            return Err(Error::Validation {
                field: "opacity",
                value: i64::from(self.opacity),
                min: i64::from(*OPACITY_RANGE.start()),
                max: i64::from(*OPACITY_RANGE.end()),
            });
        }
        Ok(())
    }

    /// Size and opacity clamped into range.
    fn effective_params(&self) -> (u32, u8) {
        let size = self
            .size_percent
            .clamp(*SIZE_PERCENT_RANGE.start(), *SIZE_PERCENT_RANGE.end());
        let opacity = self
            .opacity
            .clamp(*OPACITY_RANGE.start(), *OPACITY_RANGE.end());

        if size != self.size_percent || opacity != self.opacity {
            warn!(
                size_percent = self.size_percent,
                opacity = self.opacity,
                clamped_size_percent = size,
                clamped_opacity = opacity,
                "watermark parameters out of range, clamping"
            );
        }
        (size, opacity)
    }
}

/// Where and how large a watermark lands on a given canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Requested font size in pixels per em (the built-in face ignores it).
    pub font_size: u32,
    /// Width of the text block's tight bounding box.
    pub text_width: u32,
    /// Height of the text block's tight bounding box.
    pub text_height: u32,
    /// Left edge of the text block after clamping.
    pub x: i64,
    /// Top edge of the text block after clamping.
    pub y: i64,
}

/// Renders text watermarks.
///
/// The font face is resolved once at construction and shared read-only, so
/// one compositor can serve any number of renders, from any thread. Each
/// render is independent and leaves no state behind.
#[derive(Debug, Clone)]
pub struct Compositor {
    font: FontSource,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new()
    }
}

impl Compositor {
    /// A compositor using [`DEFAULT_FONT_NAME`], or the built-in face if it
    /// cannot be found.
    #[must_use]
    pub fn new() -> Self {
        Self::with_font_name(DEFAULT_FONT_NAME)
    }

    /// A compositor using the font file `name`; see [`FontSource::resolve`].
    #[must_use]
    pub fn with_font_name(name: &str) -> Self {
        Self::with_font(FontSource::resolve(name))
    }

    /// A compositor using an already loaded face.
    #[must_use]
    pub fn with_font(font: FontSource) -> Self {
        Self { font }
    }

    /// The face this compositor draws with.
    #[must_use]
    pub fn font(&self) -> &FontSource {
        &self.font
    }

    /// Compute where `request` would be drawn on a `width` x `height` image.
    #[must_use]
    pub fn placement(&self, width: u32, height: u32, request: &WatermarkRequest) -> Placement {
        let (size_percent, _) = request.effective_params();
        self.prepare(width, height, &request.text, request.position, size_percent)
            .0
    }

    fn prepare(
        &self,
        width: u32,
        height: u32,
        text: &str,
        position: Position,
        size_percent: u32,
    ) -> (Placement, TextLayout) {
        let font_size = placement::font_size(width, size_percent);
        let layout = TextLayout::new(&self.font.at_size(font_size), text);
        let (text_width, text_height) = (layout.width(), layout.height());

        let ideal = placement::anchor(position, width, height, text_width, text_height);
        let (x, y) = placement::clamp_anchor(ideal, width, height, text_width, text_height);

        let placement = Placement {
            font_size,
            text_width,
            text_height,
            x,
            y,
        };
        (placement, layout)
    }

    /// Draw `request` onto a copy of `image` and return the RGBA result.
    ///
    /// A black shadow offset by two pixels and the white text are drawn onto
    /// a transparent overlay, both at the request's opacity, and the overlay
    /// is composited over the image. `image` itself is never modified.
    /// Out-of-range size and opacity are clamped.
    #[must_use]
    pub fn render(&self, image: &DynamicImage, request: &WatermarkRequest) -> RgbaImage {
        let mut canvas = image.to_rgba8();
        let (width, height) = canvas.dimensions();
        let (size_percent, opacity) = request.effective_params();

        let (placement, layout) =
            self.prepare(width, height, &request.text, request.position, size_percent);
        debug!(
            width,
            height,
            font_size = placement.font_size,
            builtin_font = self.font.is_builtin(),
            lines = layout.line_count(),
            text_width = placement.text_width,
            text_height = placement.text_height,
            x = placement.x,
            y = placement.y,
            "rendering watermark"
        );

        let mut overlay = RgbaImage::new(width, height);
        layout.draw(
            &mut overlay,
            placement.x + SHADOW_OFFSET,
            placement.y + SHADOW_OFFSET,
            SHADOW_COLOR,
            opacity,
        );
        layout.draw(&mut overlay, placement.x, placement.y, TEXT_COLOR, opacity);

        blending::alpha_composite(&mut canvas, &overlay);
        canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::{LINE_SPACING, PADDING};
    use image::{Rgb, RgbImage};

    fn compositor() -> Compositor {
        Compositor::with_font(FontSource::embedded())
    }

    fn filled(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
    }

    fn gray(width: u32, height: u32) -> DynamicImage {
        filled(width, height, [90, 120, 150])
    }

    fn stem_centre(placement: &Placement) -> (u32, u32) {
        let x = u32::try_from(placement.x).unwrap() + placement.text_width / 2;
        let y = u32::try_from(placement.y).unwrap() + placement.text_height / 2;
        (x, y)
    }

    #[test]
    fn default_request_matches_documented_defaults() {
        let request = WatermarkRequest::default();
        assert_eq!(request.text, "© My Art – Do Not Repost");
        assert_eq!(request.position, Position::BottomRight);
        assert_eq!(request.size_percent, 6);
        assert_eq!(request.opacity, 160);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let too_small = WatermarkRequest {
            size_percent: 1,
            ..WatermarkRequest::default()
        };
        assert!(matches!(
            too_small.validate(),
            Err(Error::Validation { field: "size_percent", value: 1, .. })
        ));

        let too_faint = WatermarkRequest {
            opacity: 49,
            ..WatermarkRequest::default()
        };
        assert!(matches!(
            too_faint.validate(),
            Err(Error::Validation { field: "opacity", value: 49, .. })
        ));
    }

    #[test]
    fn effective_params_clamp_into_range() {
        let request = WatermarkRequest {
            size_percent: 40,
            opacity: 0,
            ..WatermarkRequest::default()
        };
        assert_eq!(request.effective_params(), (15, 50));
    }

    #[test]
    fn center_scenario_on_800x600() {
        let compositor = compositor();
        let request = WatermarkRequest {
            text: "HELLO".to_string(),
            position: Position::Center,
            size_percent: 6,
            opacity: 160,
        };

        let placement = compositor.placement(800, 600, &request);
        assert_eq!(placement.font_size, 48);
        let (tw, th) = (
            i64::from(placement.text_width),
            i64::from(placement.text_height),
        );
        assert!((100..300).contains(&tw), "text width {tw}");
        assert!((34..40).contains(&th), "text height {th}");
        assert_eq!(placement.x, (800 - tw) / 2);
        assert_eq!(placement.y, (600 - th) / 2);

        let result = compositor.render(&gray(800, 600), &request);
        assert_eq!(result.dimensions(), (800, 600));
    }

    #[test]
    fn builtin_face_draws_at_fixed_size() {
        let request = WatermarkRequest::new("HELLO");
        let builtin = Compositor::with_font(FontSource::Builtin).placement(800, 600, &request);
        let scaled = compositor().placement(800, 600, &request);

        assert_eq!(builtin.font_size, 48);
        assert!(builtin.text_height < scaled.text_height / 2);
    }

    #[test]
    fn tiny_image_clamps_to_padding() {
        let compositor = compositor();
        let request = WatermarkRequest {
            text: "This watermark is far too long for the image".to_string(),
            position: Position::BottomRight,
            ..WatermarkRequest::default()
        };

        let placement = compositor.placement(50, 50, &request);
        assert_eq!(placement.font_size, 12);
        assert!(placement.text_width + 2 * 20 > 50);
        assert!(placement.text_height > 10);
        assert_eq!(placement.x, PADDING);
        assert_eq!(placement.y, PADDING);

        let result = compositor.render(&gray(50, 50), &request);
        assert_eq!(result.dimensions(), (50, 50));
    }

    #[test]
    fn multi_line_placement_is_one_line_pitch_taller() {
        let compositor = compositor();
        let one = compositor.placement(400, 300, &WatermarkRequest::new("HELLO"));
        let two = compositor.placement(400, 300, &WatermarkRequest::new("HELLO\nHELLO"));

        let pitch = FontSource::embedded().at_size(24).line_height() + LINE_SPACING;
        assert_eq!(two.text_height, one.text_height + pitch);
        assert_eq!(two.y, 300 - i64::from(two.text_height) - PADDING);
    }

    #[test]
    fn render_draws_shadow_and_text() {
        let compositor = compositor();
        let source = gray(800, 200);
        let request = WatermarkRequest {
            text: "I".to_string(),
            position: Position::TopLeft,
            size_percent: 6,
            opacity: 255,
        };

        let placement = compositor.placement(800, 200, &request);
        let result = compositor.render(&source, &request);

        let (cx, cy) = stem_centre(&placement);
        assert_eq!(result.get_pixel(cx, cy).0, [255, 255, 255, 255]);
        // Just right of the stem only the shadow is inked.
        let right = u32::try_from(placement.x).unwrap() + placement.text_width;
        assert_eq!(result.get_pixel(right, cy).0, [0, 0, 0, 255]);
        // Far corner untouched.
        assert_eq!(result.get_pixel(799, 199).0, [90, 120, 150, 255]);
    }

    #[test]
    fn shadow_does_not_darken_text_on_white() {
        let compositor = compositor();
        let request = WatermarkRequest {
            text: "I".to_string(),
            position: Position::TopLeft,
            size_percent: 6,
            opacity: 160,
        };

        let placement = compositor.placement(800, 200, &request);
        let result = compositor.render(&filled(800, 200, [255, 255, 255]), &request);

        let (cx, cy) = stem_centre(&placement);
        assert_eq!(result.get_pixel(cx, cy).0, [255, 255, 255, 255]);
    }

    #[test]
    fn translucent_text_blends_with_background() {
        let compositor = compositor();
        let request = WatermarkRequest {
            text: "I".to_string(),
            position: Position::TopLeft,
            size_percent: 6,
            opacity: 128,
        };

        let placement = compositor.placement(800, 200, &request);
        let result = compositor.render(&filled(800, 200, [0, 0, 0]), &request);

        let (cx, cy) = stem_centre(&placement);
        assert_eq!(result.get_pixel(cx, cy).0, [128, 128, 128, 255]);
    }

    #[test]
    fn render_leaves_source_untouched() {
        let compositor = compositor();
        let source = gray(120, 80);
        let before = source.clone();
        let _ = compositor.render(&source, &WatermarkRequest::new("MARK"));
        assert_eq!(source, before);
    }

    #[test]
    fn blank_text_returns_plain_rgba_copy() {
        let compositor = compositor();
        let source = gray(64, 64);
        let result = compositor.render(&source, &WatermarkRequest::new("  \n "));
        assert_eq!(result, source.to_rgba8());
    }

    #[test]
    fn renders_are_deterministic() {
        let compositor = compositor();
        let source = gray(300, 200);
        let request = WatermarkRequest::new("same\ninput");
        assert_eq!(
            compositor.render(&source, &request),
            compositor.render(&source, &request)
        );
    }
}
