//! Multi-line text layout, measurement and drawing.
//!
//! Text is split on `\n`. Every line starts at x = 0 and line `i` starts
//! `i * (ascent + LINE_SPACING)` pixels below the first. The layout's
//! bounding box is the tight box around all inked pixels, and drawing places
//! the top-left of that box at the requested point.

use ab_glyph::{point, Font, GlyphId, OutlinedGlyph, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};

use crate::blending::paint;
use crate::font::FontHandle;
use crate::placement::LINE_SPACING;

/// Tight pixel bounds of laid-out ink, `min` inclusive and `max` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    /// Left edge.
    pub min_x: i64,
    /// Top edge.
    pub min_y: i64,
    /// Right edge (exclusive).
    pub max_x: i64,
    /// Bottom edge (exclusive).
    pub max_y: i64,
}

impl Bounds {
    fn union(self, other: Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        u32::try_from(self.max_x - self.min_x).unwrap_or(0)
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        u32::try_from(self.max_y - self.min_y).unwrap_or(0)
    }
}

/// A block of text laid out with a particular face.
pub struct TextLayout {
    glyphs: Vec<OutlinedGlyph>,
    bounds: Option<Bounds>,
    line_count: usize,
}

impl TextLayout {
    /// Lay out `text` with `font`.
    #[must_use]
    pub fn new(font: &FontHandle, text: &str) -> Self {
        let pitch = i64::from(font.line_height() + LINE_SPACING);
        let mut layout = TextLayout {
            glyphs: Vec::new(),
            bounds: None,
            line_count: 0,
        };

        for (index, line) in text.split('\n').enumerate() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            let top = i64::try_from(index).unwrap_or(i64::MAX) * pitch;
            layout.push_line(font.font(), font.scale(), line, top);
            layout.line_count += 1;
        }

        layout
    }

    #[allow(clippy::cast_precision_loss)]
    fn push_line<F: Font>(&mut self, font: &F, scale: PxScale, line: &str, top: i64) {
        let scaled = font.as_scaled(scale);
        let baseline = top as f32 + scaled.ascent();
        let mut caret = 0.0f32;
        let mut previous: Option<GlyphId> = None;

        for c in line.chars() {
            let id = scaled.glyph_id(c);
            if let Some(previous) = previous {
                caret += scaled.kern(previous, id);
            }
            let glyph = id.with_scale_and_position(scale, point(caret, baseline));
            caret += scaled.h_advance(id);
            previous = Some(id);

            if let Some(outlined) = font.outline_glyph(glyph) {
                self.extend_bounds(outline_bounds(&outlined));
                self.glyphs.push(outlined);
            }
        }
    }

    fn extend_bounds(&mut self, bounds: Bounds) {
        self.bounds = Some(match self.bounds {
            Some(existing) => existing.union(bounds),
            None => bounds,
        });
    }

    /// Tight bounds of the inked pixels, or `None` if nothing is visible.
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    /// Width of the tight bounding box; zero for blank text.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.bounds.map_or(0, |b| b.width())
    }

    /// Height of the tight bounding box; zero for blank text.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.bounds.map_or(0, |b| b.height())
    }

    /// Number of lines, including empty ones.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Draw the block so that the top-left of its bounding box lands on
    /// (`x`, `y`).
    ///
    /// Each covered pixel moves toward `(color, opacity)` by the glyph's
    /// coverage, replacing rather than stacking on what is already there.
    /// Pixels outside the canvas are skipped.
    pub fn draw(&self, canvas: &mut RgbaImage, x: i64, y: i64, color: [u8; 3], opacity: u8) {
        let Some(bounds) = self.bounds else {
            return;
        };
        let origin_x = x - bounds.min_x;
        let origin_y = y - bounds.min_y;
        let [r, g, b] = color;
        let ink = Rgba([r, g, b, opacity]);

        for glyph in &self.glyphs {
            let glyph_bounds = outline_bounds(glyph);
            let left = origin_x + glyph_bounds.min_x;
            let top = origin_y + glyph_bounds.min_y;
            glyph.draw(|gx, gy, coverage| {
                paint_pixel(canvas, left + i64::from(gx), top + i64::from(gy), ink, coverage);
            });
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn outline_bounds(glyph: &OutlinedGlyph) -> Bounds {
    let rect = glyph.px_bounds();
    Bounds {
        min_x: rect.min.x.floor() as i64,
        min_y: rect.min.y.floor() as i64,
        max_x: rect.max.x.ceil() as i64,
        max_y: rect.max.y.ceil() as i64,
    }
}

fn paint_pixel(canvas: &mut RgbaImage, x: i64, y: i64, ink: Rgba<u8>, coverage: f32) {
    let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
        return;
    };
    if x >= canvas.width() || y >= canvas.height() || coverage <= 0.0 {
        return;
    }
    paint(canvas.get_pixel_mut(x, y), ink, coverage);
}
