//! Watermark geometry: font sizing, anchor selection and on-canvas clamping.
//!
//! All coordinates are signed so that oversized text can be expressed before
//! it is clamped back inside the padded image area.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::Error;

/// Margin kept between the text block and the image edges, in pixels.
pub const PADDING: i64 = 20;

/// Offset of the drop shadow from the main text, in pixels (both axes).
pub const SHADOW_OFFSET: i64 = 2;

/// Vertical gap inserted between consecutive lines of text, in pixels.
pub const LINE_SPACING: u32 = 4;

/// Smallest font size produced by [`font_size`], in pixels.
pub const MIN_FONT_SIZE: u32 = 12;

/// Accepted range of the text size, as percent of the image width.
pub const SIZE_PERCENT_RANGE: RangeInclusive<u32> = 2..=15;

/// Accepted range of the watermark alpha.
pub const OPACITY_RANGE: RangeInclusive<u8> = 50..=255;

/// Where the watermark is anchored on the image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Position {
    /// Bottom-right corner, inset by [`PADDING`].
    #[default]
    BottomRight,
    /// Bottom-left corner, inset by [`PADDING`].
    BottomLeft,
    /// Top-right corner, inset by [`PADDING`].
    TopRight,
    /// Top-left corner, inset by [`PADDING`].
    TopLeft,
    /// Centered on both axes.
    Center,
}

impl Position {
    /// All positions, in the order they are offered to users.
    pub const ALL: [Position; 5] = [
        Position::BottomRight,
        Position::BottomLeft,
        Position::TopRight,
        Position::TopLeft,
        Position::Center,
    ];

    /// Human-readable label, e.g. `"Bottom Right"`.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Position::BottomRight => "Bottom Right",
            Position::BottomLeft => "Bottom Left",
            Position::TopRight => "Top Right",
            Position::TopLeft => "Top Left",
            Position::Center => "Center",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Position {
    type Err = Error;

    /// Accepts `"Bottom Right"`, `"bottom-right"`, `"bottom_right"` and
    /// `"BottomRight"`, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "bottomright" => Ok(Position::BottomRight),
            "bottomleft" => Ok(Position::BottomLeft),
            "topright" => Ok(Position::TopRight),
            "topleft" => Ok(Position::TopLeft),
            "center" | "centre" => Ok(Position::Center),
            _ => Err(Error::InvalidPosition(s.to_string())),
        }
    }
}

/// Font size in pixels for an image of `image_width` pixels.
///
/// `max(12, floor(image_width * size_percent / 100))`.
#[must_use]
pub fn font_size(image_width: u32, size_percent: u32) -> u32 {
    let scaled = u64::from(image_width) * u64::from(size_percent) / 100;
    u32::try_from(scaled)
        .unwrap_or(u32::MAX)
        .max(MIN_FONT_SIZE)
}

/// Ideal top-left corner of a `text_width` x `text_height` block, before
/// clamping.
#[must_use]
pub fn anchor(
    position: Position,
    image_width: u32,
    image_height: u32,
    text_width: u32,
    text_height: u32,
) -> (i64, i64) {
    let (w, h) = (i64::from(image_width), i64::from(image_height));
    let (tw, th) = (i64::from(text_width), i64::from(text_height));

    match position {
        Position::BottomRight => (w - tw - PADDING, h - th - PADDING),
        Position::BottomLeft => (PADDING, h - th - PADDING),
        Position::TopRight => (w - tw - PADDING, PADDING),
        Position::TopLeft => (PADDING, PADDING),
        Position::Center => ((w - tw).div_euclid(2), (h - th).div_euclid(2)),
    }
}

/// Clamp one axis of an anchor into `[PADDING, extent - size - PADDING]`.
///
/// When the block does not fit (`size + 2 * PADDING > extent`) the upper
/// bound falls below the lower one and the padded edge wins.
#[must_use]
pub fn clamp_axis(value: i64, extent: u32, size: u32) -> i64 {
    let upper = i64::from(extent) - i64::from(size) - PADDING;
    value.min(upper).max(PADDING)
}

/// Clamp both axes of an anchor so the block stays inside the padded image.
#[must_use]
pub fn clamp_anchor(
    (x, y): (i64, i64),
    image_width: u32,
    image_height: u32,
    text_width: u32,
    text_height: u32,
) -> (i64, i64) {
    (
        clamp_axis(x, image_width, text_width),
        clamp_axis(y, image_height, text_height),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_size_is_percent_of_width_with_floor() {
        for width in [1u32, 50, 199, 200, 640, 800, 1023, 4096] {
            for percent in SIZE_PERCENT_RANGE {
                let expected = (width * percent / 100).max(12);
                assert_eq!(
                    font_size(width, percent),
                    expected,
                    "width={width} percent={percent}"
                );
            }
        }
    }

    #[test]
    fn font_size_examples() {
        assert_eq!(font_size(800, 6), 48);
        assert_eq!(font_size(50, 15), 12);
        assert_eq!(font_size(333, 10), 33);
    }

    #[test]
    fn anchor_matches_position_formulas() {
        let (w, h, tw, th) = (400, 300, 100, 30);
        assert_eq!(anchor(Position::BottomRight, w, h, tw, th), (280, 250));
        assert_eq!(anchor(Position::BottomLeft, w, h, tw, th), (20, 250));
        assert_eq!(anchor(Position::TopRight, w, h, tw, th), (280, 20));
        assert_eq!(anchor(Position::TopLeft, w, h, tw, th), (20, 20));
        assert_eq!(anchor(Position::Center, w, h, tw, th), (150, 135));
    }

    #[test]
    fn center_anchor_uses_floor_division() {
        assert_eq!(anchor(Position::Center, 101, 51, 10, 10), (45, 20));
        assert_eq!(anchor(Position::Center, 10, 10, 15, 15), (-3, -3));
    }

    #[test]
    fn clamp_keeps_fitting_anchors_unchanged() {
        for position in Position::ALL {
            let ideal = anchor(position, 400, 300, 100, 30);
            assert_eq!(clamp_anchor(ideal, 400, 300, 100, 30), ideal, "{position}");
        }
    }

    #[test]
    fn clamp_prefers_padding_when_text_overflows() {
        assert_eq!(clamp_axis(-500, 50, 400), PADDING);
        assert_eq!(clamp_axis(500, 50, 400), PADDING);
        let ideal = anchor(Position::BottomRight, 50, 50, 400, 14);
        assert_eq!(clamp_anchor(ideal, 50, 50, 400, 14), (PADDING, PADDING));
    }

    #[test]
    fn clamp_pulls_overshoot_back_to_bounds() {
        assert_eq!(clamp_axis(0, 400, 100), PADDING);
        assert_eq!(clamp_axis(395, 400, 100), 280);
    }

    #[test]
    fn clamp_is_idempotent() {
        for extent in [0u32, 10, 40, 41, 100, 800] {
            for size in [0u32, 1, 10, 60, 500] {
                for value in [-1000i64, -1, 0, 19, 20, 21, 300, 5000] {
                    let once = clamp_axis(value, extent, size);
                    assert_eq!(clamp_axis(once, extent, size), once);
                }
            }
        }
    }

    #[test]
    fn position_parses_common_spellings() {
        assert_eq!("Bottom Right".parse::<Position>().unwrap(), Position::BottomRight);
        assert_eq!("bottom-left".parse::<Position>().unwrap(), Position::BottomLeft);
        assert_eq!("TOP_RIGHT".parse::<Position>().unwrap(), Position::TopRight);
        assert_eq!("TopLeft".parse::<Position>().unwrap(), Position::TopLeft);
        assert_eq!("center".parse::<Position>().unwrap(), Position::Center);
    }

    #[test]
    fn position_rejects_unknown_names() {
        let err = "middle".parse::<Position>().unwrap_err();
        assert!(matches!(err, Error::InvalidPosition(ref s) if s == "middle"));
    }

    #[test]
    fn position_display_round_trips() {
        for position in Position::ALL {
            assert_eq!(position.to_string().parse::<Position>().unwrap(), position);
        }
    }
}
