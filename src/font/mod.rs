//! Font resolution.
//!
//! A named TrueType/OpenType face is looked up on disk once and shared
//! read-only. When nothing loads, a copy of DejaVu Sans compiled into the
//! binary takes over at a fixed size, so rendering never fails for lack of a
//! font.
//!
//! Sizes are pixels per em, the way typesetting tools count them: at size 48
//! a capital letter of DejaVu Sans is about 35 px tall.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use tracing::{debug, warn};

/// Font looked up when the caller does not name one.
pub const DEFAULT_FONT_NAME: &str = "DejaVuSans.ttf";

/// Size the built-in face is drawn at, whatever size was asked for.
pub const BUILTIN_FONT_SIZE: u32 = 12;

const EMBEDDED_FONT_DATA: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

static EMBEDDED_FONT: OnceLock<FontArc> = OnceLock::new();

/// Directories searched for a bare font file name, after the current directory.
const FONT_DIRECTORIES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu",
    "/usr/share/fonts/TTF",
    "/usr/share/fonts/dejavu",
    "/usr/share/fonts/dejavu-sans-fonts",
    "/usr/share/fonts/truetype",
    "/usr/local/share/fonts",
    "/Library/Fonts",
    "/System/Library/Fonts",
    "C:\\Windows\\Fonts",
];

/// The face compiled into the crate.
///
/// # Panics
///
/// Only if the bundled font file is corrupt, which the unit tests rule out.
fn embedded_face() -> &'static FontArc {
    EMBEDDED_FONT.get_or_init(|| {
        FontArc::try_from_slice(EMBEDDED_FONT_DATA).expect("bundled DejaVuSans.ttf is a valid font")
    })
}

/// A loaded font face, independent of size.
///
/// Cloning is cheap: outline data is reference counted and never mutated.
#[derive(Clone)]
pub enum FontSource {
    /// A parsed TrueType/OpenType face, drawn at whatever size is asked for.
    Outline(FontArc),
    /// The bundled face, always drawn at [`BUILTIN_FONT_SIZE`].
    Builtin,
}

impl FontSource {
    /// Resolve `name` to a face, falling back to [`FontSource::Builtin`].
    ///
    /// `name` may be a path. A bare file name is also searched for in the
    /// usual system font directories.
    #[must_use]
    pub fn resolve(name: &str) -> Self {
        for path in candidate_paths(name) {
            if let Some(font) = load_face(&path) {
                debug!(path = %path.display(), "loaded watermark font");
                return FontSource::Outline(font);
            }
        }

        warn!(
            font = name,
            size = BUILTIN_FONT_SIZE,
            "font not available, using built-in face"
        );
        FontSource::Builtin
    }

    /// The bundled DejaVu Sans as a scalable face.
    ///
    /// Unlike [`FontSource::Builtin`] this honours the requested size, and it
    /// does not depend on what is installed on the machine.
    #[must_use]
    pub fn embedded() -> Self {
        FontSource::Outline(embedded_face().clone())
    }

    /// Parse an in-memory font file. Returns `None` if the data is not a font.
    #[must_use]
    pub fn from_bytes(data: Vec<u8>) -> Option<Self> {
        FontArc::try_from_vec(data).ok().map(FontSource::Outline)
    }

    /// Whether this is the built-in fixed-size face.
    #[must_use]
    pub fn is_builtin(&self) -> bool {
        matches!(self, FontSource::Builtin)
    }

    /// A handle for drawing at `size` pixels per em.
    ///
    /// The built-in face ignores `size`.
    #[must_use]
    pub fn at_size(&self, size: u32) -> FontHandle {
        match self {
            FontSource::Outline(font) => FontHandle::new(font.clone(), size, false),
            FontSource::Builtin => FontHandle::new(embedded_face().clone(), BUILTIN_FONT_SIZE, true),
        }
    }
}

impl fmt::Debug for FontSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontSource::Outline(_) => f.write_str("FontSource::Outline"),
            FontSource::Builtin => f.write_str("FontSource::Builtin"),
        }
    }
}

/// A face ready to lay out text at a particular size.
#[derive(Clone)]
pub struct FontHandle {
    font: FontArc,
    scale: PxScale,
    size: u32,
    builtin: bool,
}

impl FontHandle {
    fn new(font: FontArc, size: u32, builtin: bool) -> Self {
        let scale = em_scale(&font, size);
        Self {
            font,
            scale,
            size,
            builtin,
        }
    }

    /// The face.
    #[must_use]
    pub fn font(&self) -> &FontArc {
        &self.font
    }

    /// Scale to hand to `ab_glyph`. Its height is the ascent-to-descent
    /// distance, which is larger than the em.
    #[must_use]
    pub fn scale(&self) -> PxScale {
        self.scale
    }

    /// Pixels per em actually used.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Distance from the top of a line to its baseline, rounded up.
    ///
    /// Consecutive lines are this far apart plus the line spacing.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn line_height(&self) -> u32 {
        self.font.as_scaled(self.scale).ascent().ceil().max(0.0) as u32
    }

    /// Whether this is the built-in fixed-size face.
    #[must_use]
    pub fn is_builtin(&self) -> bool {
        self.builtin
    }
}

impl fmt::Debug for FontHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontHandle")
            .field("size", &self.size)
            .field("builtin", &self.builtin)
            .finish_non_exhaustive()
    }
}

/// Resolve `name` and scale it to `size` pixels per em. Never fails; see
/// [`FontSource::resolve`].
#[must_use]
pub fn resolve_font(name: &str, size: u32) -> FontHandle {
    FontSource::resolve(name).at_size(size)
}

/// `ab_glyph` scales so that ascent minus descent spans the given pixels.
/// Convert an em size into that unit.
#[allow(clippy::cast_precision_loss)] // font sizes are far below 2^24
fn em_scale<F: Font>(font: &F, size: u32) -> PxScale {
    let size = size as f32;
    match font.units_per_em() {
        Some(units) if units > 0.0 => PxScale::from(size * font.height_unscaled() / units),
        _ => PxScale::from(size),
    }
}

fn candidate_paths(name: &str) -> Vec<PathBuf> {
    if name.is_empty() {
        return Vec::new();
    }

    let direct = PathBuf::from(name);
    let bare = direct.components().count() == 1;
    let mut paths = vec![direct];
    if bare {
        paths.extend(FONT_DIRECTORIES.iter().map(|dir| Path::new(dir).join(name)));
    }
    paths
}

fn load_face(path: &Path) -> Option<FontArc> {
    if !path.is_file() {
        return None;
    }

    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "cannot read font file");
            return None;
        }
    };

    match FontArc::try_from_vec(data) {
        Ok(font) => Some(font),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "not a usable font file");
            None
        }
    }
}
