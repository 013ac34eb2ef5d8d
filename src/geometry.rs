//! Fit planning for wallpaper compositing.
//!
//! Maps a source image onto a destination canvas under a [`FitPolicy`],
//! producing the source and destination rectangles of every copy. Pure
//! geometry: no pixel operations, no allocations, `no_std` compatible.
//!
//! # Example
//!
//! ```
//! use wallfit::{FitPolicy, Rect, Size, plan};
//!
//! let plan = plan(Size::new(16, 9), Size::new(100, 100), FitPolicy::Fit).unwrap();
//!
//! // Width constrains: full width, letterboxed top and bottom.
//! assert_eq!(plan.dest_rect, Rect::new(0, 22, 100, 56));
//! assert!(plan.needs_background());
//! ```

use core::fmt;
use core::str::FromStr;

use num_traits::Float;

/// How a source image is mapped onto a canvas of a different size.
///
/// The numeric codes match the desktop wallpaper position values used by
/// the Windows shell, so a stored code can be passed straight through.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FitPolicy {
    /// Native size, centered. Cropped if larger than the canvas, padded
    /// with the background color if smaller.
    Center = 0,

    /// Native size, repeated from the top-left corner. The last column and
    /// row are clipped.
    Tile = 1,

    /// Scaled to the exact canvas size, distorting aspect ratio.
    Stretch = 2,

    /// Scaled to fit within the canvas, preserving aspect ratio.
    /// Letterboxed or pillarboxed with the background color.
    Fit = 3,

    /// Scaled to cover the canvas, preserving aspect ratio. Overflow is
    /// cropped evenly from both sides.
    #[default]
    Fill = 4,

    /// Planned exactly like [`Fill`](Self::Fill). Spanning across monitors
    /// is done by the shell when it paints the desktop.
    Span = 5,
}

impl FitPolicy {
    /// All policies, in code order.
    pub const ALL: [FitPolicy; 6] = [
        FitPolicy::Center,
        FitPolicy::Tile,
        FitPolicy::Stretch,
        FitPolicy::Fit,
        FitPolicy::Fill,
        FitPolicy::Span,
    ];

    /// Look up a policy by its numeric code.
    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Center),
            1 => Some(Self::Tile),
            2 => Some(Self::Stretch),
            3 => Some(Self::Fit),
            4 => Some(Self::Fill),
            5 => Some(Self::Span),
            _ => None,
        }
    }

    /// Numeric code of this policy.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Lowercase name, as accepted by [`FromStr`].
    pub const fn name(self) -> &'static str {
        match self {
            Self::Center => "center",
            Self::Tile => "tile",
            Self::Stretch => "stretch",
            Self::Fit => "fit",
            Self::Fill => "fill",
            Self::Span => "span",
        }
    }

    /// Whether the canvas is painted with the background color before the
    /// image is copied in.
    pub const fn uses_background(self) -> bool {
        matches!(self, Self::Center | Self::Fit)
    }
}

impl fmt::Display for FitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string names no [`FitPolicy`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown fit policy (expected center|tile|stretch|fit|fill|span or 0-5)")]
pub struct PolicyParseError;

impl FromStr for FitPolicy {
    type Err = PolicyParseError;

    /// Parse a policy name (case-insensitive) or numeric code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<u32>() {
            return Self::from_code(code).ok_or(PolicyParseError);
        }
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or(PolicyParseError)
    }
}

/// Width × height dimensions in pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Size {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Size {
    /// Create a new size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether either dimension is zero.
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width divided by height.
    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{}", self.width, self.height)
    }
}

/// Axis-aligned rectangle in pixel coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// Create a new rect.
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rect covering a whole image of the given size.
    pub const fn full(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    /// Dimensions of this rect.
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Exclusive right edge, saturating at `u32::MAX`.
    pub const fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge, saturating at `u32::MAX`.
    pub const fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Whether this rect lies entirely within `(0, 0, bounds)`.
    pub const fn fits_within(&self, bounds: Size) -> bool {
        self.right() <= bounds.width && self.bottom() <= bounds.height
    }

    /// Whether this rect covers the full image (no actual crop or pad).
    pub fn is_full(&self, size: Size) -> bool {
        *self == Self::full(size)
    }

    /// Whether the pixel `(x, y)` lies inside this rect.
    pub const fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// One copy operation: read `source`, write `dest`.
///
/// When the two sizes differ the copy is scaled.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Blit {
    /// Region of the source image to read.
    pub source: Rect,
    /// Region of the canvas to write.
    pub dest: Rect,
}

impl Blit {
    /// Whether this copy resamples (source and destination sizes differ).
    pub fn is_scaled(&self) -> bool {
        self.source.size() != self.dest.size()
    }
}

/// Computed plan for compositing a source image onto a canvas.
///
/// For every policy except tiling the plan is a single [`Blit`] from
/// `source_rect` to `dest_rect`. A tiled plan repeats the full source
/// across `dest_rect`; [`blits`](Self::blits) enumerates the placements.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CompositionPlan {
    /// Policy the plan was computed for.
    pub policy: FitPolicy,
    /// Source image dimensions.
    pub source: Size,
    /// Canvas dimensions.
    pub canvas: Size,
    /// Region of the source that is read.
    pub source_rect: Rect,
    /// Region of the canvas that receives image pixels.
    pub dest_rect: Rect,
    /// Whether `source_rect` is repeated across `dest_rect`.
    pub tiled: bool,
}

impl CompositionPlan {
    /// Whether the canvas must be filled with the background color first.
    pub fn needs_background(&self) -> bool {
        self.policy.uses_background()
    }

    /// Whether any copy in this plan resamples.
    pub fn needs_scaling(&self) -> bool {
        !self.tiled && self.source_rect.size() != self.dest_rect.size()
    }

    /// Whether image pixels reach every canvas pixel.
    pub fn covers_canvas(&self) -> bool {
        self.dest_rect.is_full(self.canvas)
    }

    /// Every copy to perform, in drawing order.
    pub fn blits(&self) -> Blits {
        if self.tiled {
            Blits::Tiles {
                tile: self.source_rect.size(),
                canvas: self.canvas,
                x: 0,
                y: 0,
            }
        } else {
            Blits::Single(Some(Blit {
                source: self.source_rect,
                dest: self.dest_rect,
            }))
        }
    }
}

/// Iterator over the copies of a [`CompositionPlan`].
#[derive(Clone, Debug)]
pub enum Blits {
    /// A single (possibly scaled) copy.
    Single(Option<Blit>),
    /// Unscaled tiles walked row by row from the top-left corner.
    Tiles {
        tile: Size,
        canvas: Size,
        x: u32,
        y: u32,
    },
}

impl Iterator for Blits {
    type Item = Blit;

    fn next(&mut self) -> Option<Blit> {
        match self {
            Blits::Single(blit) => blit.take(),
            Blits::Tiles { tile, canvas, x, y } => {
                if *x >= canvas.width {
                    *x = 0;
                    *y = y.saturating_add(tile.height);
                }
                if *y >= canvas.height {
                    return None;
                }
                let w = tile.width.min(canvas.width - *x);
                let h = tile.height.min(canvas.height - *y);
                let blit = Blit {
                    source: Rect::new(0, 0, w, h),
                    dest: Rect::new(*x, *y, w, h),
                };
                *x = x.saturating_add(tile.width);
                Some(blit)
            }
        }
    }
}

/// Planning error: a zero-area image or canvas.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// Source image has zero width or height.
    #[error("source image has a zero dimension")]
    ZeroSourceDimension,
    /// Canvas has zero width or height.
    #[error("canvas has a zero dimension")]
    ZeroCanvasDimension,
}

/// Compute the composition plan for `source` on `canvas` under `policy`.
pub fn plan(source: Size, canvas: Size, policy: FitPolicy) -> Result<CompositionPlan, PlanError> {
    if source.is_empty() {
        return Err(PlanError::ZeroSourceDimension);
    }
    if canvas.is_empty() {
        return Err(PlanError::ZeroCanvasDimension);
    }

    let (source_rect, dest_rect, tiled) = match policy {
        FitPolicy::Center => {
            let (src, dst) = center(source, canvas);
            (src, dst, false)
        }
        FitPolicy::Tile => tile(source, canvas),
        FitPolicy::Stretch => (Rect::full(source), Rect::full(canvas), false),
        FitPolicy::Fit => (Rect::full(source), fit_inside(source, canvas), false),
        FitPolicy::Fill | FitPolicy::Span => {
            (crop_to_cover(source, canvas), Rect::full(canvas), false)
        }
    };

    Ok(CompositionPlan {
        policy,
        source,
        canvas,
        source_rect,
        dest_rect,
        tiled,
    })
}

// ============================================================================
// Internal geometry
// ============================================================================

/// Native-size placement, centered on both axes.
fn center(source: Size, canvas: Size) -> (Rect, Rect) {
    let (sx, sw, dx) = center_1d(source.width, canvas.width);
    let (sy, sh, dy) = center_1d(source.height, canvas.height);
    (Rect::new(sx, sy, sw, sh), Rect::new(dx, dy, sw, sh))
}

/// Returns `(source_offset, length, dest_offset)` for one axis.
fn center_1d(src: u32, dst: u32) -> (u32, u32, u32) {
    if src > dst {
        ((src - dst) / 2, dst, 0)
    } else {
        (0, src, (dst - src) / 2)
    }
}

/// Tiling, or a single top-left crop when the source overhangs both axes.
fn tile(source: Size, canvas: Size) -> (Rect, Rect, bool) {
    if source.width > canvas.width && source.height > canvas.height {
        let crop = Rect::full(canvas);
        return (crop, crop, false);
    }
    (Rect::full(source), Rect::full(canvas), true)
}

/// Largest aspect-preserving rect that fits inside the canvas, centered.
fn fit_inside(source: Size, canvas: Size) -> Rect {
    let width_ratio = canvas.width as f64 / source.width as f64;
    let height_ratio = canvas.height as f64 / source.height as f64;

    // Exact comparison: near-equal ratios still take the padded branch.
    if width_ratio == height_ratio {
        return Rect::full(canvas);
    }

    let ratio = width_ratio.min(height_ratio);
    if ratio == width_ratio {
        // Full width, borders top and bottom.
        let h = scaled(source.height, ratio, canvas.height);
        let y = round_u32((canvas.height - h) as f64 / 2.0);
        Rect::new(0, y, canvas.width, h)
    } else {
        // Full height, borders left and right.
        let w = scaled(source.width, ratio, canvas.width);
        let x = round_u32((canvas.width - w) as f64 / 2.0);
        Rect::new(x, 0, w, canvas.height)
    }
}

/// Centered source crop whose aspect ratio covers the canvas exactly.
fn crop_to_cover(source: Size, canvas: Size) -> Rect {
    let width_ratio = canvas.width as f64 / source.width as f64;
    let height_ratio = canvas.height as f64 / source.height as f64;

    if width_ratio < height_ratio {
        // Full height, crop left and right.
        let (x, w) = crop_excess(source.width, canvas.width, height_ratio);
        Rect::new(x, 0, w, source.height)
    } else if width_ratio > height_ratio {
        // Full width, crop top and bottom.
        let (y, h) = crop_excess(source.height, canvas.height, width_ratio);
        Rect::new(0, y, source.width, h)
    } else {
        Rect::full(source)
    }
}

/// Returns `(offset, length)` of the source span that survives cropping
/// when `src` is scaled by `ratio` and must fit `dst`.
///
/// The excess is measured in scaled pixels and converted back to source
/// pixels. At least one source pixel always survives.
fn crop_excess(src: u32, dst: u32, ratio: f64) -> (u32, u32) {
    let scaled_len = round(src as f64 * ratio);
    let excess = round((scaled_len - dst as f64) / ratio).max(0.0);
    let excess = (excess as u32).min(src - 1);
    (excess / 2, src - excess)
}

/// `round(len * ratio)`, clamped to `1..=max`.
fn scaled(len: u32, ratio: f64, max: u32) -> u32 {
    round_u32(len as f64 * ratio).clamp(1, max)
}

/// Round half away from zero. Works without `std`.
fn round(v: f64) -> f64 {
    Float::round(v)
}

fn round_u32(v: f64) -> u32 {
    round(v) as u32
}
