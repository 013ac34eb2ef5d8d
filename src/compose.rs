//! Raster execution of a [`CompositionPlan`].
//!
//! Fills the canvas with the background color where the policy calls for
//! it, then performs every blit: unscaled copies for center and tile,
//! triangle-filtered resampling for stretch, fit and fill.
//!
//! # Example
//!
//! ```
//! use image::RgbaImage;
//! use wallfit::{BackgroundColor, Composed, FitPolicy, Size, compose};
//!
//! let thumbnail = RgbaImage::new(256, 256);
//! let out = compose(thumbnail, Size::new(228, 128), FitPolicy::Fit, BackgroundColor::WHITE)
//!     .unwrap();
//!
//! assert!(out.is_resized());
//! assert_eq!(out.into_image().dimensions(), (228, 128));
//! ```

use image::imageops::{self, FilterType};
use image::{GenericImageView, Rgba, RgbaImage};

use crate::color::BackgroundColor;
use crate::geometry::{Blit, CompositionPlan, FitPolicy, PlanError, Size, plan};

/// Resampling filter for scaled blits. Bilinear, never nearest neighbour.
pub const SCALE_FILTER: FilterType = FilterType::Triangle;

/// Outcome of [`compose`].
#[derive(Clone, Debug, PartialEq)]
pub enum Composed {
    /// A new image of exactly the canvas size. The source was released.
    Resized(RgbaImage),
    /// The source already had the canvas size and is handed back untouched.
    Unchanged(RgbaImage),
}

impl Composed {
    /// Whether a new image was produced.
    pub fn is_resized(&self) -> bool {
        matches!(self, Composed::Resized(_))
    }

    /// The resulting image, whichever branch was taken.
    pub fn into_image(self) -> RgbaImage {
        match self {
            Composed::Resized(img) | Composed::Unchanged(img) => img,
        }
    }
}

/// Compositing error.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ComposeError {
    /// The source or canvas has a zero dimension.
    #[error(transparent)]
    Plan(#[from] PlanError),
    /// Raw pixel data does not have exactly `width × height × 4` bytes.
    #[error("source buffer of {len} bytes does not hold a {width}×{height} RGBA image")]
    MalformedSource { width: u32, height: u32, len: usize },
    /// The image handed to [`render`] is not the size its plan was made for.
    #[error("source is {actual} but the plan expects {expected}")]
    SourceMismatch { expected: Size, actual: Size },
}

/// Composite `source` onto a `canvas`-sized image under `policy`.
///
/// Takes ownership of `source`. When its dimensions already equal `canvas`
/// it is returned as [`Composed::Unchanged`] for every policy. Otherwise a
/// new image is built and the source is dropped before returning.
pub fn compose(
    source: RgbaImage,
    canvas: Size,
    policy: FitPolicy,
    background: BackgroundColor,
) -> Result<Composed, ComposeError> {
    let (w, h) = source.dimensions();
    let plan = plan(Size::new(w, h), canvas, policy)?;

    if plan.source == canvas {
        tracing::trace!(%canvas, %policy, "source already matches canvas");
        return Ok(Composed::Unchanged(source));
    }

    Ok(Composed::Resized(render(&source, &plan, background)?))
}

/// Like [`compose`], for raw RGBA8 rows as delivered by a thumbnail provider.
///
/// Rows must be tightly packed: the buffer is exactly `width × height × 4`
/// bytes, with no row padding.
pub fn compose_raw(
    width: u32,
    height: u32,
    rgba: Vec<u8>,
    canvas: Size,
    policy: FitPolicy,
    background: BackgroundColor,
) -> Result<Composed, ComposeError> {
    let len = rgba.len();
    let malformed = ComposeError::MalformedSource { width, height, len };
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|px| px.checked_mul(4));
    if expected != Some(len) {
        return Err(malformed);
    }
    let source = RgbaImage::from_raw(width, height, rgba).ok_or(malformed)?;
    compose(source, canvas, policy, background)
}

/// Execute `plan` against `source` into a freshly allocated canvas.
///
/// Fails with [`ComposeError::SourceMismatch`] unless `source` has the
/// plan's source dimensions.
pub fn render(
    source: &RgbaImage,
    plan: &CompositionPlan,
    background: BackgroundColor,
) -> Result<RgbaImage, ComposeError> {
    let (w, h) = source.dimensions();
    let actual = Size::new(w, h);
    if actual != plan.source {
        return Err(ComposeError::SourceMismatch {
            expected: plan.source,
            actual,
        });
    }

    tracing::debug!(
        source = %plan.source,
        canvas = %plan.canvas,
        policy = %plan.policy,
        source_rect = ?plan.source_rect,
        dest_rect = ?plan.dest_rect,
        "compositing"
    );

    let Size { width, height } = plan.canvas;
    let mut canvas = if plan.needs_background() {
        RgbaImage::from_pixel(width, height, Rgba(background.to_rgba()))
    } else {
        RgbaImage::new(width, height)
    };

    for blit in plan.blits() {
        tracing::trace!(?blit.source, ?blit.dest, scaled = blit.is_scaled(), "blit");
        apply_blit(&mut canvas, source, &blit);
    }

    Ok(canvas)
}

fn apply_blit(canvas: &mut RgbaImage, source: &RgbaImage, blit: &Blit) {
    let src = blit.source;
    let region = source.view(src.x, src.y, src.width, src.height);
    let (dx, dy) = (i64::from(blit.dest.x), i64::from(blit.dest.y));

    if blit.is_scaled() {
        let scaled = imageops::resize(
            &region.to_image(),
            blit.dest.width,
            blit.dest.height,
            SCALE_FILTER,
        );
        imageops::replace(canvas, &scaled, dx, dy);
    } else {
        imageops::replace(canvas, &*region, dx, dy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, px: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba(px))
    }

    /// Resampling may be off by one per channel.
    fn close(a: [u8; 4], b: [u8; 4]) -> bool {
        a.iter().zip(b).all(|(&x, y)| x.abs_diff(y) <= 1)
    }

    const RED: [u8; 4] = [200, 10, 10, 255];
    const BG: BackgroundColor = BackgroundColor::rgb(0, 0, 255);

    #[test]
    fn same_size_is_unchanged_for_every_policy() {
        for policy in FitPolicy::ALL {
            let src = solid(30, 20, RED);
            let out = compose(src.clone(), Size::new(30, 20), policy, BG).unwrap();
            assert_eq!(out, Composed::Unchanged(src), "{policy}");
        }
    }

    #[test]
    fn output_has_canvas_dimensions() {
        for policy in FitPolicy::ALL {
            let out = compose(solid(30, 20, RED), Size::new(17, 41), policy, BG).unwrap();
            assert!(out.is_resized());
            assert_eq!(out.into_image().dimensions(), (17, 41), "{policy}");
        }
    }

    #[test]
    fn zero_canvas_is_rejected() {
        let err = compose(solid(3, 3, RED), Size::new(0, 4), FitPolicy::Fit, BG).unwrap_err();
        assert_eq!(err, ComposeError::Plan(PlanError::ZeroCanvasDimension));
    }

    #[test]
    fn zero_source_is_rejected() {
        let err = compose(RgbaImage::new(0, 5), Size::new(4, 4), FitPolicy::Fill, BG).unwrap_err();
        assert_eq!(err, ComposeError::Plan(PlanError::ZeroSourceDimension));
    }

    #[test]
    fn raw_buffer_too_short_is_rejected() {
        let err = compose_raw(4, 4, vec![0; 15], Size::new(8, 8), FitPolicy::Fit, BG).unwrap_err();
        assert_eq!(
            err,
            ComposeError::MalformedSource {
                width: 4,
                height: 4,
                len: 15
            }
        );
    }

    #[test]
    fn raw_buffer_with_row_padding_is_rejected() {
        // 2×2 with 4 bytes of padding per row.
        let err = compose_raw(2, 2, vec![0; 24], Size::new(8, 8), FitPolicy::Fit, BG).unwrap_err();
        assert_eq!(
            err,
            ComposeError::MalformedSource {
                width: 2,
                height: 2,
                len: 24
            }
        );
    }

    #[test]
    fn render_rejects_source_of_wrong_size() {
        let plan = plan(Size::new(100, 100), Size::new(50, 50), FitPolicy::Center).unwrap();
        let err = render(&RgbaImage::new(10, 10), &plan, BackgroundColor::BLACK).unwrap_err();
        assert_eq!(
            err,
            ComposeError::SourceMismatch {
                expected: Size::new(100, 100),
                actual: Size::new(10, 10)
            }
        );
    }

    #[test]
    fn render_matches_compose() {
        let src = solid(8, 4, RED);
        let plan = plan(Size::new(8, 4), Size::new(16, 16), FitPolicy::Center).unwrap();
        let rendered = render(&src, &plan, BG).unwrap();
        let composed = compose(src, Size::new(16, 16), FitPolicy::Center, BG)
            .unwrap()
            .into_image();
        assert_eq!(rendered, composed);
    }

    #[test]
    fn raw_buffer_composes() {
        let rgba = [9, 9, 9, 255].repeat(4);
        let out = compose_raw(2, 2, rgba, Size::new(4, 4), FitPolicy::Stretch, BG).unwrap();
        let img = out.into_image();
        assert_eq!(img.dimensions(), (4, 4));
        assert!(img.pixels().all(|p| close(p.0, [9, 9, 9, 255])));
    }

    #[test]
    fn center_pads_with_exact_background() {
        let out = compose(solid(2, 2, RED), Size::new(6, 4), FitPolicy::Center, BG)
            .unwrap()
            .into_image();
        for (x, y, px) in out.enumerate_pixels() {
            let inside = (2..4).contains(&x) && (1..3).contains(&y);
            let expected = if inside { RED } else { BG.to_rgba() };
            assert_eq!(px.0, expected, "({x},{y})");
        }
    }

    #[test]
    fn stretch_of_solid_color_stays_solid() {
        let out = compose(solid(3, 5, RED), Size::new(40, 7), FitPolicy::Stretch, BG)
            .unwrap()
            .into_image();
        assert!(out.pixels().all(|p| close(p.0, RED)));
    }
}
