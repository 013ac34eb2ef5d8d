//! Wallpaper fitting: maps an image of any size onto a desktop canvas.
//!
//! The geometry is pure and `no_std` compatible; pixel work sits behind the
//! `raster` feature.
//!
//! # Modules
//!
//! - [`geometry`]: Fit policies (center, tile, stretch, fit, fill, span) and plan computation
//! - [`color`]: Background color parsing and `COLORREF` conversion
//! - [`cache`]: Fixed-capacity most-recently-used cache
//! - [`settings`]: Compositing settings and their text form (feature `alloc`)
//! - [`compose`]: Executes a plan on RGBA pixels (feature `raster`)
//! - [`thumbnail`]: Cached playlist thumbnails (feature `raster`)
//! - `svg`: Plan visualization (feature `svg`)

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod cache;
pub mod color;
pub mod geometry;

#[cfg(feature = "alloc")]
pub mod settings;

#[cfg(feature = "raster")]
pub mod compose;
#[cfg(feature = "raster")]
pub mod thumbnail;

#[cfg(feature = "svg")]
pub mod svg;

pub use cache::ThumbnailCache;
pub use color::{BackgroundColor, ColorParseError};
pub use geometry::{
    Blit, Blits, CompositionPlan, FitPolicy, PlanError, PolicyParseError, Rect, Size, plan,
};

#[cfg(feature = "alloc")]
pub use settings::Settings;

#[cfg(feature = "raster")]
pub use compose::{ComposeError, Composed, compose, compose_raw, render};
#[cfg(feature = "raster")]
pub use thumbnail::{ThumbnailError, Thumbnailer, thumbnail_size};
