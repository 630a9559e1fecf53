//! Library for turning one raster image into Windows ICO, Apple ICNS, and
//! web icon files at multiple sizes.
//!
//! The conversion runs in stages:
//!
//! 1. [`acquire()`] collects bytes from a possibly slow stream, sniffing
//!    their format with a [`Sniffer`] as they arrive.
//! 2. [`decode()`] turns PNG or JPEG bytes into an [`Image`].
//! 3. Each [`Profile`] plans its sizes, which are [`resample()`]d from the
//!    source and packed into an [`IconDir`] (ICO), an [`IconFamily`]
//!    (ICNS), or a set of standalone PNGs.
//!
//! See <https://en.wikipedia.org/wiki/ICO_(file_format)> and
//! <https://en.wikipedia.org/wiki/Apple_Icon_Image_format> for more
//! information about the container formats.

#![warn(missing_docs)]

mod acquire;
mod decode;
mod element;
mod error;
mod family;
mod icondir;
mod icontype;
mod image;
#[cfg(feature = "jpegio")]
mod jpegio;
pub mod pipeline;
mod pngio;
mod profile;
mod resample;
mod sniff;

pub use crate::acquire::{acquire, Acquired, IdleTimer, RawBlob,
                         DEFAULT_IDLE_TIMEOUT};
pub use crate::decode::decode;
pub use crate::element::IconElement;
pub use crate::error::{Error, Result};
pub use crate::family::IconFamily;
pub use crate::icondir::{IconDir, IconDirEntry};
pub use crate::icontype::{IconType, OSType};
pub use crate::image::{Image, PixelFormat};
pub use crate::pipeline::{Artifact, ProfileOutcome, RunContext};
pub use crate::profile::{OutputKind, Profile, SizeSpec};
pub use crate::resample::{resample, Quality};
pub use crate::sniff::{is_icns, DetectedType, Matcher, Sniffer,
                       MIN_PREFIX_LEN};
