use fast_image_resize as fr;
use std::io::{self, Error, ErrorKind};

use crate::image::{Image, PixelFormat};

/// A resampling quality level from 0 (fastest) to 5 (best).
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Quality(u8);

impl Quality {
    /// Nearest-neighbour sampling.
    pub const FASTEST: Quality = Quality(0);
    /// Lanczos3 convolution.
    pub const BEST: Quality = Quality(5);

    /// Creates a quality level, clamping `level` into `0..=5`.
    ///
    /// # Examples
    /// ```
    /// use iconimp::Quality;
    /// assert_eq!(Quality::new(-3), Quality::FASTEST);
    /// assert_eq!(Quality::new(99), Quality::BEST);
    /// assert_eq!(Quality::new(2).level(), 2);
    /// ```
    pub fn new(level: i32) -> Quality {
        Quality(level.clamp(0, 5) as u8)
    }

    /// Returns the numeric level.
    pub fn level(self) -> u8 {
        self.0
    }

    /// Returns the resizing algorithm this level selects.
    pub fn algorithm(self) -> fr::ResizeAlg {
        let filter = match self.0 {
            0 => return fr::ResizeAlg::Nearest,
            1 => fr::FilterType::Bilinear,
            2 => fr::FilterType::Hamming,
            3 => fr::FilterType::CatmullRom,
            4 => fr::FilterType::Mitchell,
            _ => fr::FilterType::Lanczos3,
        };
        fr::ResizeAlg::Convolution(filter)
    }
}

impl Default for Quality {
    fn default() -> Quality {
        Quality::BEST
    }
}

/// Produces a new image of the given pixel dimensions from `source`.  The
/// same algorithm is used whether scaling up or down.  RGB images stay RGB;
/// every other format is resampled as RGBA with alpha-aware filtering.  The
/// source is never modified, and a same-size request yields a copy.
/// Returns an `InvalidInput` error for an empty target size.
pub fn resample(source: &Image,
                width: u32,
                height: u32,
                quality: Quality)
                -> io::Result<Image> {
    if width == 0 || height == 0 {
        let msg = format!("cannot resample to {}x{}", width, height);
        return Err(Error::new(ErrorKind::InvalidInput, msg));
    }
    let source = match source.pixel_format() {
        PixelFormat::RGB | PixelFormat::RGBA => source.clone(),
        _ => source.to_rgba(),
    };
    if source.width() == width && source.height() == height {
        return Ok(source);
    }
    let (format, pixel_type) = match source.pixel_format() {
        PixelFormat::RGB => (PixelFormat::RGB, fr::PixelType::U8x3),
        _ => (PixelFormat::RGBA, fr::PixelType::U8x4),
    };
    log::trace!("resampling {}x{} to {}x{} ({:?})",
                source.width(),
                source.height(),
                width,
                height,
                quality.algorithm());

    let src_image = fr::images::Image::from_vec_u8(source.width(),
                                                   source.height(),
                                                   source.into_data()
                                                       .into_vec(),
                                                   pixel_type)
        .map_err(|e| {
            Error::new(ErrorKind::InvalidInput,
                       format!("invalid source buffer: {}", e))
        })?;
    let mut dst_image = fr::images::Image::new(width, height, pixel_type);
    let options = fr::ResizeOptions::new().resize_alg(quality.algorithm());
    fr::Resizer::new()
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| Error::new(ErrorKind::InvalidInput, e.to_string()))?;
    Image::from_data(format, width, height, dst_image.into_vec())
}
