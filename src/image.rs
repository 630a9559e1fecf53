use std::io::{self, Error, ErrorKind};

/// A decoded raster image, held in memory as row-major pixel data.
#[derive(Clone, Debug)]
pub struct Image {
    pub(crate) format: PixelFormat,
    width: u32,
    height: u32,
    pub(crate) data: Box<[u8]>,
}

impl Image {
    /// Creates a new image with all pixel data set to zero.  Panics if either
    /// dimension is zero.
    pub fn new(format: PixelFormat, width: u32, height: u32) -> Image {
        assert!(width > 0 && height > 0, "image dimensions must be nonzero");
        let data_bytes = format.bytes_per_pixel() * (width as usize) *
                         (height as usize);
        Image {
            format,
            width,
            height,
            data: vec![0u8; data_bytes].into_boxed_slice(),
        }
    }

    /// Creates a new image using the given pixel data.  Returns an error if
    /// either dimension is zero, or if the data array is not the correct
    /// length for the given format and dimensions.
    pub fn from_data(format: PixelFormat,
                     width: u32,
                     height: u32,
                     data: Vec<u8>)
                     -> io::Result<Image> {
        if width == 0 || height == 0 {
            let msg = format!("invalid image dimensions ({}x{})",
                              width,
                              height);
            return Err(Error::new(ErrorKind::InvalidInput, msg));
        }
        let expected = format.bytes_per_pixel() * (width as usize) *
                       (height as usize);
        if data.len() != expected {
            let msg = format!("pixel data has wrong length ({} bytes \
                               instead of {} for {}x{} {:?})",
                              data.len(),
                              expected,
                              width,
                              height,
                              format);
            return Err(Error::new(ErrorKind::InvalidInput, msg));
        }
        Ok(Image {
            format,
            width,
            height,
            data: data.into_boxed_slice(),
        })
    }

    /// Creates a copy of this image using the RGBA pixel format (that is,
    /// `foo.to_rgba().pixel_format()` will always return `PixelFormat::RGBA`).
    /// If the source image is already in RGBA format, this is equivalant to
    /// simply calling `clone()`.
    pub fn to_rgba(&self) -> Image {
        let rgba_data = match self.format {
            PixelFormat::RGBA => self.data.clone(),
            PixelFormat::RGB => rgb_to_rgba(&self.data),
            PixelFormat::GrayAlpha => gray_alpha_to_rgba(&self.data),
            PixelFormat::Gray => gray_to_rgba(&self.data),
        };
        Image {
            format: PixelFormat::RGBA,
            width: self.width,
            height: self.height,
            data: rgba_data,
        }
    }

    /// Returns the format in which this image's pixel data is stored.
    pub fn pixel_format(&self) -> PixelFormat {
        self.format
    }

    /// Returns the width of the image, in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the image, in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns a reference to the image's pixel data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns a mutable reference to the image's pixel data.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consumes the image, returning its pixel data.
    pub fn into_data(self) -> Box<[u8]> {
        self.data
    }
}

/// A format for storing pixel data in an image.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PixelFormat {
    /// 32-bit color with alpha channel.
    RGBA,
    /// 24-bit color with no alpha.
    RGB,
    /// 16-bit grayscale-with-alpha.
    GrayAlpha,
    /// 8-bit grayscale with no alpha.
    Gray,
}

impl PixelFormat {
    /// Returns the number of bytes needed to store a single pixel in this
    /// format.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::RGBA => 4,
            PixelFormat::RGB => 3,
            PixelFormat::GrayAlpha => 2,
            PixelFormat::Gray => 1,
        }
    }

    /// Returns true if pixels in this format carry an alpha channel.
    pub fn has_alpha(self) -> bool {
        matches!(self, PixelFormat::RGBA | PixelFormat::GrayAlpha)
    }
}

/// Converts RGB image data into RGBA.
fn rgb_to_rgba(rgb: &[u8]) -> Box<[u8]> {
    assert_eq!(rgb.len() % 3, 0);
    let mut rgba = Vec::with_capacity(rgb.len() / 3 * 4);
    for pixel in rgb.chunks_exact(3) {
        rgba.extend_from_slice(pixel);
        rgba.push(u8::MAX);
    }
    rgba.into_boxed_slice()
}

/// Converts grayscale-with-alpha image data into RGBA.
fn gray_alpha_to_rgba(gray_alpha: &[u8]) -> Box<[u8]> {
    assert_eq!(gray_alpha.len() % 2, 0);
    let mut rgba = Vec::with_capacity(gray_alpha.len() * 2);
    for pixel in gray_alpha.chunks_exact(2) {
        rgba.extend_from_slice(&[pixel[0], pixel[0], pixel[0], pixel[1]]);
    }
    rgba.into_boxed_slice()
}

/// Converts grayscale image data into RGBA.
fn gray_to_rgba(gray: &[u8]) -> Box<[u8]> {
    let mut rgba = Vec::with_capacity(gray.len() * 4);
    for &value in gray {
        rgba.extend_from_slice(&[value, value, value, u8::MAX]);
    }
    rgba.into_boxed_slice()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_image_is_zeroed() {
        let image = Image::new(PixelFormat::RGB, 3, 2);
        assert_eq!(image.data().len(), 18);
        assert!(image.data().iter().all(|&byte| byte == 0));
    }

    #[test]
    fn from_data_rejects_wrong_length() {
        let result = Image::from_data(PixelFormat::RGBA, 2, 2, vec![0; 15]);
        assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn from_data_rejects_zero_dimensions() {
        let result = Image::from_data(PixelFormat::Gray, 0, 4, vec![]);
        assert!(result.is_err());
    }

    #[test]
    fn gray_converts_to_opaque_rgba() {
        let image = Image::from_data(PixelFormat::GrayAlpha,
                                     2,
                                     1,
                                     vec![10, 20, 30, 40])
            .unwrap();
        let rgba = image.to_rgba();
        assert_eq!(rgba.pixel_format(), PixelFormat::RGBA);
        assert_eq!(rgba.data(), &[10, 10, 10, 20, 30, 30, 30, 40]);

        let image = Image::from_data(PixelFormat::Gray, 1, 1, vec![7]).unwrap();
        assert_eq!(image.to_rgba().data(), &[7, 7, 7, 255]);
    }

    #[test]
    fn rgb_gains_opaque_alpha() {
        let image =
            Image::from_data(PixelFormat::RGB, 1, 1, vec![1, 2, 3]).unwrap();
        assert!(!image.pixel_format().has_alpha());
        assert_eq!(image.to_rgba().data(), &[1, 2, 3, 255]);
    }
}
