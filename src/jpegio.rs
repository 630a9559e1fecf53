use crate::image::{Image, PixelFormat};
use ::image::ImageFormat;
use std::io;

impl Image {
    /// Reads an image from a baseline or progressive JPEG file.  JPEG has no
    /// alpha channel, so the result is always in RGB format.
    pub fn read_jpeg(input: &[u8]) -> io::Result<Image> {
        let decoded =
            ::image::load_from_memory_with_format(input, ImageFormat::Jpeg)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let rgb = decoded.to_rgb8();
        let (width, height) = rgb.dimensions();
        Image::from_data(PixelFormat::RGB, width, height, rgb.into_raw())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

#[cfg(test)]
pub(crate) fn encode_test_jpeg(width: u32, height: u32) -> Vec<u8> {
    use ::image::codecs::jpeg::JpegEncoder;
    use ::image::ExtendedColorType;
    let pixels: Vec<u8> = (0..width * height)
        .flat_map(|_| [200u8, 10, 12])
        .collect();
    let mut output = Vec::new();
    JpegEncoder::new_with_quality(&mut output, 95)
        .encode(&pixels, width, height, ExtendedColorType::Rgb8)
        .unwrap();
    output
}

#[cfg(test)]
mod tests {
    use super::encode_test_jpeg;
    use crate::image::{Image, PixelFormat};

    #[test]
    fn garbage_after_jpeg_magic_is_invalid_data() {
        let data = b"\xff\xd8\xff\xe0not really a jpeg";
        let error = Image::read_jpeg(data).unwrap_err();
        assert_eq!(error.kind(), std::io::ErrorKind::InvalidData);
    }

    #[test]
    fn solid_jpeg_decodes_as_rgb() {
        let image = Image::read_jpeg(&encode_test_jpeg(30, 20)).unwrap();
        assert_eq!(image.pixel_format(), PixelFormat::RGB);
        assert_eq!((image.width(), image.height()), (30, 20));
        let center = (10 * 30 + 15) * 3;
        let pixel = &image.data()[center..center + 3];
        assert!(pixel[0] > 180 && pixel[1] < 40 && pixel[2] < 40,
                "unexpected color {:?}",
                pixel);
    }
}
