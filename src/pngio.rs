use crate::image::{Image, PixelFormat};
use std::io::{self, BufRead, Cursor, Seek, Write};

impl Image {
    /// Reads an image from a PNG file.  Paletted and 16-bit images are
    /// expanded to 8-bit channels.
    pub fn read_png<R: BufRead + Seek>(input: R) -> io::Result<Image> {
        let mut decoder = png::Decoder::new(input);
        decoder.set_transformations(
            png::Transformations::STRIP_16 | png::Transformations::EXPAND,
        );
        let info = decoder.read_header_info()?;
        let (width, height) = (info.width, info.height);
        let mut reader = decoder.read_info()?;

        let (color_type, bit_depth) = reader.output_color_type();
        if bit_depth != png::BitDepth::Eight {
            let msg = format!("unsupported PNG bit depth: {:?}", bit_depth);
            return Err(io::Error::new(io::ErrorKind::InvalidData, msg));
        }
        let pixel_format = match color_type {
            png::ColorType::Rgba => PixelFormat::RGBA,
            png::ColorType::Rgb => PixelFormat::RGB,
            png::ColorType::GrayscaleAlpha => PixelFormat::GrayAlpha,
            png::ColorType::Grayscale => PixelFormat::Gray,
            png::ColorType::Indexed => {
                // EXPAND should have removed the palette.
                let msg = "paletted PNG output was not expanded";
                return Err(io::Error::new(io::ErrorKind::InvalidData, msg));
            }
        };

        let mut image = Image::new(pixel_format, width, height);
        if reader.output_buffer_size() != Some(image.data().len()) {
            let msg = format!("PNG frame size does not match {}x{} {:?}",
                              width,
                              height,
                              pixel_format);
            return Err(io::Error::new(io::ErrorKind::InvalidData, msg));
        }
        reader.next_frame(image.data_mut())?;
        reader.finish()?;
        Ok(image)
    }

    /// Reads an image from in-memory PNG data.
    pub fn read_png_bytes(data: &[u8]) -> io::Result<Image> {
        Image::read_png(Cursor::new(data))
    }

    /// Writes the image to a PNG file.
    pub fn write_png<W: Write>(&self, output: W) -> io::Result<()> {
        let color_type = match self.format {
            PixelFormat::RGBA => png::ColorType::Rgba,
            PixelFormat::RGB => png::ColorType::Rgb,
            PixelFormat::GrayAlpha => png::ColorType::GrayscaleAlpha,
            PixelFormat::Gray => png::ColorType::Grayscale,
        };
        let mut encoder = png::Encoder::new(output, self.width(), self.height());
        encoder.set_color(color_type);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(&self.data)?;
        writer.finish()?;
        Ok(())
    }

    /// Encodes the image as PNG data in memory.
    pub fn to_png_bytes(&self) -> io::Result<Vec<u8>> {
        let mut data = Vec::new();
        self.write_png(&mut data)?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use crate::image::{Image, PixelFormat};

    #[test]
    fn png_round_trip_keeps_pixels() {
        let mut rgba = Vec::new();
        for index in 0..(5 * 3) {
            rgba.push(if index % 2 == 0 { 0 } else { 255 });
            rgba.push(if index % 3 == 0 { 0 } else { 255 });
            rgba.push(index as u8);
            rgba.push(if index % 7 == 0 { 128 } else { 255 });
        }
        let image =
            Image::from_data(PixelFormat::RGBA, 5, 3, rgba.clone()).unwrap();
        let png = image.to_png_bytes().expect("encode failed");
        assert!(png.starts_with(b"\x89PNG\r\n\x1a\n"));
        let decoded = Image::read_png_bytes(&png).expect("decode failed");
        assert_eq!(decoded.pixel_format(), PixelFormat::RGBA);
        assert_eq!((decoded.width(), decoded.height()), (5, 3));
        assert_eq!(decoded.data(), rgba.as_slice());
    }

    #[test]
    fn truncated_png_is_an_error() {
        let image = Image::new(PixelFormat::RGB, 8, 8);
        let png = image.to_png_bytes().unwrap();
        assert!(Image::read_png_bytes(&png[..png.len() / 2]).is_err());
    }
}
