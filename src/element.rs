use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Error, ErrorKind, Read, Write};

use crate::icontype::{IconType, OSType};
use crate::image::Image;

/// The length of an icon element header, in bytes:
const ICON_ELEMENT_HEADER_LENGTH: u32 = 8;

/// One entry in an ICNS file: a type tag and its data payload.
pub struct IconElement {
    /// The OSType for this element (e.g. `ic08` or `icp4`).
    pub ostype: OSType,
    /// The raw data payload for this element.
    pub data: Vec<u8>,
}

impl IconElement {
    /// Creates an icon element with the given OSType and data payload.
    pub fn new(ostype: OSType, data: Vec<u8>) -> IconElement {
        IconElement { ostype, data }
    }

    /// Encodes the image into an element of the given icon type, storing it
    /// as an RGBA PNG.  Returns an error if the image has the wrong
    /// dimensions for the type.
    pub fn encode_image_with_type(image: &Image,
                                  icon_type: IconType)
                                  -> io::Result<IconElement> {
        let width = icon_type.pixel_width();
        let height = icon_type.pixel_height();
        if image.width() != width || image.height() != height {
            let msg = format!("image has wrong dimensions for {} ({}x{} \
                               instead of {}x{})",
                              icon_type.ostype(),
                              image.width(),
                              image.height(),
                              width,
                              height);
            return Err(Error::new(ErrorKind::InvalidInput, msg));
        }
        let data = image.to_rgba().to_png_bytes()?;
        Ok(IconElement::new(icon_type.ostype(), data))
    }

    /// Decodes the icon element into an image.  Returns an error if this
    /// element does not represent an icon type supported by this library, or
    /// if the data is malformed.
    pub fn decode_image(&self) -> io::Result<Image> {
        let icon_type = self.icon_type().ok_or_else(|| {
            Error::new(ErrorKind::InvalidInput,
                       format!("unsupported OSType: {}", self.ostype))
        })?;
        let width = icon_type.pixel_width();
        let height = icon_type.pixel_height();
        let image = Image::read_png_bytes(&self.data)?;
        if image.width() != width || image.height() != height {
            let msg = format!("decoded PNG has wrong dimensions \
                               ({}x{} instead of {}x{})",
                              image.width(),
                              image.height(),
                              width,
                              height);
            return Err(Error::new(ErrorKind::InvalidData, msg));
        }
        Ok(image)
    }

    /// Returns the type of icon encoded by this element, or `None` if this
    /// element does not encode a supported icon type.
    pub fn icon_type(&self) -> Option<IconType> {
        IconType::from_ostype(self.ostype)
    }

    /// Returns the encoded length of the element, in bytes, including the
    /// length of the header.  Saturates at `u32::MAX`; such an element
    /// cannot be written.
    pub fn total_length(&self) -> u32 {
        element_length(self.data.len()).unwrap_or(u32::MAX)
    }

    /// Reads an icon element from within an ICNS file.
    pub fn read<R: Read>(mut reader: R) -> io::Result<IconElement> {
        let mut raw_ostype = [0u8; 4];
        reader.read_exact(&mut raw_ostype)?;
        let element_length = reader.read_u32::<BigEndian>()?;
        if element_length < ICON_ELEMENT_HEADER_LENGTH {
            return Err(Error::new(ErrorKind::InvalidData,
                                  "invalid element length"));
        }
        let data_length = element_length - ICON_ELEMENT_HEADER_LENGTH;
        let mut data = vec![0u8; data_length as usize];
        reader.read_exact(&mut data)?;
        Ok(IconElement::new(OSType(raw_ostype), data))
    }

    /// Writes the icon element to within an ICNS file.
    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        let OSType(ref raw_ostype) = self.ostype;
        writer.write_all(raw_ostype)?;
        writer.write_u32::<BigEndian>(element_length(self.data.len())?)?;
        writer.write_all(&self.data)?;
        Ok(())
    }
}

fn element_length(data_length: usize) -> io::Result<u32> {
    u32::try_from(data_length)
        .ok()
        .and_then(|length| length.checked_add(ICON_ELEMENT_HEADER_LENGTH))
        .ok_or_else(|| {
            let msg = format!("element payload is too large ({} bytes)",
                              data_length);
            Error::new(ErrorKind::InvalidInput, msg)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::PixelFormat;
    use std::io::Cursor;

    #[test]
    fn encode_then_decode_png_element() {
        let image = Image::new(PixelFormat::RGB, 32, 32);
        let element =
            IconElement::encode_image_with_type(&image,
                                                IconType::RGBA32_16x16_2x)
                .expect("failed to encode image");
        assert_eq!(element.ostype, OSType(*b"ic11"));
        assert!(element.data.starts_with(b"\x89PNG"));
        let decoded = element.decode_image().expect("failed to decode");
        assert_eq!(decoded.pixel_format(), PixelFormat::RGBA);
        assert_eq!((decoded.width(), decoded.height()), (32, 32));
        assert!(decoded.data().chunks(4).all(|px| px == [0, 0, 0, 255]));
    }

    #[test]
    fn encode_rejects_wrong_dimensions() {
        let image = Image::new(PixelFormat::RGBA, 16, 16);
        let result =
            IconElement::encode_image_with_type(&image,
                                                IconType::RGBA32_32x32);
        assert_eq!(result.err().map(|e| e.kind()),
                   Some(ErrorKind::InvalidInput));
    }

    #[test]
    fn decode_rejects_unknown_ostype() {
        let element = IconElement::new(OSType(*b"quux"), vec![1, 2, 3]);
        assert!(element.decode_image().is_err());
    }

    #[test]
    fn write_then_read_element() {
        let element = IconElement::new(OSType(*b"ic09"), b"payload".to_vec());
        let mut output = Vec::new();
        element.write(&mut output).unwrap();
        assert_eq!(output.len() as u32, element.total_length());
        assert_eq!(&output[..8], b"ic09\0\0\0\x0f");
        let read = IconElement::read(Cursor::new(&output)).unwrap();
        assert_eq!(read.ostype, element.ostype);
        assert_eq!(read.data, element.data);
    }

    #[test]
    fn read_rejects_short_length() {
        let input: &[u8] = b"ic09\0\0\0\x04";
        assert!(IconElement::read(input).is_err());
    }

    #[test]
    fn oversized_payload_length_is_rejected() {
        assert_eq!(element_length(7).unwrap(), 15);
        let limit = (u32::MAX - ICON_ELEMENT_HEADER_LENGTH) as usize;
        assert_eq!(element_length(limit).unwrap(), u32::MAX);
        for length in [limit + 1, u32::MAX as usize + 1] {
            let error = element_length(length).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::InvalidInput);
        }
    }
}
