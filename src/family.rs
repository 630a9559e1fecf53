use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Error, ErrorKind, Read, Write};

use crate::element::IconElement;
use crate::icontype::IconType;
use crate::image::Image;

const ICNS_MAGIC_LITERAL: &[u8; 4] = b"icns";

// Magic literal plus the big-endian file length.
const ICON_FAMILY_HEADER_LENGTH: u32 = 8;

/// The contents of an ICNS file: a magic literal and length, followed by
/// tagged elements.
#[derive(Default)]
pub struct IconFamily {
    /// Elements in file order.
    pub elements: Vec<IconElement>,
}

impl IconFamily {
    /// Creates a new, empty icon family.
    pub fn new() -> IconFamily {
        IconFamily { elements: Vec::new() }
    }

    /// Returns true if the icon family contains no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Encodes the image into the family using the given icon type.  Returns
    /// an error if the image has the wrong dimensions for the selected type.
    pub fn add_icon_with_type(&mut self,
                              image: &Image,
                              icon_type: IconType)
                              -> io::Result<()> {
        self.elements
            .push(IconElement::encode_image_with_type(image, icon_type)?);
        Ok(())
    }

    /// Returns the icon types of all elements this library understands, in
    /// file order.
    pub fn available_icons(&self) -> Vec<IconType> {
        self.elements.iter().filter_map(IconElement::icon_type).collect()
    }

    /// Returns true if some element of the family is stored under the
    /// OSType of `icon_type`.
    pub fn has_icon_with_type(&self, icon_type: IconType) -> bool {
        self.element_with_type(icon_type).is_some()
    }

    /// Decodes the element stored under `icon_type`.  Fails with
    /// `ErrorKind::NotFound` if the family has no such element.
    pub fn get_icon_with_type(&self, icon_type: IconType) -> io::Result<Image> {
        match self.element_with_type(icon_type) {
            Some(element) => element.decode_image(),
            None => {
                let msg = format!("no '{}' element in icon family",
                                  icon_type.ostype());
                Err(Error::new(ErrorKind::NotFound, msg))
            }
        }
    }

    fn element_with_type(&self, icon_type: IconType) -> Option<&IconElement> {
        let wanted = icon_type.ostype();
        self.elements.iter().find(|element| element.ostype == wanted)
    }

    /// Parses an ICNS file.  The declared file length must cover the header
    /// and end exactly on an element boundary.
    pub fn read<R: Read>(mut reader: R) -> io::Result<IconFamily> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != ICNS_MAGIC_LITERAL {
            let msg = "missing 'icns' magic literal";
            return Err(Error::new(ErrorKind::InvalidData, msg));
        }
        let declared = reader.read_u32::<BigEndian>()?;
        if declared < ICON_FAMILY_HEADER_LENGTH {
            let msg = format!("icon family length {} is shorter than its \
                               header",
                              declared);
            return Err(Error::new(ErrorKind::InvalidData, msg));
        }
        let mut family = IconFamily::new();
        let mut consumed = u64::from(ICON_FAMILY_HEADER_LENGTH);
        while consumed < u64::from(declared) {
            let element = IconElement::read(reader.by_ref())?;
            consumed += u64::from(element.total_length());
            family.elements.push(element);
        }
        if consumed != u64::from(declared) {
            let msg = format!("last element ends at byte {}, past the \
                               declared length {}",
                              consumed,
                              declared);
            return Err(Error::new(ErrorKind::InvalidData, msg));
        }
        Ok(family)
    }

    /// Writes the icon family to an ICNS file.  The header's length field is
    /// computed from the elements before anything is written, so the writer
    /// need not be seekable.
    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        let total_length = self.checked_total_length()?;
        writer.write_all(ICNS_MAGIC_LITERAL)?;
        writer.write_u32::<BigEndian>(total_length)?;
        for element in &self.elements {
            element.write(writer.by_ref())?;
        }
        Ok(())
    }

    /// Serializes the icon family into memory.
    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let mut output = Vec::with_capacity(self.total_length() as usize);
        self.write(&mut output)?;
        Ok(output)
    }

    /// Returns the encoded length of the file in bytes, header included.
    /// Saturates at `u32::MAX`; such a family cannot be written.
    pub fn total_length(&self) -> u32 {
        self.elements.iter().fold(ICON_FAMILY_HEADER_LENGTH, |length, element| {
            length.saturating_add(element.total_length())
        })
    }

    fn checked_total_length(&self) -> io::Result<u32> {
        let mut length = u64::from(ICON_FAMILY_HEADER_LENGTH);
        for element in &self.elements {
            length += 8 + element.data.len() as u64;
        }
        if length > u64::from(u32::MAX) {
            let msg = format!("icon family is too large ({} bytes)", length);
            return Err(Error::new(ErrorKind::InvalidInput, msg));
        }
        Ok(length as u32)
    }
}
