//! Reading and writing Windows ICO files with PNG-encoded images.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Seek, SeekFrom, Write};

use crate::image::Image;

// ========================================================================= //

// The signature that all PNG files start with.
const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G'];

/// The length of the ICONDIR header, in bytes.
const ICON_DIR_HEADER_LENGTH: u32 = 6;

/// The length of one ICONDIRENTRY, in bytes.
const ICON_DIR_ENTRY_LENGTH: u32 = 16;

/// The ICONDIR resource type for icons (as opposed to cursors).
const RESOURCE_TYPE_ICON: u16 = 1;

/// Directory dimensions are stored in one byte; zero means 256 or more.
const MAX_DIRECTORY_DIMENSION: u32 = 256;

// ========================================================================= //

macro_rules! invalid_data {
    ($e:expr) => {
        return Err(::std::io::Error::new(::std::io::ErrorKind::InvalidData,
                                         $e))
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err(::std::io::Error::new(::std::io::ErrorKind::InvalidData,
                                         format!($fmt, $($arg)+)))
    };
}

macro_rules! invalid_input {
    ($e:expr) => {
        return Err(::std::io::Error::new(::std::io::ErrorKind::InvalidInput,
                                         $e))
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err(::std::io::Error::new(::std::io::ErrorKind::InvalidInput,
                                         format!($fmt, $($arg)+)))
    };
}

// ========================================================================= //

/// A collection of icon images; the contents of a single ICO file.
#[derive(Default)]
pub struct IconDir {
    entries: Vec<IconDirEntry>,
}

impl IconDir {
    /// Creates a new, empty collection of icons.
    pub fn new() -> IconDir {
        IconDir { entries: Vec::new() }
    }

    /// Returns the entries in this collection, in file order.
    pub fn entries(&self) -> &[IconDirEntry] {
        &self.entries
    }

    /// Encodes an image as a new 32-bit PNG entry in this collection.
    /// Returns an error if the encoding fails or the collection is full.
    pub fn add_image(&mut self, image: &Image) -> io::Result<()> {
        if self.entries.len() >= u16::MAX as usize {
            invalid_input!("Too many entries in IconDir (max is {})",
                           u16::MAX);
        }
        let data = image.to_rgba().to_png_bytes()?;
        self.entries.push(IconDirEntry {
            width: image.width(),
            height: image.height(),
            num_colors: 0,
            color_planes: 1,
            bits_per_pixel: 32,
            data,
        });
        Ok(())
    }

    /// Reads an ICO file into memory.
    pub fn read<R: Read + Seek>(mut reader: R) -> io::Result<IconDir> {
        let reserved = reader.read_u16::<LittleEndian>()?;
        if reserved != 0 {
            invalid_data!("Invalid reserved field value in ICONDIR \
                           (was {}, but must be 0)",
                          reserved);
        }
        let restype = reader.read_u16::<LittleEndian>()?;
        if restype != RESOURCE_TYPE_ICON {
            invalid_data!("Invalid resource type ({}), expected an icon",
                          restype);
        }
        let num_entries = reader.read_u16::<LittleEndian>()? as usize;
        let mut entries = Vec::<IconDirEntry>::with_capacity(num_entries);
        let mut spans = Vec::<(u32, u32)>::with_capacity(num_entries);
        for _ in 0..num_entries {
            let width = reader.read_u8()?;
            let height = reader.read_u8()?;
            let num_colors = reader.read_u8()?;
            let reserved = reader.read_u8()?;
            if reserved != 0 {
                invalid_data!("Invalid reserved field value in ICONDIRENTRY \
                               (was {}, but must be 0)",
                              reserved);
            }
            let color_planes = reader.read_u16::<LittleEndian>()?;
            let bits_per_pixel = reader.read_u16::<LittleEndian>()?;
            let data_size = reader.read_u32::<LittleEndian>()?;
            let data_offset = reader.read_u32::<LittleEndian>()?;
            spans.push((data_offset, data_size));
            entries.push(IconDirEntry {
                width: if width == 0 { 256 } else { width as u32 },
                height: if height == 0 { 256 } else { height as u32 },
                num_colors,
                color_planes,
                bits_per_pixel,
                data: Vec::new(),
            });
        }
        for (index, &(data_offset, data_size)) in spans.iter().enumerate() {
            reader.seek(SeekFrom::Start(data_offset as u64))?;
            let mut data = vec![0u8; data_size as usize];
            reader.read_exact(&mut data)?;
            entries[index].data = data;
        }
        Ok(IconDir { entries })
    }

    /// Writes an ICO file.  All offsets are computed up front from the
    /// payload sizes, so the writer need not be seekable.
    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        if self.entries.len() > (u16::MAX as usize) {
            invalid_input!("Too many entries in IconDir \
                            (was {}, but max is {})",
                           self.entries.len(),
                           u16::MAX);
        }
        if self.total_length() > u64::from(u32::MAX) {
            invalid_input!("IconDir is too large ({} bytes)",
                           self.total_length());
        }
        writer.write_u16::<LittleEndian>(0)?; // reserved
        writer.write_u16::<LittleEndian>(RESOURCE_TYPE_ICON)?;
        writer.write_u16::<LittleEndian>(self.entries.len() as u16)?;
        let mut data_offset = self.data_start();
        for entry in self.entries.iter() {
            writer.write_u8(directory_dimension(entry.width))?;
            writer.write_u8(directory_dimension(entry.height))?;
            writer.write_u8(entry.num_colors)?;
            writer.write_u8(0)?; // reserved
            writer.write_u16::<LittleEndian>(entry.color_planes)?;
            writer.write_u16::<LittleEndian>(entry.bits_per_pixel)?;
            let data_size = payload_length(entry.data.len())?;
            writer.write_u32::<LittleEndian>(data_size)?;
            writer.write_u32::<LittleEndian>(data_offset)?;
            data_offset = match data_offset.checked_add(data_size) {
                Some(offset) => offset,
                None => invalid_input!("IconDir payloads overflow a 32-bit \
                                        offset"),
            };
        }
        for entry in self.entries.iter() {
            writer.write_all(&entry.data)?;
        }
        Ok(())
    }

    /// Serializes the collection into memory.
    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let mut output = Vec::with_capacity(self.total_length() as usize);
        self.write(&mut output)?;
        Ok(output)
    }

    /// Returns the offset at which the first payload starts.
    fn data_start(&self) -> u32 {
        ICON_DIR_HEADER_LENGTH +
        ICON_DIR_ENTRY_LENGTH * (self.entries.len() as u32)
    }

    /// Returns the encoded length of the file, in bytes.
    pub fn total_length(&self) -> u64 {
        let payloads: u64 =
            self.entries.iter().map(|entry| entry.data.len() as u64).sum();
        u64::from(ICON_DIR_HEADER_LENGTH) +
        u64::from(ICON_DIR_ENTRY_LENGTH) * (self.entries.len() as u64) +
        payloads
    }
}

fn payload_length(length: usize) -> io::Result<u32> {
    match u32::try_from(length) {
        Ok(length) => Ok(length),
        Err(_) => invalid_input!("IconDir entry is too large ({} bytes)",
                                 length),
    }
}

fn directory_dimension(dimension: u32) -> u8 {
    if dimension >= MAX_DIRECTORY_DIMENSION {
        0
    } else {
        dimension as u8
    }
}

// ========================================================================= //

/// One entry in an ICO file; a single icon image.
pub struct IconDirEntry {
    width: u32,
    height: u32,
    num_colors: u8,
    color_planes: u16,
    bits_per_pixel: u16,
    data: Vec<u8>,
}

impl IconDirEntry {
    /// Returns the width of the image, in pixels.  Entries read from a file
    /// report 256 for any image 256 pixels wide or wider.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the image, in pixels.  Entries read from a file
    /// report 256 for any image 256 pixels tall or taller.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the bits-per-pixel field of this entry.
    pub fn bits_per_pixel(&self) -> u16 {
        self.bits_per_pixel
    }

    /// Returns the encoded payload of this entry.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns true if the payload is a PNG file.
    pub fn is_png(&self) -> bool {
        self.data.starts_with(PNG_SIGNATURE)
    }

    /// Decodes this entry into an image.  Returns an error if the data is
    /// malformed, isn't PNG, or disagrees with the directory dimensions.
    pub fn decode(&self) -> io::Result<Image> {
        if !self.is_png() {
            invalid_data!("Decoding non-PNG images is not supported");
        }
        let image = Image::read_png_bytes(&self.data)?;
        if !dimension_matches(self.width, image.width()) ||
           !dimension_matches(self.height, image.height()) {
            invalid_data!("Encoded PNG has wrong dimensions \
                           (was {}x{}, but should be {}x{})",
                          image.width(),
                          image.height(),
                          self.width,
                          self.height);
        }
        Ok(image)
    }
}

fn dimension_matches(declared: u32, actual: u32) -> bool {
    if declared >= MAX_DIRECTORY_DIMENSION {
        actual >= MAX_DIRECTORY_DIMENSION
    } else {
        declared == actual
    }
}

// ========================================================================= //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::PixelFormat;
    use byteorder::{ByteOrder, LittleEndian};
    use std::io::Cursor;

    #[test]
    fn read_empty_icon_set() {
        let input = b"\x00\x00\x01\x00\x00\x00";
        let icondir = IconDir::read(Cursor::new(input)).unwrap();
        assert_eq!(icondir.entries().len(), 0);
    }

    #[test]
    fn read_rejects_cursor_set() {
        let input = b"\x00\x00\x02\x00\x00\x00";
        assert!(IconDir::read(Cursor::new(input)).is_err());
    }

    #[test]
    fn write_empty_icon_set() {
        let icondir = IconDir::new();
        let output = icondir.to_bytes().unwrap();
        let expected: &[u8] = b"\x00\x00\x01\x00\x00\x00";
        assert_eq!(output.as_slice(), expected);
    }

    #[test]
    fn offsets_follow_directory() {
        let mut icondir = IconDir::new();
        for &size in &[16, 32, 300] {
            icondir.add_image(&Image::new(PixelFormat::RGBA, size, size))
                .unwrap();
        }
        let file = icondir.to_bytes().unwrap();
        assert_eq!(file.len() as u64, icondir.total_length());
        assert_eq!(LittleEndian::read_u16(&file[4..6]), 3);
        let mut expected_offset = 6 + 16 * 3;
        for (index, entry) in icondir.entries().iter().enumerate() {
            let record = &file[(6 + 16 * index)..][..16];
            let size = LittleEndian::read_u32(&record[8..12]);
            let offset = LittleEndian::read_u32(&record[12..16]);
            assert_eq!(size as usize, entry.data().len());
            assert_eq!(offset, expected_offset);
            assert_eq!(&file[(offset as usize)..][..4], PNG_SIGNATURE);
            expected_offset += size;
        }
        assert_eq!(expected_offset as usize, file.len());
        // 300 pixels does not fit in the width byte.
        assert_eq!(file[6 + 32], 0);
        assert_eq!(file[6 + 33], 0);
    }

    #[test]
    fn image_data_round_trip() {
        let width = 11;
        let height = 13;
        let mut rgba = Vec::new();
        for index in 0..(width * height) {
            rgba.push(if index % 2 == 0 { 0 } else { 255 });
            rgba.push(if index % 3 == 0 { 0 } else { 255 });
            rgba.push(if index % 5 == 0 { 0 } else { 255 });
            rgba.push(if index % 7 == 0 { 128 } else { 255 });
        }
        let image = Image::from_data(PixelFormat::RGBA,
                                     width,
                                     height,
                                     rgba.clone())
            .unwrap();
        let mut icondir = IconDir::new();
        icondir.add_image(&image).unwrap();
        let file = icondir.to_bytes().unwrap();
        let icondir = IconDir::read(Cursor::new(&file)).unwrap();
        assert_eq!(icondir.entries().len(), 1);
        assert_eq!(icondir.entries()[0].bits_per_pixel(), 32);
        let image = icondir.entries()[0].decode().unwrap();
        assert_eq!(image.width(), width);
        assert_eq!(image.height(), height);
        assert_eq!(image.data(), rgba.as_slice());
    }

    #[test]
    fn large_entries_decode_past_256() {
        let mut icondir = IconDir::new();
        icondir.add_image(&Image::new(PixelFormat::RGB, 768, 768)).unwrap();
        let file = icondir.to_bytes().unwrap();
        let icondir = IconDir::read(Cursor::new(&file)).unwrap();
        let entry = &icondir.entries()[0];
        assert_eq!((entry.width(), entry.height()), (256, 256));
        let image = entry.decode().unwrap();
        assert_eq!((image.width(), image.height()), (768, 768));
    }

    #[test]
    fn payload_length_rejects_sizes_past_u32() {
        assert_eq!(payload_length(1234).unwrap(), 1234);
        assert_eq!(payload_length(u32::MAX as usize).unwrap(), u32::MAX);
        let error = payload_length(u32::MAX as usize + 1).unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::InvalidInput);
    }
}

// ========================================================================= //
