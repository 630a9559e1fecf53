use std::fmt;
use std::str::FromStr;

use crate::profile::SizeSpec;

/// Types of PNG-encoded icon elements that can be stored in an ICNS file.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum IconType {
    /// 16x16 32-bit icon.
    RGBA32_16x16,
    /// 16x16 32-bit icon at 2x "retina" density (so, 32 by 32 pixels).
    RGBA32_16x16_2x,
    /// 32x32 32-bit icon.
    RGBA32_32x32,
    /// 32x32 32-bit icon at 2x "retina" density (so, 64 by 64 pixels).
    RGBA32_32x32_2x,
    /// 64x64 32-bit icon.
    RGBA32_64x64,
    /// 128x128 32-bit icon.
    RGBA32_128x128,
    /// 128x128 32-bit icon at 2x "retina" density (so, 256 by 256 pixels).
    RGBA32_128x128_2x,
    /// 256x256 32-bit icon.
    RGBA32_256x256,
    /// 256x256 32-bit icon at 2x "retina" density (so, 512 by 512 pixels).
    RGBA32_256x256_2x,
    /// 512x512 32-bit icon.
    RGBA32_512x512,
    /// 512x512 32-bit icon at 2x "retina" density (so, 1024 by 1024 pixels).
    RGBA32_512x512_2x,
}

impl IconType {
    /// Get the icon type associated with the given OSType, if any.
    pub fn from_ostype(ostype: OSType) -> Option<IconType> {
        let OSType(raw_ostype) = ostype;
        match &raw_ostype {
            b"icp4" => Some(IconType::RGBA32_16x16),
            b"ic11" => Some(IconType::RGBA32_16x16_2x),
            b"icp5" => Some(IconType::RGBA32_32x32),
            b"ic12" => Some(IconType::RGBA32_32x32_2x),
            b"icp6" => Some(IconType::RGBA32_64x64),
            b"ic07" => Some(IconType::RGBA32_128x128),
            b"ic13" => Some(IconType::RGBA32_128x128_2x),
            b"ic08" => Some(IconType::RGBA32_256x256),
            b"ic14" => Some(IconType::RGBA32_256x256_2x),
            b"ic09" => Some(IconType::RGBA32_512x512),
            b"ic10" => Some(IconType::RGBA32_512x512_2x),
            _ => None,
        }
    }

    /// Get the icon type for the given screen size and density, if any.
    ///
    /// # Examples
    /// ```
    /// use iconimp::{IconType, SizeSpec};
    /// assert_eq!(IconType::from_size_spec(SizeSpec::square_2x(512)),
    ///            Some(IconType::RGBA32_512x512_2x));
    /// assert_eq!(IconType::from_size_spec(SizeSpec::square(1024)), None);
    /// ```
    pub fn from_size_spec(size: SizeSpec) -> Option<IconType> {
        if size.width != size.height {
            return None;
        }
        match (size.width, size.density) {
            (16, 1) => Some(IconType::RGBA32_16x16),
            (16, 2) => Some(IconType::RGBA32_16x16_2x),
            (32, 1) => Some(IconType::RGBA32_32x32),
            (32, 2) => Some(IconType::RGBA32_32x32_2x),
            (64, 1) => Some(IconType::RGBA32_64x64),
            (128, 1) => Some(IconType::RGBA32_128x128),
            (128, 2) => Some(IconType::RGBA32_128x128_2x),
            (256, 1) => Some(IconType::RGBA32_256x256),
            (256, 2) => Some(IconType::RGBA32_256x256_2x),
            (512, 1) => Some(IconType::RGBA32_512x512),
            (512, 2) => Some(IconType::RGBA32_512x512_2x),
            _ => None,
        }
    }

    /// Get the OSType that represents this icon type.
    pub fn ostype(self) -> OSType {
        match self {
            IconType::RGBA32_16x16 => OSType(*b"icp4"),
            IconType::RGBA32_16x16_2x => OSType(*b"ic11"),
            IconType::RGBA32_32x32 => OSType(*b"icp5"),
            IconType::RGBA32_32x32_2x => OSType(*b"ic12"),
            IconType::RGBA32_64x64 => OSType(*b"icp6"),
            IconType::RGBA32_128x128 => OSType(*b"ic07"),
            IconType::RGBA32_128x128_2x => OSType(*b"ic13"),
            IconType::RGBA32_256x256 => OSType(*b"ic08"),
            IconType::RGBA32_256x256_2x => OSType(*b"ic14"),
            IconType::RGBA32_512x512 => OSType(*b"ic09"),
            IconType::RGBA32_512x512_2x => OSType(*b"ic10"),
        }
    }

    /// Returns the size, in screen points and density, of this icon type.
    pub fn size_spec(self) -> SizeSpec {
        let size = self.screen_width();
        if self.pixel_density() == 2 {
            SizeSpec::square_2x(size)
        } else {
            SizeSpec::square(size)
        }
    }

    /// Returns the pixel data width of this icon type.  Normally this is the
    /// same as the screen width, but for 2x "retina" density icons, this will
    /// be twice that value.
    ///
    /// # Examples
    /// ```
    /// use iconimp::IconType;
    /// assert_eq!(IconType::RGBA32_256x256.pixel_width(), 256);
    /// assert_eq!(IconType::RGBA32_256x256_2x.pixel_width(), 512);
    /// ```
    pub fn pixel_width(self) -> u32 {
        self.screen_width() * self.pixel_density()
    }

    /// Returns the pixel data height of this icon type.  Icon types are
    /// always square.
    pub fn pixel_height(self) -> u32 {
        self.pixel_width()
    }

    /// Returns the pixel density for this icon type -- that is, 2 for 2x
    /// "retina" density icons, or 1 for other icon types.
    pub fn pixel_density(self) -> u32 {
        match self {
            IconType::RGBA32_16x16_2x |
            IconType::RGBA32_32x32_2x |
            IconType::RGBA32_128x128_2x |
            IconType::RGBA32_256x256_2x |
            IconType::RGBA32_512x512_2x => 2,
            _ => 1,
        }
    }

    /// Returns the screen width of this icon type.  Normally this is the same
    /// as the pixel width, but for 2x "retina" density icons, this will be
    /// half that value.
    pub fn screen_width(self) -> u32 {
        match self {
            IconType::RGBA32_16x16 | IconType::RGBA32_16x16_2x => 16,
            IconType::RGBA32_32x32 | IconType::RGBA32_32x32_2x => 32,
            IconType::RGBA32_64x64 => 64,
            IconType::RGBA32_128x128 | IconType::RGBA32_128x128_2x => 128,
            IconType::RGBA32_256x256 | IconType::RGBA32_256x256_2x => 256,
            IconType::RGBA32_512x512 | IconType::RGBA32_512x512_2x => 512,
        }
    }
}

/// A Macintosh OSType (also known as a ResType), used in ICNS files to
/// identify the type of each icon element.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct OSType(pub [u8; 4]);

impl fmt::Display for OSType {
    fn fmt(&self, out: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        let &OSType(raw) = self;
        for &byte in &raw {
            write!(out, "{}", char::from(byte))?;
        }
        Ok(())
    }
}

impl FromStr for OSType {
    type Err = String;

    fn from_str(input: &str) -> Result<OSType, String> {
        let bytes = input.as_bytes();
        if bytes.len() != 4 {
            Err(format!("OSType string must be 4 bytes (was {})", bytes.len()))
        } else {
            let mut raw = [0u8; 4];
            raw.clone_from_slice(bytes);
            Ok(OSType(raw))
        }
    }
}
