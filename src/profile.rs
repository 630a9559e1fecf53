use std::fmt;

/// A requested output size.  The pixel dimensions are the screen dimensions
/// multiplied by the density (2 for "@2x" retina variants).
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SizeSpec {
    /// Width in screen points.
    pub width: u32,
    /// Height in screen points.
    pub height: u32,
    /// Pixels per screen point along each axis.
    pub density: u32,
}

impl SizeSpec {
    /// A square size at 1x density.
    pub const fn square(size: u32) -> SizeSpec {
        SizeSpec {
            width: size,
            height: size,
            density: 1,
        }
    }

    /// A square size at 2x "retina" density.
    pub const fn square_2x(size: u32) -> SizeSpec {
        SizeSpec {
            width: size,
            height: size,
            density: 2,
        }
    }

    /// Returns the width of the image data, in pixels.
    pub fn pixel_width(self) -> u32 {
        self.width * self.density
    }

    /// Returns the height of the image data, in pixels.
    pub fn pixel_height(self) -> u32 {
        self.height * self.density
    }

    /// Returns true if an image of the given dimensions is at least as large
    /// as this size in both directions.
    pub fn fits_within(self, width: u32, height: u32) -> bool {
        self.pixel_width() <= width && self.pixel_height() <= height
    }
}

impl fmt::Display for SizeSpec {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        write!(out, "{}x{}", self.width, self.height)?;
        if self.density != 1 {
            write!(out, "@{}x", self.density)?;
        }
        Ok(())
    }
}

/// A named bundle of target sizes and an output kind.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Profile {
    /// A 32x32 `favicon.ico`.
    FavIcon,
    /// A Windows 10 ICO with sizes from 16x16 to 768x768.
    Win10,
    /// A Windows Vista 256x256 ICO.
    WinVista,
    /// A macOS ICNS with the normal and retina sub-sizes up to 1024x1024.
    MacOS,
    /// Browser icons from 16x16 to 128x128, as separate PNG files.
    Browser,
    /// A 57x57 touch icon PNG.
    Touch,
    /// Browser, tile, and touch icons from 57x57 to 558x558, as separate PNG
    /// files.
    WebIcons,
}

/// The kind of artifact a profile produces.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum OutputKind {
    /// A single Windows ICO file.
    Ico,
    /// A single Apple ICNS file.
    Icns,
    /// One independent PNG file per size.
    PngSet,
}

const FAVICON_SIZES: &[SizeSpec] = &[SizeSpec::square(32)];

const WIN_VISTA_SIZES: &[SizeSpec] = &[SizeSpec::square(256)];

const WIN_10_SIZES: &[SizeSpec] = &[SizeSpec::square(16),
                                    SizeSpec::square(24),
                                    SizeSpec::square(32),
                                    SizeSpec::square(64),
                                    SizeSpec::square(256),
                                    SizeSpec::square(768)];

const MACOS_SIZES: &[SizeSpec] = &[SizeSpec::square(16),
                                   SizeSpec::square_2x(16),
                                   SizeSpec::square(32),
                                   SizeSpec::square_2x(32),
                                   SizeSpec::square(64),
                                   SizeSpec::square(128),
                                   SizeSpec::square_2x(128),
                                   SizeSpec::square(256),
                                   SizeSpec::square_2x(256),
                                   SizeSpec::square(512),
                                   SizeSpec::square_2x(512)];

const BROWSER_SIZES: &[SizeSpec] = &[SizeSpec::square(16),
                                     SizeSpec::square(32),
                                     SizeSpec::square(48),
                                     SizeSpec::square(64),
                                     SizeSpec::square(128)];

const TOUCH_SIZES: &[SizeSpec] = &[SizeSpec::square(57)];

const WEB_ICON_SIZES: &[SizeSpec] = &[SizeSpec::square(57),
                                      SizeSpec::square(60),
                                      SizeSpec::square(72),
                                      SizeSpec::square(76),
                                      SizeSpec::square(114),
                                      SizeSpec::square(120),
                                      SizeSpec::square(144),
                                      SizeSpec::square(152),
                                      SizeSpec::square(180),
                                      SizeSpec::square(192),
                                      SizeSpec::square(512),
                                      SizeSpec::square(558)];

impl Profile {
    /// Every profile, in the order they are processed.
    pub const ALL: [Profile; 7] = [Profile::FavIcon,
                                   Profile::Win10,
                                   Profile::WinVista,
                                   Profile::MacOS,
                                   Profile::Browser,
                                   Profile::Touch,
                                   Profile::WebIcons];

    /// Returns the sizes this profile requires, in output order.
    ///
    /// # Examples
    /// ```
    /// use iconimp::{Profile, SizeSpec};
    /// assert_eq!(Profile::WinVista.plan(), vec![SizeSpec::square(256)]);
    /// assert_eq!(Profile::MacOS.plan().len(), 11);
    /// ```
    pub fn plan(self) -> Vec<SizeSpec> {
        self.sizes().to_vec()
    }

    fn sizes(self) -> &'static [SizeSpec] {
        match self {
            Profile::FavIcon => FAVICON_SIZES,
            Profile::Win10 => WIN_10_SIZES,
            Profile::WinVista => WIN_VISTA_SIZES,
            Profile::MacOS => MACOS_SIZES,
            Profile::Browser => BROWSER_SIZES,
            Profile::Touch => TOUCH_SIZES,
            Profile::WebIcons => WEB_ICON_SIZES,
        }
    }

    /// Returns the kind of artifact this profile produces.
    pub fn output(self) -> OutputKind {
        match self {
            Profile::FavIcon | Profile::Win10 | Profile::WinVista => {
                OutputKind::Ico
            }
            Profile::MacOS => OutputKind::Icns,
            Profile::Browser | Profile::Touch | Profile::WebIcons => {
                OutputKind::PngSet
            }
        }
    }

    /// Returns the lowercase name used for this profile on the command line
    /// and in output file names.
    pub fn name(self) -> &'static str {
        match self {
            Profile::FavIcon => "favicon",
            Profile::Win10 => "win10",
            Profile::WinVista => "winvista",
            Profile::MacOS => "macos",
            Profile::Browser => "browser",
            Profile::Touch => "touch",
            Profile::WebIcons => "webicon",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        out.write_str(self.name())
    }
}
