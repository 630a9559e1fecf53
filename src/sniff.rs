//! Identifies file formats from their leading bytes.

use std::fmt;

/// The minimum number of prefix bytes needed before any format is reported.
pub const MIN_PREFIX_LEN: usize = 4;

// The first four bytes of an ICNS file:
const ICNS_MAGIC_LITERAL: &[u8; 4] = b"icns";

/// A format recognized from a byte-prefix signature.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DetectedType {
    /// Portable Network Graphics.
    Png,
    /// JPEG/JFIF.
    Jpeg,
    /// Windows icon container.
    Ico,
    /// Apple icon container.
    Icns,
    /// No signature matched (yet).
    Unknown,
}

impl DetectedType {
    /// Returns the canonical file extension for this type, without a dot.
    /// Unknown data has an empty extension.
    pub fn extension(self) -> &'static str {
        match self {
            DetectedType::Png => "png",
            DetectedType::Jpeg => "jpg",
            DetectedType::Ico => "ico",
            DetectedType::Icns => "icns",
            DetectedType::Unknown => "",
        }
    }

    /// Returns the MIME type for this type.  Unknown data has an empty MIME
    /// type.
    pub fn mime(self) -> &'static str {
        match self {
            DetectedType::Png => "image/png",
            DetectedType::Jpeg => "image/jpeg",
            DetectedType::Ico => "image/vnd.microsoft.icon",
            DetectedType::Icns => "image/icns",
            DetectedType::Unknown => "",
        }
    }

    /// Returns true if this type can be decoded as a raster source image.
    pub fn is_raster(self) -> bool {
        matches!(self, DetectedType::Png | DetectedType::Jpeg)
    }
}

impl fmt::Display for DetectedType {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DetectedType::Unknown => write!(out, "unknown"),
            _ => write!(out, "{}", self.extension().to_uppercase()),
        }
    }
}

/// A signature predicate over a byte prefix, paired with the type it
/// identifies.
#[derive(Clone, Copy)]
pub struct Matcher {
    /// The type reported when the predicate accepts a prefix.
    pub kind: DetectedType,
    /// Returns true if the prefix carries this type's signature.
    pub predicate: fn(&[u8]) -> bool,
}

impl fmt::Debug for Matcher {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        out.debug_struct("Matcher").field("kind", &self.kind).finish()
    }
}

/// An ordered table of signature matchers.  Matchers are tried in the order
/// they were added and the first one that accepts the prefix wins.
#[derive(Clone, Debug)]
pub struct Sniffer {
    matchers: Vec<Matcher>,
}

impl Sniffer {
    /// Creates a sniffer with no matchers; it reports everything as unknown.
    pub fn empty() -> Sniffer {
        Sniffer { matchers: Vec::new() }
    }

    /// Creates a sniffer recognizing PNG, JPEG, and ICO.
    pub fn baseline() -> Sniffer {
        Sniffer::empty()
            .with_matcher(DetectedType::Png, infer::image::is_png)
            .with_matcher(DetectedType::Jpeg, infer::image::is_jpeg)
            .with_matcher(DetectedType::Ico, infer::image::is_ico)
    }

    /// Appends a matcher, which is tried after all existing ones.
    pub fn with_matcher(mut self,
                        kind: DetectedType,
                        predicate: fn(&[u8]) -> bool)
                        -> Sniffer {
        self.matchers.push(Matcher { kind, predicate });
        self
    }

    /// Identifies the format of the given prefix.  Prefixes shorter than
    /// [`MIN_PREFIX_LEN`] are always unknown.
    pub fn detect(&self, prefix: &[u8]) -> DetectedType {
        if prefix.len() < MIN_PREFIX_LEN {
            return DetectedType::Unknown;
        }
        self.matchers
            .iter()
            .find(|matcher| (matcher.predicate)(prefix))
            .map_or(DetectedType::Unknown, |matcher| matcher.kind)
    }
}

impl Default for Sniffer {
    /// The baseline matchers plus ICNS.
    fn default() -> Sniffer {
        Sniffer::baseline().with_matcher(DetectedType::Icns, is_icns)
    }
}

/// Returns true if the data begins with the ICNS magic literal.
pub fn is_icns(prefix: &[u8]) -> bool {
    prefix.starts_with(ICNS_MAGIC_LITERAL)
}
