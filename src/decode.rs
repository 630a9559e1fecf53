use crate::acquire::RawBlob;
use crate::error::{Error, Result};
use crate::image::Image;
use crate::sniff::DetectedType;

/// Decodes a raster source image.  Only PNG and JPEG are accepted as
/// sources; containers and unrecognized data are rejected.
pub fn decode(blob: &RawBlob, kind: DetectedType) -> Result<Image> {
    if blob.is_empty() {
        return Err(Error::InsufficientInput);
    }
    if !kind.is_raster() {
        return Err(Error::UnsupportedFormat(kind));
    }
    let decoded = match kind {
        DetectedType::Png => Image::read_png_bytes(blob.bytes()),
        #[cfg(feature = "jpegio")]
        DetectedType::Jpeg => Image::read_jpeg(blob.bytes()),
        _ => return Err(Error::UnsupportedFormat(kind)),
    };
    let image = decoded.map_err(|error| {
        Error::CorruptData {
            kind,
            reason: error.to_string(),
        }
    })?;
    log::debug!("decoded {} source: {}x{} {:?}",
                kind,
                image.width(),
                image.height(),
                image.pixel_format());
    Ok(image)
}
