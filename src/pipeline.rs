//! Turns one decoded source image into the artifacts of each requested
//! profile.

use rayon::prelude::*;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::acquire::{self, DEFAULT_IDLE_TIMEOUT};
use crate::decode::decode;
use crate::error::{Error, Result};
use crate::family::IconFamily;
use crate::icondir::IconDir;
use crate::icontype::IconType;
use crate::image::Image;
use crate::profile::{OutputKind, Profile, SizeSpec};
use crate::resample::{resample, Quality};
use crate::sniff::{DetectedType, Sniffer};

/// The base name used when neither a name nor a source path is available.
pub const DEFAULT_BASE_NAME: &str = "icon";

/// Immutable settings for one run, built once at startup.
#[derive(Clone, Debug)]
pub struct RunContext {
    /// Source image paths; empty means standard input.
    pub sources: Vec<PathBuf>,
    /// Profiles to produce, in processing order.
    pub profiles: Vec<Profile>,
    /// Overrides the base name of every output file.
    pub name: Option<String>,
    /// Resampling quality.
    pub quality: Quality,
    /// Whether sizes larger than the source image are produced.
    pub upscale: bool,
    /// How long a silent input stream is waited on.
    pub idle_timeout: Duration,
    /// Directory that output files are written into.
    pub out_dir: PathBuf,
}

impl Default for RunContext {
    fn default() -> RunContext {
        RunContext {
            sources: Vec::new(),
            profiles: Vec::new(),
            name: None,
            quality: Quality::default(),
            upscale: false,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            out_dir: PathBuf::from("."),
        }
    }
}

impl RunContext {
    /// Returns the base name for outputs derived from `source`: the name
    /// override if given, else the source's file name minus its extension.
    pub fn base_name(&self, source: Option<&Path>) -> String {
        if let Some(ref name) = self.name {
            return name.clone();
        }
        source.and_then(Path::file_stem)
            .map(|stem| stem.to_string_lossy().into_owned())
            .filter(|stem| !stem.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_NAME.to_string())
    }
}

/// A finished output file, ready to be written.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Artifact {
    /// The profile that produced this artifact.
    pub profile: Profile,
    /// The file name, without any directory.
    pub file_name: String,
    /// The complete file contents.
    pub bytes: Vec<u8>,
}

/// The result of converting one profile.
#[derive(Debug)]
pub struct ProfileOutcome {
    /// The profile that was attempted.
    pub profile: Profile,
    /// Its artifacts, or the error that stopped it.
    pub result: Result<Vec<Artifact>>,
}

/// Acquires a source from `reader`, decodes it, and converts it for every
/// profile in `ctx`.  Acquisition and decode failures affect every profile
/// and are returned directly; everything after that is per profile.
pub fn run<R>(reader: R,
              sniffer: &Sniffer,
              ctx: &RunContext,
              base_name: &str)
              -> Result<Vec<ProfileOutcome>>
    where R: Read + Send + 'static
{
    let acquired = acquire::acquire(reader, sniffer, ctx.idle_timeout)?;
    if acquired.blob.is_empty() || acquired.kind == DetectedType::Unknown {
        return Err(Error::InsufficientInput);
    }
    let image = decode(&acquired.blob, acquired.kind)?;
    Ok(convert(&image, ctx, base_name))
}

/// Converts a decoded image for every profile in `ctx`.  Profiles run in
/// parallel; outcomes are returned in the order the profiles were listed.
pub fn convert(image: &Image,
               ctx: &RunContext,
               base_name: &str)
               -> Vec<ProfileOutcome> {
    ctx.profiles
        .par_iter()
        .map(|&profile| {
            let result = convert_profile(image, profile, ctx, base_name);
            if let Err(ref error) = result {
                log::error!("{}: {}", profile, error);
            }
            ProfileOutcome { profile, result }
        })
        .collect()
}

/// Produces the artifacts of a single profile.
pub fn convert_profile(image: &Image,
                       profile: Profile,
                       ctx: &RunContext,
                       base_name: &str)
                       -> Result<Vec<Artifact>> {
    let sizes = select_sizes(image, profile, ctx.upscale)?;
    log::debug!("{}: producing {} size(s) from {}x{}",
                profile,
                sizes.len(),
                image.width(),
                image.height());
    let artifacts = match profile.output() {
        OutputKind::Ico => {
            let icondir = pack_ico(image, profile, &sizes, ctx.quality)?;
            vec![Artifact {
                     profile,
                     file_name: container_file_name(base_name, profile),
                     bytes: icondir.to_bytes()?,
                 }]
        }
        OutputKind::Icns => {
            let family = pack_icns(image, profile, &sizes, ctx.quality)?;
            vec![Artifact {
                     profile,
                     file_name: container_file_name(base_name, profile),
                     bytes: family.to_bytes()?,
                 }]
        }
        OutputKind::PngSet => {
            render_png_set(image, &sizes, ctx.quality)?
                .into_iter()
                .map(|(size, bytes)| {
                    Artifact {
                        profile,
                        file_name: png_file_name(base_name, profile, size),
                        bytes,
                    }
                })
                .collect()
        }
    };
    for artifact in &artifacts {
        log::info!("{}: {} ({} bytes)",
                   profile,
                   artifact.file_name,
                   artifact.bytes.len());
    }
    Ok(artifacts)
}

/// Returns the planned sizes of `profile` that can be produced from
/// `image`.  Without `upscale`, sizes larger than the image are skipped.
pub fn select_sizes(image: &Image,
                    profile: Profile,
                    upscale: bool)
                    -> Result<Vec<SizeSpec>> {
    let mut sizes = profile.plan();
    if !upscale {
        sizes.retain(|size| {
            let fits = size.fits_within(image.width(), image.height());
            if !fits {
                log::warn!("{}: skipping {} (source is only {}x{})",
                           profile,
                           size,
                           image.width(),
                           image.height());
            }
            fits
        });
    }
    if sizes.is_empty() {
        return Err(Error::EmptyPlan {
            profile,
            reason: format!("every size is larger than the {}x{} source",
                            image.width(),
                            image.height()),
        });
    }
    Ok(sizes)
}

fn resize_to(image: &Image, size: SizeSpec, quality: Quality) -> Result<Image> {
    resample(image, size.pixel_width(), size.pixel_height(), quality)
        .map_err(|source| Error::Resize { size, source })
}

/// Resamples `image` to each size and packs the results into an ICO, in
/// plan order.
pub fn pack_ico(image: &Image,
                profile: Profile,
                sizes: &[SizeSpec],
                quality: Quality)
                -> Result<IconDir> {
    if let Some(&size) = sizes.get(u16::MAX as usize) {
        return Err(Error::Plan {
            profile,
            size,
            reason: format!("an ICO holds at most {} images", u16::MAX),
        });
    }
    if let Some(&size) = sizes.iter().find(|size| size.pixel_width() == 0 ||
                                                  size.pixel_height() == 0) {
        return Err(Error::Plan {
            profile,
            size,
            reason: "empty size".to_string(),
        });
    }
    let mut icondir = IconDir::new();
    for &size in sizes {
        let resized = resize_to(image, size, quality)?;
        icondir.add_image(&resized)
            .map_err(|source| Error::Encode { size, source })?;
    }
    Ok(icondir)
}

/// Resamples `image` to each size and packs the results into an ICNS, in
/// plan order.  Every size is mapped to an element type before any
/// resampling happens, so an unmappable size fails the whole container up
/// front.
pub fn pack_icns(image: &Image,
                 profile: Profile,
                 sizes: &[SizeSpec],
                 quality: Quality)
                 -> Result<IconFamily> {
    let icon_types = sizes.iter()
        .map(|&size| {
            IconType::from_size_spec(size).ok_or_else(|| {
                Error::Plan {
                    profile,
                    size,
                    reason: "no ICNS element type has this size".to_string(),
                }
            })
        })
        .collect::<Result<Vec<IconType>>>()?;
    let mut family = IconFamily::new();
    for (&size, &icon_type) in sizes.iter().zip(&icon_types) {
        let resized = resize_to(image, size, quality)?;
        family.add_icon_with_type(&resized, icon_type)
            .map_err(|source| Error::Encode { size, source })?;
    }
    Ok(family)
}

/// Resamples `image` to each size and encodes each result as its own PNG.
pub fn render_png_set(image: &Image,
                      sizes: &[SizeSpec],
                      quality: Quality)
                      -> Result<Vec<(SizeSpec, Vec<u8>)>> {
    sizes.iter()
        .map(|&size| {
            let resized = resize_to(image, size, quality)?;
            let bytes = resized.to_png_bytes()
                .map_err(|source| Error::Encode { size, source })?;
            Ok((size, bytes))
        })
        .collect()
}

/// Returns the file name of the container produced by `profile`.
pub fn container_file_name(base_name: &str, profile: Profile) -> String {
    let extension = if profile.output() == OutputKind::Icns {
        "icns"
    } else {
        "ico"
    };
    match profile {
        Profile::WinVista | Profile::MacOS => {
            format!("{}.{}", base_name, extension)
        }
        _ => format!("{}-{}.{}", base_name, profile.name(), extension),
    }
}

/// Returns the file name of one PNG produced by `profile`.
pub fn png_file_name(base_name: &str, profile: Profile, size: SizeSpec)
                     -> String {
    format!("{}-{}-{}x{}.png",
            base_name,
            profile.name(),
            size.pixel_width(),
            size.pixel_height())
}
