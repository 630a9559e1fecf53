use iconimp::pipeline::{self, ProfileOutcome};
use iconimp::{Artifact, DetectedType, Error, IconDir, IconFamily, IconType,
              Image, OutputKind, PixelFormat, Profile, Quality, RunContext,
              Sniffer};
use proptest::prelude::*;
use std::io::{self, Cursor};

fn gradient(width: u32, height: u32) -> Image {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            data.push((x * 255 / width) as u8);
            data.push((y * 255 / height) as u8);
            data.push(0x80);
            data.push(0xff);
        }
    }
    Image::from_data(PixelFormat::RGBA, width, height, data).unwrap()
}

fn context(profiles: &[Profile]) -> RunContext {
    RunContext {
        profiles: profiles.to_vec(),
        quality: Quality::FASTEST,
        ..RunContext::default()
    }
}

fn run_png(image: &Image, profiles: &[Profile]) -> Vec<ProfileOutcome> {
    let png = image.to_png_bytes().unwrap();
    pipeline::run(Cursor::new(png),
                  &Sniffer::default(),
                  &context(profiles),
                  "app")
        .unwrap()
}

fn only_artifact(outcome: &ProfileOutcome) -> &Artifact {
    let artifacts = outcome.result.as_ref().unwrap();
    assert_eq!(artifacts.len(), 1);
    &artifacts[0]
}

#[test]
fn winvista_from_512_source() {
    let outcomes = run_png(&gradient(512, 512), &[Profile::WinVista]);
    let artifact = only_artifact(&outcomes[0]);
    assert_eq!(artifact.file_name, "app.ico");
    let icondir = IconDir::read(Cursor::new(&artifact.bytes)).unwrap();
    assert_eq!(icondir.entries().len(), 1);
    let entry = &icondir.entries()[0];
    assert!(entry.is_png());
    assert_eq!((entry.width(), entry.height()), (256, 256));
    let image = entry.decode().unwrap();
    assert_eq!(image.pixel_format(), PixelFormat::RGBA);
    assert_eq!((image.width(), image.height()), (256, 256));
}

#[test]
fn macos_from_512_source_skips_1024() {
    let outcomes = run_png(&gradient(512, 512), &[Profile::MacOS]);
    let artifact = only_artifact(&outcomes[0]);
    assert_eq!(artifact.file_name, "app.icns");
    assert_eq!(&artifact.bytes[0..4], b"icns");
    let declared = u32::from_be_bytes([artifact.bytes[4],
                                       artifact.bytes[5],
                                       artifact.bytes[6],
                                       artifact.bytes[7]]);
    assert_eq!(declared as usize, artifact.bytes.len());
    let family = IconFamily::read(Cursor::new(&artifact.bytes)).unwrap();
    assert!(family.has_icon_with_type(IconType::RGBA32_512x512));
    assert!(family.has_icon_with_type(IconType::RGBA32_256x256_2x));
    assert!(!family.has_icon_with_type(IconType::RGBA32_512x512_2x));
    assert_eq!(family.elements.len(), 10);
    let image = family.get_icon_with_type(IconType::RGBA32_16x16_2x)
        .unwrap();
    assert_eq!((image.width(), image.height()), (32, 32));
}

#[test]
fn win10_from_1024_source_keeps_plan_order() {
    let outcomes = run_png(&gradient(1024, 1024), &[Profile::Win10]);
    let artifact = only_artifact(&outcomes[0]);
    assert_eq!(artifact.file_name, "app-win10.ico");
    let icondir = IconDir::read(Cursor::new(&artifact.bytes)).unwrap();
    let widths: Vec<u32> =
        icondir.entries().iter().map(|entry| entry.width()).collect();
    // The directory caps recorded dimensions at 256.
    assert_eq!(widths, vec![16, 24, 32, 64, 256, 256]);
    assert_eq!(icondir.total_length(), artifact.bytes.len() as u64);
    let largest = icondir.entries()[5].decode().unwrap();
    assert_eq!((largest.width(), largest.height()), (768, 768));
}

#[test]
fn png_sets_produce_one_file_per_size() {
    let outcomes = run_png(&gradient(128, 128),
                           &[Profile::Browser, Profile::Touch]);
    let browser = outcomes[0].result.as_ref().unwrap();
    let names: Vec<&str> =
        browser.iter().map(|artifact| artifact.file_name.as_str()).collect();
    assert_eq!(names,
               vec!["app-browser-16x16.png",
                    "app-browser-32x32.png",
                    "app-browser-48x48.png",
                    "app-browser-64x64.png",
                    "app-browser-128x128.png"]);
    let touch = only_artifact(&outcomes[1]);
    assert_eq!(touch.file_name, "app-touch-57x57.png");
    let image = Image::read_png_bytes(&touch.bytes).unwrap();
    assert_eq!((image.width(), image.height()), (57, 57));
}

#[test]
fn small_source_fails_only_large_profiles() {
    let outcomes = run_png(&gradient(48, 48),
                           &[Profile::WinVista, Profile::FavIcon]);
    assert!(matches!(outcomes[0].result,
                     Err(Error::EmptyPlan { profile: Profile::WinVista,
                                            .. })));
    let artifact = only_artifact(&outcomes[1]);
    let icondir = IconDir::read(Cursor::new(&artifact.bytes)).unwrap();
    assert_eq!(icondir.entries()[0].width(), 32);
}

#[test]
fn empty_input_is_insufficient() {
    let result = pipeline::run(io::empty(),
                               &Sniffer::default(),
                               &context(&[Profile::FavIcon]),
                               "app");
    assert!(matches!(result, Err(Error::InsufficientInput)));
}

#[test]
fn unrecognized_input_is_insufficient() {
    let result = pipeline::run(Cursor::new(b"hello, world".to_vec()),
                               &Sniffer::default(),
                               &context(&[Profile::FavIcon]),
                               "app");
    assert!(matches!(result, Err(Error::InsufficientInput)));
}

#[test]
fn icns_source_is_unsupported() {
    let mut family = IconFamily::new();
    family.add_icon_with_type(&gradient(16, 16), IconType::RGBA32_16x16)
        .unwrap();
    let result = pipeline::run(Cursor::new(family.to_bytes().unwrap()),
                               &Sniffer::default(),
                               &context(&[Profile::FavIcon]),
                               "app");
    assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
}

#[test]
fn every_profile_produces_its_whole_plan_from_1024_source() {
    let outcomes = run_png(&gradient(1024, 1024), &Profile::ALL);
    assert_eq!(outcomes.len(), Profile::ALL.len());
    for (outcome, &profile) in outcomes.iter().zip(Profile::ALL.iter()) {
        assert_eq!(outcome.profile, profile);
        let artifacts = outcome.result.as_ref().unwrap();
        let count = match profile.output() {
            OutputKind::Ico => {
                let artifact = only_artifact(outcome);
                IconDir::read(Cursor::new(&artifact.bytes))
                    .unwrap()
                    .entries()
                    .len()
            }
            OutputKind::Icns => {
                let artifact = only_artifact(outcome);
                IconFamily::read(Cursor::new(&artifact.bytes))
                    .unwrap()
                    .elements
                    .len()
            }
            OutputKind::PngSet => artifacts.len(),
        };
        assert_eq!(count, profile.plan().len(), "{}", profile);
    }
}

#[cfg(feature = "jpegio")]
#[test]
fn jpeg_source_gains_opaque_alpha() {
    use image::codecs::jpeg::JpegEncoder;
    use image::ExtendedColorType;

    let pixels: Vec<u8> =
        (0..300 * 300).flat_map(|_| [200u8, 10, 12]).collect();
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, 95)
        .encode(&pixels, 300, 300, ExtendedColorType::Rgb8)
        .unwrap();
    assert_eq!(Sniffer::default().detect(&jpeg), DetectedType::Jpeg);

    let outcomes = pipeline::run(Cursor::new(jpeg),
                                 &Sniffer::default(),
                                 &context(&[Profile::WinVista]),
                                 "photo")
        .unwrap();
    let artifact = only_artifact(&outcomes[0]);
    assert_eq!(artifact.file_name, "photo.ico");
    let icondir = IconDir::read(Cursor::new(&artifact.bytes)).unwrap();
    let image = icondir.entries()[0].decode().unwrap();
    assert_eq!(image.pixel_format(), PixelFormat::RGBA);
    assert_eq!((image.width(), image.height()), (256, 256));
    assert!(image.data().chunks(4).all(|pixel| pixel[3] == 255));
    let first = &image.data()[..4];
    assert!(first[0] > 180 && first[1] < 40 && first[2] < 40,
            "unexpected color {:?}",
            first);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn ico_length_matches_serialization(sizes in
            prop::collection::vec(1u32..40, 1..5)) {
        let mut icondir = IconDir::new();
        for &size in &sizes {
            icondir.add_image(&gradient(size, size)).unwrap();
        }
        let bytes = icondir.to_bytes().unwrap();
        prop_assert_eq!(icondir.total_length(), bytes.len() as u64);
        let read = IconDir::read(Cursor::new(&bytes)).unwrap();
        prop_assert_eq!(read.entries().len(), sizes.len());
    }

    #[test]
    fn icns_length_matches_serialization(count in 1usize..4) {
        let types = [IconType::RGBA32_16x16,
                     IconType::RGBA32_16x16_2x,
                     IconType::RGBA32_32x32];
        let mut family = IconFamily::new();
        for &icon_type in &types[..count] {
            let image = gradient(icon_type.pixel_width(),
                                 icon_type.pixel_height());
            family.add_icon_with_type(&image, icon_type).unwrap();
        }
        let bytes = family.to_bytes().unwrap();
        prop_assert_eq!(family.total_length() as usize, bytes.len());
    }
}
