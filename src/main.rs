use argh::FromArgs;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use iconimp::pipeline::{self, ProfileOutcome};
use iconimp::{Error, Profile, Quality, RunContext, Sniffer};

#[derive(FromArgs, Debug)]
/// A cross-platform ICO, ICNS, and Web Icons generator.  Reads the source
/// image from the given path, or from standard input when none is given.
struct Args {
    /// source image path(s)
    #[argh(positional)]
    images: Vec<PathBuf>,

    /// create Browser Icons in sizes 16x16, 32x32, 48x48, 64x64, and
    /// 128x128 PNG
    #[argh(switch)]
    browser: bool,

    /// output debug info
    #[argh(switch, short = 'D')]
    debug: bool,

    /// create a Windows 32x32 favicon.ico
    #[argh(switch, short = 'f')]
    favicon: bool,

    /// create a macOS/OS X 1024x1024 ICNS with the normal sub-sizes
    #[argh(switch, short = 'm')]
    macos: bool,

    /// specify the base name of the generated files
    #[argh(option, short = 'n')]
    name: Option<String>,

    /// create Touch Icons in 57x57
    #[argh(switch)]
    touch: bool,

    /// create Web Icons (browser, tile, and touch) in sizes from 57x57 to
    /// 558x558 PNG
    #[argh(switch, short = 'w')]
    webicons: bool,

    /// create a Windows 10 768x768, 256x256, 64x64, 32x32, 24x24, and 16x16
    /// PNG compressed ICO
    #[argh(switch, short = 'x')]
    win10: bool,

    /// create a Windows Vista 256x256 PNG compressed ICO
    #[argh(switch, short = 'v')]
    winvista: bool,

    /// resampling quality from 0 (nearest neighbour) to 5 (Lanczos3)
    /// [default: 5]
    #[argh(option, short = 'q', default = "5")]
    quality: i32,

    /// also produce sizes larger than the source image
    #[argh(switch)]
    upscale: bool,

    /// milliseconds of input silence before the input is considered
    /// complete [default: 1000]
    #[argh(option, default = "1000")]
    timeout_ms: u64,

    /// directory to write generated files into [default: .]
    #[argh(option, default = "PathBuf::from(\".\")")]
    out_dir: PathBuf,
}

impl Args {
    fn profiles(&self) -> Vec<Profile> {
        let toggles = [(self.favicon, Profile::FavIcon),
                       (self.win10, Profile::Win10),
                       (self.winvista, Profile::WinVista),
                       (self.macos, Profile::MacOS),
                       (self.browser, Profile::Browser),
                       (self.touch, Profile::Touch),
                       (self.webicons, Profile::WebIcons)];
        toggles.iter()
            .filter(|&&(enabled, _)| enabled)
            .map(|&(_, profile)| profile)
            .collect()
    }

    fn into_context(self) -> RunContext {
        RunContext {
            profiles: self.profiles(),
            sources: self.images,
            name: self.name,
            quality: Quality::new(self.quality),
            upscale: self.upscale,
            idle_timeout: Duration::from_millis(self.timeout_ms),
            out_dir: self.out_dir,
        }
    }
}

fn main() -> ExitCode {
    let args: Args = argh::from_env();
    let default_filter = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default()
            .default_filter_or(default_filter))
        .init();
    log::debug!("{:?}", args);

    let ctx = args.into_context();
    if ctx.profiles.is_empty() {
        log::info!("no icon profiles requested; nothing to do");
        return ExitCode::SUCCESS;
    }
    let sniffer = Sniffer::default();

    let mut failed = false;
    if ctx.sources.is_empty() {
        let base_name = ctx.base_name(None);
        failed |= !process(io::stdin(), &sniffer, &ctx, &base_name);
    } else {
        if ctx.name.is_some() && ctx.sources.len() > 1 {
            log::warn!("--name applies to every source; later outputs will \
                        replace earlier ones");
        }
        for source in &ctx.sources {
            let file = match File::open(source) {
                Ok(file) => file,
                Err(error) => {
                    log::error!("{}: {}", source.display(), error);
                    failed = true;
                    continue;
                }
            };
            log::info!("reading {}", source.display());
            let base_name = ctx.base_name(Some(source));
            failed |= !process(file, &sniffer, &ctx, &base_name);
        }
    }
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Converts one source and writes its artifacts.  Returns false if the run
/// should end with a failure status.
fn process<R>(reader: R,
              sniffer: &Sniffer,
              ctx: &RunContext,
              base_name: &str)
              -> bool
    where R: io::Read + Send + 'static
{
    let outcomes = match pipeline::run(reader, sniffer, ctx, base_name) {
        Ok(outcomes) => outcomes,
        Err(error @ Error::Acquisition(_)) |
        Err(error @ Error::InsufficientInput) => {
            log::error!("{}", error);
            return false;
        }
        Err(error) => {
            // Decoding failed, so every requested profile is abandoned.
            for profile in &ctx.profiles {
                log::error!("{}: {}", profile, error);
            }
            return true;
        }
    };
    for outcome in outcomes {
        write_outcome(outcome, &ctx.out_dir);
    }
    true
}

fn write_outcome(outcome: ProfileOutcome, out_dir: &Path) {
    // Errors were already reported by the pipeline.
    let artifacts = match outcome.result {
        Ok(artifacts) => artifacts,
        Err(_) => return,
    };
    for artifact in artifacts {
        let path = out_dir.join(&artifact.file_name);
        match write_file(&path, &artifact.bytes) {
            Ok(()) => log::info!("wrote {}", path.display()),
            Err(error) => {
                log::error!("{}: failed to write {}: {}",
                            outcome.profile,
                            path.display(),
                            error)
            }
        }
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(bytes)?;
    writer.flush()
}
