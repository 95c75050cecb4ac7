use std::collections::HashSet;
use std::error::Error;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use clap::{value_parser, Arg, ArgAction, Command, ValueEnum};
use pixelit::archive::{write_zip, DEFAULT_ARCHIVE_NAME};
use pixelit::config::{DEFAULT_SCALE, MAX_SCALE, MIN_SCALE};
use pixelit::{BlockPixelizer, Palette, PixelateConfig, Preset, Scale, SourceImage};

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PresetArg {
    Gameboy,
    Cga,
    Pastel,
    Retro,
    Neon,
}

impl From<PresetArg> for Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Gameboy => Preset::Gameboy,
            PresetArg::Cga => Preset::Cga,
            PresetArg::Pastel => Preset::Pastel,
            PresetArg::Retro => Preset::Retro,
            PresetArg::Neon => Preset::Neon,
        }
    }
}

fn cli() -> Command {
    Command::new("pixelit")
        .version("0.1")
        .about("Pixelate a batch of images, optionally snapping them to a palette.")
        .arg(
            Arg::new("input")
                .help("Images to pixelate (at most 50 are processed)")
                .required(true)
                .num_args(1..)
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .index(1),
        )
        .arg(
            Arg::new("output_dir")
                .short('o')
                .long("output-dir")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf))
                .help("Directory for the results. Defaults to the current directory."),
        )
        .arg(
            Arg::new("zip")
                .long("zip")
                .help("Bundle every result into one zip archive instead of separate files.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("zip_name")
                .long("zip-name")
                .value_name("FILE")
                .help("Archive file name, inside the output directory.")
                .value_parser(value_parser!(PathBuf))
                .default_value(DEFAULT_ARCHIVE_NAME),
        )
        .arg(
            Arg::new("scale")
                .short('s')
                .long("scale")
                .help("Block size in source pixels.")
                .value_name("UINT")
                .value_parser(value_parser!(u32).range(MIN_SCALE as i64..=MAX_SCALE as i64))
                .default_value(DEFAULT_SCALE.to_string()),
        )
        .arg(
            Arg::new("palette")
                .short('p')
                .long("palette")
                .value_name("HEX,HEX,...")
                .help("Comma separated #RRGGBB colors, e.g. \"#ff0000,#00ff00,#0000ff\".")
                .conflicts_with("preset"),
        )
        .arg(
            Arg::new("preset")
                .long("preset")
                .value_name("NAME")
                .help("Use one of the built-in palettes.")
                .value_parser(value_parser!(PresetArg)),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Prints debug information verbosely.")
                .action(ArgAction::SetTrue),
        )
}

/// Refuse to write `target` when it is one of the input files.
fn check_not_input(target: &Path, inputs: &HashSet<PathBuf>) -> Result<(), Box<dyn Error>> {
    match fs::canonicalize(target) {
        Ok(resolved) if inputs.contains(&resolved) => Err(format!(
            "refusing to overwrite input file {}",
            target.display()
        )
        .into()),
        _ => Ok(()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let matches = cli().get_matches();

    let level = if matches.get_flag("verbose") { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let scale = Scale::new(matches.get_one::<u32>("scale").copied().unwrap_or(DEFAULT_SCALE))?;
    let palette = if let Some(preset) = matches.get_one::<PresetArg>("preset") {
        let preset = Preset::from(*preset);
        log::info!("Using the {} palette.", preset.name());
        preset.palette()
    } else if let Some(raw) = matches.get_one::<String>("palette") {
        let parsed = Palette::parse(raw);
        if parsed.palette.is_empty() {
            log::warn!("No usable colors in {:?}, skipping quantization.", raw);
        }
        parsed.palette
    } else {
        Palette::default()
    };

    let input_paths: Vec<&PathBuf> = matches.get_many::<PathBuf>("input").into_iter().flatten().collect();
    let inputs: HashSet<PathBuf> = input_paths
        .iter()
        .filter_map(|path| fs::canonicalize(path).ok())
        .collect();

    let sources: Vec<SourceImage> = input_paths
        .iter()
        .map(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned());
            // an unreadable file becomes an empty (undecodable) image and fails in place
            let bytes = fs::read(path).unwrap_or_else(|e| {
                log::error!("Cannot read {}: {}", path.display(), e);
                Vec::new()
            });
            SourceImage { name, bytes }
        })
        .collect();

    log::info!("Pixelating {} image(s) at scale {}.", sources.len(), scale.get());
    let config = PixelateConfig::with_scale(scale);
    let report = pixelit::process(&sources, &BlockPixelizer::new(palette), &config);

    let output_dir = matches
        .get_one::<PathBuf>("output_dir")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&output_dir)?;

    if matches.get_flag("zip") {
        let zip_name = matches
            .get_one::<PathBuf>("zip_name")
            .cloned()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ARCHIVE_NAME));
        let zip_path = output_dir.join(zip_name);
        check_not_input(&zip_path, &inputs)?;
        let written = write_zip(&report, BufWriter::new(File::create(&zip_path)?))?;
        log::info!("Wrote {} image(s) to {}", written, zip_path.display());
    } else {
        let outputs: Vec<(PathBuf, &[u8])> = report
            .named_outputs()
            .into_iter()
            .map(|(name, png)| (output_dir.join(name), png))
            .collect();
        for (path, _) in &outputs {
            check_not_input(path, &inputs)?;
        }
        for (path, png) in outputs {
            fs::write(&path, png)?;
            log::info!("Saved {}", path.display());
        }
    }

    if let Some(summary) = report.summary() {
        log::warn!("{}", summary);
    }
    if report.succeeded().next().is_none() {
        return Err("no image could be processed".into());
    }

    Ok(())
}
