use clap::{Parser, Subcommand, ValueEnum};
use rust_qr_codec::{
    DecoderConfig, DetectStrategy, ECLevel, ImageWriter, Mode, ThresholdMode, VersionChoice,
    decode_luminance, encode,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "qrtool", version, about = "QR code encode/decode tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encode text into a PNG symbol
    Encode {
        #[arg(long)]
        text: String,
        #[arg(long, value_enum, default_value_t = ModeArg::Byte)]
        mode: ModeArg,
        /// Version 1-40; smallest fitting version when omitted
        #[arg(long)]
        version: Option<u8>,
        #[arg(long, value_enum, default_value_t = EcArg::M)]
        ec: EcArg,
        /// Pixels per module
        #[arg(long, default_value_t = 4)]
        module_size: usize,
        /// Quiet zone in modules
        #[arg(long, default_value_t = 4)]
        quiet_zone: usize,
        #[arg(long)]
        output: PathBuf,
    },
    /// Decode the symbol in an image
    Decode {
        #[arg(long)]
        image: PathBuf,
        #[arg(long, value_enum)]
        threshold: Option<ThresholdArg>,
        #[arg(long, value_enum)]
        strategy: Option<StrategyArg>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Numeric,
    Alphanumeric,
    Byte,
}

#[derive(Clone, Copy, ValueEnum)]
enum EcArg {
    L,
    M,
    Q,
    H,
}

#[derive(Clone, Copy, ValueEnum)]
enum ThresholdArg {
    Mean,
    Zoned,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Finder,
    GridFit,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Numeric => Mode::Numeric,
            ModeArg::Alphanumeric => Mode::Alphanumeric,
            ModeArg::Byte => Mode::Byte,
        }
    }
}

impl From<EcArg> for ECLevel {
    fn from(ec: EcArg) -> Self {
        match ec {
            EcArg::L => ECLevel::L,
            EcArg::M => ECLevel::M,
            EcArg::Q => ECLevel::Q,
            EcArg::H => ECLevel::H,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Encode {
            text,
            mode,
            version,
            ec,
            module_size,
            quiet_zone,
            output,
        } => {
            let choice = version.map_or(VersionChoice::Auto, VersionChoice::Fixed);
            encode_cmd(&text, mode.into(), choice, ec.into(), module_size, quiet_zone, &output)
        }
        Command::Decode {
            image,
            threshold,
            strategy,
        } => decode_cmd(&image, threshold, strategy),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn encode_cmd(
    text: &str,
    mode: Mode,
    choice: VersionChoice,
    level: ECLevel,
    module_size: usize,
    quiet_zone: usize,
    output: &Path,
) -> Result<(), String> {
    let mut writer = ImageWriter::new(module_size, quiet_zone);
    encode(text, mode, choice, level, &mut writer).map_err(|err| format!("Encode failed: {err}"))?;
    let image = writer.into_image();
    image
        .save(output)
        .map_err(|err| format!("Failed to write {}: {err}", output.display()))?;
    println!(
        "Wrote {} ({}x{})",
        output.display(),
        image.width(),
        image.height()
    );
    Ok(())
}

fn decode_cmd(
    image: &Path,
    threshold: Option<ThresholdArg>,
    strategy: Option<StrategyArg>,
) -> Result<(), String> {
    let gray = image::open(image)
        .map_err(|err| format!("Failed to load image {}: {err}", image.display()))?
        .to_luma8();

    let mut config = DecoderConfig::from_env();
    if let Some(threshold) = threshold {
        config.threshold = match threshold {
            ThresholdArg::Mean => ThresholdMode::Mean,
            ThresholdArg::Zoned => ThresholdMode::Zoned,
        };
    }
    if let Some(strategy) = strategy {
        config.strategy = match strategy {
            StrategyArg::Finder => DetectStrategy::FinderPatterns,
            StrategyArg::GridFit => DetectStrategy::GridFit,
        };
    }

    let start = Instant::now();
    let qr = decode_luminance(&gray, &config).map_err(|err| format!("Decode failed: {err}"))?;
    let elapsed = start.elapsed();

    println!("Image: {} ({}x{})", image.display(), gray.width(), gray.height());
    println!(
        "version={} error_correction={:?} mask={} corrected={} grade={} time={:.2}ms",
        qr.version,
        qr.error_correction,
        qr.mask_pattern.id(),
        qr.corrected_errors(),
        qr.error_grade,
        elapsed.as_secs_f64() * 1000.0
    );
    if qr.low_confidence_version {
        println!("warning: version information disagreed with the sampled size");
    }
    println!("{}", qr.content);
    Ok(())
}
