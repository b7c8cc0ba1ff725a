#![deny(unsafe_code)]
//! CLI for the texfmt texture-format repro.
//!
//! Subcommands:
//! - `show`: open the window comparing driver and software conversion
//! - `inspect`: print one pixel's color, packed texel and expansion
//! - `snapshot`: write the expected halves as PNGs
//! - `formats`: list available pixel formats

mod error;
mod snapshot;
mod window;

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use error::CliError;
use texfmt_core::{
    ColorBuffer, ColorField, PackedBuffer, PackedFormat, DEFAULT_HEIGHT, DEFAULT_WIDTH,
};
use window::{run_viewer, ViewerOptions};

#[derive(Parser)]
#[command(
    name = "texfmt",
    about = "Compare driver and software conversion of reduced-precision textures"
)]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

/// Which image to generate and how to pack it.
#[derive(Args, Debug, Clone)]
struct ImageArgs {
    /// Pixel format (rgba8, r3g3b2, rgba2, rgba4, rgb5a1, or 8888/332/2222/4444/5551).
    #[arg(short, long, env = "TEXFMT_FORMAT", default_value = "r3g3b2")]
    format: PackedFormat,

    /// Texture width in pixels.
    #[arg(short = 'W', long, default_value_t = DEFAULT_WIDTH)]
    width: usize,

    /// Texture height in pixels.
    #[arg(short = 'H', long, default_value_t = DEFAULT_HEIGHT)]
    height: usize,
}

impl ImageArgs {
    /// Generates the reference image and its packed counterpart.
    fn build(&self) -> Result<(ColorBuffer, PackedBuffer), CliError> {
        let colors = ColorField::new(self.width, self.height)?.generate();
        let packed = PackedBuffer::pack(&colors, self.format);
        log::debug!(
            "generated {}x{} field, packed as {} ({} bytes)",
            self.width,
            self.height,
            self.format,
            packed.as_bytes().len()
        );
        Ok((colors, packed))
    }
}

#[derive(Subcommand)]
enum Command {
    /// Open a window with the driver-converted texture on top and the
    /// software-packed texture below. Escape quits.
    Show {
        #[command(flatten)]
        image: ImageArgs,

        /// Do not request a GL debug context.
        #[arg(long)]
        no_debug: bool,

        /// Read both halves back after the first frame and report differences.
        #[arg(long)]
        readback: bool,

        /// Per-channel difference the readback tolerates.
        #[arg(long, default_value_t = 0)]
        tolerance: u8,
    },
    /// Show how one pixel is generated, packed and expanded.
    Inspect {
        #[command(flatten)]
        image: ImageArgs,

        /// Pixel column.
        #[arg(short, long, default_value_t = 0)]
        x: usize,

        /// Pixel row (0 is the bottom row).
        #[arg(short, long, default_value_t = 0)]
        y: usize,
    },
    /// Write reference.png and software.png, the expected look of both halves.
    Snapshot {
        #[command(flatten)]
        image: ImageArgs,

        /// Output directory.
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
    /// List available pixel formats.
    Formats,
}

fn texel_hex(format: PackedFormat, texel: u32) -> String {
    let digits = format.spec().bytes_per_texel * 2;
    format!("0x{texel:0digits$X}")
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Formats => {
            if cli.json {
                let formats: Vec<_> = PackedFormat::ALL
                    .iter()
                    .map(|f| {
                        let spec = f.spec();
                        serde_json::json!({
                            "name": spec.name,
                            "layout": spec.layout,
                            "channel_bits": spec.channel_bits,
                            "bytes_per_texel": spec.bytes_per_texel,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&formats)?);
            } else {
                println!("Formats:");
                for f in PackedFormat::ALL {
                    let spec = f.spec();
                    println!(
                        "  {:<7} {:<5} {} byte(s) per texel",
                        spec.name, spec.layout, spec.bytes_per_texel
                    );
                }
            }
        }
        Command::Inspect { image, x, y } => {
            if x >= image.width || y >= image.height {
                return Err(CliError::Input(format!(
                    "pixel ({x}, {y}) is outside the {}x{} image",
                    image.width, image.height
                )));
            }
            let field = ColorField::new(image.width, image.height)?;
            let color = field.sample(x, y);
            let texel = image.format.encode(color);
            let expanded = image.format.decode(texel);

            if cli.json {
                let info = serde_json::json!({
                    "format": image.format,
                    "x": x,
                    "y": y,
                    "hue": field.hue_at(x),
                    "lightness": field.lightness_at(y),
                    "color": color,
                    "texel": texel,
                    "expanded": expanded,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!(
                    "pixel ({x}, {y}): hue {:.2}, lightness {:.4}",
                    field.hue_at(x),
                    field.lightness_at(y)
                );
                println!(
                    "  color    rgba({}, {}, {}, {})",
                    color.r, color.g, color.b, color.a
                );
                println!(
                    "  {:<8} {}",
                    image.format.name(),
                    texel_hex(image.format, texel)
                );
                println!(
                    "  expanded rgba({}, {}, {}, {})",
                    expanded.r, expanded.g, expanded.b, expanded.a
                );
            }
        }
        Command::Snapshot { image, output } => {
            let (colors, packed) = image.build()?;
            let paths = snapshot::write_snapshots(&colors, &packed, &output)?;
            if cli.json {
                let files: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
                let info = serde_json::json!({
                    "format": image.format,
                    "width": image.width,
                    "height": image.height,
                    "files": files,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                for path in &paths {
                    eprintln!("wrote {}", path.display());
                }
            }
        }
        Command::Show {
            image,
            no_debug,
            readback,
            tolerance,
        } => {
            let (colors, packed) = image.build()?;
            let options = ViewerOptions {
                debug: !no_debug,
                readback,
                tolerance,
            };
            log::info!(
                "showing {} at {}x{} (escape to quit)",
                image.format,
                image.width,
                image.height
            );
            let report = run_viewer(&colors, &packed, options)?;

            if cli.json {
                let info = serde_json::json!({
                    "format": image.format,
                    "width": image.width,
                    "height": image.height,
                    "frames": report.frames,
                    "diff": report.diff,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else if let Some(diff) = report.diff {
                eprintln!(
                    "{}: {} of {} pixels differ (max channel delta {})",
                    image.format, diff.mismatched, diff.pixels, diff.max_channel_delta
                );
            }
        }
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            log::error!("{e}");
        }
        process::exit(e.exit_code());
    }
}
