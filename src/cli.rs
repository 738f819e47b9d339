// ============================================================================
// MockupFE CLI — headless mockup compositing via command-line arguments
// ============================================================================
//
// Usage examples:
//   mockupfe --background mug.jpg --design logo.png --output mockup.png
//   mockupfe -b shirt.png -d "art/*.png" --style print -o out.jpg --quality 85
//   mockupfe -b mug.jpg -d logo.png --layout placement.json --container 576x432 -o out.png
//   mockupfe -b mug.jpg -d a.png b.png --write-layout defaults.json -o preview.png
//
// No GUI is opened in CLI mode. Without --layout every design gets the
// cascaded default placement; without --container the layout is read in
// the background's native pixels.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, ValueEnum};

use crate::components::layers::{DesignLayers, Size};
use crate::io::{SaveFormat, encode_and_write, load_rgba, read_layout, write_layout};
use crate::ops::composite::{MockupStyle, RenderMode, compose};
use crate::ops::generate::{GenerationRequest, run_generation};

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum CliMode {
    /// Designs drawn plainly over the background (what a service receives).
    Final,
    /// Local style simulation (engrave / print / emboss).
    #[default]
    Simulate,
}

/// MockupFE headless compositor.
#[derive(Parser, Debug)]
#[command(
    name = "mockupfe",
    about = "MockupFE headless product mockup compositor",
    long_about = "Place design images on a product photo and write the flattened mockup\n\
                  without opening the editor.\n\n\
                  Example:\n  \
                  mockupfe --background mug.jpg --design logo.png --output mockup.png\n  \
                  mockupfe -b shirt.png -d \"art/*.png\" --style print -o out.jpg"
)]
pub struct CliArgs {
    /// Product photo the designs are placed on.
    #[arg(short, long, value_name = "IMAGE")]
    pub background: PathBuf,

    /// Design image(s), bottom to top. Glob patterns accepted (e.g. "art/*.png").
    #[arg(short, long, required = true, num_args = 1..)]
    pub design: Vec<String>,

    /// JSON list of transforms (`[{position, size, rotation}, ...]`), one per design.
    /// Missing entries get the default placement.
    #[arg(short, long, value_name = "FILE.json")]
    pub layout: Option<PathBuf>,

    /// Size the layout coordinates refer to, as WIDTHxHEIGHT.
    /// Defaults to the background's native size.
    #[arg(short, long, value_name = "WxH")]
    pub container: Option<String>,

    /// Simulation style: engrave, print, emboss.
    #[arg(short, long, default_value = "engrave")]
    pub style: MockupStyle,

    /// Render mode.
    #[arg(short, long, value_enum, default_value_t = CliMode::Simulate)]
    pub mode: CliMode,

    /// Output file path. Format inferred from the extension (png, jpg, bmp).
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// JPEG quality (1–100, default 90).
    #[arg(short, long, default_value_t = 90, value_name = "1-100")]
    pub quality: u8,

    /// Also write the transforms that were used to this JSON file.
    #[arg(long, value_name = "FILE.json")]
    pub write_layout: Option<PathBuf>,

    /// Print per-step timing and mirror log lines to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// Returns `true` when any CLI-mode flag is present in the real process arguments.
    /// Used by `main()` to route before creating an eframe window.
    pub fn is_cli_mode() -> bool {
        std::env::args().any(|a| a == "--background" || a == "-b")
    }
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run the compositing job and return an OS exit code.
pub fn run(args: CliArgs) -> ExitCode {
    crate::logger::set_echo(args.verbose);
    let start = Instant::now();
    match run_inner(&args) {
        Ok(()) => {
            if args.verbose {
                println!(
                    "  → {} ({:.0}ms)",
                    args.output.display(),
                    start.elapsed().as_secs_f64() * 1000.0
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_inner(args: &CliArgs) -> Result<(), String> {
    // -- Step 1: Load ----------------------------------------------------
    let design_paths = resolve_inputs(&args.design);
    if design_paths.is_empty() {
        return Err("no design files matched the given pattern(s).".to_string());
    }

    let background = load_rgba(&args.background).map_err(|e| e.to_string())?;
    let designs = design_paths
        .iter()
        .map(|p| load_rgba(p))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;
    if args.verbose {
        println!(
            "Loaded background {}x{} and {} design(s)",
            background.width(),
            background.height(),
            designs.len()
        );
    }

    // -- Step 2: Placement -----------------------------------------------
    let container = match args.container.as_deref() {
        Some(text) => parse_container(text)?,
        None => Size::new(background.width() as f64, background.height() as f64),
    };

    let previous = match &args.layout {
        Some(path) => {
            let layout = read_layout(path).map_err(|e| e.to_string())?;
            if layout.len() != designs.len() {
                eprintln!(
                    "warning: layout has {} transform(s) for {} design(s); the rest use defaults.",
                    layout.len(),
                    designs.len()
                );
            }
            Some(layout)
        }
        None => None,
    };
    let layers = DesignLayers::initialize(designs.len(), previous.as_deref());

    if let Some(path) = &args.write_layout {
        write_layout(path, &layers).map_err(|e| e.to_string())?;
    }

    // -- Step 3: Compose -------------------------------------------------
    let image = match args.mode {
        CliMode::Final => compose(
            &background,
            &designs,
            layers.transforms(),
            container,
            RenderMode::Final,
        )
        .map_err(|e| e.to_string())?,
        CliMode::Simulate => {
            let request = GenerationRequest {
                background,
                designs,
                transforms: layers.transforms().to_vec(),
                container,
                style: args.style,
                api_key: None,
            };
            run_generation(&request, None).map_err(|e| e.to_string())?.image
        }
    };

    // -- Step 4: Save ----------------------------------------------------
    let format = SaveFormat::from_path(&args.output);
    encode_and_write(&image, &args.output, format, args.quality).map_err(|e| e.to_string())
}

// ============================================================================
// Helpers
// ============================================================================

/// Expand glob patterns and literal paths into a deduplicated, ordered list.
fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let as_path = Path::new(pattern);

        if as_path.exists() {
            // Literal path — use directly
            if !result.iter().any(|p| p.as_path() == as_path) {
                result.push(as_path.to_path_buf());
            }
            continue;
        }

        match glob::glob(pattern) {
            Ok(entries) => {
                let mut matched = false;
                for entry in entries.flatten() {
                    if !result.contains(&entry) {
                        result.push(entry);
                    }
                    matched = true;
                }
                if !matched {
                    eprintln!("warning: pattern '{}' matched no files.", pattern);
                }
            }
            Err(e) => {
                eprintln!("warning: invalid glob '{}': {}", pattern, e);
            }
        }
    }

    result
}

/// Parse `WIDTHxHEIGHT` (also accepts `X` and `*`).
fn parse_container(text: &str) -> Result<Size, String> {
    let bad = || format!("invalid container size '{}' (expected WIDTHxHEIGHT, e.g. 576x432)", text);
    let (w, h) = text
        .trim()
        .split_once(['x', 'X', '*'])
        .ok_or_else(bad)?;
    let width: f64 = w.trim().parse().map_err(|_| bad())?;
    let height: f64 = h.trim().parse().map_err(|_| bad())?;
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        return Err(bad());
    }
    Ok(Size::new(width, height))
}
