//! `eyes-cli` – EYES Command Line Interface
//!
//! Offline front end to the perception core:
//!
//! 1. `eyes analyze <FRAME>` – runs one frame document (JSON, `-` for stdin)
//!    through the [`FramePipeline`] and prints either a coloured summary or the
//!    raw `FrameResult` JSON.
//! 2. `eyes schema` – prints the JSON Schema of the result.
//! 3. `eyes config` – prints the effective configuration (file, defaults and
//!    `EYES_*` overrides merged), or writes a default file with `--init`.

mod config;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::debug;

use eyes_runtime::{FramePipeline, TelemetryOptions, init_tracing, result_schema};
use eyes_safety::priority::display_metres;
use eyes_types::{FrameInput, FrameResult, ProximityBand};

#[derive(Parser, Debug)]
#[command(name = "eyes", version, about = "Assistive-vision perception core")]
struct Cli {
    /// Config file (defaults to ~/.eyes/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process one frame document and report the result
    Analyze {
        /// Frame JSON file, or `-` for stdin
        frame: PathBuf,
        /// Print the FrameResult as JSON instead of a summary
        #[arg(long)]
        json: bool,
        /// Pretty-print JSON output
        #[arg(long, requires = "json")]
        pretty: bool,
    },
    /// Print the JSON Schema of the frame result
    Schema,
    /// Show the effective configuration
    Config {
        /// Write the default configuration to the config path
        #[arg(long)]
        init: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = init_tracing(TelemetryOptions::from_env("eyes"));

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let path = cli.config.unwrap_or_else(config::config_path);

    match cli.command {
        Command::Analyze { frame, json, pretty } => {
            let cfg = config::load_effective(&path)?;
            debug!(config = %path.display(), "configuration loaded");
            let pipeline = FramePipeline::new(Arc::new(cfg.tables), cfg.settings);

            let input = read_frame(&frame)?;
            let result = pipeline.process(&input).map_err(|e| e.to_string())?;

            if json {
                let out = if pretty {
                    serde_json::to_string_pretty(&result)
                } else {
                    serde_json::to_string(&result)
                }
                .map_err(|e| format!("Failed to serialize result: {}", e))?;
                println!("{out}");
            } else {
                print!("{}", render_summary(&result));
            }
        }
        Command::Schema => {
            let schema = serde_json::to_string_pretty(&result_schema())
                .map_err(|e| format!("Failed to serialize schema: {}", e))?;
            println!("{schema}");
        }
        Command::Config { init } => {
            if init {
                if path.exists() {
                    return Err(format!("{} already exists", path.display()));
                }
                config::save_to(&config::Config::default(), &path)?;
                println!(
                    "  {} Config saved to {}",
                    "✓".green().bold(),
                    path.display().to_string().bold()
                );
            } else {
                let cfg = config::load_effective(&path)?;
                println!("# {}", path.display());
                print!("{}", config::to_toml(&cfg)?);
            }
        }
    }
    Ok(())
}

/// Parse a frame document from a file or stdin (`-`).
fn read_frame(source: &Path) -> Result<FrameInput, String> {
    let raw = if source == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("Failed to read frame from stdin: {}", e))?;
        buf
    } else {
        std::fs::read_to_string(source)
            .map_err(|e| format!("Failed to read frame at {}: {}", source.display(), e))?
    };
    serde_json::from_str(&raw).map_err(|e| format!("Failed to parse frame: {}", e))
}

// ─────────────────────────────────────────────────────────────────────────────
// Summary rendering
// ─────────────────────────────────────────────────────────────────────────────

fn render_summary(result: &FrameResult) -> String {
    let mut out = String::new();

    out.push_str(&format!("  {} {}\n", "Scene:".bold(), result.scene_type));
    if result.low_light {
        out.push_str(&format!("  {}\n", "Low light – detections may be unreliable".yellow()));
    }

    for alert in &result.alerts {
        out.push_str(&format!("  {}\n", alert.red().bold()));
    }

    out.push_str(&format!("  {}\n", "Priority:".bold()));
    for (rank, item) in result.priority_objects.iter().enumerate() {
        out.push_str(&format!(
            "    {}. {} {}\n",
            rank + 1,
            item.label.bold(),
            format_distance(item.distance).dimmed()
        ));
    }

    if !result.detections.is_empty() {
        out.push_str(&format!("  {}\n", "Detections:".bold()));
        for det in &result.detections {
            let band = match det.band {
                ProximityBand::VeryClose => "very close".red(),
                ProximityBand::Close => "close".yellow(),
                ProximityBand::Medium => "medium".normal(),
                ProximityBand::Far => "far".green(),
                ProximityBand::Unknown => "unknown".dimmed(),
            };
            out.push_str(&format!(
                "    • {} ({:.2}) {} [{}]\n",
                det.label,
                det.confidence,
                format_distance(det.distance),
                band
            ));
        }
    }

    if let Some(currency) = &result.currency {
        out.push_str(&format!("  {} {}\n", "Currency:".bold(), currency.green()));
    }
    out.push_str(&format!(
        "  {}\n",
        format!("processed in {:.3}s", result.processing_time).dimmed()
    ));
    out
}

fn format_distance(distance: f32) -> String {
    if distance > 0.0 {
        format!("{:.1}m", display_metres(distance))
    } else {
        "distance unknown".to_string()
    }
}
