//! Replay a collage project description and write the print export or a
//! single slot preview.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use cutframe_export::{EncodeOptions, encode_for_path};
use cutframe_io::{Project, Session};
use cutframe_pipeline::{CollageConfig, GeometryKind, GeometryTable, Layout, Orientation};
use tracing::Level;

/// Compose multi-photo collages inside frame templates.
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// JSON file overriding the collage configuration (DPI, print size,
    /// shear, colors). Missing fields keep their defaults.
    #[arg(long, global = true, value_name = "JSON")]
    config: Option<PathBuf>,

    /// JSON file with explicit slot and caption rectangles per layout.
    /// Without it a uniform grid is used.
    #[arg(long, global = true, value_name = "JSON")]
    geometry: Option<PathBuf>,

    /// Log more: once for progress, twice for per-slot detail.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Composite a project at print resolution.
    Export {
        /// Project description (JSON).
        project: PathBuf,

        /// Output image; `.png`, `.jpg` or `.jpeg`.
        #[arg(short, long)]
        output: PathBuf,

        /// JPEG quality, 1-100.
        #[arg(long, default_value_t = EncodeOptions::DEFAULT_JPEG_QUALITY, value_parser = clap::value_parser!(u8).range(1..=100))]
        jpeg_quality: u8,
    },
    /// Render one slot the way the editor previews it.
    Preview {
        /// Project description (JSON).
        project: PathBuf,

        /// Slot index within the project's layout.
        #[arg(long)]
        slot: usize,

        /// Output image; `.png`, `.jpg` or `.jpeg`.
        #[arg(short, long)]
        output: PathBuf,
    },
    /// List the layouts and the frame name tokens that select them.
    Layouts,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("{msg}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<(), String> {
    match &cli.command {
        Command::Layouts => {
            print_layouts();
            Ok(())
        }
        Command::Export {
            project,
            output,
            jpeg_quality,
        } => {
            let options = EncodeOptions {
                jpeg_quality: *jpeg_quality,
            };
            let mut session = open_session(cli, project)?.with_encode_options(options);
            let summary = session
                .on_export_requested(output)
                .map_err(|e| e.to_string())?;
            if !summary.skipped_slots.is_empty() {
                eprintln!("Skipped slots: {:?}", summary.skipped_slots);
            }
            if summary.captions_skipped > 0 {
                eprintln!(
                    "{} caption(s) not drawn (no font or no room)",
                    summary.captions_skipped
                );
            }
            eprintln!("{}", session.status());
            Ok(())
        }
        Command::Preview {
            project,
            slot,
            output,
        } => {
            let session = open_session(cli, project)?;
            let preview = session
                .preview(*slot)
                .map_err(|e| e.to_string())?
                .ok_or_else(|| format!("slot {slot} has no image"))?;
            let bytes = encode_for_path(&preview, output, EncodeOptions::default())
                .map_err(|e| e.to_string())?;
            std::fs::write(output, &bytes)
                .map_err(|e| format!("Error writing {}: {e}", output.display()))?;
            eprintln!(
                "Preview of slot {slot} written to {} ({}x{})",
                output.display(),
                preview.width(),
                preview.height(),
            );
            Ok(())
        }
    }
}

/// Build a session from the global options and replay `project` into it.
fn open_session(cli: &Cli, project: &Path) -> Result<Session, String> {
    let config: CollageConfig = match &cli.config {
        Some(path) => read_json(path)?,
        None => CollageConfig::default(),
    };
    let geometry = match &cli.geometry {
        Some(path) => GeometryKind::Table(read_json::<GeometryTable>(path)?),
        None => GeometryKind::default(),
    };

    let loaded = Project::load(project).map_err(|e| e.to_string())?;
    let base = project.parent().unwrap_or_else(|| Path::new("."));
    let mut session = Session::new(config, geometry);
    let layout = loaded
        .replay(&mut session, base)
        .map_err(|e| e.to_string())?;
    tracing::info!(%layout, project = %project.display(), "project loaded");
    Ok(session)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Error reading {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("Invalid JSON in {}: {e}", path.display()))
}

fn print_layouts() {
    println!("{:<5} {:<6} {:<11} tokens", "index", "slots", "orientation");
    for layout in Layout::ALL {
        let orientation = match layout.orientation() {
            Orientation::Horizontal => "horizontal",
            Orientation::Vertical => "vertical",
        };
        println!(
            "{:<5} {:<6} {:<11} {}",
            layout.index(),
            layout.slot_count(),
            orientation,
            layout.tokens().join(", "),
        );
    }
}
