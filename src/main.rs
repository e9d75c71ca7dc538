//! PROM data creator - CLI Entry Point
//!
//! Commands:
//! - `prom-data-creator build <layout.json>` - Encode a layout into a PROM blob
//! - `prom-data-creator coe <blob>` - Export a blob as a COE file
//! - `prom-data-creator check <blob>` - Verify a blob's checksum

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "prom-data-creator")]
#[command(version)]
#[command(about = "Create AMC525 PROM descriptor blobs and COE initialization files")]
struct Cli {
    /// Log level, overridden by RUST_LOG when set
    #[arg(long, value_enum, global = true, default_value = "warn")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a JSON layout into a PROM blob
    Build {
        /// Path to the JSON layout
        layout: PathBuf,
        /// Output blob (default: layout path with a .bin extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also write the blob as a COE file
        #[arg(long)]
        coe: Option<PathBuf>,
        /// Bytes per COE word
        #[arg(short, long, default_value = "4")]
        group_size: usize,
    },
    /// Export an existing blob as a COE file
    Coe {
        /// Path to the blob
        blob: PathBuf,
        /// Output COE file (default: blob path with a .coe extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Bytes per COE word
        #[arg(short, long, default_value = "4")]
        group_size: usize,
    },
    /// Verify the checksum at the end of a blob
    Check {
        /// Path to the blob
        blob: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

fn setup_logging(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .compact()
        .init();
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.log_level);

    match cli.command {
        Commands::Build { layout, output, coe, group_size } => {
            build_blob(&layout, output, coe, group_size);
        }
        Commands::Coe { blob, output, group_size } => {
            export_coe(&blob, output, group_size);
        }
        Commands::Check { blob } => {
            check_blob(&blob);
        }
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("❌ {}", message);
    std::process::exit(1);
}

fn read_blob(path: &Path) -> Vec<u8> {
    match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => fail(format_args!("Failed to read {}: {}", path.display(), e)),
    }
}

fn write_file(path: &Path, contents: &[u8]) {
    if let Err(e) = std::fs::write(path, contents) {
        fail(format_args!("Failed to write {}: {}", path.display(), e));
    }
    tracing::info!(path = %path.display(), bytes = contents.len(), "wrote file");
}

fn render_coe(data: &[u8], group_size: usize) -> String {
    match prom::dump_coe(data, group_size) {
        Ok(text) => text,
        Err(e) => fail(format_args!("COE export failed: {}", e)),
    }
}

fn build_blob(layout: &Path, output: Option<PathBuf>, coe: Option<PathBuf>, group_size: usize) {
    use prom::PromConfig;

    let out_path = output.unwrap_or_else(|| layout.with_extension("bin"));
    println!("📝 Building: {} → {}", layout.display(), out_path.display());

    let config = match PromConfig::load(layout) {
        Ok(c) => c,
        Err(e) => fail(format_args!("Failed to load layout: {}", e)),
    };

    let image = match config.to_image() {
        Ok(image) => image,
        Err(e) => fail(format_args!("Invalid layout: {}", e)),
    };

    let bytes = match image.to_bytes() {
        Ok(bytes) => bytes,
        Err(e) => fail(format_args!("Encoding failed: {}", e)),
    };

    // Render before writing anything so a bad group size leaves no partial output.
    let coe_text = coe.map(|path| (path, render_coe(&bytes, group_size)));

    write_file(&out_path, &bytes);
    println!(
        "✓ Encoded {} with {} memory regions ({} bytes)",
        image.device,
        image.memories.len(),
        bytes.len()
    );

    if let Some((coe_path, text)) = coe_text {
        write_file(&coe_path, text.as_bytes());
        println!("✓ Saved COE to {}", coe_path.display());
    }
}

fn export_coe(blob: &Path, output: Option<PathBuf>, group_size: usize) {
    let out_path = output.unwrap_or_else(|| blob.with_extension("coe"));
    println!("📖 Exporting: {} → {}", blob.display(), out_path.display());

    let data = read_blob(blob);
    if data.len() % group_size.max(1) != 0 {
        tracing::warn!(
            bytes = data.len(),
            group_size,
            "blob is not a whole number of words, last word is zero-padded"
        );
    }
    let text = render_coe(&data, group_size);
    write_file(&out_path, text.as_bytes());
    println!("✓ Saved to {}", out_path.display());
}

fn check_blob(blob: &Path) {
    let data = read_blob(blob);
    match prom::check_checksum(&data) {
        Ok(()) => println!("✓ {}: checksum OK ({} bytes)", blob.display(), data.len()),
        Err(e) => fail(format_args!("{}: {}", blob.display(), e)),
    }
}
