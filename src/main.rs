//! picpad - A terminal text editor with resizable inline pictures.
//!
//! # Usage
//!
//! ```bash
//! picpad notes.txt
//! picpad --image cat.png notes.txt
//! picpad --page a4 --rescan shrink
//! ```

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use picpad::app::App;
use picpad::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, save_config_flags,
};
use picpad::document::RescanPolicy;
use picpad::geometry::PageSize;

/// A terminal text editor with resizable inline pictures
#[derive(Parser, Debug)]
#[command(name = "picpad", version, about, long_about = None)]
struct Cli {
    /// Text file (or picture) to start from
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Picture inserted by Ctrl-p / F2
    #[arg(long, value_name = "PATH")]
    image: Option<PathBuf>,

    /// Canvas page size
    #[arg(long, value_enum)]
    page: Option<PageSize>,

    /// When edits rescan placeholders for removed pictures
    #[arg(long, value_enum)]
    rescan: Option<RescanPolicy>,

    /// Disable inline image rendering (draw boxes only)
    #[arg(long)]
    no_images: bool,

    /// Force image rendering to use half-cell fallback mode
    #[arg(long)]
    force_half_cell: bool,

    /// Write log events to a file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into());
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    init_logging(effective.log_file.as_ref())?;
    tracing::debug!(?effective, "effective flags");

    if let Some(file) = cli.file.as_ref().filter(|file| !file.exists()) {
        anyhow::bail!("File not found: {}", file.display());
    }

    // Run the application
    let mut app = App::new(cli.file)
        .with_image_path(effective.image)
        .with_page(effective.page.unwrap_or_default())
        .with_rescan(effective.rescan.unwrap_or_default())
        .with_force_half_cell(effective.force_half_cell)
        .with_images_enabled(!effective.no_images)
        .with_config_paths(
            Some(global_path.clone()),
            if local_path.exists() {
                Some(local_path.clone())
            } else {
                None
            },
        );

    app.run().context("Application error")
}
