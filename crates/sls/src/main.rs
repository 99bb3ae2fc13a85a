use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use image_library::{library_rows, ImageLibrary, LibraryConfig};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "sls")]
#[command(about = "Browse image folders through a cached thumbnail library")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding the per-library thumbnail caches
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Index a library and print its directory snapshot
    Index {
        /// Library root; a leading `~` is expanded
        root: PathBuf,

        /// Sort names instead of keeping filesystem order
        #[arg(long)]
        sorted: bool,
    },

    /// Print the gallery panel rows of a library as JSON
    Panel {
        root: PathBuf,

        /// Thumbnails per image row
        #[arg(short, long, default_value = "3")]
        columns: usize,

        #[arg(long)]
        sorted: bool,
    },

    /// Generate every missing thumbnail of a library
    Warm {
        root: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to install logger")?;

    let config = |sorted: bool| {
        let mut config = match &cli.cache_dir {
            Some(dir) => LibraryConfig::with_cache_dir(dir),
            None => LibraryConfig::default(),
        };
        config.sort_entries = sorted;
        config
    };

    match &cli.command {
        Commands::Index { root, sorted } => {
            let library = open(root, config(*sorted))?;
            print!("{}", library);
        }
        Commands::Panel { root, columns, sorted } => {
            let library = open(root, config(*sorted))?;
            let rows = library_rows(&library, *columns)
                .with_context(|| format!("Failed to build panel for {}", library.root().display()))?;
            let json = serde_json::to_string_pretty(&rows).context("Failed to serialize panel rows to JSON")?;
            println!("{}", json);
        }
        Commands::Warm { root } => {
            let library = open(root, config(false))?;
            warm(&library);
        }
    }

    Ok(())
}

fn open(root: &Path, config: LibraryConfig) -> Result<ImageLibrary> {
    ImageLibrary::with_config(root, config)
        .with_context(|| format!("Failed to open image library at {}", root.display()))
}

fn warm(library: &ImageLibrary) {
    let images = library.image_paths();
    let placeholder = library.config().placeholder.as_path();
    let started = Instant::now();

    let thumbnails = library.thumbnails(&images, |completed, total| {
        if completed % 100 == 0 || completed == total {
            info!("Thumbnails: {}/{}", completed, total);
        }
    });

    let failed = thumbnails.iter().filter(|thumbnail| thumbnail.as_path() == placeholder).count();
    println!(
        "{} thumbnails ready in {:.1}s ({} unreadable) under {}",
        thumbnails.len() - failed,
        started.elapsed().as_secs_f64(),
        failed,
        library.thumbnail_root().display()
    );
}
