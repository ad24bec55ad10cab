//! Headless farm_map tool
//!
//! Run with: farm_map --help

use clap::{Parser, Subcommand};
use farm_map_editor::farm_map_autotile::catalogs::farm_catalog;
use farm_map_editor::farm_map_autotile::{stale_records, BrushStroke, CatalogError, TileCatalog};
use farm_map_editor::farm_map_core::{load_grid, LayerIndex, SnapshotError};
use farm_map_editor::farm_map_render::{FileSheetSource, SheetCache};
use farm_map_editor::{
    render_layers, save_layers, ConfigError, EditorConfig, EditorError, EditorSession,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

const SHEET_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to load tile catalog: {0}")]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error("Failed to read strokes {path:?}: {source}")]
    Strokes {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("Failed to write layer image: {0}")]
    Image(#[from] image::ImageError),
}

/// farm_map - paint, render and inspect autotiled farm grids
#[derive(Parser)]
#[command(name = "farm_map")]
#[command(version)]
struct Cli {
    /// Editor config (TOML); defaults apply when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Tile catalog (JSON); the built-in farm catalog when omitted
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply brush strokes to a grid file
    Paint {
        /// JSON array of brush strokes
        strokes: PathBuf,

        /// Grid file to start from; a new grid of the configured size if omitted
        #[arg(short, long)]
        grid: Option<PathBuf>,

        /// Where to write the painted grid
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Render each layer of a grid to PNG
    Render {
        /// Grid file
        grid: PathBuf,

        /// Output directory for layer_<n>.png files
        #[arg(short, long, default_value = "render")]
        output: PathBuf,

        /// Pixel size of one cell; the configured size if omitted
        #[arg(long)]
        tile_size: Option<u32>,
    },
    /// Print grid statistics
    Info {
        /// Grid file
        grid: PathBuf,
    },
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = match &cli.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };
    let catalog = Arc::new(match &cli.catalog {
        Some(path) => TileCatalog::load(path)?,
        None => farm_catalog()?,
    });

    match cli.command {
        Commands::Paint {
            strokes,
            grid,
            output,
        } => paint(&config, catalog, &strokes, grid.as_deref(), &output),
        Commands::Render {
            grid,
            output,
            tile_size,
        } => render(&config, &catalog, &grid, &output, tile_size),
        Commands::Info { grid } => info(&catalog, &grid),
    }
}

fn read_strokes(path: &Path) -> Result<Vec<BrushStroke>, CliError> {
    let strokes_error = |source: Box<dyn std::error::Error + Send + Sync>| CliError::Strokes {
        path: path.to_path_buf(),
        source,
    };
    let contents = std::fs::read_to_string(path).map_err(|e| strokes_error(e.into()))?;
    serde_json::from_str(&contents).map_err(|e| strokes_error(e.into()))
}

fn paint(
    config: &EditorConfig,
    catalog: Arc<TileCatalog>,
    strokes_path: &Path,
    grid_path: Option<&Path>,
    output: &Path,
) -> Result<(), CliError> {
    let strokes = read_strokes(strokes_path)?;
    let mut session = EditorSession::from_config(catalog, config);
    if let Some(path) = grid_path {
        session.load(path)?;
    }

    session.begin_stroke(format!("Apply {}", strokes_path.display()));
    for stroke in strokes {
        session.apply_brush(stroke);
    }
    session.end_stroke();

    tracing::info!(
        "Painted {:?}: {} cells occupied",
        output,
        session.grid().len()
    );
    session.save(output)?;
    Ok(())
}

fn render(
    config: &EditorConfig,
    catalog: &TileCatalog,
    grid_path: &Path,
    output: &Path,
    tile_size: Option<u32>,
) -> Result<(), CliError> {
    let grid = load_grid(grid_path)?;
    let mut settings = config.render;
    if let Some(size) = tile_size {
        settings.tile_size = size.max(1);
    }
    let mut sheets = SheetCache::new(FileSheetSource::new(&config.asset_root));

    let images = render_layers(&grid, catalog, &mut sheets, &settings, SHEET_TIMEOUT);
    save_layers(&images, output)?;
    Ok(())
}

fn info(catalog: &TileCatalog, grid_path: &Path) -> Result<(), CliError> {
    let grid = load_grid(grid_path)?;
    println!("size: {}x{}", grid.width(), grid.height());
    println!("occupied cells: {}", grid.len());

    for layer in LayerIndex::ALL {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for (_, record) in grid.layer_records(layer) {
            let name = catalog
                .get(record.code)
                .map(|t| t.name.clone())
                .unwrap_or_else(|| format!("unknown {}", record.code));
            *counts.entry(name).or_default() += 1;
        }
        if counts.is_empty() {
            continue;
        }
        println!("layer {}:", layer);
        for (name, count) in counts {
            println!("  {name}: {count}");
        }
    }

    let stale = stale_records(&grid, catalog);
    if !stale.is_empty() {
        println!("stale sprite indices: {}", stale.len());
    }
    Ok(())
}
