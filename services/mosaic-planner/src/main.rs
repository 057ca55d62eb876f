//! Mosaic tile planner.
//!
//! Lays out a tile pyramid from the command line and reports, per level, how
//! many tiles a bulk generation run would write or skip:
//! - Levels given coarsest first as `SX:SY:COLS:ROWS`
//! - Tile inputs named by a pattern (`{level}`, `{x}`, `{y}`)
//! - Existing files checked in parallel against the tile writing policy
//! - Text or JSON report

mod plan;

use anyhow::{anyhow, Result};
use clap::{Parser, ValueEnum};
use mosaic_common::{Affine, Point};
use tile_mosaic::{MosaicConfig, TilePattern, TileWritingPolicy};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use plan::{parse_pair, Layout, LevelSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "mosaic-planner")]
#[command(about = "Dry-run planner for bulk mosaic tile generation")]
struct Args {
    /// Pyramid level as SX:SY:COLS:ROWS, coarsest first (repeatable)
    #[arg(long = "level", required = true)]
    levels: Vec<LevelSpec>,

    /// Tile input pattern, e.g. "tiles/L{level}_{x}_{y}.png"
    #[arg(long, env = "MOSAIC_TILE_PATTERN")]
    pattern: String,

    /// Tile size in level pixels (WxH)
    #[arg(long, default_value = "256x256", value_parser = parse_pair::<u32>)]
    tile_size: (u32, u32),

    /// Grid origin in finest level pixels (X,Y)
    #[arg(long, default_value = "0,0", value_parser = parse_pair::<i32>)]
    offset: (i32, i32),

    /// World coordinates of the upper-left corner of the finest grid (X,Y)
    #[arg(long, value_parser = parse_pair::<f64>, requires = "pixel_size")]
    origin: Option<(f64, f64)>,

    /// World size of one finest level pixel (W,H)
    #[arg(long, value_parser = parse_pair::<f64>, requires = "origin")]
    pixel_size: Option<(f64, f64)>,

    /// Tile writing policy (defaults to MOSAIC_TILE_WRITING_POLICY)
    #[arg(long)]
    policy: Option<TileWritingPolicy>,

    /// Image format name of the tiles
    #[arg(long, default_value = "png")]
    format: String,

    /// Worker threads for existence checks (0 = one per core)
    #[arg(long)]
    threads: Option<usize>,

    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    output: OutputFormat,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs on stderr, report on stdout.
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);
    if args.log_json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    let mut config = MosaicConfig::from_env();
    if let Some(policy) = args.policy {
        config.tile_writing_policy = policy;
    }
    if let Some(threads) = args.threads {
        config.check_threads = threads;
    }
    config.validate().map_err(|e| anyhow!(e))?;

    if config.check_threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.check_threads)
            .build_global()?;
    }

    info!(
        levels = args.levels.len(),
        pattern = %args.pattern,
        policy = %config.tile_writing_policy,
        "Planning mosaic"
    );

    let reference = match (args.origin, args.pixel_size) {
        (Some((x, y)), Some((w, h))) => Some(Affine::from_origin(x, y, w, h)),
        _ => None,
    };
    let layout = Layout {
        levels: args.levels,
        pattern: TilePattern::infer(args.pattern),
        tile_size: args.tile_size,
        offset: Point::new(args.offset.0, args.offset.1),
        reference,
        format: args.format,
    };

    let pyramid = layout.build()?;
    let plan = plan::plan(&pyramid, config.tile_writing_policy)?;

    match args.output {
        OutputFormat::Text => print!("{}", plan::render_text(&plan)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
    }

    Ok(())
}
