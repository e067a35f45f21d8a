use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use env_logger::Env;
use log::{info, warn};
use transect_georef::{Config, FailurePolicy, OffsetPolicy, export, georeference_all, table};

#[derive(Parser)]
#[command(name = "transect-georef")]
#[command(about = "Convert strip-relative tree positions into UTM coordinates", long_about = None)]
#[command(version)]
struct Cli {
    /// Tree table (ID, X, Y, strip ID)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    trees: PathBuf,

    /// Strip table (strip ID, X0, Y0, X1, Y1)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    strips: PathBuf,

    /// Directory the CSV and GeoJSON files are written to
    #[arg(short, long, default_value = ".", value_hint = clap::ValueHint::DirPath)]
    out_dir: PathBuf,

    /// TOML configuration file
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Lateral X value of the strip centre line
    #[arg(long)]
    half_width: Option<f64>,

    /// EPSG code of the strip coordinates
    #[arg(long)]
    epsg: Option<u32>,

    /// Handling of offsets beyond either end of a strip
    #[arg(long, value_enum)]
    offsets: Option<OffsetArg>,

    /// Stop at the first tree that cannot be georeferenced
    #[arg(long)]
    fail_fast: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum OffsetArg {
    Extrapolate,
    Warn,
    Reject,
}

impl From<OffsetArg> for OffsetPolicy {
    fn from(arg: OffsetArg) -> Self {
        match arg {
            OffsetArg::Extrapolate => OffsetPolicy::Extrapolate,
            OffsetArg::Warn => OffsetPolicy::Warn,
            OffsetArg::Reject => OffsetPolicy::Reject,
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(half_width) = cli.half_width {
        config.transect.half_width = half_width;
    }
    if let Some(epsg) = cli.epsg {
        config.output.epsg = epsg;
    }
    if let Some(offsets) = cli.offsets {
        config.transect.offset_policy = offsets.into();
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger with default level (overridden by RUST_LOG)
    let env = Env::default().default_filter_or("info");
    env_logger::Builder::from_env(env).init();

    let config = load_config(&cli)?;
    if !config.output.csv && !config.output.geojson {
        bail!("both output.csv and output.geojson are disabled, nothing to write");
    }
    let mapper = config.mapper()?;
    let options = config.table_options()?;
    let crs = config.crs();

    let strips = table::read_strips(&cli.strips, &options)
        .with_context(|| format!("Failed to load strips from {}", cli.strips.display()))?;
    let trees = table::read_trees(&cli.trees, &options)
        .with_context(|| format!("Failed to load trees from {}", cli.trees.display()))?;
    info!(
        "loaded {} strips and {} trees, target CRS {}",
        strips.len(),
        trees.trees.len(),
        crs
    );

    let policy = if cli.fail_fast {
        FailurePolicy::Abort
    } else {
        FailurePolicy::Skip
    };
    let outcome = georeference_all(&trees.trees, &strips, &mapper, policy)?;
    if !outcome.failures.is_empty() {
        warn!(
            "{} of {} trees could not be georeferenced",
            outcome.failures.len(),
            trees.trees.len()
        );
    }

    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("Failed to create {}", cli.out_dir.display()))?;

    if config.output.csv {
        let path = cli.out_dir.join(format!("{}.csv", config.output.stem));
        let file = File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        export::write_csv(
            BufWriter::new(file),
            &trees.headers,
            &outcome.georeferenced,
            config.output_delimiter()?,
        )?;
        info!("wrote {}", path.display());
    }

    if config.output.geojson {
        let path = cli.out_dir.join(format!("{}.geojson", config.output.stem));
        let file = File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        export::write_geojson(BufWriter::new(file), &trees.headers, &outcome.georeferenced, crs)?;
        info!("wrote {}", path.display());
    }

    info!(
        "georeferenced {} of {} trees",
        outcome.georeferenced.len(),
        trees.trees.len()
    );
    Ok(())
}
