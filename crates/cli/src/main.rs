//! stkfold CLI - spatiotemporal k-fold cross-validation of IDW

mod sink;
mod source;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use stkfold_algorithms::cross_validate;
use stkfold_algorithms::interpolation::{BatchInterpolator, DAYS_PER_YEAR};
use stkfold_algorithms::radius::{build_radius_table, DEFAULT_PERCENTILE};
use stkfold_core::config::{DEFAULT_DAY_LIMIT, DEFAULT_DISTANCE_LIMIT};
use stkfold_core::grid::default_time_scales;
use stkfold_core::{
    Bagging, CvConfig, FilterPolicy, ParameterGrid, Point, PointSource, RadiusTable, TimeEpoch,
};
use stkfold_parallel::{evaluate_configurations_with, write_outcomes, ProcessingMode, WorkerPool};

use sink::{write_estimates, CsvReportSink};
use source::{read_locations, CsvPointSource};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "stkfold")]
#[command(author, version, about = "Spatiotemporal k-fold cross-validation", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// Point file: site_id,year,month,day,longitude,latitude,value
    input: PathBuf,
    /// The input has no header row
    #[arg(long)]
    no_header: bool,
    /// Shuffle input order with this seed before fold assignment
    #[arg(long)]
    shuffle_seed: Option<u64>,
    /// Count days from this date (YYYY-MM-DD) instead of each year's start
    #[arg(long)]
    epoch: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Cross-validate a single configuration
    Evaluate {
        #[command(flatten)]
        input: InputArgs,
        /// Number of folds
        #[arg(short = 'k', long, default_value = "10")]
        folds: usize,
        /// Neighbors per estimate
        #[arg(short, long, default_value = "3")]
        neighbors: usize,
        /// IDW power
        #[arg(short, long, default_value = "2.0")]
        power: f64,
        /// Time-scale applied to day offsets
        #[arg(short = 'c', long, default_value = "0.1")]
        time_scale: f64,
        /// Neighbor filter: none, distance-time, euclidean
        #[arg(short, long, default_value = "none")]
        filter: String,
        /// Planar distance limit for the distance-time filter
        #[arg(long, default_value_t = DEFAULT_DISTANCE_LIMIT)]
        distance_limit: f64,
        /// Day limit for the distance-time filter
        #[arg(long, default_value_t = DEFAULT_DAY_LIMIT)]
        day_limit: f64,
        /// Fixed radius for the euclidean filter
        #[arg(short, long)]
        radius: Option<f64>,
        /// Radius table used by the euclidean filter when no radius is given
        #[arg(long)]
        radius_table: Option<PathBuf>,
        /// Number of bags (enables bagging)
        #[arg(short = 'm', long)]
        bags: Option<usize>,
        /// Bag size as a fraction of the training set
        #[arg(short, long, default_value = "0.8")]
        alpha: f64,
        /// Bagging seed
        #[arg(short, long, default_value = "0")]
        seed: u64,
        /// Also write per-fold and aggregate rows to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Cross-validate every configuration of a parameter grid
    Sweep {
        #[command(flatten)]
        input: InputArgs,
        /// Output CSV report
        output: PathBuf,
        /// Grid definition (JSON); defaults to the built-in sweep
        #[arg(short, long)]
        grid: Option<PathBuf>,
        /// Radius table for the euclidean filter
        #[arg(long)]
        radius_table: Option<PathBuf>,
        /// Worker threads (0 = all cores, 1 = sequential)
        #[arg(short = 'j', long, default_value = "0")]
        threads: usize,
    },
    /// Estimate daily values at unmeasured locations from all measurements
    Interpolate {
        #[command(flatten)]
        input: InputArgs,
        /// Location file: id,x,y
        locations: PathBuf,
        /// Output CSV of id,day,estimate rows
        output: PathBuf,
        /// The location file has no header row
        #[arg(long)]
        locations_no_header: bool,
        /// Neighbors per estimate
        #[arg(short, long, default_value = "3")]
        neighbors: usize,
        /// IDW power
        #[arg(short, long, default_value = "5.0")]
        power: f64,
        /// Time-scale applied to day offsets
        #[arg(short = 'c', long, default_value = "0.1")]
        time_scale: f64,
        /// Neighbor filter: none, distance-time, euclidean
        #[arg(short, long, default_value = "none")]
        filter: String,
        /// Planar distance limit for the distance-time filter
        #[arg(long, default_value_t = DEFAULT_DISTANCE_LIMIT)]
        distance_limit: f64,
        /// Day limit for the distance-time filter
        #[arg(long, default_value_t = DEFAULT_DAY_LIMIT)]
        day_limit: f64,
        /// Fixed radius for the euclidean filter
        #[arg(short, long)]
        radius: Option<f64>,
        /// Radius table used by the euclidean filter when no radius is given
        #[arg(long)]
        radius_table: Option<PathBuf>,
        /// First day estimated per location
        #[arg(long, default_value = "1")]
        first_day: i64,
        /// Last day estimated per location
        #[arg(long, default_value_t = DAYS_PER_YEAR)]
        last_day: i64,
    },
    /// Build a time-scale to exclusion-radius table
    RadiusTable {
        #[command(flatten)]
        input: InputArgs,
        /// Output JSON file
        output: PathBuf,
        /// Nearest-neighbor distance percentile stored per time-scale
        #[arg(short, long, default_value_t = DEFAULT_PERCENTILE)]
        percentile: f64,
        /// Comma-separated time-scales; defaults to the built-in sweep's
        #[arg(short = 'c', long, value_delimiter = ',')]
        time_scales: Vec<f64>,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")
}

fn spinner(msg: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(pb)
}

fn progress_bar(len: usize) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

fn load_points(args: &InputArgs) -> Result<Vec<Point>> {
    let mut source = CsvPointSource::new(&args.input)
        .has_headers(!args.no_header)
        .shuffle_seed(args.shuffle_seed);
    let points = source
        .load()
        .with_context(|| format!("Failed to read points from {}", args.input.display()))?;
    info!("Loaded {} points from {}", points.len(), args.input.display());
    Ok(points)
}

fn epoch_of(args: &InputArgs) -> TimeEpoch {
    args.epoch.map_or(TimeEpoch::StartOfYear, TimeEpoch::Date)
}

fn load_radius_table(path: Option<&Path>) -> Result<Option<RadiusTable>> {
    path.map(|p| {
        RadiusTable::load(p).with_context(|| format!("Failed to read radius table {}", p.display()))
    })
    .transpose()
}

fn parse_filter(name: &str, distance_limit: f64, day_limit: f64) -> Result<FilterPolicy> {
    let policy = match name.to_lowercase().as_str() {
        "none" => FilterPolicy::None,
        "distance-time" | "joint" | "dt" => FilterPolicy::DistanceTime {
            distance_limit,
            day_limit,
        },
        "euclidean" | "radius" => FilterPolicy::Euclidean,
        _ => anyhow::bail!(
            "Unknown filter: {}. Use none, distance-time, or euclidean.",
            name
        ),
    };
    Ok(policy)
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        // ── Single configuration ─────────────────────────────────────
        Commands::Evaluate {
            input,
            folds,
            neighbors,
            power,
            time_scale,
            filter,
            distance_limit,
            day_limit,
            radius,
            radius_table,
            bags,
            alpha,
            seed,
            output,
        } => {
            let mut config = CvConfig::new(folds, neighbors, power, time_scale)
                .with_filter(parse_filter(&filter, distance_limit, day_limit)?)
                .with_epoch(epoch_of(&input));
            if let Some(r) = radius {
                config = config.with_radius(r);
            }
            if let Some(m) = bags {
                config = config.with_bagging(Bagging::new(m, alpha, seed));
            }
            config.validate().context("Invalid configuration")?;

            let points = load_points(&input)?;
            let table = load_radius_table(radius_table.as_deref())?;

            let pb = spinner("Cross-validating...")?;
            let start = Instant::now();
            let report = cross_validate(&config, &points, table.as_ref())
                .context("Cross-validation failed")?;
            let elapsed = start.elapsed();
            pb.finish_and_clear();

            for f in &report.folds {
                println!(
                    "  fold {:>3}: {:>6} held out, MARE {:.6}, RMSPE {:.4}",
                    f.fold, f.validation_len, f.summary.mare, f.summary.rmspe
                );
            }
            println!("MARE:  {:.6}", report.mare());
            println!("RMSPE: {:.4}", report.rmspe());
            println!("  MAE {:.6}, RMSE {:.6}", report.aggregate.mae, report.aggregate.rmse);

            if let Some(path) = output {
                let outcome = stkfold_parallel::SweepOutcome {
                    conf_id: 0,
                    config,
                    result: Ok(report),
                };
                let mut sink = CsvReportSink::create(&path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                write_outcomes(std::slice::from_ref(&outcome), &mut sink)?;
                done("Report", &path, elapsed);
            } else {
                println!("  Processing time: {:.2?}", elapsed);
            }
        }

        // ── Grid sweep ───────────────────────────────────────────────
        Commands::Sweep {
            input,
            output,
            grid,
            radius_table,
            threads,
        } => {
            let mut grid = match &grid {
                Some(path) => {
                    let text = std::fs::read_to_string(path)
                        .with_context(|| format!("Failed to read grid {}", path.display()))?;
                    ParameterGrid::from_json(&text).context("Invalid grid definition")?
                }
                None => ParameterGrid::default(),
            };
            if let Some(date) = input.epoch {
                grid.epoch = TimeEpoch::Date(date);
            }
            let entries = grid.expand();
            if entries.is_empty() {
                anyhow::bail!("Grid expands to no configurations");
            }

            let points = load_points(&input)?;
            let table = load_radius_table(radius_table.as_deref())?;
            let pool = WorkerPool::new(ProcessingMode::from_threads(threads))
                .context("Failed to start worker pool")?;
            info!(
                "Evaluating {} configurations on {} threads",
                entries.len(),
                pool.threads()
            );

            let pb = progress_bar(entries.len())?;
            let start = Instant::now();
            let outcomes =
                evaluate_configurations_with(&pool, &entries, &points, table.as_ref(), |_| {
                    pb.inc(1)
                });
            pb.finish_and_clear();
            let elapsed = start.elapsed();

            let mut sink = CsvReportSink::create(&output)
                .with_context(|| format!("Failed to create {}", output.display()))?;
            let stats = write_outcomes(&outcomes, &mut sink)?;
            if stats.failed > 0 {
                warn!("{} of {} configurations failed", stats.failed, entries.len());
            }
            if let Some(best) = outcomes
                .iter()
                .filter_map(|o| o.result.as_ref().ok().map(|r| (o, r.mare())))
                .min_by(|a, b| a.1.total_cmp(&b.1))
            {
                let c = &best.0.config;
                println!(
                    "Best MARE {:.6} (conf {}: k={}, n={}, p={}, c={})",
                    best.1, best.0.conf_id, c.folds, c.neighbors, c.power, c.time_scale
                );
            }
            done("Sweep report", &output, elapsed);
        }

        // ── Batch interpolation ──────────────────────────────────────
        Commands::Interpolate {
            input,
            locations,
            output,
            locations_no_header,
            neighbors,
            power,
            time_scale,
            filter,
            distance_limit,
            day_limit,
            radius,
            radius_table,
            first_day,
            last_day,
        } => {
            let config = CvConfig {
                neighbors,
                power,
                time_scale,
                radius,
                filter: parse_filter(&filter, distance_limit, day_limit)?,
                epoch: epoch_of(&input),
                ..CvConfig::default()
            };

            let points = load_points(&input)?;
            let table = load_radius_table(radius_table.as_deref())?;
            let queries = read_locations(&locations, !locations_no_header)
                .with_context(|| format!("Failed to read locations from {}", locations.display()))?;
            info!(
                "Estimating {} locations over days {}..={}",
                queries.len(),
                first_day,
                last_day
            );

            let pb = spinner("Interpolating...")?;
            let start = Instant::now();
            let interpolator = BatchInterpolator::new(&config, &points, table.as_ref())
                .context("Failed to index measurements")?;
            let estimates = interpolator
                .interpolate(&queries, first_day..=last_day)
                .context("Interpolation failed")?;
            let elapsed = start.elapsed();
            pb.finish_and_clear();

            let file = std::fs::File::create(&output)
                .with_context(|| format!("Failed to create {}", output.display()))?;
            write_estimates(std::io::BufWriter::new(file), &estimates)?;
            done("Estimates", &output, elapsed);
        }

        // ── Radius table ─────────────────────────────────────────────
        Commands::RadiusTable {
            input,
            output,
            percentile,
            time_scales,
        } => {
            let scales = if time_scales.is_empty() {
                default_time_scales()
            } else {
                time_scales
            };
            let points = load_points(&input)?;

            let pb = spinner(&format!("Computing radii for {} time-scales...", scales.len()))?;
            let start = Instant::now();
            let table = build_radius_table(&points, &scales, epoch_of(&input), percentile)
                .context("Failed to build radius table")?;
            let elapsed = start.elapsed();
            pb.finish_and_clear();

            table
                .save(&output)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            done("Radius table", &output, elapsed);
        }
    }

    Ok(())
}
