use std::{
    io::Write as _,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "median-sketch", version)]
struct Cli {
    /// Log progress to stderr (filter with `RUST_LOG`).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Filter an image and write the result as a PNG.
    Apply(ApplyArgs),
    /// Print the generated sample patterns as JSON.
    Offsets(OffsetsArgs),
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Settings JSON; flags given on the command line override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start from a named preset instead of the defaults.
    #[arg(long, value_enum)]
    preset: Option<PresetChoice>,

    /// Neighborhood disk radius in pixels.
    #[arg(long)]
    radius: Option<f32>,

    /// Target percentile in [0, 1].
    #[arg(long)]
    percentile: Option<f32>,

    /// Independent runs averaged per pixel.
    #[arg(long)]
    iterations: Option<u32>,

    /// Fraction of the disk area sampled per run.
    #[arg(long)]
    sample_count_percent: Option<f32>,

    /// Border policy for samples outside the image.
    #[arg(long, value_enum)]
    edge_mode: Option<EdgeChoice>,

    /// Base seed for the sample patterns.
    #[arg(long)]
    seed: Option<u32>,

    /// Cyclic shift of each pattern's ingestion order.
    #[arg(long)]
    offset: Option<u32>,

    /// Linear-fallback neighbor rule of the estimator.
    #[arg(long, value_enum)]
    linear_neighbor: Option<NeighborChoice>,
}

#[derive(Parser, Debug)]
struct ApplyArgs {
    /// Input image (any format `image` can decode).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    filter: FilterArgs,

    /// Render rows in parallel.
    #[arg(long)]
    parallel: bool,

    /// Worker threads when `--parallel` is set (defaults to all cores).
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct OffsetsArgs {
    #[command(flatten)]
    filter: FilterArgs,

    /// Write JSON here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PresetChoice {
    Default,
    Sketch,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EdgeChoice {
    Clamp,
    Mirror,
    Wrap,
    Transparent,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum NeighborChoice {
    Textbook,
    Center,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.verbose {
        init_tracing();
    }
    match cli.cmd {
        Command::Apply(args) => cmd_apply(args),
        Command::Offsets(args) => cmd_offsets(args),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("median_sketch=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_settings(args: &FilterArgs) -> anyhow::Result<median_sketch::MedianSketchSettings> {
    let mut settings = match (&args.config, args.preset) {
        (Some(path), _) => median_sketch::MedianSketchSettings::from_path(path)
            .with_context(|| format!("load settings '{}'", path.display()))?,
        (None, Some(PresetChoice::Sketch)) => median_sketch::MedianSketchSettings::sketch(),
        (None, _) => median_sketch::MedianSketchSettings::default(),
    };

    if let Some(v) = args.radius {
        settings.radius = v;
    }
    if let Some(v) = args.percentile {
        settings.percentile = v;
    }
    if let Some(v) = args.iterations {
        settings.iterations = v;
    }
    if let Some(v) = args.sample_count_percent {
        settings.sample_count_percent = v;
    }
    if let Some(v) = args.edge_mode {
        settings.edge_mode = match v {
            EdgeChoice::Clamp => median_sketch::EdgeMode::Clamp,
            EdgeChoice::Mirror => median_sketch::EdgeMode::Mirror,
            EdgeChoice::Wrap => median_sketch::EdgeMode::Wrap,
            EdgeChoice::Transparent => median_sketch::EdgeMode::Transparent,
        };
    }
    if let Some(v) = args.seed {
        settings.random_seed = v;
    }
    if let Some(v) = args.offset {
        settings.random_offset = v;
    }
    if let Some(v) = args.linear_neighbor {
        settings.linear_neighbor = match v {
            NeighborChoice::Textbook => median_sketch::LinearNeighbor::Textbook,
            NeighborChoice::Center => median_sketch::LinearNeighbor::Center,
        };
    }
    Ok(settings)
}

fn cmd_apply(args: ApplyArgs) -> anyhow::Result<()> {
    let settings = resolve_settings(&args.filter)?;
    let sketch = median_sketch::MedianSketch::new(&settings)?;

    let input = median_sketch::Surface::open(&args.in_path)
        .with_context(|| format!("read image '{}'", args.in_path.display()))?;

    let threading = median_sketch::RenderThreading {
        parallel: args.parallel,
        threads: args.threads,
    };
    let (out, stats) = sketch.apply(&input, &threading)?;

    ensure_parent(&args.out)?;
    out.save_png(&args.out)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!(
        "wrote {} ({}x{}, {} iterations, {} samples/pixel)",
        args.out.display(),
        out.width(),
        out.height(),
        stats.iterations,
        stats.samples_per_pixel
    );
    Ok(())
}

fn cmd_offsets(args: OffsetsArgs) -> anyhow::Result<()> {
    let settings = resolve_settings(&args.filter)?;
    let sketch = median_sketch::MedianSketch::new(&settings)?;
    let json = serde_json::to_string_pretty(sketch.patterns())
        .with_context(|| "serialize sample patterns")?;

    match &args.out {
        Some(path) => {
            ensure_parent(path)?;
            std::fs::write(path, json)
                .with_context(|| format!("write offsets '{}'", path.display()))?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}").with_context(|| "write offsets to stdout")?;
        }
    }
    Ok(())
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}
