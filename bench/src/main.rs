use std::time::{Duration, Instant};

use anyhow::Context as _;
use serde_json::json;
use sha2::Digest as _;

#[derive(Clone, Debug)]
struct BenchArgs {
    width: u32,
    height: u32,
    radius: f32,
    percentile: f32,
    iterations: u32,
    sample_count_percent: f32,
    warmup: u32,
    repeats: u32,
    parallel: bool,
    threads: Option<usize>,
    json: bool,
}

#[derive(Clone, Debug, Default)]
struct RunMetrics {
    setup: Duration,
    render: Duration,
    wall_total: Duration,
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn try_main() -> anyhow::Result<()> {
    let args = parse_args()?;

    if args.width == 0 || args.height == 0 {
        anyhow::bail!("--width/--height must be > 0");
    }
    if args.repeats == 0 {
        anyhow::bail!("--repeats must be >= 1");
    }
    if let Some(n) = args.threads
        && n == 0
    {
        anyhow::bail!("--threads must be >= 1 when set");
    }

    let input = synthetic_input(args.width, args.height)?;
    let settings = median_sketch::MedianSketchSettings {
        radius: args.radius,
        percentile: args.percentile,
        iterations: args.iterations,
        sample_count_percent: args.sample_count_percent,
        edge_mode: median_sketch::EdgeMode::Mirror,
        ..median_sketch::MedianSketchSettings::default()
    };

    if args.warmup > 0 {
        eprintln!("warmup: {} run(s)", args.warmup);
        for _ in 0..args.warmup {
            let _ = run_once(&args, &settings, &input)?;
        }
    }

    eprintln!(
        "bench: {repeats} run(s) ({profile} build), {w}x{h}, radius={radius}, p={p}, iterations={iters}, pct={pct}, mode={mode}, threads={threads}",
        repeats = args.repeats,
        profile = if cfg!(debug_assertions) {
            "debug"
        } else {
            "release"
        },
        w = args.width,
        h = args.height,
        radius = args.radius,
        p = args.percentile,
        iters = args.iterations,
        pct = args.sample_count_percent,
        mode = if args.parallel {
            "parallel"
        } else {
            "sequential"
        },
        threads = args
            .threads
            .map(|n| n.to_string())
            .unwrap_or_else(|| "auto".to_string()),
    );

    let mut runs = Vec::<RunMetrics>::with_capacity(args.repeats as usize);
    let mut digest = None;
    for _ in 0..args.repeats {
        let (metrics, hash) = run_once(&args, &settings, &input)?;
        match &digest {
            None => digest = Some(hash),
            Some(prev) if *prev != hash => {
                anyhow::bail!("output digest changed between runs ({prev} vs {hash})")
            }
            Some(_) => {}
        }
        runs.push(metrics);
    }

    let digest = digest.unwrap_or_default();
    eprintln!("output sha256: {digest}");
    report_percentiles(&runs);

    if args.json {
        let render = collect(&runs, |m| m.render);
        let summary = json!({
            "width": args.width,
            "height": args.height,
            "radius": args.radius,
            "iterations": args.iterations,
            "sample_count_percent": args.sample_count_percent,
            "parallel": args.parallel,
            "render_p50_ms": p(&render, 0.50).as_secs_f64() * 1000.0,
            "render_p90_ms": p(&render, 0.90).as_secs_f64() * 1000.0,
            "output_sha256": digest,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}

fn synthetic_input(width: u32, height: u32) -> anyhow::Result<median_sketch::Surface> {
    // Gradients plus sparse salt-and-pepper impulses.
    Ok(median_sketch::Surface::from_fn(width, height, |x, y| {
        let h = x.wrapping_mul(2_654_435_761) ^ y.wrapping_mul(40_503);
        let impulse = match h % 61 {
            0 => Some(0.0),
            1 => Some(1.0),
            _ => None,
        };
        let base = [
            x as f32 / width as f32,
            y as f32 / height as f32,
            ((x + y) % 32) as f32 / 31.0,
            1.0,
        ];
        match impulse {
            Some(v) => [v, v, v, 1.0],
            None => base,
        }
    })?)
}

fn run_once(
    args: &BenchArgs,
    settings: &median_sketch::MedianSketchSettings,
    input: &median_sketch::Surface,
) -> anyhow::Result<(RunMetrics, String)> {
    let t_wall = Instant::now();

    let t0 = Instant::now();
    let sketch = median_sketch::MedianSketch::new(settings)?;
    let setup = t0.elapsed();

    let threading = median_sketch::RenderThreading {
        parallel: args.parallel,
        threads: args.threads,
    };
    let t1 = Instant::now();
    let (out, _) = sketch.apply(input, &threading)?;
    let render = t1.elapsed();

    let hash = sha256_hex(out.to_rgba8().as_raw());
    Ok((
        RunMetrics {
            setup,
            render,
            wall_total: t_wall.elapsed(),
        },
        hash,
    ))
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut s = String::with_capacity(digest.len() * 2);
    for b in digest {
        s.push_str(&format!("{b:02x}"));
    }
    s
}

fn parse_args() -> anyhow::Result<BenchArgs> {
    let mut args = std::env::args().skip(1);

    let mut out = BenchArgs {
        width: 512,
        height: 512,
        radius: 15.0,
        percentile: 0.5,
        iterations: 2,
        sample_count_percent: 0.10,
        warmup: 1,
        repeats: 10,
        parallel: false,
        threads: None,
        json: false,
    };

    while let Some(a) = args.next() {
        match a.as_str() {
            "--width" => out.width = parse_u32(args.next(), "--width")?,
            "--height" => out.height = parse_u32(args.next(), "--height")?,
            "--radius" => out.radius = parse_f32(args.next(), "--radius")?,
            "--percentile" => out.percentile = parse_f32(args.next(), "--percentile")?,
            "--iterations" => out.iterations = parse_u32(args.next(), "--iterations")?,
            "--sample-count-percent" => {
                out.sample_count_percent = parse_f32(args.next(), "--sample-count-percent")?
            }
            "--warmup" => out.warmup = parse_u32(args.next(), "--warmup")?,
            "--repeats" => out.repeats = parse_u32(args.next(), "--repeats")?,
            "--parallel" => out.parallel = true,
            "--threads" => out.threads = Some(parse_usize(args.next(), "--threads")?),
            "--json" => out.json = true,
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ => anyhow::bail!("unknown arg '{a}' (try --help)"),
        }
    }

    Ok(out)
}

fn print_help() {
    eprintln!(
        r#"median-sketch-bench

Filters a synthetic image repeatedly, checks the output digest is stable, and reports
p50/p90/p99 for each stage.

Usage (from bench/):
  cargo run -q --release
  cargo run -q --release -- --radius 25 --iterations 3 --sample-count-percent 0.01
  cargo run -q --release -- --parallel --threads 4

Args:
  --width N                 (default 512)
  --height N                (default 512)
  --radius R                (default 15)
  --percentile P            (default 0.5)
  --iterations N            (default 2)
  --sample-count-percent F  (default 0.10)
  --warmup N                (default 1)
  --repeats N               (default 10)
  --parallel                render rows on a rayon pool
  --threads N               worker threads for parallel mode (default auto)
  --json                    print a JSON summary on stdout
"#
    );
}

fn parse_u32(v: Option<String>, flag: &str) -> anyhow::Result<u32> {
    let v = v.ok_or_else(|| anyhow::anyhow!("missing value for {flag}"))?;
    v.parse::<u32>()
        .with_context(|| format!("parse {flag} value '{v}'"))
}

fn parse_usize(v: Option<String>, flag: &str) -> anyhow::Result<usize> {
    let v = v.ok_or_else(|| anyhow::anyhow!("missing value for {flag}"))?;
    v.parse::<usize>()
        .with_context(|| format!("parse {flag} value '{v}'"))
}

fn parse_f32(v: Option<String>, flag: &str) -> anyhow::Result<f32> {
    let v = v.ok_or_else(|| anyhow::anyhow!("missing value for {flag}"))?;
    v.parse::<f32>()
        .with_context(|| format!("parse {flag} value '{v}'"))
}

fn collect(runs: &[RunMetrics], f: fn(&RunMetrics) -> Duration) -> Vec<Duration> {
    let mut v = runs.iter().map(f).collect::<Vec<_>>();
    v.sort_by_key(|d| d.as_nanos());
    v
}

fn p(v: &[Duration], p: f64) -> Duration {
    if v.is_empty() {
        return Duration::ZERO;
    }
    let n = v.len();
    let rank = (p * (n as f64)).ceil().clamp(1.0, n as f64) as usize;
    v[rank - 1]
}

fn report_percentiles(runs: &[RunMetrics]) {
    type Getter = fn(&RunMetrics) -> Duration;
    type Field = (&'static str, Getter);

    fn fmt_ms(d: Duration) -> String {
        format!("{:.3}ms", d.as_secs_f64() * 1000.0)
    }

    let fields: &[Field] = &[
        ("setup", |m| m.setup),
        ("render", |m| m.render),
        ("wall_total", |m| m.wall_total),
    ];

    eprintln!("\npercentiles across runs (p50/p90/p99):");
    for (name, getter) in fields {
        let v = collect(runs, *getter);
        eprintln!(
            "  {name:12} p50={p50:>10}  p90={p90:>10}  p99={p99:>10}",
            name = *name,
            p50 = fmt_ms(p(&v, 0.50)),
            p90 = fmt_ms(p(&v, 0.90)),
            p99 = fmt_ms(p(&v, 0.99))
        );
    }
}
