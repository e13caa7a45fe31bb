//! Benchmark the parallel hull build at various scales.
//!
//! Run with: cargo run --release --bin bench_hull
//!
//! Usage:
//!   bench_hull              Run default size (100k)
//!   bench_hull 10k 100k 1m  Run multiple sizes
//!   bench_hull -n 10        Run 10 iterations per size
//!   bench_hull --dump       Write convex_hull.in / convex_hull.out

use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::Instant;

use clap::Parser;
use glam::Vec3;
use par_hull3d::{build_hull, ConvexHull};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn parse_count(s: &str) -> Result<usize, String> {
    let s = s.to_lowercase();
    let (num_str, multiplier) = if s.ends_with('m') {
        (&s[..s.len() - 1], 1_000_000)
    } else if s.ends_with('k') {
        (&s[..s.len() - 1], 1_000)
    } else {
        (s.as_str(), 1)
    };

    num_str
        .parse::<f64>()
        .map(|n| (n * multiplier as f64) as usize)
        .map_err(|e| format!("Invalid number '{}': {}", s, e))
}

#[derive(Parser)]
#[command(name = "bench_hull")]
#[command(about = "Benchmark parallel 3-D convex hull at various scales")]
struct Args {
    /// Point counts to benchmark (e.g. 10k, 1m)
    #[arg(value_parser = parse_count)]
    sizes: Vec<usize>,

    /// Random seed
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Number of iterations per size
    #[arg(short = 'n', long, default_value_t = 5)]
    repeat: usize,

    /// Write convex_hull.in / convex_hull.out for the last run of each size
    #[arg(long)]
    dump: bool,
}

/// Random points in the unit cube.
fn generate_points(n: usize, seed: u64) -> Vec<Vec3> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            Vec3::new(
                rng.gen_range(0.0..1.0),
                rng.gen_range(0.0..1.0),
                rng.gen_range(0.0..1.0),
            )
        })
        .collect()
}

fn dump_files(points: &[Vec3], hull: &ConvexHull) -> std::io::Result<()> {
    let mut input = BufWriter::new(File::create("convex_hull.in")?);
    for p in points {
        writeln!(input, "{} {} {}", p.x, p.y, p.z)?;
    }

    let mut output = BufWriter::new(File::create("convex_hull.out")?);
    for facet in &hull.facets {
        let line: Vec<String> = facet
            .indices
            .iter()
            .map(|&id| {
                let p = points[id as usize];
                format!("{} {} {}", p.x, p.y, p.z)
            })
            .collect();
        writeln!(output, "{}", line.join(" "))?;
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let mut args = Args::parse();
    if args.sizes.is_empty() {
        args.sizes.push(100_000);
    }

    for &n in &args.sizes {
        let points = generate_points(n, args.seed);
        let mut last = None;
        for iter in 0..args.repeat {
            let start = Instant::now();
            let hull = build_hull(&points).expect("hull construction failed");
            let elapsed = start.elapsed();
            println!(
                "n={:<9} iter={:<2} {:>12.3?}  {} facets",
                n,
                iter,
                elapsed,
                hull.facets.len()
            );
            last = Some(hull);
        }
        if args.dump {
            if let Some(hull) = &last {
                dump_files(&points, hull).expect("failed to write dump files");
            }
        }
    }
}
