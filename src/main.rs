use std::error::Error;
use std::path::Path;

use colored::Colorize;

mod input;
mod moments;
mod special_functions;

use input::Config;
use moments::*;

/// Truncation bound used when the input file does not specify one.
/// Large enough that the series has converged (by underflow of the
/// per-state contribution) for any parameters in the valid range.
const DEFAULT_PRECISION: usize = 16000;

macro_rules! report {
    (error, $($t:tt)*) => {{
        eprint!("{} ", "error:".red().bold());
        eprintln!($($t)*);
    }};
    (warning, $($t:tt)*) => {{
        eprint!("{} ", "warning:".yellow().bold());
        eprintln!($($t)*);
    }};
}

fn main() -> Result<(), Box<dyn Error>> {
    let path = std::env::args().nth(1)
        .unwrap_or_else(|| {
            report!(error, "no input file specified.");
            eprintln!("Usage: spike-moments input-file");
            std::process::exit(1)
        });
    let path = Path::new(&path);

    let mut config = Config::from_file(path)?;
    config.with_context("constants")?;

    let s: f64 = config.read("process:branching_rate")?;
    let g: f64 = config.read("process:creation_rate_ratio")?;

    // a single rate, an explicit list, or a start/stop/step block
    let extinction_rates: Vec<f64> = config.read("process:extinction_rate")
        .or_else(|_| config.read_loop("process:extinction_rate"))?;

    let precision: usize = config.read("series:precision")
        .unwrap_or_else(|_| {
            report!(warning, "no 'series:precision' given, using {}.", DEFAULT_PRECISION);
            DEFAULT_PRECISION
        });

    // fail fast on parameters outside the convergent regime,
    // rather than letting degenerate numerics propagate
    if !(s > 0.0) || !(g > 0.0) || precision == 0 {
        report!(error, "branching_rate and creation_rate_ratio must be positive and precision nonzero (got s = {}, g = {}, precision = {}).", s, g, precision);
        std::process::exit(1);
    }
    for r in extinction_rates.iter() {
        let p2 = (1.0 - r / s) / 2.0;
        if !(*r >= 0.0) || !(p2 > 0.0 && p2 < 1.0) {
            report!(error, "extinction_rate must satisfy 0 <= r < s = {} (got r = {}).", s, r);
            std::process::exit(1);
        }
    }

    println!("# pumped branching");
    println!("# binary branching");
    println!("# first five moments");
    println!("# 1st column: branching rate s");
    println!("# 2nd column: effective extinction rate r");
    println!("# 3rd column: relative spontaneous creation g = gamma/s");
    println!("# columns 4 to 8: 1st to 5th moment");

    let gamma = g * s;
    for r in extinction_rates.iter() {
        let r = *r;
        let p2 = (1.0 - r / s) / 2.0;
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            s, r, g,
            first_moment(r, gamma, s, p2, precision),
            second_moment(r, gamma, s, p2, precision),
            third_moment(r, gamma, s, p2, precision),
            fourth_moment(r, gamma, s, p2, precision),
            fifth_moment(r, gamma, s, p2, precision),
        );
    }

    Ok(())
}
