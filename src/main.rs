//! `qif` synthesizes location-privacy mechanisms and computes leakage
//! data for plots.
//!
//! # Optimal mechanisms on a grid
//!
//!     qif geo-optimal [options] <width> <height> <cell-size> <min-bayes-risk>
//!
//! The secret is a cell of a `width x height` grid, with cells of side
//! `cell-size`, and the prior is uniform. `qif` builds the mechanism
//! reporting a cell of the same grid that minimizes the expected
//! Euclidean distance between the real and the reported cell, among
//! those leaving the adversary a Bayes risk of at least `min-bayes-risk`.
//! It saves the channel (one row per line) and prints its Bayes risk and
//! expected loss. The exit code is `-1` if no mechanism satisfies the
//! constraint.
//!
//! # Crowds
//!
//!     qif crowds <outdir>
//!
//! Writes the data of four plots about the Crowds anonymity protocol
//! (5 honest users, 1 corrupted), one `x y1 y2 y3` line per point:
//!
//! **data-min-p.txt** Min-entropy leakage as a function of the prior
//! probability `p` of the first user, for forwarding probabilities
//! 0, 0.5 and 1.
//!
//! **data-min-pf.txt** Min-entropy leakage as a function of the forwarding
//! probability, for `p` = 0.4, 0.3, 0.2.
//!
//! **data-tiger-p.txt**, **data-tiger-pf.txt** The same for g-leakage,
//! with a gain function that also rewards answering "don't know".
//!
//! Logging goes to stderr; set `RUST_LOG` (e.g., `RUST_LOG=qif=debug`)
//! to see the sizes of the linear programs and solver outcomes.
use std::fs;
use std::path::Path;
use std::process;
use std::time::Duration;

use docopt::Docopt;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use qif::error::QifError;
use qif::measure::{bayes_risk, g_vuln, min_entropy, GainMatrix};
use qif::mechanism::{optimal_exp_loss, SynthesisOptions};
use qif::metric::{self, geo};
use qif::utility::expected_distance;
use qif::utils::save_matrix;
use qif::{Chan, Prob, Result};


const USAGE: &'static str = "
Leakage measures and optimal mechanisms.

Usage: qif geo-optimal [options] <width> <height> <cell-size> <min-bayes-risk>
       qif crowds <outdir>
       qif (--help | --version)

Options:
    --save=<file>               Where to save the synthesized channel
                                [default: C].
    --timeout=<secs>            Give up synthesis after this many seconds.
    -h, --help                  Show help.
    --version                   Show the version.
";

const GEO_ARGS: &'static str = "args should be: <width> <height> <cell_size> <min_bayes_risk>";

#[derive(Deserialize)]
struct Args {
    cmd_geo_optimal: bool,
    cmd_crowds: bool,
    flag_save: String,
    flag_timeout: Option<f64>,
    arg_width: String,
    arg_height: String,
    arg_cell_size: String,
    arg_min_bayes_risk: String,
    arg_outdir: String,
}

/// Crowds users that are honest or corrupted.
const HONEST: usize = 5;
const CORRUPTED: usize = 1;
/// Points per plot, minus one.
const STEPS: usize = 1000;

/// One line of plot data.
#[derive(Serialize)]
struct SweepRow {
    x: f64,
    first: f64,
    second: f64,
    third: f64,
}

/// Parses a positional argument, or exits with the usage line.
fn parse_arg<T: std::str::FromStr>(value: &str) -> T {
    value.trim().parse().unwrap_or_else(|_| {
        println!("{}", GEO_ARGS);
        process::exit(-1);
    })
}

fn parse_timeout(secs: f64) -> Result<Duration> {
    if !(secs > 0.) {
        return Err(QifError::InvalidParameter(format!("timeout of {} seconds", secs)));
    }
    Duration::try_from_secs_f64(secs).map_err(|_| {
        QifError::InvalidParameter(format!("timeout of {} seconds", secs))
    })
}

fn geo_optimal(args: &Args) -> Result<()> {
    let width: usize = parse_arg(&args.arg_width);
    let height: usize = parse_arg(&args.arg_height);
    let cell_size: f64 = parse_arg(&args.arg_cell_size);
    let min_bayes_risk: f64 = parse_arg(&args.arg_min_bayes_risk);

    let n = width.checked_mul(height).ok_or_else(|| {
        QifError::InvalidParameter(format!("a {}x{} grid is too large", width, height))
    })?;
    let pi = Prob::<f64>::uniform(n);
    let euclid = metric::euclidean::<f64>();
    let loss = cell_size * metric::compose(&euclid, geo::cell_to_point(width));
    let timeout = args.flag_timeout.map(parse_timeout).transpose()?;
    let options = SynthesisOptions { timeout, cancel: None };

    println!("computing matrix");
    let mechanism = optimal_exp_loss::given_min_bayes_risk_with(&pi, n, min_bayes_risk,
                                                                &loss, &options)?;
    println!("done");

    let c = mechanism.channel_or_infeasible()?;
    save_matrix(&args.flag_save, &c.view())?;

    println!("Channel size: {}x{}", c.n_rows(), c.n_cols());
    println!("Bayes Risk: {}", bayes_risk::posterior(&pi, c)?);
    println!("Exp Loss: {}", expected_distance(&loss, &pi, c)?);
    Ok(())
}

/// Channel of the Crowds protocol with `n` honest and `c` corrupted
/// users, where each user forwards the message with probability `pf`.
///
/// Outputs `0..n` mean that a corrupted user was first contacted by that
/// honest user; output `n` means that no corrupted user saw the message.
fn crowds_matrix(n: usize, c: usize, pf: f64) -> Result<Chan<f64>> {
    let (nf, cf) = (n as f64, c as f64);
    let m = nf + cf;

    let alpha = if pf >= 1. { 0. } else { (nf - nf * pf) / (m - nf * pf) };
    let beta = (cf * (m - pf * (nf - 1.))) / (m * (m - pf * nf));
    let gamma = (cf * pf) / (m * (m - pf * nf));

    Chan::from_rows((0..n).map(|i| {
        (0..=n).map(|j| if j == n { alpha } else if i == j { beta } else { gamma })
               .collect()
    }).collect())
}

fn steps() -> impl Iterator<Item = f64> {
    (0..=STEPS).map(|i| i as f64 / STEPS as f64)
}

fn write_sweep<F>(path: &Path, mut row: F) -> Result<()>
where F: FnMut(f64) -> Result<SweepRow> {
    let io_error = |e: csv::Error| QifError::Io {
        context: format!("writing {}", path.display()),
        source: e.into(),
    };
    let mut writer = csv::WriterBuilder::new()
                        .delimiter(b' ')
                        .has_headers(false)
                        .from_path(path)
                        .map_err(io_error)?;
    for x in steps() {
        writer.serialize(row(x)?).map_err(io_error)?;
    }
    writer.flush().map_err(|e| QifError::Io {
        context: format!("writing {}", path.display()),
        source: e,
    })
}

fn crowds(args: &Args) -> Result<()> {
    let outdir = Path::new(&args.arg_outdir);
    fs::create_dir_all(outdir).map_err(|e| QifError::Io {
        context: format!("creating {}", outdir.display()),
        source: e,
    })?;

    let by_pf = [0., 0.5, 1.].iter()
                             .map(|pf| crowds_matrix(HONEST, CORRUPTED, *pf))
                             .collect::<Result<Vec<_>>>()?;
    let by_p = [0.4, 0.3, 0.2].iter()
                              .map(|p| Prob::biased(HONEST, *p))
                              .collect::<Result<Vec<_>>>()?;
    let tiger = GainMatrix::tiger(HONEST);

    write_sweep(&outdir.join("data-min-p.txt"), |p| {
        let pi = Prob::biased(HONEST, p)?;
        Ok(SweepRow {
            x: p,
            first: min_entropy::leakage(&pi, &by_pf[0])?,
            second: min_entropy::leakage(&pi, &by_pf[1])?,
            third: min_entropy::leakage(&pi, &by_pf[2])?,
        })
    })?;

    write_sweep(&outdir.join("data-min-pf.txt"), |pf| {
        let c = crowds_matrix(HONEST, CORRUPTED, pf)?;
        Ok(SweepRow {
            x: pf,
            first: min_entropy::leakage(&by_p[0], &c)?,
            second: min_entropy::leakage(&by_p[1], &c)?,
            third: min_entropy::leakage(&by_p[2], &c)?,
        })
    })?;

    write_sweep(&outdir.join("data-tiger-p.txt"), |p| {
        let pi = Prob::biased(HONEST, p)?;
        Ok(SweepRow {
            x: p,
            first: g_vuln::leakage(&tiger, &pi, &by_pf[0])?,
            second: g_vuln::leakage(&tiger, &pi, &by_pf[1])?,
            third: g_vuln::leakage(&tiger, &pi, &by_pf[2])?,
        })
    })?;

    write_sweep(&outdir.join("data-tiger-pf.txt"), |pf| {
        let c = crowds_matrix(HONEST, CORRUPTED, pf)?;
        Ok(SweepRow {
            x: pf,
            first: g_vuln::leakage(&tiger, &by_p[0], &c)?,
            second: g_vuln::leakage(&tiger, &by_p[1], &c)?,
            third: g_vuln::leakage(&tiger, &by_p[2], &c)?,
        })
    })?;

    println!("data written to {}", outdir.display());
    Ok(())
}


fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env()
                                   .unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    // Parse args from command line.
    let args: Args = Docopt::new(USAGE)
                            .map(|d| d.version(Some(env!("CARGO_PKG_VERSION").to_string())))
                            .and_then(|d| d.deserialize())
                            .unwrap_or_else(|e| {
                                if e.fatal() {
                                    println!("{}", e);
                                    process::exit(-1);
                                }
                                e.exit()
                            });

    let outcome = if args.cmd_geo_optimal {
        geo_optimal(&args)
    } else if args.cmd_crowds {
        crowds(&args)
    } else {
        Ok(())
    };

    match outcome {
        Ok(()) => {},
        Err(QifError::Infeasible) => {
            println!("no solution for given constraints");
            process::exit(-1);
        },
        Err(e) => {
            eprintln!("[!] {}", e);
            process::exit(-1);
        },
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use qif::kernel::equal;

    #[test]
    fn crowds_channels_are_proper() {
        for pf in steps().step_by(50) {
            let c = crowds_matrix(HONEST, CORRUPTED, pf).unwrap();
            assert_eq!((c.n_rows(), c.n_cols()), (HONEST, HONEST + 1));
            assert!(c.is_proper());
        }
        // Without forwarding, the corrupted user sees the initiator.
        let c = crowds_matrix(HONEST, CORRUPTED, 0.).unwrap();
        assert!(equal(c.at(0, 0), &(1. / 6.)));
        assert!(equal(c.at(0, 1), &0.));
        assert!(equal(c.at(0, HONEST), &(5. / 6.)));
    }

    #[test]
    fn timeouts() {
        assert_eq!(parse_timeout(1.5).unwrap(), Duration::from_millis(1500));
        for secs in &[0., -1., f64::NAN, f64::INFINITY, 1e30] {
            assert!(matches!(parse_timeout(*secs), Err(QifError::InvalidParameter(_))));
        }
    }

    #[test]
    fn huge_grid() {
        let args = Args {
            cmd_geo_optimal: true,
            cmd_crowds: false,
            flag_save: "C".into(),
            flag_timeout: None,
            arg_width: usize::MAX.to_string(),
            arg_height: "2".into(),
            arg_cell_size: "1".into(),
            arg_min_bayes_risk: "0.5".into(),
            arg_outdir: String::new(),
        };
        assert!(matches!(geo_optimal(&args), Err(QifError::InvalidParameter(_))));
    }

    #[test]
    fn sweep_endpoints() {
        let xs = steps().collect::<Vec<_>>();
        assert_eq!(xs.len(), STEPS + 1);
        assert_eq!((xs[0], xs[STEPS]), (0., 1.));
    }
}
