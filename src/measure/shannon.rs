//! Shannon entropy, mutual information and capacity.
//!
//! The capacity is approximated with the Blahut-Arimoto algorithm, which
//! maintains a lower and an upper bound on the capacity; we declare
//! convergence when the two bounds are within `delta`, either in relative
//! or absolute value.
use ndarray::prelude::*;
use ordered_float::OrderedFloat;
use tracing::{debug, warn};

use crate::channel::Chan;
use crate::error::{QifError, Result};
use crate::kernel::{clamp_negligible, sum_of, Scalar};
use crate::measure::g_vuln::{check_channel, check_prior};
use crate::probab::Prob;

/// `-sum_i p_i log2 p_i`, skipping zeros. Works on unnormalized weights.
///
/// Only exact zeros are skipped: entries below the kernel's tolerance
/// still carry mass, and many of them add up.
pub fn entropy<S: Scalar>(p: &ArrayView1<S>) -> S {
    p.iter()
     .filter(|v| **v > S::zero())
     .fold(S::zero(), |acc, v| acc - v.clone() * v.log2())
}

/// H(X).
pub fn prior<S: Scalar>(pi: &Prob<S>) -> Result<S> {
    check_prior(pi)?;
    Ok(clamp_negligible(entropy(&pi.view())))
}

/// H(X|Y) = `-sum_{x,y} J(x,y) log2(J(x,y) / p(y))`.
pub fn posterior<S: Scalar>(pi: &Prob<S>, c: &Chan<S>) -> Result<S> {
    check_channel(pi, c)?;
    let joint = c.joint(pi)?;

    let h = joint.axis_iter(Axis(1)).fold(S::zero(), |acc, col| {
        let p_y = sum_of(col.iter());
        if !(p_y > S::zero()) {
            return acc;
        }
        let posterior = col.map(|v| v.clone() / p_y.clone());
        acc + p_y * entropy(&posterior.view())
    });
    Ok(clamp_negligible(h))
}

/// Mutual information I(X;Y) = H(X) - H(X|Y).
pub fn leakage<S: Scalar>(pi: &Prob<S>, c: &Chan<S>) -> Result<S> {
    let mi = prior(pi)? - posterior(pi, c)?;
    Ok(clamp_negligible(mi))
}

/// Options for the capacity computation.
#[derive(Clone, Debug, PartialEq)]
pub struct CapacityOptions {
    /// Stop when the bounds are within `delta`.
    pub delta: f64,
    /// Give up after this many iterations, returning the lower bound.
    pub max_iterations: usize,
    /// Use relative instead of absolute difference between the bounds.
    pub relative: bool,
}

impl Default for CapacityOptions {
    fn default() -> CapacityOptions {
        CapacityOptions {
            delta: 1e-9,
            max_iterations: 10_000,
            relative: false,
        }
    }
}

/// Returns relative or absolute change between two measurements.
fn change(a: f64, b: f64, relative: bool) -> f64 {
    if relative && b != 0. {
        (a - b).abs() / b.abs()
    } else {
        (a - b).abs()
    }
}

/// Shannon capacity `max_pi I(X;Y)`, in bits.
pub fn capacity<S: Scalar>(c: &Chan<S>, options: &CapacityOptions) -> Result<S> {
    c.check_proper()
     .map_err(|e| QifError::ImproperInput(format!("channel: {}", e)))?;
    if !(options.delta > 0.) {
        return Err(QifError::InvalidParameter(format!(
            "capacity delta must be positive, got {}", options.delta)));
    }

    let cm = c.as_array().map(|v| v.as_f64());
    let (n, m) = cm.dim();
    let mut r = vec![1. / n as f64; n];
    let mut lower = 0.;

    for iteration in 0..options.max_iterations.max(1) {
        // Output distribution under the current input distribution.
        let q = (0..m).map(|y| (0..n).map(|x| r[x] * cm[[x, y]]).sum::<f64>())
                      .collect::<Vec<_>>();
        // KL divergence (in bits) of each row from q.
        let d = (0..n).map(|x| {
            (0..m).filter(|&y| cm[[x, y]] > 0.)
                  .map(|y| cm[[x, y]] * (cm[[x, y]] / q[y]).log2())
                  .sum::<f64>()
        }).collect::<Vec<_>>();

        lower = r.iter().zip(&d).map(|(ri, di)| ri * di).sum::<f64>();
        let upper = d.iter()
                     .map(|v| OrderedFloat::from(*v))
                     .max()
                     .map_or(0., |v| v.into_inner());

        if change(upper, lower, options.relative) < options.delta {
            debug!(iteration, lower, upper, "capacity converged");
            return Ok(clamp_negligible(S::from_f64(lower)));
        }

        let weights = r.iter().zip(&d).map(|(ri, di)| ri * di.exp2()).collect::<Vec<_>>();
        let total: f64 = weights.iter().sum();
        r = weights.into_iter().map(|w| w / total).collect();
    }

    warn!(max_iterations = options.max_iterations, lower,
          "capacity did not converge; returning the lower bound");
    Ok(clamp_negligible(S::from_f64(lower)))
}
