//! Guessing entropy: the expected number of tries an adversary needs to
//! guess the secret, trying secrets in decreasing order of probability.
use std::cmp::Ordering;

use crate::channel::Chan;
use crate::error::Result;
use crate::kernel::Scalar;
use crate::measure::g_vuln::{check_channel, check_prior};
use crate::probab::Prob;

/// `sum_i i * p_(i)` with `p_(1) >= p_(2) >= ...`; works on unnormalized
/// weights.
fn guesses<'a, S: Scalar, I: Iterator<Item = &'a S>>(weights: I) -> S {
    let mut sorted = weights.cloned().collect::<Vec<_>>();
    sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));

    sorted.into_iter()
          .enumerate()
          .fold(S::zero(), |acc, (i, p)| acc + S::from_usize(i + 1) * p)
}

pub fn prior<S: Scalar>(pi: &Prob<S>) -> Result<S> {
    check_prior(pi)?;
    Ok(guesses(pi.iter()))
}

/// Expected guessing entropy after observing the output.
pub fn posterior<S: Scalar>(pi: &Prob<S>, c: &Chan<S>) -> Result<S> {
    check_channel(pi, c)?;
    let joint = c.joint(pi)?;

    Ok((0..c.n_cols()).fold(S::zero(), |acc, y| acc + guesses(joint.column(y).iter())))
}

/// Additive leakage: tries saved by observing the output.
pub fn add_leakage<S: Scalar>(pi: &Prob<S>, c: &Chan<S>) -> Result<S> {
    Ok(prior(pi)? - posterior(pi, c)?)
}
