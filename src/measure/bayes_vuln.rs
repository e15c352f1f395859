//! Bayes vulnerability: the probability of guessing the secret in one
//! try, before or after observing the channel's output.
//!
//! This is g-vulnerability under the identity gain function.
use crate::channel::Chan;
use crate::error::{QifError, Result};
use crate::kernel::{max_of, Scalar};
use crate::measure::g_vuln;
use crate::measure::gain::IdentityGain;
use crate::probab::Prob;

/// `max_x pi(x)`.
pub fn prior<S: Scalar>(pi: &Prob<S>) -> Result<S> {
    g_vuln::prior(&IdentityGain::new(pi.len()), pi)
}

/// `sum_y max_x pi(x) C(x, y)`.
pub fn posterior<S: Scalar>(pi: &Prob<S>, c: &Chan<S>) -> Result<S> {
    g_vuln::posterior(&IdentityGain::new(pi.len()), pi, c)
}

pub fn add_leakage<S: Scalar>(pi: &Prob<S>, c: &Chan<S>) -> Result<S> {
    g_vuln::add_leakage(&IdentityGain::new(pi.len()), pi, c)
}

pub fn mult_leakage<S: Scalar>(pi: &Prob<S>, c: &Chan<S>) -> Result<S> {
    g_vuln::mult_leakage(&IdentityGain::new(pi.len()), pi, c)
}

/// Multiplicative Bayes capacity: `sum_y max_x C(x, y)`, the largest
/// multiplicative leakage over all priors (reached by the uniform one).
pub fn mult_capacity<S: Scalar>(c: &Chan<S>) -> Result<S> {
    c.check_proper()
     .map_err(|e| QifError::ImproperInput(format!("channel: {}", e)))?;

    Ok((0..c.n_cols()).fold(S::zero(), |acc, y| {
        acc + max_of(c.column(y).iter()).unwrap_or_else(S::zero)
    }))
}
