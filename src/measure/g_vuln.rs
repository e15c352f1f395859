//! g-vulnerability and g-leakage.
//!
//! For a prior `pi`, a channel `C` and a gain function `G`:
//!
//!   V_g(pi)    = max_w sum_x pi(x) G(w, x)
//!   V_g(pi, C) = sum_y max_w sum_x pi(x) C(x, y) G(w, x)
//!
//! and the g-leakage is `log2(V_g(pi, C) / V_g(pi))`.
use ndarray::prelude::*;

use crate::channel::Chan;
use crate::error::{check_shape, QifError, Result};
use crate::kernel::{less_than, less_than_or_eq, Scalar};
use crate::measure::gain::Gain;
use crate::probab::Prob;

/// Checks shapes and properness of the operands of a measure.
pub(crate) fn check_prior<S: Scalar>(pi: &Prob<S>) -> Result<()> {
    pi.check_proper()
      .map_err(|e| QifError::ImproperInput(format!("prior: {}", e)))
}

pub(crate) fn check_channel<S: Scalar>(pi: &Prob<S>, c: &Chan<S>) -> Result<()> {
    check_shape("prior size vs channel rows", pi.len(), c.n_rows())?;
    check_prior(pi)?;
    c.check_proper()
     .map_err(|e| QifError::ImproperInput(format!("channel: {}", e)))
}

fn check_gain<S: Scalar, G: Gain<S>>(g: &G, pi: &Prob<S>) -> Result<()> {
    check_shape("gain function secrets vs prior size", pi.len(), g.n_secrets())
}

pub fn prior<S: Scalar, G: Gain<S>>(g: &G, pi: &Prob<S>) -> Result<S> {
    check_gain(g, pi)?;
    check_prior(pi)?;
    Ok(g.best_guess(&pi.view()))
}

pub fn posterior<S: Scalar, G: Gain<S>>(g: &G, pi: &Prob<S>, c: &Chan<S>) -> Result<S> {
    check_gain(g, pi)?;
    check_channel(pi, c)?;

    let mut vuln = S::zero();
    let mut weights = Array1::from_elem(pi.len(), S::zero());
    for y in 0..c.n_cols() {
        for (x, w) in weights.iter_mut().enumerate() {
            *w = pi.at(x).clone() * c.at(x, y).clone();
        }
        vuln = vuln + g.best_guess(&weights.view());
    }
    Ok(vuln)
}

/// `V_g(pi, C) - V_g(pi)`.
pub fn add_leakage<S: Scalar, G: Gain<S>>(g: &G, pi: &Prob<S>, c: &Chan<S>) -> Result<S> {
    Ok(posterior(g, pi, c)? - prior(g, pi)?)
}

/// `V_g(pi, C) / V_g(pi)`; needs a positive prior vulnerability.
pub fn mult_leakage<S: Scalar, G: Gain<S>>(g: &G, pi: &Prob<S>, c: &Chan<S>) -> Result<S> {
    let prior_vuln = prior(g, pi)?;
    if !less_than(&S::zero(), &prior_vuln) {
        return Err(QifError::NumericDomain(format!(
            "multiplicative leakage with prior vulnerability {}", prior_vuln)));
    }
    Ok(posterior(g, pi, c)? / prior_vuln)
}

/// The g-leakage `log2(V_g(pi, C) / V_g(pi))`.
///
/// It is `0` whenever the ratio is not above one within tolerance; this
/// covers a prior vulnerability that is already maximal, and ratios that
/// dip below one only because of rounding.
pub fn leakage<S: Scalar, G: Gain<S>>(g: &G, pi: &Prob<S>, c: &Chan<S>) -> Result<S> {
    let ratio = mult_leakage(g, pi, c)?;
    if less_than_or_eq(&ratio, &S::one()) {
        return Ok(S::zero());
    }
    Ok(ratio.log2())
}
