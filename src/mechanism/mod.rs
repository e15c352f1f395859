//! Mechanisms: channels built to trade utility for privacy.
//!
//! `optimal_exp_loss` synthesizes, by linear programming, the channel
//! with the least expected loss among those satisfying a privacy bound;
//! `d_privacy` has the classic closed-form mechanisms and checks for
//! metric-based differential privacy.
//!
//! # Examples
//!
//! ```
//! use qif::probab::Prob;
//! use qif::metric;
//! use qif::mechanism::optimal_exp_loss;
//! use qif::measure::bayes_vuln;
//!
//! let pi = Prob::<f64>::uniform(4);
//! let loss = metric::absolute();
//! let mech = optimal_exp_loss::given_max_bayes_vulnerability(&pi, 4, 0.5, &loss).unwrap();
//! let c = mech.channel_or_infeasible().unwrap();
//! assert!(c.is_proper());
//! assert!(bayes_vuln::posterior(&pi, c).unwrap() <= 0.5 + 1e-7);
//! ```
pub mod lp;
pub mod optimal_exp_loss;
pub mod d_privacy;

use std::fmt;
use serde::Serialize;

use crate::channel::Chan;
use crate::error::{QifError, Result};
use crate::kernel::Scalar;

pub use self::lp::{CancelToken, SynthesisOptions};

/// The constraint a mechanism was synthesized under.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum SynthesisKind {
    /// Posterior Bayes vulnerability at most `bound`.
    MaxBayesVulnerability { bound: f64 },
    /// `C(x, y) <= e^(epsilon d(x, x')) C(x', y)` for all `x, x', y`.
    DPrivacy { epsilon: f64 },
}

/// What a mechanism was optimized for.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MechanismParams {
    pub kind: SynthesisKind,
    /// Label of the loss metric.
    pub loss: String,
    pub n_secrets: usize,
    pub n_outputs: usize,
}

/// A synthesized channel, tagged with its parameters.
///
/// When no channel satisfies the constraints, the channel is empty: check
/// `is_empty()` or use `channel_or_infeasible()` before using it.
#[derive(Clone, Debug, PartialEq)]
pub struct Mechanism<S> {
    pub channel: Chan<S>,
    pub params: MechanismParams,
}

impl<S: Scalar> Mechanism<S> {
    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    pub fn channel_or_infeasible(&self) -> Result<&Chan<S>> {
        if self.is_empty() {
            Err(QifError::Infeasible)
        } else {
            Ok(&self.channel)
        }
    }

    pub fn into_channel(self) -> Result<Chan<S>> {
        if self.is_empty() {
            Err(QifError::Infeasible)
        } else {
            Ok(self.channel)
        }
    }
}

impl fmt::Display for SynthesisKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SynthesisKind::MaxBayesVulnerability { bound } =>
                write!(f, "max Bayes vulnerability {}", bound),
            SynthesisKind::DPrivacy { epsilon } =>
                write!(f, "d-privacy with epsilon {}", epsilon),
        }
    }
}

impl fmt::Display for MechanismParams {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{} mechanism, {}, loss {}",
               self.n_secrets, self.n_outputs, self.kind, self.loss)
    }
}

/// Builds a channel out of LP values laid out row-major.
///
/// Values are clamped to `[0, 1]`, and the largest entry of each row is
/// recomputed as one minus the others, so that rows sum to one exactly
/// in the scalar kind.
pub(crate) fn decode_channel<S: Scalar>(values: &[f64], n_rows: usize, n_cols: usize)
        -> Result<Chan<S>> {
    if n_cols == 0 {
        return Err(QifError::InvalidShape("channel with no outputs".into()));
    }
    if values.len() < n_rows * n_cols {
        return Err(QifError::Solver(format!(
            "{} values for a {}x{} channel", values.len(), n_rows, n_cols)));
    }

    let mut rows = Vec::with_capacity(n_rows);
    for row in values.chunks(n_cols).take(n_rows) {
        let mut entries = row.iter()
                             .map(|v| S::from_f64(v.max(0.).min(1.)))
                             .collect::<Vec<_>>();
        let argmax = row.iter()
                        .enumerate()
                        .fold(0, |best, (i, v)| if *v > row[best] { i } else { best });
        let others = entries.iter()
                            .enumerate()
                            .filter(|(i, _)| *i != argmax)
                            .fold(S::zero(), |acc, (_, v)| acc + v.clone());
        entries[argmax] = S::one() - others;
        rows.push(entries);
    }
    Chan::from_rows(rows)
        .map_err(|e| QifError::Solver(format!("solution is not a channel: {}", e)))
}
