//! `qif` quantifies the leakage of a system about its secrets, and
//! synthesizes mechanisms that trade utility for privacy.
//!
//! A system is modelled as a _channel_: a row-stochastic matrix whose
//! rows are the secrets and whose columns are the outputs an adversary
//! observes. Given a _prior_ over the secrets, the measures in
//! [`measure`] compute how much the channel leaks: Bayes vulnerability
//! and risk, min-entropy, Shannon and g-leakage, and guessing entropy.
//!
//! [`mechanism`] goes the other way: given a prior, a loss metric and a
//! privacy requirement, it builds the channel with the least expected
//! loss satisfying the requirement, by linear programming [1,2].
//!
//! Every algorithm is generic over the scalar kind ([`kernel::Scalar`]):
//! `f64`, `f32`, or exact rationals (`Rat`), with which constraints can
//! be verified exactly.
//!
//! # Getting started
//!
//! ```
//! use qif::{Chan, Prob};
//! use qif::measure::{bayes_vuln, min_entropy};
//!
//! let pi = Prob::<f64>::uniform(2);
//! let c: Chan<f64> = "0.8 0.2; 0.3 0.7".parse().unwrap();
//!
//! assert!((bayes_vuln::posterior(&pi, &c).unwrap() - 0.75).abs() < 1e-12);
//! assert!((min_entropy::leakage(&pi, &c).unwrap() - 1.5f64.log2()).abs() < 1e-12);
//! ```
//!
//! The binary, `qif`, synthesizes location-privacy mechanisms on a grid
//! and writes the data of leakage plots for the Crowds protocol; see
//! `qif -h`.
//!
//! # References
//!
//! [1] 2014, "Optimal Geo-Indistinguishable Mechanisms for Location Privacy". _Nicolás E. Bordenabe, Konstantinos Chatzikokolakis, Catuscia Palamidessi_.
//!
//! [2] 2020, "The Science of Quantitative Information Flow". _Mário S. Alvim, Konstantinos Chatzikokolakis, Annabelle McIver, Carroll Morgan, Catuscia Palamidessi, Geoffrey Smith_.
pub mod error;
pub mod kernel;
pub mod rng;
pub mod utils;
pub mod probab;
pub mod channel;
pub mod metric;
pub mod measure;
pub mod utility;
pub mod mechanism;

#[cfg(test)]
mod fixtures;

pub use crate::channel::Chan;
pub use crate::error::{QifError, Result};
pub use crate::kernel::{Rat, Scalar};
pub use crate::metric::Metric;
pub use crate::probab::Prob;
