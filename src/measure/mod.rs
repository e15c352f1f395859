//! Leakage measures.
//!
//! Every measure takes a prior `pi` over secrets and, for posterior
//! quantities and leakages, a channel `C` from secrets to outputs. They
//! fail with `InvalidShape` if `pi` and `C` (or a gain function) disagree
//! on the number of secrets, and with `ImproperInput` if either operand
//! is not a proper distribution/channel.
//!
//! Vulnerabilities are all computed by the g-vulnerability routines in
//! `g_vuln`; `bayes_vuln`, `bayes_risk` and `min_entropy` instantiate
//! them with the identity gain.
pub mod gain;
pub mod g_vuln;
pub mod bayes_vuln;
pub mod bayes_risk;
pub mod min_entropy;
pub mod shannon;
pub mod guessing;

pub use self::gain::{Gain, GainMatrix, IdentityGain};
