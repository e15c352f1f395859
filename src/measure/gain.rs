//! Gain functions: how much an adversary gains by guessing `w` when the
//! secret is `x`.
//!
//! Every g-vulnerability in this crate is computed by the one routine
//! `Gain::best_guess`; Bayes vulnerability is the special case of
//! `IdentityGain` (gain 1 for the exact secret, 0 otherwise).
use std::str::FromStr;
use ndarray::prelude::*;

use crate::error::{QifError, Result};
use crate::kernel::{max_of, Scalar};
use crate::utils::parse_matrix;

pub trait Gain<S: Scalar> {
    fn n_guesses(&self) -> usize;
    fn n_secrets(&self) -> usize;
    fn gain(&self, guess: usize, secret: usize) -> S;

    /// `max_w sum_x weights[x] * gain(w, x)`: the value of the best guess
    /// against (unnormalized) weights over secrets.
    fn best_guess(&self, weights: &ArrayView1<S>) -> S {
        let values = (0..self.n_guesses()).map(|w| {
            weights.iter()
                   .enumerate()
                   .fold(S::zero(), |acc, (x, p)| acc + p.clone() * self.gain(w, x))
        }).collect::<Vec<_>>();

        max_of(values.iter()).unwrap_or_else(S::zero)
    }
}

/// The identity gain function over `n` secrets; no matrix is stored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IdentityGain {
    n: usize,
}

impl IdentityGain {
    pub fn new(n: usize) -> IdentityGain {
        IdentityGain { n }
    }
}

impl<S: Scalar> Gain<S> for IdentityGain {
    fn n_guesses(&self) -> usize {
        self.n
    }

    fn n_secrets(&self) -> usize {
        self.n
    }

    fn gain(&self, guess: usize, secret: usize) -> S {
        if guess == secret { S::one() } else { S::zero() }
    }

    /// The best guess is the most likely secret.
    fn best_guess(&self, weights: &ArrayView1<S>) -> S {
        max_of(weights.iter()).unwrap_or_else(S::zero)
    }
}

/// A gain function given as a `n_guesses x n_secrets` matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct GainMatrix<S> {
    g: Array2<S>,
}

impl<S: Scalar> GainMatrix<S> {
    pub fn new(g: Array2<S>) -> GainMatrix<S> {
        GainMatrix { g }
    }

    pub fn from_fn<F>(n_guesses: usize, n_secrets: usize, f: F) -> GainMatrix<S>
    where F: Fn(usize, usize) -> S {
        GainMatrix { g: Array2::from_shape_fn((n_guesses, n_secrets), |(w, x)| f(w, x)) }
    }

    /// Identity gain for `n` secrets, materialized.
    pub fn identity(n: usize) -> GainMatrix<S> {
        GainMatrix { g: Array2::eye(n) }
    }

    /// Identity plus one extra guess ("I don't know") worth 1/2 for every
    /// secret.
    pub fn tiger(n: usize) -> GainMatrix<S> {
        let half = S::one() / (S::one() + S::one());
        GainMatrix::from_fn(n + 1, n, |w, x| {
            if w == n {
                half.clone()
            } else if w == x {
                S::one()
            } else {
                S::zero()
            }
        })
    }

    pub fn as_array(&self) -> &Array2<S> {
        &self.g
    }
}

impl<S: Scalar> Gain<S> for GainMatrix<S> {
    fn n_guesses(&self) -> usize {
        self.g.nrows()
    }

    fn n_secrets(&self) -> usize {
        self.g.ncols()
    }

    fn gain(&self, guess: usize, secret: usize) -> S {
        self.g[[guess, secret]].clone()
    }

    fn best_guess(&self, weights: &ArrayView1<S>) -> S {
        let values = self.g.outer_iter().map(|row| {
            row.iter()
               .zip(weights.iter())
               .fold(S::zero(), |acc, (g, p)| acc + g.clone() * p.clone())
        }).collect::<Vec<_>>();

        max_of(values.iter()).unwrap_or_else(S::zero)
    }
}

impl<S: Scalar> FromStr for GainMatrix<S> {
    type Err = QifError;

    fn from_str(s: &str) -> Result<GainMatrix<S>> {
        Ok(GainMatrix::new(parse_matrix(s)?))
    }
}
