//! Discrete probability distributions over secrets.
//!
//! A `Prob` is a vector of non-negative scalars summing to one (within
//! the kernel's tolerance). Distributions are only built through checked
//! constructors; there are no mutating operations.
use std::fmt;
use std::str::FromStr;
use ndarray::prelude::*;

use crate::error::{QifError, Result};
use crate::kernel::{equal, less_than_or_eq, max_of, sum_of, Scalar};
use crate::rng::QifRng;
use crate::utils::{format_vector, parse_vector};

/// A probability distribution over `len()` secrets.
#[derive(Clone, Debug, PartialEq)]
pub struct Prob<S> {
    p: Array1<S>,
}

impl<S: Scalar> Prob<S> {
    /// Builds a distribution, failing with `MalformedDistribution` if
    /// entries are negative or don't sum to one.
    pub fn new(p: Array1<S>) -> Result<Prob<S>> {
        let pi = Prob { p };
        pi.check_proper()?;
        Ok(pi)
    }

    pub fn from_vec(v: Vec<S>) -> Result<Prob<S>> {
        Prob::new(Array::from(v))
    }

    pub(crate) fn new_unchecked(p: Array1<S>) -> Prob<S> {
        Prob { p }
    }

    /// Uniform distribution over `n` secrets.
    pub fn uniform(n: usize) -> Prob<S> {
        let each = S::one() / S::from_usize(n.max(1));
        Prob { p: Array::from_elem(n, each) }
    }

    /// Point mass on secret `index`.
    pub fn dirac(n: usize, index: usize) -> Result<Prob<S>> {
        if index >= n {
            return Err(QifError::InvalidShape(format!(
                "dirac index {} out of range for {} secrets", index, n)));
        }
        let mut p = Array::from_elem(n, S::zero());
        p[index] = S::one();
        Ok(Prob { p })
    }

    /// Secret 0 has probability `p`, the others share `1-p` equally.
    pub fn biased(n: usize, p: S) -> Result<Prob<S>> {
        if n == 0 {
            return Err(QifError::InvalidShape("biased prior over 0 secrets".into()));
        }
        let rest = if n > 1 {
            (S::one() - p.clone()) / S::from_usize(n - 1)
        } else {
            S::zero()
        };
        let mut v = Array::from_elem(n, rest);
        v[0] = p;
        Prob::new(v)
    }

    /// A distribution drawn uniformly at random from the simplex.
    pub fn randu(n: usize, rng: &mut QifRng) -> Prob<S> {
        Prob { p: Array::from(rng.simplex::<S>(n)) }
    }

    /// True if all entries are non-negative and sum to one.
    pub fn is_proper(&self) -> bool {
        !self.p.is_empty()
            && self.p.iter().all(|x| less_than_or_eq(&S::zero(), x))
            && equal(&sum_of(self.p.iter()), &S::one())
    }

    pub fn check_proper(&self) -> Result<()> {
        if self.p.is_empty() {
            return Err(QifError::MalformedDistribution("empty distribution".into()));
        }
        if let Some(x) = self.p.iter().find(|x| !less_than_or_eq(&S::zero(), *x)) {
            return Err(QifError::MalformedDistribution(format!("negative entry {}", x)));
        }
        let total = sum_of(self.p.iter());
        if !equal(&total, &S::one()) {
            return Err(QifError::MalformedDistribution(format!("entries sum to {}", total)));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.p.len()
    }

    pub fn is_empty(&self) -> bool {
        self.p.is_empty()
    }

    pub fn at(&self, x: usize) -> &S {
        &self.p[x]
    }

    pub fn iter(&self) -> impl Iterator<Item = &S> {
        self.p.iter()
    }

    pub fn as_array(&self) -> &Array1<S> {
        &self.p
    }

    pub fn view(&self) -> ArrayView1<S> {
        self.p.view()
    }

    /// Largest probability (i.e., the prior Bayes vulnerability).
    pub fn max(&self) -> S {
        max_of(self.p.iter()).unwrap_or_else(S::zero)
    }
}

impl<S: Scalar> FromStr for Prob<S> {
    type Err = QifError;

    fn from_str(s: &str) -> Result<Prob<S>> {
        let p = parse_vector(s)
                    .map_err(|e| QifError::MalformedDistribution(e.to_string()))?;
        Prob::new(p)
    }
}

impl<S: Scalar> fmt::Display for Prob<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", format_vector(&self.p.view()))
    }
}
