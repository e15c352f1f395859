//! Explicit random number context for the randomized constructors
//! (`Prob::randu`, `Chan::randu`).
//!
//! Build one `QifRng` at process start (from a seed, for reproducible
//! runs, or from entropy) and pass it to whatever needs randomness.
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::Exp1;

use crate::kernel::Scalar;

#[derive(Clone, Debug)]
pub struct QifRng {
    rng: ChaCha8Rng,
}

impl QifRng {
    pub fn seed_from_u64(seed: u64) -> QifRng {
        QifRng { rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    pub fn from_entropy() -> QifRng {
        QifRng { rng: ChaCha8Rng::from_entropy() }
    }

    /// A uniform draw in [0, 1).
    pub fn uniform(&mut self) -> f64 {
        self.rng.gen()
    }

    /// A point drawn uniformly from the `n`-simplex (i.e., a Dirichlet(1)
    /// sample), normalized in the scalar kind itself so that the entries
    /// sum to one up to the kind's own precision.
    pub fn simplex<S: Scalar>(&mut self, n: usize) -> Vec<S> {
        let draws: Vec<S> = (0..n).map(|_| {
                                        let e: f64 = self.rng.sample(Exp1);
                                        S::from_f64(e)
                                    })
                                  .collect();
        let total = draws.iter().fold(S::zero(), |acc, x| acc + x.clone());
        draws.into_iter().map(|x| x / total.clone()).collect()
    }
}
