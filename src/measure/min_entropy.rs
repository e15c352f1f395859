//! Min-entropy and min-entropy leakage.
//!
//! Min-entropy leakage is g-leakage under the identity gain function, so
//! it is computed by `g_vuln::leakage` and carries the same guards.
//!
//! # Examples
//!
//! ```
//! use qif::channel::Chan;
//! use qif::probab::Prob;
//! use qif::measure::min_entropy;
//!
//! let pi: Prob<f64> = "0.25 0.25 0.25 0.25".parse().unwrap();
//! let leakage = min_entropy::leakage(&pi, &Chan::identity(4)).unwrap();
//! assert!((leakage - 2.).abs() < 1e-12);
//! ```
use crate::channel::Chan;
use crate::error::Result;
use crate::kernel::{clamp_negligible, Scalar};
use crate::measure::gain::IdentityGain;
use crate::measure::{bayes_vuln, g_vuln};
use crate::probab::Prob;

/// `-log2 V(pi)`.
pub fn prior<S: Scalar>(pi: &Prob<S>) -> Result<S> {
    Ok(clamp_negligible(-bayes_vuln::prior(pi)?.log2()))
}

/// `-log2 V(pi, C)`.
pub fn posterior<S: Scalar>(pi: &Prob<S>, c: &Chan<S>) -> Result<S> {
    Ok(clamp_negligible(-bayes_vuln::posterior(pi, c)?.log2()))
}

/// `log2(V(pi, C) / V(pi))`.
pub fn leakage<S: Scalar>(pi: &Prob<S>, c: &Chan<S>) -> Result<S> {
    g_vuln::leakage(&IdentityGain::new(pi.len()), pi, c)
}

/// Min-capacity: `log2` of the multiplicative Bayes capacity.
pub fn capacity<S: Scalar>(c: &Chan<S>) -> Result<S> {
    Ok(clamp_negligible(bayes_vuln::mult_capacity(c)?.log2()))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{equal, Rat};
    use crate::measure::gain::GainMatrix;
    use crate::rng::QifRng;

    /// Logarithms of exact kinds go through `f64`, so compare them there.
    fn assert_close<S: Scalar>(a: &S, b: &S) {
        if S::is_exact() {
            assert!(equal(&a.as_f64(), &b.as_f64()), "{} != {}", a, b);
        } else {
            assert!(equal(a, b), "{} != {}", a, b);
        }
    }

    fn identity_and_no_interference<S: Scalar>() {
        for text in &["0.2 0.8", "0.25 0.75", "0.75 0.25", "0.5 0.5"] {
            let pi: Prob<S> = text.parse().unwrap();
            let full = -pi.max().log2();
            assert_close(&leakage(&pi, &Chan::identity(2)).unwrap(), &full);
            assert_close(&leakage(&pi, &Chan::no_interference(2)).unwrap(), &S::zero());
        }
        let pi: Prob<S> = "0.1 0.1 0.1 0.7".parse().unwrap();
        assert_close(&leakage(&pi, &Chan::identity(4)).unwrap(), &-pi.max().log2());

        // A point mass has nothing left to leak.
        let pi = Prob::<S>::dirac(4, 2).unwrap();
        assert_eq!(leakage(&pi, &Chan::identity(4)).unwrap(), S::zero());
        assert_eq!(prior(&pi).unwrap(), S::zero());
    }

    #[test]
    fn special_channels() {
        identity_and_no_interference::<f64>();
        identity_and_no_interference::<f32>();
        identity_and_no_interference::<Rat>();
    }

    #[test]
    fn equals_g_leakage_with_identity_gain() {
        let mut rng = QifRng::seed_from_u64(21);
        for n in 2..10 {
            let pi = Prob::<f64>::randu(n, &mut rng);
            let c = Chan::<f64>::randu(n, n + 1, &mut rng);
            let me = leakage(&pi, &c).unwrap();
            let gl = g_vuln::leakage(&GainMatrix::identity(n), &pi, &c).unwrap();
            assert!(equal(&me, &gl));
        }
    }

    #[test]
    fn entropies_and_capacity() {
        let pi = Prob::<f64>::uniform(4);
        let c: Chan<f64> = "0.5 0.5 0; 0 0.5 0.5; 0.5 0 0.5; 1 0 0".parse().unwrap();
        assert!(equal(&prior(&pi).unwrap(), &2.));
        let post = posterior(&pi, &c).unwrap();
        assert!(equal(&(prior(&pi).unwrap() - post), &leakage(&pi, &c).unwrap()));

        assert!(equal(&capacity(&Chan::<f64>::identity(8)).unwrap(), &3.));
        assert!(equal(&capacity(&Chan::<f64>::no_interference(8)).unwrap(), &0.));
        // Leakage under the uniform prior reaches capacity.
        assert!(equal(&leakage(&pi, &c).unwrap(), &capacity(&c).unwrap()));
    }
}
