//! Bayes risk and the security measures derived from it.
//!
//! In the documentation, we write R* to indicate the (posterior) Bayes
//! risk, and G to indicate the error of random guessing (i.e., the prior
//! Bayes risk, 1 - max priors).
//!
//! # References
//! [1] M. S. Alvim et al. "Additive and multiplicative notions of leakage,
//!     and their capacities." CSF, 2014.
//! [2] G. Cherubin "Bayes, not Naïve: Security Bounds on Website
//!     Fingerprinting Defenses." PoPETS, 2017
use crate::channel::Chan;
use crate::error::{QifError, Result};
use crate::kernel::{equal, Scalar};
use crate::measure::bayes_vuln;
use crate::probab::Prob;

/// G = `1 - max_x pi(x)`.
pub fn prior<S: Scalar>(pi: &Prob<S>) -> Result<S> {
    Ok(S::one() - bayes_vuln::prior(pi)?)
}

/// R* = `1 - sum_y max_x pi(x) C(x, y)`.
pub fn posterior<S: Scalar>(pi: &Prob<S>, c: &Chan<S>) -> Result<S> {
    Ok(S::one() - bayes_vuln::posterior(pi, c)?)
}

pub fn add_leakage<S: Scalar>(pi: &Prob<S>, c: &Chan<S>) -> Result<S> {
    additive_leakage(posterior(pi, c)?, prior(pi)?)
}

pub fn mult_leakage<S: Scalar>(pi: &Prob<S>, c: &Chan<S>) -> Result<S> {
    multiplicative_leakage(posterior(pi, c)?, prior(pi)?)
}

/// Bayes security measure R*/G, as defined in [2]: 1 means no leakage,
/// 0 means the secret is revealed.
pub fn security_measure<S: Scalar>(pi: &Prob<S>, c: &Chan<S>) -> Result<S> {
    bayes_security_measure(posterior(pi, c)?, prior(pi)?)
}

fn check_random_guessing<S: Scalar>(random_guessing: &S) -> Result<()> {
    if equal(random_guessing, &S::zero()) {
        Err(QifError::NumericDomain("random guessing error cannot be 0".into()))
    } else {
        Ok(())
    }
}

/// Computes the Multiplicative Leakage, as defined in [1].
pub fn multiplicative_leakage<S: Scalar>(bayes_risk: S, random_guessing: S) -> Result<S> {
    check_random_guessing(&random_guessing)?;
    Ok((S::one() - bayes_risk) / (S::one() - random_guessing))
}

/// Computes the Additive Leakage, as defined in [1].
pub fn additive_leakage<S: Scalar>(bayes_risk: S, random_guessing: S) -> Result<S> {
    Ok(random_guessing - bayes_risk)
}

/// Computes the Bayes security measure, as defined in [2].
pub fn bayes_security_measure<S: Scalar>(bayes_risk: S, random_guessing: S) -> Result<S> {
    check_random_guessing(&random_guessing)?;
    Ok(bayes_risk / random_guessing)
}

/// Computes the Min-entropy leakage from risks.
pub fn min_entropy_leakage<S: Scalar>(bayes_risk: S, random_guessing: S) -> Result<S> {
    check_random_guessing(&random_guessing)?;
    Ok((S::one() - bayes_risk).log2() - (S::one() - random_guessing).log2())
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;
    use crate::kernel::{less_than_or_eq, Rat};
    use crate::rng::QifRng;
    use float_cmp::approx_eq;

    #[test]
    fn c1_uniform_prior() {
        let pi = Prob::<f64>::uniform(2);
        let c: Chan<f64> = "0.8 0.2; 0.3 0.7".parse().unwrap();
        assert!(equal(&posterior(&pi, &c).unwrap(), &0.25));
        assert!(equal(&prior(&pi).unwrap(), &0.5));
        assert!(equal(&add_leakage(&pi, &c).unwrap(), &0.25));
        assert!(equal(&mult_leakage(&pi, &c).unwrap(), &1.5));
        assert!(equal(&security_measure(&pi, &c).unwrap(), &0.5));

        let pi = Prob::<Rat>::uniform(2);
        let c: Chan<Rat> = "0.8 0.2; 0.3 0.7".parse().unwrap();
        assert_eq!(posterior(&pi, &c).unwrap().to_string(), "1/4");
    }

    fn fixtures_for<S: Scalar>() {
        let quarter = S::parse_scalar("0.25").unwrap();
        assert!(equal(&posterior(&unif_2(), &c1()).unwrap(), &quarter));
        assert!(equal(&prior(&pi1::<S>()).unwrap(), &S::parse_scalar("0.2").unwrap()));
        assert!(equal(&posterior(&dirac_4(), &c2()).unwrap(), &S::zero()));
        assert!(equal(&posterior(&unif_4(), &c2()).unwrap(),
                      &S::parse_scalar("0.5").unwrap()));
    }

    #[test]
    fn all_kinds() {
        fixtures_for::<f64>();
        fixtures_for::<f32>();
        fixtures_for::<Rat>();
    }

    #[test]
    fn risk_is_a_probability() {
        let mut rng = QifRng::seed_from_u64(4);
        for n in 2..8 {
            let pi = Prob::<f64>::randu(n, &mut rng);
            let c = Chan::<f64>::randu(n, 3, &mut rng);
            let r = posterior(&pi, &c).unwrap();
            assert!(less_than_or_eq(&0., &r) && less_than_or_eq(&r, &1.));

            assert!(equal(&posterior(&pi, &Chan::identity(n)).unwrap(), &0.));
            let noint = posterior(&pi, &Chan::no_interference(n)).unwrap();
            assert!(equal(&noint, &(1. - pi.max())));
        }
    }

    #[test]
    fn measures_from_risks() {
        assert!(approx_eq!(f64, multiplicative_leakage(0.25, 0.5).unwrap(), 1.5));
        assert!(approx_eq!(f64, additive_leakage(0.25, 0.5).unwrap(), 0.25));
        assert!(approx_eq!(f64, bayes_security_measure(0.25, 0.5).unwrap(), 0.5));
        assert!(approx_eq!(f64, min_entropy_leakage(0.25, 0.5).unwrap(), 1.5f64.log2()));
        assert!(matches!(bayes_security_measure(0.25, 0.),
                         Err(QifError::NumericDomain(_))));
    }
}
