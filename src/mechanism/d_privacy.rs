//! Closed-form metric-private mechanisms, and privacy checks.
//!
//! A channel is `epsilon`-private with respect to a metric `d` over
//! secrets (d-privacy; with a geographic metric, geo-indistinguishability)
//! if for all secrets `x, x'` and outputs `y`:
//!
//!   C(x, y) <= e^(epsilon d(x, x')) C(x', y).
//!
//! With the discrete metric this is standard `epsilon`-local differential
//! privacy.
use ordered_float::OrderedFloat;

use crate::channel::Chan;
use crate::error::{QifError, Result};
use crate::kernel::{less_than_or_eq, Scalar};
use crate::metric::Metric;

fn check_epsilon<S: Scalar>(epsilon: &S) -> Result<()> {
    let eps = epsilon.as_f64();
    if eps >= 0. && eps.is_finite() {
        Ok(())
    } else {
        Err(QifError::InvalidParameter(format!("epsilon {}", epsilon)))
    }
}

fn check_size(n: usize) -> Result<()> {
    if n == 0 {
        Err(QifError::InvalidParameter("mechanism over no secrets".into()))
    } else {
        Ok(())
    }
}

fn pow<S: Scalar>(base: &S, exp: usize) -> S {
    (0..exp).fold(S::one(), |acc, _| acc * base.clone())
}

/// Randomized response over `n` values: report the secret with
/// probability `e^eps / (e^eps + n - 1)`, any other value with
/// probability `1 / (e^eps + n - 1)`.
pub fn randomized_response<S: Scalar>(n: usize, epsilon: S) -> Result<Chan<S>> {
    check_size(n)?;
    check_epsilon(&epsilon)?;

    let e = epsilon.exp();
    let total = e.clone() + S::from_usize(n - 1);
    let on = e / total.clone();
    let off = S::one() / total;
    Chan::from_rows((0..n).map(|x| {
        (0..n).map(|y| if x == y { on.clone() } else { off.clone() }).collect()
    }).collect())
}

/// The truncated geometric mechanism over `0..n`, with
/// `alpha = e^(-eps)`:
///
///   C(x, y) = (1 - alpha) / (1 + alpha) * alpha^|x - y|   for 0 < y < n-1
///   C(x, y) = alpha^|x - y| / (1 + alpha)                for y = 0, n-1
///
/// It is `eps`-private with respect to `|x - x'|`.
pub fn geometric<S: Scalar>(n: usize, epsilon: S) -> Result<Chan<S>> {
    check_size(n)?;
    check_epsilon(&epsilon)?;
    if n == 1 {
        return Ok(Chan::identity(1));
    }

    let alpha = (-epsilon).exp();
    let edge = S::one() / (S::one() + alpha.clone());
    let inner = (S::one() - alpha.clone()) / (S::one() + alpha.clone());
    Chan::from_rows((0..n).map(|x| {
        (0..n).map(|y| {
            let decay = pow(&alpha, if x > y { x - y } else { y - x });
            if y == 0 || y == n - 1 {
                edge.clone() * decay
            } else {
                inner.clone() * decay
            }
        }).collect()
    }).collect())
}

/// The exponential mechanism over `n` values, with outputs weighted by
/// `e^(-eps/2 d(x, y))`. It is `eps`-private with respect to `d`.
pub fn exponential<S: Scalar>(n: usize, epsilon: S, metric: &Metric<S, usize>)
        -> Result<Chan<S>> {
    check_size(n)?;
    check_epsilon(&epsilon)?;

    let half = epsilon / S::from_usize(2);
    Chan::from_rows((0..n).map(|x| {
        let weights = (0..n).map(|y| (-(half.clone() * metric.distance(&x, &y))).exp())
                            .collect::<Vec<_>>();
        let total = weights.iter().fold(S::zero(), |acc, w| acc + w.clone());
        weights.into_iter().map(|w| w / total.clone()).collect()
    }).collect())
}

/// Checks `C(x, y) <= e^(eps d(x, x')) C(x', y)` for all `x, x', y`,
/// within the kernel's tolerance.
pub fn is_private<S: Scalar>(c: &Chan<S>, epsilon: S, metric: &Metric<S, usize>) -> bool {
    let n = c.n_rows();
    (0..n).all(|x| {
        (0..n).filter(|x2| *x2 != x).all(|x2| {
            let factor = (epsilon.clone() * metric.distance(&x, &x2)).exp();
            (0..c.n_cols()).all(|y| {
                less_than_or_eq(c.at(x, y), &(factor.clone() * c.at(x2, y).clone()))
            })
        })
    })
}

/// The smallest `eps` for which `c` is `eps`-private with respect to
/// `metric`; infinite if there is none.
pub fn smallest_epsilon<S: Scalar>(c: &Chan<S>, metric: &Metric<S, usize>) -> f64 {
    let n = c.n_rows();
    let mut ratios = Vec::new();
    for x in 0..n {
        for x2 in (0..n).filter(|x2| *x2 != x) {
            let d = metric.distance(&x, &x2).as_f64();
            for y in 0..c.n_cols() {
                let (a, b) = (c.at(x, y).as_f64(), c.at(x2, y).as_f64());
                if a <= 0. {
                    continue;
                }
                let eps = if b <= 0. || d <= 0. {
                    if d <= 0. && a <= b { 0. } else { f64::INFINITY }
                } else {
                    (a / b).ln() / d
                };
                ratios.push(OrderedFloat(eps));
            }
        }
    }
    ratios.into_iter().max().map_or(0., |e| e.into_inner().max(0.))
}


#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use crate::kernel::Rat;
    use crate::metric;

    #[test]
    fn randomized_response_probabilities() {
        let ln2 = 2f64.ln();
        let c = randomized_response(3, ln2).unwrap();
        assert!(approx_eq!(f64, *c.at(0, 0), 0.5, epsilon = 1e-12));
        assert!(approx_eq!(f64, *c.at(0, 1), 0.25, epsilon = 1e-12));

        let d = metric::discrete();
        assert!(is_private(&c, ln2, &d));
        assert!(!is_private(&c, ln2 / 2., &d));
        assert!(approx_eq!(f64, smallest_epsilon(&c, &d), ln2, epsilon = 1e-12));

        assert!(matches!(randomized_response(3, -1.), Err(QifError::InvalidParameter(_))));
        assert!(matches!(randomized_response::<f64>(0, 1.), Err(QifError::InvalidParameter(_))));
    }

    #[test]
    fn geometric_mechanism() {
        let c = geometric(6, 0.5).unwrap();
        assert!(c.is_proper());
        let d = metric::absolute();
        assert!(is_private(&c, 0.5, &d));
        assert!(approx_eq!(f64, smallest_epsilon(&c, &d), 0.5, epsilon = 1e-9));

        let exact = geometric(5, Rat::parse_scalar("1/2").unwrap()).unwrap();
        assert!(exact.is_proper());
        assert_eq!(geometric(1, 1.).unwrap(), Chan::identity(1));
    }

    #[test]
    fn exponential_mechanism() {
        let d = metric::absolute();
        let c = exponential(5, 1., &d).unwrap();
        assert!(c.is_proper());
        assert!(is_private(&c, 1., &d));
        assert!(smallest_epsilon(&c, &d) <= 1. + 1e-9);

        let exact = exponential(4, Rat::from_usize(1), &metric::absolute()).unwrap();
        assert!(exact.is_proper());
    }

    #[test]
    fn extremes() {
        let d = metric::discrete();
        assert_eq!(smallest_epsilon(&Chan::<f64>::identity(3), &d), f64::INFINITY);
        assert_eq!(smallest_epsilon(&Chan::<f64>::no_interference(3), &d), 0.);
        assert!(is_private(&Chan::<f64>::no_interference(3), 0., &d));
        assert!(!is_private(&Chan::<f64>::identity(3), 10., &d));
    }
}
