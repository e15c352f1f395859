//! Metrics, used both as loss functions (utility) and to define
//! metric-based privacy.
//!
//! A `Metric<S, T>` is a shareable distance function over `T` returning
//! scalars of kind `S`. Metrics compose with index-to-point maps and
//! scale by constants; the caller is responsible for starting from a
//! function that satisfies the metric axioms.
//!
//! # Examples
//!
//! ```
//! use qif::metric::{self, geo};
//!
//! // 2-D Euclidean distance between the cells of a 3-wide grid,
//! // with cells of size 10.
//! let euclid = metric::euclidean::<f64>();
//! let loss = 10. * metric::compose(&euclid, geo::cell_to_point(3));
//! assert!((loss.distance(&0, &4) - 10. * 2f64.sqrt()).abs() < 1e-9);
//! ```
pub mod geo;

use std::fmt;
use std::ops::Mul;
use std::sync::Arc;

use crate::kernel::Scalar;
use self::geo::Point;

/// A distance function with a label (used to tag mechanisms).
pub struct Metric<S, T> {
    d: Arc<dyn Fn(&T, &T) -> S + Send + Sync>,
    label: String,
}

impl<S, T> Clone for Metric<S, T> {
    fn clone(&self) -> Metric<S, T> {
        Metric { d: Arc::clone(&self.d), label: self.label.clone() }
    }
}

impl<S, T> fmt::Debug for Metric<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Metric({})", self.label)
    }
}

impl<S: Scalar, T: 'static> Metric<S, T> {
    pub fn new<F>(label: &str, d: F) -> Metric<S, T>
    where F: Fn(&T, &T) -> S + Send + Sync + 'static {
        Metric { d: Arc::new(d), label: label.to_owned() }
    }

    pub fn distance(&self, a: &T, b: &T) -> S {
        (self.d)(a, b)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// `c * d(a, b)`.
    pub fn scale(&self, c: S) -> Metric<S, T> {
        let label = format!("{} * {}", c, self.label);
        let d = Arc::clone(&self.d);
        Metric::new(&label, move |a: &T, b: &T| c.clone() * d(a, b))
    }

    /// The metric `d(map(a), map(b))` over the domain of `map`.
    pub fn compose<U, F>(&self, map: F) -> Metric<S, U>
    where U: 'static, F: Fn(&U) -> T + Send + Sync + 'static {
        let label = format!("{} of mapped points", self.label);
        let d = Arc::clone(&self.d);
        Metric::new(&label, move |a: &U, b: &U| d(&map(a), &map(b)))
    }
}

/// See `Metric::compose`.
pub fn compose<S, T, U, F>(metric: &Metric<S, T>, map: F) -> Metric<S, U>
where S: Scalar, T: 'static, U: 'static, F: Fn(&U) -> T + Send + Sync + 'static {
    metric.compose(map)
}

/// See `Metric::scale`.
pub fn scale<S: Scalar, T: 'static>(metric: &Metric<S, T>, c: S) -> Metric<S, T> {
    metric.scale(c)
}

impl<S: Scalar, T: 'static> Mul<S> for Metric<S, T> {
    type Output = Metric<S, T>;

    fn mul(self, c: S) -> Metric<S, T> {
        self.scale(c)
    }
}

impl<T: 'static> Mul<Metric<f64, T>> for f64 {
    type Output = Metric<f64, T>;

    fn mul(self, metric: Metric<f64, T>) -> Metric<f64, T> {
        metric.scale(self)
    }
}

/// The 0/1 metric: `0` iff `a == b`.
pub fn discrete<S: Scalar, T: PartialEq + 'static>() -> Metric<S, T> {
    Metric::new("discrete", |a: &T, b: &T| if a == b { S::zero() } else { S::one() })
}

/// `|a - b|` over indices.
pub fn absolute<S: Scalar>() -> Metric<S, usize> {
    Metric::new("absolute", |a: &usize, b: &usize| {
        S::from_usize(if a > b { a - b } else { b - a })
    })
}

/// Euclidean distance on the plane.
pub fn euclidean<S: Scalar>() -> Metric<S, Point> {
    Metric::new("euclidean", |a: &Point, b: &Point| {
        S::from_f64((a.x - b.x).hypot(a.y - b.y))
    })
}

/// Manhattan distance on the plane.
pub fn manhattan<S: Scalar>() -> Metric<S, Point> {
    Metric::new("manhattan", |a: &Point, b: &Point| {
        S::from_f64((a.x - b.x).abs() + (a.y - b.y).abs())
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::Rat;
    use num_traits::{One, Zero};

    /// Checks the metric axioms on all pairs/triples of `points`.
    fn check_axioms<T: 'static>(d: &Metric<f64, T>, points: &[T]) {
        for a in points {
            assert_eq!(d.distance(a, a), 0.);
            for b in points {
                assert_eq!(d.distance(a, b), d.distance(b, a));
                assert!(d.distance(a, b) >= 0.);
                for c in points {
                    assert!(d.distance(a, c) <= d.distance(a, b) + d.distance(b, c) + 1e-12);
                }
            }
        }
    }

    #[test]
    fn builtins() {
        let d = discrete::<Rat, usize>();
        assert_eq!(d.distance(&3, &3), Rat::zero());
        assert_eq!(d.distance(&3, &1), Rat::one());

        let d = absolute::<f64>();
        assert_eq!(d.distance(&3, &7), 4.);
        assert_eq!(d.distance(&7, &3), 4.);

        let p = Point::new(0., 0.);
        let q = Point::new(3., 4.);
        assert_eq!(euclidean::<f64>().distance(&p, &q), 5.);
        assert_eq!(manhattan::<f64>().distance(&p, &q), 7.);

        let points = (0..9).map(|c| Point::from_cell(c, 3)).collect::<Vec<_>>();
        check_axioms(&euclidean(), &points);
        check_axioms(&manhattan(), &points);
        check_axioms(&discrete(), &[0usize, 1, 2]);
    }

    #[test]
    fn compose_and_scale() {
        let euclid = euclidean::<f64>();
        let grid = compose(&euclid, geo::cell_to_point(3));
        assert_eq!(grid.distance(&0, &2), 2.);
        assert_eq!(grid.distance(&1, &7), 2.);

        let scaled = 2.5 * grid.clone();
        assert_eq!(scaled.distance(&0, &2), 5.);
        assert_eq!(scale(&grid, 3.).distance(&0, &1), 3.);
        assert_eq!((grid * 4.).distance(&0, &1), 4.);
        check_axioms(&scaled, &(0..9).collect::<Vec<usize>>());

        assert_eq!(scaled.label(), "2.5 * euclidean of mapped points");
    }
}
