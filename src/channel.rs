//! Channels: row-stochastic matrices from secrets to observations.
//!
//! Row `x` of a channel is the distribution of the observable output
//! given secret `x`, so every row is non-negative and sums to one.
//!
//! # Examples
//!
//! ```
//! use qif::channel::Chan;
//! use qif::probab::Prob;
//!
//! let c: Chan<f64> = "0.8 0.2; 0.3 0.7".parse().unwrap();
//! assert_eq!((c.n_rows(), c.n_cols()), (2, 2));
//! assert!(c.is_proper());
//!
//! let pi = Prob::<f64>::uniform(2);
//! let outputs = c.output_distribution(&pi).unwrap();
//! assert!((outputs.at(0) - 0.55).abs() < 1e-12);
//! ```
use std::fmt;
use std::str::FromStr;
use ndarray::prelude::*;

use crate::error::{check_shape, QifError, Result};
use crate::kernel::{equal, less_than_or_eq, sum_of, Scalar};
use crate::probab::Prob;
use crate::rng::QifRng;
use crate::utils::{format_matrix, parse_matrix};

/// A channel matrix with `n_rows()` secrets and `n_cols()` outputs.
#[derive(Clone, Debug, PartialEq)]
pub struct Chan<S> {
    c: Array2<S>,
}

impl<S: Scalar> Chan<S> {
    /// Builds a channel, failing with `MalformedChannel` if some row is
    /// negative or doesn't sum to one.
    pub fn new(c: Array2<S>) -> Result<Chan<S>> {
        let chan = Chan { c };
        chan.check_proper()?;
        Ok(chan)
    }

    pub fn from_rows(rows: Vec<Vec<S>>) -> Result<Chan<S>> {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, Vec::len);
        if let Some(row) = rows.iter().find(|r| r.len() != ncols) {
            return Err(QifError::MalformedChannel(format!(
                "row of length {} in a channel with {} columns", row.len(), ncols)));
        }
        let c = Array::from_shape_vec((nrows, ncols), rows.into_iter().flatten().collect())
                     .map_err(|e| QifError::MalformedChannel(e.to_string()))?;
        Chan::new(c)
    }

    pub(crate) fn new_unchecked(c: Array2<S>) -> Chan<S> {
        Chan { c }
    }

    /// The channel with no rows, returned when no mechanism exists.
    pub fn empty() -> Chan<S> {
        Chan { c: Array2::from_elem((0, 0), S::zero()) }
    }

    pub fn is_empty(&self) -> bool {
        self.c.is_empty()
    }

    /// The identity channel: each secret is revealed.
    pub fn identity(n: usize) -> Chan<S> {
        Chan { c: Array2::eye(n) }
    }

    /// Identity on the first `n_rows` outputs; needs `n_rows <= n_cols`,
    /// otherwise some row would be all zeros.
    pub fn identity_rect(n_rows: usize, n_cols: usize) -> Result<Chan<S>> {
        if n_rows > n_cols {
            return Err(QifError::InvalidShape(format!(
                "identity with {} rows but only {} columns", n_rows, n_cols)));
        }
        let c = Array2::from_shape_fn((n_rows, n_cols),
                                      |(x, y)| if x == y { S::one() } else { S::zero() });
        Ok(Chan { c })
    }

    /// Turns this channel into the identity of the same size; fails on
    /// non-square channels.
    pub fn to_identity(&mut self) -> Result<&mut Chan<S>> {
        if !self.is_square() {
            return Err(QifError::InvalidShape(format!(
                "identity of a {}x{} channel", self.n_rows(), self.n_cols())));
        }
        self.c = Array2::eye(self.n_rows());
        Ok(self)
    }

    /// A single column of ones: the output reveals nothing.
    pub fn no_interference(n: usize) -> Chan<S> {
        Chan { c: Array2::from_elem((n, 1), S::one()) }
    }

    /// A channel whose rows are drawn uniformly from the simplex.
    pub fn randu(n_rows: usize, n_cols: usize, rng: &mut QifRng) -> Chan<S> {
        let entries: Vec<S> = (0..n_rows).flat_map(|_| rng.simplex::<S>(n_cols))
                                         .collect();
        // The shape always matches the number of entries drawn.
        let c = Array::from_shape_vec((n_rows, n_cols), entries)
                     .unwrap_or_else(|_| Array2::from_elem((0, 0), S::zero()));
        Chan { c }
    }

    pub fn n_rows(&self) -> usize {
        self.c.nrows()
    }

    pub fn n_cols(&self) -> usize {
        self.c.ncols()
    }

    pub fn is_square(&self) -> bool {
        self.n_rows() == self.n_cols()
    }

    pub fn at(&self, x: usize, y: usize) -> &S {
        &self.c[[x, y]]
    }

    pub fn row(&self, x: usize) -> ArrayView1<S> {
        self.c.row(x)
    }

    pub fn column(&self, y: usize) -> ArrayView1<S> {
        self.c.column(y)
    }

    pub fn as_array(&self) -> &Array2<S> {
        &self.c
    }

    pub fn view(&self) -> ArrayView2<S> {
        self.c.view()
    }

    pub fn into_array(self) -> Array2<S> {
        self.c
    }

    /// True iff the matrix is square and equal to its transpose.
    pub fn is_symmetric(&self) -> bool {
        self.is_square()
            && (0..self.n_rows()).all(|i| (0..i).all(|j| equal(self.at(i, j), self.at(j, i))))
    }

    /// True if every row is non-negative and sums to one.
    pub fn is_proper(&self) -> bool {
        self.check_proper().is_ok()
    }

    pub fn check_proper(&self) -> Result<()> {
        if self.c.is_empty() {
            return Err(QifError::MalformedChannel("empty channel".into()));
        }
        for (x, row) in self.c.outer_iter().enumerate() {
            if let Some(v) = row.iter().find(|v| !less_than_or_eq(&S::zero(), *v)) {
                return Err(QifError::MalformedChannel(format!(
                    "negative entry {} in row {}", v, x)));
            }
            let total = sum_of(row.iter());
            if !equal(&total, &S::one()) {
                return Err(QifError::MalformedChannel(format!(
                    "row {} sums to {}", x, total)));
            }
        }
        Ok(())
    }

    pub fn is_zero(&self) -> bool {
        self.all(|v| equal(v, &S::zero()))
    }

    pub fn all<F: Fn(&S) -> bool>(&self, pred: F) -> bool {
        self.c.iter().all(pred)
    }

    pub fn any<F: Fn(&S) -> bool>(&self, pred: F) -> bool {
        self.c.iter().any(pred)
    }

    /// The joint distribution `pi(x) * C(x,y)`, as a matrix.
    pub fn joint(&self, pi: &Prob<S>) -> Result<Array2<S>> {
        check_shape("prior size vs channel rows", self.n_rows(), pi.len())?;
        Ok(Array2::from_shape_fn(self.c.dim(),
                                 |(x, y)| pi.at(x).clone() * self.c[[x, y]].clone()))
    }

    /// The distribution on outputs induced by prior `pi`.
    pub fn output_distribution(&self, pi: &Prob<S>) -> Result<Prob<S>> {
        let joint = self.joint(pi)?;
        let outputs = joint.axis_iter(Axis(1))
                           .map(|col| sum_of(col.iter()))
                           .collect::<Vec<_>>();
        Ok(Prob::new_unchecked(Array::from(outputs)))
    }

    /// Cascade: first this channel, then `other` applied to its output.
    pub fn cascade(&self, other: &Chan<S>) -> Result<Chan<S>> {
        check_shape("cascade: outputs of the first vs inputs of the second",
                    self.n_cols(), other.n_rows())?;
        let c = Array2::from_shape_fn((self.n_rows(), other.n_cols()), |(x, z)| {
            (0..self.n_cols()).fold(S::zero(), |acc, y|
                acc + self.c[[x, y]].clone() * other.c[[y, z]].clone())
        });
        Ok(Chan { c })
    }
}

/// Entrywise equality within the kernel's tolerance.
pub fn chan_equal<S: Scalar>(a: &Chan<S>, b: &Chan<S>) -> bool {
    a.c.dim() == b.c.dim() && a.c.iter().zip(b.c.iter()).all(|(x, y)| equal(x, y))
}

impl<S: Scalar> FromStr for Chan<S> {
    type Err = QifError;

    fn from_str(s: &str) -> Result<Chan<S>> {
        let c = parse_matrix(s)
                    .map_err(|e| QifError::MalformedChannel(e.to_string()))?;
        Chan::new(c)
    }
}

impl<S: Scalar> fmt::Display for Chan<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", format_matrix(&self.c.view()))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use crate::kernel::Rat;

    fn special_channels_are_proper<S: Scalar>() {
        let mut rng = QifRng::seed_from_u64(3);
        for n in &[1, 2, 4, 10] {
            assert!(Chan::<S>::identity(*n).is_proper());
            assert!(Chan::<S>::no_interference(*n).is_proper());
            assert!(Chan::<S>::randu(*n, n + 3, &mut rng).is_proper());
        }
    }

    #[test]
    fn constructors_are_proper() {
        special_channels_are_proper::<f64>();
        special_channels_are_proper::<f32>();
        special_channels_are_proper::<Rat>();
        assert!(Chan::<f64>::randu(100, 100, &mut QifRng::seed_from_u64(5)).is_proper());
    }

    #[test]
    fn identity_shapes() {
        let c = Chan::<f64>::identity_rect(2, 3).unwrap();
        assert_eq!(c.as_array(), &array![[1., 0., 0.], [0., 1., 0.]]);
        assert!(c.is_proper());
        assert!(matches!(Chan::<f64>::identity_rect(3, 2), Err(QifError::InvalidShape(_))));

        let mut c: Chan<f64> = "0.8 0.2; 0.3 0.7".parse().unwrap();
        c.to_identity().unwrap();
        assert!(chan_equal(&c, &Chan::identity(2)));

        let mut c: Chan<f64> = "0.5 0.25 0.25".parse().unwrap();
        assert!(matches!(c.to_identity(), Err(QifError::InvalidShape(_))));
    }

    #[test]
    fn predicates() {
        let c: Chan<f64> = "0.8 0.2; 0.3 0.7".parse().unwrap();
        assert!(!c.is_symmetric());
        assert!(Chan::<f64>::identity(4).is_symmetric());
        assert!(!Chan::<f64>::no_interference(4).is_symmetric());
        let s: Chan<f64> = "0.5 0.5; 0.5 0.5".parse().unwrap();
        assert!(s.is_symmetric());

        assert!(c.all(|v| *v > 0.));
        assert!(c.any(|v| *v == 0.7));
        assert!(!c.any(|v| *v > 0.9));
        assert!(!c.is_zero());
        assert!(Chan::new_unchecked(Array2::<f64>::zeros((2, 2))).is_zero());
    }

    #[test]
    fn malformed() {
        assert!(matches!("0.8 0.3; 0.3 0.7".parse::<Chan<f64>>(),
                         Err(QifError::MalformedChannel(_))));
        assert!(matches!("1.5 -0.5".parse::<Chan<f64>>(),
                         Err(QifError::MalformedChannel(_))));
        assert!(matches!("1 0; 1".parse::<Chan<f64>>(),
                         Err(QifError::MalformedChannel(_))));
        assert!(matches!(Chan::<f64>::from_rows(vec![vec![1.], vec![0.5, 0.5]]),
                         Err(QifError::MalformedChannel(_))));
        assert!(!Chan::<f64>::empty().is_proper());
    }

    #[test]
    fn text_round_trip() {
        let text = "1/2 1/2\n1/3 2/3";
        let c: Chan<Rat> = text.parse().unwrap();
        assert_eq!(c.to_string(), text);

        let c: Chan<f64> = "0.8 0.2; 0.3 0.7".parse().unwrap();
        let again: Chan<f64> = c.to_string().parse().unwrap();
        assert!(chan_equal(&c, &again));
    }

    #[test]
    fn joint_and_outputs() {
        let c: Chan<Rat> = "0.8 0.2; 0.3 0.7".parse().unwrap();
        let pi: Prob<Rat> = "0.25 0.75".parse().unwrap();
        let outputs = c.output_distribution(&pi).unwrap();
        assert_eq!(outputs.to_string(), "17/40 23/40");
        assert!(outputs.is_proper());

        let pi = Prob::<Rat>::uniform(3);
        assert!(matches!(c.joint(&pi), Err(QifError::InvalidShape(_))));
    }

    #[test]
    fn cascade() {
        let c: Chan<f64> = "0.8 0.2; 0.3 0.7".parse().unwrap();
        let id = Chan::identity(2);
        assert!(chan_equal(&c.cascade(&id).unwrap(), &c));

        let merged = c.cascade(&Chan::no_interference(2)).unwrap();
        assert!(chan_equal(&merged, &Chan::no_interference(2)));
        assert!(c.cascade(&Chan::identity(3)).is_err());
    }
}
