//! Utility of a mechanism, measured as the expected loss it causes.
use crate::channel::Chan;
use crate::error::Result;
use crate::kernel::Scalar;
use crate::measure::g_vuln::check_channel;
use crate::metric::Metric;
use crate::probab::Prob;

/// Expected distance between the secret and the reported output:
/// `sum_{x,y} pi(x) C(x, y) loss(x, y)`.
///
/// Secrets and outputs are both indices into the same domain, so `loss`
/// is a metric over indices (e.g., a grid metric composed with
/// `geo::cell_to_point`).
pub fn expected_distance<S: Scalar>(loss: &Metric<S, usize>, pi: &Prob<S>, c: &Chan<S>)
        -> Result<S> {
    check_channel(pi, c)?;

    let mut total = S::zero();
    for x in 0..c.n_rows() {
        for y in 0..c.n_cols() {
            let cxy = c.at(x, y);
            if cxy.is_zero() {
                continue;
            }
            total = total + pi.at(x).clone() * cxy.clone() * loss.distance(&x, &y);
        }
    }
    Ok(total)
}
