//! Mechanisms minimizing the expected loss under a privacy constraint.
//!
//! The variables of the linear program are the entries `C(x, y)` of the
//! channel, bounded in `[0, 1]` and constrained to rows summing to one;
//! the objective is the expected loss `sum_{x,y} pi(x) C(x, y) loss(x, y)`.
//!
//! A bound `V` on the posterior Bayes vulnerability,
//!
//!   sum_y max_x pi(x) C(x, y) <= V,
//!
//! is linearized with one auxiliary variable `z_y` per output:
//! `pi(x) C(x, y) <= z_y` for every `x`, and `sum_y z_y <= V`.
//!
//! The LP is solved in `f64`; the solution is then clamped to `[0, 1]`
//! and converted to the scalar kind, re-deriving the largest entry of
//! each row so that rows sum to one. The privacy constraint may be off by
//! the solver's precision: re-check it with `Rat` if it must hold exactly.
use tracing::{debug, info};

use crate::channel::Chan;
use crate::error::{QifError, Result};
use crate::kernel::Scalar;
use crate::mechanism::lp::{LinearProgram, LpOutcome, Relation, SynthesisOptions};
use crate::mechanism::{decode_channel, Mechanism, MechanismParams, SynthesisKind};
use crate::metric::Metric;
use crate::probab::Prob;

/// Variables and constraints shared by every synthesis: the channel
/// entries, row-major, with their expected loss as cost.
fn channel_program<S: Scalar>(pi: &Prob<S>, n_outputs: usize, loss: &Metric<S, usize>)
        -> Result<LinearProgram> {
    let mut program = LinearProgram::new();
    for x in 0..pi.len() {
        let px = pi.at(x).as_f64();
        for y in 0..n_outputs {
            program.add_var(px * loss.distance(&x, &y).as_f64(), (0., 1.));
        }
    }
    for x in 0..pi.len() {
        let row = (0..n_outputs).map(|y| (x * n_outputs + y, 1.)).collect();
        program.add_constraint(row, Relation::Eq, 1.)?;
    }
    Ok(program)
}

fn check_request<S: Scalar>(pi: &Prob<S>, n_outputs: usize) -> Result<()> {
    pi.check_proper()
      .map_err(|e| QifError::ImproperInput(format!("prior: {}", e)))?;
    if n_outputs == 0 {
        return Err(QifError::InvalidParameter(format!(
            "cannot synthesize a mechanism with {} secrets and {} outputs",
            pi.len(), n_outputs)));
    }
    Ok(())
}

fn solve<S: Scalar>(program: &LinearProgram, params: MechanismParams,
                    options: &SynthesisOptions) -> Result<Mechanism<S>> {
    let channel = match program.solve(options)? {
        LpOutcome::Optimal { objective, values } => {
            info!(expected_loss = objective, "synthesized {}", params);
            decode_channel(&values, params.n_secrets, params.n_outputs)?
        },
        LpOutcome::Infeasible => {
            info!("no mechanism satisfies {}", params.kind);
            Chan::empty()
        },
    };
    Ok(Mechanism { channel, params })
}

/// The mechanism with least expected loss among those with posterior
/// Bayes vulnerability at most `max_vuln`.
///
/// Returns an empty mechanism when no channel meets the bound, i.e. when
/// `max_vuln` is below the prior vulnerability `max_x pi(x)`.
pub fn given_max_bayes_vulnerability<S: Scalar>(pi: &Prob<S>, n_outputs: usize, max_vuln: S,
                                                loss: &Metric<S, usize>)
        -> Result<Mechanism<S>> {
    given_max_bayes_vulnerability_with(pi, n_outputs, max_vuln, loss,
                                       &SynthesisOptions::default())
}

pub fn given_max_bayes_vulnerability_with<S: Scalar>(pi: &Prob<S>, n_outputs: usize,
                                                     max_vuln: S, loss: &Metric<S, usize>,
                                                     options: &SynthesisOptions)
        -> Result<Mechanism<S>> {
    check_request(pi, n_outputs)?;
    let bound = max_vuln.as_f64();
    if !bound.is_finite() {
        return Err(QifError::InvalidParameter(format!(
            "vulnerability bound {}", max_vuln)));
    }

    let mut program = channel_program(pi, n_outputs, loss)?;
    let z = (0..n_outputs).map(|_| program.add_var(0., (0., f64::INFINITY)))
                          .collect::<Vec<_>>();
    for x in 0..pi.len() {
        let px = pi.at(x).as_f64();
        if px <= 0. {
            continue;
        }
        for (y, zy) in z.iter().enumerate() {
            program.add_constraint(vec![(x * n_outputs + y, px), (*zy, -1.)],
                                   Relation::Le, 0.)?;
        }
    }
    program.add_constraint(z.iter().map(|zy| (*zy, 1.)).collect(), Relation::Le, bound)?;
    debug!(secrets = pi.len(), outputs = n_outputs, bound, "max Bayes vulnerability program");

    let params = MechanismParams {
        kind: SynthesisKind::MaxBayesVulnerability { bound },
        loss: loss.label().to_owned(),
        n_secrets: pi.len(),
        n_outputs,
    };
    solve(&program, params, options)
}

/// Same as `given_max_bayes_vulnerability`, with the bound expressed as a
/// minimum posterior Bayes risk (`1 - max_vuln`).
pub fn given_min_bayes_risk<S: Scalar>(pi: &Prob<S>, n_outputs: usize, min_risk: S,
                                       loss: &Metric<S, usize>)
        -> Result<Mechanism<S>> {
    given_min_bayes_risk_with(pi, n_outputs, min_risk, loss, &SynthesisOptions::default())
}

pub fn given_min_bayes_risk_with<S: Scalar>(pi: &Prob<S>, n_outputs: usize, min_risk: S,
                                            loss: &Metric<S, usize>,
                                            options: &SynthesisOptions)
        -> Result<Mechanism<S>> {
    given_max_bayes_vulnerability_with(pi, n_outputs, S::one() - min_risk, loss, options)
}

/// The mechanism with least expected loss among those satisfying
/// `epsilon`-privacy with respect to the metric `privacy` over secrets:
/// `C(x, y) <= e^(epsilon d(x, x')) C(x', y)`.
pub fn given_d_privacy<S: Scalar>(pi: &Prob<S>, n_outputs: usize, epsilon: S,
                                  privacy: &Metric<S, usize>, loss: &Metric<S, usize>)
        -> Result<Mechanism<S>> {
    given_d_privacy_with(pi, n_outputs, epsilon, privacy, loss, &SynthesisOptions::default())
}

pub fn given_d_privacy_with<S: Scalar>(pi: &Prob<S>, n_outputs: usize, epsilon: S,
                                       privacy: &Metric<S, usize>, loss: &Metric<S, usize>,
                                       options: &SynthesisOptions)
        -> Result<Mechanism<S>> {
    check_request(pi, n_outputs)?;
    let eps = epsilon.as_f64();
    if !(eps >= 0.) || !eps.is_finite() {
        return Err(QifError::InvalidParameter(format!("epsilon {}", epsilon)));
    }

    let mut program = channel_program(pi, n_outputs, loss)?;
    for x in 0..pi.len() {
        for x2 in (0..pi.len()).filter(|x2| *x2 != x) {
            let factor = (eps * privacy.distance(&x, &x2).as_f64()).exp();
            if !factor.is_finite() {
                continue;
            }
            for y in 0..n_outputs {
                program.add_constraint(vec![(x * n_outputs + y, 1.),
                                            (x2 * n_outputs + y, -factor)],
                                       Relation::Le, 0.)?;
            }
        }
    }
    debug!(secrets = pi.len(), outputs = n_outputs, eps, "d-privacy program");

    let params = MechanismParams {
        kind: SynthesisKind::DPrivacy { epsilon: eps },
        loss: loss.label().to_owned(),
        n_secrets: pi.len(),
        n_outputs,
    };
    solve(&program, params, options)
}
