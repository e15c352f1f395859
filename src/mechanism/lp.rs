//! Linear programs handed to the LP solver.
//!
//! A `LinearProgram` stores its constraints as sparse rows, so that the
//! synthesis of a mechanism over `n` secrets only materializes the
//! non-zero coefficients. Solving is delegated to `minilp`; when a
//! timeout or a cancellation token is given, the solve runs in a worker
//! thread which is polled until it finishes, the deadline passes, or the
//! token is cancelled.
//!
//! `minilp` cannot be interrupted once its simplex has started. A worker
//! whose caller gave up checks for that before it builds and before it
//! solves the problem; past that point it runs to completion and its
//! result is dropped. Workers hold one of a fixed number of slots (one
//! per available CPU) until they exit, so abandoned solves cannot pile
//! up: a new solve waits for a slot, within its own deadline.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Condvar, Mutex};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use minilp::{ComparisonOp, LinearExpr, OptimizationDirection, Problem};
use tracing::{debug, warn};

use crate::error::{QifError, Result};

/// How often a worker solve is checked for a deadline or cancellation.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Solver threads alive, including those whose caller gave up.
static RUNNING: Mutex<usize> = Mutex::new(0);
static FINISHED: Condvar = Condvar::new();

/// Most solver threads alive at once.
pub fn max_workers() -> usize {
    thread::available_parallelism().map_or(1, |n| n.get())
}

/// Solver threads currently alive.
pub fn running_workers() -> usize {
    *RUNNING.lock().unwrap_or_else(|e| e.into_inner())
}

/// A slot held by a solver thread, released when it is dropped.
struct WorkerSlot;

impl WorkerSlot {
    fn acquire(options: &SynthesisOptions, deadline: Option<Instant>) -> Result<WorkerSlot> {
        let mut running = RUNNING.lock().unwrap_or_else(|e| e.into_inner());
        while *running >= max_workers() {
            options.check(deadline)?;
            debug!(running = *running, "waiting for a solver slot");
            running = FINISHED.wait_timeout(running, next_wait(deadline))
                              .map(|(guard, _)| guard)
                              .unwrap_or_else(|e| e.into_inner().0);
        }
        *running += 1;
        Ok(WorkerSlot)
    }
}

impl Drop for WorkerSlot {
    fn drop(&mut self) {
        let mut running = RUNNING.lock().unwrap_or_else(|e| e.into_inner());
        *running = running.saturating_sub(1);
        FINISHED.notify_one();
    }
}

fn next_wait(deadline: Option<Instant>) -> Duration {
    match deadline {
        Some(d) => d.saturating_duration_since(Instant::now()).min(POLL_INTERVAL),
        None => POLL_INTERVAL,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Relation {
    Eq,
    Le,
    Ge,
}

impl From<Relation> for ComparisonOp {
    fn from(r: Relation) -> ComparisonOp {
        match r {
            Relation::Eq => ComparisonOp::Eq,
            Relation::Le => ComparisonOp::Le,
            Relation::Ge => ComparisonOp::Ge,
        }
    }
}

/// `sum_i coef_i * x_i  (=, <=, >=)  rhs`.
#[derive(Clone, Debug, PartialEq)]
pub struct Constraint {
    pub terms: Vec<(usize, f64)>,
    pub relation: Relation,
    pub rhs: f64,
}

/// A minimization problem over bounded variables.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LinearProgram {
    objective: Vec<f64>,
    bounds: Vec<(f64, f64)>,
    constraints: Vec<Constraint>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LpOutcome {
    /// Optimal objective value, and the value of each variable (in the
    /// order they were added).
    Optimal { objective: f64, values: Vec<f64> },
    Infeasible,
}

/// A handle to abort a running synthesis from another thread.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Limits on an LP solve.
///
/// Either limit makes the solve run in a worker thread. The caller gets
/// its error as soon as a limit is hit; a worker already inside the
/// simplex finishes in the background, holding its slot until then (see
/// `max_workers`).
#[derive(Clone, Debug, Default)]
pub struct SynthesisOptions {
    /// Give up with `SolverTimeout` after this long.
    pub timeout: Option<Duration>,
    /// Give up with `Cancelled` once this token is cancelled.
    pub cancel: Option<CancelToken>,
}

impl SynthesisOptions {
    pub fn with_timeout(timeout: Duration) -> SynthesisOptions {
        SynthesisOptions { timeout: Some(timeout), cancel: None }
    }

    pub fn with_cancel(cancel: CancelToken) -> SynthesisOptions {
        SynthesisOptions { timeout: None, cancel: Some(cancel) }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().map_or(false, CancelToken::is_cancelled)
    }

    /// Fails if the token is cancelled or `deadline` has passed.
    fn check(&self, deadline: Option<Instant>) -> Result<()> {
        if self.is_cancelled() {
            warn!("LP solve cancelled");
            return Err(QifError::Cancelled);
        }
        if let (Some(d), Some(t)) = (deadline, self.timeout) {
            if Instant::now() >= d {
                warn!(timeout = ?t, "LP solve timed out");
                return Err(QifError::SolverTimeout(t));
            }
        }
        Ok(())
    }
}

impl LinearProgram {
    pub fn new() -> LinearProgram {
        LinearProgram::default()
    }

    /// Adds a variable with objective coefficient `cost`, returning its
    /// index.
    pub fn add_var(&mut self, cost: f64, bounds: (f64, f64)) -> usize {
        self.objective.push(cost);
        self.bounds.push(bounds);
        self.objective.len() - 1
    }

    pub fn add_constraint(&mut self, terms: Vec<(usize, f64)>, relation: Relation, rhs: f64)
            -> Result<()> {
        if let Some((var, _)) = terms.iter().find(|(var, _)| *var >= self.n_vars()) {
            return Err(QifError::InvalidShape(format!(
                "constraint on variable {} of a program with {} variables",
                var, self.n_vars())));
        }
        self.constraints.push(Constraint { terms, relation, rhs });
        Ok(())
    }

    pub fn n_vars(&self) -> usize {
        self.objective.len()
    }

    pub fn n_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Number of non-zero constraint coefficients.
    pub fn n_coefficients(&self) -> usize {
        self.constraints.iter().map(|c| c.terms.len()).sum()
    }

    /// Solves the program, honouring the limits in `options`.
    pub fn solve(&self, options: &SynthesisOptions) -> Result<LpOutcome> {
        debug!(vars = self.n_vars(), constraints = self.n_constraints(),
               coefficients = self.n_coefficients(), "solving LP");

        if options.is_cancelled() {
            return Err(QifError::Cancelled);
        }
        if options.timeout.is_none() && options.cancel.is_none() {
            return self.solve_blocking();
        }

        let deadline = options.timeout.and_then(|t| Instant::now().checked_add(t));
        let slot = WorkerSlot::acquire(options, deadline)?;

        let (tx, rx) = mpsc::channel();
        let abandoned = Arc::new(AtomicBool::new(false));
        let program = self.clone();
        let flag = abandoned.clone();
        thread::Builder::new()
            .name("qif-lp".into())
            .spawn(move || {
                let _slot = slot;
                // The receiver may be gone after a timeout.
                let _ = tx.send(program.solve_unless(&flag));
            })
            .map_err(|e| QifError::Solver(format!("cannot spawn solver thread: {}", e)))?;

        loop {
            match rx.recv_timeout(next_wait(deadline)) {
                Ok(outcome) => return outcome,
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    return Err(QifError::Solver("solver thread panicked".into()));
                },
                Err(mpsc::RecvTimeoutError::Timeout) => {},
            }
            if let Err(e) = options.check(deadline) {
                abandoned.store(true, Ordering::SeqCst);
                return Err(e);
            }
        }
    }

    fn solve_blocking(&self) -> Result<LpOutcome> {
        self.solve_unless(&AtomicBool::new(false))
    }

    /// Solves the program, unless `abandoned` is set before the simplex
    /// starts.
    fn solve_unless(&self, abandoned: &AtomicBool) -> Result<LpOutcome> {
        if abandoned.load(Ordering::SeqCst) {
            return Err(QifError::Cancelled);
        }
        let mut problem = Problem::new(OptimizationDirection::Minimize);
        let vars = self.objective.iter()
                                 .zip(&self.bounds)
                                 .map(|(cost, bounds)| problem.add_var(*cost, *bounds))
                                 .collect::<Vec<_>>();

        for constraint in &self.constraints {
            let mut expr = LinearExpr::empty();
            for (var, coef) in &constraint.terms {
                expr.add(vars[*var], *coef);
            }
            problem.add_constraint(expr, constraint.relation.into(), constraint.rhs);
        }

        if abandoned.load(Ordering::SeqCst) {
            debug!("LP solve abandoned before the simplex");
            return Err(QifError::Cancelled);
        }
        match problem.solve() {
            Ok(solution) => Ok(LpOutcome::Optimal {
                objective: solution.objective(),
                values: vars.iter().map(|v| *solution.var_value(*v)).collect(),
            }),
            Err(minilp::Error::Infeasible) => Ok(LpOutcome::Infeasible),
            Err(e) => Err(QifError::Solver(e.to_string())),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    /// min -x - y s.t. x + 2y <= 4, 3x + y <= 6, 0 <= x, y.
    fn small_program() -> LinearProgram {
        let mut lp = LinearProgram::new();
        let x = lp.add_var(-1., (0., f64::INFINITY));
        let y = lp.add_var(-1., (0., f64::INFINITY));
        lp.add_constraint(vec![(x, 1.), (y, 2.)], Relation::Le, 4.).unwrap();
        lp.add_constraint(vec![(x, 3.), (y, 1.)], Relation::Le, 6.).unwrap();
        lp
    }

    #[test]
    fn optimal() {
        let lp = small_program();
        assert_eq!((lp.n_vars(), lp.n_constraints(), lp.n_coefficients()), (2, 2, 4));

        match lp.solve(&SynthesisOptions::default()).unwrap() {
            LpOutcome::Optimal { objective, values } => {
                assert!(approx_eq!(f64, objective, -2.8, epsilon = 1e-9));
                assert!(approx_eq!(f64, values[0], 1.6, epsilon = 1e-9));
                assert!(approx_eq!(f64, values[1], 1.2, epsilon = 1e-9));
            },
            LpOutcome::Infeasible => panic!("expected an optimal solution"),
        }
    }

    #[test]
    fn infeasible() {
        let mut lp = LinearProgram::new();
        let x = lp.add_var(1., (0., 1.));
        lp.add_constraint(vec![(x, 1.)], Relation::Ge, 2.).unwrap();
        assert_eq!(lp.solve(&SynthesisOptions::default()).unwrap(), LpOutcome::Infeasible);
    }

    #[test]
    fn unknown_variable() {
        let mut lp = LinearProgram::new();
        lp.add_var(1., (0., 1.));
        assert!(matches!(lp.add_constraint(vec![(1, 1.)], Relation::Eq, 1.),
                         Err(QifError::InvalidShape(_))));
    }

    #[test]
    fn worker_thread_solve() {
        let lp = small_program();
        let options = SynthesisOptions::with_timeout(Duration::from_secs(60));
        assert!(matches!(lp.solve(&options).unwrap(), LpOutcome::Optimal { .. }));
    }

    /// An assignment-like program with `n * n` variables, large enough
    /// that solving it takes well over a millisecond.
    fn large_program(n: usize) -> LinearProgram {
        let mut lp = LinearProgram::new();
        for i in 0..n {
            for j in 0..n {
                lp.add_var(((i * 7 + j * 13) % 17) as f64 + 1., (0., 1.));
            }
        }
        for i in 0..n {
            lp.add_constraint((0..n).map(|j| (i * n + j, 1.)).collect(), Relation::Eq, 1.)
              .unwrap();
            lp.add_constraint((0..n).map(|j| (j * n + i, 1.)).collect(), Relation::Le, 2.)
              .unwrap();
        }
        lp
    }

    #[test]
    fn timeout_during_solve() {
        let lp = large_program(80);
        let timeout = Duration::from_micros(1);
        let options = SynthesisOptions::with_timeout(timeout);
        match lp.solve(&options) {
            Err(QifError::SolverTimeout(t)) => assert_eq!(t, timeout),
            other => panic!("expected a timeout, got {:?}", other),
        }
    }

    #[test]
    fn cancelled_during_solve() {
        let lp = large_program(100);
        let token = CancelToken::new();
        let canceller = {
            let token = token.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(1));
                token.cancel();
            })
        };
        let outcome = lp.solve(&SynthesisOptions::with_cancel(token));
        canceller.join().unwrap();
        assert!(matches!(outcome, Err(QifError::Cancelled)));
    }

    #[test]
    fn abandoned_workers_are_bounded() {
        let lp = large_program(80);
        let options = SynthesisOptions::with_timeout(Duration::from_micros(1));
        for _ in 0..max_workers() + 2 {
            assert!(matches!(lp.solve(&options), Err(QifError::SolverTimeout(_))));
            assert!(running_workers() <= max_workers());
        }
    }

    #[test]
    fn cancelled_before_solving() {
        let token = CancelToken::new();
        let options = SynthesisOptions::with_cancel(token.clone());
        token.cancel();
        assert!(matches!(small_program().solve(&options), Err(QifError::Cancelled)));
    }
}
