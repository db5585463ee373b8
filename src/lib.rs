//! Core engine of a conflict-driven clause-learning (CDCL) satisfiability
//! reasoner.
//!
//! The crate owns the solver state machine: watched-literal unit
//! propagation, conflict analysis via the first unique implication point,
//! clause learning and non-chronological backtracking. It is a library for
//! an external driver; picking decision variables, restarts, clause
//! deletion and input parsing all happen in the caller.
//!
//! A driving loop looks like this: call [`Solver::decide`] with a literal
//! of the caller's choosing. On conflict it returns an asserting clause;
//! pop levels with [`Solver::undo_decide`] until
//! [`Solver::at_assertion_level`] holds, then register the clause with
//! [`Solver::assert_clause`], which forces its asserting literal and
//! propagates. A returned clause with assertion level 0 (the false clause)
//! never becomes assertable and proves the problem unsatisfiable.

mod cnf;
mod solver;
mod util;

pub use cnf::Cnf;
pub use solver::{ClauseRef, Lit, Solver, Stats, Var};
