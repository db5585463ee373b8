mod analyze;
mod assignment;
mod clause;
mod data;
mod log;
mod propagate;
mod trail;
mod watch;

use tracing::debug;

use analyze::AnalyzeState;
use clause::ClauseDb;
pub use clause::ClauseRef;
use data::LitVec;
pub use data::{Lit, Var};
use propagate::PropagationResult;
use trail::{Trail, TrailReason};
use watch::Watch;

use crate::cnf::Cnf;

/// Various counters that might be of interest.
#[derive(Debug, Default)]
pub struct Stats {
    pub decisions: u64,
    pub propagations: u64,
    pub conflicts: u64,
}

/// Pending conflict, kept beside the trail instead of a synthetic
/// contradiction entry on it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ConflictRecord {
    pub clause: ClauseRef,
    pub level: u32,
}

/// Core state of a conflict-driven clause-learning reasoner.
///
/// The state is driven from outside: the caller picks decision literals,
/// backtracks with [`Solver::undo_decide`] when a decision reports an
/// asserting clause, and registers that clause at its assertion level with
/// [`Solver::assert_clause`]. Branching and restart policy live entirely
/// in the caller.
pub struct Solver {
    clause_db: ClauseDb,

    /// Clauses watching each literal.
    watches: LitVec<Vec<Watch>>,

    /// Original clauses containing each literal.
    occurs: LitVec<Vec<ClauseRef>>,

    /// Asserted learned clauses containing each literal.
    learned_occurs: LitVec<Vec<ClauseRef>>,

    trail: Trail,

    // Where on the trail, should the unit propagation continue.
    unpropagated_lit_pos: usize,

    /// Conflict reported by the latest propagation, until it is undone.
    conflict: Option<ConflictRecord>,

    /// Propagation conflicted at the root level. The problem is refuted;
    /// every later decision reports the false clause.
    root_conflict: bool,

    /// Various stats that might be of interest
    stats: Stats,

    /// Scratch data for analyzing conflicts. This field is mainly used in
    /// analyze.rs and reset for each new conflict analysis.
    analyze_state: AnalyzeState,
}

impl Solver {
    /// Build the solver state for `cnf`: variable table, clause store,
    /// occurrence and watch lists. Unit clauses of the input are forced at
    /// the root level and propagated; a conflict there flags the state as
    /// refuted without failing construction.
    pub fn new(cnf: &Cnf) -> Self {
        let var_count = cnf.var_count() as usize;

        let mut solver = Solver {
            clause_db: ClauseDb::new(),
            watches: LitVec::sized(var_count, Vec::new()),
            occurs: LitVec::sized(var_count, Vec::new()),
            learned_occurs: LitVec::sized(var_count, Vec::new()),
            trail: Trail::sized(var_count),
            unpropagated_lit_pos: 0,
            conflict: None,
            root_conflict: false,
            stats: Stats::default(),
            analyze_state: AnalyzeState::default(),
        };

        for lits in cnf.clauses() {
            let cref = solver.clause_db.insert_original(lits);
            for &lit in lits {
                solver.occurs[lit].push(cref);
            }

            match lits.len() {
                0 => {
                    if solver.conflict.is_none() {
                        solver.record_conflict(cref);
                    }
                }
                1 => solver.force_root_unit(cref),
                _ => solver.attach_watches(cref),
            }
        }

        if solver.conflict.is_some() {
            solver.root_conflict = true;
        } else if let PropagationResult::Contradiction(_) = solver.propagate() {
            solver.root_conflict = true;
        }

        solver
    }

    fn force_root_unit(&mut self, cref: ClauseRef) {
        if self.conflict.is_some() {
            return;
        }

        let lit = self.clause_db.lits(cref)[0];
        match self.trail.lit_value(lit) {
            Some(true) => self.clause_db.subsume(cref),
            Some(false) => self.record_conflict(cref),
            None => {
                self.trail
                    .assign_lit(lit, TrailReason::Propagated { cls: cref });
                self.clause_db.subsume(cref);
            }
        }
    }

    /// Watch the first and last literal of `cref`.
    fn attach_watches(&mut self, cref: ClauseRef) {
        let lits = self.clause_db.lits(cref);
        let last = lits.len() as u32 - 1;
        let (first_lit, last_lit) = (lits[0], lits[last as usize]);

        self.clause_db.set_watches(cref, [0, last]);
        self.watches[first_lit].push(Watch { clause: cref });
        self.watches[last_lit].push(Watch { clause: cref });
    }

    pub(crate) fn record_conflict(&mut self, cref: ClauseRef) {
        debug!(
            "conflict in clause {} at level {}",
            cref.id(),
            self.trail.current_level()
        );
        self.stats.conflicts += 1;
        self.conflict = Some(ConflictRecord {
            clause: cref,
            level: self.trail.current_level(),
        });
    }

    /// Raise a new decision level and set `lit` true, propagating to fixed
    /// point. Returns `None` when the state stays consistent, the
    /// asserting clause of the conflict otherwise, and the false clause
    /// when the problem is already refuted.
    pub fn decide(&mut self, lit: Lit) -> Option<ClauseRef> {
        if self.root_conflict {
            return Some(ClauseRef::FALSE);
        }

        self.log_state();
        self.stats.decisions += 1;
        self.trail.new_level();
        self.clause_db.push_boundary();
        debug!("decision {lit} opens level {}", self.trail.current_level());

        match self.trail.lit_value(lit) {
            Some(true) => None,
            Some(false) => {
                // Contradicts an implication of an earlier level, so
                // analysis finds no current-level vertex to cut at.
                let implier = self
                    .trail
                    .implied_by(lit.var())
                    .unwrap_or(ClauseRef::FALSE);
                self.record_conflict(implier);
                Some(self.analyze_conflict())
            }
            None => {
                self.trail.assign_lit(lit, TrailReason::Decision);
                match self.propagate() {
                    PropagationResult::Done => None,
                    PropagationResult::Contradiction(_) => Some(self.analyze_conflict()),
                }
            }
        }
    }

    /// Propagate all pending consequences at the current level. Returns
    /// `false` if the state is contradictory; the asserting clause is then
    /// available through [`Solver::build_asserting_clause`].
    pub fn unit_resolution(&mut self) -> bool {
        if self.root_conflict || self.conflict.is_some() {
            return false;
        }
        matches!(self.propagate(), PropagationResult::Done)
    }

    /// Undo every assignment and subsumption mark of the current level.
    /// The level itself stays open.
    pub fn undo_unit_resolution(&mut self) {
        self.trail.unwind_current_level();
        self.clause_db.unwind_to_boundary(false);
        self.unpropagated_lit_pos = self.trail.len();
        self.clear_stale_conflict();
    }

    /// Undo the current level entirely and drop back to the previous one.
    pub fn undo_decide(&mut self) {
        debug_assert!(
            self.trail.current_level() > 1,
            "the root level cannot be undone"
        );

        self.trail.unwind_current_level();
        self.clause_db.unwind_to_boundary(true);
        self.trail.retreat_level();
        self.unpropagated_lit_pos = self.trail.len();
        self.clear_stale_conflict();

        debug!("undid decision, back at level {}", self.trail.current_level());

        #[cfg(debug_assertions)]
        {
            self.check_watches();
            self.check_trail();
        }
    }

    /// A conflict whose level was unwound refers to assignments that no
    /// longer exist. Root conflicts are permanent.
    fn clear_stale_conflict(&mut self) {
        if let Some(record) = self.conflict {
            if record.level >= self.trail.current_level() && !self.root_conflict {
                self.conflict = None;
            }
        }
    }

    /// Build the asserting clause of the pending conflict. Requires that
    /// the latest [`Solver::decide`], [`Solver::assert_clause`] or
    /// [`Solver::unit_resolution`] reported a conflict that has not been
    /// undone.
    pub fn build_asserting_clause(&mut self) -> ClauseRef {
        self.analyze_conflict()
    }

    /// Register a learned clause, force its asserting literal and
    /// propagate. Must be called at the clause's assertion level. Returns
    /// `None` when the state stays consistent; otherwise the next
    /// asserting clause, or the false clause when the conflict is at the
    /// root level.
    pub fn assert_clause(&mut self, cref: ClauseRef) -> Option<ClauseRef> {
        assert!(
            self.at_assertion_level(cref),
            "clause asserted away from its assertion level"
        );
        debug_assert!(self.clause_db.is_learned(cref));

        self.clause_db.register_asserted(cref);

        let lits = self.clause_db.lits(cref);
        let asserting = lits[0];
        let len = lits.len();
        for &lit in lits {
            self.learned_occurs[lit].push(cref);
        }

        if len >= 2 {
            self.attach_watches(cref);
        }

        debug!(
            "asserting clause {} at level {}",
            cref.id(),
            self.trail.current_level()
        );

        match self.trail.lit_value(asserting) {
            Some(true) => {
                self.clause_db.subsume(cref);
                None
            }
            Some(false) => {
                self.record_conflict(cref);
                Some(self.analyze_conflict())
            }
            None => {
                self.trail
                    .assign_lit(asserting, TrailReason::Propagated { cls: cref });
                self.clause_db.subsume(cref);
                match self.propagate() {
                    PropagationResult::Done => None,
                    PropagationResult::Contradiction(_) => Some(self.analyze_conflict()),
                }
            }
        }
    }

    /// Whether `cref` has become assertable: its assertion level equals
    /// the current level.
    pub fn at_assertion_level(&self, cref: ClauseRef) -> bool {
        self.clause_db.assertion_level(cref) == self.trail.current_level()
    }

    /// The singleton clause representing an unrecoverable conflict. Its
    /// assertion level is 0, so it never becomes assertable.
    pub fn false_clause(&self) -> ClauseRef {
        ClauseRef::FALSE
    }

    pub fn var_count(&self) -> usize {
        self.trail.total_vars()
    }

    pub fn original_clause_count(&self) -> usize {
        self.clause_db.original_count()
    }

    /// Number of learned clauses registered by [`Solver::assert_clause`].
    pub fn learned_clause_count(&self) -> usize {
        self.clause_db.asserted_count()
    }

    /// Clause identity for a clause id; original clauses carry ids
    /// `1..=original_clause_count`, learned clauses follow.
    pub fn clause_by_id(&self, id: usize) -> ClauseRef {
        self.clause_db.ref_for_id(id)
    }

    pub fn clause_lits(&self, cref: ClauseRef) -> &[Lit] {
        self.clause_db.lits(cref)
    }

    /// Assertion level of a learned clause; 0 for the false clause and
    /// for original clauses.
    pub fn assertion_level(&self, cref: ClauseRef) -> u32 {
        self.clause_db.assertion_level(cref)
    }

    /// Whether `cref` is currently marked satisfied by one of its
    /// literals. The mark is reverted on undo.
    pub fn clause_subsumed(&self, cref: ClauseRef) -> bool {
        self.clause_db.is_subsumed(cref)
    }

    pub fn current_level(&self) -> u32 {
        self.trail.current_level()
    }

    pub fn is_assigned(&self, v: Var) -> bool {
        self.trail.is_var_assigned(v)
    }

    /// Whether `lit` is assigned and true.
    pub fn lit_true(&self, lit: Lit) -> bool {
        self.trail.is_lit_satisfied(lit)
    }

    /// Whether every clause mentioning `v` is currently subsumed, making
    /// the variable irrelevant to the residual problem.
    pub fn irrelevant(&self, v: Var) -> bool {
        let pos = Lit::from(v);
        let neg = -pos;

        self.occurs[pos]
            .iter()
            .chain(self.occurs[neg].iter())
            .chain(self.learned_occurs[pos].iter())
            .chain(self.learned_occurs[neg].iter())
            .all(|&cref| self.clause_db.is_subsumed(cref))
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }
}

#[cfg(debug_assertions)]
impl Solver {
    /// Every unsubsumed clause of size >= 2 is watched by exactly two
    /// distinct literals, each holding the clause on its watch list
    /// exactly once, and nothing else watches it.
    pub(crate) fn check_watches(&self) {
        for cref in self.clause_db.iter_refs() {
            let lits = self.clause_db.lits(cref);

            let Some([wa, wb]) = self.clause_db.watches(cref) else {
                // Unwatched: unit or empty originals, or learned clauses
                // built but not asserted.
                let on_any_list = self
                    .watches
                    .iter()
                    .flatten()
                    .any(|watch| watch.clause == cref);
                assert!(!on_any_list, "unwatched clause {} on a watch list", cref.id());
                continue;
            };

            assert_ne!(wa, wb);
            let total = self
                .watches
                .iter()
                .flatten()
                .filter(|watch| watch.clause == cref)
                .count();
            assert_eq!(total, 2, "clause {} must sit on two watch lists", cref.id());

            for pos in [wa, wb] {
                let lit = lits[pos as usize];
                let on_list = self.watches[lit]
                    .iter()
                    .filter(|watch| watch.clause == cref)
                    .count();
                assert_eq!(on_list, 1, "watch of clause {} out of place", cref.id());
            }
        }
    }

    /// Trail entries are unique per variable, recorded with a positive
    /// level, and every implied entry's reason clause forces it: the
    /// entry's literal is in the clause and all other literals were
    /// falsified earlier.
    pub(crate) fn check_trail(&self) {
        let mut position: data::VarVec<Option<usize>> =
            data::VarVec::sized(self.trail.total_vars(), None);

        for (idx, elem) in self.trail.trail().iter().enumerate() {
            let var = elem.lit.var();
            assert!(position[var].is_none(), "variable {var} twice on the trail");
            position[var] = Some(idx);

            assert!(self.trail.is_lit_satisfied(elem.lit));
            assert!(self.trail.var_level(var) > 0);

            if let TrailReason::Propagated { cls } = elem.reason {
                let lits = self.clause_db.lits(cls);
                assert!(lits.contains(&elem.lit));
                for &other in lits {
                    if other == elem.lit {
                        continue;
                    }
                    assert!(self.trail.is_lit_unsatisfied(other));
                    let other_pos =
                        position[other.var()].expect("reason literals precede their consequence");
                    assert!(other_pos < idx);
                }
            }
        }
    }
}
