use tracing::debug;

use super::{
    clause::ClauseRef,
    data::VarVec,
    trail::{Trail, TrailReason},
    Lit, Solver, Var,
};

/// Scratch fields for conflict analysis. Only meaningful while
/// [`Solver::analyze_conflict`] runs; reset at the start of each run.
#[derive(Default)]
pub(crate) struct AnalyzeState {
    /// Position of each current-level variable within the trail suffix.
    order: VarVec<u32>,

    /// Immediate dominator within the current-level implication subgraph.
    dominator: VarVec<Option<Var>>,

    /// Variables already collected into the clause under construction.
    seen: VarVec<bool>,

    /// New learned 1UIP clause which is under construction.
    new_clause: Vec<Lit>,
}

impl AnalyzeState {
    fn reset(&mut self, var_count: usize) {
        if self.seen.len() != var_count {
            self.order = VarVec::sized(var_count, 0);
            self.dominator = VarVec::sized(var_count, None);
            self.seen = VarVec::sized(var_count, false);
        } else {
            self.dominator.fill(None);
            self.seen.fill(false);
        }
        self.new_clause.clear();
    }

    /// Meeting point of two dominator chains. Walking the chain of the
    /// vertex with the larger suffix position strictly decreases that
    /// position, so the walk terminates where the chains join.
    fn intersect(&self, mut a: Var, mut b: Var) -> Var {
        while a != b {
            if self.order[a] > self.order[b] {
                a = self.dominator[a].expect("dominator chains reach the decision");
            } else {
                b = self.dominator[b].expect("dominator chains reach the decision");
            }
        }
        a
    }

    /// Whether `v`'s dominator chain contains `target`.
    fn chain_passes_through(&self, v: Var, target: Var) -> bool {
        let mut w = self.dominator[v].expect("suffix vertices have dominators");
        loop {
            if w == target {
                return true;
            }
            if self.order[w] <= self.order[target] {
                return false;
            }
            w = self.dominator[w].expect("dominator chains reach the decision");
        }
    }

    /// Fold `with` into a running dominator intersection.
    fn meet(&self, acc: Option<Var>, with: Var) -> Var {
        match acc {
            None => with,
            Some(d) => self.intersect(with, d),
        }
    }
}

/// Collect the reason literals assigned below the conflict level into the
/// clause under construction, deduplicated per variable.
fn collect_lower_reasons(
    state: &mut AnalyzeState,
    trail: &Trail,
    level: u32,
    lits: &[Lit],
    assertion_level: &mut u32,
) {
    for &q in lits {
        let q_level = trail.var_level(q.var());
        debug_assert!(q_level > 0, "reason literals are assigned");

        if q_level == level || state.seen[q.var()] {
            continue;
        }
        state.seen[q.var()] = true;
        state.new_clause.push(q);
        *assertion_level = (*assertion_level).max(q_level);
    }
}

impl Solver {
    /// Compute the asserting clause of the recorded conflict: the first
    /// unique implication point of the current level, found as the
    /// contradiction's dominator, negated and joined with the lower-level
    /// reason literals on the conflict side of the cut.
    ///
    /// Returns the false clause when no current-level vertex can be cut
    /// at: the conflict is at the root level (the problem is refuted), or
    /// the level has no assignments at all.
    pub(crate) fn analyze_conflict(&mut self) -> ClauseRef {
        let record = self.conflict.expect("no conflict to analyze");
        let level = self.trail.current_level();
        debug_assert_eq!(record.level, level);

        if level == 1 {
            debug!("conflict at the root level, the problem is unsatisfiable");
            self.root_conflict = true;
            return ClauseRef::FALSE;
        }

        let start = self.trail.level_start();
        if start == self.trail.len() {
            // The contradicted literal was established at an earlier level.
            return ClauseRef::FALSE;
        }

        let state = &mut self.analyze_state;
        state.reset(self.trail.total_vars());

        // Number the current-level suffix in assignment order.
        for (i, elem) in self.trail.trail()[start..].iter().enumerate() {
            let var = elem.lit.var();
            state.order[var] = i as u32;
            state.dominator[var] = None;
        }

        // The first vertex of the level roots the subgraph; usually the
        // decision, or the asserted literal when the level was rebuilt.
        let root_var = self.trail.trail()[start].lit.var();
        state.dominator[root_var] = Some(root_var);

        // A single pass in trail order computes immediate dominators:
        // every current-level reason literal of a vertex was assigned
        // earlier, so its own dominator is already final.
        for elem in &self.trail.trail()[start + 1..] {
            let var = elem.lit.var();
            let reason = match elem.reason {
                TrailReason::Propagated { cls } => cls,
                TrailReason::Decision => unreachable!("a decision opens its level"),
            };

            let mut dom = state.dominator[var];
            for &p in self.clause_db.lits(reason) {
                let p_var = p.var();
                if p_var == var || self.trail.var_level(p_var) != level {
                    continue;
                }
                dom = Some(state.meet(dom, p_var));
            }
            state.dominator[var] = dom;
        }

        // The contradiction's dominator is the UIP.
        let mut uip = None;
        for &p in self.clause_db.lits(record.clause) {
            let p_var = p.var();
            if self.trail.var_level(p_var) != level {
                continue;
            }
            uip = Some(state.meet(uip, p_var));
        }
        let uip = uip.expect("a conflicting clause has a current-level literal");
        debug!("1UIP of the conflict is variable {uip}");

        // The asserting literal is the currently false literal of the UIP.
        let pos = Lit::from(uip);
        let asserting_lit = if self.trail.is_lit_satisfied(pos) {
            -pos
        } else {
            pos
        };
        state.new_clause.push(asserting_lit);
        let mut assertion_level = 1;

        collect_lower_reasons(
            state,
            &self.trail,
            level,
            self.clause_db.lits(record.clause),
            &mut assertion_level,
        );

        // Walk the suffix from the end toward the UIP; vertices whose
        // dominator chain passes through the UIP lie on the conflict side
        // of the cut and contribute their lower-level reason literals.
        for elem in self.trail.trail()[start..].iter().rev() {
            let var = elem.lit.var();
            if var == uip {
                break;
            }
            if !state.chain_passes_through(var, uip) {
                continue;
            }

            let reason = match elem.reason {
                TrailReason::Propagated { cls } => cls,
                TrailReason::Decision => unreachable!("the walk breaks at the level's first vertex"),
            };
            collect_lower_reasons(
                state,
                &self.trail,
                level,
                self.clause_db.lits(reason),
                &mut assertion_level,
            );
        }

        debug!(
            "learned 1UIP clause {:?}, asserting at level {assertion_level}",
            state.new_clause
        );
        self.clause_db
            .insert_learned(&self.analyze_state.new_clause, assertion_level)
    }
}
