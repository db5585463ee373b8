use super::{assignment::Assignment, clause::ClauseRef, Lit, Var};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TrailReason {
    /// Literal was decided.
    Decision,

    /// Literal was forced because `cls` had no other unfalsified literal.
    Propagated { cls: ClauseRef },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TrailElement {
    pub(crate) lit: Lit,
    pub(crate) reason: TrailReason,
}

/// Ordered record of every literal currently set true, together with the
/// decision level counter. Level 1 is the root level holding consequences
/// of the input's unit clauses; the first decision raises the level to 2.
pub(crate) struct Trail {
    trail: Vec<TrailElement>,
    assignment: Assignment,
    level: u32,
}

impl Trail {
    pub fn sized(var_count: usize) -> Self {
        Trail {
            trail: Vec::new(),
            assignment: Assignment::sized(var_count),
            level: 1,
        }
    }

    pub fn current_level(&self) -> u32 {
        self.level
    }

    pub fn new_level(&mut self) {
        self.level += 1;
    }

    pub fn retreat_level(&mut self) {
        debug_assert!(self.level > 1);
        self.level -= 1;
    }

    pub fn len(&self) -> usize {
        self.trail.len()
    }

    pub fn total_vars(&self) -> usize {
        self.assignment.len()
    }

    pub fn get(&self, idx: usize) -> Option<&TrailElement> {
        self.trail.get(idx)
    }

    pub fn trail(&self) -> &[TrailElement] {
        &self.trail
    }

    pub fn lit_value(&self, lit: Lit) -> Option<bool> {
        self.assignment.get(lit)
    }

    pub fn is_lit_satisfied(&self, lit: Lit) -> bool {
        self.assignment.is_lit_satisfied(lit)
    }

    pub fn is_lit_unsatisfied(&self, lit: Lit) -> bool {
        self.assignment.is_lit_unsatisfied(lit)
    }

    pub fn is_var_assigned(&self, v: Var) -> bool {
        self.assignment.is_var_assigned(v)
    }

    pub fn var_level(&self, v: Var) -> u32 {
        self.assignment.var_level(v)
    }

    pub fn implied_by(&self, v: Var) -> Option<ClauseRef> {
        self.assignment.implied_by(v)
    }

    /// Set `lit` true at the current level and append it to the trail.
    /// Requires the variable to be unassigned.
    pub fn assign_lit(&mut self, lit: Lit, reason: TrailReason) {
        let implied_by = match reason {
            TrailReason::Decision => None,
            TrailReason::Propagated { cls } => Some(cls),
        };

        self.assignment.assign_lit(lit, self.level, implied_by);
        self.trail.push(TrailElement { lit, reason });
    }

    /// Index of the first trail entry assigned at the current level.
    /// Equals `len()` when the current level has no assignments. Levels
    /// are non-decreasing along the trail, so the current level is a
    /// contiguous suffix.
    pub fn level_start(&self) -> usize {
        let mut start = self.trail.len();
        while start > 0 {
            let var = self.trail[start - 1].lit.var();
            if self.assignment.var_level(var) != self.level {
                break;
            }
            start -= 1;
        }
        start
    }

    /// Detach every trail entry of the current level and clear its
    /// variable's decision record. The level counter is untouched.
    pub fn unwind_current_level(&mut self) {
        while let Some(elem) = self.trail.last() {
            let lit = elem.lit;
            if self.assignment.var_level(lit.var()) != self.level {
                break;
            }
            self.assignment.unassign_lit(lit);
            self.trail.pop();
        }
    }
}
