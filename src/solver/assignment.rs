use super::{clause::ClauseRef, data::VarVec, Lit, Var};

/// Decision record of an assigned variable.
#[derive(Clone, Copy, Debug)]
struct AssignData {
    status: bool,
    level: u32,
    implied_by: Option<ClauseRef>,
}

pub(crate) struct Assignment {
    assignment: VarVec<Option<AssignData>>,
}

impl Assignment {
    pub fn sized(var_count: usize) -> Self {
        Assignment {
            assignment: VarVec::sized(var_count, None),
        }
    }

    pub fn get(&self, lit: Lit) -> Option<bool> {
        self.assignment[lit.var()].map(|var_val| var_val.status == lit.is_pos())
    }

    pub fn is_lit_satisfied(&self, lit: Lit) -> bool {
        self.get(lit) == Some(true)
    }

    pub fn is_lit_unsatisfied(&self, lit: Lit) -> bool {
        self.get(lit) == Some(false)
    }

    pub fn is_var_assigned(&self, v: Var) -> bool {
        self.assignment[v].is_some()
    }

    /// Level at which `v` was assigned, or 0 while unassigned.
    pub fn var_level(&self, v: Var) -> u32 {
        self.assignment[v].map_or(0, |var_val| var_val.level)
    }

    pub fn implied_by(&self, v: Var) -> Option<ClauseRef> {
        self.assignment[v].and_then(|var_val| var_val.implied_by)
    }

    pub fn assign_lit(&mut self, lit: Lit, level: u32, implied_by: Option<ClauseRef>) {
        debug_assert!(!self.is_var_assigned(lit.var()));
        debug_assert!(level > 0);

        self.assignment[lit.var()] = Some(AssignData {
            status: lit.is_pos(),
            level,
            implied_by,
        });
    }

    pub fn unassign_lit(&mut self, lit: Lit) {
        debug_assert!(self.is_var_assigned(lit.var()));

        self.assignment[lit.var()] = None;
    }

    pub fn len(&self) -> usize {
        self.assignment.len()
    }
}
