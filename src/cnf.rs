use crate::solver::Lit;

/// Description of an input problem in conjunctive normal form: a fixed
/// variable range `1..=var_count` and the original clauses in input order.
///
/// This is the already-parsed form consumed by [`crate::Solver::new`];
/// reading DIMACS or any other text format is the caller's concern.
#[derive(Debug, Default, Clone)]
pub struct Cnf {
    var_count: u32,
    clauses: Vec<Vec<Lit>>,
}

impl Cnf {
    pub fn new(var_count: u32) -> Self {
        Cnf {
            var_count,
            clauses: Vec::new(),
        }
    }

    /// Add a clause given as non-zero signed integers.
    ///
    /// Panics on literal 0, a variable outside `1..=var_count`, or a
    /// clause mentioning the same variable twice (a duplicated literal or
    /// a tautology); the watch scheme relies on clauses never watching one
    /// variable in two places.
    pub fn add_clause<I>(&mut self, lits: I)
    where
        I: IntoIterator<Item = i32>,
    {
        let lits: Vec<Lit> = lits.into_iter().map(Lit::new).collect();

        for (i, lit) in lits.iter().enumerate() {
            assert!(
                lit.var().get() <= self.var_count,
                "variable {} outside the declared range",
                lit.var()
            );
            assert!(
                lits[..i].iter().all(|prev| prev.var() != lit.var()),
                "variable {} repeats within a clause",
                lit.var()
            );
        }

        self.clauses.push(lits);
    }

    pub fn var_count(&self) -> u32 {
        self.var_count
    }

    pub fn clause_count(&self) -> usize {
        self.clauses.len()
    }

    pub fn clauses(&self) -> impl Iterator<Item = &[Lit]> {
        self.clauses.iter().map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_clauses_in_order() {
        let mut cnf = Cnf::new(3);
        cnf.add_clause([1, -2, -3]);
        cnf.add_clause([2, 3, 1]);
        cnf.add_clause([1]);

        assert_eq!(cnf.clause_count(), 3);
        let clauses: Vec<&[Lit]> = cnf.clauses().collect();
        assert_eq!(clauses[0], &[Lit::new(1), Lit::new(-2), Lit::new(-3)][..]);
        assert_eq!(clauses[2], &[Lit::new(1)][..]);
    }

    #[test]
    #[should_panic(expected = "outside the declared range")]
    fn rejects_out_of_range_variables() {
        let mut cnf = Cnf::new(2);
        cnf.add_clause([1, 3]);
    }

    #[test]
    #[should_panic(expected = "repeats within a clause")]
    fn rejects_tautologies() {
        let mut cnf = Cnf::new(2);
        cnf.add_clause([1, -1]);
    }
}
