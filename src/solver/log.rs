use tracing::debug;

use super::{
    trail::{Trail, TrailReason},
    Lit, Solver,
};

const RED: &str = "\u{1b}[31m";
const GREEN: &str = "\u{1b}[32m";
const END: &str = "\u{1b}[0m";

impl Solver {
    #[allow(unused)]
    pub(crate) fn log_state(&self) {
        #[cfg(debug_assertions)]
        for cref in self.clause_db.iter_refs() {
            let cls_str = self.trail.fmt_clause(self.clause_db.lits(cref));
            let mark = if self.clause_db.is_subsumed(cref) {
                " (subsumed)"
            } else {
                ""
            };
            debug!("{}: {cls_str}{mark}", cref.id());
        }
    }

    /// Write the implication graph of the current trail in Graphviz DOT
    /// form; a pending conflict shows up as an extra `X` vertex.
    pub fn implication_graph_to_dot(
        &self,
        mut out: impl std::io::Write,
    ) -> Result<(), std::io::Error> {
        writeln!(out, "digraph {{")?;
        for elem in self.trail.trail() {
            let annotation = match elem.reason {
                TrailReason::Decision => "D",
                TrailReason::Propagated { .. } => "P",
            };

            writeln!(
                out,
                "{} [label = \"{}{annotation}@{}\"];",
                elem.lit.var(),
                elem.lit,
                self.trail.var_level(elem.lit.var()),
            )?;

            if let TrailReason::Propagated { cls } = elem.reason {
                for &l in self.clause_db.lits(cls) {
                    if l == elem.lit {
                        continue;
                    }

                    writeln!(out, "{} -> {};", l.var(), elem.lit.var())?;
                }
            }
        }

        if let Some(record) = self.conflict {
            writeln!(out, "X;")?;
            for &l in self.clause_db.lits(record.clause) {
                writeln!(out, "{} -> X;", l.var())?;
            }
        }

        writeln!(out, "}}")
    }
}

impl Trail {
    pub(crate) fn fmt_lit(&self, lit: Lit) -> String {
        match self.lit_value(lit) {
            Some(true) => format!("{GREEN}{lit}{END}"),
            Some(false) => format!("{RED}{lit}{END}"),
            None => format!("{lit}"),
        }
    }

    pub(crate) fn fmt_clause(&self, clause: &[Lit]) -> String {
        clause
            .iter()
            .map(|&lit| self.fmt_lit(lit))
            .collect::<Vec<_>>()
            .join(", ")
    }

    #[allow(unused)]
    pub(crate) fn fmt_trail(&self) -> String {
        let lst: Vec<String> = self
            .trail()
            .iter()
            .map(|trail_elem| {
                let lit = trail_elem.lit;
                match trail_elem.reason {
                    TrailReason::Decision => format!("{lit}D"),
                    TrailReason::Propagated { .. } => format!("{lit}P"),
                }
            })
            .collect();

        format!("[{}]", lst.join(", "))
    }
}
