/// Implementation of the unit propagation algorithm for two watched literals.
use tracing::debug;

use super::{
    clause::{ClauseDb, ClauseRef},
    trail::{Trail, TrailReason},
    watch::Watch,
    Lit, Solver,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PropagationResult {
    Contradiction(ClauseRef),
    Done,
}

/// What scanning a clause with a freshly falsified watch concluded.
enum ScanOutcome {
    /// A true literal turned up; the clause drops out of propagation
    /// until the mark is unwound.
    Subsumed,
    /// Move the watch in `slot` to `position`, which holds `watch_lit`.
    MoveWatch {
        slot: usize,
        position: u32,
        watch_lit: Lit,
    },
    /// Every candidate is falsified; only the other watch is left.
    NoReplacement { other: Lit },
}

/// Search `cref` for a watch replacing `falsified`. A replacement must be
/// unassigned and not the other watch; any true literal ends the search
/// with a subsumption instead.
fn scan_for_replacement(
    clause_db: &ClauseDb,
    trail: &Trail,
    cref: ClauseRef,
    falsified: Lit,
) -> ScanOutcome {
    let lits = clause_db.lits(cref);
    let [wa, wb] = clause_db
        .watches(cref)
        .expect("clauses on a watch list carry two watches");

    let (slot, other_pos) = if lits[wa as usize] == falsified {
        (0, wb)
    } else {
        debug_assert_eq!(lits[wb as usize], falsified);
        (1, wa)
    };

    for (i, &candidate) in lits.iter().enumerate() {
        if trail.is_lit_satisfied(candidate) {
            return ScanOutcome::Subsumed;
        }
        if i as u32 == wa || i as u32 == wb {
            continue;
        }
        if !trail.is_lit_unsatisfied(candidate) {
            return ScanOutcome::MoveWatch {
                slot,
                position: i as u32,
                watch_lit: candidate,
            };
        }
    }

    ScanOutcome::NoReplacement {
        other: lits[other_pos as usize],
    }
}

impl Solver {
    /// Propagate every pending trail literal to fixed point, or stop at
    /// the first conflict and record it.
    pub(crate) fn propagate(&mut self) -> PropagationResult {
        let mut trail_pos = self.unpropagated_lit_pos;

        while let Some(&trail_elem) = self.trail.get(trail_pos) {
            let lit = trail_elem.lit;
            debug_assert!(self.trail.is_lit_satisfied(lit));
            self.stats.propagations += 1;

            // `lit` became true, so clauses watching its negation must be
            // re-examined.
            let falsified = -lit;
            let mut contradiction_found = None;

            let (lit_watch, mut remaining_watches) = self.watches.remaining(falsified);
            lit_watch.retain(|watch| {
                // We stop propagating if a contradiction was found.
                // In this case we just want `retain` to keep the rest of the elements.
                if contradiction_found.is_some() {
                    return true;
                }

                let cref = watch.clause;
                if self.clause_db.is_subsumed(cref) {
                    return true;
                }

                match scan_for_replacement(&self.clause_db, &self.trail, cref, falsified) {
                    ScanOutcome::Subsumed => {
                        self.clause_db.subsume(cref);
                        true
                    }
                    ScanOutcome::MoveWatch {
                        slot,
                        position,
                        watch_lit,
                    } => {
                        self.clause_db.move_watch(cref, slot, position);
                        // The new watcher's list gains this clause; returning
                        // false drops it from the old list. `retain` has
                        // already captured the successor, so splicing is safe.
                        remaining_watches[watch_lit].push(Watch { clause: cref });
                        false
                    }
                    ScanOutcome::NoReplacement { other } => match self.trail.lit_value(other) {
                        Some(false) => {
                            contradiction_found = Some(cref);
                            true
                        }
                        Some(true) => {
                            self.clause_db.subsume(cref);
                            true
                        }
                        None => {
                            self.trail
                                .assign_lit(other, TrailReason::Propagated { cls: cref });
                            // The forced literal satisfies the clause.
                            self.clause_db.subsume(cref);
                            true
                        }
                    },
                }
            });

            if let Some(conflicting) = contradiction_found {
                self.record_conflict(conflicting);
                return PropagationResult::Contradiction(conflicting);
            }

            trail_pos += 1;
        }

        self.unpropagated_lit_pos = trail_pos;
        debug_assert_eq!(self.unpropagated_lit_pos, self.trail.len());
        debug!("propagation reached fixed point, trail length {trail_pos}");

        #[cfg(debug_assertions)]
        {
            self.check_watches();
            self.check_trail();
        }

        PropagationResult::Done
    }
}
