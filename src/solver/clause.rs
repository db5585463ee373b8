/// Clauses are stored continuously in memory.
/// Slot 0 is the false clause (empty, assertion level 0); original clauses
/// occupy slots `1..=original_count`; learned clauses are appended after
/// them in creation order and are only dropped at teardown.
use std::ops::Range;

use super::Lit;

bitflags::bitflags! {
    pub(crate) struct ClauseFlags: u8 {
        /// Created by conflict analysis rather than given in the input.
        const LEARNED = 0b01;
        /// One of the clause's literals is currently true. Reversible
        /// through the journal.
        const SUBSUMED = 0b10;
    }
}

/// Identity of a clause owned by the solver.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct ClauseRef(u32);

impl ClauseRef {
    pub(crate) const FALSE: ClauseRef = ClauseRef(0);

    pub fn id(self) -> usize {
        self.0 as usize
    }
}

struct ClauseMeta {
    range: Range<u32>,
    /// Positions of the two watched literals inside the clause's literal
    /// list. `None` for clauses of size < 2, which are never watched.
    watches: Option<[u32; 2]>,
    flags: ClauseFlags,
    assertion_level: u32,
}

/// Reversible subsumption marks, segmented per decision level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JournalEntry {
    Boundary,
    Subsumed(ClauseRef),
}

pub(crate) struct ClauseDb {
    lit_data: Vec<Lit>,
    metas: Vec<ClauseMeta>,
    original_count: usize,
    /// Learned clauses registered by assertion, in insertion order.
    asserted: Vec<ClauseRef>,
    journal: Vec<JournalEntry>,
}

impl ClauseDb {
    pub fn new() -> Self {
        let false_clause = ClauseMeta {
            range: 0..0,
            watches: None,
            flags: ClauseFlags::empty(),
            assertion_level: 0,
        };

        ClauseDb {
            lit_data: Vec::new(),
            metas: vec![false_clause],
            original_count: 0,
            asserted: Vec::new(),
            journal: Vec::new(),
        }
    }

    fn insert(&mut self, lits: &[Lit], flags: ClauseFlags, assertion_level: u32) -> ClauseRef {
        let start = self.lit_data.len();
        self.lit_data.extend(lits);
        let end = self.lit_data.len();

        debug_assert!(u32::try_from(end).is_ok());

        self.metas.push(ClauseMeta {
            range: start as u32..end as u32,
            watches: None,
            flags,
            assertion_level,
        });
        ClauseRef(self.metas.len() as u32 - 1)
    }

    /// Insert a clause of the input problem. Must not be called once a
    /// learned clause exists, so that original ids stay contiguous.
    pub fn insert_original(&mut self, lits: &[Lit]) -> ClauseRef {
        debug_assert_eq!(self.original_count + 1, self.metas.len());

        let cref = self.insert(lits, ClauseFlags::empty(), 0);
        self.original_count += 1;
        cref
    }

    pub fn insert_learned(&mut self, lits: &[Lit], assertion_level: u32) -> ClauseRef {
        self.insert(lits, ClauseFlags::LEARNED, assertion_level)
    }

    pub fn lits(&self, c: ClauseRef) -> &[Lit] {
        let range = &self.metas[c.id()].range;
        &self.lit_data[range.start as usize..range.end as usize]
    }

    pub fn len(&self, c: ClauseRef) -> usize {
        let range = &self.metas[c.id()].range;
        (range.end - range.start) as usize
    }

    pub fn watches(&self, c: ClauseRef) -> Option<[u32; 2]> {
        self.metas[c.id()].watches
    }

    pub fn set_watches(&mut self, c: ClauseRef, positions: [u32; 2]) {
        debug_assert_ne!(positions[0], positions[1]);
        debug_assert!((positions[1] as usize) < self.len(c));

        self.metas[c.id()].watches = Some(positions);
    }

    /// Move one of the two watches to a new position in the literal list.
    pub fn move_watch(&mut self, c: ClauseRef, slot: usize, position: u32) {
        let watches = self.metas[c.id()]
            .watches
            .as_mut()
            .expect("only watched clauses move watches");
        watches[slot] = position;

        debug_assert_ne!(watches[0], watches[1]);
    }

    pub fn assertion_level(&self, c: ClauseRef) -> u32 {
        self.metas[c.id()].assertion_level
    }

    pub fn is_learned(&self, c: ClauseRef) -> bool {
        self.metas[c.id()].flags.contains(ClauseFlags::LEARNED)
    }

    pub fn is_subsumed(&self, c: ClauseRef) -> bool {
        self.metas[c.id()].flags.contains(ClauseFlags::SUBSUMED)
    }

    /// Mark `c` subsumed and journal the mark. A second mark before the
    /// first is unwound is a no-op, so every journal entry undoes exactly
    /// one flag.
    pub fn subsume(&mut self, c: ClauseRef) {
        let flags = &mut self.metas[c.id()].flags;
        if !flags.contains(ClauseFlags::SUBSUMED) {
            flags.insert(ClauseFlags::SUBSUMED);
            self.journal.push(JournalEntry::Subsumed(c));
        }
    }

    /// Start a new journal segment for a fresh decision level.
    pub fn push_boundary(&mut self) {
        self.journal.push(JournalEntry::Boundary);
    }

    /// Clear the subsumption marks of the topmost journal segment. With
    /// `remove_boundary` the segment's boundary is popped as well,
    /// closing out the decision level it belongs to. The bottom segment
    /// (level 1) has no boundary and simply drains.
    pub fn unwind_to_boundary(&mut self, remove_boundary: bool) {
        while let Some(&entry) = self.journal.last() {
            match entry {
                JournalEntry::Boundary => {
                    if remove_boundary {
                        self.journal.pop();
                    }
                    return;
                }
                JournalEntry::Subsumed(c) => {
                    self.journal.pop();
                    self.metas[c.id()].flags.remove(ClauseFlags::SUBSUMED);
                }
            }
        }
    }

    pub fn register_asserted(&mut self, c: ClauseRef) {
        debug_assert!(self.is_learned(c));
        debug_assert!(!self.asserted.contains(&c));

        self.asserted.push(c);
    }

    pub fn asserted_count(&self) -> usize {
        self.asserted.len()
    }

    pub fn original_count(&self) -> usize {
        self.original_count
    }

    /// All clause identities except the false clause, originals first.
    pub fn iter_refs(&self) -> impl Iterator<Item = ClauseRef> {
        (1..self.metas.len() as u32).map(ClauseRef)
    }

    pub fn ref_for_id(&self, id: usize) -> ClauseRef {
        assert!(id < self.metas.len(), "clause id {id} out of range");
        ClauseRef(id as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lits(ints: &[i32]) -> Vec<Lit> {
        ints.iter().map(|&i| Lit::new(i)).collect()
    }

    #[test]
    fn ids_are_monotone_from_original_count() {
        let mut db = ClauseDb::new();

        let c1 = db.insert_original(&lits(&[1, 2]));
        let c2 = db.insert_original(&lits(&[-1, 3]));
        assert_eq!(c1.id(), 1);
        assert_eq!(c2.id(), 2);
        assert_eq!(db.original_count(), 2);

        let l1 = db.insert_learned(&lits(&[-3]), 1);
        assert_eq!(l1.id(), 3);
        assert!(db.is_learned(l1));
        assert!(!db.is_learned(c1));
        assert_eq!(db.assertion_level(l1), 1);

        assert_eq!(db.lits(c2), &lits(&[-1, 3])[..]);
    }

    #[test]
    fn false_clause_is_empty_with_level_zero() {
        let db = ClauseDb::new();
        assert_eq!(db.lits(ClauseRef::FALSE), &[]);
        assert_eq!(db.assertion_level(ClauseRef::FALSE), 0);
    }

    #[test]
    fn journal_unwinds_per_segment() {
        let mut db = ClauseDb::new();
        let c1 = db.insert_original(&lits(&[1, 2]));
        let c2 = db.insert_original(&lits(&[2, 3]));
        let c3 = db.insert_original(&lits(&[3, 4]));

        // level 1 segment has no boundary below it
        db.subsume(c1);
        db.push_boundary();
        db.subsume(c2);
        db.subsume(c2); // no-op, already marked
        db.push_boundary();
        db.subsume(c3);

        db.unwind_to_boundary(true);
        assert!(!db.is_subsumed(c3));
        assert!(db.is_subsumed(c2));

        // keeping the boundary leaves the level open
        db.unwind_to_boundary(false);
        assert!(!db.is_subsumed(c2));
        assert!(db.is_subsumed(c1));

        db.unwind_to_boundary(true);
        db.unwind_to_boundary(true);
        assert!(!db.is_subsumed(c1));
    }

    #[test]
    fn watch_positions() {
        let mut db = ClauseDb::new();
        let c = db.insert_original(&lits(&[1, 2, 3]));
        assert_eq!(db.watches(c), None);

        db.set_watches(c, [0, 2]);
        assert_eq!(db.watches(c), Some([0, 2]));

        db.move_watch(c, 0, 1);
        assert_eq!(db.watches(c), Some([1, 2]));
    }
}
