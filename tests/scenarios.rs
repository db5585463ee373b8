use satcore::{Cnf, Lit, Solver, Var};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .with_test_writer()
        .try_init();
}

fn cnf(var_count: u32, clauses: &[&[i32]]) -> Cnf {
    let mut cnf = Cnf::new(var_count);
    for &clause in clauses {
        cnf.add_clause(clause.iter().copied());
    }
    cnf
}

fn sorted_ints(solver: &Solver, cref: satcore::ClauseRef) -> Vec<i32> {
    let mut ints: Vec<i32> = solver.clause_lits(cref).iter().map(|l| l.to_int()).collect();
    ints.sort_unstable();
    ints
}

/// Everything about the solver state that the public queries can see.
#[derive(Debug, PartialEq, Eq)]
struct Snapshot {
    level: u32,
    assignments: Vec<Option<bool>>,
    subsumed: Vec<bool>,
    irrelevant: Vec<bool>,
    learned: usize,
}

fn snapshot(solver: &Solver) -> Snapshot {
    let vars = 1..=solver.var_count() as i32;

    Snapshot {
        level: solver.current_level(),
        assignments: vars
            .clone()
            .map(|i| {
                let v = Var::new(i);
                solver
                    .is_assigned(v)
                    .then(|| solver.lit_true(Lit::new(i)))
            })
            .collect(),
        subsumed: (1..=solver.original_clause_count())
            .map(|id| solver.clause_subsumed(solver.clause_by_id(id)))
            .collect(),
        irrelevant: vars.map(|i| solver.irrelevant(Var::new(i))).collect(),
        learned: solver.learned_clause_count(),
    }
}

/// Every assignment satisfying the clause set also satisfies `learned`.
fn assert_consequence(var_count: u32, clauses: &[&[i32]], learned: &[i32]) {
    let satisfies = |assignment: u32, clause: &[i32]| {
        clause.iter().any(|&lit| {
            let value = assignment & (1 << (lit.unsigned_abs() - 1)) != 0;
            value == (lit > 0)
        })
    };

    for assignment in 0..1u32 << var_count {
        if clauses.iter().all(|&c| satisfies(assignment, c)) {
            assert!(
                satisfies(assignment, learned),
                "learned clause {learned:?} fails under model {assignment:#b}"
            );
        }
    }
}

// Deciding 1 forces 2 and conflicts; the learned unit -1 refutes the
// problem once asserted at the root.
#[test]
fn conflict_learning_refutes_contradictory_pairs() {
    init_logging();
    let clauses: &[&[i32]] = &[&[1, 2], &[-1, 2], &[1, -2], &[-1, -2]];
    let mut solver = Solver::new(&cnf(2, clauses));

    let learned = solver
        .decide(Lit::new(1))
        .expect("deciding 1 must run into a conflict");
    assert_eq!(sorted_ints(&solver, learned), vec![-1]);
    assert_eq!(solver.assertion_level(learned), 1);
    assert_consequence(2, clauses, &[-1]);

    assert!(!solver.at_assertion_level(learned));
    solver.undo_decide();
    assert!(solver.at_assertion_level(learned));

    let refutation = solver
        .assert_clause(learned)
        .expect("asserting -1 must refute the problem");
    assert_eq!(refutation, solver.false_clause());
    assert_eq!(solver.assertion_level(refutation), 0);
    assert!(solver.clause_lits(refutation).is_empty());
    assert_eq!(solver.learned_clause_count(), 1);

    // the refutation is permanent
    assert!(!solver.unit_resolution());
    assert_eq!(solver.decide(Lit::new(2)), Some(solver.false_clause()));
}

// Forcing the last open literal of a clause subsumes it, which makes the
// forced variable irrelevant.
#[test]
fn subsumption_makes_forced_variables_irrelevant() {
    init_logging();
    let mut solver = Solver::new(&cnf(3, &[&[1, 2, 3]]));
    assert!(!solver.irrelevant(Var::new(3)));

    assert_eq!(solver.decide(Lit::new(-1)), None);
    assert_eq!(solver.decide(Lit::new(-2)), None);

    assert!(solver.lit_true(Lit::new(3)));
    assert!(solver.irrelevant(Var::new(3)));
}

// Unit clauses propagate at the root level during construction.
#[test]
fn root_units_propagate_at_construction() {
    init_logging();
    let solver = Solver::new(&cnf(2, &[&[1], &[-1, 2]]));

    assert_eq!(solver.current_level(), 1);
    assert!(solver.lit_true(Lit::new(1)));
    assert!(solver.lit_true(Lit::new(2)));
    assert_eq!(solver.learned_clause_count(), 0);
}

// Deciding against a root-level implication cannot be blamed on any
// decision, so the false clause comes back directly.
#[test]
fn opposing_a_root_implication_yields_the_false_clause() {
    init_logging();
    let mut solver = Solver::new(&cnf(1, &[&[1]]));

    let learned = solver.decide(Lit::new(-1));
    assert_eq!(learned, Some(solver.false_clause()));
    assert_eq!(solver.assertion_level(solver.false_clause()), 0);
}

const DIAMOND: &[&[i32]] = &[&[1, 2], &[1, 3], &[-2, -3, 4], &[1, -4]];

// All implication chains of the conflict pass through the decision, so the
// UIP is the decision variable itself.
#[test]
fn uip_falls_back_to_the_decision() {
    init_logging();
    let mut solver = Solver::new(&cnf(4, DIAMOND));

    let learned = solver
        .decide(Lit::new(-1))
        .expect("deciding -1 must run into a conflict");
    assert_eq!(sorted_ints(&solver, learned), vec![1]);
    assert_eq!(solver.assertion_level(learned), 1);
    assert_consequence(4, DIAMOND, &[1]);
}

// Undoing the decision of the conflict restores the pre-decision state
// exactly, as far as any query can tell.
#[test]
fn undo_restores_the_previous_state() {
    init_logging();
    let mut solver = Solver::new(&cnf(4, DIAMOND));

    let before = snapshot(&solver);
    solver
        .decide(Lit::new(-1))
        .expect("deciding -1 must run into a conflict");
    solver.undo_decide();
    assert_eq!(snapshot(&solver), before);

    // same once more with a conflict-free decision that moved watches
    let mut solver = Solver::new(&cnf(3, &[&[1, 2, 3]]));
    let before = snapshot(&solver);
    assert_eq!(solver.decide(Lit::new(-1)), None);
    solver.undo_decide();
    assert_eq!(snapshot(&solver), before);
}

// The UIP of a deeper conflict is an implied variable; the learned clause
// asserts at an intermediate level and propagates there.
#[test]
fn intermediate_assertion_level_round_trip() {
    init_logging();
    let clauses: &[&[i32]] = &[&[-2, 3], &[-3, 4], &[-1, -4, 5], &[-3, -5]];
    let mut solver = Solver::new(&cnf(5, clauses));

    assert_eq!(solver.decide(Lit::new(1)), None);
    let learned = solver
        .decide(Lit::new(2))
        .expect("deciding 2 must run into a conflict");

    assert_eq!(sorted_ints(&solver, learned), vec![-3, -1]);
    assert_eq!(solver.assertion_level(learned), 2);
    assert_consequence(5, clauses, &[-3, -1]);

    solver.undo_decide();
    assert!(solver.at_assertion_level(learned));

    // all literals but the asserting one are falsified here
    assert!(solver.lit_true(Lit::new(1)));
    assert!(!solver.is_assigned(Var::new(3)));

    assert_eq!(solver.assert_clause(learned), None);
    assert!(solver.lit_true(Lit::new(-3)));
    assert!(solver.lit_true(Lit::new(-2)));
    assert_eq!(solver.learned_clause_count(), 1);

    // the remaining variables extend to a full consistent assignment
    assert_eq!(solver.decide(Lit::new(4)), None);
    assert!(solver.lit_true(Lit::new(5)));
}

// Propagation without new decisions is a no-op.
#[test]
fn unit_resolution_is_idempotent() {
    init_logging();
    let mut solver = Solver::new(&cnf(3, &[&[-1, 2], &[-2, 3]]));

    assert_eq!(solver.decide(Lit::new(1)), None);
    let before = snapshot(&solver);

    assert!(solver.unit_resolution());
    assert_eq!(snapshot(&solver), before);
    assert!(solver.unit_resolution());
    assert_eq!(snapshot(&solver), before);
}

// undo_unit_resolution clears the level's assignments but keeps the level
// open; undo_decide closes it.
#[test]
fn undo_unit_resolution_keeps_the_level_open() {
    init_logging();
    let mut solver = Solver::new(&cnf(3, &[&[-1, 2], &[-2, 3]]));

    assert_eq!(solver.decide(Lit::new(1)), None);
    assert!(solver.lit_true(Lit::new(3)));

    solver.undo_unit_resolution();
    assert_eq!(solver.current_level(), 2);
    assert!(!solver.is_assigned(Var::new(1)));
    assert!(!solver.is_assigned(Var::new(3)));

    assert!(solver.unit_resolution());

    solver.undo_decide();
    assert_eq!(solver.current_level(), 1);
}

#[test]
fn counters_track_the_search() {
    init_logging();
    let mut solver = Solver::new(&cnf(2, &[&[1, 2], &[-1, 2], &[1, -2], &[-1, -2]]));

    solver.decide(Lit::new(1)).expect("conflict");
    let stats = solver.stats();
    assert_eq!(stats.decisions, 1);
    assert_eq!(stats.conflicts, 1);
    assert!(stats.propagations > 0);
}

#[test]
fn implication_graph_export() {
    init_logging();
    let mut solver = Solver::new(&cnf(3, &[&[-1, 2], &[-2, 3]]));
    assert_eq!(solver.decide(Lit::new(1)), None);

    let mut out = Vec::new();
    solver.implication_graph_to_dot(&mut out).unwrap();
    let dot = String::from_utf8(out).unwrap();

    assert!(dot.starts_with("digraph {"));
    assert!(dot.contains("1 -> 2;"));
    assert!(dot.contains("2 -> 3;"));
}
