//! End-to-end tests for the solve pipeline.
//!
//! Every successful result is checked against an exhaustive enumeration over
//! the syntax trees, independent of the emitter and the search.

use std::collections::BTreeMap;

use num_bigint::BigInt;

use spa_solver::ast::{BinaryOp, Node, UnaryOp};
use spa_solver::lexer::LexOptions;
use spa_solver::parser::{parse_constraint, parse_objective};
use spa_solver::problem::parse_problem_str;
use spa_solver::session::SessionConfig;
use spa_solver::solve::{solve, solve_with_config, Input, SolveConfig};

fn input(objective: &str, variables: &[&str], constraints: &[&str]) -> Input {
    Input {
        objective: objective.to_string(),
        variables: variables.iter().map(|s| s.to_string()).collect(),
        constraints: constraints.iter().map(|s| s.to_string()).collect(),
    }
}

fn value(node: &Node, assignment: &BTreeMap<String, bool>) -> i64 {
    match node {
        Node::Binary { op, left, right } => {
            let (l, r) = (value(left, assignment), value(right, assignment));
            let holds = match op {
                BinaryOp::Add => return l + r,
                BinaryOp::Sub => return l - r,
                BinaryOp::Mul => return l * r,
                BinaryOp::Lt => l < r,
                BinaryOp::Le => l <= r,
                BinaryOp::Gt => l > r,
                BinaryOp::Ge => l >= r,
                BinaryOp::Eq => l == r,
                BinaryOp::Ne => l != r,
            };
            holds as i64
        }
        Node::Unary { op: UnaryOp::Neg, value: v } => -value(v, assignment),
        Node::Literal(name) => assignment[*name] as i64,
        Node::Constant(text) => text.parse().unwrap(),
    }
}

/// Minimal objective over all assignments, or `None` if no assignment is feasible.
fn brute_force(input: &Input, options: LexOptions) -> Option<i64> {
    let objective = parse_objective(&input.objective, options).unwrap();
    let constraints: Vec<Node> = input
        .constraints
        .iter()
        .map(|c| parse_constraint(c, options).unwrap())
        .collect();

    let mut names = input.variables.clone();
    names.sort();
    names.dedup();

    let mut best = None;
    for mask in 0u32..(1 << names.len()) {
        let assignment: BTreeMap<String, bool> = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), mask & (1 << i) != 0))
            .collect();
        if constraints.iter().all(|c| value(c, &assignment) != 0) {
            let v = value(&objective, &assignment);
            best = Some(best.map_or(v, |b: i64| b.min(v)));
        }
    }
    best
}

fn check_against_brute_force(input: &Input, options: LexOptions) {
    let config = SolveConfig {
        lex: options,
        ..Default::default()
    };
    let output = solve_with_config(input, &config);
    let expected = brute_force(input, options);

    match expected {
        None => {
            assert!(!output.success);
            assert_eq!(output.message, "unsat");
        }
        Some(best) => {
            assert!(output.success, "{}", output.message);
            assert_eq!(output.objective, Some(BigInt::from(best)));

            for c in &input.constraints {
                let node = parse_constraint(c, options).unwrap();
                assert_eq!(value(&node, &output.assignment), 1, "violated: {}", c);
            }
            let node = parse_objective(&input.objective, options).unwrap();
            assert_eq!(value(&node, &output.assignment), best);
        }
    }
}

// ─── Optimality ────────────────────────────────────────────────────────────────

#[test]
fn vertex_cover() {
    let problem = input(
        "a + b + c + d",
        &["a", "b", "c", "d"],
        &["a + b >= 1", "b + c >= 1", "c + d >= 1", "d + a >= 1"],
    );
    check_against_brute_force(&problem, LexOptions::default());
    assert_eq!(solve(&problem).objective, Some(BigInt::from(2)));
}

#[test]
fn exactly_two() {
    let problem = input(
        "-x + y - z + 3",
        &["x", "y", "z", "w"],
        &["x + y + z + w == 2", "x - y >= 0"],
    );
    check_against_brute_force(&problem, LexOptions::default());
}

#[test]
fn nested_negation() {
    let problem = input(
        "-(a - (b - c)) + 10",
        &["a", "b", "c"],
        &["-(a + b) <= -1", "(c) < 1 + a"],
    );
    check_against_brute_force(&problem, LexOptions::default());
}

#[test]
fn negative_objective() {
    let problem = input("-a - b - c", &["a", "b", "c"], &["a + b + c <= 2"]);
    check_against_brute_force(&problem, LexOptions::default());
    assert_eq!(solve(&problem).objective, Some(BigInt::from(-2)));
}

#[test]
fn distinct_dialect() {
    let problem = input("a + b + c", &["a", "b", "c"], &["a != b", "b != c", "a + c >= 1"]);
    check_against_brute_force(&problem, LexOptions::default());
    check_against_brute_force(
        &problem,
        LexOptions {
            distinct_not_equal: true,
        },
    );
}

#[test]
fn no_constraints() {
    let problem = input("a - b", &["a", "b"], &[]);
    let output = solve(&problem);
    assert!(output.success);
    assert_eq!(output.assignment["a"], false);
    assert_eq!(output.assignment["b"], true);
    assert_eq!(output.objective, Some(BigInt::from(-1)));
}

#[test]
fn unsat() {
    let problem = input("a", &["a", "b"], &["a + b >= 1", "a + b <= 0"]);
    check_against_brute_force(&problem, LexOptions::default());
}

#[test]
fn no_variables() {
    let output = solve(&input("2 - 5", &[], &["1 < 2"]));
    assert!(output.success);
    assert!(output.assignment.is_empty());
    assert_eq!(output.objective, Some(BigInt::from(-3)));

    let output = solve(&input("0", &[], &["3 <= 2"]));
    assert!(!output.success);
    assert_eq!(output.message, "unsat");
}

// ─── Errors ────────────────────────────────────────────────────────────────────

#[test]
fn lex_error_message() {
    let output = solve(&input("a * b", &["a", "b"], &[]));
    assert!(!output.success);
    assert_eq!(output.message, "Unexpected character '*' at 2");
    assert!(output.assignment.is_empty());
}

#[test]
fn missing_relational() {
    let output = solve(&input("a", &["a"], &["a + 1"]));
    assert!(!output.success);
    assert_eq!(
        output.message,
        "Expected one of '<', '>', '<=', '>=', '==', '!=' but got end of input at 5"
    );
}

#[test]
fn undeclared_variable() {
    let output = solve(&input("a + ghost", &["a"], &[]));
    assert!(!output.success);
    assert_eq!(output.message, "No variable 'ghost'");
}

// ─── Determinism ───────────────────────────────────────────────────────────────

#[test]
fn repeated_solves_agree() {
    let problem = input(
        "a + 2 - b + c",
        &["a", "b", "c", "d"],
        &["a + b + c + d >= 2", "a - d <= 0"],
    );
    let first = solve(&problem);
    for _ in 0..5 {
        let again = solve(&problem);
        assert_eq!(again.success, first.success);
        assert_eq!(again.objective, first.objective);
        assert_eq!(again, first);
    }
}

#[test]
fn decision_limit() {
    let problem = input("a + b + c", &["a", "b", "c"], &["a + b >= 1", "b + c >= 1"]);
    let config = SolveConfig {
        session: SessionConfig {
            decision_limit: Some(1_000),
        },
        ..Default::default()
    };
    let output = solve_with_config(&problem, &config);
    assert!(output.success);
    assert_eq!(output.objective, Some(BigInt::from(1)));
}

// ─── Scale ─────────────────────────────────────────────────────────────────────

#[test]
fn long_flat_sums() {
    let objective = vec!["a"; 100_000].join(" + ");
    let constraint = format!("{} >= 1", vec!["b"; 100_000].join(" + "));
    let output = solve(&input(&objective, &["a", "b"], &[&constraint]));
    assert!(output.success, "{}", output.message);
    assert_eq!(output.objective, Some(BigInt::from(0)));
    assert_eq!(output.assignment["a"], false);
    assert_eq!(output.assignment["b"], true);
}

/// Choose exactly half of 40 variables, where every odd one costs twice as much.
#[test]
fn exactly_half_within_decision_limit() {
    let names: Vec<String> = (0..40).map(|i| format!("x{}", i)).collect();
    let objective = names
        .iter()
        .enumerate()
        .map(|(i, name)| if i % 2 == 0 { name.clone() } else { format!("{} + {}", name, name) })
        .collect::<Vec<_>>()
        .join(" + ");
    let constraint = format!("{} == 20", names.join(" + "));

    let problem = Input {
        objective,
        variables: names.clone(),
        constraints: vec![constraint],
    };
    let config = SolveConfig {
        session: SessionConfig {
            decision_limit: Some(2_000),
        },
        ..Default::default()
    };
    let output = solve_with_config(&problem, &config);
    assert!(output.success, "{}", output.message);
    assert_eq!(output.objective, Some(BigInt::from(20)));
    for (i, name) in names.iter().enumerate() {
        assert_eq!(output.assignment[name], i % 2 == 0, "{}", name);
    }
}

// ─── Problem files ─────────────────────────────────────────────────────────────

#[test]
fn problem_file() {
    let problem = parse_problem_str(
        "# pick one of each pair\n\
         var a b c\n\
         st a + b >= 1\n\
         st b + c >= 1\n\
         min a + b + c\n",
    )
    .unwrap();
    let output = solve(&problem);
    assert!(output.success);
    assert_eq!(output.assignment["b"], true);
    assert_eq!(output.objective, Some(BigInt::from(1)));
}
