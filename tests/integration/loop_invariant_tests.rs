//! Loop-invariant classifier integration tests.

use flowlint::analysis::check_loop_invariants;

use crate::common;

#[test]
fn constant_body_store_is_invariant() {
    let (unit, loop_stmt, s_body) = common::counted_loop(true);
    let findings = check_loop_invariants(&unit.ast, loop_stmt)
        .expect("loop accepted")
        .expect("body not empty");

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].stmt, s_body);
    assert_eq!(findings[0].loop_stmt, loop_stmt);
    assert_eq!(findings[0].loc.line, 3);
}

#[test]
fn counter_dependent_store_is_not_invariant() {
    let (unit, loop_stmt, _) = common::counted_loop(false);
    let findings = check_loop_invariants(&unit.ast, loop_stmt)
        .expect("loop accepted")
        .expect("body not empty");

    assert!(findings.is_empty(), "{findings:?}");
}

#[test]
fn loops_are_located_from_the_function_body() {
    let (unit, loop_stmt, _) = common::counted_loop(true);
    let body = unit.ast.body().expect("function has a body");
    assert_eq!(unit.ast.loops_in(body), vec![loop_stmt]);
}
