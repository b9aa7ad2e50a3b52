//! Reachability classifier integration tests.

use flowlint::analysis::check_unreachable;
use flowlint::cfg::BlockId;

use crate::common;

#[test]
fn early_return_function_has_no_dead_blocks() {
    let unit = common::early_return();
    let findings = check_unreachable(&unit.ast, &unit.cfg).expect("analysis succeeds");
    assert!(findings.is_empty());
}

#[test]
fn statement_after_return_is_reported_exactly_once() {
    let (unit, s_decl) = common::code_after_return();
    let findings = check_unreachable(&unit.ast, &unit.cfg).expect("analysis succeeds");

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].stmt, Some(s_decl));
    assert_eq!(findings[0].blocks, vec![BlockId(1)]);
    assert_eq!(findings[0].loc.line, 2);
}

#[test]
fn dead_region_does_not_suppress_other_analyses() {
    // The unreachable store in h() is also dead; both analyses fire
    // independently on the same unit.
    let (unit, s_decl) = common::code_after_return();

    let unreachable = check_unreachable(&unit.ast, &unit.cfg).expect("analysis succeeds");
    let dead = flowlint::analysis::dead_stores::run(&unit.ast, &unit.cfg)
        .expect("analysis succeeds");

    assert_eq!(unreachable.len(), 1);
    assert_eq!(dead.len(), 1);
    assert_eq!(dead[0].stmt, s_decl);
}
