//! Liveness engine integration tests.

use flowlint::ast::VarId;
use flowlint::dataflow::analyze_liveness;

use crate::common;

#[test]
fn liveness_is_idempotent_across_runs() {
    let unit = common::early_return();
    let first = analyze_liveness(&unit.ast, &unit.cfg).expect("analysis succeeds");
    let second = analyze_liveness(&unit.ast, &unit.cfg).expect("analysis succeeds");

    assert_eq!(first.live_in, second.live_in);
    assert_eq!(first.live_out, second.live_out);
}

#[test]
fn equations_hold_at_the_fixed_point() {
    let (unit, _, _) = common::counted_loop(false);
    let result = analyze_liveness(&unit.ast, &unit.cfg).expect("analysis succeeds");

    for block in &unit.cfg.blocks {
        let mut expected_out = flowlint::LivenessSet::new(unit.ast.var_count());
        for &succ in &block.succs {
            expected_out.union_with(&result.live_in[succ.0]);
        }
        assert_eq!(
            expected_out,
            result.live_out[block.id.0],
            "live-out equation violated at block {}",
            block.id.0
        );
    }
}

#[test]
fn branch_condition_keeps_its_variable_live() {
    let unit = common::early_return();
    let result = analyze_liveness(&unit.ast, &unit.cfg).expect("analysis succeeds");

    // a is read by the entry terminator and on every path beyond it.
    let a = VarId(0);
    assert!(result.live_in[0].contains(a));
    assert!(result.gen[0].contains(a));
}

#[test]
fn loop_header_carries_counter_across_back_edge() {
    let (unit, _, _) = common::counted_loop(true);
    let result = analyze_liveness(&unit.ast, &unit.cfg).expect("analysis succeeds");

    // i is read by the header condition on every iteration.
    let i = VarId(1);
    assert!(result.live_in[1].contains(i));
    assert!(result.live_out[2].contains(i));
}
