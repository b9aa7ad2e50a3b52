//! Dead store detection integration tests.

use flowlint::analysis::dead_stores;
use flowlint::ast::AstBuilder;
use flowlint::cfg::CfgBuilder;
use flowlint::dataflow::analyze_liveness;

use crate::common;

#[test]
fn overwritten_initializer_is_flagged_once() {
    common::init_tracing();
    let (unit, s_decl, s_assign) = common::overwritten_init();
    let findings = dead_stores::run(&unit.ast, &unit.cfg).expect("analysis succeeds");

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].stmt, s_decl);
    assert_eq!(findings[0].name, "x");
    assert_eq!(findings[0].loc.line, 1);
    assert!(findings.iter().all(|f| f.stmt != s_assign));
}

#[test]
fn store_read_by_tail_return_is_live() {
    let unit = common::early_return();
    let findings = dead_stores::run(&unit.ast, &unit.cfg).expect("analysis succeeds");
    assert!(findings.is_empty(), "{findings:?}");
}

#[test]
fn branchy_store_with_no_reader_is_flagged_at_its_location() {
    // int m(int c) { int v = 7; if (c) { v = 1; } return c; }
    // Both stores to v are dead; each is reported at its own line.
    let mut b = AstBuilder::new();
    let c_var = b.var("c");
    let v = b.var("v");

    b.at(1);
    let seven = b.int(7);
    let s_decl = b.decl_stmt(v, Some(seven));

    let cond = b.var_ref(c_var);

    b.at(2);
    let one = b.int(1);
    let v_ref = b.var_ref(v);
    let assign = b.assign(v_ref, one);
    let s_assign = b.expr_stmt(assign);

    b.at(3);
    let c_ref = b.var_ref(c_var);
    let s_ret = b.ret(Some(c_ref));

    let ast = b.finish(None);

    let mut c = CfgBuilder::new("m");
    let b0 = c.block_with_terminator(vec![s_decl], cond);
    let b1 = c.block(vec![s_assign]);
    let b2 = c.block(vec![s_ret]);
    c.edge(b0, b1);
    c.edge(b0, b2);
    c.edge(b1, b2);
    c.exit(b2);
    let cfg = c.build().expect("valid cfg");

    let findings = dead_stores::run(&ast, &cfg).expect("analysis succeeds");
    let mut lines: Vec<u32> = findings.iter().map(|f| f.loc.line).collect();
    lines.sort_unstable();
    assert_eq!(lines, vec![1, 2]);
}

#[test]
fn detector_reuses_caller_owned_liveness() {
    let (unit, s_decl, _) = common::overwritten_init();
    let liveness = analyze_liveness(&unit.ast, &unit.cfg).expect("liveness succeeds");

    let first = dead_stores::check_dead_stores(&unit.ast, &unit.cfg, &liveness);
    let second = dead_stores::check_dead_stores(&unit.ast, &unit.cfg, &liveness);

    assert_eq!(first, second);
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].stmt, s_decl);
}
