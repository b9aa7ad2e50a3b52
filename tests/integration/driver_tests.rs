//! Per-function and batch driver integration tests.

use flowlint::analysis::{analyze_function, analyze_functions, run_check, CheckKind};
use flowlint::ast::AstBuilder;
use flowlint::cfg::{BlockId, Cfg};
use flowlint::FunctionUnit;

use crate::common;

fn malformed_unit() -> FunctionUnit {
    let mut b = AstBuilder::new();
    let s = b.ret(None);
    let ast = b.finish(Some(s));
    let cfg = Cfg {
        function_name: "broken".to_string(),
        blocks: vec![],
        entry: BlockId(0),
        exits: vec![],
    };
    FunctionUnit { ast, cfg }
}

#[test]
fn report_covers_all_three_analyses() {
    let (unit, _, _) = common::overwritten_init();
    let report = analyze_function(&unit.ast, &unit.cfg)
        .expect("analysis succeeds")
        .expect("function has a body");

    assert_eq!(report.function, "f");
    assert_eq!(report.dead_stores.len(), 1);
    assert!(report.unreachable.is_empty());
    assert!(report.invariants.is_empty());
}

#[test]
fn loop_findings_surface_through_the_driver() {
    let (unit, loop_stmt, s_body) = common::counted_loop(true);
    let report = analyze_function(&unit.ast, &unit.cfg)
        .expect("analysis succeeds")
        .expect("function has a body");

    assert_eq!(report.invariants.len(), 1);
    assert_eq!(report.invariants[0].loop_stmt, loop_stmt);
    assert_eq!(report.invariants[0].stmt, s_body);
}

#[test]
fn run_check_matches_the_combined_report() {
    let (unit, _, _) = common::overwritten_init();
    let report = analyze_function(&unit.ast, &unit.cfg)
        .expect("analysis succeeds")
        .expect("function has a body");

    for kind in CheckKind::ALL {
        let findings = run_check(kind, &unit.ast, &unit.cfg).expect("check succeeds");
        let expected = match kind {
            CheckKind::DeadStores => report.dead_stores.len(),
            CheckKind::UnreachableCode => report.unreachable.len(),
            CheckKind::LoopInvariants => report.invariants.len(),
        };
        assert_eq!(findings.len(), expected, "mismatch for {kind}");
    }
}

#[test]
fn batch_run_isolates_structural_failures() {
    common::init_tracing();
    let (good, _, _) = common::overwritten_init();
    let units = vec![good, malformed_unit(), common::early_return()];

    let reports = analyze_functions(&units);

    let names: Vec<&str> = reports.iter().map(|r| r.function.as_str()).collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"f"));
    assert!(names.contains(&"g"));
}

#[test]
fn clean_function_reports_silence() {
    let unit = common::early_return();
    let report = analyze_function(&unit.ast, &unit.cfg)
        .expect("analysis succeeds")
        .expect("function has a body");

    assert!(report.is_clean());
    assert_eq!(report.finding_count(), 0);
}

#[test]
fn report_json_carries_locations_and_counts() {
    let (unit, _, _) = common::overwritten_init();
    let report = analyze_function(&unit.ast, &unit.cfg)
        .expect("analysis succeeds")
        .expect("function has a body");

    let json = report.to_json();
    assert_eq!(json["function"], "f");
    assert_eq!(json["finding_count"], 1);
    assert_eq!(json["dead_stores"][0]["loc"]["line"], 1);
    assert_eq!(json["dead_stores"][0]["name"], "x");
}
