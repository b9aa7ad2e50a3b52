//! Function-local defect analyses.
//!
//! Three independent, order-insensitive analyses over one function's
//! CFG/AST pair:
//!
//! - **Dead stores** ([`dead_stores`]): assignments whose value is never
//!   read before the next write or function exit, driven by the liveness
//!   engine.
//! - **Unreachable code** ([`unreachable`]): blocks with no path from the
//!   entry, one representative statement per maximal dead region.
//! - **Loop invariants** ([`loop_invariant`]): loop-body statements whose
//!   value is identical on every iteration, judged syntactically.
//!
//! Check kinds form a closed, tagged set - adding an analysis means adding
//! a [`CheckKind`] variant and its entry function, not registering a
//! subclass. Findings are plain data with source locations; rendering a
//! human-readable message is the reporting collaborator's job, and finding
//! lists are owned by the caller, never by process-wide state.

pub mod dead_stores;
pub mod loop_invariant;
pub mod unreachable;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ast::{Ast, SourceLoc, StmtId, VarId};
use crate::cfg::{BlockId, Cfg};
use crate::dataflow::analyze_liveness;
use crate::error::Result;

pub use dead_stores::check_dead_stores;
pub use loop_invariant::check_loop_invariants;
pub use unreachable::check_unreachable;

/// A store whose value is provably never read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadStoreFinding {
    /// The assigned variable.
    pub var: VarId,
    /// Its declared name, carried for the reporting collaborator.
    pub name: String,
    /// The assignment or initializer statement.
    pub stmt: StmtId,
    pub loc: SourceLoc,
}

/// A maximal region of blocks with no path from the entry, reduced to one
/// representative statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreachableFinding {
    /// Blocks forming the region, ascending id.
    pub blocks: Vec<BlockId>,
    /// Representative statement; `None` when the region is represented by
    /// a block's terminator condition instead.
    pub stmt: Option<StmtId>,
    pub loc: SourceLoc,
}

/// A loop-body statement whose computation can be hoisted above the loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvariantFinding {
    /// The enclosing loop statement.
    pub loop_stmt: StmtId,
    /// The invariant top-level body statement.
    pub stmt: StmtId,
    pub loc: SourceLoc,
}

/// The closed set of analyses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckKind {
    DeadStores,
    UnreachableCode,
    LoopInvariants,
}

impl CheckKind {
    pub const ALL: [CheckKind; 3] = [
        CheckKind::DeadStores,
        CheckKind::UnreachableCode,
        CheckKind::LoopInvariants,
    ];

    /// Stable check name, as spelled in reports and configuration.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CheckKind::DeadStores => "dead-stores",
            CheckKind::UnreachableCode => "unreachable-code",
            CheckKind::LoopInvariants => "loop-invariants",
        }
    }
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of running one check, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Findings {
    DeadStores(Vec<DeadStoreFinding>),
    Unreachable(Vec<UnreachableFinding>),
    LoopInvariants(Vec<InvariantFinding>),
}

impl Findings {
    /// Number of findings regardless of kind.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Findings::DeadStores(list) => list.len(),
            Findings::Unreachable(list) => list.len(),
            Findings::LoopInvariants(list) => list.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Run a single check over one function.
///
/// The loop-invariant arm locates every loop under the function body and
/// concatenates their findings; a bodyless function yields an empty list.
///
/// # Errors
///
/// Propagates structural CFG failures; they abort this function only.
pub fn run_check(kind: CheckKind, ast: &Ast, cfg: &Cfg) -> Result<Findings> {
    match kind {
        CheckKind::DeadStores => Ok(Findings::DeadStores(dead_stores::run(ast, cfg)?)),
        CheckKind::UnreachableCode => Ok(Findings::Unreachable(check_unreachable(ast, cfg)?)),
        CheckKind::LoopInvariants => {
            let mut findings = Vec::new();
            if let Some(body) = ast.body() {
                for loop_stmt in ast.loops_in(body) {
                    if let Some(mut per_loop) = check_loop_invariants(ast, loop_stmt)? {
                        findings.append(&mut per_loop);
                    }
                }
            }
            Ok(Findings::LoopInvariants(findings))
        }
    }
}

/// One function's AST fragment and CFG, as delivered by the front end.
#[derive(Debug, Clone)]
pub struct FunctionUnit {
    pub ast: Ast,
    pub cfg: Cfg,
}

/// All findings for one function. Owned by the caller; the engine keeps no
/// state across functions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionReport {
    pub function: String,
    pub dead_stores: Vec<DeadStoreFinding>,
    pub unreachable: Vec<UnreachableFinding>,
    pub invariants: Vec<InvariantFinding>,
}

impl FunctionReport {
    /// Total findings across all three analyses.
    #[must_use]
    pub fn finding_count(&self) -> usize {
        self.dead_stores.len() + self.unreachable.len() + self.invariants.len()
    }

    /// True when no analysis found anything. A clean function produces no
    /// output at all - absence of findings is silent success.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.finding_count() == 0
    }

    /// Structured JSON for the reporting collaborator. Carries locations
    /// and identities only; message templates live with the reporter.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "function": self.function,
            "dead_stores": self.dead_stores,
            "unreachable": self.unreachable,
            "loop_invariants": self.invariants,
            "finding_count": self.finding_count(),
        })
    }
}

/// Run all three analyses over one function.
///
/// Returns `Ok(None)` for a declaration without a body - analysis is
/// inapplicable, which is an explicit no-result, not an error. The
/// liveness fixed point is computed once and shared with the dead store
/// detector.
///
/// # Errors
///
/// Returns [`FlowError::Structure`](crate::FlowError::Structure) when the
/// CFG fails validation; the caller continues with the next function.
pub fn analyze_function(ast: &Ast, cfg: &Cfg) -> Result<Option<FunctionReport>> {
    let Some(body) = ast.body() else {
        debug!(function = %cfg.function_name, "skipping declaration without body");
        return Ok(None);
    };

    let liveness = analyze_liveness(ast, cfg)?;
    let dead_stores = check_dead_stores(ast, cfg, &liveness);
    let unreachable = check_unreachable(ast, cfg)?;

    let mut invariants = Vec::new();
    for loop_stmt in ast.loops_in(body) {
        if let Some(mut per_loop) = check_loop_invariants(ast, loop_stmt)? {
            invariants.append(&mut per_loop);
        }
    }

    Ok(Some(FunctionReport {
        function: cfg.function_name.clone(),
        dead_stores,
        unreachable,
        invariants,
    }))
}

/// Analyze a batch of functions in parallel.
///
/// Functions are mutually independent: each worker owns its CFG, liveness
/// computation, and finding list, and the per-function reports are merged
/// after the parallel section without synchronization. A function whose
/// CFG fails validation is logged and skipped; it never aborts the run.
/// Bodyless declarations are skipped silently.
#[must_use]
pub fn analyze_functions(units: &[FunctionUnit]) -> Vec<FunctionReport> {
    units
        .par_iter()
        .filter_map(|unit| match analyze_function(&unit.ast, &unit.cfg) {
            Ok(report) => report,
            Err(error) => {
                warn!(
                    function = %unit.cfg.function_name,
                    %error,
                    "skipping function with malformed CFG"
                );
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::AstBuilder;
    use crate::cfg::CfgBuilder;

    /// `int f() { int x = 10; x = 20; return x; }`
    fn overwrite_unit() -> FunctionUnit {
        let mut b = AstBuilder::new();
        let x = b.var("x");
        b.at(1);
        let ten = b.int(10);
        let s_decl = b.decl_stmt(x, Some(ten));
        b.at(2);
        let twenty = b.int(20);
        let x_ref = b.var_ref(x);
        let assign = b.assign(x_ref, twenty);
        let s_assign = b.expr_stmt(assign);
        b.at(3);
        let x_ref2 = b.var_ref(x);
        let s_ret = b.ret(Some(x_ref2));
        let root = b.compound(vec![s_decl, s_assign, s_ret]);
        let ast = b.finish(Some(root));

        let mut c = CfgBuilder::new("f");
        let b0 = c.block(vec![s_decl, s_assign, s_ret]);
        c.exit(b0);
        let cfg = c.build().expect("valid cfg");

        FunctionUnit { ast, cfg }
    }

    fn bodyless_unit() -> FunctionUnit {
        let b = AstBuilder::new();
        let ast = b.finish(None);
        let mut c = CfgBuilder::new("decl_only");
        let b0 = c.block(vec![]);
        c.exit(b0);
        let cfg = c.build().expect("valid cfg");
        FunctionUnit { ast, cfg }
    }

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
    fn analyze_function_runs_all_checks() {
        let unit = overwrite_unit();
        let report = analyze_function(&unit.ast, &unit.cfg)
            .expect("analysis succeeds")
            .expect("function has a body");

        assert_eq!(report.function, "f");
        assert_eq!(report.dead_stores.len(), 1);
        assert!(report.unreachable.is_empty());
        assert!(report.invariants.is_empty());
        assert_eq!(report.finding_count(), 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn bodyless_function_is_an_explicit_no_result() {
        let unit = bodyless_unit();
        let outcome = analyze_function(&unit.ast, &unit.cfg).expect("no structural failure");
        assert!(outcome.is_none());
    }

    #[test]
    fn run_check_dispatches_by_kind() {
        let unit = overwrite_unit();
        for kind in CheckKind::ALL {
            let findings = run_check(kind, &unit.ast, &unit.cfg).expect("check succeeds");
            match kind {
                CheckKind::DeadStores => assert_eq!(findings.len(), 1),
                CheckKind::UnreachableCode | CheckKind::LoopInvariants => {
                    assert!(findings.is_empty());
                }
            }
        }
    }

    #[test]
    fn batch_skips_malformed_and_bodyless_units() {
        let units = vec![overwrite_unit(), malformed_unit(), bodyless_unit()];
        let reports = analyze_functions(&units);

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].function, "f");
    }

    #[test]
    fn report_json_round_trips() {
        let unit = overwrite_unit();
        let report = analyze_function(&unit.ast, &unit.cfg)
            .expect("analysis succeeds")
            .expect("function has a body");

        let json = report.to_json();
        assert_eq!(json["function"], "f");
        assert_eq!(json["finding_count"], 1);

        let serialized = serde_json::to_string(&report).expect("serializes");
        let back: FunctionReport = serde_json::from_str(&serialized).expect("deserializes");
        assert_eq!(back, report);
    }

    #[test]
    fn check_kind_names_are_stable() {
        let names: Vec<&str> = CheckKind::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(names, vec!["dead-stores", "unreachable-code", "loop-invariants"]);
    }
}
