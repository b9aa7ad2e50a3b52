//! Dead store detection.
//!
//! Consumes the liveness result and the statement stream to flag
//! assignments whose target is not live immediately after the assignment:
//! no path from that point reaches a read of the variable before its next
//! write or the end of the function.
//!
//! Block-level `live_out` is not precise enough for stores that are
//! overwritten later in the same block, so the detector reconstructs the
//! per-statement "live after" set by walking each block backward from its
//! `live_out`.

use tracing::trace;

use crate::analysis::DeadStoreFinding;
use crate::ast::{Ast, ExprKind, SourceLoc, StmtId, StmtKind, VarId};
use crate::cfg::{BasicBlock, Cfg};
use crate::dataflow::{analyze_liveness, expr_effects, stmt_effects, LivenessResult, StmtEffects};
use crate::error::Result;

/// Run liveness and detect dead stores in one call.
///
/// # Errors
///
/// Returns [`FlowError::Structure`](crate::FlowError::Structure) when the
/// CFG fails validation.
pub fn run(ast: &Ast, cfg: &Cfg) -> Result<Vec<DeadStoreFinding>> {
    let liveness = analyze_liveness(ast, cfg)?;
    Ok(check_dead_stores(ast, cfg, &liveness))
}

/// Detect dead stores against a previously computed liveness result.
///
/// Findings are discovered walking blocks and statements in source order
/// and the list is reversed before returning, so the latest store in a
/// chain of overwrites is reported first and the earliest last. Callers
/// wanting strict source order should sort by location; the core treats
/// ordering as a presentation concern.
pub fn check_dead_stores(
    ast: &Ast,
    cfg: &Cfg,
    liveness: &LivenessResult,
) -> Vec<DeadStoreFinding> {
    let mut findings = Vec::new();

    for block in &cfg.blocks {
        let live_after = liveness_after_each_stmt(ast, block, liveness);

        for (index, &stmt) in block.stmts.iter().enumerate() {
            let Some((var, loc)) = store_candidate(ast, stmt) else {
                continue;
            };
            if !live_after[index].contains(var) {
                trace!(
                    function = %cfg.function_name,
                    variable = %ast.var(var).name,
                    line = loc.line,
                    "dead store"
                );
                findings.push(DeadStoreFinding {
                    var,
                    name: ast.var(var).name.clone(),
                    stmt,
                    loc,
                });
            }
        }
    }

    findings.reverse();
    findings
}

/// Liveness immediately after each statement of `block`, reconstructed by
/// walking backward from the block's `live_out`. The terminator condition
/// is the block's last evaluation, so its reads are folded in first.
fn liveness_after_each_stmt(
    ast: &Ast,
    block: &BasicBlock,
    liveness: &LivenessResult,
) -> Vec<crate::dataflow::LivenessSet> {
    let mut live = liveness.live_out[block.id.0].clone();
    if let Some(cond) = block.terminator {
        let mut effects = StmtEffects::default();
        expr_effects(ast, cond, &mut effects);
        for &var in &effects.reads {
            live.insert(var);
        }
    }

    let mut after = vec![live.clone(); block.stmts.len()];
    for (index, &stmt) in block.stmts.iter().enumerate().rev() {
        after[index] = live.clone();
        let effects = stmt_effects(ast, stmt);
        for &var in &effects.writes {
            live.remove(var);
        }
        for &var in &effects.reads {
            live.insert(var);
        }
    }
    after
}

/// Extract the reportable store of a statement, if it has one.
///
/// Reportable stores are plain assignments to a direct variable reference
/// and plain initializer declarations. Everything the policy excludes
/// (macro-expanded statements, compound and increment/decrement forms,
/// self-assignment, non-local or reference or explicitly-unused variables,
/// construction right-hand sides) comes back as `None`.
fn store_candidate(ast: &Ast, stmt: StmtId) -> Option<(VarId, SourceLoc)> {
    if ast.is_macro_stmt(stmt) {
        return None;
    }
    let node = ast.stmt(stmt);
    match &node.kind {
        StmtKind::Decl {
            var,
            init: Some(init),
        } => {
            if is_construction(ast, *init) || !reportable_var(ast, *var) {
                return None;
            }
            Some((*var, node.loc))
        }
        StmtKind::Expr(expr) => match &ast.expr(*expr).kind {
            ExprKind::Assign { op, target, value } if !op.is_compound() => {
                let var = ast.as_var_ref(*target)?;
                // Self-assignment is the conventional unused-variable
                // suppression idiom, not a bug.
                if ast.as_var_ref(*value) == Some(var) {
                    return None;
                }
                if is_construction(ast, *value) || !reportable_var(ast, var) {
                    return None;
                }
                Some((var, node.loc))
            }
            _ => None,
        },
        _ => None,
    }
}

/// Whether the cast-stripped expression is an object construction, whose
/// side effects the analysis cannot safely discard.
fn is_construction(ast: &Ast, expr: crate::ast::ExprId) -> bool {
    matches!(
        ast.expr(ast.strip_casts(expr)).kind,
        ExprKind::Construct { .. }
    )
}

/// Variable attribute filter: only local, non-reference variables without
/// an explicit unused marker are reportable.
fn reportable_var(ast: &Ast, var: VarId) -> bool {
    let decl = ast.var(var);
    decl.is_local && !decl.is_reference && !decl.marked_unused
}
