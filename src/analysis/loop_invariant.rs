//! Loop-invariant expression classification.
//!
//! A purely syntactic check over a loop's body: a statement is invariant
//! when the value it computes is guaranteed identical on every iteration,
//! judged only from the shapes of the expressions involved and the set of
//! variables the loop construct touches. No dataflow is consulted.
//!
//! Known limitation, carried intentionally: without a fixed point the
//! classifier can miss invariance (a binary right-hand side of unmodified
//! variables is vetoed only by membership in the modified set) and can
//! over-report it (calls with invariant arguments pass the composite rule,
//! order-dependent re-assignment within one iteration is not modelled).

use rustc_hash::FxHashSet;
use tracing::trace;

use crate::analysis::InvariantFinding;
use crate::ast::{Ast, ExprId, ExprKind, StmtId, StmtKind, VarId};
use crate::error::{FlowError, Result};

/// Classify the body of one loop statement.
///
/// Returns `Ok(None)` when the loop body is empty - there is nothing to
/// classify, an explicit no-result rather than an error. One finding is
/// produced per qualifying top-level child statement of the body, at that
/// statement's own location.
///
/// # Errors
///
/// Returns [`FlowError::NotALoop`] when `loop_stmt` is not a
/// for/while/do-while statement.
pub fn check_loop_invariants(ast: &Ast, loop_stmt: StmtId) -> Result<Option<Vec<InvariantFinding>>> {
    let body = match &ast.stmt(loop_stmt).kind {
        StmtKind::While { body, .. } | StmtKind::DoWhile { body, .. } => *body,
        StmtKind::For { body, .. } => *body,
        _ => return Err(FlowError::NotALoop(loop_stmt)),
    };

    let children: Vec<StmtId> = match &ast.stmt(body).kind {
        StmtKind::Compound(children) => children.clone(),
        StmtKind::Empty => Vec::new(),
        _ => vec![body],
    };
    if children.is_empty() {
        return Ok(None);
    }

    let modified = collect_modified(ast, loop_stmt);
    trace!(
        loop_stmt = loop_stmt.0,
        modified = modified.len(),
        "loop modified-set collected"
    );

    let mut findings = Vec::new();
    for &child in &children {
        if is_invariant_stmt(ast, child, &modified) {
            findings.push(InvariantFinding {
                loop_stmt,
                stmt: child,
                loc: ast.loc_of_stmt(child),
            });
        }
    }
    Ok(Some(findings))
}

/// Every variable the loop construct may change between iterations.
///
/// For a for-loop this spans init, condition, step, and body; while and
/// do-while contribute condition and body. A variable counts as modified
/// when it is the direct target of any assignment (plain or compound), the
/// operand of an increment/decrement or unary arithmetic operator, the
/// subject of a declaration with an initializer, or has its address taken
/// (aliasing-prone escape). The left operand of a pure comparison does not
/// count.
fn collect_modified(ast: &Ast, loop_stmt: StmtId) -> FxHashSet<VarId> {
    let mut modified = FxHashSet::default();
    match &ast.stmt(loop_stmt).kind {
        StmtKind::While { cond, body } | StmtKind::DoWhile { body, cond } => {
            modified_in_expr(ast, *cond, &mut modified);
            modified_in_stmt(ast, *body, &mut modified);
        }
        StmtKind::For {
            init,
            cond,
            step,
            body,
        } => {
            if let Some(init) = init {
                modified_in_stmt(ast, *init, &mut modified);
            }
            if let Some(cond) = cond {
                modified_in_expr(ast, *cond, &mut modified);
            }
            if let Some(step) = step {
                modified_in_expr(ast, *step, &mut modified);
            }
            modified_in_stmt(ast, *body, &mut modified);
        }
        _ => {}
    }
    modified
}

fn modified_in_stmt(ast: &Ast, stmt: StmtId, modified: &mut FxHashSet<VarId>) {
    match &ast.stmt(stmt).kind {
        StmtKind::Expr(expr) => modified_in_expr(ast, *expr, modified),
        StmtKind::Decl { var, init } => {
            if let Some(init) = init {
                modified.insert(*var);
                modified_in_expr(ast, *init, modified);
            }
        }
        StmtKind::Compound(children) => {
            for &child in children {
                modified_in_stmt(ast, child, modified);
            }
        }
        StmtKind::If {
            cond,
            then_branch,
            else_branch,
        } => {
            modified_in_expr(ast, *cond, modified);
            modified_in_stmt(ast, *then_branch, modified);
            if let Some(els) = else_branch {
                modified_in_stmt(ast, *els, modified);
            }
        }
        StmtKind::While { cond, body } | StmtKind::DoWhile { body, cond } => {
            modified_in_expr(ast, *cond, modified);
            modified_in_stmt(ast, *body, modified);
        }
        StmtKind::For {
            init,
            cond,
            step,
            body,
        } => {
            if let Some(init) = init {
                modified_in_stmt(ast, *init, modified);
            }
            if let Some(cond) = cond {
                modified_in_expr(ast, *cond, modified);
            }
            if let Some(step) = step {
                modified_in_expr(ast, *step, modified);
            }
            modified_in_stmt(ast, *body, modified);
        }
        StmtKind::Return(value) => {
            if let Some(value) = value {
                modified_in_expr(ast, *value, modified);
            }
        }
        StmtKind::Break | StmtKind::Continue | StmtKind::Empty => {}
    }
}

fn modified_in_expr(ast: &Ast, expr: ExprId, modified: &mut FxHashSet<VarId>) {
    match &ast.expr(expr).kind {
        ExprKind::Literal(_) | ExprKind::VarRef(_) => {}
        ExprKind::Unary { op, operand } => {
            if op.is_inc_dec() || op.is_arithmetic() {
                if let Some(var) = ast.as_var_ref(*operand) {
                    modified.insert(var);
                }
            }
            modified_in_expr(ast, *operand, modified);
        }
        ExprKind::Binary { lhs, rhs, .. } => {
            modified_in_expr(ast, *lhs, modified);
            modified_in_expr(ast, *rhs, modified);
        }
        ExprKind::Assign { target, value, .. } => {
            if let Some(var) = ast.as_var_ref(*target) {
                modified.insert(var);
            } else {
                modified_in_expr(ast, *target, modified);
            }
            modified_in_expr(ast, *value, modified);
        }
        ExprKind::Cast { inner, .. } => modified_in_expr(ast, *inner, modified),
        ExprKind::Call { args, .. } | ExprKind::Construct { args, .. } => {
            for &arg in args {
                modified_in_expr(ast, arg, modified);
            }
        }
        ExprKind::Index { base, index } => {
            modified_in_expr(ast, *base, modified);
            modified_in_expr(ast, *index, modified);
        }
        ExprKind::Field { base, .. } => modified_in_expr(ast, *base, modified),
        ExprKind::Deref { operand } => modified_in_expr(ast, *operand, modified),
        ExprKind::AddrOf { operand } => {
            if let Some(var) = ast.as_var_ref(*operand) {
                modified.insert(var);
            }
            modified_in_expr(ast, *operand, modified);
        }
    }
}

/// All-or-nothing invariance test for a statement: either the whole
/// statement computes the same thing every iteration, or nothing in it is
/// hoisted. Control transfers, bare declarations, and empty compounds never
/// pass.
fn is_invariant_stmt(ast: &Ast, stmt: StmtId, modified: &FxHashSet<VarId>) -> bool {
    match &ast.stmt(stmt).kind {
        StmtKind::Expr(expr) => is_invariant_expr(ast, *expr, modified),
        StmtKind::Decl {
            init: Some(init), ..
        } => is_invariant_expr(ast, *init, modified),
        StmtKind::Decl { init: None, .. } => false,
        StmtKind::Compound(children) => {
            !children.is_empty()
                && children
                    .iter()
                    .all(|&child| is_invariant_stmt(ast, child, modified))
        }
        StmtKind::If {
            cond,
            then_branch,
            else_branch,
        } => {
            is_invariant_expr(ast, *cond, modified)
                && is_invariant_stmt(ast, *then_branch, modified)
                && else_branch.map_or(true, |els| is_invariant_stmt(ast, els, modified))
        }
        StmtKind::While { cond, body } | StmtKind::DoWhile { body, cond } => {
            is_invariant_expr(ast, *cond, modified) && is_invariant_stmt(ast, *body, modified)
        }
        StmtKind::For {
            init,
            cond,
            step,
            body,
        } => {
            init.map_or(true, |init| is_invariant_stmt(ast, init, modified))
                && cond.map_or(true, |cond| is_invariant_expr(ast, cond, modified))
                && step.map_or(true, |step| is_invariant_expr(ast, step, modified))
                && is_invariant_stmt(ast, *body, modified)
        }
        StmtKind::Return(_) | StmtKind::Break | StmtKind::Continue | StmtKind::Empty => false,
    }
}

fn is_invariant_expr(ast: &Ast, expr: ExprId, modified: &FxHashSet<VarId>) -> bool {
    match &ast.expr(ast.strip_casts(expr)).kind {
        ExprKind::Literal(_) => true,
        ExprKind::VarRef(var) => !modified.contains(var),
        ExprKind::Assign { target, value, .. } => {
            // Reject assignment through anything but a simple variable;
            // reasoning about aliased targets is out of reach here.
            if ast.as_var_ref(*target).is_none() {
                return false;
            }
            match &ast.expr(ast.strip_casts(*value)).kind {
                ExprKind::Literal(_) => true,
                ExprKind::VarRef(var) => !modified.contains(var),
                _ => is_invariant_expr(ast, *value, modified),
            }
        }
        ExprKind::Unary { op, operand } => {
            !op.is_inc_dec() && is_invariant_expr(ast, *operand, modified)
        }
        ExprKind::Binary { lhs, rhs, .. } => {
            is_invariant_expr(ast, *lhs, modified) && is_invariant_expr(ast, *rhs, modified)
        }
        ExprKind::Call { args, .. } | ExprKind::Construct { args, .. } => args
            .iter()
            .all(|&arg| is_invariant_expr(ast, arg, modified)),
        ExprKind::Index { base, index } => {
            is_invariant_expr(ast, *base, modified) && is_invariant_expr(ast, *index, modified)
        }
        ExprKind::Field { base, .. } => is_invariant_expr(ast, *base, modified),
        ExprKind::Deref { operand } | ExprKind::AddrOf { operand } => {
            is_invariant_expr(ast, *operand, modified)
        }
        // strip_casts already unwrapped any cast chain.
        ExprKind::Cast { inner, .. } => is_invariant_expr(ast, *inner, modified),
    }
}
