//! Live variable analysis - backward dataflow to a fixed point.
//!
//! A variable is live at a program point if its current value may be read
//! before being overwritten. The solver computes, for every basic block,
//! the set of variables live on entry (`live_in`) and on exit (`live_out`).
//!
//! # Dataflow equations
//!
//! - `gen[B]`  = variables read in B before any local write
//! - `kill[B]` = variables written in B
//! - `live_out[B]` = UNION of `live_in[S]` over all successors S
//! - `live_in[B]`  = `gen[B]` UNION (`live_out[B]` - `kill[B]`)
//!
//! Every set grows monotonically and is bounded by the finite variable
//! universe, so the worklist iteration terminates; re-running the solver on
//! its own output changes nothing.

use std::collections::VecDeque;

use fixedbitset::FixedBitSet;
use tracing::{debug, trace};

use crate::ast::{Ast, ExprId, ExprKind, StmtId, StmtKind, VarId};
use crate::cfg::{BasicBlock, BlockId, Cfg};
use crate::error::Result;

/// A set of variables, one bit per declaration-table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LivenessSet {
    bits: FixedBitSet,
}

impl LivenessSet {
    /// Empty set over a universe of `universe` variables.
    #[must_use]
    pub fn new(universe: usize) -> Self {
        Self {
            bits: FixedBitSet::with_capacity(universe),
        }
    }

    #[inline]
    pub fn insert(&mut self, var: VarId) {
        self.bits.insert(var.0);
    }

    #[inline]
    pub fn remove(&mut self, var: VarId) {
        self.bits.set(var.0, false);
    }

    #[inline]
    pub fn contains(&self, var: VarId) -> bool {
        self.bits.contains(var.0)
    }

    /// Union `other` into `self`; returns true if `self` grew.
    pub fn union_with(&mut self, other: &Self) -> bool {
        let before = self.bits.count_ones(..);
        self.bits.union_with(&other.bits);
        self.bits.count_ones(..) > before
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bits.count_ones(..)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over the member variables in index order.
    pub fn iter(&self) -> impl Iterator<Item = VarId> + '_ {
        self.bits.ones().map(VarId)
    }
}

/// Variable reads and writes performed by one statement or expression.
///
/// Reads and writes may repeat; consumers treat both lists as multisets
/// folded into sets. A statement is atomic for liveness purposes: its reads
/// happen before its writes, which matches C evaluation shape for
/// assignments (`x = x + 1` reads `x`, then writes it).
#[derive(Debug, Default, Clone)]
pub struct StmtEffects {
    pub reads: Vec<VarId>,
    pub writes: Vec<VarId>,
}

/// Collect the reads and writes of one simple statement.
///
/// Control statements contribute only their own condition reads; in a
/// well-formed CFG their bodies live in other blocks.
pub fn stmt_effects(ast: &Ast, stmt: StmtId) -> StmtEffects {
    let mut effects = StmtEffects::default();
    collect_stmt_effects(ast, stmt, &mut effects);
    effects
}

fn collect_stmt_effects(ast: &Ast, stmt: StmtId, effects: &mut StmtEffects) {
    match &ast.stmt(stmt).kind {
        StmtKind::Expr(expr) => expr_effects(ast, *expr, effects),
        StmtKind::Decl { var, init } => {
            if let Some(init) = init {
                expr_effects(ast, *init, effects);
            }
            effects.writes.push(*var);
        }
        StmtKind::Compound(children) => {
            for &child in children {
                collect_stmt_effects(ast, child, effects);
            }
        }
        StmtKind::If { cond, .. }
        | StmtKind::While { cond, .. }
        | StmtKind::DoWhile { cond, .. } => expr_effects(ast, *cond, effects),
        StmtKind::For { cond, .. } => {
            if let Some(cond) = cond {
                expr_effects(ast, *cond, effects);
            }
        }
        StmtKind::Return(value) => {
            if let Some(value) = value {
                expr_effects(ast, *value, effects);
            }
        }
        StmtKind::Break | StmtKind::Continue | StmtKind::Empty => {}
    }
}

/// Collect the reads and writes of an expression tree.
///
/// Writes are recorded only for direct variable targets. Assignment through
/// an index, field, or dereference writes no tracked variable; every
/// variable mentioned in such an lvalue is recorded as read instead, which
/// keeps aliased storage live without an alias model.
pub fn expr_effects(ast: &Ast, expr: ExprId, effects: &mut StmtEffects) {
    match &ast.expr(expr).kind {
        ExprKind::Literal(_) => {}
        ExprKind::VarRef(var) => effects.reads.push(*var),
        ExprKind::Unary { op, operand } => {
            if op.is_inc_dec() {
                match ast.as_var_ref(*operand) {
                    Some(var) => {
                        effects.reads.push(var);
                        effects.writes.push(var);
                    }
                    // ++a[i] and friends: address computation only.
                    None => expr_effects(ast, *operand, effects),
                }
            } else {
                expr_effects(ast, *operand, effects);
            }
        }
        ExprKind::Binary { lhs, rhs, .. } => {
            expr_effects(ast, *lhs, effects);
            expr_effects(ast, *rhs, effects);
        }
        ExprKind::Assign { op, target, value } => {
            expr_effects(ast, *value, effects);
            match ast.as_var_ref(*target) {
                Some(var) => {
                    if op.is_compound() {
                        effects.reads.push(var);
                    }
                    effects.writes.push(var);
                }
                None => expr_effects(ast, *target, effects),
            }
        }
        ExprKind::Cast { inner, .. } => expr_effects(ast, *inner, effects),
        ExprKind::Call { args, .. } | ExprKind::Construct { args, .. } => {
            for &arg in args {
                expr_effects(ast, arg, effects);
            }
        }
        ExprKind::Index { base, index } => {
            expr_effects(ast, *base, effects);
            expr_effects(ast, *index, effects);
        }
        ExprKind::Field { base, .. } => expr_effects(ast, *base, effects),
        ExprKind::Deref { operand } | ExprKind::AddrOf { operand } => {
            expr_effects(ast, *operand, effects);
        }
    }
}

/// Complete result of liveness analysis, all vectors indexed by block id.
#[derive(Debug, Clone)]
pub struct LivenessResult {
    /// Variables live on block entry.
    pub live_in: Vec<LivenessSet>,
    /// Variables live on block exit.
    pub live_out: Vec<LivenessSet>,
    /// Variables read before any local write, per block.
    pub gen: Vec<LivenessSet>,
    /// Variables written, per block.
    pub kill: Vec<LivenessSet>,
    /// Worklist iterations until the fixed point.
    pub iterations: usize,
}

/// Compute the local `(gen, kill)` pair for one block.
///
/// Scans the statements in reverse, with the terminator condition first
/// since it is the block's last evaluation: a write removes the variable
/// from the running live set, a read inserts it. What remains at the top
/// of the block is `gen`; everything written is `kill`.
fn block_gen_kill(ast: &Ast, block: &BasicBlock, universe: usize) -> (LivenessSet, LivenessSet) {
    let mut gen = LivenessSet::new(universe);
    let mut kill = LivenessSet::new(universe);

    let fold = |effects: &StmtEffects, gen: &mut LivenessSet, kill: &mut LivenessSet| {
        for &var in &effects.writes {
            gen.remove(var);
            kill.insert(var);
        }
        for &var in &effects.reads {
            gen.insert(var);
        }
    };

    if let Some(cond) = block.terminator {
        let mut effects = StmtEffects::default();
        expr_effects(ast, cond, &mut effects);
        fold(&effects, &mut gen, &mut kill);
    }
    for &stmt in block.stmts.iter().rev() {
        let effects = stmt_effects(ast, stmt);
        fold(&effects, &mut gen, &mut kill);
    }

    (gen, kill)
}

/// Run liveness analysis over one function.
///
/// Validates the CFG first; a malformed graph aborts the analysis of this
/// function without touching any other.
///
/// # Errors
///
/// Returns [`FlowError::Structure`](crate::FlowError::Structure) when the
/// CFG fails validation.
pub fn analyze_liveness(ast: &Ast, cfg: &Cfg) -> Result<LivenessResult> {
    cfg.validate()?;

    let universe = ast.var_count();
    let block_count = cfg.block_count();

    let mut gen = Vec::with_capacity(block_count);
    let mut kill = Vec::with_capacity(block_count);
    for block in &cfg.blocks {
        let (g, k) = block_gen_kill(ast, block, universe);
        gen.push(g);
        kill.push(k);
    }

    let mut live_in: Vec<LivenessSet> = (0..block_count).map(|_| LivenessSet::new(universe)).collect();
    let mut live_out: Vec<LivenessSet> = (0..block_count).map(|_| LivenessSet::new(universe)).collect();

    // Seed exits-first (postorder) so most liveness propagates in one pass;
    // the worklist re-queues predecessors until nothing changes.
    let order = cfg.reverse_postorder();
    let mut worklist: VecDeque<BlockId> = order.iter().rev().copied().collect();
    let mut in_worklist = FixedBitSet::with_capacity(block_count);
    in_worklist.insert_range(..);

    let mut iterations = 0usize;
    while let Some(block) = worklist.pop_front() {
        in_worklist.set(block.0, false);
        iterations += 1;

        let mut new_out = LivenessSet::new(universe);
        for &succ in &cfg.blocks[block.0].succs {
            new_out.union_with(&live_in[succ.0]);
        }

        let mut new_in = gen[block.0].clone();
        for var in new_out.iter() {
            if !kill[block.0].contains(var) {
                new_in.insert(var);
            }
        }

        live_out[block.0] = new_out;
        if new_in != live_in[block.0] {
            trace!(block = block.0, live = new_in.len(), "live-in changed");
            live_in[block.0] = new_in;
            for &pred in &cfg.blocks[block.0].preds {
                if !in_worklist.contains(pred.0) {
                    in_worklist.insert(pred.0);
                    worklist.push_back(pred);
                }
            }
        }
    }

    debug!(
        function = %cfg.function_name,
        blocks = block_count,
        variables = universe,
        iterations,
        "liveness fixed point reached"
    );

    Ok(LivenessResult {
        live_in,
        live_out,
        gen,
        kill,
        iterations,
    })
}
