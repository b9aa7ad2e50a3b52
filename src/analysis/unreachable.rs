//! Unreachable code classification.
//!
//! A pure graph-reachability test: blocks with no path from the entry are
//! dead, everything else is live. Working at block granularity avoids false
//! positives from partially-executed blocks and keeps the pass linear in
//! blocks + edges; no statement-level liveness is consulted.

use tracing::debug;

use crate::analysis::UnreachableFinding;
use crate::ast::{Ast, SourceLoc, StmtId, StmtKind};
use crate::cfg::{BlockId, Cfg};
use crate::error::Result;

/// Classify every block and report one finding per maximal unreachable
/// region.
///
/// Regions are connected components of the unreachable blocks under
/// undirected edge adjacency. Each region is reduced to one representative
/// statement: scanning the region's blocks in ascending id, the first
/// statement that performs real work (anything but a bare initializer-less
/// declaration or an empty statement); a block with no such statement falls
/// back to its terminator condition. Regions offering neither contribute no
/// diagnostic.
///
/// Findings come back in reverse block-id order of their representative,
/// which approximates reporting the last unreachable region first. The
/// entry block is reachable by definition; an empty graph is a structural
/// failure caught by validation.
///
/// # Errors
///
/// Returns [`FlowError::Structure`](crate::FlowError::Structure) when the
/// CFG fails validation.
pub fn check_unreachable(ast: &Ast, cfg: &Cfg) -> Result<Vec<UnreachableFinding>> {
    cfg.validate()?;

    let reachable = cfg.reachable_from(cfg.entry);
    let block_count = cfg.block_count();
    if reachable.count_ones(..) == block_count {
        return Ok(Vec::new());
    }

    debug!(
        function = %cfg.function_name,
        unreachable = block_count - reachable.count_ones(..),
        "unreachable blocks detected"
    );

    // Group unreachable blocks into maximal regions: connected components
    // under undirected adjacency, restricted to unreachable blocks.
    let mut visited = reachable.clone();
    let mut regions: Vec<Vec<BlockId>> = Vec::new();
    for start in 0..block_count {
        if visited.contains(start) {
            continue;
        }
        let mut region = Vec::new();
        let mut stack = vec![BlockId(start)];
        visited.insert(start);
        while let Some(block) = stack.pop() {
            region.push(block);
            let node = &cfg.blocks[block.0];
            for &next in node.succs.iter().chain(node.preds.iter()) {
                if !visited.contains(next.0) {
                    visited.insert(next.0);
                    stack.push(next);
                }
            }
        }
        region.sort_unstable();
        regions.push(region);
    }

    let mut found: Vec<(BlockId, UnreachableFinding)> = Vec::new();
    for region in regions {
        if let Some((block, stmt, loc)) = region_representative(ast, cfg, &region) {
            found.push((
                block,
                UnreachableFinding {
                    blocks: region,
                    stmt,
                    loc,
                },
            ));
        }
    }

    found.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(found.into_iter().map(|(_, finding)| finding).collect())
}

/// Pick the representative statement of a region (blocks in ascending id).
fn region_representative(
    ast: &Ast,
    cfg: &Cfg,
    region: &[BlockId],
) -> Option<(BlockId, Option<StmtId>, SourceLoc)> {
    for &block in region {
        let node = cfg.block(block);
        for &stmt in &node.stmts {
            if is_reportable_stmt(ast, stmt) {
                return Some((block, Some(stmt), ast.loc_of_stmt(stmt)));
            }
        }
        if let Some(cond) = node.terminator {
            return Some((block, None, ast.loc_of_expr(cond)));
        }
    }
    None
}

/// Whether a statement can speak for a dead region. Bare declarations
/// without initializers and empty statements execute nothing worth pointing
/// at; a declaration with an initializer performs a store and qualifies.
fn is_reportable_stmt(ast: &Ast, stmt: StmtId) -> bool {
    match &ast.stmt(stmt).kind {
        StmtKind::Decl { init: None, .. } | StmtKind::Empty => false,
        _ => true,
    }
}
