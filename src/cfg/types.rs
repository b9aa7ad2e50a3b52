//! CFG type definitions.
//!
//! One [`Cfg`] per function, built by the front end and discarded after the
//! function has been analyzed. Blocks reference statements owned by the
//! [`Ast`](crate::ast::Ast) arena; predecessor and successor lists are
//! stored on the blocks themselves.

use fixedbitset::FixedBitSet;
use serde::{Deserialize, Serialize};

use crate::ast::{ExprId, StmtId};

/// Unique identifier for a basic block; dense index into [`Cfg::blocks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub usize);

/// Errors that can occur during CFG validation.
///
/// These indicate structural inconsistencies that make the graph unsafe to
/// analyze. Validation failure aborts the analysis of the affected function
/// only; the overall run continues with the next function.
#[derive(Debug, thiserror::Error)]
pub enum CfgError {
    /// The graph contains no blocks at all, so there is no entry.
    #[error("control flow graph has no blocks")]
    NoBlocks,

    /// Entry block id is out of range.
    #[error("entry block {0:?} out of range")]
    InvalidEntry(BlockId),

    /// An exit block id is out of range.
    #[error("exit block {0:?} out of range")]
    InvalidExit(BlockId),

    /// A block's stored id disagrees with its index.
    #[error("block at index {index} carries id {found:?}")]
    BlockIdMismatch { index: usize, found: BlockId },

    /// An edge references a block that does not exist.
    #[error("edge {from:?} -> {to:?} references a block out of range")]
    EdgeOutOfRange { from: BlockId, to: BlockId },

    /// A successor edge has no matching predecessor entry (or vice versa).
    #[error("edge {from:?} -> {to:?} is not mirrored on the other endpoint")]
    AsymmetricEdge { from: BlockId, to: BlockId },
}

/// A basic block: a maximal straight-line sequence of simple statements
/// with one entry and one exit point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicBlock {
    /// Unique block identifier.
    pub id: BlockId,
    /// Statements in execution order, referencing the AST arena. May be
    /// empty for structural junction blocks.
    pub stmts: Vec<StmtId>,
    /// Condition expression evaluated after the statements when the block
    /// ends in a conditional branch.
    pub terminator: Option<ExprId>,
    /// Predecessor blocks (incoming edges).
    pub preds: Vec<BlockId>,
    /// Successor blocks (outgoing edges).
    pub succs: Vec<BlockId>,
}

impl BasicBlock {
    /// A block with neither statements nor a terminator condition.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty() && self.terminator.is_none()
    }
}

/// Complete control flow graph for one function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cfg {
    /// Function name, carried through to findings.
    pub function_name: String,
    /// All blocks, indexed by their [`BlockId`].
    pub blocks: Vec<BasicBlock>,
    /// The single entry block.
    pub entry: BlockId,
    /// Exit blocks; more than one when the function returns early.
    pub exits: Vec<BlockId>,
}

impl Cfg {
    /// Look up a block.
    #[inline]
    pub fn block(&self, id: BlockId) -> &BasicBlock {
        &self.blocks[id.0]
    }

    /// Number of blocks in the graph.
    #[inline]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Validate structural invariants.
    ///
    /// Checks that the entry and all exits exist, that block ids match
    /// their indices, that every edge endpoint is in range, and that every
    /// successor edge is mirrored by a predecessor edge on the target.
    ///
    /// # Errors
    ///
    /// Returns the first [`CfgError`] encountered.
    pub fn validate(&self) -> Result<(), CfgError> {
        if self.blocks.is_empty() {
            return Err(CfgError::NoBlocks);
        }
        if self.entry.0 >= self.blocks.len() {
            return Err(CfgError::InvalidEntry(self.entry));
        }
        for &exit in &self.exits {
            if exit.0 >= self.blocks.len() {
                return Err(CfgError::InvalidExit(exit));
            }
        }
        for (index, block) in self.blocks.iter().enumerate() {
            if block.id.0 != index {
                return Err(CfgError::BlockIdMismatch {
                    index,
                    found: block.id,
                });
            }
            for &succ in &block.succs {
                if succ.0 >= self.blocks.len() {
                    return Err(CfgError::EdgeOutOfRange {
                        from: block.id,
                        to: succ,
                    });
                }
                if !self.blocks[succ.0].preds.contains(&block.id) {
                    return Err(CfgError::AsymmetricEdge {
                        from: block.id,
                        to: succ,
                    });
                }
            }
            for &pred in &block.preds {
                if pred.0 >= self.blocks.len() {
                    return Err(CfgError::EdgeOutOfRange {
                        from: pred,
                        to: block.id,
                    });
                }
                if !self.blocks[pred.0].succs.contains(&block.id) {
                    return Err(CfgError::AsymmetricEdge {
                        from: pred,
                        to: block.id,
                    });
                }
            }
        }
        Ok(())
    }

    /// Compute the set of blocks reachable from `start` via successor
    /// edges, as a bitset indexed by block id. Breadth-first traversal,
    /// linear in blocks + edges.
    pub fn reachable_from(&self, start: BlockId) -> FixedBitSet {
        let mut reachable = FixedBitSet::with_capacity(self.blocks.len());
        let mut queue = std::collections::VecDeque::new();
        reachable.insert(start.0);
        queue.push_back(start);

        while let Some(block) = queue.pop_front() {
            for &succ in &self.blocks[block.0].succs {
                if !reachable.contains(succ.0) {
                    reachable.insert(succ.0);
                    queue.push_back(succ);
                }
            }
        }

        reachable
    }

    /// Blocks in reverse postorder of a depth-first traversal from the
    /// entry. Blocks unreachable from the entry are appended at the end so
    /// dataflow still visits them.
    ///
    /// Iterative DFS with an explicit stack; recursion depth is not bounded
    /// by function size.
    pub fn reverse_postorder(&self) -> Vec<BlockId> {
        let n = self.blocks.len();
        let mut visited = FixedBitSet::with_capacity(n);
        let mut postorder = Vec::with_capacity(n);
        let mut stack: Vec<(BlockId, usize)> = Vec::new();

        if n > 0 {
            visited.insert(self.entry.0);
            stack.push((self.entry, 0));
        }

        while let Some(frame) = stack.last_mut() {
            let (block, next_child) = *frame;
            let succs = &self.blocks[block.0].succs;
            if next_child < succs.len() {
                frame.1 += 1;
                let succ = succs[next_child];
                if !visited.contains(succ.0) {
                    visited.insert(succ.0);
                    stack.push((succ, 0));
                }
            } else {
                postorder.push(block);
                stack.pop();
            }
        }

        let mut order: Vec<BlockId> = postorder.into_iter().rev().collect();
        for index in 0..n {
            if !visited.contains(index) {
                order.push(BlockId(index));
            }
        }
        order
    }
}
