//! CFG construction logic.
//!
//! Front ends declare blocks and edges; the builder derives the mirrored
//! predecessor lists and validates the result. The first declared block is
//! the entry unless overridden.

use crate::ast::{ExprId, StmtId};
use crate::cfg::types::{BasicBlock, BlockId, Cfg, CfgError};

/// Builds a [`Cfg`] for one function.
#[derive(Debug)]
pub struct CfgBuilder {
    function_name: String,
    blocks: Vec<BasicBlock>,
    entry: Option<BlockId>,
    exits: Vec<BlockId>,
}

impl CfgBuilder {
    #[must_use]
    pub fn new(function_name: &str) -> Self {
        Self {
            function_name: function_name.to_string(),
            blocks: Vec::new(),
            entry: None,
            exits: Vec::new(),
        }
    }

    /// Add a block holding `stmts` and no terminator condition.
    pub fn block(&mut self, stmts: Vec<StmtId>) -> BlockId {
        self.push_block(stmts, None)
    }

    /// Add a block that ends in a conditional branch on `cond`.
    pub fn block_with_terminator(&mut self, stmts: Vec<StmtId>, cond: ExprId) -> BlockId {
        self.push_block(stmts, Some(cond))
    }

    fn push_block(&mut self, stmts: Vec<StmtId>, terminator: Option<ExprId>) -> BlockId {
        let id = BlockId(self.blocks.len());
        self.blocks.push(BasicBlock {
            id,
            stmts,
            terminator,
            preds: Vec::new(),
            succs: Vec::new(),
        });
        id
    }

    /// Add a control-flow edge. Both endpoints must already exist;
    /// out-of-range ids surface as a validation error from [`build`].
    ///
    /// [`build`]: CfgBuilder::build
    pub fn edge(&mut self, from: BlockId, to: BlockId) -> &mut Self {
        // An out-of-range endpoint is recorded one-sided on whichever end
        // exists; validate() reports it from build().
        if let Some(block) = self.blocks.get_mut(from.0) {
            block.succs.push(to);
        }
        if let Some(block) = self.blocks.get_mut(to.0) {
            block.preds.push(from);
        }
        self
    }

    /// Override the entry block (defaults to the first declared block).
    pub fn entry(&mut self, id: BlockId) -> &mut Self {
        self.entry = Some(id);
        self
    }

    /// Mark a block as a function exit.
    pub fn exit(&mut self, id: BlockId) -> &mut Self {
        self.exits.push(id);
        self
    }

    /// Finish construction and validate the graph.
    ///
    /// # Errors
    ///
    /// Returns a [`CfgError`] when the graph violates a structural
    /// invariant (no blocks, bad entry/exit, dangling or one-sided edges).
    pub fn build(self) -> Result<Cfg, CfgError> {
        let entry = self.entry.unwrap_or(BlockId(0));
        let cfg = Cfg {
            function_name: self.function_name,
            blocks: self.blocks,
            entry,
            exits: self.exits,
        };
        cfg.validate()?;
        Ok(cfg)
    }
}
