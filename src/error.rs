//! Central error types for flowlint.
//!
//! Uses `thiserror` for ergonomic error definitions with automatic
//! `Display` and `From` implementations. The taxonomy separates a
//! structural failure (a malformed CFG, which aborts the analysis of one
//! function) from an inapplicable request (a check invoked on a node it
//! does not apply to).

use thiserror::Error;

use crate::ast::StmtId;
use crate::cfg::CfgError;

/// Errors surfaced by the analysis core.
///
/// A [`Structure`](FlowError::Structure) error indicates the CFG handed in
/// is malformed; it aborts the analysis of that function only, and batch
/// drivers log it and continue. A [`NotALoop`](FlowError::NotALoop) error
/// indicates a loop check was invoked on a statement that is not a loop.
#[derive(Debug, Error)]
pub enum FlowError {
    /// The control-flow graph failed structural validation.
    #[error("malformed control flow graph: {0}")]
    Structure(#[from] CfgError),

    /// A loop-specific check was asked to analyze a non-loop statement.
    #[error("statement {0:?} is not a loop")]
    NotALoop(StmtId),
}

/// Convenience alias for results carrying a [`FlowError`].
pub type Result<T, E = FlowError> = std::result::Result<T, E>;
