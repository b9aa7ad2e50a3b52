//! Dataflow analysis framework.
//!
//! Classical iterative dataflow over the CFG. The one analysis this crate
//! needs is backward liveness, which feeds the dead store detector; the
//! statement effect extraction it is built on is shared with the detector's
//! per-statement refinement.
//!
//! # Example
//!
//! ```ignore
//! use flowlint::dataflow::analyze_liveness;
//!
//! let result = analyze_liveness(&ast, &cfg)?;
//! for (block, live) in result.live_out.iter().enumerate() {
//!     println!("block {}: {} variables live out", block, live.len());
//! }
//! ```

pub mod liveness;

pub use liveness::{
    analyze_liveness, expr_effects, stmt_effects, LivenessResult, LivenessSet, StmtEffects,
};
