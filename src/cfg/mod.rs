//! Control flow graph model for one function.
//!
//! The front end builds one [`Cfg`] per function body: basic blocks holding
//! ordered statement references, predecessor/successor edge lists, an
//! optional terminator condition per block, a single entry, and zero or
//! more exits. The analyses consume it read-only and discard it when the
//! function has been processed.
//!
//! # Modules
//!
//! - [`types`]: blocks, graph, structural validation, traversal orders
//! - [`builder`]: [`CfgBuilder`] construction API

pub mod builder;
pub mod types;

pub use builder::CfgBuilder;
pub use types::{BasicBlock, BlockId, Cfg, CfgError};
