//! flowlint - function-local defect detection over control-flow graphs.
//!
//! This library is the analysis core of a static checker: a pure function
//! of one function's `(CFG, AST)` pair to a list of findings. It detects
//! three classes of defects:
//!
//! - **Dead stores**: values written but never subsequently read
//! - **Unreachable code**: statements no control flow can reach
//! - **Loop-invariant expressions**: computations a loop recomputes although
//!   their value never changes between iterations
//!
//! Parsing, node selection over real source trees, diagnostic rendering,
//! and option handling belong to front-end collaborators; this crate owns
//! the data model they speak and everything with algorithmic content.
//!
//! # Architecture
//!
//! The library is organized into layers, leaves first:
//!
//! - **AST Layer** ([`ast`]): arena AST fragment for one function, with the
//!   introspection surface the analyses need (cast stripping, reference
//!   resolution, attribute queries) and a builder API
//! - **CFG Layer** ([`cfg`]): basic blocks, edges, structural validation,
//!   and traversal orders
//! - **Dataflow Layer** ([`dataflow`]): backward liveness to a fixed point
//! - **Analysis Layer** ([`analysis`]): the three checks, the per-function
//!   driver, and a parallel batch driver
//!
//! # Quick start
//!
//! Lower `int f() { int x = 10; x = 20; return x; }` by hand and analyze it:
//!
//! ```
//! use flowlint::analysis::analyze_function;
//! use flowlint::ast::AstBuilder;
//! use flowlint::cfg::CfgBuilder;
//!
//! let mut b = AstBuilder::new();
//! let x = b.var("x");
//! b.at(1);
//! let ten = b.int(10);
//! let dead = b.decl_stmt(x, Some(ten));
//! b.at(2);
//! let twenty = b.int(20);
//! let target = b.var_ref(x);
//! let assign = b.assign(target, twenty);
//! let store = b.expr_stmt(assign);
//! b.at(3);
//! let result = b.var_ref(x);
//! let ret = b.ret(Some(result));
//! let body = b.compound(vec![dead, store, ret]);
//! let ast = b.finish(Some(body));
//!
//! let mut c = CfgBuilder::new("f");
//! let block = c.block(vec![dead, store, ret]);
//! c.exit(block);
//! let cfg = c.build()?;
//!
//! let report = analyze_function(&ast, &cfg)?.expect("function has a body");
//! assert_eq!(report.dead_stores.len(), 1);
//! assert_eq!(report.dead_stores[0].loc.line, 1);
//! # Ok::<(), flowlint::FlowError>(())
//! ```
//!
//! # Error model
//!
//! A malformed CFG ([`CfgError`]) aborts the analysis of that function
//! only; batch drivers log it and continue. A function without a body or a
//! loop with an empty body is an explicit no-result (`None`), not an
//! error. Constructs the checks are not confident about (reference types,
//! aliasing-prone lvalues, constructions) are skipped silently - a
//! deliberate precision/recall tradeoff.

pub mod analysis;
pub mod ast;
pub mod cfg;
pub mod dataflow;
pub mod error;

pub use analysis::{
    analyze_function, analyze_functions, check_dead_stores, check_loop_invariants,
    check_unreachable, run_check, CheckKind, DeadStoreFinding, Findings, FunctionReport,
    FunctionUnit, InvariantFinding, UnreachableFinding,
};
pub use ast::{Ast, AstBuilder, ExprId, SourceLoc, StmtId, VarId};
pub use cfg::{BasicBlock, BlockId, Cfg, CfgBuilder, CfgError};
pub use dataflow::{analyze_liveness, LivenessResult, LivenessSet};
pub use error::{FlowError, Result};
