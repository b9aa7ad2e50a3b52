//! AST fragment model for one function.
//!
//! A parsing front end lowers each function body into a compact arena of
//! expressions, statements, and a declaration table; the analyses consume
//! it read-only. The model carries exactly the introspection surface the
//! analyses need: assignment-operator classification, literal-kind
//! detection, implicit/static-cast unwrapping, declaration-reference
//! resolution, macro-origin flags, and variable attribute queries.
//!
//! # Modules
//!
//! - [`types`]: node ids, expression/statement enums, declaration table, arena
//! - [`builder`]: [`AstBuilder`] construction API

pub mod builder;
pub mod types;

pub use builder::AstBuilder;
pub use types::{
    AssignOp, Ast, BinOp, CastKind, Expr, ExprId, ExprKind, LiteralKind, SourceLoc, Stmt, StmtId,
    StmtKind, UnaryOp, VarDecl, VarId,
};
