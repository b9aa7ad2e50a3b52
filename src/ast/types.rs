//! Arena AST fragment for a single function.
//!
//! The front end that parses real source owns nothing here; it lowers one
//! function body into this arena and hands it to the analyses together with
//! the function's CFG. Nodes are addressed by dense index ids, so the
//! analyses can store per-node facts in plain vectors and bitsets.
//!
//! Statements are owned by the arena; basic blocks reference them by
//! [`StmtId`] without taking ownership. The arena is built once, is
//! read-only for the lifetime of the analysis pass, and is discarded with
//! the CFG when the function has been processed.

use serde::{Deserialize, Serialize};

/// Index of an expression node in the [`Ast`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExprId(pub usize);

/// Index of a statement node in the [`Ast`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StmtId(pub usize);

/// Stable identity of a local variable declaration.
///
/// Two `VarId` values are equal iff they denote the same declaration in the
/// function's declaration table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VarId(pub usize);

/// Line/column position in the original source (both 1-indexed).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLoc {
    pub line: u32,
    pub column: u32,
}

impl SourceLoc {
    #[inline]
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Kind of literal constant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiteralKind {
    Int(i64),
    Float(f64),
    Char(char),
    Bool(bool),
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    /// Unary `+`
    Plus,
    /// Unary `-`
    Neg,
    /// Logical `!`
    Not,
    /// Bitwise `~`
    BitNot,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

impl UnaryOp {
    /// `++` and `--` in either position. These write their operand.
    #[inline]
    pub fn is_inc_dec(self) -> bool {
        matches!(
            self,
            UnaryOp::PreInc | UnaryOp::PreDec | UnaryOp::PostInc | UnaryOp::PostDec
        )
    }

    /// Unary arithmetic operators (`+`, `-`, `~`). These do not write their
    /// operand, but the loop-invariant classifier still treats their operand
    /// as touched.
    #[inline]
    pub fn is_arithmetic(self) -> bool {
        matches!(self, UnaryOp::Plus | UnaryOp::Neg | UnaryOp::BitNot)
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    BitAnd,
    BitOr,
    BitXor,
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinOp {
    /// Pure comparison operators. Their left operand is never considered
    /// modified by any analysis.
    #[inline]
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge
        )
    }
}

/// Assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignOp {
    /// Plain `=`
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    RemAssign,
    ShlAssign,
    ShrAssign,
    AndAssign,
    OrAssign,
    XorAssign,
}

impl AssignOp {
    /// Compound forms (`+=`, `-=`, ...). These read their target before
    /// writing it and are never reported as stores.
    #[inline]
    pub fn is_compound(self) -> bool {
        !matches!(self, AssignOp::Assign)
    }
}

/// Kind of cast wrapper. Both kinds are transparent to the analyses and are
/// stripped by [`Ast::strip_casts`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CastKind {
    Implicit,
    Static,
}

/// An expression node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprKind {
    Literal(LiteralKind),
    /// Reference to a declared variable.
    VarRef(VarId),
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    Binary {
        op: BinOp,
        lhs: ExprId,
        rhs: ExprId,
    },
    Assign {
        op: AssignOp,
        target: ExprId,
        value: ExprId,
    },
    Cast {
        kind: CastKind,
        inner: ExprId,
    },
    /// Plain function call. The callee is an opaque name; calls are not
    /// resolved across functions.
    Call {
        callee: String,
        args: Vec<ExprId>,
    },
    /// Object construction. Unlike a plain call, removing the enclosing
    /// store would remove the constructor's side effects, so stores of a
    /// construction are never reported dead.
    Construct {
        class: String,
        args: Vec<ExprId>,
    },
    Index {
        base: ExprId,
        index: ExprId,
    },
    Field {
        base: ExprId,
        field: String,
    },
    Deref {
        operand: ExprId,
    },
    AddrOf {
        operand: ExprId,
    },
}

/// An expression with its source position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub loc: SourceLoc,
}

/// A statement node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StmtKind {
    /// Expression evaluated for effect.
    Expr(ExprId),
    /// Local declaration, optionally with an initializer.
    Decl {
        var: VarId,
        init: Option<ExprId>,
    },
    Compound(Vec<StmtId>),
    If {
        cond: ExprId,
        then_branch: StmtId,
        else_branch: Option<StmtId>,
    },
    While {
        cond: ExprId,
        body: StmtId,
    },
    DoWhile {
        body: StmtId,
        cond: ExprId,
    },
    For {
        init: Option<StmtId>,
        cond: Option<ExprId>,
        step: Option<ExprId>,
        body: StmtId,
    },
    Return(Option<ExprId>),
    Break,
    Continue,
    Empty,
}

/// A statement with its source position and macro-origin flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    pub kind: StmtKind,
    pub loc: SourceLoc,
    /// True when the statement was produced by macro expansion. Such
    /// statements are never reported as dead stores.
    #[serde(default)]
    pub from_macro: bool,
}

/// One entry in the function's declaration table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarDecl {
    pub name: String,
    /// Automatic storage duration. Statics and globals referenced from the
    /// body carry `false` and are excluded from dead-store reporting.
    pub is_local: bool,
    /// Reference-typed variables alias other storage and are excluded from
    /// dead-store reporting.
    pub is_reference: bool,
    /// Carries an explicit "intentionally unused" marker attribute.
    pub marked_unused: bool,
}

/// The AST fragment for one function: expression and statement arenas plus
/// the declaration table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ast {
    pub(crate) exprs: Vec<Expr>,
    pub(crate) stmts: Vec<Stmt>,
    pub(crate) vars: Vec<VarDecl>,
    /// Root of the function body, `None` for a bodyless declaration
    /// (pure declaration, deleted/defaulted). Analyses skip such functions
    /// with an explicit no-result.
    pub(crate) body: Option<StmtId>,
}

impl Ast {
    /// Look up an expression node.
    #[inline]
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.0]
    }

    /// Look up a statement node.
    #[inline]
    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.0]
    }

    /// Look up a declaration-table entry.
    #[inline]
    pub fn var(&self, id: VarId) -> &VarDecl {
        &self.vars[id.0]
    }

    /// Size of the variable universe; `VarId` indices are below this bound.
    #[inline]
    pub fn var_count(&self) -> usize {
        self.vars.len()
    }

    /// Root of the function body, if the function has one.
    #[inline]
    pub fn body(&self) -> Option<StmtId> {
        self.body
    }

    #[inline]
    pub fn loc_of_expr(&self, id: ExprId) -> SourceLoc {
        self.exprs[id.0].loc
    }

    #[inline]
    pub fn loc_of_stmt(&self, id: StmtId) -> SourceLoc {
        self.stmts[id.0].loc
    }

    /// Whether a statement originates from macro expansion.
    #[inline]
    pub fn is_macro_stmt(&self, id: StmtId) -> bool {
        self.stmts[id.0].from_macro
    }

    /// Unwrap chains of implicit and static casts.
    pub fn strip_casts(&self, mut id: ExprId) -> ExprId {
        while let ExprKind::Cast { inner, .. } = self.exprs[id.0].kind {
            id = inner;
        }
        id
    }

    /// Resolve an expression to the variable declaration it references, if
    /// after cast stripping it is a direct variable reference.
    pub fn as_var_ref(&self, id: ExprId) -> Option<VarId> {
        match self.exprs[self.strip_casts(id).0].kind {
            ExprKind::VarRef(v) => Some(v),
            _ => None,
        }
    }

    /// The literal kind of an expression, if after cast stripping it is a
    /// literal constant.
    pub fn literal_kind(&self, id: ExprId) -> Option<LiteralKind> {
        match self.exprs[self.strip_casts(id).0].kind {
            ExprKind::Literal(kind) => Some(kind),
            _ => None,
        }
    }

    /// Whether a statement is a for/while/do-while loop.
    #[inline]
    pub fn is_loop(&self, id: StmtId) -> bool {
        matches!(
            self.stmts[id.0].kind,
            StmtKind::While { .. } | StmtKind::DoWhile { .. } | StmtKind::For { .. }
        )
    }

    /// Collect every loop statement under `root`, in source order, including
    /// loops nested inside other loops. This is the node-selection glue that
    /// feeds the loop-invariant classifier.
    pub fn loops_in(&self, root: StmtId) -> Vec<StmtId> {
        let mut loops = Vec::new();
        self.collect_loops(root, &mut loops);
        loops
    }

    fn collect_loops(&self, id: StmtId, out: &mut Vec<StmtId>) {
        match &self.stmts[id.0].kind {
            StmtKind::Compound(children) => {
                for &child in children {
                    self.collect_loops(child, out);
                }
            }
            StmtKind::If {
                then_branch,
                else_branch,
                ..
            } => {
                self.collect_loops(*then_branch, out);
                if let Some(els) = else_branch {
                    self.collect_loops(*els, out);
                }
            }
            StmtKind::While { body, .. } | StmtKind::DoWhile { body, .. } => {
                out.push(id);
                self.collect_loops(*body, out);
            }
            StmtKind::For { init, body, .. } => {
                out.push(id);
                if let Some(init) = init {
                    self.collect_loops(*init, out);
                }
                self.collect_loops(*body, out);
            }
            StmtKind::Expr(_)
            | StmtKind::Decl { .. }
            | StmtKind::Return(_)
            | StmtKind::Break
            | StmtKind::Continue
            | StmtKind::Empty => {}
        }
    }
}
