//! AST construction API.
//!
//! Front ends lower parsed source through this builder; tests use it to
//! assemble function fragments by hand. Every node is stamped with the
//! builder's current source cursor, advanced with [`AstBuilder::at`].

use crate::ast::types::{
    AssignOp, Ast, BinOp, CastKind, Expr, ExprId, ExprKind, LiteralKind, SourceLoc, Stmt, StmtId,
    StmtKind, UnaryOp, VarDecl, VarId,
};

/// Builds the [`Ast`] arena for one function.
#[derive(Debug)]
pub struct AstBuilder {
    exprs: Vec<Expr>,
    stmts: Vec<Stmt>,
    vars: Vec<VarDecl>,
    cursor: SourceLoc,
}

impl Default for AstBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AstBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            exprs: Vec::new(),
            stmts: Vec::new(),
            vars: Vec::new(),
            cursor: SourceLoc::new(1, 1),
        }
    }

    /// Move the source cursor to the start of `line`. Nodes created after
    /// this call carry that position until the cursor moves again.
    pub fn at(&mut self, line: u32) -> &mut Self {
        self.cursor = SourceLoc::new(line, 1);
        self
    }

    // -------------------------------------------------------------------------
    // Declaration table
    // -------------------------------------------------------------------------

    /// Declare an ordinary local variable.
    pub fn var(&mut self, name: &str) -> VarId {
        self.var_with(name, true, false, false)
    }

    /// Declare a variable with explicit attributes.
    pub fn var_with(
        &mut self,
        name: &str,
        is_local: bool,
        is_reference: bool,
        marked_unused: bool,
    ) -> VarId {
        let id = VarId(self.vars.len());
        self.vars.push(VarDecl {
            name: name.to_string(),
            is_local,
            is_reference,
            marked_unused,
        });
        id
    }

    // -------------------------------------------------------------------------
    // Expressions
    // -------------------------------------------------------------------------

    fn push_expr(&mut self, kind: ExprKind) -> ExprId {
        let id = ExprId(self.exprs.len());
        self.exprs.push(Expr {
            kind,
            loc: self.cursor,
        });
        id
    }

    pub fn int(&mut self, value: i64) -> ExprId {
        self.push_expr(ExprKind::Literal(LiteralKind::Int(value)))
    }

    pub fn float(&mut self, value: f64) -> ExprId {
        self.push_expr(ExprKind::Literal(LiteralKind::Float(value)))
    }

    pub fn char_lit(&mut self, value: char) -> ExprId {
        self.push_expr(ExprKind::Literal(LiteralKind::Char(value)))
    }

    pub fn bool_lit(&mut self, value: bool) -> ExprId {
        self.push_expr(ExprKind::Literal(LiteralKind::Bool(value)))
    }

    pub fn var_ref(&mut self, var: VarId) -> ExprId {
        self.push_expr(ExprKind::VarRef(var))
    }

    pub fn unary(&mut self, op: UnaryOp, operand: ExprId) -> ExprId {
        self.push_expr(ExprKind::Unary { op, operand })
    }

    pub fn binary(&mut self, op: BinOp, lhs: ExprId, rhs: ExprId) -> ExprId {
        self.push_expr(ExprKind::Binary { op, lhs, rhs })
    }

    /// Plain `target = value`.
    pub fn assign(&mut self, target: ExprId, value: ExprId) -> ExprId {
        self.push_expr(ExprKind::Assign {
            op: AssignOp::Assign,
            target,
            value,
        })
    }

    /// Compound assignment (`+=`, `-=`, ...).
    pub fn compound_assign(&mut self, op: AssignOp, target: ExprId, value: ExprId) -> ExprId {
        self.push_expr(ExprKind::Assign { op, target, value })
    }

    pub fn cast(&mut self, kind: CastKind, inner: ExprId) -> ExprId {
        self.push_expr(ExprKind::Cast { kind, inner })
    }

    pub fn call(&mut self, callee: &str, args: Vec<ExprId>) -> ExprId {
        self.push_expr(ExprKind::Call {
            callee: callee.to_string(),
            args,
        })
    }

    pub fn construct(&mut self, class: &str, args: Vec<ExprId>) -> ExprId {
        self.push_expr(ExprKind::Construct {
            class: class.to_string(),
            args,
        })
    }

    pub fn index(&mut self, base: ExprId, index: ExprId) -> ExprId {
        self.push_expr(ExprKind::Index { base, index })
    }

    pub fn field(&mut self, base: ExprId, field: &str) -> ExprId {
        self.push_expr(ExprKind::Field {
            base,
            field: field.to_string(),
        })
    }

    pub fn deref(&mut self, operand: ExprId) -> ExprId {
        self.push_expr(ExprKind::Deref { operand })
    }

    pub fn addr_of(&mut self, operand: ExprId) -> ExprId {
        self.push_expr(ExprKind::AddrOf { operand })
    }

    // -------------------------------------------------------------------------
    // Statements
    // -------------------------------------------------------------------------

    fn push_stmt(&mut self, kind: StmtKind) -> StmtId {
        let id = StmtId(self.stmts.len());
        self.stmts.push(Stmt {
            kind,
            loc: self.cursor,
            from_macro: false,
        });
        id
    }

    pub fn expr_stmt(&mut self, expr: ExprId) -> StmtId {
        self.push_stmt(StmtKind::Expr(expr))
    }

    pub fn decl_stmt(&mut self, var: VarId, init: Option<ExprId>) -> StmtId {
        self.push_stmt(StmtKind::Decl { var, init })
    }

    pub fn compound(&mut self, stmts: Vec<StmtId>) -> StmtId {
        self.push_stmt(StmtKind::Compound(stmts))
    }

    pub fn if_stmt(
        &mut self,
        cond: ExprId,
        then_branch: StmtId,
        else_branch: Option<StmtId>,
    ) -> StmtId {
        self.push_stmt(StmtKind::If {
            cond,
            then_branch,
            else_branch,
        })
    }

    pub fn while_stmt(&mut self, cond: ExprId, body: StmtId) -> StmtId {
        self.push_stmt(StmtKind::While { cond, body })
    }

    pub fn do_while(&mut self, body: StmtId, cond: ExprId) -> StmtId {
        self.push_stmt(StmtKind::DoWhile { body, cond })
    }

    pub fn for_stmt(
        &mut self,
        init: Option<StmtId>,
        cond: Option<ExprId>,
        step: Option<ExprId>,
        body: StmtId,
    ) -> StmtId {
        self.push_stmt(StmtKind::For {
            init,
            cond,
            step,
            body,
        })
    }

    pub fn ret(&mut self, value: Option<ExprId>) -> StmtId {
        self.push_stmt(StmtKind::Return(value))
    }

    pub fn break_stmt(&mut self) -> StmtId {
        self.push_stmt(StmtKind::Break)
    }

    pub fn continue_stmt(&mut self) -> StmtId {
        self.push_stmt(StmtKind::Continue)
    }

    pub fn empty(&mut self) -> StmtId {
        self.push_stmt(StmtKind::Empty)
    }

    /// Flag a statement as macro-expanded.
    pub fn mark_macro(&mut self, stmt: StmtId) {
        self.stmts[stmt.0].from_macro = true;
    }

    /// Consume the builder, fixing `body` as the function body root.
    /// Pass `None` for a declaration without a body.
    #[must_use]
    pub fn finish(self, body: Option<StmtId>) -> Ast {
        Ast {
            exprs: self.exprs,
            stmts: self.stmts,
            vars: self.vars,
            body,
        }
    }
}
