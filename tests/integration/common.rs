//! Shared scenario builders for integration tests.
//!
//! Each builder lowers a small C-like function by hand, the way a parsing
//! front end would, and returns the unit together with the statement ids
//! the assertions care about.

use flowlint::ast::{AstBuilder, BinOp, StmtId, UnaryOp};
use flowlint::cfg::CfgBuilder;
use flowlint::FunctionUnit;

/// Install a test subscriber so `--nocapture` runs show analysis traces.
/// Safe to call from every test; only the first installation wins.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// `int f() { int x = 10; x = 20; return x; }`
///
/// Single straight-line block; the initializer is overwritten before any
/// read.
pub fn overwritten_init() -> (FunctionUnit, StmtId, StmtId) {
    let mut b = AstBuilder::new();
    let x = b.var("x");

    b.at(1);
    let ten = b.int(10);
    let s_decl = b.decl_stmt(x, Some(ten));

    b.at(2);
    let twenty = b.int(20);
    let x_ref = b.var_ref(x);
    let assign = b.assign(x_ref, twenty);
    let s_assign = b.expr_stmt(assign);

    b.at(3);
    let x_ref2 = b.var_ref(x);
    let s_ret = b.ret(Some(x_ref2));

    let root = b.compound(vec![s_decl, s_assign, s_ret]);
    let ast = b.finish(Some(root));

    let mut c = CfgBuilder::new("f");
    let b0 = c.block(vec![s_decl, s_assign, s_ret]);
    c.exit(b0);
    let cfg = c.build().expect("valid cfg");

    (FunctionUnit { ast, cfg }, s_decl, s_assign)
}

/// `int g(int a) { if (a) { return a; } a = 5; return a; }`
///
/// Both branch arms are reachable; the store `a = 5` is read by the tail
/// return.
pub fn early_return() -> FunctionUnit {
    let mut b = AstBuilder::new();
    let a = b.var("a");

    b.at(1);
    let cond = b.var_ref(a);

    b.at(2);
    let a_ref = b.var_ref(a);
    let s_ret_then = b.ret(Some(a_ref));

    b.at(3);
    let five = b.int(5);
    let a_ref2 = b.var_ref(a);
    let assign = b.assign(a_ref2, five);
    let s_assign = b.expr_stmt(assign);

    b.at(4);
    let a_ref3 = b.var_ref(a);
    let s_ret_tail = b.ret(Some(a_ref3));

    let then_block = b.compound(vec![s_ret_then]);
    let s_if = b.if_stmt(cond, then_block, None);
    let root = b.compound(vec![s_if, s_assign, s_ret_tail]);
    let ast = b.finish(Some(root));

    let mut c = CfgBuilder::new("g");
    let b0 = c.block_with_terminator(vec![], cond);
    let b1 = c.block(vec![s_ret_then]);
    let b2 = c.block(vec![s_assign, s_ret_tail]);
    c.edge(b0, b1);
    c.edge(b0, b2);
    c.exit(b1);
    c.exit(b2);
    let cfg = c.build().expect("valid cfg");

    FunctionUnit { ast, cfg }
}

/// `int h() { return 1; int z = 2; }`
///
/// The declaration's block has no incoming edge; the only path into it
/// would cross the unconditional return.
pub fn code_after_return() -> (FunctionUnit, StmtId) {
    let mut b = AstBuilder::new();
    let z = b.var("z");

    b.at(1);
    let one = b.int(1);
    let s_ret = b.ret(Some(one));

    b.at(2);
    let two = b.int(2);
    let s_decl = b.decl_stmt(z, Some(two));

    let root = b.compound(vec![s_ret, s_decl]);
    let ast = b.finish(Some(root));

    let mut c = CfgBuilder::new("h");
    let b0 = c.block(vec![s_ret]);
    let _b1 = c.block(vec![s_decl]);
    c.exit(b0);
    let cfg = c.build().expect("valid cfg");

    (FunctionUnit { ast, cfg }, s_decl)
}

/// `void k(int n) { int y; for (i = 0; i < n; i++) { <body> } }`
///
/// The body is `y = 5;` when `constant_body` is true, `y = i;` otherwise.
pub fn counted_loop(constant_body: bool) -> (FunctionUnit, StmtId, StmtId) {
    let mut b = AstBuilder::new();
    let n = b.var("n");
    let i = b.var("i");
    let y = b.var("y");

    b.at(2);
    let zero = b.int(0);
    let i_ref = b.var_ref(i);
    let init_assign = b.assign(i_ref, zero);
    let s_init = b.expr_stmt(init_assign);

    let i_ref2 = b.var_ref(i);
    let n_ref = b.var_ref(n);
    let cond = b.binary(BinOp::Lt, i_ref2, n_ref);

    let i_ref3 = b.var_ref(i);
    let step = b.unary(UnaryOp::PostInc, i_ref3);

    b.at(3);
    let rhs = if constant_body {
        b.int(5)
    } else {
        b.var_ref(i)
    };
    let y_ref = b.var_ref(y);
    let body_assign = b.assign(y_ref, rhs);
    let s_body = b.expr_stmt(body_assign);
    let body = b.compound(vec![s_body]);

    b.at(2);
    let loop_stmt = b.for_stmt(Some(s_init), Some(cond), Some(step), body);
    let root = b.compound(vec![loop_stmt]);
    let ast = b.finish(Some(root));

    // entry -> header <-> body, header -> exit
    let mut c = CfgBuilder::new("k");
    let b0 = c.block(vec![s_init]);
    let b1 = c.block_with_terminator(vec![], cond);
    let b2 = c.block(vec![s_body]);
    let b3 = c.block(vec![]);
    c.edge(b0, b1);
    c.edge(b1, b2);
    c.edge(b2, b1);
    c.edge(b1, b3);
    c.exit(b3);
    let cfg = c.build().expect("valid cfg");

    (FunctionUnit { ast, cfg }, loop_stmt, s_body)
}
