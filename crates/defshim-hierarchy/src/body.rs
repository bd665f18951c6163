// src/body.rs
//! Minimal statement/expression tree for method bodies.
//!
//! Only the shapes the default-method stage has to rewrite are modelled
//! explicitly: receiver references, calls and field accesses with an
//! implicit receiver, static member references, `I.super.m()` calls and
//! lambdas. Everything else is handed through to the general printer.

use serde::{Deserialize, Serialize};

use crate::types::{MethodSignature, TypeId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    String(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Gt,
    And,
    Or,
}

/// The object a non-capturing lambda is based on at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LambdaBase {
    /// Not decided yet; the front end always produces this.
    Unresolved,
    /// The root object; the functional interface has no companion.
    Root,
    /// The companion artifact of the given interface, which carries its default shims.
    Companion(TypeId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// The implicit receiver (`this`).
    This,
    Local(String),
    Literal(Literal),
    /// Field access. `target: None` means the implicit receiver.
    Field { target: Option<Box<Expr>>, name: String },
    /// Instance method call. `target: None` means the implicit receiver.
    Call { target: Option<Box<Expr>>, method: MethodSignature, args: Vec<Expr> },
    StaticCall { owner: TypeId, method: MethodSignature, args: Vec<Expr> },
    StaticField { owner: TypeId, name: String },
    /// `Interface.super.method(args)`.
    SuperDefaultCall { interface: TypeId, method: MethodSignature, args: Vec<Expr> },
    /// Direct call of a free function by its target symbol.
    FunctionCall { symbol: String, args: Vec<Expr> },
    Binary { op: BinaryOp, lhs: Box<Expr>, rhs: Box<Expr> },
    Lambda {
        interface: TypeId,
        params: Vec<String>,
        body: Box<Block>,
        capturing: bool,
        base: LambdaBase,
    },
}

impl Expr {
    pub fn local(name: &str) -> Self {
        Expr::Local(name.to_string())
    }

    pub fn int(value: i64) -> Self {
        Expr::Literal(Literal::Int(value))
    }

    pub fn string(value: &str) -> Self {
        Expr::Literal(Literal::String(value.to_string()))
    }

    /// A call on the implicit receiver.
    pub fn implicit_call(method: MethodSignature, args: Vec<Expr>) -> Self {
        Expr::Call { target: None, method, args }
    }

    pub fn call_on(target: Expr, method: MethodSignature, args: Vec<Expr>) -> Self {
        Expr::Call { target: Some(Box::new(target)), method, args }
    }

    pub fn implicit_field(name: &str) -> Self {
        Expr::Field { target: None, name: name.to_string() }
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Expr(Expr),
    Let { name: String, value: Expr },
    Return(Option<Expr>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self { stmts }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// A block consisting of a single `return`.
    pub fn returning(value: Expr) -> Self {
        Self { stmts: vec![Stmt::Return(Some(value))] }
    }

    /// Every type id the block mentions, nested lambdas included, in visit order.
    pub fn referenced_types(&self) -> Vec<TypeId> {
        let mut out = Vec::new();
        collect_block(self, &mut out);
        out
    }
}

fn collect_block(block: &Block, out: &mut Vec<TypeId>) {
    for stmt in &block.stmts {
        match stmt {
            Stmt::Expr(e) | Stmt::Let { value: e, .. } | Stmt::Return(Some(e)) => {
                collect_expr(e, out)
            }
            Stmt::Return(None) => {}
        }
    }
}

fn collect_expr(expr: &Expr, out: &mut Vec<TypeId>) {
    match expr {
        Expr::This | Expr::Local(_) | Expr::Literal(_) => {}
        Expr::Field { target, .. } => {
            if let Some(target) = target {
                collect_expr(target, out);
            }
        }
        Expr::Call { target, args, .. } => {
            if let Some(target) = target {
                collect_expr(target, out);
            }
            args.iter().for_each(|a| collect_expr(a, out));
        }
        Expr::StaticCall { owner, args, .. } => {
            out.push(*owner);
            args.iter().for_each(|a| collect_expr(a, out));
        }
        Expr::StaticField { owner, .. } => out.push(*owner),
        Expr::SuperDefaultCall { interface, args, .. } => {
            out.push(*interface);
            args.iter().for_each(|a| collect_expr(a, out));
        }
        Expr::FunctionCall { args, .. } => args.iter().for_each(|a| collect_expr(a, out)),
        Expr::Binary { lhs, rhs, .. } => {
            collect_expr(lhs, out);
            collect_expr(rhs, out);
        }
        Expr::Lambda { interface, body, .. } => {
            out.push(*interface);
            collect_block(body, out);
        }
    }
}
