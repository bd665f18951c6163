// src/functionalize.rs
//! Turning default method bodies into free functions with an explicit receiver.

use std::sync::Arc;

use serde::Serialize;

use defshim_hierarchy::{Block, Expr, MethodSignature, Param, Stmt, TypeId, TypeRef};
use defshim_resolve::ResolutionContext;

use crate::error::{TranslateError, TranslateResult};
use crate::registry::FunctionIdentity;
use crate::translator::Translator;

/// A default method emitted once as a shared function.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionalizedMethod {
    pub interface: TypeId,
    /// Mangled target name of the interface.
    pub interface_name: String,
    pub signature: MethodSignature,
    pub symbol: String,
    /// First parameter, standing in for the implicit receiver.
    pub receiver: Param,
    pub params: Vec<Param>,
    pub return_type: TypeRef,
    pub body: Block,
}

/// Builds the shared function for `identity`. Returns it together with the
/// defaults its body calls through `I.super.m()`, which become consumed too.
pub(crate) fn functionalize<'idx>(
    translator: &Translator<'idx>,
    ctx: &mut ResolutionContext<'idx>,
    identity: &FunctionIdentity,
) -> TranslateResult<(FunctionalizedMethod, Vec<Arc<FunctionIdentity>>)> {
    let index = translator.index();
    let decl = index.get(identity.interface);
    let method = decl.instance_method(&identity.signature).filter(|m| m.is_default());
    let body =
        method.and_then(|m| m.body.as_ref()).ok_or_else(|| TranslateError::MissingDefaultBody {
            interface: decl.name.to_string(),
            signature: identity.signature.to_string(),
        })?;

    let receiver_name = &translator.options().receiver_name;
    let mut rewriter =
        BodyRewriter::functionalizing(translator, ctx, identity.interface, receiver_name);
    let body = rewriter.rewrite_block(body)?;
    let consumed = rewriter.consumed;

    let (params, return_type) = match method {
        Some(m) => (m.params.clone(), m.return_type.clone()),
        None => (Vec::new(), TypeRef::Void),
    };
    let function = FunctionalizedMethod {
        interface: identity.interface,
        interface_name: decl.name.mangled(),
        signature: identity.signature.clone(),
        symbol: identity.symbol.clone(),
        receiver: Param::new(receiver_name, TypeRef::named(&decl.name.to_string())),
        params,
        return_type,
        body,
    };
    Ok((function, consumed))
}

/// Whether a body contains constructs the default-method stage rewrites
/// even outside functionalized bodies.
pub(crate) fn needs_rewrite(block: &Block) -> bool {
    fn expr(e: &Expr) -> bool {
        match e {
            Expr::SuperDefaultCall { .. } | Expr::Lambda { .. } => true,
            Expr::Field { target, .. } => target.as_deref().map_or(false, expr),
            Expr::Call { target, args, .. } => {
                target.as_deref().map_or(false, expr) || args.iter().any(expr)
            }
            Expr::StaticCall { args, .. } | Expr::FunctionCall { args, .. } => {
                args.iter().any(expr)
            }
            Expr::Binary { lhs, rhs, .. } => expr(lhs) || expr(rhs),
            Expr::This | Expr::Local(_) | Expr::Literal(_) | Expr::StaticField { .. } => false,
        }
    }
    block.stmts.iter().any(|stmt| match stmt {
        Stmt::Expr(e) | Stmt::Let { value: e, .. } | Stmt::Return(Some(e)) => expr(e),
        Stmt::Return(None) => false,
    })
}

/// Rewrites a method body for emission.
///
/// When functionalizing, the implicit receiver becomes the explicit receiver
/// parameter and static members of the owning interface become direct
/// function calls. In both modes `I.super.m()` turns into a call of the
/// shared function and lambdas get their base decided.
pub(crate) struct BodyRewriter<'a, 'idx> {
    translator: &'a Translator<'idx>,
    ctx: &'a mut ResolutionContext<'idx>,
    owner: TypeId,
    receiver: Expr,
    functionalizing: bool,
    pub(crate) consumed: Vec<Arc<FunctionIdentity>>,
}

impl<'a, 'idx> BodyRewriter<'a, 'idx> {
    pub(crate) fn functionalizing(
        translator: &'a Translator<'idx>,
        ctx: &'a mut ResolutionContext<'idx>,
        owner: TypeId,
        receiver_name: &str,
    ) -> Self {
        Self {
            translator,
            ctx,
            owner,
            receiver: Expr::local(receiver_name),
            functionalizing: true,
            consumed: Vec::new(),
        }
    }

    /// For ordinary class methods: the receiver stays implicit.
    pub(crate) fn in_place(
        translator: &'a Translator<'idx>,
        ctx: &'a mut ResolutionContext<'idx>,
        owner: TypeId,
    ) -> Self {
        Self {
            translator,
            ctx,
            owner,
            receiver: Expr::This,
            functionalizing: false,
            consumed: Vec::new(),
        }
    }

    pub(crate) fn rewrite_block(&mut self, block: &Block) -> TranslateResult<Block> {
        let stmts = block
            .stmts
            .iter()
            .map(|stmt| self.rewrite_stmt(stmt))
            .collect::<TranslateResult<Vec<_>>>()?;
        Ok(Block::new(stmts))
    }

    fn rewrite_stmt(&mut self, stmt: &Stmt) -> TranslateResult<Stmt> {
        Ok(match stmt {
            Stmt::Expr(e) => Stmt::Expr(self.rewrite_expr(e)?),
            Stmt::Let { name, value } => {
                Stmt::Let { name: name.clone(), value: self.rewrite_expr(value)? }
            }
            Stmt::Return(value) => {
                Stmt::Return(value.as_ref().map(|e| self.rewrite_expr(e)).transpose()?)
            }
        })
    }

    fn explicit_receiver(&self) -> Option<Box<Expr>> {
        Some(Box::new(self.receiver.clone()))
    }

    fn rewrite_args(&mut self, args: &[Expr]) -> TranslateResult<Vec<Expr>> {
        args.iter().map(|a| self.rewrite_expr(a)).collect()
    }

    fn rewrite_expr(&mut self, expr: &Expr) -> TranslateResult<Expr> {
        let index = self.translator.index();
        Ok(match expr {
            Expr::This if self.functionalizing => self.receiver.clone(),
            Expr::This | Expr::Local(_) | Expr::Literal(_) => expr.clone(),

            Expr::Field { target: None, name } if self.functionalizing => {
                match self.static_field_accessor(name) {
                    Some(accessor) => Expr::FunctionCall { symbol: accessor, args: Vec::new() },
                    None => Expr::Field { target: self.explicit_receiver(), name: name.clone() },
                }
            }
            Expr::Field { target, name } => Expr::Field {
                target: target.as_deref().map(|t| self.rewrite_expr(t).map(Box::new)).transpose()?,
                name: name.clone(),
            },

            Expr::Call { target: None, method, args } if self.functionalizing => {
                let args = self.rewrite_args(args)?;
                match self.static_function(self.owner, method) {
                    Some(symbol) => Expr::FunctionCall { symbol, args },
                    None => Expr::Call {
                        target: self.explicit_receiver(),
                        method: method.clone(),
                        args,
                    },
                }
            }
            Expr::Call { target, method, args } => Expr::Call {
                target: target.as_deref().map(|t| self.rewrite_expr(t).map(Box::new)).transpose()?,
                method: method.clone(),
                args: self.rewrite_args(args)?,
            },

            Expr::StaticCall { owner, method, args } => {
                let args = self.rewrite_args(args)?;
                match self.static_function(*owner, method) {
                    Some(symbol) if index.get(*owner).is_interface() => {
                        Expr::FunctionCall { symbol, args }
                    }
                    _ => Expr::StaticCall { owner: *owner, method: method.clone(), args },
                }
            }
            Expr::StaticField { owner, name } => {
                let decl = index.get(*owner);
                match decl.static_field(name) {
                    Some(_) if decl.is_interface() => {
                        let options = self.translator.options();
                        let table = self.translator.registry().name_table(decl, options);
                        match table.static_field(name) {
                            Some(symbols) => Expr::FunctionCall {
                                symbol: symbols.accessor.clone(),
                                args: Vec::new(),
                            },
                            None => expr.clone(),
                        }
                    }
                    _ => expr.clone(),
                }
            }

            Expr::SuperDefaultCall { interface, method, args } => {
                let identity = self.translator.super_default_symbol(
                    self.ctx,
                    self.owner,
                    *interface,
                    method,
                )?;
                let mut call_args = vec![self.receiver.clone()];
                call_args.extend(self.rewrite_args(args)?);
                let symbol = identity.symbol.clone();
                self.consumed.push(identity);
                Expr::FunctionCall { symbol, args: call_args }
            }
            Expr::FunctionCall { symbol, args } => {
                Expr::FunctionCall { symbol: symbol.clone(), args: self.rewrite_args(args)? }
            }
            Expr::Binary { op, lhs, rhs } => Expr::Binary {
                op: *op,
                lhs: Box::new(self.rewrite_expr(lhs)?),
                rhs: Box::new(self.rewrite_expr(rhs)?),
            },
            Expr::Lambda { interface, params, body, capturing, .. } => Expr::Lambda {
                interface: *interface,
                params: params.clone(),
                body: Box::new(self.rewrite_block(body)?),
                capturing: *capturing,
                base: self.translator.lambda_base(self.ctx, *interface)?,
            },
        })
    }

    /// Symbol of a static method declared directly on `owner`.
    fn static_function(&self, owner: TypeId, method: &MethodSignature) -> Option<String> {
        let decl = self.translator.index().get(owner);
        decl.declared_method(method).filter(|m| m.is_static())?;
        let table = self.translator.registry().name_table(decl, self.translator.options());
        table.function(method).map(str::to_string)
    }

    /// Accessor of a static field visible from the owning interface, nearest
    /// declaration first.
    fn static_field_accessor(&self, name: &str) -> Option<String> {
        let index = self.translator.index();
        let holder = std::iter::once(self.owner)
            .chain(index.interface_closure(self.owner).iter().copied())
            .find(|&ty| index.get(ty).static_field(name).is_some())?;
        let table =
            self.translator.registry().name_table(index.get(holder), self.translator.options());
        table.static_field(name).map(|symbols| symbols.accessor.clone())
    }
}
