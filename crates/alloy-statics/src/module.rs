//! The frozen output of an analysis.

#![allow(missing_docs)]

use crate::expr::{ExprRef, FunId, VarId};
use alloy_statics_types::sig::{Sig, Sigs};
use alloy_statics_types::ty::Type;
use alloy_syntax::{CommandKind, Name, Pos};

/// A fully-resolved module: the signature graph, the function table, and the
/// typed bodies of everything that has one.
///
/// Types and sigs in here must never be mixed with those of another module.
#[derive(Debug)]
pub struct Module {
  pub sigs: Sigs,
  /// All bound variables, indexed by [`VarId`].
  pub vars: Vec<Var>,
  /// All functions and predicates, indexed by [`FunId`], in declaration
  /// order.
  pub funs: Vec<Fun>,
  pub facts: Vec<Fact>,
  pub asserts: Vec<Assert>,
  pub commands: Vec<Command>,
}

impl Module {
  /// Returns the data for a variable.
  #[must_use]
  pub fn var(&self, var: VarId) -> &Var {
    &self.vars[var.0]
  }

  /// Returns the data for a function.
  #[must_use]
  pub fn fun(&self, fun: FunId) -> &Fun {
    &self.funs[fun.0]
  }
}

/// A bound variable: a quantifier binder, a `let` binder, or a parameter.
#[derive(Debug)]
pub struct Var {
  pub name: Name,
  pub ty: Type,
}

/// A function (`fun`) or predicate (`pred`).
#[derive(Debug)]
pub struct Fun {
  pub pos: Pos,
  pub name: Name,
  pub params: Vec<Param>,
  /// The declared return type; `FORMULA` for predicates.
  pub ret: Type,
  pub is_pred: bool,
  /// `None` when the body failed to elaborate.
  pub body: Option<ExprRef>,
}

#[derive(Debug)]
pub struct Param {
  pub name: Name,
  pub var: VarId,
  pub ty: Type,
}

#[derive(Debug)]
pub struct Fact {
  pub pos: Pos,
  pub name: Option<Name>,
  pub body: ExprRef,
}

#[derive(Debug)]
pub struct Assert {
  pub pos: Pos,
  pub name: Name,
  pub body: ExprRef,
}

#[derive(Debug)]
pub struct Command {
  pub pos: Pos,
  pub kind: CommandKind,
  pub body: ExprRef,
  /// Resolved per-sig scope bounds, in declaration order.
  pub scopes: Vec<(Sig, i32)>,
}
