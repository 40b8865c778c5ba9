//! Typed expressions.
//!
//! Nodes are immutable after construction and shared by reference; rewrites
//! build new trees. The `Choice` and `BadCall` kinds are transient: they
//! exist between the bottom-up and top-down passes, and a finished tree
//! contains neither.

#![allow(missing_docs)]

use alloy_statics_types::sig::{FieldId, Sig};
use alloy_statics_types::ty::Type;
use alloy_syntax::{BinOp, Pos, Quant, UnOp};
use std::rc::Rc;

pub type ExprRef = Rc<Expr>;

/// A typed expression.
#[derive(Debug)]
pub struct Expr {
  pub pos: Pos,
  pub ty: Type,
  /// Tie-break weight for disambiguation: a synthesized coercion adds one,
  /// a direct match adds zero.
  pub extra_weight: u32,
  /// Whether this node was synthesized by elaboration rather than written.
  pub synthesized: bool,
  pub kind: ExprKind,
}

#[derive(Debug)]
pub enum ExprKind {
  Sig(Sig),
  Field(FieldId),
  Var(VarId),
  Int(i32),
  Unary(UnOp, ExprRef),
  Binary(BinOp, ExprRef, ExprRef),
  /// Relational join, written `left.right`.
  Join(ExprRef, ExprRef),
  Quant(Quant, Vec<(VarId, ExprRef)>, ExprRef),
  Call(FunId, Vec<ExprRef>),
  /// Transient: a function mentioned with fewer arguments than it needs.
  /// Later dots extend the argument list; one that survives to resolution
  /// is an error.
  BadCall(FunId, Vec<ExprRef>),
  Let(VarId, ExprRef, ExprRef),
  Ite(ExprRef, ExprRef, ExprRef),
  /// Transient: the set of candidate elaborations of an overloaded
  /// expression. Resolution replaces this with the selected candidate.
  Choice(Vec<ExprRef>),
  /// Synthesized coercion from an integer value to the `Int` sig.
  CastToSigInt(ExprRef),
  /// A node whose elaboration failed. The failure was already reported;
  /// enclosing nodes stay silent about it.
  Error,
}

impl Expr {
  pub(crate) fn new(pos: Pos, ty: Type, kind: ExprKind) -> ExprRef {
    Rc::new(Self { pos, ty, extra_weight: 0, synthesized: false, kind })
  }

  pub(crate) fn with_weight(pos: Pos, ty: Type, kind: ExprKind, extra_weight: u32) -> ExprRef {
    Rc::new(Self { pos, ty, extra_weight, synthesized: false, kind })
  }

  pub(crate) fn synthesized(pos: Pos, ty: Type, kind: ExprKind, extra_weight: u32) -> ExprRef {
    Rc::new(Self { pos, ty, extra_weight, synthesized: true, kind })
  }

  pub(crate) fn error(pos: Pos) -> ExprRef {
    Self::new(pos, Type::EMPTY, ExprKind::Error)
  }

  /// Returns whether this is the poison node.
  #[must_use]
  pub fn is_error(&self) -> bool {
    matches!(self.kind, ExprKind::Error)
  }
}

/// A bound variable, indexed into the module's variable table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarId(pub(crate) usize);

impl VarId {
  /// Returns the index of this variable.
  #[must_use]
  pub fn to_usize(self) -> usize {
    self.0
  }
}

/// A function or predicate, indexed into the module's function table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunId(pub(crate) usize);

impl FunId {
  /// Returns the index of this function.
  #[must_use]
  pub fn to_usize(self) -> usize {
    self.0
  }
}
