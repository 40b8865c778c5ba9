//! Scoped name resolution.
//!
//! A name may be bound many times at once: Alloy is overloaded, so lookup
//! returns every in-scope binding and lets the caller's type information
//! decide. Local binders do not shadow; they come first.

use crate::expr::{FunId, VarId};
use alloy_statics_types::sig::{FieldId, Sig};
use alloy_syntax::Name;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Binding {
  Sig(Sig),
  Field(FieldId),
  Fun(FunId),
  Var(VarId),
}

/// The in-scope bindings: module-level names plus a stack of local binders.
#[derive(Debug, Clone, Default)]
pub(crate) struct Cx {
  global: FxHashMap<Name, Vec<Binding>>,
  locals: Vec<(Name, VarId)>,
}

impl Cx {
  pub(crate) fn insert_global(&mut self, name: Name, binding: Binding) {
    self.global.entry(name).or_default().push(binding);
  }

  pub(crate) fn push_local(&mut self, name: Name, var: VarId) {
    self.locals.push((name, var));
  }

  /// Returns all bindings for `name`: locals innermost-first, then
  /// module-level bindings in registration order.
  pub(crate) fn lookup(&self, name: &Name) -> Vec<Binding> {
    let mut ret: Vec<Binding> = self
      .locals
      .iter()
      .rev()
      .filter(|(n, _)| n == name)
      .map(|&(_, var)| Binding::Var(var))
      .collect();
    if let Some(global) = self.global.get(name) {
      ret.extend(global.iter().copied());
    }
    ret
  }
}
