//! See [`St`].

use crate::error::{Error, ErrorKind};
use crate::expr::VarId;
use crate::module::{Fun, Var};
use alloy_statics_types::cancel::Cancel;
use alloy_statics_types::sig::Sigs;
use alloy_statics_types::ty::Type;
use alloy_syntax::{Name, Pos};

/// The mutable state threaded through both passes.
#[derive(Debug)]
pub(crate) struct St<'a> {
  pub(crate) sigs: Sigs,
  pub(crate) vars: Vec<Var>,
  pub(crate) funs: Vec<Fun>,
  errors: Vec<Error>,
  pub(crate) cancel: &'a Cancel,
}

impl<'a> St<'a> {
  pub(crate) fn new(cancel: &'a Cancel) -> Self {
    Self { sigs: Sigs::default(), vars: Vec::new(), funs: Vec::new(), errors: Vec::new(), cancel }
  }

  pub(crate) fn err(&mut self, pos: Pos, kind: ErrorKind) {
    self.errors.push(Error { pos, kind });
  }

  pub(crate) fn fresh_var(&mut self, name: Name, ty: Type) -> VarId {
    let ret = VarId(self.vars.len());
    self.vars.push(Var { name, ty });
    ret
  }

  pub(crate) fn finish(self) -> (Sigs, Vec<Var>, Vec<Fun>, Vec<Error>) {
    (self.sigs, self.vars, self.funs, self.errors)
  }
}
