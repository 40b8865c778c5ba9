//! Static analysis for Alloy models: the two-pass front end that turns an
//! untyped parse tree into a typed module.
//!
//! Pass 1 (the resolver) wires the signature hierarchy and computes field
//! and function signature types. Pass 2 (the elaborator) type-checks every
//! expression bottom-up into a set of candidate elaborations, then selects
//! the unique well-typed one top-down.

#![deny(clippy::pedantic, missing_debug_implementations, missing_docs, rust_2018_idioms)]
#![allow(clippy::too_many_lines, clippy::single_match_else)]

mod cx;
mod dec;
mod exp;
mod resolve;
mod st;
mod util;

pub mod error;
pub mod expr;
pub mod module;

pub use error::Error;

use alloy_statics_types::cancel::{Cancel, Cancelled};

/// The result of statics: the module, plus every diagnostic.
///
/// The module is complete only when no error-severity diagnostic is present;
/// otherwise it holds whatever elaborated successfully, which editor
/// integrations still want.
#[derive(Debug)]
pub struct Statics {
  /// The elaborated module.
  pub module: module::Module,
  /// Every diagnostic, in emission order. Warnings included.
  pub errors: Vec<Error>,
}

impl Statics {
  /// Returns whether any diagnostic has error severity.
  #[must_use]
  pub fn has_errors(&self) -> bool {
    self.errors.iter().any(|e| matches!(e.severity(), error::Severity::Error))
  }
}

/// Does the checks on the root.
///
/// # Errors
///
/// When `cancel` was triggered. Everything under construction is dropped;
/// no partial state escapes.
pub fn get(root: &alloy_syntax::Root, cancel: &Cancel) -> Result<Statics, Cancelled> {
  util::time("alloy_statics::get", || {
    let mut st = st::St::new(cancel);
    let out = dec::get(&mut st, root)?;
    let (sigs, vars, funs, errors) = st.finish();
    let module = module::Module {
      sigs,
      vars,
      funs,
      facts: out.facts,
      asserts: out.asserts,
      commands: out.commands,
    };
    Ok(Statics { module, errors })
  })
}
