//! Facts, asserts, and commands.

use crate::check::{check, fail, prim, Build};
use alloy_statics_types::sig::Sig;
use alloy_syntax::{BinOp, CommandKind, UnOp};

#[test]
fn assert_body_is_typed() {
  let mut b = Build::new();
  b.sig("A");
  let lhs = b.name("A");
  let rhs = b.name("A");
  let body = b.bin(BinOp::In, lhs, rhs);
  b.assert_decl("refl", body);
  let statics = check(b);
  assert_eq!(statics.module.asserts.len(), 1);
  assert_eq!(statics.module.asserts[0].name.as_str(), "refl");
  assert!(statics.module.asserts[0].body.ty.is_bool());
}

#[test]
fn command_with_scopes() {
  let mut b = Build::new();
  b.sig("A");
  let a = b.name("A");
  let body = b.un(UnOp::Some, a);
  b.command(CommandKind::Run, body, &[("A", 3)]);
  let statics = check(b);
  let a = prim(&statics, "A");
  assert_eq!(statics.module.commands.len(), 1);
  assert_eq!(statics.module.commands[0].kind, CommandKind::Run);
  assert_eq!(statics.module.commands[0].scopes, vec![(Sig::Prim(a), 3)]);
}

#[test]
fn command_scope_with_an_unknown_sig() {
  let mut b = Build::new();
  b.sig("A");
  let a = b.name("A");
  let body = b.un(UnOp::Some, a);
  b.command(CommandKind::Check, body, &[("Z", 3)]);
  let statics = fail(b, 3001, "undefined name: Z");
  assert!(statics.module.commands.is_empty());
}

#[test]
fn bad_fact_does_not_poison_later_decls() {
  let mut b = Build::new();
  b.sig("A");
  let bad = b.name("Z");
  b.fact(bad);
  let a = b.name("A");
  let good = b.un(UnOp::Some, a);
  b.fact(good);
  let statics = fail(b, 3001, "undefined name: Z");
  assert_eq!(statics.module.facts.len(), 1);
}
