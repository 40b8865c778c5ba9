//! Operator typing, quantifiers, let, and if-then-else.

use crate::check::{check, fail, prim, warn, Build};
use alloy_statics_types::ty::Type;
use alloy_syntax::{BinOp, Parents, Quant, UnOp};

#[test]
fn equality_of_disjoint_sigs_warns_but_typechecks() {
  let mut b = Build::new();
  b.sig("A");
  b.sig("B");
  let lhs = b.name("A");
  let rhs = b.name("B");
  let body = b.bin(BinOp::Eq, lhs, rhs);
  b.pred("p", Vec::new(), body);
  let statics = warn(b, 5003, "always false");
  let body = statics.module.funs[0].body.as_ref().expect("has a body");
  assert!(body.ty.is_bool());
}

#[test]
fn equality_needs_a_common_arity() {
  let mut b = Build::new();
  b.sig("A");
  let lhs = b.name("A");
  let p1 = b.name("A");
  let p2 = b.name("A");
  let rhs = b.bin(BinOp::Product, p1, p2);
  let body = b.bin(BinOp::Eq, lhs, rhs);
  b.fact(body);
  fail(b, 4001, "incompatible arities");
}

#[test]
fn integer_equality() {
  let mut b = Build::new();
  b.sig("A");
  let a = b.name("A");
  let card = b.un(UnOp::Cardinality, a);
  let three = b.int(3);
  let body = b.bin(BinOp::Eq, card, three);
  b.fact(body);
  check(b);
}

#[test]
fn subtraction_of_disjoint_sets_warns() {
  let mut b = Build::new();
  b.sig("A");
  b.sig("B");
  let lhs = b.name("A");
  let rhs = b.name("B");
  let diff = b.bin(BinOp::Diff, lhs, rhs);
  let body = b.un(UnOp::Some, diff);
  b.fact(body);
  warn(b, 5004, "never removes anything");
}

#[test]
fn intersection_of_disjoint_sets_warns() {
  let mut b = Build::new();
  b.sig("A");
  b.sig("B");
  let lhs = b.name("A");
  let rhs = b.name("B");
  let meet = b.bin(BinOp::Intersect, lhs, rhs);
  let body = b.un(UnOp::Some, meet);
  b.fact(body);
  warn(b, 5002, "always empty");
}

#[test]
fn union_types_are_merged() {
  let mut b = Build::new();
  b.sig("A");
  b.sig("B");
  let ra = b.name("A");
  let rb = b.name("B");
  let ret = b.bin(BinOp::Union, ra, rb);
  let ba = b.name("A");
  let bb = b.name("B");
  let body = b.bin(BinOp::Union, ba, bb);
  b.fun("u", Vec::new(), ret, body);
  let statics = check(b);
  let sigs = &statics.module.sigs;
  let a = prim(&statics, "A");
  let bb = prim(&statics, "B");
  let want = Type::prim(a).merge(sigs, &Type::prim(bb));
  let body = statics.module.funs[0].body.as_ref().expect("has a body");
  assert!(body.ty.same(sigs, &want));
}

#[test]
fn override_needs_overlapping_first_columns() {
  let mut b = Build::new();
  let fb = b.name("A");
  let f = b.field("f", fb);
  b.sig_full("A", false, Parents::Toplevel, vec![f]);
  let gb = b.name("B");
  let g = b.field("g", gb);
  b.sig_full("B", false, Parents::Toplevel, vec![g]);
  let lhs = b.name("f");
  let rhs = b.name("g");
  let over = b.bin(BinOp::Override, lhs, rhs);
  let body = b.un(UnOp::Some, over);
  b.fact(body);
  fail(b, 4008, "override is impossible");
}

#[test]
fn override_of_compatible_relations() {
  let mut b = Build::new();
  let fb = b.name("A");
  let f = b.field("f", fb);
  b.sig_full("A", false, Parents::Toplevel, vec![f]);
  let lhs = b.name("f");
  let rhs = b.name("f");
  let over = b.bin(BinOp::Override, lhs, rhs);
  let body = b.un(UnOp::Some, over);
  b.fact(body);
  check(b);
}

#[test]
fn domain_restriction() {
  let mut b = Build::new();
  let fb = b.name("A");
  let f = b.field("f", fb);
  b.sig_full("A", false, Parents::Toplevel, vec![f]);
  let set = b.name("A");
  let rel = b.name("f");
  let restricted = b.bin(BinOp::DomRestrict, set, rel);
  let body = b.un(UnOp::Some, restricted);
  b.fact(body);
  check(b);
}

#[test]
fn domain_restriction_needs_a_unary_left_side() {
  let mut b = Build::new();
  let fb = b.name("A");
  let f = b.field("f", fb);
  b.sig_full("A", false, Parents::Toplevel, vec![f]);
  let lhs = b.name("f");
  let rhs = b.name("f");
  let restricted = b.bin(BinOp::DomRestrict, lhs, rhs);
  let body = b.un(UnOp::Some, restricted);
  b.fact(body);
  fail(b, 4006, "needs a unary set");
}

#[test]
fn logical_operators_need_formulas() {
  let mut b = Build::new();
  b.sig("A");
  let lhs = b.name("A");
  let rhs = b.name("A");
  let body = b.bin(BinOp::And, lhs, rhs);
  b.pred("p", Vec::new(), body);
  fail(b, 4004, "expected a formula");
}

#[test]
fn transpose_needs_binary_entries() {
  let mut b = Build::new();
  b.sig("A");
  let a = b.name("A");
  let t = b.un(UnOp::Transpose, a);
  let body = b.un(UnOp::Some, t);
  b.fact(body);
  fail(b, 4007, "expected a binary relation");
}

#[test]
fn transpose_of_a_field() {
  let mut b = Build::new();
  let fb = b.name("A");
  let f = b.field("f", fb);
  b.sig_full("A", false, Parents::Toplevel, vec![f]);
  let fr = b.name("f");
  let t = b.un(UnOp::Transpose, fr);
  let body = b.un(UnOp::Some, t);
  b.fact(body);
  check(b);
}

#[test]
fn reflexive_closure_includes_identity() {
  let mut b = Build::new();
  let fb = b.name("A");
  let f = b.field("f", fb);
  b.sig_full("A", false, Parents::Toplevel, vec![f]);
  let fr = b.name("f");
  let star = b.un(UnOp::ReflClosure, fr);
  let fr2 = b.name("f");
  let body = b.bin(BinOp::In, fr2, star);
  b.fact(body);
  check(b);
}

#[test]
fn quantifier_binds_a_typed_variable() {
  let mut b = Build::new();
  b.sig("A");
  let bound = b.name("A");
  let x = b.bind("x", bound);
  let xr = b.name("x");
  let ar = b.name("A");
  let body = b.bin(BinOp::In, xr, ar);
  let q = b.quant(Quant::All, vec![x], body);
  b.fact(q);
  let statics = check(b);
  let a = prim(&statics, "A");
  let var = statics.module.vars.iter().find(|v| v.name.as_str() == "x").expect("bound var");
  assert!(var.ty.same(&statics.module.sigs, &Type::prim(a)));
}

#[test]
fn quantifier_bound_must_be_relational() {
  let mut b = Build::new();
  b.sig("A");
  let lhs = b.name("A");
  let rhs = b.name("A");
  let bound = b.bin(BinOp::Eq, lhs, rhs);
  let x = b.bind("x", bound);
  let xr = b.name("x");
  let ar = b.name("A");
  let body = b.bin(BinOp::In, xr, ar);
  let q = b.quant(Quant::Some, vec![x], body);
  b.fact(q);
  fail(b, 4005, "expected a relational expression");
}

#[test]
fn let_binds_the_bound_type() {
  let mut b = Build::new();
  b.sig("A");
  let bound = b.name("A");
  let y = b.bind("y", bound);
  let yr = b.name("y");
  let body = b.un(UnOp::Some, yr);
  let l = b.let_(y, body);
  b.pred("p", Vec::new(), l);
  check(b);
}

#[test]
fn ite_merges_branch_types() {
  let mut b = Build::new();
  b.sig("A");
  b.sig("B");
  let ra = b.name("A");
  let rb = b.name("B");
  let ret = b.bin(BinOp::Union, ra, rb);
  let cl = b.name("A");
  let cr = b.name("A");
  let cond = b.bin(BinOp::Eq, cl, cr);
  let ta = b.name("A");
  let eb = b.name("B");
  let body = b.ite(cond, ta, eb);
  b.fun("pick", Vec::new(), ret, body);
  let statics = check(b);
  let sigs = &statics.module.sigs;
  let a = prim(&statics, "A");
  let bb = prim(&statics, "B");
  let want = Type::prim(a).merge(sigs, &Type::prim(bb));
  let body = statics.module.funs[0].body.as_ref().expect("has a body");
  assert!(body.ty.same(sigs, &want));
}

#[test]
fn ite_condition_must_be_boolean() {
  let mut b = Build::new();
  b.sig("A");
  let cond = b.name("A");
  let ta = b.name("A");
  let eb = b.name("A");
  let body = b.ite(cond, ta, eb);
  let some = b.un(UnOp::Some, body);
  b.fact(some);
  fail(b, 4004, "expected a formula");
}

#[test]
fn undefined_name() {
  let mut b = Build::new();
  let z = b.name("Z");
  let body = b.un(UnOp::Some, z);
  b.fact(body);
  fail(b, 3001, "undefined name: Z");
}

#[test]
fn fact_body_must_be_a_formula() {
  let mut b = Build::new();
  b.sig("A");
  let body = b.name("A");
  b.fact(body);
  fail(b, 4009, "expected {PrimitiveBoolean}");
}
