//! Functions, predicates, overloading, and call disambiguation.

use crate::check::{check, fail, prim, Build};
use alloy_statics::expr::ExprKind;
use alloy_statics_types::ty::Type;
use alloy_syntax::{BinOp, Parents, UnOp};

/// Two functions named `p`, one over `A` and one over `B`.
fn overloaded(b: &mut Build) {
  b.sig("A");
  b.sig("B");
  let xa = b.name("A");
  let pa = b.bind("x", xa);
  let ra = b.name("A");
  let ba = b.name("x");
  b.fun("p", vec![pa], ra, ba);
  let xb = b.name("B");
  let pb = b.bind("x", xb);
  let rb = b.name("B");
  let bb = b.name("x");
  b.fun("p", vec![pb], rb, bb);
}

#[test]
fn overload_selected_by_argument() {
  let mut b = Build::new();
  overloaded(&mut b);
  let bound = b.name("A");
  let qa = b.bind("a", bound);
  let arg = b.name("a");
  let call = b.call("p", vec![arg]);
  let body = b.un(UnOp::Some, call);
  b.pred("q", vec![qa], body);
  let statics = check(b);
  let body = statics.module.funs[2].body.as_ref().expect("has a body");
  let ExprKind::Unary(UnOp::Some, inner) = &body.kind else { panic!("expected unary") };
  let ExprKind::Call(f, args) = &inner.kind else { panic!("expected a call, got {inner:?}") };
  assert_eq!(f.to_usize(), 0, "must pick the overload over A");
  assert_eq!(args.len(), 1);
  let a = prim(&statics, "A");
  assert!(inner.ty.same(&statics.module.sigs, &Type::prim(a)));
}

#[test]
fn overload_over_a_union_argument_is_ambiguous() {
  let mut b = Build::new();
  overloaded(&mut b);
  let ua = b.name("A");
  let ub = b.name("B");
  let bound = b.bin(BinOp::Union, ua, ub);
  let qa = b.bind("a", bound);
  let arg = b.name("a");
  let call = b.call("p", vec![arg]);
  let body = b.un(UnOp::Some, call);
  b.pred("q", vec![qa], body);
  fail(b, 4012, "ambiguous");
}

#[test]
fn function_used_without_arguments() {
  let mut b = Build::new();
  b.sig("A");
  let x = b.name("A");
  let px = b.bind("x", x);
  let ret = b.name("A");
  let body = b.name("x");
  b.fun("p", vec![px], ret, body);
  let p = b.name("p");
  let fact = b.un(UnOp::Some, p);
  b.fact(fact);
  fail(b, 4010, "expects 1 argument, found 0");
}

#[test]
fn bracket_application_of_a_field() {
  let mut b = Build::new();
  let bound = b.name("A");
  let f = b.field("f", bound);
  b.sig_full("A", false, Parents::Toplevel, vec![f]);
  let abound = b.name("A");
  let qa = b.bind("a", abound);
  let arg = b.name("a");
  let call = b.call("f", vec![arg]);
  let body = b.un(UnOp::Some, call);
  b.pred("q", vec![qa], body);
  check(b);
}

#[test]
fn nullary_function_referenced_by_name() {
  let mut b = Build::new();
  b.sig("A");
  let ret = b.name("A");
  let body = b.name("A");
  b.fun("c", Vec::new(), ret, body);
  let c = b.name("c");
  let fact = b.un(UnOp::Some, c);
  b.fact(fact);
  let c2 = b.call("c", Vec::new());
  let fact2 = b.un(UnOp::Some, c2);
  b.fact(fact2);
  let statics = check(b);
  assert_eq!(statics.module.facts.len(), 2);
}

#[test]
fn partial_application_extends_through_dots() {
  let mut b = Build::new();
  b.sig("A");
  let x = b.name("A");
  let px = b.bind("x", x);
  let y = b.name("A");
  let py = b.bind("y", y);
  let ret = b.name("A");
  let body = b.name("x");
  b.fun("p", vec![px, py], ret, body);
  // A.(A.p) applies both arguments
  let p = b.name("p");
  let a1 = b.name("A");
  let inner = b.dot(a1, p);
  let a2 = b.name("A");
  let outer = b.dot(a2, inner);
  let fact = b.un(UnOp::Some, outer);
  b.fact(fact);
  let statics = check(b);
  let ExprKind::Unary(UnOp::Some, call) = &statics.module.facts[0].body.kind else {
    panic!("expected unary")
  };
  let ExprKind::Call(_, args) = &call.kind else { panic!("expected a call, got {call:?}") };
  assert_eq!(args.len(), 2);
}

#[test]
fn predicate_body_is_a_formula() {
  let mut b = Build::new();
  b.sig("A");
  let lhs = b.name("A");
  let rhs = b.name("A");
  let body = b.bin(BinOp::Eq, lhs, rhs);
  b.pred("p", Vec::new(), body);
  let statics = check(b);
  let body = statics.module.funs[0].body.as_ref().expect("has a body");
  assert!(body.ty.is_bool());
  assert!(statics.module.funs[0].is_pred);
}

#[test]
fn function_body_must_match_the_return_bound() {
  let mut b = Build::new();
  b.sig("A");
  b.sig("B");
  let ret = b.name("A");
  let body = b.name("B");
  b.fun("g", Vec::new(), ret, body);
  fail(b, 4009, "expected");
}

#[test]
fn later_params_see_earlier_ones() {
  let mut b = Build::new();
  let bound = b.name("A");
  let f = b.field("f", bound);
  b.sig_full("A", false, Parents::Toplevel, vec![f]);
  let xb = b.name("A");
  let px = b.bind("x", xb);
  let xref = b.name("x");
  let fref = b.name("f");
  let yb = b.dot(xref, fref);
  let py = b.bind("y", yb);
  let xr = b.name("x");
  let yr = b.name("y");
  let body = b.bin(BinOp::Eq, xr, yr);
  b.pred("q", vec![px, py], body);
  check(b);
}

#[test]
fn duplicate_parameter_names() {
  let mut b = Build::new();
  b.sig("A");
  let xa = b.name("A");
  let p1 = b.bind("x", xa);
  let xb = b.name("A");
  let p2 = b.bind("x", xb);
  let body = b.name("x");
  let some = b.un(UnOp::Some, body);
  b.pred("q", vec![p1, p2], some);
  fail(b, 3003, "duplicate parameter: x");
}
