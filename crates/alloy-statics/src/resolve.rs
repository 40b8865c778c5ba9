//! Top-down selection: given the type the context wants, pick the unique
//! well-typed candidate at every `Choice` node and rebuild the tree.
//!
//! Nodes are never mutated; resolution returns a new tree sharing unchanged
//! subtrees. Resolving an already-resolved tree is the identity.

use crate::error::ErrorKind;
use crate::expr::{Expr, ExprKind, ExprRef};
use crate::st::St;
use alloy_statics_types::sig::Sigs;
use alloy_statics_types::ty::{ProductType, Type};
use alloy_syntax::BinOp;
use std::rc::Rc;

/// Returns whether an expression of type `ty` is acceptable where the
/// context wants `want`: the two share an arity and, when both sides have
/// tuples, they intersect; or both are boolean; or both are integer.
pub(crate) fn compatible(sigs: &Sigs, ty: &Type, want: &Type) -> bool {
  if want.is_bool() && ty.is_bool() {
    return true;
  }
  if want.is_int() && ty.is_int() {
    return true;
  }
  ty.has_common_arity(want) && (!(ty.has_tuple() && want.has_tuple()) || ty.intersects(sigs, want))
}

pub(crate) fn get(st: &mut St<'_>, expr: &ExprRef, want: &Type) -> ExprRef {
  match &expr.kind {
    ExprKind::Error => expr.clone(),
    ExprKind::Choice(cands) => choose(st, expr, cands, want),
    ExprKind::BadCall(f, args) => {
      let fun = &st.funs[f.to_usize()];
      let kind = ErrorKind::TooFewArgs(fun.name.clone(), fun.params.len(), args.len());
      st.err(expr.pos.clone(), kind);
      Expr::error(expr.pos.clone())
    }
    _ => {
      if !compatible(&st.sigs, &expr.ty, want) {
        st.err(expr.pos.clone(), ErrorKind::NoCompatibleType(want.clone(), expr.ty.clone()));
        return Expr::error(expr.pos.clone());
      }
      descend(st, expr, want)
    }
  }
}

/// Selects among the candidates of a choice node: keep the compatible ones,
/// prefer the lightest, then the unique most specific; anything else is
/// ambiguous.
fn choose(st: &mut St<'_>, expr: &ExprRef, cands: &[ExprRef], want: &Type) -> ExprRef {
  let viable: Vec<&ExprRef> = cands
    .iter()
    .filter(|c| {
      !c.is_error()
        && !matches!(c.kind, ExprKind::BadCall(_, _))
        && compatible(&st.sigs, &c.ty, want)
    })
    .collect();
  if viable.is_empty() {
    let bad_call = cands.iter().find_map(|c| match &c.kind {
      ExprKind::BadCall(f, args) => Some((*f, args.len())),
      _ => None,
    });
    let kind = match bad_call {
      Some((f, got)) => {
        let fun = &st.funs[f.to_usize()];
        ErrorKind::TooFewArgs(fun.name.clone(), fun.params.len(), got)
      }
      None => ErrorKind::NoCompatibleType(want.clone(), expr.ty.clone()),
    };
    st.err(expr.pos.clone(), kind);
    return Expr::error(expr.pos.clone());
  }
  let min_weight = viable.iter().map(|c| c.extra_weight).min().unwrap_or(0);
  let light: Vec<&ExprRef> = viable.into_iter().filter(|c| c.extra_weight == min_weight).collect();
  let selected = if light.len() == 1 {
    light[0]
  } else {
    // a candidate subsumed by every other is the most specific reading
    let most_specific: Vec<&&ExprRef> = light
      .iter()
      .filter(|c| light.iter().all(|o| c.ty.subsumed_by(&st.sigs, &o.ty)))
      .collect();
    match most_specific[..] {
      [one] => *one,
      _ => {
        let tys = light.iter().map(|c| c.ty.clone()).collect();
        st.err(expr.pos.clone(), ErrorKind::Ambiguous(tys));
        return Expr::error(expr.pos.clone());
      }
    }
  };
  get(st, selected, want)
}

fn rebuilt(expr: &ExprRef, ty: Type, kind: ExprKind) -> ExprRef {
  Rc::new(Expr {
    pos: expr.pos.clone(),
    ty,
    extra_weight: expr.extra_weight,
    synthesized: expr.synthesized,
    kind,
  })
}

/// Rebuilds a non-choice node, pushing a narrowed constraint into each
/// child.
fn descend(st: &mut St<'_>, expr: &ExprRef, want: &Type) -> ExprRef {
  match &expr.kind {
    ExprKind::Sig(_) | ExprKind::Field(_) | ExprKind::Var(_) | ExprKind::Int(_) => expr.clone(),
    ExprKind::CastToSigInt(inner) => {
      let inner_want = inner.ty.clone();
      let inner = get(st, inner, &inner_want);
      rebuilt(expr, expr.ty.clone(), ExprKind::CastToSigInt(inner))
    }
    ExprKind::Unary(op, inner) => {
      let inner_want = unary_want(st, *op, inner, want);
      let inner = get(st, inner, &inner_want);
      rebuilt(expr, expr.ty.clone(), ExprKind::Unary(*op, inner))
    }
    ExprKind::Binary(op, lhs, rhs) => {
      let (lw, rw) = binary_wants(st, *op, lhs, rhs, want);
      let lhs = get(st, lhs, &lw);
      let rhs = get(st, rhs, &rw);
      rebuilt(expr, expr.ty.clone(), ExprKind::Binary(*op, lhs, rhs))
    }
    ExprKind::Join(lhs, rhs) => {
      let (lw, rw) = join_wants(&st.sigs, lhs, rhs, want);
      let lhs = get(st, lhs, &lw);
      let rhs = get(st, rhs, &rw);
      rebuilt(expr, expr.ty.clone(), ExprKind::Join(lhs, rhs))
    }
    ExprKind::Quant(quant, vars, body) => {
      let body = get(st, body, &Type::FORMULA);
      rebuilt(expr, expr.ty.clone(), ExprKind::Quant(*quant, vars.clone(), body))
    }
    ExprKind::Call(f, args) => {
      let param_tys: Vec<Type> =
        st.funs[f.to_usize()].params.iter().map(|p| p.ty.clone()).collect();
      let args: Vec<ExprRef> =
        args.iter().zip(&param_tys).map(|(arg, want)| get(st, arg, want)).collect();
      rebuilt(expr, expr.ty.clone(), ExprKind::Call(*f, args))
    }
    ExprKind::Let(var, bound, body) => {
      let body = get(st, body, want);
      let ty = body.ty.clone();
      rebuilt(expr, ty, ExprKind::Let(*var, bound.clone(), body))
    }
    ExprKind::Ite(cond, then, els) => {
      let cond = get(st, cond, &Type::FORMULA);
      let then = get(st, then, want);
      let els = get(st, els, want);
      rebuilt(expr, expr.ty.clone(), ExprKind::Ite(cond, then, els))
    }
    ExprKind::Error | ExprKind::Choice(_) | ExprKind::BadCall(_, _) => {
      unreachable!("handled by the caller")
    }
  }
}

fn unary_want(st: &St<'_>, op: alloy_syntax::UnOp, inner: &ExprRef, want: &Type) -> Type {
  use alloy_syntax::UnOp;
  match op {
    UnOp::Not => Type::FORMULA,
    UnOp::No | UnOp::Some | UnOp::Lone | UnOp::One | UnOp::Cardinality => inner.ty.clone(),
    UnOp::Transpose => {
      let flipped = want.transpose(&st.sigs);
      if flipped.entry_count() == 0 {
        inner.ty.clone()
      } else {
        flipped
      }
    }
    UnOp::Closure | UnOp::ReflClosure => {
      let binary = inner.ty.extract(2);
      if binary.entry_count() == 0 {
        inner.ty.clone()
      } else {
        binary
      }
    }
  }
}

fn binary_wants(st: &St<'_>, op: BinOp, lhs: &ExprRef, rhs: &ExprRef, want: &Type) -> (Type, Type) {
  match op {
    BinOp::And | BinOp::Or | BinOp::Implies | BinOp::Iff => (Type::FORMULA, Type::FORMULA),
    BinOp::Eq | BinOp::In => {
      let lw = nonempty_or(lhs.ty.pick_common_arity(&rhs.ty), &lhs.ty);
      let rw = nonempty_or(rhs.ty.pick_common_arity(&lhs.ty), &rhs.ty);
      (lw, rw)
    }
    BinOp::Union | BinOp::Diff | BinOp::Intersect | BinOp::Override => {
      let lw = nonempty_or(lhs.ty.pick_common_arity(want), &lhs.ty);
      let rw = nonempty_or(rhs.ty.pick_common_arity(want), &rhs.ty);
      (lw, rw)
    }
    BinOp::Product => product_wants(&st.sigs, lhs, rhs, want),
    BinOp::DomRestrict => {
      let lw = nonempty_or(lhs.ty.extract(1), &lhs.ty);
      let rw = nonempty_or(rhs.ty.pick_common_arity(want), &rhs.ty);
      (lw, rw)
    }
    BinOp::RanRestrict => {
      let lw = nonempty_or(lhs.ty.pick_common_arity(want), &lhs.ty);
      let rw = nonempty_or(rhs.ty.extract(1), &rhs.ty);
      (lw, rw)
    }
  }
}

fn nonempty_or(ty: Type, fallback: &Type) -> Type {
  if ty.entry_count() == 0 {
    fallback.clone()
  } else {
    ty
  }
}

/// Keeps, for each side of a product, the entries whose pairing is relevant
/// to the wanted type.
fn product_wants(sigs: &Sigs, lhs: &ExprRef, rhs: &ExprRef, want: &Type) -> (Type, Type) {
  let mut lw = Type::EMPTY;
  let mut rw = Type::EMPTY;
  for a in lhs.ty.entries() {
    for b in rhs.ty.entries() {
      let Ok(ab) = a.product(b) else { continue };
      if entry_compatible(sigs, &ab, want) {
        lw = lw.merge(sigs, &Type::entry(a.clone()));
        rw = rw.merge(sigs, &Type::entry(b.clone()));
      }
    }
  }
  (nonempty_or(lw, &lhs.ty), nonempty_or(rw, &rhs.ty))
}

/// Keeps, for each side of a join, the entries whose pairing joins to
/// something relevant to the wanted type. This is what lets an outer
/// constraint disambiguate an overloaded name under a dot.
fn join_wants(sigs: &Sigs, lhs: &ExprRef, rhs: &ExprRef, want: &Type) -> (Type, Type) {
  let mut lw = Type::EMPTY;
  let mut rw = Type::EMPTY;
  for a in lhs.ty.entries() {
    for b in rhs.ty.entries() {
      if a.arity() + b.arity() <= 2 {
        continue;
      }
      let Ok(ab) = a.join(sigs, b) else { continue };
      if ab.is_empty() {
        continue;
      }
      if entry_compatible(sigs, &ab, want) {
        lw = lw.merge(sigs, &Type::entry(a.clone()));
        rw = rw.merge(sigs, &Type::entry(b.clone()));
      }
    }
  }
  (nonempty_or(lw, &lhs.ty), nonempty_or(rw, &rhs.ty))
}

fn entry_compatible(sigs: &Sigs, entry: &ProductType, want: &Type) -> bool {
  if want.entry_count() == 0 {
    return true;
  }
  want.entries().any(|w| w.arity() == entry.arity() && entry.intersects(sigs, w))
}
