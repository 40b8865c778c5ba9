//! Bottom-up elaboration: each untyped expression becomes a set of candidate
//! typed expressions.
//!
//! Most nodes have exactly one candidate. Overloaded names expand to one
//! candidate per in-scope binding, and `.` threads candidates through both
//! readings (relational join and function application). The top-down pass in
//! `resolve` selects among them.

use crate::cx::{Binding, Cx};
use crate::error::ErrorKind;
use crate::expr::{Expr, ExprKind, ExprRef, FunId};
use crate::resolve;
use crate::st::St;
use alloy_statics_types::cancel::Cancelled;
use alloy_statics_types::sig::{PrimSig, Sig};
use alloy_statics_types::ty::Type;
use alloy_syntax::{Arenas, BinOp, ExpIdx, ExpKind, Pos, UnOp};

pub(crate) fn get(st: &mut St<'_>, cx: &Cx, ars: &Arenas, exp: ExpIdx) -> Result<ExprRef, Cancelled> {
  let pos = ars.exp[exp].pos.clone();
  match &ars.exp[exp].kind {
    ExpKind::Name(name) => {
      let bindings = cx.lookup(name);
      if bindings.is_empty() {
        st.err(pos.clone(), ErrorKind::Undefined(name.clone()));
        return Ok(Expr::error(pos));
      }
      let cands = name_exprs(st, &pos, &bindings);
      Ok(mk_choice(st, pos, cands))
    }
    ExpKind::Int(n) => Ok(Expr::new(pos, Type::INT, ExprKind::Int(*n))),
    ExpKind::Unary(op, inner) => {
      let inner = get(st, cx, ars, *inner)?;
      unary(st, pos, *op, &inner)
    }
    ExpKind::Binary(op, lhs, rhs) => {
      let lhs = get(st, cx, ars, *lhs)?;
      let rhs = get(st, cx, ars, *rhs)?;
      Ok(binary(st, pos, *op, &lhs, &rhs))
    }
    ExpKind::Dot(lhs, rhs) => {
      let lhs = get(st, cx, ars, *lhs)?;
      let rhs = get(st, cx, ars, *rhs)?;
      Ok(dot(st, pos, &lhs, &rhs))
    }
    ExpKind::Call(name, args) => {
      let bindings = cx.lookup(name);
      if bindings.is_empty() {
        st.err(pos.clone(), ErrorKind::Undefined(name.clone()));
        return Ok(Expr::error(pos));
      }
      // `f[a, b]` is `b.(a.f)`: thread the candidates through one dot step
      // per argument, so relations, overloads, and partial applications all
      // behave the same whether written with brackets or dots.
      let mut cur = name_exprs(st, &pos, &bindings);
      for &arg in args {
        let arg = get(st, cx, ars, arg)?;
        if arg.is_error() {
          return Ok(Expr::error(pos));
        }
        match process_step(st, &pos, &arg, &cur) {
          Ok(next) => cur = next,
          Err(()) => return Ok(Expr::error(pos)),
        }
      }
      Ok(mk_choice(st, pos, cur))
    }
    ExpKind::Quant(quant, binds, body) => {
      let mut cx = cx.clone();
      let mut vars = Vec::with_capacity(binds.len());
      for vb in binds {
        let Some((bound, ty)) = get_bound(st, &cx, ars, &vb.pos, vb.bound)? else {
          return Ok(Expr::error(pos));
        };
        let var = st.fresh_var(vb.name.clone(), ty);
        cx.push_local(vb.name.clone(), var);
        vars.push((var, bound));
      }
      let body = get(st, &cx, ars, *body)?;
      if body.is_error() {
        return Ok(Expr::error(pos));
      }
      Ok(Expr::new(pos, Type::FORMULA, ExprKind::Quant(*quant, vars, body)))
    }
    ExpKind::Let(vb, body) => {
      let bound = get(st, cx, ars, vb.bound)?;
      if bound.is_error() {
        return Ok(Expr::error(pos));
      }
      if bad_call_value(st, &bound) {
        return Ok(Expr::error(pos));
      }
      // a let may bind a set, an integer, or a formula
      if bound.ty.entry_count() == 0 && !bound.ty.is_int() && !bound.ty.is_bool() {
        st.err(vb.pos.clone(), ErrorKind::NotRelational(bound.ty.clone()));
        return Ok(Expr::error(pos));
      }
      let want = bound.ty.clone();
      let bound = resolve::get(st, &bound, &want);
      if bound.is_error() {
        return Ok(Expr::error(pos));
      }
      let var = st.fresh_var(vb.name.clone(), bound.ty.clone());
      let mut cx = cx.clone();
      cx.push_local(vb.name.clone(), var);
      let body = get(st, &cx, ars, *body)?;
      if body.is_error() {
        return Ok(Expr::error(pos));
      }
      let ty = body.ty.clone();
      let weight = bound.extra_weight + body.extra_weight;
      Ok(Expr::with_weight(pos, ty, ExprKind::Let(var, bound, body), weight))
    }
    ExpKind::Ite(cond, then, els) => {
      let cond = get(st, cx, ars, *cond)?;
      let then = get(st, cx, ars, *then)?;
      let els = get(st, cx, ars, *els)?;
      if cond.is_error() || then.is_error() || els.is_error() {
        return Ok(Expr::error(pos));
      }
      if !cond.ty.is_bool() {
        st.err(cond.pos.clone(), ErrorKind::NotBoolean(cond.ty.clone()));
        return Ok(Expr::error(pos));
      }
      let ty = then.ty.merge(&st.sigs, &els.ty);
      let weight = cond.extra_weight + then.extra_weight + els.extra_weight;
      Ok(Expr::with_weight(pos, ty, ExprKind::Ite(cond, then, els), weight))
    }
  }
}

/// Elaborates the bound of a binder that must denote a set or relation, and
/// resolves it against its own type. Returns the resolved bound and the
/// variable's type, or `None` (already reported) on failure.
pub(crate) fn get_bound(
  st: &mut St<'_>,
  cx: &Cx,
  ars: &Arenas,
  pos: &Pos,
  bound: ExpIdx,
) -> Result<Option<(ExprRef, Type)>, Cancelled> {
  let bound = get(st, cx, ars, bound)?;
  if bound.is_error() {
    return Ok(None);
  }
  if bad_call_value(st, &bound) {
    return Ok(None);
  }
  if bound.ty.entry_count() == 0 {
    st.err(pos.clone(), ErrorKind::NotRelational(bound.ty.clone()));
    return Ok(None);
  }
  let want = bound.ty.clone();
  let bound = resolve::get(st, &bound, &want);
  if bound.is_error() {
    return Ok(None);
  }
  let ty = bound.ty.drop_int_and_bool();
  Ok(Some((bound, ty)))
}

/// A function mentioned without enough arguments cannot be used as a value.
/// Reports it and returns `true` when `e` is such a mention.
fn bad_call_value(st: &mut St<'_>, e: &ExprRef) -> bool {
  let ExprKind::BadCall(f, args) = &e.kind else { return false };
  let fun = &st.funs[f.to_usize()];
  let kind = ErrorKind::TooFewArgs(fun.name.clone(), fun.params.len(), args.len());
  st.err(e.pos.clone(), kind);
  true
}

/// Returns whether `f` accepts a prefix of `args`: every parameter shares an
/// arity with its argument, and when both sides have tuples they intersect.
/// Extra arguments beyond the parameter list are ignored.
pub(crate) fn applicable(st: &St<'_>, f: FunId, args: &[ExprRef]) -> bool {
  let fun = &st.funs[f.to_usize()];
  if fun.params.len() > args.len() {
    return false;
  }
  fun.params.iter().zip(args).all(|(param, arg)| {
    arg.ty.has_common_arity(&param.ty)
      && (!(arg.ty.has_tuple() && param.ty.has_tuple()) || arg.ty.intersects(&st.sigs, &param.ty))
  })
}

fn name_exprs(st: &St<'_>, pos: &Pos, bindings: &[Binding]) -> Vec<ExprRef> {
  bindings
    .iter()
    .map(|&binding| match binding {
      Binding::Sig(s) => Expr::new(pos.clone(), st.sigs.sig_type(s), ExprKind::Sig(s)),
      Binding::Field(f) => Expr::new(pos.clone(), st.sigs.field(f).ty.clone(), ExprKind::Field(f)),
      Binding::Var(v) => Expr::new(pos.clone(), st.vars[v.to_usize()].ty.clone(), ExprKind::Var(v)),
      Binding::Fun(f) => {
        let fun = &st.funs[f.to_usize()];
        if fun.params.is_empty() {
          Expr::new(pos.clone(), fun.ret.clone(), ExprKind::Call(f, Vec::new()))
        } else {
          Expr::new(pos.clone(), Type::EMPTY, ExprKind::BadCall(f, Vec::new()))
        }
      }
    })
    .collect()
}

/// Wraps candidates in a `Choice` node whose type is the union of the
/// candidates' types. A single candidate needs no wrapper.
fn mk_choice(st: &St<'_>, pos: Pos, mut cands: Vec<ExprRef>) -> ExprRef {
  assert!(!cands.is_empty(), "a choice must have candidates");
  if cands.len() == 1 {
    return cands.swap_remove(0);
  }
  let ty = cands.iter().fold(Type::EMPTY, |acc, c| acc.merge(&st.sigs, &c.ty));
  let weight = cands.iter().map(|c| c.extra_weight).min().unwrap_or(0);
  Expr::with_weight(pos, ty, ExprKind::Choice(cands), weight)
}

fn dot(st: &mut St<'_>, pos: Pos, lhs: &ExprRef, rhs: &ExprRef) -> ExprRef {
  if lhs.is_error() || rhs.is_error() {
    return Expr::error(pos);
  }
  // the special built-in cast `intexpr.Int`
  let rhs_is_sigint = match rhs.kind {
    ExprKind::Sig(Sig::Prim(p)) => p == PrimSig::SIGINT,
    _ => false,
  };
  if lhs.ty.is_int() && rhs_is_sigint {
    let ty = Type::prim(PrimSig::SIGINT);
    return Expr::synthesized(pos, ty, ExprKind::CastToSigInt(lhs.clone()), lhs.extra_weight + 1);
  }
  let cands: Vec<ExprRef> = match &rhs.kind {
    ExprKind::Choice(cands) => cands.clone(),
    _ => vec![rhs.clone()],
  };
  match process_step(st, &pos, lhs, &cands) {
    Ok(out) => mk_choice(st, pos, out),
    Err(()) => Expr::error(pos),
  }
}

enum JoinOut {
  Ok(ExprRef),
  /// Well-formed, but the result can never hold a tuple.
  Empty(ExprRef),
  Fail(ErrorKind),
}

/// One dot step: `lhs` meets every candidate reading of the right-hand side.
/// A partially-applied function takes `lhs` as its next argument; everything
/// else is joined. Candidates that cannot take the step are discarded as
/// long as some candidate survives.
fn process_step(
  st: &mut St<'_>,
  pos: &Pos,
  lhs: &ExprRef,
  cands: &[ExprRef],
) -> Result<Vec<ExprRef>, ()> {
  let mut ok = Vec::<ExprRef>::new();
  let mut empty = Vec::<ExprRef>::new();
  let mut fail = None::<ErrorKind>;
  for c in cands {
    if let ExprKind::BadCall(f, args) = &c.kind {
      if args.len() < st.funs[f.to_usize()].params.len() {
        let mut newargs = args.clone();
        newargs.push(lhs.clone());
        let node = if applicable(st, *f, &newargs) {
          let ty = st.funs[f.to_usize()].ret.clone();
          let weight = c.extra_weight + lhs.extra_weight;
          Expr::with_weight(pos.clone(), ty, ExprKind::Call(*f, newargs), weight)
        } else {
          Expr::with_weight(pos.clone(), Type::EMPTY, ExprKind::BadCall(*f, newargs), c.extra_weight)
        };
        ok.push(node);
        continue;
      }
    }
    match join_one(st, pos, lhs, c) {
      JoinOut::Ok(node) => ok.push(node),
      JoinOut::Empty(node) => empty.push(node),
      JoinOut::Fail(kind) => fail = fail.or(Some(kind)),
    }
  }
  if !ok.is_empty() {
    return Ok(ok);
  }
  if !empty.is_empty() {
    st.err(pos.clone(), ErrorKind::EmptyJoin);
    return Ok(empty);
  }
  let kind = fail.unwrap_or_else(|| ErrorKind::BadJoin(lhs.ty.clone(), Type::EMPTY));
  st.err(pos.clone(), kind);
  Err(())
}

fn join_one(st: &St<'_>, pos: &Pos, lhs: &ExprRef, rhs: &ExprRef) -> JoinOut {
  let ty = match lhs.ty.join(&st.sigs, &rhs.ty) {
    Ok(ty) => ty,
    Err(_) => return JoinOut::Fail(ErrorKind::Arity),
  };
  if ty.entry_count() == 0 {
    let both_unary = lhs.ty.arities_mask() == 1 << 1 && rhs.ty.arities_mask() == 1 << 1;
    return JoinOut::Fail(if both_unary {
      ErrorKind::JoinUnary
    } else {
      ErrorKind::BadJoin(lhs.ty.clone(), rhs.ty.clone())
    });
  }
  let weight = lhs.extra_weight + rhs.extra_weight;
  let node =
    Expr::with_weight(pos.clone(), ty.clone(), ExprKind::Join(lhs.clone(), rhs.clone()), weight);
  if ty.has_no_tuple() {
    JoinOut::Empty(node)
  } else {
    JoinOut::Ok(node)
  }
}

fn unary(st: &mut St<'_>, pos: Pos, op: UnOp, inner: &ExprRef) -> Result<ExprRef, Cancelled> {
  if inner.is_error() {
    return Ok(Expr::error(pos));
  }
  if bad_call_value(st, inner) {
    return Ok(Expr::error(pos));
  }
  let weight = inner.extra_weight;
  let ty = match op {
    UnOp::Not => {
      if !inner.ty.is_bool() {
        st.err(pos.clone(), ErrorKind::NotBoolean(inner.ty.clone()));
        return Ok(Expr::error(pos));
      }
      Type::FORMULA
    }
    UnOp::No | UnOp::Some | UnOp::Lone | UnOp::One => {
      if inner.ty.entry_count() == 0 {
        st.err(pos.clone(), ErrorKind::NotRelational(inner.ty.clone()));
        return Ok(Expr::error(pos));
      }
      Type::FORMULA
    }
    UnOp::Cardinality => {
      if inner.ty.entry_count() == 0 {
        st.err(pos.clone(), ErrorKind::NotRelational(inner.ty.clone()));
        return Ok(Expr::error(pos));
      }
      Type::INT
    }
    UnOp::Transpose => {
      let ty = inner.ty.transpose(&st.sigs);
      if ty.entry_count() == 0 {
        st.err(pos.clone(), ErrorKind::NoBinaryEntries(inner.ty.clone()));
        return Ok(Expr::error(pos));
      }
      ty
    }
    UnOp::Closure | UnOp::ReflClosure => {
      if !inner.ty.has_arity(2) {
        st.err(pos.clone(), ErrorKind::NoBinaryEntries(inner.ty.clone()));
        return Ok(Expr::error(pos));
      }
      let closed = inner.ty.closure(&st.sigs, st.cancel)?;
      if matches!(op, UnOp::ReflClosure) {
        closed.merge(&st.sigs, &Type::prim2(PrimSig::UNIV))
      } else {
        closed
      }
    }
  };
  Ok(Expr::with_weight(pos, ty, ExprKind::Unary(op, inner.clone()), weight))
}

fn binary(st: &mut St<'_>, pos: Pos, op: BinOp, lhs: &ExprRef, rhs: &ExprRef) -> ExprRef {
  if lhs.is_error() || rhs.is_error() {
    return Expr::error(pos);
  }
  if bad_call_value(st, lhs) || bad_call_value(st, rhs) {
    return Expr::error(pos);
  }
  let weight = lhs.extra_weight + rhs.extra_weight;
  let ty = match op {
    BinOp::Union => {
      if !lhs.ty.has_common_arity(&rhs.ty) {
        st.err(pos.clone(), ErrorKind::NoCommonArity(lhs.ty.clone(), rhs.ty.clone()));
        return Expr::error(pos);
      }
      lhs.ty.union_with_common_arity(&st.sigs, &rhs.ty)
    }
    BinOp::Diff => {
      if !lhs.ty.has_common_arity(&rhs.ty) {
        st.err(pos.clone(), ErrorKind::NoCommonArity(lhs.ty.clone(), rhs.ty.clone()));
        return Expr::error(pos);
      }
      let ty = lhs.ty.pick_common_arity(&rhs.ty);
      if lhs.ty.has_tuple() && rhs.ty.has_tuple() && !lhs.ty.intersects(&st.sigs, &rhs.ty) {
        st.err(pos.clone(), ErrorKind::RedundantDiff(lhs.ty.clone(), rhs.ty.clone()));
      }
      ty
    }
    BinOp::Intersect => {
      if !lhs.ty.has_common_arity(&rhs.ty) {
        st.err(pos.clone(), ErrorKind::NoCommonArity(lhs.ty.clone(), rhs.ty.clone()));
        return Expr::error(pos);
      }
      let ty = lhs.ty.intersect(&st.sigs, &rhs.ty);
      if lhs.ty.has_tuple() && rhs.ty.has_tuple() && ty.has_no_tuple() {
        st.err(pos.clone(), ErrorKind::EmptyIntersect);
      }
      ty
    }
    BinOp::Override => {
      if !lhs.ty.can_override(&st.sigs, &rhs.ty) {
        st.err(pos.clone(), ErrorKind::CannotOverride(lhs.ty.clone(), rhs.ty.clone()));
        return Expr::error(pos);
      }
      lhs.ty.union_with_common_arity(&st.sigs, &rhs.ty)
    }
    BinOp::Product => match lhs.ty.product(&st.sigs, &rhs.ty) {
      Ok(ty) => ty,
      Err(_) => {
        st.err(pos.clone(), ErrorKind::Arity);
        return Expr::error(pos);
      }
    },
    BinOp::DomRestrict => {
      if !lhs.ty.has_arity(1) {
        st.err(pos.clone(), ErrorKind::NoUnaryEntries(lhs.ty.clone()));
        return Expr::error(pos);
      }
      rhs.ty.domain_restrict(&st.sigs, &lhs.ty)
    }
    BinOp::RanRestrict => {
      if !rhs.ty.has_arity(1) {
        st.err(pos.clone(), ErrorKind::NoUnaryEntries(rhs.ty.clone()));
        return Expr::error(pos);
      }
      lhs.ty.range_restrict(&st.sigs, &rhs.ty)
    }
    BinOp::Eq | BinOp::In => {
      if lhs.ty.is_int() && rhs.ty.is_int() {
        Type::FORMULA
      } else if !lhs.ty.has_common_arity(&rhs.ty) {
        st.err(pos.clone(), ErrorKind::NoCommonArity(lhs.ty.clone(), rhs.ty.clone()));
        return Expr::error(pos);
      } else {
        if lhs.ty.has_tuple() && rhs.ty.has_tuple() && !lhs.ty.intersects(&st.sigs, &rhs.ty) {
          st.err(pos.clone(), ErrorKind::AlwaysFalse(op, lhs.ty.clone(), rhs.ty.clone()));
        }
        Type::FORMULA
      }
    }
    BinOp::And | BinOp::Or | BinOp::Implies | BinOp::Iff => {
      let mut bad = false;
      for side in [lhs, rhs] {
        if !side.ty.is_bool() {
          st.err(side.pos.clone(), ErrorKind::NotBoolean(side.ty.clone()));
          bad = true;
        }
      }
      if bad {
        return Expr::error(pos);
      }
      Type::FORMULA
    }
  };
  Expr::with_weight(pos, ty, ExprKind::Binary(op, lhs.clone(), rhs.clone()), weight)
}
