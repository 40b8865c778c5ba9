//! Checking declarations.
//!
//! Pass 1 registers sig names, wires the extension tree and subset parents,
//! and elaborates field bounds and function signatures. Pass 2 elaborates
//! every body against its outer constraint. Each top-level declaration is
//! its own unit of recovery: a bad one is dropped and its siblings continue.

use crate::cx::{Binding, Cx};
use crate::error::{ErrorKind, Item};
use crate::expr::{ExprRef, FunId, VarId};
use crate::module::{Assert, Command, Fact, Fun, Param};
use crate::st::St;
use crate::{exp, resolve};
use alloy_statics_types::cancel::Cancelled;
use alloy_statics_types::sig::{PrimSig, Sig};
use alloy_statics_types::ty::Type;
use alloy_syntax::{Arenas, Decl, ExpIdx, Name, Parents, Pos, Root, SigDecl, VarBind};
use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Debug)]
pub(crate) struct Output {
  pub(crate) facts: Vec<Fact>,
  pub(crate) asserts: Vec<Assert>,
  pub(crate) commands: Vec<Command>,
}

pub(crate) fn get(st: &mut St<'_>, root: &Root) -> Result<Output, Cancelled> {
  let ars = &root.arenas;
  let mut cx = Cx::default();
  let mut sigs_by_name = FxHashMap::<Name, Sig>::default();
  for (name, sig) in [("univ", PrimSig::UNIV), ("Int", PrimSig::SIGINT), ("none", PrimSig::NONE)] {
    let name = Name::new(name);
    cx.insert_global(name.clone(), Binding::Sig(Sig::Prim(sig)));
    sigs_by_name.insert(name, Sig::Prim(sig));
  }

  // register sig names, dropping duplicates and malformed declarations
  let mut sig_decls = Vec::<&SigDecl>::new();
  for decl in &root.decls {
    let Decl::Sig(d) = decl else { continue };
    if d.is_abstract && matches!(d.parents, Parents::Subset(_)) {
      st.err(d.pos.clone(), ErrorKind::AbstractSubsetSig);
      continue;
    }
    if sigs_by_name.contains_key(&d.name) || sig_decls.iter().any(|s| s.name == d.name) {
      st.err(d.pos.clone(), ErrorKind::Duplicate(Item::Sig, d.name.clone()));
      continue;
    }
    sig_decls.push(d);
  }

  // create the prim sigs, then wire parents once every name exists
  for d in &sig_decls {
    if matches!(d.parents, Parents::Subset(_)) {
      continue;
    }
    let s = st.sigs.insert_prim(d.pos.clone(), d.name.clone(), None, d.is_abstract, d.mult);
    sigs_by_name.insert(d.name.clone(), Sig::Prim(s));
    cx.insert_global(d.name.clone(), Binding::Sig(Sig::Prim(s)));
  }
  let subset_by_name: FxHashMap<&Name, &SigDecl> = sig_decls
    .iter()
    .filter(|d| matches!(d.parents, Parents::Subset(_)))
    .map(|d| (&d.name, *d))
    .collect();
  for d in &sig_decls {
    let parent_name = match &d.parents {
      Parents::Subset(_) => continue,
      Parents::Toplevel => None,
      Parents::Extends(n) => Some(n),
    };
    let Some(&Sig::Prim(child)) = sigs_by_name.get(&d.name) else { continue };
    let parent = match parent_name {
      None => PrimSig::UNIV,
      Some(n) => {
        if subset_by_name.contains_key(n) {
          st.err(d.pos.clone(), ErrorKind::CannotExtendSubset(n.clone()));
          PrimSig::UNIV
        } else {
          match sigs_by_name.get(n) {
            None => {
              st.err(d.pos.clone(), ErrorKind::Undefined(n.clone()));
              PrimSig::UNIV
            }
            Some(Sig::Subset(_)) => {
              st.err(d.pos.clone(), ErrorKind::CannotExtendSubset(n.clone()));
              PrimSig::UNIV
            }
            Some(&Sig::Prim(p)) => {
              if p == PrimSig::NONE || p == PrimSig::SIGINT {
                st.err(d.pos.clone(), ErrorKind::CannotExtend(n.clone()));
                PrimSig::UNIV
              } else {
                p
              }
            }
          }
        }
      }
    };
    st.sigs.link_parent(child, parent);
  }

  // resolve subset sigs in dependency order, since a subset-of-subset needs
  // its parent's upper bound first
  let mut done = FxHashMap::<Name, Option<Sig>>::default();
  let mut visiting = FxHashSet::<Name>::default();
  for &d in &sig_decls {
    if matches!(d.parents, Parents::Subset(_)) {
      resolve_subset(st, &mut cx, &mut sigs_by_name, d, &subset_by_name, &mut done, &mut visiting);
    }
  }

  // field declarations
  for d in &sig_decls {
    st.cancel.check()?;
    let Some(&owner) = sigs_by_name.get(&d.name) else { continue };
    let owner_ty = st.sigs.sig_type(owner);
    let mut field_names = FxHashSet::<&Name>::default();
    for fd in &d.fields {
      if !field_names.insert(&fd.name) {
        st.err(fd.pos.clone(), ErrorKind::Duplicate(Item::Field, fd.name.clone()));
        continue;
      }
      let Some((_, bound_ty)) = exp::get_bound(st, &cx, ars, &fd.pos, fd.bound)? else { continue };
      match owner_ty.product(&st.sigs, &bound_ty) {
        Err(_) => st.err(fd.pos.clone(), ErrorKind::Arity),
        Ok(full) => {
          let fid = st.sigs.insert_field(fd.pos.clone(), fd.name.clone(), owner, fd.mult, full);
          cx.insert_global(fd.name.clone(), Binding::Field(fid));
        }
      }
    }
  }

  // function and predicate signatures
  let mut fun_ids = Vec::<Option<FunId>>::with_capacity(root.decls.len());
  for decl in &root.decls {
    let id = match decl {
      Decl::Fun(f) => register_fun(st, &mut cx, ars, &f.pos, &f.name, &f.params, Some(f.ret))?,
      Decl::Pred(p) => register_fun(st, &mut cx, ars, &p.pos, &p.name, &p.params, None)?,
      _ => None,
    };
    fun_ids.push(id);
  }

  // pass 2: bodies
  let mut out = Output { facts: Vec::new(), asserts: Vec::new(), commands: Vec::new() };
  for (decl, fun_id) in root.decls.iter().zip(&fun_ids) {
    st.cancel.check()?;
    match decl {
      Decl::Sig(_) => {}
      Decl::Fun(f) => {
        if let Some(id) = fun_id {
          fun_body(st, &cx, ars, *id, f.body)?;
        }
      }
      Decl::Pred(p) => {
        if let Some(id) = fun_id {
          fun_body(st, &cx, ars, *id, p.body)?;
        }
      }
      Decl::Fact(d) => {
        if let Some(body) = formula_body(st, &cx, ars, d.body)? {
          out.facts.push(Fact { pos: d.pos.clone(), name: d.name.clone(), body });
        }
      }
      Decl::Assert(d) => {
        if let Some(body) = formula_body(st, &cx, ars, d.body)? {
          out.asserts.push(Assert { pos: d.pos.clone(), name: d.name.clone(), body });
        }
      }
      Decl::Command(d) => {
        let Some(body) = formula_body(st, &cx, ars, d.body)? else { continue };
        let mut scopes = Vec::with_capacity(d.scopes.len());
        let mut ok = true;
        for scope in &d.scopes {
          match lookup_sig(st, &cx, &scope.pos, &scope.sig) {
            Some(sig) => scopes.push((sig, scope.bound)),
            None => ok = false,
          }
        }
        if ok {
          out.commands.push(Command { pos: d.pos.clone(), kind: d.kind, body, scopes });
        }
      }
    }
  }
  Ok(out)
}

/// Resolves one subset sig, resolving subset parents first. Returns `None`
/// when the declaration was dropped (already reported).
fn resolve_subset(
  st: &mut St<'_>,
  cx: &mut Cx,
  sigs_by_name: &mut FxHashMap<Name, Sig>,
  d: &SigDecl,
  subset_by_name: &FxHashMap<&Name, &SigDecl>,
  done: &mut FxHashMap<Name, Option<Sig>>,
  visiting: &mut FxHashSet<Name>,
) -> Option<Sig> {
  if let Some(&got) = done.get(&d.name) {
    return got;
  }
  if !visiting.insert(d.name.clone()) {
    st.err(d.pos.clone(), ErrorKind::SubsetCycle(d.name.clone()));
    done.insert(d.name.clone(), None);
    return None;
  }
  let Parents::Subset(parent_names) = &d.parents else {
    unreachable!("resolve_subset on a non-subset sig")
  };
  let mut parents = Vec::<Sig>::with_capacity(parent_names.len());
  let mut upper_bound = Type::EMPTY;
  let mut failed = false;
  for name in parent_names {
    let target = if let Some(&pd) = subset_by_name.get(name) {
      resolve_subset(st, cx, sigs_by_name, pd, subset_by_name, done, visiting)
    } else {
      sigs_by_name.get(name).copied()
    };
    match target {
      None => {
        if !subset_by_name.contains_key(name) {
          st.err(d.pos.clone(), ErrorKind::Undefined(name.clone()));
        }
        failed = true;
      }
      Some(Sig::Prim(p)) if p == PrimSig::NONE => {
        st.err(d.pos.clone(), ErrorKind::CannotSubsetNone);
        failed = true;
      }
      Some(Sig::Prim(p)) if p == PrimSig::UNIV => {
        st.err(d.pos.clone(), ErrorKind::CannotSubsetUniv);
        failed = true;
      }
      Some(parent) => {
        upper_bound = upper_bound.merge(&st.sigs, &st.sigs.sig_type(parent));
        parents.push(parent);
      }
    }
  }
  visiting.remove(&d.name);
  if failed || parents.is_empty() {
    done.insert(d.name.clone(), None);
    return None;
  }
  let s = st.sigs.insert_subset(d.pos.clone(), d.name.clone(), parents, upper_bound, d.mult);
  sigs_by_name.insert(d.name.clone(), Sig::Subset(s));
  cx.insert_global(d.name.clone(), Binding::Sig(Sig::Subset(s)));
  done.insert(d.name.clone(), Some(Sig::Subset(s)));
  Some(Sig::Subset(s))
}

/// Elaborates a function or predicate signature: parameter bounds bind
/// left-to-right, then the return bound. The body waits for pass 2.
fn register_fun(
  st: &mut St<'_>,
  cx: &mut Cx,
  ars: &Arenas,
  pos: &Pos,
  name: &Name,
  params: &[VarBind],
  ret: Option<ExpIdx>,
) -> Result<Option<FunId>, Cancelled> {
  st.cancel.check()?;
  let mut pcx = cx.clone();
  let mut ps = Vec::<Param>::with_capacity(params.len());
  for vb in params {
    if ps.iter().any(|p| p.name == vb.name) {
      st.err(vb.pos.clone(), ErrorKind::Duplicate(Item::Param, vb.name.clone()));
      return Ok(None);
    }
    let Some((_, ty)) = exp::get_bound(st, &pcx, ars, &vb.pos, vb.bound)? else { return Ok(None) };
    let var = st.fresh_var(vb.name.clone(), ty.clone());
    pcx.push_local(vb.name.clone(), var);
    ps.push(Param { name: vb.name.clone(), var, ty });
  }
  let (ret, is_pred) = match ret {
    Some(r) => {
      let rpos = ars.exp[r].pos.clone();
      let Some((_, ty)) = exp::get_bound(st, &pcx, ars, &rpos, r)? else { return Ok(None) };
      (ty, false)
    }
    None => (Type::FORMULA, true),
  };
  let id = FunId(st.funs.len());
  st.funs.push(Fun { pos: pos.clone(), name: name.clone(), params: ps, ret, is_pred, body: None });
  cx.insert_global(name.clone(), Binding::Fun(id));
  Ok(Some(id))
}

fn fun_body(st: &mut St<'_>, cx: &Cx, ars: &Arenas, id: FunId, body: ExpIdx) -> Result<(), Cancelled> {
  let mut pcx = cx.clone();
  let params: Vec<(Name, VarId)> =
    st.funs[id.to_usize()].params.iter().map(|p| (p.name.clone(), p.var)).collect();
  for (name, var) in params {
    pcx.push_local(name, var);
  }
  let body = exp::get(st, &pcx, ars, body)?;
  if body.is_error() {
    return Ok(());
  }
  let want = st.funs[id.to_usize()].ret.clone();
  let body = resolve::get(st, &body, &want);
  if !body.is_error() {
    st.funs[id.to_usize()].body = Some(body);
  }
  Ok(())
}

fn formula_body(
  st: &mut St<'_>,
  cx: &Cx,
  ars: &Arenas,
  body: ExpIdx,
) -> Result<Option<ExprRef>, Cancelled> {
  let body = exp::get(st, cx, ars, body)?;
  if body.is_error() {
    return Ok(None);
  }
  let body = resolve::get(st, &body, &Type::FORMULA);
  Ok((!body.is_error()).then_some(body))
}

/// Looks a name up as a sig, reporting unknown or ambiguous references.
fn lookup_sig(st: &mut St<'_>, cx: &Cx, pos: &Pos, name: &Name) -> Option<Sig> {
  let hits: Vec<Sig> = cx
    .lookup(name)
    .into_iter()
    .filter_map(|b| match b {
      Binding::Sig(s) => Some(s),
      _ => None,
    })
    .collect();
  match hits[..] {
    [] => {
      st.err(pos.clone(), ErrorKind::Undefined(name.clone()));
      None
    }
    [sig] => Some(sig),
    _ => {
      st.err(pos.clone(), ErrorKind::AmbiguousRef(name.clone()));
      None
    }
  }
}
