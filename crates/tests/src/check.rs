//! The test harness: an AST builder standing in for the external parser,
//! and assertions over the produced diagnostics.

use alloy_statics::error::Severity;
use alloy_statics::Statics;
use alloy_statics_types::cancel::Cancel;
use alloy_statics_types::sig::{PrimSig, SubsetSig};
use alloy_syntax::{
  AssertDecl, BinOp, CommandDecl, CommandKind, Decl, Exp, ExpIdx, ExpKind, FactDecl, FieldDecl,
  FunDecl, Mult, Name, Parents, Pos, PredDecl, Quant, Root, Scope, SigDecl, UnOp, VarBind,
};

/// Builds a [`Root`] the way a parser would, handing every node its own
/// position so diagnostics stay distinguishable.
pub(crate) struct Build {
  root: Root,
  line: u32,
}

impl Build {
  pub(crate) fn new() -> Self {
    Self { root: Root::default(), line: 0 }
  }

  fn pos(&mut self) -> Pos {
    self.line += 1;
    Pos::new("test", self.line, 1)
  }

  pub(crate) fn exp(&mut self, kind: ExpKind) -> ExpIdx {
    let pos = self.pos();
    self.root.arenas.exp.alloc(Exp { pos, kind })
  }

  pub(crate) fn name(&mut self, name: &str) -> ExpIdx {
    self.exp(ExpKind::Name(Name::new(name)))
  }

  pub(crate) fn int(&mut self, n: i32) -> ExpIdx {
    self.exp(ExpKind::Int(n))
  }

  pub(crate) fn un(&mut self, op: UnOp, inner: ExpIdx) -> ExpIdx {
    self.exp(ExpKind::Unary(op, inner))
  }

  pub(crate) fn bin(&mut self, op: BinOp, lhs: ExpIdx, rhs: ExpIdx) -> ExpIdx {
    self.exp(ExpKind::Binary(op, lhs, rhs))
  }

  pub(crate) fn dot(&mut self, lhs: ExpIdx, rhs: ExpIdx) -> ExpIdx {
    self.exp(ExpKind::Dot(lhs, rhs))
  }

  pub(crate) fn call(&mut self, name: &str, args: Vec<ExpIdx>) -> ExpIdx {
    self.exp(ExpKind::Call(Name::new(name), args))
  }

  pub(crate) fn quant(&mut self, quant: Quant, binds: Vec<VarBind>, body: ExpIdx) -> ExpIdx {
    self.exp(ExpKind::Quant(quant, binds, body))
  }

  pub(crate) fn let_(&mut self, bind: VarBind, body: ExpIdx) -> ExpIdx {
    self.exp(ExpKind::Let(bind, body))
  }

  pub(crate) fn ite(&mut self, cond: ExpIdx, then: ExpIdx, els: ExpIdx) -> ExpIdx {
    self.exp(ExpKind::Ite(cond, then, els))
  }

  pub(crate) fn bind(&mut self, name: &str, bound: ExpIdx) -> VarBind {
    VarBind { pos: self.pos(), name: Name::new(name), bound }
  }

  pub(crate) fn sig(&mut self, name: &str) {
    self.sig_full(name, false, Parents::Toplevel, Vec::new());
  }

  pub(crate) fn abstract_sig(&mut self, name: &str) {
    self.sig_full(name, true, Parents::Toplevel, Vec::new());
  }

  pub(crate) fn sig_extends(&mut self, name: &str, parent: &str) {
    self.sig_full(name, false, Parents::Extends(Name::new(parent)), Vec::new());
  }

  pub(crate) fn sig_in(&mut self, name: &str, parents: &[&str]) {
    let parents = parents.iter().map(|p| Name::new(*p)).collect();
    self.sig_full(name, false, Parents::Subset(parents), Vec::new());
  }

  pub(crate) fn sig_full(
    &mut self,
    name: &str,
    is_abstract: bool,
    parents: Parents,
    fields: Vec<FieldDecl>,
  ) {
    let pos = self.pos();
    self.root.decls.push(Decl::Sig(SigDecl {
      pos,
      name: Name::new(name),
      is_abstract,
      mult: None,
      parents,
      fields,
    }));
  }

  pub(crate) fn field(&mut self, name: &str, bound: ExpIdx) -> FieldDecl {
    FieldDecl { pos: self.pos(), name: Name::new(name), mult: Mult::Set, bound }
  }

  pub(crate) fn fun(&mut self, name: &str, params: Vec<VarBind>, ret: ExpIdx, body: ExpIdx) {
    let pos = self.pos();
    self.root.decls.push(Decl::Fun(FunDecl { pos, name: Name::new(name), params, ret, body }));
  }

  pub(crate) fn pred(&mut self, name: &str, params: Vec<VarBind>, body: ExpIdx) {
    let pos = self.pos();
    self.root.decls.push(Decl::Pred(PredDecl { pos, name: Name::new(name), params, body }));
  }

  pub(crate) fn fact(&mut self, body: ExpIdx) {
    let pos = self.pos();
    self.root.decls.push(Decl::Fact(FactDecl { pos, name: None, body }));
  }

  pub(crate) fn assert_decl(&mut self, name: &str, body: ExpIdx) {
    let pos = self.pos();
    self.root.decls.push(Decl::Assert(AssertDecl { pos, name: Name::new(name), body }));
  }

  pub(crate) fn command(&mut self, kind: CommandKind, body: ExpIdx, scopes: &[(&str, i32)]) {
    let scopes = scopes
      .iter()
      .map(|&(sig, bound)| Scope { pos: self.pos(), sig: Name::new(sig), bound })
      .collect();
    let pos = self.pos();
    self.root.decls.push(Decl::Command(CommandDecl { pos, kind, body, scopes }));
  }

  pub(crate) fn finish(self) -> Root {
    self.root
  }
}

pub(crate) fn analyze(root: &Root) -> Statics {
  let cancel = Cancel::new();
  match alloy_statics::get(root, &cancel) {
    Ok(statics) => statics,
    Err(cancelled) => panic!("{cancelled}"),
  }
}

/// Analyzes and asserts there are no error-severity diagnostics. Warnings
/// are allowed; assert on them separately when a test cares.
#[track_caller]
pub(crate) fn check(b: Build) -> Statics {
  let root = b.finish();
  let statics = analyze(&root);
  assert!(!statics.has_errors(), "unexpected errors:\n{}", render(&statics));
  statics
}

/// Analyzes and asserts some diagnostic has the given code and a message
/// containing `frag`.
#[track_caller]
pub(crate) fn fail(b: Build, code: u16, frag: &str) -> Statics {
  let root = b.finish();
  let statics = analyze(&root);
  let hit = statics
    .errors
    .iter()
    .any(|e| e.to_code() == code && e.display(&statics.module.sigs).to_string().contains(frag));
  assert!(hit, "wanted code {code} with message containing {frag:?}, got:\n{}", render(&statics));
  statics
}

/// Like [`fail`], but the diagnostic must be a warning and nothing may have
/// error severity.
#[track_caller]
pub(crate) fn warn(b: Build, code: u16, frag: &str) -> Statics {
  let root = b.finish();
  let statics = analyze(&root);
  assert!(!statics.has_errors(), "unexpected errors:\n{}", render(&statics));
  let hit = statics.errors.iter().any(|e| {
    matches!(e.severity(), Severity::Warning)
      && e.to_code() == code
      && e.display(&statics.module.sigs).to_string().contains(frag)
  });
  assert!(hit, "wanted warning {code} with message containing {frag:?}, got:\n{}", render(&statics));
  statics
}

pub(crate) fn render(statics: &Statics) -> String {
  statics
    .errors
    .iter()
    .map(|e| format!("- {}: [{}] {}\n", e.pos(), e.to_code(), e.display(&statics.module.sigs)))
    .collect()
}

/// Finds a prim sig by display name.
#[track_caller]
pub(crate) fn prim(statics: &Statics, name: &str) -> PrimSig {
  let sigs = &statics.module.sigs;
  sigs
    .prim_sigs()
    .find(|&s| sigs.prim(s).name.as_str() == name)
    .unwrap_or_else(|| panic!("no prim sig named {name}"))
}

/// Finds a subset sig by display name.
#[track_caller]
pub(crate) fn subset(statics: &Statics, name: &str) -> SubsetSig {
  let sigs = &statics.module.sigs;
  sigs
    .subset_sigs()
    .find(|&s| sigs.subset(s).name.as_str() == name)
    .unwrap_or_else(|| panic!("no subset sig named {name}"))
}
