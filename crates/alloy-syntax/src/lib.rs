//! Untyped syntax trees for Alloy models.
//!
//! This is the parser-facing representation: every node carries a source
//! position, names are unresolved, and expressions live in an arena. The
//! static analysis consumes this and produces typed trees; it MUST NOT read
//! anything from here besides structure, names, and positions.

#![deny(clippy::pedantic, missing_debug_implementations, rust_2018_idioms)]
#![allow(missing_docs)]

use la_arena::Arena;
use std::borrow::Borrow;
use std::fmt;

pub use la_arena;
pub use smol_str::SmolStr;

/// An immutable, somewhat cheaply clone-able, non-empty identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(SmolStr);

impl Name {
  /// Returns a new `Name`.
  ///
  /// # Panics
  ///
  /// If `s` is empty.
  pub fn new<S>(s: S) -> Self
  where
    S: Into<SmolStr>,
  {
    let s: SmolStr = s.into();
    assert!(!s.is_empty());
    Self(s)
  }

  /// Returns this as a string slice.
  #[must_use]
  pub fn as_str(&self) -> &str {
    self.0.as_str()
  }
}

impl fmt::Display for Name {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl Borrow<str> for Name {
  fn borrow(&self) -> &str {
    self.as_str()
  }
}

/// A source position: file, 1-based line, 1-based column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pos {
  pub file: SmolStr,
  pub line: u32,
  pub col: u32,
}

impl Pos {
  /// Returns a new `Pos`.
  pub fn new<S>(file: S, line: u32, col: u32) -> Self
  where
    S: Into<SmolStr>,
  {
    Self { file: file.into(), line, col }
  }

  /// The position used for things that have no source, like built-in sigs.
  #[must_use]
  pub fn builtin() -> Self {
    Self::new("builtin", 1, 1)
  }
}

impl fmt::Display for Pos {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}:{}", self.file, self.line, self.col)
  }
}

/// An error when an integer literal does not fit in the supported range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntLitError(SmolStr);

impl fmt::Display for IntLitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "integer literal does not fit in 32 bits: {}", self.0)
  }
}

impl std::error::Error for IntLitError {}

/// Parses an integer literal, rejecting anything outside the 32-bit signed
/// range instead of truncating.
pub fn int_lit(digits: &str) -> Result<i32, IntLitError> {
  digits.parse::<i32>().map_err(|_| IntLitError(digits.into()))
}

pub type ExpArena = Arena<Exp>;
pub type ExpIdx = la_arena::Idx<Exp>;

#[derive(Debug, Default)]
pub struct Arenas {
  pub exp: ExpArena,
}

/// A whole module, as parsed: a list of declarations plus the expression
/// arena they point into.
#[derive(Debug, Default)]
pub struct Root {
  pub arenas: Arenas,
  pub decls: Vec<Decl>,
}

#[derive(Debug)]
pub enum Decl {
  Sig(SigDecl),
  Fun(FunDecl),
  Pred(PredDecl),
  Fact(FactDecl),
  Assert(AssertDecl),
  Command(CommandDecl),
}

impl Decl {
  /// Returns the position of this declaration.
  #[must_use]
  pub fn pos(&self) -> &Pos {
    match self {
      Decl::Sig(d) => &d.pos,
      Decl::Fun(d) => &d.pos,
      Decl::Pred(d) => &d.pos,
      Decl::Fact(d) => &d.pos,
      Decl::Assert(d) => &d.pos,
      Decl::Command(d) => &d.pos,
    }
  }
}

/// How a sig declaration relates to its parents, with the textual parent
/// names as written. Name resolution happens in the statics.
#[derive(Debug)]
pub enum Parents {
  /// No `extends` and no `in`: an implicit child of `univ`.
  Toplevel,
  /// `sig A extends B`.
  Extends(Name),
  /// `sig A in B + C + ...`. Non-empty.
  Subset(Vec<Name>),
}

#[derive(Debug)]
pub struct SigDecl {
  pub pos: Pos,
  pub name: Name,
  pub is_abstract: bool,
  /// The `one`/`lone`/`some` keyword, if any. `Set` never appears here.
  pub mult: Option<Mult>,
  pub parents: Parents,
  pub fields: Vec<FieldDecl>,
}

#[derive(Debug)]
pub struct FieldDecl {
  pub pos: Pos,
  pub name: Name,
  pub mult: Mult,
  pub bound: ExpIdx,
}

/// A declaration multiplicity keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mult {
  One,
  Lone,
  Some,
  Set,
}

impl fmt::Display for Mult {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Mult::One => f.write_str("one"),
      Mult::Lone => f.write_str("lone"),
      Mult::Some => f.write_str("some"),
      Mult::Set => f.write_str("set"),
    }
  }
}

#[derive(Debug)]
pub struct FunDecl {
  pub pos: Pos,
  pub name: Name,
  pub params: Vec<VarBind>,
  pub ret: ExpIdx,
  pub body: ExpIdx,
}

#[derive(Debug)]
pub struct PredDecl {
  pub pos: Pos,
  pub name: Name,
  pub params: Vec<VarBind>,
  pub body: ExpIdx,
}

#[derive(Debug)]
pub struct FactDecl {
  pub pos: Pos,
  pub name: Option<Name>,
  pub body: ExpIdx,
}

#[derive(Debug)]
pub struct AssertDecl {
  pub pos: Pos,
  pub name: Name,
  pub body: ExpIdx,
}

#[derive(Debug)]
pub struct CommandDecl {
  pub pos: Pos,
  pub kind: CommandKind,
  pub body: ExpIdx,
  pub scopes: Vec<Scope>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
  Run,
  Check,
}

/// A per-sig scope bound on a command, like `for 3 A`.
#[derive(Debug)]
pub struct Scope {
  pub pos: Pos,
  pub sig: Name,
  pub bound: i32,
}

/// A `name: bound` binder, used by quantifiers, `let`, and parameter lists.
#[derive(Debug)]
pub struct VarBind {
  pub pos: Pos,
  pub name: Name,
  pub bound: ExpIdx,
}

#[derive(Debug)]
pub struct Exp {
  pub pos: Pos,
  pub kind: ExpKind,
}

#[derive(Debug)]
pub enum ExpKind {
  /// A reference to a sig, field, variable, or function, to be resolved by
  /// the statics.
  Name(Name),
  Int(i32),
  Unary(UnOp, ExpIdx),
  Binary(BinOp, ExpIdx, ExpIdx),
  /// `left.right`: relational join, function call, or integer cast.
  Dot(ExpIdx, ExpIdx),
  /// `name[args]`.
  Call(Name, Vec<ExpIdx>),
  Quant(Quant, Vec<VarBind>, ExpIdx),
  Let(VarBind, ExpIdx),
  /// `cond => then else els` as an expression.
  Ite(ExpIdx, ExpIdx, ExpIdx),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
  Not,
  No,
  Some,
  Lone,
  One,
  Transpose,
  Closure,
  ReflClosure,
  Cardinality,
}

impl fmt::Display for UnOp {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      UnOp::Not => f.write_str("!"),
      UnOp::No => f.write_str("no"),
      UnOp::Some => f.write_str("some"),
      UnOp::Lone => f.write_str("lone"),
      UnOp::One => f.write_str("one"),
      UnOp::Transpose => f.write_str("~"),
      UnOp::Closure => f.write_str("^"),
      UnOp::ReflClosure => f.write_str("*"),
      UnOp::Cardinality => f.write_str("#"),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
  Union,
  Diff,
  Intersect,
  Override,
  Product,
  DomRestrict,
  RanRestrict,
  Eq,
  In,
  And,
  Or,
  Implies,
  Iff,
}

impl fmt::Display for BinOp {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BinOp::Union => f.write_str("+"),
      BinOp::Diff => f.write_str("-"),
      BinOp::Intersect => f.write_str("&"),
      BinOp::Override => f.write_str("++"),
      BinOp::Product => f.write_str("->"),
      BinOp::DomRestrict => f.write_str("<:"),
      BinOp::RanRestrict => f.write_str(":>"),
      BinOp::Eq => f.write_str("="),
      BinOp::In => f.write_str("in"),
      BinOp::And => f.write_str("&&"),
      BinOp::Or => f.write_str("||"),
      BinOp::Implies => f.write_str("=>"),
      BinOp::Iff => f.write_str("<=>"),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quant {
  All,
  Some,
  No,
  Lone,
  One,
}

impl fmt::Display for Quant {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Quant::All => f.write_str("all"),
      Quant::Some => f.write_str("some"),
      Quant::No => f.write_str("no"),
      Quant::Lone => f.write_str("lone"),
      Quant::One => f.write_str("one"),
    }
  }
}
