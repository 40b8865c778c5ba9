//! Statics errors.

use alloy_statics_types::sig::Sigs;
use alloy_statics_types::ty::{Type, MAX_ARITY};
use alloy_syntax::{BinOp, Name, Pos};
use std::fmt;

/// A statics diagnostic.
#[derive(Debug)]
pub struct Error {
  pub(crate) pos: Pos,
  pub(crate) kind: ErrorKind,
}

impl Error {
  /// Returns the source position this points at.
  #[must_use]
  pub fn pos(&self) -> &Pos {
    &self.pos
  }

  /// Returns which class of the taxonomy this belongs to.
  #[must_use]
  pub fn kind(&self) -> Kind {
    match self.kind {
      ErrorKind::Undefined(_)
      | ErrorKind::AmbiguousRef(_)
      | ErrorKind::Duplicate(_, _)
      | ErrorKind::CannotExtend(_)
      | ErrorKind::CannotExtendSubset(_)
      | ErrorKind::CannotSubsetNone
      | ErrorKind::CannotSubsetUniv
      | ErrorKind::AbstractSubsetSig
      | ErrorKind::SubsetCycle(_) => Kind::Syntax,
      ErrorKind::Arity => Kind::TypeArity,
      ErrorKind::Ambiguous(_) => Kind::Ambiguous,
      ErrorKind::NoCommonArity(_, _)
      | ErrorKind::JoinUnary
      | ErrorKind::BadJoin(_, _)
      | ErrorKind::NotBoolean(_)
      | ErrorKind::NotRelational(_)
      | ErrorKind::NoUnaryEntries(_)
      | ErrorKind::NoBinaryEntries(_)
      | ErrorKind::CannotOverride(_, _)
      | ErrorKind::NoCompatibleType(_, _)
      | ErrorKind::TooFewArgs(_, _, _) => Kind::Type,
      ErrorKind::EmptyJoin
      | ErrorKind::EmptyIntersect
      | ErrorKind::AlwaysFalse(_, _, _)
      | ErrorKind::RedundantDiff(_, _) => Kind::Warning,
    }
  }

  /// Returns the severity: warnings never abort anything.
  #[must_use]
  pub fn severity(&self) -> Severity {
    match self.kind() {
      Kind::Warning => Severity::Warning,
      Kind::Syntax | Kind::Type | Kind::TypeArity | Kind::Ambiguous => Severity::Error,
    }
  }

  /// Returns the stable code for this.
  #[must_use]
  pub fn to_code(&self) -> u16 {
    match self.kind {
      ErrorKind::Undefined(_) => 3001,
      ErrorKind::AmbiguousRef(_) => 3002,
      ErrorKind::Duplicate(_, _) => 3003,
      ErrorKind::CannotExtend(_) => 3004,
      ErrorKind::CannotExtendSubset(_) => 3005,
      ErrorKind::CannotSubsetNone => 3006,
      ErrorKind::CannotSubsetUniv => 3007,
      ErrorKind::AbstractSubsetSig => 3008,
      ErrorKind::SubsetCycle(_) => 3009,
      ErrorKind::NoCommonArity(_, _) => 4001,
      ErrorKind::JoinUnary => 4002,
      ErrorKind::BadJoin(_, _) => 4003,
      ErrorKind::NotBoolean(_) => 4004,
      ErrorKind::NotRelational(_) => 4005,
      ErrorKind::NoUnaryEntries(_) => 4006,
      ErrorKind::NoBinaryEntries(_) => 4007,
      ErrorKind::CannotOverride(_, _) => 4008,
      ErrorKind::NoCompatibleType(_, _) => 4009,
      ErrorKind::TooFewArgs(_, _, _) => 4010,
      ErrorKind::Arity => 4011,
      ErrorKind::Ambiguous(_) => 4012,
      ErrorKind::EmptyJoin => 5001,
      ErrorKind::EmptyIntersect => 5002,
      ErrorKind::AlwaysFalse(_, _, _) => 5003,
      ErrorKind::RedundantDiff(_, _) => 5004,
    }
  }

  /// Returns a value that displays the message.
  #[must_use]
  pub fn display<'a>(&'a self, sigs: &'a Sigs) -> impl fmt::Display + 'a {
    ErrorKindDisplay { kind: &self.kind, sigs }
  }
}

/// The diagnostic taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
  /// Malformed input or an unresolvable or ambiguous name.
  Syntax,
  /// No compatible elaboration, or the top-down constraint is unsatisfied.
  Type,
  /// A relation would exceed the maximum arity.
  TypeArity,
  /// More than one elaboration survived tie-breaking.
  Ambiguous,
  /// A non-fatal advisory.
  Warning,
}

/// The severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Severity {
  Warning,
  Error,
}

#[derive(Debug)]
pub(crate) enum ErrorKind {
  Undefined(Name),
  AmbiguousRef(Name),
  Duplicate(Item, Name),
  /// Extending `none` or `Int`.
  CannotExtend(Name),
  CannotExtendSubset(Name),
  CannotSubsetNone,
  CannotSubsetUniv,
  AbstractSubsetSig,
  SubsetCycle(Name),
  /// Operands share no arity: want, got.
  NoCommonArity(Type, Type),
  JoinUnary,
  BadJoin(Type, Type),
  NotBoolean(Type),
  NotRelational(Type),
  NoUnaryEntries(Type),
  NoBinaryEntries(Type),
  CannotOverride(Type, Type),
  /// Expected, observed.
  NoCompatibleType(Type, Type),
  /// Function name, wanted, got.
  TooFewArgs(Name, usize, usize),
  Arity,
  Ambiguous(Vec<Type>),
  EmptyJoin,
  EmptyIntersect,
  AlwaysFalse(BinOp, Type, Type),
  RedundantDiff(Type, Type),
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Item {
  Sig,
  Field,
  Param,
}

impl fmt::Display for Item {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Item::Sig => f.write_str("sig"),
      Item::Field => f.write_str("field"),
      Item::Param => f.write_str("parameter"),
    }
  }
}

struct ErrorKindDisplay<'a> {
  kind: &'a ErrorKind,
  sigs: &'a Sigs,
}

impl fmt::Display for ErrorKindDisplay<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.kind {
      ErrorKind::Undefined(name) => write!(f, "undefined name: {name}"),
      ErrorKind::AmbiguousRef(name) => write!(f, "ambiguous name: {name}"),
      ErrorKind::Duplicate(item, name) => write!(f, "duplicate {item}: {name}"),
      ErrorKind::CannotExtend(name) => {
        write!(f, "cannot extend the built-in sig {name}")
      }
      ErrorKind::CannotExtendSubset(name) => {
        write!(f, "cannot extend the subset sig {name}; only a toplevel sig or a subsig can be extended")
      }
      ErrorKind::CannotSubsetNone => f.write_str("cannot be a subset of the built-in sig none"),
      ErrorKind::CannotSubsetUniv => {
        f.write_str("already implicitly a subset of the built-in sig univ")
      }
      ErrorKind::AbstractSubsetSig => f.write_str("a subset sig cannot be abstract"),
      ErrorKind::SubsetCycle(name) => write!(f, "cyclic subset sig: {name}"),
      ErrorKind::NoCommonArity(a, b) => {
        write!(f, "incompatible arities: {} and {}", a.display(self.sigs), b.display(self.sigs))
      }
      ErrorKind::JoinUnary => f.write_str("cannot join two unary sets"),
      ErrorKind::BadJoin(a, b) => {
        write!(f, "cannot join {} and {}", a.display(self.sigs), b.display(self.sigs))
      }
      ErrorKind::NotBoolean(t) => write!(f, "expected a formula, found {}", t.display(self.sigs)),
      ErrorKind::NotRelational(t) => {
        write!(f, "expected a relational expression, found {}", t.display(self.sigs))
      }
      ErrorKind::NoUnaryEntries(t) => {
        write!(f, "restriction needs a unary set, found {}", t.display(self.sigs))
      }
      ErrorKind::NoBinaryEntries(t) => {
        write!(f, "expected a binary relation, found {}", t.display(self.sigs))
      }
      ErrorKind::CannotOverride(a, b) => write!(
        f,
        "override is impossible: the first columns of {} and {} never overlap",
        a.display(self.sigs),
        b.display(self.sigs)
      ),
      ErrorKind::NoCompatibleType(want, got) => {
        write!(f, "expected {}, found {}", want.display(self.sigs), got.display(self.sigs))
      }
      ErrorKind::TooFewArgs(name, want, got) => {
        let s = if *want == 1 { "" } else { "s" };
        write!(f, "{name} expects {want} argument{s}, found {got}")
      }
      ErrorKind::Arity => write!(f, "relation of arity greater than {MAX_ARITY} is unsupported"),
      ErrorKind::Ambiguous(tys) => {
        f.write_str("ambiguous expression; candidates:")?;
        for ty in tys {
          write!(f, " {}", ty.display(self.sigs))?;
        }
        Ok(())
      }
      ErrorKind::EmptyJoin => f.write_str("this join is always empty"),
      ErrorKind::EmptyIntersect => f.write_str("this intersection is always empty"),
      ErrorKind::AlwaysFalse(op, a, b) => write!(
        f,
        "`{op}` between the disjoint {} and {} is always false",
        a.display(self.sigs),
        b.display(self.sigs)
      ),
      ErrorKind::RedundantDiff(a, b) => write!(
        f,
        "subtracting {} from the disjoint {} never removes anything",
        b.display(self.sigs),
        a.display(self.sigs)
      ),
    }
  }
}
