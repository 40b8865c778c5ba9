//! Signatures: the primitive extension tree, subset signatures, and fields.

use crate::ty::Type;
use alloy_syntax::{Mult, Name, Pos};

/// A primitive signature.
///
/// Use a [`Sigs`] to get information about this. Two equal `PrimSig`s from
/// the same `Sigs` are the same signature; `PrimSig`s from different `Sigs`
/// must never be mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrimSig(usize);

impl PrimSig {
  // keep in sync with `Sigs::default`
  /// The root of the primitive tree.
  pub const UNIV: Self = Self(0);
  /// The empty signature: a subtype of every signature, a child of none.
  pub const NONE: Self = Self(1);
  /// The primitive integers.
  pub const SIGINT: Self = Self(2);

  /// Returns the index of this sig in its `Sigs`.
  #[must_use]
  pub fn to_usize(self) -> usize {
    self.0
  }
}

/// A subset signature: a subset of the union of its parents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubsetSig(usize);

impl SubsetSig {
  /// Returns the index of this sig in its `Sigs`.
  #[must_use]
  pub fn to_usize(self) -> usize {
    self.0
  }
}

/// Any signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Sig {
  Prim(PrimSig),
  Subset(SubsetSig),
}

/// A field declared on a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId(usize);

/// Data about a primitive signature.
#[derive(Debug)]
#[allow(missing_docs)]
pub struct PrimSigData {
  pub pos: Pos,
  pub name: Name,
  /// `None` only for `univ` and `none`.
  pub parent: Option<PrimSig>,
  /// In declaration order.
  pub children: Vec<PrimSig>,
  pub is_abstract: bool,
  /// The `one`/`lone`/`some` keyword on the declaration, if any.
  pub mult: Option<Mult>,
  /// In declaration order.
  pub fields: Vec<FieldId>,
}

/// Data about a subset signature.
#[derive(Debug)]
#[allow(missing_docs)]
pub struct SubsetSigData {
  pub pos: Pos,
  pub name: Name,
  /// Non-empty, in declaration order.
  pub parents: Vec<Sig>,
  /// The union of the parents' types. This is how the type algebra sees the
  /// subset sig: membership is not tree-structured, so the algebra works
  /// with this primitive upper bound.
  pub upper_bound: Type,
  pub mult: Option<Mult>,
  pub fields: Vec<FieldId>,
}

/// Data about a field.
#[derive(Debug)]
#[allow(missing_docs)]
pub struct FieldData {
  pub pos: Pos,
  pub name: Name,
  pub owner: Sig,
  pub mult: Mult,
  /// The full relation type: arity >= 2, first column the owner.
  pub ty: Type,
}

/// The store of all signatures and fields for one analysis.
///
/// Mutated only while the resolver runs; afterwards it is moved into the
/// output module and only ever borrowed immutably.
#[derive(Debug)]
pub struct Sigs {
  prim: Vec<PrimSigData>,
  subset: Vec<SubsetSigData>,
  fields: Vec<FieldData>,
}

impl Default for Sigs {
  fn default() -> Self {
    let mut ret = Self { prim: Vec::new(), subset: Vec::new(), fields: Vec::new() };
    let pos = Pos::builtin();
    // @sync(builtin_sig_order). NONE is deliberately not a child of UNIV: it
    // is the bottom of the subtype order, not a member of the tree proper.
    let univ = ret.insert_prim(pos.clone(), Name::new("univ"), None, true, None);
    let none = ret.insert_prim(pos.clone(), Name::new("none"), None, false, None);
    let sigint = ret.insert_prim(pos, Name::new("Int"), Some(PrimSig::UNIV), false, None);
    assert_eq!(univ, PrimSig::UNIV);
    assert_eq!(none, PrimSig::NONE);
    assert_eq!(sigint, PrimSig::SIGINT);
    ret
  }
}

impl Sigs {
  /// Creates a new primitive sig and links it under its parent.
  pub fn insert_prim(
    &mut self,
    pos: Pos,
    name: Name,
    parent: Option<PrimSig>,
    is_abstract: bool,
    mult: Option<Mult>,
  ) -> PrimSig {
    let ret = PrimSig(self.prim.len());
    if let Some(parent) = parent {
      self.prim[parent.0].children.push(ret);
    }
    self.prim.push(PrimSigData {
      pos,
      name,
      parent,
      children: Vec::new(),
      is_abstract,
      mult,
      fields: Vec::new(),
    });
    ret
  }

  /// Links a previously parentless prim sig under a parent.
  ///
  /// # Panics
  ///
  /// If `child` already has a parent, or is a built-in.
  pub fn link_parent(&mut self, child: PrimSig, parent: PrimSig) {
    assert!(child.0 > PrimSig::SIGINT.0, "cannot re-parent a built-in sig");
    assert!(self.prim[child.0].parent.is_none(), "sig already has a parent");
    self.prim[child.0].parent = Some(parent);
    self.prim[parent.0].children.push(child);
  }

  /// Creates a new subset sig. `parents` must be non-empty and `upper_bound`
  /// must be the union of their types.
  pub fn insert_subset(
    &mut self,
    pos: Pos,
    name: Name,
    parents: Vec<Sig>,
    upper_bound: Type,
    mult: Option<Mult>,
  ) -> SubsetSig {
    assert!(!parents.is_empty(), "subset sig with no parents");
    let ret = SubsetSig(self.subset.len());
    self.subset.push(SubsetSigData {
      pos,
      name,
      parents,
      upper_bound,
      mult,
      fields: Vec::new(),
    });
    ret
  }

  /// Creates a new field on `owner`.
  pub fn insert_field(&mut self, pos: Pos, name: Name, owner: Sig, mult: Mult, ty: Type) -> FieldId {
    let ret = FieldId(self.fields.len());
    match owner {
      Sig::Prim(s) => self.prim[s.0].fields.push(ret),
      Sig::Subset(s) => self.subset[s.0].fields.push(ret),
    }
    self.fields.push(FieldData { pos, name, owner, mult, ty });
    ret
  }

  /// Returns the data for a prim sig.
  #[must_use]
  pub fn prim(&self, sig: PrimSig) -> &PrimSigData {
    &self.prim[sig.0]
  }

  /// Returns the data for a subset sig.
  #[must_use]
  pub fn subset(&self, sig: SubsetSig) -> &SubsetSigData {
    &self.subset[sig.0]
  }

  /// Returns the data for a field.
  #[must_use]
  pub fn field(&self, field: FieldId) -> &FieldData {
    &self.fields[field.0]
  }

  /// Returns the display name of any sig.
  #[must_use]
  pub fn name(&self, sig: Sig) -> &Name {
    match sig {
      Sig::Prim(s) => &self.prim[s.0].name,
      Sig::Subset(s) => &self.subset[s.0].name,
    }
  }

  /// Returns the declaration position of any sig.
  #[must_use]
  pub fn pos(&self, sig: Sig) -> &Pos {
    match sig {
      Sig::Prim(s) => &self.prim[s.0].pos,
      Sig::Subset(s) => &self.subset[s.0].pos,
    }
  }

  /// Returns the type of any sig: the singleton type for a prim sig, the
  /// upper bound for a subset sig.
  #[must_use]
  pub fn sig_type(&self, sig: Sig) -> Type {
    match sig {
      Sig::Prim(s) => Type::prim(s),
      Sig::Subset(s) => self.subset[s.0].upper_bound.clone(),
    }
  }

  /// Returns whether `a` is a subtype of `b`: `b` lies on `a`'s parent chain
  /// to `univ`, or `a` is `none`, or `b` is `univ`.
  #[must_use]
  pub fn is_subtype(&self, a: PrimSig, b: PrimSig) -> bool {
    if a == PrimSig::NONE || a == b || b == PrimSig::UNIV {
      return true;
    }
    if b == PrimSig::NONE {
      return false;
    }
    let mut cur = self.prim[a.0].parent;
    while let Some(s) = cur {
      if s == b {
        return true;
      }
      cur = self.prim[s.0].parent;
    }
    false
  }

  /// Returns the more specific of `a` and `b` when one contains the other,
  /// else `none`.
  #[must_use]
  pub fn intersect(&self, a: PrimSig, b: PrimSig) -> PrimSig {
    if self.is_subtype(a, b) {
      a
    } else if self.is_subtype(b, a) {
      b
    } else {
      PrimSig::NONE
    }
  }

  /// Returns whether the intersection of `a` and `b` is non-empty.
  #[must_use]
  pub fn intersects(&self, a: PrimSig, b: PrimSig) -> bool {
    self.intersect(a, b) != PrimSig::NONE
  }

  /// Iterates over all prim sigs, built-ins first, then declaration order.
  pub fn prim_sigs(&self) -> impl Iterator<Item = PrimSig> {
    (0..self.prim.len()).map(PrimSig)
  }

  /// Iterates over all subset sigs in declaration order.
  pub fn subset_sigs(&self) -> impl Iterator<Item = SubsetSig> {
    (0..self.subset.len()).map(SubsetSig)
  }

  /// Iterates over all fields in declaration order.
  pub fn field_ids(&self) -> impl Iterator<Item = FieldId> {
    (0..self.fields.len()).map(FieldId)
  }
}
