//! Displaying types.
//!
//! Folding is purely cosmetic: when a group of entries differs in a single
//! column and that column exhausts the direct children of an abstract
//! parent, they display as one entry naming the parent. No algebraic
//! decision ever looks at a folded form, and a fold that cannot complete
//! silently leaves the entries as they are.

use crate::sig::{PrimSig, Sigs};
use crate::ty::Type;
use std::fmt;

impl Type {
  /// Returns a value that displays this, with entries folded.
  #[must_use]
  pub fn display<'a>(&'a self, sigs: &'a Sigs) -> impl fmt::Display + 'a {
    TypeDisplay { ty: self, sigs }
  }

  /// Returns the folded rows of this type, for display only.
  #[must_use]
  pub fn fold(&self, sigs: &Sigs) -> Vec<Vec<PrimSig>> {
    let mut rows = Vec::<Vec<PrimSig>>::new();
    for entry in self.entries() {
      let mut x: Vec<PrimSig> = entry.iter().collect();
      loop {
        let mut changed = false;
        let mut i = 0;
        while i < x.len() {
          if let Some(folded) = fold_at(sigs, &mut rows, &x, i) {
            x = folded;
            changed = true;
          } else {
            i += 1;
          }
        }
        if !changed {
          break;
        }
      }
      rows.push(x);
    }
    rows
  }
}

/// Tries to fold row `a` at column `i` together with already-accumulated
/// rows: the rows must agree with `a` everywhere but `i`, and at `i` their
/// sigs must together exhaust the direct children of `a[i]`'s abstract
/// parent. On success the matched rows are removed and the folded row is
/// returned.
fn fold_at(sigs: &Sigs, rows: &mut Vec<Vec<PrimSig>>, a: &[PrimSig], i: usize) -> Option<Vec<PrimSig>> {
  let parent = sigs.prim(a[i]).parent?;
  if parent == PrimSig::UNIV || !sigs.prim(parent).is_abstract {
    return None;
  }
  let mut subs: Vec<PrimSig> = sigs.prim(parent).children.clone();
  let mut matched = Vec::<usize>::new();
  for bi in (0..rows.len()).rev() {
    let b = &rows[bi];
    if b.len() != a.len() {
      continue;
    }
    let ok = (0..b.len()).all(|j| {
      if i == j {
        sigs.prim(b[j]).parent == Some(parent)
      } else {
        b[j] == a[j]
      }
    });
    if ok {
      matched.push(bi);
      if let Some(p) = subs.iter().position(|&s| s == b[i]) {
        subs.remove(p);
      }
    }
  }
  if let Some(p) = subs.iter().position(|&s| s == a[i]) {
    subs.remove(p);
  }
  if !subs.is_empty() {
    return None;
  }
  // `matched` holds descending indices, so removal is safe in order.
  for bi in matched {
    rows.remove(bi);
  }
  let mut folded = a.to_vec();
  folded[i] = parent;
  Some(folded)
}

struct TypeDisplay<'a> {
  ty: &'a Type,
  sigs: &'a Sigs,
}

impl fmt::Display for TypeDisplay<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut first = true;
    f.write_str("{")?;
    if self.ty.is_int() {
      first = false;
      f.write_str("PrimitiveInteger")?;
    }
    if self.ty.is_bool() {
      if !first {
        f.write_str(", ")?;
      }
      first = false;
      f.write_str("PrimitiveBoolean")?;
    }
    for row in self.ty.fold(self.sigs) {
      if !first {
        f.write_str(", ")?;
      }
      first = false;
      for (i, sig) in row.iter().enumerate() {
        if i != 0 {
          f.write_str("->")?;
        }
        write!(f, "{}", self.sigs.prim(*sig).name)?;
      }
    }
    f.write_str("}")
  }
}
