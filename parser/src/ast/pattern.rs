use std::{collections::BTreeMap, fmt};

use super::{BadExpr, CallExpr, Expr, Field, Float, Integer, Locate, Name};
use crate::src_loc::Location;

/// Names bound by a successful match, keyed by the bound name.
pub type Bindings = BTreeMap<String, Expr>;

/// Something in parameter position that can be matched against an
/// expression.
///
/// Names bind the whole expression; the rest match without binding. There
/// is no destructuring yet.
pub trait Unify {
  fn unify(&self, expr: &Expr) -> Bindings;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
  Name(Name),
  Field(Field),
  Call(CallExpr),
  Integer(Integer),
  Float(Float),
  Bad(BadExpr),
}

impl Unify for Pattern {
  fn unify(&self, expr: &Expr) -> Bindings {
    match self {
      Pattern::Name(name) => name.unify(expr),
      Pattern::Field(field) => field.unify(expr),
      Pattern::Call(_) | Pattern::Integer(_) | Pattern::Float(_) | Pattern::Bad(_) => {
        Bindings::new()
      }
    }
  }
}

impl Unify for Name {
  fn unify(&self, expr: &Expr) -> Bindings {
    Bindings::from([(self.value.clone(), expr.clone())])
  }
}

impl Unify for Field {
  fn unify(&self, expr: &Expr) -> Bindings {
    self.name.as_ref().map(|name| name.unify(expr)).unwrap_or_default()
  }
}

impl Locate for Pattern {
  fn loc(&self) -> &Location {
    match self {
      Pattern::Name(pat) => pat.loc(),
      Pattern::Field(pat) => pat.loc(),
      Pattern::Call(pat) => pat.loc(),
      Pattern::Integer(pat) => pat.loc(),
      Pattern::Float(pat) => pat.loc(),
      Pattern::Bad(pat) => pat.loc(),
    }
  }
}

impl From<Name> for Pattern {
  fn from(name: Name) -> Self {
    Pattern::Name(name)
  }
}

impl fmt::Display for Pattern {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Pattern::Name(pat) => pat.fmt(f),
      Pattern::Field(pat) => pat.fmt(f),
      Pattern::Call(pat) => pat.fmt(f),
      Pattern::Integer(pat) => pat.fmt(f),
      Pattern::Float(pat) => pat.fmt(f),
      Pattern::Bad(pat) => pat.fmt(f),
    }
  }
}
