use std::{fmt, rc::Rc};

use super::{FuncType, Locate, Type, write_list};
use crate::src_loc::Location;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
  Call(CallExpr),
  Name(Name),
  Integer(Integer),
  Float(Float),
  Bad(BadExpr),
  Field(Field),
  Func(FuncType),
}

impl Locate for Expr {
  fn loc(&self) -> &Location {
    match self {
      Expr::Call(expr) => expr.loc(),
      Expr::Name(expr) => expr.loc(),
      Expr::Integer(expr) => expr.loc(),
      Expr::Float(expr) => expr.loc(),
      Expr::Bad(expr) => expr.loc(),
      Expr::Field(expr) => expr.loc(),
      Expr::Func(expr) => expr.loc(),
    }
  }
}

impl Expr {
  pub fn as_call(&self) -> Option<&CallExpr> {
    match self {
      Expr::Call(call) => Some(call),
      _ => None,
    }
  }
}

/// `function args...`. No arguments means a bare reference to `function`,
/// not a nullary call.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
  pub function: Box<Expr>,
  pub args: Vec<Expr>,
  /// the last argument is followed by `...`
  pub has_dots: bool,
  pub loc: Location,
}

impl CallExpr {
  pub fn new(function: Expr, args: Vec<Expr>, loc: Location) -> Self {
    CallExpr { function: Box::new(function), args, has_dots: false, loc }
  }

  pub fn reference(name: Name) -> Self {
    let loc = name.loc.clone();
    CallExpr::new(Expr::Name(name), Vec::new(), loc)
  }

  pub fn is_reference(&self) -> bool {
    self.args.is_empty()
  }

  /// Name of the applied function, when the head is a plain name.
  pub fn head_name(&self) -> Option<&str> {
    match self.function.as_ref() {
      Expr::Name(name) => Some(&name.value),
      Expr::Call(call) if call.is_reference() => call.head_name(),
      _ => None,
    }
  }
}

/// An identifier, or an operator symbol like `<>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
  pub value: String,
  pub loc: Location,
}

impl Name {
  pub fn new(value: impl Into<String>, loc: Location) -> Self {
    Name { value: value.into(), loc }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Integer {
  pub value: i64,
  pub loc: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Float {
  pub value: f64,
  pub loc: Location,
}

/// Stands in for an expression whose source could not be turned into a
/// value, e.g. an integer literal too large for `i64`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadExpr {
  pub loc: Location,
}

/// `name : ty`, or just `ty` when anonymous. Fields declared in one group
/// point at the same `Type`.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
  pub name: Option<Name>,
  pub ty: Rc<Type>,
  pub loc: Location,
}

impl Field {
  pub fn shares_type_with(&self, other: &Field) -> bool {
    Rc::ptr_eq(&self.ty, &other.ty)
  }
}

impl fmt::Display for Expr {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Expr::Call(expr) => expr.fmt(f),
      Expr::Name(expr) => expr.fmt(f),
      Expr::Integer(expr) => expr.fmt(f),
      Expr::Float(expr) => expr.fmt(f),
      Expr::Bad(expr) => expr.fmt(f),
      Expr::Field(expr) => expr.fmt(f),
      Expr::Func(expr) => expr.fmt(f),
    }
  }
}

impl fmt::Display for CallExpr {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.args.is_empty() {
      return self.function.fmt(f);
    }
    write!(f, "({} ", self.function)?;
    write_list(f, &self.args, " ")?;
    if self.has_dots {
      write!(f, " ...")?;
    }
    write!(f, ")")
  }
}

impl fmt::Display for Name {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.value)
  }
}

impl fmt::Display for Integer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.value)
  }
}

impl fmt::Display for Float {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:?}", self.value)
  }
}

impl fmt::Display for BadExpr {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("<bad>")
  }
}

impl fmt::Display for Field {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.name {
      Some(name) => write!(f, "({name} : {})", self.ty),
      None => self.ty.fmt(f),
    }
  }
}
