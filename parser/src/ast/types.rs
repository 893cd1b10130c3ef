use std::fmt;

use super::{CallExpr, Expr, Field, Locate, write_list};
use crate::src_loc::Location;

/// The expressions allowed in type position.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
  /// `Int`, `f a`, `List (Maybe a)`
  App(CallExpr),
  Func(FuncType),
}

impl Locate for Type {
  fn loc(&self) -> &Location {
    match self {
      Type::App(app) => app.loc(),
      Type::Func(func) => func.loc(),
    }
  }
}

impl From<Type> for Expr {
  fn from(ty: Type) -> Self {
    match ty {
      Type::App(app) => Expr::Call(app),
      Type::Func(func) => Expr::Func(func),
    }
  }
}

/// `a -> b`, held as `types: [a, b]`. Arrows nest to the right, so
/// `a -> b -> c` is `[a, FuncType [b, c]]`. `context` carries the fields of
/// a leading `(a b : Type) =>`.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncType {
  pub context: Vec<Field>,
  pub types: Vec<Type>,
  pub loc: Location,
}

impl FuncType {
  pub fn arrow(from: Type, to: Type) -> Self {
    let loc = from.loc().clone();
    FuncType { context: Vec::new(), types: vec![from, to], loc }
  }

  /// Argument and result types with right-nested arrows flattened,
  /// `a -> b -> c` gives `[a, b, c]`.
  pub fn flatten(&self) -> Vec<&Type> {
    let mut flat = Vec::with_capacity(self.types.len());
    let mut cur = self;
    loop {
      let Some((last, init)) = cur.types.split_last() else {
        return flat;
      };
      flat.extend(init);
      match last {
        Type::Func(next) if next.context.is_empty() => cur = next,
        last => {
          flat.push(last);
          return flat;
        }
      }
    }
  }
}

impl fmt::Display for Type {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Type::App(app) => app.fmt(f),
      Type::Func(func) => func.fmt(f),
    }
  }
}

impl fmt::Display for FuncType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut fields = self.context.iter().peekable();
    while let Some(first) = fields.next() {
      write!(f, "(")?;
      write_name(f, first)?;
      while let Some(field) = fields.next_if(|field| field.shares_type_with(first)) {
        write!(f, " ")?;
        write_name(f, field)?;
      }
      write!(f, " : {}) => ", first.ty)?;
    }
    write!(f, "(-> ")?;
    write_list(f, &self.types, " ")?;
    write!(f, ")")
  }
}

fn write_name(f: &mut fmt::Formatter<'_>, field: &Field) -> fmt::Result {
  match &field.name {
    Some(name) => write!(f, "{name}"),
    None => write!(f, "_"),
  }
}
