mod expr;
mod pattern;
mod types;

use std::fmt;

pub use expr::*;
pub use pattern::*;
pub use types::*;

use crate::src_loc::Location;

/// Every node knows the position of the left-most token that introduced it.
pub trait Locate {
  fn loc(&self) -> &Location;
}

macro_rules! locate_impl_for {
  ($($type:ty),* $(,)?) => {
    $(
      impl Locate for $type {
        fn loc(&self) -> &Location {
          &self.loc
        }
      }
    )*
  };
}

locate_impl_for!(
  File, ImportDecl, ModuleDecl, TypeDecl, FuncDecl, EnumDecl, SealDecl, CallExpr, Name, Integer,
  Float, BadExpr, Field, FuncType,
);

#[derive(Debug, Clone, PartialEq)]
pub struct File {
  pub pkg_name: Option<Name>,
  pub decls: Vec<Decl>,
  pub eof: Location,
  pub loc: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
  Import(ImportDecl),
  Module(ModuleDecl),
  Type(TypeDecl),
  Func(FuncDecl),
  Enum(EnumDecl),
  Seal(SealDecl),
}

impl Decl {
  pub fn name(&self) -> Option<&Name> {
    match self {
      Decl::Import(import) => import.alias.as_ref(),
      Decl::Module(module) => Some(&module.name),
      Decl::Type(decl) => Some(&decl.name),
      Decl::Func(decl) => Some(&decl.name),
      Decl::Enum(decl) => Some(&decl.name),
      Decl::Seal(decl) => Some(&decl.name),
    }
  }
}

impl Locate for Decl {
  fn loc(&self) -> &Location {
    match self {
      Decl::Import(decl) => decl.loc(),
      Decl::Module(decl) => decl.loc(),
      Decl::Type(decl) => decl.loc(),
      Decl::Func(decl) => decl.loc(),
      Decl::Enum(decl) => decl.loc(),
      Decl::Seal(decl) => decl.loc(),
    }
  }
}

/// `import alias "path"`
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
  pub alias: Option<Name>,
  pub path: String,
  pub loc: Location,
}

/// `module Name (exports...)`
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDecl {
  pub name: Name,
  pub exports: Vec<Expr>,
  pub loc: Location,
}

/// A standalone signature, `double : Int -> Int`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
  pub name: Name,
  pub ty: Type,
  pub loc: Location,
}

/// `f a b = body`. A `None` body is a forward declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
  pub name: Name,
  pub ty: Option<Type>,
  pub params: Vec<Pattern>,
  pub body: Option<Expr>,
  pub loc: Location,
}

impl FuncDecl {
  pub const fn is_forward(&self) -> bool {
    self.body.is_none()
  }
}

/// ```text
/// type Nat {
///   Zero : Nat
///   Succ : Nat -> Nat
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
  pub name: Name,
  pub params: Vec<Name>,
  pub constructors: Vec<TypeDecl>,
  pub loc: Location,
}

/// ```text
/// seal Monoid a {
///   empty : a
///   (<>) : a -> a -> a
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SealDecl {
  pub name: Name,
  pub params: Vec<Name>,
  pub fields: Vec<TypeDecl>,
  pub loc: Location,
}

impl fmt::Display for Decl {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Decl::Import(decl) => decl.fmt(f),
      Decl::Module(decl) => decl.fmt(f),
      Decl::Type(decl) => decl.fmt(f),
      Decl::Func(decl) => decl.fmt(f),
      Decl::Enum(decl) => decl.fmt(f),
      Decl::Seal(decl) => decl.fmt(f),
    }
  }
}

impl fmt::Display for ImportDecl {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.alias {
      Some(alias) => write!(f, "import {alias} {:?}", self.path),
      None => write!(f, "import {:?}", self.path),
    }
  }
}

impl fmt::Display for ModuleDecl {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "module {} (", self.name)?;
    write_list(f, &self.exports, ", ")?;
    write!(f, ")")
  }
}

impl fmt::Display for TypeDecl {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} : {}", self.name, self.ty)
  }
}

impl fmt::Display for FuncDecl {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.name)?;
    for param in &self.params {
      write!(f, " {param}")?;
    }
    match &self.body {
      Some(body) => write!(f, " = {body}"),
      None => Ok(()),
    }
  }
}

impl fmt::Display for EnumDecl {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "type ")?;
    write_block(f, &self.name, &self.params, &self.constructors)
  }
}

impl fmt::Display for SealDecl {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "seal ")?;
    write_block(f, &self.name, &self.params, &self.fields)
  }
}

fn write_block(
  f: &mut fmt::Formatter<'_>,
  name: &Name,
  params: &[Name],
  decls: &[TypeDecl],
) -> fmt::Result {
  write!(f, "{name}")?;
  for param in params {
    write!(f, " {param}")?;
  }
  write!(f, " {{ ")?;
  write_list(f, decls, "; ")?;
  write!(f, " }}")
}

pub(crate) fn write_list<T: fmt::Display>(
  f: &mut fmt::Formatter<'_>,
  items: &[T],
  sep: &str,
) -> fmt::Result {
  for (i, item) in items.iter().enumerate() {
    if i > 0 {
      f.write_str(sep)?;
    }
    write!(f, "{item}")?;
  }
  Ok(())
}
