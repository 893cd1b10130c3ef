use std::io::Read;
use std::rc::Rc;

use super::{ParseError, Parser};
use crate::internal::{TokenKind as T, *};

impl<R: Read, S: DiagnosticSink> Parser<R, S> {
  /// A literal or an application.
  #[instrument(skip_all)]
  pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
    match self.cur_token().kind {
      T::Integer => Ok(self.parse_integer()),
      T::Float => Ok(self.parse_float()),
      T::Ident | T::ParentLeft => Ok(Expr::Call(self.parse_application()?)),
      _ => Err(ParseError::ExpectedExpression {
        found: self.cur_token().clone(),
        loc: self.locate(),
      }),
    }
  }

  /// `f args...` or `(head) args...`, where `head` is an operator or any
  /// expression. Arguments are taken for as long as the next token can
  /// begin one.
  #[instrument(skip_all)]
  fn parse_application(&mut self) -> Result<CallExpr, ParseError> {
    let loc = self.locate();
    let function = if self.cur_token_is(T::ParentLeft) {
      self.advance();
      let head =
        if self.at_operator() { Expr::Name(self.parse_operator()?) } else { self.parse_expr()? };
      self.consume_expecting(T::ParentRight)?;
      head
    } else {
      Expr::Name(self.parse_name()?)
    };
    let mut args = Vec::new();
    while let Some(arg) = self.parse_arg()? {
      args.push(arg);
    }
    trace!(nargs = args.len());
    match function {
      Expr::Call(call) if args.is_empty() => Ok(call),
      function => Ok(CallExpr::new(function, args, loc)),
    }
  }

  /// `Ok(None)` when the current token cannot begin an argument. Nothing
  /// is consumed in that case.
  fn parse_arg(&mut self) -> Result<Option<Expr>, ParseError> {
    let arg = match self.cur_token().kind {
      T::Integer => self.parse_integer(),
      T::Float => self.parse_float(),
      T::Ident => Expr::Call(CallExpr::reference(self.parse_name()?)),
      T::ParentLeft => {
        self.advance();
        let arg = if self.at_operator() {
          Expr::Call(CallExpr::reference(self.parse_operator()?))
        } else {
          self.parse_expr()?
        };
        self.consume_expecting(T::ParentRight)?;
        arg
      }
      _ => return Ok(None),
    };
    Ok(Some(arg))
  }

  /// `Int`, `f a -> f b`, `(a b : Type) => a -> b`. Arrows associate to
  /// the right.
  #[instrument(skip_all)]
  pub fn parse_type(&mut self) -> Result<Type, ParseError> {
    let loc = self.locate();
    let atom = match self.cur_token().kind {
      T::Ident => Type::App(self.parse_type_app()?),
      T::ParentLeft => {
        self.advance();
        let inner = self.parse_type()?;
        if self.cur_token_is(T::Colon) {
          return self.parse_context(inner, loc);
        }
        self.consume_expecting(T::ParentRight)?;
        inner
      }
      _ => {
        return Err(ParseError::ExpectedType { found: self.cur_token().clone(), loc });
      }
    };
    if !self.cur_token_is(T::Arrow) {
      return Ok(atom);
    }
    self.advance();
    let result = self.parse_type()?;
    Ok(Type::Func(FuncType { context: Vec::new(), types: vec![atom, result], loc }))
  }

  fn parse_type_app(&mut self) -> Result<CallExpr, ParseError> {
    let loc = self.locate();
    let name = self.parse_name()?;
    let mut args = Vec::new();
    while let Some(arg) = self.parse_type_arg()? {
      args.push(arg);
    }
    Ok(CallExpr::new(Expr::Name(name), args, loc))
  }

  fn parse_type_arg(&mut self) -> Result<Option<Expr>, ParseError> {
    match self.cur_token().kind {
      T::Ident => Ok(Some(Expr::Call(CallExpr::reference(self.parse_name()?)))),
      T::ParentLeft => {
        self.advance();
        let ty = self.parse_type()?;
        self.consume_expecting(T::ParentRight)?;
        Ok(Some(ty.into()))
      }
      _ => Ok(None),
    }
  }

  /// Finishes `(a b : Kind) => rest` once `(a b` has been read as a type.
  /// Every field shares the one parsed `Kind`.
  #[instrument(skip_all)]
  fn parse_context(&mut self, names: Type, loc: Location) -> Result<Type, ParseError> {
    let names = field_names(names)?;
    self.consume_expecting(T::Colon)?;
    let kind = Rc::new(self.parse_type()?);
    self.consume_expecting(T::ParentRight)?;
    if !(self.cur_token_is(T::Symbol) && self.cur_token().lexeme == "=>") {
      return Err(ParseError::ExpectedContextArrow {
        found: self.cur_token().clone(),
        loc: self.locate(),
      });
    }
    self.advance();
    let mut context: Vec<Field> = names
      .into_iter()
      .map(|name| Field { loc: name.loc.clone(), name: Some(name), ty: Rc::clone(&kind) })
      .collect();
    let func = match self.parse_type()? {
      Type::Func(mut func) => {
        context.append(&mut func.context);
        FuncType { context, types: func.types, loc }
      }
      ty => FuncType { context, types: vec![ty], loc },
    };
    Ok(Type::Func(func))
  }

  /// `Ok(None)` when the current token cannot begin a pattern. Nothing is
  /// consumed in that case.
  #[instrument(skip_all)]
  pub(super) fn parse_pattern(&mut self) -> Result<Option<Pattern>, ParseError> {
    let pattern = match self.cur_token().kind {
      T::Ident => Pattern::Name(self.parse_name()?),
      T::ParentLeft => {
        self.advance();
        let app = self.parse_application()?;
        self.consume_expecting(T::ParentRight)?;
        Pattern::Call(app)
      }
      T::Integer => match self.parse_integer() {
        Expr::Integer(int) => Pattern::Integer(int),
        bad => Pattern::Bad(BadExpr { loc: bad.loc().clone() }),
      },
      T::Float => match self.parse_float() {
        Expr::Float(float) => Pattern::Float(float),
        bad => Pattern::Bad(BadExpr { loc: bad.loc().clone() }),
      },
      _ => return Ok(None),
    };
    Ok(Some(pattern))
  }

  fn parse_integer(&mut self) -> Expr {
    let loc = self.locate();
    let token = self.advance();
    match int_value(&token.lexeme) {
      Ok(value) => Expr::Integer(Integer { value, loc }),
      Err(LitError::Overflow) => {
        let msg = format!("integer literal {} overflows i64", token.lexeme);
        self.lexer.report(loc.line, loc.col, msg);
        Expr::Bad(BadExpr { loc })
      }
      Err(LitError::Malformed) => Expr::Bad(BadExpr { loc }),
    }
  }

  fn parse_float(&mut self) -> Expr {
    let loc = self.locate();
    let token = self.advance();
    match float_value(&token.lexeme) {
      Ok(value) => Expr::Float(Float { value, loc }),
      Err(LitError::Overflow) => {
        let msg = format!("float literal {} out of range", token.lexeme);
        self.lexer.report(loc.line, loc.col, msg);
        Expr::Bad(BadExpr { loc })
      }
      Err(LitError::Malformed) => Expr::Bad(BadExpr { loc }),
    }
  }
}

/// The names of `a b` in `(a b : Kind)`, parsed as the application `a b`.
fn field_names(names: Type) -> Result<Vec<Name>, ParseError> {
  let invalid = |loc: &Location| ParseError::InvalidField { loc: loc.clone() };
  let app = match names {
    Type::App(app) => app,
    other => return Err(invalid(other.loc())),
  };
  std::iter::once(*app.function)
    .chain(app.args)
    .map(|part| match part {
      Expr::Name(name) => Ok(name),
      Expr::Call(call) if call.is_reference() => match *call.function {
        Expr::Name(name) => Ok(name),
        other => Err(invalid(other.loc())),
      },
      other => Err(invalid(other.loc())),
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::parser::configure_test_tracing;
  use pretty_assertions::assert_eq;

  fn parse(src: &str) -> (Result<File, ParseError>, Vec<Diagnostic>) {
    configure_test_tracing();
    let mut parser = Parser::new_str(src);
    let file = parser.parse_file();
    (file, parser.into_sink())
  }

  fn funcs(src: &str) -> Vec<FuncDecl> {
    match parse(src).0 {
      Ok(file) => file
        .decls
        .into_iter()
        .filter_map(|decl| match decl {
          Decl::Func(func) => Some(func),
          _ => None,
        })
        .collect(),
      Err(err) => panic!("{src:?} failed to parse: {err}"),
    }
  }

  fn parse_type(src: &str) -> Result<Type, ParseError> {
    configure_test_tracing();
    Parser::new_str(src).parse_type()
  }

  fn loc(line: u32, col: u32) -> Location {
    Location::new("".into(), line, col)
  }

  #[test]
  fn type_expressions() {
    let cases = [
      ("Int", "Int"),
      ("Int -> Int", "(-> Int Int)"),
      ("a -> b -> c", "(-> a (-> b c))"),
      ("(a -> b) -> f a -> f b", "(-> (-> a b) (-> (f a) (f b)))"),
      ("Maybe (List a) -> Maybe (a -> b)", "(-> (Maybe (List a)) (Maybe (-> a b)))"),
      ("((Int))", "Int"),
    ];
    for (src, expected) in cases {
      assert_eq!(parse_type(src).map(|ty| ty.to_string()), Ok(expected.to_string()), "{src}");
    }
  }

  #[test]
  fn arrow_nests_to_the_right() {
    let Ok(Type::Func(func)) = parse_type("a -> b -> c") else { panic!("expected function type") };
    assert!(matches!(func.types[0], Type::App(_)));
    assert!(matches!(func.types[1], Type::Func(_)));
    let flat: Vec<_> = func.flatten().iter().map(|ty| ty.to_string()).collect();
    assert_eq!(flat, vec!["a", "b", "c"]);
  }

  #[test]
  fn context_fields_share_one_type() {
    let Ok(Type::Func(func)) = parse_type("(a b : Type) => (a -> b) -> a -> b") else {
      panic!("expected function type")
    };
    assert_eq!(func.loc, loc(1, 1));
    assert_eq!(func.context.len(), 2);
    assert_eq!(func.context[1].name, Some(Name::new("b", loc(1, 4))));
    assert!(Rc::ptr_eq(&func.context[0].ty, &func.context[1].ty));
    assert_eq!(func.to_string(), "(a b : Type) => (-> (-> a b) (-> a b))");
  }

  #[test]
  fn nested_contexts_accumulate() {
    let Ok(Type::Func(func)) = parse_type("(f : Type) => (a : f) => a") else {
      panic!("expected function type")
    };
    assert_eq!(func.context.len(), 2);
    assert!(!func.context[0].shares_type_with(&func.context[1]));
    assert_eq!(func.to_string(), "(f : Type) => (a : f) => (-> a)");
  }

  #[test]
  fn malformed_contexts() {
    assert_eq!(
      parse_type("(a -> b : Type) => a"),
      Err(ParseError::InvalidField { loc: loc(1, 2) })
    );
    assert_eq!(
      parse_type("(a : Type) -> a"),
      Err(ParseError::ExpectedContextArrow { found: Token::new(T::Arrow, "->"), loc: loc(1, 12) })
    );
  }

  #[test]
  fn expressions() {
    let cases = [
      ("(-) 3 2", "(- 3 2)"),
      ("foldr (.) id xs", "(foldr . id xs)"),
      ("(const x) y", "((const x) y)"),
      ("((f x))", "(f x)"),
      ("x", "x"),
      ("f 1.5 0x10", "(f 1.5 16)"),
    ];
    for (src, expected) in cases {
      configure_test_tracing();
      let expr = Parser::new_str(src).parse_expr().map(|expr| expr.to_string());
      assert_eq!(expr, Ok(expected.to_string()), "{src}");
    }
  }

  #[test]
  fn literal_bodies() {
    let (file, diags) = parse("half = 0.5\nanswer = 42\nbig = 99999999999999999999\nhuge = 1e999");
    let bodies: Vec<_> = file.map(|file| file.decls).unwrap_or_default();
    let bodies: Vec<_> = bodies.iter().map(|decl| match decl {
      Decl::Func(FuncDecl { body: Some(body), .. }) => body.clone(),
      other => panic!("expected function declaration, got {other:?}"),
    }).collect();
    assert_eq!(bodies, vec![
      Expr::Float(Float { value: 0.5, loc: loc(1, 8) }),
      Expr::Integer(Integer { value: 42, loc: loc(2, 10) }),
      Expr::Bad(BadExpr { loc: loc(3, 7) }),
      Expr::Bad(BadExpr { loc: loc(4, 8) }),
    ]);
    assert_eq!(diags, vec![
      Diagnostic::new(3, 7, "integer literal 99999999999999999999 overflows i64"),
      Diagnostic::new(4, 8, "float literal 1e999 out of range"),
    ]);
  }

  #[test]
  fn parameter_patterns() {
    let src = "fib 0 = 0
len (Cons x xs) = (+) 1 (len xs)
half 0.5 = 1
f 99999999999999999999 = 0";
    let funcs = funcs(src);
    let params: Vec<Vec<String>> =
      funcs.iter().map(|func| func.params.iter().map(ToString::to_string).collect()).collect();
    assert_eq!(params, vec![vec!["0"], vec!["(Cons x xs)"], vec!["0.5"], vec!["<bad>"]]);
    assert!(matches!(funcs[1].params[0], Pattern::Call(_)));
    assert!(matches!(funcs[3].params[0], Pattern::Bad(_)));
    assert_eq!(funcs[1].body.as_ref().map(ToString::to_string), Some("(+ 1 (len xs))".to_string()));
  }

  #[test]
  fn malformed_and_extreme_literals() {
    let src = "a = 0b102\nb = 0x1.8p-2147483648\nc = 0x1p99999999999999999999\nd = 0x\nf 0b2 = 1";
    let (file, diags) = parse(src);
    let Ok(file) = file else { panic!("{src:?} failed to parse") };
    let bodies: Vec<_> = file
      .decls
      .iter()
      .map(|decl| match decl {
        Decl::Func(FuncDecl { body: Some(body), .. }) => body.clone(),
        other => panic!("expected function declaration, got {other:?}"),
      })
      .collect();
    assert_eq!(bodies[..4], [
      Expr::Bad(BadExpr { loc: loc(1, 5) }),
      Expr::Float(Float { value: 0.0, loc: loc(2, 5) }),
      Expr::Bad(BadExpr { loc: loc(3, 5) }),
      Expr::Bad(BadExpr { loc: loc(4, 5) }),
    ]);
    let Decl::Func(f) = &file.decls[4] else { panic!("expected function declaration") };
    assert_eq!(f.params, vec![Pattern::Bad(BadExpr { loc: loc(5, 3) })]);
    assert_eq!(diags, vec![
      Diagnostic::new(1, 9, "invalid digit '2' in binary literal"),
      Diagnostic::new(3, 5, "float literal 0x1p99999999999999999999 out of range"),
      Diagnostic::new(4, 7, "hexadecimal literal has no digits"),
      Diagnostic::new(5, 5, "invalid digit '2' in binary literal"),
    ]);
  }

  #[test]
  fn application_spans_lines_inside_parentheses() {
    let funcs = funcs("f = g (h\n  x)\ny = 1");
    assert_eq!(funcs.len(), 2);
    assert_eq!(funcs[0].body.as_ref().map(ToString::to_string), Some("(g (h x))".to_string()));
  }

  #[test]
  fn operator_head_must_be_closed() {
    let (file, _) = parse("f = (+ 1");
    assert_eq!(
      file.map(|_| ()),
      Err(ParseError::ExpectedToken {
        kind: T::ParentRight,
        found: Token::new(T::Integer, "1"),
        loc: loc(1, 8),
      })
    );
  }
}
