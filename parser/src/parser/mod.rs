use std::io::Read;
use std::rc::Rc;

use crate::internal::{TokenKind as T, *};
use thiserror::Error;

mod expr;

/// Recursive-descent parser with one token of lookahead. Tokens are pulled
/// from the lexer on demand, nothing is buffered.
#[derive(Debug)]
pub struct Parser<R, S> {
  lexer: Lexer<R, S>,
  debug: bool,
  file_path: Rc<str>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
  #[error("{loc}: expected {kind}, found {found}")]
  ExpectedToken { kind: TokenKind, found: Token, loc: Location },
  #[error("{loc}: expected declaration, found {found}")]
  ExpectedDecl { found: Token, loc: Location },
  #[error("{loc}: expected ':', '=' or a parameter after `{name}`, found {found}")]
  ExpectedDeclTail { name: String, found: Token, loc: Location },
  #[error("{loc}: expected expression, found {found}")]
  ExpectedExpression { found: Token, loc: Location },
  #[error("{loc}: expected type, found {found}")]
  ExpectedType { found: Token, loc: Location },
  #[error("{loc}: expected operator, found {found}")]
  ExpectedOperator { found: Token, loc: Location },
  #[error("{loc}: expected '=>' after type context, found {found}")]
  ExpectedContextArrow { found: Token, loc: Location },
  #[error("{loc}: only names may appear before ':' in a type context")]
  InvalidField { loc: Location },
}

impl ParseError {
  pub fn loc(&self) -> &Location {
    match self {
      ParseError::ExpectedToken { loc, .. }
      | ParseError::ExpectedDecl { loc, .. }
      | ParseError::ExpectedDeclTail { loc, .. }
      | ParseError::ExpectedExpression { loc, .. }
      | ParseError::ExpectedType { loc, .. }
      | ParseError::ExpectedOperator { loc, .. }
      | ParseError::ExpectedContextArrow { loc, .. }
      | ParseError::InvalidField { loc } => loc,
    }
  }

  /// The token the parser was looking at when it gave up.
  pub fn found(&self) -> Option<&Token> {
    match self {
      ParseError::ExpectedToken { found, .. }
      | ParseError::ExpectedDecl { found, .. }
      | ParseError::ExpectedDeclTail { found, .. }
      | ParseError::ExpectedExpression { found, .. }
      | ParseError::ExpectedType { found, .. }
      | ParseError::ExpectedOperator { found, .. }
      | ParseError::ExpectedContextArrow { found, .. } => Some(found),
      ParseError::InvalidField { .. } => None,
    }
  }
}

impl<'a> Parser<&'a [u8], Vec<Diagnostic>> {
  pub fn new_str(src: &'a str) -> Self {
    Parser::new(src.as_bytes(), Vec::new(), &Config::default())
  }
}

impl<R: Read, S: DiagnosticSink> Parser<R, S> {
  pub fn new(reader: R, sink: S, config: &Config) -> Self {
    let mut parser = Parser {
      lexer: Lexer::new(reader, sink, config),
      debug: config.debug,
      file_path: Rc::from(config.file_path.as_str()),
    };
    parser.lexer.next();
    parser
  }

  pub const fn sink(&self) -> &S {
    self.lexer.sink()
  }

  pub fn into_sink(self) -> S {
    self.lexer.into_sink()
  }

  /// Parses declarations up to end of input. The first syntax error
  /// abandons the whole file.
  #[instrument(skip_all)]
  pub fn parse_file(&mut self) -> Result<File, ParseError> {
    let loc = self.locate();
    let mut decls = Vec::new();
    loop {
      self.skip_separators();
      if self.cur_token_is(T::Eof) {
        break;
      }
      let decl = self.parse_decl()?;
      if self.debug {
        debug!(loc = %decl.loc(), %decl, "parsed declaration");
      }
      decls.push(decl);
    }
    Ok(File { pkg_name: None, decls, eof: self.locate(), loc })
  }

  #[instrument(skip_all)]
  pub fn parse_decl(&mut self) -> Result<Decl, ParseError> {
    match self.cur_token().kind {
      T::Type => {
        let loc = self.locate();
        self.advance();
        let (name, params, constructors) = self.parse_sig_block()?;
        Ok(Decl::Enum(EnumDecl { name, params, constructors, loc }))
      }
      T::Seal => {
        let loc = self.locate();
        self.advance();
        let (name, params, fields) = self.parse_sig_block()?;
        Ok(Decl::Seal(SealDecl { name, params, fields, loc }))
      }
      T::Ident | T::ParentLeft => {
        let name = self.parse_decl_name()?;
        match self.cur_token().kind {
          T::Colon => Ok(Decl::Type(self.parse_type_decl(name)?)),
          T::Ident | T::Assign | T::ParentLeft | T::Integer | T::Float => {
            Ok(Decl::Func(self.parse_func_decl(name)?))
          }
          _ => Err(ParseError::ExpectedDeclTail {
            name: name.value,
            found: self.cur_token().clone(),
            loc: self.locate(),
          }),
        }
      }
      _ => Err(ParseError::ExpectedDecl { found: self.cur_token().clone(), loc: self.locate() }),
    }
  }

  /// `f`, or an operator in parentheses, `(<>)`.
  fn parse_decl_name(&mut self) -> Result<Name, ParseError> {
    if !self.cur_token_is(T::ParentLeft) {
      return self.parse_name();
    }
    self.advance();
    let name = self.parse_operator()?;
    self.consume_expecting(T::ParentRight)?;
    Ok(name)
  }

  #[instrument(skip_all)]
  fn parse_type_decl(&mut self, name: Name) -> Result<TypeDecl, ParseError> {
    self.consume_expecting(T::Colon)?;
    let ty = self.parse_type()?;
    let loc = name.loc.clone();
    Ok(TypeDecl { name, ty, loc })
  }

  #[instrument(skip_all)]
  fn parse_func_decl(&mut self, name: Name) -> Result<FuncDecl, ParseError> {
    let mut params = Vec::new();
    while let Some(param) = self.parse_pattern()? {
      params.push(param);
    }
    if self.cur_token_is(T::Assign) {
      self.advance();
    }
    let body = self.parse_expr()?;
    let loc = name.loc.clone();
    Ok(FuncDecl { name, ty: None, params, body: Some(body), loc })
  }

  /// `Name params { (Name : Type)* }`, shared by `type` and `seal`.
  #[instrument(skip_all)]
  fn parse_sig_block(&mut self) -> Result<(Name, Vec<Name>, Vec<TypeDecl>), ParseError> {
    let name = self.parse_name()?;
    let mut params = Vec::new();
    while self.cur_token_is(T::Ident) {
      params.push(self.parse_name()?);
    }
    self.consume_expecting(T::BraceLeft)?;
    let mut sigs = Vec::new();
    loop {
      self.skip_separators();
      if self.cur_token_is(T::BraceRight) {
        self.advance();
        return Ok((name, params, sigs));
      }
      let sig_name = self.parse_decl_name()?;
      sigs.push(self.parse_type_decl(sig_name)?);
    }
  }

  fn parse_name(&mut self) -> Result<Name, ParseError> {
    let loc = self.locate();
    let token = self.consume_expecting(T::Ident)?;
    Ok(Name::new(token.lexeme, loc))
  }

  fn at_operator(&self) -> bool {
    matches!(self.cur_token().kind, T::Symbol | T::Minus)
  }

  fn parse_operator(&mut self) -> Result<Name, ParseError> {
    if !self.at_operator() {
      return Err(ParseError::ExpectedOperator {
        found: self.cur_token().clone(),
        loc: self.locate(),
      });
    }
    let loc = self.locate();
    let token = self.advance();
    Ok(Name::new(token.lexeme, loc))
  }

  fn skip_separators(&mut self) {
    while self.cur_token_is(T::Semi) {
      self.advance();
    }
  }

  fn cur_token(&self) -> &Token {
    self.lexer.current()
  }

  fn cur_token_is(&self, kind: TokenKind) -> bool {
    self.cur_token().is(kind)
  }

  fn locate(&self) -> Location {
    Location::new(Rc::clone(&self.file_path), self.lexer.line, self.lexer.col)
  }

  fn consume_expecting(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
    if self.cur_token_is(kind) {
      Ok(self.advance())
    } else {
      Err(ParseError::ExpectedToken { kind, found: self.cur_token().clone(), loc: self.locate() })
    }
  }

  fn advance(&mut self) -> Token {
    let token = self.cur_token().clone();
    self.lexer.next();
    token
  }
}

#[cfg(test)]
static INIT: std::sync::Once = std::sync::Once::new();

#[cfg(test)]
pub(crate) fn configure_test_tracing() {
  use tracing_subscriber::fmt::format::FmtSpan;
  use tracing_subscriber::{EnvFilter, fmt};
  INIT.call_once(|| {
    let subscriber = fmt::Subscriber::builder()
      .with_env_filter(EnvFilter::from_default_env())
      .with_test_writer()
      .with_span_events(FmtSpan::ACTIVE)
      .finish();
    tracing::subscriber::set_global_default(subscriber)
      .expect("setting default tracing subscriber failed");
  });
}
