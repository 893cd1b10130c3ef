use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
  ParentLeft,
  ParentRight,
  BraceLeft,
  BraceRight,
  Ident,
  Integer,
  Float,
  Complex,
  Rune,
  String,
  Let,
  Type,
  Seal,
  Quote,
  DoubleQuote,
  Comment,
  Semi,
  Colon,
  Assign,
  Minus,
  Arrow,
  Symbol,
  Eof,
}

impl fmt::Display for TokenKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      TokenKind::ParentLeft => "'('",
      TokenKind::ParentRight => "')'",
      TokenKind::BraceLeft => "'{'",
      TokenKind::BraceRight => "'}'",
      TokenKind::Ident => "identifier",
      TokenKind::Integer => "integer",
      TokenKind::Float => "float",
      TokenKind::Complex => "complex",
      TokenKind::Rune => "rune",
      TokenKind::String => "string",
      TokenKind::Let => "'let'",
      TokenKind::Type => "'type'",
      TokenKind::Seal => "'seal'",
      TokenKind::Quote => "'''",
      TokenKind::DoubleQuote => "'\"'",
      TokenKind::Comment => "comment",
      TokenKind::Semi => "';'",
      TokenKind::Colon => "':'",
      TokenKind::Assign => "'='",
      TokenKind::Minus => "'-'",
      TokenKind::Arrow => "'->'",
      TokenKind::Symbol => "symbol",
      TokenKind::Eof => "EOF",
    };
    f.write_str(name)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
  pub kind: TokenKind,
  pub lexeme: String,
}

impl Token {
  pub fn new(kind: TokenKind, lexeme: impl Into<String>) -> Self {
    Token { kind, lexeme: lexeme.into() }
  }

  pub fn eof() -> Self {
    Token::new(TokenKind::Eof, "")
  }

  pub fn is(&self, kind: TokenKind) -> bool {
    self.kind == kind
  }
}

impl fmt::Display for Token {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.kind {
      TokenKind::Eof => write!(f, "EOF"),
      TokenKind::Semi if self.lexeme == "\n" => write!(f, "newline"),
      kind => write!(f, "{kind} {:?}", self.lexeme),
    }
  }
}
