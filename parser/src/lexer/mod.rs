use std::io::Read;

use crate::internal::{TokenKind as T, *};

mod number;

pub use number::{LitError, float_value, int_value};

/// Pulls runes from a `Source` and classifies them into tokens, one per
/// call to `next()`.
#[derive(Debug)]
pub struct Lexer<R, S> {
  src: Source<R, S>,
  trace: bool,
  // a newline ends the construct started by the previous token
  nlsemi: bool,
  // open parentheses, newlines inside them never end a construct
  parens: u32,
  /// Position of the current token's first rune.
  pub line: u32,
  pub col: u32,
  /// The current token is the first on its line, or whitespace before it
  /// began in the first column.
  pub blank: bool,
  token: Token,
}

impl<R: Read, S: DiagnosticSink> Lexer<R, S> {
  pub fn new(reader: R, sink: S, config: &Config) -> Self {
    Lexer {
      src: Source::new(reader, sink),
      trace: config.trace,
      nlsemi: false,
      parens: 0,
      line: 1,
      col: 1,
      blank: true,
      token: Token::eof(),
    }
  }

  /// The token produced by the last `next()`.
  pub const fn current(&self) -> &Token {
    &self.token
  }

  pub const fn sink(&self) -> &S {
    self.src.sink()
  }

  pub fn into_sink(self) -> S {
    self.src.into_sink()
  }

  /// Reports a diagnostic on behalf of a later stage.
  pub fn report(&mut self, line: u32, col: u32, msg: impl Into<String>) {
    self.src.error_at(line, col, msg);
  }

  pub fn next(&mut self) {
    let nlsemi = std::mem::take(&mut self.nlsemi) && self.parens == 0;
    self.token = loop {
      let (start_line, start_col) = self.src.pos();
      while matches!(self.src.rune(), Some(' ' | '\t' | '\r'))
        || self.src.rune() == Some('\n') && !nlsemi
      {
        self.src.advance();
      }
      (self.line, self.col) = self.src.pos();
      self.blank = self.line > start_line || start_col == 1;
      self.src.mark();
      if let Some(token) = self.scan() {
        break token;
      }
    };
    if self.trace {
      let token = &self.token;
      trace!(line = self.line, col = self.col, kind = %token.kind, lexeme = ?token.lexeme);
    }
  }

  fn scan(&mut self) -> Option<Token> {
    let Some(ch) = self.src.rune() else {
      return Some(Token::eof());
    };
    if is_letter(ch) || !ch.is_ascii() && self.at_ident_char(ch, true) {
      self.src.advance();
      return Some(self.ident());
    }
    let token = match ch {
      '\n' => self.single(T::Semi),
      '0'..='9' => self.number(),
      '(' => {
        self.parens += 1;
        self.single(T::ParentLeft)
      }
      ')' => {
        self.parens = self.parens.saturating_sub(1);
        self.nlsemi = true;
        self.single(T::ParentRight)
      }
      '{' => self.single(T::BraceLeft),
      '}' => {
        self.nlsemi = true;
        self.single(T::BraceRight)
      }
      '\'' => self.single(T::Quote),
      '"' => self.single(T::DoubleQuote),
      ';' => self.single(T::Semi),
      ch if is_symbol(ch) => self.symbol(),
      ch => {
        self.src.error(format!("invalid character {}", fmt_rune(ch)));
        self.src.advance();
        return None;
      }
    };
    Some(token)
  }

  fn single(&mut self, kind: TokenKind) -> Token {
    self.src.advance();
    Token::new(kind, self.src.segment())
  }

  fn ident(&mut self) -> Token {
    while let Some(ch) = self.src.rune() {
      if is_letter(ch) || ch.is_ascii_digit() || !ch.is_ascii() && self.at_ident_char(ch, false) {
        self.src.advance();
      } else {
        break;
      }
    }
    let lexeme = self.src.segment();
    let kind = match lexeme.as_str() {
      "let" => T::Let,
      "type" => T::Type,
      "seal" => T::Seal,
      _ => {
        self.nlsemi = true;
        T::Ident
      }
    };
    Token::new(kind, lexeme)
  }

  fn at_ident_char(&mut self, ch: char, first: bool) -> bool {
    if ch.is_alphabetic() || !first && is_combining_mark(ch) {
      true
    } else if ch.is_numeric() {
      if first {
        self.src.error(format!("identifier cannot begin with digit {}", fmt_rune(ch)));
      }
      true
    } else {
      false
    }
  }

  fn symbol(&mut self) -> Token {
    while self.src.rune().is_some_and(is_symbol) {
      self.src.advance();
    }
    let lexeme = self.src.segment();
    let kind = match lexeme.as_str() {
      "->" => T::Arrow,
      "=" => T::Assign,
      ":" => T::Colon,
      _ => T::Symbol,
    };
    Token::new(kind, lexeme)
  }
}

const fn is_letter(ch: char) -> bool {
  ch.is_ascii_alphabetic() || ch == '_'
}

const fn is_symbol(ch: char) -> bool {
  matches!(
    ch,
    '!' | '#' | '$' | '%' | '&' | '*' | '+' | '.' | '/' | '<' | '=' | '>' | '?' | '@' | '\\' | '^'
      | '|' | '-' | '~' | ':'
  )
}

/// Combining marks that `char::is_alphabetic` leaves out. They may follow,
/// but never begin, an identifier.
fn is_combining_mark(ch: char) -> bool {
  const MARKS: &[(char, char)] = &[
    ('\u{0300}', '\u{036F}'),
    ('\u{0483}', '\u{0489}'),
    ('\u{0591}', '\u{05BD}'),
    ('\u{05BF}', '\u{05C7}'),
    ('\u{0610}', '\u{061A}'),
    ('\u{064B}', '\u{065F}'),
    ('\u{0670}', '\u{0670}'),
    ('\u{06D6}', '\u{06ED}'),
    ('\u{0711}', '\u{0711}'),
    ('\u{0730}', '\u{074A}'),
    ('\u{07EB}', '\u{07F3}'),
    ('\u{0900}', '\u{0903}'),
    ('\u{093A}', '\u{094F}'),
    ('\u{0951}', '\u{0957}'),
    ('\u{0E31}', '\u{0E31}'),
    ('\u{0E34}', '\u{0E3A}'),
    ('\u{0E47}', '\u{0E4E}'),
    ('\u{1AB0}', '\u{1AFF}'),
    ('\u{1DC0}', '\u{1DFF}'),
    ('\u{20D0}', '\u{20F0}'),
    ('\u{3099}', '\u{309A}'),
    ('\u{FE00}', '\u{FE0F}'),
    ('\u{FE20}', '\u{FE2F}'),
  ];
  MARKS.iter().any(|&(lo, hi)| (lo..=hi).contains(&ch))
}

fn fmt_rune(ch: char) -> String {
  format!("U+{:04X} {ch:?}", u32::from(ch))
}
