use std::io::Read;
use std::num::IntErrorKind;

use super::Lexer;
use crate::internal::{TokenKind as T, *};

/// Which of digits and `_` separators a digit run contained.
#[bitsize(8)]
#[derive(FromBits, DebugBits, Clone, Copy, PartialEq, Eq)]
struct DigSep {
  digits: bool,
  separators: bool,
  reserved: u6,
}

impl std::ops::BitOr for DigSep {
  type Output = Self;
  fn bitor(self, rhs: Self) -> Self {
    DigSep::from(u8::from(self) | u8::from(rhs))
  }
}

impl std::ops::BitOrAssign for DigSep {
  fn bitor_assign(&mut self, rhs: Self) {
    *self = *self | rhs;
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Base {
  Binary,
  Octal,
  Decimal,
  Hex,
}

impl Base {
  const fn radix(self) -> u32 {
    match self {
      Base::Binary => 2,
      Base::Octal => 8,
      Base::Decimal => 10,
      Base::Hex => 16,
    }
  }

  const fn name(self) -> &'static str {
    match self {
      Base::Binary => "binary",
      Base::Octal => "octal",
      Base::Decimal => "decimal",
      Base::Hex => "hexadecimal",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prefix {
  None,
  // bare leading `0`
  Zero,
  Hex,
  Octal,
  Binary,
}

impl<R: Read, S: DiagnosticSink> Lexer<R, S> {
  pub(super) fn number(&mut self) -> Token {
    let mut ok = true;
    let mut kind = T::Integer;
    let mut base = Base::Decimal;
    let mut prefix = Prefix::None;
    let mut digsep = DigSep::new(false, false);
    let mut invalid = None;

    if self.src.rune() == Some('0') {
      self.src.advance();
      match self.src.rune().map(|ch| ch.to_ascii_lowercase()) {
        Some('x') => {
          self.src.advance();
          (base, prefix) = (Base::Hex, Prefix::Hex);
        }
        Some('o') => {
          self.src.advance();
          (base, prefix) = (Base::Octal, Prefix::Octal);
        }
        Some('b') => {
          self.src.advance();
          (base, prefix) = (Base::Binary, Prefix::Binary);
        }
        _ => {
          (base, prefix) = (Base::Octal, Prefix::Zero);
          digsep.set_digits(true); // the leading 0
        }
      }
    }

    // integer part
    digsep |= self.digits(base, &mut invalid);
    let mut seen_point = false;
    if self.src.rune() == Some('.') {
      if matches!(prefix, Prefix::Octal | Prefix::Binary) {
        self.src.error(format!("invalid radix point in {} literal", base.name()));
        ok = false;
      }
      self.src.advance();
      seen_point = true;
    }

    // fractional part
    if seen_point {
      kind = T::Float;
      digsep |= self.digits(base, &mut invalid);
    }

    if !digsep.digits() && ok {
      self.src.error(format!("{} literal has no digits", base.name()));
      ok = false;
    }

    // exponent
    let marker = self.src.rune().filter(|ch| matches!(ch.to_ascii_lowercase(), 'e' | 'p'));
    if let Some(marker) = marker {
      if ok {
        let exp = marker.to_ascii_lowercase();
        if exp == 'e' && !matches!(prefix, Prefix::None | Prefix::Zero) {
          self.src.error(format!("{marker:?} exponent requires decimal mantissa"));
          ok = false;
        } else if exp == 'p' && prefix != Prefix::Hex {
          self.src.error(format!("{marker:?} exponent requires hexadecimal mantissa"));
          ok = false;
        }
      }
      self.src.advance();
      kind = T::Float;
      if matches!(self.src.rune(), Some('+' | '-')) {
        self.src.advance();
      }
      let exp_digsep = self.digits(Base::Decimal, &mut None);
      digsep = exp_digsep | DigSep::new(false, digsep.separators());
      if !exp_digsep.digits() && ok {
        self.src.error("exponent has no digits");
        ok = false;
      }
    } else if prefix == Prefix::Hex && kind == T::Float && ok {
      self.src.error("hexadecimal mantissa requires a 'p' exponent");
      ok = false;
    }

    if self.src.rune() == Some('i') {
      kind = T::Complex;
      self.src.advance();
    }

    self.nlsemi = true;
    let lexeme = self.src.segment();

    if let Some(index) = invalid.filter(|_| kind == T::Integer && ok) {
      let digit = lexeme[index..].chars().next().unwrap_or('?');
      let msg = format!("invalid digit {digit:?} in {} literal", base.name());
      self.src.error_at(self.line, self.col + index as u32, msg);
      ok = false;
    }

    if digsep.separators() && ok {
      if let Some(index) = invalid_sep(&lexeme) {
        let msg = "'_' must separate successive digits";
        self.src.error_at(self.line, self.col + index as u32, msg);
      }
    }

    Token::new(kind, lexeme)
  }

  /// Consumes `{ digit | '_' }`. Decimal digits beyond a base <= 10 are
  /// accepted, the first one's offset in the literal lands in `invalid`.
  fn digits(&mut self, base: Base, invalid: &mut Option<usize>) -> DigSep {
    let mut digsep = DigSep::new(false, false);
    while let Some(ch) = self.src.rune() {
      let is_digit = match base {
        Base::Hex => ch.is_ascii_hexdigit(),
        _ => ch.is_ascii_digit(),
      };
      if ch == '_' {
        digsep.set_separators(true);
      } else if is_digit {
        digsep.set_digits(true);
        if ch.to_digit(base.radix()).is_none() && invalid.is_none() {
          let (_, col) = self.src.pos();
          *invalid = Some((col - self.col) as usize);
        }
      } else {
        break;
      }
      self.src.advance();
    }
    digsep
  }
}

/// Index of the first `_` in a literal that does not sit between two digits.
fn invalid_sep(lexeme: &str) -> Option<usize> {
  #[derive(Clone, Copy, PartialEq, Eq)]
  enum Prev {
    Digit,
    Sep,
    Other,
  }
  let bytes = lexeme.as_bytes();
  let mut hex = false;
  let mut prev = Prev::Other;
  let mut start = 0;

  // a prefix counts as a digit
  if bytes.len() >= 2 && bytes[0] == b'0' {
    let x = bytes[1].to_ascii_lowercase();
    if matches!(x, b'x' | b'o' | b'b') {
      hex = x == b'x';
      prev = Prev::Digit;
      start = 2;
    }
  }

  for (i, &b) in bytes.iter().enumerate().skip(start) {
    if b == b'_' {
      if prev != Prev::Digit {
        return Some(i);
      }
      prev = Prev::Sep;
    } else if b.is_ascii_digit() || hex && b.is_ascii_hexdigit() {
      prev = Prev::Digit;
    } else {
      if prev == Prev::Sep {
        return Some(i - 1);
      }
      prev = Prev::Other;
    }
  }
  (prev == Prev::Sep).then(|| bytes.len() - 1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitError {
  Malformed,
  Overflow,
}

/// Value of an `Integer` lexeme, honoring prefixes and separators.
pub fn int_value(lexeme: &str) -> Result<i64, LitError> {
  let cleaned = lexeme.replace('_', "");
  let lower = cleaned.to_ascii_lowercase();
  let (digits, radix) = if let Some(rest) = lower.strip_prefix("0x") {
    (rest, 16)
  } else if let Some(rest) = lower.strip_prefix("0o") {
    (rest, 8)
  } else if let Some(rest) = lower.strip_prefix("0b") {
    (rest, 2)
  } else if lower.len() > 1 && lower.starts_with('0') {
    (&lower[1..], 8)
  } else {
    (lower.as_str(), 10)
  };
  if digits.starts_with(['+', '-']) {
    return Err(LitError::Malformed);
  }
  i64::from_str_radix(digits, radix).map_err(|err| match err.kind() {
    IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => LitError::Overflow,
    _ => LitError::Malformed,
  })
}

/// Value of a `Float` lexeme, decimal or hexadecimal (`0x1.8p3`).
pub fn float_value(lexeme: &str) -> Result<f64, LitError> {
  let cleaned = lexeme.replace('_', "").to_ascii_lowercase();
  let Some(hex) = cleaned.strip_prefix("0x") else {
    let value = cleaned.parse::<f64>().map_err(|_| LitError::Malformed)?;
    return if value.is_finite() { Ok(value) } else { Err(LitError::Overflow) };
  };
  let (mantissa, exp) = hex.split_once('p').ok_or(LitError::Malformed)?;
  let exp: i64 = match exp.parse() {
    Ok(exp) => exp,
    Err(err) => match err.kind() {
      IntErrorKind::PosOverflow => return Err(LitError::Overflow),
      IntErrorKind::NegOverflow => return Ok(0.0),
      _ => return Err(LitError::Malformed),
    },
  };
  let (whole, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
  if whole.is_empty() && frac.is_empty() {
    return Err(LitError::Malformed);
  }
  // keep at most 61 significant bits, digits past that only move the exponent
  let mut bits = 0u64;
  let mut scale = exp;
  for (i, ch) in whole.chars().chain(frac.chars()).enumerate() {
    let digit = ch.to_digit(16).ok_or(LitError::Malformed)?;
    let in_frac = i >= whole.len();
    if bits >> 60 == 0 {
      bits = bits << 4 | u64::from(digit);
      if in_frac {
        scale = scale.saturating_sub(4);
      }
    } else if !in_frac {
      scale = scale.saturating_add(4);
    }
  }
  let value = scale_pow2(bits as f64, scale);
  if value.is_finite() { Ok(value) } else { Err(LitError::Overflow) }
}

/// `value * 2^exp` without the intermediate power over- or underflowing.
fn scale_pow2(mut value: f64, exp: i64) -> f64 {
  if value == 0.0 {
    return value;
  }
  let mut exp = exp.clamp(-2200, 2200) as i32;
  while exp > 1000 {
    value *= 2f64.powi(1000);
    exp -= 1000;
  }
  while exp < -1000 {
    value *= 2f64.powi(-1000);
    exp += 1000;
  }
  value * 2f64.powi(exp)
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  fn scan(input: &str) -> (Token, Vec<Diagnostic>) {
    let mut lexer = Lexer::new(input.as_bytes(), Vec::new(), &Config::default());
    lexer.next();
    let token = lexer.current().clone();
    lexer.next();
    assert!(lexer.current().is(T::Eof), "{input} scanned as more than one token");
    (token, lexer.into_sink())
  }

  fn msgs(input: &str) -> Vec<String> {
    scan(input).1.into_iter().map(|diag| diag.msg).collect()
  }

  #[test]
  fn decimal_integers_round_trip() {
    for n in [0u64, 1, 7, 10, 42, 1234567890, u64::from(u32::MAX), i64::MAX as u64] {
      let lexeme = n.to_string();
      let (token, diags) = scan(&lexeme);
      assert_eq!(token, Token::new(T::Integer, lexeme.clone()));
      assert_eq!(token.lexeme.parse::<u64>(), Ok(n));
      assert!(diags.is_empty());
    }
  }

  #[test]
  fn prefixed_integers_and_floats() {
    let cases: &[(&str, T)] = &[
      ("0x1F", T::Integer),
      ("0XdeadBEEF", T::Integer),
      ("0o17", T::Integer),
      ("0b1010", T::Integer),
      ("017", T::Integer),
      ("0x1F.8p0", T::Float),
      ("0x.8p1", T::Float),
      ("0x1p-2", T::Float),
      ("1.5", T::Float),
      ("1.", T::Float),
      ("1e3", T::Float),
      ("1E+3", T::Float),
      ("0.9", T::Float),
      ("09.5", T::Float),
      ("2i", T::Complex),
    ];
    for (input, kind) in cases {
      let (token, diags) = scan(input);
      assert_eq!(token, Token::new(*kind, *input), "{input}");
      assert!(diags.is_empty(), "{input}: {diags:?}");
    }
  }

  #[test]
  fn hex_mantissa_needs_p_exponent() {
    let (token, diags) = scan("0x1F.8");
    assert_eq!(token.kind, T::Float);
    assert_eq!(diags[0].msg, "hexadecimal mantissa requires a 'p' exponent");
  }

  #[test]
  fn malformed_literals_still_produce_tokens() {
    assert_eq!(msgs("0x"), vec!["hexadecimal literal has no digits"]);
    assert_eq!(msgs("0b"), vec!["binary literal has no digits"]);
    assert_eq!(msgs("0o1.5"), vec!["invalid radix point in octal literal"]);
    assert_eq!(msgs("0b1.1"), vec!["invalid radix point in binary literal"]);
    assert_eq!(msgs("0x1e5p2"), Vec::<String>::new());
    assert_eq!(msgs("0b1e5"), vec!["'e' exponent requires decimal mantissa"]);
    assert_eq!(msgs("1p5"), vec!["'p' exponent requires hexadecimal mantissa"]);
    assert_eq!(msgs("1e"), vec!["exponent has no digits"]);
    assert_eq!(msgs("1e+"), vec!["exponent has no digits"]);
    assert_eq!(scan("1e").0.kind, T::Float);
  }

  #[test]
  fn digits_outside_base() {
    let (token, diags) = scan("0b1021");
    assert_eq!(token, Token::new(T::Integer, "0b1021"));
    assert_eq!(diags, vec![Diagnostic::new(1, 5, "invalid digit '2' in binary literal")]);

    let (_, diags) = scan("  0789");
    assert_eq!(diags, vec![Diagnostic::new(1, 5, "invalid digit '8' in octal literal")]);
  }

  #[test]
  fn digit_separators() {
    for ok in ["1_000", "0x_ff", "0b1_0", "1_0.0_1", "1e1_0", "0_7"] {
      assert_eq!(msgs(ok), Vec::<String>::new(), "{ok}");
    }
    let bad: &[(&str, u32)] = &[("1__0", 3), ("1_", 2), ("1_.5", 2), ("1._5", 3), ("0x1_", 4)];
    for (input, col) in bad {
      let (token, diags) = scan(input);
      assert_eq!(token.lexeme, *input);
      assert_eq!(diags, vec![Diagnostic::new(1, *col, "'_' must separate successive digits")]);
    }
  }

  #[test]
  fn invalid_separator_positions() {
    assert_eq!(invalid_sep("1_000"), None);
    assert_eq!(invalid_sep("_1"), Some(0));
    assert_eq!(invalid_sep("1__2"), Some(2));
    assert_eq!(invalid_sep("12_"), Some(2));
    assert_eq!(invalid_sep("0x_1"), None);
    assert_eq!(invalid_sep("0xa_b"), None);
    assert_eq!(invalid_sep("1a_b"), Some(2));
  }

  #[test]
  fn integer_values() {
    assert_eq!(int_value("42"), Ok(42));
    assert_eq!(int_value("1_000"), Ok(1000));
    assert_eq!(int_value("0x1F"), Ok(31));
    assert_eq!(int_value("0o17"), Ok(15));
    assert_eq!(int_value("017"), Ok(15));
    assert_eq!(int_value("0b101"), Ok(5));
    assert_eq!(int_value("0"), Ok(0));
    assert_eq!(int_value("0x"), Err(LitError::Malformed));
    assert_eq!(int_value("09"), Err(LitError::Malformed));
    assert_eq!(int_value("99999999999999999999"), Err(LitError::Overflow));
  }

  #[test]
  fn float_values() {
    assert_eq!(float_value("1.5"), Ok(1.5));
    assert_eq!(float_value("1_0.2_5"), Ok(10.25));
    assert_eq!(float_value("1e3"), Ok(1000.0));
    assert_eq!(float_value("0x1.8p1"), Ok(3.0));
    assert_eq!(float_value("0x.8p0"), Ok(0.5));
    assert_eq!(float_value("0x1p-2"), Ok(0.25));
    assert_eq!(float_value("0x1.8"), Err(LitError::Malformed));
    assert_eq!(float_value("1e999"), Err(LitError::Overflow));
  }

  #[test]
  fn hex_float_extremes() {
    assert_eq!(float_value("0x1.8p-2147483648"), Ok(0.0));
    assert_eq!(float_value("0x1p-99999999999999999999"), Ok(0.0));
    assert_eq!(float_value("0x1.8p2147483647"), Err(LitError::Overflow));
    assert_eq!(float_value("0x1p99999999999999999999"), Err(LitError::Overflow));
    assert_eq!(float_value("0x1p1023"), Ok(2f64.powi(1023)));
    assert_eq!(float_value("0x1p-1074"), Ok(f64::from_bits(1)));
  }

  #[test]
  fn hex_float_long_fraction_keeps_precision() {
    assert_eq!(float_value("0x1.00000000000000000000p-1000"), Ok(9.332636185032189e-302));
    assert_eq!(float_value("0x0.00000000000000000001p0"), Ok(2f64.powi(-80)));
    assert_eq!(float_value("0x10000000000000000000p0"), Ok(2f64.powi(76)));
  }
}
