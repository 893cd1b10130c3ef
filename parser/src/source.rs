use std::io::{ErrorKind, Read};

use crate::diag::{Diagnostic, DiagnosticSink};

const CHUNK: usize = 4096;
const BOM: char = '\u{feff}';

/// Rune-at-a-time reader over a byte stream.
///
/// `rune()` is the character under the read head, `None` once the input is
/// exhausted. Bytes from the last `mark()` up to the head stay buffered so
/// they can be extracted with `segment()`.
#[derive(Debug)]
pub struct Source<R, S> {
  reader: R,
  sink: S,
  buf: Vec<u8>,
  // bytes discarded from the front of `buf` so far
  base: usize,
  mark: Option<usize>,
  pos: usize,
  width: usize,
  ch: Option<char>,
  line: u32,
  col: u32,
  drained: bool,
}

impl<R: Read, S: DiagnosticSink> Source<R, S> {
  pub fn new(reader: R, sink: S) -> Self {
    let mut src = Source {
      reader,
      sink,
      buf: Vec::with_capacity(CHUNK),
      base: 0,
      mark: None,
      pos: 0,
      width: 0,
      ch: None,
      line: 1,
      col: 1,
      drained: false,
    };
    src.decode();
    if src.ch == Some(BOM) {
      src.pos += src.width;
      src.decode();
    }
    src
  }

  pub const fn rune(&self) -> Option<char> {
    self.ch
  }

  pub const fn pos(&self) -> (u32, u32) {
    (self.line, self.col)
  }

  pub fn advance(&mut self) {
    match self.ch {
      None => return,
      Some('\n') => {
        self.line += 1;
        self.col = 1;
      }
      Some(_) => self.col += 1,
    }
    self.pos += self.width;
    self.decode();
  }

  /// Starts a new lexeme at the read head.
  pub fn mark(&mut self) {
    self.mark = Some(self.pos);
  }

  /// Text from the mark up to (not including) the read head.
  pub fn segment(&self) -> String {
    let start = self.mark.unwrap_or(self.pos);
    String::from_utf8_lossy(&self.buf[start..self.pos]).into_owned()
  }

  /// Reports at the position of the current rune.
  pub fn error(&mut self, msg: impl Into<String>) {
    self.sink.report(Diagnostic::new(self.line, self.col, msg));
  }

  pub fn error_at(&mut self, line: u32, col: u32, msg: impl Into<String>) {
    self.sink.report(Diagnostic::new(line, col, msg));
  }

  pub const fn sink(&self) -> &S {
    &self.sink
  }

  pub fn into_sink(self) -> S {
    self.sink
  }

  fn decode(&mut self) {
    while self.buf.len() - self.pos < 4 && !self.drained {
      self.fill();
    }
    let avail = &self.buf[self.pos..];
    let Some(&lead) = avail.first() else {
      self.ch = None;
      self.width = 0;
      return;
    };
    if lead.is_ascii() {
      self.ch = Some(char::from(lead));
      self.width = 1;
      return;
    }
    let want = utf8_width(lead);
    let decoded = avail
      .get(..want)
      .filter(|_| want > 0)
      .and_then(|bytes| std::str::from_utf8(bytes).ok())
      .and_then(|s| s.chars().next());
    match decoded {
      Some(ch) => {
        self.ch = Some(ch);
        self.width = want;
        if ch == BOM && self.base + self.pos > 0 {
          self.error("invalid BOM in the middle of the file");
        }
      }
      None => {
        self.ch = Some(char::REPLACEMENT_CHARACTER);
        self.width = 1;
        self.error("invalid UTF-8 encoding");
      }
    }
  }

  fn fill(&mut self) {
    let keep = self.mark.unwrap_or(self.pos).min(self.pos);
    if keep > 0 {
      self.buf.drain(..keep);
      self.base += keep;
      self.pos -= keep;
      if let Some(mark) = self.mark.as_mut() {
        *mark -= keep;
      }
    }
    let len = self.buf.len();
    self.buf.resize(len + CHUNK, 0);
    loop {
      match self.reader.read(&mut self.buf[len..]) {
        Ok(n) => {
          self.buf.truncate(len + n);
          self.drained = n == 0;
          return;
        }
        Err(err) if err.kind() == ErrorKind::Interrupted => continue,
        Err(err) => {
          self.buf.truncate(len);
          self.drained = true;
          self.error(format!("I/O error: {err}"));
          return;
        }
      }
    }
  }
}

const fn utf8_width(lead: u8) -> usize {
  match lead {
    0xc2..=0xdf => 2,
    0xe0..=0xef => 3,
    0xf0..=0xf4 => 4,
    _ => 0,
  }
}
