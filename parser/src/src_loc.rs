use std::fmt;
use std::rc::Rc;

/// A `(file, line, column)` triple, 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
  pub file_path: Rc<str>,
  pub line: u32,
  pub col: u32,
}

impl Location {
  pub fn new(file_path: Rc<str>, line: u32, col: u32) -> Self {
    Location { file_path, line, col }
  }
}

impl fmt::Display for Location {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.file_path.is_empty() {
      write!(f, "{}:{}", self.line, self.col)
    } else {
      write!(f, "{}:{}:{}", self.file_path, self.line, self.col)
    }
  }
}
