/// Options threaded through the lexer and parser at construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
  /// Recorded in every `Location`.
  pub file_path: String,
  /// Log each parsed declaration at `DEBUG`.
  pub debug: bool,
  /// Log each scanned token at `TRACE`.
  pub trace: bool,
}

impl Config {
  pub fn new(file_path: impl Into<String>) -> Self {
    Config { file_path: file_path.into(), ..Config::default() }
  }

  pub fn with_debug(mut self, debug: bool) -> Self {
    self.debug = debug;
    self
  }

  pub fn with_trace(mut self, trace: bool) -> Self {
    self.trace = trace;
    self
  }
}
