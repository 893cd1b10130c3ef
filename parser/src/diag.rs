use std::fmt;
use tracing::warn;

/// A non-fatal problem found while reading or scanning source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
  pub line: u32,
  pub col: u32,
  pub msg: String,
}

impl Diagnostic {
  pub fn new(line: u32, col: u32, msg: impl Into<String>) -> Self {
    Diagnostic { line, col, msg: msg.into() }
  }
}

impl fmt::Display for Diagnostic {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "({}, {}) {}", self.line, self.col, self.msg)
  }
}

/// Receives lexical diagnostics. Reporting never stops the scan.
pub trait DiagnosticSink {
  fn report(&mut self, diag: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
  fn report(&mut self, diag: Diagnostic) {
    self.push(diag);
  }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
  fn report(&mut self, diag: Diagnostic) {
    (**self).report(diag);
  }
}

/// Forwards every diagnostic to a closure.
pub struct FnSink<F>(pub F);

impl<F: FnMut(Diagnostic)> DiagnosticSink for FnSink<F> {
  fn report(&mut self, diag: Diagnostic) {
    (self.0)(diag);
  }
}

/// Logs diagnostics at `WARN` and otherwise drops them.
#[derive(Debug, Default, Clone, Copy)]
pub struct TraceSink;

impl DiagnosticSink for TraceSink {
  fn report(&mut self, diag: Diagnostic) {
    warn!(line = diag.line, col = diag.col, "{}", diag.msg);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sinks_receive_reports() {
    fn report_to<S: DiagnosticSink>(mut sink: S, diag: Diagnostic) {
      sink.report(diag);
    }

    let mut diags = Vec::new();
    report_to(&mut diags, Diagnostic::new(1, 2, "first"));
    diags.report(Diagnostic::new(3, 4, "second"));
    assert_eq!(diags.len(), 2);
    assert_eq!(diags[1].to_string(), "(3, 4) second");

    let mut seen = Vec::new();
    FnSink(|d: Diagnostic| seen.push(d.msg)).report(Diagnostic::new(1, 1, "x"));
    assert_eq!(seen, vec!["x".to_string()]);

    TraceSink.report(Diagnostic::new(1, 1, "logged"));
  }
}
