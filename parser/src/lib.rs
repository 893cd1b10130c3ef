use std::io::Read;

pub mod ast;
pub mod config;
pub mod diag;
pub mod lexer;
pub mod parser;
pub mod source;
pub mod src_loc;
pub mod token;

pub mod internal {
  pub use crate::ast::*;
  pub use crate::config::*;
  pub use crate::diag::*;
  pub use crate::lexer::*;
  pub use crate::parser::*;
  pub use crate::source::*;
  pub use crate::src_loc::*;
  pub use crate::token::*;
  pub use bilge::prelude::*;
  pub use tracing::{debug, instrument, trace};
}

use internal::*;

/// Parses a whole source file. Lexical diagnostics go to `sink`, the first
/// syntax error is returned.
pub fn parse_file<R: Read, S: DiagnosticSink>(
  reader: R,
  sink: S,
  config: &Config,
) -> Result<File, ParseError> {
  Parser::new(reader, sink, config).parse_file()
}
