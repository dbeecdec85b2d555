pub mod ast;
pub mod diagnostic;
pub mod error;
pub mod lexer;
pub mod listener;
pub mod parser;
pub mod validator;

pub use diagnostic::{Diagnostic, ValidationResult};
pub use error::EngineFault;
pub use lexer::{Lexer, Limits, Token};
pub use listener::{ConsoleErrorListener, ErrorListener, SyntaxError};
pub use parser::EsqlParser;
pub use validator::{FailFastSink, Validator, validate};
