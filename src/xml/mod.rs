//! Minimal XML reading for ontology documents.

mod lexer;
mod parser;

pub use lexer::XmlError;
pub use parser::Element;
