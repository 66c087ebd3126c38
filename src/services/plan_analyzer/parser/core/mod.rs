//! Core parsing components for showplan analysis

pub mod attribute_parser;
pub mod operator_parser;
pub mod statement_parser;

pub use attribute_parser::{AttributeParser, Attributes};
pub use operator_parser::OperatorParser;
pub use statement_parser::StatementParser;
