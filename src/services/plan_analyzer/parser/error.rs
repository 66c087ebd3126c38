//! Parser error types for plan analysis

use thiserror::Error;

/// Errors raised while reading a single plan element.
///
/// They never leave the parser: the offending element is dropped.
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("<{element}> is missing attribute {attribute}")]
    MissingAttribute { element: &'static str, attribute: &'static str },

    #[error("Attribute {attribute} has invalid numeric value '{value}'")]
    InvalidNumber { attribute: &'static str, value: String },
}

/// Result type alias for parser operations
pub type ParseResult<T> = Result<T, ParseError>;
