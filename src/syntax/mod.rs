//! Placeholder syntax: the `${...}` tokenizer and the object-literal format
//! grammar it defers to.

pub mod object;
pub mod scanner;

pub use object::{parse_format_object, ObjectSyntaxError};
pub use scanner::{extract_tokens, scan_tokens, ScannedToken};
