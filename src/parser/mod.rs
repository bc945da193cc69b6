pub mod filename;
pub mod patterns;

pub use filename::{FilenameParser, ParseError};
