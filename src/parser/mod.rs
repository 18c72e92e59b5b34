pub mod error;
pub mod raw;

pub use error::ParseError;
pub use raw::TreeParser;

use crate::lexicon::Lexicon;
use crate::serial::Frame;
use crate::tree::Tree;

/// Read one candidate tree in labeled-bracket notation.
pub fn parse_tree(input: &str, lexicon: &dyn Lexicon) -> Result<Tree, ParseError> {
    TreeParser::parse_tree(input.trim(), lexicon)
}

pub fn parse_frame(input: &str) -> Result<Frame, ParseError> {
    TreeParser::parse_frame(input)
}
