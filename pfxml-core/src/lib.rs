//! Generic XML tree, parsing and writing primitives for pfSense-style
//! configuration documents.

pub mod parser;
pub mod tree;
pub mod writer;

pub use parser::{parse, parse_file, ParseError};
pub use tree::{FieldMap, XmlNode};
pub use writer::{write, write_file, WriteError};
