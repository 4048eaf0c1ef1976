//! Frontmatter parsing

mod frontmatter;

pub use frontmatter::{ParseError, ParsedNote, parse, serialize};
