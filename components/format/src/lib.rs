//! Output format of the XML writer
//!
//! A [`Format`] bundles everything a writer has to decide on while
//! serializing: indentation, line separator, handling of whitespace in
//! text content, the XML declaration and which characters must be written
//! as character references for the output encoding.

pub use crate::escape::{DefaultEscapeStrategy, EscapeFn, EscapeStrategy};
pub use crate::format::{Format, FormatSettings};
pub use crate::text::{is_all_whitespace, is_xml_whitespace, TextMode};

mod escape;
mod format;
mod text;
