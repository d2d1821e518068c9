//! Streaming XML writer driven by a [`Format`]
//!
//! ```
//! use xrs_format::Format;
//! use xrs_writer::XmlWriter;
//!
//! let mut output = String::new();
//! let mut writer = XmlWriter::new(&mut output, Format::pretty().with_line_separator("\n"));
//! writer.declaration()?;
//! writer.element("list".into())?.finish()?;
//! writer.element("item".into())?.finish()?;
//! writer.characters("  one  ")?;
//! writer.end_element()?;
//! writer.end_element()?;
//! writer.finish()?;
//!
//! assert_eq!(
//!     "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<list>\n  <item>one</item>\n</list>\n",
//!     output
//! );
//! # Ok::<(), std::io::Error>(())
//! ```

use std::borrow::Cow;
use std::io;

use log::trace;
use xrs_format::{Format, TextMode};

use crate::escape::Escaper;
pub use crate::write::UnicodeWrite;

pub mod escape;
pub mod write;

enum State {
    Prolog,
    Main,
    Epilog,
}

/// Whitespace handling requested by `xml:space`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Space {
    /// formatting of the format applies
    Default,
    /// text is written as is and no indentation is added
    Preserve,
}

struct OpenElement<'w> {
    name: Cow<'w, str>,
    space: Space,
    has_children: bool,
    has_text: bool,
}

pub struct XmlWriter<'w, W: UnicodeWrite> {
    state: State,
    stack: Vec<OpenElement<'w>>,
    writer: W,
    format: Format,
    top_level_written: bool,
}

impl<'w, W: UnicodeWrite> XmlWriter<'w, W> {
    pub fn new(writer: W, format: Format) -> Self {
        trace!(
            "writer with encoding {:?}, indent {:?}, text mode {:?}",
            format.encoding(),
            format.indent(),
            format.text_mode()
        );
        Self {
            state: State::Prolog,
            stack: vec![],
            writer,
            format,
            top_level_written: false,
        }
    }

    pub fn format(&self) -> &Format {
        &self.format
    }

    fn space(&self) -> Space {
        self.stack.last().map_or(Space::Default, |open| open.space)
    }

    fn text_mode(&self) -> TextMode {
        match self.space() {
            Space::Default => self.format.text_mode(),
            Space::Preserve => TextMode::Default,
        }
    }

    /// Indentation applies in the current scope
    fn indenting(&self) -> bool {
        self.format.indent().is_some() && self.space() == Space::Default
    }

    fn newline(&mut self, depth: usize) -> io::Result<()> {
        self.writer.write_all(self.format.line_separator())?;
        if let Some(indent) = self.format.indent() {
            for _ in 0..depth {
                self.writer.write_all(indent)?;
            }
        }
        Ok(())
    }

    /// Line break and indentation before a child node
    ///
    /// Text seen earlier in the parent suppresses the break. Text that follows
    /// an already indented child cannot undo it, so in mixed content only the
    /// children before the first text are indented.
    fn before_node(&mut self) -> io::Result<()> {
        if !self.indenting() {
            if let Some(parent) = self.stack.last_mut() {
                parent.has_children = true;
            }
            self.top_level_written = true;
            return Ok(());
        }

        let depth = self.stack.len();
        let break_line = match self.stack.last_mut() {
            Some(parent) => {
                parent.has_children = true;
                !parent.has_text
            }
            None => std::mem::replace(&mut self.top_level_written, true),
        };
        if break_line {
            self.newline(depth)?;
        }
        Ok(())
    }

    /// Writes the XML declaration of the format followed by a line separator
    ///
    /// Writes nothing when the declaration is omitted.
    pub fn declaration(&mut self) -> io::Result<()> {
        if let Some(declaration) = self.format.declaration() {
            self.writer.write_all(&declaration)?;
            self.writer.write_all(self.format.line_separator())?;
        }
        Ok(())
    }

    pub fn element<'a>(
        &'a mut self,
        name: Cow<'w, str>,
    ) -> io::Result<XmlElementWriter<'a, 'w, W>> {
        self.before_node()?;
        self.writer.write_fmt(format_args!("<{}", name))?;
        self.state = State::Main;
        let space = self.space();
        Ok(XmlElementWriter {
            name,
            space,
            ser: self,
        })
    }

    pub fn end_element(&mut self) -> io::Result<()> {
        let indenting = self.indenting();
        let open = self.stack.pop().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "end_element without open element")
        })?;

        if indenting && open.has_children && !open.has_text {
            self.newline(self.stack.len())?;
        }
        self.writer.write_fmt(format_args!("</{}>", open.name))?;
        if self.stack.is_empty() {
            self.state = State::Epilog;
        }
        Ok(())
    }

    /// Writes character data after applying the text mode
    pub fn characters(&mut self, characters: &str) -> io::Result<()> {
        let text = match self.text_mode().apply(characters) {
            Some(text) if !text.is_empty() => text,
            _ => return Ok(()),
        };

        if let Some(parent) = self.stack.last_mut() {
            parent.has_text = true;
        }
        Escaper::new(self.format.escape_strategy()).escape_content(&text, &mut self.writer)
    }

    /// Writes a CDATA section
    ///
    /// Every `]]>` in the text ends the section and starts a new one, so the
    /// output stays well-formed.
    pub fn cdata(&mut self, characters: &str) -> io::Result<()> {
        let text = match self.text_mode().apply(characters) {
            Some(text) => text,
            None => return Ok(()),
        };

        if let Some(parent) = self.stack.last_mut() {
            parent.has_text = true;
        }
        self.writer.write_all("<![CDATA[")?;
        for (i, section) in text.split("]]>").enumerate() {
            if i > 0 {
                self.writer.write_all("]]]]><![CDATA[>")?;
            }
            self.writer.write_all(section)?;
        }
        self.writer.write_all("]]>")
    }

    pub fn comment(&mut self, comment: &str) -> io::Result<()> {
        self.before_node()?;
        write!(self.writer, "<!--{}-->", comment)
    }

    pub fn pi(&mut self, name: &str, data: Option<&str>) -> io::Result<()> {
        self.before_node()?;
        if let Some(data) = data {
            write!(self.writer, "<?{} {}?>", name, data)
        } else {
            write!(self.writer, "<?{}?>", name)
        }
    }

    /// Ends the document and returns the underlying writer
    ///
    /// An indenting format ends the document with a line separator. The sink
    /// is only flushed, an [`EncodingWriter`](crate::write::EncodingWriter)
    /// still needs its own `finish`.
    pub fn finish(mut self) -> io::Result<W> {
        if !self.stack.is_empty() {
            let names: Vec<&str> = self.stack.iter().map(|open| open.name.as_ref()).collect();
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("missing end_element call(s): {}", names.join(", ")),
            ));
        }

        if self.format.indent().is_some() && matches!(self.state, State::Epilog) {
            self.writer.write_all(self.format.line_separator())?;
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}

pub struct XmlElementWriter<'ser, 'w, W: UnicodeWrite> {
    name: Cow<'w, str>,
    space: Space,
    ser: &'ser mut XmlWriter<'w, W>,
}

impl<'ser, 'w, W: UnicodeWrite> XmlElementWriter<'ser, 'w, W> {
    /// Writes an attribute
    ///
    /// `xml:space` switches whitespace handling for the element and its
    /// descendants.
    pub fn attribute(mut self, key: &str, value: &str) -> io::Result<Self> {
        if key == "xml:space" {
            match value {
                "preserve" => self.space = Space::Preserve,
                "default" => self.space = Space::Default,
                _ => {}
            }
        }

        self.ser.writer.write_all(" ")?;
        self.ser.writer.write_all(key)?;
        self.ser.writer.write_all("=\"")?;
        Escaper::new(self.ser.format.escape_strategy())
            .escape_attr_value(value, &mut self.ser.writer)?;
        self.ser.writer.write_all("\"")?;
        Ok(self)
    }

    pub fn finish(self) -> io::Result<()> {
        self.ser.stack.push(OpenElement {
            name: self.name,
            space: self.space,
            has_children: false,
            has_text: false,
        });
        self.ser.writer.write_all(">")
    }

    /// Ends an element without content, `<a/>` or `<a></a>` when the format
    /// expands empty elements
    pub fn finish_empty(self) -> io::Result<()> {
        if self.ser.format.expand_empty_elements() {
            write!(self.ser.writer, "></{}>", self.name)?;
        } else {
            self.ser.writer.write_all("/>")?;
        }
        if self.ser.stack.is_empty() {
            self.ser.state = State::Epilog;
        }
        Ok(())
    }
}
