use serde::{Deserialize, Serialize};

use crate::escape::{DefaultEscapeStrategy, EscapeStrategy};
use crate::text::TextMode;

/// standard value to indent by, if we are indenting
const STANDARD_INDENT: &str = "  ";

/// standard string with which to end a line
const STANDARD_LINE_SEPARATOR: &str = "\r\n";

/// standard encoding
const STANDARD_ENCODING: &str = "UTF-8";

/// Options of the XML writer
///
/// Start from one of the presets [`Format::raw`], [`Format::pretty`] or
/// [`Format::compact`] and adjust with the setters:
///
/// ```
/// use xrs_format::{Format, TextMode};
///
/// let mut format = Format::pretty();
/// format.set_indent("\t").set_line_separator("\n");
/// assert_eq!(Some("\t"), format.indent());
/// assert_eq!(TextMode::TextTrim, format.text_mode());
/// ```
///
/// The escape strategy always follows the encoding: [`Format::set_encoding`]
/// replaces it with the [`DefaultEscapeStrategy`] of the new encoding. Use
/// [`Format::set_escape_strategy`] afterwards to override it.
///
/// A `Format` is not synchronized; clone it to hand out independent copies.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "FormatSettings", into = "FormatSettings")]
pub struct Format {
    indent: Option<String>,
    line_separator: String,
    encoding: String,
    omit_declaration: bool,
    omit_encoding: bool,
    expand_empty_elements: bool,
    trim_all_white: bool,
    text_trim: bool,
    text_normalize: bool,
    escape_strategy: Box<dyn EscapeStrategy>,
}

impl Format {
    fn new() -> Self {
        Self {
            indent: None,
            line_separator: STANDARD_LINE_SEPARATOR.to_string(),
            encoding: STANDARD_ENCODING.to_string(),
            omit_declaration: false,
            omit_encoding: false,
            expand_empty_elements: false,
            trim_all_white: false,
            text_trim: false,
            text_normalize: false,
            escape_strategy: Box::new(DefaultEscapeStrategy::new(STANDARD_ENCODING)),
        }
    }

    // presets

    /// No whitespace changes, UTF-8, declaration with encoding, empty
    /// elements stay empty
    pub fn raw() -> Self {
        Self::new()
    }

    /// [`Format::raw`] with two space indentation and trimmed text
    pub fn pretty() -> Self {
        let mut format = Self::new();
        format.set_indent(STANDARD_INDENT).set_text_trim(true);
        format
    }

    /// [`Format::raw`] with normalized text
    pub fn compact() -> Self {
        let mut format = Self::new();
        format.set_text_normalize(true);
        format
    }

    // setters

    /// Sets the string to indent by. The empty string disables indentation.
    pub fn set_indent(&mut self, indent: impl Into<String>) -> &mut Self {
        let indent = indent.into();
        self.indent = if indent.is_empty() { None } else { Some(indent) };
        self
    }

    /// Sets the separator of generated lines, default is `"\r\n"`
    ///
    /// Line breaks inside of text are not touched unless the text is
    /// normalized.
    pub fn set_line_separator(&mut self, separator: impl Into<String>) -> &mut Self {
        self.line_separator = separator.into();
        self
    }

    /// Sets the encoding and the matching [`DefaultEscapeStrategy`]
    ///
    /// Use XML names like `UTF-8`, `ISO-8859-1` or `US-ASCII`.
    pub fn set_encoding(&mut self, encoding: impl Into<String>) -> &mut Self {
        self.encoding = encoding.into();
        self.escape_strategy = Box::new(DefaultEscapeStrategy::new(&self.encoding));
        self
    }

    /// Replaces the escape strategy without touching the encoding
    pub fn set_escape_strategy(&mut self, strategy: impl EscapeStrategy + 'static) -> &mut Self {
        self.escape_strategy = Box::new(strategy);
        self
    }

    /// Leave out the encoding in the XML declaration
    pub fn set_omit_encoding(&mut self, omit_encoding: bool) -> &mut Self {
        self.omit_encoding = omit_encoding;
        self
    }

    /// Leave out the XML declaration
    pub fn set_omit_declaration(&mut self, omit_declaration: bool) -> &mut Self {
        self.omit_declaration = omit_declaration;
        self
    }

    /// Write empty elements as `<a></a>` instead of `<a/>`
    pub fn set_expand_empty_elements(&mut self, expand_empty_elements: bool) -> &mut Self {
        self.expand_empty_elements = expand_empty_elements;
        self
    }

    /// Drop text consisting only of whitespace
    pub fn set_trim_all_white(&mut self, trim_all_white: bool) -> &mut Self {
        self.trim_all_white = trim_all_white;
        self
    }

    /// Trim leading and trailing whitespace of text
    pub fn set_text_trim(&mut self, text_trim: bool) -> &mut Self {
        self.text_trim = text_trim;
        self
    }

    /// Trim text and collapse inner whitespace to a single space
    pub fn set_text_normalize(&mut self, text_normalize: bool) -> &mut Self {
        self.text_normalize = text_normalize;
        self
    }

    /// Sets exactly the flags belonging to `mode`
    pub fn set_text_mode(&mut self, mode: TextMode) -> &mut Self {
        self.trim_all_white = mode >= TextMode::TrimAllWhite;
        self.text_trim = mode >= TextMode::TextTrim;
        self.text_normalize = mode >= TextMode::TextNormalize;
        self
    }

    // builder

    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.set_indent(indent);
        self
    }

    pub fn with_line_separator(mut self, separator: impl Into<String>) -> Self {
        self.set_line_separator(separator);
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.set_encoding(encoding);
        self
    }

    pub fn with_escape_strategy(mut self, strategy: impl EscapeStrategy + 'static) -> Self {
        self.set_escape_strategy(strategy);
        self
    }

    pub fn with_omit_encoding(mut self, omit_encoding: bool) -> Self {
        self.set_omit_encoding(omit_encoding);
        self
    }

    pub fn with_omit_declaration(mut self, omit_declaration: bool) -> Self {
        self.set_omit_declaration(omit_declaration);
        self
    }

    pub fn with_expand_empty_elements(mut self, expand_empty_elements: bool) -> Self {
        self.set_expand_empty_elements(expand_empty_elements);
        self
    }

    pub fn with_text_mode(mut self, mode: TextMode) -> Self {
        self.set_text_mode(mode);
        self
    }

    // getters

    pub fn indent(&self) -> Option<&str> {
        self.indent.as_deref()
    }

    pub fn line_separator(&self) -> &str {
        &self.line_separator
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    pub fn omit_declaration(&self) -> bool {
        self.omit_declaration
    }

    pub fn omit_encoding(&self) -> bool {
        self.omit_encoding
    }

    pub fn expand_empty_elements(&self) -> bool {
        self.expand_empty_elements
    }

    pub fn trim_all_white(&self) -> bool {
        self.trim_all_white
    }

    pub fn text_trim(&self) -> bool {
        self.text_trim
    }

    pub fn text_normalize(&self) -> bool {
        self.text_normalize
    }

    /// Effective text mode of the three whitespace flags
    pub fn text_mode(&self) -> TextMode {
        TextMode::from_flags(self.trim_all_white, self.text_trim, self.text_normalize)
    }

    pub fn escape_strategy(&self) -> &dyn EscapeStrategy {
        self.escape_strategy.as_ref()
    }

    /// Whether `c` has to be written as character reference
    #[inline]
    pub fn should_escape(&self, c: char) -> bool {
        self.escape_strategy.should_escape(c)
    }

    /// XML declaration to write, `None` when it is omitted
    pub fn declaration(&self) -> Option<String> {
        if self.omit_declaration {
            None
        } else if self.omit_encoding {
            Some(r#"<?xml version="1.0"?>"#.to_string())
        } else {
            Some(format!(
                r#"<?xml version="1.0" encoding="{}"?>"#,
                self.encoding
            ))
        }
    }

    /// Plain settings of this format, without the escape strategy
    pub fn settings(&self) -> FormatSettings {
        FormatSettings {
            indent: self.indent.clone(),
            line_separator: self.line_separator.clone(),
            encoding: self.encoding.clone(),
            omit_declaration: self.omit_declaration,
            omit_encoding: self.omit_encoding,
            expand_empty_elements: self.expand_empty_elements,
            trim_all_white: self.trim_all_white,
            text_trim: self.text_trim,
            text_normalize: self.text_normalize,
        }
    }
}

impl Default for Format {
    fn default() -> Self {
        Self::raw()
    }
}

/// Serializable settings of a [`Format`]
///
/// Missing fields take the value of [`Format::raw`]. Converting into a
/// `Format` derives the escape strategy from the encoding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FormatSettings {
    pub indent: Option<String>,
    pub line_separator: String,
    pub encoding: String,
    pub omit_declaration: bool,
    pub omit_encoding: bool,
    pub expand_empty_elements: bool,
    pub trim_all_white: bool,
    pub text_trim: bool,
    pub text_normalize: bool,
}

impl Default for FormatSettings {
    fn default() -> Self {
        Format::raw().settings()
    }
}

impl From<FormatSettings> for Format {
    fn from(settings: FormatSettings) -> Self {
        let mut format = Format::new();
        format
            .set_indent(settings.indent.unwrap_or_default())
            .set_line_separator(settings.line_separator)
            .set_encoding(settings.encoding)
            .set_omit_declaration(settings.omit_declaration)
            .set_omit_encoding(settings.omit_encoding)
            .set_expand_empty_elements(settings.expand_empty_elements)
            .set_trim_all_white(settings.trim_all_white)
            .set_text_trim(settings.text_trim)
            .set_text_normalize(settings.text_normalize);
        format
    }
}

impl From<Format> for FormatSettings {
    fn from(format: Format) -> Self {
        format.settings()
    }
}
