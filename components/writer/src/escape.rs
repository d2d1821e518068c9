use std::io;

use xrs_format::EscapeStrategy;

use crate::UnicodeWrite;

/// Escapes character data and attribute values
///
/// Markup characters become entity references. Characters the
/// [`EscapeStrategy`] flags become decimal character references.
///
/// see https://www.w3.org/TR/REC-xml/#dt-chardata
#[derive(Copy, Clone, Debug)]
pub struct Escaper<'s> {
    strategy: &'s dyn EscapeStrategy,
}

impl<'s> Escaper<'s> {
    pub fn new(strategy: &'s dyn EscapeStrategy) -> Self {
        Self { strategy }
    }

    pub fn escape_content<W: UnicodeWrite>(&self, input: &str, write: &mut W) -> io::Result<()> {
        self.escape(input, write, |c| match c {
            '&' => Some("&amp;"),
            '<' => Some("&lt;"),
            '>' => Some("&gt;"),
            '\r' => Some("&#13;"),
            _ => None,
        })
    }

    pub fn escape_attr_value<W: UnicodeWrite>(
        &self,
        input: &str,
        write: &mut W,
    ) -> io::Result<()> {
        self.escape(input, write, |c| match c {
            '&' => Some("&amp;"),
            '<' => Some("&lt;"),
            '>' => Some("&gt;"),
            '"' => Some("&quot;"),
            '\t' => Some("&#9;"),
            '\n' => Some("&#10;"),
            '\r' => Some("&#13;"),
            _ => None,
        })
    }

    fn escape<W: UnicodeWrite>(
        &self,
        input: &str,
        write: &mut W,
        entity: impl Fn(char) -> Option<&'static str>,
    ) -> io::Result<()> {
        let mut p = 0;
        // `None` replacement: character reference
        let replacements = input.char_indices().filter_map(|(i, c)| match entity(c) {
            Some(entity) => Some((i, c, Some(entity))),
            None if self.strategy.should_escape(c) => Some((i, c, None)),
            None => None,
        });
        for (i, c, replacement) in replacements {
            write.write_all(&input[p..i])?;
            match replacement {
                Some(entity) => write.write_all(entity)?,
                None => write.write_fmt(format_args!("&#{};", c as u32))?,
            }
            p = i + c.len_utf8();
        }
        write.write_all(if p == 0 { input } else { &input[p..] })
    }
}

/// Escapes character data for a strategy into a new string
pub fn escape(input: &str, strategy: &dyn EscapeStrategy) -> String {
    let mut output = String::with_capacity(input.len());
    Escaper::new(strategy)
        .escape_content(input, &mut output)
        .unwrap();
    output
}
