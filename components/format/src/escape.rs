use std::fmt;

#[cfg(feature = "encoding")]
use encoding_rs::{Encoding, EncoderResult, UTF_8, WINDOWS_1252};
use log::{debug, trace};

/// Decides which characters cannot be written literally in the output
/// encoding and must be written as character references instead
///
/// Markup characters (`<`, `&`, ...) are escaped by the writer regardless
/// of the strategy.
pub trait EscapeStrategy: fmt::Debug + Send + Sync {
    fn should_escape(&self, c: char) -> bool;

    /// Independent copy of this strategy
    fn clone_box(&self) -> Box<dyn EscapeStrategy>;
}

impl Clone for Box<dyn EscapeStrategy> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Strategy backed by a plain function or closure
///
/// ```
/// use xrs_format::{EscapeFn, Format};
///
/// let mut format = Format::raw();
/// format.set_escape_strategy(EscapeFn(|c: char| c == '€'));
/// assert!(format.should_escape('€'));
/// assert!(!format.should_escape('ä'));
/// ```
#[derive(Clone, Copy)]
pub struct EscapeFn<F>(pub F);

impl<F> fmt::Debug for EscapeFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EscapeFn")
    }
}

impl<F> EscapeStrategy for EscapeFn<F>
where
    F: Fn(char) -> bool + Clone + Send + Sync + 'static,
{
    fn should_escape(&self, c: char) -> bool {
        (self.0)(c)
    }

    fn clone_box(&self) -> Box<dyn EscapeStrategy> {
        Box::new(self.clone())
    }
}

/// Escape strategy derived from the name of the output encoding
///
/// Common encodings are handled by a range check on the code point. Every
/// other encoding is looked up in `encoding_rs` and each character is test
/// encoded. When the encoding is unknown nothing is escaped, so unknown
/// encodings never produce a flood of character references.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DefaultEscapeStrategy {
    /// UTF-8 and UTF-16: every character can be encoded
    Unicode,
    /// ISO-8859-1: up to U+00FF
    Latin1,
    /// US-ASCII: up to U+007F
    Ascii,
    /// Any other encoding known to `encoding_rs`
    #[cfg(feature = "encoding")]
    Encoder(&'static Encoding),
    /// Encoding without encoder: nothing is escaped
    Unknown,
}

impl DefaultEscapeStrategy {
    pub fn new(encoding: &str) -> Self {
        let strategy = Self::classify(encoding);
        trace!("escape strategy for encoding {:?}: {:?}", encoding, strategy);
        strategy
    }

    fn classify(encoding: &str) -> Self {
        let is = |name: &str| encoding.eq_ignore_ascii_case(name);

        if is("UTF-8") || is("UTF-16") {
            DefaultEscapeStrategy::Unicode
        } else if is("ISO-8859-1") || is("Latin1") {
            DefaultEscapeStrategy::Latin1
        } else if is("US-ASCII") || is("ASCII") {
            DefaultEscapeStrategy::Ascii
        } else {
            Self::probe(encoding)
        }
    }

    #[cfg(feature = "encoding")]
    fn probe(encoding: &str) -> Self {
        match Encoding::for_label(encoding.as_bytes()) {
            Some(enc) if enc == WINDOWS_1252 => Self::windows_1252_label(encoding),
            Some(enc) => DefaultEscapeStrategy::Encoder(enc),
            None => {
                debug!(
                    "no encoder for encoding {:?}, characters will not be escaped",
                    encoding
                );
                DefaultEscapeStrategy::Unknown
            }
        }
    }

    /// `encoding_rs` resolves the ISO-8859-1 and US-ASCII labels to
    /// windows-1252, which encodes more than either of them.
    #[cfg(feature = "encoding")]
    fn windows_1252_label(encoding: &str) -> Self {
        match encoding.trim().to_ascii_lowercase().as_str() {
            "windows-1252" | "cp1252" | "x-cp1252" => {
                DefaultEscapeStrategy::Encoder(WINDOWS_1252)
            }
            "ansi_x3.4-1968" | "ascii" | "us-ascii" => DefaultEscapeStrategy::Ascii,
            _ => DefaultEscapeStrategy::Latin1,
        }
    }

    #[cfg(not(feature = "encoding"))]
    fn probe(encoding: &str) -> Self {
        debug!(
            "encoding support disabled, characters in {:?} will not be escaped",
            encoding
        );
        DefaultEscapeStrategy::Unknown
    }

    /// Character width of the fixed-width encodings
    pub fn bits(&self) -> Option<u8> {
        match self {
            DefaultEscapeStrategy::Unicode => Some(16),
            DefaultEscapeStrategy::Latin1 => Some(8),
            DefaultEscapeStrategy::Ascii => Some(7),
            _ => None,
        }
    }
}

impl EscapeStrategy for DefaultEscapeStrategy {
    fn should_escape(&self, c: char) -> bool {
        match self {
            DefaultEscapeStrategy::Unicode => false,
            DefaultEscapeStrategy::Latin1 => c as u32 > 0xFF,
            DefaultEscapeStrategy::Ascii => c as u32 > 0x7F,
            #[cfg(feature = "encoding")]
            DefaultEscapeStrategy::Encoder(encoding) => !can_encode(encoding, c),
            DefaultEscapeStrategy::Unknown => false,
        }
    }

    fn clone_box(&self) -> Box<dyn EscapeStrategy> {
        Box::new(*self)
    }
}

#[cfg(feature = "encoding")]
fn can_encode(encoding: &'static Encoding, c: char) -> bool {
    // UTF-16 and the replacement encoding are written as UTF-8
    let encoding = encoding.output_encoding();
    if encoding == UTF_8 {
        return true;
    }

    let mut input = [0u8; 4];
    let mut output = [0u8; 32];
    let mut encoder = encoding.new_encoder();
    let (result, _, _) =
        encoder.encode_from_utf8_without_replacement(c.encode_utf8(&mut input), &mut output, true);
    matches!(result, EncoderResult::InputEmpty)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn escapes(encoding: &str, c: char) -> bool {
        DefaultEscapeStrategy::new(encoding).should_escape(c)
    }

    mod classify {
        use super::*;

        #[test]
        fn unicode() {
            assert_eq!(DefaultEscapeStrategy::Unicode, DefaultEscapeStrategy::new("UTF-8"));
            assert_eq!(DefaultEscapeStrategy::Unicode, DefaultEscapeStrategy::new("utf-16"));
        }

        #[test]
        fn latin1() {
            assert_eq!(DefaultEscapeStrategy::Latin1, DefaultEscapeStrategy::new("ISO-8859-1"));
            assert_eq!(DefaultEscapeStrategy::Latin1, DefaultEscapeStrategy::new("latin1"));
        }

        #[test]
        fn ascii() {
            assert_eq!(DefaultEscapeStrategy::Ascii, DefaultEscapeStrategy::new("US-ASCII"));
            assert_eq!(DefaultEscapeStrategy::Ascii, DefaultEscapeStrategy::new("Ascii"));
        }

        #[test]
        fn bits() {
            assert_eq!(Some(16), DefaultEscapeStrategy::new("UTF-8").bits());
            assert_eq!(Some(8), DefaultEscapeStrategy::new("ISO-8859-1").bits());
            assert_eq!(Some(7), DefaultEscapeStrategy::new("US-ASCII").bits());
            assert_eq!(None, DefaultEscapeStrategy::new("x-no-such-encoding").bits());
        }

        #[test]
        fn unknown() {
            assert_eq!(
                DefaultEscapeStrategy::Unknown,
                DefaultEscapeStrategy::new("x-no-such-encoding")
            );
        }
    }

    mod unicode {
        use super::*;

        #[test]
        fn never_escapes() {
            let strategy = DefaultEscapeStrategy::new("UTF-8");
            assert!((0..=0x10FFFF)
                .filter_map(char::from_u32)
                .all(|c| !strategy.should_escape(c)));
        }

        #[test]
        fn utf16_never_escapes() {
            let strategy = DefaultEscapeStrategy::new("UTF-16");
            assert!((0..=0x10FFFF)
                .filter_map(char::from_u32)
                .all(|c| !strategy.should_escape(c)));
        }
    }

    mod latin1 {
        use super::*;

        #[test]
        fn boundary() {
            assert!(!escapes("ISO-8859-1", '\u{FF}'));
            assert!(escapes("ISO-8859-1", '\u{100}'));
        }

        #[test]
        fn ascii_is_literal() {
            assert!(!escapes("Latin1", 'a'));
        }
    }

    mod ascii {
        use super::*;

        #[test]
        fn boundary() {
            assert!(!escapes("US-ASCII", '\u{7F}'));
            assert!(escapes("US-ASCII", '\u{80}'));
        }

        #[test]
        fn large_unicode_char() {
            assert!(escapes("ASCII", '\u{10FFFF}'));
        }
    }

    #[cfg(feature = "encoding")]
    mod encoder {
        use super::*;

        #[test]
        fn windows_1252() {
            assert!(!escapes("windows-1252", '€'));
            assert!(!escapes("windows-1252", 'é'));
            assert!(escapes("windows-1252", 'ő'));
        }

        #[test]
        fn ascii_aliases() {
            for label in ["ANSI_X3.4-1968", " us-ascii "] {
                assert_eq!(DefaultEscapeStrategy::Ascii, DefaultEscapeStrategy::new(label));
                assert!(escapes(label, 'é'), "{}", label);
                assert!(!escapes(label, 'e'), "{}", label);
            }
        }

        #[test]
        fn latin1_aliases() {
            let labels = ["ISO_8859-1", "iso8859-1", "l1", "cp819", "iso-ir-100", "ISO_8859-1:1987"];
            for label in labels {
                assert_eq!(DefaultEscapeStrategy::Latin1, DefaultEscapeStrategy::new(label));
                assert!(escapes(label, '€'), "{}", label);
                assert!(!escapes(label, 'é'), "{}", label);
            }
        }

        #[test]
        fn windows_1252_aliases() {
            for label in ["cp1252", "x-cp1252", "Windows-1252"] {
                assert_eq!(
                    DefaultEscapeStrategy::Encoder(WINDOWS_1252),
                    DefaultEscapeStrategy::new(label)
                );
            }
        }

        #[test]
        fn iso_8859_2() {
            assert!(!escapes("ISO-8859-2", 'ő'));
            assert!(escapes("ISO-8859-2", '€'));
        }

        #[test]
        fn shift_jis() {
            assert!(!escapes("Shift_JIS", 'あ'));
            assert!(!escapes("Shift_JIS", 'a'));
            assert!(escapes("Shift_JIS", 'ő'));
        }

        #[test]
        fn utf16_variants_are_unicode() {
            assert!(!escapes("UTF-16LE", '\u{10FFFF}'));
        }
    }

    mod unknown {
        use super::*;

        #[test]
        fn never_escapes() {
            let strategy = DefaultEscapeStrategy::new("x-no-such-encoding");
            assert!(!strategy.should_escape('a'));
            assert!(!strategy.should_escape('\u{10FFFF}'));
        }
    }

    mod custom {
        use super::*;

        #[test]
        fn closure() {
            let strategy = EscapeFn(|c: char| c.is_ascii_digit());
            assert!(strategy.should_escape('1'));
            assert!(!strategy.should_escape('a'));
        }

        #[test]
        fn boxed_clone() {
            let strategy: Box<dyn EscapeStrategy> = Box::new(DefaultEscapeStrategy::new("ASCII"));
            let copy = strategy.clone();
            assert!(copy.should_escape('é'));
            assert!(!copy.should_escape('e'));
        }
    }
}
