use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// https://www.w3.org/TR/REC-xml/#NT-S
#[inline]
pub fn is_xml_whitespace(c: char) -> bool {
    c == '\x20' || c == '\x0A' || c == '\x09' || c == '\x0D'
}

/// `true` when `text` contains nothing but XML whitespace (or nothing at all)
pub fn is_all_whitespace(text: &str) -> bool {
    text.chars().all(is_xml_whitespace)
}

/// Handling of whitespace in text content
///
/// The modes are ordered: every mode does what the previous one does and a
/// bit more.
///
/// | Mode            | Behavior |
/// |-----------------|----------|
/// | `Default`       | text is printed as it is stored |
/// | `TrimAllWhite`  | text consisting only of whitespace is not printed |
/// | `TextTrim`      | as `TrimAllWhite`, plus leading and trailing whitespace is removed |
/// | `TextNormalize` | as `TextTrim`, plus inner whitespace runs are collapsed to a single space |
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum TextMode {
    #[default]
    Default,
    TrimAllWhite,
    TextTrim,
    TextNormalize,
}

impl TextMode {
    /// Effective mode for a combination of the three independent flags
    ///
    /// The strongest flag wins, so `text_normalize` alone already implies
    /// trimming and dropping of whitespace-only text.
    pub fn from_flags(trim_all_white: bool, text_trim: bool, text_normalize: bool) -> Self {
        if text_normalize {
            TextMode::TextNormalize
        } else if text_trim {
            TextMode::TextTrim
        } else if trim_all_white {
            TextMode::TrimAllWhite
        } else {
            TextMode::Default
        }
    }

    /// Whether whitespace-only text is dropped
    pub fn trims_all_white(self) -> bool {
        self >= TextMode::TrimAllWhite
    }

    /// Applies the mode to `text`
    ///
    /// Returns `None` when the text must not be printed at all.
    pub fn apply(self, text: &str) -> Option<Cow<'_, str>> {
        match self {
            TextMode::Default => Some(Cow::Borrowed(text)),
            _ if is_all_whitespace(text) => None,
            TextMode::TrimAllWhite => Some(Cow::Borrowed(text)),
            TextMode::TextTrim => Some(Cow::Borrowed(text.trim_matches(is_xml_whitespace))),
            TextMode::TextNormalize => Some(normalize(text.trim_matches(is_xml_whitespace))),
        }
    }
}

/// Collapses whitespace runs of already trimmed text
fn normalize(text: &str) -> Cow<'_, str> {
    let mut last_was_space = false;
    let untouched = text.chars().all(|c| {
        let ok = if is_xml_whitespace(c) {
            c == ' ' && !last_was_space
        } else {
            true
        };
        last_was_space = is_xml_whitespace(c);
        ok
    });
    if untouched {
        return Cow::Borrowed(text);
    }

    let mut result = String::with_capacity(text.len());
    for word in text.split(is_xml_whitespace).filter(|word| !word.is_empty()) {
        if !result.is_empty() {
            result.push(' ');
        }
        result.push_str(word);
    }
    Cow::Owned(result)
}
