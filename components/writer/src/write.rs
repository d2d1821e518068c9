use std::{fmt, io};

#[cfg(feature = "encoding")]
use encoding_rs::{CoderResult, Encoder, Encoding};

/// Sink for already escaped XML text
pub trait UnicodeWrite {
    fn write_all(&mut self, s: &str) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;

    fn write_fmt(&mut self, fmt: fmt::Arguments<'_>) -> io::Result<()> {
        struct PersistErrorWrapper<'a, T: 'a + ?Sized> {
            writer: &'a mut T,
            err: Option<io::Error>,
        }

        impl<'a, T: 'a + ?Sized + UnicodeWrite> fmt::Write for PersistErrorWrapper<'a, T> {
            fn write_str(&mut self, s: &str) -> fmt::Result {
                self.writer.write_all(s).map_err(|err| {
                    self.err = Some(err);
                    fmt::Error
                })
            }
        }

        let mut writer = PersistErrorWrapper {
            writer: self,
            err: None,
        };
        fmt::write(&mut writer, fmt).map_err(|_| {
            writer
                .err
                .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "formatter error"))
        })
    }
}

impl UnicodeWrite for String {
    fn write_all(&mut self, s: &str) -> io::Result<()> {
        self.push_str(s);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<T: ?Sized + UnicodeWrite> UnicodeWrite for &mut T {
    fn write_all(&mut self, s: &str) -> io::Result<()> {
        (**self).write_all(s)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }

    fn write_fmt(&mut self, fmt: fmt::Arguments<'_>) -> io::Result<()> {
        (**self).write_fmt(fmt)
    }
}

/// Writes UTF-8 bytes
pub struct Utf8Writer<T: io::Write>(T);

impl<T: io::Write> Utf8Writer<T> {
    pub fn new(inner: T) -> Self {
        Self(inner)
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: io::Write> UnicodeWrite for Utf8Writer<T> {
    fn write_all(&mut self, s: &str) -> io::Result<()> {
        self.0.write_all(s.as_bytes())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }

    fn write_fmt(&mut self, fmt: fmt::Arguments<'_>) -> io::Result<()> {
        self.0.write_fmt(fmt)
    }
}

/// Writes bytes in any encoding `encoding_rs` can encode
///
/// Characters the encoding cannot represent are written as decimal
/// character references, so the output stays well-formed even when the
/// escape strategy of the format lets them through.
///
/// [`XmlWriter::finish`](crate::XmlWriter::finish) only flushes. Call
/// [`EncodingWriter::finish`] on the returned sink afterwards: stateful
/// encodings like ISO-2022-JP write their closing shift sequence there.
///
/// `encoding_rs` has no UTF-16 encoder, an encoder for `UTF-16LE` passed
/// to [`EncodingWriter::new`] writes UTF-8. [`EncodingWriter::for_label`]
/// rejects such encodings.
#[cfg(feature = "encoding")]
pub struct EncodingWriter<T: io::Write> {
    inner: T,
    encoder: Encoder,
    buffer: Vec<u8>,
}

#[cfg(feature = "encoding")]
impl<T: io::Write> EncodingWriter<T> {
    pub fn new(inner: T, encoding: &'static Encoding) -> Self {
        Self {
            inner,
            encoder: encoding.new_encoder(),
            buffer: vec![0; 1024],
        }
    }

    /// Writer for an encoding name like `ISO-8859-15`
    ///
    /// Fails for unknown names and for encodings that `encoding_rs` would
    /// write in another encoding (UTF-16, replacement).
    pub fn for_label(inner: T, label: &str) -> io::Result<Self> {
        match Encoding::for_label(label.as_bytes()) {
            Some(encoding) if encoding.output_encoding() == encoding => {
                Ok(Self::new(inner, encoding))
            }
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unsupported encoding: {}", label),
            )),
        }
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoder.encoding()
    }

    fn encode(&mut self, mut s: &str, last: bool) -> io::Result<()> {
        loop {
            let (result, read, written, _) =
                self.encoder.encode_from_utf8(s, &mut self.buffer, last);
            self.inner.write_all(&self.buffer[..written])?;
            s = &s[read..];
            match result {
                CoderResult::InputEmpty => return Ok(()),
                CoderResult::OutputFull => continue,
            }
        }
    }

    /// Finishes the encoder state and returns the underlying writer
    pub fn finish(mut self) -> io::Result<T> {
        self.encode("", true)?;
        self.inner.flush()?;
        Ok(self.inner)
    }
}

#[cfg(feature = "encoding")]
impl<T: io::Write> UnicodeWrite for EncodingWriter<T> {
    fn write_all(&mut self, s: &str) -> io::Result<()> {
        self.encode(s, false)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
