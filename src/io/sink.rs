//! Module with the [`ByteSink`] trait and its implementations.

use std::fs::File;
use std::io::{self, Write};
use std::net::TcpStream;
use std::os::unix::net::UnixStream;
use std::process::ChildStdin;

/// Destination for bytes.
///
/// This is the write half of a byte stream, for example a socket, pipe or
/// file.
#[doc(alias = "Write")]
pub trait ByteSink {
    /// Write (part of) `buf` to the sink, returning the number of bytes
    /// written.
    ///
    /// The number of bytes written may be less than the length of `buf`, but
    /// for a non-empty `buf` returning zero is considered an error by the
    /// users of this trait.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;
}

impl<S: ByteSink + ?Sized> ByteSink for &mut S {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (**self).write(buf)
    }
}

impl<S: ByteSink + ?Sized> ByteSink for Box<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (**self).write(buf)
    }
}

/// Always writes all bytes.
impl ByteSink for Vec<u8> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.extend_from_slice(buf);
        Ok(buf.len())
    }
}

macro_rules! impl_byte_sink {
    ($( $ty: ty ),+) => {
        $(
        impl ByteSink for $ty {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                Write::write(self, buf)
            }
        }
        )+
    };
}

impl_byte_sink!(
    TcpStream,
    &TcpStream,
    UnixStream,
    &UnixStream,
    File,
    &File,
    ChildStdin
);

/// Adapter to use any [`Write`] implementation as [`ByteSink`].
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
///
/// use fiberio::io::{ByteSink, WriteSink};
///
/// let mut sink = WriteSink::new(Cursor::new(Vec::new()));
/// let n = sink.write(b"Hello")?;
/// assert_eq!(n, 5);
/// assert_eq!(sink.into_inner().into_inner(), b"Hello");
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct WriteSink<W> {
    inner: W,
}

impl<W: Write> WriteSink<W> {
    /// Wrap `inner`.
    pub const fn new(inner: W) -> WriteSink<W> {
        WriteSink { inner }
    }

    /// Returns a reference to the underlying writer.
    pub const fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> ByteSink for WriteSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }
}
