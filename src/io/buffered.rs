//! Module with [`BufferedWriter`].

use std::cmp::min;
use std::mem::ManuallyDrop;
use std::{fmt, io, ptr};

use log::{debug, trace, warn};

use crate::io::ByteSink;

/// Default capacity of a [`BufferedWriter`].
pub const DEFAULT_CAPACITY: usize = 8 * 1024;

/// Buffered writer in front of a [`ByteSink`].
///
/// Writes are copied into a fixed size buffer, the buffer is written to the
/// sink only once it's full or when [`flush`] is called. Writes of at least
/// the buffer's capacity that arrive while the buffer is empty skip the buffer
/// and are written to the sink directly. In all cases the bytes arrive at the
/// sink in the order they were written, each byte exactly once.
///
/// Bytes still buffered when the writer is dropped are lost (a warning is
/// logged). Call [`flush`] or [`into_inner`] before dropping the writer, or
/// [`discard`] to drop the bytes on purpose.
///
/// [`flush`]: BufferedWriter::flush
/// [`into_inner`]: BufferedWriter::into_inner
/// [`discard`]: BufferedWriter::discard
///
/// # Errors
///
/// If the sink returns an error the bytes not yet accepted by it are kept in
/// the buffer, so calling [`flush`] again retries the write without
/// duplicating bytes. When [`write`] returns an error however, the caller
/// can't know how many of the bytes passed to it were buffered or written.
/// Use the [`io::Write::write`] implementation if that is needed, it returns
/// the number of bytes taken instead of an error if some were taken.
///
/// [`write`]: BufferedWriter::write
///
/// # Examples
///
/// ```
/// use fiberio::io::BufferedWriter;
///
/// let mut writer = BufferedWriter::with_capacity(4, Vec::<u8>::new());
/// writer.write(b"ab")?;
/// // Buffered, not yet written.
/// assert!(writer.get_ref().is_empty());
///
/// writer.write(b"cdef")?;
/// // Overflowing the buffer writes it, keeping the remainder buffered.
/// assert_eq!(writer.get_ref(), b"abcd");
/// assert_eq!(writer.buffered(), b"ef");
///
/// writer.flush()?;
/// assert_eq!(writer.get_ref(), b"abcdef");
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct BufferedWriter<S> {
    sink: S,
    buf: Box<[u8]>,
    /// Number of bytes in `buf` pending, always the start of `buf`.
    filled: usize,
}

impl<S: ByteSink> BufferedWriter<S> {
    /// Create a new `BufferedWriter` with the [default capacity].
    ///
    /// [default capacity]: DEFAULT_CAPACITY
    pub fn new(sink: S) -> BufferedWriter<S> {
        BufferedWriter::with_capacity(DEFAULT_CAPACITY, sink)
    }

    /// Create a new `BufferedWriter` with a buffer of `capacity` bytes.
    ///
    /// # Panics
    ///
    /// This will panic if `capacity` is zero.
    pub fn with_capacity(capacity: usize, sink: S) -> BufferedWriter<S> {
        assert!(
            capacity != 0,
            "can't create a `BufferedWriter` with zero capacity"
        );
        BufferedWriter {
            sink,
            buf: vec![0; capacity].into_boxed_slice(),
            filled: 0,
        }
    }

    /// Write all of `data`.
    ///
    /// The sink is only written to if `data` doesn't fit in the buffer.
    pub fn write(&mut self, data: &[u8]) -> io::Result<()> {
        let mut consumed = 0;
        self.write_counted(data, &mut consumed)
    }

    /// Same as [`BufferedWriter::write`], but keeps `consumed` updated with
    /// the number of bytes of `data` buffered or written to the sink, also if
    /// an error is returned.
    fn write_counted(&mut self, mut data: &[u8], consumed: &mut usize) -> io::Result<()> {
        let capacity = self.buf.len();
        while !data.is_empty() {
            if self.filled == capacity {
                self.flush()?;
                debug_assert_eq!(self.filled, 0);

                // Copying into the buffer would only add overhead.
                while data.len() >= capacity {
                    let written = match write_to(&mut self.sink, data) {
                        Ok(n) => n,
                        Err(err) => {
                            debug!("failed to write {} bytes directly to sink: {err}", data.len());
                            return Err(err);
                        }
                    };
                    trace!("wrote {written}/{} bytes directly to sink", data.len());
                    *consumed += written;
                    data = &data[written..];
                }
                if data.is_empty() {
                    break;
                }
            }

            let n = min(capacity - self.filled, data.len());
            self.buf[self.filled..self.filled + n].copy_from_slice(&data[..n]);
            self.filled += n;
            *consumed += n;
            data = &data[n..];
        }
        Ok(())
    }

    /// Write all buffered bytes to the sink.
    ///
    /// Does nothing if the buffer is empty. On error the bytes the sink didn't
    /// accept stay buffered.
    pub fn flush(&mut self) -> io::Result<()> {
        let mut written = 0;
        let mut result = Ok(());
        while written < self.filled {
            match write_to(&mut self.sink, &self.buf[written..self.filled]) {
                Ok(n) => written += n,
                Err(err) => {
                    debug!(
                        "failed to flush {} buffered bytes to sink: {err}",
                        self.filled - written
                    );
                    result = Err(err);
                    break;
                }
            }
        }
        if written != 0 {
            trace!("flushed {written} bytes to sink");
        }
        self.buf.copy_within(written..self.filled, 0);
        self.filled -= written;
        result
    }

    /// Flush the buffer and return the sink.
    pub fn into_inner(mut self) -> Result<S, IntoInnerError<S>> {
        match self.flush() {
            Ok(()) => Ok(self.into_parts().0),
            Err(error) => Err(IntoInnerError {
                writer: self,
                error,
            }),
        }
    }
}

impl<S> BufferedWriter<S> {
    /// Returns the size of the buffer.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Returns the bytes buffered, but not yet written to the sink.
    pub fn buffered(&self) -> &[u8] {
        &self.buf[..self.filled]
    }

    /// Returns a reference to the sink.
    pub const fn get_ref(&self) -> &S {
        &self.sink
    }

    /// Returns a mutable reference to the sink.
    ///
    /// Writing directly to the sink can cause bytes to arrive out of order.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Drop all buffered bytes, returning the number of bytes dropped.
    pub fn discard(&mut self) -> usize {
        let n = self.filled;
        self.filled = 0;
        n
    }

    /// Returns the sink and the buffered bytes, without writing them.
    pub fn into_parts(self) -> (S, Vec<u8>) {
        let this = ManuallyDrop::new(self);
        // SAFETY: `this` is never used or dropped after reading the fields.
        let sink = unsafe { ptr::read(&this.sink) };
        let buf = unsafe { ptr::read(&this.buf) };
        let mut buf = buf.into_vec();
        buf.truncate(this.filled);
        (sink, buf)
    }
}

/// Write `data` to `sink`, converting a zero sized write into an error.
fn write_to<S: ByteSink>(sink: &mut S, data: &[u8]) -> io::Result<usize> {
    match sink.write(data) {
        Ok(0) => Err(io::Error::new(
            io::ErrorKind::WriteZero,
            "failed to write buffered data",
        )),
        Ok(n) => {
            assert!(n <= data.len(), "`ByteSink` wrote more bytes than provided");
            Ok(n)
        }
        Err(err) => Err(err),
    }
}

impl<S: ByteSink> io::Write for BufferedWriter<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut consumed = 0;
        match self.write_counted(buf, &mut consumed) {
            Ok(()) => Ok(buf.len()),
            // An error means nothing was written, so report the bytes we took
            // instead. The error returns on the next call.
            Err(_) if consumed != 0 => Ok(consumed),
            Err(err) => Err(err),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        BufferedWriter::write(self, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        BufferedWriter::flush(self)
    }
}

impl<S> Drop for BufferedWriter<S> {
    fn drop(&mut self) {
        if self.filled != 0 {
            warn!(
                "dropping `BufferedWriter` with {} unflushed bytes",
                self.filled
            );
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for BufferedWriter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferedWriter")
            .field("sink", &self.sink)
            .field(
                "buffer",
                &format_args!("{}/{}", self.filled, self.buf.len()),
            )
            .finish()
    }
}

/// Error returned by [`BufferedWriter::into_inner`].
///
/// Contains the error returned by the sink and the writer, which still holds
/// the bytes not yet written.
pub struct IntoInnerError<S> {
    writer: BufferedWriter<S>,
    error: io::Error,
}

impl<S> IntoInnerError<S> {
    /// Returns the error that caused the flush to fail.
    pub const fn error(&self) -> &io::Error {
        &self.error
    }

    /// Returns the writer, which can be used to retry the flush.
    pub fn into_writer(self) -> BufferedWriter<S> {
        self.writer
    }

    /// Returns the error and the writer.
    pub fn into_parts(self) -> (io::Error, BufferedWriter<S>) {
        (self.error, self.writer)
    }
}

impl<S> From<IntoInnerError<S>> for io::Error {
    fn from(err: IntoInnerError<S>) -> io::Error {
        err.error
    }
}

impl<S> fmt::Debug for IntoInnerError<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntoInnerError")
            .field("error", &self.error)
            .field("buffered", &self.writer.filled)
            .finish()
    }
}

impl<S> fmt::Display for IntoInnerError<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to flush buffered writer: {}", self.error)
    }
}

impl<S> std::error::Error for IntoInnerError<S> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
