//! Traffic dumping
//!
//! Read/write wrappers that mirror raw protocol bytes to a debug sink.
//! Sink failures are logged and never affect the wrapped stream.

use std::io::{self, Read, Write};
use std::sync::Arc;

use parking_lot::Mutex;

/// Shared writer receiving mirrored bytes
pub type DumpSink = Arc<Mutex<Box<dyn Write + Send>>>;

/// Wrap a writer as a [`DumpSink`]
pub fn dump_sink(writer: impl Write + Send + 'static) -> DumpSink {
    Arc::new(Mutex::new(Box::new(writer)))
}

fn mirror(sink: &DumpSink, bytes: &[u8]) {
    let mut sink = sink.lock();
    if let Err(e) = sink.write_all(bytes).and_then(|_| sink.flush()) {
        tracing::debug!("Dump sink write failed: {}", e);
    }
}

/// Copies everything read from `inner` into the sink
pub struct TeeReader<R> {
    inner: R,
    sink: DumpSink,
}

impl<R: Read> TeeReader<R> {
    pub fn new(inner: R, sink: DumpSink) -> Self {
        Self { inner, sink }
    }
}

impl<R: Read> Read for TeeReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n > 0 {
            mirror(&self.sink, &buf[..n]);
        }
        Ok(n)
    }
}

/// Copies everything written to `inner` into the sink
pub struct TeeWriter<W> {
    inner: W,
    sink: DumpSink,
}

impl<W: Write> TeeWriter<W> {
    pub fn new(inner: W, sink: DumpSink) -> Self {
        Self { inner, sink }
    }
}

impl<W: Write> Write for TeeWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        mirror(&self.sink, &buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
