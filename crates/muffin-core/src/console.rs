//! Output streams test code writes to, and scoped silencing of them

use std::cell::RefCell;
use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;

struct Sinks {
    out: Box<dyn Write>,
    err: Box<dyn Write>,
}

/// Shared handle to the stdout/stderr pair test code prints through
///
/// Clones share the same streams, so silencing one handle silences every
/// module and runner holding a clone.
#[derive(Clone)]
pub struct Console {
    sinks: Rc<RefCell<Sinks>>,
}

impl Console {
    /// Console writing to the process stdout and stderr
    pub fn stdio() -> Self {
        Self::from_writers(io::stdout(), io::stderr())
    }

    /// Console writing to arbitrary sinks
    pub fn from_writers(out: impl Write + 'static, err: impl Write + 'static) -> Self {
        Self {
            sinks: Rc::new(RefCell::new(Sinks {
                out: Box::new(out),
                err: Box::new(err),
            })),
        }
    }

    /// Console writing into in-memory buffers, returned alongside it
    pub fn buffered() -> (Self, SharedBuffer, SharedBuffer) {
        let out = SharedBuffer::default();
        let err = SharedBuffer::default();
        (Self::from_writers(out.clone(), err.clone()), out, err)
    }

    /// Write to the output stream
    pub fn write_out(&self, text: &str) -> io::Result<()> {
        let mut sinks = self.sinks.borrow_mut();
        sinks.out.write_all(text.as_bytes())?;
        sinks.out.flush()
    }

    /// Write to the error stream
    pub fn write_err(&self, text: &str) -> io::Result<()> {
        let mut sinks = self.sinks.borrow_mut();
        sinks.err.write_all(text.as_bytes())?;
        sinks.err.flush()
    }

    /// Discard everything written until the returned guard is dropped
    pub fn silence(&self) -> QuietGuard {
        let saved = std::mem::replace(
            &mut *self.sinks.borrow_mut(),
            Sinks {
                out: Box::new(io::sink()),
                err: Box::new(io::sink()),
            },
        );
        tracing::trace!("console silenced");
        QuietGuard {
            console: self.clone(),
            saved: Some(saved),
        }
    }
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console").finish_non_exhaustive()
    }
}

/// Restores the console's original streams when dropped, including on unwind
#[must_use = "the console is restored as soon as the guard is dropped"]
pub struct QuietGuard {
    console: Console,
    saved: Option<Sinks>,
}

impl Drop for QuietGuard {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            // try_borrow_mut: a panic raised mid-write leaves no borrow behind,
            // but never turn a restore into a double panic.
            if let Ok(mut sinks) = self.console.sinks.try_borrow_mut() {
                *sinks = saved;
                tracing::trace!("console restored");
            }
        }
    }
}

/// Cloneable in-memory writer
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    /// Everything written so far, lossily decoded
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
