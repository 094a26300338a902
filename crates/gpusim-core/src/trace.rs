//! Instruction-trace output sink.
//!
//! When `-ptx_inst_debug_to_file` is enabled, the harness opens this
//! sink before the timing model is initialized and hands it over; the
//! model (and the interpreter behind it) writes one line per executed
//! instruction.

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Buffered, file-backed instruction trace.
pub struct InstTrace {
    path: PathBuf,
    out: BufWriter<File>,
}

impl InstTrace {
    /// Create (or truncate) the trace file at `path`.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        Ok(Self {
            path,
            out: BufWriter::new(file),
        })
    }

    /// Location of the trace file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Write for InstTrace {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.out.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

impl fmt::Debug for InstTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstTrace").field("path", &self.path).finish()
    }
}
