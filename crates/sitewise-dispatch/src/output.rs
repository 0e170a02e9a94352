//! Output capture and destinations.
//!
//! Rendering never writes to the destination directly. It writes into an
//! [`OutputCapture`], which buffers everything, passes the buffer through the
//! output-buffer filters on release, and writes the result to an
//! [`OutputSink`].
//!
//! Release happens on [`OutputCapture::finish`] or, if the render bailed out
//! early, when the capture is dropped. Either way whatever was captured is
//! filtered and written exactly once.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::hooks::Hooks;

/// In-memory output destination that can be shared and read back.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded as UTF-8.
    pub fn contents(&self) -> String {
        let bytes = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn append(&self, content: &[u8]) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(content);
    }
}

/// Destination for rendered output.
#[derive(Debug, Clone, Default)]
pub enum OutputSink {
    /// Write to standard output
    #[default]
    Stdout,
    /// Write to a specific file, replacing its contents.
    ///
    /// A render that completes with empty output truncates the file. A
    /// request that fails before producing output leaves it untouched.
    File(PathBuf),
    /// Append to an in-memory buffer
    Memory(SharedBuffer),
}

impl OutputSink {
    /// Writes text content to this destination.
    pub fn write_text(&self, content: &str) -> io::Result<()> {
        match self {
            OutputSink::Stdout => {
                let stdout = io::stdout();
                let mut handle = stdout.lock();
                handle.write_all(content.as_bytes())?;
                handle.flush()
            }
            OutputSink::File(path) => {
                validate_path(path)?;
                std::fs::write(path, content)
            }
            OutputSink::Memory(buffer) => {
                buffer.append(content.as_bytes());
                Ok(())
            }
        }
    }
}

/// Validates that a file path's parent directory exists.
fn validate_path(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Parent directory does not exist: {}", parent.display()),
            ));
        }
    }
    Ok(())
}

/// Scoped output buffer around a render.
///
/// ```rust
/// use std::io::Write;
/// use sitewise_dispatch::{Hooks, OutputCapture, OutputSink, SharedBuffer};
///
/// let buffer = SharedBuffer::new();
/// let sink = OutputSink::Memory(buffer.clone());
/// let hooks = Hooks::new().output_filter(|out| Ok(out.trim().to_string()));
///
/// let mut capture = OutputCapture::begin(&sink, &hooks);
/// write!(capture, "  hello  ").unwrap();
/// capture.finish().unwrap();
///
/// assert_eq!(buffer.contents(), "hello");
/// ```
pub struct OutputCapture<'a> {
    buffer: Vec<u8>,
    sink: &'a OutputSink,
    hooks: &'a Hooks,
    released: bool,
}

impl<'a> OutputCapture<'a> {
    /// Starts capturing output destined for `sink`.
    pub fn begin(sink: &'a OutputSink, hooks: &'a Hooks) -> Self {
        Self {
            buffer: Vec::new(),
            sink,
            hooks,
            released: false,
        }
    }

    /// Bytes captured so far.
    pub fn captured(&self) -> &[u8] {
        &self.buffer
    }

    /// Filters and writes the captured output, ending the capture.
    pub fn finish(mut self) -> io::Result<()> {
        self.release(true)
    }

    /// Writes the filtered output. Empty output is only written for a
    /// completed capture, so an aborted request never clobbers the sink.
    fn release(&mut self, completed: bool) -> io::Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;

        let raw = String::from_utf8_lossy(&std::mem::take(&mut self.buffer)).into_owned();
        let output = match self.hooks.apply_output_filter(raw.clone()) {
            Ok(filtered) => filtered,
            Err(err) => {
                tracing::error!(error = %err, "output filter failed; writing unfiltered output");
                raw
            }
        };

        if output.is_empty() && !completed {
            return Ok(());
        }
        self.sink.write_text(&output)
    }
}

impl Write for OutputCapture<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for OutputCapture<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        tracing::debug!(
            bytes = self.buffer.len(),
            "releasing output capture after early exit"
        );
        if let Err(err) = self.release(false) {
            tracing::error!(error = %err, "could not write captured output");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::HookError;

    #[test]
    fn test_write_text_to_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("index.html");
        let sink = OutputSink::File(file_path.clone());

        sink.write_text("hello").unwrap();

        let content = std::fs::read_to_string(file_path).unwrap();
        assert_eq!(content, "hello");
    }

    #[test]
    fn test_write_to_invalid_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("missing").join("index.html");
        let sink = OutputSink::File(file_path);

        assert!(sink.write_text("hello").is_err());
    }

    #[test]
    fn test_memory_sink_appends() {
        let buffer = SharedBuffer::new();
        let sink = OutputSink::Memory(buffer.clone());
        sink.write_text("a").unwrap();
        sink.write_text("b").unwrap();
        assert_eq!(buffer.contents(), "ab");
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_capture_applies_filters_on_finish() {
        let buffer = SharedBuffer::new();
        let sink = OutputSink::Memory(buffer.clone());
        let hooks = Hooks::new().output_filter(|out| Ok(out.replace("cat", "dog")));

        let mut capture = OutputCapture::begin(&sink, &hooks);
        capture.write_all(b"the cat").unwrap();
        assert!(buffer.is_empty());
        capture.finish().unwrap();

        assert_eq!(buffer.contents(), "the dog");
    }

    #[test]
    fn test_capture_releases_on_drop() {
        let buffer = SharedBuffer::new();
        let sink = OutputSink::Memory(buffer.clone());
        let hooks = Hooks::new().output_filter(|out| Ok(format!("[{}]", out)));

        {
            let mut capture = OutputCapture::begin(&sink, &hooks);
            capture.write_all(b"partial").unwrap();
        }

        assert_eq!(buffer.contents(), "[partial]");
    }

    #[test]
    fn test_capture_releases_once() {
        let buffer = SharedBuffer::new();
        let sink = OutputSink::Memory(buffer.clone());
        let hooks = Hooks::new();

        let mut capture = OutputCapture::begin(&sink, &hooks);
        capture.write_all(b"x").unwrap();
        capture.finish().unwrap();

        assert_eq!(buffer.contents(), "x");
    }

    #[test]
    fn test_failing_filter_writes_unfiltered() {
        let buffer = SharedBuffer::new();
        let sink = OutputSink::Memory(buffer.clone());
        let hooks = Hooks::new().output_filter(|_| Err(HookError::output_buffer("broken")));

        let mut capture = OutputCapture::begin(&sink, &hooks);
        capture.write_all(b"raw").unwrap();
        capture.finish().unwrap();

        assert_eq!(buffer.contents(), "raw");
    }

    #[test]
    fn test_empty_finished_capture_truncates_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("out.html");
        std::fs::write(&file_path, "stale page").unwrap();
        let sink = OutputSink::File(file_path.clone());
        let hooks = Hooks::new();

        OutputCapture::begin(&sink, &hooks).finish().unwrap();
        assert_eq!(std::fs::read_to_string(&file_path).unwrap(), "");
    }

    #[test]
    fn test_empty_aborted_capture_leaves_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("out.html");
        std::fs::write(&file_path, "previous page").unwrap();
        let sink = OutputSink::File(file_path.clone());
        let hooks = Hooks::new();

        drop(OutputCapture::begin(&sink, &hooks));
        assert_eq!(std::fs::read_to_string(&file_path).unwrap(), "previous page");
    }
}
