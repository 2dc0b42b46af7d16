//! Line-oriented, internally synchronized output sink.
//!
//! Every write goes out as one complete line under the sink's lock, so
//! concurrent tasks never interleave partial lines. A closed downstream
//! pipe silences the sink instead of failing the dispatch.

use std::io::{self, Write};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

pub struct OutputSink {
    writer: Mutex<Box<dyn Write + Send>>,
    closed: AtomicBool,
}

impl OutputSink {
    /// Sink writing to the process's standard output.
    pub fn stdout() -> Self {
        Self::from_writer(io::stdout())
    }

    /// Sink writing to any writer.
    pub fn from_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
            closed: AtomicBool::new(false),
        }
    }

    /// Write one line, optionally tagged with a node name.
    ///
    /// A trailing newline in `line` is not duplicated.
    pub fn line(&self, tag: Option<&str>, line: &[u8]) {
        let line = line.strip_suffix(b"\n").unwrap_or(line);
        let mut buf = Vec::with_capacity(line.len() + 32);
        if let Some(tag) = tag {
            buf.extend_from_slice(tag.as_bytes());
            buf.extend_from_slice(b": ");
        }
        buf.extend_from_slice(line);
        buf.push(b'\n');
        self.write_all(&buf);
    }

    /// Write a text line without a tag.
    pub fn text(&self, text: &str) {
        self.line(None, text.as_bytes());
    }

    /// Whether the downstream reader went away.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }

    fn write_all(&self, buf: &[u8]) {
        if self.is_closed() {
            return;
        }
        let mut writer = match self.writer.lock() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = writer.write_all(buf).and_then(|()| writer.flush()) {
            if e.kind() == io::ErrorKind::BrokenPipe {
                self.closed.store(true, Ordering::Relaxed);
            } else {
                log::debug!("output write failed: {}", e);
            }
        }
    }
}

impl std::fmt::Debug for OutputSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputSink")
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

/// Shared in-memory buffer, handy for capturing sink output.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(std::sync::Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything written so far.
    pub fn contents(&self) -> Vec<u8> {
        match self.0.lock() {
            Ok(buf) => buf.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Contents decoded lossily as UTF-8.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.contents()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        match self.0.lock() {
            Ok(mut buf) => buf.extend_from_slice(data),
            Err(poisoned) => poisoned.into_inner().extend_from_slice(data),
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _data: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_tagged_and_untagged_lines() {
        let buf = SharedBuffer::new();
        let sink = OutputSink::from_writer(buf.clone());
        sink.line(Some("web1"), b"up 3 days\n");
        sink.line(None, b"plain");
        sink.text("ssh web1 uptime");
        assert_eq!(
            buf.to_string_lossy(),
            "web1: up 3 days\nplain\nssh web1 uptime\n"
        );
    }

    #[test]
    fn test_broken_pipe_is_swallowed() {
        let sink = OutputSink::from_writer(BrokenPipe);
        sink.text("first");
        assert!(sink.is_closed());
        sink.text("second");
    }

    #[test]
    fn test_concurrent_lines_are_not_torn() {
        let buf = SharedBuffer::new();
        let sink = Arc::new(OutputSink::from_writer(buf.clone()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let sink = Arc::clone(&sink);
                thread::spawn(move || {
                    let tag = format!("node{i}");
                    for _ in 0..200 {
                        sink.line(Some(&tag), b"0123456789abcdefghijklmnopqrstuvwxyz");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let output = buf.to_string_lossy();
        assert_eq!(output.lines().count(), 8 * 200);
        for line in output.lines() {
            let (tag, rest) = line.split_once(": ").unwrap();
            assert!(tag.starts_with("node"));
            assert_eq!(rest, "0123456789abcdefghijklmnopqrstuvwxyz");
        }
    }
}
