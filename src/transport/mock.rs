//! Mock transport for testing

use super::Transport;
use crate::error::Result;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// In-memory transport double.
///
/// Clones share the same buffers, so a test keeps one handle to inject
/// telemetry and inspect written commands while the driver owns the other.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

#[derive(Default)]
struct MockTransportInner {
    read_buffer: VecDeque<u8>,
    write_buffer: Vec<u8>,
    fail_reads: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes for the driver to read.
    pub fn inject_read(&self, data: &[u8]) {
        self.inner.lock().read_buffer.extend(data);
    }

    /// Everything the driver has written so far.
    pub fn get_written(&self) -> Vec<u8> {
        self.inner.lock().write_buffer.clone()
    }

    /// Forget written data.
    pub fn clear_written(&self) {
        self.inner.lock().write_buffer.clear();
    }

    /// Make every subsequent read fail with a broken-pipe error.
    pub fn fail_reads(&self) {
        self.inner.lock().fail_reads = true;
    }
}

impl Transport for MockTransport {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let mut inner = self.inner.lock();
        if inner.fail_reads {
            return Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "mock transport read failure",
            )
            .into());
        }
        let count = inner.read_buffer.len().min(buffer.len());
        for slot in buffer.iter_mut().take(count) {
            // count is bounded by the queue length just above
            *slot = inner.read_buffer.pop_front().unwrap();
        }
        Ok(count)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        self.inner.lock().write_buffer.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn available(&mut self) -> Result<usize> {
        Ok(self.inner.lock().read_buffer.len())
    }
}
