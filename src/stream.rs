//! Background sensor stream reader
//!
//! Once streaming starts, one reader thread pulls bytes from the transport,
//! feeds the frame parser, and applies each validated frame to the shared
//! telemetry (sensor cache + odometry) under a single lock, so readers see
//! a frame's sensor values and its pose effect together, in arrival order.
//!
//! The reader only ever writes telemetry; it never sends commands, so it
//! takes no lock the command path also holds while sleeping.

use crate::cache::SensorCache;
use crate::odometry::OdometryTracker;
use crate::protocol::{parse_frame, FrameParse, SensorFrame, SensorId};
use crate::transport::Transport;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Idle delay when the port had nothing for us.
const IDLE_SLEEP: Duration = Duration::from_millis(2);

/// Per-slice read buffer; frames are at most 258 bytes.
const READ_CHUNK: usize = 256;

/// Telemetry stream lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StreamState {
    /// No reader running (never started, stopped, or died on a read error).
    Stopped = 0,
    /// Reader consuming frames.
    Streaming = 1,
    /// Reader alive but ignoring the port; resume is instantaneous.
    Paused = 2,
}

impl StreamState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => StreamState::Streaming,
            2 => StreamState::Paused,
            _ => StreamState::Stopped,
        }
    }
}

/// Flags shared between the facade and the reader thread.
pub(crate) struct StreamShared {
    state: AtomicU8,
    shutdown: AtomicBool,
    /// Frames dropped to checksum mismatches or unknown ids. Corruption is
    /// handled by resync, never surfaced as an error; this counter is the
    /// only externally visible trace.
    corrupt_frames: AtomicU64,
}

impl StreamShared {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(StreamState::Stopped as u8),
            shutdown: AtomicBool::new(false),
            corrupt_frames: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> StreamState {
        StreamState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn set_state(&self, state: StreamState) {
        self.state.store(state as u8, Ordering::Release);
    }

    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    /// Re-arm for a stream (re)start: clear any previous shutdown request
    /// and mark the stream live.
    pub fn reset(&self) {
        self.shutdown.store(false, Ordering::Release);
        self.set_state(StreamState::Streaming);
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    pub fn corrupt_frames(&self) -> u64 {
        self.corrupt_frames.load(Ordering::Relaxed)
    }
}

/// Sensor cache and odometry behind one lock: a decoded frame updates both
/// as one unit, and a reader can never see them out of step.
pub(crate) struct Telemetry {
    pub cache: SensorCache,
    pub odometry: OdometryTracker,
}

impl Telemetry {
    /// Apply one validated frame: pose first, cache second, always in that
    /// order, inside the caller's critical section.
    pub fn apply_frame(&mut self, frame: &SensorFrame) {
        if let (Some(right), Some(left)) = (
            frame.value(SensorId::RightEncoderCounts),
            frame.value(SensorId::LeftEncoderCounts),
        ) {
            self.odometry.integrate(right as u16, left as u16);
        }
        self.cache.apply(frame);
    }
}

/// Reader loop body. Runs until shutdown is requested or the transport
/// fails. Frames are parsed out of a growable buffer; on a corrupt frame
/// the buffer advances one byte and the scan resynchronizes on the next
/// header.
pub(crate) fn reader_loop(
    transport: Arc<Mutex<Box<dyn Transport>>>,
    shared: Arc<StreamShared>,
    telemetry: Arc<Mutex<Telemetry>>,
) {
    let mut buffer: Vec<u8> = Vec::with_capacity(1024);
    let mut chunk = [0u8; READ_CHUNK];

    while !shared.shutdown_requested() {
        if shared.state() == StreamState::Paused {
            // Keep already-buffered bytes; just stop pulling new ones.
            thread::sleep(IDLE_SLEEP);
            continue;
        }

        // Short, timeout-bounded lock: commands on the caller thread only
        // ever wait one read slice.
        let read = {
            let mut transport = transport.lock();
            transport.read(&mut chunk)
        };

        let n = match read {
            Ok(n) => n,
            Err(e) => {
                log::error!("Stream reader: transport read failed: {}", e);
                shared.set_state(StreamState::Stopped);
                return;
            }
        };

        if n == 0 {
            thread::sleep(IDLE_SLEEP);
            continue;
        }
        buffer.extend_from_slice(&chunk[..n]);

        loop {
            let (outcome, consumed) = parse_frame(&buffer);
            match outcome {
                FrameParse::NeedMoreData => {
                    buffer.drain(..consumed);
                    break;
                }
                FrameParse::Invalid => {
                    shared.corrupt_frames.fetch_add(1, Ordering::Relaxed);
                    buffer.drain(..consumed);
                }
                FrameParse::Frame(frame) => {
                    buffer.drain(..consumed);
                    telemetry.lock().apply_frame(&frame);
                }
            }
        }
    }

    log::info!("Stream reader exiting");
}
