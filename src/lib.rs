//! roomba-oi - Serial driver for the iRobot Roomba 500-series Open Interface
//!
//! This library speaks the robot's serial protocol: it encodes commands,
//! decodes the continuous sensor-telemetry stream on a background thread,
//! enforces the mode preconditions the protocol attaches to motion commands,
//! and integrates wheel-encoder counts into a pose.
//!
//! ## Quick start
//!
//! ```no_run
//! use roomba_oi::Roomba;
//!
//! # fn main() -> roomba_oi::Result<()> {
//! let mut roomba = Roomba::open("/dev/ttyUSB0")?;
//! roomba.start()?;            // wake the OI (Off -> Passive)
//! roomba.safe_control()?;     // motion commands need Safe or Full
//! roomba.start_sensor_stream(&[])?; // default sensor list, 15ms cadence
//!
//! roomba.drive_straight(200)?;
//! loop {
//!     if roomba.is_left_bump()? || roomba.is_right_bump()? {
//!         roomba.stop()?;
//!         break;
//!     }
//!     std::thread::sleep(std::time::Duration::from_millis(20));
//! }
//! println!("traveled {} mm", roomba.distance_mm()?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`protocol`]: pure encode/decode - commands, telemetry frames, the
//!   sensor id table. No I/O, no state.
//! - [`transport`]: the byte-stream boundary ([`transport::Transport`]),
//!   with serial and mock implementations.
//! - [`Roomba`]: the facade. Commands run on the caller's thread; one
//!   background reader thread feeds the sensor cache and odometry.
//!
//! Exactly two threads ever touch shared state, and the reader only writes
//! telemetry, so callers never block behind it for longer than one short
//! read slice.

pub mod cache;
pub mod config;
pub mod error;
pub mod mode;
pub mod odometry;
pub mod protocol;
pub mod roomba;
mod stream;
pub mod transport;

// Re-export commonly used types
pub use cache::SensorCache;
pub use config::RoombaConfig;
pub use error::{Error, Result};
pub use mode::Mode;
pub use odometry::{wrap16_delta, OdometryTracker, Pose};
pub use protocol::{BrushMotor, Command, DriveRadius, SensorFrame, SensorId};
pub use roomba::{ButtonState, ChargingState, Roomba};
pub use stream::StreamState;
