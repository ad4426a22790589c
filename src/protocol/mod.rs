//! Open Interface wire protocol
//!
//! Pure encode/decode for the serial protocol: command serialization with
//! range validation, telemetry frame parsing with checksum verification, and
//! the fixed sensor id table. Nothing in this module touches a port or holds
//! state across calls.

pub mod constants;

mod command;
mod frame;
mod sensors;

pub use command::{BrushMotor, Command, DriveRadius};
pub use frame::{encode_frame, parse_frame, FrameParse, SensorFrame};
pub use sensors::SensorId;
