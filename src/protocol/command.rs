//! Outbound command encoding
//!
//! Every OI command is an opcode byte plus a fixed payload. Encoding is a
//! pure transform: numeric fields are range-checked first and nothing is
//! produced for a rejected command, so a failed call never leaves a partial
//! command on the wire.

use super::constants::*;
use super::sensors::SensorId;
use crate::error::{Error, Result};

/// Turn radius argument of the `Drive` command.
///
/// `Curve` carries the documented mm range; the remaining variants map to
/// the special radius codes the protocol reserves for driving straight and
/// spinning in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveRadius {
    /// Turn radius in mm, negative toward the right wheel. [-2000, 2000]
    Curve(i16),
    Straight,
    SpinClockwise,
    SpinCounterClockwise,
}

impl DriveRadius {
    fn wire_value(self) -> Result<u16> {
        match self {
            DriveRadius::Curve(mm) => {
                check_range("turn radius (mm)", mm as i32, RADIUS_MIN as i32, RADIUS_MAX as i32)?;
                Ok(mm as u16)
            }
            DriveRadius::Straight => Ok(RADIUS_STRAIGHT),
            DriveRadius::SpinClockwise => Ok(RADIUS_SPIN_CW),
            DriveRadius::SpinCounterClockwise => Ok(RADIUS_SPIN_CCW),
        }
    }
}

/// Rotation state of a brush motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrushMotor {
    Off,
    /// Default rotation direction.
    Forward,
    /// Reversed rotation direction.
    Reverse,
}

/// One OI command with its payload fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    SafeMode,
    FullMode,
    Power,
    Spot,
    Clean,
    Max,
    SeekDock,
    Drive {
        /// Translation velocity in mm/s. [-500, 500]
        velocity: i16,
        radius: DriveRadius,
    },
    DriveDirect {
        /// Right wheel velocity in mm/s. [-500, 500]
        right: i16,
        /// Left wheel velocity in mm/s. [-500, 500]
        left: i16,
    },
    DrivePwm {
        /// Right wheel PWM. [-255, 255]
        right: i16,
        /// Left wheel PWM. [-255, 255]
        left: i16,
    },
    Motors {
        main_brush: BrushMotor,
        side_brush: BrushMotor,
        vacuum: bool,
    },
    Leds {
        /// OR of the `LED_*` bits.
        bits: u8,
        /// Power button color, 0 green through 255 red.
        color: u8,
        /// Power button intensity, 0 off through 255 full.
        intensity: u8,
    },
    StreamStart(Vec<SensorId>),
    StreamPause,
    StreamResume,
}

impl Command {
    /// Serialize to wire bytes. Total and deterministic for in-range fields;
    /// an out-of-range field fails with `InvalidArgument` before any byte is
    /// produced.
    pub fn encode(&self) -> Result<Vec<u8>> {
        match self {
            Command::Start => Ok(vec![OP_START]),
            Command::SafeMode => Ok(vec![OP_SAFE]),
            Command::FullMode => Ok(vec![OP_FULL]),
            Command::Power => Ok(vec![OP_POWER]),
            Command::Spot => Ok(vec![OP_SPOT]),
            Command::Clean => Ok(vec![OP_CLEAN]),
            Command::Max => Ok(vec![OP_MAX]),
            Command::SeekDock => Ok(vec![OP_SEEK_DOCK]),

            Command::Drive { velocity, radius } => {
                check_velocity("velocity (mm/s)", *velocity)?;
                let radius = radius.wire_value()?;
                let mut out = Vec::with_capacity(5);
                out.push(OP_DRIVE);
                out.extend_from_slice(&velocity.to_be_bytes());
                out.extend_from_slice(&radius.to_be_bytes());
                Ok(out)
            }

            Command::DriveDirect { right, left } => {
                check_velocity("right wheel velocity (mm/s)", *right)?;
                check_velocity("left wheel velocity (mm/s)", *left)?;
                let mut out = Vec::with_capacity(5);
                out.push(OP_DRIVE_DIRECT);
                out.extend_from_slice(&right.to_be_bytes());
                out.extend_from_slice(&left.to_be_bytes());
                Ok(out)
            }

            Command::DrivePwm { right, left } => {
                check_range("right wheel PWM", *right as i32, PWM_MIN as i32, PWM_MAX as i32)?;
                check_range("left wheel PWM", *left as i32, PWM_MIN as i32, PWM_MAX as i32)?;
                let mut out = Vec::with_capacity(5);
                out.push(OP_DRIVE_PWM);
                out.extend_from_slice(&right.to_be_bytes());
                out.extend_from_slice(&left.to_be_bytes());
                Ok(out)
            }

            Command::Motors {
                main_brush,
                side_brush,
                vacuum,
            } => {
                let mut bits = 0u8;
                match main_brush {
                    BrushMotor::Off => {}
                    BrushMotor::Forward => bits |= MOTOR_MAIN_BRUSH,
                    BrushMotor::Reverse => bits |= MOTOR_MAIN_BRUSH | MOTOR_MAIN_BRUSH_OPPOSITE,
                }
                match side_brush {
                    BrushMotor::Off => {}
                    BrushMotor::Forward => bits |= MOTOR_SIDE_BRUSH,
                    BrushMotor::Reverse => bits |= MOTOR_SIDE_BRUSH | MOTOR_SIDE_BRUSH_OPPOSITE,
                }
                if *vacuum {
                    bits |= MOTOR_VACUUM;
                }
                Ok(vec![OP_MOTORS, bits])
            }

            Command::Leds {
                bits,
                color,
                intensity,
            } => Ok(vec![OP_LEDS, *bits, *color, *intensity]),

            Command::StreamStart(sensors) => {
                if sensors.is_empty() {
                    return Err(Error::InvalidArgument(
                        "sensor stream list is empty".to_string(),
                    ));
                }
                if sensors.len() > u8::MAX as usize {
                    return Err(Error::InvalidArgument(format!(
                        "sensor stream list has {} entries, max 255",
                        sensors.len()
                    )));
                }
                let mut out = Vec::with_capacity(2 + sensors.len());
                out.push(OP_STREAM);
                out.push(sensors.len() as u8);
                out.extend(sensors.iter().map(|id| id.as_u8()));
                Ok(out)
            }

            Command::StreamPause => Ok(vec![OP_PAUSE_RESUME_STREAM, 0]),
            Command::StreamResume => Ok(vec![OP_PAUSE_RESUME_STREAM, 1]),
        }
    }
}

fn check_velocity(field: &str, value: i16) -> Result<()> {
    check_range(field, value as i32, VELOCITY_MIN as i32, VELOCITY_MAX as i32)
}

fn check_range(field: &str, value: i32, min: i32, max: i32) -> Result<()> {
    if value < min || value > max {
        return Err(Error::InvalidArgument(format!(
            "{field} {value} out of range [{min}, {max}]"
        )));
    }
    Ok(())
}
