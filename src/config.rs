//! Configuration for the Roomba OI driver
//!
//! Loads configuration from a TOML file; compiled-in defaults match the
//! 500-series hardware so most callers never need a file at all.

use crate::error::Result;
use crate::protocol::SensorId;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Encoder ticks per wheel revolution (500-series gearbox).
const TICKS_PER_REVOLUTION: f64 = 508.8;

/// Drive wheel diameter in millimeters.
const WHEEL_DIAMETER_MM: f64 = 72.0;

/// Distance between the drive wheels in millimeters.
const WHEEL_BASE_MM: f64 = 235.0;

/// Top-level driver configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RoombaConfig {
    pub serial: SerialConfig,
    pub kinematics: KinematicsConfig,
    pub stream: StreamConfig,
}

/// Serial link configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SerialConfig {
    /// Baud rate of the mini-DIN link (500 series default 115200)
    pub baud_rate: u32,
}

/// Differential-drive geometry used by the odometry integrator
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KinematicsConfig {
    /// Distance between the drive wheels in mm
    pub wheel_base_mm: f64,
    /// Wheel travel per encoder tick in mm
    pub mm_per_tick: f64,
}

/// Sensor streaming configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StreamConfig {
    /// Sensors requested when a stream is started without an explicit list
    pub sensors: Vec<SensorId>,
}

impl RoombaConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: RoombaConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Defaults for 500-series hardware
    pub fn roomba500_defaults() -> Self {
        Self {
            serial: SerialConfig { baud_rate: 115_200 },
            kinematics: KinematicsConfig {
                wheel_base_mm: WHEEL_BASE_MM,
                mm_per_tick: std::f64::consts::PI * WHEEL_DIAMETER_MM / TICKS_PER_REVOLUTION,
            },
            stream: StreamConfig {
                sensors: vec![
                    SensorId::BumpsAndWheelDrops,
                    SensorId::Wall,
                    SensorId::CliffLeft,
                    SensorId::CliffFrontLeft,
                    SensorId::CliffFrontRight,
                    SensorId::CliffRight,
                    SensorId::VirtualWall,
                    SensorId::WheelOvercurrents,
                    SensorId::DirtDetect,
                    SensorId::Buttons,
                    SensorId::Distance,
                    SensorId::Angle,
                    SensorId::ChargingState,
                    SensorId::Voltage,
                    SensorId::Current,
                    SensorId::Temperature,
                    SensorId::BatteryCharge,
                    SensorId::BatteryCapacity,
                    SensorId::OiMode,
                    SensorId::LeftEncoderCounts,
                    SensorId::RightEncoderCounts,
                ],
            },
        }
    }
}

impl Default for RoombaConfig {
    fn default() -> Self {
        Self::roomba500_defaults()
    }
}
