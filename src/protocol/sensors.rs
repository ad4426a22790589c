//! Sensor packet identifiers and their wire widths
//!
//! The OI streams each sensor as its packet id followed by a 1- or 2-byte
//! big-endian value. The width and signedness per id are fixed by the
//! protocol, so the table is a closed enum: an id the enum does not carry is
//! unparseable (the payload cannot be split past it) and invalidates the
//! whole frame.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sensor packet ids of the 500-series OI (group packets 0-6 excluded;
/// streaming uses the single-sensor ids).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SensorId {
    BumpsAndWheelDrops = 7,
    Wall = 8,
    CliffLeft = 9,
    CliffFrontLeft = 10,
    CliffFrontRight = 11,
    CliffRight = 12,
    VirtualWall = 13,
    WheelOvercurrents = 14,
    DirtDetect = 15,
    InfraredCharOmni = 17,
    Buttons = 18,
    Distance = 19,
    Angle = 20,
    ChargingState = 21,
    Voltage = 22,
    Current = 23,
    Temperature = 24,
    BatteryCharge = 25,
    BatteryCapacity = 26,
    WallSignal = 27,
    CliffLeftSignal = 28,
    CliffFrontLeftSignal = 29,
    CliffFrontRightSignal = 30,
    CliffRightSignal = 31,
    ChargingSources = 34,
    OiMode = 35,
    SongNumber = 36,
    SongPlaying = 37,
    StreamPacketCount = 38,
    RequestedVelocity = 39,
    RequestedRadius = 40,
    RequestedRightVelocity = 41,
    RequestedLeftVelocity = 42,
    LeftEncoderCounts = 43,
    RightEncoderCounts = 44,
    LightBumper = 45,
    LightBumpLeftSignal = 46,
    LightBumpFrontLeftSignal = 47,
    LightBumpCenterLeftSignal = 48,
    LightBumpCenterRightSignal = 49,
    LightBumpFrontRightSignal = 50,
    LightBumpRightSignal = 51,
    InfraredCharLeft = 52,
    InfraredCharRight = 53,
    LeftMotorCurrent = 54,
    RightMotorCurrent = 55,
    MainBrushMotorCurrent = 56,
    SideBrushMotorCurrent = 57,
    Stasis = 58,
}

impl SensorId {
    /// Look up an id from its wire byte. `None` for ids the protocol
    /// generation does not define (including the reserved ids 16, 32, 33).
    pub fn from_u8(raw: u8) -> Option<Self> {
        use SensorId::*;
        Some(match raw {
            7 => BumpsAndWheelDrops,
            8 => Wall,
            9 => CliffLeft,
            10 => CliffFrontLeft,
            11 => CliffFrontRight,
            12 => CliffRight,
            13 => VirtualWall,
            14 => WheelOvercurrents,
            15 => DirtDetect,
            17 => InfraredCharOmni,
            18 => Buttons,
            19 => Distance,
            20 => Angle,
            21 => ChargingState,
            22 => Voltage,
            23 => Current,
            24 => Temperature,
            25 => BatteryCharge,
            26 => BatteryCapacity,
            27 => WallSignal,
            28 => CliffLeftSignal,
            29 => CliffFrontLeftSignal,
            30 => CliffFrontRightSignal,
            31 => CliffRightSignal,
            34 => ChargingSources,
            35 => OiMode,
            36 => SongNumber,
            37 => SongPlaying,
            38 => StreamPacketCount,
            39 => RequestedVelocity,
            40 => RequestedRadius,
            41 => RequestedRightVelocity,
            42 => RequestedLeftVelocity,
            43 => LeftEncoderCounts,
            44 => RightEncoderCounts,
            45 => LightBumper,
            46 => LightBumpLeftSignal,
            47 => LightBumpFrontLeftSignal,
            48 => LightBumpCenterLeftSignal,
            49 => LightBumpCenterRightSignal,
            50 => LightBumpFrontRightSignal,
            51 => LightBumpRightSignal,
            52 => InfraredCharLeft,
            53 => InfraredCharRight,
            54 => LeftMotorCurrent,
            55 => RightMotorCurrent,
            56 => MainBrushMotorCurrent,
            57 => SideBrushMotorCurrent,
            58 => Stasis,
            _ => return None,
        })
    }

    /// Wire byte of this id.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Value width on the wire: 1 or 2 bytes.
    pub fn width(self) -> usize {
        use SensorId::*;
        match self {
            Distance | Angle | Voltage | Current | BatteryCharge | BatteryCapacity | WallSignal
            | CliffLeftSignal | CliffFrontLeftSignal | CliffFrontRightSignal | CliffRightSignal
            | RequestedVelocity | RequestedRadius | RequestedRightVelocity
            | RequestedLeftVelocity | LeftEncoderCounts | RightEncoderCounts
            | LightBumpLeftSignal | LightBumpFrontLeftSignal | LightBumpCenterLeftSignal
            | LightBumpCenterRightSignal | LightBumpFrontRightSignal | LightBumpRightSignal
            | LeftMotorCurrent | RightMotorCurrent | MainBrushMotorCurrent
            | SideBrushMotorCurrent => 2,
            _ => 1,
        }
    }

    /// Whether the wire value is two's-complement signed.
    pub fn is_signed(self) -> bool {
        use SensorId::*;
        matches!(
            self,
            Distance
                | Angle
                | Current
                | Temperature
                | RequestedVelocity
                | RequestedRadius
                | RequestedRightVelocity
                | RequestedLeftVelocity
                | LeftMotorCurrent
                | RightMotorCurrent
                | MainBrushMotorCurrent
                | SideBrushMotorCurrent
        )
    }

    /// Whether this sensor reports per-frame deltas that the cache sums up
    /// until the caller takes them (distance and angle).
    pub fn is_accumulating(self) -> bool {
        matches!(self, SensorId::Distance | SensorId::Angle)
    }

    /// Decode a wire value of `width()` bytes into a widened raw value.
    pub fn decode(self, bytes: &[u8]) -> i32 {
        debug_assert_eq!(bytes.len(), self.width());
        match (self.width(), self.is_signed()) {
            (1, false) => bytes[0] as i32,
            (1, true) => bytes[0] as i8 as i32,
            (2, false) => u16::from_be_bytes([bytes[0], bytes[1]]) as i32,
            (2, true) => i16::from_be_bytes([bytes[0], bytes[1]]) as i32,
            _ => unreachable!("sensor widths are 1 or 2 bytes"),
        }
    }

    /// Encode a raw value back to its wire bytes (big-endian for 2-byte
    /// sensors). Used to build telemetry frames in tests and simulations.
    pub fn encode_value(self, value: i32, out: &mut Vec<u8>) {
        match self.width() {
            1 => out.push(value as u8),
            _ => out.extend_from_slice(&(value as u16).to_be_bytes()),
        }
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
