//! Roomba facade
//!
//! The public driver object: owns the transport, the tracked control mode,
//! the shared telemetry (sensor cache + odometry), and the stream reader
//! thread. Commands are issued from the caller's thread only; the reader
//! thread only writes telemetry, so the two sides never contend beyond one
//! short read slice on the transport lock.

use crate::cache::SensorCache;
use crate::config::RoombaConfig;
use crate::error::{Error, Result};
use crate::mode::{Mode, ModeTracker};
use crate::odometry::{OdometryTracker, Pose};
use crate::protocol::constants::*;
use crate::protocol::{BrushMotor, Command, DriveRadius, SensorId};
use crate::stream::{reader_loop, StreamShared, StreamState, Telemetry};
use crate::transport::{SerialTransport, Transport};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Battery charging state reported by the `ChargingState` sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargingState {
    NotCharging,
    ReconditioningCharging,
    FullCharging,
    TrickleCharging,
    Waiting,
    ChargingFault,
}

impl ChargingState {
    fn from_raw(raw: i32) -> Option<Self> {
        Some(match raw {
            0 => ChargingState::NotCharging,
            1 => ChargingState::ReconditioningCharging,
            2 => ChargingState::FullCharging,
            3 => ChargingState::TrickleCharging,
            4 => ChargingState::Waiting,
            5 => ChargingState::ChargingFault,
            _ => return None,
        })
    }
}

/// Snapshot of the `Buttons` sensor byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonState {
    raw: u8,
}

impl ButtonState {
    pub fn raw(self) -> u8 {
        self.raw
    }
    pub fn clean(self) -> bool {
        self.raw & BUTTON_CLEAN != 0
    }
    pub fn spot(self) -> bool {
        self.raw & BUTTON_SPOT != 0
    }
    pub fn dock(self) -> bool {
        self.raw & BUTTON_DOCK != 0
    }
    pub fn minute(self) -> bool {
        self.raw & BUTTON_MINUTE != 0
    }
    pub fn hour(self) -> bool {
        self.raw & BUTTON_HOUR != 0
    }
    pub fn day(self) -> bool {
        self.raw & BUTTON_DAY != 0
    }
    pub fn schedule(self) -> bool {
        self.raw & BUTTON_SCHEDULE != 0
    }
    pub fn clock(self) -> bool {
        self.raw & BUTTON_CLOCK != 0
    }
}

/// Shadow of the last LEDs command, so the per-LED setters can flip one
/// bit and resend the rest unchanged.
struct LedState {
    bits: u8,
    intensity: u8,
    color: u8,
}

impl Default for LedState {
    fn default() -> Self {
        Self {
            bits: 0,
            intensity: 0,
            color: LED_COLOR_DEFAULT,
        }
    }
}

/// Driver for one robot on one serial port.
///
/// # Examples
///
/// ```no_run
/// use roomba_oi::Roomba;
///
/// # fn main() -> roomba_oi::Result<()> {
/// let mut roomba = Roomba::open("/dev/ttyUSB0")?;
/// roomba.start()?;
/// roomba.safe_control()?;
/// roomba.start_sensor_stream(&[])?;
///
/// roomba.drive_direct(150, 150)?;
/// if roomba.is_left_bump().unwrap_or(false) {
///     roomba.stop()?;
/// }
/// println!("pose: {:?}", roomba.pose());
/// # Ok(())
/// # }
/// ```
pub struct Roomba {
    /// Shared with the reader thread; commands write under short locks
    transport: Arc<Mutex<Box<dyn Transport>>>,

    /// Mode implied by the last mode-setting command
    mode: Mutex<ModeTracker>,

    /// Sensor cache + odometry, updated per frame by the reader
    telemetry: Arc<Mutex<Telemetry>>,

    /// Stream lifecycle flags shared with the reader
    stream: Arc<StreamShared>,

    /// Reader thread handle - joined on close
    reader_handle: Option<JoinHandle<()>>,

    /// Last LEDs command sent
    leds: Mutex<LedState>,

    config: RoombaConfig,
}

impl Roomba {
    // === Constructors ===

    /// Open the robot on a serial port with default 500-series settings.
    pub fn open(port: &str) -> Result<Self> {
        Self::open_with_config(port, RoombaConfig::default())
    }

    /// Open with explicit configuration (baud rate, kinematics, default
    /// stream sensor list).
    pub fn open_with_config(port: &str, config: RoombaConfig) -> Result<Self> {
        let transport = SerialTransport::open(port, config.serial.baud_rate)?;
        Ok(Self::with_transport(Box::new(transport), config))
    }

    /// Build the driver over an already-open transport. This is how tests
    /// and simulations drive the full stack without hardware.
    pub fn with_transport(transport: Box<dyn Transport>, config: RoombaConfig) -> Self {
        Self {
            transport: Arc::new(Mutex::new(transport)),
            mode: Mutex::new(ModeTracker::new()),
            telemetry: Arc::new(Mutex::new(Telemetry {
                cache: SensorCache::new(),
                odometry: OdometryTracker::new(config.kinematics.clone()),
            })),
            stream: Arc::new(StreamShared::new()),
            reader_handle: None,
            leds: Mutex::new(LedState::default()),
            config,
        }
    }

    // === Mode transitions ===

    /// Wake the OI: Off -> Passive. Must be the first command after opening
    /// the port or powering the robot on.
    pub fn start(&self) -> Result<()> {
        self.send(&Command::Start)?;
        self.mode.lock().transition_to(Mode::Passive);
        Ok(())
    }

    /// Enter Safe mode: full control, but cliffs, wheel drops and the
    /// charger cable still stop the robot (dropping it back to Passive on
    /// the device side, which this driver does not observe).
    pub fn safe_control(&self) -> Result<()> {
        self.mode.lock().assert_powered()?;
        self.send(&Command::SafeMode)?;
        self.mode.lock().transition_to(Mode::Safe);
        Ok(())
    }

    /// Enter Full mode: all safety features off.
    pub fn full_control(&self) -> Result<()> {
        self.mode.lock().assert_powered()?;
        self.send(&Command::FullMode)?;
        self.mode.lock().transition_to(Mode::Full);
        Ok(())
    }

    /// Power the robot down to sleep.
    pub fn power_down(&self) -> Result<()> {
        self.mode.lock().assert_powered()?;
        self.send(&Command::Power)?;
        self.mode.lock().transition_to(Mode::PowerDown);
        Ok(())
    }

    /// Mode implied by the last mode-setting command issued. Not a device
    /// read-back; see [`Roomba::reported_oi_mode`] for the robot's own view.
    pub fn mode(&self) -> Mode {
        self.mode.lock().current()
    }

    // === Cleaning behaviors ===

    /// Start a default cleaning pass.
    pub fn clean(&self) -> Result<()> {
        self.behavior(Command::Clean, Mode::Clean)
    }

    /// Start a spot-cleaning pattern.
    pub fn spot_clean(&self) -> Result<()> {
        self.behavior(Command::Spot, Mode::Spot)
    }

    /// Clean until the battery dies.
    pub fn max_clean(&self) -> Result<()> {
        self.behavior(Command::Max, Mode::Max)
    }

    /// Drive to the charging dock.
    pub fn dock(&self) -> Result<()> {
        self.behavior(Command::SeekDock, Mode::Dock)
    }

    fn behavior(&self, command: Command, mode: Mode) -> Result<()> {
        self.mode.lock().assert_powered()?;
        self.send(&command)?;
        self.mode.lock().transition_to(mode);
        Ok(())
    }

    // === Locomotion (requires Safe or Full) ===

    /// Drive along a curve: translation velocity in mm/s [-500, 500], turn
    /// radius in mm [-2000, 2000] (negative turns toward the right wheel).
    pub fn drive(&self, velocity_mm_s: i16, radius_mm: i16) -> Result<()> {
        self.motion(Command::Drive {
            velocity: velocity_mm_s,
            radius: DriveRadius::Curve(radius_mm),
        })
    }

    /// Drive straight at `velocity_mm_s` mm/s [-500, 500].
    pub fn drive_straight(&self, velocity_mm_s: i16) -> Result<()> {
        self.motion(Command::Drive {
            velocity: velocity_mm_s,
            radius: DriveRadius::Straight,
        })
    }

    /// Spin in place at `velocity_mm_s` wheel speed [-500, 500].
    pub fn spin_in_place(&self, velocity_mm_s: i16, clockwise: bool) -> Result<()> {
        let radius = if clockwise {
            DriveRadius::SpinClockwise
        } else {
            DriveRadius::SpinCounterClockwise
        };
        self.motion(Command::Drive {
            velocity: velocity_mm_s,
            radius,
        })
    }

    /// Drive each wheel directly, right then left, mm/s [-500, 500].
    pub fn drive_direct(&self, right_mm_s: i16, left_mm_s: i16) -> Result<()> {
        self.motion(Command::DriveDirect {
            right: right_mm_s,
            left: left_mm_s,
        })
    }

    /// Drive each wheel with raw PWM, right then left [-255, 255].
    pub fn drive_pwm(&self, right_pwm: i16, left_pwm: i16) -> Result<()> {
        self.motion(Command::DrivePwm {
            right: right_pwm,
            left: left_pwm,
        })
    }

    /// Stop both wheels.
    pub fn stop(&self) -> Result<()> {
        self.drive_direct(0, 0)
    }

    /// Run the brush and vacuum motors.
    pub fn drive_motors(
        &self,
        main_brush: BrushMotor,
        side_brush: BrushMotor,
        vacuum: bool,
    ) -> Result<()> {
        self.motion(Command::Motors {
            main_brush,
            side_brush,
            vacuum,
        })
    }

    fn motion(&self, command: Command) -> Result<()> {
        self.mode.lock().assert_at_least(Mode::Safe)?;
        self.send(&command)
    }

    // === LEDs (no mode precondition) ===

    /// Set the whole LED state at once: `bits` is an OR of the `LED_*`
    /// constants; `intensity` and `color` drive the Clean/Power button
    /// (color 0 green through 255 red).
    pub fn set_leds(&self, bits: u8, intensity: u8, color: u8) -> Result<()> {
        let mut leds = self.leds.lock();
        leds.bits = bits;
        leds.intensity = intensity;
        leds.color = color;
        self.send_leds(&leds)
    }

    /// Light or clear the debris LED.
    pub fn set_debris_led(&self, on: bool) -> Result<()> {
        self.set_led_bit(LED_DEBRIS, on)
    }

    /// Light or clear the spot LED.
    pub fn set_spot_led(&self, on: bool) -> Result<()> {
        self.set_led_bit(LED_SPOT, on)
    }

    /// Light or clear the dock LED.
    pub fn set_dock_led(&self, on: bool) -> Result<()> {
        self.set_led_bit(LED_DOCK, on)
    }

    /// Light or clear the check-robot LED.
    pub fn set_check_robot_led(&self, on: bool) -> Result<()> {
        self.set_led_bit(LED_CHECK_ROBOT, on)
    }

    /// Set the Clean/Power button color (0 green through 255 red) and
    /// intensity, leaving the other LEDs as last commanded.
    pub fn set_power_button_led(&self, color: u8, intensity: u8) -> Result<()> {
        let mut leds = self.leds.lock();
        leds.color = color;
        leds.intensity = intensity;
        self.send_leds(&leds)
    }

    fn set_led_bit(&self, bit: u8, on: bool) -> Result<()> {
        let mut leds = self.leds.lock();
        if on {
            leds.bits |= bit;
        } else {
            leds.bits &= !bit;
        }
        self.send_leds(&leds)
    }

    fn send_leds(&self, leds: &LedState) -> Result<()> {
        self.send(&Command::Leds {
            bits: leds.bits,
            color: leds.color,
            intensity: leds.intensity,
        })
    }

    // === Sensor streaming ===

    /// Ask the robot to stream `sensors` every 15 ms and start (or restart)
    /// the reader thread. An empty slice requests the configured default
    /// list.
    pub fn start_sensor_stream(&mut self, sensors: &[SensorId]) -> Result<()> {
        self.mode.lock().assert_powered()?;
        let list = if sensors.is_empty() {
            self.config.stream.sensors.clone()
        } else {
            sensors.to_vec()
        };
        self.send(&Command::StreamStart(list))?;

        // Reap a reader that died on a transport error before respawning.
        if self.stream.state() == StreamState::Stopped {
            if let Some(handle) = self.reader_handle.take() {
                let _ = handle.join();
            }
        }
        self.stream.reset();

        if self.reader_handle.is_none() {
            let transport = Arc::clone(&self.transport);
            let shared = Arc::clone(&self.stream);
            let telemetry = Arc::clone(&self.telemetry);
            let handle = thread::Builder::new()
                .name("oi-stream-reader".to_string())
                .spawn(move || reader_loop(transport, shared, telemetry))
                .map_err(Error::Io)?;
            self.reader_handle = Some(handle);
            log::info!("Sensor stream started");
        }
        Ok(())
    }

    /// Tell the robot to pause the stream and stop processing frames. The
    /// reader thread stays up, so resuming is instantaneous.
    pub fn suspend_sensor_stream(&self) -> Result<()> {
        self.send(&Command::StreamPause)?;
        if self.reader_running() {
            self.stream.set_state(StreamState::Paused);
        }
        Ok(())
    }

    /// Resume a suspended stream.
    pub fn resume_sensor_stream(&self) -> Result<()> {
        self.send(&Command::StreamResume)?;
        if self.reader_running() {
            self.stream.set_state(StreamState::Streaming);
        } else {
            log::warn!("Resume requested but the sensor stream was never started");
        }
        Ok(())
    }

    /// Current stream lifecycle state. `Stopped` after a reader-side
    /// transport failure; cached sensor values stay readable (stale) until
    /// the stream is started again.
    pub fn stream_state(&self) -> StreamState {
        self.stream.state()
    }

    /// Frames dropped so far to checksum mismatches or unknown ids.
    pub fn corrupt_frame_count(&self) -> u64 {
        self.stream.corrupt_frames()
    }

    fn reader_running(&self) -> bool {
        self.reader_handle.is_some() && self.stream.state() != StreamState::Stopped
    }

    // === Typed sensor accessors ===

    /// Latest raw value of any streamed sensor.
    pub fn sensor(&self, id: SensorId) -> Result<i32> {
        self.telemetry.lock().cache.get(id)
    }

    pub fn is_right_bump(&self) -> Result<bool> {
        self.flag(SensorId::BumpsAndWheelDrops, BUMP_RIGHT)
    }

    pub fn is_left_bump(&self) -> Result<bool> {
        self.flag(SensorId::BumpsAndWheelDrops, BUMP_LEFT)
    }

    pub fn is_right_wheel_dropped(&self) -> Result<bool> {
        self.flag(SensorId::BumpsAndWheelDrops, WHEEL_DROP_RIGHT)
    }

    pub fn is_left_wheel_dropped(&self) -> Result<bool> {
        self.flag(SensorId::BumpsAndWheelDrops, WHEEL_DROP_LEFT)
    }

    pub fn is_cliff_left(&self) -> Result<bool> {
        Ok(self.sensor(SensorId::CliffLeft)? != 0)
    }

    pub fn is_cliff_front_left(&self) -> Result<bool> {
        Ok(self.sensor(SensorId::CliffFrontLeft)? != 0)
    }

    pub fn is_cliff_front_right(&self) -> Result<bool> {
        Ok(self.sensor(SensorId::CliffFrontRight)? != 0)
    }

    pub fn is_cliff_right(&self) -> Result<bool> {
        Ok(self.sensor(SensorId::CliffRight)? != 0)
    }

    pub fn is_virtual_wall(&self) -> Result<bool> {
        Ok(self.sensor(SensorId::VirtualWall)? != 0)
    }

    pub fn is_right_wheel_overcurrent(&self) -> Result<bool> {
        self.flag(SensorId::WheelOvercurrents, OVERCURRENT_RIGHT_WHEEL)
    }

    pub fn is_left_wheel_overcurrent(&self) -> Result<bool> {
        self.flag(SensorId::WheelOvercurrents, OVERCURRENT_LEFT_WHEEL)
    }

    pub fn is_main_brush_overcurrent(&self) -> Result<bool> {
        self.flag(SensorId::WheelOvercurrents, OVERCURRENT_MAIN_BRUSH)
    }

    pub fn is_side_brush_overcurrent(&self) -> Result<bool> {
        self.flag(SensorId::WheelOvercurrents, OVERCURRENT_SIDE_BRUSH)
    }

    /// Dirt sensor level, 0-255.
    pub fn dirt_detect(&self) -> Result<u8> {
        Ok(self.sensor(SensorId::DirtDetect)? as u8)
    }

    /// IR character seen by the omnidirectional receiver; 0 means none.
    pub fn infrared_char_omni(&self) -> Result<u8> {
        Ok(self.sensor(SensorId::InfraredCharOmni)? as u8)
    }

    /// IR character seen by the left receiver; 0 means none.
    pub fn infrared_char_left(&self) -> Result<u8> {
        Ok(self.sensor(SensorId::InfraredCharLeft)? as u8)
    }

    /// IR character seen by the right receiver; 0 means none.
    pub fn infrared_char_right(&self) -> Result<u8> {
        Ok(self.sensor(SensorId::InfraredCharRight)? as u8)
    }

    /// Panel button states.
    pub fn buttons(&self) -> Result<ButtonState> {
        Ok(ButtonState {
            raw: self.sensor(SensorId::Buttons)? as u8,
        })
    }

    /// Distance traveled in mm since the last call (average of both
    /// wheels; accumulated across frames, then zeroed by this read).
    pub fn distance_mm(&self) -> Result<i32> {
        self.telemetry.lock().cache.take_accumulated(SensorId::Distance)
    }

    /// Angle turned in degrees since the last call, counter-clockwise
    /// positive (accumulated across frames, then zeroed by this read).
    pub fn angle_degrees(&self) -> Result<i32> {
        self.telemetry.lock().cache.take_accumulated(SensorId::Angle)
    }

    /// Battery charging state.
    pub fn charging_state(&self) -> Result<ChargingState> {
        let raw = self.sensor(SensorId::ChargingState)?;
        ChargingState::from_raw(raw).ok_or_else(|| {
            Error::InvalidArgument(format!("unrecognized charging state {raw}"))
        })
    }

    /// Battery voltage in mV.
    pub fn voltage_mv(&self) -> Result<u16> {
        Ok(self.sensor(SensorId::Voltage)? as u16)
    }

    /// Battery current in mA; negative while discharging.
    pub fn current_ma(&self) -> Result<i16> {
        Ok(self.sensor(SensorId::Current)? as i16)
    }

    /// Battery temperature in degrees Celsius.
    pub fn temperature_c(&self) -> Result<i8> {
        Ok(self.sensor(SensorId::Temperature)? as i8)
    }

    /// Battery charge in mAh.
    pub fn battery_charge_mah(&self) -> Result<u16> {
        Ok(self.sensor(SensorId::BatteryCharge)? as u16)
    }

    /// Battery capacity in mAh.
    pub fn battery_capacity_mah(&self) -> Result<u16> {
        Ok(self.sensor(SensorId::BatteryCapacity)? as u16)
    }

    /// Control mode as reported by the robot itself. This is the ground
    /// truth the tracked [`Roomba::mode`] intent can drift from when a
    /// safety trip drops the robot to Passive.
    pub fn reported_oi_mode(&self) -> Result<Mode> {
        match self.sensor(SensorId::OiMode)? {
            0 => Ok(Mode::Off),
            1 => Ok(Mode::Passive),
            2 => Ok(Mode::Safe),
            3 => Ok(Mode::Full),
            raw => Err(Error::InvalidArgument(format!(
                "unrecognized OI mode byte {raw}"
            ))),
        }
    }

    /// Most recent velocity requested of the drive system, mm/s.
    pub fn requested_velocity_mm_s(&self) -> Result<i16> {
        Ok(self.sensor(SensorId::RequestedVelocity)? as i16)
    }

    /// Most recent turn radius requested of the drive system, mm.
    pub fn requested_radius_mm(&self) -> Result<i16> {
        Ok(self.sensor(SensorId::RequestedRadius)? as i16)
    }

    /// Raw right wheel encoder count (wrapping 16-bit).
    pub fn right_encoder_counts(&self) -> Result<u16> {
        Ok(self.sensor(SensorId::RightEncoderCounts)? as u16)
    }

    /// Raw left wheel encoder count (wrapping 16-bit).
    pub fn left_encoder_counts(&self) -> Result<u16> {
        Ok(self.sensor(SensorId::LeftEncoderCounts)? as u16)
    }

    fn flag(&self, id: SensorId, mask: u8) -> Result<bool> {
        Ok(self.sensor(id)? as u8 & mask != 0)
    }

    // === Pose ===

    /// Integrated pose since construction or the last reset.
    pub fn pose(&self) -> Pose {
        self.telemetry.lock().odometry.pose()
    }

    /// X position in mm (forward at the starting heading).
    pub fn x_mm(&self) -> f64 {
        self.pose().x_mm
    }

    /// Y position in mm (left of the starting heading).
    pub fn y_mm(&self) -> f64 {
        self.pose().y_mm
    }

    /// Heading in radians, counter-clockwise positive.
    pub fn heading_rad(&self) -> f64 {
        self.pose().heading_rad
    }

    /// Zero the pose and drop encoder history.
    pub fn reset_odometry(&self) {
        self.telemetry.lock().odometry.reset();
    }

    // === Lifecycle ===

    /// Stop the stream reader and pause the device-side stream. The serial
    /// port stays open until the driver is dropped.
    pub fn close(&mut self) -> Result<()> {
        if self.reader_running() {
            // Best effort: the robot keeps streaming into a closed ear
            // otherwise, which costs nothing but serial bandwidth.
            if let Err(e) = self.send(&Command::StreamPause) {
                log::warn!("Could not pause stream during close: {}", e);
            }
        }
        self.stream.request_shutdown();
        if let Some(handle) = self.reader_handle.take() {
            // Reads are timeout-bounded, so the reader observes the flag
            // within one slice and the join cannot hang.
            handle.join().map_err(|_| {
                Error::Io(std::io::Error::other("stream reader thread panicked"))
            })?;
        }
        self.stream.set_state(StreamState::Stopped);
        Ok(())
    }

    /// Encode and write one command. Range validation happens inside
    /// `encode`, before any byte reaches the transport.
    fn send(&self, command: &Command) -> Result<()> {
        let bytes = command.encode()?;
        let mut transport = self.transport.lock();
        transport.write(&bytes)?;
        transport.flush()?;
        Ok(())
    }
}

impl Drop for Roomba {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    fn roomba(mock: &MockTransport) -> Roomba {
        Roomba::with_transport(Box::new(mock.clone()), RoombaConfig::default())
    }

    #[test]
    fn test_motion_requires_safe_mode() {
        let mock = MockTransport::new();
        let driver = roomba(&mock);

        let err = driver.drive_direct(100, 100).unwrap_err();
        assert!(matches!(
            err,
            Error::PreconditionNotMet {
                required: Mode::Safe,
                actual: Mode::Off,
            }
        ));
        assert!(mock.get_written().is_empty(), "rejected command reached the wire");

        driver.start().unwrap();
        let err = driver.drive_direct(100, 100).unwrap_err();
        assert!(matches!(
            err,
            Error::PreconditionNotMet {
                actual: Mode::Passive,
                ..
            }
        ));

        driver.safe_control().unwrap();
        mock.clear_written();
        driver.drive_direct(100, 100).unwrap();
        assert_eq!(mock.get_written(), vec![145, 0x00, 0x64, 0x00, 0x64]);
    }

    #[test]
    fn test_out_of_range_field_writes_nothing() {
        let mock = MockTransport::new();
        let driver = roomba(&mock);
        driver.start().unwrap();
        driver.safe_control().unwrap();
        mock.clear_written();

        assert!(matches!(
            driver.drive(501, 0).unwrap_err(),
            Error::InvalidArgument(_)
        ));
        assert!(matches!(
            driver.drive(0, 2001).unwrap_err(),
            Error::InvalidArgument(_)
        ));
        assert!(mock.get_written().is_empty());
    }

    #[test]
    fn test_mode_transitions_emit_opcodes() {
        let mock = MockTransport::new();
        let driver = roomba(&mock);

        driver.start().unwrap();
        driver.safe_control().unwrap();
        driver.full_control().unwrap();
        assert_eq!(mock.get_written(), vec![128, 131, 132]);
        assert_eq!(driver.mode(), Mode::Full);

        mock.clear_written();
        driver.power_down().unwrap();
        assert_eq!(mock.get_written(), vec![133]);
        assert_eq!(driver.mode(), Mode::PowerDown);
    }

    #[test]
    fn test_cleaning_macros_need_power_only() {
        let mock = MockTransport::new();
        let driver = roomba(&mock);

        assert!(driver.clean().is_err());
        assert!(mock.get_written().is_empty());

        driver.start().unwrap();
        mock.clear_written();
        driver.clean().unwrap();
        assert_eq!(mock.get_written(), vec![135]);
        assert_eq!(driver.mode(), Mode::Clean);

        // a behavior runs in Passive, so motion is still gated
        assert!(driver.drive_direct(50, 50).is_err());
    }

    #[test]
    fn test_motors_require_safe_mode() {
        let mock = MockTransport::new();
        let driver = roomba(&mock);
        driver.start().unwrap();
        assert!(driver
            .drive_motors(BrushMotor::Forward, BrushMotor::Off, true)
            .is_err());

        driver.safe_control().unwrap();
        mock.clear_written();
        driver
            .drive_motors(BrushMotor::Forward, BrushMotor::Off, true)
            .unwrap();
        assert_eq!(mock.get_written(), vec![138, MOTOR_MAIN_BRUSH | MOTOR_VACUUM]);
    }

    #[test]
    fn test_led_setters_have_no_precondition() {
        let mock = MockTransport::new();
        let driver = roomba(&mock);

        // legal straight from Off
        driver.set_dock_led(true).unwrap();
        assert_eq!(mock.get_written(), vec![139, LED_DOCK, LED_COLOR_DEFAULT, 0]);

        mock.clear_written();
        driver.set_power_button_led(200, 128).unwrap();
        assert_eq!(mock.get_written(), vec![139, LED_DOCK, 200, 128]);

        mock.clear_written();
        driver.set_dock_led(false).unwrap();
        driver.set_spot_led(true).unwrap();
        let written = mock.get_written();
        assert_eq!(&written[written.len() - 4..], &[139, LED_SPOT, 200, 128]);
    }

    #[test]
    fn test_drive_special_helpers() {
        let mock = MockTransport::new();
        let driver = roomba(&mock);
        driver.start().unwrap();
        driver.safe_control().unwrap();
        mock.clear_written();

        driver.drive_straight(200).unwrap();
        assert_eq!(mock.get_written(), vec![137, 0x00, 0xC8, 0x80, 0x00]);

        mock.clear_written();
        driver.spin_in_place(100, true).unwrap();
        assert_eq!(mock.get_written(), vec![137, 0x00, 0x64, 0xFF, 0xFF]);
    }

    #[test]
    fn test_sensor_read_before_stream_fails() {
        let mock = MockTransport::new();
        let driver = roomba(&mock);
        assert!(matches!(
            driver.voltage_mv(),
            Err(Error::SensorNotAvailable(SensorId::Voltage))
        ));
        assert!(matches!(
            driver.distance_mm(),
            Err(Error::SensorNotAvailable(SensorId::Distance))
        ));
    }

    #[test]
    fn test_stream_commands_on_the_wire() {
        let mock = MockTransport::new();
        let mut driver = roomba(&mock);
        driver.start().unwrap();
        mock.clear_written();

        driver
            .start_sensor_stream(&[SensorId::Voltage, SensorId::Distance])
            .unwrap();
        assert_eq!(mock.get_written(), vec![148, 2, 22, 19]);
        assert_eq!(driver.stream_state(), StreamState::Streaming);

        mock.clear_written();
        driver.suspend_sensor_stream().unwrap();
        assert_eq!(mock.get_written(), vec![150, 0]);
        assert_eq!(driver.stream_state(), StreamState::Paused);

        mock.clear_written();
        driver.resume_sensor_stream().unwrap();
        assert_eq!(mock.get_written(), vec![150, 1]);
        assert_eq!(driver.stream_state(), StreamState::Streaming);

        driver.close().unwrap();
        assert_eq!(driver.stream_state(), StreamState::Stopped);
    }

    #[test]
    fn test_stream_requires_power() {
        let mock = MockTransport::new();
        let mut driver = roomba(&mock);
        assert!(driver.start_sensor_stream(&[]).is_err());
        assert!(mock.get_written().is_empty());
    }
}
