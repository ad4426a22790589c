//! Full-stack streaming tests
//!
//! Drives the facade end-to-end over a mock transport: commands out one
//! side, synthetic telemetry frames in the other, with the real reader
//! thread, cache and odometry in between.
//!
//! Run with: `cargo test --test stream_integration`

use roomba_oi::protocol::{encode_frame, SensorId};
use roomba_oi::transport::MockTransport;
use roomba_oi::{Error, Mode, Roomba, RoombaConfig, StreamState};
use std::time::{Duration, Instant};

/// 1 mm per tick keeps expected distances readable.
fn test_config() -> RoombaConfig {
    let mut config = RoombaConfig::default();
    config.kinematics.mm_per_tick = 1.0;
    config.kinematics.wheel_base_mm = 100.0;
    config
}

fn wait_until(timeout_ms: u64, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_millis(timeout_ms);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    false
}

fn streaming_driver(mock: &MockTransport) -> Roomba {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut driver = Roomba::with_transport(Box::new(mock.clone()), test_config());
    driver.start().unwrap();
    driver.safe_control().unwrap();
    driver.start_sensor_stream(&[]).unwrap();
    driver
}

#[test]
fn telemetry_flows_to_accessors_and_pose() {
    let mock = MockTransport::new();
    let driver = streaming_driver(&mock);

    // seed frame: encoders plus a battery snapshot
    mock.inject_read(&encode_frame(&[
        (SensorId::RightEncoderCounts, 1000),
        (SensorId::LeftEncoderCounts, 1000),
        (SensorId::Voltage, 16200),
        (SensorId::Current, -320),
        (SensorId::Temperature, 24),
        (SensorId::BumpsAndWheelDrops, 0),
        (SensorId::ChargingState, 0),
        (SensorId::OiMode, 2),
    ]));
    // 100 ticks straight ahead, 40 mm and 9 degrees reported by the robot
    mock.inject_read(&encode_frame(&[
        (SensorId::RightEncoderCounts, 1100),
        (SensorId::LeftEncoderCounts, 1100),
        (SensorId::Distance, 40),
        (SensorId::Angle, 9),
        (SensorId::BumpsAndWheelDrops, 0x03), // both bumpers
    ]));

    assert!(wait_until(2000, || matches!(driver.is_left_bump(), Ok(true))));

    assert!(driver.is_right_bump().unwrap());
    assert!(!driver.is_right_wheel_dropped().unwrap());
    assert_eq!(driver.voltage_mv().unwrap(), 16200);
    assert_eq!(driver.current_ma().unwrap(), -320);
    assert_eq!(driver.temperature_c().unwrap(), 24);
    assert_eq!(driver.reported_oi_mode().unwrap(), Mode::Safe);
    assert_eq!(driver.right_encoder_counts().unwrap(), 1100);

    // pose follows the encoder deltas
    let pose = driver.pose();
    assert!((pose.x_mm - 100.0).abs() < 1e-9);
    assert!(pose.y_mm.abs() < 1e-9);
    assert!(pose.heading_rad.abs() < 1e-9);

    // accumulating accessors report once, then zero
    assert_eq!(driver.distance_mm().unwrap(), 40);
    assert_eq!(driver.distance_mm().unwrap(), 0);
    assert_eq!(driver.angle_degrees().unwrap(), 9);
    assert_eq!(driver.angle_degrees().unwrap(), 0);
}

#[test]
fn distance_accumulates_across_unread_frames() {
    let mock = MockTransport::new();
    let driver = streaming_driver(&mock);

    for _ in 0..10 {
        mock.inject_read(&encode_frame(&[
            (SensorId::Distance, 5),
            (SensorId::Voltage, 16000),
        ]));
    }
    // marker frame so we know all ten landed
    mock.inject_read(&encode_frame(&[(SensorId::Voltage, 15999)]));

    assert!(wait_until(2000, || matches!(driver.voltage_mv(), Ok(15999))));
    assert_eq!(driver.distance_mm().unwrap(), 50);
    assert_eq!(driver.distance_mm().unwrap(), 0);
}

#[test]
fn corrupted_bytes_resync_without_losing_later_frames() {
    let mock = MockTransport::new();
    let driver = streaming_driver(&mock);

    let mut bad = encode_frame(&[(SensorId::Voltage, 17000)]);
    let last = bad.len() - 1;
    bad[last] ^= 0x40;
    mock.inject_read(&[0x00, 0x55]); // line noise
    mock.inject_read(&bad);
    mock.inject_read(&encode_frame(&[(SensorId::Voltage, 16500)]));

    assert!(wait_until(2000, || matches!(driver.voltage_mv(), Ok(16500))));
    assert!(driver.corrupt_frame_count() >= 1);
    // the corrupted frame's value never surfaced
    assert_ne!(driver.voltage_mv().unwrap(), 17000);
}

#[test]
fn pause_and_resume_preserve_stream() {
    let mock = MockTransport::new();
    let driver = streaming_driver(&mock);

    mock.inject_read(&encode_frame(&[(SensorId::Voltage, 16000)]));
    assert!(wait_until(2000, || driver.voltage_mv().is_ok()));

    driver.suspend_sensor_stream().unwrap();
    assert_eq!(driver.stream_state(), StreamState::Paused);

    // frames injected while paused are buffered by the transport, not lost
    mock.inject_read(&encode_frame(&[(SensorId::Voltage, 15800)]));
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(driver.voltage_mv().unwrap(), 16000);

    driver.resume_sensor_stream().unwrap();
    assert_eq!(driver.stream_state(), StreamState::Streaming);
    assert!(wait_until(2000, || matches!(driver.voltage_mv(), Ok(15800))));
}

#[test]
fn reader_failure_stops_stream_but_keeps_cache() {
    let mock = MockTransport::new();
    let driver = streaming_driver(&mock);

    mock.inject_read(&encode_frame(&[(SensorId::Voltage, 16000)]));
    assert!(wait_until(2000, || driver.voltage_mv().is_ok()));

    mock.fail_reads();
    assert!(wait_until(2000, || driver.stream_state() == StreamState::Stopped));

    // stale but readable
    assert_eq!(driver.voltage_mv().unwrap(), 16000);
    // and a sensor that never arrived still reports as missing
    assert!(matches!(
        driver.dirt_detect(),
        Err(Error::SensorNotAvailable(SensorId::DirtDetect))
    ));
}

#[test]
fn stream_restart_after_failure() {
    let mock = MockTransport::new();
    let mut driver = Roomba::with_transport(Box::new(mock.clone()), test_config());
    driver.start().unwrap();
    driver.start_sensor_stream(&[]).unwrap();

    mock.fail_reads();
    assert!(wait_until(2000, || driver.stream_state() == StreamState::Stopped));

    // a fresh transport would be a new port in real life; the mock just heals
    let mock2 = MockTransport::new();
    drop(driver);
    let mut driver = Roomba::with_transport(Box::new(mock2.clone()), test_config());
    driver.start().unwrap();
    driver.start_sensor_stream(&[SensorId::Voltage]).unwrap();
    mock2.inject_read(&encode_frame(&[(SensorId::Voltage, 14900)]));
    assert!(wait_until(2000, || matches!(driver.voltage_mv(), Ok(14900))));
}

#[test]
fn interleaved_updates_and_reads_are_never_torn() {
    let mock = MockTransport::new();
    let driver = streaming_driver(&mock);

    // Voltage and current move in lockstep (current = -voltage) so any torn
    // view is detectable from the caller thread.
    let feeder_mock = mock.clone();
    let feeder = std::thread::spawn(move || {
        for i in 1..=1000i32 {
            feeder_mock.inject_read(&encode_frame(&[
                (SensorId::Voltage, 10000 + i),
                (SensorId::Current, -(10000 + i)),
                (SensorId::Distance, 1),
            ]));
            if i % 50 == 0 {
                std::thread::sleep(Duration::from_millis(1));
            }
        }
    });

    let mut reads = 0u32;
    while reads < 1000 {
        match (driver.voltage_mv(), driver.current_ma()) {
            (Ok(v), Ok(c)) => {
                assert_eq!(
                    v as i32,
                    -(c as i32),
                    "torn read: voltage {v} with current {c}"
                );
                reads += 1;
            }
            _ => std::thread::sleep(Duration::from_millis(1)),
        }
    }

    feeder.join().unwrap();
    assert!(wait_until(2000, || matches!(driver.voltage_mv(), Ok(11000))));
    // every frame's distance delta survived the interleaving
    assert_eq!(driver.distance_mm().unwrap(), 1000);
}

#[test]
fn close_is_idempotent_and_joins_reader() {
    let mock = MockTransport::new();
    let mut driver = streaming_driver(&mock);

    mock.inject_read(&encode_frame(&[(SensorId::Voltage, 16000)]));
    assert!(wait_until(2000, || driver.voltage_mv().is_ok()));

    driver.close().unwrap();
    assert_eq!(driver.stream_state(), StreamState::Stopped);
    driver.close().unwrap();

    // drop after close must not hang or panic
    drop(driver);
}
