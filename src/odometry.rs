//! Wheel-encoder odometry
//!
//! Integrates raw 16-bit wrapping encoder counts into a continuous pose
//! using the differential-drive model. Headings use the usual convention:
//! x forward, y left, heading counter-clockwise positive in radians.

use crate::config::KinematicsConfig;

/// Accumulated pose in millimeters / radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub x_mm: f64,
    pub y_mm: f64,
    pub heading_rad: f64,
}

impl Pose {
    const ORIGIN: Pose = Pose {
        x_mm: 0.0,
        y_mm: 0.0,
        heading_rad: 0.0,
    };
}

/// Signed delta between two samples of a 16-bit wrapping counter.
///
/// A raw difference whose magnitude exceeds half the counter range is read
/// as a single wrap in the opposite direction, never as a large jump: going
/// from 65530 to 10 is +16 ticks, not -65520.
pub fn wrap16_delta(current: u16, previous: u16) -> i32 {
    let diff = current.wrapping_sub(previous) as i32;
    if diff > i16::MAX as i32 {
        diff - 0x1_0000
    } else {
        diff
    }
}

/// Integrates per-frame encoder samples into a pose.
pub struct OdometryTracker {
    pose: Pose,
    last_right: Option<u16>,
    last_left: Option<u16>,
    kinematics: KinematicsConfig,
}

impl OdometryTracker {
    pub fn new(kinematics: KinematicsConfig) -> Self {
        log::debug!(
            "Odometry: wheel_base={:.1}mm, mm_per_tick={:.4}",
            kinematics.wheel_base_mm,
            kinematics.mm_per_tick
        );
        Self {
            pose: Pose::ORIGIN,
            last_right: None,
            last_left: None,
            kinematics,
        }
    }

    /// Fold one pair of raw encoder samples into the pose.
    ///
    /// The tick deltas against the previous samples are converted to wheel
    /// travel, then applied with midpoint integration: the translation is
    /// projected along the heading halfway through the turn, which keeps
    /// curved paths from bowing outward at stream rates. The first call
    /// only seeds the previous samples and moves nothing.
    pub fn integrate(&mut self, right_raw: u16, left_raw: u16) {
        let (prev_right, prev_left) = match (self.last_right, self.last_left) {
            (Some(r), Some(l)) => (r, l),
            _ => {
                self.last_right = Some(right_raw);
                self.last_left = Some(left_raw);
                log::debug!("Odometry: seeded encoders R={right_raw}, L={left_raw}");
                return;
            }
        };

        let d_right_ticks = wrap16_delta(right_raw, prev_right);
        let d_left_ticks = wrap16_delta(left_raw, prev_left);
        self.last_right = Some(right_raw);
        self.last_left = Some(left_raw);

        if d_right_ticks == 0 && d_left_ticks == 0 {
            return;
        }

        let d_right = d_right_ticks as f64 * self.kinematics.mm_per_tick;
        let d_left = d_left_ticks as f64 * self.kinematics.mm_per_tick;

        let d_center = (d_right + d_left) / 2.0;
        let d_theta = (d_right - d_left) / self.kinematics.wheel_base_mm;

        let mid_heading = self.pose.heading_rad + d_theta / 2.0;
        self.pose.x_mm += d_center * mid_heading.cos();
        self.pose.y_mm += d_center * mid_heading.sin();
        self.pose.heading_rad += d_theta;
    }

    /// Current pose snapshot.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Return to the origin and drop the encoder history; the next sample
    /// seeds again without moving the pose.
    pub fn reset(&mut self) {
        self.pose = Pose::ORIGIN;
        self.last_right = None;
        self.last_left = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    /// 1 mm per tick and a 100 mm wheel base keep the arithmetic readable.
    fn test_kinematics() -> KinematicsConfig {
        KinematicsConfig {
            wheel_base_mm: 100.0,
            mm_per_tick: 1.0,
        }
    }

    fn tracker() -> OdometryTracker {
        let mut t = OdometryTracker::new(test_kinematics());
        t.integrate(1000, 1000); // seed
        t
    }

    #[test]
    fn test_wrap16_delta() {
        assert_eq!(wrap16_delta(10, 65530), 16);
        assert_eq!(wrap16_delta(65530, 10), -16);
        assert_eq!(wrap16_delta(200, 100), 100);
        assert_eq!(wrap16_delta(100, 200), -100);
        assert_eq!(wrap16_delta(500, 500), 0);
        // exactly half the range reads as forward
        assert_eq!(wrap16_delta(32767, 0), 32767);
        assert_eq!(wrap16_delta(32768, 0), -32768);
    }

    #[test]
    fn test_first_sample_only_seeds() {
        let mut t = OdometryTracker::new(test_kinematics());
        t.integrate(60000, 60000);
        let pose = t.pose();
        assert_eq!(pose.x_mm, 0.0);
        assert_eq!(pose.y_mm, 0.0);
        assert_eq!(pose.heading_rad, 0.0);
    }

    #[test]
    fn test_straight_line() {
        let mut t = tracker();
        t.integrate(1100, 1100); // +100 ticks both wheels
        let pose = t.pose();
        assert_relative_eq!(pose.x_mm, 100.0, epsilon = 1e-9);
        assert_relative_eq!(pose.y_mm, 0.0, epsilon = 1e-9);
        assert_relative_eq!(pose.heading_rad, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_spin_in_place() {
        let mut t = tracker();
        // opposite wheel travel: no translation, pure rotation
        let quarter_turn = (FRAC_PI_2 * 100.0 / 2.0) as u16; // ~78 ticks each
        t.integrate(1000 + quarter_turn, 1000 - quarter_turn);
        let pose = t.pose();
        assert_relative_eq!(pose.x_mm, 0.0, epsilon = 1e-9);
        assert_relative_eq!(pose.y_mm, 0.0, epsilon = 1e-9);
        assert_relative_eq!(
            pose.heading_rad,
            2.0 * quarter_turn as f64 / 100.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_translation_follows_heading() {
        let mut t = tracker();
        // face +y, then drive forward
        let quarter = (FRAC_PI_2 * 100.0 / 2.0).round() as u16;
        t.integrate(1000 + quarter, 1000 - quarter);
        let heading = t.pose().heading_rad;
        t.integrate(1000 + quarter + 50, 1000 - quarter + 50);
        let pose = t.pose();
        assert_relative_eq!(pose.x_mm, 50.0 * heading.cos(), epsilon = 1e-9);
        assert_relative_eq!(pose.y_mm, 50.0 * heading.sin(), epsilon = 1e-9);
    }

    #[test]
    fn test_integration_across_encoder_wrap() {
        let mut t = OdometryTracker::new(test_kinematics());
        t.integrate(65530, 65530);
        t.integrate(10, 10); // wraps: +16 ticks each
        let pose = t.pose();
        assert_relative_eq!(pose.x_mm, 16.0, epsilon = 1e-9);
        assert_relative_eq!(pose.y_mm, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_reverse_travel() {
        let mut t = tracker();
        t.integrate(900, 900); // -100 ticks both wheels
        let pose = t.pose();
        assert_relative_eq!(pose.x_mm, -100.0, epsilon = 1e-9);
        assert_relative_eq!(pose.heading_rad, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_reset_reseeds() {
        let mut t = tracker();
        t.integrate(1100, 1000);
        t.reset();
        assert_eq!(t.pose(), Pose::ORIGIN);
        // first sample after reset must not move the pose
        t.integrate(5000, 5000);
        assert_eq!(t.pose(), Pose::ORIGIN);
        t.integrate(5100, 5100);
        assert_relative_eq!(t.pose().x_mm, 100.0, epsilon = 1e-9);
    }
}
