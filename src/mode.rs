//! Control mode tracking and command preconditions
//!
//! The OI accepts most commands only in certain control modes. The driver
//! tracks the mode implied by the last mode-setting command it issued; it
//! does not read the mode back from the robot. The robot can silently fall
//! back to Passive on a safety trip (cliff, wheel drop while in Safe), so
//! the tracked value is the commanded intent, not ground truth. The
//! device-reported mode is available through the `OiMode` sensor packet.

use crate::error::{Error, Result};
use std::fmt;

/// OI control modes.
///
/// `Off`, `Passive`, `Safe` and `Full` are the four steady modes of the
/// protocol. The remaining variants are command modes: the robot runs the
/// requested behavior (spot clean, dock seek, ...) in Passive and drops back
/// to Passive when it finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Off,
    Passive,
    Safe,
    Full,
    Spot,
    Clean,
    Max,
    Dock,
    PowerDown,
}

impl Mode {
    /// Ordering rank used by precondition checks: Off < Passive < Safe < Full.
    /// Command modes execute in Passive and rank accordingly.
    fn rank(self) -> u8 {
        match self {
            Mode::Off => 0,
            Mode::Safe => 2,
            Mode::Full => 3,
            _ => 1,
        }
    }

    /// Whether the OI is awake at all (anything above Off).
    pub fn is_powered(self) -> bool {
        self != Mode::Off
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Off => "Off",
            Mode::Passive => "Passive",
            Mode::Safe => "Safe",
            Mode::Full => "Full",
            Mode::Spot => "Spot",
            Mode::Clean => "Clean",
            Mode::Max => "Max",
            Mode::Dock => "Dock",
            Mode::PowerDown => "PowerDown",
        };
        f.write_str(name)
    }
}

/// Tracks the mode implied by issued commands.
#[derive(Debug)]
pub struct ModeTracker {
    current: Mode,
}

impl ModeTracker {
    /// Start tracking at `Off` (serial link open, OI not started).
    pub fn new() -> Self {
        Self { current: Mode::Off }
    }

    /// Currently tracked mode.
    pub fn current(&self) -> Mode {
        self.current
    }

    /// Record a mode change. Always succeeds locally; the caller is
    /// responsible for having sent the corresponding command.
    pub fn transition_to(&mut self, target: Mode) {
        if self.current != target {
            log::debug!("Mode: {} -> {}", self.current, target);
        }
        self.current = target;
    }

    /// Fail with `PreconditionNotMet` unless the tracked mode ranks at or
    /// above `required`.
    pub fn assert_at_least(&self, required: Mode) -> Result<()> {
        if self.current.rank() < required.rank() {
            return Err(Error::PreconditionNotMet {
                required,
                actual: self.current,
            });
        }
        Ok(())
    }

    /// Fail unless the OI has been started (tracked mode is not `Off`).
    pub fn assert_powered(&self) -> Result<()> {
        if !self.current.is_powered() {
            return Err(Error::PreconditionNotMet {
                required: Mode::Passive,
                actual: self.current,
            });
        }
        Ok(())
    }
}

impl Default for ModeTracker {
    fn default() -> Self {
        Self::new()
    }
}
