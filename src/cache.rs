//! Latest-value sensor cache
//!
//! The stream reader is the only writer; any thread may read through the
//! facade. The cache itself is a plain container - callers serialize access
//! with the telemetry lock, held just long enough to copy values in or out.

use crate::error::{Error, Result};
use crate::protocol::{SensorFrame, SensorId};
use std::collections::HashMap;

/// Most-recently-decoded raw value per sensor id.
///
/// Values are stored widened to `i32`; the typed accessors on the facade
/// narrow them back to their documented units. Distance and angle arrive as
/// per-frame deltas and are summed here until taken, so the "since last
/// call" contract survives frames the caller never looks at.
#[derive(Debug, Default)]
pub struct SensorCache {
    values: HashMap<SensorId, i32>,
}

impl SensorCache {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Apply one decoded frame: every id present is updated, all others are
    /// left untouched. O(pairs in frame).
    pub fn apply(&mut self, frame: &SensorFrame) {
        for &(id, value) in &frame.pairs {
            if id.is_accumulating() {
                let slot = self.values.entry(id).or_insert(0);
                *slot = slot.saturating_add(value);
            } else {
                self.values.insert(id, value);
            }
        }
    }

    /// Latest raw value of `id`. Fails if no frame has carried it yet - a
    /// missing sensor is reported, never silently defaulted.
    pub fn get(&self, id: SensorId) -> Result<i32> {
        self.values
            .get(&id)
            .copied()
            .ok_or(Error::SensorNotAvailable(id))
    }

    /// Read and zero an accumulating sensor (distance or angle) in one
    /// step, so an update racing with the caller can land either before or
    /// after the call but is never lost.
    pub fn take_accumulated(&mut self, id: SensorId) -> Result<i32> {
        if !id.is_accumulating() {
            return Err(Error::InvalidArgument(format!(
                "{id} is not an accumulating sensor"
            )));
        }
        match self.values.get_mut(&id) {
            Some(slot) => {
                let value = *slot;
                *slot = 0;
                Ok(value)
            }
            None => Err(Error::SensorNotAvailable(id)),
        }
    }

    /// Number of distinct sensors seen so far.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
