use std::collections::VecDeque;

use chrono::SecondsFormat;

use crate::firebase::models::SensorReading;

pub const DEFAULT_CAPACITY: usize = 100;

/// Readings shown in the recent-history table.
pub const TABLE_ROWS: usize = 20;

const CSV_HEADER: &str =
    "Timestamp,Soil Moisture,Air Humidity,Air Temperature,pH Level,Water Level";

/// Bounded log of past readings, oldest first.
#[derive(Debug, Clone)]
pub struct History {
    capacity: usize,
    readings: VecDeque<SensorReading>,
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl History {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            readings: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a reading, evicting the oldest once `capacity` is reached.
    pub fn push(&mut self, reading: SensorReading) {
        if self.capacity == 0 {
            return;
        }
        while self.readings.len() >= self.capacity {
            self.readings.pop_front();
        }
        self.readings.push_back(reading);
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// The most recent `n` readings, newest first.
    pub fn recent(&self, n: usize) -> Vec<SensorReading> {
        self.readings.iter().rev().take(n).cloned().collect()
    }

    /// Render every stored reading as CSV, oldest first.
    pub fn to_csv(&self) -> String {
        let mut out = String::from(CSV_HEADER);
        for r in &self.readings {
            out.push('\n');
            out.push_str(&format!(
                "{},{},{},{},{},{}",
                r.observed_at.to_rfc3339_opts(SecondsFormat::Millis, true),
                r.soil,
                r.humidity,
                r.air_temp,
                r.ph,
                r.water_level
            ));
        }
        out
    }
}
