//! Readings produced by one polling cycle.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Round half away from zero to `digits` decimal places.
pub fn round_to(value: f64, digits: u8) -> f64 {
    let scale = 10f64.powi(i32::from(digits));
    let scaled = value * scale;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / scale
}

/// One probe's value at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub probe_id: String,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

/// All readings of one cycle, in registry order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReadingSet {
    readings: Vec<Reading>,
}

impl ReadingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, reading: Reading) {
        self.readings.push(reading);
    }

    pub fn get(&self, probe_id: &str) -> Option<f64> {
        self.readings
            .iter()
            .find(|r| r.probe_id == probe_id)
            .map(|r| r.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        self.readings.iter()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Stable sort by a key, typically registry position.
    pub fn sort_by_key<K: Ord>(&mut self, key: impl FnMut(&Reading) -> K) {
        self.readings.sort_by_key(key);
    }
}

/// A persisted row as read back from storage: one value per column.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StoredRow {
    pub timestamp: DateTime<Utc>,
    pub values: BTreeMap<String, f64>,
}

impl StoredRow {
    /// Build a row from a cycle's readings.
    pub fn from_readings(timestamp: DateTime<Utc>, readings: &ReadingSet) -> Self {
        Self {
            timestamp,
            values: readings
                .iter()
                .map(|r| (r.probe_id.clone(), r.value))
                .collect(),
        }
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied()
    }
}

impl<'a> IntoIterator for &'a ReadingSet {
    type Item = &'a Reading;
    type IntoIter = core::slice::Iter<'a, Reading>;

    fn into_iter(self) -> Self::IntoIter {
        self.readings.iter()
    }
}
