//! Alert evaluator: bounds checks with a notification cooldown.
//!
//! The evaluator only decides *whether* to alert; delivery goes through
//! the [`Notifier`](crate::app::ports::Notifier) port.
//!
//! Two cooldown modes exist:
//!
//! - [`CooldownMode::PerMetric`]: every metric has its own gate, and an
//!   in-bounds reading re-arms only that metric.
//! - [`CooldownMode::Shared`]: one gate for all metrics.  Only the last
//!   configured metric being in bounds re-arms it, which is how the
//!   legacy reef monitor behaved.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::reading::StoredRow;

/// Configured acceptable range for one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    /// Column / probe id the bounds apply to.
    pub metric: String,
    pub min: f64,
    pub max: f64,
    /// Suffix appended to the value in alert messages (e.g. "C", " ppt").
    #[serde(default)]
    pub unit: String,
}

impl Threshold {
    pub fn new(metric: impl Into<String>, min: f64, max: f64, unit: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            min,
            max,
            unit: unit.into(),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CooldownMode {
    #[default]
    PerMetric,
    Shared,
}

/// Alert gate state.  Lives for the whole process.
#[derive(Debug, Clone)]
pub struct AlertCooldown {
    mode: CooldownMode,
    duration: TimeDelta,
    /// Gate opening time for `Shared`, and the default for unseen metrics
    /// in `PerMetric`.
    start: DateTime<Utc>,
    shared_next: DateTime<Utc>,
    per_metric: BTreeMap<String, DateTime<Utc>>,
}

impl AlertCooldown {
    /// All gates open at `now`.
    pub fn new(mode: CooldownMode, duration: TimeDelta, now: DateTime<Utc>) -> Self {
        Self {
            mode,
            duration,
            start: now,
            shared_next: now,
            per_metric: BTreeMap::new(),
        }
    }

    pub fn mode(&self) -> CooldownMode {
        self.mode
    }

    /// Earliest time an alert for `metric` may be sent.
    pub fn next_allowed_at(&self, metric: &str) -> DateTime<Utc> {
        match self.mode {
            CooldownMode::Shared => self.shared_next,
            CooldownMode::PerMetric => self
                .per_metric
                .get(metric)
                .copied()
                .unwrap_or(self.start),
        }
    }

    pub fn is_open(&self, metric: &str, now: DateTime<Utc>) -> bool {
        now >= self.next_allowed_at(metric)
    }

    /// Close the gate for one cooldown period after an alert.
    fn arm(&mut self, metric: &str, now: DateTime<Utc>) {
        self.set(metric, now + self.duration);
    }

    /// Re-open the gate immediately.
    fn rearm(&mut self, metric: &str, now: DateTime<Utc>) {
        self.set(metric, now);
    }

    fn set(&mut self, metric: &str, at: DateTime<Utc>) {
        match self.mode {
            CooldownMode::Shared => self.shared_next = at,
            CooldownMode::PerMetric => {
                self.per_metric.insert(metric.to_string(), at);
            }
        }
    }
}

/// A metric out of its configured range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub metric: String,
    pub value: f64,
    pub unit: String,
}

pub const ALERT_SUBJECT: &str = "Reef Alert!!!";

impl AlertEvent {
    /// Message body, e.g. `Warning: Reef pH is 8.95 `.
    pub fn body(&self) -> String {
        format!("Warning: Reef {} is {}{}", self.metric, self.value, self.unit)
    }

    /// Full plain-text message: subject header, blank line, body.
    pub fn message(&self) -> String {
        format!("Subject: {}\n\n{}", ALERT_SUBJECT, self.body())
    }
}

/// Compare the latest stored row against every threshold, in order.
pub fn evaluate(
    latest: &StoredRow,
    thresholds: &[Threshold],
    cooldown: &mut AlertCooldown,
    now: DateTime<Utc>,
) -> Vec<AlertEvent> {
    let mut events = Vec::new();
    let last = thresholds.len().saturating_sub(1);

    for (i, t) in thresholds.iter().enumerate() {
        let Some(value) = latest.get(&t.metric) else {
            debug!("Alerts: no '{}' value in latest row", t.metric);
            continue;
        };

        if t.contains(value) {
            if cooldown.mode() == CooldownMode::PerMetric || i == last {
                cooldown.rearm(&t.metric, now);
            }
            continue;
        }

        if cooldown.is_open(&t.metric, now) {
            info!(
                "Alerts: {} = {} outside [{}, {}]",
                t.metric, value, t.min, t.max
            );
            events.push(AlertEvent {
                metric: t.metric.clone(),
                value,
                unit: t.unit.clone(),
            });
            cooldown.arm(&t.metric, now);
        } else {
            debug!(
                "Alerts: {} = {} out of range, suppressed until {}",
                t.metric,
                value,
                cooldown.next_allowed_at(&t.metric)
            );
        }
    }

    events
}
