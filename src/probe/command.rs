//! Typed EZO command vocabulary and settle-delay classification.
//!
//! Probes accept free-form ASCII, so [`Command::Raw`] passes anything
//! through; the other variants render the commands the poller and the
//! calibration tooling actually use.

use core::fmt;

/// Calibration point for `Cal,...` commands.
#[derive(Debug, Clone, PartialEq)]
pub enum CalPoint {
    /// Single-point calibration at a reference value (ORP, temperature).
    Single(f64),
    /// Mid-point (pH 7.00) calibration.
    Mid(f64),
    Low(f64),
    High(f64),
    /// Dry calibration (conductivity).
    Dry,
    /// Erase calibration data.
    Clear,
    /// Query how many points are calibrated.
    Query,
}

/// A command sent to a probe.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Take a single reading.
    Read,
    /// Set the temperature-compensation value in degrees C.
    Compensate(f64),
    Calibrate(CalPoint),
    /// Device type and firmware version.
    Info,
    /// Restart reason and supply voltage.
    Status,
    /// Enter low-power sleep.  The probe does not answer.
    Sleep,
    /// Any other command text.
    Raw(String),
}

/// How long the probe needs before its response is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settle {
    /// Readings and calibrations.
    Long,
    /// Everything else.
    Short,
    /// No response will come; do not read.
    NoResponse,
}

impl Settle {
    /// Classify raw command text (case-insensitive prefix match).
    pub fn classify(command: &str) -> Self {
        let upper = command.to_ascii_uppercase();
        if upper.starts_with("SLEEP") {
            Self::NoResponse
        } else if upper.starts_with('R') || upper.starts_with("CAL") {
            Self::Long
        } else {
            Self::Short
        }
    }
}

impl Command {
    pub fn settle(&self) -> Settle {
        Settle::classify(&self.to_string())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "R"),
            Self::Compensate(t) => write!(f, "T,{t}"),
            Self::Calibrate(point) => match point {
                CalPoint::Single(v) => write!(f, "Cal,{v}"),
                CalPoint::Mid(v) => write!(f, "Cal,mid,{v:.2}"),
                CalPoint::Low(v) => write!(f, "Cal,low,{v:.2}"),
                CalPoint::High(v) => write!(f, "Cal,high,{v:.2}"),
                CalPoint::Dry => write!(f, "Cal,dry"),
                CalPoint::Clear => write!(f, "Cal,clear"),
                CalPoint::Query => write!(f, "Cal,?"),
            },
            Self::Info => write!(f, "I"),
            Self::Status => write!(f, "Status"),
            Self::Sleep => write!(f, "Sleep"),
            Self::Raw(text) => f.write_str(text),
        }
    }
}
