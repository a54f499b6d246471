//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Monitor (domain)
//! ```
//!
//! Driven adapters (storage, notification, event sinks, clock, config)
//! implement these traits.  The [`Monitor`](super::service::Monitor)
//! consumes them via generics, so the domain core never touches files,
//! sockets or the wall clock directly.  The probe bus has its own port,
//! [`BusChannel`](crate::bus::BusChannel).
//!
//! All port errors are typed; callers must handle every variant
//! explicitly.  Sink errors never propagate into the polling path.

use chrono::{DateTime, Utc};

use crate::alerts::AlertEvent;
use crate::config::MonitorConfig;
use crate::reading::{ReadingSet, StoredRow};

// ───────────────────────────────────────────────────────────────
// Reading store (driven adapter: domain → persistence)
// ───────────────────────────────────────────────────────────────

/// Timestamped row storage with a column per probe.
///
/// Schema changes are idempotent: adding an existing column or dropping
/// an absent one succeeds and reports `false`.
pub trait ReadingStore {
    /// Add a column if absent.  Returns `true` if it was created.
    fn add_column(&mut self, name: &str) -> Result<bool, StoreError>;

    /// Drop a column if present.  Returns `true` if it was removed.
    fn drop_column(&mut self, name: &str) -> Result<bool, StoreError>;

    /// Insert one row.  Readings for unknown columns are not stored.
    fn insert_row(&mut self, timestamp: DateTime<Utc>, readings: &ReadingSet)
    -> Result<(), StoreError>;

    /// Most recently inserted row, if any.
    fn latest_row(&self) -> Result<Option<StoredRow>, StoreError>;
}

impl<T: ReadingStore + ?Sized> ReadingStore for Box<T> {
    fn add_column(&mut self, name: &str) -> Result<bool, StoreError> {
        (**self).add_column(name)
    }
    fn drop_column(&mut self, name: &str) -> Result<bool, StoreError> {
        (**self).drop_column(name)
    }
    fn insert_row(
        &mut self,
        timestamp: DateTime<Utc>,
        readings: &ReadingSet,
    ) -> Result<(), StoreError> {
        (**self).insert_row(timestamp, readings)
    }
    fn latest_row(&self) -> Result<Option<StoredRow>, StoreError> {
        (**self).latest_row()
    }
}

// ───────────────────────────────────────────────────────────────
// Notifier (driven adapter: domain → alert delivery)
// ───────────────────────────────────────────────────────────────

/// Delivers formatted alert messages (mail, log, ...).
pub trait Notifier {
    fn notify(&mut self, event: &AlertEvent, message: &str) -> Result<(), NotifyError>;
}

impl<T: Notifier + ?Sized> Notifier for Box<T> {
    fn notify(&mut self, event: &AlertEvent, message: &str) -> Result<(), NotifyError> {
        (**self).notify(event, message)
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`MonitorEvent`](super::events::MonitorEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::MonitorEvent);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Wall-clock source for reading timestamps and alert cooldowns.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists monitor configuration.
///
/// Implementations MUST validate before returning or persisting:
/// invalid values are rejected with [`ConfigError::ValidationFailed`],
/// never silently clamped.
pub trait ConfigPort {
    /// Load configuration.  Returns [`ConfigError::NotFound`] if no
    /// stored config exists.
    fn load(&self) -> Result<MonitorConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &MonitorConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations and config validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found.
    NotFound,
    /// Stored config failed to deserialize.
    Corrupted(String),
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the backend.
    IoError(String),
}

/// Errors from [`ReadingStore`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Backend could not be read or written.
    IoError(String),
    /// A stored row failed to deserialize.
    Corrupted(String),
}

/// Errors from [`Notifier`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// Sender or recipient address is invalid.
    Address(String),
    /// The message could not be assembled.
    Build(String),
    /// Delivery failed (connection, auth, rejected).
    Transport(String),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted(msg) => write!(f, "config corrupted: {}", msg),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl core::fmt::Display for StoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::IoError(msg) => write!(f, "I/O error: {}", msg),
            Self::Corrupted(msg) => write!(f, "corrupted row: {}", msg),
        }
    }
}

impl core::fmt::Display for NotifyError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Address(msg) => write!(f, "bad address: {}", msg),
            Self::Build(msg) => write!(f, "message build failed: {}", msg),
            Self::Transport(msg) => write!(f, "delivery failed: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for StoreError {}
impl std::error::Error for NotifyError {}
