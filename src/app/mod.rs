//! Application core: orchestration logic behind port traits.
//!
//! [`service::Monitor`] runs one monitoring iteration: poll the probes,
//! persist the readings, read the latest row back, evaluate alerts and
//! hand them to the notifier.  Storage, notification, event logging and
//! time are all reached through the **port traits** in [`ports`], keeping
//! this layer testable without hardware, disks or mail servers.

pub mod events;
pub mod ports;
pub mod service;
