//! Reef water-quality monitor library.
//!
//! Polls EZO-style probes on a shared I2C bus, compensates readings for
//! the liquid temperature, persists them and raises threshold alerts.
//! Hardware, storage and notification sit behind port traits so every
//! module here is testable on the host.

#![deny(unused_must_use)]

pub mod adapters;
pub mod alerts;
pub mod app;
pub mod bus;
pub mod config;
pub mod error;
pub mod poller;
pub mod probe;
pub mod reading;
pub mod registry;
