//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements    | Connects to                  |
//! |----------------|---------------|------------------------------|
//! | `json_config`  | ConfigPort    | JSON file                    |
//! | `jsonl_store`  | ReadingStore  | append-only JSON-lines file  |
//! | `log_sink`     | EventSink     | `log` facade                 |
//! | `memory_store` | ReadingStore  | in-process rows              |
//! | `notifier`     | Notifier      | `log` facade                 |
//! | `smtp`         | Notifier      | SMTP relay (`smtp` feature)  |
//! | `time`         | Clock, DelayNs| system clock, thread sleep   |
//!
//! The bus adapters live in [`crate::bus`].

pub mod json_config;
pub mod jsonl_store;
pub mod log_sink;
pub mod memory_store;
pub mod notifier;
#[cfg(feature = "smtp")]
pub mod smtp;
pub mod time;
