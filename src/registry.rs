//! Probe registry: the ordered list of probes on the bus.
//!
//! Pure data.  Order matters: it is the polling order and the column
//! order of every reading set.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::bus::MAX_ADDRESS;

/// What a probe measures.  Only `Temperature` changes poller behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeKind {
    Temperature,
    Ph,
    Orp,
    Conductivity,
    Generic,
}

/// Static description of one probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeDescriptor {
    /// Unique name; also the storage column and alert metric name.
    pub id: String,
    pub kind: ProbeKind,
    /// 7-bit bus address.
    pub bus_address: u8,
    /// Whether the poller visits this probe at all.
    #[serde(default = "default_true")]
    pub connected: bool,
    /// The temperature probe whose reading compensates the others.
    #[serde(default)]
    pub is_reference: bool,
    /// Decimal places kept in stored readings.
    pub rounding_digits: u8,
}

fn default_true() -> bool {
    true
}

impl ProbeDescriptor {
    pub fn new(
        id: impl Into<String>,
        kind: ProbeKind,
        bus_address: u8,
        rounding_digits: u8,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            bus_address,
            connected: true,
            is_reference: false,
            rounding_digits,
        }
    }

    /// Mark as the reference temperature probe.
    #[must_use]
    pub fn reference(mut self) -> Self {
        self.is_reference = true;
        self
    }

    #[must_use]
    pub fn disconnected(mut self) -> Self {
        self.connected = false;
        self
    }

    pub fn is_temperature(&self) -> bool {
        self.kind == ProbeKind::Temperature
    }
}

/// Ordered, validated probe list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProbeRegistry {
    probes: Vec<ProbeDescriptor>,
}

impl ProbeRegistry {
    /// Build and validate a registry.
    pub fn new(probes: Vec<ProbeDescriptor>) -> Result<Self, ConfigError> {
        let registry = Self { probes };
        registry.validate()?;
        Ok(registry)
    }

    /// Check the invariants the poller relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, p) in self.probes.iter().enumerate() {
            if p.id.trim().is_empty() {
                return Err(ConfigError::ValidationFailed("probe id must not be empty"));
            }
            if p.bus_address > MAX_ADDRESS {
                return Err(ConfigError::ValidationFailed(
                    "probe bus_address must be 0-127",
                ));
            }
            if p.is_reference && !p.is_temperature() {
                return Err(ConfigError::ValidationFailed(
                    "only temperature probes can be the reference",
                ));
            }
            let rest = &self.probes[i + 1..];
            if rest.iter().any(|q| q.id == p.id) {
                return Err(ConfigError::ValidationFailed("probe ids must be unique"));
            }
            if p.connected
                && rest
                    .iter()
                    .any(|q| q.connected && q.bus_address == p.bus_address)
            {
                return Err(ConfigError::ValidationFailed(
                    "connected probes must have distinct bus addresses",
                ));
            }
        }

        let refs = self
            .connected()
            .filter(|p| p.is_reference)
            .count();
        if refs > 1 {
            warn!(
                "Registry: {} connected reference probes, the last one polled wins",
                refs
            );
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProbeDescriptor> {
        self.probes.iter()
    }

    pub fn connected(&self) -> impl Iterator<Item = &ProbeDescriptor> {
        self.probes.iter().filter(|p| p.connected)
    }

    pub fn disconnected(&self) -> impl Iterator<Item = &ProbeDescriptor> {
        self.probes.iter().filter(|p| !p.connected)
    }

    /// Registry position of `id`, used to order readings.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.probes.iter().position(|p| p.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&ProbeDescriptor> {
        self.probes.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }
}

impl<'a> IntoIterator for &'a ProbeRegistry {
    type Item = &'a ProbeDescriptor;
    type IntoIter = core::slice::Iter<'a, ProbeDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.probes.iter()
    }
}
