//! Configuration fingerprinting: deterministic identification of engine setups.
//!
//! Two replays with the same fingerprint ran the same decision logic with the
//! same constants, so their exposure streams are comparable bar for bar.

use crate::config::EngineConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// BLAKE3 hex digest of a canonical engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigHash(pub String);

impl ConfigHash {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes).to_hex().to_string())
    }

    /// First 12 hex chars, enough to tell presets apart in logs.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for ConfigHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl EngineConfig {
    /// Hash of every decision-relevant constant.
    ///
    /// Canonical serialization: struct fields serialize in declaration order,
    /// and the config holds no maps, so the JSON is deterministic.
    pub fn fingerprint(&self) -> ConfigHash {
        // plain structs of numbers and enums; the Debug fallback is unreachable
        let bytes = serde_json::to_vec(self).unwrap_or_else(|_| format!("{self:?}").into_bytes());
        ConfigHash::from_bytes(&bytes)
    }
}
