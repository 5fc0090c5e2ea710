//! Session configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::SessionError;
use crate::types::Address;

/// Deployed market address used when no configuration overrides it
pub const CONTRACT_ADDRESS: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

/// Native unit scale (wei per ether)
pub const UNIT_DECIMALS: u32 = 18;

pub const NOTIFICATION_TTL_MS: u64 = 5_000;

// rust_decimal keeps at most 28 fractional digits
const MAX_DECIMALS: u32 = 28;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    pub contract_address: Address,
    pub unit_decimals: u32,
    pub notification_ttl_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            contract_address: Address::new(CONTRACT_ADDRESS),
            unit_decimals: UNIT_DECIMALS,
            notification_ttl_ms: NOTIFICATION_TTL_MS,
        }
    }
}

impl SessionConfig {
    pub fn from_json(raw: &str) -> Result<Self, SessionError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| SessionError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SessionError> {
        if self.contract_address.is_empty() {
            return Err(SessionError::InvalidConfig("contract address is empty".into()));
        }
        if self.unit_decimals > MAX_DECIMALS {
            return Err(SessionError::InvalidConfig(format!(
                "unit decimals must be at most {MAX_DECIMALS}"
            )));
        }
        Ok(())
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ttl_ms)
    }
}
