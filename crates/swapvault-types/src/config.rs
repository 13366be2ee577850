//! Configuration types for the escrow engine and its ledger.

use serde::{Deserialize, Serialize};

use crate::{constants, Address, EscrowError, Result};

/// Rent parameters: how many lamports an account must hold to be rent-exempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RentConfig {
    /// Lamports charged per byte per year.
    pub lamports_per_byte_year: u64,
    /// Years of rent an account must prepay to be exempt.
    pub exemption_threshold_years: u64,
    /// Fixed per-account overhead, in bytes.
    pub account_storage_overhead: u64,
}

impl RentConfig {
    /// Rent-exempt minimum balance for an account holding `data_len` bytes.
    #[must_use]
    pub fn minimum_balance(&self, data_len: usize) -> u64 {
        let bytes = self
            .account_storage_overhead
            .saturating_add(u64::try_from(data_len).unwrap_or(u64::MAX));
        bytes
            .saturating_mul(self.lamports_per_byte_year)
            .saturating_mul(self.exemption_threshold_years)
    }
}

impl Default for RentConfig {
    fn default() -> Self {
        Self {
            lamports_per_byte_year: constants::DEFAULT_LAMPORTS_PER_BYTE_YEAR,
            exemption_threshold_years: constants::DEFAULT_EXEMPTION_THRESHOLD_YEARS,
            account_storage_overhead: constants::DEFAULT_ACCOUNT_STORAGE_OVERHEAD,
        }
    }
}

/// Program ids and rent parameters shared by the engine and the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// The escrow program: owner of every custody record.
    pub program_id: Address,
    /// The token program: owner of mints and token accounts.
    pub token_program_id: Address,
    /// The associated-token program: derivation namespace for vaults.
    pub associated_token_program_id: Address,
    /// Rent parameters.
    pub rent: RentConfig,
}

impl EngineConfig {
    /// Parse a JSON config. Missing fields fall back to defaults.
    ///
    /// # Errors
    /// Returns `Configuration` if the JSON is malformed or the program ids collide.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| EscrowError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations where two roles share one program id.
    ///
    /// # Errors
    /// Returns `Configuration` describing the collision.
    pub fn validate(&self) -> Result<()> {
        let ids = [
            ("program_id", self.program_id),
            ("token_program_id", self.token_program_id),
            ("associated_token_program_id", self.associated_token_program_id),
        ];
        for (i, (name_a, a)) in ids.iter().enumerate() {
            if *a == crate::constants::SYSTEM_PROGRAM_ID {
                return Err(EscrowError::Configuration(format!(
                    "{name_a} must not be the system program"
                )));
            }
            for (name_b, b) in &ids[i + 1..] {
                if a == b {
                    return Err(EscrowError::Configuration(format!(
                        "{name_a} and {name_b} must differ"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program_id: Address::from_label(constants::ESCROW_PROGRAM_LABEL),
            token_program_id: Address::from_label(constants::TOKEN_PROGRAM_LABEL),
            associated_token_program_id: Address::from_label(
                constants::ASSOCIATED_TOKEN_PROGRAM_LABEL,
            ),
            rent: RentConfig::default(),
        }
    }
}
