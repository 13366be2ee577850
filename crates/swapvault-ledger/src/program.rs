//! Program identities.
//!
//! A transaction runs on behalf of one program, and only that program can sign
//! for addresses derived under its id. The right to act as a program is a
//! [`ProgramKey`]: [`Ledger::deploy`] issues it once per program id, and only
//! the ledger that issued it accepts it.

use swapvault_types::{Address, EscrowError, Result};
use tracing::debug;
use uuid::Uuid;

use crate::Ledger;

/// Capability to run transactions as one program.
///
/// Not constructible outside this crate. Whoever deploys a program id holds
/// its only key.
#[derive(Debug, Clone)]
pub struct ProgramKey {
    program_id: Address,
    ledger: Uuid,
}

impl ProgramKey {
    #[must_use]
    pub fn program_id(&self) -> Address {
        self.program_id
    }
}

impl Ledger {
    /// Claim `program_id` and return its key.
    ///
    /// The system, token, and associated-token programs belong to the ledger
    /// itself and are never issued.
    ///
    /// # Errors
    /// `ProgramAlreadyDeployed` if the id has been claimed.
    pub fn deploy(&mut self, program_id: Address) -> Result<ProgramKey> {
        if !self.programs.insert(program_id) {
            return Err(EscrowError::ProgramAlreadyDeployed(program_id));
        }
        debug!(program = %program_id.short(), "Program deployed");
        Ok(ProgramKey {
            program_id,
            ledger: self.instance,
        })
    }

    /// Whether `program_id` is claimed, by a deployment or by the ledger.
    #[must_use]
    pub fn is_deployed(&self, program_id: &Address) -> bool {
        self.programs.contains(program_id)
    }

    /// Reject keys issued by another ledger.
    pub(crate) fn check_key(&self, key: &ProgramKey) -> Result<()> {
        if key.ledger == self.instance && self.programs.contains(&key.program_id) {
            Ok(())
        } else {
            Err(EscrowError::InvalidProgramKey(key.program_id))
        }
    }
}
