//! Error types for the SwapVault escrow engine.
//!
//! All errors use the `SV_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Custody record errors
//! - 2xx: Funds errors
//! - 3xx: Address derivation errors
//! - 4xx: Authorization errors
//! - 5xx: Account / asset checks
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::Address;

/// Coarse classification of an [`EscrowError`].
///
/// Every rejected transition falls in exactly one class. None of them leaves
/// partial effects behind, so callers never need compensating actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or duplicate record, wrong authorizer, asset mismatch,
    /// zero-amount trade, malformed account. Retry with corrected inputs.
    Precondition,
    /// A token or lamport balance is too low.
    InsufficientFunds,
    /// A supplied account does not match its deterministic derivation.
    AddressMismatch,
    /// Overflow or a broken ledger invariant.
    Internal,
}

/// Central error enum for all SwapVault operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EscrowError {
    // =================================================================
    // Custody Record Errors (1xx)
    // =================================================================
    /// No custody record exists at the given address.
    #[error("SV_ERR_100: Custody record not found: {0}")]
    RecordNotFound(Address),

    /// An account already occupies the derived record address.
    #[error("SV_ERR_101: Custody record already exists: {0}")]
    RecordAlreadyExists(Address),

    /// The record bytes are malformed (bad length or discriminator).
    #[error("SV_ERR_102: Invalid custody record data: {reason}")]
    InvalidRecordData { reason: String },

    /// A trade was requested with a zero amount.
    #[error("SV_ERR_103: Zero amount for {field}")]
    ZeroAmount { field: &'static str },

    // =================================================================
    // Funds Errors (2xx)
    // =================================================================
    /// Token balance too low for the requested transfer.
    #[error("SV_ERR_200: Insufficient token balance in {account}: need {needed}, have {available}")]
    InsufficientFunds {
        account: Address,
        needed: u64,
        available: u64,
    },

    /// Lamport balance too low to fund a new account.
    #[error("SV_ERR_201: Insufficient lamports in {account}: need {needed}, have {available}")]
    InsufficientLamports {
        account: Address,
        needed: u64,
        available: u64,
    },

    // =================================================================
    // Address Derivation Errors (3xx)
    // =================================================================
    /// A supplied account differs from its deterministic derivation.
    #[error("SV_ERR_300: Address mismatch for {role}: expected {expected}, got {actual}")]
    AddressMismatch {
        role: &'static str,
        expected: Address,
        actual: Address,
    },

    /// Seeds are too long/many, or hash onto the ed25519 curve.
    #[error("SV_ERR_301: Invalid derivation seeds")]
    InvalidSeeds,

    /// No bump in 0..=255 produced an off-curve address.
    #[error("SV_ERR_302: No viable bump seed")]
    NoViableBump,

    // =================================================================
    // Authorization Errors (4xx)
    // =================================================================
    /// A required signer did not authorize the call.
    #[error("SV_ERR_400: Missing required signature: {0}")]
    MissingSignature(Address),

    /// The signer is not the party stored on the record.
    #[error("SV_ERR_401: Unauthorized: expected {expected}, got {actual}")]
    Unauthorized { expected: Address, actual: Address },

    /// The ed25519 signature did not verify.
    #[error("SV_ERR_402: Signature verification failed for {0}")]
    InvalidSignature(Address),

    /// The address is not a valid ed25519 public key and cannot sign.
    #[error("SV_ERR_403: Address cannot sign: {0}")]
    InvalidSigner(Address),

    /// The program id has already been claimed on this ledger.
    #[error("SV_ERR_404: Program already deployed: {0}")]
    ProgramAlreadyDeployed(Address),

    /// The program key was not issued by this ledger.
    #[error("SV_ERR_405: Program key not issued by this ledger: {0}")]
    InvalidProgramKey(Address),

    // =================================================================
    // Account / Asset Errors (5xx)
    // =================================================================
    /// The referenced account does not exist.
    #[error("SV_ERR_500: Account not found: {0}")]
    AccountNotFound(Address),

    /// An account already exists at the address.
    #[error("SV_ERR_501: Account already exists: {0}")]
    AccountAlreadyExists(Address),

    /// The account is owned by a different program.
    #[error("SV_ERR_502: Account {account} owned by {actual}, expected {expected}")]
    InvalidAccountOwner {
        account: Address,
        expected: Address,
        actual: Address,
    },

    /// The account bytes do not match the expected layout.
    #[error("SV_ERR_503: Invalid account data: {reason}")]
    InvalidAccountData { reason: String },

    /// A token account or mint holds a different asset than required.
    #[error("SV_ERR_504: Asset mismatch on {account}: expected {expected}, got {actual}")]
    AssetMismatch {
        account: Address,
        expected: Address,
        actual: Address,
    },

    /// A token account's authority is not the expected party.
    #[error("SV_ERR_505: Token owner mismatch on {account}: expected {expected}, got {actual}")]
    TokenOwnerMismatch {
        account: Address,
        expected: Address,
        actual: Address,
    },

    /// A pre-existing vault already holds tokens.
    #[error("SV_ERR_506: Vault {vault} is not empty: holds {amount}")]
    VaultNotEmpty { vault: Address, amount: u64 },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Checked arithmetic overflowed.
    #[error("SV_ERR_900: Arithmetic overflow")]
    ArithmeticOverflow,

    /// Supply or lamport conservation broke. Critical safety alert.
    #[error("SV_ERR_901: Supply invariant violation: {reason}")]
    SupplyInvariantViolation { reason: String },

    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("SV_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// Serialization / deserialization error.
    #[error("SV_ERR_903: Serialization error: {0}")]
    Serialization(String),
}

impl EscrowError {
    /// The taxonomy class of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InsufficientFunds { .. } | Self::InsufficientLamports { .. } => {
                ErrorKind::InsufficientFunds
            }
            Self::AddressMismatch { .. } | Self::InvalidSeeds => ErrorKind::AddressMismatch,
            Self::NoViableBump
            | Self::ArithmeticOverflow
            | Self::SupplyInvariantViolation { .. }
            | Self::Configuration(_)
            | Self::Serialization(_) => ErrorKind::Internal,
            _ => ErrorKind::Precondition,
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, EscrowError>;

impl From<serde_json::Error> for EscrowError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
