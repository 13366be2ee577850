//! System-wide constants for the SwapVault escrow engine.

use crate::Address;

/// The system program: owner of plain wallet accounts.
pub const SYSTEM_PROGRAM_ID: Address = Address::ZERO;

/// Namespace seed for custody record derivation.
pub const ESCROW_SEED: &[u8] = b"escrow";

/// Label hashed into the default escrow program id.
pub const ESCROW_PROGRAM_LABEL: &str = "swapvault:program:escrow";

/// Label hashed into the default token program id.
pub const TOKEN_PROGRAM_LABEL: &str = "swapvault:program:token";

/// Label hashed into the default associated-token program id.
pub const ASSOCIATED_TOKEN_PROGRAM_LABEL: &str = "swapvault:program:associated-token";

/// Anchor-style account name hashed into the record discriminator.
pub const CUSTODY_RECORD_ACCOUNT_NAME: &str = "account:Escrow";

/// Marker appended to every program-derived address preimage.
pub const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Maximum number of seeds accepted by address derivation (bump included).
pub const MAX_SEEDS: usize = 16;

/// Maximum length of a single derivation seed, in bytes.
pub const MAX_SEED_LEN: usize = 32;

/// Default rent rate in lamports per byte-year.
pub const DEFAULT_LAMPORTS_PER_BYTE_YEAR: u64 = 3480;

/// Default number of years of rent an account must prepay to be rent-exempt.
pub const DEFAULT_EXEMPTION_THRESHOLD_YEARS: u64 = 2;

/// Per-account storage overhead charged on top of the data length.
pub const DEFAULT_ACCOUNT_STORAGE_OVERHEAD: u64 = 128;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "SwapVault";
