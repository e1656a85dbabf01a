//! Subnet Genesis Synthesis
//!
//! This crate turns a high-level description of a new EVM subnet (chain
//! identity, fee curve, token allocations, allowlist precompiles and optional
//! predeployed contracts) into the genesis document a node loads at block zero.
//!
//! # Document Shape
//!
//! ```text
//! genesis.json
//! ├── config
//! │   ├── chainId
//! │   ├── feeConfig            (gas limit, base fee floor, block gas cost bounds)
//! │   ├── warpConfig           (quorum 67, primary network signers required)
//! │   └── <precompile>Config?  (one per activated allowlist precompile)
//! ├── alloc
//! │   ├── <allocation>         (balance only)
//! │   └── <predeploy>?         (balance, code, storage)
//! ├── gasLimit                 (hex)
//! └── timestamp                (hex)
//! ```
//!
//! Synthesis never re-validates its input. Field problems are reported by
//! `subnet-validation`; the only structural failure here is an empty
//! allocation list, which leaves no owner address to seed admin roles with.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod address;
pub mod builder;
pub mod document;
pub mod index;
pub mod params;
pub mod predeploy;

pub use address::{AddressOracle, HexAddressOracle, NoWallet, StaticWallet, WalletSource};
pub use builder::{AllocationSummary, GenesisBuilder, Synthesized, synthesize};
pub use document::{AllowListConfig, ChainConfig, FeeConfig, GenesisDocument, WarpConfig};
pub use index::{PathIndex, Rendered, Span, SpanKind, render};
pub use params::{
    AllocationEntry, AllowlistPrecompileConfig, Allowlists, ChainIdentity, FeeCurveParameters,
    GenesisParams, Precompile, Role, RoleAddressEntry,
};
pub use predeploy::{ArtifactStore, PreinstallConfig, Predeploy};

use thiserror::Error;

/// Structural synthesis failures
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// No allocations at all, so there is no owner address to seed with
    #[error("genesis requires at least one token allocation")]
    NoAllocations,

    /// Rendering the document failed
    #[error("render error: {0}")]
    Render(#[from] RenderError),
}

/// Errors raised while rendering a document to text
#[derive(Debug, Error)]
pub enum RenderError {
    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while loading predeploy bytecode artifacts
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// IO error
    #[error("IO error reading {path}: {source}")]
    Io {
        /// File that failed to load
        path: String,
        /// Underlying error
        source: std::io::Error,
    },

    /// Artifact file did not contain hex bytecode
    #[error("artifact {path} is not valid hex bytecode")]
    InvalidHex {
        /// Offending file
        path: String,
    },
}

/// Chain constants
pub mod constants {
    /// Decimals of the native token; allocations are given in whole tokens
    pub const NATIVE_TOKEN_DECIMALS: u8 = 18;

    /// Warp quorum numerator, fixed for every subnet
    pub const WARP_QUORUM_NUMERATOR: u64 = 67;

    /// Whether warp messages require primary network signers
    pub const WARP_REQUIRE_PRIMARY_NETWORK_SIGNERS: bool = true;

    /// Activation timestamp of every precompile configured at genesis
    pub const PRECOMPILE_ACTIVATION_TIMESTAMP: u64 = 0;

    /// Size ceiling of the serialized document (64 KiB), imposed by the
    /// chain-creation transaction that embeds it
    pub const MAX_GENESIS_SIZE: usize = 64 * 1024;

    /// One gwei in wei
    pub const GWEI: u64 = 1_000_000_000;
}

/// Logical field paths shared by the validation report and the path index.
pub mod paths {
    /// Chain ID
    pub const CHAIN_ID: &str = "chainId";
    /// Native token name
    pub const TOKEN_NAME: &str = "tokenName";
    /// Native token symbol
    pub const TOKEN_SYMBOL: &str = "tokenSymbol";
    /// Allocation collection
    pub const TOKEN_ALLOCATIONS: &str = "tokenAllocations";
    /// Whole serialized document
    pub const GENESIS: &str = "genesis";
    /// Fee curve group prefix
    pub const FEE_CONFIG: &str = "feeConfig";

    /// `feeConfig.<field>`
    pub fn fee_field(field: &str) -> String {
        format!("{FEE_CONFIG}.{field}")
    }

    /// `tokenAllocations.<i>`
    pub fn allocation(index: usize) -> String {
        format!("{TOKEN_ALLOCATIONS}.{index}")
    }

    /// `tokenAllocations.<i>.<field>`
    pub fn allocation_field(index: usize, field: &str) -> String {
        format!("{TOKEN_ALLOCATIONS}.{index}.{field}")
    }

    /// `predeploy.<name>`
    pub fn predeploy(name: &str) -> String {
        format!("predeploy.{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(paths::fee_field("gasLimit"), "feeConfig.gasLimit");
        assert_eq!(paths::allocation_field(2, "amount"), "tokenAllocations.2.amount");
        assert_eq!(paths::predeploy("multicall3"), "predeploy.multicall3");
    }

    #[test]
    fn test_synthesis_error_display() {
        let err = SynthesisError::NoAllocations;
        assert!(err.to_string().contains("at least one token allocation"));
    }
}
