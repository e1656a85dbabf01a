//! Genesis document types

use alloy_genesis::GenesisAccount;
use alloy_primitives::Address;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{Precompile, constants};

/// The synthesized genesis document.
///
/// Field order here is the serialized key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenesisDocument {
    /// Chain configuration
    pub config: ChainConfig,
    /// Genesis state: allocations first, then predeploys
    pub alloc: IndexMap<Address, GenesisAccount>,
    /// Block gas limit, duplicated from the fee config
    #[serde(with = "alloy_serde::quantity")]
    pub gas_limit: u64,
    /// Genesis timestamp
    #[serde(with = "alloy_serde::quantity")]
    pub timestamp: u64,
}

impl GenesisDocument {
    /// Allowlist block of a precompile, if emitted
    pub const fn allow_list(&self, precompile: Precompile) -> Option<&AllowListConfig> {
        match precompile {
            Precompile::ContractDeployerAllowList => {
                self.config.contract_deployer_allow_list_config.as_ref()
            }
            Precompile::TxAllowList => self.config.tx_allow_list_config.as_ref(),
            Precompile::NativeMinter => self.config.contract_native_minter_config.as_ref(),
            Precompile::FeeManager => self.config.fee_manager_config.as_ref(),
            Precompile::RewardManager => self.config.reward_manager_config.as_ref(),
        }
    }
}

/// The `config` block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfig {
    /// Chain ID
    pub chain_id: u64,
    /// Fee curve
    pub fee_config: FeeConfig,
    /// Cross-chain message quorum
    pub warp_config: WarpConfig,
    /// Contract deployer allowlist, absent when off
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_deployer_allow_list_config: Option<AllowListConfig>,
    /// Transaction allowlist, absent when off
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_allow_list_config: Option<AllowListConfig>,
    /// Native minter, absent when off
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_native_minter_config: Option<AllowListConfig>,
    /// Fee manager, absent when off
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_manager_config: Option<AllowListConfig>,
    /// Reward manager, absent when off
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward_manager_config: Option<AllowListConfig>,
}

impl ChainConfig {
    pub(crate) const fn allow_list_slot(&mut self, precompile: Precompile) -> &mut Option<AllowListConfig> {
        match precompile {
            Precompile::ContractDeployerAllowList => &mut self.contract_deployer_allow_list_config,
            Precompile::TxAllowList => &mut self.tx_allow_list_config,
            Precompile::NativeMinter => &mut self.contract_native_minter_config,
            Precompile::FeeManager => &mut self.fee_manager_config,
            Precompile::RewardManager => &mut self.reward_manager_config,
        }
    }
}

/// The `config.feeConfig` block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeConfig {
    /// Block gas limit
    pub gas_limit: u64,
    /// Base fee floor in wei
    pub min_base_fee: u64,
    /// Rolling-window gas target
    pub target_gas: u64,
    /// Base fee damping factor
    pub base_fee_change_denominator: u64,
    /// Lower block gas cost bound
    pub min_block_gas_cost: u64,
    /// Upper block gas cost bound
    pub max_block_gas_cost: u64,
    /// Block gas cost step
    pub block_gas_cost_step: u64,
    /// Target seconds between blocks
    pub target_block_rate: u64,
}

/// The `config.warpConfig` block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarpConfig {
    /// Signature weight numerator out of 100
    pub quorum_numerator: u64,
    /// Whether primary network validators must sign
    pub require_primary_network_signers: bool,
}

impl Default for WarpConfig {
    fn default() -> Self {
        Self {
            quorum_numerator: constants::WARP_QUORUM_NUMERATOR,
            require_primary_network_signers: constants::WARP_REQUIRE_PRIMARY_NETWORK_SIGNERS,
        }
    }
}

/// An activated allowlist precompile block
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowListConfig {
    /// Activation timestamp
    pub block_timestamp: u64,
    /// Admin role
    pub admin_addresses: Vec<Address>,
    /// Manager role
    pub manager_addresses: Vec<Address>,
    /// Enabled role
    pub enabled_addresses: Vec<Address>,
}
