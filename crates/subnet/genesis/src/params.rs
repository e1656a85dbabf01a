//! Genesis parameter types

use alloy_primitives::{
    Address, U256,
    utils::{ParseUnits, parse_units},
};
use serde::{Deserialize, Serialize};

use crate::{PreinstallConfig, constants};

/// Chain identity, set once per session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChainIdentity {
    /// EVM chain ID
    pub chain_id: u64,
    /// Native token name
    pub token_name: String,
    /// Native token symbol
    pub token_symbol: String,
    /// Genesis block timestamp in seconds
    pub genesis_timestamp: u64,
}

impl Default for ChainIdentity {
    fn default() -> Self {
        Self {
            chain_id: 0,
            token_name: "COIN".to_string(),
            token_symbol: "COIN".to_string(),
            genesis_timestamp: 0,
        }
    }
}

impl ChainIdentity {
    /// Create an identity stamped with the current wall clock
    pub fn new(chain_id: u64, token_name: impl Into<String>, token_symbol: impl Into<String>) -> Self {
        Self {
            chain_id,
            token_name: token_name.into(),
            token_symbol: token_symbol.into(),
            genesis_timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default(),
        }
    }
}

/// Dynamic fee curve parameters.
///
/// `max_block_gas_cost >= min_block_gas_cost` is maintained by the setters;
/// use [`FeeCurveParameters::normalize`] after writing the fields directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeeCurveParameters {
    /// Block gas limit
    pub gas_limit: u64,
    /// Target seconds between blocks
    pub target_block_rate_seconds: f64,
    /// Base fee floor in wei
    pub min_base_fee: u64,
    /// Gas target over the rolling window
    pub target_gas: u64,
    /// Base fee adjustment damping factor
    pub base_fee_change_denominator: u64,
    /// Lower bound of the block gas cost
    pub min_block_gas_cost: u64,
    /// Upper bound of the block gas cost
    pub max_block_gas_cost: u64,
    /// Block gas cost change per second of deviation from the target rate
    pub block_gas_cost_step: u64,
}

impl Default for FeeCurveParameters {
    fn default() -> Self {
        Self {
            gas_limit: 8_000_000,
            target_block_rate_seconds: 2.0,
            min_base_fee: 25 * constants::GWEI,
            target_gas: 15_000_000,
            base_fee_change_denominator: 36,
            min_block_gas_cost: 0,
            max_block_gas_cost: 1_000_000,
            block_gas_cost_step: 200_000,
        }
    }
}

impl FeeCurveParameters {
    /// Set the lower block gas cost bound, raising the upper bound if needed
    pub fn set_min_block_gas_cost(&mut self, value: u64) {
        self.min_block_gas_cost = value;
        self.normalize();
    }

    /// Set the upper block gas cost bound, clamped to the lower bound
    pub fn set_max_block_gas_cost(&mut self, value: u64) {
        self.max_block_gas_cost = value.max(self.min_block_gas_cost);
    }

    /// Re-establish `max_block_gas_cost >= min_block_gas_cost`
    pub fn normalize(&mut self) {
        self.max_block_gas_cost = self.max_block_gas_cost.max(self.min_block_gas_cost);
    }

    /// Target block rate in whole seconds, as carried by the document.
    ///
    /// Any positive rate is carried as at least one second.
    pub fn target_block_rate(&self) -> u64 {
        if self.target_block_rate_seconds.is_finite() && self.target_block_rate_seconds > 0.0 {
            (self.target_block_rate_seconds.round() as u64).max(1)
        } else {
            0
        }
    }
}

/// A native token allocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationEntry {
    /// Recipient, as entered
    pub address: String,
    /// Amount in whole tokens, as a decimal string
    pub amount: String,
}

impl AllocationEntry {
    /// Create a new allocation
    pub fn new(address: impl Into<String>, amount: impl Into<String>) -> Self {
        Self { address: address.into(), amount: amount.into() }
    }

    /// Amount converted to wei; `None` when unparsable or negative
    pub fn base_units(&self) -> Option<U256> {
        match parse_units(self.amount.trim(), constants::NATIVE_TOKEN_DECIMALS).ok()? {
            ParseUnits::U256(value) => Some(value),
            ParseUnits::I256(_) => None,
        }
    }
}

/// Role bucket of an allowlist precompile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May change any role, including other admins
    Admin,
    /// May change the enabled set
    Manager,
    /// May use the gated operation
    Enabled,
}

impl Role {
    /// All roles in emission order
    pub const ALL: [Self; 3] = [Self::Admin, Self::Manager, Self::Enabled];

    /// Document key of this role's address list
    pub const fn document_key(&self) -> &'static str {
        match self {
            Self::Admin => "adminAddresses",
            Self::Manager => "managerAddresses",
            Self::Enabled => "enabledAddresses",
        }
    }
}

/// An address in an allowlist role bucket
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAddressEntry {
    /// Address, as entered
    pub address: String,
    /// Last validation failure for this address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Set when the entry was pinned by the system and cannot be removed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_reason: Option<String>,
}

impl RoleAddressEntry {
    /// Create a removable entry
    pub fn new(address: impl Into<String>) -> Self {
        Self { address: address.into(), ..Default::default() }
    }

    /// Create a pinned entry
    pub fn pinned(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self { address: address.into(), error: None, required_reason: Some(reason.into()) }
    }

    /// Whether the entry is system-pinned
    pub const fn is_pinned(&self) -> bool {
        self.required_reason.is_some()
    }
}

/// Configuration of one allowlist-style precompile
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AllowlistPrecompileConfig {
    /// Whether the precompile is enabled at genesis
    pub activated: bool,
    /// Admin bucket
    pub admin: Vec<RoleAddressEntry>,
    /// Manager bucket
    pub manager: Vec<RoleAddressEntry>,
    /// Enabled bucket
    pub enabled: Vec<RoleAddressEntry>,
}

impl AllowlistPrecompileConfig {
    /// Entries of one role
    pub fn bucket(&self, role: Role) -> &[RoleAddressEntry] {
        match role {
            Role::Admin => &self.admin,
            Role::Manager => &self.manager,
            Role::Enabled => &self.enabled,
        }
    }

    /// Mutable entries of one role
    pub fn bucket_mut(&mut self, role: Role) -> &mut Vec<RoleAddressEntry> {
        match role {
            Role::Admin => &mut self.admin,
            Role::Manager => &mut self.manager,
            Role::Enabled => &mut self.enabled,
        }
    }

    /// Every entry across the buckets, in emission order
    pub fn entries(&self) -> impl Iterator<Item = (Role, usize, &RoleAddressEntry)> {
        Role::ALL
            .into_iter()
            .flat_map(move |role| self.bucket(role).iter().enumerate().map(move |(i, e)| (role, i, e)))
    }

    /// Whether all buckets are empty
    pub fn is_empty(&self) -> bool {
        self.admin.is_empty() && self.manager.is_empty() && self.enabled.is_empty()
    }
}

/// Allowlist-style precompiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Precompile {
    /// Restricts contract deployment
    ContractDeployerAllowList,
    /// Restricts transaction submission
    TxAllowList,
    /// Restricts native token minting
    NativeMinter,
    /// Restricts fee configuration changes
    FeeManager,
    /// Restricts reward configuration changes
    RewardManager,
}

impl Precompile {
    /// All precompiles in emission order
    pub const ALL: [Self; 5] = [
        Self::ContractDeployerAllowList,
        Self::TxAllowList,
        Self::NativeMinter,
        Self::FeeManager,
        Self::RewardManager,
    ];

    /// Short name, also the params-file key
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ContractDeployerAllowList => "contractDeployerAllowList",
            Self::TxAllowList => "txAllowList",
            Self::NativeMinter => "contractNativeMinter",
            Self::FeeManager => "feeManager",
            Self::RewardManager => "rewardManager",
        }
    }

    /// Key of this precompile's block under `config`
    pub const fn config_key(&self) -> &'static str {
        match self {
            Self::ContractDeployerAllowList => "contractDeployerAllowListConfig",
            Self::TxAllowList => "txAllowListConfig",
            Self::NativeMinter => "contractNativeMinterConfig",
            Self::FeeManager => "feeManagerConfig",
            Self::RewardManager => "rewardManagerConfig",
        }
    }

    /// Field path of this precompile's block, e.g. `config.txAllowListConfig`
    pub fn path(&self) -> String {
        format!("config.{}", self.config_key())
    }
}

/// The five allowlist precompiles
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Allowlists {
    /// Contract deployer allowlist
    pub contract_deployer_allow_list: AllowlistPrecompileConfig,
    /// Transaction allowlist
    pub tx_allow_list: AllowlistPrecompileConfig,
    /// Native token minter
    pub contract_native_minter: AllowlistPrecompileConfig,
    /// Fee manager
    pub fee_manager: AllowlistPrecompileConfig,
    /// Reward manager
    pub reward_manager: AllowlistPrecompileConfig,
}

impl Allowlists {
    /// Config of one precompile
    pub const fn get(&self, precompile: Precompile) -> &AllowlistPrecompileConfig {
        match precompile {
            Precompile::ContractDeployerAllowList => &self.contract_deployer_allow_list,
            Precompile::TxAllowList => &self.tx_allow_list,
            Precompile::NativeMinter => &self.contract_native_minter,
            Precompile::FeeManager => &self.fee_manager,
            Precompile::RewardManager => &self.reward_manager,
        }
    }

    /// Mutable config of one precompile
    pub const fn get_mut(&mut self, precompile: Precompile) -> &mut AllowlistPrecompileConfig {
        match precompile {
            Precompile::ContractDeployerAllowList => &mut self.contract_deployer_allow_list,
            Precompile::TxAllowList => &mut self.tx_allow_list,
            Precompile::NativeMinter => &mut self.contract_native_minter,
            Precompile::FeeManager => &mut self.fee_manager,
            Precompile::RewardManager => &mut self.reward_manager,
        }
    }

    /// All precompiles with their config, in emission order
    pub fn iter(&self) -> impl Iterator<Item = (Precompile, &AllowlistPrecompileConfig)> {
        Precompile::ALL.into_iter().map(move |p| (p, self.get(p)))
    }
}

/// The full parameter snapshot synthesis works from
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenesisParams {
    /// Chain identity
    pub identity: ChainIdentity,
    /// Fee curve
    pub fee_curve: FeeCurveParameters,
    /// Token allocations; the first one seeds owner/admin roles
    pub allocations: Vec<AllocationEntry>,
    /// Allowlist precompiles
    pub allowlists: Allowlists,
    /// Optional predeployed contracts
    pub preinstalls: PreinstallConfig,
    /// Owner of the predeployed proxy admin; defaults to the first allocation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_address: Option<Address>,
}

impl GenesisParams {
    /// Re-establish the invariants the session maintains on every write
    pub fn normalize(&mut self) {
        self.fee_curve.normalize();
        self.preinstalls.resolve_couplings();
    }
}
