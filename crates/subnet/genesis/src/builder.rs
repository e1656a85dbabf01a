//! Genesis document synthesis

use alloy_genesis::GenesisAccount;
use alloy_primitives::{Address, U256};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

use crate::{
    AddressOracle, AllocationEntry, AllowListConfig, AllowlistPrecompileConfig, Allowlists,
    ArtifactStore, ChainConfig, ChainIdentity, FeeConfig, FeeCurveParameters, GenesisDocument,
    GenesisParams, HexAddressOracle, Predeploy, PreinstallConfig, Rendered, Role, SynthesisError,
    WarpConfig, constants, index,
};

static HEX_ORACLE: HexAddressOracle = HexAddressOracle;

/// Balances derived from the allocation list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationSummary {
    /// Balance per emitted address, in allocation order
    pub balances: IndexMap<Address, U256>,
    /// Where each input allocation landed; `None` when its address was malformed
    pub slots: Vec<Option<Address>>,
    /// Sum of all emitted balances
    pub total_supply: U256,
}

/// Output of one synthesis pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesized {
    /// The genesis document
    pub document: GenesisDocument,
    /// Derived balance map
    pub summary: AllocationSummary,
    /// Owner used for seeded admin roles and the proxy admin
    pub owner: Address,
    /// Predeploys present in `alloc`, in emission order
    pub predeploys: Vec<Predeploy>,
}

impl Synthesized {
    /// Serialize the document and index every path in it
    pub fn render(&self) -> Result<Rendered, SynthesisError> {
        Ok(index::render(self)?)
    }
}

/// Builder for subnet genesis documents
#[derive(Debug)]
pub struct GenesisBuilder<'a> {
    params: &'a GenesisParams,
    artifacts: Option<&'a ArtifactStore>,
    oracle: Option<&'a dyn AddressOracle>,
}

impl<'a> GenesisBuilder<'a> {
    /// Create a new genesis builder
    pub const fn new(params: &'a GenesisParams) -> Self {
        Self { params, artifacts: None, oracle: None }
    }

    /// Use bytecode from an artifact store for predeploys
    pub const fn with_artifacts(mut self, artifacts: &'a ArtifactStore) -> Self {
        self.artifacts = Some(artifacts);
        self
    }

    /// Use a custom address oracle
    pub const fn with_oracle(mut self, oracle: &'a dyn AddressOracle) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// Build the genesis document
    pub fn build(&self) -> Result<Synthesized, SynthesisError> {
        let empty = ArtifactStore::new();
        synthesize(
            &self.params.identity,
            &self.params.fee_curve,
            &self.params.allocations,
            &self.params.allowlists,
            &self.params.preinstalls,
            self.params.owner_address,
            self.artifacts.unwrap_or(&empty),
            self.oracle.unwrap_or(&HEX_ORACLE),
        )
    }

    /// Build and serialize the genesis document
    pub fn render(&self) -> Result<Rendered, SynthesisError> {
        self.build()?.render()
    }

    /// Get genesis as JSON string
    pub fn to_json(&self) -> Result<String, SynthesisError> {
        Ok(self.render()?.text)
    }

    /// Write genesis to a JSON file
    pub fn write_json(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = self.to_json().map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

/// Synthesize a genesis document from a full parameter set.
///
/// Input is trusted: invalid entries are skipped or defaulted, never reported.
/// Fails only when there are no allocations at all.
#[allow(clippy::too_many_arguments)]
pub fn synthesize(
    identity: &ChainIdentity,
    fee_curve: &FeeCurveParameters,
    allocations: &[AllocationEntry],
    allowlists: &Allowlists,
    preinstalls: &PreinstallConfig,
    owner_address: Option<Address>,
    artifacts: &ArtifactStore,
    oracle: &dyn AddressOracle,
) -> Result<Synthesized, SynthesisError> {
    if allocations.is_empty() {
        return Err(SynthesisError::NoAllocations);
    }

    let summary = summarize_allocations(allocations, oracle);
    let seed = summary
        .slots
        .iter()
        .flatten()
        .next()
        .copied()
        .or(owner_address)
        .unwrap_or(Address::ZERO);
    let owner = owner_address.unwrap_or(seed);

    let mut alloc: IndexMap<Address, GenesisAccount> = summary
        .balances
        .iter()
        .map(|(address, balance)| {
            (*address, GenesisAccount { balance: *balance, ..Default::default() })
        })
        .collect();

    let mut preinstalls = *preinstalls;
    preinstalls.resolve_couplings();
    let predeploys: Vec<Predeploy> = preinstalls.enabled().collect();
    for predeploy in &predeploys {
        let account = alloc.entry(predeploy.address()).or_default();
        account.balance = account.balance.saturating_add(predeploy.balance());
        account.code = Some(predeploy.code(artifacts));
        account.storage = Some(predeploy.storage(owner));
    }

    let mut config = ChainConfig {
        chain_id: identity.chain_id,
        fee_config: fee_config(fee_curve),
        warp_config: WarpConfig::default(),
        contract_deployer_allow_list_config: None,
        tx_allow_list_config: None,
        contract_native_minter_config: None,
        fee_manager_config: None,
        reward_manager_config: None,
    };
    for (precompile, list) in allowlists.iter() {
        if list.activated {
            *config.allow_list_slot(precompile) = Some(allow_list_block(list, seed, oracle));
        }
    }

    debug!(
        target: "subnet::genesis",
        chain_id = identity.chain_id,
        accounts = alloc.len(),
        predeploys = predeploys.len(),
        total_supply = %summary.total_supply,
        "Synthesized genesis"
    );

    let document = GenesisDocument {
        config,
        alloc,
        gas_limit: fee_curve.gas_limit,
        timestamp: identity.genesis_timestamp,
    };

    Ok(Synthesized { document, summary, owner, predeploys })
}

/// Convert allocations to a base-unit balance map.
///
/// Malformed addresses are skipped; a repeated address keeps its first amount.
pub fn summarize_allocations(
    allocations: &[AllocationEntry],
    oracle: &dyn AddressOracle,
) -> AllocationSummary {
    let mut summary = AllocationSummary::default();

    for entry in allocations {
        let address = oracle.parse(&entry.address);
        summary.slots.push(address);

        let Some(address) = address else { continue };
        if summary.balances.contains_key(&address) {
            continue;
        }
        let balance = entry.base_units().unwrap_or_default();
        summary.total_supply = summary.total_supply.saturating_add(balance);
        summary.balances.insert(address, balance);
    }

    summary
}

fn fee_config(fee_curve: &FeeCurveParameters) -> FeeConfig {
    FeeConfig {
        gas_limit: fee_curve.gas_limit,
        min_base_fee: fee_curve.min_base_fee,
        target_gas: fee_curve.target_gas,
        base_fee_change_denominator: fee_curve.base_fee_change_denominator,
        min_block_gas_cost: fee_curve.min_block_gas_cost,
        max_block_gas_cost: fee_curve.max_block_gas_cost,
        block_gas_cost_step: fee_curve.block_gas_cost_step,
        target_block_rate: fee_curve.target_block_rate(),
    }
}

fn allow_list_block(
    list: &AllowlistPrecompileConfig,
    seed: Address,
    oracle: &dyn AddressOracle,
) -> AllowListConfig {
    let mut seen = HashSet::new();
    let mut block = AllowListConfig {
        block_timestamp: constants::PRECOMPILE_ACTIVATION_TIMESTAMP,
        ..Default::default()
    };

    for role in Role::ALL {
        let mut addresses: Vec<Address> = list
            .bucket(role)
            .iter()
            .filter_map(|entry| oracle.parse(&entry.address))
            .filter(|address| seen.insert(*address))
            .collect();

        if role == Role::Admin && addresses.is_empty() {
            seen.insert(seed);
            addresses.push(seed);
        }

        match role {
            Role::Admin => block.admin_addresses = addresses,
            Role::Manager => block.manager_addresses = addresses,
            Role::Enabled => block.enabled_addresses = addresses,
        }
    }

    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Precompile, RoleAddressEntry};
    use assert_matches::assert_matches;

    const FIRST: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa1";
    const SECOND: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb2";

    fn addr(raw: &str) -> Address {
        HexAddressOracle.parse(raw).unwrap()
    }

    fn base_params() -> GenesisParams {
        GenesisParams {
            identity: ChainIdentity {
                chain_id: 54321,
                token_name: "COIN".into(),
                token_symbol: "COIN".into(),
                genesis_timestamp: 1_700_000_000,
            },
            allocations: vec![AllocationEntry::new(FIRST, "1000000")],
            ..Default::default()
        }
    }

    #[test]
    fn test_minimal_genesis() {
        let params = base_params();
        let out = GenesisBuilder::new(&params).build().unwrap();
        let doc = &out.document;

        assert_eq!(doc.config.chain_id, 54321);
        assert_eq!(doc.alloc.len(), 1);
        let account = &doc.alloc[&addr(FIRST)];
        assert_eq!(account.balance, U256::from(1_000_000u64) * U256::from(10u64).pow(U256::from(18u64)));
        assert!(account.code.is_none());
        for precompile in Precompile::ALL {
            assert!(doc.allow_list(precompile).is_none());
        }
        assert!(out.predeploys.is_empty());
        assert_eq!(doc.config.warp_config.quorum_numerator, 67);
        assert!(doc.config.warp_config.require_primary_network_signers);
    }

    #[test]
    fn test_minimal_genesis_json_shape() {
        let json = GenesisBuilder::new(&base_params()).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let config = value["config"].as_object().unwrap();
        let keys: Vec<_> = config.keys().map(String::as_str).collect();
        assert_eq!(keys, ["chainId", "feeConfig", "warpConfig"]);
        assert_eq!(value["alloc"].as_object().unwrap().len(), 1);
        assert_eq!(value["gasLimit"], "0x7a1200");
        assert_eq!(value["timestamp"], "0x6553f100");
        assert_eq!(value["config"]["feeConfig"]["gasLimit"], 8_000_000);
        assert_eq!(value["config"]["feeConfig"]["targetBlockRate"], 2);
    }

    #[test]
    fn test_activated_allowlist_emits_admin() {
        let mut params = base_params();
        let list = &mut params.allowlists.contract_deployer_allow_list;
        list.activated = true;
        list.admin.push(RoleAddressEntry::new(SECOND));

        let doc = GenesisBuilder::new(&params).build().unwrap().document;
        let block = doc.allow_list(Precompile::ContractDeployerAllowList).unwrap();
        assert_eq!(block.block_timestamp, 0);
        assert_eq!(block.admin_addresses, vec![addr(SECOND)]);
        assert!(block.manager_addresses.is_empty());
        assert!(block.enabled_addresses.is_empty());
        assert!(doc.config.tx_allow_list_config.is_none());
    }

    #[test]
    fn test_empty_allowlist_is_seeded_with_first_allocation() {
        let mut params = base_params();
        params.allowlists.tx_allow_list.activated = true;
        params.allowlists.tx_allow_list.enabled.push(RoleAddressEntry::new(FIRST));
        params.allowlists.tx_allow_list.enabled.push(RoleAddressEntry::new(SECOND));

        let doc = GenesisBuilder::new(&params).build().unwrap().document;
        let block = doc.config.tx_allow_list_config.unwrap();
        assert_eq!(block.admin_addresses, vec![addr(FIRST)]);
        assert_eq!(block.enabled_addresses, vec![addr(SECOND)]);
    }

    #[test]
    fn test_invalid_role_addresses_are_dropped() {
        let mut params = base_params();
        let list = &mut params.allowlists.fee_manager;
        list.activated = true;
        list.admin.push(RoleAddressEntry::new("0xnope"));
        list.admin.push(RoleAddressEntry::new(SECOND));
        list.manager.push(RoleAddressEntry::new(SECOND.to_uppercase().replace("0X", "0x")));

        let doc = GenesisBuilder::new(&params).build().unwrap().document;
        let block = doc.config.fee_manager_config.unwrap();
        assert_eq!(block.admin_addresses, vec![addr(SECOND)]);
        assert!(block.manager_addresses.is_empty());
    }

    #[test]
    fn test_no_allocations_fails() {
        let mut params = base_params();
        params.allocations.clear();
        assert_matches!(GenesisBuilder::new(&params).build(), Err(SynthesisError::NoAllocations));
    }

    #[test]
    fn test_malformed_allocations_still_generate() {
        let mut params = base_params();
        params.allocations = vec![
            AllocationEntry::new("0x12", "5"),
            AllocationEntry::new(SECOND, "abc"),
            AllocationEntry::new(SECOND, "7"),
        ];

        let out = GenesisBuilder::new(&params).build().unwrap();
        assert_eq!(out.summary.slots, vec![None, Some(addr(SECOND)), Some(addr(SECOND))]);
        assert_eq!(out.document.alloc.len(), 1);
        assert_eq!(out.document.alloc[&addr(SECOND)].balance, U256::ZERO);
        assert_eq!(out.owner, addr(SECOND));
    }

    #[test]
    fn test_owner_falls_back_to_zero() {
        let mut params = base_params();
        params.allocations = vec![AllocationEntry::new("garbage", "1")];
        params.preinstalls.set(Predeploy::ProxyAdmin, true);

        let out = GenesisBuilder::new(&params).build().unwrap();
        assert_eq!(out.owner, Address::ZERO);
        assert!(out.document.alloc.contains_key(&Predeploy::ProxyAdmin.address()));
    }

    #[test]
    fn test_predeploys_follow_allocations() {
        let mut params = base_params();
        params.preinstalls = PreinstallConfig { proxy: true, multicall3: true, ..Default::default() };
        let artifacts = ArtifactStore::new().with_code(Predeploy::Multicall3, vec![0x60, 0x80]);

        let out = GenesisBuilder::new(&params).with_artifacts(&artifacts).build().unwrap();
        assert_eq!(out.predeploys, vec![Predeploy::Proxy, Predeploy::ProxyAdmin, Predeploy::Multicall3]);

        let keys: Vec<_> = out.document.alloc.keys().copied().collect();
        assert_eq!(keys[0], addr(FIRST));
        assert_eq!(&keys[1..], &[crate::predeploy::PROXY_ADDRESS, crate::predeploy::PROXY_ADMIN_ADDRESS, crate::predeploy::MULTICALL3_ADDRESS]);

        let admin = &out.document.alloc[&crate::predeploy::PROXY_ADMIN_ADDRESS];
        assert_eq!(admin.storage.as_ref().unwrap()[&alloy_primitives::B256::ZERO], addr(FIRST).into_word());
        let multicall = &out.document.alloc[&crate::predeploy::MULTICALL3_ADDRESS];
        assert_eq!(multicall.code.as_ref().unwrap().as_ref(), &[0x60, 0x80]);
    }

    #[test]
    fn test_explicit_owner_controls_proxy_admin() {
        let mut params = base_params();
        let owner = addr(SECOND);
        params.owner_address = Some(owner);
        params.preinstalls.set(Predeploy::Proxy, true);

        let out = GenesisBuilder::new(&params).build().unwrap();
        assert_eq!(out.owner, owner);
        let admin = &out.document.alloc[&crate::predeploy::PROXY_ADMIN_ADDRESS];
        assert_eq!(admin.storage.as_ref().unwrap()[&alloy_primitives::B256::ZERO], owner.into_word());
    }

    #[test]
    fn test_synthesis_is_idempotent() {
        let mut params = base_params();
        params.preinstalls = PreinstallConfig::all();
        params.allowlists.reward_manager.activated = true;

        let first = GenesisBuilder::new(&params).to_json().unwrap();
        let second = GenesisBuilder::new(&params).to_json().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_total_supply() {
        let mut params = base_params();
        params.allocations.push(AllocationEntry::new(SECOND, "0.5"));
        let out = GenesisBuilder::new(&params).build().unwrap();

        let wei = U256::from(10u64).pow(U256::from(18u64));
        assert_eq!(out.summary.total_supply, U256::from(1_000_000u64) * wei + wei / U256::from(2u64));
    }

    #[test]
    fn test_write_genesis_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genesis.json");

        GenesisBuilder::new(&base_params()).write_json(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("54321"));
        assert!(content.contains("warpConfig"));
    }
}
