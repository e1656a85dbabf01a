//! Session-scoped configuration aggregate
//!
//! [`GenesisSession`] owns every editable entity for one chain being
//! configured. All writes go through its mutation entry points, which never
//! fail: out-of-range indices and edits to pinned entries are ignored, and
//! field problems are left for the validators to report. Two invariants are
//! corrected on every write instead of being flagged:
//!
//! - `maxBlockGasCost >= minBlockGasCost`
//! - coupled predeploy flags are equal

use alloy_primitives::Address;
use std::sync::Arc;
use subnet_genesis::{
    AddressOracle, AllocationEntry, ChainIdentity, FeeCurveParameters, GenesisParams,
    HexAddressOracle, NoWallet, Precompile, Predeploy, PreinstallConfig, Role, RoleAddressEntry,
    WalletSource,
};
use subnet_validation::allowlist;
use tracing::debug;

/// Reason attached to an admin pinned from the connected wallet
pub const WALLET_ADMIN_REASON: &str = "Connected wallet is the initial admin";

/// The configuration aggregate of one genesis authoring session
#[derive(Debug, Clone)]
pub struct GenesisSession {
    params: GenesisParams,
    oracle: Arc<dyn AddressOracle>,
    wallet: Arc<dyn WalletSource>,
}

impl GenesisSession {
    /// Start a session, stamping the genesis timestamp from the wall clock
    pub fn new(chain_id: u64, token_name: impl Into<String>, token_symbol: impl Into<String>) -> Self {
        let params = GenesisParams {
            identity: ChainIdentity::new(chain_id, token_name, token_symbol),
            ..Default::default()
        };
        Self::from_params(params)
    }

    /// Resume a session from a stored snapshot.
    ///
    /// The snapshot is normalized first, so a hand-written file with
    /// `maxBlockGasCost < minBlockGasCost` or a half-enabled proxy pair is
    /// corrected on load.
    pub fn from_params(mut params: GenesisParams) -> Self {
        params.normalize();
        let mut session =
            Self { params, oracle: Arc::new(HexAddressOracle), wallet: Arc::new(NoWallet) };
        session.refresh_entry_errors();
        session
    }

    /// Use a custom address oracle
    pub fn with_oracle(mut self, oracle: Arc<dyn AddressOracle>) -> Self {
        self.oracle = oracle;
        self.refresh_entry_errors();
        self
    }

    /// Use a wallet to seed owner and admin defaults
    pub fn with_wallet(mut self, wallet: Arc<dyn WalletSource>) -> Self {
        self.wallet = wallet;
        self
    }

    /// Current parameters
    pub const fn params(&self) -> &GenesisParams {
        &self.params
    }

    /// Address oracle in use
    pub fn oracle(&self) -> Arc<dyn AddressOracle> {
        Arc::clone(&self.oracle)
    }

    /// Parameters as synthesis should see them.
    ///
    /// When no allocation carries a well-formed address and no owner was set
    /// explicitly, the wallet address becomes the owner.
    pub fn snapshot(&self) -> GenesisParams {
        let mut params = self.params.clone();
        let has_valid_allocation =
            params.allocations.iter().any(|entry| self.oracle.is_valid(&entry.address));
        if params.owner_address.is_none() && !has_valid_allocation {
            params.owner_address = self.wallet.current_address();
        }
        params
    }

    // --- identity ---

    /// Set the chain ID
    pub fn set_chain_id(&mut self, chain_id: u64) {
        self.params.identity.chain_id = chain_id;
    }

    /// Set the native token name
    pub fn set_token_name(&mut self, name: impl Into<String>) {
        self.params.identity.token_name = name.into();
    }

    /// Set the native token symbol
    pub fn set_token_symbol(&mut self, symbol: impl Into<String>) {
        self.params.identity.token_symbol = symbol.into();
    }

    /// Override the genesis timestamp
    pub fn set_genesis_timestamp(&mut self, timestamp: u64) {
        self.params.identity.genesis_timestamp = timestamp;
    }

    /// Set the owner of seeded roles and the proxy admin
    pub fn set_owner_address(&mut self, owner: Option<Address>) {
        self.params.owner_address = owner;
    }

    // --- fee curve ---

    /// Replace the whole fee curve
    pub fn set_fee_curve(&mut self, mut fee_curve: FeeCurveParameters) {
        fee_curve.normalize();
        self.params.fee_curve = fee_curve;
    }

    /// Set the block gas limit
    pub fn set_gas_limit(&mut self, gas_limit: u64) {
        self.params.fee_curve.gas_limit = gas_limit;
    }

    /// Set the target block rate in seconds
    pub fn set_target_block_rate(&mut self, seconds: f64) {
        self.params.fee_curve.target_block_rate_seconds = seconds;
    }

    /// Set the base fee floor in wei
    pub fn set_min_base_fee(&mut self, wei: u64) {
        self.params.fee_curve.min_base_fee = wei;
    }

    /// Set the rolling-window gas target
    pub fn set_target_gas(&mut self, target_gas: u64) {
        self.params.fee_curve.target_gas = target_gas;
    }

    /// Set the base fee change denominator
    pub fn set_base_fee_change_denominator(&mut self, denominator: u64) {
        self.params.fee_curve.base_fee_change_denominator = denominator;
    }

    /// Set the lower block gas cost bound; raises the upper bound if needed
    pub fn set_min_block_gas_cost(&mut self, cost: u64) {
        self.params.fee_curve.set_min_block_gas_cost(cost);
    }

    /// Set the upper block gas cost bound; clamped to the lower bound
    pub fn set_max_block_gas_cost(&mut self, cost: u64) {
        self.params.fee_curve.set_max_block_gas_cost(cost);
    }

    /// Set the block gas cost step
    pub fn set_block_gas_cost_step(&mut self, step: u64) {
        self.params.fee_curve.block_gas_cost_step = step;
    }

    // --- allocations ---

    /// Append an allocation, returning its index
    pub fn add_allocation(&mut self, address: impl Into<String>, amount: impl Into<String>) -> usize {
        self.params.allocations.push(AllocationEntry::new(address, amount));
        self.params.allocations.len() - 1
    }

    /// Change the address of an allocation
    pub fn set_allocation_address(&mut self, index: usize, address: impl Into<String>) {
        match self.params.allocations.get_mut(index) {
            Some(entry) => entry.address = address.into(),
            None => debug!(target: "subnet::session", index, "Ignoring edit of unknown allocation"),
        }
    }

    /// Change the amount of an allocation
    pub fn set_allocation_amount(&mut self, index: usize, amount: impl Into<String>) {
        match self.params.allocations.get_mut(index) {
            Some(entry) => entry.amount = amount.into(),
            None => debug!(target: "subnet::session", index, "Ignoring edit of unknown allocation"),
        }
    }

    /// Remove an allocation
    pub fn remove_allocation(&mut self, index: usize) {
        if index < self.params.allocations.len() {
            self.params.allocations.remove(index);
        } else {
            debug!(target: "subnet::session", index, "Ignoring removal of unknown allocation");
        }
    }

    // --- allowlists ---

    /// Activate or deactivate an allowlist precompile.
    ///
    /// Activating with an empty Admin bucket pins the wallet address as the
    /// first admin, when a wallet is connected.
    pub fn set_allowlist_activated(&mut self, precompile: Precompile, activated: bool) {
        let wallet = self.wallet.current_address();
        let config = self.params.allowlists.get_mut(precompile);
        config.activated = activated;

        if activated && config.admin.is_empty() {
            if let Some(address) = wallet {
                debug!(
                    target: "subnet::session",
                    precompile = precompile.name(),
                    %address,
                    "Pinning wallet as initial admin"
                );
                config.admin.push(RoleAddressEntry::pinned(address.to_string(), WALLET_ADMIN_REASON));
            }
        }
        self.refresh_precompile_errors(precompile);
    }

    /// Append an address to a role bucket
    pub fn add_role_address(&mut self, precompile: Precompile, role: Role, address: impl Into<String>) {
        self.params.allowlists.get_mut(precompile).bucket_mut(role).push(RoleAddressEntry::new(address));
        self.refresh_precompile_errors(precompile);
    }

    /// Change a role address; pinned entries are left untouched
    pub fn set_role_address(
        &mut self,
        precompile: Precompile,
        role: Role,
        index: usize,
        address: impl Into<String>,
    ) {
        match self.params.allowlists.get_mut(precompile).bucket_mut(role).get_mut(index) {
            Some(entry) if !entry.is_pinned() => entry.address = address.into(),
            Some(_) => debug!(
                target: "subnet::session",
                precompile = precompile.name(),
                index,
                "Ignoring edit of pinned role address"
            ),
            None => debug!(
                target: "subnet::session",
                precompile = precompile.name(),
                index,
                "Ignoring edit of unknown role address"
            ),
        }
        self.refresh_precompile_errors(precompile);
    }

    /// Remove a role address; pinned entries are never removed
    pub fn remove_role_address(&mut self, precompile: Precompile, role: Role, index: usize) {
        let bucket = self.params.allowlists.get_mut(precompile).bucket_mut(role);
        match bucket.get(index) {
            Some(entry) if !entry.is_pinned() => {
                bucket.remove(index);
            }
            Some(_) => debug!(
                target: "subnet::session",
                precompile = precompile.name(),
                index,
                "Ignoring removal of pinned role address"
            ),
            None => debug!(
                target: "subnet::session",
                precompile = precompile.name(),
                index,
                "Ignoring removal of unknown role address"
            ),
        }
        self.refresh_precompile_errors(precompile);
    }

    // --- predeploys ---

    /// Enable or disable a predeploy and everything coupled to it
    pub fn set_preinstall(&mut self, predeploy: Predeploy, enabled: bool) {
        self.params.preinstalls.set(predeploy, enabled);
    }

    /// Flip a predeploy and everything coupled to it
    pub fn toggle_preinstall(&mut self, predeploy: Predeploy) {
        self.params.preinstalls.toggle(predeploy);
    }

    /// Replace the whole predeploy selection, resolving couplings
    pub fn set_preinstalls(&mut self, mut preinstalls: PreinstallConfig) {
        preinstalls.resolve_couplings();
        self.params.preinstalls = preinstalls;
    }

    fn refresh_entry_errors(&mut self) {
        for precompile in Precompile::ALL {
            self.refresh_precompile_errors(precompile);
        }
    }

    fn refresh_precompile_errors(&mut self, precompile: Precompile) {
        let config = self.params.allowlists.get_mut(precompile);
        let errors = allowlist::entry_errors(config, self.oracle.as_ref());
        for (role, index, error) in errors {
            config.bucket_mut(role)[index].error = error;
        }
    }
}
