//! Optional predeployed contracts
//!
//! Each predeploy is a fixed address with code and storage written straight
//! into genesis state. The transparent proxy and its admin only make sense
//! together, so their flags are coupled: every write to one is mirrored to the
//! other before the write returns.

use alloy_primitives::{Address, B256, Bytes, U256, address, b256, hex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::ArtifactError;

/// Transparent upgradeable proxy address
pub const PROXY_ADDRESS: Address = address!("facade0000000000000000000000000000000000");

/// Proxy admin address
pub const PROXY_ADMIN_ADDRESS: Address = address!("dad0000000000000000000000000000000000000");

/// Implementation the proxy points at until its owner upgrades it
pub const PROXY_PLACEHOLDER_IMPLEMENTATION: Address =
    address!("1212121212121212121212121212121212121212");

/// Safe singleton factory address
pub const SAFE_SINGLETON_FACTORY_ADDRESS: Address =
    address!("914d7fec6aac8cd542e72bca78b30650d45643d7");

/// Multicall3 address
pub const MULTICALL3_ADDRESS: Address = address!("ca11bde05977b3631167028862be2a173976ca11");

/// Deterministic deployment proxy address
pub const CREATE2_DEPLOYER_ADDRESS: Address = address!("4e59b44847b379578588920ca78fbf26c0b4956c");

/// Interchain messenger address
pub const ICM_MESSENGER_ADDRESS: Address = address!("253b2784c75e510dd0ff1da844684a1ac0aa5fcf");

/// EIP-1967 implementation slot
pub const EIP1967_IMPLEMENTATION_SLOT: B256 =
    b256!("360894a13ba1a3210667c828492db98dca3e2076cc3735a920a3ca505d382bbc");

/// EIP-1967 admin slot
pub const EIP1967_ADMIN_SLOT: B256 =
    b256!("b53127684a568b3173ae13b9f8a6016e243e63b6e8ee1178d6a717850b5d6103");

/// Runtime code of the deterministic deployment proxy (CREATE2 with salt
/// taken from the first calldata word). The Safe singleton factory runs the
/// same code at its own address.
pub const DETERMINISTIC_DEPLOYMENT_PROXY_CODE: &[u8] = &hex!(
    "7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffe03601600081602082378035828234f58015156039578182fd5b8082525050506014600cf3"
);

/// Flag pairs that must always hold the same value
pub const COUPLINGS: &[(Predeploy, Predeploy)] = &[(Predeploy::Proxy, Predeploy::ProxyAdmin)];

/// A predeployable contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Predeploy {
    /// Transparent upgradeable proxy
    Proxy,
    /// Admin of the transparent proxy
    ProxyAdmin,
    /// Safe singleton factory
    SafeSingletonFactory,
    /// Multicall3
    Multicall3,
    /// Deterministic deployment proxy
    Create2Deployer,
    /// Interchain messenger
    IcmMessenger,
}

impl Predeploy {
    /// All predeploys in emission order
    pub const ALL: [Self; 6] = [
        Self::Proxy,
        Self::ProxyAdmin,
        Self::SafeSingletonFactory,
        Self::Multicall3,
        Self::Create2Deployer,
        Self::IcmMessenger,
    ];

    /// Name used in paths, params files and artifact file names
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Proxy => "proxy",
            Self::ProxyAdmin => "proxyAdmin",
            Self::SafeSingletonFactory => "safeSingletonFactory",
            Self::Multicall3 => "multicall3",
            Self::Create2Deployer => "create2Deployer",
            Self::IcmMessenger => "icmMessenger",
        }
    }

    /// Fixed genesis address
    pub const fn address(&self) -> Address {
        match self {
            Self::Proxy => PROXY_ADDRESS,
            Self::ProxyAdmin => PROXY_ADMIN_ADDRESS,
            Self::SafeSingletonFactory => SAFE_SINGLETON_FACTORY_ADDRESS,
            Self::Multicall3 => MULTICALL3_ADDRESS,
            Self::Create2Deployer => CREATE2_DEPLOYER_ADDRESS,
            Self::IcmMessenger => ICM_MESSENGER_ADDRESS,
        }
    }

    /// Code shipped with the crate; the rest come from an [`ArtifactStore`]
    pub const fn builtin_code(&self) -> Option<&'static [u8]> {
        match self {
            Self::SafeSingletonFactory | Self::Create2Deployer => {
                Some(DETERMINISTIC_DEPLOYMENT_PROXY_CODE)
            }
            _ => None,
        }
    }

    /// Runtime code, empty when no artifact is available
    pub fn code(&self, artifacts: &ArtifactStore) -> Bytes {
        match self.builtin_code() {
            Some(code) => Bytes::from_static(code),
            None => artifacts.get(*self).cloned().unwrap_or_default(),
        }
    }

    /// Whether runtime code is available for this predeploy
    pub fn has_code(&self, artifacts: &ArtifactStore) -> bool {
        self.builtin_code().is_some() || artifacts.get(*self).is_some_and(|c| !c.is_empty())
    }

    /// Genesis balance
    pub const fn balance(&self) -> U256 {
        U256::ZERO
    }

    /// Genesis storage; `owner` controls the proxy admin
    pub fn storage(&self, owner: Address) -> BTreeMap<B256, B256> {
        match self {
            Self::Proxy => BTreeMap::from([
                (EIP1967_IMPLEMENTATION_SLOT, PROXY_PLACEHOLDER_IMPLEMENTATION.into_word()),
                (EIP1967_ADMIN_SLOT, PROXY_ADMIN_ADDRESS.into_word()),
            ]),
            Self::ProxyAdmin => BTreeMap::from([(B256::ZERO, owner.into_word())]),
            _ => BTreeMap::new(),
        }
    }

    /// The flag coupled to this one, if any
    pub fn coupled(&self) -> Option<Self> {
        COUPLINGS.iter().find_map(|&(a, b)| {
            if a == *self {
                Some(b)
            } else if b == *self {
                Some(a)
            } else {
                None
            }
        })
    }
}

/// Which predeploys are enabled.
///
/// Coupled flags are kept equal by [`PreinstallConfig::set`]; call
/// [`PreinstallConfig::resolve_couplings`] after writing fields directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreinstallConfig {
    /// Transparent upgradeable proxy
    pub proxy: bool,
    /// Proxy admin
    pub proxy_admin: bool,
    /// Safe singleton factory
    pub safe_singleton_factory: bool,
    /// Multicall3
    pub multicall3: bool,
    /// Deterministic deployment proxy
    pub create2_deployer: bool,
    /// Interchain messenger
    pub icm_messenger: bool,
}

impl PreinstallConfig {
    /// Everything enabled
    pub const fn all() -> Self {
        Self {
            proxy: true,
            proxy_admin: true,
            safe_singleton_factory: true,
            multicall3: true,
            create2_deployer: true,
            icm_messenger: true,
        }
    }

    /// Whether a predeploy is enabled
    pub const fn is_enabled(&self, predeploy: Predeploy) -> bool {
        match predeploy {
            Predeploy::Proxy => self.proxy,
            Predeploy::ProxyAdmin => self.proxy_admin,
            Predeploy::SafeSingletonFactory => self.safe_singleton_factory,
            Predeploy::Multicall3 => self.multicall3,
            Predeploy::Create2Deployer => self.create2_deployer,
            Predeploy::IcmMessenger => self.icm_messenger,
        }
    }

    const fn flag_mut(&mut self, predeploy: Predeploy) -> &mut bool {
        match predeploy {
            Predeploy::Proxy => &mut self.proxy,
            Predeploy::ProxyAdmin => &mut self.proxy_admin,
            Predeploy::SafeSingletonFactory => &mut self.safe_singleton_factory,
            Predeploy::Multicall3 => &mut self.multicall3,
            Predeploy::Create2Deployer => &mut self.create2_deployer,
            Predeploy::IcmMessenger => &mut self.icm_messenger,
        }
    }

    /// Set a flag and every flag coupled to it
    pub fn set(&mut self, predeploy: Predeploy, enabled: bool) {
        *self.flag_mut(predeploy) = enabled;
        if let Some(other) = predeploy.coupled() {
            *self.flag_mut(other) = enabled;
        }
    }

    /// Flip a flag and every flag coupled to it
    pub fn toggle(&mut self, predeploy: Predeploy) {
        self.set(predeploy, !self.is_enabled(predeploy));
    }

    /// Make coupled flags equal again; a pair with one side on turns both on
    pub fn resolve_couplings(&mut self) {
        for &(a, b) in COUPLINGS {
            let enabled = self.is_enabled(a) || self.is_enabled(b);
            *self.flag_mut(a) = enabled;
            *self.flag_mut(b) = enabled;
        }
    }

    /// Whether every coupling holds
    pub fn couplings_hold(&self) -> bool {
        COUPLINGS.iter().all(|&(a, b)| self.is_enabled(a) == self.is_enabled(b))
    }

    /// Enabled predeploys in emission order
    pub fn enabled(&self) -> impl Iterator<Item = Predeploy> + '_ {
        Predeploy::ALL.into_iter().filter(|p| self.is_enabled(*p))
    }
}

/// Runtime bytecode for predeploys that do not ship with the crate
#[derive(Debug, Clone, Default)]
pub struct ArtifactStore {
    code: BTreeMap<Predeploy, Bytes>,
}

impl ArtifactStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace bytecode
    pub fn with_code(mut self, predeploy: Predeploy, code: impl Into<Bytes>) -> Self {
        self.code.insert(predeploy, code.into());
        self
    }

    /// Bytecode for a predeploy
    pub fn get(&self, predeploy: Predeploy) -> Option<&Bytes> {
        self.code.get(&predeploy)
    }

    /// Number of loaded artifacts
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// Whether nothing is loaded
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Load `<name>.hex` files from a directory. Missing files are skipped.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let dir = dir.as_ref();
        let mut store = Self::new();

        for predeploy in Predeploy::ALL {
            if predeploy.builtin_code().is_some() {
                continue;
            }
            let path = dir.join(format!("{}.hex", predeploy.name()));
            if !path.exists() {
                continue;
            }

            let raw = std::fs::read_to_string(&path).map_err(|source| ArtifactError::Io {
                path: path.display().to_string(),
                source,
            })?;
            let code = hex::decode(raw.trim())
                .map_err(|_| ArtifactError::InvalidHex { path: path.display().to_string() })?;

            debug!(
                target: "subnet::genesis",
                predeploy = predeploy.name(),
                bytes = code.len(),
                "Loaded predeploy artifact"
            );
            store.code.insert(predeploy, code.into());
        }

        Ok(store)
    }
}
