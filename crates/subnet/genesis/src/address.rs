//! Address validity and wallet seeding seams

use alloy_primitives::Address;
use std::str::FromStr;

/// Decides whether raw operator input is a well-formed 20-byte address
pub trait AddressOracle: std::fmt::Debug + Send + Sync {
    /// Parse `raw`, returning `None` when it is not a valid address
    fn parse(&self, raw: &str) -> Option<Address>;

    /// Whether `raw` is a valid address
    fn is_valid(&self, raw: &str) -> bool {
        self.parse(raw).is_some()
    }
}

/// Accepts `0x`-prefixed, 40-digit hex strings of any case
#[derive(Debug, Clone, Copy, Default)]
pub struct HexAddressOracle;

impl AddressOracle for HexAddressOracle {
    fn parse(&self, raw: &str) -> Option<Address> {
        let raw = raw.trim();
        let digits = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X"))?;
        if digits.len() != 40 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        Address::from_str(digits).ok()
    }
}

/// Supplies the currently connected wallet address.
///
/// Only ever used as a default seed value, never to decide validity.
pub trait WalletSource: std::fmt::Debug + Send + Sync {
    /// Current wallet address, if any
    fn current_address(&self) -> Option<Address>;
}

/// No wallet connected
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWallet;

impl WalletSource for NoWallet {
    fn current_address(&self) -> Option<Address> {
        None
    }
}

/// Fixed wallet address, e.g. from a CLI flag
#[derive(Debug, Clone, Copy)]
pub struct StaticWallet(pub Address);

impl WalletSource for StaticWallet {
    fn current_address(&self) -> Option<Address> {
        Some(self.0)
    }
}
