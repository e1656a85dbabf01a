//! Allowlist precompile validators

use std::collections::HashSet;
use subnet_genesis::{AddressOracle, AllowlistPrecompileConfig, Precompile, Role};

use crate::FieldCheck;

/// Per-entry problem, in [`AllowlistPrecompileConfig::entries`] order.
///
/// Duplicates are detected across the union of all role buckets; only the
/// later occurrence is flagged.
pub fn entry_errors(
    config: &AllowlistPrecompileConfig,
    oracle: &dyn AddressOracle,
) -> Vec<(Role, usize, Option<String>)> {
    let mut seen = HashSet::new();
    config
        .entries()
        .map(|(role, i, entry)| {
            let error = match oracle.parse(&entry.address) {
                None if entry.address.trim().is_empty() => Some("Address is required".to_string()),
                None => Some("Invalid address format".to_string()),
                Some(address) if !seen.insert(address) => Some("Duplicate address".to_string()),
                Some(_) => None,
            };
            (role, i, error)
        })
        .collect()
}

/// Validate one allowlist precompile.
///
/// An activated precompile needs at least one valid address somewhere in
/// its role buckets; which bucket is not checked.
pub fn validate_allowlist(
    precompile: Precompile,
    config: &AllowlistPrecompileConfig,
    oracle: &dyn AddressOracle,
) -> Vec<(String, FieldCheck)> {
    let path = precompile.path();
    let mut checks = Vec::new();

    let errors = entry_errors(config, oracle);
    let valid = errors.iter().filter(|(_, _, error)| error.is_none()).count();

    if config.activated && valid == 0 {
        checks.push((
            path.clone(),
            FieldCheck::error(format!(
                "At least one valid address is required when {} is activated",
                precompile.name()
            )),
        ));
    }

    for (role, i, error) in errors {
        if let Some(error) = error {
            checks.push((format!("{path}.{}.{i}", role.document_key()), FieldCheck::error(error)));
        }
    }

    checks
}

#[cfg(test)]
mod tests {
    use super::*;
    use subnet_genesis::{HexAddressOracle, RoleAddressEntry};

    const A: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa1";
    const B: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb2";

    #[test]
    fn test_inactive_empty_is_fine() {
        let config = AllowlistPrecompileConfig::default();
        assert!(validate_allowlist(Precompile::TxAllowList, &config, &HexAddressOracle).is_empty());
    }

    #[test]
    fn test_activated_empty_errors() {
        let config = AllowlistPrecompileConfig { activated: true, ..Default::default() };
        let checks = validate_allowlist(Precompile::FeeManager, &config, &HexAddressOracle);
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].0, "config.feeManagerConfig");
        assert!(checks[0].1.error.as_ref().unwrap().contains("feeManager"));
    }

    #[test]
    fn test_any_bucket_satisfies_activation() {
        let mut config = AllowlistPrecompileConfig { activated: true, ..Default::default() };
        config.enabled.push(RoleAddressEntry::new(B));
        assert!(validate_allowlist(Precompile::NativeMinter, &config, &HexAddressOracle).is_empty());
    }

    #[test]
    fn test_only_invalid_addresses_still_errors() {
        let mut config = AllowlistPrecompileConfig { activated: true, ..Default::default() };
        config.admin.push(RoleAddressEntry::new("0xabc"));
        config.manager.push(RoleAddressEntry::new(""));

        let checks = validate_allowlist(Precompile::TxAllowList, &config, &HexAddressOracle);
        let paths: Vec<_> = checks.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(
            paths,
            [
                "config.txAllowListConfig",
                "config.txAllowListConfig.adminAddresses.0",
                "config.txAllowListConfig.managerAddresses.0",
            ]
        );
    }

    #[test]
    fn test_duplicates_across_buckets() {
        let mut config = AllowlistPrecompileConfig::default();
        config.admin.push(RoleAddressEntry::new(A));
        config.enabled.push(RoleAddressEntry::new(A.to_uppercase().replacen("0X", "0x", 1)));
        config.enabled.push(RoleAddressEntry::new(B));

        let errors = entry_errors(&config, &HexAddressOracle);
        assert_eq!(errors[0], (Role::Admin, 0, None));
        assert_eq!(errors[1], (Role::Enabled, 0, Some("Duplicate address".to_string())));
        assert_eq!(errors[2], (Role::Enabled, 1, None));
    }
}
