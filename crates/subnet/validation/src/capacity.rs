//! Document capacity and predeploy checks

use subnet_genesis::{ArtifactStore, Predeploy, PreinstallConfig, paths};

use crate::FieldCheck;

/// Serialized size against the embedding transaction's ceiling.
///
/// Over the ceiling is a warning: the document is still produced, and the
/// caller has to hold back submission.
pub fn validate_size(size: usize, limit: usize) -> FieldCheck {
    if size > limit {
        FieldCheck::warning(format!(
            "Genesis is {size} bytes, over the {limit} byte limit of the chain creation transaction"
        ))
    } else {
        FieldCheck::ok()
    }
}

/// Enabled predeploys without bytecode, and broken flag couplings
pub fn validate_predeploys(
    preinstalls: &PreinstallConfig,
    artifacts: &ArtifactStore,
) -> Vec<(String, FieldCheck)> {
    let mut checks = Vec::new();

    for predeploy in preinstalls.enabled() {
        if !predeploy.has_code(artifacts) {
            checks.push((
                paths::predeploy(predeploy.name()),
                FieldCheck::warning(format!(
                    "No bytecode loaded for {}; it will be deployed without code",
                    predeploy.name()
                )),
            ));
        }
    }

    if !preinstalls.couplings_hold() {
        checks.push((
            paths::predeploy(Predeploy::Proxy.name()),
            FieldCheck::warning("proxy and proxyAdmin are always enabled together"),
        ));
    }

    checks
}

#[cfg(test)]
mod tests {
    use super::*;
    use subnet_genesis::constants::MAX_GENESIS_SIZE;

    #[test]
    fn test_size_ceiling() {
        assert!(validate_size(MAX_GENESIS_SIZE, MAX_GENESIS_SIZE).is_ok());
        let check = validate_size(MAX_GENESIS_SIZE + 1, MAX_GENESIS_SIZE);
        assert!(check.error.is_none());
        assert!(check.warning.unwrap().contains("65537"));
    }

    #[test]
    fn test_missing_bytecode() {
        let preinstalls = PreinstallConfig { multicall3: true, create2_deployer: true, ..Default::default() };
        let checks = validate_predeploys(&preinstalls, &ArtifactStore::new());
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].0, "predeploy.multicall3");

        let artifacts = ArtifactStore::new().with_code(Predeploy::Multicall3, vec![0x60]);
        assert!(validate_predeploys(&preinstalls, &artifacts).is_empty());
    }

    #[test]
    fn test_broken_coupling_reported() {
        let preinstalls = PreinstallConfig { proxy: true, ..Default::default() };
        let artifacts = ArtifactStore::new()
            .with_code(Predeploy::Proxy, vec![0x60])
            .with_code(Predeploy::ProxyAdmin, vec![0x60]);
        let checks = validate_predeploys(&preinstalls, &artifacts);
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].0, "predeploy.proxy");
    }
}
