//! Subnet Genesis Validation
//!
//! Field validators are pure, total functions over the raw parameter values.
//! Each one yields at most one error and one warning for its field path; the
//! [`Validator`] runs all of them against a snapshot and merges the results
//! into one [`ValidationReport`].
//!
//! ```text
//! GenesisParams ──► identity   ──┐
//!               ──► fee        ──┤
//!               ──► allocations──┼──► ValidationReport { errors, warnings }
//!               ──► allowlist  ──┤        (keyed by field path)
//!               ──► capacity   ──┘
//! ```
//!
//! Validators never read each other's output, only raw values, so the report
//! is the same whatever order they run in. Nothing here blocks synthesis.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod allocations;
pub mod allowlist;
pub mod capacity;
pub mod fee;
pub mod identity;

pub use fee::FeeField;

use serde::Serialize;
use std::collections::BTreeMap;
use subnet_genesis::{AddressOracle, ArtifactStore, GenesisParams, HexAddressOracle, paths};
use tracing::trace;

/// Outcome of validating one field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldCheck {
    /// Problem that makes the value unusable
    pub error: Option<String>,
    /// Value is usable but likely a mistake
    pub warning: Option<String>,
}

impl FieldCheck {
    /// No problems
    pub const fn ok() -> Self {
        Self { error: None, warning: None }
    }

    /// An error
    pub fn error(message: impl Into<String>) -> Self {
        Self { error: Some(message.into()), warning: None }
    }

    /// A warning
    pub fn warning(message: impl Into<String>) -> Self {
        Self { error: None, warning: Some(message.into()) }
    }

    /// Whether there is nothing to report
    pub const fn is_ok(&self) -> bool {
        self.error.is_none() && self.warning.is_none()
    }
}

/// Errors and warnings keyed by field path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Field path to error message
    pub errors: BTreeMap<String, String>,
    /// Field path to warning message
    pub warnings: BTreeMap<String, String>,
}

impl ValidationReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one field check
    pub fn record(&mut self, path: impl Into<String>, check: FieldCheck) {
        let path = path.into();
        if let Some(error) = check.error {
            self.add_error(path.clone(), error);
        }
        if let Some(warning) = check.warning {
            self.add_warning(path, warning);
        }
    }

    /// Record an error
    pub fn add_error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.insert(path.into(), message.into());
    }

    /// Record a warning
    pub fn add_warning(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.insert(path.into(), message.into());
    }

    /// Error at a path
    pub fn error(&self, path: &str) -> Option<&str> {
        self.errors.get(path).map(String::as_str)
    }

    /// Warning at a path
    pub fn warning(&self, path: &str) -> Option<&str> {
        self.warnings.get(path).map(String::as_str)
    }

    /// Whether any error is present
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Whether neither errors nor warnings are present
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// Runs every field validator against a parameter snapshot
#[derive(Debug)]
pub struct Validator<'a> {
    oracle: &'a dyn AddressOracle,
    artifacts: Option<&'a ArtifactStore>,
}

impl Default for Validator<'_> {
    fn default() -> Self {
        Self { oracle: &HexAddressOracle, artifacts: None }
    }
}

impl<'a> Validator<'a> {
    /// Create a validator using the given address oracle
    pub const fn new(oracle: &'a dyn AddressOracle) -> Self {
        Self { oracle, artifacts: None }
    }

    /// Also check that enabled predeploys have bytecode in `artifacts`
    pub const fn with_artifacts(mut self, artifacts: &'a ArtifactStore) -> Self {
        self.artifacts = Some(artifacts);
        self
    }

    /// Validate a full snapshot
    pub fn validate(&self, params: &GenesisParams) -> ValidationReport {
        let mut report = ValidationReport::new();
        let identity = &params.identity;

        report.record(paths::CHAIN_ID, identity::validate_chain_id(identity.chain_id));
        report.record(paths::TOKEN_NAME, identity::validate_token_name(&identity.token_name));
        report.record(paths::TOKEN_SYMBOL, identity::validate_token_symbol(&identity.token_symbol));

        for field in FeeField::ALL {
            report.record(field.path(), fee::validate_fee_field(field, &params.fee_curve));
        }

        for (path, check) in allocations::validate_allocations(&params.allocations, self.oracle) {
            report.record(path, check);
        }

        for (precompile, config) in params.allowlists.iter() {
            for (path, check) in allowlist::validate_allowlist(precompile, config, self.oracle) {
                report.record(path, check);
            }
        }

        if let Some(artifacts) = self.artifacts {
            for (path, check) in capacity::validate_predeploys(&params.preinstalls, artifacts) {
                report.record(path, check);
            }
        }

        trace!(
            target: "subnet::validation",
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "Validated snapshot"
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use subnet_genesis::{AllocationEntry, Precompile, Predeploy, RoleAddressEntry};

    fn valid_params() -> GenesisParams {
        let mut params = GenesisParams::default();
        params.identity.chain_id = 54321;
        params.allocations.push(AllocationEntry::new(
            "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa1",
            "1000000",
        ));
        params
    }

    #[test]
    fn test_valid_params_are_clean() {
        let report = Validator::default().validate(&valid_params());
        assert!(report.is_empty(), "{report:?}");
    }

    #[test]
    fn test_report_is_keyed_by_field_path() {
        let mut params = valid_params();
        params.identity.chain_id = 0;
        params.identity.token_symbol = "coin".into();
        params.fee_curve.gas_limit = 10;
        params.allocations[0].amount = "0".into();

        let report = Validator::default().validate(&params);
        assert!(report.error("chainId").is_some());
        assert!(report.error("tokenSymbol").is_some());
        assert!(report.error("feeConfig.gasLimit").is_some());
        assert!(report.error("tokenAllocations.0.amount").is_some());
        assert!(report.error("tokenName").is_none());
    }

    #[test]
    fn test_activated_allowlist_without_addresses() {
        let mut params = valid_params();
        params.allowlists.tx_allow_list.activated = true;

        let report = Validator::default().validate(&params);
        assert!(report.error(&Precompile::TxAllowList.path()).is_some());

        params.allowlists.tx_allow_list.admin.push(RoleAddressEntry::new(
            "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb2",
        ));
        let report = Validator::default().validate(&params);
        assert!(report.is_empty(), "{report:?}");
    }

    #[test]
    fn test_artifact_warnings_only_with_store() {
        let mut params = valid_params();
        params.preinstalls.set(Predeploy::Multicall3, true);

        assert!(Validator::default().validate(&params).is_empty());

        let artifacts = ArtifactStore::new();
        let report = Validator::default().with_artifacts(&artifacts).validate(&params);
        assert!(report.warning("predeploy.multicall3").is_some());
        assert!(!report.has_errors());
    }

    #[test]
    fn test_validation_is_deterministic() {
        let mut params = valid_params();
        params.identity.chain_id = 43114;
        params.fee_curve.target_gas = 1;
        params.allocations.push(AllocationEntry::new("bad", "-3"));

        let a = Validator::default().validate(&params);
        let b = Validator::default().validate(&params);
        assert_eq!(a, b);
        assert!(a.warning("chainId").is_some());
    }

    #[test]
    fn test_record_and_serialize() {
        let mut report = ValidationReport::new();
        report.record("chainId", FieldCheck::error("bad"));
        report.record("genesis", FieldCheck::warning("big"));
        report.record("tokenName", FieldCheck::ok());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["errors"]["chainId"], "bad");
        assert_eq!(json["warnings"]["genesis"], "big");
    }
}
