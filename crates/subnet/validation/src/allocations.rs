//! Token allocation validators

use alloy_primitives::U256;
use std::collections::HashSet;
use subnet_genesis::{AddressOracle, AllocationEntry, paths};

use crate::FieldCheck;

/// Validate the allocation collection and every entry in it.
///
/// Addresses are compared after parsing, so duplicates are found regardless
/// of letter case. Only the later occurrence of a duplicate is flagged.
pub fn validate_allocations(
    allocations: &[AllocationEntry],
    oracle: &dyn AddressOracle,
) -> Vec<(String, FieldCheck)> {
    if allocations.is_empty() {
        return vec![(
            paths::TOKEN_ALLOCATIONS.to_string(),
            FieldCheck::error("At least one token allocation is required"),
        )];
    }

    let mut checks = Vec::new();
    let mut seen = HashSet::new();

    for (i, entry) in allocations.iter().enumerate() {
        let address_check = match oracle.parse(&entry.address) {
            None => FieldCheck::error("Invalid address format"),
            Some(address) if !seen.insert(address) => FieldCheck::error("Duplicate address"),
            Some(_) => FieldCheck::ok(),
        };
        if !address_check.is_ok() {
            checks.push((paths::allocation_field(i, "address"), address_check));
        }

        let amount_check = validate_amount(entry);
        if !amount_check.is_ok() {
            checks.push((paths::allocation_field(i, "amount"), amount_check));
        }
    }

    checks
}

/// Amount must parse as a positive number of whole tokens
pub fn validate_amount(entry: &AllocationEntry) -> FieldCheck {
    match entry.base_units() {
        Some(amount) if amount > U256::ZERO => FieldCheck::ok(),
        _ => FieldCheck::error("Amount must be greater than zero"),
    }
}
