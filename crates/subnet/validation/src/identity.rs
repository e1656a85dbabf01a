//! Chain identity and token metadata validators

use crate::FieldCheck;

/// Longest accepted token name
pub const MAX_TOKEN_NAME_LEN: usize = 50;

/// Longest accepted token symbol
pub const MAX_TOKEN_SYMBOL_LEN: usize = 10;

/// Chain IDs already in wide use
pub const KNOWN_CHAIN_IDS: &[(u64, &str)] = &[
    (1, "Ethereum Mainnet"),
    (10, "Optimism"),
    (56, "BNB Smart Chain"),
    (137, "Polygon"),
    (250, "Fantom"),
    (8453, "Base"),
    (17000, "Holesky"),
    (42161, "Arbitrum One"),
    (43113, "Avalanche Fuji C-Chain"),
    (43114, "Avalanche C-Chain"),
    (11155111, "Sepolia"),
];

/// Chain ID must fit the 32-bit range and should not collide with known chains
pub fn validate_chain_id(chain_id: u64) -> FieldCheck {
    if chain_id < 1 || chain_id > u64::from(u32::MAX) {
        return FieldCheck::error(format!("Chain ID must be between 1 and {}", u32::MAX));
    }

    match KNOWN_CHAIN_IDS.iter().find(|(id, _)| *id == chain_id) {
        Some((_, name)) => {
            FieldCheck::warning(format!("Chain ID {chain_id} is already used by {name}"))
        }
        None => FieldCheck::ok(),
    }
}

/// Token name: 1 to 50 letters, digits or spaces
pub fn validate_token_name(name: &str) -> FieldCheck {
    if name.is_empty() {
        return FieldCheck::error("Token name is required");
    }
    if name.chars().count() > MAX_TOKEN_NAME_LEN {
        return FieldCheck::error(format!(
            "Token name must be at most {MAX_TOKEN_NAME_LEN} characters"
        ));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == ' ') {
        return FieldCheck::error("Token name may only contain letters, numbers and spaces");
    }
    FieldCheck::ok()
}

/// Token symbol: 1 to 10 uppercase letters or digits
pub fn validate_token_symbol(symbol: &str) -> FieldCheck {
    if symbol.is_empty() {
        return FieldCheck::error("Token symbol is required");
    }
    if symbol.chars().count() > MAX_TOKEN_SYMBOL_LEN {
        return FieldCheck::error(format!(
            "Token symbol must be at most {MAX_TOKEN_SYMBOL_LEN} characters"
        ));
    }
    if !symbol.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) {
        return FieldCheck::error("Token symbol may only contain uppercase letters and numbers");
    }
    FieldCheck::ok()
}
