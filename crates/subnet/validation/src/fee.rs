//! Fee curve validators

use subnet_genesis::{FeeCurveParameters, constants::GWEI, paths};

use crate::FieldCheck;

/// Gas limit below which blocks cannot hold ordinary workloads
pub const MIN_GAS_LIMIT: u64 = 1_000_000;

/// Gas limit below which a warning is raised
pub const LOW_GAS_LIMIT: u64 = 8_000_000;

/// Gas limit above which a warning is raised
pub const HIGH_GAS_LIMIT: u64 = 100_000_000;

/// Shortest accepted target block rate in seconds
pub const MIN_TARGET_BLOCK_RATE: f64 = 0.1;

/// Target block rate above which a warning is raised
pub const SLOW_TARGET_BLOCK_RATE: f64 = 10.0;

/// Base fee floor warning bounds, in wei
pub const MIN_BASE_FEE_BOUNDS: (u64, u64) = (GWEI, 500 * GWEI);

/// Target gas warning bounds
pub const TARGET_GAS_BOUNDS: (u64, u64) = (1_000_000, 50_000_000);

/// Base fee change denominator warning bounds
pub const DENOMINATOR_BOUNDS: (u64, u64) = (8, 1000);

/// Minimum block gas cost above which a warning is raised
pub const HIGH_MIN_BLOCK_GAS_COST: u64 = 1_000_000_000;

/// Maximum block gas cost above which a warning is raised
pub const HIGH_MAX_BLOCK_GAS_COST: u64 = 10_000_000_000;

/// Block gas cost step above which a warning is raised
pub const HIGH_BLOCK_GAS_COST_STEP: u64 = 5_000_000;

/// A fee curve field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeeField {
    /// Block gas limit
    GasLimit,
    /// Target block rate
    TargetBlockRate,
    /// Base fee floor
    MinBaseFee,
    /// Rolling-window gas target
    TargetGas,
    /// Base fee damping factor
    BaseFeeChangeDenominator,
    /// Lower block gas cost bound
    MinBlockGasCost,
    /// Upper block gas cost bound
    MaxBlockGasCost,
    /// Block gas cost step
    BlockGasCostStep,
}

impl FeeField {
    /// All fee fields
    pub const ALL: [Self; 8] = [
        Self::GasLimit,
        Self::TargetBlockRate,
        Self::MinBaseFee,
        Self::TargetGas,
        Self::BaseFeeChangeDenominator,
        Self::MinBlockGasCost,
        Self::MaxBlockGasCost,
        Self::BlockGasCostStep,
    ];

    /// Key in `config.feeConfig`
    pub const fn key(&self) -> &'static str {
        match self {
            Self::GasLimit => "gasLimit",
            Self::TargetBlockRate => "targetBlockRate",
            Self::MinBaseFee => "minBaseFee",
            Self::TargetGas => "targetGas",
            Self::BaseFeeChangeDenominator => "baseFeeChangeDenominator",
            Self::MinBlockGasCost => "minBlockGasCost",
            Self::MaxBlockGasCost => "maxBlockGasCost",
            Self::BlockGasCostStep => "blockGasCostStep",
        }
    }

    /// Report path, e.g. `feeConfig.gasLimit`
    pub fn path(&self) -> String {
        paths::fee_field(self.key())
    }
}

/// Validate one fee field. Only `maxBlockGasCost` looks at another field.
pub fn validate_fee_field(field: FeeField, fee: &FeeCurveParameters) -> FieldCheck {
    match field {
        FeeField::GasLimit => validate_gas_limit(fee.gas_limit),
        FeeField::TargetBlockRate => validate_target_block_rate(fee.target_block_rate_seconds),
        FeeField::MinBaseFee => validate_min_base_fee(fee.min_base_fee),
        FeeField::TargetGas => validate_target_gas(fee.target_gas),
        FeeField::BaseFeeChangeDenominator => {
            validate_base_fee_change_denominator(fee.base_fee_change_denominator)
        }
        FeeField::MinBlockGasCost => validate_min_block_gas_cost(fee.min_block_gas_cost),
        FeeField::MaxBlockGasCost => {
            validate_max_block_gas_cost(fee.max_block_gas_cost, fee.min_block_gas_cost)
        }
        FeeField::BlockGasCostStep => validate_block_gas_cost_step(fee.block_gas_cost_step),
    }
}

/// Gas limit: at least the hard floor, warned outside the usual range
pub fn validate_gas_limit(gas_limit: u64) -> FieldCheck {
    if gas_limit < MIN_GAS_LIMIT {
        FieldCheck::error(format!("Gas limit must be at least {MIN_GAS_LIMIT}"))
    } else if gas_limit < LOW_GAS_LIMIT {
        FieldCheck::warning(format!("Gas limits below {LOW_GAS_LIMIT} may not fit larger transactions"))
    } else if gas_limit > HIGH_GAS_LIMIT {
        FieldCheck::warning(format!("Gas limits above {HIGH_GAS_LIMIT} may strain validators"))
    } else {
        FieldCheck::ok()
    }
}

/// Target block rate in seconds. The document carries whole seconds, so
/// sub-second rates are warned.
pub fn validate_target_block_rate(seconds: f64) -> FieldCheck {
    if seconds.is_nan() || seconds < MIN_TARGET_BLOCK_RATE {
        FieldCheck::error(format!("Target block rate must be at least {MIN_TARGET_BLOCK_RATE}s"))
    } else if seconds < 1.0 {
        FieldCheck::warning("Sub-second target block rates are written as 1s")
    } else if seconds > SLOW_TARGET_BLOCK_RATE {
        FieldCheck::warning(format!(
            "Target block rates above {SLOW_TARGET_BLOCK_RATE}s make confirmations slow"
        ))
    } else {
        FieldCheck::ok()
    }
}

/// Minimum base fee in wei
pub fn validate_min_base_fee(wei: u64) -> FieldCheck {
    let (low, high) = MIN_BASE_FEE_BOUNDS;
    if wei < low {
        FieldCheck::warning("Base fee floors below 1 gwei leave the chain open to spam")
    } else if wei > high {
        FieldCheck::warning("Base fee floors above 500 gwei make transactions expensive")
    } else {
        FieldCheck::ok()
    }
}

/// Target gas per window
pub fn validate_target_gas(target_gas: u64) -> FieldCheck {
    let (low, high) = TARGET_GAS_BOUNDS;
    if target_gas < low || target_gas > high {
        FieldCheck::warning(format!("Target gas is usually between {low} and {high}"))
    } else {
        FieldCheck::ok()
    }
}

/// Base fee change denominator
pub fn validate_base_fee_change_denominator(denominator: u64) -> FieldCheck {
    let (low, high) = DENOMINATOR_BOUNDS;
    if denominator < low {
        FieldCheck::warning(format!("Denominators below {low} make the base fee swing sharply"))
    } else if denominator > high {
        FieldCheck::warning(format!("Denominators above {high} make the base fee barely move"))
    } else {
        FieldCheck::ok()
    }
}

/// Minimum block gas cost
pub fn validate_min_block_gas_cost(cost: u64) -> FieldCheck {
    if cost > HIGH_MIN_BLOCK_GAS_COST {
        FieldCheck::warning(format!("Minimum block gas cost above {HIGH_MIN_BLOCK_GAS_COST} is unusually high"))
    } else {
        FieldCheck::ok()
    }
}

/// Maximum block gas cost, never below `min_cost`
pub fn validate_max_block_gas_cost(cost: u64, min_cost: u64) -> FieldCheck {
    if cost < min_cost {
        FieldCheck::error("Maximum block gas cost must not be below the minimum")
    } else if cost > HIGH_MAX_BLOCK_GAS_COST {
        FieldCheck::warning(format!("Maximum block gas cost above {HIGH_MAX_BLOCK_GAS_COST} is unusually high"))
    } else {
        FieldCheck::ok()
    }
}

/// Block gas cost step
pub fn validate_block_gas_cost_step(step: u64) -> FieldCheck {
    if step > HIGH_BLOCK_GAS_COST_STEP {
        FieldCheck::warning(format!("Block gas cost step above {HIGH_BLOCK_GAS_COST_STEP} is unusually high"))
    } else {
        FieldCheck::ok()
    }
}
