use anchor_lang::prelude::*;

/// Emitted when a staking pool is created
#[event]
pub struct PoolCreated {
    pub pool: Pubkey,
    pub mint: Pubkey,
    pub authority: Pubkey,
    pub burn_bps: u16,
    pub epoch_length: i64,
    pub timestamp: i64,
}

/// Emitted when a roll applied one or more epoch boundaries
#[event]
pub struct EpochRolled {
    pub pool: Pubkey,
    pub from_epoch: u64,
    pub to_epoch: u64,
    pub added: u64,
    pub removed: u64,
    pub eligible_total: u64,
    pub buffer_released: u64,
}

/// Emitted when removals exceeded the totals they were taken from and the
/// result was clamped at zero
#[event]
pub struct AccountingAnomaly {
    pub pool: Pubkey,
    pub epoch: u64,
    pub shortfall: u64,
    pub timestamp: i64,
}

/// Emitted when income is burned and distributed
#[event]
pub struct IncomeDistributed {
    pub pool: Pubkey,
    pub amount: u64,
    pub burned: u64,
    pub rewarded: u64,
    pub buffered: bool,
    pub reward_index: u128,
    pub eligible_total: u64,
    pub timestamp: i64,
}

/// Emitted when pending reward is folded into an account
#[event]
pub struct RewardSettled {
    pub pool: Pubkey,
    pub owner: Pubkey,
    pub reward: u64,
    pub buffer_released: u64,
    pub balance: u64,
    pub timestamp: i64,
}

/// Emitted when stake is deposited, directly or on behalf of an owner
#[event]
pub struct Deposited {
    pub pool: Pubkey,
    pub owner: Pubkey,
    pub funder: Pubkey,
    pub amount: u64,
    pub balance: u64,
    pub eligible_epoch: u64,
    pub pool_total_staked: u64,
    pub timestamp: i64,
}

#[event]
pub struct WithdrawalRequested {
    pub pool: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
    pub withdrawal_epoch: u64,
    pub timestamp: i64,
}

#[event]
pub struct WithdrawalCancelled {
    pub pool: Pubkey,
    pub owner: Pubkey,
    pub balance: u64,
    pub timestamp: i64,
}

#[event]
pub struct WithdrawalFinalized {
    pub pool: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
    pub pool_total_staked: u64,
    pub timestamp: i64,
}

#[event]
pub struct EmergencyExited {
    pub pool: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
    pub forfeited: u64,
    pub timestamp: i64,
}

#[event]
pub struct BatchDeposited {
    pub pool: Pubkey,
    pub total: u64,
    pub recipients: u32,
    pub batch_deposited: u64,
    pub timestamp: i64,
}

/// Emitted when pool configuration is updated
#[event]
pub struct ConfigUpdated {
    pub pool: Pubkey,
    pub updater: Pubkey,
    pub field: String,
    pub old_value: u64,
    pub new_value: u64,
    pub timestamp: i64,
}

#[event]
pub struct DistributorUpdated {
    pub pool: Pubkey,
    pub distributor: Pubkey,
    pub allowed: bool,
    pub timestamp: i64,
}

#[event]
pub struct IncomeSourceUpdated {
    pub pool: Pubkey,
    pub old_income_source: Pubkey,
    pub new_income_source: Pubkey,
    pub timestamp: i64,
}

/// Emitted when the authority recovers stray tokens or the unallocated buffer
#[event]
pub struct FundsRecovered {
    pub pool: Pubkey,
    pub recipient: Pubkey,
    pub amount: u64,
    pub from_buffer: bool,
    pub timestamp: i64,
}
