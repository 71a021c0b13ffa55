use anchor_lang::prelude::*;

#[constant]
pub const GLOBAL_CONFIG_SEED: &[u8] = b"global-config";

#[constant]
pub const STAKING_POOL_SEED: &[u8] = b"staking-pool";

#[constant]
pub const STAKE_ACCOUNT_SEED: &[u8] = b"stake-account";

#[constant]
pub const POOL_AUTHORITY_SEED: &[u8] = b"pool-authority";

#[constant]
pub const VAULT_SEED: &[u8] = b"vault";

/// Fixed-point scale of the reward index (1e12)
pub const REWARD_INDEX_SCALE: u128 = 1_000_000_000_000;

pub const ONE_HUNDRED_PERCENT: u16 = 100_00; // 1e4

pub const DEFAULT_EPOCH_LENGTH: i64 = 7 * 24 * 60 * 60;

/// Schedule slots a new pool account is sized for; it grows on demand
pub const INITIAL_SCHEDULE_SLOTS: usize = 2;

pub const MAX_DISTRIBUTORS: usize = 16;

/// Upper bound on stake accounts touched by one batch call
pub const MAX_BATCH_SIZE: usize = 20;

/// Epochs the unallocated buffer must sit with nobody eligible before the
/// authority may reclaim it
pub const BUFFER_RECLAIM_EPOCHS: u64 = 4;
