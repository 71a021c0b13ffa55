//! Host-independent accounting core.
//!
//! Every public operation stages its changes on copies of the pool and the
//! touched stake accounts, performs the ledger movements last, and only then
//! commits. A failed check or a non-conforming ledger leaves the caller's
//! state exactly as it was.

pub mod admin;
pub mod lifecycle;
pub mod rewards;

pub use admin::*;
pub use lifecycle::*;
pub use rewards::*;

use anchor_lang::prelude::*;

use crate::errors::StakingError;
use crate::state::{RollOutcome, StakeAccount, StakingPool};

/// Reward folded into an account by one settlement
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Settlement {
    pub reward: u64,
    pub buffer_released: u64,
}

/// Result of a deposit, an on-behalf deposit or one batch entry
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DepositReceipt {
    pub amount: u64,
    pub balance: u64,
    pub eligible_epoch: u64,
    pub settlement: Settlement,
    pub roll: RollOutcome,
}

/// Result of a withdrawal request, cancellation or finalization
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WithdrawalReceipt {
    pub amount: u64,
    pub withdrawal_epoch: u64,
    pub settlement: Settlement,
    pub roll: RollOutcome,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExitReceipt {
    pub amount: u64,
    /// Unsettled reward given up by skipping settlement
    pub forfeited: u64,
    /// Eligible stake that could not be retracted because the totals were
    /// already short
    pub shortfall: u64,
    pub roll: RollOutcome,
}

/// Schedules `amount` of an already settled account to become eligible at the
/// next boundary, merging with its outstanding addition
pub(crate) fn schedule_eligibility(
    pool: &mut StakingPool,
    account: &mut StakeAccount,
    amount: u64,
) -> Result<()> {
    if amount == 0 {
        return Ok(());
    }

    let target = pool.next_epoch()?;
    let join = account.pending_addition == 0;
    if !join {
        require!(
            account.addition_epoch == target,
            StakingError::AccountingInvariantViolated
        );
    }

    pool.schedule.add_addition(target, amount, join)?;
    account.pending_addition = account
        .pending_addition
        .checked_add(amount)
        .ok_or(StakingError::Overflow)?;
    account.addition_epoch = target;
    Ok(())
}

/// Hands the whole unallocated buffer to an account that is joining the
/// eligible set, unless the buffer is already owed to a cohort waiting for
/// its boundary (that cohort receives it through the index when it rolls)
pub(crate) fn release_buffer(pool: &mut StakingPool, account: &mut StakeAccount) -> Result<u64> {
    if pool.unallocated_buffer == 0 || account.withdrawal_pending {
        return Ok(0);
    }
    if account.joining_epoch().is_none() || pool.buffer_cohort != 0 {
        return Ok(0);
    }

    let amount = std::mem::take(&mut pool.unallocated_buffer);
    account.balance = account
        .balance
        .checked_add(amount)
        .ok_or(StakingError::Overflow)?;
    schedule_eligibility(pool, account, amount)?;
    Ok(amount)
}

/// Adds fresh stake to a settled account
pub(crate) fn credit_deposit(
    pool: &mut StakingPool,
    account: &mut StakeAccount,
    amount: u64,
    now: i64,
) -> Result<()> {
    if account.balance == 0 {
        pool.staker_count = pool.staker_count.saturating_add(1);
        account.staked_at = now;
    }

    account.balance = account
        .balance
        .checked_add(amount)
        .ok_or(StakingError::Overflow)?;
    pool.total_staked = pool
        .total_staked
        .checked_add(amount)
        .ok_or(StakingError::Overflow)?;
    schedule_eligibility(pool, account, amount)
}

/// Clears a stake account back to its inert state, keeping its identity
pub(crate) fn clear_position(account: &mut StakeAccount) {
    *account = StakeAccount {
        owner: account.owner,
        pool: account.pool,
        index_snapshot: account.index_snapshot,
        last_settled_epoch: account.last_settled_epoch,
        batch_received: account.batch_received,
        bump: account.bump,
        ..Default::default()
    };
}

/// Subtracts as much of `amount` as `total` holds and returns what was missing
pub(crate) fn debit_clamped(total: &mut u64, amount: u64) -> u64 {
    let shortfall = amount.saturating_sub(*total);
    *total = total.saturating_sub(amount);
    shortfall
}
