use anchor_lang::prelude::*;

use crate::constants::ONE_HUNDRED_PERCENT;
use crate::engine::{release_buffer, schedule_eligibility, Settlement};
use crate::errors::StakingError;
use crate::ledger::{burn_verified, Ledger};
use crate::state::{RollOutcome, StakeAccount, StakingPool};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DistributeReceipt {
    pub amount: u64,
    pub burned: u64,
    pub rewarded: u64,
    /// Reward parked in the unallocated buffer because nobody was eligible
    pub buffered: bool,
    pub reward_index: u128,
    pub roll: RollOutcome,
}

/// Splits `amount` of income already sitting in the vault into a burn and a
/// reward, and spreads the reward over the eligible stake in O(1)
pub fn distribute<L: Ledger>(
    pool: &mut StakingPool,
    ledger: &mut L,
    caller: &Pubkey,
    amount: u64,
    now: i64,
) -> Result<DistributeReceipt> {
    require!(
        *caller == pool.income_source || *caller == pool.authority,
        StakingError::Unauthorized
    );
    require!(amount > 0, StakingError::InvalidAmount);

    let mut next = pool.clone();
    let roll = next.roll(now)?;

    // income must already be in custody on top of everything accounted for
    let custody = ledger.custody_balance()?;
    let unaccounted = custody
        .checked_sub(next.total_staked)
        .ok_or(StakingError::AccountingInvariantViolated)?;
    require!(unaccounted >= amount, StakingError::LedgerTransferFailed);

    let burned = (amount as u128)
        .checked_mul(next.burn_bps as u128)
        .ok_or(StakingError::Overflow)?
        / ONE_HUNDRED_PERCENT as u128;
    let burned = burned as u64;
    let rewarded = amount - burned;

    let mut buffered = false;
    if rewarded > 0 {
        if next.eligible_total == 0 {
            if next.unallocated_buffer == 0 {
                next.buffer_epoch = next.current_epoch;
            }
            next.unallocated_buffer = next
                .unallocated_buffer
                .checked_add(rewarded)
                .ok_or(StakingError::Overflow)?;
            next.retarget_buffer();
            buffered = true;
        } else {
            let delta = next.index_delta(rewarded)?;
            require!(delta > 0, StakingError::DustTooSmall);
            next.reward_index = next
                .reward_index
                .checked_add(delta)
                .ok_or(StakingError::Overflow)?;
        }

        next.total_staked = next
            .total_staked
            .checked_add(rewarded)
            .ok_or(StakingError::Overflow)?;
        next.total_rewards_distributed = next.total_rewards_distributed.saturating_add(rewarded);
    }

    if burned > 0 {
        burn_verified(ledger, burned)?;
        next.total_burned = next.total_burned.saturating_add(burned);
    }

    let reward_index = next.reward_index;
    *pool = next;

    Ok(DistributeReceipt {
        amount,
        burned,
        rewarded,
        buffered,
        reward_index,
        roll,
    })
}

/// Folds the account's pending reward into its balance. Expects a pool that
/// has already been rolled to the current epoch.
pub fn settle(pool: &mut StakingPool, account: &mut StakeAccount) -> Result<Settlement> {
    let accrual = account.accrue(pool)?;

    if let Some((epoch, side)) = accrual.crossed {
        pool.schedule.release(epoch, side)?;
        if !account.withdrawal_pending {
            account.pending_addition = 0;
            account.addition_epoch = 0;
        }
    }

    account.eligible_balance = accrual.eligible_balance;
    account.index_snapshot = pool.reward_index;
    account.last_settled_epoch = pool.current_epoch;

    if accrual.reward > 0 {
        account.balance = account
            .balance
            .checked_add(accrual.reward)
            .ok_or(StakingError::Overflow)?;
        if !account.withdrawal_pending {
            schedule_eligibility(pool, account, accrual.reward)?;
        }
    }

    let buffer_released = release_buffer(pool, account)?;

    Ok(Settlement {
        reward: accrual.reward,
        buffer_released,
    })
}

/// Permissionless settlement of any account
pub fn poke(
    pool: &mut StakingPool,
    account: &mut StakeAccount,
    now: i64,
) -> Result<(Settlement, RollOutcome)> {
    let mut next_pool = pool.clone();
    let mut next = account.clone();

    let roll = next_pool.roll(now)?;
    let settlement = settle(&mut next_pool, &mut next)?;

    *pool = next_pool;
    *account = next;
    Ok((settlement, roll))
}

/// Reward the account would receive if it settled at `now`
pub fn pending_reward(pool: &StakingPool, account: &StakeAccount, now: i64) -> Result<u64> {
    let mut view = pool.clone();
    view.roll(now)?;
    Ok(account.accrue(&view)?.reward)
}

/// Compounded balance including unsettled reward
pub fn balance_of(pool: &StakingPool, account: &StakeAccount, now: i64) -> Result<u64> {
    let reward = pending_reward(pool, account, now)?;
    Ok(account
        .balance
        .checked_add(reward)
        .ok_or(StakingError::Overflow)?)
}
