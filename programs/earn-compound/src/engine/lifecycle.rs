use anchor_lang::prelude::*;

use crate::engine::{
    clear_position, credit_deposit, debit_clamped, release_buffer, schedule_eligibility, settle,
    DepositReceipt, ExitReceipt, WithdrawalReceipt,
};
use crate::errors::StakingError;
use crate::ledger::{pull_exact, push_exact, Ledger};
use crate::state::{StakeAccount, StakingPool, Transition};

pub fn deposit<L: Ledger>(
    pool: &mut StakingPool,
    account: &mut StakeAccount,
    ledger: &mut L,
    depositor: &Pubkey,
    amount: u64,
    now: i64,
) -> Result<DepositReceipt> {
    pool.ensure_active()?;
    require_keys_eq!(*depositor, account.owner, StakingError::Unauthorized);

    stake_into(pool, account, ledger, depositor, amount, now)
}

/// Deposit funded by a whitelisted distributor and credited to `account`
pub fn deposit_on_behalf<L: Ledger>(
    pool: &mut StakingPool,
    account: &mut StakeAccount,
    ledger: &mut L,
    distributor: &Pubkey,
    amount: u64,
    now: i64,
) -> Result<DepositReceipt> {
    pool.ensure_active()?;
    require!(pool.is_distributor(distributor), StakingError::Unauthorized);
    require!(account.is_initialized(), StakingError::InvalidStakeAccount);

    stake_into(pool, account, ledger, distributor, amount, now)
}

fn stake_into<L: Ledger>(
    pool: &mut StakingPool,
    account: &mut StakeAccount,
    ledger: &mut L,
    funder: &Pubkey,
    amount: u64,
    now: i64,
) -> Result<DepositReceipt> {
    require!(amount > 0, StakingError::InvalidAmount);
    require!(!account.withdrawal_pending, StakingError::WithdrawalPending);

    let mut next_pool = pool.clone();
    let mut next = account.clone();

    let roll = next_pool.roll(now)?;
    let mut settlement = settle(&mut next_pool, &mut next)?;
    credit_deposit(&mut next_pool, &mut next, amount, now)?;
    settlement.buffer_released = settlement
        .buffer_released
        .saturating_add(release_buffer(&mut next_pool, &mut next)?);

    pull_exact(ledger, funder, amount)?;

    let receipt = DepositReceipt {
        amount,
        balance: next.balance,
        eligible_epoch: next.addition_epoch,
        settlement,
        roll,
    };
    *pool = next_pool;
    *account = next;
    Ok(receipt)
}

/// First phase of a withdrawal: the whole balance leaves the eligible set at
/// the next boundary and further deposits are refused until it is finalized
/// or cancelled
pub fn request_withdrawal(
    pool: &mut StakingPool,
    account: &mut StakeAccount,
    owner: &Pubkey,
    now: i64,
) -> Result<WithdrawalReceipt> {
    require_keys_eq!(*owner, account.owner, StakingError::Unauthorized);
    require!(!account.withdrawal_pending, StakingError::WithdrawalPending);

    let mut next_pool = pool.clone();
    let mut next = account.clone();

    let roll = next_pool.roll(now)?;
    let settlement = settle(&mut next_pool, &mut next)?;
    require!(next.balance > 0, StakingError::InvalidAmount);

    let target = next_pool.next_epoch()?;

    // stake that is not eligible yet simply never becomes eligible
    if next.pending_addition > 0 {
        next_pool
            .schedule
            .retract_addition(next.addition_epoch, next.pending_addition)?;
        next_pool.schedule.release(next.addition_epoch, Transition::Join)?;
        next.pending_addition = 0;
        next.addition_epoch = 0;
    }

    if next.eligible_balance > 0 {
        next_pool.schedule.add_removal(target, next.eligible_balance)?;
    }

    next.withdrawal_pending = true;
    next.withdrawal_epoch = target;

    let receipt = WithdrawalReceipt {
        amount: next.balance,
        withdrawal_epoch: target,
        settlement,
        roll,
    };
    *pool = next_pool;
    *account = next;
    Ok(receipt)
}

/// Withdraws a pending request; the account resumes earning
pub fn cancel_withdrawal(
    pool: &mut StakingPool,
    account: &mut StakeAccount,
    owner: &Pubkey,
    now: i64,
) -> Result<WithdrawalReceipt> {
    require_keys_eq!(*owner, account.owner, StakingError::Unauthorized);
    require!(account.withdrawal_pending, StakingError::NoWithdrawalRequest);

    let mut next_pool = pool.clone();
    let mut next = account.clone();

    let roll = next_pool.roll(now)?;
    let mut settlement = settle(&mut next_pool, &mut next)?;

    let withdrawal_epoch = next.withdrawal_epoch;
    if !next.removal_applied(next_pool.current_epoch) && next.eligible_balance > 0 {
        next_pool
            .schedule
            .retract_removal(withdrawal_epoch, next.eligible_balance)?;
        next_pool.schedule.release(withdrawal_epoch, Transition::Leave)?;
    }

    next.withdrawal_pending = false;
    next.withdrawal_epoch = 0;

    // reward earned while the request was pending, or the whole balance when
    // the removal already took effect
    let idle = next
        .balance
        .checked_sub(next.eligible_balance)
        .ok_or(StakingError::AccountingInvariantViolated)?;
    schedule_eligibility(&mut next_pool, &mut next, idle)?;
    settlement.buffer_released = settlement
        .buffer_released
        .saturating_add(release_buffer(&mut next_pool, &mut next)?);

    let receipt = WithdrawalReceipt {
        amount: next.balance,
        withdrawal_epoch,
        settlement,
        roll,
    };
    *pool = next_pool;
    *account = next;
    Ok(receipt)
}

/// Second phase of a withdrawal: pays out the full settled balance
pub fn finalize_withdrawal<L: Ledger>(
    pool: &mut StakingPool,
    account: &mut StakeAccount,
    ledger: &mut L,
    owner: &Pubkey,
    now: i64,
) -> Result<WithdrawalReceipt> {
    require_keys_eq!(*owner, account.owner, StakingError::Unauthorized);
    require!(account.withdrawal_pending, StakingError::NoWithdrawalRequest);

    let mut next_pool = pool.clone();
    let mut next = account.clone();

    let roll = next_pool.roll(now)?;
    require!(
        next_pool.current_epoch >= next.withdrawal_epoch,
        StakingError::NotYetEligible
    );

    let settlement = settle(&mut next_pool, &mut next)?;
    let withdrawal_epoch = next.withdrawal_epoch;
    let amount = next.balance;

    next_pool.total_staked = next_pool
        .total_staked
        .checked_sub(amount)
        .ok_or(StakingError::AccountingInvariantViolated)?;
    if amount > 0 {
        next_pool.staker_count = next_pool.staker_count.saturating_sub(1);
    }
    clear_position(&mut next);

    if amount > 0 {
        push_exact(ledger, owner, amount)?;
    }

    *pool = next_pool;
    *account = next;
    Ok(WithdrawalReceipt {
        amount,
        withdrawal_epoch,
        settlement,
        roll,
    })
}

/// Immediate exit without settlement or epoch delay. Works while paused.
/// Unsettled reward is forfeited and stays in the vault as recoverable excess.
pub fn emergency_exit<L: Ledger>(
    pool: &mut StakingPool,
    account: &mut StakeAccount,
    ledger: &mut L,
    owner: &Pubkey,
    now: i64,
) -> Result<ExitReceipt> {
    require_keys_eq!(*owner, account.owner, StakingError::Unauthorized);
    require!(account.balance > 0, StakingError::InvalidAmount);

    let mut next_pool = pool.clone();
    let mut next = account.clone();

    let roll = next_pool.roll(now)?;
    let current = next_pool.current_epoch;
    let forfeited = next.accrue(&next_pool)?.reward;
    let mut shortfall = 0;

    if next.withdrawal_pending {
        if next.eligible_balance > 0 {
            if !next.removal_applied(current) {
                next_pool
                    .schedule
                    .retract_removal(next.withdrawal_epoch, next.eligible_balance)?;
                shortfall += debit_clamped(&mut next_pool.eligible_total, next.eligible_balance);
            }
            next_pool.schedule.release(next.withdrawal_epoch, Transition::Leave)?;
        }
    } else {
        shortfall += debit_clamped(&mut next_pool.eligible_total, next.eligible_balance);

        // purge the addition from the schedule, or from the total if its
        // boundary already passed
        if next.pending_addition > 0 {
            if next.addition_epoch > current {
                next_pool
                    .schedule
                    .retract_addition(next.addition_epoch, next.pending_addition)?;
            } else {
                shortfall += debit_clamped(&mut next_pool.eligible_total, next.pending_addition);
            }
            next_pool.schedule.release(next.addition_epoch, Transition::Join)?;
        }
    }

    let amount = next.balance;
    let debit = amount.saturating_add(forfeited);
    shortfall += debit_clamped(&mut next_pool.total_staked, debit);
    next_pool.staker_count = next_pool.staker_count.saturating_sub(1);
    clear_position(&mut next);

    if shortfall > 0 {
        msg!("Emergency exit clamped accounting totals by {}", shortfall);
    }

    push_exact(ledger, owner, amount)?;

    *pool = next_pool;
    *account = next;
    Ok(ExitReceipt {
        amount,
        forfeited,
        shortfall,
        roll,
    })
}
