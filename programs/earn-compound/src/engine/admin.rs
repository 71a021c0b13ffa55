use anchor_lang::prelude::*;

use crate::constants::{BUFFER_RECLAIM_EPOCHS, MAX_BATCH_SIZE, ONE_HUNDRED_PERCENT};
use crate::engine::{credit_deposit, release_buffer, settle};
use crate::errors::StakingError;
use crate::ledger::{pull_exact, push_exact, Ledger};
use crate::state::{RollOutcome, StakeAccount, StakingPool};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchReceipt {
    pub total: u64,
    pub recipients: u32,
    pub batch_deposited: u64,
    pub roll: RollOutcome,
}

/// Owner-only bulk seeding of positions while the pool is still paused.
/// Deposits `amounts[start..end]` into `accounts`, which must be the stake
/// accounts of `recipients[start..end]` in the same order.
#[allow(clippy::too_many_arguments)]
pub fn batch_deposit_for<L: Ledger>(
    pool: &mut StakingPool,
    accounts: &mut [StakeAccount],
    ledger: &mut L,
    caller: &Pubkey,
    recipients: &[Pubkey],
    amounts: &[u64],
    start: u32,
    end: u32,
    now: i64,
) -> Result<BatchReceipt> {
    pool.ensure_authority(caller)?;
    require!(pool.paused, StakingError::PoolNotPaused);

    let (start, end) = (start as usize, end as usize);
    require!(
        recipients.len() == amounts.len(),
        StakingError::InvalidBatchRange
    );
    require!(
        start < end && end <= recipients.len(),
        StakingError::InvalidBatchRange
    );
    require!(end - start <= MAX_BATCH_SIZE, StakingError::InvalidBatchRange);
    require!(
        accounts.len() == end - start,
        StakingError::InvalidBatchRange
    );

    let mut sorted: Vec<&Pubkey> = recipients.iter().collect();
    sorted.sort();
    require!(
        sorted.windows(2).all(|w| w[0] != w[1]),
        StakingError::DuplicateRecipient
    );

    let slice = &amounts[start..end];
    let mut total: u64 = 0;
    for amount in slice {
        require!(*amount > 0, StakingError::InvalidAmount);
        total = total.checked_add(*amount).ok_or(StakingError::Overflow)?;
    }

    let batch_deposited = pool
        .batch_deposited
        .checked_add(total)
        .ok_or(StakingError::Overflow)?;
    require!(
        batch_deposited <= pool.batch_total_cap,
        StakingError::BatchCapExceeded
    );

    let mut next_pool = pool.clone();
    let mut staged = accounts.to_vec();

    let roll = next_pool.roll(now)?;
    for ((account, recipient), amount) in staged
        .iter_mut()
        .zip(&recipients[start..end])
        .zip(slice)
    {
        require_keys_eq!(account.owner, *recipient, StakingError::InvalidStakeAccount);
        require!(!account.withdrawal_pending, StakingError::WithdrawalPending);

        // the per-account cap spans every chunk the recipient appears in
        let received = account
            .batch_received
            .checked_add(*amount)
            .ok_or(StakingError::Overflow)?;
        require!(
            received <= pool.batch_account_cap,
            StakingError::BatchCapExceeded
        );
        account.batch_received = received;

        settle(&mut next_pool, account)?;
        credit_deposit(&mut next_pool, account, *amount, now)?;
        release_buffer(&mut next_pool, account)?;
    }
    next_pool.batch_deposited = batch_deposited;

    pull_exact(ledger, caller, total)?;

    *pool = next_pool;
    accounts.clone_from_slice(&staged);

    Ok(BatchReceipt {
        total,
        recipients: (end - start) as u32,
        batch_deposited,
        roll,
    })
}

pub fn set_burn_percentage(
    pool: &mut StakingPool,
    caller: &Pubkey,
    burn_bps: u16,
) -> Result<u16> {
    pool.ensure_authority(caller)?;
    require!(
        burn_bps <= ONE_HUNDRED_PERCENT,
        StakingError::InvalidBurnPercentage
    );

    let old = pool.burn_bps;
    pool.burn_bps = burn_bps;
    Ok(old)
}

pub fn set_distributor(
    pool: &mut StakingPool,
    caller: &Pubkey,
    distributor: Pubkey,
    allowed: bool,
) -> Result<()> {
    pool.ensure_authority(caller)?;

    if allowed {
        pool.add_distributor(distributor)
    } else {
        pool.remove_distributor(&distributor);
        Ok(())
    }
}

pub fn set_paused(pool: &mut StakingPool, caller: &Pubkey, paused: bool) -> Result<()> {
    pool.ensure_authority(caller)?;
    pool.paused = paused;
    Ok(())
}

pub fn set_income_source(
    pool: &mut StakingPool,
    caller: &Pubkey,
    income_source: Pubkey,
) -> Result<()> {
    pool.ensure_authority(caller)?;
    pool.income_source = income_source;
    Ok(())
}

/// Epoch length is frozen once the first boundary has passed, since the
/// schedule is keyed by epoch numbers derived from it
pub fn set_epoch_length(
    pool: &mut StakingPool,
    caller: &Pubkey,
    epoch_length: i64,
    now: i64,
) -> Result<()> {
    pool.ensure_authority(caller)?;
    require!(epoch_length > 0, StakingError::InvalidEpochLength);
    require!(
        pool.current_epoch == 0 && pool.epoch_at(now) == 0,
        StakingError::EpochAlreadyStarted
    );

    let mut next = pool.clone();
    next.epoch_length = epoch_length;
    // the new length must not place `now` past a boundary either
    require!(next.epoch_at(now) == 0, StakingError::EpochAlreadyStarted);

    *pool = next;
    Ok(())
}

/// Sends tokens held beyond everything accounted for (stray transfers,
/// forfeited emergency-exit reward) to `to`
pub fn sweep_excess<L: Ledger>(
    pool: &StakingPool,
    ledger: &mut L,
    caller: &Pubkey,
    to: &Pubkey,
) -> Result<u64> {
    pool.ensure_authority(caller)?;

    let custody = ledger.custody_balance()?;
    let excess = custody.saturating_sub(pool.total_staked);
    require!(excess > 0, StakingError::NothingToRecover);

    push_exact(ledger, to, excess)?;
    Ok(excess)
}

/// Reclaims the unallocated buffer after it sat for `BUFFER_RECLAIM_EPOCHS`
/// with nobody eligible or about to become eligible
pub fn reclaim_buffer<L: Ledger>(
    pool: &mut StakingPool,
    ledger: &mut L,
    caller: &Pubkey,
    to: &Pubkey,
    now: i64,
) -> Result<u64> {
    pool.ensure_authority(caller)?;

    let mut next = pool.clone();
    next.roll(now)?;
    next.retarget_buffer();

    let amount = next.unallocated_buffer;
    require!(amount > 0, StakingError::NothingToRecover);
    require!(
        next.eligible_total == 0
            && next.buffer_cohort == 0
            && !next.schedule.has_unapplied_additions(),
        StakingError::BufferLocked
    );
    require!(
        next.current_epoch >= next.buffer_epoch.saturating_add(BUFFER_RECLAIM_EPOCHS),
        StakingError::BufferLocked
    );

    next.unallocated_buffer = 0;
    next.buffer_cohort = 0;
    next.total_staked = next
        .total_staked
        .checked_sub(amount)
        .ok_or(StakingError::AccountingInvariantViolated)?;

    push_exact(ledger, to, amount)?;

    *pool = next;
    Ok(amount)
}
