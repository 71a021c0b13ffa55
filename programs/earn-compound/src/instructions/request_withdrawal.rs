use anchor_lang::prelude::*;

use crate::constants::{STAKE_ACCOUNT_SEED, STAKING_POOL_SEED};
use crate::engine;
use crate::errors::StakingError;
use crate::events::WithdrawalRequested;
use crate::instructions::{fit_pool_account, report_roll};
use crate::state::{StakeAccount, StakingPool};

#[derive(Accounts)]
pub struct RequestWithdrawal<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

    #[account(
        mut,
        seeds = [STAKING_POOL_SEED, staking_pool.mint.as_ref()],
        bump = staking_pool.bump
    )]
    pub staking_pool: Account<'info, StakingPool>,

    #[account(
        mut,
        seeds = [STAKE_ACCOUNT_SEED, staking_pool.key().as_ref(), user.key().as_ref()],
        bump = stake_account.bump,
        constraint = stake_account.owner == user.key() @ StakingError::Unauthorized
    )]
    pub stake_account: Account<'info, StakeAccount>,

    pub system_program: Program<'info, System>,
}

/// Request to withdraw the whole position - it stops earning at the next
/// epoch boundary and can be finalized from then on
pub fn handler(ctx: Context<RequestWithdrawal>) -> Result<()> {
    let clock = Clock::get()?;
    let pool_key = ctx.accounts.staking_pool.key();
    let user_key = ctx.accounts.user.key();

    let receipt = engine::request_withdrawal(
        &mut ctx.accounts.staking_pool,
        &mut ctx.accounts.stake_account,
        &user_key,
        clock.unix_timestamp,
    )?;

    fit_pool_account(
        &ctx.accounts.staking_pool,
        &ctx.accounts.user.to_account_info(),
        &ctx.accounts.system_program,
    )?;

    report_roll(
        pool_key,
        ctx.accounts.staking_pool.eligible_total,
        &receipt.roll,
        clock.unix_timestamp,
    );

    emit!(WithdrawalRequested {
        pool: pool_key,
        owner: user_key,
        amount: receipt.amount,
        withdrawal_epoch: receipt.withdrawal_epoch,
        timestamp: clock.unix_timestamp,
    });

    msg!("Withdrawal requested for {} tokens", receipt.amount);
    msg!("Can finalize from epoch {}", receipt.withdrawal_epoch);

    Ok(())
}
