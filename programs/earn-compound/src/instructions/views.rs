use anchor_lang::prelude::*;

use crate::constants::{STAKE_ACCOUNT_SEED, STAKING_POOL_SEED};
use crate::engine;
use crate::state::{StakeAccount, StakingPool};

/// Read-only position queries, meant to be simulated
#[derive(Accounts)]
pub struct PositionView<'info> {
    #[account(
        seeds = [STAKING_POOL_SEED, staking_pool.mint.as_ref()],
        bump = staking_pool.bump
    )]
    pub staking_pool: Account<'info, StakingPool>,

    #[account(
        seeds = [STAKE_ACCOUNT_SEED, staking_pool.key().as_ref(), stake_account.owner.as_ref()],
        bump = stake_account.bump
    )]
    pub stake_account: Account<'info, StakeAccount>,
}

#[derive(Accounts)]
pub struct PoolView<'info> {
    #[account(
        seeds = [STAKING_POOL_SEED, staking_pool.mint.as_ref()],
        bump = staking_pool.bump
    )]
    pub staking_pool: Account<'info, StakingPool>,
}

/// Compounded balance including reward not yet settled
pub fn balance_of(ctx: Context<PositionView>) -> Result<u64> {
    let now = Clock::get()?.unix_timestamp;
    engine::balance_of(&ctx.accounts.staking_pool, &ctx.accounts.stake_account, now)
}

pub fn pending_reward(ctx: Context<PositionView>) -> Result<u64> {
    let now = Clock::get()?.unix_timestamp;
    engine::pending_reward(&ctx.accounts.staking_pool, &ctx.accounts.stake_account, now)
}

pub fn is_distributor(ctx: Context<PoolView>, key: Pubkey) -> Result<bool> {
    Ok(ctx.accounts.staking_pool.is_distributor(&key))
}
