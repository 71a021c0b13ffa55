use anchor_lang::prelude::*;

use crate::constants::{STAKE_ACCOUNT_SEED, STAKING_POOL_SEED};
use crate::state::{StakeAccount, StakingPool};

/// Creates a stake account for any owner, so batch seeding and keepers can
/// address positions that were never opened by a deposit
#[derive(Accounts)]
#[instruction(owner: Pubkey)]
pub struct OpenStakeAccount<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(
        seeds = [STAKING_POOL_SEED, staking_pool.mint.as_ref()],
        bump = staking_pool.bump
    )]
    pub staking_pool: Account<'info, StakingPool>,

    #[account(
        init,
        payer = payer,
        space = StakeAccount::SIZE,
        seeds = [STAKE_ACCOUNT_SEED, staking_pool.key().as_ref(), owner.as_ref()],
        bump
    )]
    pub stake_account: Account<'info, StakeAccount>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<OpenStakeAccount>, owner: Pubkey) -> Result<()> {
    let stake_account = &mut ctx.accounts.stake_account;

    stake_account.owner = owner;
    stake_account.pool = ctx.accounts.staking_pool.key();
    stake_account.index_snapshot = ctx.accounts.staking_pool.reward_index;
    stake_account.bump = ctx.bumps.stake_account;

    msg!("Opened stake account for {}", owner);

    Ok(())
}
