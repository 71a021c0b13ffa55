use anchor_lang::prelude::*;

use crate::constants::{STAKE_ACCOUNT_SEED, STAKING_POOL_SEED};
use crate::engine;
use crate::events::RewardSettled;
use crate::instructions::{fit_pool_account, report_roll};
use crate::state::{StakeAccount, StakingPool};

/// Permissionless settlement. Anyone can crank an account so its reward
/// compounds and the checkpoints it holds can be retired. The cranker pays
/// for any schedule growth caused by compounding.
#[derive(Accounts)]
pub struct Poke<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(
        mut,
        seeds = [STAKING_POOL_SEED, staking_pool.mint.as_ref()],
        bump = staking_pool.bump
    )]
    pub staking_pool: Account<'info, StakingPool>,

    #[account(
        mut,
        seeds = [STAKE_ACCOUNT_SEED, staking_pool.key().as_ref(), stake_account.owner.as_ref()],
        bump = stake_account.bump
    )]
    pub stake_account: Account<'info, StakeAccount>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<Poke>) -> Result<()> {
    let clock = Clock::get()?;
    let pool_key = ctx.accounts.staking_pool.key();

    let (settlement, roll) = engine::poke(
        &mut ctx.accounts.staking_pool,
        &mut ctx.accounts.stake_account,
        clock.unix_timestamp,
    )?;

    fit_pool_account(
        &ctx.accounts.staking_pool,
        &ctx.accounts.payer.to_account_info(),
        &ctx.accounts.system_program,
    )?;

    report_roll(
        pool_key,
        ctx.accounts.staking_pool.eligible_total,
        &roll,
        clock.unix_timestamp,
    );

    let account = &ctx.accounts.stake_account;
    if settlement.reward > 0 || settlement.buffer_released > 0 {
        emit!(RewardSettled {
            pool: pool_key,
            owner: account.owner,
            reward: settlement.reward,
            buffer_released: settlement.buffer_released,
            balance: account.balance,
            timestamp: clock.unix_timestamp,
        });
        msg!("Settled {} for {}", settlement.reward, account.owner);
    }

    Ok(())
}
