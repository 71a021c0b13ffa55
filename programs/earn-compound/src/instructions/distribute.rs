use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::constants::*;
use crate::engine;
use crate::errors::StakingError;
use crate::events::IncomeDistributed;
use crate::instructions::report_roll;
use crate::ledger::TokenLedger;
use crate::state::StakingPool;

/// Distribute income that the income source already moved into the vault
#[derive(Accounts)]
pub struct Distribute<'info> {
    pub caller: Signer<'info>,

    #[account(mut)]
    pub mint: InterfaceAccount<'info, Mint>,

    #[account(
        mut,
        seeds = [STAKING_POOL_SEED, mint.key().as_ref()],
        bump = staking_pool.bump,
        has_one = mint @ StakingError::InvalidStakeAccount,
        has_one = vault @ StakingError::InvalidStakeAccount
    )]
    pub staking_pool: Account<'info, StakingPool>,

    #[account(mut)]
    pub vault: InterfaceAccount<'info, TokenAccount>,

    /// CHECK: Pool authority, signs the burn
    #[account(
        seeds = [POOL_AUTHORITY_SEED, staking_pool.key().as_ref()],
        bump = staking_pool.authority_bump
    )]
    pub pool_authority: UncheckedAccount<'info>,

    pub token_program: Interface<'info, TokenInterface>,
}

pub fn handler(ctx: Context<Distribute>, amount: u64) -> Result<()> {
    let clock = Clock::get()?;
    let pool_key = ctx.accounts.staking_pool.key();
    let caller_key = ctx.accounts.caller.key();

    let authority_bump = [ctx.accounts.staking_pool.authority_bump];
    let seeds: &[&[u8]] = &[POOL_AUTHORITY_SEED, pool_key.as_ref(), &authority_bump];
    let signer_seeds: &[&[&[u8]]] = &[seeds];

    let accounts = &mut *ctx.accounts;
    let mut ledger = TokenLedger::new(
        &accounts.token_program,
        &mut accounts.mint,
        &mut accounts.vault,
        accounts.pool_authority.to_account_info(),
        signer_seeds,
    );

    let receipt = engine::distribute(
        &mut accounts.staking_pool,
        &mut ledger,
        &caller_key,
        amount,
        clock.unix_timestamp,
    )?;

    let pool = &accounts.staking_pool;
    report_roll(pool_key, pool.eligible_total, &receipt.roll, clock.unix_timestamp);

    emit!(IncomeDistributed {
        pool: pool_key,
        amount,
        burned: receipt.burned,
        rewarded: receipt.rewarded,
        buffered: receipt.buffered,
        reward_index: receipt.reward_index,
        eligible_total: pool.eligible_total,
        timestamp: clock.unix_timestamp,
    });

    msg!("Distributed {} tokens", amount);
    msg!("Burned: {}, rewarded: {}", receipt.burned, receipt.rewarded);
    if receipt.buffered {
        msg!("No eligible stake, reward held in buffer: {}", pool.unallocated_buffer);
    }

    Ok(())
}
