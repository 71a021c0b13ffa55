use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::constants::*;
use crate::engine;
use crate::errors::StakingError;
use crate::events::Deposited;
use crate::instructions::{fit_pool_account, report_roll};
use crate::ledger::{Counterparty, TokenLedger};
use crate::state::{StakeAccount, StakingPool};

#[derive(Accounts)]
pub struct Deposit<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

    pub mint: InterfaceAccount<'info, Mint>,

    #[account(
        mut,
        seeds = [STAKING_POOL_SEED, mint.key().as_ref()],
        bump = staking_pool.bump,
        has_one = mint @ StakingError::InvalidStakeAccount,
        has_one = vault @ StakingError::InvalidStakeAccount,
        constraint = !staking_pool.paused @ StakingError::PoolPaused
    )]
    pub staking_pool: Account<'info, StakingPool>,

    #[account(
        init_if_needed,
        payer = user,
        space = StakeAccount::SIZE,
        seeds = [STAKE_ACCOUNT_SEED, staking_pool.key().as_ref(), user.key().as_ref()],
        bump
    )]
    pub stake_account: Account<'info, StakeAccount>,

    #[account(mut)]
    pub vault: InterfaceAccount<'info, TokenAccount>,

    /// CHECK: Pool authority for signing vault movements
    #[account(
        seeds = [POOL_AUTHORITY_SEED, staking_pool.key().as_ref()],
        bump = staking_pool.authority_bump
    )]
    pub pool_authority: UncheckedAccount<'info>,

    #[account(
        mut,
        token::mint = mint,
        token::authority = user
    )]
    pub user_token_account: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<Deposit>, amount: u64) -> Result<()> {
    let clock = Clock::get()?;
    let pool_key = ctx.accounts.staking_pool.key();
    let user_key = ctx.accounts.user.key();
    let stake_bump = ctx.bumps.stake_account;

    let authority_bump = [ctx.accounts.staking_pool.authority_bump];
    let seeds: &[&[u8]] = &[POOL_AUTHORITY_SEED, pool_key.as_ref(), &authority_bump];
    let signer_seeds: &[&[&[u8]]] = &[seeds];

    let accounts = &mut *ctx.accounts;

    // Initialize stake account if new
    if !accounts.stake_account.is_initialized() {
        accounts.stake_account.owner = user_key;
        accounts.stake_account.pool = pool_key;
        accounts.stake_account.bump = stake_bump;
    }

    let mut ledger = TokenLedger::new(
        &accounts.token_program,
        &mut accounts.mint,
        &mut accounts.vault,
        accounts.pool_authority.to_account_info(),
        signer_seeds,
    )
    .with_counterparty(Counterparty {
        owner: user_key,
        token_account: accounts.user_token_account.to_account_info(),
        authority: Some(accounts.user.to_account_info()),
    });

    let receipt = engine::deposit(
        &mut accounts.staking_pool,
        &mut accounts.stake_account,
        &mut ledger,
        &user_key,
        amount,
        clock.unix_timestamp,
    )?;

    fit_pool_account(
        &accounts.staking_pool,
        &accounts.user.to_account_info(),
        &accounts.system_program,
    )?;

    let pool = &accounts.staking_pool;
    report_roll(pool_key, pool.eligible_total, &receipt.roll, clock.unix_timestamp);

    emit!(Deposited {
        pool: pool_key,
        owner: user_key,
        funder: user_key,
        amount,
        balance: receipt.balance,
        eligible_epoch: receipt.eligible_epoch,
        pool_total_staked: pool.total_staked,
        timestamp: clock.unix_timestamp,
    });

    msg!("Deposited {} tokens", amount);
    msg!("Balance: {}, eligible from epoch {}", receipt.balance, receipt.eligible_epoch);
    if receipt.settlement.buffer_released > 0 {
        msg!("Released unallocated buffer: {}", receipt.settlement.buffer_released);
    }

    Ok(())
}
