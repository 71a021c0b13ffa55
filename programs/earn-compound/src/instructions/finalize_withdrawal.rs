use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::constants::*;
use crate::engine;
use crate::errors::StakingError;
use crate::events::WithdrawalFinalized;
use crate::instructions::report_roll;
use crate::ledger::{Counterparty, TokenLedger};
use crate::state::{StakeAccount, StakingPool};

#[derive(Accounts)]
pub struct FinalizeWithdrawal<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

    pub mint: InterfaceAccount<'info, Mint>,

    #[account(
        mut,
        seeds = [STAKING_POOL_SEED, mint.key().as_ref()],
        bump = staking_pool.bump,
        has_one = mint @ StakingError::InvalidStakeAccount,
        has_one = vault @ StakingError::InvalidStakeAccount
    )]
    pub staking_pool: Account<'info, StakingPool>,

    #[account(
        mut,
        seeds = [STAKE_ACCOUNT_SEED, staking_pool.key().as_ref(), user.key().as_ref()],
        bump = stake_account.bump,
        constraint = stake_account.owner == user.key() @ StakingError::Unauthorized
    )]
    pub stake_account: Account<'info, StakeAccount>,

    #[account(mut)]
    pub vault: InterfaceAccount<'info, TokenAccount>,

    /// CHECK: Pool authority for signing transfers
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
}

pub fn handler(ctx: Context<FinalizeWithdrawal>) -> Result<()> {
    let clock = Clock::get()?;
    let pool_key = ctx.accounts.staking_pool.key();
    let user_key = ctx.accounts.user.key();

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
    )
    .with_counterparty(Counterparty {
        owner: user_key,
        token_account: accounts.user_token_account.to_account_info(),
        authority: None,
    });

    let receipt = engine::finalize_withdrawal(
        &mut accounts.staking_pool,
        &mut accounts.stake_account,
        &mut ledger,
        &user_key,
        clock.unix_timestamp,
    )?;

    let pool = &accounts.staking_pool;
    report_roll(pool_key, pool.eligible_total, &receipt.roll, clock.unix_timestamp);

    emit!(WithdrawalFinalized {
        pool: pool_key,
        owner: user_key,
        amount: receipt.amount,
        pool_total_staked: pool.total_staked,
        timestamp: clock.unix_timestamp,
    });

    msg!("Withdrew {} tokens", receipt.amount);
    msg!("Settled reward included: {}", receipt.settlement.reward);

    Ok(())
}
