use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::constants::*;
use crate::engine;
use crate::errors::StakingError;
use crate::events::FundsRecovered;
use crate::ledger::{Counterparty, TokenLedger};
use crate::state::StakingPool;

#[derive(Accounts)]
pub struct Recover<'info> {
    pub authority: Signer<'info>,

    pub mint: InterfaceAccount<'info, Mint>,

    #[account(
        mut,
        seeds = [STAKING_POOL_SEED, mint.key().as_ref()],
        bump = staking_pool.bump,
        has_one = authority @ StakingError::Unauthorized,
        has_one = mint @ StakingError::InvalidStakeAccount,
        has_one = vault @ StakingError::InvalidStakeAccount
    )]
    pub staking_pool: Account<'info, StakingPool>,

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
        token::mint = mint
    )]
    pub destination: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Interface<'info, TokenInterface>,
}

/// Sends tokens the vault holds beyond every accounted balance to
/// `destination`
pub fn recover_excess(ctx: Context<Recover>) -> Result<()> {
    recover(ctx, false)
}

/// Reclaims an unallocated buffer nobody has been eligible to receive
pub fn recover_buffer(ctx: Context<Recover>) -> Result<()> {
    recover(ctx, true)
}

fn recover(ctx: Context<Recover>, from_buffer: bool) -> Result<()> {
    let clock = Clock::get()?;
    let pool_key = ctx.accounts.staking_pool.key();
    let authority_key = ctx.accounts.authority.key();
    let recipient = ctx.accounts.destination.owner;

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
        owner: recipient,
        token_account: accounts.destination.to_account_info(),
        authority: None,
    });

    let amount = if from_buffer {
        engine::reclaim_buffer(
            &mut accounts.staking_pool,
            &mut ledger,
            &authority_key,
            &recipient,
            clock.unix_timestamp,
        )?
    } else {
        engine::sweep_excess(&accounts.staking_pool, &mut ledger, &authority_key, &recipient)?
    };

    emit!(FundsRecovered {
        pool: pool_key,
        recipient,
        amount,
        from_buffer,
        timestamp: clock.unix_timestamp,
    });

    msg!("Recovered {} tokens to {}", amount, recipient);

    Ok(())
}
