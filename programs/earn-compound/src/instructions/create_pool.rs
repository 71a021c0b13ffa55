use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::constants::*;
use crate::errors::StakingError;
use crate::events::PoolCreated;
use crate::state::{GlobalConfig, StakingPool};

#[derive(Accounts)]
pub struct CreatePool<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [GLOBAL_CONFIG_SEED],
        bump = global_config.bump,
        has_one = authority @ StakingError::Unauthorized
    )]
    pub global_config: Account<'info, GlobalConfig>,

    /// The token mint for this staking pool
    pub mint: InterfaceAccount<'info, Mint>,

    #[account(
        init,
        payer = authority,
        space = StakingPool::space(INITIAL_SCHEDULE_SLOTS),
        seeds = [STAKING_POOL_SEED, mint.key().as_ref()],
        bump
    )]
    pub staking_pool: Account<'info, StakingPool>,

    /// CHECK: PDA that owns the vault and signs payouts and burns
    #[account(
        seeds = [POOL_AUTHORITY_SEED, staking_pool.key().as_ref()],
        bump
    )]
    pub pool_authority: UncheckedAccount<'info>,

    #[account(
        init,
        payer = authority,
        seeds = [VAULT_SEED, staking_pool.key().as_ref()],
        bump,
        token::mint = mint,
        token::authority = pool_authority,
        token::token_program = token_program
    )]
    pub vault: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}

pub fn handler(
    ctx: Context<CreatePool>,
    burn_bps: u16,
    epoch_length: i64,
    batch_account_cap: u64,
    batch_total_cap: u64,
    income_source: Pubkey,
) -> Result<()> {
    require!(
        burn_bps <= ONE_HUNDRED_PERCENT,
        StakingError::InvalidBurnPercentage
    );
    require!(epoch_length >= 0, StakingError::InvalidEpochLength);

    let pool = &mut ctx.accounts.staking_pool;
    let config = &mut ctx.accounts.global_config;
    let clock = Clock::get()?;

    pool.authority = ctx.accounts.authority.key();
    pool.mint = ctx.accounts.mint.key();
    pool.vault = ctx.accounts.vault.key();
    pool.income_source = income_source;
    pool.burn_bps = burn_bps;
    pool.epoch_start_time = clock.unix_timestamp;
    pool.epoch_length = if epoch_length == 0 {
        DEFAULT_EPOCH_LENGTH
    } else {
        epoch_length
    };
    pool.current_epoch = 0;
    pool.paused = true;
    pool.batch_account_cap = batch_account_cap;
    pool.batch_total_cap = batch_total_cap;
    pool.created_at = clock.unix_timestamp;
    pool.bump = ctx.bumps.staking_pool;
    pool.authority_bump = ctx.bumps.pool_authority;
    pool.vault_bump = ctx.bumps.vault;

    // Update global config
    config.total_pools = config.total_pools.saturating_add(1);

    emit!(PoolCreated {
        pool: pool.key(),
        mint: pool.mint,
        authority: pool.authority,
        burn_bps,
        epoch_length: pool.epoch_length,
        timestamp: clock.unix_timestamp,
    });

    msg!("Created staking pool for mint: {}", pool.mint);
    msg!("Burn: {} bps, Epoch length: {}s", burn_bps, pool.epoch_length);
    msg!("Pool starts paused");

    Ok(())
}
