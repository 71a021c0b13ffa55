use anchor_lang::prelude::*;

use crate::constants::STAKING_POOL_SEED;
use crate::engine;
use crate::errors::StakingError;
use crate::events::{ConfigUpdated, DistributorUpdated, IncomeSourceUpdated};
use crate::state::StakingPool;

/// Shared accounts for every owner-only pool setting
#[derive(Accounts)]
pub struct UpdatePool<'info> {
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [STAKING_POOL_SEED, staking_pool.mint.as_ref()],
        bump = staking_pool.bump,
        has_one = authority @ StakingError::Unauthorized
    )]
    pub staking_pool: Account<'info, StakingPool>,
}

impl<'info> UpdatePool<'info> {
    fn config_updated(&self, field: &str, old_value: u64, new_value: u64) -> Result<()> {
        let clock = Clock::get()?;
        emit!(ConfigUpdated {
            pool: self.staking_pool.key(),
            updater: self.authority.key(),
            field: field.to_string(),
            old_value,
            new_value,
            timestamp: clock.unix_timestamp,
        });
        msg!("Updated {}: {} -> {}", field, old_value, new_value);
        Ok(())
    }
}

pub fn update_burn_percentage(ctx: Context<UpdatePool>, burn_bps: u16) -> Result<()> {
    let authority = ctx.accounts.authority.key();
    let old = engine::set_burn_percentage(&mut ctx.accounts.staking_pool, &authority, burn_bps)?;

    ctx.accounts
        .config_updated("burn_bps", old as u64, burn_bps as u64)
}

pub fn update_distributor(
    ctx: Context<UpdatePool>,
    distributor: Pubkey,
    allowed: bool,
) -> Result<()> {
    let authority = ctx.accounts.authority.key();
    engine::set_distributor(
        &mut ctx.accounts.staking_pool,
        &authority,
        distributor,
        allowed,
    )?;

    let clock = Clock::get()?;
    emit!(DistributorUpdated {
        pool: ctx.accounts.staking_pool.key(),
        distributor,
        allowed,
        timestamp: clock.unix_timestamp,
    });

    if allowed {
        msg!("Distributor allowed: {}", distributor);
    } else {
        msg!("Distributor removed: {}", distributor);
    }
    msg!("Distributors: {}", ctx.accounts.staking_pool.distributors.len());

    Ok(())
}

pub fn update_paused(ctx: Context<UpdatePool>, paused: bool) -> Result<()> {
    let authority = ctx.accounts.authority.key();
    let old = ctx.accounts.staking_pool.paused;
    engine::set_paused(&mut ctx.accounts.staking_pool, &authority, paused)?;

    ctx.accounts
        .config_updated("paused", old as u64, paused as u64)
}

pub fn update_income_source(ctx: Context<UpdatePool>, income_source: Pubkey) -> Result<()> {
    let authority = ctx.accounts.authority.key();
    let old = ctx.accounts.staking_pool.income_source;
    engine::set_income_source(&mut ctx.accounts.staking_pool, &authority, income_source)?;

    let clock = Clock::get()?;
    emit!(IncomeSourceUpdated {
        pool: ctx.accounts.staking_pool.key(),
        old_income_source: old,
        new_income_source: income_source,
        timestamp: clock.unix_timestamp,
    });

    msg!("Income source: {} -> {}", old, income_source);
    Ok(())
}

pub fn update_epoch_length(ctx: Context<UpdatePool>, epoch_length: i64) -> Result<()> {
    let clock = Clock::get()?;
    let authority = ctx.accounts.authority.key();
    let old = ctx.accounts.staking_pool.epoch_length;
    engine::set_epoch_length(
        &mut ctx.accounts.staking_pool,
        &authority,
        epoch_length,
        clock.unix_timestamp,
    )?;

    ctx.accounts
        .config_updated("epoch_length", old as u64, epoch_length as u64)
}
