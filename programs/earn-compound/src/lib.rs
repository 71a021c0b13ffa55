use anchor_lang::prelude::*;

pub mod constants;
pub mod engine;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod ledger;
pub mod state;

use instructions::*;

declare_id!("3ksLRaEjRqWaeQfvgHwwGDiqAALfYscgprwZDYKHAL8H");

/// Earn Compound Program
///
/// Auto-compounding staking with burn-and-distribute income. Each income
/// event burns a configurable share of the tokens and spreads the rest over
/// the stake that was eligible for the whole current epoch. Deposits and
/// withdrawals only change eligibility at the next epoch boundary.
#[program]
pub mod earn_compound {
    use super::*;

    /// Initialize global config (one-time admin setup)
    pub fn initialize(ctx: Context<Initialize>) -> Result<()> {
        instructions::initialize::handler(ctx)
    }

    /// Create a staking pool for a token. The pool starts paused.
    pub fn create_pool(
        ctx: Context<CreatePool>,
        burn_bps: u16,
        epoch_length: i64,
        batch_account_cap: u64,
        batch_total_cap: u64,
        income_source: Pubkey,
    ) -> Result<()> {
        instructions::create_pool::handler(
            ctx,
            burn_bps,
            epoch_length,
            batch_account_cap,
            batch_total_cap,
            income_source,
        )
    }

    /// Create an empty stake account for `owner`
    pub fn open_stake_account(ctx: Context<OpenStakeAccount>, owner: Pubkey) -> Result<()> {
        instructions::open_stake_account::handler(ctx, owner)
    }

    /// Stake tokens; eligible from the next epoch
    pub fn deposit(ctx: Context<Deposit>, amount: u64) -> Result<()> {
        instructions::deposit::handler(ctx, amount)
    }

    /// Stake on behalf of `beneficiary` (whitelisted distributors only)
    pub fn deposit_on_behalf(
        ctx: Context<DepositOnBehalf>,
        beneficiary: Pubkey,
        amount: u64,
    ) -> Result<()> {
        instructions::deposit_on_behalf::handler(ctx, beneficiary, amount)
    }

    /// Start a withdrawal of the whole position
    pub fn request_withdrawal(ctx: Context<RequestWithdrawal>) -> Result<()> {
        instructions::request_withdrawal::handler(ctx)
    }

    pub fn cancel_withdrawal(ctx: Context<CancelWithdrawal>) -> Result<()> {
        instructions::cancel_withdrawal::handler(ctx)
    }

    /// Pay out a requested withdrawal once its epoch has started
    pub fn finalize_withdrawal(ctx: Context<FinalizeWithdrawal>) -> Result<()> {
        instructions::finalize_withdrawal::handler(ctx)
    }

    /// Leave immediately, forfeiting unsettled reward
    pub fn emergency_exit(ctx: Context<EmergencyExit>) -> Result<()> {
        instructions::emergency_exit::handler(ctx)
    }

    /// Burn and distribute income already moved into the vault
    pub fn distribute(ctx: Context<Distribute>, amount: u64) -> Result<()> {
        instructions::distribute::handler(ctx, amount)
    }

    /// Settle any account (permissionless crank)
    pub fn poke(ctx: Context<Poke>) -> Result<()> {
        instructions::poke::handler(ctx)
    }

    /// Seed `recipients[start..end]` while the pool is paused
    pub fn batch_deposit_for<'info>(
        ctx: Context<'_, '_, 'info, 'info, BatchDepositFor<'info>>,
        recipients: Vec<Pubkey>,
        amounts: Vec<u64>,
        start: u32,
        end: u32,
    ) -> Result<()> {
        instructions::batch_deposit_for::handler(ctx, recipients, amounts, start, end)
    }

    pub fn set_burn_percentage(ctx: Context<UpdatePool>, burn_bps: u16) -> Result<()> {
        instructions::update_pool::update_burn_percentage(ctx, burn_bps)
    }

    pub fn set_distributor(
        ctx: Context<UpdatePool>,
        distributor: Pubkey,
        allowed: bool,
    ) -> Result<()> {
        instructions::update_pool::update_distributor(ctx, distributor, allowed)
    }

    pub fn set_paused(ctx: Context<UpdatePool>, paused: bool) -> Result<()> {
        instructions::update_pool::update_paused(ctx, paused)
    }

    pub fn set_income_source(ctx: Context<UpdatePool>, income_source: Pubkey) -> Result<()> {
        instructions::update_pool::update_income_source(ctx, income_source)
    }

    /// Only allowed before the first epoch boundary
    pub fn set_epoch_length(ctx: Context<UpdatePool>, epoch_length: i64) -> Result<()> {
        instructions::update_pool::update_epoch_length(ctx, epoch_length)
    }

    /// Recover tokens held beyond every accounted balance
    pub fn sweep_excess(ctx: Context<Recover>) -> Result<()> {
        instructions::recover::recover_excess(ctx)
    }

    /// Recover an unallocated buffer that nobody could receive
    pub fn reclaim_buffer(ctx: Context<Recover>) -> Result<()> {
        instructions::recover::recover_buffer(ctx)
    }

    pub fn balance_of(ctx: Context<PositionView>) -> Result<u64> {
        instructions::views::balance_of(ctx)
    }

    pub fn pending_reward(ctx: Context<PositionView>) -> Result<u64> {
        instructions::views::pending_reward(ctx)
    }

    pub fn is_distributor(ctx: Context<PoolView>, key: Pubkey) -> Result<bool> {
        instructions::views::is_distributor(ctx, key)
    }
}
