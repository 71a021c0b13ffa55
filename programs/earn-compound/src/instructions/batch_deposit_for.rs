use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::constants::*;
use crate::engine;
use crate::errors::StakingError;
use crate::events::BatchDeposited;
use crate::instructions::{fit_pool_account, report_roll};
use crate::ledger::{Counterparty, TokenLedger};
use crate::state::{StakeAccount, StakingPool};

/// Owner seeding of positions before the pool opens.
///
/// The stake accounts of `recipients[start..end]` are passed, in order, as
/// writable remaining accounts and must already exist (see
/// `open_stake_account`).
#[derive(Accounts)]
pub struct BatchDepositFor<'info> {
    #[account(mut)]
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

    /// CHECK: Pool authority for signing vault movements
    #[account(
        seeds = [POOL_AUTHORITY_SEED, staking_pool.key().as_ref()],
        bump = staking_pool.authority_bump
    )]
    pub pool_authority: UncheckedAccount<'info>,

    #[account(
        mut,
        token::mint = mint,
        token::authority = authority
    )]
    pub authority_token_account: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}

pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, BatchDepositFor<'info>>,
    recipients: Vec<Pubkey>,
    amounts: Vec<u64>,
    start: u32,
    end: u32,
) -> Result<()> {
    let clock = Clock::get()?;
    let pool_key = ctx.accounts.staking_pool.key();
    let authority_key = ctx.accounts.authority.key();

    let expected = (end as usize).saturating_sub(start as usize);
    require!(
        ctx.remaining_accounts.len() == expected,
        StakingError::InvalidBatchRange
    );

    let mut loaded: Vec<Account<'info, StakeAccount>> = Vec::with_capacity(expected);
    for (info, recipient) in ctx
        .remaining_accounts
        .iter()
        .zip(recipients.iter().skip(start as usize))
    {
        require!(info.is_writable, StakingError::InvalidStakeAccount);
        let account = Account::<StakeAccount>::try_from(info)?;
        require_keys_eq!(account.pool, pool_key, StakingError::InvalidStakeAccount);
        require_keys_eq!(account.owner, *recipient, StakingError::InvalidStakeAccount);

        let address = Pubkey::create_program_address(
            &[
                STAKE_ACCOUNT_SEED,
                pool_key.as_ref(),
                recipient.as_ref(),
                &[account.bump],
            ],
            &crate::ID,
        )
        .map_err(|_| error!(StakingError::InvalidStakeAccount))?;
        require_keys_eq!(info.key(), address, StakingError::InvalidStakeAccount);

        loaded.push(account);
    }

    let mut staged: Vec<StakeAccount> = loaded.iter().map(|a| (**a).clone()).collect();

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
        owner: authority_key,
        token_account: accounts.authority_token_account.to_account_info(),
        authority: Some(accounts.authority.to_account_info()),
    });

    let receipt = engine::batch_deposit_for(
        &mut accounts.staking_pool,
        &mut staged,
        &mut ledger,
        &authority_key,
        &recipients,
        &amounts,
        start,
        end,
        clock.unix_timestamp,
    )?;

    // remaining accounts are not serialized by the framework
    for (account, next) in loaded.iter_mut().zip(staged) {
        **account = next;
        account.exit(&crate::ID)?;
    }

    fit_pool_account(
        &accounts.staking_pool,
        &accounts.authority.to_account_info(),
        &accounts.system_program,
    )?;

    report_roll(
        pool_key,
        accounts.staking_pool.eligible_total,
        &receipt.roll,
        clock.unix_timestamp,
    );

    emit!(BatchDeposited {
        pool: pool_key,
        total: receipt.total,
        recipients: receipt.recipients,
        batch_deposited: receipt.batch_deposited,
        timestamp: clock.unix_timestamp,
    });

    msg!(
        "Batch deposited {} tokens to {} recipients [{}..{})",
        receipt.total,
        receipt.recipients,
        start,
        end
    );
    msg!("Lifetime batch total: {}", receipt.batch_deposited);

    Ok(())
}
