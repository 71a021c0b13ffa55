use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    self, Burn, Mint, TokenAccount, TokenInterface, TransferChecked,
};

use crate::errors::StakingError;

/// Holder of the pool's actual token balances. The engine never trusts a
/// successful return on its own; every movement is checked through
/// `custody_balance` or `total_supply` deltas.
pub trait Ledger {
    fn transfer_in(&mut self, from: &Pubkey, amount: u64) -> Result<()>;

    fn transfer_out(&mut self, to: &Pubkey, amount: u64) -> Result<()>;

    fn burn(&mut self, amount: u64) -> Result<()>;

    fn total_supply(&mut self) -> Result<u64>;

    /// Tokens currently held by the pool
    fn custody_balance(&mut self) -> Result<u64>;
}

/// Pulls `amount` from `from`, rejecting fee-on-transfer or partial deliveries
pub fn pull_exact<L: Ledger>(ledger: &mut L, from: &Pubkey, amount: u64) -> Result<()> {
    let before = ledger.custody_balance()?;
    ledger.transfer_in(from, amount)?;
    let after = ledger.custody_balance()?;

    require!(
        after.checked_sub(before) == Some(amount),
        StakingError::LedgerTransferFailed
    );
    Ok(())
}

/// Sends `amount` to `to`; custody must shrink by exactly `amount`
pub fn push_exact<L: Ledger>(ledger: &mut L, to: &Pubkey, amount: u64) -> Result<()> {
    let before = ledger.custody_balance()?;
    ledger.transfer_out(to, amount)?;
    let after = ledger.custody_balance()?;

    require!(
        before.checked_sub(after) == Some(amount),
        StakingError::LedgerTransferFailed
    );
    Ok(())
}

/// Burns from custody and checks that global supply dropped by `amount`
pub fn burn_verified<L: Ledger>(ledger: &mut L, amount: u64) -> Result<()> {
    let supply_before = ledger.total_supply()?;
    ledger.burn(amount)?;
    let supply_after = ledger.total_supply()?;

    require!(
        supply_before.checked_sub(supply_after) == Some(amount),
        StakingError::BurnVerificationFailed
    );
    Ok(())
}

/// The user side of a token movement
pub struct Counterparty<'info> {
    /// Wallet the engine addresses the movement to
    pub owner: Pubkey,
    pub token_account: AccountInfo<'info>,
    /// Signer authorizing pulls; not needed for payouts
    pub authority: Option<AccountInfo<'info>>,
}

/// SPL Token / Token-2022 ledger backed by the pool vault
pub struct TokenLedger<'a, 'info> {
    token_program: AccountInfo<'info>,
    mint: &'a mut InterfaceAccount<'info, Mint>,
    vault: &'a mut InterfaceAccount<'info, TokenAccount>,
    pool_authority: AccountInfo<'info>,
    signer_seeds: &'a [&'a [&'a [u8]]],
    counterparty: Option<Counterparty<'info>>,
}

impl<'a, 'info> TokenLedger<'a, 'info> {
    pub fn new(
        token_program: &Interface<'info, TokenInterface>,
        mint: &'a mut InterfaceAccount<'info, Mint>,
        vault: &'a mut InterfaceAccount<'info, TokenAccount>,
        pool_authority: AccountInfo<'info>,
        signer_seeds: &'a [&'a [&'a [u8]]],
    ) -> Self {
        Self {
            token_program: token_program.to_account_info(),
            mint,
            vault,
            pool_authority,
            signer_seeds,
            counterparty: None,
        }
    }

    pub fn with_counterparty(mut self, counterparty: Counterparty<'info>) -> Self {
        self.counterparty = Some(counterparty);
        self
    }

    fn counterparty(&self, key: &Pubkey) -> Result<&Counterparty<'info>> {
        let party = self
            .counterparty
            .as_ref()
            .ok_or(StakingError::LedgerTransferFailed)?;
        require_keys_eq!(*key, party.owner, StakingError::Unauthorized);
        Ok(party)
    }
}

impl<'a, 'info> Ledger for TokenLedger<'a, 'info> {
    fn transfer_in(&mut self, from: &Pubkey, amount: u64) -> Result<()> {
        let party = self.counterparty(from)?;
        let authority = party
            .authority
            .clone()
            .ok_or(StakingError::Unauthorized)?;

        let cpi_accounts = TransferChecked {
            from: party.token_account.clone(),
            mint: self.mint.to_account_info(),
            to: self.vault.to_account_info(),
            authority,
        };
        let cpi_ctx = CpiContext::new(self.token_program.clone(), cpi_accounts);
        token_interface::transfer_checked(cpi_ctx, amount, self.mint.decimals)
    }

    fn transfer_out(&mut self, to: &Pubkey, amount: u64) -> Result<()> {
        let party = self.counterparty(to)?;

        let cpi_accounts = TransferChecked {
            from: self.vault.to_account_info(),
            mint: self.mint.to_account_info(),
            to: party.token_account.clone(),
            authority: self.pool_authority.clone(),
        };
        let cpi_ctx = CpiContext::new_with_signer(
            self.token_program.clone(),
            cpi_accounts,
            self.signer_seeds,
        );
        token_interface::transfer_checked(cpi_ctx, amount, self.mint.decimals)
    }

    fn burn(&mut self, amount: u64) -> Result<()> {
        let cpi_accounts = Burn {
            mint: self.mint.to_account_info(),
            from: self.vault.to_account_info(),
            authority: self.pool_authority.clone(),
        };
        let cpi_ctx = CpiContext::new_with_signer(
            self.token_program.clone(),
            cpi_accounts,
            self.signer_seeds,
        );
        token_interface::burn(cpi_ctx, amount)
    }

    fn total_supply(&mut self) -> Result<u64> {
        self.mint.reload()?;
        Ok(self.mint.supply)
    }

    fn custody_balance(&mut self) -> Result<u64> {
        self.vault.reload()?;
        Ok(self.vault.amount)
    }
}
