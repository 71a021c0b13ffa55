#![allow(dead_code)]

use std::collections::HashMap;

use anchor_lang::prelude::*;
use earn_compound::constants::ONE_HUNDRED_PERCENT;
use earn_compound::engine::{
    self, DepositReceipt, DistributeReceipt, ExitReceipt, Settlement, WithdrawalReceipt,
};
use earn_compound::errors::StakingError;
use earn_compound::ledger::Ledger;
use earn_compound::state::{StakeAccount, StakingPool};

pub const EPOCH: i64 = 100;
pub const INITIAL_SUPPLY: u64 = 1_000_000_000_000_000;

/// Timestamp inside `epoch`
pub fn at(epoch: u64) -> i64 {
    epoch as i64 * EPOCH + 10
}

/// In-memory token ledger. Can be switched into fee-on-transfer or burn
/// no-op mode to simulate non-conforming tokens.
#[derive(Default)]
pub struct MockLedger {
    pub custody: u64,
    pub supply: u64,
    pub holders: HashMap<Pubkey, u64>,
    pub transfer_fee_bps: u16,
    pub burn_noop: bool,
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            supply: INITIAL_SUPPLY,
            ..Default::default()
        }
    }

    pub fn fund(&mut self, holder: Pubkey, amount: u64) {
        *self.holders.entry(holder).or_default() += amount;
    }

    pub fn balance(&self, holder: &Pubkey) -> u64 {
        self.holders.get(holder).copied().unwrap_or(0)
    }

    /// Tokens arriving in custody without going through the engine
    pub fn deliver(&mut self, amount: u64) {
        self.custody += amount;
    }
}

impl Ledger for MockLedger {
    fn transfer_in(&mut self, from: &Pubkey, amount: u64) -> Result<()> {
        let held = self.holders.entry(*from).or_default();
        require!(*held >= amount, StakingError::LedgerTransferFailed);
        *held -= amount;

        let fee = (amount as u128 * self.transfer_fee_bps as u128
            / ONE_HUNDRED_PERCENT as u128) as u64;
        self.custody += amount - fee;
        Ok(())
    }

    fn transfer_out(&mut self, to: &Pubkey, amount: u64) -> Result<()> {
        require!(self.custody >= amount, StakingError::LedgerTransferFailed);
        self.custody -= amount;
        *self.holders.entry(*to).or_default() += amount;
        Ok(())
    }

    fn burn(&mut self, amount: u64) -> Result<()> {
        if self.burn_noop {
            return Ok(());
        }
        require!(self.custody >= amount, StakingError::LedgerTransferFailed);
        self.custody -= amount;
        self.supply -= amount;
        Ok(())
    }

    fn total_supply(&mut self) -> Result<u64> {
        Ok(self.supply)
    }

    fn custody_balance(&mut self) -> Result<u64> {
        Ok(self.custody)
    }
}

/// One pool, its stake accounts and a mock ledger
pub struct Harness {
    pub pool_key: Pubkey,
    pub pool: StakingPool,
    pub ledger: MockLedger,
    pub authority: Pubkey,
    pub income_source: Pubkey,
    pub accounts: HashMap<Pubkey, StakeAccount>,
}

impl Harness {
    /// Active pool with a 50% burn
    pub fn new() -> Self {
        Self::with_burn(5_000)
    }

    pub fn with_burn(burn_bps: u16) -> Self {
        let authority = Pubkey::new_unique();
        let income_source = Pubkey::new_unique();
        let pool = StakingPool {
            authority,
            mint: Pubkey::new_unique(),
            vault: Pubkey::new_unique(),
            income_source,
            burn_bps,
            epoch_start_time: 0,
            epoch_length: EPOCH,
            batch_account_cap: 1_000,
            batch_total_cap: 10_000,
            ..Default::default()
        };

        Self {
            pool_key: Pubkey::new_unique(),
            pool,
            ledger: MockLedger::new(),
            authority,
            income_source,
            accounts: HashMap::new(),
        }
    }

    /// Opens a stake account for a fresh owner
    pub fn staker(&mut self) -> Pubkey {
        let owner = Pubkey::new_unique();
        self.accounts.insert(
            owner,
            StakeAccount {
                owner,
                pool: self.pool_key,
                index_snapshot: self.pool.reward_index,
                ..Default::default()
            },
        );
        owner
    }

    pub fn account(&self, owner: &Pubkey) -> &StakeAccount {
        &self.accounts[owner]
    }

    /// Funds `owner` with exactly `amount` and deposits it
    pub fn deposit(&mut self, owner: &Pubkey, amount: u64, now: i64) -> Result<DepositReceipt> {
        self.ledger.fund(*owner, amount);
        let account = self
            .accounts
            .get_mut(owner)
            .ok_or(StakingError::InvalidStakeAccount)?;
        engine::deposit(&mut self.pool, account, &mut self.ledger, owner, amount, now)
    }

    /// Income source places `amount` in custody and distributes it
    pub fn income(&mut self, amount: u64, now: i64) -> Result<DistributeReceipt> {
        self.ledger.deliver(amount);
        let caller = self.income_source;
        engine::distribute(&mut self.pool, &mut self.ledger, &caller, amount, now)
    }

    pub fn request_withdrawal(&mut self, owner: &Pubkey, now: i64) -> Result<WithdrawalReceipt> {
        let account = self
            .accounts
            .get_mut(owner)
            .ok_or(StakingError::InvalidStakeAccount)?;
        engine::request_withdrawal(&mut self.pool, account, owner, now)
    }

    pub fn cancel_withdrawal(&mut self, owner: &Pubkey, now: i64) -> Result<WithdrawalReceipt> {
        let account = self
            .accounts
            .get_mut(owner)
            .ok_or(StakingError::InvalidStakeAccount)?;
        engine::cancel_withdrawal(&mut self.pool, account, owner, now)
    }

    pub fn finalize_withdrawal(&mut self, owner: &Pubkey, now: i64) -> Result<WithdrawalReceipt> {
        let account = self
            .accounts
            .get_mut(owner)
            .ok_or(StakingError::InvalidStakeAccount)?;
        engine::finalize_withdrawal(&mut self.pool, account, &mut self.ledger, owner, now)
    }

    pub fn emergency_exit(&mut self, owner: &Pubkey, now: i64) -> Result<ExitReceipt> {
        let account = self
            .accounts
            .get_mut(owner)
            .ok_or(StakingError::InvalidStakeAccount)?;
        engine::emergency_exit(&mut self.pool, account, &mut self.ledger, owner, now)
    }

    pub fn poke(&mut self, owner: &Pubkey, now: i64) -> Settlement {
        let account = self.accounts.get_mut(owner).unwrap();
        engine::poke(&mut self.pool, account, now).unwrap().0
    }

    pub fn pending_reward(&self, owner: &Pubkey, now: i64) -> u64 {
        engine::pending_reward(&self.pool, self.account(owner), now).unwrap()
    }

    pub fn balance_of(&self, owner: &Pubkey, now: i64) -> u64 {
        engine::balance_of(&self.pool, self.account(owner), now).unwrap()
    }

    pub fn roll(&mut self, now: i64) {
        self.pool.roll(now).unwrap();
    }

    /// Totals agree with the per-account view. Truncation dust, at most one
    /// unit per account and income event, stays in `total_staked`.
    pub fn assert_consistent(&self, now: i64, dust: u64) {
        let mut view = self.pool.clone();
        view.roll(now).unwrap();

        let held: u64 = self
            .accounts
            .values()
            .map(|a| engine::balance_of(&self.pool, a, now).unwrap())
            .sum::<u64>()
            + view.unallocated_buffer;

        assert!(view.total_staked >= held, "accounts hold more than the pool");
        assert!(
            view.total_staked - held <= dust,
            "total_staked {} drifted from accounts {}",
            view.total_staked,
            held
        );
        assert!(view.eligible_total <= view.total_staked);
        assert!(self.ledger.custody >= view.total_staked);
    }
}
