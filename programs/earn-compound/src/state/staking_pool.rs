use anchor_lang::prelude::*;

use crate::constants::{MAX_DISTRIBUTORS, REWARD_INDEX_SCALE};
use crate::errors::StakingError;
use crate::state::{EpochSchedule, RollOutcome};

/// Per-token auto-compounding staking pool
/// PDA: ["staking-pool", mint]
#[account]
#[derive(Default)]
pub struct StakingPool {
    /// Pool owner (admin operations, batch deposits, recovery)
    pub authority: Pubkey,

    /// Token mint that can be staked in this pool
    pub mint: Pubkey,

    /// Token account holding every staked and distributed token
    pub vault: Pubkey,

    /// Upstream fee router allowed to call distribute
    pub income_source: Pubkey,

    /// Sum of every account's compounded balance, unsettled reward and the
    /// unallocated buffer included
    pub total_staked: u64,

    /// Stake counted for income arriving in the current epoch
    pub eligible_total: u64,

    /// Cumulative reward per eligible token, scaled by 1e12
    pub reward_index: u128,

    /// Reward received while nobody was eligible
    pub unallocated_buffer: u64,

    /// Epoch in which the buffer started accruing
    pub buffer_epoch: u64,

    /// Boundary whose joiners the buffer is owed to; zero while no cohort is
    /// forming
    pub buffer_cohort: u64,

    /// Share of each income event that is burned, in basis points
    pub burn_bps: u16,

    pub epoch_start_time: i64,
    pub epoch_length: i64,

    /// Last epoch whose boundary has been applied
    pub current_epoch: u64,

    pub schedule: EpochSchedule,

    /// Addresses allowed to deposit on behalf of others
    pub distributors: Vec<Pubkey>,

    /// New pools start paused
    pub paused: bool,

    /// Largest single batch deposit per recipient
    pub batch_account_cap: u64,

    /// Lifetime ceiling on batch deposits
    pub batch_total_cap: u64,
    pub batch_deposited: u64,

    pub staker_count: u32,
    pub total_burned: u64,
    pub total_rewards_distributed: u64,

    pub created_at: i64,

    pub bump: u8,
    pub authority_bump: u8,
    pub vault_bump: u8,

    /// Reserved for future use
    pub _reserved: [u8; 32],
}

impl StakingPool {
    /// Size without the schedule
    pub const BASE_SIZE: usize = 8 + // discriminator
        32 + // authority
        32 + // mint
        32 + // vault
        32 + // income_source
        8 +  // total_staked
        8 +  // eligible_total
        16 + // reward_index
        8 +  // unallocated_buffer
        8 +  // buffer_epoch
        8 +  // buffer_cohort
        2 +  // burn_bps
        8 +  // epoch_start_time
        8 +  // epoch_length
        8 +  // current_epoch
        4 + MAX_DISTRIBUTORS * 32 + // distributors
        1 +  // paused
        8 +  // batch_account_cap
        8 +  // batch_total_cap
        8 +  // batch_deposited
        4 +  // staker_count
        8 +  // total_burned
        8 +  // total_rewards_distributed
        8 +  // created_at
        1 +  // bump
        1 +  // authority_bump
        1 +  // vault_bump
        32; // reserved

    /// Account size holding a schedule of `slots` entries and checkpoints
    pub fn space(slots: usize) -> usize {
        Self::BASE_SIZE + EpochSchedule::space(slots)
    }

    /// Account size the current state serializes into
    pub fn required_space(&self) -> usize {
        Self::space(self.schedule.slots())
    }

    /// Epoch containing `now`; a timestamp exactly on a boundary belongs to
    /// the new epoch
    pub fn epoch_at(&self, now: i64) -> u64 {
        if self.epoch_length <= 0 || now <= self.epoch_start_time {
            return 0;
        }
        ((now - self.epoch_start_time) / self.epoch_length) as u64
    }

    /// Applies every scheduled boundary that wall-clock time has crossed
    pub fn roll(&mut self, now: i64) -> Result<RollOutcome> {
        let target = self.epoch_at(now);
        if target <= self.current_epoch {
            return Ok(RollOutcome {
                from_epoch: self.current_epoch,
                to_epoch: self.current_epoch,
                ..Default::default()
            });
        }

        let mut outcome = RollOutcome {
            from_epoch: self.current_epoch,
            to_epoch: target,
            ..Default::default()
        };

        // a buffer owed to a cohort is folded in right after that cohort's
        // boundary, before any later one
        let mut cohort = 0;
        while self.unallocated_buffer > 0
            && self.buffer_cohort != 0
            && self.buffer_cohort <= target
        {
            cohort = self.buffer_cohort;
            let step = self.schedule.apply_through(
                cohort,
                &mut self.eligible_total,
                self.reward_index,
            )?;
            outcome.absorb(&step);
            outcome.buffer_released = self.fold_buffer()?;
        }

        let step =
            self.schedule
                .apply_through(target, &mut self.eligible_total, self.reward_index)?;
        outcome.absorb(&step);
        self.current_epoch = target;

        if outcome.buffer_released > 0 {
            msg!(
                "Unallocated buffer {} released to the cohort of epoch {}",
                outcome.buffer_released,
                cohort
            );
        }

        if outcome.shortfall > 0 {
            msg!(
                "Eligible total underflow clamped at epoch {}: shortfall {}",
                target,
                outcome.shortfall
            );
        }

        Ok(outcome)
    }

    /// Owes the buffer to the earliest cohort waiting for its boundary, or to
    /// nobody yet when no stake is waiting
    pub fn retarget_buffer(&mut self) {
        self.buffer_cohort = match self.unallocated_buffer {
            0 => 0,
            _ => self.schedule.next_cohort().unwrap_or(0),
        };
    }

    /// Spreads the buffer over the stake that just became eligible at the
    /// boundary it was owed to. Returns the amount released.
    fn fold_buffer(&mut self) -> Result<u64> {
        let amount = self.unallocated_buffer;
        let delta = self.index_delta(amount)?;
        if delta == 0 {
            // nobody joined after all, or too little to move the index
            self.retarget_buffer();
            return Ok(0);
        }

        self.reward_index = self
            .reward_index
            .checked_add(delta)
            .ok_or(StakingError::Overflow)?;
        self.unallocated_buffer = 0;
        self.buffer_cohort = 0;
        Ok(amount)
    }

    pub fn next_epoch(&self) -> Result<u64> {
        Ok(self
            .current_epoch
            .checked_add(1)
            .ok_or(StakingError::Overflow)?)
    }

    /// Index increase for `reward` spread over the eligible total
    pub fn index_delta(&self, reward: u64) -> Result<u128> {
        if self.eligible_total == 0 {
            return Ok(0);
        }
        let scaled = (reward as u128)
            .checked_mul(REWARD_INDEX_SCALE)
            .ok_or(StakingError::Overflow)?;
        Ok(scaled / self.eligible_total as u128)
    }

    pub fn is_distributor(&self, key: &Pubkey) -> bool {
        self.distributors.contains(key)
    }

    pub fn add_distributor(&mut self, key: Pubkey) -> Result<()> {
        if self.is_distributor(&key) {
            return Ok(());
        }
        require!(
            self.distributors.len() < MAX_DISTRIBUTORS,
            StakingError::DistributorListFull
        );
        self.distributors.push(key);
        Ok(())
    }

    pub fn remove_distributor(&mut self, key: &Pubkey) {
        self.distributors.retain(|d| d != key);
    }

    pub fn ensure_authority(&self, caller: &Pubkey) -> Result<()> {
        require_keys_eq!(*caller, self.authority, StakingError::Unauthorized);
        Ok(())
    }

    pub fn ensure_active(&self) -> Result<()> {
        require!(!self.paused, StakingError::PoolPaused);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Transition;

    fn pool(start: i64, length: i64) -> StakingPool {
        StakingPool {
            epoch_start_time: start,
            epoch_length: length,
            ..Default::default()
        }
    }

    #[test]
    fn test_epoch_at_boundaries() {
        let pool = pool(1_000, 100);
        assert_eq!(pool.epoch_at(0), 0);
        assert_eq!(pool.epoch_at(1_000), 0);
        assert_eq!(pool.epoch_at(1_099), 0);
        assert_eq!(pool.epoch_at(1_100), 1);
        assert_eq!(pool.epoch_at(1_350), 3);
    }

    #[test]
    fn test_roll_is_noop_inside_epoch() {
        let mut pool = pool(0, 100);
        pool.schedule.add_addition(1, 500, true).unwrap();

        let outcome = pool.roll(99).unwrap();
        assert!(!outcome.advanced());
        assert_eq!(pool.eligible_total, 0);

        let outcome = pool.roll(100).unwrap();
        assert!(outcome.advanced());
        assert_eq!(pool.eligible_total, 500);
        assert_eq!(pool.current_epoch, 1);
    }

    #[test]
    fn test_roll_across_skipped_epochs() {
        let mut pool = pool(0, 10);
        pool.schedule.add_addition(1, 100, true).unwrap();
        pool.reward_index = 42;

        pool.roll(95).unwrap();
        assert_eq!(pool.current_epoch, 9);
        assert_eq!(pool.eligible_total, 100);
        assert_eq!(pool.schedule.start_index(1), Some(42));
    }

    #[test]
    fn test_buffer_is_folded_in_at_its_cohort_boundary() {
        let mut pool = pool(0, 100);
        pool.schedule.add_addition(1, 200, true).unwrap();
        pool.unallocated_buffer = 50;
        pool.retarget_buffer();
        assert_eq!(pool.buffer_cohort, 1);

        let outcome = pool.roll(100).unwrap();
        assert_eq!(outcome.buffer_released, 50);
        assert_eq!(pool.unallocated_buffer, 0);
        assert_eq!(pool.buffer_cohort, 0);
        // the cohort's checkpoint predates the fold, so the cohort earns it
        assert_eq!(pool.schedule.start_index(1), Some(0));
        assert_eq!(pool.reward_index, REWARD_INDEX_SCALE / 4);
    }

    #[test]
    fn test_buffer_stays_when_its_cohort_dissolves() {
        let mut pool = pool(0, 100);
        pool.schedule.add_addition(1, 10, true).unwrap();
        pool.unallocated_buffer = 50;
        pool.retarget_buffer();

        pool.schedule.retract_addition(1, 10).unwrap();
        pool.schedule.release(1, Transition::Join).unwrap();

        let outcome = pool.roll(250).unwrap();
        assert_eq!(outcome.buffer_released, 0);
        assert_eq!(pool.unallocated_buffer, 50);
        assert_eq!(pool.buffer_cohort, 0);
        assert_eq!(pool.reward_index, 0);
    }

    #[test]
    fn test_space_grows_with_the_schedule() {
        let mut pool = pool(0, 100);
        assert_eq!(pool.required_space(), StakingPool::space(0));
        pool.schedule.add_addition(1, 10, true).unwrap();
        pool.roll(100).unwrap();
        pool.schedule.add_addition(2, 10, true).unwrap();
        assert_eq!(
            pool.required_space(),
            StakingPool::space(0) + 2 * EpochSchedule::SLOT_SIZE
        );
    }

    #[test]
    fn test_index_delta_truncates() {
        let mut pool = pool(0, 10);
        pool.eligible_total = 3;
        assert_eq!(pool.index_delta(1).unwrap(), REWARD_INDEX_SCALE / 3);

        pool.eligible_total = u64::MAX;
        assert_eq!(pool.index_delta(1).unwrap(), 0);
    }

    #[test]
    fn test_distributor_whitelist() {
        let mut pool = pool(0, 10);
        let d = Pubkey::new_unique();
        pool.add_distributor(d).unwrap();
        pool.add_distributor(d).unwrap();
        assert_eq!(pool.distributors.len(), 1);
        assert!(pool.is_distributor(&d));

        pool.remove_distributor(&d);
        assert!(!pool.is_distributor(&d));
    }

    #[test]
    fn test_distributor_whitelist_is_bounded() {
        let mut pool = pool(0, 10);
        for _ in 0..MAX_DISTRIBUTORS {
            pool.add_distributor(Pubkey::new_unique()).unwrap();
        }
        assert_eq!(
            pool.add_distributor(Pubkey::new_unique()).unwrap_err(),
            StakingError::DistributorListFull.into()
        );
    }
}
