use anchor_lang::prelude::*;

use crate::constants::REWARD_INDEX_SCALE;
use crate::errors::StakingError;
use crate::state::{StakingPool, Transition};

/// Individual user's stake in a pool
/// PDA: ["stake-account", pool, owner]
#[account]
#[derive(Default)]
pub struct StakeAccount {
    /// Owner of this stake account
    pub owner: Pubkey,

    /// The pool this stake belongs to
    pub pool: Pubkey,

    /// Compounded stake as of the last settlement
    pub balance: u64,

    /// Part of `balance` counted in the pool's eligible total
    pub eligible_balance: u64,

    /// Pool reward index at the last settlement
    pub index_snapshot: u128,

    /// Stake waiting for `addition_epoch` to become eligible
    pub pending_addition: u64,
    pub addition_epoch: u64,

    /// Set between request and finalize (or cancel)
    pub withdrawal_pending: bool,

    /// First epoch in which the withdrawal can be finalized
    pub withdrawal_epoch: u64,

    pub last_settled_epoch: u64,

    /// Lifetime total credited through owner batch deposits
    pub batch_received: u64,

    /// Timestamp when tokens were first staked
    pub staked_at: i64,

    /// Bump seed for PDA derivation
    pub bump: u8,

    /// Reserved for future use
    pub _reserved: [u8; 32],
}

/// Reward owed since the last settlement and the eligible balance that holds
/// once every crossed boundary is folded in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Accrual {
    pub reward: u64,
    pub eligible_balance: u64,
    /// Boundary folded into this accrual, whose schedule reference can be released
    pub crossed: Option<(u64, Transition)>,
}

impl StakeAccount {
    pub const SIZE: usize = 8 + // discriminator
        32 + // owner
        32 + // pool
        8 +  // balance
        8 +  // eligible_balance
        16 + // index_snapshot
        8 +  // pending_addition
        8 +  // addition_epoch
        1 +  // withdrawal_pending
        8 +  // withdrawal_epoch
        8 +  // last_settled_epoch
        8 +  // batch_received
        8 +  // staked_at
        1 +  // bump
        32; // reserved

    pub fn is_initialized(&self) -> bool {
        self.owner != Pubkey::default()
    }

    /// Whether the account's scheduled removal has been applied to the pool
    pub fn removal_applied(&self, current_epoch: u64) -> bool {
        self.withdrawal_pending && self.withdrawal_epoch <= current_epoch
    }

    /// Boundary at which this account's pending addition joins the eligible set
    pub fn joining_epoch(&self) -> Option<u64> {
        (!self.withdrawal_pending && self.pending_addition > 0).then_some(self.addition_epoch)
    }

    fn addition_applied(&self, current_epoch: u64) -> bool {
        self.joining_epoch().map_or(false, |epoch| epoch <= current_epoch)
    }

    /// Computes reward since `index_snapshot` against a rolled pool. At most one
    /// boundary can change the eligible balance between settlements: the one
    /// applying this account's pending addition or its withdrawal removal.
    pub fn accrue(&self, pool: &StakingPool) -> Result<Accrual> {
        let current = pool.current_epoch;
        let index = pool.reward_index;

        if self.removal_applied(current) {
            if self.eligible_balance == 0 {
                return Ok(Accrual::default());
            }
            let boundary = pool
                .schedule
                .start_index(self.withdrawal_epoch)
                .ok_or(StakingError::AccountingInvariantViolated)?;
            return Ok(Accrual {
                reward: earned(self.eligible_balance, self.index_snapshot, boundary)?,
                eligible_balance: 0,
                crossed: Some((self.withdrawal_epoch, Transition::Leave)),
            });
        }

        if self.addition_applied(current) {
            let boundary = pool
                .schedule
                .start_index(self.addition_epoch)
                .ok_or(StakingError::AccountingInvariantViolated)?;
            let grown = self
                .eligible_balance
                .checked_add(self.pending_addition)
                .ok_or(StakingError::Overflow)?;
            let before = earned(self.eligible_balance, self.index_snapshot, boundary)?;
            let after = earned(grown, boundary, index)?;
            return Ok(Accrual {
                reward: before.checked_add(after).ok_or(StakingError::Overflow)?,
                eligible_balance: grown,
                crossed: Some((self.addition_epoch, Transition::Join)),
            });
        }

        Ok(Accrual {
            reward: earned(self.eligible_balance, self.index_snapshot, index)?,
            eligible_balance: self.eligible_balance,
            crossed: None,
        })
    }
}

/// `amount × (to − from) / S`, truncated
pub fn earned(amount: u64, from_index: u128, to_index: u128) -> Result<u64> {
    let delta = to_index.saturating_sub(from_index);
    let scaled = (amount as u128)
        .checked_mul(delta)
        .ok_or(StakingError::Overflow)?;
    let reward = scaled / REWARD_INDEX_SCALE;
    Ok(u64::try_from(reward).map_err(|_| StakingError::Overflow)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool_at(epoch: u64, index: u128) -> StakingPool {
        StakingPool {
            current_epoch: epoch,
            reward_index: index,
            epoch_length: 100,
            ..Default::default()
        }
    }

    #[test]
    fn test_earned_truncates() {
        assert_eq!(earned(100, 0, REWARD_INDEX_SCALE / 2).unwrap(), 50);
        assert_eq!(earned(3, 0, REWARD_INDEX_SCALE / 3).unwrap(), 0);
        assert_eq!(earned(100, 10, 5).unwrap(), 0);
    }

    #[test]
    fn test_accrue_without_boundary() {
        let pool = pool_at(3, REWARD_INDEX_SCALE);
        let account = StakeAccount {
            balance: 200,
            eligible_balance: 200,
            index_snapshot: REWARD_INDEX_SCALE / 2,
            ..Default::default()
        };
        let accrual = account.accrue(&pool).unwrap();
        assert_eq!(accrual.reward, 100);
        assert_eq!(accrual.eligible_balance, 200);
        assert_eq!(accrual.crossed, None);
    }

    #[test]
    fn test_accrue_splits_at_addition_boundary() {
        let mut pool = pool_at(0, REWARD_INDEX_SCALE / 10);
        pool.schedule.add_addition(1, 100, true).unwrap();
        pool.eligible_total = 100;
        pool.roll(100).unwrap();
        pool.reward_index += REWARD_INDEX_SCALE / 2;

        let account = StakeAccount {
            balance: 200,
            eligible_balance: 100,
            index_snapshot: 0,
            pending_addition: 100,
            addition_epoch: 1,
            ..Default::default()
        };
        let accrual = account.accrue(&pool).unwrap();
        // 100 × 0.1 before the boundary, 200 × 0.5 after it
        assert_eq!(accrual.reward, 10 + 100);
        assert_eq!(accrual.eligible_balance, 200);
        assert_eq!(accrual.crossed, Some((1, Transition::Join)));
    }

    #[test]
    fn test_accrue_stops_at_removal_boundary() {
        let mut pool = pool_at(0, REWARD_INDEX_SCALE / 4);
        pool.eligible_total = 80;
        pool.schedule.add_removal(1, 80).unwrap();
        pool.roll(150).unwrap();
        pool.reward_index += REWARD_INDEX_SCALE;

        let account = StakeAccount {
            balance: 80,
            eligible_balance: 80,
            withdrawal_pending: true,
            withdrawal_epoch: 1,
            ..Default::default()
        };
        let accrual = account.accrue(&pool).unwrap();
        assert_eq!(accrual.reward, 20);
        assert_eq!(accrual.eligible_balance, 0);
    }

    #[test]
    fn test_missing_checkpoint_is_an_invariant_violation() {
        let pool = pool_at(2, 0);
        let account = StakeAccount {
            balance: 10,
            pending_addition: 10,
            addition_epoch: 1,
            ..Default::default()
        };
        assert_eq!(
            account.accrue(&pool).unwrap_err(),
            StakingError::AccountingInvariantViolated.into()
        );
    }
}
