use anchor_lang::prelude::*;

use crate::errors::StakingError;

/// Aggregate eligibility change waiting for the boundary that starts `epoch`
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct EpochDelta {
    pub epoch: u64,

    /// Stake that becomes eligible at the boundary
    pub additions: u64,

    /// Stake that stops being eligible at the boundary
    pub removals: u64,

    /// Accounts whose pending addition targets this boundary
    pub joiners: u32,

    /// Accounts whose withdrawal removal targets this boundary
    pub leavers: u32,
}

impl EpochDelta {
    fn is_empty(&self) -> bool {
        self.joiners == 0 && self.leavers == 0 && self.additions == 0 && self.removals == 0
    }
}

/// Reward index at an applied boundary, kept while some account has not yet
/// settled across it
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Checkpoint {
    pub epoch: u64,
    pub start_index: u128,
    pub joiners: u32,
    pub leavers: u32,
}

impl Checkpoint {
    fn is_referenced(&self) -> bool {
        self.joiners > 0 || self.leavers > 0
    }
}

/// Which side of a boundary an account reference sits on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Join,
    Leave,
}

/// Unapplied boundaries and the checkpoints of applied ones, both sorted by
/// epoch. A boundary moves from `entries` to `checkpoints` when it is applied
/// and leaves `checkpoints` once its last referencing account settles.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct EpochSchedule {
    pub entries: Vec<EpochDelta>,
    pub checkpoints: Vec<Checkpoint>,
}

/// What a roll did to the eligible total
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RollOutcome {
    pub from_epoch: u64,
    pub to_epoch: u64,
    pub added: u64,
    pub removed: u64,
    /// Removals that exceeded the running eligible total and were clamped
    pub shortfall: u64,
    /// Unallocated buffer spread over the cohort that became eligible
    pub buffer_released: u64,
}

impl RollOutcome {
    pub fn advanced(&self) -> bool {
        self.to_epoch > self.from_epoch
    }

    pub(crate) fn absorb(&mut self, step: &RollOutcome) {
        self.added = self.added.saturating_add(step.added);
        self.removed = self.removed.saturating_add(step.removed);
        self.shortfall = self.shortfall.saturating_add(step.shortfall);
    }
}

impl EpochSchedule {
    /// Serialized size of one entry or checkpoint
    pub const SLOT_SIZE: usize = 32;

    pub fn space(slots: usize) -> usize {
        4 + 4 + slots * Self::SLOT_SIZE
    }

    pub fn slots(&self) -> usize {
        self.entries.len() + self.checkpoints.len()
    }

    pub fn get(&self, epoch: u64) -> Option<&EpochDelta> {
        self.entries
            .binary_search_by_key(&epoch, |e| e.epoch)
            .ok()
            .map(|i| &self.entries[i])
    }

    pub fn checkpoint(&self, epoch: u64) -> Option<&Checkpoint> {
        self.checkpoints
            .binary_search_by_key(&epoch, |c| c.epoch)
            .ok()
            .map(|i| &self.checkpoints[i])
    }

    fn get_mut(&mut self, epoch: u64) -> Result<&mut EpochDelta> {
        let i = self
            .entries
            .binary_search_by_key(&epoch, |e| e.epoch)
            .map_err(|_| StakingError::AccountingInvariantViolated)?;
        Ok(&mut self.entries[i])
    }

    fn entry_mut(&mut self, epoch: u64) -> Result<&mut EpochDelta> {
        require!(
            self.checkpoint(epoch).is_none(),
            StakingError::AccountingInvariantViolated
        );
        let i = match self.entries.binary_search_by_key(&epoch, |e| e.epoch) {
            Ok(i) => i,
            Err(i) => {
                self.entries.insert(
                    i,
                    EpochDelta {
                        epoch,
                        ..Default::default()
                    },
                );
                i
            }
        };
        Ok(&mut self.entries[i])
    }

    /// Schedules `amount` to become eligible at `epoch`. `join` is set when
    /// the calling account did not already have an addition pending there.
    pub fn add_addition(&mut self, epoch: u64, amount: u64, join: bool) -> Result<()> {
        let entry = self.entry_mut(epoch)?;
        entry.additions = entry
            .additions
            .checked_add(amount)
            .ok_or(StakingError::Overflow)?;
        if join {
            entry.joiners = entry.joiners.checked_add(1).ok_or(StakingError::Overflow)?;
        }
        Ok(())
    }

    pub fn add_removal(&mut self, epoch: u64, amount: u64) -> Result<()> {
        let entry = self.entry_mut(epoch)?;
        entry.removals = entry
            .removals
            .checked_add(amount)
            .ok_or(StakingError::Overflow)?;
        entry.leavers = entry.leavers.checked_add(1).ok_or(StakingError::Overflow)?;
        Ok(())
    }

    /// Takes back an addition that has not been applied yet
    pub fn retract_addition(&mut self, epoch: u64, amount: u64) -> Result<()> {
        let entry = self.get_mut(epoch)?;
        entry.additions = entry
            .additions
            .checked_sub(amount)
            .ok_or(StakingError::AccountingInvariantViolated)?;
        Ok(())
    }

    /// Takes back a removal that has not been applied yet
    pub fn retract_removal(&mut self, epoch: u64, amount: u64) -> Result<()> {
        let entry = self.get_mut(epoch)?;
        entry.removals = entry
            .removals
            .checked_sub(amount)
            .ok_or(StakingError::AccountingInvariantViolated)?;
        Ok(())
    }

    /// Drops one account reference at `epoch`, wherever the boundary currently
    /// lives, and collects the slot once nothing needs it
    pub fn release(&mut self, epoch: u64, side: Transition) -> Result<()> {
        if let Ok(i) = self.entries.binary_search_by_key(&epoch, |e| e.epoch) {
            let entry = &mut self.entries[i];
            let refs = match side {
                Transition::Join => &mut entry.joiners,
                Transition::Leave => &mut entry.leavers,
            };
            *refs = refs
                .checked_sub(1)
                .ok_or(StakingError::AccountingInvariantViolated)?;
            if entry.is_empty() {
                self.entries.remove(i);
            }
            return Ok(());
        }

        let i = self
            .checkpoints
            .binary_search_by_key(&epoch, |c| c.epoch)
            .map_err(|_| StakingError::AccountingInvariantViolated)?;
        let checkpoint = &mut self.checkpoints[i];
        let refs = match side {
            Transition::Join => &mut checkpoint.joiners,
            Transition::Leave => &mut checkpoint.leavers,
        };
        *refs = refs
            .checked_sub(1)
            .ok_or(StakingError::AccountingInvariantViolated)?;
        if !checkpoint.is_referenced() {
            self.checkpoints.remove(i);
        }
        Ok(())
    }

    /// Reward index recorded when `epoch` began, if its boundary was applied
    /// and is still referenced
    pub fn start_index(&self, epoch: u64) -> Option<u128> {
        self.checkpoint(epoch).map(|c| c.start_index)
    }

    /// Earliest unapplied boundary that some account is waiting to join at
    pub fn next_cohort(&self) -> Option<u64> {
        self.entries
            .iter()
            .find(|e| e.joiners > 0 && e.additions > 0)
            .map(|e| e.epoch)
    }

    pub fn has_unapplied_additions(&self) -> bool {
        self.entries.iter().any(|e| e.additions > 0)
    }

    /// Applies every boundary up to and including `to_epoch` against
    /// `eligible_total`. Referenced boundaries leave a checkpoint stamped with
    /// `index`; unreferenced ones are dropped outright.
    pub fn apply_through(
        &mut self,
        to_epoch: u64,
        eligible_total: &mut u64,
        index: u128,
    ) -> Result<RollOutcome> {
        let mut outcome = RollOutcome {
            to_epoch,
            ..Default::default()
        };

        let due = self.entries.partition_point(|e| e.epoch <= to_epoch);
        for entry in self.entries.drain(..due) {
            let mut running = eligible_total
                .checked_add(entry.additions)
                .ok_or(StakingError::AccountingInvariantViolated)?;
            outcome.added = outcome.added.saturating_add(entry.additions);

            if entry.removals > running {
                outcome.shortfall = outcome
                    .shortfall
                    .saturating_add(entry.removals - running);
                outcome.removed = outcome.removed.saturating_add(running);
                running = 0;
            } else {
                running -= entry.removals;
                outcome.removed = outcome.removed.saturating_add(entry.removals);
            }
            *eligible_total = running;

            if entry.joiners > 0 || entry.leavers > 0 {
                self.checkpoints.push(Checkpoint {
                    epoch: entry.epoch,
                    start_index: index,
                    joiners: entry.joiners,
                    leavers: entry.leavers,
                });
            }
        }

        Ok(outcome)
    }
}
